//! Flattened evaluation graphs.
//!
//! A [`Tape`] lists the distinct nodes of an expression tree in evaluation
//! order (children before parents). Shared sub-expressions appear once. It
//! is what the `.dot` exporter dumps.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use crate::bounds::Bounds;
use crate::expr::Expr;

#[derive(Debug, Clone)]
pub struct TapeNode {
    pub label: String,
    /// Indices of child nodes in the tape
    pub children: Vec<usize>,
    expr: Arc<Expr>,
}

impl TapeNode {
    pub fn expr(&self) -> &Arc<Expr> {
        &self.expr
    }
}

#[derive(Debug, Clone)]
pub struct Tape {
    name: String,
    nodes: Vec<TapeNode>,
    probes: Vec<[f64; 3]>,
}

impl Tape {
    /// Flatten `expr` into evaluation order
    pub fn compile(name: &str, expr: &Arc<Expr>) -> Tape {
        let mut nodes = Vec::new();
        let mut seen = HashMap::new();
        push_node(expr, &mut nodes, &mut seen);
        Tape {
            name: name.to_string(),
            nodes,
            probes: probe_points(&expr.bounds()),
        }
    }

    pub fn nodes(&self) -> &[TapeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the output node
    pub fn root(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Points the value arrays are sampled at: the corners of the bounds
    pub fn probes(&self) -> &[[f64; 3]] {
        &self.probes
    }

    /// Value of every node at one point, in tape order
    pub fn evaluate(&self, point: [f64; 3]) -> Vec<f64> {
        self.nodes.iter().map(|n| n.expr.eval(point)).collect()
    }

    /// Emit the graph in Graphviz format
    ///
    /// With `arrays`, every node label also lists its value at each probe
    /// point.
    pub fn write_dot<W: Write>(&self, writer: &mut W, arrays: bool) -> std::io::Result<()> {
        let values: Vec<Vec<f64>> = if arrays {
            self.probes.iter().map(|p| self.evaluate(*p)).collect()
        } else {
            Vec::new()
        };

        writeln!(writer, "digraph \"{}\" {{", escape(&self.name))?;
        writeln!(writer, "  rankdir=BT;")?;
        writeln!(writer, "  node [shape=box, fontname=\"monospace\"];")?;
        for (index, node) in self.nodes.iter().enumerate() {
            let mut label = escape(&node.label);
            if arrays {
                let row = values
                    .iter()
                    .map(|v| format!("{:.3}", v[index]))
                    .collect::<Vec<_>>()
                    .join(", ");
                label.push_str(&format!("\\n[{}]", row));
            }
            let extra = if index == self.root() { ", peripheries=2" } else { "" };
            writeln!(writer, "  n{} [label=\"{}\"{}];", index, label, extra)?;
        }
        for (index, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                writeln!(writer, "  n{} -> n{};", child, index)?;
            }
        }
        writeln!(writer, "}}")
    }
}

fn push_node(
    expr: &Arc<Expr>,
    nodes: &mut Vec<TapeNode>,
    seen: &mut HashMap<*const Expr, usize>,
) -> usize {
    let key = Arc::as_ptr(expr);
    if let Some(&index) = seen.get(&key) {
        return index;
    }
    let children = expr
        .children()
        .into_iter()
        .map(|child| push_node(child, nodes, seen))
        .collect();
    nodes.push(TapeNode {
        label: expr.to_string(),
        children,
        expr: expr.clone(),
    });
    let index = nodes.len() - 1;
    seen.insert(key, index);
    index
}

/// Corners of the bounds; unbounded axes probe at 0
fn probe_points(bounds: &Bounds) -> Vec<[f64; 3]> {
    let pick = |v: f64| if v.is_finite() { v } else { 0.0 };
    let mut points: Vec<[f64; 3]> = Vec::with_capacity(8);
    for corner in 0..8usize {
        let p = [0usize, 1, 2].map(|axis| {
            if corner & (1 << axis) == 0 {
                pick(bounds.min[axis])
            } else {
                pick(bounds.max[axis])
            }
        });
        if !points.contains(&p) {
            points.push(p);
        }
    }
    points
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
