//! Implicit shape expressions.
//!
//! An [`Expr`] maps a point to a signed distance-like value: negative
//! inside, positive outside, zero on the surface. Trees are immutable and
//! shared through `Arc`, so one design can be evaluated from several export
//! workers at once.

use std::fmt;
use std::sync::Arc;

use crate::bounds::Bounds;

/// Implicit expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Disc in the xy plane, unbounded in z
    Circle { center: [f64; 2], radius: f64 },
    /// Axis-aligned rectangle in the xy plane, unbounded in z
    Rectangle { min: [f64; 2], max: [f64; 2] },
    Sphere { center: [f64; 3], radius: f64 },
    Cuboid { min: [f64; 3], max: [f64; 3] },
    /// Vertical cylinder standing on `base`
    Cylinder {
        base: [f64; 3],
        radius: f64,
        height: f64,
    },
    Union(Arc<Expr>, Arc<Expr>),
    Intersection(Arc<Expr>, Arc<Expr>),
    /// `a` with `b` removed
    Difference(Arc<Expr>, Arc<Expr>),
    Translate(Arc<Expr>, [f64; 3]),
    /// Grow (positive) or shrink (negative) the surface
    Offset(Arc<Expr>, f64),
    /// Limit a planar expression to `zmin..=zmax`
    Extrude(Arc<Expr>, f64, f64),
    /// Everything on the side of the plane opposite `normal`; unbounded
    HalfSpace { normal: [f64; 3], offset: f64 },
}

impl Expr {
    pub fn circle(center: [f64; 2], radius: f64) -> Arc<Expr> {
        Arc::new(Expr::Circle { center, radius })
    }

    pub fn rectangle(min: [f64; 2], max: [f64; 2]) -> Arc<Expr> {
        Arc::new(Expr::Rectangle { min, max })
    }

    pub fn sphere(center: [f64; 3], radius: f64) -> Arc<Expr> {
        Arc::new(Expr::Sphere { center, radius })
    }

    pub fn cuboid(min: [f64; 3], max: [f64; 3]) -> Arc<Expr> {
        Arc::new(Expr::Cuboid { min, max })
    }

    pub fn cylinder(base: [f64; 3], radius: f64, height: f64) -> Arc<Expr> {
        Arc::new(Expr::Cylinder {
            base,
            radius,
            height,
        })
    }

    pub fn half_space(normal: [f64; 3], offset: f64) -> Arc<Expr> {
        Arc::new(Expr::HalfSpace { normal, offset })
    }

    pub fn union(a: Arc<Expr>, b: Arc<Expr>) -> Arc<Expr> {
        Arc::new(Expr::Union(a, b))
    }

    pub fn intersection(a: Arc<Expr>, b: Arc<Expr>) -> Arc<Expr> {
        Arc::new(Expr::Intersection(a, b))
    }

    pub fn difference(a: Arc<Expr>, b: Arc<Expr>) -> Arc<Expr> {
        Arc::new(Expr::Difference(a, b))
    }

    pub fn translate(a: Arc<Expr>, offset: [f64; 3]) -> Arc<Expr> {
        Arc::new(Expr::Translate(a, offset))
    }

    pub fn offset(a: Arc<Expr>, amount: f64) -> Arc<Expr> {
        Arc::new(Expr::Offset(a, amount))
    }

    pub fn extrude(a: Arc<Expr>, zmin: f64, zmax: f64) -> Arc<Expr> {
        Arc::new(Expr::Extrude(a, zmin, zmax))
    }

    /// Evaluate at a point
    pub fn eval(&self, p: [f64; 3]) -> f64 {
        match self {
            Expr::Circle { center, radius } => {
                (p[0] - center[0]).hypot(p[1] - center[1]) - radius
            }
            Expr::Rectangle { min, max } => box_distance(&p[..2], min, max),
            Expr::Sphere { center, radius } => {
                let d = [p[0] - center[0], p[1] - center[1], p[2] - center[2]];
                (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt() - radius
            }
            Expr::Cuboid { min, max } => box_distance(&p, min, max),
            Expr::Cylinder {
                base,
                radius,
                height,
            } => {
                let radial = (p[0] - base[0]).hypot(p[1] - base[1]) - radius;
                let axial = (base[2] - p[2]).max(p[2] - base[2] - height);
                radial.max(axial)
            }
            Expr::Union(a, b) => a.eval(p).min(b.eval(p)),
            Expr::Intersection(a, b) => a.eval(p).max(b.eval(p)),
            Expr::Difference(a, b) => a.eval(p).max(-b.eval(p)),
            Expr::Translate(a, offset) => {
                a.eval([p[0] - offset[0], p[1] - offset[1], p[2] - offset[2]])
            }
            Expr::Offset(a, amount) => a.eval(p) - amount,
            Expr::Extrude(a, zmin, zmax) => a.eval(p).max(zmin - p[2]).max(p[2] - zmax),
            Expr::HalfSpace { normal, offset } => {
                normal[0] * p[0] + normal[1] * p[1] + normal[2] * p[2] - offset
            }
        }
    }

    /// Conservative bounding box of the inside region
    pub fn bounds(&self) -> Bounds {
        match self {
            Expr::Circle { center, radius } => Bounds::planar(
                center[0] - radius,
                center[1] - radius,
                center[0] + radius,
                center[1] + radius,
            ),
            Expr::Rectangle { min, max } => Bounds::planar(min[0], min[1], max[0], max[1]),
            Expr::Sphere { center, radius } => {
                Bounds::new(*center, *center).expanded(*radius)
            }
            Expr::Cuboid { min, max } => Bounds::new(*min, *max),
            Expr::Cylinder {
                base,
                radius,
                height,
            } => Bounds::new(
                [base[0] - radius, base[1] - radius, base[2]],
                [base[0] + radius, base[1] + radius, base[2] + height],
            ),
            Expr::Union(a, b) => a.bounds().union(&b.bounds()),
            Expr::Intersection(a, b) => a.bounds().intersection(&b.bounds()),
            Expr::Difference(a, _) => a.bounds(),
            Expr::Translate(a, offset) => a.bounds().translated(*offset),
            Expr::Offset(a, amount) => a.bounds().expanded(amount.max(0.0)),
            Expr::Extrude(a, zmin, zmax) => a.bounds().with_z(*zmin, *zmax),
            Expr::HalfSpace { .. } => Bounds::INFINITE,
        }
    }

    /// Direct children, left to right
    pub fn children(&self) -> Vec<&Arc<Expr>> {
        match self {
            Expr::Union(a, b) | Expr::Intersection(a, b) | Expr::Difference(a, b) => vec![a, b],
            Expr::Translate(a, _) | Expr::Offset(a, _) | Expr::Extrude(a, _, _) => vec![a],
            _ => Vec::new(),
        }
    }

    /// Short operator name
    pub fn op_name(&self) -> &'static str {
        match self {
            Expr::Circle { .. } => "circle",
            Expr::Rectangle { .. } => "rectangle",
            Expr::Sphere { .. } => "sphere",
            Expr::Cuboid { .. } => "cuboid",
            Expr::Cylinder { .. } => "cylinder",
            Expr::Union(..) => "union",
            Expr::Intersection(..) => "intersection",
            Expr::Difference(..) => "difference",
            Expr::Translate(..) => "translate",
            Expr::Offset(..) => "offset",
            Expr::Extrude(..) => "extrude",
            Expr::HalfSpace { .. } => "half_space",
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Check every parameter in the tree
    ///
    /// Returns the first problem found, described for the user.
    pub fn validate(&self) -> Result<(), String> {
        let finite = |name: &str, values: &[f64]| {
            if values.iter().all(|v| v.is_finite()) {
                Ok(())
            } else {
                Err(format!("{} has a non-finite parameter", name))
            }
        };
        match self {
            Expr::Circle { center, radius } => {
                finite("circle", &[center[0], center[1], *radius])?;
                non_negative("circle radius", *radius)
            }
            Expr::Rectangle { min, max } => finite("rectangle", &[min[0], min[1], max[0], max[1]]),
            Expr::Sphere { center, radius } => {
                finite("sphere", &[center[0], center[1], center[2], *radius])?;
                non_negative("sphere radius", *radius)
            }
            Expr::Cuboid { min, max } => finite("cuboid", &[min[0], min[1], min[2], max[0], max[1], max[2]]),
            Expr::Cylinder {
                base,
                radius,
                height,
            } => {
                finite("cylinder", &[base[0], base[1], base[2], *radius, *height])?;
                non_negative("cylinder radius", *radius)?;
                non_negative("cylinder height", *height)
            }
            Expr::Translate(_, offset) => finite("translate", offset),
            Expr::Offset(_, amount) => finite("offset", &[*amount]),
            Expr::Extrude(_, zmin, zmax) => finite("extrude", &[*zmin, *zmax]),
            Expr::HalfSpace { normal, offset } => {
                finite("half_space", &[normal[0], normal[1], normal[2], *offset])?;
                if normal.iter().all(|n| *n == 0.0) {
                    Err("half_space normal is zero".to_string())
                } else {
                    Ok(())
                }
            }
            Expr::Union(..) | Expr::Intersection(..) | Expr::Difference(..) => Ok(()),
        }?;
        for child in self.children() {
            child.validate()?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Circle { center, radius } => {
                write!(f, "circle(({}, {}), r={})", center[0], center[1], radius)
            }
            Expr::Rectangle { min, max } => write!(
                f,
                "rectangle(({}, {}), ({}, {}))",
                min[0], min[1], max[0], max[1]
            ),
            Expr::Sphere { center, radius } => write!(
                f,
                "sphere(({}, {}, {}), r={})",
                center[0], center[1], center[2], radius
            ),
            Expr::Cuboid { min, max } => write!(
                f,
                "cuboid(({}, {}, {}), ({}, {}, {}))",
                min[0], min[1], min[2], max[0], max[1], max[2]
            ),
            Expr::Cylinder {
                base,
                radius,
                height,
            } => write!(
                f,
                "cylinder(({}, {}, {}), r={}, h={})",
                base[0], base[1], base[2], radius, height
            ),
            Expr::Translate(_, o) => write!(f, "translate({}, {}, {})", o[0], o[1], o[2]),
            Expr::Offset(_, amount) => write!(f, "offset({})", amount),
            Expr::Extrude(_, zmin, zmax) => write!(f, "extrude({}, {})", zmin, zmax),
            Expr::HalfSpace { normal, offset } => write!(
                f,
                "half_space(({}, {}, {}), {})",
                normal[0], normal[1], normal[2], offset
            ),
            other => f.write_str(other.op_name()),
        }
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), String> {
    if value < 0.0 {
        Err(format!("{} is negative ({})", name, value))
    } else {
        Ok(())
    }
}

/// Exact signed distance to an axis-aligned box in any dimension
fn box_distance(p: &[f64], min: &[f64], max: &[f64]) -> f64 {
    let mut outside = 0.0;
    let mut inside = f64::NEG_INFINITY;
    for axis in 0..p.len() {
        let center = (min[axis] + max[axis]) * 0.5;
        let half = (max[axis] - min[axis]) * 0.5;
        let q = (p[axis] - center).abs() - half;
        outside += q.max(0.0).powi(2);
        inside = inside.max(q);
    }
    outside.sqrt() + inside.min(0.0)
}
