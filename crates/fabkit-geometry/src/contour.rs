//! Contours and the SVG outline encoder.
//!
//! Contour points are in design units with y up. The SVG writers convert
//! to millimetres with y down, using the design's left edge and top edge as
//! the document origin.

use std::io::Write;

use fabkit_core::{CancellationToken, GeometryResult};

use crate::raster::Rgb8;

/// Endpoint matching tolerance when stitching, in design units
const STITCH_TOLERANCE: f64 = 1e-6;

/// Polyline on the zero level set of a field slice
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<[f64; 2]>,
    pub closed: bool,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Write this contour as one `<polyline>` element
    ///
    /// * `offset` - document origin in millimetres (`[xmin, ymax]`)
    /// * `scale` - millimetres per design unit
    /// * `stroke` - stroke width in millimetres
    pub fn write_svg_polyline<W: Write>(
        &self,
        writer: &mut W,
        offset: [f64; 2],
        scale: f64,
        stroke: f64,
        color: Rgb8,
    ) -> std::io::Result<()> {
        let mut points = self
            .points
            .iter()
            .map(|p| format!("{:.4},{:.4}", p[0] * scale - offset[0], offset[1] - p[1] * scale))
            .collect::<Vec<_>>();
        if self.closed {
            if let Some(first) = points.first().cloned() {
                points.push(first);
            }
        }
        writeln!(
            writer,
            r#"    <polyline points="{}" fill="none" stroke="rgb({}, {}, {})" stroke-width="{:.4}"/>"#,
            points.join(" "),
            color[0],
            color[1],
            color[2],
            stroke
        )
    }
}

/// Join loose segments into polylines
///
/// Segments are matched end to end in either orientation. The hard token
/// is checked once per started contour.
pub fn stitch_segments(
    segments: &[([f64; 2], [f64; 2])],
    token: &CancellationToken,
) -> GeometryResult<Vec<Contour>> {
    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();
    let near = |a: [f64; 2], b: [f64; 2]| {
        (a[0] - b[0]).abs() < STITCH_TOLERANCE && (a[1] - b[1]).abs() < STITCH_TOLERANCE
    };

    for (i, &(start, end)) in segments.iter().enumerate() {
        if used[i] {
            continue;
        }
        token.check()?;
        used[i] = true;
        let mut points = vec![start, end];
        let mut tail = end;

        loop {
            let next = segments.iter().enumerate().find_map(|(j, &(a, b))| {
                if used[j] {
                    None
                } else if near(tail, a) {
                    Some((j, b))
                } else if near(tail, b) {
                    Some((j, a))
                } else {
                    None
                }
            });
            match next {
                Some((j, point)) => {
                    used[j] = true;
                    points.push(point);
                    tail = point;
                }
                None => break,
            }
        }

        let closed = points.len() > 3 && near(tail, start);
        if closed {
            points.pop();
        }
        contours.push(Contour { points, closed });
    }
    Ok(contours)
}

/// Open the SVG document; width and height in millimetres
pub fn write_svg_header<W: Write>(writer: &mut W, width_mm: f64, height_mm: f64) -> std::io::Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w:.4}mm" height="{h:.4}mm" viewBox="0 0 {w:.4} {h:.4}">"#,
        w = width_mm,
        h = height_mm
    )
}

pub fn write_svg_footer<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "</svg>")
}

/// Open the group holding one shape's contours
pub fn write_svg_group_start<W: Write>(writer: &mut W, name: &str, color: Rgb8) -> std::io::Result<()> {
    writeln!(
        writer,
        r##"  <g id="{}" data-color="#{:02x}{:02x}{:02x}">"##,
        escape_xml(name),
        color[0],
        color[1],
        color[2]
    )
}

pub fn write_svg_group_end<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "  </g>")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
