//! Sampled distance fields.
//!
//! A [`Field`] holds an expression sampled on the cell centres of a
//! [`Region`]. It is the intermediate for contouring, triangulation and
//! rendering, and can be persisted as a `.asdf` document.
//!
//! Long-running operations take a [`CancellationToken`] and check it once
//! per row of samples, returning [`GeometryError::Interrupted`] when set.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use fabkit_core::{CancellationToken, GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};

use crate::contour::{stitch_segments, Contour};
use crate::expr::Expr;
use crate::mesh::{Facet, Mesh};
use crate::raster::ImageTile;
use crate::region::{Region, MAX_SAMPLES_PER_AXIS};

const FIELD_FORMAT: &str = "fabkit-field";
const FIELD_VERSION: u32 = 1;

/// Expression samples over a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    region: Region,
    dims: [usize; 3],
    mm_per_unit: f64,
    samples: Vec<f64>,
}

#[derive(Serialize)]
struct FieldFileRef<'a> {
    format: &'a str,
    version: u32,
    field: &'a Field,
}

#[derive(Deserialize)]
struct FieldFile {
    format: String,
    version: u32,
    field: Field,
}

impl Field {
    /// Sample `expr` over `region`
    pub fn build(
        expr: &Expr,
        region: Region,
        mm_per_unit: f64,
        token: &CancellationToken,
    ) -> GeometryResult<Field> {
        let dims = region.checked_dims()?;
        let xs = axis_samples(&region, 0, dims[0]);
        let ys = axis_samples(&region, 1, dims[1]);
        let zs = axis_samples(&region, 2, dims[2]);

        let mut samples = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for &z in &zs {
            for &y in &ys {
                token.check()?;
                samples.extend(xs.iter().map(|&x| expr.eval([x, y, z])));
            }
        }
        tracing::trace!(?dims, "field sampled");

        Ok(Field {
            region,
            dims,
            mm_per_unit,
            samples,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Millimetres per design unit of the design this field came from
    pub fn mm_per_unit(&self) -> f64 {
        self.mm_per_unit
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.samples[(k * self.dims[1] + j) * self.dims[0] + i]
    }

    pub fn is_inside(&self, i: usize, j: usize, k: usize) -> bool {
        self.value(i, j, k) < 0.0
    }

    /// Number of samples inside the shape
    pub fn inside_count(&self) -> usize {
        self.samples.iter().filter(|v| **v < 0.0).count()
    }

    /// Position of a sample in design units
    pub fn position(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [
            self.region.sample(0, i, self.dims[0]),
            self.region.sample(1, j, self.dims[1]),
            self.region.sample(2, k, self.dims[2]),
        ]
    }

    /// Zero-level outlines of the slice nearest `z = 0`
    ///
    /// Samples outside the region count as outside, so every contour closes.
    pub fn contour(&self, token: &CancellationToken) -> GeometryResult<Vec<Contour>> {
        let k = self.slice_index(0.0);
        let [nx, ny, _] = self.dims;
        let cell = self.region.cell_size(self.dims);
        let outside = cell[0].max(cell[1]);

        // Node grid padded by one virtual outside ring
        let node = |i: i64, j: i64| -> ([f64; 2], f64) {
            let x = self.region.min[0] + (i as f64 + 0.5) * cell[0];
            let y = self.region.min[1] + (j as f64 + 0.5) * cell[1];
            let inside_grid = i >= 0 && j >= 0 && (i as usize) < nx && (j as usize) < ny;
            let v = if inside_grid {
                self.value(i as usize, j as usize, k)
            } else {
                outside
            };
            ([x, y], v)
        };
        let crossing = |a: (i64, i64), b: (i64, i64)| -> [f64; 2] {
            let (a, b) = if a <= b { (a, b) } else { (b, a) };
            let (pa, va) = node(a.0, a.1);
            let (pb, vb) = node(b.0, b.1);
            let t = va / (va - vb);
            [pa[0] + t * (pb[0] - pa[0]), pa[1] + t * (pb[1] - pa[1])]
        };

        let mut segments = Vec::new();
        for j in -1..ny as i64 {
            token.check()?;
            for i in -1..nx as i64 {
                let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
                let values = corners.map(|(ci, cj)| node(ci, cj).1);
                let case = values
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (bit, v)| acc | (u8::from(*v < 0.0) << bit));
                if case == 0 || case == 15 {
                    continue;
                }
                let edge = |e: usize| match e {
                    0 => crossing(corners[0], corners[1]),
                    1 => crossing(corners[1], corners[2]),
                    2 => crossing(corners[2], corners[3]),
                    _ => crossing(corners[3], corners[0]),
                };
                let centre_inside = values.iter().sum::<f64>() < 0.0;
                for &(a, b) in cell_edges(case, centre_inside) {
                    segments.push((edge(a), edge(b)));
                }
            }
        }

        stitch_segments(&segments, token)
    }

    /// Closed surface made of the boundary faces of inside cells
    pub fn triangulate(&self, token: &CancellationToken) -> GeometryResult<Mesh> {
        let cell = self.region.cell_size(self.dims);
        let centre = |i: usize, j: usize, k: usize| self.position(i, j, k);
        boundary_faces(
            self.dims,
            |i, j, k| self.is_inside(i, j, k),
            centre,
            cell,
            token,
        )
    }

    /// Coarser surface at half resolution
    ///
    /// Each output cell covers up to 2x2x2 samples and is inside when any of
    /// them is. Not interruptible.
    pub fn triangulate_fast(&self) -> Mesh {
        let coarse = self.dims.map(|n| n.div_ceil(2));
        let fine_cell = self.region.cell_size(self.dims);
        let mut cell = fine_cell;
        for (axis, size) in cell.iter_mut().enumerate() {
            if self.region.extent(axis) > 0.0 {
                *size = self.region.extent(axis) / coarse[axis] as f64;
            }
        }
        let inside = |ci: usize, cj: usize, ck: usize| {
            let range = |c: usize, axis: usize| (c * 2)..((c * 2 + 2).min(self.dims[axis]));
            range(ck, 2).any(|k| {
                range(cj, 1).any(|j| range(ci, 0).any(|i| self.is_inside(i, j, k)))
            })
        };
        let centre = |i: usize, j: usize, k: usize| {
            let at = |axis: usize, idx: usize| {
                if self.region.extent(axis) > 0.0 {
                    self.region.min[axis] + (idx as f64 + 0.5) * cell[axis]
                } else {
                    self.region.min[axis]
                }
            };
            [at(0, i), at(1, j), at(2, k)]
        };
        let never = CancellationToken::new();
        boundary_faces(coarse, inside, centre, cell, &never).unwrap_or_default()
    }

    /// Orthographic height map of the inside samples
    ///
    /// The field is rotated by `alpha` degrees about z, then `beta` degrees
    /// about x, and viewed down the z axis. `resolution` is pixels per
    /// design unit. Brighter pixels are nearer the viewer.
    pub fn render(&self, alpha: f64, beta: f64, resolution: f64) -> GeometryResult<ImageTile> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GeometryError::InvalidRegion {
                reason: format!("render resolution must be > 0, got {}", resolution),
            });
        }
        if !(alpha.is_finite() && beta.is_finite()) {
            return Err(GeometryError::InvalidRegion {
                reason: "view angles must be finite".to_string(),
            });
        }
        let rotate = rotation(alpha, beta);

        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for corner in 0..8 {
            let p = [0, 1, 2].map(|axis| {
                if corner & (1 << axis) == 0 {
                    self.region.min[axis]
                } else {
                    self.region.max[axis]
                }
            });
            let r = rotate(p);
            for axis in 0..3 {
                lo[axis] = lo[axis].min(r[axis]);
                hi[axis] = hi[axis].max(r[axis]);
            }
        }

        let size = |axis: usize| ((hi[axis] - lo[axis]) * resolution).ceil().max(1.0);
        let (w, h) = (size(0), size(1));
        if w > MAX_SAMPLES_PER_AXIS as f64 || h > MAX_SAMPLES_PER_AXIS as f64 {
            return Err(GeometryError::InvalidRegion {
                reason: format!("{}x{} render exceeds the per-axis limit", w, h),
            });
        }
        let (width, height) = (w as u32, h as u32);
        let mut tile = ImageTile::new([lo[0], lo[1]], 1.0 / resolution, width, height, None);
        let depth = hi[2] - lo[2];

        let [nx, ny, nz] = self.dims;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    if !self.is_inside(i, j, k) {
                        continue;
                    }
                    let r = rotate(self.position(i, j, k));
                    let px = (((r[0] - lo[0]) * resolution).floor() as i64).clamp(0, i64::from(width) - 1);
                    let py = (((hi[1] - r[1]) * resolution).floor() as i64).clamp(0, i64::from(height) - 1);
                    let shade = if depth > 0.0 {
                        1.0 + (254.0 * (r[2] - lo[2]) / depth).round()
                    } else {
                        255.0
                    };
                    tile.raise(px as u32, py as u32, shade.clamp(1.0, 255.0) as u8);
                }
            }
        }
        Ok(tile)
    }

    /// Serialize as a `.asdf` document
    pub fn write_to<W: Write>(&self, writer: W) -> GeometryResult<()> {
        let doc = FieldFileRef {
            format: FIELD_FORMAT,
            version: FIELD_VERSION,
            field: self,
        };
        serde_json::to_writer(writer, &doc).map_err(json_error)
    }

    /// Parse a `.asdf` document
    pub fn read_from<R: Read>(reader: R) -> GeometryResult<Field> {
        let doc: FieldFile = serde_json::from_reader(reader).map_err(json_error)?;
        if doc.format != FIELD_FORMAT || doc.version != FIELD_VERSION {
            return Err(GeometryError::Encoding {
                reason: format!("unsupported field document {} v{}", doc.format, doc.version),
            });
        }
        let field = doc.field;
        let expected: usize = field.dims.iter().product();
        if field.samples.len() != expected {
            return Err(GeometryError::Encoding {
                reason: format!(
                    "field holds {} samples, dims need {}",
                    field.samples.len(),
                    expected
                ),
            });
        }
        Ok(field)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GeometryResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| GeometryError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(|e| e.at_path(path))?;
        writer.flush().map_err(|e| GeometryError::io(path, e))
    }

    pub fn load(path: impl AsRef<Path>) -> GeometryResult<Field> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GeometryError::io(path, e))?;
        Self::read_from(BufReader::new(file)).map_err(|e| e.at_path(path))
    }

    fn slice_index(&self, z: f64) -> usize {
        let nz = self.dims[2];
        if nz <= 1 || self.region.is_flat() {
            return 0;
        }
        let cell = self.region.extent(2) / nz as f64;
        let index = ((z - self.region.min[2]) / cell).floor();
        index.clamp(0.0, (nz - 1) as f64) as usize
    }
}

fn json_error(err: serde_json::Error) -> GeometryError {
    if err.is_io() {
        GeometryError::stream(err.into())
    } else {
        GeometryError::Encoding {
            reason: err.to_string(),
        }
    }
}

fn axis_samples(region: &Region, axis: usize, count: usize) -> Vec<f64> {
    (0..count).map(|i| region.sample(axis, i, count)).collect()
}

/// Rotation about z by `alpha` then about x by `beta`, in degrees
fn rotation(alpha: f64, beta: f64) -> impl Fn([f64; 3]) -> [f64; 3] {
    let (sa, ca) = alpha.to_radians().sin_cos();
    let (sb, cb) = beta.to_radians().sin_cos();
    move |p: [f64; 3]| {
        let x = ca * p[0] - sa * p[1];
        let y = sa * p[0] + ca * p[1];
        let z = p[2];
        [x, cb * y - sb * z, sb * y + cb * z]
    }
}

/// Marching-squares edge pairs for a cell case
///
/// Corners are numbered counter-clockwise from bottom-left; edge `n` runs
/// from corner `n` to corner `n + 1`.
fn cell_edges(case: u8, centre_inside: bool) -> &'static [(usize, usize)] {
    match case {
        1 | 14 => &[(3, 0)],
        2 | 13 => &[(0, 1)],
        3 | 12 => &[(3, 1)],
        4 | 11 => &[(1, 2)],
        6 | 9 => &[(0, 2)],
        7 | 8 => &[(3, 2)],
        5 if centre_inside => &[(0, 1), (2, 3)],
        5 => &[(3, 0), (1, 2)],
        10 if centre_inside => &[(3, 0), (1, 2)],
        10 => &[(0, 1), (2, 3)],
        _ => &[],
    }
}

/// Emit the faces between inside cells and outside neighbours
fn boundary_faces(
    dims: [usize; 3],
    inside: impl Fn(usize, usize, usize) -> bool,
    centre: impl Fn(usize, usize, usize) -> [f64; 3],
    cell: [f64; 3],
    token: &CancellationToken,
) -> GeometryResult<Mesh> {
    let half = cell.map(|c| c * 0.5);
    let mut facets = Vec::new();
    for k in 0..dims[2] {
        for j in 0..dims[1] {
            token.check()?;
            for i in 0..dims[0] {
                if !inside(i, j, k) {
                    continue;
                }
                let idx = [i, j, k];
                let c = centre(i, j, k);
                for axis in 0..3 {
                    for sign in [-1i64, 1] {
                        let n = idx[axis] as i64 + sign;
                        let open = if n < 0 || n >= dims[axis] as i64 {
                            true
                        } else {
                            let mut m = idx;
                            m[axis] = n as usize;
                            !inside(m[0], m[1], m[2])
                        };
                        if open {
                            push_face(&mut facets, c, half, axis, sign as f64);
                        }
                    }
                }
            }
        }
    }
    Ok(Mesh::new(facets))
}

fn push_face(facets: &mut Vec<Facet>, c: [f64; 3], half: [f64; 3], axis: usize, sign: f64) {
    let u = (axis + 1) % 3;
    let v = (axis + 2) % 3;
    let corner = |su: f64, sv: f64| {
        let mut p = c;
        p[axis] += sign * half[axis];
        p[u] += su * half[u];
        p[v] += sv * half[v];
        p.map(|x| x as f32)
    };
    let mut quad = [
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
    ];
    if sign < 0.0 {
        quad.reverse();
    }
    let mut normal = [0.0f32; 3];
    normal[axis] = sign as f32;
    facets.push(Facet::new(normal, [quad[0], quad[1], quad[2]]));
    facets.push(Facet::new(normal, [quad[0], quad[2], quad[3]]));
}
