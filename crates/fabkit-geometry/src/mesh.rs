//! Triangle meshes and the STL encoder.

use std::io::Write;

use fabkit_core::{GeometryError, GeometryResult};
use stl_io::{Normal, Triangle, Vertex};

/// A single triangle in design units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

impl Facet {
    pub fn new(normal: [f32; 3], vertices: [[f32; 3]; 3]) -> Self {
        Self { normal, vertices }
    }

    fn scaled(&self, factor: f32) -> Triangle {
        let v = |p: [f32; 3]| Vertex::new([p[0] * factor, p[1] * factor, p[2] * factor]);
        Triangle {
            normal: Normal::new(self.normal),
            vertices: [v(self.vertices[0]), v(self.vertices[1]), v(self.vertices[2])],
        }
    }
}

/// Triangle soup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub facets: Vec<Facet>,
}

impl Mesh {
    pub fn new(facets: Vec<Facet>) -> Self {
        Self { facets }
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Concatenate meshes in order
    ///
    /// Overlapping geometry is kept as-is; no boolean union is performed.
    pub fn merge(meshes: &[Mesh]) -> Mesh {
        let facets = meshes
            .iter()
            .flat_map(|mesh| mesh.facets.iter().copied())
            .collect();
        Mesh { facets }
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut vertices = self.facets.iter().flat_map(|f| f.vertices.iter());
        let first = *vertices.next()?;
        Some(vertices.fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }

    /// Encode as binary STL with vertices converted to millimetres
    pub fn write_stl<W: Write>(&self, writer: &mut W, mm_per_unit: f64) -> GeometryResult<()> {
        let factor = mm_per_unit as f32;
        let triangles: Vec<Triangle> = self.facets.iter().map(|f| f.scaled(factor)).collect();
        stl_io::write_stl(writer, triangles.iter()).map_err(GeometryError::stream)
    }
}
