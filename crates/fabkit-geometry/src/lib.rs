//! # FabKit Geometry
//!
//! The geometry engine behind the exporters:
//!
//! - [`expr`]: implicit expressions (negative inside)
//! - [`shape`] and [`design`]: named, colored shapes in an ordered design
//! - [`region`]: sampling regions and [`compute_region`]
//! - [`field`]: sampled fields with contouring, triangulation and rendering
//! - [`raster`], [`contour`], [`mesh`]: artifacts and their PNG, SVG and STL encoders
//! - [`tape`]: flattened evaluation graphs and the Graphviz dump
//!
//! Every potentially long computation takes a
//! [`CancellationToken`](fabkit_core::CancellationToken) and returns
//! [`GeometryError::Interrupted`](fabkit_core::GeometryError::Interrupted)
//! soon after it is set.

pub mod bounds;
pub mod contour;
pub mod design;
pub mod expr;
pub mod field;
pub mod mesh;
pub mod raster;
pub mod region;
pub mod shape;
pub mod tape;

pub use bounds::Bounds;
pub use contour::{
    stitch_segments, write_svg_footer, write_svg_group_end, write_svg_group_start,
    write_svg_header, Contour,
};
pub use design::{Design, DEFAULT_BORDER};
pub use expr::Expr;
pub use field::Field;
pub use mesh::{Facet, Mesh};
pub use raster::{ImageTile, Rgb8, DEFAULT_TILE_COLOR};
pub use region::{compute_region, Region, MAX_SAMPLES, MAX_SAMPLES_PER_AXIS};
pub use shape::Shape;
pub use tape::{Tape, TapeNode};
