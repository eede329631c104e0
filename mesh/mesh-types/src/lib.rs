//! Core mesh types for CortenForge.
//!
//! This crate provides the data model shared by the remeshing crates:
//!
//! - [`PolyMesh`] - A polygonal boundary-representation mesh with point,
//!   cell and field data, as exchanged with visualization pipelines
//! - [`CellArray`] - Polygon cells in offsets + connectivity layout
//! - [`DataArray`] / [`AttributeData`] / [`FieldData`] - Named data arrays
//! - [`TriangleSoup`] - Flat `V×3` coordinate and `F×3` index arrays
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Python bindings
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{PolyMesh, Point3, DataArray};
//!
//! let mut mesh = PolyMesh::from_triangles(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2]],
//! );
//! mesh.field_data.add_array(DataArray::scalars("scan_id", vec![42.0]));
//!
//! assert_eq!(mesh.cell_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod attributes;
mod bounds;
mod cells;
mod mesh;
mod soup;
mod triangle;

// Re-export core types
pub use attributes::{AttributeData, DataArray, FieldData};
pub use bounds::Aabb;
pub use cells::{CellArray, CellId, Cells};
pub use mesh::{PolyMesh, unit_cube};
pub use soup::{FaceIndex, TriangleSoup};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
