//! Boundary-preserving uniform remeshing of polygonal meshes.
//!
//! This crate adapts a [`PolyMesh`](mesh_types::PolyMesh) to a
//! [`UniformRemesher`](mesh_remesh::UniformRemesher) and back:
//!
//! 1. [`ingest`] copies points and triangle cells into a flat
//!    [`TriangleSoup`](mesh_types::TriangleSoup), rejecting non-triangles and
//!    indices the remesher cannot take.
//! 2. [`classify_boundary`] counts edge uses; every vertex on an edge used
//!    by a single face is a boundary vertex.
//! 3. [`invoke`] derives the target edge length if needed, pins the
//!    boundary, calls the remesher and turns its failures (panics included)
//!    into [`FilterError`]s.
//! 4. [`emit`] rebuilds a mesh from the result, dropping point and cell data
//!    and carrying field data over.
//!
//! [`UniformRemeshFilter`] runs the four steps and passes meshes with no
//! points or no cells straight through.
//!
//! # Parameter profiles
//!
//! [`RemeshConfig`] is validated against one of two [`ParameterProfile`]s.
//! [`ParameterProfile::AutoLength`] (the default) derives the target length
//! from the input when none is given and clamps iterations to `1..=1000`.
//! [`ParameterProfile::FixedLength`] requires a positive length, rejects zero
//! iterations and projects onto the input surface by default.
//!
//! # Example
//!
//! ```
//! use mesh_types::{PolyMesh, Point3};
//! use mesh_uniform_remesh::{RemeshConfig, UniformRemeshFilter};
//!
//! // An open square made of two triangles
//! let input = PolyMesh::from_triangles(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2], [0, 2, 3]],
//! );
//!
//! let mut output = PolyMesh::new();
//! let summary = UniformRemeshFilter::new(RemeshConfig::default())
//!     .execute(&input, &mut output)?;
//!
//! assert_eq!(summary.boundary_vertices, 4);
//! assert!(summary.pinned_boundary);
//! assert_eq!(summary.output_cells, output.cell_count());
//! # Ok::<(), mesh_uniform_remesh::FilterError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod boundary;
mod config;
mod emit;
mod error;
mod filter;
mod ingest;
mod invoke;

pub use boundary::{BoundaryClassification, EdgeHistogram, EdgeKey, classify_boundary};
pub use config::{
    MAX_AUTO_ITERATIONS, MAX_FIXED_ITERATIONS, MIN_FIXED_EDGE_LENGTH, ParameterProfile,
    RemeshConfig, RemeshConfigBuilder, RemeshSettings,
};
pub use emit::emit;
pub use error::{ErrorCode, FilterError, FilterResult, RemeshingFailureKind};
pub use filter::{RemeshOutcome, RemeshSummary, UniformRemeshFilter};
pub use ingest::ingest;
pub use invoke::{Invocation, InvocationParams, invoke};
