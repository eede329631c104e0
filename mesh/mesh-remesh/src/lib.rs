//! Uniform remeshing contract and an isotropic remesher.
//!
//! A uniform remesher rewrites a triangle soup so its edges approach a
//! target length. This crate defines the contract such routines implement
//! ([`UniformRemesher`] taking a [`RemeshRequest`]) and ships one
//! implementation, [`IsotropicRemesher`], which iterates local edge
//! operations:
//! - **Split**: Long edges are split at their midpoint
//! - **Collapse**: Short edges are collapsed to a single vertex
//! - **Flip**: Edges are flipped to improve triangle quality
//! - **Smooth**: Vertices are relaxed tangentially
//!
//! Vertices listed in [`RemeshRequest::pinned`] are never moved or removed,
//! which is how callers keep an open mesh's boundary in place. Edges between
//! pinned vertices are still subdivided.
//!
//! # Examples
//!
//! Refining a single triangle:
//!
//! ```
//! use mesh_types::TriangleSoup;
//! use mesh_remesh::{IsotropicRemesher, RemeshRequest};
//!
//! let soup = TriangleSoup::from_parts(
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.866, 0.0]],
//!     vec![[0, 1, 2]],
//! );
//!
//! let (remeshed, stats) = IsotropicRemesher::new()
//!     .remesh_with_stats(RemeshRequest::new(soup, 0.3, 5))?;
//!
//! assert!(stats.final_faces > stats.original_faces);
//! assert_eq!(remeshed.face_count(), stats.final_faces);
//! # Ok::<(), mesh_remesh::RemeshFault>(())
//! ```
//!
//! Any type can stand in for the built-in remesher:
//!
//! ```
//! use mesh_types::TriangleSoup;
//! use mesh_remesh::{RemeshFault, RemeshRequest, RemeshResult, UniformRemesher};
//!
//! struct Refuses;
//!
//! impl UniformRemesher for Refuses {
//!     fn remesh(&self, _request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
//!         Err(RemeshFault::runtime("not today"))
//!     }
//! }
//!
//! let request = RemeshRequest::new(TriangleSoup::new(), 1.0, 1);
//! assert!(Refuses.remesh(request).is_err());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod contract;
mod error;
mod params;
mod projection;
mod remesh;
mod result;

pub use contract::{RemeshRequest, UniformRemesher};
pub use error::{RemeshFault, RemeshResult};
pub use params::RemeshParams;
pub use projection::SurfaceProjector;
pub use remesh::IsotropicRemesher;
pub use result::{EdgeStatistics, RemeshStats, average_edge_length, edge_statistics};
