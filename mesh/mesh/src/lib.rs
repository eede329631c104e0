//! Uniform remeshing toolkit for polygonal meshes.
//!
//! This umbrella crate re-exports the mesh-* crates, providing a unified API
//! for remeshing. All crates are Layer 0 (zero Bevy dependencies) and can be
//! used in CLI tools, WASM, servers, or Python bindings.
//!
//! # Quick Start
//!
//! ```
//! use mesh::prelude::*;
//!
//! let input = unit_cube();
//!
//! let config = RemeshConfig::builder(ParameterProfile::FixedLength)
//!     .target_edge_length(0.4)
//!     .iterations(3)
//!     .build()?;
//!
//! let mut output = PolyMesh::new();
//! let summary = UniformRemeshFilter::new(config).execute(&input, &mut output)?;
//!
//! assert_eq!(summary.output_cells, output.cell_count());
//! assert!(output.point_data.is_empty());
//! # Ok::<(), mesh::uniform_remesh::FilterError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core data structures: `PolyMesh`, `CellArray`, `TriangleSoup`, `Aabb`
//! - [`remesh`] - The remeshing contract and an isotropic remesher
//! - [`uniform_remesh`] - Boundary-preserving remeshing filter for `PolyMesh`
//!
//! # Feature Flags
//!
//! - `serde` - Serialization of mesh types and remeshing settings

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![doc(html_root_url = "https://docs.rs/mesh/0.7.0")]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `PolyMesh`, `CellArray`, `TriangleSoup`, `Aabb`.
pub use mesh_types as types;

/// Remeshing contract and the built-in isotropic remesher.
pub use mesh_remesh as remesh;

/// Boundary-preserving uniform remeshing filter.
pub use mesh_uniform_remesh as uniform_remesh;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for remeshing.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{Aabb, CellArray, DataArray, Point3, PolyMesh, TriangleSoup, unit_cube};

    // Remesher contract
    pub use mesh_remesh::{IsotropicRemesher, RemeshRequest, UniformRemesher};

    // Filter (main use case)
    pub use mesh_uniform_remesh::{
        FilterError, ParameterProfile, RemeshConfig, RemeshSummary, UniformRemeshFilter,
    };
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let mesh = PolyMesh::new();
        assert_eq!(mesh.point_count(), 0);
        assert_eq!(mesh.cell_count(), 0);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::PolyMesh::new();
        let _ = remesh::RemeshParams::default();
        let _ = uniform_remesh::RemeshConfig::default();
    }
}
