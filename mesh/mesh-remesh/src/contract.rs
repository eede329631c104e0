//! The uniform remeshing contract.

use mesh_types::{FaceIndex, TriangleSoup};

use crate::error::RemeshResult;

/// Everything a remesher needs for one run.
#[derive(Debug, Clone)]
pub struct RemeshRequest<'a> {
    /// Input vertex and face arrays. Consumed; the remeshed arrays are
    /// returned in their place.
    pub soup: TriangleSoup,

    /// Edge length the output should approach. Positive.
    pub target_edge_length: f64,

    /// Upper bound on refinement passes. Positive.
    pub iterations: u32,

    /// Vertices to preserve: they are neither moved nor removed. Edges
    /// between them may still be subdivided. `None` selects the
    /// unconstrained run.
    pub pinned: Option<&'a [FaceIndex]>,

    /// Whether vertices are snapped back onto the input surface.
    pub project_to_surface: bool,
}

impl RemeshRequest<'_> {
    /// Create a request with no pinned vertices and no projection.
    #[must_use]
    pub fn new(soup: TriangleSoup, target_edge_length: f64, iterations: u32) -> Self {
        RemeshRequest {
            soup,
            target_edge_length,
            iterations,
            pinned: None,
            project_to_surface: false,
        }
    }
}

impl<'a> RemeshRequest<'a> {
    /// Pin the given vertices.
    #[must_use]
    pub fn with_pinned(mut self, pinned: &'a [FaceIndex]) -> Self {
        self.pinned = Some(pinned);
        self
    }

    /// Enable or disable projection onto the input surface.
    #[must_use]
    pub fn with_projection(mut self, project: bool) -> Self {
        self.project_to_surface = project;
        self
    }
}

/// A routine that rewrites a triangle soup toward uniform edge lengths.
///
/// Implementations run synchronously on the calling thread. The number of
/// vertices and faces may change arbitrarily; the returned soup must only
/// reference its own vertices.
///
/// Failures the implementation recognizes are returned as
/// [`RemeshFault`](crate::RemeshFault)s. Callers that need to survive
/// arbitrary implementations should also contain panics.
pub trait UniformRemesher {
    /// Remesh `request.soup`, returning the new arrays.
    ///
    /// # Errors
    ///
    /// Returns [`RemeshFault::OutOfMemory`](crate::RemeshFault::OutOfMemory)
    /// when memory runs out and [`RemeshFault::Runtime`](crate::RemeshFault::Runtime)
    /// for any other failure the implementation detects.
    fn remesh(&self, request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup>;
}

impl<T: UniformRemesher + ?Sized> UniformRemesher for &T {
    fn remesh(&self, request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
        (**self).remesh(request)
    }
}

impl<T: UniformRemesher + ?Sized> UniformRemesher for Box<T> {
    fn remesh(&self, request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
        (**self).remesh(request)
    }
}
