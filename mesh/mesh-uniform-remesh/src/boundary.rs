//! Boundary detection by edge-use counting.

use hashbrown::HashMap;
use mesh_types::FaceIndex;
use tracing::debug;

/// An undirected edge, stored with its smaller endpoint first.
///
/// ```
/// use mesh_uniform_remesh::EdgeKey;
///
/// assert_eq!(EdgeKey::new(7, 2), EdgeKey::new(2, 7));
/// assert_eq!(EdgeKey::new(7, 2).endpoints(), (2, 7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(FaceIndex, FaceIndex);

impl EdgeKey {
    /// Canonical key of the edge between `a` and `b`.
    #[inline]
    #[must_use]
    pub const fn new(a: FaceIndex, b: FaceIndex) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// The endpoints, smaller first.
    #[must_use]
    pub const fn endpoints(self) -> (FaceIndex, FaceIndex) {
        (self.0, self.1)
    }
}

/// The three edges of a face, in winding order.
#[inline]
fn face_edges(face: &[FaceIndex; 3]) -> [EdgeKey; 3] {
    [
        EdgeKey::new(face[0], face[1]),
        EdgeKey::new(face[1], face[2]),
        EdgeKey::new(face[2], face[0]),
    ]
}

/// Number of faces using each distinct edge.
///
/// In a closed manifold every edge is used twice; an edge used once lies on
/// the boundary; an edge used more than twice is non-manifold.
#[derive(Debug, Clone, Default)]
pub struct EdgeHistogram {
    counts: HashMap<EdgeKey, u32>,
}

impl EdgeHistogram {
    /// Count edge uses over `faces`.
    ///
    /// ```
    /// use mesh_uniform_remesh::EdgeHistogram;
    ///
    /// let histogram = EdgeHistogram::build(&[[0, 1, 2], [0, 2, 3]]);
    /// assert_eq!(histogram.count(2, 0), 2);
    /// assert_eq!(histogram.boundary_edges(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[FaceIndex; 3]]) -> Self {
        let mut counts: HashMap<EdgeKey, u32> = HashMap::with_capacity(faces.len() * 3 / 2 + 3);
        for face in faces {
            for edge in face_edges(face) {
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Number of faces using the edge between `a` and `b` (0 if absent).
    #[must_use]
    pub fn count(&self, a: FaceIndex, b: FaceIndex) -> u32 {
        self.counts.get(&EdgeKey::new(a, b)).copied().unwrap_or(0)
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn distinct_edges(&self) -> usize {
        self.counts.len()
    }

    /// Number of edges used by exactly one face.
    #[must_use]
    pub fn boundary_edges(&self) -> usize {
        self.counts.values().filter(|&&n| n == 1).count()
    }

    /// Number of edges used by more than two faces.
    #[must_use]
    pub fn non_manifold_edges(&self) -> usize {
        self.counts.values().filter(|&&n| n > 2).count()
    }

    /// Iterate over `(edge, count)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeKey, u32)> + '_ {
        self.counts.iter().map(|(&edge, &n)| (edge, n))
    }
}

/// Which vertices of a mesh lie on an open boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryClassification {
    flags: Vec<bool>,
    vertices: Vec<FaceIndex>,
    boundary_edges: usize,
    non_manifold_edges: usize,
}

impl BoundaryClassification {
    /// Whether vertex `v` is on the boundary. `false` for unknown vertices.
    #[must_use]
    pub fn is_boundary(&self, v: FaceIndex) -> bool {
        usize::try_from(v)
            .ok()
            .and_then(|i| self.flags.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// One flag per vertex.
    #[must_use]
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Boundary vertices in ascending order.
    #[must_use]
    pub fn vertices(&self) -> &[FaceIndex] {
        &self.vertices
    }

    /// Number of boundary vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges used by exactly one face.
    #[must_use]
    pub const fn boundary_edge_count(&self) -> usize {
        self.boundary_edges
    }

    /// Number of edges used by more than two faces. These are not treated
    /// as boundary.
    #[must_use]
    pub const fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges
    }

    /// Whether the mesh has no boundary.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Mark every vertex incident to an edge used by exactly one face.
///
/// The first pass counts edge uses; the second revisits each face and flags
/// both endpoints of any edge whose count is 1. Edges used more than twice
/// count as interior. Indices outside `0..vertex_count` are ignored.
///
/// # Example
///
/// ```
/// use mesh_uniform_remesh::classify_boundary;
///
/// // Two triangles sharing the diagonal 0-2
/// let boundary = classify_boundary(&[[0, 1, 2], [0, 2, 3]], 4);
///
/// assert_eq!(boundary.vertices(), &[0, 1, 2, 3]);
/// assert_eq!(boundary.boundary_edge_count(), 4);
/// assert!(!boundary.is_closed());
/// ```
#[must_use]
pub fn classify_boundary(faces: &[[FaceIndex; 3]], vertex_count: usize) -> BoundaryClassification {
    let histogram = EdgeHistogram::build(faces);

    let mut flags = vec![false; vertex_count];
    let mut mark = |v: FaceIndex| {
        if let Some(flag) = usize::try_from(v).ok().and_then(|i| flags.get_mut(i)) {
            *flag = true;
        }
    };
    for face in faces {
        for edge in face_edges(face) {
            if histogram.counts.get(&edge) == Some(&1) {
                let (a, b) = edge.endpoints();
                mark(a);
                mark(b);
            }
        }
    }

    let vertices: Vec<FaceIndex> = flags
        .iter()
        .enumerate()
        .filter(|&(_, &on_boundary)| on_boundary)
        .filter_map(|(i, _)| FaceIndex::try_from(i).ok())
        .collect();

    let classification = BoundaryClassification {
        flags,
        vertices,
        boundary_edges: histogram.boundary_edges(),
        non_manifold_edges: histogram.non_manifold_edges(),
    };
    debug!(
        "Boundary: {} vertices on {} edges ({} distinct edges, {} non-manifold)",
        classification.vertex_count(),
        classification.boundary_edges,
        histogram.distinct_edges(),
        classification.non_manifold_edges
    );
    classification
}
