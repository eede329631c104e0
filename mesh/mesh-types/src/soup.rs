//! Flat vertex/face arrays.

use crate::Triangle;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index type of [`TriangleSoup`] faces.
///
/// 32-bit signed, as expected by numeric remeshing kernels. This bounds a
/// soup to `i32::MAX + 1` addressable vertices.
pub type FaceIndex = i32;

/// A triangle mesh as two flat arrays, without adjacency.
///
/// `vertices` is a `V×3` coordinate array and `faces` an `F×3` index array.
/// Nothing about the arrays is validated on construction.
///
/// # Example
///
/// ```
/// use mesh_types::TriangleSoup;
///
/// let soup = TriangleSoup::from_parts(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
///     vec![[0, 1, 2]],
/// );
///
/// assert_eq!(soup.vertex_count(), 3);
/// assert!((soup.triangle(0).unwrap().area() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleSoup {
    /// Vertex coordinates, one row per vertex.
    pub vertices: Vec<[f64; 3]>,

    /// Triangles as vertex index triples, one row per face.
    pub faces: Vec<[FaceIndex; 3]>,
}

impl TriangleSoup {
    /// Create an empty soup.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty soup with pre-allocated rows.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a soup from its two arrays.
    #[must_use]
    pub const fn from_parts(vertices: Vec<[f64; 3]>, faces: Vec<[FaceIndex; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Number of vertex rows.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of face rows.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the soup has no vertices or no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Position of vertex `index`, or `None` if it does not exist.
    #[must_use]
    pub fn point(&self, index: FaceIndex) -> Option<Point3<f64>> {
        let index = usize::try_from(index).ok()?;
        self.vertices
            .get(index)
            .map(|&[x, y, z]| Point3::new(x, y, z))
    }

    /// Resolve face `face` into a [`Triangle`].
    ///
    /// Returns `None` if the face does not exist or references a vertex
    /// that does not exist.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<Triangle> {
        let [a, b, c] = *self.faces.get(face)?;
        Some(Triangle::new(self.point(a)?, self.point(b)?, self.point(c)?))
    }

    /// Whether every face index addresses an existing vertex.
    #[must_use]
    pub fn indices_in_range(&self) -> bool {
        self.faces
            .iter()
            .flatten()
            .all(|&i| usize::try_from(i).is_ok_and(|i| i < self.vertices.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_index_has_no_point() {
        let soup = TriangleSoup::from_parts(vec![[0.0; 3]], vec![[0, -1, 0]]);
        assert!(soup.point(-1).is_none());
        assert!(soup.triangle(0).is_none());
        assert!(!soup.indices_in_range());
    }

    #[test]
    fn out_of_range_face() {
        let soup = TriangleSoup::from_parts(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 3]],
        );
        assert!(!soup.indices_in_range());
        assert!(soup.triangle(0).is_none());
    }

    #[test]
    fn empty_soup() {
        assert!(TriangleSoup::new().is_empty());
        let no_faces = TriangleSoup::from_parts(vec![[0.0; 3]], Vec::new());
        assert!(no_faces.is_empty());
    }
}
