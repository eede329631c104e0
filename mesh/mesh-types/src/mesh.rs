//! Polygonal boundary-representation mesh.

use crate::{Aabb, AttributeData, CellArray, CellId, FieldData};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polygonal surface mesh as exchanged with visualization pipelines.
///
/// Holds an ordered point list, an ordered list of polygon cells indexing
/// into it, per-point and per-cell attribute arrays, and whole-mesh field
/// data. Cells may have any number of points; algorithms that need
/// triangles check for themselves.
///
/// # Example
///
/// ```
/// use mesh_types::{PolyMesh, Point3};
///
/// let mesh = PolyMesh::from_triangles(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     &[[0, 1, 2]],
/// );
///
/// assert_eq!(mesh.point_count(), 3);
/// assert_eq!(mesh.cell_count(), 1);
/// assert!(!mesh.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolyMesh {
    /// Point coordinates. A point's index is its identity.
    pub points: Vec<Point3<f64>>,

    /// Polygon cells referencing `points` by index.
    pub polys: CellArray,

    /// Per-point attribute arrays.
    pub point_data: AttributeData,

    /// Per-cell attribute arrays.
    pub cell_data: AttributeData,

    /// Whole-mesh metadata.
    pub field_data: FieldData,
}

impl PolyMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from points and polygon cells, with no attribute data.
    #[must_use]
    pub fn from_parts(points: Vec<Point3<f64>>, polys: CellArray) -> Self {
        Self {
            points,
            polys,
            ..Self::default()
        }
    }

    /// Create a triangle mesh from points and index triples.
    #[must_use]
    pub fn from_triangles(points: Vec<Point3<f64>>, triangles: &[[CellId; 3]]) -> Self {
        Self::from_parts(points, CellArray::from_triangles(triangles))
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of polygon cells the cell array declares.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.polys.cell_count()
    }

    /// Whether the mesh has no points or no cells, i.e. no surface.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.polys.is_empty()
    }

    /// Bounding box of all points.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter())
    }

    /// Reset to an empty mesh, dropping points, cells and all data.
    pub fn initialize(&mut self) {
        *self = Self::default();
    }
}

/// Create a closed unit cube `[0, 1]^3` made of 12 triangles.
///
/// Faces wind counter-clockwise when viewed from outside.
///
/// ```
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.point_count(), 8);
/// assert_eq!(cube.cell_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> PolyMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];

    PolyMesh::from_triangles(
        points,
        &[
            // Bottom (z=0)
            [0, 2, 1],
            [0, 3, 2],
            // Top (z=1)
            [4, 5, 6],
            [4, 6, 7],
            // Front (y=0)
            [0, 1, 5],
            [0, 5, 4],
            // Back (y=1)
            [3, 7, 6],
            [3, 6, 2],
            // Left (x=0)
            [0, 4, 7],
            [0, 7, 3],
            // Right (x=1)
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataArray;

    #[test]
    fn empty_without_cells() {
        let mut mesh = PolyMesh::new();
        assert!(mesh.is_empty());

        mesh.points.push(Point3::new(0.0, 0.0, 0.0));
        assert!(mesh.is_empty());

        mesh.polys.push_cell(&[0, 0, 0]);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn cube_bounds() {
        let cube = unit_cube();
        let bounds = cube.bounds();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn cube_cells_are_triangles() {
        let cube = unit_cube();
        assert!(cube.polys.iter().all(|cell| cell.len() == 3));
    }

    #[test]
    fn initialize_drops_everything() {
        let mut mesh = unit_cube();
        mesh.field_data.add_array(DataArray::scalars("scan_id", vec![7.0]));
        mesh.initialize();
        assert_eq!(mesh, PolyMesh::new());
    }

    #[cfg(feature = "serde")]
    #[test]
    #[allow(clippy::unwrap_used)]
    fn serde_keeps_cells_and_fields() {
        let mut mesh = unit_cube();
        mesh.field_data.add_array(DataArray::scalars("scan_id", vec![7.0]));

        let json = serde_json::to_string(&mesh).unwrap();
        let back: PolyMesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }
}
