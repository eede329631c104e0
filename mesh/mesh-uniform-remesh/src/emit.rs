//! Building the output [`PolyMesh`] from remeshed arrays.

use mesh_types::{CellArray, CellId, Point3, PolyMesh, TriangleSoup};
use tracing::debug;

/// Build the output mesh: one point per vertex row and one triangle cell
/// per face row, both verbatim and in order.
///
/// Point and cell data are left empty because the remesher does not carry
/// per-element attributes across. Field data is copied from `source`.
///
/// # Example
///
/// ```
/// use mesh_types::{DataArray, TriangleSoup, unit_cube};
/// use mesh_uniform_remesh::emit;
///
/// let mut source = unit_cube();
/// source.field_data.add_array(DataArray::scalars("id", vec![7.0]));
///
/// let soup = TriangleSoup::from_parts(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
///     vec![[0, 1, 2]],
/// );
/// let mesh = emit(&soup, &source);
///
/// assert_eq!(mesh.point_count(), 3);
/// assert_eq!(mesh.cell_count(), 1);
/// assert_eq!(mesh.field_data, source.field_data);
/// ```
#[must_use]
pub fn emit(soup: &TriangleSoup, source: &PolyMesh) -> PolyMesh {
    let points: Vec<Point3<f64>> = soup
        .vertices
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();

    let mut polys = CellArray::with_capacity(soup.face_count(), 3);
    for face in &soup.faces {
        polys.push_cell(&face.map(CellId::from));
    }

    let mut mesh = PolyMesh::from_parts(points, polys);
    mesh.field_data = source.field_data.clone();

    debug!(
        "Emitted {} points and {} triangles",
        mesh.point_count(),
        mesh.cell_count()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{DataArray, unit_cube};

    fn soup() -> TriangleSoup {
        TriangleSoup::from_parts(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_counts_and_order() {
        let soup = soup();
        let mesh = emit(&soup, &PolyMesh::new());

        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.cell_count(), 2);
        assert_eq!(mesh.points[2], Point3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.polys.cell(1), Some([0, 2, 3].as_slice()));
    }

    #[test]
    fn test_attribute_data() {
        let mut source = unit_cube();
        source
            .point_data
            .add_array(DataArray::scalars("temperature", vec![1.0; 8]));
        source
            .cell_data
            .add_array(DataArray::scalars("region", vec![2.0; 12]));
        source
            .field_data
            .add_array(DataArray::scalars("scan_id", vec![42.0]));

        let mesh = emit(&soup(), &source);
        assert!(mesh.point_data.is_empty());
        assert!(mesh.cell_data.is_empty());
        assert_eq!(mesh.field_data, source.field_data);
    }

    #[test]
    fn test_empty_soup() {
        let mesh = emit(&TriangleSoup::new(), &PolyMesh::new());
        assert!(mesh.is_empty());
        assert_eq!(mesh.polys.cell_count(), 0);
    }
}
