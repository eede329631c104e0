//! Conversion from a [`PolyMesh`] to flat remesher input.

use mesh_types::{CellId, FaceIndex, PolyMesh, TriangleSoup};
use tracing::debug;

use crate::error::{FilterError, FilterResult};

/// Copy a mesh's points and triangle cells into a [`TriangleSoup`].
///
/// Points are copied verbatim and in order; cell `i` becomes face `i`. The
/// input is not modified.
///
/// # Errors
///
/// - [`FilterError::UnsupportedTopology`] for the first cell that is not a
///   triangle.
/// - [`FilterError::IndexRange`] for the first point index that is negative,
///   larger than a [`FaceIndex`] can hold, or not an existing point.
/// - [`FilterError::TraversalIntegrity`] if the cell array declares more
///   cells than can be traversed.
///
/// # Example
///
/// ```
/// use mesh_types::{PolyMesh, Point3};
/// use mesh_uniform_remesh::ingest;
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
/// let soup = ingest(&mesh)?;
/// assert_eq!(soup.vertices[1], [1.0, 0.0, 0.0]);
/// assert_eq!(soup.faces, vec![[0, 1, 2]]);
/// # Ok::<(), mesh_uniform_remesh::FilterError>(())
/// ```
pub fn ingest(mesh: &PolyMesh) -> FilterResult<TriangleSoup> {
    let declared = mesh.polys.cell_count();
    let max_index = largest_valid_index(mesh.point_count());

    let vertices: Vec<[f64; 3]> = mesh.points.iter().map(|p| [p.x, p.y, p.z]).collect();

    let mut faces: Vec<[FaceIndex; 3]> = Vec::with_capacity(declared);
    for (cell, ids) in mesh.polys.iter().enumerate() {
        let &[a, b, c] = ids else {
            return Err(FilterError::UnsupportedTopology {
                cell,
                vertex_count: ids.len(),
            });
        };
        faces.push([
            to_face_index(cell, a, max_index)?,
            to_face_index(cell, b, max_index)?,
            to_face_index(cell, c, max_index)?,
        ]);
    }

    if faces.len() != declared {
        return Err(FilterError::TraversalIntegrity {
            declared,
            visited: faces.len(),
        });
    }

    debug!(
        "Ingested {} points and {} triangles",
        vertices.len(),
        faces.len()
    );
    Ok(TriangleSoup::from_parts(vertices, faces))
}

/// Largest index that both addresses a point and fits a [`FaceIndex`].
/// Negative when there are no points.
fn largest_valid_index(point_count: usize) -> i64 {
    let last = i64::try_from(point_count).unwrap_or(i64::MAX) - 1;
    last.min(i64::from(FaceIndex::MAX))
}

fn to_face_index(cell: usize, id: CellId, max: i64) -> FilterResult<FaceIndex> {
    if !(0..=max).contains(&id) {
        return Err(FilterError::IndexRange {
            cell,
            index: id,
            max,
        });
    }
    FaceIndex::try_from(id).map_err(|_| FilterError::IndexRange {
        cell,
        index: id,
        max,
    })
}
