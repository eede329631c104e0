//! Closest-point projection onto a reference surface.

// Grid coordinates are small integers derived from finite coordinates
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use hashbrown::HashMap;
use mesh_types::{Aabb, Point3, Triangle};

/// Cell key of the uniform grid.
type CellKey = (i64, i64, i64);

/// Triangles whose bounding box covers more cells than this are kept in a
/// separate list that every query scans.
const MAX_CELLS_PER_TRIANGLE: i64 = 64;

/// Uniform-grid index over a fixed set of triangles for closest-point
/// queries.
///
/// Each triangle is binned into every cell its bounding box overlaps, unless
/// that is more than a few dozen cells; such triangles are checked by every
/// query instead. A query walks cubic shells of cells around the query
/// point and stops once no unvisited cell can hold anything closer than the
/// best hit so far.
#[derive(Debug, Clone)]
pub struct SurfaceProjector {
    triangles: Vec<Triangle>,
    cells: HashMap<CellKey, Vec<usize>>,
    oversized: Vec<usize>,
    origin: Point3<f64>,
    cell_size: f64,
    dims: [i64; 3],
}

impl SurfaceProjector {
    /// Index `triangles` with cells of edge at least `cell_size`.
    ///
    /// The cell edge is raised to `max_extent / cbrt(n)` for `n` triangles,
    /// so the grid never has many more cells than there are triangles. A
    /// non-positive or non-finite `cell_size` falls back to that floor.
    #[must_use]
    pub fn new(triangles: Vec<Triangle>, cell_size: f64) -> Self {
        let bounds = Aabb::from_points(triangles.iter().flat_map(|t| [&t.v0, &t.v1, &t.v2]));
        let extent = if bounds.is_empty() {
            1.0
        } else {
            bounds.max_extent()
        };
        let floor = extent / (triangles.len().max(1) as f64).cbrt();
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size.max(floor)
        } else {
            floor
        };
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let origin = if bounds.is_empty() {
            Point3::origin()
        } else {
            bounds.min
        };

        let mut projector = Self {
            triangles: Vec::new(),
            cells: HashMap::new(),
            oversized: Vec::new(),
            origin,
            cell_size,
            dims: [1, 1, 1],
        };
        if !bounds.is_empty() {
            let top = projector.cell_of(&bounds.max);
            projector.dims = [top.0 + 1, top.1 + 1, top.2 + 1];
        }

        for (ti, tri) in triangles.iter().enumerate() {
            let tri_bounds = Aabb::from_points([&tri.v0, &tri.v1, &tri.v2].into_iter());
            let lo = projector.cell_of(&tri_bounds.min);
            let hi = projector.cell_of(&tri_bounds.max);
            let covered = (hi.0 - lo.0 + 1) * (hi.1 - lo.1 + 1) * (hi.2 - lo.2 + 1);
            if covered > MAX_CELLS_PER_TRIANGLE {
                projector.oversized.push(ti);
                continue;
            }
            for ix in lo.0..=hi.0 {
                for iy in lo.1..=hi.1 {
                    for iz in lo.2..=hi.2 {
                        projector.cells.entry((ix, iy, iz)).or_default().push(ti);
                    }
                }
            }
        }
        projector.triangles = triangles;
        projector
    }

    /// Number of indexed triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Closest point on the indexed surface to `point`, or `None` when no
    /// triangles are indexed.
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Option<Point3<f64>> {
        if self.triangles.is_empty() {
            return None;
        }

        let center = self.cell_of(point);
        let max_ring = self.max_ring(center);

        let mut best: Option<(f64, Point3<f64>)> = None;
        for &ti in &self.oversized {
            self.offer(ti, point, &mut best);
        }
        for ring in 0..=max_ring {
            self.visit_shell(center, ring, |ti| self.offer(ti, point, &mut best));

            // Cells outside this shell are at least `ring` cells away.
            let reach = ring as f64 * self.cell_size;
            if let Some((dist_sq, _)) = best {
                if dist_sq <= reach * reach {
                    break;
                }
            }
        }

        best.map(|(_, p)| p)
    }

    /// Replace `best` with triangle `ti`'s closest point if that is nearer.
    fn offer(&self, ti: usize, point: &Point3<f64>, best: &mut Option<(f64, Point3<f64>)>) {
        let candidate = self.triangles[ti].closest_point(*point);
        let dist_sq = (candidate - point).norm_squared();
        if best.is_none_or(|(d, _)| dist_sq < d) {
            *best = Some((dist_sq, candidate));
        }
    }

    fn cell_of(&self, point: &Point3<f64>) -> CellKey {
        let rel = (point - self.origin) / self.cell_size;
        (
            rel.x.floor() as i64,
            rel.y.floor() as i64,
            rel.z.floor() as i64,
        )
    }

    /// Shell index beyond which no occupied cell exists.
    fn max_ring(&self, center: CellKey) -> i64 {
        let axis = |c: i64, dim: i64| c.abs().max((dim - 1 - c).abs());
        axis(center.0, self.dims[0])
            .max(axis(center.1, self.dims[1]))
            .max(axis(center.2, self.dims[2]))
    }

    /// Call `visit` for every triangle binned in the cells at Chebyshev
    /// distance exactly `ring` from `center`.
    fn visit_shell(&self, center: CellKey, ring: i64, mut visit: impl FnMut(usize)) {
        let (cx, cy, cz) = center;
        let span = |c: i64, dim: i64| (c - ring).max(0)..=(c + ring).min(dim - 1);
        for ix in span(cx, self.dims[0]) {
            for iy in span(cy, self.dims[1]) {
                for iz in span(cz, self.dims[2]) {
                    let on_shell = (ix - cx).abs() == ring
                        || (iy - cy).abs() == ring
                        || (iz - cz).abs() == ring;
                    if !on_shell {
                        continue;
                    }
                    if let Some(tris) = self.cells.get(&(ix, iy, iz)) {
                        for &ti in tris {
                            visit(ti);
                        }
                    }
                }
            }
        }
    }
}
