//! Isotropic split/collapse/flip/smooth remesher.

// Algorithm uses many indexing operations and similar variable names
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

use std::collections::TryReserveError;

use hashbrown::{HashMap, HashSet};
use mesh_types::{FaceIndex, Point3, Triangle, TriangleSoup, Vector3};
use tracing::debug;

use crate::contract::{RemeshRequest, UniformRemesher};
use crate::error::{RemeshFault, RemeshResult};
use crate::params::RemeshParams;
use crate::projection::SurfaceProjector;
use crate::result::{RemeshStats, edge_statistics};

/// Faces whose normal is shorter than this are treated as degenerate.
const DEGENERATE_AREA: f64 = 1e-14;

/// Remesher that drives edge lengths toward a target with local operations.
///
/// Each pass:
/// 1. splits edges longer than `4/3 * target` at their midpoint,
/// 2. collapses edges shorter than `4/5 * target`,
/// 3. flips interior edges that violate the Delaunay angle criterion,
/// 4. relaxes vertices tangentially, optionally snapping them back onto the
///    input surface.
///
/// Pinned vertices keep their position and are never collapsed away. Edges
/// between pinned vertices are still split and flipped; the midpoint of a
/// split border edge with both ends pinned is pinned too, so the border
/// keeps its shape. A pass that changes no connectivity ends the run early.
///
/// # Example
///
/// ```
/// use mesh_types::TriangleSoup;
/// use mesh_remesh::{IsotropicRemesher, RemeshRequest, UniformRemesher};
///
/// let soup = TriangleSoup::from_parts(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.866, 0.0]],
///     vec![[0, 1, 2]],
/// );
/// let pinned = [0, 1, 2];
/// let request = RemeshRequest::new(soup, 0.25, 5).with_pinned(&pinned);
///
/// let remeshed = IsotropicRemesher::new().remesh(request)?;
/// assert!(remeshed.face_count() > 1);
/// assert!(remeshed.indices_in_range());
/// # Ok::<(), mesh_remesh::RemeshFault>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct IsotropicRemesher {
    params: RemeshParams,
}

impl IsotropicRemesher {
    /// Create a remesher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a remesher with the given parameters.
    #[must_use]
    pub const fn with_params(params: RemeshParams) -> Self {
        Self { params }
    }

    /// The remesher's parameters.
    #[must_use]
    pub const fn params(&self) -> &RemeshParams {
        &self.params
    }

    /// Remesh and report what was done.
    ///
    /// Faces that repeat a vertex are dropped before the first pass. With
    /// `iterations == 0` the soup is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RemeshFault::Runtime`] if the target length is not positive
    /// and finite, a face or pinned index is out of range, or a coordinate
    /// is not finite. Returns [`RemeshFault::OutOfMemory`] if the mesh would
    /// exceed [`RemeshParams::max_faces`] or an allocation fails.
    pub fn remesh_with_stats(
        &self,
        request: RemeshRequest<'_>,
    ) -> RemeshResult<(TriangleSoup, RemeshStats)> {
        let RemeshRequest {
            soup,
            target_edge_length: target,
            iterations,
            pinned,
            project_to_surface,
        } = request;

        if !(target.is_finite() && target > 0.0) {
            return Err(RemeshFault::runtime(format!(
                "target edge length must be positive and finite, got {target}"
            )));
        }
        validate_soup(&soup, pinned)?;

        let original_edge_stats = edge_statistics(&soup);
        let mut stats = RemeshStats {
            original_faces: soup.face_count(),
            original_vertices: soup.vertex_count(),
            original_edge_stats,
            ..RemeshStats::default()
        };

        if iterations == 0 {
            stats.final_faces = stats.original_faces;
            stats.final_vertices = stats.original_vertices;
            stats.final_edge_stats = original_edge_stats;
            return Ok((soup, stats));
        }

        if soup.face_count() > self.params.max_faces {
            return Err(RemeshFault::out_of_memory(format!(
                "loading {} faces (budget {})",
                soup.face_count(),
                self.params.max_faces
            )));
        }

        debug!(
            "Remeshing: {} faces, {} vertices, target length: {:.4}, {} iterations, {} pinned",
            stats.original_faces,
            stats.original_vertices,
            target,
            iterations,
            pinned.map_or(0, <[FaceIndex]>::len)
        );

        let projector = project_to_surface.then(|| {
            let triangles = (0..soup.face_count())
                .filter_map(|f| soup.triangle(f))
                .collect();
            SurfaceProjector::new(triangles, original_edge_stats.avg_length)
        });

        let mut mesh = WorkingMesh::from_soup(&soup, pinned)?;
        drop(soup);

        let max_sq = self.params.max_edge_length(target).powi(2);
        let min_sq = self.params.min_edge_length(target).powi(2);

        for iter in 0..iterations {
            let splits = if self.params.enable_split {
                mesh.split_long_edges(max_sq, self.params.max_faces)?
            } else {
                0
            };
            let collapses = if self.params.enable_collapse {
                mesh.collapse_short_edges(min_sq, max_sq)
            } else {
                0
            };
            let flips = if self.params.enable_flip {
                mesh.flip_edges()
            } else {
                0
            };
            if self.params.enable_smooth {
                mesh.smooth_tangential(self.params.smoothing_factor);
            }
            if let Some(projector) = &projector {
                mesh.project(projector);
            }
            mesh.compact();

            stats.iterations_performed = iter + 1;
            stats.splits_performed += splits;
            stats.collapses_performed += collapses;
            stats.flips_performed += flips;

            debug!(
                "Iteration {}: {} splits, {} collapses, {} flips, {} faces",
                iter + 1,
                splits,
                collapses,
                flips,
                mesh.live_faces
            );

            if splits == 0 && collapses == 0 && flips == 0 {
                debug!("Converged at iteration {}", iter + 1);
                break;
            }
        }

        let output = mesh.into_soup()?;
        stats.final_faces = output.face_count();
        stats.final_vertices = output.vertex_count();
        stats.final_edge_stats = edge_statistics(&output);
        Ok((output, stats))
    }
}

impl UniformRemesher for IsotropicRemesher {
    fn remesh(&self, request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
        let (soup, stats) = self.remesh_with_stats(request)?;
        debug!("{stats}");
        Ok(soup)
    }
}

fn validate_soup(soup: &TriangleSoup, pinned: Option<&[FaceIndex]>) -> RemeshResult<()> {
    let n = soup.vertex_count();
    let in_range = |v: FaceIndex| usize::try_from(v).is_ok_and(|v| v < n);

    for (fi, face) in soup.faces.iter().enumerate() {
        if let Some(&v) = face.iter().find(|&&v| !in_range(v)) {
            return Err(RemeshFault::runtime(format!(
                "face {fi} references vertex {v} of {n}"
            )));
        }
    }
    if let Some(vi) = soup
        .vertices
        .iter()
        .position(|p| p.iter().any(|c| !c.is_finite()))
    {
        return Err(RemeshFault::runtime(format!(
            "vertex {vi} has a non-finite coordinate"
        )));
    }
    if let Some(&v) = pinned.and_then(|p| p.iter().find(|&&v| !in_range(v))) {
        return Err(RemeshFault::runtime(format!(
            "pinned vertex {v} is out of range for {n} vertices"
        )));
    }
    Ok(())
}

#[inline]
const fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Boundary flags after `gone` was merged into `keep`.
///
/// A collapse that passes the link condition leaves every other vertex's
/// border status alone; the merged vertex is on the border if either
/// endpoint was.
#[inline]
fn merge_boundary(boundary: &mut [bool], keep: usize, gone: usize) {
    boundary[keep] = boundary[keep] || boundary[gone];
    boundary[gone] = false;
}

/// Angle at `b` in triangle `abc`.
fn angle_at(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let len = ba.norm() * bc.norm();
    if len < 1e-20 {
        return 0.0;
    }
    (ba.dot(&bc) / len).clamp(-1.0, 1.0).acos()
}

/// Indexed mesh with vertex-to-face incidence, edited in place.
///
/// Dead faces and removed vertices stay in the arrays until [`compact`]
/// drops them.
///
/// [`compact`]: WorkingMesh::compact
struct WorkingMesh {
    positions: Vec<Point3<f64>>,
    pinned: Vec<bool>,
    removed: Vec<bool>,
    faces: Vec<[usize; 3]>,
    alive: Vec<bool>,
    vertex_faces: Vec<Vec<usize>>,
    live_faces: usize,
}

impl WorkingMesh {
    fn from_soup(soup: &TriangleSoup, pinned: Option<&[FaceIndex]>) -> RemeshResult<Self> {
        let n = soup.vertex_count();

        let mut positions = Vec::new();
        positions
            .try_reserve_exact(n)
            .map_err(|e| RemeshFault::from_reserve("loading vertices", &e))?;
        positions.extend(soup.vertices.iter().map(|&[x, y, z]| Point3::new(x, y, z)));

        let mut pinned_flags = vec![false; n];
        for &v in pinned.unwrap_or_default() {
            if let Ok(v) = usize::try_from(v) {
                pinned_flags[v] = true;
            }
        }

        let mut faces = Vec::new();
        faces
            .try_reserve_exact(soup.face_count())
            .map_err(|e| RemeshFault::from_reserve("loading faces", &e))?;
        let mut dropped = 0usize;
        for face in &soup.faces {
            let [a, b, c] = face.map(|v| usize::try_from(v).unwrap_or_default());
            if a == b || b == c || c == a {
                dropped += 1;
                continue;
            }
            faces.push([a, b, c]);
        }
        if dropped > 0 {
            debug!("Dropped {} faces with repeated vertices", dropped);
        }

        let mut mesh = Self {
            positions,
            pinned: pinned_flags,
            removed: vec![false; n],
            alive: vec![true; faces.len()],
            live_faces: faces.len(),
            faces,
            vertex_faces: Vec::new(),
        };
        mesh.rebuild_incidence();
        Ok(mesh)
    }

    fn rebuild_incidence(&mut self) {
        self.vertex_faces = vec![Vec::new(); self.positions.len()];
        for (fi, face) in self.faces.iter().enumerate() {
            if self.alive[fi] {
                for &v in face {
                    self.vertex_faces[v].push(fi);
                }
            }
        }
    }

    fn length_sq(&self, a: usize, b: usize) -> f64 {
        (self.positions[b] - self.positions[a]).norm_squared()
    }

    /// Live faces containing both `a` and `b`.
    fn faces_of_edge(&self, a: usize, b: usize) -> Vec<usize> {
        self.vertex_faces[a]
            .iter()
            .copied()
            .filter(|&fi| self.faces[fi].contains(&b))
            .collect()
    }

    /// Distinct vertices sharing a face with `v`.
    fn neighbors(&self, v: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self.vertex_faces[v]
            .iter()
            .flat_map(|&fi| self.faces[fi])
            .filter(|&u| u != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Unique live edges, each reported once with its squared length.
    fn edges(&self) -> Vec<((usize, usize), f64)> {
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(self.live_faces * 2);
        let mut out = Vec::with_capacity(self.live_faces * 2);
        for (fi, face) in self.faces.iter().enumerate() {
            if !self.alive[fi] {
                continue;
            }
            for i in 0..3 {
                let key = edge_key(face[i], face[(i + 1) % 3]);
                if seen.insert(key) {
                    out.push((key, self.length_sq(key.0, key.1)));
                }
            }
        }
        out
    }

    /// Vertices touching an edge used by exactly one live face.
    fn boundary_vertices(&self) -> Vec<bool> {
        let mut uses: HashMap<(usize, usize), u32> = HashMap::with_capacity(self.live_faces * 2);
        for (fi, face) in self.faces.iter().enumerate() {
            if !self.alive[fi] {
                continue;
            }
            for i in 0..3 {
                *uses.entry(edge_key(face[i], face[(i + 1) % 3])).or_insert(0) += 1;
            }
        }
        let mut flags = vec![false; self.positions.len()];
        for ((a, b), count) in uses {
            if count == 1 {
                flags[a] = true;
                flags[b] = true;
            }
        }
        flags
    }

    fn face_normal(&self, face: [usize; 3], moved: Option<(usize, Point3<f64>)>) -> Vector3<f64> {
        let pos = |v: usize| match moved {
            Some((m, p)) if m == v => p,
            _ => self.positions[v],
        };
        Triangle::new(pos(face[0]), pos(face[1]), pos(face[2])).normal_unnormalized()
    }

    // ========================================================================
    // Split
    // ========================================================================

    fn split_long_edges(&mut self, max_sq: f64, max_faces: usize) -> RemeshResult<usize> {
        let mut candidates: Vec<((usize, usize), f64)> = self
            .edges()
            .into_iter()
            .filter(|&(_, len_sq)| len_sq > max_sq)
            .collect();
        candidates.sort_by(|x, y| y.1.total_cmp(&x.1));

        // Bound the growth of a single pass
        let limit = self.live_faces;
        let mut splits = 0;
        for ((a, b), _) in candidates.into_iter().take(limit) {
            let adjacent = self.faces_of_edge(a, b);
            if adjacent.is_empty() {
                continue;
            }
            if self.live_faces + adjacent.len() > max_faces {
                return Err(RemeshFault::out_of_memory(format!(
                    "splitting edges past the budget of {max_faces} faces"
                )));
            }
            self.split_edge(a, b, &adjacent)?;
            splits += 1;
        }
        Ok(splits)
    }

    /// Insert the midpoint of `(a, b)` and split every face in `adjacent`
    /// in two, keeping each face's winding.
    ///
    /// The midpoint of a border edge between two pinned vertices is pinned.
    fn split_edge(&mut self, a: usize, b: usize, adjacent: &[usize]) -> RemeshResult<()> {
        let grow = |e: TryReserveError| RemeshFault::from_reserve("splitting edges", &e);
        self.positions.try_reserve(1).map_err(grow)?;
        self.pinned.try_reserve(1).map_err(grow)?;
        self.removed.try_reserve(1).map_err(grow)?;
        self.vertex_faces.try_reserve(1).map_err(grow)?;
        self.faces.try_reserve(adjacent.len()).map_err(grow)?;
        self.alive.try_reserve(adjacent.len()).map_err(grow)?;

        let m = self.positions.len();
        let midpoint = Point3::from((self.positions[a].coords + self.positions[b].coords) * 0.5);
        self.positions.push(midpoint);
        self.pinned
            .push(adjacent.len() == 1 && self.pinned[a] && self.pinned[b]);
        self.removed.push(false);
        self.vertex_faces.push(Vec::with_capacity(adjacent.len() * 2));

        for &fi in adjacent {
            let face = self.faces[fi];
            let Some(k) = (0..3).find(|&k| {
                let (p, q) = (face[k], face[(k + 1) % 3]);
                (p == a && q == b) || (p == b && q == a)
            }) else {
                continue;
            };
            let va = face[k];
            let vb = face[(k + 1) % 3];
            let vc = face[(k + 2) % 3];

            let nf = self.faces.len();
            self.faces[fi] = [va, m, vc];
            self.faces.push([m, vb, vc]);
            self.alive.push(true);
            self.live_faces += 1;

            self.vertex_faces[vb].retain(|&f| f != fi);
            self.vertex_faces[vb].push(nf);
            self.vertex_faces[vc].push(nf);
            self.vertex_faces[m].push(fi);
            self.vertex_faces[m].push(nf);
        }
        Ok(())
    }

    // ========================================================================
    // Collapse
    // ========================================================================

    fn collapse_short_edges(&mut self, min_sq: f64, max_sq: f64) -> usize {
        let mut candidates: Vec<((usize, usize), f64)> = self
            .edges()
            .into_iter()
            .filter(|&((a, b), len_sq)| len_sq < min_sq && !(self.pinned[a] && self.pinned[b]))
            .collect();
        candidates.sort_by(|x, y| x.1.total_cmp(&y.1));

        let mut boundary = self.boundary_vertices();
        let mut collapses = 0;
        for ((a, b), _) in candidates {
            if self.removed[a] || self.removed[b] || self.length_sq(a, b) >= min_sq {
                continue;
            }
            let adjacent = self.faces_of_edge(a, b);
            if adjacent.is_empty() {
                continue;
            }
            // An interior edge joining two boundary vertices would pinch.
            if adjacent.len() > 1 && boundary[a] && boundary[b] {
                continue;
            }

            let (keep, gone) = if self.pinned[b] { (b, a) } else { (a, b) };
            let target = if self.pinned[keep] {
                self.positions[keep]
            } else {
                Point3::from((self.positions[keep].coords + self.positions[gone].coords) * 0.5)
            };

            if self.can_collapse(keep, gone, &adjacent, target, max_sq) {
                self.collapse_edge(keep, gone, &adjacent, target);
                merge_boundary(&mut boundary, keep, gone);
                collapses += 1;
            }
        }
        collapses
    }

    fn can_collapse(
        &self,
        keep: usize,
        gone: usize,
        adjacent: &[usize],
        target: Point3<f64>,
        max_sq: f64,
    ) -> bool {
        let opposite: Vec<usize> = adjacent
            .iter()
            .flat_map(|&fi| self.faces[fi])
            .filter(|&v| v != keep && v != gone)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        // Link condition: the endpoints share exactly the opposite vertices.
        let keep_ring = self.neighbors(keep);
        let gone_ring = self.neighbors(gone);
        let common = gone_ring
            .iter()
            .filter(|&&v| keep_ring.binary_search(&v).is_ok())
            .count();
        if common != opposite.len() {
            return false;
        }

        // Opposite vertices must keep at least one face.
        for &c in &opposite {
            if self.vertex_faces[c].iter().all(|fi| adjacent.contains(fi)) {
                return false;
            }
        }

        // No edge of the merged vertex may come out too long.
        if keep_ring
            .iter()
            .chain(&gone_ring)
            .filter(|&&v| v != keep && v != gone)
            .any(|&v| (self.positions[v] - target).norm_squared() > max_sq)
        {
            return false;
        }

        let keep_faces: Vec<[usize; 3]> = self.vertex_faces[keep]
            .iter()
            .filter(|&&fi| !adjacent.contains(&fi))
            .map(|&fi| {
                let mut f = self.faces[fi];
                f.sort_unstable();
                f
            })
            .collect();

        for &fi in self.vertex_faces[keep].iter().chain(&self.vertex_faces[gone]) {
            if adjacent.contains(&fi) {
                continue;
            }
            let face = self.faces[fi];
            let merged = face.map(|v| if v == gone { keep } else { v });

            // Duplicate face
            if face.contains(&gone) {
                let mut sorted = merged;
                sorted.sort_unstable();
                if keep_faces.contains(&sorted) {
                    return false;
                }
            }

            let before = self.face_normal(face, None);
            let after = self.face_normal(merged, Some((keep, target)));
            if after.norm() < DEGENERATE_AREA || before.dot(&after) <= 0.0 {
                return false;
            }
        }
        true
    }

    fn collapse_edge(&mut self, keep: usize, gone: usize, adjacent: &[usize], target: Point3<f64>) {
        for &fi in adjacent {
            self.alive[fi] = false;
            self.live_faces -= 1;
            for v in self.faces[fi] {
                self.vertex_faces[v].retain(|&f| f != fi);
            }
        }

        let moved = std::mem::take(&mut self.vertex_faces[gone]);
        for &fi in &moved {
            for v in &mut self.faces[fi] {
                if *v == gone {
                    *v = keep;
                }
            }
        }
        self.vertex_faces[keep].extend(moved);
        self.removed[gone] = true;
        self.positions[keep] = target;
    }

    // ========================================================================
    // Flip
    // ========================================================================

    fn flip_edges(&mut self) -> usize {
        let mut edge_faces: HashMap<(usize, usize), Vec<usize>> =
            HashMap::with_capacity(self.live_faces * 2);
        for (fi, face) in self.faces.iter().enumerate() {
            if !self.alive[fi] {
                continue;
            }
            for i in 0..3 {
                edge_faces
                    .entry(edge_key(face[i], face[(i + 1) % 3]))
                    .or_default()
                    .push(fi);
            }
        }

        let mut keys: Vec<(usize, usize)> = edge_faces
            .iter()
            .filter(|(_, adj)| adj.len() == 2)
            .map(|(&key, _)| key)
            .collect();
        keys.sort_unstable();

        let mut touched = vec![false; self.faces.len()];
        let mut flips = 0;
        for (a, b) in keys {
            let [f0, f1] = [edge_faces[&(a, b)][0], edge_faces[&(a, b)][1]];
            if touched[f0] || touched[f1] {
                continue;
            }
            if self.try_flip(f0, f1, a, b) {
                touched[f0] = true;
                touched[f1] = true;
                flips += 1;
            }
        }
        flips
    }

    fn try_flip(&mut self, f0: usize, f1: usize, a: usize, b: usize) -> bool {
        let face0 = self.faces[f0];
        let face1 = self.faces[f1];

        // Orient the edge as it runs in `f0`: f0 = [p, q, c].
        let Some(k) = (0..3).find(|&k| {
            let (p, q) = (face0[k], face0[(k + 1) % 3]);
            (p == a && q == b) || (p == b && q == a)
        }) else {
            return false;
        };
        let p = face0[k];
        let q = face0[(k + 1) % 3];
        let c = face0[(k + 2) % 3];

        // f1 must run q -> p for a consistent winding.
        let Some(j) = (0..3).find(|&j| face1[j] == q && face1[(j + 1) % 3] == p) else {
            return false;
        };
        let d = face1[(j + 2) % 3];
        if c == d || !self.faces_of_edge(c, d).is_empty() {
            return false;
        }

        let (pp, pq, pc, pd) = (
            &self.positions[p],
            &self.positions[q],
            &self.positions[c],
            &self.positions[d],
        );
        if angle_at(pp, pc, pq) + angle_at(pp, pd, pq) <= std::f64::consts::PI {
            return false;
        }

        let new0 = [p, d, c];
        let new1 = [d, q, c];
        let reference = self.face_normal(face0, None) + self.face_normal(face1, None);
        let n0 = self.face_normal(new0, None);
        let n1 = self.face_normal(new1, None);
        if n0.norm() < DEGENERATE_AREA
            || n1.norm() < DEGENERATE_AREA
            || n0.dot(&reference) <= 0.0
            || n1.dot(&reference) <= 0.0
        {
            return false;
        }

        self.faces[f0] = new0;
        self.faces[f1] = new1;
        self.vertex_faces[p].retain(|&f| f != f1);
        self.vertex_faces[q].retain(|&f| f != f0);
        self.vertex_faces[c].push(f1);
        self.vertex_faces[d].push(f0);
        true
    }

    // ========================================================================
    // Relocation
    // ========================================================================

    /// Move free interior vertices toward their neighbor centroid within the
    /// tangent plane.
    fn smooth_tangential(&mut self, factor: f64) {
        let boundary = self.boundary_vertices();
        let mut updates: Vec<(usize, Point3<f64>)> = Vec::new();

        for v in 0..self.positions.len() {
            if self.removed[v] || self.pinned[v] || boundary[v] || self.vertex_faces[v].is_empty() {
                continue;
            }
            let ring = self.neighbors(v);
            if ring.is_empty() {
                continue;
            }

            let centroid = ring
                .iter()
                .fold(Vector3::zeros(), |acc, &u| acc + self.positions[u].coords)
                / ring.len() as f64;

            // Area-weighted vertex normal
            let normal = self.vertex_faces[v]
                .iter()
                .fold(Vector3::zeros(), |acc, &fi| acc + self.face_normal(self.faces[fi], None));
            let Some(normal) = normal.try_normalize(DEGENERATE_AREA) else {
                continue;
            };

            let p = self.positions[v];
            let displacement = centroid - p.coords;
            let tangential = displacement - normal * normal.dot(&displacement);
            updates.push((v, p + tangential * factor));
        }

        for (v, p) in updates {
            self.positions[v] = p;
        }
    }

    fn project(&mut self, projector: &SurfaceProjector) {
        for v in 0..self.positions.len() {
            if self.removed[v] || self.pinned[v] || self.vertex_faces[v].is_empty() {
                continue;
            }
            if let Some(p) = projector.closest_point(&self.positions[v]) {
                self.positions[v] = p;
            }
        }
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    /// Drop dead faces and removed vertices, renumbering the rest.
    fn compact(&mut self) {
        let mut remap = vec![usize::MAX; self.positions.len()];
        let mut next = 0;
        for (v, slot) in remap.iter_mut().enumerate() {
            if !self.removed[v] {
                *slot = next;
                next += 1;
            }
        }

        if next != self.positions.len() {
            self.positions = (0..self.positions.len())
                .filter(|&v| !self.removed[v])
                .map(|v| self.positions[v])
                .collect();
            self.pinned = (0..self.pinned.len())
                .filter(|&v| !self.removed[v])
                .map(|v| self.pinned[v])
                .collect();
            self.removed = vec![false; next];
        }

        let faces = std::mem::take(&mut self.faces);
        self.faces = faces
            .into_iter()
            .zip(&self.alive)
            .filter(|&(_, &alive)| alive)
            .map(|(face, _)| face.map(|v| remap[v]))
            .collect();
        self.alive = vec![true; self.faces.len()];
        self.live_faces = self.faces.len();
        self.rebuild_incidence();
    }

    fn into_soup(mut self) -> RemeshResult<TriangleSoup> {
        self.compact();
        let to_index = |v: usize| {
            FaceIndex::try_from(v).map_err(|_| {
                RemeshFault::runtime(format!("vertex index {v} does not fit a face index"))
            })
        };

        let mut faces = Vec::new();
        faces
            .try_reserve_exact(self.faces.len())
            .map_err(|e| RemeshFault::from_reserve("writing faces", &e))?;
        for [a, b, c] in self.faces {
            faces.push([to_index(a)?, to_index(b)?, to_index(c)?]);
        }

        let vertices = self.positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        Ok(TriangleSoup::from_parts(vertices, faces))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn make_triangle() -> TriangleSoup {
        TriangleSoup::from_parts(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.866, 0.0]],
            vec![[0, 1, 2]],
        )
    }

    /// `n x n` quads over the unit square, two triangles each.
    fn make_grid(n: usize) -> TriangleSoup {
        let step = 1.0 / n as f64;
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push([i as f64 * step, j as f64 * step, 0.0]);
            }
        }
        let mut faces = Vec::new();
        let row = n + 1;
        for j in 0..n {
            for i in 0..n {
                let v0 = FaceIndex::try_from(j * row + i).unwrap();
                let v1 = v0 + 1;
                let v2 = v1 + FaceIndex::try_from(row).unwrap();
                let v3 = v0 + FaceIndex::try_from(row).unwrap();
                faces.push([v0, v1, v2]);
                faces.push([v0, v2, v3]);
            }
        }
        TriangleSoup::from_parts(vertices, faces)
    }

    fn make_cube() -> TriangleSoup {
        TriangleSoup::from_parts(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            vec![
                [0, 2, 1],
                [0, 3, 2],
                [4, 5, 6],
                [4, 6, 7],
                [0, 1, 5],
                [0, 5, 4],
                [2, 3, 7],
                [2, 7, 6],
                [0, 4, 7],
                [0, 7, 3],
                [1, 2, 6],
                [1, 6, 5],
            ],
        )
    }

    fn edge_uses(soup: &TriangleSoup) -> HashMap<(FaceIndex, FaceIndex), usize> {
        let mut uses = HashMap::new();
        for face in &soup.faces {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        uses
    }

    fn boundary_of(soup: &TriangleSoup) -> Vec<FaceIndex> {
        let mut out: Vec<FaceIndex> = edge_uses(soup)
            .into_iter()
            .filter(|&(_, n)| n == 1)
            .flat_map(|((a, b), _)| [a, b])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let soup = make_grid(3);
        let (out, stats) = IsotropicRemesher::new()
            .remesh_with_stats(RemeshRequest::new(soup.clone(), 0.1, 0))
            .unwrap();
        assert_eq!(out, soup);
        assert_eq!(stats.iterations_performed, 0);
        assert!(!stats.was_remeshed());
    }

    #[test]
    fn test_invalid_target_length() {
        for target in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = IsotropicRemesher::new().remesh(RemeshRequest::new(make_triangle(), target, 3));
            assert!(matches!(result, Err(RemeshFault::Runtime(_))));
        }
    }

    #[test]
    fn test_out_of_range_face() {
        let mut soup = make_triangle();
        soup.faces.push([0, 1, 3]);
        let result = IsotropicRemesher::new().remesh(RemeshRequest::new(soup, 0.5, 3));
        assert!(matches!(result, Err(RemeshFault::Runtime(msg)) if msg.contains("face 1")));
    }

    #[test]
    fn test_out_of_range_pin() {
        let pinned = [0, 5];
        let request = RemeshRequest::new(make_triangle(), 0.5, 3).with_pinned(&pinned);
        let result = IsotropicRemesher::new().remesh(request);
        assert!(matches!(result, Err(RemeshFault::Runtime(_))));
    }

    #[test]
    fn test_non_finite_vertex() {
        let mut soup = make_triangle();
        soup.vertices[1][2] = f64::NAN;
        let result = IsotropicRemesher::new().remesh(RemeshRequest::new(soup, 0.5, 3));
        assert!(matches!(result, Err(RemeshFault::Runtime(_))));
    }

    #[test]
    fn test_refines_large_triangle() {
        let (out, stats) = IsotropicRemesher::new()
            .remesh_with_stats(RemeshRequest::new(make_triangle(), 0.2, 5))
            .unwrap();
        assert!(out.face_count() > 1);
        assert!(out.indices_in_range());
        assert!(stats.splits_performed > 0);
        assert!(stats.final_edge_stats.max_length < stats.original_edge_stats.max_length);
    }

    #[test]
    fn test_coarsens_dense_grid() {
        let soup = make_grid(16);
        let original = soup.face_count();
        let out = IsotropicRemesher::new()
            .remesh(RemeshRequest::new(soup, 0.25, 10))
            .unwrap();
        assert!(out.face_count() < original);
        assert!(out.indices_in_range());
    }

    #[test]
    fn test_pinned_vertices_survive() {
        let soup = make_grid(4);
        let pinned = boundary_of(&soup);
        let pinned_positions: Vec<[f64; 3]> = pinned
            .iter()
            .map(|&v| soup.vertices[usize::try_from(v).unwrap()])
            .collect();

        let request = RemeshRequest::new(soup, 0.4, 8).with_pinned(&pinned);
        let out = IsotropicRemesher::new().remesh(request).unwrap();

        for p in pinned_positions {
            assert!(
                out.vertices.contains(&p),
                "pinned vertex {p:?} moved or vanished"
            );
        }
    }

    /// `1 x n` strip of unit squares: every vertex is on the border.
    fn make_strip(n: usize) -> TriangleSoup {
        let mut vertices = Vec::new();
        for i in 0..=n {
            vertices.push([i as f64, 0.0, 0.0]);
            vertices.push([i as f64, 1.0, 0.0]);
        }
        let mut faces = Vec::new();
        for i in 0..n {
            let v0 = FaceIndex::try_from(2 * i).unwrap();
            faces.push([v0, v0 + 2, v0 + 3]);
            faces.push([v0, v0 + 3, v0 + 1]);
        }
        TriangleSoup::from_parts(vertices, faces)
    }

    #[test]
    fn test_fully_pinned_strip_is_refined() {
        let soup = make_strip(4);
        let pinned = boundary_of(&soup);
        assert_eq!(pinned.len(), soup.vertex_count());
        let corners = soup.vertices.clone();

        let request = RemeshRequest::new(soup, 0.1, 10).with_pinned(&pinned);
        let (out, stats) = IsotropicRemesher::new().remesh_with_stats(request).unwrap();

        assert!(out.face_count() > 8);
        assert!(out.indices_in_range());
        assert!(stats.final_edge_stats.max_length < 0.5);
        for p in &corners {
            assert!(out.vertices.contains(p), "pinned vertex {p:?} moved or vanished");
        }

        // Border vertices stay on the original outline.
        for v in boundary_of(&out) {
            let [x, y, z] = out.vertices[usize::try_from(v).unwrap()];
            let on_outline = x.abs() < 1e-12
                || (x - 4.0).abs() < 1e-12
                || y.abs() < 1e-12
                || (y - 1.0).abs() < 1e-12;
            assert!(on_outline && z == 0.0, "border vertex ({x}, {y}, {z}) left the outline");
        }
    }

    #[test]
    fn test_split_pins_border_midpoint_only() {
        let soup = make_strip(1);
        let pinned = [0, 1, 2, 3];
        let mut mesh = WorkingMesh::from_soup(&soup, Some(&pinned)).unwrap();

        // Border edge 0-2
        let border = mesh.faces_of_edge(0, 2);
        mesh.split_edge(0, 2, &border).unwrap();
        // Interior diagonal 0-3
        let interior = mesh.faces_of_edge(0, 3);
        assert_eq!(interior.len(), 2);
        mesh.split_edge(0, 3, &interior).unwrap();

        assert_eq!(mesh.pinned[4..], [true, false]);
        assert_eq!(mesh.live_faces, 5);
    }

    #[test]
    fn test_boundary_flags_follow_collapse() {
        let soup = make_grid(3);
        let mut mesh = WorkingMesh::from_soup(&soup, None).unwrap();
        let mut boundary = mesh.boundary_vertices();
        assert!(boundary[1] && !boundary[5]);

        // Merge border vertex 1 into interior vertex 5
        let adjacent = mesh.faces_of_edge(5, 1);
        assert_eq!(adjacent.len(), 2);
        let target = mesh.positions[5];
        mesh.collapse_edge(5, 1, &adjacent, target);
        merge_boundary(&mut boundary, 5, 1);

        assert!(boundary[5]);
        assert_eq!(boundary, mesh.boundary_vertices());
    }

    #[test]
    fn test_closed_mesh_stays_closed() {
        let out = IsotropicRemesher::new()
            .remesh(RemeshRequest::new(make_cube(), 0.3, 5))
            .unwrap();
        assert!(out.face_count() > 12);
        assert!(edge_uses(&out).values().all(|&n| n == 2));
    }

    #[test]
    fn test_projection_keeps_plane() {
        let request = RemeshRequest::new(make_grid(3), 0.15, 4).with_projection(true);
        let out = IsotropicRemesher::new().remesh(request).unwrap();
        assert!(out.vertices.iter().all(|p| p[2].abs() < 1e-9));
    }

    #[test]
    fn test_face_budget_is_out_of_memory() {
        let remesher = IsotropicRemesher::with_params(RemeshParams::new().with_max_faces(8));
        let result = remesher.remesh(RemeshRequest::new(make_triangle(), 0.01, 5));
        assert!(matches!(result, Err(RemeshFault::OutOfMemory { .. })));
    }

    #[test]
    fn test_repeated_vertex_faces_dropped() {
        let mut soup = make_triangle();
        soup.faces.push([0, 0, 1]);
        let (out, _) = IsotropicRemesher::new()
            .remesh_with_stats(RemeshRequest::new(soup, 10.0, 1))
            .unwrap();
        assert!(out.faces.iter().all(|f| f[0] != f[1] && f[1] != f[2] && f[2] != f[0]));
    }

    #[test]
    fn test_disabled_operations() {
        let params = RemeshParams::new()
            .with_split(false)
            .with_collapse(false)
            .with_flip(false)
            .with_smooth(false);
        let soup = make_grid(2);
        let (out, stats) = IsotropicRemesher::with_params(params)
            .remesh_with_stats(RemeshRequest::new(soup.clone(), 0.01, 5))
            .unwrap();
        assert_eq!(out, soup);
        assert_eq!(stats.iterations_performed, 1);
    }

    #[test]
    fn test_flip_fixes_bad_diagonal() {
        // Thin rhombus split along its long diagonal
        let soup = TriangleSoup::from_parts(
            vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 0.3, 0.0], [2.0, -0.3, 0.0]],
            vec![[0, 1, 2], [1, 0, 3]],
        );
        let mut mesh = WorkingMesh::from_soup(&soup, None).unwrap();
        assert_eq!(mesh.flip_edges(), 1);
        assert!(!mesh.faces_of_edge(2, 3).is_empty());
        assert!(mesh.faces_of_edge(0, 1).is_empty());
    }

    #[test]
    fn test_collapse_rejects_tetrahedron() {
        let soup = TriangleSoup::from_parts(
            vec![[0.0, 0.0, 0.0], [0.1, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        );
        let mut mesh = WorkingMesh::from_soup(&soup, None).unwrap();
        assert_eq!(mesh.collapse_short_edges(0.5, 100.0), 0);
        assert_eq!(mesh.live_faces, 4);
    }
}
