//! Property-based tests for boundary classification and ingestion.
//!
//! Run with: cargo test -p mesh-uniform-remesh --test proptest_boundary

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation, missing_docs)]

use hashbrown::HashMap;
use mesh_types::{FaceIndex, Point3, PolyMesh};
use mesh_uniform_remesh::{EdgeHistogram, EdgeKey, classify_boundary, ingest};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Random faces over `vertex_count` vertices (repeated vertices allowed).
fn arb_faces(vertex_count: FaceIndex, max_faces: usize) -> impl Strategy<Value = Vec<[FaceIndex; 3]>> {
    prop::collection::vec(prop::array::uniform3(0..vertex_count), 0..=max_faces)
}

/// A vertex count together with faces over it.
fn arb_face_set() -> impl Strategy<Value = (usize, Vec<[FaceIndex; 3]>)> {
    (3..40_i32).prop_flat_map(|n| (Just(n as usize), arb_faces(n, 60)))
}

/// Closed triangulated cylinder of `segments` around, capped with fans.
fn capped_cylinder(segments: FaceIndex) -> (usize, Vec<[FaceIndex; 3]>) {
    let bottom = 2 * segments;
    let top = bottom + 1;
    let mut faces = Vec::new();
    for i in 0..segments {
        let j = (i + 1) % segments;
        let (b0, b1, t0, t1) = (i, j, segments + i, segments + j);
        faces.push([b0, b1, t1]);
        faces.push([b0, t1, t0]);
        faces.push([bottom, b1, b0]);
        faces.push([top, t0, t1]);
    }
    ((2 * segments + 2) as usize, faces)
}

/// Brute-force boundary flags: a vertex is on the boundary if some edge
/// touching it is used by exactly one face.
fn brute_force_flags(vertex_count: usize, faces: &[[FaceIndex; 3]]) -> Vec<bool> {
    let mut uses: HashMap<(FaceIndex, FaceIndex), u32> = HashMap::new();
    for f in faces {
        for (a, b) in [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])] {
            *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    let mut flags = vec![false; vertex_count];
    for (&(a, b), &n) in &uses {
        if n == 1 {
            flags[a as usize] = true;
            flags[b as usize] = true;
        }
    }
    flags
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn edge_key_is_symmetric(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        let (lo, hi) = EdgeKey::new(a, b).endpoints();
        prop_assert!(lo <= hi);
    }

    #[test]
    fn histogram_counts_every_edge_use((_, faces) in arb_face_set()) {
        let histogram = EdgeHistogram::build(&faces);
        let total: u32 = histogram.iter().map(|(_, n)| n).sum();
        prop_assert_eq!(total as usize, faces.len() * 3);
    }

    #[test]
    fn flags_match_brute_force((n, faces) in arb_face_set()) {
        let classification = classify_boundary(&faces, n);
        let expected = brute_force_flags(n, &faces);
        prop_assert_eq!(classification.flags(), expected.as_slice());

        let listed: Vec<FaceIndex> = expected
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(v, _)| v as FaceIndex)
            .collect();
        prop_assert_eq!(classification.vertices(), listed.as_slice());
    }

    #[test]
    fn closed_surfaces_have_no_boundary(segments in 3..24_i32) {
        let (n, faces) = capped_cylinder(segments);
        let classification = classify_boundary(&faces, n);
        prop_assert!(classification.is_closed());
        prop_assert_eq!(classification.vertex_count(), 0);
        prop_assert_eq!(classification.non_manifold_edge_count(), 0);
    }

    #[test]
    fn removing_a_cap_face_opens_three_vertices(segments in 3..24_i32, pick in 0..24_i32) {
        let (n, mut faces) = capped_cylinder(segments);
        // Every fourth face is a bottom cap triangle.
        let removed = faces.remove(((pick % segments) * 4 + 2) as usize);
        let classification = classify_boundary(&faces, n);
        prop_assert_eq!(classification.vertex_count(), 3);
        for v in removed {
            prop_assert!(classification.is_boundary(v));
        }
    }

    #[test]
    fn ingest_preserves_valid_triangles(
        coords in prop::collection::vec(prop::array::uniform3(-10.0..10.0f64), 3..30),
        seed in prop::collection::vec(prop::array::uniform3(0..1000_i64), 1..40),
    ) {
        let n = coords.len() as i64;
        let triangles: Vec<[i64; 3]> = seed.iter().map(|t| t.map(|i| i % n)).collect();
        let points = coords.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect();
        let mesh = PolyMesh::from_triangles(points, &triangles);

        let soup = ingest(&mesh).unwrap();
        prop_assert_eq!(soup.vertices, coords);
        prop_assert_eq!(soup.faces.len(), triangles.len());
        for (face, tri) in soup.faces.iter().zip(&triangles) {
            prop_assert_eq!(face.map(i64::from), *tri);
        }
    }
}
