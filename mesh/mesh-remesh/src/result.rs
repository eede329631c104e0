//! Edge statistics and run reports.

// Face/edge counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use hashbrown::HashSet;
use mesh_types::{FaceIndex, TriangleSoup};

/// Statistics about the distinct edge lengths of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeStatistics {
    /// Minimum edge length.
    pub min_length: f64,
    /// Maximum edge length.
    pub max_length: f64,
    /// Average edge length.
    pub avg_length: f64,
    /// Standard deviation of edge lengths.
    pub std_dev: f64,
    /// Number of distinct edges.
    pub edge_count: usize,
}

/// Compute length statistics over the distinct undirected edges of a soup.
///
/// An edge shared by several faces is counted once. Faces that reference
/// missing vertices are skipped. Returns all-zero statistics when there are
/// no edges.
///
/// ```
/// use mesh_types::TriangleSoup;
/// use mesh_remesh::edge_statistics;
///
/// let soup = TriangleSoup::from_parts(
///     vec![[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 4.0, 0.0]],
///     vec![[0, 1, 2]],
/// );
/// let stats = edge_statistics(&soup);
/// assert_eq!(stats.edge_count, 3);
/// assert!((stats.avg_length - 4.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn edge_statistics(soup: &TriangleSoup) -> EdgeStatistics {
    let mut edge_lengths: Vec<f64> = Vec::new();
    let mut seen_edges: HashSet<(FaceIndex, FaceIndex)> = HashSet::new();

    for face in &soup.faces {
        for i in 0..3 {
            let v0 = face[i];
            let v1 = face[(i + 1) % 3];
            let edge = if v0 <= v1 { (v0, v1) } else { (v1, v0) };
            if seen_edges.contains(&edge) {
                continue;
            }

            let (Some(p0), Some(p1)) = (soup.point(v0), soup.point(v1)) else {
                continue;
            };
            seen_edges.insert(edge);
            edge_lengths.push((p1 - p0).norm());
        }
    }

    if edge_lengths.is_empty() {
        return EdgeStatistics::default();
    }

    let min_length = edge_lengths.iter().copied().fold(f64::INFINITY, f64::min);
    let max_length = edge_lengths.iter().copied().fold(0.0, f64::max);
    let avg_length = edge_lengths.iter().sum::<f64>() / edge_lengths.len() as f64;

    let variance = edge_lengths
        .iter()
        .map(|&l| (l - avg_length).powi(2))
        .sum::<f64>()
        / edge_lengths.len() as f64;

    EdgeStatistics {
        min_length,
        max_length,
        avg_length,
        std_dev: variance.sqrt(),
        edge_count: edge_lengths.len(),
    }
}

/// Mean length of the distinct undirected edges of a soup, or `0.0` when it
/// has none.
#[must_use]
pub fn average_edge_length(soup: &TriangleSoup) -> f64 {
    edge_statistics(soup).avg_length
}

/// Report of one isotropic remeshing run.
#[derive(Debug, Clone, Default)]
pub struct RemeshStats {
    /// Number of faces in the input.
    pub original_faces: usize,

    /// Number of faces in the output.
    pub final_faces: usize,

    /// Number of vertices in the input.
    pub original_vertices: usize,

    /// Number of vertices in the output.
    pub final_vertices: usize,

    /// Number of passes actually performed (early exit on convergence).
    pub iterations_performed: u32,

    /// Number of edge splits performed.
    pub splits_performed: usize,

    /// Number of edge collapses performed.
    pub collapses_performed: usize,

    /// Number of edge flips performed.
    pub flips_performed: usize,

    /// Edge statistics for the input.
    pub original_edge_stats: EdgeStatistics,

    /// Edge statistics for the output.
    pub final_edge_stats: EdgeStatistics,
}

impl RemeshStats {
    /// Get the face count change ratio.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// Check if any remeshing operations were performed.
    #[must_use]
    pub const fn was_remeshed(&self) -> bool {
        self.splits_performed > 0 || self.collapses_performed > 0 || self.flips_performed > 0
    }

    /// Get the total number of operations performed.
    #[must_use]
    pub const fn total_operations(&self) -> usize {
        self.splits_performed + self.collapses_performed + self.flips_performed
    }

    /// Relative reduction of the edge length standard deviation
    /// (positive = more uniform).
    #[must_use]
    pub fn uniformity_improvement(&self) -> f64 {
        if self.original_edge_stats.std_dev > 0.0 {
            (self.original_edge_stats.std_dev - self.final_edge_stats.std_dev)
                / self.original_edge_stats.std_dev
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for RemeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Remesh: {} → {} faces ({:.1}x) in {} passes, {} splits, {} collapses, {} flips",
            self.original_faces,
            self.final_faces,
            self.face_ratio(),
            self.iterations_performed,
            self.splits_performed,
            self.collapses_performed,
            self.flips_performed
        )
    }
}
