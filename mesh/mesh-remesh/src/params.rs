//! Tuning parameters for [`IsotropicRemesher`](crate::IsotropicRemesher).

/// Tuning knobs of the isotropic remesher.
///
/// Target edge length, iteration count, pinned vertices and projection are
/// per-request values (see [`RemeshRequest`](crate::RemeshRequest)); these
/// parameters describe how each pass behaves.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RemeshParams {
    /// Enable edge splitting (split long edges).
    pub enable_split: bool,

    /// Enable edge collapsing (collapse short edges).
    pub enable_collapse: bool,

    /// Enable edge flipping (flip edges to improve quality).
    pub enable_flip: bool,

    /// Enable tangential smoothing.
    pub enable_smooth: bool,

    /// Edges shorter than `target * min_edge_ratio` are collapsed.
    pub min_edge_ratio: f64,

    /// Edges longer than `target * max_edge_ratio` are split.
    pub max_edge_ratio: f64,

    /// Fraction of the tangential displacement applied per pass, in `[0, 1]`.
    pub smoothing_factor: f64,

    /// Largest face count a run may reach before it gives up.
    pub max_faces: usize,
}

impl Default for RemeshParams {
    fn default() -> Self {
        Self {
            enable_split: true,
            enable_collapse: true,
            enable_flip: true,
            enable_smooth: true,
            min_edge_ratio: 0.8,         // Collapse if < 4/5 of target
            max_edge_ratio: 4.0 / 3.0,   // Split if > 4/3 of target
            smoothing_factor: 0.5,
            max_faces: 50_000_000,
        }
    }
}

impl RemeshParams {
    /// Create parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable edge splitting.
    #[must_use]
    pub const fn with_split(mut self, enable: bool) -> Self {
        self.enable_split = enable;
        self
    }

    /// Enable or disable edge collapsing.
    #[must_use]
    pub const fn with_collapse(mut self, enable: bool) -> Self {
        self.enable_collapse = enable;
        self
    }

    /// Enable or disable edge flipping.
    #[must_use]
    pub const fn with_flip(mut self, enable: bool) -> Self {
        self.enable_flip = enable;
        self
    }

    /// Enable or disable smoothing.
    #[must_use]
    pub const fn with_smooth(mut self, enable: bool) -> Self {
        self.enable_smooth = enable;
        self
    }

    /// Set the smoothing factor.
    #[must_use]
    pub const fn with_smoothing_factor(mut self, factor: f64) -> Self {
        self.smoothing_factor = factor;
        self
    }

    /// Set the face budget.
    #[must_use]
    pub const fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Edge length below which edges are collapsed.
    #[must_use]
    pub fn min_edge_length(&self, target: f64) -> f64 {
        target * self.min_edge_ratio
    }

    /// Edge length above which edges are split.
    #[must_use]
    pub fn max_edge_length(&self, target: f64) -> f64 {
        target * self.max_edge_ratio
    }
}
