//! The end-to-end filter: ingest, classify, invoke, emit.

use mesh_remesh::{IsotropicRemesher, UniformRemesher};
use mesh_types::PolyMesh;
use tracing::{info, warn};

use crate::boundary::classify_boundary;
use crate::config::RemeshConfig;
use crate::emit::emit;
use crate::error::FilterResult;
use crate::ingest::ingest;
use crate::invoke::{InvocationParams, invoke};

/// What a filter run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemeshSummary {
    /// Points in the input.
    pub input_points: usize,
    /// Cells in the input.
    pub input_cells: usize,
    /// Points in the output.
    pub output_points: usize,
    /// Cells in the output.
    pub output_cells: usize,
    /// Target edge length passed to the remesher, `None` on passthrough.
    pub target_edge_length: Option<f64>,
    /// Iteration count passed to the remesher.
    pub iterations: u32,
    /// Boundary vertices found in the input.
    pub boundary_vertices: usize,
    /// Whether boundary vertices were pinned.
    pub pinned_boundary: bool,
    /// Whether the input was copied through without remeshing.
    pub passthrough: bool,
}

impl RemeshSummary {
    fn passthrough(mesh: &PolyMesh, iterations: u32) -> Self {
        Self {
            input_points: mesh.point_count(),
            input_cells: mesh.cell_count(),
            output_points: mesh.point_count(),
            output_cells: mesh.cell_count(),
            target_edge_length: None,
            iterations,
            boundary_vertices: 0,
            pinned_boundary: false,
            passthrough: true,
        }
    }
}

impl std::fmt::Display for RemeshSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target_edge_length {
            Some(target) if !self.passthrough => write!(
                f,
                "Uniform remesh: {} points / {} cells → {} points / {} cells \
                 (target {:.4}, {} iterations, {} boundary vertices{})",
                self.input_points,
                self.input_cells,
                self.output_points,
                self.output_cells,
                target,
                self.iterations,
                self.boundary_vertices,
                if self.pinned_boundary { " pinned" } else { "" }
            ),
            _ => write!(
                f,
                "Uniform remesh: passed through {} points / {} cells unchanged",
                self.input_points, self.input_cells
            ),
        }
    }
}

/// A filter run's output mesh and summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RemeshOutcome {
    /// The output mesh.
    pub mesh: PolyMesh,
    /// What was done.
    pub summary: RemeshSummary,
}

/// Remeshes a [`PolyMesh`] toward uniform edge lengths, keeping its open
/// boundary in place.
///
/// The filter holds only its configuration and remesher and never mutates
/// them, so one instance can serve concurrent calls when `R` allows it.
///
/// # Example
///
/// ```
/// use mesh_types::{DataArray, unit_cube};
/// use mesh_uniform_remesh::{ParameterProfile, RemeshConfig, UniformRemeshFilter};
///
/// let mut cube = unit_cube();
/// cube.field_data.add_array(DataArray::scalars("part", vec![3.0]));
///
/// let config = RemeshConfig::builder(ParameterProfile::FixedLength)
///     .target_edge_length(0.4)
///     .iterations(3)
///     .build()?;
/// let outcome = UniformRemeshFilter::new(config).apply(&cube)?;
///
/// assert!(outcome.mesh.cell_count() > cube.cell_count());
/// assert_eq!(outcome.mesh.field_data, cube.field_data);
/// assert!(outcome.mesh.point_data.is_empty());
/// # Ok::<(), mesh_uniform_remesh::FilterError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct UniformRemeshFilter<R = IsotropicRemesher> {
    config: RemeshConfig,
    remesher: R,
}

impl UniformRemeshFilter {
    /// Create a filter using the built-in [`IsotropicRemesher`].
    #[must_use]
    pub fn new(config: RemeshConfig) -> Self {
        Self::with_remesher(config, IsotropicRemesher::new())
    }
}

impl<R: UniformRemesher> UniformRemeshFilter<R> {
    /// Create a filter using `remesher`.
    #[must_use]
    pub const fn with_remesher(config: RemeshConfig, remesher: R) -> Self {
        Self { config, remesher }
    }

    /// The filter's configuration.
    #[must_use]
    pub const fn config(&self) -> &RemeshConfig {
        &self.config
    }

    /// The filter's remesher.
    #[must_use]
    pub const fn remesher(&self) -> &R {
        &self.remesher
    }

    /// Remesh `input`, returning a new mesh.
    ///
    /// An input with no points or no cells is returned as an exact copy,
    /// attribute data included. Otherwise the mesh is converted, its
    /// boundary classified, the remesher invoked and the result rebuilt
    /// with empty point and cell data and the input's field data.
    ///
    /// # Errors
    ///
    /// Returns the first failure of [`ingest`](crate::ingest) or
    /// [`invoke`](crate::invoke).
    pub fn apply(&self, input: &PolyMesh) -> FilterResult<RemeshOutcome> {
        if input.is_empty() {
            warn!(
                "Input has {} points and {} cells; passing it through",
                input.point_count(),
                input.cell_count()
            );
            return Ok(RemeshOutcome {
                mesh: input.clone(),
                summary: RemeshSummary::passthrough(input, self.config.iterations()),
            });
        }

        let soup = ingest(input)?;
        let boundary = classify_boundary(&soup.faces, soup.vertex_count());
        if boundary.non_manifold_edge_count() > 0 {
            warn!(
                "{} edges are shared by more than two faces; treating them as interior",
                boundary.non_manifold_edge_count()
            );
        }

        let params = InvocationParams::new(&self.config, &boundary);
        let invocation = invoke(&self.remesher, soup, &params)?;
        let mesh = emit(&invocation.soup, input);

        let summary = RemeshSummary {
            input_points: input.point_count(),
            input_cells: input.cell_count(),
            output_points: mesh.point_count(),
            output_cells: mesh.cell_count(),
            target_edge_length: Some(invocation.target_edge_length),
            iterations: params.iterations,
            boundary_vertices: boundary.vertex_count(),
            pinned_boundary: invocation.pinned_boundary,
            passthrough: false,
        };
        info!("{summary}");

        Ok(RemeshOutcome { mesh, summary })
    }

    /// Remesh `input` into `output`.
    ///
    /// `output` is replaced only on success; on failure it is left exactly
    /// as it was.
    ///
    /// # Errors
    ///
    /// Same as [`UniformRemeshFilter::apply`].
    pub fn execute(&self, input: &PolyMesh, output: &mut PolyMesh) -> FilterResult<RemeshSummary> {
        let RemeshOutcome { mesh, summary } = self.apply(input)?;
        *output = mesh;
        Ok(summary)
    }
}
