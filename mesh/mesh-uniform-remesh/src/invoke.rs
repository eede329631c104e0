//! Calling the remesher and translating its failures.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use mesh_remesh::{RemeshRequest, UniformRemesher, average_edge_length};
use mesh_types::{FaceIndex, TriangleSoup};
use tracing::debug;

use crate::boundary::BoundaryClassification;
use crate::config::RemeshConfig;
use crate::error::{FilterError, FilterResult, RemeshingFailureKind};

/// Inputs to one remesher call, besides the mesh itself.
#[derive(Debug, Clone, Copy)]
pub struct InvocationParams<'a> {
    /// Target edge length; `<= 0` means the mean edge length of the input.
    pub target_edge_length: f64,

    /// Iteration count, already clamped.
    pub iterations: u32,

    /// Whether the remesher projects vertices back onto the input.
    pub project_to_surface: bool,

    /// Whether boundary vertices are pinned.
    pub preserve_boundary: bool,

    /// Boundary vertices of the input, ascending.
    pub boundary: &'a [FaceIndex],
}

impl<'a> InvocationParams<'a> {
    /// Parameters for a validated configuration and the input's boundary.
    #[must_use]
    pub fn new(config: &RemeshConfig, boundary: &'a BoundaryClassification) -> Self {
        Self {
            target_edge_length: config.target_edge_length(),
            iterations: config.iterations(),
            project_to_surface: config.project_to_surface(),
            preserve_boundary: config.preserve_boundary(),
            boundary: boundary.vertices(),
        }
    }
}

/// A successful remesher call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// The remeshed arrays.
    pub soup: TriangleSoup,

    /// Target edge length actually passed to the remesher.
    pub target_edge_length: f64,

    /// Whether boundary vertices were passed as pinned.
    pub pinned_boundary: bool,
}

/// Run `remesher` on `soup`.
///
/// A non-positive target length is replaced by the mean length of the
/// soup's distinct edges. Boundary vertices are pinned when preservation is
/// on and there are any; otherwise the unconstrained call is made.
///
/// Remesher faults map to [`FilterError::RemeshingFailure`]: out-of-memory
/// to [`RemeshingFailureKind::OutOfMemory`], other reported failures to
/// [`RemeshingFailureKind::Runtime`]. A panic inside the remesher is caught
/// and reported as [`RemeshingFailureKind::Unknown`], as is a result that
/// references vertices it does not contain.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if the target length has to be
/// derived and the soup has no edge of positive length, or
/// [`FilterError::RemeshingFailure`] as above.
///
/// # Example
///
/// ```
/// use mesh_remesh::IsotropicRemesher;
/// use mesh_types::TriangleSoup;
/// use mesh_uniform_remesh::{InvocationParams, invoke};
///
/// let soup = TriangleSoup::from_parts(
///     vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
///     vec![[0, 1, 2]],
/// );
/// let params = InvocationParams {
///     target_edge_length: 0.0,
///     iterations: 3,
///     project_to_surface: false,
///     preserve_boundary: true,
///     boundary: &[0, 1, 2],
/// };
///
/// let invocation = invoke(&IsotropicRemesher::new(), soup, &params)?;
/// assert!(invocation.pinned_boundary);
/// assert!((invocation.target_edge_length - (4.0 + 8f64.sqrt()) / 3.0).abs() < 1e-12);
/// # Ok::<(), mesh_uniform_remesh::FilterError>(())
/// ```
pub fn invoke<R>(
    remesher: &R,
    soup: TriangleSoup,
    params: &InvocationParams<'_>,
) -> FilterResult<Invocation>
where
    R: UniformRemesher + ?Sized,
{
    let target_edge_length = if params.target_edge_length <= 0.0 {
        let mean = average_edge_length(&soup);
        if !(mean.is_finite() && mean > 0.0) {
            return Err(FilterError::invalid_parameter(
                "target_edge_length",
                mean,
                "the input has no edge of positive length to derive it from",
            ));
        }
        debug!("Derived target edge length {:.6} from the input", mean);
        mean
    } else {
        params.target_edge_length
    };

    let pinned_boundary = params.preserve_boundary && !params.boundary.is_empty();
    let mut request = RemeshRequest::new(soup, target_edge_length, params.iterations)
        .with_projection(params.project_to_surface);
    if pinned_boundary {
        request = request.with_pinned(params.boundary);
    }

    debug!(
        "Invoking remesher: target {:.6}, {} iterations, {} pinned, projection {}",
        target_edge_length,
        params.iterations,
        if pinned_boundary { params.boundary.len() } else { 0 },
        params.project_to_surface
    );

    let soup = match panic::catch_unwind(AssertUnwindSafe(|| remesher.remesh(request))) {
        Ok(Ok(soup)) => soup,
        Ok(Err(fault)) => return Err(fault.into()),
        Err(payload) => {
            return Err(FilterError::remeshing(
                RemeshingFailureKind::Unknown,
                panic_message(payload.as_ref()),
            ));
        }
    };

    if !soup.indices_in_range() {
        return Err(FilterError::remeshing(
            RemeshingFailureKind::Unknown,
            "remesher returned faces referencing missing vertices",
        ));
    }

    Ok(Invocation {
        soup,
        target_edge_length,
        pinned_boundary,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match detail {
        Some(detail) => format!("remesher panicked: {detail}"),
        None => "remesher panicked".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_remesh::{RemeshFault, RemeshResult};
    use std::cell::RefCell;

    /// Records the request it was given and echoes the soup back.
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Option<(f64, u32, Option<Vec<FaceIndex>>, bool)>>,
    }

    impl UniformRemesher for Recorder {
        fn remesh(&self, request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
            *self.seen.borrow_mut() = Some((
                request.target_edge_length,
                request.iterations,
                request.pinned.map(<[FaceIndex]>::to_vec),
                request.project_to_surface,
            ));
            Ok(request.soup)
        }
    }

    struct Fails(fn() -> RemeshFault);

    impl UniformRemesher for Fails {
        fn remesh(&self, _request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
            Err((self.0)())
        }
    }

    struct Panics;

    impl UniformRemesher for Panics {
        fn remesh(&self, _request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
            panic!("index out of bounds")
        }
    }

    struct Dangling;

    impl UniformRemesher for Dangling {
        fn remesh(&self, request: RemeshRequest<'_>) -> RemeshResult<TriangleSoup> {
            Ok(TriangleSoup::from_parts(request.soup.vertices, vec![[0, 1, 99]]))
        }
    }

    fn quad() -> TriangleSoup {
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

    fn params(target: f64, boundary: &[FaceIndex]) -> InvocationParams<'_> {
        InvocationParams {
            target_edge_length: target,
            iterations: 7,
            project_to_surface: true,
            preserve_boundary: true,
            boundary,
        }
    }

    #[test]
    fn test_auto_length_is_distinct_edge_mean() {
        let recorder = Recorder::default();
        let invocation = invoke(&recorder, quad(), &params(0.0, &[])).unwrap();

        let expected = (4.0 + 2.0_f64.sqrt()) / 5.0;
        assert!((invocation.target_edge_length - expected).abs() < 1e-12);
        let (target, iterations, pinned, project) = recorder.seen.borrow().clone().unwrap();
        assert_eq!(target, invocation.target_edge_length);
        assert_eq!(iterations, 7);
        assert_eq!(pinned, None);
        assert!(project);
    }

    #[test]
    fn test_negative_length_is_auto() {
        let invocation = invoke(&Recorder::default(), quad(), &params(-2.0, &[])).unwrap();
        assert!(invocation.target_edge_length > 0.0);
    }

    #[test]
    fn test_explicit_length_passed_through() {
        let invocation = invoke(&Recorder::default(), quad(), &params(0.3, &[])).unwrap();
        assert_eq!(invocation.target_edge_length, 0.3);
    }

    #[test]
    fn test_boundary_pinned() {
        let recorder = Recorder::default();
        let boundary = [0, 1, 2, 3];
        let invocation = invoke(&recorder, quad(), &params(0.5, &boundary)).unwrap();
        assert!(invocation.pinned_boundary);
        let (_, _, pinned, _) = recorder.seen.borrow().clone().unwrap();
        assert_eq!(pinned, Some(boundary.to_vec()));
    }

    #[test]
    fn test_boundary_not_pinned_when_disabled() {
        let recorder = Recorder::default();
        let boundary = [0, 1, 2, 3];
        let mut p = params(0.5, &boundary);
        p.preserve_boundary = false;
        let invocation = invoke(&recorder, quad(), &p).unwrap();
        assert!(!invocation.pinned_boundary);
        let (_, _, pinned, _) = recorder.seen.borrow().clone().unwrap();
        assert_eq!(pinned, None);
    }

    #[test]
    fn test_degenerate_input_cannot_derive_length() {
        let soup = TriangleSoup::from_parts(vec![[1.0, 1.0, 1.0]; 3], vec![[0, 1, 2]]);
        let recorder = Recorder::default();
        let err = invoke(&recorder, soup, &params(0.0, &[])).unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameter { .. }));
        assert!(recorder.seen.borrow().is_none());
    }

    #[test]
    fn test_fault_translation() {
        let err = invoke(
            &Fails(|| RemeshFault::out_of_memory("growing")),
            quad(),
            &params(0.5, &[]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FilterError::RemeshingFailure {
                kind: RemeshingFailureKind::OutOfMemory,
                ..
            }
        ));

        let err = invoke(
            &Fails(|| RemeshFault::runtime("degenerate")),
            quad(),
            &params(0.5, &[]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::remeshing(RemeshingFailureKind::Runtime, "degenerate")
        );
    }

    #[test]
    fn test_panic_is_unknown() {
        let err = invoke(&Panics, quad(), &params(0.5, &[])).unwrap_err();
        match err {
            FilterError::RemeshingFailure { kind, message } => {
                assert_eq!(kind, RemeshingFailureKind::Unknown);
                assert!(message.contains("index out of bounds"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_result_rejected() {
        let err = invoke(&Dangling, quad(), &params(0.5, &[])).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::Unknown);
    }
}
