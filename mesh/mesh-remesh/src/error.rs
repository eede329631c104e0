//! Failures reported by a uniform remesher.

use std::collections::TryReserveError;

use thiserror::Error;

/// A failure reported by a [`UniformRemesher`](crate::UniformRemesher).
///
/// Remeshers report the failures they recognize through this type. Anything
/// else (a panic inside the remesher) is the caller's to contain.
#[derive(Debug, Error)]
pub enum RemeshFault {
    /// An allocation failed or the mesh would outgrow its memory budget.
    #[error("out of memory while {context}")]
    OutOfMemory {
        /// What the remesher was doing when memory ran out.
        context: String,
    },

    /// The remesher could not complete for a reason it can describe.
    #[error("{0}")]
    Runtime(String),
}

impl RemeshFault {
    /// Create an [`RemeshFault::OutOfMemory`] fault.
    #[must_use]
    pub fn out_of_memory(context: impl Into<String>) -> Self {
        Self::OutOfMemory {
            context: context.into(),
        }
    }

    /// Create a [`RemeshFault::Runtime`] fault.
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Wrap a failed `try_reserve` as an out-of-memory fault.
    #[must_use]
    pub fn from_reserve(context: &str, err: &TryReserveError) -> Self {
        Self::out_of_memory(format!("{context} ({err})"))
    }
}

/// Result type for remeshing operations.
pub type RemeshResult<T> = std::result::Result<T, RemeshFault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_display() {
        let err = RemeshFault::out_of_memory("splitting edges");
        assert_eq!(format!("{err}"), "out of memory while splitting edges");

        let err = RemeshFault::runtime("face 3 references vertex 9");
        assert_eq!(format!("{err}"), "face 3 references vertex 9");
    }

    #[test]
    fn reserve_failure_is_out_of_memory() {
        let mut v: Vec<u64> = Vec::new();
        let err = v.try_reserve(usize::MAX).err();
        assert!(err.is_some());
        if let Some(err) = err {
            let fault = RemeshFault::from_reserve("growing vertices", &err);
            assert!(matches!(fault, RemeshFault::OutOfMemory { .. }));
        }
    }
}
