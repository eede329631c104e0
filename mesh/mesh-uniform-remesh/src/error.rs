//! Error types for the uniform remeshing filter.
//!
//! # Error Codes
//!
//! Each error has a code in the format `REMESH-XXXX`:
//! - `REMESH-1xxx`: Input errors (the mesh cannot be converted)
//! - `REMESH-2xxx`: Parameter errors (configuration rejected)
//! - `REMESH-3xxx`: Remeshing errors (the remesher did not complete)

use mesh_remesh::RemeshFault;
use thiserror::Error;

/// Result type alias for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1xxx)
    /// REMESH-1001: A cell is not a triangle
    UnsupportedTopology = 1001,
    /// REMESH-1002: Cell traversal did not visit every declared cell
    TraversalIntegrity = 1002,
    /// REMESH-1003: A point index cannot be represented or addressed
    IndexRange = 1003,

    // Parameter errors (2xxx)
    /// REMESH-2001: A configuration value was rejected
    InvalidParameter = 2001,

    // Remeshing errors (3xxx)
    /// REMESH-3001: The remesher ran out of memory
    OutOfMemory = 3001,
    /// REMESH-3002: The remesher reported a failure
    Runtime = 3002,
    /// REMESH-3003: The remesher failed in an unrecognized way
    Unknown = 3003,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `REMESH-XXXX`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedTopology => "REMESH-1001",
            Self::TraversalIntegrity => "REMESH-1002",
            Self::IndexRange => "REMESH-1003",
            Self::InvalidParameter => "REMESH-2001",
            Self::OutOfMemory => "REMESH-3001",
            Self::Runtime => "REMESH-3002",
            Self::Unknown => "REMESH-3003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the remesher failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemeshingFailureKind {
    /// Memory ran out during remeshing.
    OutOfMemory,
    /// The remesher reported a failure with a message.
    Runtime,
    /// The remesher panicked or failed without a usable report.
    Unknown,
}

impl std::fmt::Display for RemeshingFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::OutOfMemory => "out of memory",
            Self::Runtime => "runtime error",
            Self::Unknown => "unknown error",
        })
    }
}

/// Errors that can occur while remeshing a [`PolyMesh`](mesh_types::PolyMesh).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A cell has a vertex count other than three.
    #[error("cell {cell} has {vertex_count} vertices; only triangles are supported")]
    UnsupportedTopology {
        /// Index of the offending cell.
        cell: usize,
        /// Number of vertices in that cell.
        vertex_count: usize,
    },

    /// Cell traversal visited a different number of cells than declared.
    #[error("cell array declares {declared} cells but traversal visited {visited}")]
    TraversalIntegrity {
        /// Number of cells the cell array declares.
        declared: usize,
        /// Number of cells actually visited.
        visited: usize,
    },

    /// A point index is negative, too large for a face index, or does not
    /// address an existing point.
    #[error("cell {cell} references point {index}; valid indices are 0..={max}")]
    IndexRange {
        /// Index of the offending cell.
        cell: usize,
        /// The offending point index.
        index: i64,
        /// Largest valid index.
        max: i64,
    },

    /// A configuration value was rejected.
    #[error("invalid {parameter} {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        parameter: &'static str,
        /// The rejected value, as given.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The remesher did not complete.
    #[error("remeshing failed ({kind}): {message}")]
    RemeshingFailure {
        /// Failure category.
        kind: RemeshingFailureKind,
        /// Human-readable detail.
        message: String,
    },
}

impl FilterError {
    /// Create an [`FilterError::InvalidParameter`] error.
    #[must_use]
    pub fn invalid_parameter(
        parameter: &'static str,
        value: impl std::fmt::Display,
        reason: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            parameter,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a [`FilterError::RemeshingFailure`] error.
    #[must_use]
    pub fn remeshing(kind: RemeshingFailureKind, message: impl Into<String>) -> Self {
        Self::RemeshingFailure {
            kind,
            message: message.into(),
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedTopology { .. } => ErrorCode::UnsupportedTopology,
            Self::TraversalIntegrity { .. } => ErrorCode::TraversalIntegrity,
            Self::IndexRange { .. } => ErrorCode::IndexRange,
            Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::RemeshingFailure { kind, .. } => match kind {
                RemeshingFailureKind::OutOfMemory => ErrorCode::OutOfMemory,
                RemeshingFailureKind::Runtime => ErrorCode::Runtime,
                RemeshingFailureKind::Unknown => ErrorCode::Unknown,
            },
        }
    }

    /// Whether the input mesh itself was rejected.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTopology { .. }
                | Self::TraversalIntegrity { .. }
                | Self::IndexRange { .. }
        )
    }
}

impl From<RemeshFault> for FilterError {
    fn from(fault: RemeshFault) -> Self {
        match fault {
            RemeshFault::OutOfMemory { .. } => {
                Self::remeshing(RemeshingFailureKind::OutOfMemory, fault.to_string())
            }
            RemeshFault::Runtime(message) => {
                Self::remeshing(RemeshingFailureKind::Runtime, message)
            }
        }
    }
}
