//! Error types for point cloud operations.

use mesh_types::PropertyError;
use thiserror::Error;

/// Result type for point cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur while estimating or orienting normals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    /// The input cannot support the operation at all (e.g. an empty cloud).
    #[error("degenerate input: {reason}")]
    DegenerateInput {
        /// Description of the degeneracy.
        reason: String,
    },

    /// Too few points to form a neighbourhood, even after clamping `k`.
    #[error("insufficient neighbors: need at least {required} points, got {actual}")]
    InsufficientNeighbors {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points in the cloud.
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of why the argument is invalid.
        reason: String,
    },

    /// A required per-point property is not present.
    #[error("missing point property '{name}'")]
    MissingProperty {
        /// Name of the missing property.
        name: &'static str,
    },

    /// Property registry failure.
    #[error(transparent)]
    Property(#[from] PropertyError),
}
