//! Error types for mesh construction and property access.

use thiserror::Error;

use crate::handle::VertexId;

/// Result type for property registry operations.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Result type for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised by a [`PropertyRegistry`](crate::PropertyRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// A property with this name is already registered.
    #[error("property '{name}' already exists")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// The property exists but stores a different value type.
    #[error("property '{name}' exists with a type other than {requested}")]
    TypeMismatch {
        /// The property name.
        name: String,
        /// The type that was asked for.
        requested: &'static str,
    },
}

/// Errors raised while building a [`SurfaceMesh`](crate::SurfaceMesh).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("invalid vertex {vertex} (mesh has {vertex_count} vertices)")]
    InvalidVertex {
        /// The offending handle.
        vertex: VertexId,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face is malformed (too few or repeated vertices).
    #[error("invalid face: {reason}")]
    InvalidFace {
        /// Why the face was rejected.
        reason: String,
    },

    /// The directed edge is already used by another face.
    ///
    /// Happens for non-manifold edges and for faces whose winding
    /// disagrees with a neighbour.
    #[error("complex edge {from} -> {to}: already used by another face")]
    ComplexEdge {
        /// Edge origin.
        from: VertexId,
        /// Edge target.
        to: VertexId,
    },

    /// Property registry failure.
    #[error(transparent)]
    Property(#[from] PropertyError),
}
