//! Surface sampling and point cloud normal estimation toolkit.
//!
//! This umbrella crate re-exports all mesh-* crates, providing a unified API
//! for turning polygon meshes into oriented point clouds. All crates are
//! Layer 0 (zero Bevy dependencies) and can be used in CLI tools, WASM,
//! servers, or Python bindings.
//!
//! # Quick Start
//!
//! ```
//! use mesh::prelude::*;
//!
//! // Sample a cube surface
//! let cube = unit_cube();
//! let mut cloud = sample_surface_with_params(&cube, &SamplingParams::reproducible(2000, 7)).cloud;
//!
//! // Re-estimate normals from the points alone and make them consistent
//! let params = NormalEstimationParams::new().with_curvature(true);
//! let stats = estimate_normals_with_params(&mut cloud, &params).unwrap();
//! assert!(stats.is_some());
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Handles, typed property tables, `SurfaceMesh`, `Triangle`
//! - [`pointcloud`] - `PointCloud`, k-NN queries, normal estimation and
//!   orientation
//! - [`sample`] - Area-weighted surface sampling
//!
//! # Feature Flags
//!
//! - `serde` - Serialize parameter structs and geometry types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![doc(html_root_url = "https://docs.rs/mesh/0.7.0")]

// =============================================================================
// Re-exports
// =============================================================================

/// Handles, typed property tables, `SurfaceMesh`, `Triangle`.
pub use mesh_types as types;

/// Point clouds, normal estimation and orientation.
pub use mesh_pointcloud as pointcloud;

/// Area-weighted surface sampling.
pub use mesh_sample as sample;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for sampling and normal estimation.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{
        FACE_NORMAL, FaceId, Point3, PointId, SurfaceMesh, Triangle, VERTEX_NORMAL, Vector3,
        VertexId, unit_cube,
    };

    // Point clouds
    pub use mesh_pointcloud::{
        CURVATURE, CloudError, NORMAL, NormalEstimationParams, OrientationStats, PointCloud,
        estimate_normals, estimate_normals_with_params, reorient_normals,
    };

    // Sampling
    pub use mesh_sample::{
        SamplingParams, SamplingResult, sample_surface, sample_surface_with_params,
    };
}

// =============================================================================
// Tests
// =============================================================================
