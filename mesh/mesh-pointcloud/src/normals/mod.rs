//! Normal estimation and orientation for point clouds.
//!
//! Normals are estimated by fitting a plane to each point's k-nearest
//! neighbourhood ([`estimate_normals`]) and then made consistent across the
//! cloud by propagating signs along a minimum spanning tree
//! ([`reorient_normals`]).

mod estimate;
mod orient;

pub use estimate::{MIN_NEIGHBORS, PlaneFit, estimate_normals, fit_plane};
pub use orient::{OrientationStats, reorient_normals};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cloud::PointCloud;
use crate::error::CloudResult;

/// Parameters for normal estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalEstimationParams {
    /// Number of neighbors used for the plane fit and the orientation graph.
    /// Default: 16.
    pub k_neighbors: usize,

    /// Whether to store per-point surface variation. Default: false.
    pub compute_curvature: bool,

    /// Whether to make normal signs consistent after estimation. Default: true.
    pub reorient: bool,
}

impl Default for NormalEstimationParams {
    fn default() -> Self {
        Self {
            k_neighbors: 16,
            compute_curvature: false,
            reorient: true,
        }
    }
}

impl NormalEstimationParams {
    /// Creates new parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of neighbors.
    #[must_use]
    pub const fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k;
        self
    }

    /// Sets whether to compute curvature.
    #[must_use]
    pub const fn with_curvature(mut self, compute: bool) -> Self {
        self.compute_curvature = compute;
        self
    }

    /// Sets whether to reorient normals after estimation.
    #[must_use]
    pub const fn with_reorient(mut self, reorient: bool) -> Self {
        self.reorient = reorient;
        self
    }
}

/// Estimates normals with configurable parameters, optionally reorienting
/// them afterwards.
///
/// Returns the orientation statistics when reorientation ran.
///
/// # Errors
///
/// Returns an error if the cloud is too small or `k_neighbors` is invalid;
/// see [`estimate_normals`] and [`reorient_normals`].
///
/// # Example
///
/// ```
/// use mesh_pointcloud::{NormalEstimationParams, PointCloud, estimate_normals_with_params};
/// use nalgebra::Point3;
///
/// let positions: Vec<_> = (0..100)
///     .map(|i| {
///         let t = f64::from(i) * 0.1;
///         Point3::new(t.cos(), t.sin(), t * 0.01)
///     })
///     .collect();
/// let mut cloud = PointCloud::from_positions(&positions);
///
/// let params = NormalEstimationParams::new()
///     .with_k_neighbors(8)
///     .with_curvature(true);
///
/// let stats = estimate_normals_with_params(&mut cloud, &params).unwrap();
/// assert!(stats.is_some());
/// assert!(cloud.curvatures().is_some());
/// ```
pub fn estimate_normals_with_params(
    cloud: &mut PointCloud,
    params: &NormalEstimationParams,
) -> CloudResult<Option<OrientationStats>> {
    estimate_normals(cloud, params.k_neighbors, params.compute_curvature)?;

    if params.reorient {
        reorient_normals(cloud, params.k_neighbors).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn grid_cloud(n: u32) -> PointCloud {
        (0..n)
            .flat_map(|i| (0..n).map(move |j| Point3::new(f64::from(i), f64::from(j), 0.0)))
            .collect()
    }

    #[test]
    fn test_params_default() {
        let params = NormalEstimationParams::default();
        assert_eq!(params.k_neighbors, 16);
        assert!(!params.compute_curvature);
        assert!(params.reorient);
    }

    #[test]
    fn test_params_builder() {
        let params = NormalEstimationParams::new()
            .with_k_neighbors(8)
            .with_curvature(true)
            .with_reorient(false);
        assert_eq!(params.k_neighbors, 8);
        assert!(params.compute_curvature);
        assert!(!params.reorient);
    }

    #[test]
    fn test_with_params_reorients_plane_upward() {
        let mut cloud = grid_cloud(10);
        let stats = estimate_normals_with_params(&mut cloud, &NormalEstimationParams::new())
            .unwrap()
            .unwrap();

        assert_eq!(stats.components, 1);
        for n in cloud.normals().unwrap() {
            assert!(n.z > 0.99, "normal {n:?} not turned upward");
        }
    }

    #[test]
    fn test_with_params_without_reorient() {
        let mut cloud = grid_cloud(5);
        let params = NormalEstimationParams::new().with_reorient(false);
        let stats = estimate_normals_with_params(&mut cloud, &params).unwrap();
        assert!(stats.is_none());
        assert!(cloud.has_normals());
    }

    #[test]
    fn test_with_params_propagates_errors() {
        let mut cloud = grid_cloud(5);
        let params = NormalEstimationParams::new().with_k_neighbors(1);
        assert!(estimate_normals_with_params(&mut cloud, &params).is_err());
    }
}
