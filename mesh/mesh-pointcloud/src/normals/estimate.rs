//! PCA normal estimation.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cloud::PointCloud;
use crate::error::{CloudError, CloudResult};
use crate::knn::NeighborIndex;

/// Smallest neighbourhood size that can define a plane.
pub const MIN_NEIGHBORS: usize = 3;

/// Result of fitting a plane to one neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFit {
    /// Unit normal of the fitted plane (sign arbitrary).
    pub normal: Vector3<f64>,
    /// Surface variation `λ_min / (λ0 + λ1 + λ2)`, in `[0, 1/3]`.
    pub curvature: f64,
}

/// Estimates normals for all points using PCA on k nearest neighbors.
///
/// For each point, the neighbourhood is the point itself plus its `k`
/// nearest other points. The normal is the eigenvector of the smallest
/// eigenvalue of the neighbourhood covariance matrix; normals are unit
/// length but their signs are arbitrary (see
/// [`reorient_normals`](super::reorient_normals)).
///
/// With `compute_curvature`, the surface variation of each neighbourhood
/// is stored in the [`CURVATURE`](crate::CURVATURE) property.
///
/// If the cloud has fewer than `k + 1` points, `k` is clamped to
/// `len - 1`.
///
/// # Errors
///
/// - [`CloudError::InvalidArgument`] if `k < 3`
/// - [`CloudError::DegenerateInput`] if the cloud is empty
/// - [`CloudError::InsufficientNeighbors`] if the cloud has fewer than
///   three points
/// - [`CloudError::Property`] if the normal or curvature property exists
///   with the wrong type
///
/// # Example
///
/// ```
/// use mesh_pointcloud::{PointCloud, estimate_normals};
/// use nalgebra::Point3;
///
/// // Points on the plane z = 0.5 x
/// let positions: Vec<_> = (0..5)
///     .flat_map(|i| (0..5).map(move |j| {
///         let (x, y) = (f64::from(i), f64::from(j));
///         Point3::new(x, y, 0.5 * x)
///     }))
///     .collect();
/// let mut cloud = PointCloud::from_positions(&positions);
///
/// estimate_normals(&mut cloud, 8, true).unwrap();
/// let n = cloud.normals().unwrap()[12];
/// assert!((n.norm() - 1.0).abs() < 1e-9);
/// assert!(cloud.curvatures().unwrap()[12] < 1e-9);
/// ```
pub fn estimate_normals(
    cloud: &mut PointCloud,
    k: usize,
    compute_curvature: bool,
) -> CloudResult<()> {
    let k = clamp_neighbors(cloud.len(), k)?;

    info!(
        points = cloud.len(),
        k,
        compute_curvature,
        "Estimating point normals"
    );

    let positions = cloud.positions();
    let index = NeighborIndex::new(positions);
    let fits: Vec<PlaneFit> = (0..positions.len())
        .into_par_iter()
        .map(|i| {
            let mut neighborhood = index.nearest(positions, i, k);
            neighborhood.push(i);
            fit_plane(positions, &neighborhood)
        })
        .collect();

    let normals = cloud.normal_property()?;
    for (n, fit) in cloud
        .properties_mut()
        .values_mut(normals)
        .iter_mut()
        .zip(&fits)
    {
        *n = fit.normal;
    }

    if compute_curvature {
        let curvature = cloud.curvature_property()?;
        for (c, fit) in cloud
            .properties_mut()
            .values_mut(curvature)
            .iter_mut()
            .zip(&fits)
        {
            *c = fit.curvature;
        }
    }

    info!(points = fits.len(), "Normal estimation complete");
    Ok(())
}

/// Validate `k` and clamp it to the number of available neighbours.
fn clamp_neighbors(len: usize, k: usize) -> CloudResult<usize> {
    if k < MIN_NEIGHBORS {
        return Err(CloudError::InvalidArgument {
            reason: format!("k must be at least {MIN_NEIGHBORS} for a plane fit, got {k}"),
        });
    }

    if len == 0 {
        return Err(CloudError::DegenerateInput {
            reason: "point cloud is empty".to_string(),
        });
    }

    if len > k {
        return Ok(k);
    }

    let clamped = len - 1;
    if clamped < MIN_NEIGHBORS - 1 {
        return Err(CloudError::InsufficientNeighbors {
            required: MIN_NEIGHBORS,
            actual: len,
        });
    }

    debug!(requested = k, clamped, "Clamped neighbourhood size to cloud size");
    Ok(clamped)
}

/// Fits a plane to the points at `indices` by principal component analysis.
///
/// Neighbourhoods without spread (all points coincident) yield `+Z` and
/// zero curvature.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit_plane(positions: &[Point3<f64>], indices: &[usize]) -> PlaneFit {
    let flat = PlaneFit {
        normal: Vector3::z(),
        curvature: 0.0,
    };
    if indices.is_empty() {
        return flat;
    }

    let centroid: Vector3<f64> =
        indices.iter().map(|&i| positions[i].coords).sum::<Vector3<f64>>() / indices.len() as f64;

    let mut cov = Matrix3::zeros();
    for &i in indices {
        let diff = positions[i].coords - centroid;
        cov += diff * diff.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let eigenvalues = eigen.eigenvalues.map(|l| l.max(0.0));
    let total = eigenvalues.sum();
    if total <= f64::EPSILON * f64::EPSILON {
        return flat;
    }

    let min_idx = eigenvalues.imin();
    let normal: Vector3<f64> = eigen.eigenvectors.column(min_idx).into_owned();
    let norm = normal.norm();
    if norm <= 1e-10 {
        return flat;
    }

    PlaneFit {
        normal: normal / norm,
        curvature: eigenvalues[min_idx] / total,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::Triangle;

    use crate::cloud::CURVATURE;

    /// Barycentric grid over a tilted triangle: 21 coplanar points.
    fn flat_triangle_cloud() -> (PointCloud, Vector3<f64>) {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.3, 0.5),
            Point3::new(0.4, 1.8, 1.1),
        );
        let steps = 5;
        let mut positions = Vec::new();
        for i in 0..=steps {
            for j in 0..=(steps - i) {
                let b = f64::from(i) / f64::from(steps);
                let c = f64::from(j) / f64::from(steps);
                positions.push(tri.point_at([1.0 - b - c, b, c]));
            }
        }
        (
            PointCloud::from_positions(&positions),
            tri.normal().unwrap(),
        )
    }

    fn fibonacci_sphere(n: usize, radius: f64) -> PointCloud {
        let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        (0..n)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
                let r = (1.0 - y * y).sqrt();
                let theta = golden * i as f64;
                Point3::new(r * theta.cos(), y, r * theta.sin()) * radius
            })
            .collect()
    }

    #[test]
    fn test_flat_triangle_normals_and_curvature() {
        let (mut cloud, expected) = flat_triangle_cloud();
        assert!(cloud.len() >= 16);

        estimate_normals(&mut cloud, 5, true).unwrap();

        let normals = cloud.normals().unwrap();
        let curvature = cloud.curvatures().unwrap();
        for (n, c) in normals.iter().zip(curvature) {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(n.dot(&expected).abs(), 1.0, epsilon = 1e-9);
            assert!(c.abs() < 1e-9, "curvature {c} on a plane");
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let mut cloud = fibonacci_sphere(300, 2.0);
        estimate_normals(&mut cloud, 16, false).unwrap();
        for n in cloud.normals().unwrap() {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-5);
        }
        assert!(cloud.curvatures().is_none());
        assert!(!cloud.properties().contains(CURVATURE));
    }

    #[test]
    fn test_sphere_normals_are_radial() {
        let mut cloud = fibonacci_sphere(500, 1.0);
        estimate_normals(&mut cloud, 12, false).unwrap();
        let normals = cloud.normals().unwrap();
        for (p, n) in cloud.positions().iter().zip(normals) {
            let radial = p.coords.normalize();
            assert!(n.dot(&radial).abs() > 0.95);
        }
    }

    #[test]
    fn test_sphere_curvature_grows_as_radius_shrinks() {
        // Same point spacing on both spheres: 4x the points on 2x the radius.
        let mut large = fibonacci_sphere(1600, 2.0);
        let mut small = fibonacci_sphere(400, 1.0);
        estimate_normals(&mut large, 16, true).unwrap();
        estimate_normals(&mut small, 16, true).unwrap();

        let mean = |c: &[f64]| c.iter().sum::<f64>() / c.len() as f64;
        let large_mean = mean(large.curvatures().unwrap());
        let small_mean = mean(small.curvatures().unwrap());

        assert!(large_mean > 0.0);
        assert!(small_mean < 1.0 / 3.0);
        assert!(
            small_mean > 2.0 * large_mean,
            "expected higher curvature on the smaller sphere: {small_mean} vs {large_mean}"
        );
    }

    #[test]
    fn test_invalid_k() {
        let (mut cloud, _) = flat_triangle_cloud();
        let result = estimate_normals(&mut cloud, 2, false);
        assert!(matches!(result, Err(CloudError::InvalidArgument { .. })));
    }

    #[test]
    fn test_empty_cloud() {
        let mut cloud = PointCloud::new();
        let result = estimate_normals(&mut cloud, 16, false);
        assert!(matches!(result, Err(CloudError::DegenerateInput { .. })));
    }

    #[test]
    fn test_k_is_clamped_for_small_clouds() {
        let mut cloud = PointCloud::from_positions(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        estimate_normals(&mut cloud, 16, false).unwrap();
        for n in cloud.normals().unwrap() {
            assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_too_few_points() {
        let mut cloud =
            PointCloud::from_positions(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let result = estimate_normals(&mut cloud, 16, false);
        assert!(matches!(
            result,
            Err(CloudError::InsufficientNeighbors {
                required: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_coincident_points_get_default_normal() {
        let positions = vec![Point3::new(1.0, 1.0, 1.0); 3];
        let fit = fit_plane(&positions, &[0, 1, 2]);
        assert_eq!(fit.normal, Vector3::z());
        assert_eq!(fit.curvature, 0.0);
    }

    #[test]
    fn test_repeated_points_do_not_abort() {
        let mut positions = vec![Point3::new(0.5, 0.5, 0.5); 40];
        positions.extend((0..20).map(|i| Point3::new(f64::from(i), 2.0, -1.0)));
        let mut cloud = PointCloud::from_positions(&positions);

        estimate_normals(&mut cloud, 8, true).unwrap();

        let normals = cloud.normals().unwrap();
        let curvatures = cloud.curvatures().unwrap();
        for i in 0..40 {
            assert_eq!(normals[i], Vector3::z());
            assert_eq!(curvatures[i], 0.0);
        }
        for n in normals {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_clamp_neighbors() {
        assert_eq!(clamp_neighbors(100, 16).unwrap(), 16);
        assert_eq!(clamp_neighbors(17, 16).unwrap(), 16);
        assert_eq!(clamp_neighbors(16, 16).unwrap(), 15);
        assert_eq!(clamp_neighbors(3, 16).unwrap(), 2);
    }
}
