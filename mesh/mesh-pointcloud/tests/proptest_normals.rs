//! Property-based tests for normal estimation and orientation.
//!
//! Run with: cargo test -p mesh-pointcloud -- proptest

use mesh_pointcloud::{PointCloud, estimate_normals, reorient_normals};
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_cloud(min_points: usize, max_points: usize) -> impl Strategy<Value = PointCloud> {
    prop::collection::vec(arb_position(), min_points..=max_points)
        .prop_map(|positions| PointCloud::from_positions(&positions))
}

// =============================================================================
// Property Tests: Estimation
// =============================================================================

proptest! {
    /// Every estimated normal is unit length.
    #[test]
    fn estimated_normals_are_unit(mut cloud in arb_cloud(4, 60), k in 3usize..10) {
        estimate_normals(&mut cloud, k, false).unwrap();
        for n in cloud.normals().unwrap() {
            prop_assert!((n.norm() - 1.0).abs() < 1e-9, "normal length {}", n.norm());
        }
    }

    /// Surface variation lies in [0, 1/3].
    #[test]
    fn curvature_is_bounded(mut cloud in arb_cloud(4, 60), k in 3usize..10) {
        estimate_normals(&mut cloud, k, true).unwrap();
        let curvature = cloud.curvatures().unwrap();
        prop_assert_eq!(curvature.len(), cloud.len());
        for &c in curvature {
            prop_assert!((0.0..=1.0 / 3.0 + 1e-9).contains(&c), "curvature {}", c);
        }
    }
}

// =============================================================================
// Property Tests: Orientation
// =============================================================================

proptest! {
    /// After reorientation, every spanning tree edge connects agreeing normals.
    #[test]
    fn tree_edges_agree(mut cloud in arb_cloud(4, 60), k in 3usize..10) {
        estimate_normals(&mut cloud, k, false).unwrap();
        let stats = reorient_normals(&mut cloud, k).unwrap();
        let normals = cloud.normals().unwrap();

        for (parent, child) in &stats.tree_edges {
            prop_assert!(normals[parent.idx()].dot(&normals[child.idx()]) >= 0.0);
        }
    }

    /// The forest spans every point exactly once.
    #[test]
    fn forest_spans_cloud(mut cloud in arb_cloud(4, 60), k in 3usize..10) {
        estimate_normals(&mut cloud, k, false).unwrap();
        let stats = reorient_normals(&mut cloud, k).unwrap();

        prop_assert!(stats.components >= 1);
        prop_assert_eq!(stats.tree_edges.len() + stats.components, cloud.len());

        let mut seen = vec![false; cloud.len()];
        for (_, child) in &stats.tree_edges {
            prop_assert!(!seen[child.idx()]);
            seen[child.idx()] = true;
        }
    }

    /// Reorientation only changes signs.
    #[test]
    fn reorientation_preserves_directions(mut cloud in arb_cloud(4, 60), k in 3usize..10) {
        estimate_normals(&mut cloud, k, false).unwrap();
        let before = cloud.normals().unwrap().to_vec();
        let stats = reorient_normals(&mut cloud, k).unwrap();
        let after = cloud.normals().unwrap();

        let mut flipped = 0;
        for (a, b) in before.iter().zip(after) {
            if a == b {
                continue;
            }
            prop_assert_eq!(-a, *b);
            flipped += 1;
        }
        prop_assert_eq!(flipped, stats.flipped);
    }
}
