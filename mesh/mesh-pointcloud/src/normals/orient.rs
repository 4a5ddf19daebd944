//! Consistent normal orientation by minimum spanning tree propagation.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use mesh_types::PointId;
use nalgebra::Vector3;
use tracing::{debug, info};

use crate::cloud::{NORMAL, PointCloud};
use crate::error::{CloudError, CloudResult};
use crate::knn::NeighborIndex;

/// Statistics from a reorientation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrientationStats {
    /// Number of normals whose sign was flipped.
    pub flipped: usize,
    /// Number of connected components in the neighbour graph.
    pub components: usize,
    /// Edges of the spanning forest as `(parent, child)` pairs, in
    /// propagation order.
    pub tree_edges: Vec<(PointId, PointId)>,
}

impl std::fmt::Display for OrientationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Oriented {} tree edges in {} component(s), {} normal(s) flipped",
            self.tree_edges.len(),
            self.components,
            self.flipped
        )
    }
}

/// Candidate spanning-tree edge.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    weight: f64,
    parent: usize,
    child: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (smaller weight = higher priority)
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.child.cmp(&self.child))
            .then_with(|| other.parent.cmp(&self.parent))
    }
}

/// Makes normal directions consistent across the cloud.
///
/// Builds a symmetric k-nearest-neighbour graph whose edge weights are
/// `1 - |n_i · n_j|`, so nearly parallel normals are cheap to connect. A
/// minimum spanning forest is grown from each component's highest point
/// (largest `z`), whose normal is first turned to point towards `+Z`.
/// Every other normal is flipped when it disagrees with its tree parent.
///
/// Only signs change; normal directions are never rotated.
///
/// # Errors
///
/// - [`CloudError::InvalidArgument`] if `k == 0`
/// - [`CloudError::DegenerateInput`] if the cloud is empty
/// - [`CloudError::MissingProperty`] if the cloud has no normals
///
/// # Example
///
/// ```
/// use mesh_pointcloud::{PointCloud, reorient_normals};
/// use nalgebra::{Point3, Vector3};
///
/// let mut cloud = PointCloud::new();
/// for i in 0..10 {
///     let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
///     cloud
///         .add_point_with_normal(Point3::new(f64::from(i), 0.0, 0.0), Vector3::z() * sign)
///         .unwrap();
/// }
///
/// let stats = reorient_normals(&mut cloud, 3).unwrap();
/// assert_eq!(stats.flipped, 5);
/// assert!(cloud.normals().unwrap().iter().all(|n| n.z > 0.0));
/// ```
pub fn reorient_normals(cloud: &mut PointCloud, k: usize) -> CloudResult<OrientationStats> {
    if k == 0 {
        return Err(CloudError::InvalidArgument {
            reason: "k must be at least 1 to build a neighbour graph".to_string(),
        });
    }
    if cloud.is_empty() {
        return Err(CloudError::DegenerateInput {
            reason: "point cloud is empty".to_string(),
        });
    }
    let normals_key = cloud
        .properties()
        .get::<Vector3<f64>>(NORMAL)
        .ok_or(CloudError::MissingProperty { name: NORMAL })?;

    let n = cloud.len();
    let k = k.min(n - 1);
    info!(points = n, k, "Reorienting normals");

    let positions = cloud.positions();
    let adjacency = symmetric_neighbors(&NeighborIndex::new(positions).nearest_all(positions, k));

    // Roots are taken in order of decreasing height.
    let mut by_height: Vec<usize> = (0..n).collect();
    by_height.sort_by(|&a, &b| positions[b].z.total_cmp(&positions[a].z).then(a.cmp(&b)));

    let mut normals = cloud.properties().values(normals_key).to_vec();
    let mut visited = vec![false; n];
    let mut heap = BinaryHeap::new();
    let mut stats = OrientationStats::default();

    for root in by_height {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stats.components += 1;
        if normals[root].z < 0.0 {
            normals[root] = -normals[root];
            stats.flipped += 1;
        }
        push_candidates(&mut heap, &adjacency, &visited, &normals, root);

        while let Some(Candidate { parent, child, .. }) = heap.pop() {
            if visited[child] {
                continue;
            }
            visited[child] = true;

            if normals[parent].dot(&normals[child]) < 0.0 {
                normals[child] = -normals[child];
                stats.flipped += 1;
            }
            stats
                .tree_edges
                .push((PointId::new(parent), PointId::new(child)));

            push_candidates(&mut heap, &adjacency, &visited, &normals, child);
        }
    }

    debug!(
        components = stats.components,
        tree_edges = stats.tree_edges.len(),
        "Spanning forest complete"
    );

    cloud
        .properties_mut()
        .values_mut(normals_key)
        .copy_from_slice(&normals);

    info!(flipped = stats.flipped, "Normal reorientation complete");
    Ok(stats)
}

/// Union of each point's neighbour list with the reverse links, sorted and
/// deduplicated.
fn symmetric_neighbors(knn: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut adjacency = knn.to_vec();
    for (i, neighbors) in knn.iter().enumerate() {
        for &j in neighbors {
            adjacency[j].push(i);
        }
    }
    for list in &mut adjacency {
        list.sort_unstable();
        list.dedup();
    }
    adjacency
}

fn push_candidates(
    heap: &mut BinaryHeap<Candidate>,
    adjacency: &[Vec<usize>],
    visited: &[bool],
    normals: &[Vector3<f64>],
    parent: usize,
) {
    for &child in &adjacency[parent] {
        if !visited[child] {
            heap.push(Candidate {
                weight: 1.0 - normals[parent].dot(&normals[child]).abs(),
                parent,
                child,
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn line_cloud(signs: &[f64]) -> PointCloud {
        let mut cloud = PointCloud::new();
        for (i, s) in signs.iter().enumerate() {
            cloud
                .add_point_with_normal(Point3::new(i as f64, 0.0, 0.0), Vector3::z() * *s)
                .unwrap();
        }
        cloud
    }

    #[test]
    fn test_candidate_min_heap_order() {
        let mut heap = BinaryHeap::new();
        for (weight, child) in [(0.5, 1), (0.1, 2), (0.9, 3)] {
            heap.push(Candidate {
                weight,
                parent: 0,
                child,
            });
        }
        assert_eq!(heap.pop().unwrap().child, 2);
        assert_eq!(heap.pop().unwrap().child, 1);
        assert_eq!(heap.pop().unwrap().child, 3);
    }

    #[test]
    fn test_alternating_line_is_made_consistent() {
        let mut cloud = line_cloud(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        let stats = reorient_normals(&mut cloud, 2).unwrap();

        assert_eq!(stats.components, 1);
        assert_eq!(stats.tree_edges.len(), 5);
        assert_eq!(stats.flipped, 3);
        assert!(cloud.normals().unwrap().iter().all(|n| n.z > 0.0));
    }

    #[test]
    fn test_root_points_up() {
        let mut cloud = line_cloud(&[-1.0, -1.0, -1.0]);
        let stats = reorient_normals(&mut cloud, 2).unwrap();
        assert_eq!(stats.flipped, 3);
        assert!(cloud.normals().unwrap().iter().all(|n| n.z > 0.0));
    }

    #[test]
    fn test_tree_edges_agree_after_reorientation() {
        let mut cloud = PointCloud::new();
        for i in 0..50 {
            let t = i as f64 * 0.2;
            let flip = if i % 3 == 0 { -1.0 } else { 1.0 };
            let normal = Vector3::new(t.cos(), t.sin(), 0.2).normalize() * flip;
            cloud
                .add_point_with_normal(Point3::new(t.cos(), t.sin(), t * 0.05), normal)
                .unwrap();
        }

        let stats = reorient_normals(&mut cloud, 6).unwrap();
        let normals = cloud.normals().unwrap();
        assert_eq!(stats.tree_edges.len() + stats.components, cloud.len());
        for (parent, child) in &stats.tree_edges {
            assert!(normals[parent.idx()].dot(&normals[child.idx()]) >= 0.0);
        }
    }

    #[test]
    fn test_separate_clusters_form_separate_components() {
        let mut cloud = PointCloud::new();
        for i in 0..4 {
            let x = f64::from(i) * 0.1;
            cloud
                .add_point_with_normal(Point3::new(x, 0.0, 0.0), Vector3::z())
                .unwrap();
            cloud
                .add_point_with_normal(Point3::new(x + 100.0, 0.0, 5.0), -Vector3::z())
                .unwrap();
        }

        let stats = reorient_normals(&mut cloud, 2).unwrap();
        assert_eq!(stats.components, 2);
        assert_eq!(stats.tree_edges.len(), 6);
        assert_eq!(stats.flipped, 4);
        assert!(cloud.normals().unwrap().iter().all(|n| n.z > 0.0));
    }

    #[test]
    fn test_repeated_points_are_oriented_together() {
        let mut cloud = PointCloud::new();
        for i in 0..50 {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            cloud
                .add_point_with_normal(Point3::new(1.0, 1.0, 0.0), Vector3::z() * sign)
                .unwrap();
        }

        let stats = reorient_normals(&mut cloud, 6).unwrap();
        assert_eq!(stats.components, 1);
        assert_eq!(stats.tree_edges.len(), 49);
        assert_eq!(stats.flipped, 25);
        assert!(cloud.normals().unwrap().iter().all(|n| n.z > 0.0));
    }

    #[test]
    fn test_single_point() {
        let mut cloud = line_cloud(&[-1.0]);
        let stats = reorient_normals(&mut cloud, 16).unwrap();
        assert_eq!(stats.components, 1);
        assert!(stats.tree_edges.is_empty());
        assert_eq!(cloud.normals().unwrap()[0], Vector3::z());
    }

    #[test]
    fn test_missing_normals() {
        let mut cloud = PointCloud::from_positions(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert_eq!(
            reorient_normals(&mut cloud, 4),
            Err(CloudError::MissingProperty { name: NORMAL })
        );
    }

    #[test]
    fn test_empty_and_zero_k() {
        let mut empty = PointCloud::new();
        assert!(matches!(
            reorient_normals(&mut empty, 4),
            Err(CloudError::DegenerateInput { .. })
        ));

        let mut cloud = line_cloud(&[1.0, 1.0]);
        assert!(matches!(
            reorient_normals(&mut cloud, 0),
            Err(CloudError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_symmetric_neighbors() {
        let knn = vec![vec![1], vec![2], vec![1]];
        let adjacency = symmetric_neighbors(&knn);
        assert_eq!(adjacency, vec![vec![1], vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_stats_display() {
        let stats = OrientationStats {
            flipped: 2,
            components: 1,
            tree_edges: vec![(PointId::new(0), PointId::new(1))],
        };
        assert_eq!(
            stats.to_string(),
            "Oriented 1 tree edges in 1 component(s), 2 normal(s) flipped"
        );
    }
}
