//! k-nearest-neighbour queries over point positions.

use hashbrown::HashMap;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use rayon::prelude::*;
use tracing::debug;

/// A k-d tree over a fixed set of positions.
///
/// kiddo panics when a full bucket holds only items with the same
/// coordinate on its split axis. Two inputs trigger that: axis-aligned
/// planar data (cube faces, flat scans) and repeated points. Positions are
/// therefore stored in a generically rotated frame, and each distinct
/// position is inserted once, with every point sharing it listed in its
/// group. Rotation preserves distances, so neighbour sets are unchanged.
pub struct NeighborIndex {
    tree: KdTree<f64, 3>,
    frame: Rotation3<f64>,
    groups: Vec<Vec<usize>>,
    len: usize,
}

impl NeighborIndex {
    /// Build an index over `positions`; items are their slice indices.
    #[must_use]
    pub fn new(positions: &[Point3<f64>]) -> Self {
        let axis = Unit::new_normalize(Vector3::new(1.0, 2.0, 3.0));
        let frame = Rotation3::from_axis_angle(&axis, 0.7);

        let mut slots: HashMap<[u64; 3], usize> = HashMap::with_capacity(positions.len());
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut tree: KdTree<f64, 3> = KdTree::with_capacity(positions.len().max(1));
        for (i, p) in positions.iter().enumerate() {
            let slot = *slots.entry(position_key(p)).or_insert_with(|| {
                tree.add(&to_frame(&frame, p), groups.len() as u64);
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(i);
        }

        if groups.len() < positions.len() {
            debug!(
                points = positions.len(),
                distinct = groups.len(),
                "Indexing repeated positions once"
            );
        }

        Self {
            tree,
            frame,
            groups,
            len: positions.len(),
        }
    }

    /// Number of indexed points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if no points are indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct positions among the indexed points.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        self.groups.len()
    }

    /// Indices of the `k` points nearest to `query`, closest first.
    ///
    /// Points at the same position are returned in index order.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn nearest_to(&self, query: &Point3<f64>, k: usize) -> Vec<usize> {
        if k == 0 || self.groups.is_empty() {
            return Vec::new();
        }
        // Every group holds at least one point, so k groups cover k points.
        let groups = k.min(self.groups.len());
        self.tree
            .nearest_n::<SquaredEuclidean>(&to_frame(&self.frame, query), groups)
            .into_iter()
            .flat_map(|n| self.groups[n.item as usize].iter().copied())
            .take(k)
            .collect()
    }

    /// Indices of the `k` points nearest to indexed point `i`, excluding `i`.
    #[must_use]
    pub fn nearest(&self, positions: &[Point3<f64>], i: usize, k: usize) -> Vec<usize> {
        self.nearest_to(&positions[i], k + 1)
            .into_iter()
            .filter(|&j| j != i)
            .take(k)
            .collect()
    }

    /// Neighbour lists for every indexed point, computed in parallel.
    #[must_use]
    pub fn nearest_all(&self, positions: &[Point3<f64>], k: usize) -> Vec<Vec<usize>> {
        (0..positions.len())
            .into_par_iter()
            .map(|i| self.nearest(positions, i, k))
            .collect()
    }
}

/// Bit pattern of a position, with `-0.0` folded onto `0.0`.
fn position_key(p: &Point3<f64>) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

fn to_frame(frame: &Rotation3<f64>, p: &Point3<f64>) -> [f64; 3] {
    let q = frame * p;
    [q.x, q.y, q.z]
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss)]
mod tests {
    use super::*;

    #[test]
    fn nearest_excludes_self() {
        let positions: Vec<_> = (0..10)
            .map(|i| Point3::new(f64::from(i), 0.0, 0.0))
            .collect();
        let index = NeighborIndex::new(&positions);

        let n = index.nearest(&positions, 5, 2);
        assert_eq!(n.len(), 2);
        assert!(!n.contains(&5));
        assert!(n.contains(&4));
        assert!(n.contains(&6));
    }

    #[test]
    fn nearest_is_sorted_by_distance() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let index = NeighborIndex::new(&positions);
        assert_eq!(index.nearest(&positions, 0, 3), vec![2, 3, 1]);
    }

    #[test]
    fn handles_large_axis_aligned_planes() {
        // 40x40 grid with z = 0 everywhere: far more than one bucket of
        // identical z values.
        let positions: Vec<_> = (0..40)
            .flat_map(|i| (0..40).map(move |j| Point3::new(f64::from(i), f64::from(j), 0.0)))
            .collect();
        let index = NeighborIndex::new(&positions);
        assert_eq!(index.len(), 1600);

        // Interior grid point has four neighbours at distance 1.
        let center = 20 * 40 + 20;
        let n = index.nearest(&positions, center, 4);
        for j in n {
            let d = (positions[j] - positions[center]).norm();
            assert!((d - 1.0).abs() < 1e-9, "unexpected neighbour distance {d}");
        }
    }

    #[test]
    fn nearest_all_matches_single_queries() {
        let positions: Vec<_> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.3;
                Point3::new(t.cos(), t.sin(), t * 0.1)
            })
            .collect();
        let index = NeighborIndex::new(&positions);
        let all = index.nearest_all(&positions, 3);
        for (i, n) in all.iter().enumerate() {
            assert_eq!(n, &index.nearest(&positions, i, 3));
        }
    }

    #[test]
    fn zero_k_returns_nothing() {
        let positions = vec![Point3::origin()];
        let index = NeighborIndex::new(&positions);
        assert!(index.nearest_to(&Point3::origin(), 0).is_empty());
        assert!(index.nearest(&positions, 0, 0).is_empty());
    }

    #[test]
    fn handles_many_coincident_points() {
        // 40 copies of one point: more than a kiddo bucket on every axis.
        let mut positions = vec![Point3::new(0.5, 0.5, 0.5); 40];
        positions.extend((0..20).map(|i| Point3::new(f64::from(i), 2.0, -1.0)));
        let index = NeighborIndex::new(&positions);
        assert_eq!(index.len(), 60);
        assert_eq!(index.distinct_len(), 21);

        let n = index.nearest(&positions, 7, 8);
        assert_eq!(n, vec![0, 1, 2, 3, 4, 5, 6, 8]);

        // All coincident copies come before any distinct point.
        let n = index.nearest(&positions, 3, 45);
        assert_eq!(n.len(), 45);
        assert!(n[..39].iter().all(|&j| j < 40));
        assert!(n[39..].iter().all(|&j| j >= 40));
    }

    #[test]
    fn signed_zero_is_one_position() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(-0.0, 0.0, -0.0)];
        let index = NeighborIndex::new(&positions);
        assert_eq!(index.distinct_len(), 1);
        assert_eq!(index.nearest(&positions, 1, 1), vec![0]);
    }

    #[test]
    fn nearest_to_caps_at_point_count() {
        let positions = vec![Point3::origin(), Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let index = NeighborIndex::new(&positions);
        assert_eq!(index.nearest_to(&Point3::new(2.0, 0.0, 0.0), 10), vec![2, 0, 1]);
    }
}
