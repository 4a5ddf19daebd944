//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete vertex positions.
///
/// Produced on the fly by fan triangulation of mesh faces; it stores the
/// positions themselves rather than vertex handles.
///
/// Winding is **counter-clockwise (CCW) when viewed from the front**
/// (normal points toward viewer).
///
/// # Example
///
/// ```
/// use mesh_types::{Triangle, Point3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
///
/// // Area of a right triangle with legs 1 and 1
/// assert!((tri.area() - 0.5).abs() < 1e-10);
///
/// // Normal points in +Z direction
/// let normal = tri.normal().unwrap();
/// assert!((normal.z - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// The three corners in order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Compute the (unnormalized) face normal via cross product.
    ///
    /// The direction follows the right-hand rule with CCW winding.
    /// The magnitude equals twice the triangle's area.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Triangle, Point3};
    ///
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    /// );
    ///
    /// let n = tri.normal_unnormalized();
    /// // Magnitude = 2 * area = 2 * 2 = 4
    /// assert!((n.norm() - 4.0).abs() < 1e-10);
    /// ```
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    ///
    /// Returns `None` for degenerate triangles (zero area).
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Triangle, Point3};
    ///
    /// // Right triangle with legs 3 and 4
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(3.0, 0.0, 0.0),
    ///     Point3::new(0.0, 4.0, 0.0),
    /// );
    /// assert!((tri.area() - 6.0).abs() < 1e-10);
    /// ```
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid (center of mass).
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        self.point_at([1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])
    }

    /// The point with barycentric weights `c` (expected to sum to 1).
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Triangle, Point3};
    ///
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    /// );
    /// let p = tri.point_at([0.5, 0.5, 0.0]);
    /// assert!((p.x - 1.0).abs() < 1e-12);
    /// ```
    #[inline]
    #[must_use]
    pub fn point_at(&self, c: [f64; 3]) -> Point3<f64> {
        Point3::from(self.v0.coords * c[0] + self.v1.coords * c[1] + self.v2.coords * c[2])
    }

    /// Barycentric weights of `p` projected onto the triangle's plane.
    ///
    /// Returns `None` for degenerate triangles.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn barycentric(&self, p: &Point3<f64>) -> Option<[f64; 3]> {
        let e0 = self.v1 - self.v0;
        let e1 = self.v2 - self.v0;
        let d = p - self.v0;

        let d00 = e0.dot(&e0);
        let d01 = e0.dot(&e1);
        let d11 = e1.dot(&e1);
        let d20 = d.dot(&e0);
        let d21 = d.dot(&e1);

        let denom = d00.mul_add(d11, -(d01 * d01));
        if denom <= f64::EPSILON * d00 * d11 {
            return None;
        }

        let v = d11.mul_add(d20, -(d01 * d21)) / denom;
        let w = d00.mul_add(d21, -(d01 * d20)) / denom;
        Some([1.0 - v - w, v, w])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn triangle_normal() {
        let n = right_triangle().normal().unwrap();
        assert_relative_eq!(n.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn triangle_area() {
        assert_relative_eq!(right_triangle().area(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn triangle_centroid() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        );
        let c = tri.centroid();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_triangle_normal() {
        let degen = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(degen.normal().is_none());
        assert!(degen.barycentric(&Point3::origin()).is_none());
    }

    #[test]
    fn barycentric_inverts_point_at() {
        let tri = Triangle::new(
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(4.0, 0.0, 1.0),
            Point3::new(0.0, 3.0, -1.0),
        );
        let weights = [0.2, 0.3, 0.5];
        let p = tri.point_at(weights);
        let back = tri.barycentric(&p).unwrap();
        for (a, b) in weights.iter().zip(back) {
            assert_relative_eq!(*a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn corners_have_unit_weights() {
        let tri = right_triangle();
        let w = tri.barycentric(&tri.v2).unwrap();
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[2], 1.0, epsilon = 1e-12);
    }
}
