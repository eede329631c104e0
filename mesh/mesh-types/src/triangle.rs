//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete vertex positions.
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
/// assert!((tri.area() - 0.5).abs() < 1e-10);
/// assert!((tri.normal_unnormalized().z - 1.0).abs() < 1e-10);
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

    /// Create a triangle from coordinate arrays.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_arrays(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> Self {
        Self {
            v0: Point3::from(v0),
            v1: Point3::from(v1),
            v2: Point3::from(v2),
        }
    }

    /// Compute the (unnormalized) face normal via cross product.
    ///
    /// The magnitude equals twice the triangle's area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the area of the triangle.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Closest point on the triangle (including its interior) to `point`.
    ///
    /// Classifies `point` against the Voronoi regions of the vertices, edges
    /// and face, following Ericson, *Real-Time Collision Detection*, 5.1.5.
    ///
    /// ```
    /// use mesh_types::{Triangle, Point3};
    ///
    /// let tri = Triangle::from_arrays([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
    /// let p = tri.closest_point(Point3::new(0.5, 0.5, 3.0));
    /// assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    /// ```
    #[must_use]
    pub fn closest_point(&self, point: Point3<f64>) -> Point3<f64> {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        let ab = b - a;
        let ac = c - a;

        let ap = point - a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = point - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = point - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() < f64::MIN_POSITIVE {
            // Degenerate triangle that slipped through the region tests.
            return a;
        }
        a + ab * (vb / denom) + ac * (vc / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> Triangle {
        Triangle::from_arrays([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0])
    }

    #[test]
    fn degenerate_triangle_area() {
        let tri = Triangle::from_arrays([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        assert_relative_eq!(tri.normal_unnormalized().norm(), 0.0);
        assert_relative_eq!(tri.area(), 0.0);
    }

    #[test]
    fn closest_point_inside() {
        let closest = right_triangle().closest_point(Point3::new(2.0, 3.0, 5.0));
        assert_relative_eq!(closest, Point3::new(2.0, 3.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn closest_point_vertex_region() {
        let closest = right_triangle().closest_point(Point3::new(-5.0, -5.0, 1.0));
        assert_relative_eq!(closest, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);

        let closest = right_triangle().closest_point(Point3::new(15.0, -1.0, 0.0));
        assert_relative_eq!(closest, Point3::new(10.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn closest_point_edge_regions() {
        let tri = right_triangle();

        // Below edge v0-v1
        let p = tri.closest_point(Point3::new(4.0, -3.0, 0.0));
        assert_relative_eq!(p, Point3::new(4.0, 0.0, 0.0), epsilon = 1e-12);

        // Left of edge v0-v2
        let p = tri.closest_point(Point3::new(-2.0, 6.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 6.0, 0.0), epsilon = 1e-12);

        // Beyond the hypotenuse
        let p = tri.closest_point(Point3::new(10.0, 10.0, 0.0));
        assert_relative_eq!(p, Point3::new(5.0, 5.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn closest_point_on_degenerate_triangle() {
        let tri = Triangle::from_arrays([1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        let p = tri.closest_point(Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 1.0));
    }
}
