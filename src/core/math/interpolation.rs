use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Calculates the barycentric coordinates (alpha, beta, gamma) of point p
/// with respect to triangle (v1, v2, v3).
///
/// Returns `None` if the triangle is degenerate (area is near zero).
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // 2x signed area
    let total_area_x2 = e1.x * e2.y - e1.y * e2.x;

    if total_area_x2.abs() < EPSILON {
        return None;
    }

    let inv_total_area_x2 = 1.0 / total_area_x2;

    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_total_area_x2;
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_total_area_x2;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

/// Checks if the barycentric coordinates represent a point inside the triangle.
#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Twice the signed area of a 2D triangle. Positive for counter-clockwise winding
/// in a y-up coordinate system.
#[inline]
pub fn signed_area_x2(v0: Point2<f32>, v1: Point2<f32>, v2: Point2<f32>) -> f32 {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    e1.x * e2.y - e1.y * e2.x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_has_equal_weights() {
        let bary = barycentric_coordinates(
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 3.0),
        )
        .unwrap();
        assert!((bary - Vector3::repeat(1.0 / 3.0)).norm() < 1e-5);
        assert!(is_inside_triangle(bary));
    }

    #[test]
    fn degenerate_triangle_has_no_coordinates() {
        let p = Point2::new(0.5, 0.5);
        let v = Point2::new(1.0, 1.0);
        assert!(barycentric_coordinates(p, v, v, v).is_none());
    }

    #[test]
    fn winding_sign() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert!(signed_area_x2(a, b, c) > 0.0);
        assert!(signed_area_x2(a, c, b) < 0.0);
    }
}
