use bevy::math::DVec3;
use constants::calibration::COPLANARITY_EPSILON;

/// Scalar triple product `(v1 x v2) . v3` of the edges leaving `points[0]`.
/// Its magnitude is six times the volume of the tetrahedron spanned by the points.
pub fn triple_product(points: &[DVec3; 4]) -> f64 {
    let v1 = points[1] - points[0];
    let v2 = points[2] - points[0];
    let v3 = points[3] - points[0];
    v1.cross(v2).dot(v3)
}

/// True when the four points cannot span a 3D basis.
pub fn are_coplanar(points: &[DVec3; 4]) -> bool {
    triple_product(points).abs() < COPLANARITY_EPSILON
}

/// Closest point to `point` on the infinite line through `start` and `end`.
/// The projection parameter is not clamped to the segment.
pub fn closest_point_on_line(start: DVec3, end: DVec3, point: DVec3) -> DVec3 {
    let start_end = end - start;
    let t = (point - start).dot(start_end) / start_end.length_squared();
    start + start_end * t
}

/// Plane in Hessian normal form: `normal . p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub constant: f64,
}

impl Plane {
    /// Plane through three points, normal oriented by the right-hand rule
    /// over the order `a`, `b`, `c`.
    pub fn from_coplanar_points(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let normal = (c - b).cross(a - b).normalize();
        Self {
            normal,
            constant: -normal.dot(a),
        }
    }

    /// Signed distance, positive on the side the normal points to.
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetrahedron() -> [DVec3; 4] {
        [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]
    }

    #[test]
    fn triple_product_of_unit_tetrahedron() {
        assert_relative_eq!(triple_product(&unit_tetrahedron()), 1.0);
        assert!(!are_coplanar(&unit_tetrahedron()));
    }

    #[test]
    fn flat_points_are_coplanar() {
        let points = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::new(-4.0, 7.5, 0.0),
        ];
        assert!(are_coplanar(&points));
    }

    #[test]
    fn coplanarity_threshold_is_strict() {
        // Volume just under and just over the threshold.
        let below = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(0.0, 0.0, 0.9e-4)];
        let above = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(0.0, 0.0, 1.1e-4)];
        assert!(are_coplanar(&below));
        assert!(!are_coplanar(&above));
    }

    #[test]
    fn reordering_flips_sign_not_verdict() {
        let points = [
            DVec3::new(0.5, -1.0, 2.0),
            DVec3::new(2.0, 0.5, 1.0),
            DVec3::new(-1.0, 3.0, 0.0),
            DVec3::new(0.0, 0.0, 4.0),
        ];
        let swapped = [points[0], points[2], points[1], points[3]];
        let forward = triple_product(&points);
        let backward = triple_product(&swapped);
        assert_relative_eq!(forward, -backward, epsilon = 1e-12);
        assert_eq!(are_coplanar(&points), are_coplanar(&swapped));
    }

    #[test]
    fn closest_point_is_not_clamped() {
        let p = closest_point_on_line(DVec3::ZERO, DVec3::X, DVec3::new(3.0, 2.0, 0.0));
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 0.0);

        let behind = closest_point_on_line(DVec3::ZERO, DVec3::X, DVec3::new(-2.0, 1.0, 1.0));
        assert_relative_eq!(behind.x, -2.0);
    }

    #[test]
    fn plane_normal_follows_point_order() {
        let plane = Plane::from_coplanar_points(DVec3::ZERO, DVec3::X, DVec3::Y);
        assert_relative_eq!(plane.normal.z, 1.0);
        assert_relative_eq!(plane.distance_to_point(DVec3::new(5.0, 5.0, 2.0)), 2.0);

        let flipped = Plane::from_coplanar_points(DVec3::ZERO, DVec3::Y, DVec3::X);
        assert_relative_eq!(flipped.distance_to_point(DVec3::new(5.0, 5.0, 2.0)), -2.0);
    }

    #[test]
    fn offset_plane_constant() {
        let plane = Plane::from_coplanar_points(
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
        );
        assert_relative_eq!(plane.constant, -1.0);
        assert_relative_eq!(plane.distance_to_point(DVec3::ZERO), -1.0);
    }
}
