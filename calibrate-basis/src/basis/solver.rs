use super::geometry::{Plane, closest_point_on_line};
use bevy::math::{DMat3, DVec3};
use serde::Serialize;

/// Oblique coordinate frame derived from four picked points.
///
/// `basis2` is orthogonal to `basis1` by construction. `basis3` lies along the
/// normal of the plane through the first three points and is scaled by the
/// signed height of the fourth point above that plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub origin: DVec3,
    pub basis1: DVec3,
    pub basis2: DVec3,
    pub basis3: DVec3,
    /// Height of the fourth point over the plane of the first three.
    pub signed_distance: f64,
    /// Component-wise sum `basis1 + basis2 + basis3`.
    pub oblique_sum: DVec3,
    /// Columns are the normalized basis vectors.
    pub orientation: DMat3,
}

impl Basis {
    /// Model-space position of oblique coordinates `(a, b, c)`.
    pub fn oblique_to_model(&self, coords: DVec3) -> DVec3 {
        self.origin + self.basis1 * coords.x + self.basis2 * coords.y + self.basis3 * coords.z
    }

    /// Oblique coordinates of a model-space position.
    pub fn model_to_oblique(&self, position: DVec3) -> DVec3 {
        let frame = DMat3::from_cols(self.basis1, self.basis2, self.basis3);
        frame.inverse() * (position - self.origin)
    }

    pub fn record(&self) -> BasisRecord {
        BasisRecord {
            origin: self.origin.to_array(),
            basis1: self.basis1.to_array(),
            basis2: self.basis2.to_array(),
            basis3: self.basis3.to_array(),
            signed_distance: self.signed_distance,
            oblique_sum: self.oblique_sum.to_array(),
            orientation: self.orientation.to_cols_array_2d(),
        }
    }
}

/// Plain-array form of a [`Basis`] for frontend notifications.
#[derive(Debug, Clone, Serialize)]
pub struct BasisRecord {
    pub origin: [f64; 3],
    pub basis1: [f64; 3],
    pub basis2: [f64; 3],
    pub basis3: [f64; 3],
    pub signed_distance: f64,
    pub oblique_sum: [f64; 3],
    /// Column-major.
    pub orientation: [[f64; 3]; 3],
}

/// Compute the oblique basis for four points.
///
/// The caller guarantees the points are not coplanar; coplanar input yields
/// NaN components in `orientation` rather than an error.
pub fn solve_basis(points: &[DVec3; 4]) -> Basis {
    let [p0, p1, p2, p3] = *points;

    let v01 = p1 - p0;
    let v02 = p2 - p0;

    let basis1 = v01;
    let aux_point = closest_point_on_line(p0, p1, p2);
    let basis2 = p2 - aux_point;

    let plane = Plane::from_coplanar_points(p0, p1, p2);
    let signed_distance = plane.distance_to_point(p3);
    let basis3 = v01.cross(v02).normalize() * signed_distance;

    let oblique_sum = basis1 + basis2 + basis3;
    let orientation = DMat3::from_cols(basis1.normalize(), basis2.normalize(), basis3.normalize());

    Basis {
        origin: p0,
        basis1,
        basis2,
        basis3,
        signed_distance,
        oblique_sum,
        orientation,
    }
}
