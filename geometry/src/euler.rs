use nalgebra::{Translation3, UnitQuaternion};

use crate::{Isometry, Point, Vector};

/// Rigid transform parameterised by three Euler angles (radians), a centre of
/// rotation and a translation.
///
/// Maps `p` to `R (p - c) + c + t`, where `R = Rz(γ) Ry(β) Rx(α)` and
/// `angles = (α, β, γ)`: the rotation about x is applied first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler3D {
    pub angles: Vector,
    pub center: Point,
    pub translation: Vector,
}

impl Default for Euler3D {
    fn default() -> Self { Self::identity() }
}

impl Euler3D {

    pub fn new(angles: Vector, center: Point, translation: Vector) -> Self {
        Self { angles, center, translation }
    }

    pub fn identity() -> Self {
        Self::new(Vector::zeros(), Point::origin(), Vector::zeros())
    }

    /// Pure rotation by `angle` about an axis parallel to z, through `center`
    pub fn about_z(angle: f64, center: Point) -> Self {
        Self::new(Vector::new(0.0, 0.0, angle), center, Vector::zeros())
    }

    /// Pure rotation by `angle` about the x-axis through the origin
    pub fn about_x(angle: f64) -> Self {
        Self::new(Vector::new(angle, 0.0, 0.0), Point::origin(), Vector::zeros())
    }

    /// Pure translation
    pub fn shift(translation: Vector) -> Self {
        Self::new(Vector::zeros(), Point::origin(), translation)
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let a = self.angles;
        UnitQuaternion::from_euler_angles(a.x, a.y, a.z)
    }

    /// The equivalent `nalgebra` isometry.
    ///
    /// The centre of rotation is folded into the translational part: `c + t - R c`.
    pub fn isometry(&self) -> Isometry {
        let rotation = self.rotation();
        let c = self.center.coords;
        let offset = c + self.translation - rotation * c;
        Isometry::from_parts(Translation3::from(offset), rotation)
    }

    pub fn transform_point(&self, p: &Point) -> Point {
        self.isometry().transform_point(p)
    }
}
