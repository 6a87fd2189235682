use crate::{Euler3D, Isometry, Point, Vector};

/// Counts modifications of a `Pose`
pub type Generation = u64;

/// Placement of a volume in space, as chosen by the caller (typically an
/// optimizer proposing candidate registrations).
///
/// Every mutation advances `generation`, so anything derived from the pose can
/// compare the generation it was built from against the current one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    transform: Euler3D,
    generation: Generation,
}

impl Pose {

    pub fn new(transform: Euler3D) -> Self { Self { transform, generation: 0 } }

    /// Identity pose rotating about `center`
    pub fn centred_at(center: Point) -> Self {
        Self::new(Euler3D::new(Vector::zeros(), center, Vector::zeros()))
    }

    pub fn generation(&self) -> Generation { self.generation }
    pub fn transform (&self) -> &Euler3D  { &self.transform }
    pub fn center    (&self) -> Point     { self.transform.center }
    pub fn isometry  (&self) -> Isometry  { self.transform.isometry() }

    pub fn set_transform(&mut self, transform: Euler3D) {
        self.transform = transform;
        self.modified();
    }

    pub fn set_angles(&mut self, angles: Vector) {
        self.transform.angles = angles;
        self.modified();
    }

    pub fn set_translation(&mut self, translation: Vector) {
        self.transform.translation = translation;
        self.modified();
    }

    pub fn set_center(&mut self, center: Point) {
        self.transform.center = center;
        self.modified();
    }

    /// Mark the pose as changed without changing its parameters
    pub fn modified(&mut self) { self.generation += 1; }
}
