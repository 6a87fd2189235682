//! Projection geometry: where the X-ray source sits relative to the volume,
//! and the transform between the volume's frame ("world") and the frame in
//! which rays are cast ("ray space").
//!
//! In ray space the source sits at the origin, looking down the negative z
//! axis, with +y up. The world → ray transform is built by composing, in order
//! of application:
//!
//! 1. the caller's pose of the volume,
//!
//! 2. a rotation by `-angle` about the z axis through the isocenter (the
//!    pose's centre), simulating rotation of the gantry,
//!
//! 3. a translation which brings the source, located `focal distance` from
//!    the isocenter along -y, to the origin,
//!
//! 4. a fixed rotation of -90° about x, turning the +y projection direction
//!    into -z.
//!
//! With an identity pose and zero angle, the source lies at
//! `isocenter - F ŷ` and rays travel towards +y (an AP projection).

use std::f64::consts::FRAC_PI_2;

use geometry::{Euler3D, Generation, Isometry, Pose};

use crate::types::{Vector, WorldPoint};

/// Position of the source in ray space
pub fn source_point() -> WorldPoint { WorldPoint::origin() }

/// Compose the world → ray transform
pub fn compose(pose: &Pose, focal_point_to_isocenter_distance: f64, projection_angle: f64) -> Isometry {
    let isocenter = pose.center();

    let gantry = Euler3D::about_z(-projection_angle, isocenter);

    let shift_source_to_origin = Euler3D::shift(geometry::Vector::new(
        -isocenter.x,
        focal_point_to_isocenter_distance - isocenter.y,
        -isocenter.z,
    ));

    let camera = Euler3D::about_x(-FRAC_PI_2);

    camera.isometry() * shift_source_to_origin.isometry() * gantry.isometry() * pose.isometry()
}

/// Everything derived from the pose and projection parameters that is needed
/// to cast rays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryState {
    /// world → ray space
    pub composed: Isometry,
    /// ray space → world
    pub inverse: Isometry,
    /// The source, in the volume's frame
    pub source_world: WorldPoint,
    /// Generation of the pose from which this state was derived
    generation: Generation,
}

impl GeometryState {
    pub fn generation(&self) -> Generation { self.generation }
}

/// Projection parameters, and a cache of the geometry derived from them and a
/// pose.
///
/// The cache is rebuilt only by `rebuild`, never as a side effect of reading
/// it: callers must `rebuild` after changing the pose or the parameters, and
/// before casting rays.
#[derive(Clone, Debug)]
pub struct ProjectionGeometry {
    focal_point_to_isocenter_distance: f64,
    projection_angle: f64,
    state: Option<GeometryState>,
}

impl Default for ProjectionGeometry {
    fn default() -> Self { Self::new(1000.0, 0.0) }
}

impl ProjectionGeometry {

    /// `focal_point_to_isocenter_distance` in the units of the volume's
    /// spacing (`mm`); `projection_angle` in radians.
    pub fn new(focal_point_to_isocenter_distance: f64, projection_angle: f64) -> Self {
        Self { focal_point_to_isocenter_distance, projection_angle, state: None }
    }

    pub fn focal_point_to_isocenter_distance(&self) -> f64 { self.focal_point_to_isocenter_distance }
    pub fn projection_angle                 (&self) -> f64 { self.projection_angle }

    pub fn set_focal_point_to_isocenter_distance(&mut self, distance: f64) {
        self.focal_point_to_isocenter_distance = distance;
        self.invalidate();
    }

    pub fn set_projection_angle(&mut self, radians: f64) {
        self.projection_angle = radians;
        self.invalidate();
    }

    /// Forget the cached geometry, e.g. because the pose was replaced wholesale.
    pub fn invalidate(&mut self) { self.state = None; }

    pub fn is_stale(&self, pose: &Pose) -> bool { self.current(pose).is_none() }

    /// The cached geometry, provided it was built from the current generation
    /// of `pose` and the current parameters.
    pub fn current(&self, pose: &Pose) -> Option<&GeometryState> {
        self.state.as_ref().filter(|s| s.generation == pose.generation())
    }

    /// Recompute the composed transform, its inverse and the source position
    pub fn rebuild(&mut self, pose: &Pose) -> &GeometryState {
        let composed = compose(pose, self.focal_point_to_isocenter_distance, self.projection_angle);
        let inverse = composed.inverse();
        let source_world = inverse.transform_point(&source_point());
        log::debug!(
            "Projection geometry rebuilt for pose generation {}: angle {:.4} rad, focal distance {} mm, source at ({:.2}, {:.2}, {:.2})",
            pose.generation(), self.projection_angle, self.focal_point_to_isocenter_distance,
            source_world.x, source_world.y, source_world.z,
        );
        self.state.insert(GeometryState { composed, inverse, source_world, generation: pose.generation() })
    }
}

/// Narrow `f64` world point to the working precision of the traversal
#[inline]
pub fn narrow(p: &WorldPoint) -> crate::types::Point {
    crate::types::Point::new(p.x as f32, p.y as f32, p.z as f32)
}

/// Direction in which the central ray travels, in the volume's frame
pub fn central_axis(state: &GeometryState) -> Vector {
    let towards = state.inverse.transform_point(&WorldPoint::new(0.0, 0.0, -1.0));
    narrow(&towards) - narrow(&state.source_world)
}

#[cfg(test)]
mod test_projection {
    use super::*;
    use rstest::rstest;
    use float_eq::assert_float_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    fn xyz(p: WorldPoint) -> (f64, f64, f64) { (p.x, p.y, p.z) }
    const TOL: (f64, f64, f64) = (1e-9, 1e-9, 1e-9);

    fn isocenter() -> WorldPoint { WorldPoint::new(10.0, 20.0, 30.0) }

    // Source at isocenter + F (sin θ, -cos θ, 0)
    #[rstest(/**/ angle        ,   expected_offset     ,
             case(0.0          , (    0.0, -1000.0, 0.0)),
             case(FRAC_PI_2    , ( 1000.0,     0.0, 0.0)),
             case(PI           , (    0.0,  1000.0, 0.0)),
             case(-FRAC_PI_2   , (-1000.0,     0.0, 0.0)),
    )]
    fn source_position(angle: f64, expected_offset: (f64, f64, f64)) {
        let pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::new(1000.0, angle);
        let state = *projection.rebuild(&pose);
        let (dx, dy, dz) = expected_offset;
        let c = isocenter();
        let expected = (c.x + dx, c.y + dy, c.z + dz);
        assert_float_eq!(xyz(state.source_world), expected, abs <= (1e-9, 1e-9, 1e-9));
        // The forward transform takes it back to the ray-space origin
        let back = state.composed.transform_point(&state.source_world);
        assert_float_eq!(xyz(back), (0.0, 0.0, 0.0), abs <= TOL);
    }

    #[test]
    fn rays_travel_towards_positive_y_at_zero_angle() {
        let pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::new(500.0, 0.0);
        let state = *projection.rebuild(&pose);
        let axis = central_axis(&state);
        assert_float_eq!((axis.x, axis.y, axis.z), (0.0, 1.0, 0.0), abs <= (1e-6, 1e-6, 1e-6));
        // The isocenter lies on the central axis, at distance F from the source
        let iso_in_ray_space = state.composed.transform_point(&isocenter());
        assert_float_eq!(xyz(iso_in_ray_space), (0.0, 0.0, -500.0), abs <= TOL);
    }

    #[test]
    fn ray_space_up_is_world_z() {
        let pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::new(500.0, 0.0);
        let state = *projection.rebuild(&pose);
        let up = state.inverse.transform_point(&WorldPoint::new(0.0, 1.0, -500.0));
        let c = isocenter();
        assert_float_eq!(xyz(up), (c.x, c.y, c.z + 1.0), abs <= TOL);
    }

    #[test]
    fn composed_and_inverse_cancel() {
        let mut pose = Pose::centred_at(isocenter());
        pose.set_angles(geometry::Vector::new(0.1, -0.2, 0.3));
        pose.set_translation(geometry::Vector::new(4.0, -5.0, 6.0));
        let mut projection = ProjectionGeometry::new(1000.0, 0.7);
        let state = *projection.rebuild(&pose);
        for p in [WorldPoint::new(1.0, 2.0, 3.0), WorldPoint::new(-100.0, 250.0, 17.5), WorldPoint::origin()] {
            let there_and_back = state.inverse.transform_point(&state.composed.transform_point(&p));
            assert_float_eq!(xyz(there_and_back), xyz(p), abs <= TOL);
        }
    }

    #[test]
    fn pose_translation_moves_volume_relative_to_source() {
        // Moving the volume by +t is equivalent to moving the source by -t
        let mut pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::new(1000.0, 0.0);
        let before = projection.rebuild(&pose).source_world;
        pose.set_translation(geometry::Vector::new(3.0, 0.0, -2.0));
        let after = projection.rebuild(&pose).source_world;
        assert_float_eq!(xyz(after), (before.x - 3.0, before.y, before.z + 2.0), abs <= TOL);
    }

    #[test]
    fn staleness_tracks_pose_generation_and_parameters() {
        let mut pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::default();
        assert!(projection.is_stale(&pose));

        projection.rebuild(&pose);
        assert!(!projection.is_stale(&pose));
        assert_eq!(projection.current(&pose).map(GeometryState::generation), Some(0));

        pose.set_angles(geometry::Vector::new(0.0, 0.0, 0.1));
        assert!(projection.is_stale(&pose));
        projection.rebuild(&pose);
        assert_eq!(projection.current(&pose).map(GeometryState::generation), Some(1));

        projection.set_projection_angle(0.5);
        assert!(projection.is_stale(&pose));
        projection.rebuild(&pose);
        projection.set_focal_point_to_isocenter_distance(800.0);
        assert!(projection.is_stale(&pose));
    }

    #[test]
    fn rebuild_leaves_parameters_alone() {
        let pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::new(1234.0, 0.25);
        projection.rebuild(&pose);
        assert_eq!(projection.focal_point_to_isocenter_distance(), 1234.0);
        assert_eq!(projection.projection_angle(), 0.25);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let pose = Pose::centred_at(isocenter());
        let mut projection = ProjectionGeometry::new(1000.0, 0.3);
        let first  = *projection.rebuild(&pose);
        let second = *projection.rebuild(&pose);
        assert_eq!(first, second);
    }
}
