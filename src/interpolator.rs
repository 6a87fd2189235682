//! The ray-casting interpolator: the value "interpolated" at a detector point
//! is the integral of the volume along the ray from the source to that point.
//!
//! Usage follows two phases:
//!
//! + reconfigure (`set_pose`, `pose_mut`, `set_projection_angle`, ...) and
//!   then `initialize`, both requiring exclusive access;
//!
//! + evaluate any number of points, possibly from many threads at once,
//!   through shared references.
//!
//! Evaluating after a reconfiguration without an intervening `initialize` is
//! a programming error and panics.

use std::marker::PhantomData;

use num_traits::{AsPrimitive, Bounded, NumCast, Zero};

use crate::{
    types::{ContinuousIndex, Intensityf32, WorldPoint},
    volume::Volume,
    ray::Ray,
    siddon,
    projection::{narrow, GeometryState, ProjectionGeometry},
};
use geometry::Pose;

/// Projects a volume onto points in ray space.
///
/// `O` is the numeric type of the projected values.
pub trait RayCastInterpolator<O> {

    /// Integral along the ray from the source to `point`, a point in ray space
    /// (typically on the detector plane).
    fn evaluate(&self, point: &WorldPoint) -> O;

    /// As `evaluate`, with the point given as a continuous index into the
    /// volume's grid.
    fn evaluate_at_continuous_index(&self, index: &ContinuousIndex) -> O;

    /// Every point can be projected.
    fn is_inside_buffer(&self, _point: &WorldPoint) -> bool { true }

    /// Rebuild the projection geometry from the current pose and parameters.
    fn initialize(&mut self);

    fn pose(&self) -> &Pose;
    fn set_pose(&mut self, pose: Pose);

    fn focal_point_to_isocenter_distance(&self) -> f64;
    fn set_focal_point_to_isocenter_distance(&mut self, distance: f64);

    /// Gantry angle, in radians
    fn projection_angle(&self) -> f64;
    fn set_projection_angle(&mut self, radians: f64);

    fn threshold(&self) -> Intensityf32;
    fn set_threshold(&mut self, threshold: Intensityf32);
}

/// Siddon-Jacobs ray caster over a borrowed volume with samples of type `T`.
pub struct SiddonJacobs<'v, T, O = Intensityf32> {
    volume: &'v Volume<T>,
    pose: Pose,
    geometry: ProjectionGeometry,
    threshold: Intensityf32,
    output: PhantomData<fn() -> O>,
}

impl<'v, T, O> SiddonJacobs<'v, T, O> {

    /// Identity pose about the centre of `volume`, focal distance 1000 mm,
    /// projection angle 0, threshold 0. Call `initialize` before evaluating.
    pub fn new(volume: &'v Volume<T>) -> Self {
        Self {
            volume,
            pose: Pose::centred_at(volume.box_centre()),
            geometry: ProjectionGeometry::default(),
            threshold: 0.0,
            output: PhantomData,
        }
    }

    pub fn with_threshold(mut self, threshold: Intensityf32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn volume(&self) -> &'v Volume<T> { self.volume }

    /// Modify the pose in place. Every modification marks the geometry as
    /// out of date.
    pub fn pose_mut(&mut self) -> &mut Pose { &mut self.pose }

    /// The geometry built by the last `initialize`, if it is still current.
    pub fn geometry(&self) -> Option<&GeometryState> { self.geometry.current(&self.pose) }

    fn fresh_geometry(&self) -> &GeometryState {
        match self.geometry() {
            Some(state) => state,
            None => panic!(
                "ray caster evaluated with out-of-date geometry (pose generation {}): \
                 call initialize() after changing the pose or projection parameters",
                self.pose.generation()
            ),
        }
    }
}

impl<'v, T, O> SiddonJacobs<'v, T, O>
where
    T: AsPrimitive<Intensityf32>,
{
    /// The unclamped integral along the ray from the source to `point`, in ray space
    pub fn project(&self, point: &WorldPoint) -> Intensityf32 {
        let state = self.fresh_geometry();
        let destination = state.inverse.transform_point(point);
        let ray = Ray::new(narrow(&state.source_world), narrow(&destination));
        siddon::accumulate(self.volume, &ray, self.threshold)
    }
}

impl<'v, T, O> RayCastInterpolator<O> for SiddonJacobs<'v, T, O>
where
    T: AsPrimitive<Intensityf32>,
    O: Bounded + NumCast + Zero + Copy,
{
    fn evaluate(&self, point: &WorldPoint) -> O {
        clamp_to_output(self.project(point))
    }

    fn evaluate_at_continuous_index(&self, index: &ContinuousIndex) -> O {
        self.evaluate(&self.volume.continuous_index_to_physical(index))
    }

    fn initialize(&mut self) { self.geometry.rebuild(&self.pose); }

    fn pose(&self) -> &Pose { &self.pose }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        // The replacement may have the same generation as its predecessor
        self.geometry.invalidate();
    }

    fn focal_point_to_isocenter_distance(&self) -> f64 { self.geometry.focal_point_to_isocenter_distance() }

    fn set_focal_point_to_isocenter_distance(&mut self, distance: f64) {
        if !(distance > 0.0) {
            log::warn!("Focal point to isocenter distance should be positive, got {distance}");
        }
        self.geometry.set_focal_point_to_isocenter_distance(distance);
    }

    fn projection_angle(&self) -> f64 { self.geometry.projection_angle() }
    fn set_projection_angle(&mut self, radians: f64) { self.geometry.set_projection_angle(radians); }

    fn threshold(&self) -> Intensityf32 { self.threshold }
    fn set_threshold(&mut self, threshold: Intensityf32) { self.threshold = threshold; }
}

/// Saturate `value` to the range of `O`. NaN becomes zero.
pub fn clamp_to_output<O>(value: Intensityf32) -> O
where
    O: Bounded + NumCast + Zero + Copy,
{
    if value.is_nan() { return O::zero(); }
    let lo = O::min_value().to_f64().unwrap_or(f64::NEG_INFINITY);
    let hi = O::max_value().to_f64().unwrap_or(f64::INFINITY);
    let v = (value as f64).clamp(lo, hi);
    // Bounds of wide integer types are not exactly representable in f64
    O::from(v).unwrap_or(if v > 0.0 { O::max_value() } else { O::min_value() })
}
