//! Rigid-body placement of volumes in space.
//!
//! + `Euler3D`: rotation by ZYX Euler angles about a centre, followed by a
//!   translation.
//!
//! + `Pose`: an `Euler3D` which records how many times it has been modified,
//!   so that geometry derived from it can tell when it has gone out of date.

mod euler;
mod pose;

pub use euler::Euler3D;
pub use pose::{Pose, Generation};

pub type Point    = nalgebra::Point3<f64>;
pub type Vector   = nalgebra::Vector3<f64>;
pub type Isometry = nalgebra::Isometry3<f64>;
