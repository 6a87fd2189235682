pub use crate::types::{Point, Vector, WorldPoint, ContinuousIndex,
                       Index3_i, BoxDim_u,
                       Lengthf32, Ratiof32, Intensityf32};

pub use crate::error::{DrrError, Result};
pub use crate::volume::Volume;
pub use crate::ray::{Ray, Span};
pub use crate::projection::ProjectionGeometry;
pub use crate::interpolator::{RayCastInterpolator, SiddonJacobs};
pub use crate::detector::{Detector, render};

pub use geometry::{Euler3D, Pose};
