pub use units::todo::{Lengthf32, Ratiof32, Intensityf32};

/// Points and vectors in the volume's frame, as used by the traversal: `mm`
pub type Vector = nalgebra::Vector3<Lengthf32>;
pub type Point  = nalgebra::Point3 <Lengthf32>;

/// Points handled by the projection geometry. Double precision, because they
/// pass through several composed transforms before reaching the traversal.
pub type WorldPoint      = geometry::Point;
pub type ContinuousIndex = nalgebra::Point3<f64>;

/// Voxel indices may lie outside the grid while a ray is being traversed
#[allow(non_camel_case_types)] pub type Index3_i = [i32; 3];
#[allow(non_camel_case_types)] pub type BoxDim_u = [usize; 3];
