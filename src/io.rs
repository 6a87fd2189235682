pub mod raw;

use std::path::Path;

use ndarray::Array2;
use num_traits::AsPrimitive;

/// Write a projection image as little-endian `f32`s, `u` varying fastest
pub fn write_image<O>(image: &Array2<O>, path: &Path) -> std::io::Result<()>
where
    O: AsPrimitive<f32>,
{
    raw::write(image.iter().map(|&pixel| pixel.as_()), path)
}
