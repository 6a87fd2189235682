//! Read-only 3D grid of samples (e.g. a CT scan) through which rays are cast.
//!
//! The traversal works in a frame with one corner of the grid at the origin:
//! voxel `[i,j,k]` occupies `[i·sx, (i+1)·sx) × [j·sy, (j+1)·sy) × [k·sz, (k+1)·sz)`.
//! `origin` only enters through the continuous-index → physical mapping.

use std::path::Path;

use ndarray::{Array3, ShapeBuilder};
use num_traits::AsPrimitive;

use crate::{
    types::{BoxDim_u, ContinuousIndex, Index3_i, Intensityf32, Point, Vector, WorldPoint},
    error::{DrrError, Result},
    io,
};

#[derive(Clone, Debug)]
pub struct Volume<T> {
    data: Array3<T>,
    spacing: Vector,
    origin: Point,
}

impl<T> Volume<T> {

    /// Wrap samples stored with x varying fastest, as in raw scanner output.
    pub fn new(n: BoxDim_u, spacing: Vector, origin: Point, samples: Vec<T>) -> Result<Self> {
        check_dimensions(n, spacing)?;
        let [nx, ny, nz] = n;
        let expected = nx * ny * nz;
        if samples.len() != expected {
            return Err(DrrError::Volume(format!(
                "{} samples supplied for a {nx}x{ny}x{nz} grid (expected {expected})", samples.len()
            )));
        }
        let data = Array3::from_shape_vec((nx, ny, nz).f(), samples)
            .map_err(|e| DrrError::Volume(e.to_string()))?;
        Ok(Self { data, spacing, origin })
    }

    /// Wrap an existing array, indexed `[x, y, z]`
    pub fn from_array(data: Array3<T>, spacing: Vector, origin: Point) -> Result<Self> {
        let (nx, ny, nz) = data.dim();
        check_dimensions([nx, ny, nz], spacing)?;
        Ok(Self { data, spacing, origin })
    }

    pub fn size   (&self) -> BoxDim_u { let (nx, ny, nz) = self.data.dim(); [nx, ny, nz] }
    pub fn spacing(&self) -> Vector   { self.spacing }
    pub fn origin (&self) -> Point    { self.origin }
    pub fn data   (&self) -> &Array3<T> { &self.data }

    /// Full widths of the grid
    pub fn extent(&self) -> Vector {
        let [nx, ny, nz] = self.size();
        Vector::new(nx as f32, ny as f32, nz as f32).component_mul(&self.spacing)
    }

    /// Centre of the grid, in the traversal frame. A natural isocenter.
    pub fn box_centre(&self) -> WorldPoint {
        let e = self.extent();
        WorldPoint::new(e.x as f64 / 2.0, e.y as f64 / 2.0, e.z as f64 / 2.0)
    }

    /// `origin + index · spacing`
    pub fn continuous_index_to_physical(&self, index: &ContinuousIndex) -> WorldPoint {
        let (o, s) = (self.origin, self.spacing);
        WorldPoint::new(o.x as f64 + index.x * s.x as f64,
                        o.y as f64 + index.y * s.y as f64,
                        o.z as f64 + index.z * s.z as f64)
    }
}

impl<T: Copy> Volume<T> {

    /// Grid of `n` voxels all containing `value`
    pub fn filled(n: BoxDim_u, spacing: Vector, origin: Point, value: T) -> Result<Self> {
        check_dimensions(n, spacing)?;
        let [nx, ny, nz] = n;
        Ok(Self { data: Array3::from_elem((nx, ny, nz), value), spacing, origin })
    }

    /// Sample at `index`, or `None` if `index` lies outside the grid
    #[inline]
    pub fn voxel(&self, [i, j, k]: Index3_i) -> Option<T> {
        if i < 0 || j < 0 || k < 0 { return None; }
        self.data.get((i as usize, j as usize, k as usize)).copied()
    }

    /// Sample at `index` converted to the working precision of the traversal
    #[inline]
    pub fn intensity(&self, index: Index3_i) -> Option<Intensityf32>
    where
        T: AsPrimitive<Intensityf32>,
    {
        self.voxel(index).map(|v| v.as_())
    }
}

impl Volume<Intensityf32> {

    /// Read little-endian `f32` samples, x varying fastest
    pub fn from_raw_file(path: &Path, n: BoxDim_u, spacing: Vector, origin: Point) -> Result<Self> {
        let samples = io::raw::read(path)?.collect::<std::io::Result<Vec<_>>>()?;
        log::info!("Read {} samples from {}", samples.len(), path.display());
        Self::new(n, spacing, origin, samples)
    }

    pub fn write_to_raw_file(&self, path: &Path) -> Result<()> {
        // Fortran order is x fastest
        io::raw::write(self.data.t().iter().copied(), path)?;
        Ok(())
    }
}

fn check_dimensions(n: BoxDim_u, spacing: Vector) -> Result<()> {
    if n.iter().any(|&n| n == 0) {
        return Err(DrrError::Volume(format!("grid size must be positive in all dimensions: {n:?}")));
    }
    if spacing.iter().any(|&s| !(s > 0.0)) {
        return Err(DrrError::Volume(format!("voxel spacing must be positive: {:?}", spacing.as_slice())));
    }
    Ok(())
}
