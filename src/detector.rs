//! Detector plane and rendering of complete DRRs.
//!
//! The detector is a rectangular grid of pixels perpendicular to the central
//! ray, at `source_to_detector_distance` from the source. Pixel `[i, j]`
//! (`i` along `u`, `j` along `v`) is centred at the ray-space point
//!
//! ```text
//! (ou + (i - (nu-1)/2)·su,  ov + (j - (nv-1)/2)·sv,  -d)
//! ```
//!
//! so that, with zero offset, the grid is centred on the central ray. In the
//! volume's frame `u` follows the gantry's horizontal axis and `v` follows `+z`.

use std::time::Instant;

use ndarray::{Array2, Axis};
use ndarray::parallel::prelude::*;
use num_traits::Zero;

use crate::{
    interpolator::RayCastInterpolator,
    types::WorldPoint,
    utils::group_digits,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Detector {
    /// Number of pixels along `u` and `v`
    pub n: [usize; 2],
    /// Centre-to-centre pixel distance along `u` and `v`
    pub pixel_size: [f64; 2],
    /// Position of the detector's centre relative to the central ray
    pub offset: [f64; 2],
    pub source_to_detector_distance: f64,
}

impl Detector {

    /// Detector centred on the central ray
    pub fn centred(n: [usize; 2], pixel_size: [f64; 2], source_to_detector_distance: f64) -> Self {
        Self { n, pixel_size, offset: [0.0, 0.0], source_to_detector_distance }
    }

    pub fn n_pixels(&self) -> usize { self.n[0] * self.n[1] }

    /// Ray-space position of the centre of pixel `[i, j]`
    pub fn pixel_point(&self, [i, j]: [usize; 2]) -> WorldPoint {
        let [nu, nv] = self.n;
        let [su, sv] = self.pixel_size;
        let [ou, ov] = self.offset;
        let u = ou + (i as f64 - (nu as f64 - 1.0) / 2.0) * su;
        let v = ov + (j as f64 - (nv as f64 - 1.0) / 2.0) * sv;
        WorldPoint::new(u, v, -self.source_to_detector_distance)
    }
}

/// Project every pixel of `detector`.
///
/// The image is indexed `[j, i]`: one row per `v`, so that iterating in
/// standard order visits `u` fastest.
pub fn render<I, O>(interpolator: &I, detector: &Detector) -> Array2<O>
where
    I: RayCastInterpolator<O> + Sync,
    O: Zero + Clone + Send + Sync,
{
    render_with_progress(interpolator, detector, |_| ())
}

/// As `render`, calling `row_done` with the index of each row as it is
/// completed. Rows are processed in parallel, so completions arrive in no
/// particular order.
pub fn render_with_progress<I, O, F>(interpolator: &I, detector: &Detector, row_done: F) -> Array2<O>
where
    I: RayCastInterpolator<O> + Sync,
    O: Zero + Clone + Send + Sync,
    F: Fn(usize) + Sync,
{
    let [nu, nv] = detector.n;
    let start = Instant::now();
    let mut image = Array2::<O>::zeros((nv, nu));
    image
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut row)| {
            for (i, pixel) in row.iter_mut().enumerate() {
                *pixel = interpolator.evaluate(&detector.pixel_point([i, j]));
            }
            row_done(j);
        });
    log::info!("Projected {} pixels ({nu} x {nv}) in {:.1?}", group_digits(detector.n_pixels()), start.elapsed());
    image
}

#[cfg(test)]
mod test_detector {
    use super::*;
    use crate::{Volume, SiddonJacobs, types::{Point, Vector}};
    use float_eq::assert_float_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    fn xyz(p: WorldPoint) -> (f64, f64, f64) { (p.x, p.y, p.z) }

    #[test]
    fn pixel_layout() {
        let detector = Detector { n: [3, 2], pixel_size: [2.0, 1.0], offset: [10.0, -5.0], source_to_detector_distance: 1500.0 };
        assert_float_eq!(xyz(detector.pixel_point([0, 0])), ( 8.0, -5.5, -1500.0), ulps <= (1, 1, 1));
        assert_float_eq!(xyz(detector.pixel_point([1, 0])), (10.0, -5.5, -1500.0), ulps <= (1, 1, 1));
        assert_float_eq!(xyz(detector.pixel_point([2, 1])), (12.0, -4.5, -1500.0), ulps <= (1, 1, 1));
        assert_eq!(detector.n_pixels(), 6);
    }

    #[test]
    fn centred_detector_has_central_pixel_on_axis() {
        let detector = Detector::centred([5, 5], [0.5, 0.5], 1200.0);
        assert_eq!(xyz(detector.pixel_point([2, 2])), (0.0, 0.0, -1200.0));
    }

    fn uniform_cube_drr() -> Array2<f32> {
        let volume = Volume::filled([10, 10, 10], Vector::new(1.0, 1.0, 1.0), Point::origin(), 1.0_f32).unwrap();
        let mut drr = SiddonJacobs::<_, f32>::new(&volume);
        drr.initialize();
        // Detector in the isocenter plane: pixels 4 mm apart at the volume
        render(&drr, &Detector::centred([5, 5], [4.0, 4.0], 1000.0))
    }

    #[test]
    fn uniform_cube_projects_symmetrically() {
        let image = uniform_cube_drr();
        assert_eq!(image.dim(), (5, 5));
        // Central ray crosses 10 voxels
        assert_float_eq!(image[[2, 2]], 10.0, rmax <= 1e-4);
        // Outermost pixels see rays passing beside the volume
        assert_eq!(image[[0, 0]], 0.0);
        assert_eq!(image[[4, 2]], 0.0);
        for j in 0..5 {
            for i in 0..5 {
                assert_float_eq!(image[[j, i]], image[[j, 4 - i]], abs <= 1e-3);
                assert_float_eq!(image[[j, i]], image[[4 - j, i]], abs <= 1e-3);
                assert_float_eq!(image[[j, i]], image[[i, j]]    , abs <= 1e-3);
            }
        }
    }

    #[test]
    fn render_agrees_with_pointwise_evaluation() {
        let volume = Volume::new([2, 3, 4], Vector::new(1.0, 2.0, 0.5), Point::origin(), (0..24).map(|n| n as f32).collect()).unwrap();
        let mut drr = SiddonJacobs::<_, f32>::new(&volume);
        drr.set_projection_angle(0.4);
        drr.initialize();
        let detector = Detector { n: [4, 3], pixel_size: [0.7, 0.4], offset: [0.1, -0.2], source_to_detector_distance: 1100.0 };
        let image = render(&drr, &detector);
        for ((j, i), &pixel) in image.indexed_iter() {
            assert_eq!(pixel, drr.evaluate(&detector.pixel_point([i, j])));
        }
    }

    #[test]
    fn integer_images_saturate() {
        let volume = Volume::filled([10, 10, 10], Vector::new(100.0, 100.0, 100.0), Point::origin(), 1.0_f32).unwrap();
        let mut drr = SiddonJacobs::<_, u8>::new(&volume);
        drr.initialize();
        // 1000 mm of unit density along the central ray
        let image = render(&drr, &Detector::centred([1, 1], [1.0, 1.0], 1000.0));
        assert_eq!(image[[0, 0]], u8::MAX);
    }

    #[test]
    fn every_row_is_reported() {
        let volume = Volume::filled([4, 4, 4], Vector::new(1.0, 1.0, 1.0), Point::origin(), 1_u8).unwrap();
        let mut drr = SiddonJacobs::<_, u16>::new(&volume);
        drr.initialize();
        let rows = AtomicUsize::new(0);
        let image = render_with_progress(&drr, &Detector::centred([3, 7], [1.0, 1.0], 1000.0), |_| {
            rows.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(image.dim(), (7, 3));
        assert_eq!(rows.load(Ordering::Relaxed), 7);
    }
}
