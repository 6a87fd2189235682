//! Siddon-Jacobs incremental traversal of the voxels crossed by a ray.
//!
//! The algorithm is centred around one key simplification: express the voxel
//! size in terms of the ray's parametric coordinate `α`. Crossing one voxel
//! along axis `k` always costs the same `Δα_k = spacing_k / |direction_k|`, so
//! after locating the first boundary ahead of the entry point on each axis,
//! every later boundary is found by repeated addition. At each step the
//! nearest boundary (smallest running `α`) is crossed, and the distance covered
//! since the previous crossing is the ray's path length in the voxel just left.
//!
//! References:
//!
//! + R. L. Siddon, "Fast calculation of the exact radiological path for a
//!   three-dimensional CT array", Medical Physics 12, 252-255 (1985).
//!
//! + F. Jacobs, E. Sundermann, B. De Sutter, M. Christiaens, I. Lemahieu, "A
//!   fast algorithm to calculate the exact radiological path through a pixel or
//!   voxel space", Journal of Computing and Information Technology 6, 89-94
//!   (1998).

use num_traits::AsPrimitive;

use crate::{
    Volume,
    ray::{box_intersection, Ray, Span},
    types::{BoxDim_u, Index3_i, Intensityf32, Lengthf32, Ratiof32, Vector},
};

/// Running `α` for axes parallel to the ray: never the smallest
const NEVER: Ratiof32 = Ratiof32::INFINITY;

/// Continuous indices this close to an integer are taken to lie on the boundary
const EPS: Ratiof32 = 1e-5;

/// Integrate `(intensity - threshold)` along `ray`, over the voxels of `volume`
/// whose intensity exceeds `threshold`.
///
/// The result is a physical path integral: the sum, over the voxels crossed,
/// of the length of the ray inside the voxel times the voxel's excess over the
/// threshold. A ray which misses the volume gives zero.
pub fn accumulate<T>(volume: &Volume<T>, ray: &Ray, threshold: Intensityf32) -> Intensityf32
where
    T: AsPrimitive<Intensityf32>,
{
    let Some(span) = box_intersection(ray, volume.extent()) else { return 0.0 };
    let mut sum: Intensityf32 = 0.0;
    for (index, delta_alpha) in Traversal::new(ray, span, volume.spacing(), volume.size()) {
        // Rounding may place a sliver of the path just outside the grid
        let Some(value) = volume.intensity(index) else { continue };
        if value > threshold {
            sum += delta_alpha * (value - threshold);
        }
    }
    sum * ray.length()
}

/// State of the walk along one ray: the voxel currently occupied, and where
/// the next boundary lies on each axis.
///
/// Yields each voxel crossed, in order, paired with the parametric length of
/// the ray inside it. Voxels which the ray merely touches at an edge or corner
/// (zero length) are not yielded. Boundaries are found by repeated addition,
/// so rounding may produce a sliver in a voxel just outside the grid at the
/// exit: consumers must check indices against the grid.
#[derive(Clone, Debug)]
pub struct Traversal {
    /// Voxel containing the ray between `here` and the next crossing
    index: Index3_i,
    /// Per-axis `α` of the next voxel boundary
    next_crossing: [Ratiof32; 3],
    /// Per-axis `α` between consecutive boundaries
    delta: [Ratiof32; 3],
    /// Per-axis change in `index` when a boundary is crossed
    step: [i32; 3],
    /// How far along the ray we have come
    here: Ratiof32,
    /// Where the ray leaves the volume
    exit: Ratiof32,
}

impl Traversal {

    pub fn new(ray: &Ray, span: Span, spacing: Vector, n: BoxDim_u) -> Self {
        let direction = ray.direction();
        let source = ray.source;

        // Entry point expressed in voxel coordinates: floor(position) = index
        // of voxel. The entry point lies on the surface of the grid, so
        // anything outside it is rounding error.
        let entry = ray.at(span.min);

        let mut index = [0; 3];
        let mut next_crossing = [NEVER; 3];
        let mut delta = [NEVER; 3];
        let mut step = [0; 3];

        for k in 0..3 {
            let (d, s) = (direction[k], spacing[k]);
            let continuous = snap(entry[k] / s).clamp(0.0, n[k] as Ratiof32);
            step[k] = if d > 0.0 { 1 } else { -1 };
            if d == 0.0 {
                index[k] = continuous.floor() as i32;
                continue;
            }
            // On a boundary, the voxel entered is the one on the far side of
            // it, which for negative directions is below the boundary.
            let voxel = if d > 0.0 { continuous.floor() } else { continuous.ceil() - 1.0 };
            let boundary = if d > 0.0 { voxel + 1.0 } else { voxel };
            index[k] = voxel as i32;
            next_crossing[k] = (boundary * s - source[k]) / d;
            delta[k] = s / d.abs();
        }

        Self { index, next_crossing, delta, step, here: span.min, exit: span.max }
    }

    /// Axis whose boundary is crossed next; ties go to x, then y
    #[inline]
    fn nearest_axis(&self) -> usize {
        let [x, y, z] = self.next_crossing;
        if      x <= y && x <= z { 0 }
        else if y <= z           { 1 }
        else                     { 2 }
    }
}

impl Iterator for Traversal {
    type Item = (Index3_i, Ratiof32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.here < self.exit {
            let k = self.nearest_axis();
            let boundary = self.next_crossing[k].min(self.exit);

            // The voxel we are about to leave, and the length of ray inside it
            let voxel = self.index;
            let delta_alpha = boundary - self.here;

            // Move along the ray until it leaves this voxel
            self.here = boundary;
            self.next_crossing[k] += self.delta[k];
            self.index[k] += self.step[k];

            if delta_alpha > 0.0 { return Some((voxel, delta_alpha)) }
        }
        None
    }
}

/// Floating-point calculations which should give an integer usually miss very
/// slightly. If the error is negative, `floor` picks the wrong voxel. Work
/// around this by assuming anything very close to an integer is exactly that
/// integer.
#[inline]
fn snap(x: Ratiof32) -> Ratiof32 {
    let nearest = x.round();
    if (x - nearest).abs() < EPS { nearest } else { x }
}

/// Path lengths of `ray` in each voxel it crosses, in a grid of `n` voxels of
/// size `spacing`, in order of traversal.
pub fn path_lengths(ray: &Ray, spacing: Vector, n: BoxDim_u) -> Vec<(Index3_i, Lengthf32)> {
    let extent = Vector::new(n[0] as f32, n[1] as f32, n[2] as f32).component_mul(&spacing);
    let inside = |i: &Index3_i| (0..3).all(|k| i[k] >= 0 && (i[k] as usize) < n[k]);
    let length = ray.length();
    match box_intersection(ray, extent) {
        None => vec![],
        Some(span) => Traversal::new(ray, span, spacing, n)
            .filter(|(index, _)| inside(index))
            .map(|(index, delta_alpha)| (index, delta_alpha * length))
            .collect(),
    }
}
