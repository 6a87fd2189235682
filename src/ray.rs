//! Rays and their intersection with the volume's bounding box.
//!
//! Positions along a ray are expressed parametrically: `source + α (destination - source)`,
//! so `α = 0` at the source and `α = 1` at the destination. The box is
//! intersected with the whole line, not just the segment between the two
//! points: the destination (a detector pixel, or any point on the line) may
//! lie inside, beyond or before the volume.

use crate::types::{Lengthf32, Point, Ratiof32, Vector};

/// Line through `source` and `destination`, both in the volume's frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub source: Point,
    pub destination: Point,
}

impl Ray {
    pub fn new(source: Point, destination: Point) -> Self { Self { source, destination } }

    /// Unnormalized: one unit of `α` covers this vector
    #[inline]
    pub fn direction(&self) -> Vector { self.destination - self.source }

    /// Physical length corresponding to one unit of `α`
    #[inline]
    pub fn length(&self) -> Lengthf32 { self.direction().norm() }

    #[inline]
    pub fn at(&self, alpha: Ratiof32) -> Point { self.source + self.direction() * alpha }
}

/// Parametric interval `[min, max)` in which a ray lies inside the volume
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: Ratiof32,
    pub max: Ratiof32,
}

impl Span {
    pub fn width(&self) -> Ratiof32 { self.max - self.min }
}

/// Per-axis bounds used when the ray is parallel to a slab and inside it: the
/// axis places no constraint on the intersection.
const UNCONSTRAINED: (Ratiof32, Ratiof32) = (Ratiof32::NEG_INFINITY, Ratiof32::INFINITY);

/// Intersect `ray` with the box `[0, extent)` using the slab method.
///
/// Returns `None` if the ray misses the box or merely grazes it (`αmin ≥ αmax`),
/// and for a degenerate ray whose source and destination coincide.
pub fn box_intersection(ray: &Ray, extent: Vector) -> Option<Span> {
    let direction = ray.direction();
    if direction == Vector::zeros() { return None; }

    let mut min = Ratiof32::NEG_INFINITY;
    let mut max = Ratiof32::INFINITY;
    for k in 0..3 {
        let (lo, hi) = slab(ray.source[k], direction[k], extent[k])?;
        min = min.max(lo);
        max = max.min(hi);
    }
    // Also rejects NaNs
    if min < max { Some(Span { min, max }) } else { None }
}

/// Parametric interval in which a ray with `source` and `component` along one
/// axis lies between the planes at 0 and `upper`.
#[inline]
fn slab(source: Lengthf32, component: Lengthf32, upper: Lengthf32) -> Option<(Ratiof32, Ratiof32)> {
    if component != 0.0 {
        let a1 = (0.0   - source) / component;
        let an = (upper - source) / component;
        Some((a1.min(an), a1.max(an)))
    } else if (0.0..upper).contains(&source) {
        Some(UNCONSTRAINED)
    } else {
        // Parallel to the slab, and outside it
        None
    }
}

#[cfg(test)]
mod test_box_intersection {
    use super::*;
    use rstest::rstest;
    use float_eq::assert_float_eq;

    fn p((x, y, z): (f32, f32, f32)) -> Point { Point::new(x, y, z) }

    #[rstest(/**/       source          ,    destination      ,  alpha_min   , alpha_max   ,
             // Along each axis, from outside, through the 10 mm cube
             case((  -10.0,  5.0,  5.0), (  20.0,  5.0,  5.0), 1.0 / 3.0   , 2.0 / 3.0   ),
             case((    5.0,-10.0,  5.0), (   5.0, 20.0,  5.0), 1.0 / 3.0   , 2.0 / 3.0   ),
             case((    5.0,  5.0,-10.0), (   5.0,  5.0, 20.0), 1.0 / 3.0   , 2.0 / 3.0   ),
             // Reversed direction gives the same points, reached in the opposite order
             case((   20.0,  5.0,  5.0), ( -10.0,  5.0,  5.0), 1.0 / 3.0   , 2.0 / 3.0   ),
             // Destination inside the box: line continues beyond it
             case((    5.0,  5.0,-1000.0), ( 5.0,  5.0,  5.0), 1000.0/1005.0, 1010.0/1005.0),
             // Source inside the box: entry lies behind the source
             case((    5.0,  5.0,  5.0), (   5.0,  5.0, 15.0), -0.5        , 0.5         ),
             // Diagonal through opposite corners
             case((  -10.0,-10.0,-10.0), (  20.0, 20.0, 20.0), 1.0 / 3.0   , 2.0 / 3.0   ),
    )]
    fn hits(source: (f32, f32, f32), destination: (f32, f32, f32), alpha_min: f32, alpha_max: f32) {
        let ray = Ray::new(p(source), p(destination));
        let span = box_intersection(&ray, Vector::new(10.0, 10.0, 10.0)).unwrap();
        assert_float_eq!((span.min, span.max), (alpha_min, alpha_max), rmax <= (1e-6, 1e-6));
    }

    #[rstest(/**/       source          ,    destination      ,
             // Parallel to x, outside the y slab
             case((  -10.0, 15.0,  5.0), (  20.0, 15.0,  5.0)),
             // Parallel to z, outside the x slab on the negative side
             case((   -1.0,  5.0,-10.0), (  -1.0,  5.0, 20.0)),
             // Oblique, passing beside the box
             case((  -10.0, 30.0,  5.0), (  30.0, 12.0,  5.0)),
             // Grazing an edge: touches the box in a single point
             case((  -10.0, 30.0,  5.0), (  30.0,-10.0,  5.0)),
             // Lying in the upper x face
             case((   10.0,  5.0,-10.0), (  10.0,  5.0, 20.0)),
             // Degenerate
             case((    1.0,  2.0,  3.0), (   1.0,  2.0,  3.0)),
    )]
    fn misses(source: (f32, f32, f32), destination: (f32, f32, f32)) {
        let ray = Ray::new(p(source), p(destination));
        assert_eq!(box_intersection(&ray, Vector::new(10.0, 10.0, 10.0)), None);
    }

    #[test]
    fn lower_face_counts_as_inside() {
        let ray = Ray::new(p((0.0, 5.0, -10.0)), p((0.0, 5.0, 20.0)));
        let span = box_intersection(&ray, Vector::new(10.0, 10.0, 10.0)).unwrap();
        assert_float_eq!(span.width() * ray.length(), 10.0, rmax <= 1e-6);
    }

    #[test]
    fn point_along_ray() {
        let ray = Ray::new(p((1.0, 2.0, 3.0)), p((3.0, 6.0, 11.0)));
        let q = ray.at(0.5);
        assert_float_eq!((q.x, q.y, q.z), (2.0, 4.0, 7.0), ulps <= (1, 1, 1));
    }
}
