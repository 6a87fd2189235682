//! Physical quantities used in configuration and on the command line.
//!
//! Lengths and angles are read from text with explicit units (`"1000 mm"`,
//! `"0.5 rad"`) and converted to bare floats, in `mm` and radians, before
//! reaching the numerical code.

pub mod todo;

pub use uom;
pub use uom::si::Quantity;
pub use uom::si::f32::{Angle, Length, Ratio};

mod units {
  pub use uom::si::{length::{millimeter, centimeter, meter},
                    angle ::{radian, degree},
                    ratio ::ratio,
  };
}

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(mm     Length  millimeter);
wrap!(cm     Length  centimeter);
wrap!(m      Length       meter);
wrap!(radian Angle       radian);
wrap!(degree Angle       degree);
wrap!(ratio  Ratio        ratio);

// Reverse direction of the above.
pub fn mm_    (x: Length) -> f32 { x.get::<units::millimeter>() }
pub fn radian_(x: Angle ) -> f32 { x.get::<units::radian>() }
pub fn degree_(x: Angle ) -> f32 { x.get::<units::degree>() }
pub fn ratio_ (x: Ratio ) -> f32 { x.get::<units::ratio>() }

/// Interpret a triplet of lengths as `mm` values
pub fn mm_3((x, y, z): (Length, Length, Length)) -> [f32; 3] { [mm_(x), mm_(y), mm_(z)] }
