/// Quantities which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// The ray-casting inner loop works on bare floats: lengths in `mm` and parametric
/// positions along a ray as dimensionless ratios. These
/// aliases keep some clues in the source as to what each float represents.

pub type Lengthf32    = f32;
pub type Ratiof32     = f32;
pub type Intensityf32 = f32;
