//! Configuration file parser for DRR generation
//!
//! Quantities with dimensions must carry explicit units, and are therefore
//! written as strings in the TOML source: `"1000 mm"`, `"2.5 cm"`, `"0.3 rad"`.

use std::fs;
use std::str::FromStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, de};

use units::{Angle, Length, mm, mm_, mm_3, radian, radian_};

use crate::{
    detector::Detector,
    error::{DrrError, Result},
    types::{BoxDim_u, Point, Vector, WorldPoint},
    volume::Volume,
};
use geometry::{Euler3D, Pose};

fn deserialize_uom<'d, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    String::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

fn deserialize_uom_opt<'d, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(de::Error::custom)
}

fn deserialize_uom_2d<'d, D, T>(deserializer: D) -> std::result::Result<(T, T), D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let (u, v) = <(String, String)>::deserialize(deserializer)?;
    Ok((u.parse().map_err(de::Error::custom)?,
        v.parse().map_err(de::Error::custom)?))
}

fn deserialize_uom_3d<'d, D, T>(deserializer: D) -> std::result::Result<(T, T, T), D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let (x, y, z) = <(String, String, String)>::deserialize(deserializer)?;
    tr_tup_res((x.parse(), y.parse(), z.parse())).map_err(de::Error::custom)
}

fn deserialize_uom_3d_opt<'d, D, T>(deserializer: D) -> std::result::Result<Option<(T, T, T)>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    Option::<(String, String, String)>::deserialize(deserializer)?
        .map(|(x, y, z)| tr_tup_res((x.parse(), y.parse(), z.parse())))
        .transpose()
        .map_err(de::Error::custom)
}

/// Transpose 3-tuple of `Result`
///
/// `Ok` if all elements `Ok`; if any element is an `Err` return the first one.
fn tr_tup_res<O, E>((x, y, z): (std::result::Result<O, E>, std::result::Result<O, E>, std::result::Result<O, E>))
                    -> std::result::Result<(O, O, O), E> {
    Ok((x?, y?, z?))
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    pub volume: VolumeConfig,

    #[serde(default)]
    pub pose: PoseConfig,

    /// Distance from the X-ray source to the isocenter
    #[serde(default = "default_focal_distance")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub focal_distance: Length,

    /// Gantry rotation about the isocenter
    #[serde(default = "zero_angle")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub projection_angle: Angle,

    /// Only intensity in excess of this value is integrated
    #[serde(default)]
    pub threshold: f32,

    pub detector: DetectorConfig,

    /// Where to write the projection image, relative to the directory
    /// containing the configuration file
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VolumeConfig {

    /// Raw little-endian `f32` samples, x varying fastest. Relative paths are
    /// taken relative to the directory containing the configuration file.
    pub file: PathBuf,

    pub nvoxels: (usize, usize, usize),

    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub spacing: (Length, Length, Length),

    #[serde(default = "zero_lengths")]
    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub origin: (Length, Length, Length),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoseConfig {

    /// Euler angles about x, y and z, applied in that order
    #[serde(default = "zero_angles")]
    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub rotation: (Angle, Angle, Angle),

    #[serde(default = "zero_lengths")]
    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub translation: (Length, Length, Length),

    /// Centre of rotation, for both pose and gantry. Defaults to the centre of
    /// the volume.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_3d_opt")]
    pub isocenter: Option<(Length, Length, Length)>,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self { rotation: zero_angles(), translation: zero_lengths(), isocenter: None }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {

    pub npixels: (usize, usize),

    #[serde(deserialize_with = "deserialize_uom_2d")]
    pub pixel_size: (Length, Length),

    #[serde(default = "zero_offset")]
    #[serde(deserialize_with = "deserialize_uom_2d")]
    pub offset: (Length, Length),

    /// Defaults to the focal distance: detector plane through the isocenter
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_opt")]
    pub source_to_detector_distance: Option<Length>,
}

fn default_focal_distance() -> Length { mm(1000.0) }
fn zero_angle  () -> Angle { radian(0.0) }
fn zero_angles () -> (Angle, Angle, Angle) { (zero_angle(), zero_angle(), zero_angle()) }
fn zero_lengths() -> (Length, Length, Length) { (mm(0.0), mm(0.0), mm(0.0)) }
fn zero_offset () -> (Length, Length) { (mm(0.0), mm(0.0)) }

pub fn read_config_file(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .map_err(|e| DrrError::Config(format!("couldn't read config file `{}`: {e}", path.display())))?;
    let mut config: Config = toml::from_str(&text)?;
    config.validate()?;
    if let Some(dir) = path.parent() {
        config.volume.file = dir.join(&config.volume.file);
        config.output = config.output.map(|out| dir.join(out));
    }
    Ok(config)
}

impl Config {

    pub fn validate(&self) -> Result<()> {
        let (nx, ny, nz) = self.volume.nvoxels;
        if nx == 0 || ny == 0 || nz == 0 {
            return invalid(format!("volume.nvoxels must be positive: {:?}", self.volume.nvoxels));
        }
        if mm_3(self.volume.spacing).iter().any(|&s| !(s > 0.0)) {
            return invalid(format!("volume.spacing must be positive: {:?} mm", mm_3(self.volume.spacing)));
        }
        if !(mm_(self.focal_distance) > 0.0) {
            return invalid(format!("focal_distance must be positive: {} mm", mm_(self.focal_distance)));
        }
        let (nu, nv) = self.detector.npixels;
        if nu == 0 || nv == 0 {
            return invalid(format!("detector.npixels must be positive: {:?}", self.detector.npixels));
        }
        let (su, sv) = self.detector.pixel_size;
        if !(mm_(su) > 0.0 && mm_(sv) > 0.0) {
            return invalid(format!("detector.pixel_size must be positive: ({}, {}) mm", mm_(su), mm_(sv)));
        }
        if let Some(d) = self.detector.source_to_detector_distance {
            if !(mm_(d) > 0.0) {
                return invalid(format!("detector.source_to_detector_distance must be positive: {} mm", mm_(d)));
            }
            if d < self.focal_distance {
                log::warn!("Detector ({} mm) lies between the source and the isocenter ({} mm)",
                           mm_(d), mm_(self.focal_distance));
            }
        }
        Ok(())
    }

    pub fn nvoxels(&self) -> BoxDim_u {
        let (nx, ny, nz) = self.volume.nvoxels;
        [nx, ny, nz]
    }

    pub fn spacing(&self) -> Vector { mm_3(self.volume.spacing).into() }
    pub fn origin (&self) -> Point  { Point::from(mm_3(self.volume.origin)) }

    pub fn focal_distance_mm(&self) -> f64 { mm_(self.focal_distance) as f64 }
    pub fn projection_angle_rad(&self) -> f64 { radian_(self.projection_angle) as f64 }

    /// Pose described by the `[pose]` table. `volume_centre` is used as the
    /// isocenter if none is given.
    pub fn pose(&self, volume_centre: WorldPoint) -> Pose {
        let PoseConfig { rotation: (ax, ay, az), translation, isocenter } = self.pose;
        let angles = geometry::Vector::new(radian_(ax) as f64, radian_(ay) as f64, radian_(az) as f64);
        let [tx, ty, tz] = mm_3(translation);
        let translation = geometry::Vector::new(tx as f64, ty as f64, tz as f64);
        let center = isocenter
            .map(|c| { let [x, y, z] = mm_3(c); WorldPoint::new(x as f64, y as f64, z as f64) })
            .unwrap_or(volume_centre);
        Pose::new(Euler3D::new(angles, center, translation))
    }

    pub fn detector(&self) -> Detector {
        let DetectorConfig { npixels: (nu, nv), pixel_size: (su, sv), offset: (ou, ov), source_to_detector_distance } = self.detector;
        let d = source_to_detector_distance.unwrap_or(self.focal_distance);
        Detector {
            n: [nu, nv],
            pixel_size: [mm_(su) as f64, mm_(sv) as f64],
            offset: [mm_(ou) as f64, mm_(ov) as f64],
            source_to_detector_distance: mm_(d) as f64,
        }
    }

    pub fn load_volume(&self) -> Result<Volume<f32>> {
        Volume::from_raw_file(&self.volume.file, self.nvoxels(), self.spacing(), self.origin())
    }
}

fn invalid<T>(message: String) -> Result<T> { Err(DrrError::Config(message)) }
