/// Command line interface for `drr` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "drr",
    about = "Project a CT volume onto a detector: digitally reconstructed radiograph",
)]
pub (super) struct Cli {
    /// TOML file describing volume, pose, projection and detector
    pub config: PathBuf,

    /// Override projection (gantry) angle, e.g. "1.5708 rad"
    #[clap(short, long)]
    pub angle: Option<Angle>,

    /// Override intensity threshold
    #[clap(short, long)]
    pub threshold: Option<f32>,

    /// Override distance from source to isocenter, e.g. "1200 mm"
    #[clap(short, long)]
    pub focal_distance: Option<Length>,

    /// Where to write the image [default: `output` in config, else drr.raw]
    #[clap(short, long)]
    pub out: Option<PathBuf>,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

    /// Don't show progress bar
    #[clap(short, long)]
    pub quiet: bool,
}
// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
use units::{Angle, Length};
