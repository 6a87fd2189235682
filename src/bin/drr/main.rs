mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    // --- Configuration, with command line overrides --------------------------------
    let mut config = read_config_file(&args.config)?;
    if let Some(angle)     = args.angle          { config.projection_angle = angle; }
    if let Some(threshold) = args.threshold      { config.threshold        = threshold; }
    if let Some(distance)  = args.focal_distance { config.focal_distance   = distance; }
    config.validate()?;
    let out = args.out.clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| PathBuf::from("drr.raw"));

    // Before starting the potentially long computation, make sure that we can
    // write the result to the requested destination.
    if let Some(dir) = out.parent() { std::fs::create_dir_all(dir)?; }
    log::info!("Writing DRR to {}", out.display());

    // --- Read volume ---------------------------------------------------------------
    let mut progress = Progress::new();
    progress.start(&format!("Reading volume {}", config.volume.file.display()));
    let volume = config.load_volume()?;
    progress.done();

    // --- Projection geometry -------------------------------------------------------
    let mut drr = SiddonJacobs::<f32, f32>::new(&volume);
    drr.set_pose(config.pose(volume.box_centre()));
    drr.set_focal_point_to_isocenter_distance(config.focal_distance_mm());
    drr.set_projection_angle(config.projection_angle_rad());
    drr.set_threshold(config.threshold);
    drr.initialize();
    let detector = config.detector();
    let [nu, nv] = detector.n;
    log::info!("Projection angle {:.2}°, focal distance {} mm, threshold {}, detector {nu} x {nv}",
               degree_(config.projection_angle), config.focal_distance_mm(), config.threshold);

    // --- Progress bar --------------------------------------------------------------
    let bar = if args.quiet { ProgressBar::hidden() } else { ProgressBar::new(nv as u64) };
    bar.set_style(ProgressStyle::default_bar()
                  .template("Projecting rows: [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")?
    );
    bar.tick();

    // --- Render --------------------------------------------------------------------
    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build()?;
    progress.start("Projecting");
    let image = pool.install(|| render_with_progress(&drr, &detector, |_| bar.inc(1)));
    bar.finish_and_clear();
    progress.done();

    // --- Write image ---------------------------------------------------------------
    io::write_image(&image, &out)?;
    log::info!("Wrote {} pixels ({nu} x {nv}, u fastest) to {}", group_digits(image.len()), out.display());
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use units::degree_;
use drr::{
    SiddonJacobs, RayCastInterpolator,
    config::drr::read_config_file,
    detector::render_with_progress,
    io,
    utils::{group_digits, timing::Progress},
};
