use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use kerbal_ascent::config::{self, AscentConfig};
use kerbal_ascent::control;
use kerbal_ascent::physics::Body;
use kerbal_ascent::telemetry::{self, TelemetryLog};
use kerbal_ascent::terrain;
use kerbal_ascent::vessel::{presets, SimVessel};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fly a staged launch vehicle to a circular orbit and survey the surface"
)]
struct Cli {
    /// TOML file overriding the default mission parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Telemetry CSV path (default: timestamped file in the working directory).
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Terrain CSV path (default: date-stamped file in the working directory).
    #[arg(long)]
    terrain: Option<PathBuf>,

    /// Skip the post-insertion terrain survey.
    #[arg(long)]
    skip_survey: bool,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => {
            config::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => AscentConfig::default(),
    };

    // Ctrl-C asks the survey loop for a clean stop
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))?;
    }

    let mut vessel = SimVessel::on_launch_pad(Body::kerbin(), presets::satellite_lifter());
    info!("vehicle '{}' on the pad", vessel.name());

    let telemetry_path = cli.telemetry.unwrap_or_else(telemetry::default_log_path);
    let mut log = TelemetryLog::create(&telemetry_path)
        .with_context(|| format!("creating {}", telemetry_path.display()))?;

    let report = control::fly(&mut vessel, &cfg, &mut log)?;
    info!(
        "insertion complete after {:.1} s ({} telemetry rows)",
        report.elapsed, report.samples
    );
    info!("telemetry saved to {}", telemetry_path.display());

    if !cli.skip_survey {
        let map = terrain::survey(&mut vessel, &cfg.survey, &stop)?;
        let terrain_path = cli.terrain.unwrap_or_else(terrain::default_map_path);
        map.write_csv_file(&terrain_path)
            .with_context(|| format!("writing {}", terrain_path.display()))?;
        info!(
            "terrain map with {} points saved to {}",
            map.len(),
            terrain_path.display()
        );
    }

    Ok(())
}
