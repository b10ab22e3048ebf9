use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::info;

use kerbal_ascent::model::{self, ModelParams};
use kerbal_ascent::plot::{self, Panel};
use kerbal_ascent::telemetry;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compare a recorded ascent log against the simplified flight model"
)]
struct Cli {
    /// Telemetry CSV produced by the ascent autopilot.
    telemetry: PathBuf,

    /// Directory for the output PNGs (default: next to the log).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Ignition mass override, kg (default: the first recorded row).
    #[arg(long)]
    initial_mass: Option<f64>,

    /// Averaged effective specific impulse, s.
    #[arg(long, default_value_t = 310.0)]
    avg_isp: f64,

    /// Averaged thrust, N.
    #[arg(long, default_value_t = 430_000.0)]
    avg_thrust: f64,

    /// Integration step, s.
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Model gravity, m/s^2.
    #[arg(long, default_value_t = 9.81)]
    g0: f64,
}

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let cli = Cli::parse();

    let samples = telemetry::read_log_file(&cli.telemetry)
        .with_context(|| format!("reading {}", cli.telemetry.display()))?;
    if samples.is_empty() {
        bail!("{} holds no telemetry rows", cli.telemetry.display());
    }

    let mut params = ModelParams::from_log(&samples, cli.avg_isp, cli.avg_thrust)
        .ok_or_else(|| anyhow!("{} holds no telemetry rows", cli.telemetry.display()))?;
    if let Some(initial_mass) = cli.initial_mass {
        params.initial_mass = initial_mass;
    }
    params.dt = cli.dt;
    params.g0 = cli.g0;

    let t_max = samples[samples.len() - 1].time;
    info!(
        "modeling {:.1} s of flight against {} recorded rows",
        t_max,
        samples.len()
    );
    let modeled = model::simulate(&params, t_max);

    let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
    let speeds: Vec<f64> = samples.iter().map(|s| s.speed).collect();
    let altitudes: Vec<f64> = samples.iter().map(|s| s.altitude).collect();
    let delta_vs: Vec<f64> = samples.iter().map(|s| s.delta_v).collect();
    let masses: Vec<f64> = samples.iter().map(|s| s.mass).collect();

    let panels = [
        Panel {
            title: "Speed",
            y_label: "Speed (m/s)",
            recorded: (&times, &speeds),
            model: (&modeled.times, &modeled.speeds),
        },
        Panel {
            title: "Altitude",
            y_label: "Altitude (m)",
            recorded: (&times, &altitudes),
            model: (&modeled.times, &modeled.altitudes),
        },
        Panel {
            title: "Available delta-v",
            y_label: "Delta-v (m/s)",
            recorded: (&times, &delta_vs),
            model: (&modeled.times, &modeled.delta_vs),
        },
        Panel {
            title: "Mass",
            y_label: "Mass (kg)",
            recorded: (&times, &masses),
            model: (&modeled.times, &modeled.masses),
        },
    ];

    let stem = cli
        .telemetry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("telemetry")
        .to_string();
    let out_dir = cli.out_dir.unwrap_or_else(|| {
        cli.telemetry
            .parent()
            .map(PathBuf::from)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    });
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let file_tags = ["speed", "altitude", "delta_v", "mass"];
    for (panel, tag) in panels.iter().zip(file_tags) {
        let path = out_dir.join(format!("{stem}_{tag}_comparison.png"));
        plot::comparison_plot(&path, panel).map_err(|e| anyhow!("plotting {tag}: {e}"))?;
        info!("wrote {}", path.display());
    }

    let combined = out_dir.join(format!("{stem}_all_comparison.png"));
    plot::combined_plot(&combined, &panels).map_err(|e| anyhow!("plotting combined: {e}"))?;
    info!("wrote {}", combined.display());

    for residual in model::residuals(&samples, &modeled) {
        info!(
            "{:>8}: rms deviation {:.1}, peak {:.1}",
            residual.quantity, residual.rms, residual.max_abs
        );
    }

    Ok(())
}
