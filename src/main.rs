use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use projectile_lab::config::{AppConfig, DEFAULT_CONFIG_PATH};
use projectile_lab::core::ballistics::{GravitySetting, Planet, kinetic_energy};
use projectile_lab::core::driver::{FrameEvent, FrameScheduler};
use projectile_lab::core::lab::{Lab, LabSettings, UiInputs};
use projectile_lab::core::render::Scene;
use projectile_lab::core::snapshot::export_image;
use projectile_lab::core::window::{CanvasSize, ViewportTransform};

const SIM_STEP_S: f64 = 1.0 / 60.0;
const MAX_SIM_FRAMES: usize = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "projectile_lab", about = "Projectile flight calculator and renderer")]
struct Args {
    /// Launch angle above the horizon, degrees (0, 90].
    #[arg(long)]
    angle: Option<f64>,
    /// Launch speed, m/s.
    #[arg(long)]
    speed: Option<f64>,
    /// Body mass, kg. Only affects kinetic energy.
    #[arg(long)]
    mass: Option<f64>,
    /// Named body supplying gravity (earth, moon, mars, ...).
    #[arg(long)]
    planet: Option<String>,
    /// Custom gravity in m/s²; overrides --planet.
    #[arg(long)]
    gravity: Option<f64>,
    /// Step a run frame by frame until it lands.
    #[arg(long)]
    simulate: bool,
    /// Render the trajectory view into this image file.
    #[arg(long)]
    png: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(short, long)]
    verbose: bool,
}

/// Fires the next frame as soon as one is asked for.
#[derive(Default)]
struct StepScheduler {
    pending: bool,
}

impl FrameScheduler for StepScheduler {
    fn request_next_frame(&mut self) {
        self.pending = true;
    }
}

fn inputs_from_args(args: &Args, cfg: &AppConfig) -> Result<UiInputs, String> {
    let planet = match &args.planet {
        Some(name) => Planet::from_name(name).ok_or_else(|| format!("Unknown planet: '{name}'."))?,
        None => cfg.defaults.planet,
    };
    Ok(UiInputs {
        angle_deg: args.angle.unwrap_or(cfg.defaults.angle_deg),
        speed_mps: args.speed.unwrap_or(cfg.defaults.speed_mps),
        mass_kg: args.mass.unwrap_or(cfg.defaults.mass_kg),
        gravity: args.gravity.map_or(GravitySetting::Preset(planet), GravitySetting::Custom),
    })
}

fn simulate(lab: &mut Lab) -> Result<(), String> {
    let mut sched = StepScheduler::default();
    lab.launch(&mut sched).map_err(|e| e.to_string())?;

    let mut ts = 0.0;
    for _ in 0..MAX_SIM_FRAMES {
        if !std::mem::take(&mut sched.pending) {
            break;
        }
        if let FrameEvent::Landed(sample) = lab.frame(ts, &mut sched) {
            println!(
                "Landed after {:.3} s at x = {:.2} m ({} points)",
                sample.elapsed_s,
                sample.position.0,
                lab.traveled().len()
            );
            return Ok(());
        }
        ts += SIM_STEP_S;
    }
    Err("Simulation did not land.".to_string())
}

fn export(lab: &Lab, path: &Path, cfg: &AppConfig) -> Result<(), String> {
    let width = cfg.window.width.max(1) as u32;
    let height = cfg.window.height.max(1) as u32;
    let size = CanvasSize::new(width as f64, height as f64, 1.0);
    let readouts = lab.readout_lines();
    let scene = Scene {
        viewport: ViewportTransform::fit(lab.predicted(), size, cfg.canvas.margins),
        predicted: lab.predicted(),
        traveled: lab.traveled(),
        readouts: &readouts,
    };
    export_image(path, &scene, size.width() as u32, size.height() as u32).map_err(|e| e.to_string())?;
    info!(path = ?path, "image written");
    println!("Wrote {}", path.display());
    Ok(())
}

fn run(args: Args) -> Result<(), String> {
    let (cfg, cfg_err) = AppConfig::load_or_default(&args.config);
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        cfg.tracing_level()
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();
    if let Some(err) = &cfg_err {
        AppConfig::report_fallback(&args.config, err);
    }

    let inputs = inputs_from_args(&args, &cfg)?;
    let canvas = CanvasSize::new(cfg.window.width as f64, cfg.window.height as f64, 1.0);
    let mut lab = Lab::new(LabSettings::from_config(&cfg), inputs, canvas);

    let params = lab.params();
    if !params.is_valid() {
        return Err(format!(
            "Parameters out of range: angle {} deg, speed {} m/s, mass {} kg, gravity {} m/s².",
            inputs.angle_deg, inputs.speed_mps, inputs.mass_kg, params.gravity_mps2
        ));
    }

    let r = lab.readouts();
    println!("Gravity: {} m/s² ({})", r.gravity, inputs.gravity.label());
    println!("Time of flight: {} s", r.time_of_flight);
    println!("Max height: {} m", r.max_height);
    println!("Range: {} m", r.range);
    println!(
        "Launch kinetic energy: {:.1} J",
        kinetic_energy(params.mass_kg, params.velocity_components())
    );

    if args.simulate {
        simulate(&mut lab)?;
    }
    if let Some(path) = &args.png {
        export(&lab, path, &cfg)?;
    }
    Ok(())
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
