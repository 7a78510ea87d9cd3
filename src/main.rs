use ccd_ik::ik::{ChainDriver, IkChain, Rig, RigDesc, StepMode};
use ccd_ik::render::{DebugLines, SkinningPalette};
use ccd_ik::SolverConfig;
use clap::{Parser, ValueEnum};
use glam::Vec3;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Resolve the whole chain every tick
    Full,
    /// Correct one joint per tick
    Single,
}

impl From<Mode> for StepMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Full => StepMode::FullChain,
            Mode::Single => StepMode::SingleStep,
        }
    }
}

/// Drives a CCD chain toward a goal without a window and reports convergence.
#[derive(Parser, Debug)]
#[command(name = "ik-demo", version, about)]
struct Args {
    /// JSON rig description; defaults to a procedural cylinder chain
    #[arg(long)]
    rig: Option<PathBuf>,

    /// JSON solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured step mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u32,

    /// Goal position as x,y,z
    #[arg(long, value_parser = parse_vec3, default_value = "1.2,0.4,0")]
    goal: Vec3,

    /// Move the goal around a circle of this radius in the XY plane
    #[arg(long)]
    orbit: Option<f32>,

    /// Bones in the procedural chain
    #[arg(long, default_value_t = 20)]
    bones: usize,

    /// Spacing between procedural chain bones
    #[arg(long, default_value_t = 0.1)]
    spacing: f32,

    /// Log every tick instead of every completed sweep
    #[arg(long)]
    verbose_ticks: bool,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn load_rig(args: &Args) -> ccd_ik::Result<(Rig, IkChain)> {
    if let Some(path) = &args.rig {
        let (rig, chain) = RigDesc::load(path)?.build()?;
        let chain = match chain {
            Some(chain) => chain,
            // whole path from the last bone to the root
            None => IkChain::from_end_effector(&rig, rig.bone_count() - 1, rig.bone_count())?,
        };
        return Ok((rig, chain));
    }

    let rig = Rig::cylinder_chain(args.bones, args.spacing)?;
    let chain = IkChain::from_end_effector(&rig, args.bones - 1, args.bones)?;
    Ok((rig, chain))
}

fn goal_at(args: &Args, tick: u32) -> Vec3 {
    match args.orbit {
        Some(radius) => {
            let t = tick as f32 * 0.02;
            args.goal + Vec3::new(t.cos() * radius, t.sin() * radius, 0.0)
        }
        None => args.goal,
    }
}

fn run(args: Args) -> ccd_ik::Result<()> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }

    let (mut rig, chain) = load_rig(&args)?;
    let mut driver = ChainDriver::from_config(&config);
    log::info!(
        "{} bones, chain of {}, mode {:?}",
        rig.bone_count(),
        chain.len(),
        config.mode
    );

    let mut goal = goal_at(&args, 0);
    for tick in 0..args.ticks {
        goal = goal_at(&args, tick);
        let report = driver.tick(&mut rig, &chain, goal)?;
        if args.verbose_ticks || report.wrapped {
            log::info!(
                "tick {tick}: cursor {} {:?}, rotated {}, distance {:.5}",
                driver.cursor(),
                report.state,
                report.rotated,
                report.distance
            );
        }
    }

    let lines = DebugLines::from_rig(&rig, Some(&chain), Some(goal), 0.05);
    let palette = SkinningPalette::from_rig(&rig);
    log::debug!(
        "render output: {} debug lines ({} bytes), palette {} bytes",
        lines.line_count(),
        lines.as_bytes().len(),
        palette.as_bytes().len()
    );

    for &bone in chain.bones().iter().rev() {
        let p = rig.bone_position(bone)?;
        let name = rig.name(bone).unwrap_or("-");
        println!("{bone:>4} {name:<12} {:>9.4} {:>9.4} {:>9.4}", p.x, p.y, p.z);
    }
    println!(
        "goal {:.4} {:.4} {:.4}, distance {:.5} after {} ticks ({} sweeps)",
        goal.x,
        goal.y,
        goal.z,
        rig.distance_to_goal(&chain, goal)?,
        driver.ticks(),
        driver.wraps()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
