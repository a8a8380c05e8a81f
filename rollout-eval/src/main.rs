use anyhow::{ensure, Result};
use clap::Parser;
use rollout_eval::{run, EvalConfig};
use rollout_pendulum_env::ObsMode;
use std::path::PathBuf;

/// Evaluate a trained policy in a simulation environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Checkpoint directory with params_<step>.bincode files
    #[arg(long)]
    ckpt_dir: Option<PathBuf>,

    /// Training step to restore, the latest if omitted
    #[arg(long)]
    step: Option<usize>,

    /// Name of the environment
    #[arg(long)]
    env_name: Option<String>,

    /// Number of episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Render episodes and write videos
    #[arg(long, default_value_t = false)]
    render: bool,

    /// Template of video paths
    #[arg(long)]
    video_out: Option<String>,

    /// Number of stacked observations
    #[arg(long)]
    frame_stack: Option<usize>,

    /// Step ceiling of an episode
    #[arg(long)]
    max_steps: Option<usize>,

    /// Seed of action sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Use camera observations instead of the state vector
    #[arg(long, default_value_t = false)]
    pixels: bool,

    /// Take mean actions
    #[arg(long, default_value_t = false)]
    deterministic: bool,

    /// YAML file of EvalConfig, overridden by the other options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path of the CSV report
    #[arg(long)]
    report_csv: Option<PathBuf>,
}

fn eval_config(args: Args) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::load(path)?,
        None => EvalConfig::default(),
    };
    if let Some(v) = args.ckpt_dir {
        config.ckpt_dir = v;
    }
    if args.step.is_some() {
        config.step = args.step;
    }
    if let Some(v) = args.env_name {
        config.env.name = v;
    }
    if let Some(v) = args.episodes {
        config.episodes = v;
    }
    if let Some(v) = args.video_out {
        config.video_out = v;
    }
    if args.frame_stack.is_some() {
        config.frame_stack = args.frame_stack;
    }
    if let Some(v) = args.max_steps {
        config.runner.max_steps = v;
    }
    if let Some(v) = args.seed {
        config.runner.seed = v;
    }
    if args.report_csv.is_some() {
        config.report_csv = args.report_csv;
    }
    if args.pixels {
        config.env.obs_mode = ObsMode::Pixels;
    }
    config.render |= args.render;
    config.deterministic |= args.deterministic;

    ensure!(
        !config.ckpt_dir.as_os_str().is_empty(),
        "--ckpt-dir is required"
    );
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = eval_config(Args::parse())?;
    let _ = run(&config)?;

    Ok(())
}
