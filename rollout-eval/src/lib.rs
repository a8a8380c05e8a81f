//! Evaluation of a restored policy in a simulation environment.
//!
//! [`run`] restores a [`GaussianMlpPolicy`] from a checkpoint directory, runs
//! a number of episodes with [`DefaultEvaluator`] and returns their returns
//! and lengths. Rendered episodes are written as animated GIFs, and a CSV
//! report with one row per episode can be written as well.
//!
//! The binary `rollout-eval` exposes the same through command line options.
mod report;
use anyhow::{ensure, Result};
use log::info;
pub use report::{CsvRecorder, EpisodeRow};
use rollout_core::{
    DefaultEvaluator, Env, Evaluator as _, FrameStack, FrameStackConfig, ObsAdapter,
    RunSummary, RunnerConfig,
};
use rollout_pendulum_env::{PendulumEnv, PendulumEnvConfig, RenderConfig};
use rollout_policy_no_backend::{Checkpoint, GaussianMlpPolicy};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Names of environments accepted in [`PendulumEnvConfig::name`].
pub const SUPPORTED_ENVS: [&str; 2] = ["Pendulum-v1", "pendulum"];

/// Configuration of an evaluation run.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EvalConfig {
    /// Directory of `params_<step>.bincode` files.
    pub ckpt_dir: PathBuf,

    /// Training step to restore, the latest if `None`.
    pub step: Option<usize>,

    /// Environment to evaluate in.
    pub env: PendulumEnvConfig,

    /// Seed of the environment.
    pub env_seed: i64,

    /// Number of episodes.
    pub episodes: usize,

    /// Renders every step and writes a video per episode.
    pub render: bool,

    /// Template of video paths, `{:03}` is replaced by the episode index.
    pub video_out: String,

    /// Stacks this many consecutive observations.
    pub frame_stack: Option<usize>,

    /// Uses the mean action instead of sampling.
    pub deterministic: bool,

    /// Episode loop settings. `render` is overridden by [`EvalConfig::render`].
    pub runner: RunnerConfig,

    /// Writes a CSV report of the episodes if given.
    pub report_csv: Option<PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            ckpt_dir: PathBuf::new(),
            step: None,
            env: PendulumEnvConfig::default(),
            env_seed: 0,
            episodes: 5,
            render: false,
            video_out: "videos/eval_episode_{:03}.gif".to_string(),
            frame_stack: None,
            deterministic: false,
            runner: RunnerConfig::default(),
            report_csv: None,
        }
    }
}

impl EvalConfig {
    /// Sets the checkpoint directory.
    pub fn ckpt_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.ckpt_dir = v.into();
        self
    }

    /// Sets the training step to restore.
    pub fn step(mut self, v: Option<usize>) -> Self {
        self.step = v;
        self
    }

    /// Sets the environment configuration.
    pub fn env(mut self, v: PendulumEnvConfig) -> Self {
        self.env = v;
        self
    }

    /// Sets the seed of the environment.
    pub fn env_seed(mut self, v: i64) -> Self {
        self.env_seed = v;
        self
    }

    /// Sets the number of episodes.
    pub fn episodes(mut self, v: usize) -> Self {
        self.episodes = v;
        self
    }

    /// Enables rendering and video output.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Sets the video path template.
    pub fn video_out(mut self, v: impl Into<String>) -> Self {
        self.video_out = v.into();
        self
    }

    /// Sets the number of stacked observations.
    pub fn frame_stack(mut self, v: Option<usize>) -> Self {
        self.frame_stack = v;
        self
    }

    /// Uses the mean action instead of sampling.
    pub fn deterministic(mut self, v: bool) -> Self {
        self.deterministic = v;
        self
    }

    /// Sets the episode loop settings.
    pub fn runner(mut self, v: RunnerConfig) -> Self {
        self.runner = v;
        self
    }

    /// Sets the path of the CSV report.
    pub fn report_csv(mut self, v: Option<PathBuf>) -> Self {
        self.report_csv = v;
        self
    }

    /// Constructs [`EvalConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvalConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    fn env_config(&self) -> PendulumEnvConfig {
        let mut env = self.env.clone();
        if self.render && env.render.is_none() {
            env.render = Some(RenderConfig::default());
        }
        env
    }

    fn runner_config(&self) -> RunnerConfig {
        self.runner.clone().render(self.render)
    }
}

/// Runs the evaluation described by `config`.
///
/// The policy is restored before the first episode starts; a missing
/// checkpoint or a network that does not fit the observations is reported
/// without running any episode.
pub fn run(config: &EvalConfig) -> Result<RunSummary> {
    ensure!(
        SUPPORTED_ENVS.contains(&config.env.name.as_str()),
        "Unknown environment {:?}, supported: {:?}",
        config.env.name,
        SUPPORTED_ENVS
    );
    let env_config = config.env_config();
    match config.frame_stack {
        None => evaluate::<PendulumEnv>(config, &env_config),
        Some(n) => {
            evaluate::<FrameStack<PendulumEnv>>(config, &FrameStackConfig::new(env_config, n))
        }
    }
}

fn evaluate<E: Env>(config: &EvalConfig, env_config: &E::Config) -> Result<RunSummary> {
    let runner_config = config.runner_config();

    // Observation used to check the input dimension of the network
    let example = {
        let adapter = ObsAdapter::new(runner_config.adapter.clone());
        let mut env = E::build(env_config, config.env_seed)?;
        let (obs, _) = env.reset()?;
        adapter.adapt(obs)
    };
    let ckpt = Checkpoint::new(&config.ckpt_dir, config.step);
    let policy =
        GaussianMlpPolicy::restore(&ckpt, Some(&example))?.deterministic(config.deterministic);

    info!(
        "Evaluate {} episodes in {}",
        config.episodes, config.env.name
    );
    let mut evaluator =
        DefaultEvaluator::<E>::new(env_config, config.env_seed, config.episodes, runner_config)?
            .video_template(Some(config.video_out.clone()));

    match &config.report_csv {
        None => evaluator.evaluate(&policy),
        Some(path) => {
            let mut recorder = CsvRecorder::create(path)?;
            let summary = evaluator.evaluate_with_recorder(&policy, &mut recorder)?;
            recorder.flush()?;
            info!("Saved report in {:?}", path);
            Ok(summary)
        }
    }
}
