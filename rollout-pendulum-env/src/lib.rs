//! Pendulum environment for [`rollout-core`](rollout_core).
//!
//! The classic swing-up task, simulated in plain Rust. Observations are
//! either the state vector or, in [`ObsMode::Pixels`], the state together
//! with a camera image drawn by a small software renderer.
//!
//! ```no_run
//! use anyhow::Result;
//! use rollout_core::{dummy::UniformPolicy, DefaultEvaluator, Evaluator as _, RunnerConfig};
//! use rollout_pendulum_env::{ObsMode, PendulumEnv, PendulumEnvConfig, RenderConfig};
//!
//! fn main() -> Result<()> {
//!     let env_config = PendulumEnvConfig::default()
//!         .obs_mode(ObsMode::Pixels)
//!         .render(Some(RenderConfig::default()));
//!     let runner_config = RunnerConfig::default().render(true);
//!     let mut evaluator = DefaultEvaluator::<PendulumEnv>::new(&env_config, 0, 5, runner_config)?;
//!     let summary = evaluator.evaluate(&UniformPolicy::new(1))?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```
mod config;
mod env;
pub mod render;
pub use config::{ObsMode, PendulumEnvConfig, RenderConfig};
pub use env::PendulumEnv;
