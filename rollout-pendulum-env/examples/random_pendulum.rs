use anyhow::Result;
use rollout_core::{dummy::UniformPolicy, DefaultEvaluator, Evaluator as _, RunnerConfig};
use rollout_pendulum_env::{PendulumEnv, PendulumEnvConfig, RenderConfig};

fn env_config() -> PendulumEnvConfig {
    PendulumEnvConfig::default().render(Some(RenderConfig::default()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runner_config = RunnerConfig::default().render(true).seed(42);

    // Runs evaluation
    let mut evaluator = DefaultEvaluator::<PendulumEnv>::new(&env_config(), 0, 5, runner_config)?
        .video_template(Some("videos/random_pendulum_{:03}.gif".to_string()));
    let _ = evaluator.evaluate(&UniformPolicy::new(1))?;

    Ok(())
}
