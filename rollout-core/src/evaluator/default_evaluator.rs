//! Default implementation of the [`Evaluator`] trait.
//!
//! Runs a fixed number of episodes one after another and reports the return
//! and length of each, followed by the mean return.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue, Recorder},
    video::episode_path,
    Env, EpisodeRunner, Policy, RunSummary, RunnerConfig,
};
use anyhow::Result;
use chrono::Local;

/// A default implementation of the [`Evaluator`] trait.
///
/// Every episode starts from the same root key ([`RunnerConfig::seed`]);
/// episodes differ through the state of the environment.
///
/// # Examples
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::<PendulumEnv>::new(&env_config, 42, 5, RunnerConfig::default())?;
/// let summary = evaluator.evaluate(&policy)?;
/// println!("{}", summary);
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The environment instance used for evaluation.
    env: E,

    runner: EpisodeRunner,

    /// Template of video paths, see [`episode_path`].
    video_template: Option<String>,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    /// Runs `n_episodes` episodes.
    ///
    /// # Errors
    ///
    /// Returns the first error of the environment or the policy. No summary
    /// is produced in that case.
    fn evaluate_with_recorder<P, R>(&mut self, policy: &P, recorder: &mut R) -> Result<RunSummary>
    where
        P: Policy + ?Sized,
        R: Recorder,
    {
        log::debug!("Evaluation");
        let mut summary = RunSummary::new();

        for ix in 0..self.n_episodes {
            log::trace!("Episode: {:?}", ix);
            let path = match (&self.video_template, self.runner.config().render) {
                (Some(template), true) => Some(episode_path(template, ix)),
                _ => None,
            };
            let result = self
                .runner
                .run_episode(policy, &mut self.env, path.as_deref())?;
            log::info!(
                "episode {}: return={:.3}, length={}",
                ix,
                result.ret,
                result.length
            );

            recorder.write(Record::from_slice(&[
                ("episode", RecordValue::Scalar(ix as f32)),
                ("return", RecordValue::Scalar(result.ret)),
                ("length", RecordValue::Scalar(result.length as f32)),
                ("timestamp", RecordValue::DateTime(Local::now())),
            ]));
            summary.push(result);
        }

        log::info!("{}", summary);
        Ok(summary)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    /// * `runner_config` - Configuration of each episode
    pub fn new(
        config: &E::Config,
        seed: i64,
        n_episodes: usize,
        runner_config: RunnerConfig,
    ) -> Result<Self> {
        Ok(Self::from_env(
            E::build(config, seed)?,
            n_episodes,
            EpisodeRunner::new(runner_config),
        ))
    }

    /// Constructs a [`DefaultEvaluator`] from an existing environment and runner.
    pub fn from_env(env: E, n_episodes: usize, runner: EpisodeRunner) -> Self {
        Self {
            n_episodes,
            env,
            runner,
            video_template: None,
        }
    }

    /// Sets the template of video paths, e.g., `videos/eval_episode_{:03}.gif`.
    ///
    /// Videos are only written when rendering is enabled in the runner.
    pub fn video_template(mut self, template: Option<String>) -> Self {
        self.video_template = template;
        self
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{ScriptedEnv, ScriptedEnvConfig, UniformPolicy},
        record::BufferedRecorder,
    };
    use tempdir::TempDir;

    fn env_config() -> ScriptedEnvConfig {
        ScriptedEnvConfig {
            rewards: vec![0.5, 1.5],
            terminate_at: Some(4),
            render_hw: Some((8, 8)),
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_runs_all_episodes() -> Result<()> {
        let mut evaluator =
            DefaultEvaluator::<ScriptedEnv>::new(&env_config(), 0, 3, RunnerConfig::default())?;
        let mut recorder = BufferedRecorder::new();
        let summary = evaluator.evaluate_with_recorder(&UniformPolicy::new(1), &mut recorder)?;

        assert_eq!(summary.len(), 3);
        assert_eq!(summary.returns(), vec![4.0, 4.0, 4.0]);
        assert_eq!(summary.mean_return(), Some(4.0));
        assert_eq!(evaluator.env().n_resets, 3);
        assert_eq!(evaluator.env().actions.len(), 12);

        assert_eq!(recorder.len(), 3);
        let episodes: Vec<_> = recorder
            .iter()
            .map(|r| r.get_scalar("episode").unwrap())
            .collect();
        assert_eq!(episodes, vec![0.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_evaluate_aborts_on_env_error() -> Result<()> {
        let config = ScriptedEnvConfig {
            fail_step_at: Some(2),
            ..env_config()
        };
        let mut evaluator =
            DefaultEvaluator::<ScriptedEnv>::new(&config, 0, 3, RunnerConfig::default())?;
        assert!(evaluator.evaluate(&UniformPolicy::new(1)).is_err());
        assert_eq!(evaluator.env().n_resets, 1);
        Ok(())
    }

    #[test]
    fn test_no_video_without_render() -> Result<()> {
        let dir = TempDir::new("eval_no_render")?;
        let template = dir.path().join("eval_episode_{:03}.gif");
        let mut evaluator =
            DefaultEvaluator::<ScriptedEnv>::new(&env_config(), 0, 2, RunnerConfig::default())?
                .video_template(Some(template.to_string_lossy().to_string()));
        evaluator.evaluate(&UniformPolicy::new(1))?;
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_one_video_per_episode() -> Result<()> {
        let dir = TempDir::new("eval_videos")?;
        let template = dir.path().join("videos/eval_episode_{:03}.gif");
        let mut evaluator = DefaultEvaluator::<ScriptedEnv>::new(
            &env_config(),
            0,
            2,
            RunnerConfig::default().render(true),
        )?
        .video_template(Some(template.to_string_lossy().to_string()));
        evaluator.evaluate(&UniformPolicy::new(1))?;
        assert!(dir.path().join("videos/eval_episode_000.gif").is_file());
        assert!(dir.path().join("videos/eval_episode_001.gif").is_file());
        Ok(())
    }
}
