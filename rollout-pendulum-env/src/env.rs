use crate::{render, ObsMode, PendulumEnvConfig};
use anyhow::{ensure, Result};
use log::trace;
use ndarray::{Array1, ArrayD};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rollout_core::{Action, Env, ObsField, Observation, Step};
use std::{collections::BTreeMap, f32::consts::PI};

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

/// Inverted pendulum swing-up.
///
/// Actions are 1-dimensional in `[-1, 1]` and scaled to a torque in
/// `[-2, 2]`. The reward is `-(θ² + 0.1 θ̇² + 0.001 u²)` with `θ` normalized
/// to `[-π, π)`. Episodes never terminate and are truncated after
/// `max_episode_steps` steps.
pub struct PendulumEnv {
    config: PendulumEnvConfig,
    rng: StdRng,
    theta: f32,
    theta_dot: f32,
    t: usize,
}

impl PendulumEnv {
    /// Current `(θ, θ̇)`.
    pub fn state(&self) -> (f32, f32) {
        (self.theta, self.theta_dot)
    }

    /// Sets the state, e.g., to replay a situation in tests.
    pub fn set_state(&mut self, theta: f32, theta_dot: f32) {
        self.theta = theta;
        self.theta_dot = theta_dot;
    }

    fn agent_pos(&self) -> ArrayD<f32> {
        Array1::from(vec![self.theta.cos(), self.theta.sin(), self.theta_dot]).into_dyn()
    }

    fn obs(&self) -> Observation {
        match self.config.obs_mode {
            ObsMode::State => Observation::Flat(self.agent_pos()),
            ObsMode::Pixels => {
                let [h, w] = self.config.pixels_hw;
                let mut pixels = BTreeMap::new();
                pixels.insert(
                    "top".to_string(),
                    ObsField::Image(render::draw(self.theta, h, w).into_dyn()),
                );
                let mut fields = BTreeMap::new();
                fields.insert("agent_pos".to_string(), ObsField::Flat(self.agent_pos()));
                fields.insert("pixels".to_string(), ObsField::Nested(pixels));
                Observation::Structured(fields)
            }
        }
    }
}

impl Env for PendulumEnv {
    type Config = PendulumEnvConfig;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.obs_mode == ObsMode::Pixels {
            ensure!(
                config.pixels_hw.iter().all(|&n| n > 0),
                "pixels_hw must be positive: {:?}",
                config.pixels_hw
            );
        }
        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed as u64),
            theta: 0.0,
            theta_dot: 0.0,
            t: 0,
        })
    }

    fn reset(&mut self) -> Result<(Observation, ())> {
        self.theta = self.rng.gen_range(-PI..=PI);
        self.theta_dot = self.rng.gen_range(-1.0..=1.0);
        self.t = 0;
        Ok((self.obs(), ()))
    }

    fn step(&mut self, act: &Action) -> Result<Step<Self>> {
        ensure!(
            act.len() == 1,
            "{} expects a 1-dimensional action, got {}",
            self.config.name,
            act.len()
        );
        let u = (act[0] * MAX_TORQUE).clamp(-MAX_TORQUE, MAX_TORQUE);
        let (th, thdot) = (self.theta, self.theta_dot);
        let cost = angle_normalize(th).powi(2) + 0.1 * thdot.powi(2) + 0.001 * u.powi(2);

        let thdot = thdot + (3.0 * G / (2.0 * L) * th.sin() + 3.0 / (M * L * L) * u) * DT;
        let thdot = thdot.clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = th + thdot * DT;
        self.theta_dot = thdot;
        self.t += 1;
        trace!("t={} theta={} theta_dot={} u={}", self.t, self.theta, thdot, u);

        let is_truncated = self.t >= self.config.max_episode_steps;
        Ok(Step::new(self.obs(), -cost, false, is_truncated, ()))
    }

    fn render(&mut self) -> Result<Option<ArrayD<u8>>> {
        Ok(self
            .config
            .render
            .map(|r| render::draw(self.theta, r.height, r.width).into_dyn()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderConfig;

    #[test]
    fn test_reset_is_seeded() -> Result<()> {
        let config = PendulumEnvConfig::default();
        let mut env1 = PendulumEnv::build(&config, 3)?;
        let mut env2 = PendulumEnv::build(&config, 3)?;
        let (o1, _) = env1.reset()?;
        let (o2, _) = env2.reset()?;
        assert_eq!(o1, o2);
        let (th, thdot) = env1.state();
        assert!((-PI..=PI).contains(&th));
        assert!((-1.0..=1.0).contains(&thdot));
        Ok(())
    }

    #[test]
    fn test_upright_at_rest_costs_nothing() -> Result<()> {
        let mut env = PendulumEnv::build(&PendulumEnvConfig::default(), 0)?;
        env.reset()?;
        env.set_state(0.0, 0.0);
        let step = env.step(&Array1::from(vec![0.0]))?;
        assert_eq!(step.reward, 0.0);
        assert_eq!(env.state(), (0.0, 0.0));

        env.set_state(PI, 0.0);
        let step = env.step(&Array1::from(vec![1.0]))?;
        let expected = -(PI * PI + 0.001 * 4.0);
        assert!((step.reward - expected).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_speed_is_clipped() -> Result<()> {
        let mut env = PendulumEnv::build(&PendulumEnvConfig::default(), 0)?;
        env.reset()?;
        env.set_state(1.5, 7.9);
        env.step(&Array1::from(vec![1.0]))?;
        assert_eq!(env.state().1, MAX_SPEED);
        Ok(())
    }

    #[test]
    fn test_truncation() -> Result<()> {
        let config = PendulumEnvConfig::default().max_episode_steps(5);
        let mut env = PendulumEnv::build(&config, 0)?;
        env.reset()?;
        for t in 1..=5 {
            let step = env.step(&Array1::from(vec![0.0]))?;
            assert!(!step.is_terminated);
            assert_eq!(step.is_truncated, t == 5);
        }
        assert!(env.step(&Array1::from(vec![0.0, 0.0])).is_err());
        Ok(())
    }

    #[test]
    fn test_pixel_observation_and_render() -> Result<()> {
        let config = PendulumEnvConfig::default()
            .obs_mode(ObsMode::Pixels)
            .pixels_hw(16, 20)
            .render(Some(RenderConfig {
                height: 30,
                width: 40,
            }));
        let mut env = PendulumEnv::build(&config, 0)?;
        let (obs, _) = env.reset()?;
        match obs.get(&["pixels", "top"]) {
            Some(ObsField::Image(img)) => assert_eq!(img.shape(), &[16, 20, 3]),
            _ => panic!(),
        }
        match obs.get(&["agent_pos"]) {
            Some(ObsField::Flat(arr)) => assert_eq!(arr.shape(), &[3]),
            _ => panic!(),
        }
        let frame = env.render()?.unwrap();
        assert_eq!(frame.shape(), &[30, 40, 3]);

        let mut env = PendulumEnv::build(&PendulumEnvConfig::default(), 0)?;
        assert!(env.render()?.is_none());
        Ok(())
    }

    #[test]
    fn test_rendered_episodes_write_gifs() -> Result<()> {
        use rollout_core::{dummy::UniformPolicy, DefaultEvaluator, Evaluator as _, RunnerConfig};

        let dir = tempdir::TempDir::new("pendulum_video")?;
        let template = dir.path().join("ep_{:03}.gif");
        let config = PendulumEnvConfig::default()
            .max_episode_steps(4)
            .render(Some(RenderConfig {
                height: 24,
                width: 32,
            }));
        let mut evaluator =
            DefaultEvaluator::<PendulumEnv>::new(&config, 0, 2, RunnerConfig::default().render(true))?
                .video_template(Some(template.to_string_lossy().into_owned()));
        let summary = evaluator.evaluate(&UniformPolicy::new(1))?;

        assert_eq!(summary.len(), 2);
        assert!(dir.path().join("ep_000.gif").is_file());
        assert!(dir.path().join("ep_001.gif").is_file());
        Ok(())
    }
}
