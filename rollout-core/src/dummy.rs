//! Scripted environment and policy used in tests.
use crate::{Action, BatchedAction, BatchedObservation, Env, ObsField, Observation, Policy, PrngKey, Step};
use anyhow::{bail, Result};
use ndarray::{Array2, Array3, ArrayD, IxDyn};
use rand::Rng;
use std::{cell::RefCell, collections::BTreeMap};

/// Configuration of [`ScriptedEnv`].
#[derive(Clone, Debug)]
pub struct ScriptedEnvConfig {
    /// Reward at step `t` (0-based) is `rewards[t % rewards.len()]`, or 0 if empty.
    pub rewards: Vec<f32>,

    /// Number of steps after which the episode terminates.
    pub terminate_at: Option<usize>,

    /// Number of steps after which the episode is truncated.
    pub truncate_at: Option<usize>,

    /// Dimension of the flat observation.
    pub obs_dim: usize,

    /// If given, observations also carry a camera image at `pixels/top`.
    pub pixels_hw: Option<(usize, usize)>,

    /// If given, [`Env::render`] returns RGB frames of this size.
    pub render_hw: Option<(usize, usize)>,

    /// If `true`, rendered frames are 2-dimensional.
    pub malformed_render: bool,

    /// [`Env::step`] fails at this step.
    pub fail_step_at: Option<usize>,

    /// If `true`, [`Env::reset`] fails.
    pub fail_reset: bool,

    /// [`Env::render`] fails after this many steps.
    pub fail_render_at: Option<usize>,
}

impl Default for ScriptedEnvConfig {
    fn default() -> Self {
        Self {
            rewards: vec![1.0],
            terminate_at: None,
            truncate_at: None,
            obs_dim: 3,
            pixels_hw: None,
            render_hw: None,
            malformed_render: false,
            fail_step_at: None,
            fail_reset: false,
            fail_render_at: None,
        }
    }
}

/// An environment that follows a fixed script.
///
/// The observation after `t` steps is filled with `t`. Received actions are
/// kept in [`ScriptedEnv::actions`].
pub struct ScriptedEnv {
    config: ScriptedEnvConfig,
    t: usize,

    /// Actions received since construction.
    pub actions: Vec<Action>,

    /// Number of calls to [`Env::reset`].
    pub n_resets: usize,

    /// Number of calls to [`Env::render`].
    pub n_renders: usize,
}

impl ScriptedEnv {
    fn obs(&self) -> Observation {
        let state = ArrayD::from_elem(IxDyn(&[self.config.obs_dim]), self.t as f32);
        match self.config.pixels_hw {
            None => Observation::Flat(state),
            Some((h, w)) => {
                let mut pixels = BTreeMap::new();
                let img = Array3::from_elem((h, w, 3), (self.t % 256) as u8);
                pixels.insert("top".to_string(), ObsField::Image(img.into_dyn()));
                let mut fields = BTreeMap::new();
                fields.insert("agent_pos".to_string(), ObsField::Flat(state));
                fields.insert("pixels".to_string(), ObsField::Nested(pixels));
                Observation::Structured(fields)
            }
        }
    }
}

impl Env for ScriptedEnv {
    type Config = ScriptedEnvConfig;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            t: 0,
            actions: vec![],
            n_resets: 0,
            n_renders: 0,
        })
    }

    fn reset(&mut self) -> Result<(Observation, ())> {
        self.n_resets += 1;
        if self.config.fail_reset {
            bail!("Scripted failure at reset");
        }
        self.t = 0;
        Ok((self.obs(), ()))
    }

    fn step(&mut self, act: &Action) -> Result<Step<Self>> {
        if self.config.fail_step_at == Some(self.t) {
            bail!("Scripted failure at step {}", self.t);
        }
        let rewards = &self.config.rewards;
        let reward = if rewards.is_empty() {
            0.0
        } else {
            rewards[self.t % rewards.len()]
        };
        self.actions.push(act.clone());
        self.t += 1;
        let is_terminated = self.config.terminate_at.map_or(false, |n| self.t >= n);
        let is_truncated = self.config.truncate_at.map_or(false, |n| self.t >= n);
        Ok(Step::new(self.obs(), reward, is_terminated, is_truncated, ()))
    }

    fn render(&mut self) -> Result<Option<ArrayD<u8>>> {
        self.n_renders += 1;
        if self.config.fail_render_at == Some(self.t) {
            bail!("Scripted render failure at step {}", self.t);
        }
        Ok(self.config.render_hw.map(|(h, w)| {
            if self.config.malformed_render {
                ArrayD::zeros(IxDyn(&[h, w]))
            } else {
                ArrayD::from_elem(IxDyn(&[h, w, 3]), (self.t * 8 % 256) as u8)
            }
        }))
    }
}

/// Samples actions uniformly from `[-1, 1]` using only the given key.
///
/// Keys passed to the policy are kept in [`UniformPolicy::keys`].
pub struct UniformPolicy {
    act_dim: usize,

    /// Keys received since construction.
    pub keys: RefCell<Vec<PrngKey>>,
}

impl UniformPolicy {
    /// Constructs the policy.
    pub fn new(act_dim: usize) -> Self {
        Self {
            act_dim,
            keys: RefCell::new(vec![]),
        }
    }
}

impl Policy for UniformPolicy {
    fn sample_actions(&self, obs: &BatchedObservation, seed: PrngKey) -> Result<BatchedAction> {
        self.keys.borrow_mut().push(seed);
        let mut rng = seed.rng();
        let n = obs.batch_size();
        Ok(Array2::from_shape_fn((n, self.act_dim), |_| {
            rng.gen_range(-1.0f32..=1.0)
        }))
    }
}
