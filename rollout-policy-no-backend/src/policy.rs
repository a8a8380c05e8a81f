use crate::{Checkpoint, Mat, Mlp, PolicyError};
use anyhow::Result;
use log::info;
use ndarray::Array2;
use rand::Rng;
use rollout_core::{BatchedAction, BatchedObservation, Policy, PrngKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters of [`GaussianMlpPolicy`] as stored in a checkpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GaussianMlpParams {
    /// Network computing the mean action from features.
    pub mlp: Mlp,

    /// Log standard deviation per action dimension.
    pub log_std: Vec<f32>,
}

impl GaussianMlpParams {
    /// Randomly initialized parameters with hidden layers of sizes `hidden`.
    pub fn init(
        input_dim: usize,
        hidden: &[usize],
        action_dim: usize,
        log_std: f32,
        seed: u64,
    ) -> Result<Self, PolicyError> {
        let dims = std::iter::once(input_dim)
            .chain(hidden.iter().cloned())
            .chain(std::iter::once(action_dim))
            .collect::<Vec<_>>();
        Ok(Self {
            mlp: Mlp::init(&dims, seed)?,
            log_std: vec![log_std; action_dim],
        })
    }

    fn validate(&self) -> Result<(), PolicyError> {
        self.mlp.validate()?;
        if self.log_std.len() != self.mlp.output_dim() {
            return Err(PolicyError::ShapeMismatch(format!(
                "{} log_std entries for {} actions",
                self.log_std.len(),
                self.mlp.output_dim()
            )));
        }
        Ok(())
    }
}

/// Diagonal Gaussian policy whose mean is given by an MLP with `tanh` output.
///
/// Observations are flattened into feature rows (images scaled to `[0, 1]`).
/// Sampled actions are clipped to `[-1, 1]`.
pub struct GaussianMlpPolicy {
    params: GaussianMlpParams,
    deterministic: bool,
}

impl GaussianMlpPolicy {
    /// Fails if the network layers do not chain or `log_std` does not match the
    /// output dimension.
    pub fn new(params: GaussianMlpParams) -> Result<Self, PolicyError> {
        params.validate()?;
        Ok(Self {
            params,
            deterministic: false,
        })
    }

    /// Returns the mean action instead of sampling.
    pub fn deterministic(mut self, v: bool) -> Self {
        self.deterministic = v;
        self
    }

    /// Parameters of the policy.
    pub fn params(&self) -> &GaussianMlpParams {
        &self.params
    }

    /// Restores the policy from a checkpoint.
    ///
    /// If `example` is given, its feature dimension is checked against the
    /// network input, so a mismatch fails here rather than on the first step.
    pub fn restore(
        ckpt: &Checkpoint,
        example: Option<&BatchedObservation>,
    ) -> Result<Self, PolicyError> {
        let (params, step): (GaussianMlpParams, _) = ckpt.restore()?;
        let policy = Self::new(params)?;
        if let Some(obs) = example {
            let d = obs
                .features()
                .map_err(|e| PolicyError::ShapeMismatch(e.to_string()))?
                .ncols();
            if d != policy.params.mlp.input_dim() {
                return Err(PolicyError::ShapeMismatch(format!(
                    "observation has {} features, network expects {}",
                    d,
                    policy.params.mlp.input_dim()
                )));
            }
        }
        info!(
            "[restore] loaded params from: {} step: {}",
            ckpt.dir.display(),
            step
        );
        Ok(policy)
    }

    /// Saves the parameters as training step `step` in `dir`.
    pub fn save(&self, dir: impl AsRef<Path>, step: usize) -> Result<PathBuf, PolicyError> {
        Checkpoint::save(dir, step, &self.params)
    }

    fn mean(&self, obs: &BatchedObservation) -> Result<Mat, PolicyError> {
        let x = obs
            .features()
            .map_err(|e| PolicyError::ShapeMismatch(e.to_string()))?;
        let x: Mat = x.into();
        self.params.mlp.forward(&x.transpose())
    }
}

/// Standard normal sample by the Box-Muller transform.
fn standard_normal(rng: &mut impl Rng) -> f32 {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}

impl Policy for GaussianMlpPolicy {
    fn sample_actions(&self, obs: &BatchedObservation, seed: PrngKey) -> Result<BatchedAction> {
        // (action_dim, batch)
        let mean = self.mean(obs)?;
        let (a, b) = (mean.rows(), mean.cols());
        if self.deterministic {
            return Ok(Array2::from_shape_fn((b, a), |(i, j)| mean.get(j, i)));
        }
        let mut rng = seed.rng();
        let std: Vec<f32> = self.params.log_std.iter().map(|s| s.exp()).collect();
        Ok(Array2::from_shape_fn((b, a), |(i, j)| {
            (mean.get(j, i) + std[j] * standard_normal(&mut rng)).clamp(-1.0, 1.0)
        }))
    }
}
