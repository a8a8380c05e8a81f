//! An environment wrapper stacking consecutive observations.
use crate::{error::RolloutError, Action, Env, ObsField, Observation, Step};
use anyhow::{ensure, Result};
use ndarray::{stack, ArrayD, ArrayViewD, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Configuration of [`FrameStack`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FrameStackConfig<C> {
    /// Configuration of the wrapped environment.
    pub inner: C,

    /// Number of stacked observations.
    pub n_stack: usize,
}

impl<C> FrameStackConfig<C> {
    /// Constructs the configuration.
    pub fn new(inner: C, n_stack: usize) -> Self {
        Self { inner, n_stack }
    }
}

/// Stacks the last `n_stack` observations of the wrapped environment.
///
/// Every leaf, flat array or image, gets a new leading axis of size
/// `n_stack`, oldest first. An `(H, W, C)` camera becomes `(n_stack, H, W, C)`.
/// On reset, the history is filled with copies of the initial observation.
pub struct FrameStack<E: Env> {
    env: E,
    n_stack: usize,
    history: VecDeque<Observation>,
}

impl<E: Env> FrameStack<E> {
    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    fn stacked(&self) -> Result<Observation, RolloutError> {
        let latest = self
            .history
            .back()
            .ok_or_else(|| RolloutError::MalformedObservation("empty history".to_string()))?;
        match latest {
            Observation::Flat(_) => {
                let arrays = self
                    .history
                    .iter()
                    .map(|obs| match obs {
                        Observation::Flat(arr) => Ok(arr.view()),
                        _ => Err(mismatch("")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Observation::Flat(stack_leaf(&arrays, "")?))
            }
            Observation::Structured(_) => {
                let groups = self
                    .history
                    .iter()
                    .map(|obs| match obs {
                        Observation::Structured(fields) => Ok(fields),
                        _ => Err(mismatch("")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Observation::Structured(stack_group(&groups, "")?))
            }
        }
    }
}

fn mismatch(path: &str) -> RolloutError {
    RolloutError::MalformedObservation(format!("structure changed between steps at {:?}", path))
}

fn stack_leaf<A: Clone>(arrays: &[ArrayViewD<A>], path: &str) -> Result<ArrayD<A>, RolloutError> {
    stack(Axis(0), arrays).map_err(|_| mismatch(path))
}

fn stack_group(
    groups: &[&BTreeMap<String, ObsField>],
    prefix: &str,
) -> Result<BTreeMap<String, ObsField>, RolloutError> {
    let latest = groups.last().ok_or_else(|| mismatch(prefix))?;
    let mut out = BTreeMap::new();
    for (key, field) in latest.iter() {
        let path = format!("{}/{}", prefix, key);
        let fields = groups
            .iter()
            .map(|g| g.get(key).ok_or_else(|| mismatch(&path)))
            .collect::<Result<Vec<_>, _>>()?;
        let stacked = match field {
            ObsField::Flat(_) => {
                let arrays = fields
                    .iter()
                    .map(|f| match f {
                        ObsField::Flat(arr) => Ok(arr.view()),
                        _ => Err(mismatch(&path)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ObsField::Flat(stack_leaf(&arrays, &path)?)
            }
            ObsField::Image(_) => {
                let images = fields
                    .iter()
                    .map(|f| match f {
                        ObsField::Image(img) => Ok(img.view()),
                        _ => Err(mismatch(&path)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ObsField::Image(stack_leaf(&images, &path)?)
            }
            ObsField::Nested(_) => {
                let subs = fields
                    .iter()
                    .map(|f| match f {
                        ObsField::Nested(sub) => Ok(sub),
                        _ => Err(mismatch(&path)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ObsField::Nested(stack_group(&subs, &path)?)
            }
        };
        out.insert(key.clone(), stacked);
    }
    Ok(out)
}

impl<E: Env> Env for FrameStack<E> {
    type Config = FrameStackConfig<E::Config>;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        ensure!(config.n_stack >= 1, "n_stack must be positive");
        Ok(Self {
            env: E::build(&config.inner, seed)?,
            n_stack: config.n_stack,
            history: VecDeque::with_capacity(config.n_stack),
        })
    }

    fn reset(&mut self) -> Result<(Observation, Self::Info)> {
        let (obs, info) = self.env.reset()?;
        self.history.clear();
        for _ in 0..self.n_stack {
            self.history.push_back(obs.clone());
        }
        Ok((self.stacked()?, info))
    }

    fn step(&mut self, act: &Action) -> Result<Step<Self>> {
        let step = self.env.step(act)?;
        if self.history.len() == self.n_stack {
            self.history.pop_front();
        }
        self.history.push_back(step.obs);
        Ok(Step::new(
            self.stacked()?,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        ))
    }

    fn render(&mut self) -> Result<Option<ArrayD<u8>>> {
        self.env.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{ScriptedEnv, ScriptedEnvConfig};
    use ndarray::Array1;

    #[test]
    fn test_stack_flat() -> Result<()> {
        let config = FrameStackConfig::new(ScriptedEnvConfig::default(), 3);
        let mut env = FrameStack::<ScriptedEnv>::build(&config, 0)?;
        let (obs, _) = env.reset()?;
        match obs {
            Observation::Flat(arr) => {
                assert_eq!(arr.shape(), &[3, 3]);
                assert!(arr.iter().all(|&v| v == 0.0));
            }
            _ => panic!(),
        }

        env.step(&Array1::zeros(1))?;
        let step = env.step(&Array1::zeros(1))?;
        match step.obs {
            Observation::Flat(arr) => {
                let firsts: Vec<f32> = arr.outer_iter().map(|row| row[0]).collect();
                assert_eq!(firsts, vec![0.0, 1.0, 2.0]);
            }
            _ => panic!(),
        }
        assert_eq!(env.inner().actions.len(), 2);
        Ok(())
    }

    #[test]
    fn test_stack_structured_stacks_images() -> Result<()> {
        let inner = ScriptedEnvConfig {
            pixels_hw: Some((4, 5)),
            ..Default::default()
        };
        let mut env = FrameStack::<ScriptedEnv>::build(&FrameStackConfig::new(inner, 2), 0)?;
        env.reset()?;
        let step = env.step(&Array1::zeros(1))?;
        match step.obs.get(&["agent_pos"]) {
            Some(ObsField::Flat(arr)) => assert_eq!(arr.shape(), &[2, 3]),
            _ => panic!(),
        }
        match step.obs.get(&["pixels", "top"]) {
            Some(ObsField::Image(img)) => {
                assert_eq!(img.shape(), &[2, 4, 5, 3]);
                assert!(img.index_axis(Axis(0), 0).iter().all(|&p| p == 0));
                assert!(img.index_axis(Axis(0), 1).iter().all(|&p| p == 1));
            }
            _ => panic!(),
        }
        Ok(())
    }

    #[test]
    fn test_zero_stack_is_rejected() {
        let config = FrameStackConfig::new(ScriptedEnvConfig::default(), 0);
        assert!(FrameStack::<ScriptedEnv>::build(&config, 0).is_err());
    }
}
