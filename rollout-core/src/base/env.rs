//! Environment.
use super::{Action, Info, Observation, Step};
use anyhow::Result;
use ndarray::ArrayD;

/// Represents an environment, typically a physics simulation.
///
/// Errors returned from [`Env::reset`], [`Env::step`] and [`Env::render`] are
/// not recovered by the runner; they abort the whole evaluation.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<(Observation, Self::Info)>;

    /// Performes an environment step.
    ///
    /// Action scaling, smoothing and sub-stepping are done here; the caller
    /// passes the action as it comes from the policy.
    fn step(&mut self, act: &Action) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the current state as an `(H, W, C)` image.
    ///
    /// Returns `None` if the environment cannot render.
    fn render(&mut self) -> Result<Option<ArrayD<u8>>> {
        Ok(None)
    }
}
