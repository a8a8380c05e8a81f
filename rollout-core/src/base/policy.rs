//! Policy.
use super::{BatchedAction, BatchedObservation};
use crate::PrngKey;
use anyhow::Result;

/// A frozen policy.
///
/// Policy is a mapping from a batch of observations to a batch of actions.
/// Stochastic policies draw their randomness from `seed` only, so that
/// the same key and observation always give the same action.
///
/// Parameters are never updated during evaluation, hence `&self`.
pub trait Policy {
    /// Samples one action per row of `obs`.
    ///
    /// The returned batch must have as many rows as `obs`.
    fn sample_actions(&self, obs: &BatchedObservation, seed: PrngKey) -> Result<BatchedAction>;
}
