//! Evaluate [`Policy`].
use crate::{
    record::{NullRecorder, Recorder},
    Env, Policy, RunSummary,
};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluate [`Policy`].
pub trait Evaluator<E: Env> {
    /// Runs the evaluation episodes and returns their results.
    fn evaluate<P>(&mut self, policy: &P) -> Result<RunSummary>
    where
        P: Policy + ?Sized,
    {
        self.evaluate_with_recorder(policy, &mut NullRecorder::default())
    }

    /// Same as [`Evaluator::evaluate`], writing a record per episode to `recorder`.
    fn evaluate_with_recorder<P, R>(&mut self, policy: &P, recorder: &mut R) -> Result<RunSummary>
    where
        P: Policy + ?Sized,
        R: Recorder;
}
