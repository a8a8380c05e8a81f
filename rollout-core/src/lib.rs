#![warn(missing_docs)]
//! Episode rollout of frozen policies in simulation environments.
//!
//! A restored [`Policy`] is run against an [`Env`] for a fixed number of
//! episodes. Before every policy query, the raw [`Observation`] passes through
//! the [`ObsAdapter`], which optionally resizes a designated camera image and
//! adds a batch axis of size 1. The [`EpisodeRunner`] drives one episode,
//! [`DefaultEvaluator`] repeats it and aggregates a [`RunSummary`].
pub mod adapter;
pub mod dummy;
pub mod error;
pub mod record;
pub mod video;

mod base;
pub use base::{
    Action, BatchedAction, BatchedObservation, Env, Info, Leaf, ObsField, Observation, Policy, Step,
};

mod seed;
pub use seed::PrngKey;

mod runner;
pub use runner::{EpisodeResult, EpisodeRunner, RunnerConfig};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod summary;
pub use summary::RunSummary;

mod frame_stack;
pub use frame_stack::{FrameStack, FrameStackConfig};

pub use adapter::{ObsAdapter, ObsAdapterConfig};
