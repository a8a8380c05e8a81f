//! Core functionalities.
mod env;
mod obs;
mod policy;
mod step;
pub use env::Env;
pub use obs::{BatchedObservation, Leaf, ObsField, Observation};
pub use policy::Policy;
pub use step::{Info, Step};

/// A single action, a flat vector nominally in `[-1, 1]`.
///
/// Scaling to the actuator range is up to the environment.
pub type Action = ndarray::Array1<f32>;

/// Actions with a leading batch axis, as returned by [`Policy::sample_actions`].
pub type BatchedAction = ndarray::Array2<f32>;

