//! Policies for rollout evaluation without a tensor backend.
//!
//! Parameters are plain vectors serialized with `bincode`, so a policy
//! trained elsewhere can be evaluated with nothing but this crate.
mod checkpoint;
mod error;
mod mat;
mod mlp;
mod policy;
pub use checkpoint::Checkpoint;
pub use error::PolicyError;
pub use mat::Mat;
pub use mlp::Mlp;
pub use policy::{GaussianMlpParams, GaussianMlpPolicy};
