//! Records of evaluation runs.
//!
//! The evaluator writes one [`Record`] per episode to a [`Recorder`]:
//!
//! * `episode` - index of the episode
//! * `return` - sum of rewards
//! * `length` - number of steps
//! * `timestamp` - end of the episode
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
