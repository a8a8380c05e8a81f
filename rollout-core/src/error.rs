//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum RolloutError {
    /// An observation that cannot be interpreted as a structure of numeric arrays.
    #[error("Malformed observation: {0}")]
    MalformedObservation(String),

    /// The policy returned an action batch without rows.
    #[error("Policy returned an empty action batch")]
    EmptyActionBatch,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

/// Errors of the image resize backend.
///
/// These never abort an episode; the adapter falls back to the unresized image.
#[derive(Error, Debug)]
pub enum ResizeError {
    /// The crate was built without an image backend.
    #[error("Image resize backend is not available")]
    Unavailable,

    /// Target or source has a zero-sized axis.
    #[error("Invalid resize from {from:?} to {to:?}")]
    InvalidSize {
        /// Source `(height, width)`.
        from: (usize, usize),
        /// Target `(height, width)`.
        to: (usize, usize),
    },

    /// Number of channels not supported by the backend.
    #[error("Unsupported number of channels: {0}")]
    UnsupportedChannels(usize),

    /// Pixel buffer and shape disagree.
    #[error("Pixel buffer does not match shape: {0}")]
    Shape(String),
}

/// Errors of frame capture and video output.
///
/// These never abort an episode; the episode ends without a video.
#[derive(Error, Debug)]
pub enum VideoError {
    /// The crate was built without a video backend.
    #[error("Video backend is not available")]
    Unavailable,

    /// A rendered frame is not an `(H, W, 3|4)` image of the expected size.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Filesystem error while writing the artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoder error.
    #[error("Encoding error: {0}")]
    Encode(String),
}
