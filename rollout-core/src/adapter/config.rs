//! Configuration of [`ObsAdapter`](super::ObsAdapter).
use serde::{Deserialize, Serialize};

/// Interpolation used when resizing camera images.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Interpolation {
    /// Average over the covered source area. Avoids aliasing when downsizing.
    Area,

    /// Nearest neighbour.
    Nearest,

    /// Linear filter.
    Triangle,

    /// Cubic filter.
    CatmullRom,

    /// Lanczos with window 3.
    Lanczos3,
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Area
    }
}

/// Configuration of [`ObsAdapter`](super::ObsAdapter).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObsAdapterConfig {
    /// Path of the camera image to be resized.
    pub image_path: Vec<String>,

    /// Target `[height, width]` of the image. `None` disables resizing.
    pub image_hw: Option<[u32; 2]>,

    /// Interpolation of the resize.
    pub interpolation: Interpolation,
}

impl Default for ObsAdapterConfig {
    fn default() -> Self {
        Self {
            image_path: vec!["pixels".to_string(), "top".to_string()],
            image_hw: Some([240, 320]),
            interpolation: Interpolation::Area,
        }
    }
}

impl ObsAdapterConfig {
    /// Sets the path of the camera image.
    pub fn image_path<S: Into<String>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.image_path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the target size of the camera image.
    pub fn image_hw(mut self, hw: Option<[u32; 2]>) -> Self {
        self.image_hw = hw;
        self
    }

    /// Sets the interpolation.
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}
