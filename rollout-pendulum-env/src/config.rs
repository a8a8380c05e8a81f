//! Configuration of [`PendulumEnv`](super::PendulumEnv).
use serde::{Deserialize, Serialize};

/// Observation emitted by the environment.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ObsMode {
    /// `[cos θ, sin θ, θ̇]`.
    State,

    /// The state under `agent_pos` and a camera image under `pixels/top`.
    Pixels,
}

/// Size of frames returned by [`Env::render`](rollout_core::Env::render).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RenderConfig {
    /// Frame height in pixels.
    pub height: usize,

    /// Frame width in pixels.
    pub width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            height: 240,
            width: 320,
        }
    }
}

/// Configuration of [`PendulumEnv`](super::PendulumEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PendulumEnvConfig {
    /// Name of the environment, used in logs.
    pub name: String,

    /// Episodes are truncated after this many steps.
    pub max_episode_steps: usize,

    /// State or pixel observations.
    pub obs_mode: ObsMode,

    /// Size `[height, width]` of the camera image in [`ObsMode::Pixels`].
    pub pixels_hw: [usize; 2],

    /// Rendering is disabled if `None`.
    pub render: Option<RenderConfig>,
}

impl Default for PendulumEnvConfig {
    fn default() -> Self {
        Self {
            name: "Pendulum-v1".to_string(),
            max_episode_steps: 200,
            obs_mode: ObsMode::State,
            pixels_hw: [64, 64],
            render: None,
        }
    }
}

impl PendulumEnvConfig {
    /// Sets the name of the environment.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the truncation step.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Sets the observation mode.
    pub fn obs_mode(mut self, v: ObsMode) -> Self {
        self.obs_mode = v;
        self
    }

    /// Sets the camera image size in [`ObsMode::Pixels`].
    pub fn pixels_hw(mut self, height: usize, width: usize) -> Self {
        self.pixels_hw = [height, width];
        self
    }

    /// Enables rendering with the given frame size, or disables it.
    pub fn render(mut self, v: Option<RenderConfig>) -> Self {
        self.render = v;
        self
    }
}
