//! Configuration of [`EpisodeRunner`](super::EpisodeRunner).
use crate::ObsAdapterConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpisodeRunner`](super::EpisodeRunner).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct RunnerConfig {
    /// Episodes end after this many steps even if the environment does not
    /// report termination or truncation.
    pub max_steps: usize,

    /// Seed of the root key of action sampling in every episode.
    pub seed: u64,

    /// If `true`, frames are rendered at every step and written to a video.
    pub render: bool,

    /// Frame rate of the video.
    pub fps: u32,

    /// Configuration of the observation adapter.
    pub adapter: ObsAdapterConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            seed: 0,
            render: false,
            fps: 30,
            adapter: ObsAdapterConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Sets the step ceiling of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the seed of the root key.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Enables or disables rendering.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Sets the frame rate of videos.
    pub fn fps(mut self, v: u32) -> Self {
        self.fps = v;
        self
    }

    /// Sets the configuration of the observation adapter.
    pub fn adapter(mut self, v: ObsAdapterConfig) -> Self {
        self.adapter = v;
        self
    }

    /// Constructs [`RunnerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunnerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Interpolation;
    use tempdir::TempDir;

    #[test]
    fn test_serde_runner_config() -> Result<()> {
        let config = RunnerConfig::default()
            .max_steps(500)
            .seed(3)
            .render(true)
            .adapter(ObsAdapterConfig::default().interpolation(Interpolation::Triangle));

        let dir = TempDir::new("runner_config")?;
        let path = dir.path().join("runner_config.yaml");
        config.save(&path)?;
        let config_ = RunnerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_uses_defaults() -> Result<()> {
        let config: RunnerConfig = serde_yaml::from_str("max_steps: 10\n")?;
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.fps, 30);
        assert_eq!(config.adapter.image_hw, Some([240, 320]));
        Ok(())
    }
}
