//! Runs a single episode of a policy in an environment.
mod config;
pub use config::RunnerConfig;

use crate::{
    error::RolloutError,
    video::{default_video_writer, write_video, FrameBuffer, VideoWriter},
    Action, BatchedAction, Env, ObsAdapter, Policy, PrngKey,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Return and length of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct EpisodeResult {
    /// Sum of rewards.
    #[serde(rename = "return")]
    pub ret: f32,

    /// Number of environment steps.
    pub length: usize,
}

/// Drives the interaction between a policy and an environment.
///
/// An episode ends when the environment reports termination or truncation,
/// or when the number of steps reaches [`RunnerConfig::max_steps`]. The three
/// cases are not distinguished in [`EpisodeResult`].
///
/// Action sampling starts from the root key [`RunnerConfig::seed`]. At every
/// step the key is split; one half becomes the new state and the other is
/// passed to the policy. Hence a given seed, policy and environment reproduce
/// the episode exactly, while every step gets its own key.
pub struct EpisodeRunner {
    config: RunnerConfig,
    adapter: ObsAdapter,
    video_writer: Option<Box<dyn VideoWriter>>,
}

impl EpisodeRunner {
    /// Constructs a runner with the resize and video backends compiled into the crate.
    pub fn new(config: RunnerConfig) -> Self {
        let adapter = ObsAdapter::new(config.adapter.clone());
        Self {
            config,
            adapter,
            video_writer: default_video_writer(),
        }
    }

    /// Replaces the video backend. `None` disables video output.
    pub fn with_video_writer(mut self, video_writer: Option<Box<dyn VideoWriter>>) -> Self {
        self.video_writer = video_writer;
        self
    }

    /// Replaces the observation adapter.
    pub fn with_adapter(mut self, adapter: ObsAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs an episode from reset to its end.
    ///
    /// If rendering is enabled and `record_path` is given, captured frames are
    /// written there as a video. Errors of the environment or the policy abort
    /// the episode; problems with frames or the video only skip the video.
    pub fn run_episode<E, P>(
        &self,
        policy: &P,
        env: &mut E,
        record_path: Option<&Path>,
    ) -> Result<EpisodeResult>
    where
        E: Env,
        P: Policy + ?Sized,
    {
        let (obs, _) = env.reset()?;
        let mut obs = self.adapter.adapt(obs);
        let mut key = PrngKey::new(self.config.seed);
        let mut frames = FrameBuffer::new();
        let mut ret = 0f32;
        let mut length = 0usize;

        loop {
            let (next_key, sub_key) = key.split();
            key = next_key;
            let act = first_action(policy.sample_actions(&obs, sub_key)?)?;

            let step = env.step(&act)?;
            let done = step.is_done();
            obs = self.adapter.adapt(step.obs);
            ret += step.reward;
            length += 1;

            if self.config.render {
                self.capture(env, &mut frames)?;
            }

            if done || length >= self.config.max_steps {
                break;
            }
        }

        log::debug!("Episode length: {:?}", length);
        log::debug!("Episode return: {:?}", ret);

        self.flush(&frames, record_path);

        Ok(EpisodeResult { ret, length })
    }

    /// Renders a frame and keeps it if it can be put in a video.
    fn capture<E: Env>(&self, env: &mut E, frames: &mut FrameBuffer) -> Result<()> {
        let frame = match env.render()? {
            Some(frame) => frame,
            None => return Ok(()),
        };
        if self.video_writer.is_none() {
            return Ok(());
        }
        if let Err(e) = frames.push(frame) {
            log::warn!("Frame is skipped: {}", e);
        }
        Ok(())
    }

    fn flush(&self, frames: &FrameBuffer, record_path: Option<&Path>) {
        if frames.is_empty() {
            return;
        }
        let (path, writer) = match (record_path, self.video_writer.as_ref()) {
            (Some(path), Some(writer)) => (path, writer),
            _ => return,
        };
        match write_video(writer.as_ref(), path, frames, self.config.fps) {
            Ok(()) => log::info!("[video] saved: {}", path.display()),
            Err(e) => log::warn!("Failed to save video {}: {}", path.display(), e),
        }
    }
}

/// Strips the batch axis of the policy output.
fn first_action(act: BatchedAction) -> Result<Action, RolloutError> {
    if act.nrows() == 0 {
        return Err(RolloutError::EmptyActionBatch);
    }
    Ok(act.row(0).to_owned())
}
