//! Aggregation of episode results over an evaluation run.
use crate::EpisodeResult;
use std::fmt;

/// Results of all episodes of an evaluation run, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    results: Vec<EpisodeResult>,
}

impl RunSummary {
    /// Constructs an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the result of the next episode.
    pub fn push(&mut self, result: EpisodeResult) {
        self.results.push(result);
    }

    /// Number of episodes.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// `true` if no episode has been run.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Episode results in order.
    pub fn results(&self) -> &[EpisodeResult] {
        &self.results
    }

    /// Episode returns in order.
    pub fn returns(&self) -> Vec<f32> {
        self.results.iter().map(|r| r.ret).collect()
    }

    /// Mean of episode returns, `None` without episodes.
    pub fn mean_return(&self) -> Option<f32> {
        if self.results.is_empty() {
            return None;
        }
        let sum: f64 = self.results.iter().map(|r| r.ret as f64).sum();
        Some((sum / self.results.len() as f64) as f32)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mean_return() {
            Some(mean) => write!(f, "[summary] mean_return={:.3}  episodes={}", mean, self.len()),
            None => write!(f, "[summary] mean_return=n/a  episodes=0"),
        }
    }
}
