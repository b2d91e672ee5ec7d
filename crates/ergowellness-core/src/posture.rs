//! Posture estimator output contract.
//!
//! The pose model runs outside this crate. Whatever produces readings only
//! has to implement [`PostureEstimator`]; [`PostureMonitor`] turns a stream
//! of readings into an occasional [`Signal::PostureWarning`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Signal;

/// Score below which posture is `bad`.
pub const BAD_BELOW: u8 = 50;
/// Score below which posture is `warning`.
pub const WARNING_BELOW: u8 = 70;
/// Consecutive bad readings tolerated before a warning is signalled.
pub const BAD_STREAK_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostureStatus {
    Good,
    Warning,
    Bad,
}

impl PostureStatus {
    pub fn from_score(score: u8) -> Self {
        if score < BAD_BELOW {
            PostureStatus::Bad
        } else if score < WARNING_BELOW {
            PostureStatus::Warning
        } else {
            PostureStatus::Good
        }
    }
}

/// One processed frame's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureReading {
    /// 0..=100, higher is better.
    pub score: u8,
    pub status: PostureStatus,
}

impl PostureReading {
    /// Reading from a raw score; scores above 100 are clamped.
    pub fn from_score(score: u8) -> Self {
        let score = score.min(100);
        Self {
            score,
            status: PostureStatus::from_score(score),
        }
    }
}

/// External producer of posture readings.
pub trait PostureEstimator: Send {
    /// Next reading, or `None` when the frame source is exhausted.
    fn next_reading(&mut self) -> Option<PostureReading>;
}

/// Counts consecutive bad readings.
#[derive(Debug, Default)]
pub struct PostureMonitor {
    consecutive_bad: u32,
}

impl PostureMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive_bad(&self) -> u32 {
        self.consecutive_bad
    }

    /// Feed one reading. Returns a warning once the bad streak passes
    /// [`BAD_STREAK_LIMIT`], and again on every further bad reading.
    pub fn observe(&mut self, reading: PostureReading) -> Option<Signal> {
        match reading.status {
            PostureStatus::Good => {
                self.consecutive_bad = 0;
                None
            }
            PostureStatus::Warning => None,
            PostureStatus::Bad => {
                self.consecutive_bad = self.consecutive_bad.saturating_add(1);
                if self.consecutive_bad > BAD_STREAK_LIMIT {
                    tracing::info!(
                        score = reading.score,
                        consecutive_bad = self.consecutive_bad,
                        "posture warning"
                    );
                    Some(Signal::PostureWarning {
                        reading,
                        consecutive_bad: self.consecutive_bad,
                        at: Utc::now(),
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Drain an estimator, collecting every warning it triggers.
    pub fn run(&mut self, estimator: &mut dyn PostureEstimator) -> Vec<Signal> {
        let mut warnings = Vec::new();
        while let Some(reading) = estimator.next_reading() {
            if let Some(signal) = self.observe(reading) {
                warnings.push(signal);
            }
        }
        warnings
    }
}
