//! User settings and the ranges drawn from them.
//!
//! Raw settings come from an external store and may be out of bounds.
//! [`DelayRange`] and [`RepetitionRange`] clamp them into valid ranges,
//! so callers never sample from an inverted or too-short interval.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest delay allowed between two automatic sends.
pub const MIN_ALLOWED_DELAY_MS: u64 = 500;

/// Most copies of an emoticon a single send may carry.
pub const MAX_REPETITIONS: u32 = 100;

/// Settings read from the settings store on every send and scheduling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub min_repetitions: u32,
    pub max_repetitions: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_repetitions: 1,
            max_repetitions: 1,
            min_delay_ms: 2000,
            max_delay_ms: 3000,
        }
    }
}

impl Settings {
    /// Check that the settings are acceptable as-is, without clamping.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_repetitions == 0 {
            return Err(ValidationError::ZeroRepetitions);
        }
        let largest = self.min_repetitions.max(self.max_repetitions);
        if largest > MAX_REPETITIONS {
            return Err(ValidationError::TooManyRepetitions {
                maximum: MAX_REPETITIONS,
                actual: largest,
            });
        }
        if self.min_repetitions > self.max_repetitions {
            return Err(ValidationError::RepetitionsInverted {
                min: self.min_repetitions,
                max: self.max_repetitions,
            });
        }
        if self.min_delay_ms < MIN_ALLOWED_DELAY_MS {
            return Err(ValidationError::DelayTooShort {
                minimum: MIN_ALLOWED_DELAY_MS,
                actual: self.min_delay_ms,
            });
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ValidationError::DelayInverted {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn delay_range(&self) -> DelayRange {
        DelayRange::new(self.min_delay_ms, self.max_delay_ms)
    }

    #[must_use]
    pub fn repetition_range(&self) -> RepetitionRange {
        RepetitionRange::new(self.min_repetitions, self.max_repetitions)
    }
}

/// Inclusive delay interval, `MIN_ALLOWED_DELAY_MS <= min_ms <= max_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    /// Build a range, raising `min_ms` to the allowed floor and `max_ms` to `min_ms`.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        let min_ms = min_ms.max(MIN_ALLOWED_DELAY_MS);
        let max_ms = max_ms.max(min_ms);
        Self { min_ms, max_ms }
    }

    #[must_use]
    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    #[must_use]
    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Draw a delay uniformly from `[min_ms, max_ms]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

/// Inclusive repetition interval, `1 <= min <= max <= MAX_REPETITIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionRange {
    min: u32,
    max: u32,
}

impl RepetitionRange {
    /// Build a range, holding both bounds within `1..=MAX_REPETITIONS` and
    /// raising `max` to `min`.
    #[must_use]
    pub fn new(min: u32, max: u32) -> Self {
        let min = min.clamp(1, MAX_REPETITIONS);
        let max = max.clamp(min, MAX_REPETITIONS);
        Self { min, max }
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Draw a repetition count uniformly from `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}
