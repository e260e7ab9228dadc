//! Automation state machine: `Stopped` → `Running` ⇄ `RunningPaused`.
//!
//! [`AutomationState`] holds the pure transition logic. The application
//! layer owns one instance, wraps it with timers and IO, and never mutates
//! the fields directly. Every transition that invalidates scheduled work
//! bumps a generation counter so stale timer callbacks can tell they are
//! stale.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::SendError;

/// Consecutive automatic sends, without distinct chat activity, that pause
/// automation.
pub const SPAM_THRESHOLD: u32 = 3;

/// Minimum spacing between two successful manual sends.
pub const MANUAL_COOLDOWN: Duration = Duration::from_millis(1000);

/// Lifecycle phase of the automation loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Stopped,
    Running,
    /// Running, but scheduling is halted by the spam guard.
    RunningPaused,
}

/// Read-only snapshot for UI display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStatus {
    pub is_running: bool,
    pub is_paused: bool,
}

/// Requests that leave the state untouched. Benign, never surfaced as failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ignored {
    #[error("automation is already running")]
    AlreadyRunning,

    #[error("automation is not running")]
    NotRunning,

    #[error("automation is not paused")]
    NotPaused,
}

/// What the controller should do after a successful automatic send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendVerdict {
    /// Schedule the next attempt.
    Continue,
    /// The spam guard tripped; stop scheduling but keep observing chat.
    Pause,
}

/// The single owned automation state.
#[derive(Debug, Default)]
pub struct AutomationState {
    phase: Phase,
    consecutive_sends: u32,
    last_manual_send: Option<Instant>,
    generation: u64,
}

impl AutomationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn status(&self) -> AutomationStatus {
        AutomationStatus {
            is_running: self.phase != Phase::Stopped,
            is_paused: self.phase == Phase::RunningPaused,
        }
    }

    #[must_use]
    pub fn consecutive_sends(&self) -> u32 {
        self.consecutive_sends
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether work scheduled under `generation` may still act.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.phase == Phase::Running
    }

    /// `Stopped → Running`. Returns the generation the first attempt must
    /// be scheduled under.
    ///
    /// # Errors
    ///
    /// [`Ignored::AlreadyRunning`] when running or paused; nothing changes.
    pub fn start(&mut self) -> Result<u64, Ignored> {
        if self.phase != Phase::Stopped {
            return Err(Ignored::AlreadyRunning);
        }
        self.phase = Phase::Running;
        self.consecutive_sends = 0;
        Ok(self.advance())
    }

    /// `Running | RunningPaused → Stopped`. Returns the phase that was left.
    ///
    /// # Errors
    ///
    /// [`Ignored::NotRunning`] when already stopped.
    pub fn stop(&mut self) -> Result<Phase, Ignored> {
        if self.phase == Phase::Stopped {
            return Err(Ignored::NotRunning);
        }
        let previous = self.phase;
        self.phase = Phase::Stopped;
        self.consecutive_sends = 0;
        self.advance();
        Ok(previous)
    }

    /// Count a successful automatic send and apply the spam guard.
    ///
    /// # Errors
    ///
    /// [`Ignored::NotRunning`] unless the phase is `Running`.
    pub fn record_auto_success(&mut self) -> Result<SendVerdict, Ignored> {
        if self.phase != Phase::Running {
            return Err(Ignored::NotRunning);
        }
        self.consecutive_sends += 1;
        if self.consecutive_sends >= SPAM_THRESHOLD {
            self.phase = Phase::RunningPaused;
            self.advance();
            return Ok(SendVerdict::Pause);
        }
        Ok(SendVerdict::Continue)
    }

    /// Distinct chat activity was observed. Resets the counter while
    /// running and resumes a paused loop.
    ///
    /// Returns the generation to schedule under when the loop resumed.
    ///
    /// # Errors
    ///
    /// [`Ignored::NotRunning`] when stopped, [`Ignored::NotPaused`] when
    /// already running (the counter is still reset).
    pub fn record_distinct_activity(&mut self) -> Result<u64, Ignored> {
        match self.phase {
            Phase::Stopped => Err(Ignored::NotRunning),
            Phase::Running => {
                self.consecutive_sends = 0;
                Err(Ignored::NotPaused)
            }
            Phase::RunningPaused => {
                self.phase = Phase::Running;
                self.consecutive_sends = 0;
                Ok(self.advance())
            }
        }
    }

    /// Reject a manual send inside the cooldown window.
    ///
    /// # Errors
    ///
    /// [`SendError::CooldownActive`] with the time left.
    pub fn check_manual_cooldown(&self, now: Instant) -> Result<(), SendError> {
        let Some(last) = self.last_manual_send else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < MANUAL_COOLDOWN {
            let remaining = MANUAL_COOLDOWN - elapsed;
            return Err(SendError::CooldownActive {
                remaining_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    /// Remember when the last manual send succeeded.
    pub fn record_manual_success(&mut self, at: Instant) {
        self.last_manual_send = Some(at);
    }

    fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
