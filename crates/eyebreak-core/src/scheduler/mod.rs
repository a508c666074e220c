//! Break Scheduler - decides when a break is owed, running, or satisfied
//!
//! Works on confirmed visibility only:
//! - Presence that lasts longer than `time_before_break` makes a break owed
//! - Eyes disappearing while a break is owed start the break
//! - The break counts once absence has lasted at least `break_time`, either
//!   when the eyes come back or passively while they stay away

use crate::debounce::ConfirmedTransition;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
mod tests;

/// Break state of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakState {
    /// No break owed
    Idle,
    /// Presence has exceeded the threshold, a break is owed
    NeedBreak,
    /// Eyes are away during a break. `owed` is cleared once the absence
    /// has been long enough, even before the user comes back.
    InBreak { owed: bool },
}

impl BreakState {
    /// Check if a break is currently owed
    #[must_use]
    pub const fn need_break(&self) -> bool {
        matches!(self, Self::NeedBreak | Self::InBreak { owed: true })
    }

    /// Check if a break is running
    #[must_use]
    pub const fn in_break(&self) -> bool {
        matches!(self, Self::InBreak { .. })
    }

    /// Get human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Working",
            Self::NeedBreak => "Break needed",
            Self::InBreak { owed: true } => "On break",
            Self::InBreak { owed: false } => "On break (done)",
        }
    }
}

/// Notable decision made by the scheduler on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEvent {
    /// Continuous presence exceeded the threshold
    BreakOwed,
    /// Eyes left while a break was owed
    BreakStarted {
        started_at: DateTime<Utc>,
        /// How long ago the break started when it was confirmed
        detected_after: Duration,
    },
    /// Eyes came back after a long enough absence
    BreakCompleted { duration: Duration },
    /// Eyes came back before `required` had passed. `still_owed` is false
    /// when the break had already been satisfied while the eyes were away.
    BreakTooShort {
        duration: Duration,
        required: Duration,
        still_owed: bool,
    },
    /// Absence has lasted long enough while the eyes are still away
    BreakSatisfiedWhileAway,
}

impl fmt::Display for BreakEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BreakOwed => write!(f, "Time for a break!"),
            Self::BreakStarted { detected_after, .. } => write!(
                f,
                "Break started {} seconds ago",
                detected_after.num_seconds()
            ),
            Self::BreakCompleted { .. } => write!(f, "Break was long enough, welcome back!"),
            Self::BreakTooShort {
                duration,
                required,
                still_owed: true,
            } => write!(
                f,
                "Break wasn't long enough ({}s of {}s)! Break is still needed",
                duration.num_seconds().max(0),
                required.num_seconds()
            ),
            Self::BreakTooShort {
                still_owed: false, ..
            } => write!(f, "Welcome back, break time was already satisfied"),
            Self::BreakSatisfiedWhileAway => {
                write!(f, "Break time was long enough, resetting status...")
            }
        }
    }
}

/// Tracks break timing from confirmed visibility changes and elapsed time
#[derive(Debug, Clone)]
pub struct BreakScheduler {
    time_before_break: Duration,
    break_time: Duration,
    state: BreakState,
    eyes_present: bool,
    last_break: DateTime<Utc>,
}

impl BreakScheduler {
    /// Create a scheduler with no break owed and eyes considered absent.
    /// `started_at` counts as the end of the last break.
    #[must_use]
    pub fn new(time_before_break: Duration, break_time: Duration, started_at: DateTime<Utc>) -> Self {
        Self {
            time_before_break,
            break_time,
            state: BreakState::Idle,
            eyes_present: false,
            last_break: started_at,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BreakState {
        self.state
    }

    #[must_use]
    pub const fn needs_break(&self) -> bool {
        self.state.need_break()
    }

    #[must_use]
    pub const fn in_break(&self) -> bool {
        self.state.in_break()
    }

    /// Latest confirmed visibility seen by the scheduler
    #[must_use]
    pub const fn eyes_present(&self) -> bool {
        self.eyes_present
    }

    /// Start of the running break, or the end of the last completed one
    #[must_use]
    pub const fn last_break(&self) -> DateTime<Utc> {
        self.last_break
    }

    /// Evaluate break policy for one tick.
    ///
    /// A confirmed transition consumes the whole tick; the time-based checks
    /// only run on ticks without one.
    pub fn evaluate(
        &mut self,
        now: DateTime<Utc>,
        transition: Option<ConfirmedTransition>,
    ) -> Option<BreakEvent> {
        match transition {
            Some(transition) => self.on_transition(now, transition),
            None => self.on_steady(now),
        }
    }

    fn on_transition(
        &mut self,
        now: DateTime<Utc>,
        transition: ConfirmedTransition,
    ) -> Option<BreakEvent> {
        self.eyes_present = transition.visible;

        match (transition.visible, self.state) {
            (false, BreakState::NeedBreak) => {
                self.state = BreakState::InBreak { owed: true };
                self.last_break = transition.changed_at;
                Some(BreakEvent::BreakStarted {
                    started_at: transition.changed_at,
                    detected_after: now - transition.changed_at,
                })
            }
            (true, BreakState::InBreak { owed }) => {
                let duration = transition.changed_at - self.last_break;
                if duration >= self.break_time {
                    self.state = BreakState::Idle;
                    // Measured from now, not from when the eyes came back
                    self.last_break = now;
                    Some(BreakEvent::BreakCompleted { duration })
                } else {
                    self.state = if owed {
                        BreakState::NeedBreak
                    } else {
                        BreakState::Idle
                    };
                    Some(BreakEvent::BreakTooShort {
                        duration,
                        required: self.break_time,
                        still_owed: owed,
                    })
                }
            }
            _ => None,
        }
    }

    fn on_steady(&mut self, now: DateTime<Utc>) -> Option<BreakEvent> {
        let elapsed = now - self.last_break;

        if self.eyes_present && !self.state.need_break() && elapsed > self.time_before_break {
            self.state = match self.state {
                BreakState::InBreak { .. } => BreakState::InBreak { owed: true },
                BreakState::Idle | BreakState::NeedBreak => BreakState::NeedBreak,
            };
            Some(BreakEvent::BreakOwed)
        } else if !self.eyes_present && self.state.in_break() && elapsed >= self.break_time {
            let was_owed = self.state.need_break();
            self.state = BreakState::InBreak { owed: false };
            was_owed.then_some(BreakEvent::BreakSatisfiedWhileAway)
        } else {
            None
        }
    }
}
