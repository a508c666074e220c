//! Debounce filter for the per-frame "eyes visible" verdict.
//!
//! Single frames from the detector are noisy: a blink or a head turn can flip
//! the verdict for a frame or two. A new value is only trusted once it has
//! been seen continuously for longer than the confirmation window.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A visibility change that survived the confirmation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfirmedTransition {
    /// New confirmed visibility
    pub visible: bool,
    /// When the change is considered to have happened: the confirmation
    /// time minus the confirmation window
    pub changed_at: DateTime<Utc>,
}

/// Candidate value waiting for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    pub candidate: bool,
    pub first_seen: DateTime<Utc>,
}

/// What a single observation did to the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceStep {
    /// Frame agrees with the confirmed value and nothing was pending
    Steady,
    /// Frame disagreed for the first time; candidate recorded
    PendingStarted,
    /// Candidate still present but the window has not elapsed yet
    PendingWaiting,
    /// Frame reverted to the confirmed value; candidate dropped
    PendingCancelled,
    /// Candidate promoted to the confirmed value
    Confirmed(ConfirmedTransition),
}

impl DebounceStep {
    #[must_use]
    pub const fn transition(self) -> Option<ConfirmedTransition> {
        match self {
            Self::Confirmed(transition) => Some(transition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebounceFilter {
    confirmation_window: Duration,
    confirmed: bool,
    pending: Option<PendingChange>,
}

impl DebounceFilter {
    /// Create a filter whose confirmed value starts as "not visible"
    #[must_use]
    pub fn new(confirmation_window: Duration) -> Self {
        Self::with_initial(confirmation_window, false)
    }

    #[must_use]
    pub fn with_initial(confirmation_window: Duration, visible: bool) -> Self {
        Self {
            confirmation_window,
            confirmed: visible,
            pending: None,
        }
    }

    /// Current confirmed visibility
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.confirmed
    }

    #[must_use]
    pub const fn pending(&self) -> Option<PendingChange> {
        self.pending
    }

    #[must_use]
    pub const fn confirmation_window(&self) -> Duration {
        self.confirmation_window
    }

    /// Feed one raw verdict, returning the confirmed transition if any
    pub fn observe(&mut self, raw: bool, now: DateTime<Utc>) -> Option<ConfirmedTransition> {
        self.update(raw, now).transition()
    }

    /// Feed one raw verdict and report exactly what happened
    pub fn update(&mut self, raw: bool, now: DateTime<Utc>) -> DebounceStep {
        if raw == self.confirmed {
            return if self.pending.take().is_some() {
                DebounceStep::PendingCancelled
            } else {
                DebounceStep::Steady
            };
        }

        let Some(pending) = self.pending else {
            self.pending = Some(PendingChange {
                candidate: raw,
                first_seen: now,
            });
            return DebounceStep::PendingStarted;
        };

        // A regressed clock yields a negative elapsed time, which never confirms
        if now - pending.first_seen > self.confirmation_window {
            self.confirmed = raw;
            self.pending = None;
            DebounceStep::Confirmed(ConfirmedTransition {
                visible: raw,
                changed_at: now - self.confirmation_window,
            })
        } else {
            DebounceStep::PendingWaiting
        }
    }
}
