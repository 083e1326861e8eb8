//! Pending-intent tracking for the pause toggle.
//!
//! Pressing `k` sends pause/resume straight to the remote, but the snapshot
//! only learns the outcome on the next poll, up to a full poll period later.
//! Until then the play/pause glyph shows the intended value and pulses; if no
//! poll confirms it in time the glyph is flagged instead.
//!
//! ```text
//!  Confirmed(T)     poll agrees; render normally
//!  Pending { .. }   command sent, not yet seen remotely; pulse
//!  TimedOut { .. }  no confirmation within INTENT_TIMEOUT; warn
//! ```

use std::time::{Duration, Instant};

/// Longer than one default poll period plus a slow request.
pub const INTENT_TIMEOUT: Duration = Duration::from_millis(6500);

const PULSE_MS: u128 = 400;

#[derive(Debug, Clone)]
pub enum IntentState<T: Clone + PartialEq> {
    Confirmed(T),
    Pending {
        intended: T,
        confirmed: T,
        since: Instant,
    },
    TimedOut { intended: T, confirmed: T },
}

impl<T: Clone + PartialEq> IntentState<T> {
    pub fn new(value: T) -> Self {
        Self::Confirmed(value)
    }

    /// The value to display: what the user asked for, if anything.
    pub fn intended(&self) -> &T {
        match self {
            Self::Confirmed(v) => v,
            Self::Pending { intended, .. } => intended,
            Self::TimedOut { intended, .. } => intended,
        }
    }

    pub fn confirmed(&self) -> &T {
        match self {
            Self::Confirmed(v) => v,
            Self::Pending { confirmed, .. } => confirmed,
            Self::TimedOut { confirmed, .. } => confirmed,
        }
    }

    /// Transitions to `Pending` unless `intended` already matches the
    /// confirmed value.
    pub fn set_intent(&mut self, intended: T) {
        self.set_intent_at(intended, Instant::now());
    }

    fn set_intent_at(&mut self, intended: T, now: Instant) {
        let confirmed = self.confirmed().clone();
        if intended == confirmed {
            *self = Self::Confirmed(intended);
        } else {
            *self = Self::Pending {
                intended,
                confirmed,
                since: now,
            };
        }
    }

    /// Returns `true` if the intent just timed out.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        if let Self::Pending {
            intended,
            confirmed,
            since,
        } = self
        {
            if now.saturating_duration_since(*since) >= INTENT_TIMEOUT {
                *self = Self::TimedOut {
                    intended: intended.clone(),
                    confirmed: confirmed.clone(),
                };
                return true;
            }
        }
        false
    }

    /// Feed the latest polled value. Returns `true` if the state changed.
    ///
    /// A pending intent survives polls that still report the old value, so
    /// a poll that raced the command does not cancel the indicator.
    pub fn on_confirmed(&mut self, value: T) -> bool {
        match self {
            Self::Pending {
                intended,
                confirmed,
                ..
            } => {
                if value == *intended {
                    *self = Self::Confirmed(value);
                    return true;
                }
                *confirmed = value;
                false
            }
            Self::TimedOut { .. } => {
                *self = Self::Confirmed(value);
                true
            }
            Self::Confirmed(v) => {
                if *v != value {
                    *v = value;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn render_state(&self) -> RenderHint {
        self.render_state_at(Instant::now())
    }

    fn render_state_at(&self, now: Instant) -> RenderHint {
        match self {
            Self::Confirmed(_) => RenderHint::Normal,
            Self::Pending { since, .. } => {
                let phase = now.saturating_duration_since(*since).as_millis() / PULSE_MS;
                if phase % 2 == 0 {
                    RenderHint::PendingVisible
                } else {
                    RenderHint::PendingHidden
                }
            }
            Self::TimedOut { .. } => RenderHint::TimedOut,
        }
    }
}

/// How to render a value that may be pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHint {
    Normal,
    /// Pending, pulse-on frame.
    PendingVisible,
    /// Pending, pulse-off frame.
    PendingHidden,
    /// Timed out; warning colour and a `?` suffix.
    TimedOut,
}
