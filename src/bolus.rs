//! Bolus delivery progress tracking.
//!
//! The one stateful component of the engine.  Pump drivers report
//! delivery progress as it arrives, and comms retries can replay stale
//! updates out of order — the tracker enforces the non-decreasing law
//! so the displayed progress bar never runs backwards.
//!
//! Progress notifications go through the [`BolusObserver`] delegate
//! rather than ambient observation, keeping the tracker independently
//! testable and the presentation layer swappable.

use log::info;

use crate::telemetry::{BolusState, Timestamp};

/// Callback trait invoked as a bolus session changes.
///
/// All methods default to no-ops; implement only what you render.
pub trait BolusObserver {
    /// A new session began (new bolus identity).
    fn on_session_started(&mut self, _amount_units: f64) {}

    /// Progress advanced.  `delivered_units` is unrounded.
    fn on_progress(&mut self, _fraction: f64, _delivered_units: f64) {}

    /// Delivery reached the full amount.
    fn on_completed(&mut self, _amount_units: f64) {}

    /// Delivery was cancelled mid-flight.
    fn on_cancelled(&mut self, _delivered_units: f64) {}
}

/// No-op observer for callers that only consume the report.
impl BolusObserver for () {}

#[derive(Debug, Clone, Copy)]
struct Session {
    /// Identity key — the bolus start time from the pump driver.
    id: Timestamp,
    amount_units: f64,
    fraction: f64,
    cancelled: bool,
    completed: bool,
}

/// Monotonic progress tracker for one in-flight bolus at a time.
#[derive(Debug, Default)]
pub struct BolusProgressTracker {
    session: Option<Session>,
}

impl BolusProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session, replacing any previous one.
    pub fn start(&mut self, id: Timestamp, amount_units: f64) {
        info!("bolus session started: {:.2} U", amount_units);
        self.session = Some(Session {
            id,
            amount_units,
            fraction: 0.0,
            cancelled: false,
            completed: false,
        });
    }

    /// Advance progress.  Returns `true` if the stored fraction moved.
    ///
    /// Values are clamped into [0,1].  Regressions, non-finite values,
    /// and updates after cancel/completion are rejected — the stored
    /// fraction is non-decreasing for the whole session.
    pub fn advance(&mut self, fraction: f64) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        if session.cancelled || session.completed || !fraction.is_finite() {
            return false;
        }

        let fraction = fraction.clamp(0.0, 1.0);
        if fraction <= session.fraction {
            return false;
        }

        session.fraction = fraction;
        if session.fraction >= 1.0 {
            session.completed = true;
            info!("bolus session complete: {:.2} U", session.amount_units);
        }
        true
    }

    /// Cancel the session.  Terminal: later `advance` calls are no-ops
    /// until a new session starts.
    pub fn cancel(&mut self) {
        if let Some(session) = &mut self.session {
            if !session.cancelled && !session.completed {
                info!(
                    "bolus session cancelled at {:.0}%",
                    session.fraction * 100.0
                );
            }
            session.cancelled = true;
        }
    }

    /// Progress fraction of the current session; 0 with no session.
    pub fn current_fraction(&self) -> f64 {
        self.session.map_or(0.0, |s| s.fraction)
    }

    /// Units delivered so far for an arbitrary total, unrounded.
    pub fn delivered_amount(&self, total_units: f64) -> f64 {
        total_units * self.current_fraction()
    }

    /// Units delivered so far of the session's own amount.
    pub fn delivered_units(&self) -> f64 {
        self.session
            .map_or(0.0, |s| s.amount_units * s.fraction)
    }

    /// True while a bolus is in flight and can still be cancelled.
    pub fn cancellable(&self) -> bool {
        self.session
            .is_some_and(|s| !s.cancelled && !s.completed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.session.is_some_and(|s| s.cancelled)
    }

    pub fn session_amount(&self) -> Option<f64> {
        self.session.map(|s| s.amount_units)
    }

    /// Synchronize from the bolus field of a telemetry snapshot.
    ///
    /// A changed `started_at` (or amount) is a new bolus: the session
    /// resets explicitly, which is the only path on which the fraction
    /// may drop.  Observer methods fire only on actual transitions.
    pub fn apply(&mut self, bolus: Option<&BolusState>, observer: &mut dyn BolusObserver) {
        let Some(bolus) = bolus else {
            // Delivery subsystem no longer reports a bolus — session over.
            self.session = None;
            return;
        };

        let is_new = self.session.is_none_or(|s| {
            s.id != bolus.started_at || s.amount_units != bolus.amount_units
        });
        if is_new {
            self.start(bolus.started_at, bolus.amount_units);
            observer.on_session_started(bolus.amount_units);
        }

        if bolus.cancelled {
            let was_cancellable = self.cancellable();
            self.cancel();
            if was_cancellable {
                observer.on_cancelled(self.delivered_units());
            }
            return;
        }

        let was_complete = self.session.is_some_and(|s| s.completed);
        if self.advance(bolus.delivered_fraction) {
            observer.on_progress(self.current_fraction(), self.delivered_units());
            if !was_complete && self.session.is_some_and(|s| s.completed) {
                observer.on_completed(bolus.amount_units);
            }
        }
    }
}
