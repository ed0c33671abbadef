//! Status engine — the facade the host app ticks.
//!
//! [`StatusEngine`] owns the configuration and the bolus tracker and
//! runs every classifier over one [`TelemetrySnapshot`] per tick.
//! Classifiers are pure; the engine adds the two cross-call concerns:
//! bolus session state and edge-triggered logging.
//!
//! ```text
//!  TelemetrySnapshot ──▶ ┌──────────────────────────┐ ──▶ StatusReport
//!                        │       StatusEngine        │
//!  BolusObserver    ◀────│ loop · glucose · consum-  │
//!                        │ ables · bolus tracker     │
//!                        └──────────────────────────┘
//! ```
//!
//! Concurrency: single logical owner.  The engine is `Send` but not
//! internally locked — callers serialize ticks (one periodic tick
//! every few seconds, with a fresh `now`).

use log::{info, warn};

use crate::bolus::{BolusObserver, BolusProgressTracker};
use crate::config::StatusConfig;
use crate::consumables::{
    self, BatteryStatus, ReservoirStatus, SiteStatus, SiteTier,
};
use crate::error::DataGap;
use crate::glucose::{self, GlucoseStatus};
use crate::loop_status::{self, LoopStatus, LoopTier};
use crate::telemetry::TelemetrySnapshot;

/// Presentation view of the in-flight bolus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BolusProgress {
    pub amount_units: f64,
    /// Monotonic within a session, clamped to [0,1].
    pub fraction: f64,
    /// Unrounded; rounding happens at the presentation boundary.
    pub delivered_units: f64,
    /// Whether a cancel action should be offered.
    pub cancellable: bool,
    pub cancelled: bool,
}

/// Everything presentation needs for one refresh.
///
/// Tiers and fractions only — no strings, no colours, so the
/// presentation layer can be swapped without touching domain logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub loop_status: LoopStatus,
    pub glucose: GlucoseStatus,
    pub reservoir: ReservoirStatus,
    pub battery: BatteryStatus,
    pub site: SiteStatus,
    pub bolus: Option<BolusProgress>,
    /// Accumulated [`DataGap`] bitmask for this tick.
    pub gaps: u8,
}

impl StatusReport {
    /// Check whether a specific gap degraded this report.
    pub fn has_gap(&self, gap: DataGap) -> bool {
        self.gaps & gap.mask() != 0
    }

    /// True if any classification degraded for lack of data or config.
    pub fn has_gaps(&self) -> bool {
        self.gaps != 0
    }
}

/// The status engine.
pub struct StatusEngine {
    config: StatusConfig,
    bolus: BolusProgressTracker,
    /// Last seen loop tier, for transition logging.
    prev_loop_tier: Option<LoopTier>,
    /// Last tick's gap bitmask, for edge logging.
    prev_gaps: u8,
}

impl StatusEngine {
    pub fn new(config: StatusConfig) -> Self {
        Self {
            config,
            bolus: BolusProgressTracker::new(),
            prev_loop_tier: None,
            prev_gaps: 0,
        }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// Classify a snapshot without bolus notifications.
    pub fn tick(&mut self, snap: &TelemetrySnapshot) -> StatusReport {
        self.tick_with(snap, &mut ())
    }

    /// Classify a snapshot, forwarding bolus session transitions to
    /// the observer.
    pub fn tick_with(
        &mut self,
        snap: &TelemetrySnapshot,
        observer: &mut dyn BolusObserver,
    ) -> StatusReport {
        let loop_status = loop_status::classify(
            snap.now,
            snap.last_loop_at,
            snap.loop_mode,
            snap.manual_temp_basal_active,
        );
        self.log_loop_transition(loop_status.tier);

        let glucose = glucose::classify(
            snap.now,
            snap.glucose,
            snap.glucose_direction,
            snap.glucose_delta_mgdl,
            snap.low_threshold_mgdl,
            snap.high_threshold_mgdl,
        );

        let reservoir = consumables::classify_reservoir(
            snap.reservoir_units,
            self.config.capacity_for(snap.device_class),
        );
        let battery = consumables::classify_battery(snap.battery_percent);
        let site = consumables::classify_site(
            snap.now,
            snap.pod_expires_at,
            snap.site_inserted_at,
            self.config.site_lifetime_hours,
            snap.device_class,
        );

        self.bolus.apply(snap.bolus.as_ref(), observer);
        let bolus = self.bolus.session_amount().map(|amount_units| BolusProgress {
            amount_units,
            fraction: self.bolus.current_fraction(),
            delivered_units: self.bolus.delivered_units(),
            cancellable: self.bolus.cancellable(),
            cancelled: self.bolus.is_cancelled(),
        });

        let gaps = gather_gaps(snap, site.tier);
        self.log_gap_edges(gaps);

        StatusReport {
            loop_status,
            glucose,
            reservoir,
            battery,
            site,
            bolus,
            gaps,
        }
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Log loop tier changes on edges only, so a stale loop does not
    /// spam the log once per tick.
    fn log_loop_transition(&mut self, tier: LoopTier) {
        if self.prev_loop_tier == Some(tier) {
            return;
        }
        match tier {
            LoopTier::Stale => warn!("loop tier: {:?} -> Stale", self.prev_loop_tier),
            _ => info!("loop tier: {:?} -> {:?}", self.prev_loop_tier, tier),
        }
        self.prev_loop_tier = Some(tier);
    }

    /// Set/clear logging for each gap bit: one line when a gap
    /// appears, one when it resolves.
    fn log_gap_edges(&mut self, gaps: u8) {
        if gaps == self.prev_gaps {
            return;
        }
        for gap in DataGap::ALL {
            let was = self.prev_gaps & gap.mask() != 0;
            let is = gaps & gap.mask() != 0;
            if is && !was {
                warn!("DATA GAP SET: {gap}");
            } else if was && !is {
                info!("DATA GAP CLEARED: {gap}");
            }
        }
        self.prev_gaps = gaps;
    }
}

/// Which degradations apply to this snapshot.
fn gather_gaps(snap: &TelemetrySnapshot, site_tier: SiteTier) -> u8 {
    let mut gaps = 0u8;
    if snap.last_loop_at.is_none() {
        gaps |= DataGap::LoopTimestamp.mask();
    }
    if snap.glucose.is_none() {
        gaps |= DataGap::Glucose.mask();
    }
    if snap.reservoir_units.is_none() {
        gaps |= DataGap::Reservoir.mask();
    }
    if snap.battery_percent.is_none() {
        gaps |= DataGap::Battery.mask();
    }
    if site_tier == SiteTier::NoDevice {
        gaps |= DataGap::Site.mask();
    }
    if snap.low_threshold_mgdl >= snap.high_threshold_mgdl {
        gaps |= DataGap::ThresholdsMisconfigured.mask();
    }
    gaps
}
