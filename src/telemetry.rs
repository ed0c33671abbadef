//! Telemetry input types.
//!
//! One [`TelemetrySnapshot`] is the sole input to every classification
//! pass.  It is assembled fresh on each periodic tick by the device
//! manager (out of scope) and carries a consistent `now` reference, so
//! every classifier sees the same instant.  Think of it as the
//! "blackboard" the classifiers read from — none of them writes back.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// A point in time, in whole seconds since the Unix epoch.
///
/// Classification only ever needs elapsed-seconds arithmetic, never
/// wall-clock formatting, so a plain signed second count is enough.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_epoch_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn epoch_secs(self) -> i64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self`.  Negative if `earlier`
    /// is actually later — callers decide what a negative gap means
    /// (e.g. a site that has not expired yet).
    pub const fn seconds_since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

// ---------------------------------------------------------------------------
// Enumerated device facts
// ---------------------------------------------------------------------------

/// Whether the loop is allowed to enact its own dosing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Automated delivery is active; freshness tiers apply.
    Closed,
    /// Monitoring only — the user doses manually.
    Open,
}

/// The pump hardware family.  Capacity and site expectations differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Conventional pump with tubing and a large cartridge (e.g. 300 U).
    TubedPump,
    /// Tubeless patch pump / pod with a small reservoir and a hard
    /// wear-time limit.  Always expects an active site.
    PatchPump,
}

/// CGM trend direction as reported by the sensor transmitter.
///
/// This is the full vocabulary the upstream CGM stack can emit; the
/// classifier maps every variant to an arrow angle, including the
/// non-computable ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    DoubleUp,
    SingleUp,
    TripleUp,
    FortyFiveUp,
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    TripleDown,
    NotComputable,
    RateOutOfRange,
    /// Transmitter sent no direction field at all.
    None,
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// One CGM reading.
///
/// `value_mgdl == 400` is the sensor's "HIGH / unreliable" sentinel, not
/// a measurement — see [`crate::glucose::GLUCOSE_SENTINEL_MGDL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlucoseReading {
    pub value_mgdl: i32,
    pub captured_at: Timestamp,
}

/// An in-flight (or just-finished) bolus as reported by the pump driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BolusState {
    /// Total commanded amount, insulin units.  Always > 0.
    pub amount_units: f64,
    /// Delivery progress reported by the pump, nominally in [0,1] and
    /// non-decreasing.  The tracker enforces both; drivers have been
    /// seen reporting out-of-order updates during comms retries.
    pub delivered_fraction: f64,
    /// User (or pump) cancelled delivery.
    pub cancelled: bool,
    /// When delivery started.  Serves as the session identity: a new
    /// `started_at` means a new bolus, even at the same amount.
    pub started_at: Timestamp,
}

// ---------------------------------------------------------------------------
// The snapshot
// ---------------------------------------------------------------------------

/// A point-in-time bundle of everything the status engine classifies.
///
/// All fields are raw telemetry; the engine never mutates a snapshot.
/// Optional fields model telemetry that can legitimately be absent
/// (no pump paired, CGM warming up, no bolus running) — absence
/// degrades to an explicit unknown tier, never to an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// The shared "now" for this tick.
    pub now: Timestamp,

    // -- Loop --
    /// Completion time of the last successful loop cycle.
    pub last_loop_at: Option<Timestamp>,
    pub loop_mode: LoopMode,
    /// A user-enacted temp basal is overriding the loop.
    pub manual_temp_basal_active: bool,

    // -- Glucose --
    pub glucose: Option<GlucoseReading>,
    pub glucose_direction: TrendDirection,
    /// Change since the previous reading, mg/dL.
    pub glucose_delta_mgdl: Option<i32>,
    /// Configured low-glucose threshold, mg/dL.  Carried per snapshot
    /// because settings can change between ticks; validated upstream by
    /// [`crate::config::validate_thresholds`], degraded safely here.
    pub low_threshold_mgdl: f64,
    /// Configured high-glucose threshold, mg/dL.
    pub high_threshold_mgdl: f64,

    // -- Pump consumables --
    /// Remaining reservoir volume, insulin units.
    pub reservoir_units: Option<f64>,
    /// Pump battery charge, percent (0–100).
    pub battery_percent: Option<f64>,
    /// Hard expiry of the active pod, when the driver reports one.
    pub pod_expires_at: Option<Timestamp>,
    /// When the current infusion site (cannula/pod) was placed.
    pub site_inserted_at: Option<Timestamp>,
    pub device_class: DeviceClass,

    // -- Bolus --
    pub bolus: Option<BolusState>,
}

impl TelemetrySnapshot {
    /// A snapshot with nothing known — every optional field absent.
    /// Classifying it must yield all-unknown tiers, never a panic.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            now,
            last_loop_at: None,
            loop_mode: LoopMode::Closed,
            manual_temp_basal_active: false,
            glucose: None,
            glucose_direction: TrendDirection::None,
            glucose_delta_mgdl: None,
            low_threshold_mgdl: 70.0,
            high_threshold_mgdl: 180.0,
            reservoir_units: None,
            battery_percent: None,
            pod_expires_at: None,
            site_inserted_at: None,
            device_class: DeviceClass::TubedPump,
            bolus: None,
        }
    }
}
