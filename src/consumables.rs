//! Consumable life classification: reservoir, battery, infusion site.
//!
//! Each classifier turns a raw level into a fill fraction in [0,1] plus
//! a severity tier.  Boundary semantics are inclusive-low throughout:
//! exactly 25% battery is `Critical`, exactly 30 units is `Low`.

use crate::telemetry::{DeviceClass, Timestamp};

/// Raw reservoir value some drivers report for "unmeasured / over
/// range".  Displays as "at least max", never as a literal volume.
pub const RESERVOIR_SENTINEL_UNITS: f64 = 0xDEAD_BEEF_u32 as f64;

/// Below this many units the reservoir is critical.
pub const RESERVOIR_CRITICAL_UNITS: f64 = 10.0;

/// At or below this many units (and not critical) the reservoir is low.
pub const RESERVOIR_LOW_UNITS: f64 = 30.0;

/// At or below this charge percentage the battery is critical.
pub const BATTERY_CRITICAL_PERCENT: f64 = 25.0;

/// At or below this charge percentage (and not critical) the battery is low.
pub const BATTERY_LOW_PERCENT: f64 = 50.0;

/// Site age below this many hours is normal wear.
pub const SITE_LOW_HOURS: f64 = 48.0;

/// Site age at or beyond this many hours is critical wear.
pub const SITE_CRITICAL_HOURS: f64 = 72.0;

/// Severity tier for a fillable consumable (reservoir, battery).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTier {
    Critical,
    Low,
    Normal,
    /// Level not reported.
    Unknown,
}

/// How the reservoir volume should be presented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeDisplay {
    /// A real measured volume, insulin units.
    Exact(f64),
    /// The sentinel: the pump only knows "at least full-scale"
    /// (shown as "50+" style text by presentation).
    AtLeastMax,
}

/// Reservoir classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReservoirStatus {
    /// Fill fraction, clamped to [0,1].
    pub fraction: f64,
    pub tier: LevelTier,
    /// Absent when no volume was reported.
    pub display: Option<VolumeDisplay>,
}

/// Battery classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStatus {
    /// Charge fraction, clamped to [0,1].
    pub fraction: f64,
    pub tier: LevelTier,
}

/// Wear tier of the infusion site (cannula or pod).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteTier {
    Normal,
    Low,
    Critical,
    /// Past expiry — replace now.  Never shows a negative countdown.
    Replace,
    /// The device class expects an active site and none is present.
    NoDevice,
    /// No site telemetry on a device that may not use one.
    Unknown,
}

/// Remaining wear time at the coarsest non-zero resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingTime {
    Days(u32),
    Hours(u32),
    Minutes(u32),
}

/// Infusion-site classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteStatus {
    /// Remaining-life fraction, clamped to [0,1].
    pub fraction: f64,
    pub tier: SiteTier,
    /// Absent when expired or when no site telemetry exists.
    pub remaining: Option<RemainingTime>,
}

/// Clamp a fraction into [0,1].  NaN (e.g. 0/0 from a degenerate
/// capacity) reads as empty.
fn clamp_fraction(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Classify reservoir volume against the device's capacity.
///
/// Capacity is an explicit parameter because it is device-class
/// dependent — the engine picks it per snapshot via
/// [`StatusConfig::capacity_for`](crate::config::StatusConfig::capacity_for).
pub fn classify_reservoir(units: Option<f64>, capacity_units: f64) -> ReservoirStatus {
    let Some(units) = units else {
        return ReservoirStatus {
            fraction: 0.0,
            tier: LevelTier::Unknown,
            display: None,
        };
    };

    if units == RESERVOIR_SENTINEL_UNITS {
        return ReservoirStatus {
            fraction: 1.0,
            tier: LevelTier::Normal,
            display: Some(VolumeDisplay::AtLeastMax),
        };
    }

    let tier = if units < RESERVOIR_CRITICAL_UNITS {
        LevelTier::Critical
    } else if units <= RESERVOIR_LOW_UNITS {
        LevelTier::Low
    } else {
        LevelTier::Normal
    };

    ReservoirStatus {
        fraction: clamp_fraction(units / capacity_units),
        tier,
        display: Some(VolumeDisplay::Exact(units)),
    }
}

/// Classify pump battery charge (percent, 0–100).
pub fn classify_battery(percent: Option<f64>) -> BatteryStatus {
    let Some(percent) = percent else {
        return BatteryStatus {
            fraction: 0.0,
            tier: LevelTier::Unknown,
        };
    };

    let tier = if percent <= BATTERY_CRITICAL_PERCENT {
        LevelTier::Critical
    } else if percent <= BATTERY_LOW_PERCENT {
        LevelTier::Low
    } else {
        LevelTier::Normal
    };

    BatteryStatus {
        fraction: clamp_fraction(percent / 100.0),
        tier,
    }
}

/// Classify infusion-site life.
///
/// Prefers remaining-until-expiry when the driver reports a hard expiry
/// (pods do); falls back to elapsed-since-insertion (tubed cannulas).
/// With neither timestamp, a patch pump reports `NoDevice` — it cannot
/// run without a pod — while a tubed pump reports `Unknown`.
pub fn classify_site(
    now: Timestamp,
    expires_at: Option<Timestamp>,
    inserted_at: Option<Timestamp>,
    lifetime_hours: f64,
    device_class: DeviceClass,
) -> SiteStatus {
    let lifetime_secs = lifetime_hours * 3600.0;

    let remaining_secs = if let Some(expiry) = expires_at {
        expiry.seconds_since(now) as f64
    } else if let Some(inserted) = inserted_at {
        lifetime_secs - now.seconds_since(inserted) as f64
    } else {
        let tier = match device_class {
            DeviceClass::PatchPump => SiteTier::NoDevice,
            DeviceClass::TubedPump => SiteTier::Unknown,
        };
        return SiteStatus {
            fraction: 0.0,
            tier,
            remaining: None,
        };
    };

    if remaining_secs < 0.0 {
        return SiteStatus {
            fraction: 0.0,
            tier: SiteTier::Replace,
            remaining: None,
        };
    }

    let age_hours = (lifetime_secs - remaining_secs) / 3600.0;
    let tier = if age_hours < SITE_LOW_HOURS {
        SiteTier::Normal
    } else if age_hours < SITE_CRITICAL_HOURS {
        SiteTier::Low
    } else {
        SiteTier::Critical
    };

    SiteStatus {
        fraction: clamp_fraction(remaining_secs / lifetime_secs),
        tier,
        remaining: Some(remaining_display(remaining_secs as i64)),
    }
}

/// Coarsest non-zero unit: days if ≥ 1, else hours if ≥ 1, else minutes.
fn remaining_display(remaining_secs: i64) -> RemainingTime {
    let days = remaining_secs / 86_400;
    if days >= 1 {
        return RemainingTime::Days(days as u32);
    }
    let hours = remaining_secs / 3_600;
    if hours >= 1 {
        return RemainingTime::Hours(hours as u32);
    }
    RemainingTime::Minutes((remaining_secs / 60) as u32)
}
