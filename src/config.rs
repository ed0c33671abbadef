//! Engine configuration parameters.
//!
//! Device capacities, site lifetime, and display units.  Glucose
//! thresholds travel inside each [`TelemetrySnapshot`](crate::telemetry::TelemetrySnapshot)
//! since settings can change between ticks; [`validate_thresholds`] is
//! the upstream validation step for them.  The classifiers themselves
//! degrade to neutral tiers on misconfiguration instead of erroring.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::telemetry::DeviceClass;

/// Glucose display units.  Only the numeric conversion lives here;
/// string formatting is the presentation layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseUnits {
    MgdL,
    MmolL,
}

/// mg/dL → mmol/L conversion factor.
pub const MGDL_TO_MMOL: f64 = 0.0555;

/// Convert a mg/dL value into the given display unit.
pub fn in_units(value_mgdl: f64, units: GlucoseUnits) -> f64 {
    match units {
        GlucoseUnits::MgdL => value_mgdl,
        GlucoseUnits::MmolL => value_mgdl * MGDL_TO_MMOL,
    }
}

/// Validate a low/high glucose threshold pair.
///
/// Belongs to the settings path: invalid pairs are rejected, not
/// clamped, so a bad settings sync cannot silently shift thresholds.
/// A pair that slips through anyway classifies as neutral downstream.
pub fn validate_thresholds(low_mgdl: f64, high_mgdl: f64) -> Result<(), ConfigError> {
    if !low_mgdl.is_finite() || !high_mgdl.is_finite() {
        return Err(ConfigError::NonFiniteThreshold);
    }
    if low_mgdl >= high_mgdl {
        return Err(ConfigError::ThresholdOrder);
    }
    Ok(())
}

/// Core status-engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Display units for converted numeric outputs.
    pub units: GlucoseUnits,

    // --- Reservoir capacities (insulin units) ---
    /// Cartridge capacity of a tubed pump.
    pub tubed_capacity_units: f64,
    /// Reservoir capacity of a patch pump / pod.
    pub patch_capacity_units: f64,

    // --- Infusion site ---
    /// Nominal wear time of a site/pod before replacement, hours.
    pub site_lifetime_hours: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            units: GlucoseUnits::MgdL,

            // Reservoir
            tubed_capacity_units: 300.0,
            patch_capacity_units: 50.0,

            // Site
            site_lifetime_hours: 72.0,
        }
    }
}

impl StatusConfig {
    /// Reservoir capacity for the given device class.
    pub fn capacity_for(&self, class: DeviceClass) -> f64 {
        match class {
            DeviceClass::TubedPump => self.tubed_capacity_units,
            DeviceClass::PatchPump => self.patch_capacity_units,
        }
    }

    /// Structural validation for the upstream settings path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tubed_capacity_units <= 0.0 || self.patch_capacity_units <= 0.0 {
            return Err(ConfigError::NonPositiveCapacity);
        }
        if self.site_lifetime_hours <= 0.0 {
            return Err(ConfigError::NonPositiveLifetime);
        }
        Ok(())
    }
}
