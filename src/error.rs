//! Error and degradation types.
//!
//! Classification itself is infallible by design: a monitoring display
//! must never crash or go blank because telemetry is incomplete.  The
//! only `Result`-returning surface is config validation, which belongs
//! to the upstream settings path.  Everything else degrades to an
//! explicit unknown/neutral tier and records *why* in a [`DataGap`]
//! bitmask so presentation can still tell the difference.

use core::fmt;

// ---------------------------------------------------------------------------
// Config validation errors
// ---------------------------------------------------------------------------

/// Rejected by [`StatusConfig::validate`](crate::config::StatusConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A glucose threshold is NaN or infinite.
    NonFiniteThreshold,
    /// Low glucose threshold is not strictly below the high threshold.
    ThresholdOrder,
    /// A reservoir capacity is zero or negative.
    NonPositiveCapacity,
    /// Site lifetime is zero or negative.
    NonPositiveLifetime,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteThreshold => write!(f, "glucose threshold is not finite"),
            Self::ThresholdOrder => write!(f, "low glucose threshold must be below high"),
            Self::NonPositiveCapacity => write!(f, "reservoir capacity must be positive"),
            Self::NonPositiveLifetime => write!(f, "site lifetime must be positive"),
        }
    }
}

impl core::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Data gaps
// ---------------------------------------------------------------------------

/// One reason a classification degraded to an unknown/neutral tier.
///
/// Gaps are accumulated per tick in a bitfield by the engine so that
/// several simultaneous gaps can be reported (and logged on edges)
/// individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataGap {
    /// No successful loop cycle timestamp.
    LoopTimestamp = 0b0000_0001,
    /// No CGM reading in the snapshot.
    Glucose = 0b0000_0010,
    /// No reservoir volume reported.
    Reservoir = 0b0000_0100,
    /// No battery charge reported.
    Battery = 0b0000_1000,
    /// Device expects an infusion site but none is active.
    Site = 0b0001_0000,
    /// Glucose thresholds are inverted; severity degraded to neutral.
    ThresholdsMisconfigured = 0b0010_0000,
}

impl DataGap {
    /// Bitmask for this gap.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Every gap variant, for iteration in edge logging.
    pub const ALL: [DataGap; 6] = [
        DataGap::LoopTimestamp,
        DataGap::Glucose,
        DataGap::Reservoir,
        DataGap::Battery,
        DataGap::Site,
        DataGap::ThresholdsMisconfigured,
    ];
}

impl fmt::Display for DataGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoopTimestamp => write!(f, "no loop timestamp"),
            Self::Glucose => write!(f, "no glucose reading"),
            Self::Reservoir => write!(f, "no reservoir data"),
            Self::Battery => write!(f, "no battery data"),
            Self::Site => write!(f, "no active infusion site"),
            Self::ThresholdsMisconfigured => write!(f, "glucose thresholds misconfigured"),
        }
    }
}
