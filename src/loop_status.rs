//! Loop freshness classification.
//!
//! Derives how current the closed loop is from the timestamp of the
//! last successful cycle.  Loop-cycle timestamps are recorded slightly
//! before delivery actually completes, so a fixed lag is subtracted
//! from the raw elapsed time before any threshold comparison.

use crate::telemetry::{LoopMode, Timestamp};

/// Recording latency of loop-cycle timestamps, seconds.
pub const LOOP_LAG_SECS: i64 = 30;

/// Upper bound (inclusive) of the fresh band, seconds of lag-adjusted age.
pub const FRESH_MAX_SECS: i64 = 8 * 60;

/// Upper bound (inclusive) of the aging band, seconds of lag-adjusted age.
pub const AGING_MAX_SECS: i64 = 12 * 60;

/// Ages beyond this many minutes display as unknown, even though the
/// tier stays [`LoopTier::Stale`].
pub const AGE_DISPLAY_CUTOFF_MINS: i64 = 1440;

/// Freshness tier of the closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTier {
    /// No loop-cycle timestamp exists.  Wins over every other tier.
    Unknown,
    /// A manual temp basal is overriding the loop, regardless of age.
    ManualOverride,
    /// Open-loop mode: the loop is not expected to run.
    OpenLoopIdle,
    /// Lag-adjusted age ≤ 8 minutes.
    Fresh,
    /// Lag-adjusted age in (8, 12] minutes.
    Aging,
    /// Lag-adjusted age > 12 minutes.
    Stale,
}

/// Human-displayable age of the last loop cycle.
///
/// Deliberately separate from [`LoopTier`]: a 25-hour-old loop is
/// `Stale` for severity purposes but its minute count is no longer a
/// useful number to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAge {
    /// No timestamp, or older than the display cutoff (24 h).
    Unknown,
    /// Lag-adjusted age under one minute.
    LessThanOneMinute,
    /// Floor-rounded whole minutes.
    Minutes(u32),
}

/// Combined loop classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStatus {
    pub tier: LoopTier,
    pub age: LoopAge,
}

/// Classify loop freshness.
///
/// Tie-breaks, in order: missing timestamp → `Unknown`; manual temp
/// basal → `ManualOverride`; open loop → `OpenLoopIdle`; otherwise the
/// time-based tier from the lag-adjusted elapsed seconds.
pub fn classify(
    now: Timestamp,
    last_loop_at: Option<Timestamp>,
    loop_mode: LoopMode,
    manual_temp_basal_active: bool,
) -> LoopStatus {
    let Some(last) = last_loop_at else {
        return LoopStatus {
            tier: LoopTier::Unknown,
            age: LoopAge::Unknown,
        };
    };

    let elapsed = now.seconds_since(last) - LOOP_LAG_SECS;
    let age = display_age(elapsed);

    let tier = if manual_temp_basal_active {
        LoopTier::ManualOverride
    } else if loop_mode == LoopMode::Open {
        LoopTier::OpenLoopIdle
    } else if elapsed <= FRESH_MAX_SECS {
        LoopTier::Fresh
    } else if elapsed <= AGING_MAX_SECS {
        LoopTier::Aging
    } else {
        LoopTier::Stale
    };

    LoopStatus { tier, age }
}

/// Floor-rounded display age from lag-adjusted elapsed seconds.
fn display_age(elapsed_secs: i64) -> LoopAge {
    if elapsed_secs < 60 {
        // Covers negative elapsed too (clock skew, lag overshoot):
        // "just looped" is the safe reading.
        return LoopAge::LessThanOneMinute;
    }
    let minutes = elapsed_secs / 60;
    if minutes > AGE_DISPLAY_CUTOFF_MINS {
        LoopAge::Unknown
    } else {
        LoopAge::Minutes(minutes as u32)
    }
}
