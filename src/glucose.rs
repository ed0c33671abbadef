//! Glucose status classification.
//!
//! Derives the severity tier, trend-arrow angle, delta sign class, and
//! reading age for the current CGM reading.  Outputs are semantic tiers
//! and numbers only — no strings, no colours.

use crate::telemetry::{GlucoseReading, Timestamp, TrendDirection};

/// CGM "HIGH / unreliable" sentinel.  Not a measurement.
pub const GLUCOSE_SENTINEL_MGDL: i32 = 400;

/// Severity tier of the current reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlucoseTier {
    /// Sentinel reading — display the HIGH marker and suppress
    /// dosing guidance downstream.
    Invalid,
    /// Value below the configured low threshold.
    BelowRange,
    /// Value within [low, high).
    InRange,
    /// Value at or above the configured high threshold.
    AboveRange,
    /// No reading, or thresholds misconfigured (low ≥ high).  The
    /// classifier degrades rather than erroring; the engine records
    /// which of the two happened.
    Neutral,
}

/// Sign prefix class for the delta readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaSign {
    /// Zero counts as plus; the readout shows "+0".
    Plus,
    Minus,
}

/// Delta since the previous reading, split into sign class and
/// unclamped magnitude for the presentation layer to format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaDisplay {
    pub sign: DeltaSign,
    pub magnitude_mgdl: f64,
}

/// Age of the reading relative to the snapshot's `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingAge {
    /// One minute or less.
    LessThanOneMinute,
    /// Floor-rounded whole minutes.
    Minutes(u32),
}

/// Combined glucose classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlucoseStatus {
    pub tier: GlucoseTier,
    /// The raw value to display, mg/dL.  Absent when there is no
    /// reading; still present for the sentinel (the `Invalid` tier
    /// tells presentation to show the HIGH marker instead).
    pub value_mgdl: Option<i32>,
    /// True only for the sentinel reading: downstream must not show
    /// high-frequency dosing guidance off an unreliable value.
    pub suppress_guidance: bool,
    /// Rotation of the trend arrow, degrees.  0 points flat-right.
    pub arrow_degrees: i16,
    pub delta: Option<DeltaDisplay>,
    /// Absent when there is no reading.
    pub age: Option<ReadingAge>,
}

/// Classify the current glucose reading.
pub fn classify(
    now: Timestamp,
    reading: Option<GlucoseReading>,
    direction: TrendDirection,
    delta_mgdl: Option<i32>,
    low_threshold_mgdl: f64,
    high_threshold_mgdl: f64,
) -> GlucoseStatus {
    let arrow_degrees = arrow_degrees(direction);
    let delta = delta_mgdl.map(classify_delta);

    let Some(reading) = reading else {
        return GlucoseStatus {
            tier: GlucoseTier::Neutral,
            value_mgdl: None,
            suppress_guidance: false,
            arrow_degrees,
            delta,
            age: None,
        };
    };

    let age = Some(reading_age(now, reading.captured_at));

    if reading.value_mgdl == GLUCOSE_SENTINEL_MGDL {
        return GlucoseStatus {
            tier: GlucoseTier::Invalid,
            value_mgdl: Some(reading.value_mgdl),
            suppress_guidance: true,
            arrow_degrees,
            delta,
            age,
        };
    }

    let tier = if low_threshold_mgdl >= high_threshold_mgdl {
        // Misconfigured thresholds degrade safely; validation belongs
        // to the settings path upstream.
        GlucoseTier::Neutral
    } else {
        let v = f64::from(reading.value_mgdl);
        if v < low_threshold_mgdl {
            GlucoseTier::BelowRange
        } else if v < high_threshold_mgdl {
            GlucoseTier::InRange
        } else {
            GlucoseTier::AboveRange
        }
    };

    GlucoseStatus {
        tier,
        value_mgdl: Some(reading.value_mgdl),
        suppress_guidance: false,
        arrow_degrees,
        delta,
        age,
    }
}

/// Trend-arrow rotation for a CGM direction, degrees.
///
/// Total over the direction vocabulary.  The non-computable variants
/// intentionally read as flat: an arrow pointing nowhere in particular
/// beats no arrow on a monitoring display.
pub fn arrow_degrees(direction: TrendDirection) -> i16 {
    match direction {
        TrendDirection::DoubleUp | TrendDirection::SingleUp | TrendDirection::TripleUp => -90,
        TrendDirection::FortyFiveUp => -45,
        TrendDirection::Flat
        | TrendDirection::NotComputable
        | TrendDirection::RateOutOfRange
        | TrendDirection::None => 0,
        TrendDirection::FortyFiveDown => 45,
        TrendDirection::SingleDown | TrendDirection::DoubleDown | TrendDirection::TripleDown => 90,
    }
}

fn classify_delta(delta_mgdl: i32) -> DeltaDisplay {
    DeltaDisplay {
        sign: if delta_mgdl >= 0 {
            DeltaSign::Plus
        } else {
            DeltaSign::Minus
        },
        magnitude_mgdl: f64::from(delta_mgdl.abs()),
    }
}

fn reading_age(now: Timestamp, captured_at: Timestamp) -> ReadingAge {
    let secs = now.seconds_since(captured_at);
    if secs <= 60 {
        ReadingAge::LessThanOneMinute
    } else {
        ReadingAge::Minutes((secs / 60) as u32)
    }
}
