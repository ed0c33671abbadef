//! Loopstatus — status derivation for a closed-loop insulin companion
//! display.
//!
//! Pure classifiers turn raw, time-stamped telemetry into discrete
//! safety tiers (loop freshness, glucose severity, consumable life)
//! plus clamped fill/progress fractions.  The presentation layer maps
//! those to colours, strings, and layout; nothing here formats or
//! renders.  See [`engine::StatusEngine`] for the tick-driven facade.

#![deny(unused_must_use)]

pub mod bolus;
pub mod config;
pub mod consumables;
pub mod engine;
pub mod glucose;
pub mod loop_status;
pub mod telemetry;

mod error;

pub use error::{ConfigError, DataGap};
