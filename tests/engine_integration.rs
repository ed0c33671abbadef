//! Integration tests: snapshot → StatusEngine → StatusReport.
//!
//! Drives the engine facade across multi-tick scenarios the way the
//! host app does: a fresh snapshot every few seconds with a moving
//! `now`, bolus updates arriving from the delivery subsystem.

use loopstatus::DataGap;
use loopstatus::bolus::BolusObserver;
use loopstatus::config::StatusConfig;
use loopstatus::consumables::{LevelTier, RemainingTime, SiteTier, VolumeDisplay};
use loopstatus::engine::StatusEngine;
use loopstatus::glucose::GlucoseTier;
use loopstatus::loop_status::{LoopAge, LoopTier};
use loopstatus::telemetry::{
    BolusState, DeviceClass, GlucoseReading, LoopMode, TelemetrySnapshot, Timestamp,
    TrendDirection,
};

const T0: i64 = 1_700_000_000;

fn at(secs: i64) -> Timestamp {
    Timestamp::from_epoch_secs(secs)
}

/// A healthy closed-loop tubed-pump snapshot.
fn healthy(now_secs: i64) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::empty(at(now_secs));
    snap.last_loop_at = Some(at(now_secs - 200));
    snap.glucose = Some(GlucoseReading {
        value_mgdl: 120,
        captured_at: at(now_secs - 150),
    });
    snap.glucose_direction = TrendDirection::Flat;
    snap.glucose_delta_mgdl = Some(2);
    snap.reservoir_units = Some(180.0);
    snap.battery_percent = Some(75.0);
    snap.site_inserted_at = Some(at(now_secs - 20 * 3600));
    snap
}

#[test]
fn full_healthy_report() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let report = engine.tick(&healthy(T0));

    assert_eq!(report.loop_status.tier, LoopTier::Fresh);
    assert_eq!(report.loop_status.age, LoopAge::Minutes(2));
    assert_eq!(report.glucose.tier, GlucoseTier::InRange);
    assert_eq!(report.glucose.arrow_degrees, 0);
    assert_eq!(report.reservoir.tier, LevelTier::Normal);
    assert_eq!(report.battery.tier, LevelTier::Normal);
    assert_eq!(report.site.tier, SiteTier::Normal);
    assert!(!report.has_gaps());
}

#[test]
fn loop_goes_stale_as_time_passes() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut snap = healthy(T0);
    snap.last_loop_at = Some(at(T0));

    // 6 minutes later: still fresh.
    snap.now = at(T0 + 6 * 60);
    assert_eq!(engine.tick(&snap).loop_status.tier, LoopTier::Fresh);

    // 10 minutes: aging.
    snap.now = at(T0 + 10 * 60);
    assert_eq!(engine.tick(&snap).loop_status.tier, LoopTier::Aging);

    // 15 minutes: stale.
    snap.now = at(T0 + 15 * 60);
    assert_eq!(engine.tick(&snap).loop_status.tier, LoopTier::Stale);

    // A day later the tier stays stale but the minute count is gone.
    snap.now = at(T0 + 25 * 3600);
    let report = engine.tick(&snap);
    assert_eq!(report.loop_status.tier, LoopTier::Stale);
    assert_eq!(report.loop_status.age, LoopAge::Unknown);
}

#[test]
fn manual_temp_basal_overrides_staleness() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut snap = healthy(T0);
    snap.last_loop_at = Some(at(T0 - 3600));
    snap.manual_temp_basal_active = true;

    assert_eq!(engine.tick(&snap).loop_status.tier, LoopTier::ManualOverride);
}

#[test]
fn open_loop_shows_idle_not_stale() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut snap = healthy(T0);
    snap.loop_mode = LoopMode::Open;
    snap.last_loop_at = Some(at(T0 - 3600));

    assert_eq!(engine.tick(&snap).loop_status.tier, LoopTier::OpenLoopIdle);
}

#[test]
fn sentinel_glucose_suppresses_guidance() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut snap = healthy(T0);
    snap.glucose = Some(GlucoseReading {
        value_mgdl: 400,
        captured_at: at(T0 - 60),
    });
    snap.glucose_direction = TrendDirection::DoubleUp;

    let report = engine.tick(&snap);
    assert_eq!(report.glucose.tier, GlucoseTier::Invalid);
    assert!(report.glucose.suppress_guidance);
    assert_eq!(report.glucose.arrow_degrees, -90);
}

#[test]
fn patch_pump_scenario_pod_lifecycle() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut snap = healthy(T0);
    snap.device_class = DeviceClass::PatchPump;
    snap.site_inserted_at = None;
    snap.reservoir_units = Some(0xDEAD_BEEF_u32 as f64);

    // Fresh pod: expires in 70 h.
    snap.pod_expires_at = Some(at(T0 + 70 * 3600));
    let report = engine.tick(&snap);
    assert_eq!(report.site.tier, SiteTier::Normal);
    assert_eq!(report.site.remaining, Some(RemainingTime::Days(2)));
    // Over-range reservoir reads as "at least max", full pie.
    assert_eq!(report.reservoir.display, Some(VolumeDisplay::AtLeastMax));
    assert!((report.reservoir.fraction - 1.0).abs() < f64::EPSILON);

    // 60 h worn: 12 h remaining.
    snap.now = at(T0 + 58 * 3600);
    snap.last_loop_at = Some(at(T0 + 58 * 3600 - 200));
    snap.glucose = Some(GlucoseReading {
        value_mgdl: 120,
        captured_at: at(T0 + 58 * 3600 - 150),
    });
    let report = engine.tick(&snap);
    assert_eq!(report.site.tier, SiteTier::Low);
    assert_eq!(report.site.remaining, Some(RemainingTime::Hours(12)));

    // Past expiry: replace, no negative countdown.
    snap.now = at(T0 + 75 * 3600);
    snap.last_loop_at = Some(at(T0 + 75 * 3600 - 200));
    snap.glucose = Some(GlucoseReading {
        value_mgdl: 120,
        captured_at: at(T0 + 75 * 3600 - 150),
    });
    let report = engine.tick(&snap);
    assert_eq!(report.site.tier, SiteTier::Replace);
    assert_eq!(report.site.remaining, None);

    // Pod removed: the patch pump expects one.
    snap.pod_expires_at = None;
    let report = engine.tick(&snap);
    assert_eq!(report.site.tier, SiteTier::NoDevice);
    assert!(report.has_gap(DataGap::Site));
}

#[test]
fn consumable_boundaries_in_context() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut snap = healthy(T0);

    snap.reservoir_units = Some(8.0);
    snap.battery_percent = Some(50.0);
    let report = engine.tick(&snap);

    assert_eq!(report.reservoir.tier, LevelTier::Critical);
    assert!((report.reservoir.fraction - 8.0 / 300.0).abs() < 1e-12);
    assert_eq!(report.battery.tier, LevelTier::Low);
    assert!((report.battery.fraction - 0.5).abs() < f64::EPSILON);
}

/// Observer recording bolus lifecycle callbacks.
#[derive(Default)]
struct Recorder {
    started: u32,
    progressed: u32,
    completed: u32,
    cancelled: u32,
}

impl BolusObserver for Recorder {
    fn on_session_started(&mut self, _amount_units: f64) {
        self.started += 1;
    }
    fn on_progress(&mut self, _fraction: f64, _delivered_units: f64) {
        self.progressed += 1;
    }
    fn on_completed(&mut self, _amount_units: f64) {
        self.completed += 1;
    }
    fn on_cancelled(&mut self, _delivered_units: f64) {
        self.cancelled += 1;
    }
}

#[test]
fn bolus_lifecycle_notifies_observer() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut recorder = Recorder::default();
    let mut snap = healthy(T0);

    let bolus = |fraction, cancelled| BolusState {
        amount_units: 5.0,
        delivered_fraction: fraction,
        cancelled,
        started_at: at(T0 - 10),
    };

    snap.bolus = Some(bolus(0.2, false));
    engine.tick_with(&snap, &mut recorder);
    snap.bolus = Some(bolus(0.6, false));
    engine.tick_with(&snap, &mut recorder);
    // Stale replay must not notify.
    snap.bolus = Some(bolus(0.4, false));
    engine.tick_with(&snap, &mut recorder);
    snap.bolus = Some(bolus(1.0, false));
    engine.tick_with(&snap, &mut recorder);

    assert_eq!(recorder.started, 1);
    assert_eq!(recorder.progressed, 3); // 0.2, 0.6, 1.0
    assert_eq!(recorder.completed, 1);
    assert_eq!(recorder.cancelled, 0);

    // Bolus leaves the snapshot once delivery is finished.
    snap.bolus = None;
    let report = engine.tick_with(&snap, &mut recorder);
    assert_eq!(report.bolus, None);
}

#[test]
fn bolus_cancel_mid_delivery() {
    let mut engine = StatusEngine::new(StatusConfig::default());
    let mut recorder = Recorder::default();
    let mut snap = healthy(T0);

    snap.bolus = Some(BolusState {
        amount_units: 8.0,
        delivered_fraction: 0.3,
        cancelled: false,
        started_at: at(T0 - 5),
    });
    let report = engine.tick_with(&snap, &mut recorder);
    assert!(report.bolus.unwrap().cancellable);

    snap.bolus = Some(BolusState {
        amount_units: 8.0,
        delivered_fraction: 0.3,
        cancelled: true,
        started_at: at(T0 - 5),
    });
    let report = engine.tick_with(&snap, &mut recorder);
    let progress = report.bolus.unwrap();
    assert!(progress.cancelled);
    assert!(!progress.cancellable);
    assert!((progress.delivered_units - 2.4).abs() < 1e-12);
    assert_eq!(recorder.cancelled, 1);
}

#[test]
fn gaps_track_telemetry_coming_and_going() {
    let mut engine = StatusEngine::new(StatusConfig::default());

    // CGM warming up: glucose absent.
    let mut snap = healthy(T0);
    snap.glucose = None;
    let report = engine.tick(&snap);
    assert!(report.has_gap(DataGap::Glucose));
    assert_eq!(report.glucose.tier, GlucoseTier::Neutral);

    // Reading arrives on the next tick; gap clears.
    let report = engine.tick(&healthy(T0 + 5));
    assert!(!report.has_gaps());
}
