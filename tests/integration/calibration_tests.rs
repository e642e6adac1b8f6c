//! Integration tests for the calibration lifecycle: restore at startup,
//! warm-up, calibrated, and periodic baseline persistence, driven through
//! the full `MonitorService` tick.

use aqmonitor::app::events::AppEvent;
use aqmonitor::app::ports::BaselineStorePort;
use aqmonitor::calibration::{BaselinePair, CalibrationBaseline};
use aqmonitor::error::SensorError;
use aqmonitor::fsm::CalibrationStatus;

use crate::mock_hw::{Rig, SensorCall, fast_config};

const STORED: BaselinePair = BaselinePair::new(0x8A3C, 0x8F12);

fn rig_with_stored_baseline() -> Rig {
    let mut rig = Rig::new(fast_config());
    rig.store
        .save(&CalibrationBaseline::new(STORED, 1_000))
        .unwrap();
    rig
}

fn transitions(rig: &Rig) -> Vec<(CalibrationStatus, CalibrationStatus)> {
    rig.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CalibrationChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

// ── Fresh boot ────────────────────────────────────────────────

#[test]
fn no_stored_baseline_never_passes_through_restored() {
    let mut rig = Rig::new(fast_config());
    rig.start(0);
    assert_eq!(rig.service.status(), CalibrationStatus::Uninitialized);
    assert!(rig.sink.events.contains(&AppEvent::NoStoredBaseline));

    // Warm-up window elapses, but the sensor is still learning.
    for out in rig.run_secs(0, 5_000) {
        assert_eq!(out.status, CalibrationStatus::WarmingUp);
    }

    rig.sensor.stable = true;
    assert_eq!(rig.tick(6_000).status, CalibrationStatus::Calibrated);

    use CalibrationStatus::*;
    assert_eq!(
        transitions(&rig),
        vec![(Uninitialized, WarmingUp), (WarmingUp, Calibrated)]
    );
}

#[test]
fn stable_sensor_still_waits_out_the_warmup_window() {
    let mut rig = Rig::new(fast_config());
    rig.sensor.stable = true;
    rig.start(0);

    assert_eq!(rig.tick(0).status, CalibrationStatus::WarmingUp);
    assert_eq!(rig.tick(1_000).status, CalibrationStatus::WarmingUp);
    assert_eq!(rig.tick(1_999).status, CalibrationStatus::WarmingUp);
    assert_eq!(rig.tick(2_000).status, CalibrationStatus::Calibrated);
}

// ── Restore ───────────────────────────────────────────────────

#[test]
fn accepted_baseline_is_restored_before_first_read() {
    let mut rig = rig_with_stored_baseline();
    rig.start(0);

    assert_eq!(rig.service.status(), CalibrationStatus::Restored);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::BaselineRestored(STORED))
    );

    rig.run_secs(0, 3_000);
    let set = rig
        .sensor
        .position(|c| *c == SensorCall::SetBaseline(STORED))
        .expect("baseline applied");
    let first_read = rig
        .sensor
        .position(|c| *c == SensorCall::Read)
        .expect("sensor polled");
    assert!(set < first_read);
}

#[test]
fn restored_boot_goes_restored_warming_calibrated() {
    let mut rig = rig_with_stored_baseline();
    rig.start(0);
    rig.run_secs(0, 2_000);

    use CalibrationStatus::*;
    assert_eq!(
        transitions(&rig),
        vec![(Restored, WarmingUp), (WarmingUp, Calibrated)]
    );
}

#[test]
fn rejected_baseline_falls_back_to_full_warmup() {
    let mut rig = rig_with_stored_baseline();
    rig.sensor.reject_baseline = true;
    rig.start(0);

    assert_eq!(rig.service.status(), CalibrationStatus::Uninitialized);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::BaselineRejected(SensorError::BaselineRejected))
    );
    assert_eq!(rig.service.calibration().baseline(), None);

    for out in rig.run_secs(0, 8_000) {
        assert_ne!(out.status, CalibrationStatus::Calibrated);
        assert_ne!(out.status, CalibrationStatus::Restored);
    }
}

// ── Persistence cadence ───────────────────────────────────────

#[test]
fn persists_on_calibrated_then_once_per_interval() {
    let mut rig = Rig::new(fast_config());
    rig.sensor.stable = true;
    rig.start(0);

    rig.run_secs(0, 2_000);
    assert_eq!(rig.service.status(), CalibrationStatus::Calibrated);
    assert_eq!(rig.store.storage().writes, 1);
    assert_eq!(
        rig.store.load().map(|b| (b.pair(), b.saved_at_ms)),
        Some((BaselinePair::new(0x8E5A, 0x9012), 2_000))
    );

    rig.run_secs(3_000, 61_000);
    assert_eq!(rig.store.storage().writes, 1);

    rig.tick(62_000);
    assert_eq!(rig.store.storage().writes, 2);
    assert_eq!(rig.sensor.count(&SensorCall::GetBaseline), 2);
}

#[test]
fn failed_save_is_retried_next_interval() {
    let mut rig = Rig::new(fast_config());
    rig.sensor.stable = true;
    rig.start(0);
    rig.run_secs(0, 2_000);
    assert_eq!(rig.store.storage().writes, 1);

    rig.store.storage_mut().fail_writes = true;
    rig.tick(62_000);
    let failures = |rig: &Rig| rig.sink.count(|e| matches!(e, AppEvent::PersistFailed(_)));
    assert_eq!(failures(&rig), 1);

    // No immediate retry.
    rig.store.storage_mut().fail_writes = false;
    rig.run_secs(63_000, 121_000);
    assert_eq!(rig.store.storage().writes, 1);
    assert_eq!(failures(&rig), 1);

    rig.tick(122_000);
    assert_eq!(rig.store.storage().writes, 2);
    assert_eq!(rig.service.calibration().last_persisted().map(|b| b.saved_at_ms), Some(122_000));
}

#[test]
fn unlearned_sensor_baseline_is_not_persisted() {
    let mut rig = Rig::new(fast_config());
    rig.sensor.stable = true;
    rig.sensor.learned = Ok(BaselinePair::new(0, 0));
    rig.start(0);
    rig.run_secs(0, 2_000);

    assert_eq!(rig.service.status(), CalibrationStatus::Calibrated);
    assert_eq!(rig.store.storage().writes, 0);
    assert_eq!(rig.store.load(), None);
}

#[test]
fn baseline_read_failure_keeps_restored_baseline() {
    let mut rig = rig_with_stored_baseline();
    let writes_before = rig.store.storage().writes;
    rig.sensor.learned = Err(SensorError::Communication);
    rig.start(0);
    rig.run_secs(0, 2_000);

    assert!(
        rig.sink
            .events
            .contains(&AppEvent::BaselineReadFailed(SensorError::Communication))
    );
    // The in-memory (restored) baseline is still written back.
    assert_eq!(rig.store.storage().writes, writes_before + 1);
    assert_eq!(rig.store.load().map(|b| b.pair()), Some(STORED));
}

// ── Status is derived, not latched ────────────────────────────

#[test]
fn calibrated_drops_back_when_sensor_loses_stability() {
    let mut rig = Rig::new(fast_config());
    rig.sensor.stable = true;
    rig.start(0);
    rig.run_secs(0, 2_000);
    assert_eq!(rig.service.status(), CalibrationStatus::Calibrated);

    rig.sensor.stable = false;
    assert_eq!(rig.tick(3_000).status, CalibrationStatus::WarmingUp);
}

#[test]
fn sensor_reset_reapplies_baseline_and_humidity() {
    let mut rig = rig_with_stored_baseline();
    rig.start(0);
    for _ in 0..5 {
        rig.sensor.push_failure(SensorError::Communication);
    }
    rig.run_secs(0, 4_000);

    assert!(rig.sink.events.contains(&AppEvent::SensorReinitialized));
    assert_eq!(rig.sensor.count(&SensorCall::Initialize), 2);

    // The Calibrated persist at 2 s replaced the stored pair with the
    // learned one; that is what goes back into the sensor.
    let held = rig
        .service
        .calibration()
        .baseline()
        .map(|b| b.pair())
        .expect("baseline held");
    let applied: Vec<_> = rig
        .sensor
        .calls
        .iter()
        .filter_map(|c| match c {
            SensorCall::SetBaseline(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(applied, vec![STORED, held]);

    let humidity_calls = rig
        .sensor
        .calls
        .iter()
        .filter(|c| matches!(c, SensorCall::SetHumidity(_)))
        .count();
    assert_eq!(humidity_calls, 2);
}

#[test]
fn stored_baseline_survives_failed_init_at_boot() {
    let mut rig = rig_with_stored_baseline();
    rig.sensor.init_failures = 1;
    rig.start(0);

    assert_eq!(rig.service.status(), CalibrationStatus::Uninitialized);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::BaselineDeferred(SensorError::NotInitialized))
    );
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::BaselineRejected(_))),
        0
    );

    // First poll finds the sensor uninitialised and re-initialises it.
    let out = rig.tick(0);
    assert_eq!(out.status, CalibrationStatus::WarmingUp);
    assert_eq!(rig.service.status(), CalibrationStatus::Restored);
    assert_eq!(rig.sensor.count(&SensorCall::Initialize), 2);
    assert_eq!(rig.sensor.count(&SensorCall::SetBaseline(STORED)), 2);
    assert_eq!(
        rig.service.calibration().baseline().map(|b| b.pair()),
        Some(STORED)
    );
    assert!(rig.sink.events.contains(&AppEvent::BaselineRestored(STORED)));

    rig.run_secs(1_000, 2_000);
    use CalibrationStatus::*;
    assert_eq!(
        transitions(&rig),
        vec![
            (Uninitialized, WarmingUp),
            (WarmingUp, Restored),
            (Restored, WarmingUp),
            (WarmingUp, Calibrated),
        ]
    );
}
