//! Integration tests for persistent storage: the baseline record over a
//! generic `StoragePort`, and the config blob in the NVS adapter.

use aqmonitor::adapters::baseline_store::{
    BASELINE_KEY, NvsBaselineStore, RECORD_LEN, encode_record,
};
use aqmonitor::adapters::nvs::{NAMESPACE, NvsAdapter};
use aqmonitor::app::events::AppEvent;
use aqmonitor::app::ports::{BaselineStorePort, ConfigError, ConfigPort, StoragePort};
use aqmonitor::calibration::{BaselinePair, CalibrationBaseline};
use aqmonitor::config::MonitorConfig;
use aqmonitor::fsm::CalibrationStatus;

use crate::mock_hw::{MockNvs, Rig, fast_config};

fn sample() -> CalibrationBaseline {
    CalibrationBaseline::new(BaselinePair::new(0x9001, 0x8C44), 7_200_000)
}

// ── Baseline record ───────────────────────────────────────────

#[test]
fn save_then_load_returns_same_baseline() {
    let mut store = NvsBaselineStore::new(MockNvs::new());
    store.save(&sample()).unwrap();
    assert_eq!(store.load(), Some(sample()));
}

#[test]
fn repeated_save_writes_identical_bytes() {
    let mut store = NvsBaselineStore::new(MockNvs::new());
    store.save(&sample()).unwrap();
    let first = store.storage().raw(NAMESPACE, BASELINE_KEY).unwrap().to_vec();
    store.save(&sample()).unwrap();
    let second = store.storage().raw(NAMESPACE, BASELINE_KEY).unwrap();

    assert_eq!(first.len(), RECORD_LEN);
    assert_eq!(first, second);
}

#[test]
fn every_single_bit_flip_is_detected() {
    let record = encode_record(&sample()).unwrap();
    let mut store = NvsBaselineStore::new(MockNvs::new());

    for byte in 0..RECORD_LEN {
        for bit in 0..8 {
            let mut corrupted = record;
            corrupted[byte] ^= 1 << bit;
            store
                .storage_mut()
                .write(NAMESPACE, BASELINE_KEY, &corrupted)
                .unwrap();
            assert_eq!(store.load(), None, "flip at byte {byte} bit {bit}");
        }
    }
}

#[test]
fn truncated_record_is_absent() {
    let record = encode_record(&sample()).unwrap();
    let mut store = NvsBaselineStore::new(MockNvs::new());
    store
        .storage_mut()
        .write(NAMESPACE, BASELINE_KEY, &record[..RECORD_LEN - 1])
        .unwrap();
    assert_eq!(store.load(), None);
}

#[test]
fn corrupted_record_boots_as_fresh_calibration() {
    let mut nvs = MockNvs::new();
    nvs.write(NAMESPACE, BASELINE_KEY, &[0xFF; RECORD_LEN]).unwrap();
    let mut rig = Rig::with_store(fast_config(), NvsBaselineStore::new(nvs));

    rig.start(0);
    assert_eq!(rig.service.status(), CalibrationStatus::Uninitialized);
    assert!(rig.sink.events.contains(&AppEvent::NoStoredBaseline));
}

#[test]
fn clear_forgets_the_baseline() {
    let mut store = NvsBaselineStore::new(MockNvs::new());
    store.save(&sample()).unwrap();
    store.clear().unwrap();
    assert_eq!(store.load(), None);
    assert!(!store.storage().exists(NAMESPACE, BASELINE_KEY));
}

// ── Config blob ───────────────────────────────────────────────

#[test]
fn missing_config_loads_defaults() {
    let nvs = NvsAdapter::new().unwrap();
    assert_eq!(nvs.load().unwrap(), MonitorConfig::default());
}

#[test]
fn config_save_then_load() {
    let mut nvs = NvsAdapter::new().unwrap();
    let mut cfg = MonitorConfig::default();
    cfg.persist_interval_secs = 1_800;
    cfg.thresholds.co2_threshold_ppm = 1_200;
    cfg.humidity_compensation = false;

    nvs.save(&cfg).unwrap();
    assert_eq!(nvs.load().unwrap(), cfg);
}

#[test]
fn invalid_config_is_rejected_before_write() {
    let mut nvs = NvsAdapter::new().unwrap();
    let cfg = MonitorConfig {
        tick_interval_ms: 0,
        ..Default::default()
    };

    assert!(matches!(
        nvs.save(&cfg),
        Err(ConfigError::ValidationFailed(_))
    ));
    assert!(!nvs.exists(NAMESPACE, "monitorcfg"));
}

#[test]
fn garbage_config_blob_is_corrupted() {
    let mut nvs = NvsAdapter::new().unwrap();
    nvs.write(NAMESPACE, "monitorcfg", &[0xFF; 8]).unwrap();
    assert_eq!(nvs.load(), Err(ConfigError::Corrupted));
}
