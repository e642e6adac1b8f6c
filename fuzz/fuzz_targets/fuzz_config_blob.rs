//! Fuzz target: persisted `MonitorConfig` blob
//!
//! Drives the NVS config decoder with arbitrary bytes and verifies:
//! - No panics under arbitrary byte inputs
//! - Every config that decodes also passes range validation
//! - A decoded config survives another encode/decode cycle unchanged
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use aqmonitor::adapters::nvs::{CONFIG_BLOB_MAX, decode_config, validate_config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = decode_config(data) else {
        return;
    };

    assert!(validate_config(&cfg).is_ok(), "decoded config failed validation");

    let mut buf = [0u8; CONFIG_BLOB_MAX];
    let bytes = postcard::to_slice(&cfg, &mut buf).expect("valid config fits the blob");
    let again = decode_config(bytes).expect("re-encoded config must decode");
    assert_eq!(cfg, again);
});
