//! Fuzz target: stored calibration baseline record
//!
//! Feeds arbitrary bytes to the record decoder and checks:
//! - No panics under arbitrary input
//! - Anything accepted is exactly `RECORD_LEN` bytes
//! - Anything accepted re-encodes to the same bytes
//!
//! cargo fuzz run fuzz_baseline_record

#![no_main]

use aqmonitor::adapters::baseline_store::{RECORD_LEN, decode_record, encode_record};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(baseline) = decode_record(data) else {
        return;
    };

    assert_eq!(data.len(), RECORD_LEN, "accepted a record of the wrong length");

    let encoded = encode_record(&baseline).expect("decoded baseline must re-encode");
    assert_eq!(&encoded[..], data, "decode/encode is not an identity");
});
