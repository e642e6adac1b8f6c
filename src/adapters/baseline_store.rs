//! Calibration baseline record on top of any [`StoragePort`].
//!
//! Record layout (16 bytes, little-endian fixed-width integers):
//!
//! ```text
//!  0      2   3      5      7                  15   16
//!  ├──────┼───┼──────┼──────┼──────────────────┼────┤
//!  │magic │ver│ co2  │ voc  │   saved_at_ms    │crc │
//!  │0x4C42│ 1 │ u16  │ u16  │       u64        │ u8 │
//! ```
//!
//! The body is postcard-encoded with fixint fields so its size never
//! depends on the values; the trailing byte is the Sensirion CRC-8 of the
//! body.  Any record failing length, CRC, marker or version checks is
//! treated as absent.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{BaselineStorePort, StorageError, StoragePort};
use crate::calibration::{BaselinePair, CalibrationBaseline};
use crate::drivers::crc::crc8;

use super::nvs::NAMESPACE;

pub const BASELINE_KEY: &str = "baseline";

pub const RECORD_LEN: usize = 16;
const BODY_LEN: usize = RECORD_LEN - 1;
const MAGIC: u16 = 0x4C42;
const VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RecordBody {
    #[serde(with = "postcard::fixint::le")]
    magic: u16,
    version: u8,
    #[serde(with = "postcard::fixint::le")]
    co2: u16,
    #[serde(with = "postcard::fixint::le")]
    voc: u16,
    #[serde(with = "postcard::fixint::le")]
    saved_at_ms: u64,
}

/// Serialise a baseline into its fixed-size record.
pub fn encode_record(baseline: &CalibrationBaseline) -> Result<[u8; RECORD_LEN], StorageError> {
    let body = RecordBody {
        magic: MAGIC,
        version: VERSION,
        co2: baseline.co2_baseline,
        voc: baseline.voc_baseline,
        saved_at_ms: baseline.saved_at_ms,
    };

    let mut record = [0u8; RECORD_LEN];
    let used = postcard::to_slice(&body, &mut record[..BODY_LEN])
        .map_err(|_| StorageError::IoError)?
        .len();
    if used != BODY_LEN {
        return Err(StorageError::IoError);
    }
    record[BODY_LEN] = crc8(&record[..BODY_LEN]);
    Ok(record)
}

/// Parse and validate a stored record.
pub fn decode_record(bytes: &[u8]) -> Result<CalibrationBaseline, StorageError> {
    if bytes.len() != RECORD_LEN {
        return Err(StorageError::Corrupt);
    }
    let (body, crc) = bytes.split_at(BODY_LEN);
    if crc8(body) != crc[0] {
        return Err(StorageError::Corrupt);
    }

    let body: RecordBody = postcard::from_bytes(body).map_err(|_| StorageError::Corrupt)?;
    if body.magic != MAGIC || body.version != VERSION {
        return Err(StorageError::Corrupt);
    }

    Ok(CalibrationBaseline::new(
        BaselinePair::new(body.co2, body.voc),
        body.saved_at_ms,
    ))
}

/// [`BaselineStorePort`] backed by a key/value store.
pub struct NvsBaselineStore<S> {
    storage: S,
}

impl<S: StoragePort> NvsBaselineStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

impl<S: StoragePort> BaselineStorePort for NvsBaselineStore<S> {
    fn load(&self) -> Option<CalibrationBaseline> {
        // Oversized so a longer blob is seen as the wrong length.
        let mut buf = [0u8; RECORD_LEN * 2];
        match self.storage.read(NAMESPACE, BASELINE_KEY, &mut buf) {
            Ok(len) => match decode_record(&buf[..len]) {
                Ok(baseline) => Some(baseline),
                Err(e) => {
                    warn!("Stored baseline discarded ({} bytes): {}", len, e);
                    None
                }
            },
            Err(StorageError::NotFound) => {
                debug!("No baseline record");
                None
            }
            Err(e) => {
                warn!("Baseline read failed: {}", e);
                None
            }
        }
    }

    fn save(&mut self, baseline: &CalibrationBaseline) -> Result<(), StorageError> {
        let record = encode_record(baseline)?;
        self.storage.write(NAMESPACE, BASELINE_KEY, &record)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.delete(NAMESPACE, BASELINE_KEY)
    }
}
