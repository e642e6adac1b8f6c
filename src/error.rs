//! Unified error types for the air-quality monitor firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the event sink and the calibration manager without
//! allocation.  None of them is fatal: each is absorbed by the component
//! that owns it.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The air-quality sensor could not be read or returned bad data.
    Sensor(SensorError),
    /// Non-volatile storage failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I²C transaction failed (device unresponsive, NACK, bus fault).
    Communication,
    /// A response word failed its CRC-8 check.
    Crc,
    /// The reading is outside the physically plausible range.
    InvalidReading { co2_ppm: u16, voc_ppb: u16 },
    /// The sensor refused a baseline pair.
    BaselineRejected,
    /// A measurement was requested before `iaq_init` succeeded.
    NotInitialized,
}

impl SensorError {
    /// Transient faults are retried on the next tick with no other action.
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Communication | Self::Crc | Self::InvalidReading { .. }
        )
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication => write!(f, "I2C communication failed"),
            Self::Crc => write!(f, "response CRC mismatch"),
            Self::InvalidReading { co2_ppm, voc_ppb } => {
                write!(f, "implausible reading ({co2_ppm} ppm, {voc_ppb} ppb)")
            }
            Self::BaselineRejected => write!(f, "baseline rejected"),
            Self::NotInitialized => write!(f, "sensor not initialised"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
