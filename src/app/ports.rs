//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensor, indicator, event sink, storage, clock) implement
//! these traits.  The [`MonitorService`](super::service::MonitorService) and
//! the [`CalibrationManager`](crate::calibration::CalibrationManager) consume
//! them via generics, so the domain core never touches hardware directly.
//! The display port is `embedded_graphics::draw_target::DrawTarget` itself.
//!
//! ## Storage notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **StoragePort** writes MUST be atomic — no partial writes on power loss.
//! - All port errors are typed — callers must handle every variant explicitly.

use crate::calibration::{BaselinePair, CalibrationBaseline};
use crate::config::MonitorConfig;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// One raw measurement as reported by the sensor, before plausibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMeasurement {
    pub co2_ppm: u16,
    pub voc_ppb: u16,
}

/// The air-quality sensor as seen by the domain.
pub trait AirSensorPort {
    /// (Re)start the sensor's air-quality algorithm.  Clears any baseline
    /// previously applied to the device.
    fn initialize(&mut self) -> Result<(), SensorError>;

    /// Apply absolute-humidity compensation (8.8 fixed-point g/m³, 0 = off).
    fn set_humidity(&mut self, absolute_8_8: u16) -> Result<(), SensorError>;

    /// Write a calibration baseline into the sensor.
    fn set_baseline(&mut self, baseline: BaselinePair) -> Result<(), SensorError>;

    /// Read the sensor's current calibration baseline.
    fn get_baseline(&mut self) -> Result<BaselinePair, SensorError>;

    /// Take one eCO2 / TVOC measurement.
    fn read(&mut self) -> Result<RawMeasurement, SensorError>;

    /// Whether the sensor's internal calibration has settled.
    fn is_calibration_stable(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Alert indicator (an LED next to the display).
pub trait IndicatorPort {
    /// Switch the alert indicator on or off.
    fn set_alert(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and the loop's only suspension point.
pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists monitor configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges should be rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`MonitorConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &MonitorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic — no partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; in-memory simulation
///   achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Baseline store port (the calibration record)
// ───────────────────────────────────────────────────────────────

/// Durable home of the calibration baseline.
pub trait BaselineStorePort {
    /// The stored baseline, or `None` when absent or failing validation.
    /// Corruption never surfaces as an error.
    fn load(&self) -> Option<CalibrationBaseline>;

    /// Persist `baseline`.  Saving the same baseline twice yields the same
    /// stored bytes.
    fn save(&mut self, baseline: &CalibrationBaseline) -> Result<(), StorageError>;

    /// Remove the stored baseline.  `Ok(())` if there was none.
    fn clear(&mut self) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] and [`BaselineStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
    /// A stored record failed its length, marker or checksum validation.
    Corrupt,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupt => write!(f, "stored record corrupt"),
        }
    }
}
