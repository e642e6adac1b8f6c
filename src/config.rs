//! Monitor configuration parameters
//!
//! All tunable parameters for the air-quality monitor.  Values can be
//! overridden via NVS (non-volatile storage); there is no on-device UI for
//! them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Display thresholds
// ---------------------------------------------------------------------------

/// eCO2 level (ppm) at and above which the face frowns and the label turns red.
pub const CO2_THRESHOLD_PPM: u16 = 1000;

/// TVOC level (ppb) at and above which the VOC label turns red.
pub const VOC_THRESHOLD_PPB: u16 = 250;

/// Lowest eCO2 value the SGP30 reports (clean-air floor).
pub const CO2_MIN_PPM: u16 = 400;

/// Upper end of the SGP30 output range for both signals.
pub const SENSOR_MAX_OUTPUT: u16 = 60_000;

const _: () = assert!(CO2_MIN_PPM < CO2_THRESHOLD_PPM);
const _: () = assert!(CO2_THRESHOLD_PPM < SENSOR_MAX_OUTPUT);
const _: () = assert!(VOC_THRESHOLD_PPB < SENSOR_MAX_OUTPUT);

/// Alarm thresholds applied by the display presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub co2_threshold_ppm: u16,
    pub voc_threshold_ppb: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            co2_threshold_ppm: CO2_THRESHOLD_PPM,
            voc_threshold_ppb: VOC_THRESHOLD_PPB,
        }
    }
}

// ---------------------------------------------------------------------------
// MonitorConfig
// ---------------------------------------------------------------------------

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Timing ---
    /// Time between sensor polls (milliseconds)
    pub tick_interval_ms: u32,
    /// Time between calibration baseline saves (seconds)
    pub persist_interval_secs: u32,
    /// Minimum time after boot before readings are trusted (seconds)
    pub warmup_duration_secs: u32,
    /// Sensor early-operation phase when no baseline was restored (seconds)
    pub calibration_period_secs: u32,
    /// Spinner frame period on the loading screen (milliseconds)
    pub loading_frame_interval_ms: u32,

    // --- Fault recovery ---
    /// Consecutive failed polls before the sensor is re-initialised
    pub sensor_reinit_after_failures: u8,

    // --- Humidity compensation ---
    /// Feed the sensor an absolute humidity derived from the values below
    pub humidity_compensation: bool,
    /// Assumed ambient temperature (Celsius)
    pub ambient_temperature_c: f32,
    /// Assumed ambient relative humidity (0-100%)
    pub ambient_humidity_percent: f32,

    // --- Display ---
    pub thresholds: Thresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 1000,           // SGP30 baseline algorithm wants 1 Hz
            persist_interval_secs: 3600,      // 1/hour, limits flash wear
            warmup_duration_secs: 15,         // SGP30 reports 400/0 for ~15 s
            calibration_period_secs: 12 * 3600,
            loading_frame_interval_ms: 50,

            // Fault recovery
            sensor_reinit_after_failures: 5,

            // Humidity compensation
            humidity_compensation: true,
            ambient_temperature_c: 22.1,
            ambient_humidity_percent: 44.0,

            thresholds: Thresholds::default(),
        }
    }
}

impl MonitorConfig {
    pub fn tick_interval_ms(&self) -> u64 {
        u64::from(self.tick_interval_ms)
    }

    pub fn persist_interval_ms(&self) -> u64 {
        u64::from(self.persist_interval_secs) * 1000
    }

    pub fn warmup_duration_ms(&self) -> u64 {
        u64::from(self.warmup_duration_secs) * 1000
    }

    pub fn calibration_period_ms(&self) -> u64 {
        u64::from(self.calibration_period_secs) * 1000
    }

    pub fn loading_frame_interval_ms(&self) -> u64 {
        u64::from(self.loading_frame_interval_ms)
    }
}
