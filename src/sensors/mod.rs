//! Sensor polling — turns raw sensor output into trusted [`Reading`]s.
//!
//! [`SensorReader`] wraps one [`AirSensorPort`] poll per call.  It does not
//! retry: a failed poll is reported to the caller, which decides whether to
//! keep the last display state or re-initialise the sensor.  Failure and
//! success counts are kept for the log sink and for recovery decisions.

use log::{debug, warn};

use crate::app::ports::{AirSensorPort, RawMeasurement};
use crate::config::{CO2_MIN_PPM, SENSOR_MAX_OUTPUT};
use crate::error::SensorError;

/// One trusted measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Equivalent CO2 (ppm).
    pub co2_ppm: u16,
    /// Total volatile organic compounds (ppb).
    pub voc_ppb: u16,
    /// Monotonic milliseconds at which the poll completed.
    pub timestamp_ms: u64,
}

/// Physical plausibility of a raw measurement.
fn validate(raw: RawMeasurement) -> Result<RawMeasurement, SensorError> {
    let co2_ok = (CO2_MIN_PPM..=SENSOR_MAX_OUTPUT).contains(&raw.co2_ppm);
    let voc_ok = raw.voc_ppb <= SENSOR_MAX_OUTPUT;
    if co2_ok && voc_ok {
        Ok(raw)
    } else {
        Err(SensorError::InvalidReading {
            co2_ppm: raw.co2_ppm,
            voc_ppb: raw.voc_ppb,
        })
    }
}

#[derive(Debug, Default)]
pub struct SensorReader {
    consecutive_failures: u32,
    total_reads: u32,
    total_failures: u32,
}

impl SensorReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one measurement from `sensor`, stamped with `now_ms`.
    pub fn poll(
        &mut self,
        sensor: &mut impl AirSensorPort,
        now_ms: u64,
    ) -> Result<Reading, SensorError> {
        match sensor.read().and_then(validate) {
            Ok(raw) => {
                let reading = Reading {
                    co2_ppm: raw.co2_ppm,
                    voc_ppb: raw.voc_ppb,
                    timestamp_ms: now_ms,
                };
                self.consecutive_failures = 0;
                self.total_reads = self.total_reads.wrapping_add(1);
                debug!("eCO2={} ppm TVOC={} ppb", reading.co2_ppm, reading.voc_ppb);
                Ok(reading)
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.total_failures = self.total_failures.wrapping_add(1);
                warn!(
                    "Sensor poll failed ({} in a row): {e}",
                    self.consecutive_failures
                );
                Err(e)
            }
        }
    }

    /// Failed polls since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    pub fn total_failures(&self) -> u32 {
        self.total_failures
    }

    /// Forget the failure streak (after the sensor was re-initialised).
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }
}
