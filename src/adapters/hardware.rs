//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the SGP30 driver and the alert LED, exposing them through
//! [`AirSensorPort`] and [`IndicatorPort`].  This is the only module that
//! touches the sensor bus.  It also tracks the sensor's early-operation
//! phase, which the chip itself does not report.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::info;

use crate::app::ports::{AirSensorPort, IndicatorPort, RawMeasurement};
use crate::calibration::BaselinePair;
use crate::config::MonitorConfig;
use crate::drivers::sgp30::Sgp30;
use crate::drivers::status_led::AlertLed;
use crate::error::SensorError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, D, P> {
    sensor: Sgp30<I2C, D>,
    led: AlertLed<P>,
    /// Successful measurements since the last `iaq_init`.
    reads_since_init: u32,
    /// Measurements that make up the early-operation phase.
    calibration_reads: u32,
    baseline_applied: bool,
}

impl<I2C, D, P> HardwareAdapter<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: OutputPin,
{
    pub fn new(sensor: Sgp30<I2C, D>, led: AlertLed<P>, config: &MonitorConfig) -> Self {
        let calibration_reads =
            (config.calibration_period_ms() / config.tick_interval_ms().max(1)).max(1);
        Self {
            sensor,
            led,
            reads_since_init: 0,
            calibration_reads: u32::try_from(calibration_reads).unwrap_or(u32::MAX),
            baseline_applied: false,
        }
    }

    /// Sensor serial number, logged at startup.
    pub fn serial(&mut self) -> Result<[u16; 3], SensorError> {
        self.sensor.serial()
    }

    pub fn alert_on(&self) -> bool {
        self.led.is_on()
    }
}

// ── AirSensorPort implementation ──────────────────────────────

impl<I2C, D, P> AirSensorPort for HardwareAdapter<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: OutputPin,
{
    fn initialize(&mut self) -> Result<(), SensorError> {
        self.reads_since_init = 0;
        self.baseline_applied = false;
        self.sensor.iaq_init()
    }

    fn set_humidity(&mut self, absolute_8_8: u16) -> Result<(), SensorError> {
        self.sensor.set_absolute_humidity(absolute_8_8)
    }

    fn set_baseline(&mut self, baseline: BaselinePair) -> Result<(), SensorError> {
        self.sensor.set_baseline(baseline)?;
        self.baseline_applied = true;
        Ok(())
    }

    fn get_baseline(&mut self) -> Result<BaselinePair, SensorError> {
        self.sensor.get_baseline()
    }

    fn read(&mut self) -> Result<RawMeasurement, SensorError> {
        let (co2_ppm, voc_ppb) = self.sensor.measure_iaq()?;
        self.reads_since_init = self.reads_since_init.saturating_add(1);
        if self.reads_since_init == self.calibration_reads && !self.baseline_applied {
            info!("SGP30 early-operation phase complete");
        }
        Ok(RawMeasurement { co2_ppm, voc_ppb })
    }

    fn is_calibration_stable(&self) -> bool {
        self.baseline_applied || self.reads_since_init >= self.calibration_reads
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<I2C, D, P> IndicatorPort for HardwareAdapter<I2C, D, P>
where
    I2C: I2c,
    D: DelayNs,
    P: OutputPin,
{
    fn set_alert(&mut self, on: bool) {
        self.led.set(on);
    }
}
