//! Peripheral drivers: the SGP30 sensor, the alert LED and the watchdog.

pub mod crc;
pub mod sgp30;
pub mod status_led;
pub mod watchdog;
