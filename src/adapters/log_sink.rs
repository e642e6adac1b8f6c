//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production, the test logger on
//! host).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(status) => {
                info!("START | calibration={:?}", status);
            }
            AppEvent::CalibrationChanged { from, to } => {
                info!("CALIB | {:?} -> {:?}", from, to);
            }
            AppEvent::BaselineRestored(pair) => {
                info!(
                    "BASELINE | restored eCO2=0x{:04X} TVOC=0x{:04X}",
                    pair.co2, pair.voc
                );
            }
            AppEvent::BaselineRejected(e) => {
                warn!("BASELINE | rejected: {}", e);
            }
            AppEvent::BaselineDeferred(e) => {
                warn!("BASELINE | deferred until sensor recovers: {}", e);
            }
            AppEvent::NoStoredBaseline => {
                info!("BASELINE | none stored, starting fresh calibration");
            }
            AppEvent::BaselinePersisted(pair) => {
                info!(
                    "BASELINE | saved eCO2=0x{:04X} TVOC=0x{:04X}",
                    pair.co2, pair.voc
                );
            }
            AppEvent::BaselineReadFailed(e) => {
                warn!("BASELINE | read from sensor failed: {}", e);
            }
            AppEvent::PersistFailed(e) => {
                warn!("BASELINE | save failed: {}", e);
            }
            AppEvent::Reading(r) => {
                debug!("READ | eCO2={}ppm TVOC={}ppb", r.co2_ppm, r.voc_ppb);
            }
            AppEvent::SensorFault { error, consecutive } => {
                warn!("FAULT | {} ({} in a row)", error, consecutive);
            }
            AppEvent::SensorReinitialized => {
                info!("FAULT | sensor re-initialised");
            }
            AppEvent::AlertChanged(on) => {
                info!("ALERT | {}", if *on { "on" } else { "off" });
            }
        }
    }
}
