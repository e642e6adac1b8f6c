//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) and the
//! [`CalibrationManager`](crate::calibration::CalibrationManager) emit these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them (log to serial, count in tests).

use crate::app::ports::StorageError;
use crate::calibration::BaselinePair;
use crate::error::SensorError;
use crate::fsm::CalibrationStatus;
use crate::sensors::Reading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The monitor has started (carries the initial calibration status).
    Started(CalibrationStatus),

    /// The calibration FSM transitioned between states.
    CalibrationChanged {
        from: CalibrationStatus,
        to: CalibrationStatus,
    },

    /// A stored baseline was found and accepted by the sensor.
    BaselineRestored(BaselinePair),

    /// The sensor refused a stored or re-applied baseline.
    BaselineRejected(SensorError),

    /// A stored baseline could not be applied because the sensor was not
    /// reachable; it is applied once the sensor is re-initialised.
    BaselineDeferred(SensorError),

    /// No valid baseline record in storage (first boot or corruption).
    NoStoredBaseline,

    /// The current baseline was written to storage.
    BaselinePersisted(BaselinePair),

    /// Reading the baseline back from the sensor failed.
    BaselineReadFailed(SensorError),

    /// Writing the baseline to storage failed; retried next interval.
    PersistFailed(StorageError),

    /// A trusted reading was taken.
    Reading(Reading),

    /// A poll failed.  `consecutive` counts failures since the last success.
    SensorFault {
        error: SensorError,
        consecutive: u32,
    },

    /// The sensor was re-initialised after repeated failures.
    SensorReinitialized,

    /// The alert indicator changed state.
    AlertChanged(bool),
}
