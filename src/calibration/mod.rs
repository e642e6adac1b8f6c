//! Calibration baseline lifecycle.
//!
//! [`CalibrationManager`] owns the sensor's calibration baseline: it restores
//! a stored one at startup, tracks the calibration status through the
//! function-pointer FSM in [`crate::fsm`], and periodically reads the
//! baseline back from the sensor to persist it.
//!
//! ```text
//!  on_startup: store.load() ──▶ sensor.set_baseline() ──▶ Restored | Uninitialized
//!                                      └─ unreachable ──▶ pending
//!  on_sensor_reset: pending ──▶ sensor.set_baseline() ──▶ Restored
//!  tick:       sensor.is_calibration_stable() ──▶ FSM
//!              Calibrated && persist due ──▶ sensor.get_baseline() ──▶ store.save()
//! ```
//!
//! Every failure is reported through the event sink and absorbed here; the
//! in-memory baseline survives failed saves and the save is retried at the
//! next interval.

pub mod baseline;

pub use baseline::*;

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{AirSensorPort, BaselineStorePort, EventSink, StorageError};
use crate::config::MonitorConfig;
use crate::error::SensorError;
use crate::fsm::context::CalibrationContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{CalibrationStatus, Fsm};

pub struct CalibrationManager {
    fsm: Fsm,
    ctx: CalibrationContext,
    started_at_ms: u64,
    /// Most recent baseline obtained from the sensor or from storage.
    baseline: Option<CalibrationBaseline>,
    /// Stored baseline the sensor could not take yet.
    pending: Option<CalibrationBaseline>,
    /// What was last written to storage successfully.
    last_persisted: Option<CalibrationBaseline>,
    last_persist_attempt_ms: Option<u64>,
    persist_interval_ms: u64,
}

impl CalibrationManager {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), CalibrationStatus::Uninitialized),
            ctx: CalibrationContext::new(config.warmup_duration_ms()),
            started_at_ms: 0,
            baseline: None,
            pending: None,
            last_persisted: None,
            last_persist_attempt_ms: None,
            persist_interval_ms: config.persist_interval_ms(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore a stored baseline into the sensor.
    ///
    /// Must run after the sensor's `initialize()` and before the first
    /// reading is trusted.  A baseline the sensor rejects is dropped and the
    /// monitor goes through the full warm-up as if none was stored.  If the
    /// sensor cannot be reached the baseline is kept pending and applied by
    /// [`Self::on_sensor_reset`].
    pub fn on_startup(
        &mut self,
        now_ms: u64,
        sensor: &mut impl AirSensorPort,
        store: &impl BaselineStorePort,
        sink: &mut impl EventSink,
    ) -> CalibrationStatus {
        self.started_at_ms = now_ms;
        self.fsm.start(&mut self.ctx);

        match store.load() {
            Some(stored) => self.restore(stored, sensor, sink),
            None => {
                info!("No stored baseline, sensor starts learning");
                sink.emit(&AppEvent::NoStoredBaseline);
            }
        }

        self.fsm.current_state()
    }

    /// Advance the calibration FSM and persist the baseline when due.
    pub fn tick(
        &mut self,
        now_ms: u64,
        sensor: &mut impl AirSensorPort,
        store: &mut impl BaselineStorePort,
        sink: &mut impl EventSink,
    ) -> CalibrationStatus {
        let prev = self.fsm.current_state();

        self.ctx.elapsed_ms = now_ms.saturating_sub(self.started_at_ms);
        self.ctx.sensor_stable = sensor.is_calibration_stable();
        self.fsm.tick(&mut self.ctx);

        let status = self.fsm.current_state();
        if status != prev {
            sink.emit(&AppEvent::CalibrationChanged { from: prev, to: status });
        }

        if self.persist_due(now_ms) {
            self.refresh_and_persist(now_ms, sensor, store, sink);
        }

        status
    }

    /// Save the current in-memory baseline.
    ///
    /// Returns `Ok(false)` without touching storage when no baseline has been
    /// obtained yet.  Every call restarts the persist interval, successful or
    /// not.
    pub fn persist(
        &mut self,
        now_ms: u64,
        store: &mut impl BaselineStorePort,
    ) -> Result<bool, StorageError> {
        self.last_persist_attempt_ms = Some(now_ms);

        let Some(baseline) = self.baseline else {
            return Ok(false);
        };

        store.save(&baseline)?;
        self.last_persisted = Some(baseline);
        Ok(true)
    }

    /// Re-apply the in-memory baseline after the sensor was re-initialised,
    /// or apply a stored one still pending from startup.
    pub fn on_sensor_reset(&mut self, sensor: &mut impl AirSensorPort, sink: &mut impl EventSink) {
        if let Some(pending) = self.pending.take() {
            let prev = self.fsm.current_state();
            self.restore(pending, sensor, sink);
            let status = self.fsm.current_state();
            if status != prev {
                sink.emit(&AppEvent::CalibrationChanged { from: prev, to: status });
            }
            return;
        }

        let Some(baseline) = self.baseline else {
            self.ctx.baseline_applied = false;
            return;
        };

        match sensor.set_baseline(baseline.pair()) {
            Ok(()) => {
                info!("Baseline re-applied after sensor reset");
                self.ctx.baseline_applied = true;
            }
            Err(SensorError::BaselineRejected) => {
                warn!("Sensor refused baseline after reset");
                self.ctx.baseline_applied = false;
                sink.emit(&AppEvent::BaselineRejected(SensorError::BaselineRejected));
            }
            Err(e) => {
                warn!("Baseline not re-applied after reset: {e}");
                self.ctx.baseline_applied = false;
                sink.emit(&AppEvent::BaselineDeferred(e));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> CalibrationStatus {
        self.fsm.current_state()
    }

    pub fn baseline(&self) -> Option<CalibrationBaseline> {
        self.baseline
    }

    pub fn last_persisted(&self) -> Option<CalibrationBaseline> {
        self.last_persisted
    }

    /// The warm-up window since startup has elapsed at `now_ms`.
    pub fn warmup_elapsed(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_at_ms) >= self.ctx.warmup_ms
    }

    // ── Internals ─────────────────────────────────────────────

    /// Apply a stored baseline.  Only an explicit rejection drops it; any
    /// other failure leaves it pending for the next sensor reset.
    fn restore(
        &mut self,
        stored: CalibrationBaseline,
        sensor: &mut impl AirSensorPort,
        sink: &mut impl EventSink,
    ) {
        match sensor.set_baseline(stored.pair()) {
            Ok(()) => {
                info!(
                    "Restored baseline eCO2=0x{:04X} TVOC=0x{:04X}",
                    stored.co2_baseline, stored.voc_baseline
                );
                self.baseline = Some(stored);
                self.last_persisted = Some(stored);
                self.fsm
                    .force_transition(CalibrationStatus::Restored, &mut self.ctx);
                sink.emit(&AppEvent::BaselineRestored(stored.pair()));
            }
            Err(SensorError::BaselineRejected) => {
                warn!("Stored baseline rejected by sensor");
                sink.emit(&AppEvent::BaselineRejected(SensorError::BaselineRejected));
            }
            Err(e) => {
                warn!("Stored baseline not applied yet: {e}");
                self.pending = Some(stored);
                sink.emit(&AppEvent::BaselineDeferred(e));
            }
        }
    }

    fn persist_due(&self, now_ms: u64) -> bool {
        if self.fsm.current_state() != CalibrationStatus::Calibrated {
            return false;
        }
        match self.last_persist_attempt_ms {
            None => true,
            Some(at) => now_ms.saturating_sub(at) >= self.persist_interval_ms,
        }
    }

    fn refresh_and_persist(
        &mut self,
        now_ms: u64,
        sensor: &mut impl AirSensorPort,
        store: &mut impl BaselineStorePort,
        sink: &mut impl EventSink,
    ) {
        match sensor.get_baseline() {
            Ok(pair) if pair == BaselinePair::new(0, 0) => {
                debug!("Sensor has not learned a baseline yet");
            }
            Ok(pair) => {
                self.baseline = Some(CalibrationBaseline::new(pair, now_ms));
                self.pending = None;
            }
            Err(e) => {
                warn!("Could not read baseline from sensor: {e}");
                sink.emit(&AppEvent::BaselineReadFailed(e));
            }
        }

        match self.persist(now_ms, store) {
            Ok(true) => {
                if let Some(b) = self.baseline {
                    info!(
                        "Persisted baseline eCO2=0x{:04X} TVOC=0x{:04X}",
                        b.co2_baseline, b.voc_baseline
                    );
                    sink.emit(&AppEvent::BaselinePersisted(b.pair()));
                }
            }
            Ok(false) => debug!("No baseline to persist yet"),
            Err(e) => {
                warn!("Baseline save failed, retrying next interval: {e}");
                sink.emit(&AppEvent::PersistFailed(e));
            }
        }
    }
}
