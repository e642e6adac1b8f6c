//! Monitor service — the control loop at the hexagonal core.
//!
//! [`MonitorService`] owns the calibration manager, the sensor reader and
//! the screen renderer.  Every tick it advances calibration, polls the
//! sensor when a poll is due, turns trusted readings into a
//! [`DisplayState`] and redraws.  All I/O flows through port traits
//! injected at call sites, so the whole loop runs against mock adapters.
//!
//! ```text
//!  AirSensorPort ──▶ ┌──────────────────────────────┐ ──▶ DrawTarget
//!                    │        MonitorService         │
//! BaselineStore ◀──▶ │ Calibration · Reader · Render │ ──▶ IndicatorPort
//!                    └──────────────────────────────┘ ──▶ EventSink
//! ```

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::Rgb565;
use log::{debug, info, warn};

use crate::calibration::CalibrationManager;
use crate::config::MonitorConfig;
use crate::display::{DisplayState, ScreenRenderer, present};
use crate::drivers::sgp30::absolute_humidity_8_8;
use crate::error::SensorError;
use crate::fsm::CalibrationStatus;
use crate::sensors::{Reading, SensorReader};

use super::events::AppEvent;
use super::ports::{AirSensorPort, BaselineStorePort, ClockPort, EventSink, IndicatorPort};

// ───────────────────────────────────────────────────────────────
// Tick outcome
// ───────────────────────────────────────────────────────────────

/// What happened to the sensor during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll interval has not elapsed yet.
    NotDue,
    /// A reading taken inside the warm-up window; not shown.
    Untrusted(Reading),
    /// A trusted reading; the display state was recomputed from it.
    Fresh(Reading),
    /// The poll failed; the display keeps its last state.
    Failed(SensorError),
}

/// Summary of one [`MonitorService::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub status: CalibrationStatus,
    pub poll: PollOutcome,
    /// Any pixel was sent to the panel.
    pub redrawn: bool,
    pub alert: bool,
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    config: MonitorConfig,
    calibration: CalibrationManager,
    reader: SensorReader,
    renderer: ScreenRenderer,
    /// Last state computed from a trusted reading.
    display_state: Option<DisplayState>,
    last_poll_ms: Option<u64>,
    /// Readings before this instant come from a freshly re-initialised
    /// sensor and are not shown.
    settle_until_ms: Option<u64>,
    loading_frame: usize,
    last_frame_ms: Option<u64>,
    alert: bool,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the sensor — call [`Self::start`] next.
    pub fn new(config: MonitorConfig) -> Self {
        let calibration = CalibrationManager::new(&config);
        Self {
            config,
            calibration,
            reader: SensorReader::new(),
            renderer: ScreenRenderer::new(),
            display_state: None,
            last_poll_ms: None,
            settle_until_ms: None,
            loading_frame: 0,
            last_frame_ms: None,
            alert: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise the sensor, apply humidity compensation and restore the
    /// stored calibration baseline.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl AirSensorPort + IndicatorPort),
        store: &impl BaselineStorePort,
        sink: &mut impl EventSink,
    ) -> CalibrationStatus {
        if let Err(e) = hw.initialize() {
            // The failed polls that follow trigger a re-initialisation.
            warn!("Sensor init failed: {e}");
        }
        self.apply_humidity(hw);
        hw.set_alert(false);

        let status = self.calibration.on_startup(now_ms, hw, store, sink);
        sink.emit(&AppEvent::Started(status));
        info!("MonitorService started in {:?}", status);
        status
    }

    /// Run one control cycle: calibration → poll → present → draw → alert.
    ///
    /// The `hw` parameter satisfies **both** [`AirSensorPort`] and
    /// [`IndicatorPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl AirSensorPort + IndicatorPort),
        store: &mut impl BaselineStorePort,
        display: &mut impl DrawTarget<Color = Rgb565>,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        // 1. Calibration bookkeeping (may read and persist the baseline)
        let status = self.calibration.tick(now_ms, hw, store, sink);

        // 2. Sensor poll on its own cadence
        let poll = if self.poll_due(now_ms) {
            self.last_poll_ms = Some(now_ms);
            self.poll(now_ms, hw, sink)
        } else {
            PollOutcome::NotDue
        };

        // 3. Redraw, or keep the loading screen moving
        let redrawn = match self.display_state {
            Some(state) => self.renderer.draw(&state, status, display),
            None => self.animate_loading(now_ms, status, display),
        };

        // 4. Alert indicator
        let alert = self.display_state.is_some_and(|s| s.alert());
        if alert != self.alert {
            hw.set_alert(alert);
            self.alert = alert;
            sink.emit(&AppEvent::AlertChanged(alert));
        }

        TickOutcome {
            status,
            poll,
            redrawn,
            alert,
        }
    }

    /// How long the loop should sleep before the next tick.
    pub fn next_delay_ms(&self) -> u64 {
        if self.display_state.is_none() {
            self.config
                .loading_frame_interval_ms()
                .min(self.config.tick_interval_ms())
        } else {
            self.config.tick_interval_ms()
        }
    }

    /// Start the monitor, then tick and sleep forever.
    pub fn run_forever(
        &mut self,
        clock: &mut impl ClockPort,
        hw: &mut (impl AirSensorPort + IndicatorPort),
        store: &mut impl BaselineStorePort,
        display: &mut impl DrawTarget<Color = Rgb565>,
        sink: &mut impl EventSink,
    ) -> ! {
        self.start(clock.now_ms(), hw, store, sink);
        info!("Entering control loop");

        loop {
            let now_ms = clock.now_ms();
            self.tick(now_ms, hw, store, display, sink);
            clock.sleep_ms(self.next_delay_ms());
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> CalibrationStatus {
        self.calibration.status()
    }

    /// The state on screen, `None` while the loading screen is up.
    pub fn display_state(&self) -> Option<DisplayState> {
        self.display_state
    }

    pub fn calibration(&self) -> &CalibrationManager {
        &self.calibration
    }

    pub fn reader(&self) -> &SensorReader {
        &self.reader
    }

    pub fn alert(&self) -> bool {
        self.alert
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_due(&self, now_ms: u64) -> bool {
        self.last_poll_ms
            .is_none_or(|at| now_ms.saturating_sub(at) >= self.config.tick_interval_ms())
    }

    fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut impl AirSensorPort,
        sink: &mut impl EventSink,
    ) -> PollOutcome {
        match self.reader.poll(hw, now_ms) {
            Ok(reading) => {
                sink.emit(&AppEvent::Reading(reading));
                if self.reading_trusted(now_ms) {
                    self.display_state = Some(present(&reading, &self.config.thresholds));
                    PollOutcome::Fresh(reading)
                } else {
                    debug!("Reading dropped while the sensor warms up");
                    PollOutcome::Untrusted(reading)
                }
            }
            Err(error) => {
                let consecutive = self.reader.consecutive_failures();
                sink.emit(&AppEvent::SensorFault { error, consecutive });
                let limit = u32::from(self.config.sensor_reinit_after_failures);
                if !error.is_transient() || consecutive >= limit {
                    self.reinitialize(now_ms, hw, sink);
                }
                PollOutcome::Failed(error)
            }
        }
    }

    fn reading_trusted(&self, now_ms: u64) -> bool {
        self.calibration.warmup_elapsed(now_ms)
            && self.settle_until_ms.is_none_or(|until| now_ms >= until)
    }

    fn reinitialize(
        &mut self,
        now_ms: u64,
        hw: &mut impl AirSensorPort,
        sink: &mut impl EventSink,
    ) {
        warn!(
            "Re-initialising sensor after {} failed polls ({} of {} total)",
            self.reader.consecutive_failures(),
            self.reader.total_failures(),
            self.reader.total_reads().saturating_add(self.reader.total_failures())
        );
        match hw.initialize() {
            Ok(()) => {
                self.settle_until_ms =
                    Some(now_ms.saturating_add(self.config.warmup_duration_ms()));
                self.apply_humidity(hw);
                self.calibration.on_sensor_reset(hw, sink);
                self.reader.reset_failures();
                sink.emit(&AppEvent::SensorReinitialized);
            }
            Err(e) => warn!("Sensor re-initialisation failed: {e}"),
        }
    }

    fn apply_humidity(&self, hw: &mut impl AirSensorPort) {
        if !self.config.humidity_compensation {
            return;
        }
        let absolute = absolute_humidity_8_8(
            self.config.ambient_temperature_c,
            self.config.ambient_humidity_percent,
        );
        match hw.set_humidity(absolute) {
            Ok(()) => debug!("Humidity compensation set to 0x{:04X}", absolute),
            Err(e) => warn!("Humidity compensation failed: {e}"),
        }
    }

    fn animate_loading(
        &mut self,
        now_ms: u64,
        status: CalibrationStatus,
        display: &mut impl DrawTarget<Color = Rgb565>,
    ) -> bool {
        let interval = self.config.loading_frame_interval_ms();
        match self.last_frame_ms {
            None => self.last_frame_ms = Some(now_ms),
            Some(at) if now_ms.saturating_sub(at) >= interval => {
                self.loading_frame = self.loading_frame.wrapping_add(1);
                self.last_frame_ms = Some(now_ms);
            }
            Some(_) => {}
        }
        self.renderer.draw_loading(self.loading_frame, status, display)
    }
}
