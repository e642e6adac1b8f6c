//! Mock adapters for integration tests.
//!
//! Records every sensor call so tests can assert on the full command
//! history without touching a real I²C bus, and provides an in-memory NVS
//! and a framebuffer draw target.

use aqmonitor::adapters::baseline_store::NvsBaselineStore;
use aqmonitor::app::events::AppEvent;
use aqmonitor::app::ports::{
    AirSensorPort, EventSink, IndicatorPort, RawMeasurement, StorageError, StoragePort,
};
use aqmonitor::app::service::{MonitorService, TickOutcome};
use aqmonitor::calibration::BaselinePair;
use aqmonitor::config::MonitorConfig;
use aqmonitor::error::SensorError;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use std::collections::{HashMap, VecDeque};

// ── Sensor call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SensorCall {
    Initialize,
    SetHumidity(u16),
    SetBaseline(BaselinePair),
    GetBaseline,
    Read,
}

// ── MockSensor ────────────────────────────────────────────────

pub struct MockSensor {
    pub calls: Vec<SensorCall>,
    /// Scripted results for `read()`; `idle` once exhausted.
    pub readings: VecDeque<Result<RawMeasurement, SensorError>>,
    pub idle: RawMeasurement,
    /// What `get_baseline()` answers.
    pub learned: Result<BaselinePair, SensorError>,
    pub reject_baseline: bool,
    pub stable: bool,
    pub alert: bool,
    /// Number of upcoming `initialize()` calls that fail on the bus.
    pub init_failures: u32,
    initialized: bool,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            readings: VecDeque::new(),
            idle: RawMeasurement {
                co2_ppm: 400,
                voc_ppb: 0,
            },
            learned: Ok(BaselinePair::new(0x8E5A, 0x9012)),
            reject_baseline: false,
            stable: false,
            alert: false,
            init_failures: 0,
            initialized: false,
        }
    }

    pub fn push_reading(&mut self, co2_ppm: u16, voc_ppb: u16) {
        self.readings
            .push_back(Ok(RawMeasurement { co2_ppm, voc_ppb }));
    }

    pub fn push_failure(&mut self, e: SensorError) {
        self.readings.push_back(Err(e));
    }

    pub fn count(&self, call: &SensorCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Position of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&SensorCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl AirSensorPort for MockSensor {
    fn initialize(&mut self) -> Result<(), SensorError> {
        self.calls.push(SensorCall::Initialize);
        if self.init_failures > 0 {
            self.init_failures -= 1;
            self.initialized = false;
            return Err(SensorError::Communication);
        }
        self.initialized = true;
        Ok(())
    }

    fn set_humidity(&mut self, absolute_8_8: u16) -> Result<(), SensorError> {
        self.calls.push(SensorCall::SetHumidity(absolute_8_8));
        Ok(())
    }

    fn set_baseline(&mut self, baseline: BaselinePair) -> Result<(), SensorError> {
        self.calls.push(SensorCall::SetBaseline(baseline));
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        if self.reject_baseline {
            return Err(SensorError::BaselineRejected);
        }
        self.stable = true;
        Ok(())
    }

    fn get_baseline(&mut self) -> Result<BaselinePair, SensorError> {
        self.calls.push(SensorCall::GetBaseline);
        self.learned
    }

    fn read(&mut self) -> Result<RawMeasurement, SensorError> {
        self.calls.push(SensorCall::Read);
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        self.readings.pop_front().unwrap_or(Ok(self.idle))
    }

    fn is_calibration_stable(&self) -> bool {
        self.stable
    }
}

impl IndicatorPort for MockSensor {
    fn set_alert(&mut self, on: bool) {
        self.alert = on;
    }
}

// ── MockNvs ───────────────────────────────────────────────────

pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub writes: u32,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            fail_writes: false,
            writes: 0,
        }
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&[u8]> {
        self.store
            .get(&format!("{}::{}", namespace, key))
            .map(Vec::as_slice)
    }
}

impl Default for MockNvs {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Full);
        }
        self.writes += 1;
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── FrameBuffer ───────────────────────────────────────────────

pub const FB_SIZE: usize = 128;

#[derive(Clone, PartialEq)]
pub struct FrameBuffer {
    pub pixels: Vec<Rgb565>,
    pub draw_calls: u32,
}

#[allow(dead_code)]
impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![Rgb565::BLACK; FB_SIZE * FB_SIZE],
            draw_calls: 0,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb565 {
        self.pixels[y * FB_SIZE + x]
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(FB_SIZE as u32, FB_SIZE as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        self.draw_calls += 1;
        for Pixel(p, c) in pixels {
            if p.x >= 0 && p.y >= 0 && (p.x as usize) < FB_SIZE && (p.y as usize) < FB_SIZE {
                self.pixels[p.y as usize * FB_SIZE + p.x as usize] = c;
            }
        }
        Ok(())
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// Short timings so a whole calibration cycle fits in a few ticks.
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        warmup_duration_secs: 2,
        persist_interval_secs: 60,
        calibration_period_secs: 10,
        ..Default::default()
    }
}

pub struct Rig {
    pub service: MonitorService,
    pub sensor: MockSensor,
    pub store: NvsBaselineStore<MockNvs>,
    pub fb: FrameBuffer,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_store(config, NvsBaselineStore::new(MockNvs::new()))
    }

    pub fn with_store(config: MonitorConfig, store: NvsBaselineStore<MockNvs>) -> Self {
        Self {
            service: MonitorService::new(config),
            sensor: MockSensor::new(),
            store,
            fb: FrameBuffer::new(),
            sink: RecordingSink::new(),
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.service
            .start(now_ms, &mut self.sensor, &self.store, &mut self.sink);
    }

    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        self.service.tick(
            now_ms,
            &mut self.sensor,
            &mut self.store,
            &mut self.fb,
            &mut self.sink,
        )
    }

    /// Tick once per second over `[from_ms, to_ms]`.
    pub fn run_secs(&mut self, from_ms: u64, to_ms: u64) -> Vec<TickOutcome> {
        (from_ms..=to_ms)
            .step_by(1000)
            .map(|t| self.tick(t))
            .collect()
    }
}
