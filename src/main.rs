//! Air-quality monitor firmware — main entry point.
//!
//! Brings up the peripherals, wires the adapters to the monitor service and
//! hands control to its loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter     NvsBaselineStore   LogEventSink         │
//! │  (Sensor+Indicator)  (BaselineStore)    (EventSink)          │
//! │  ST7735 (DrawTarget) NvsAdapter         Esp32TimeAdapter     │
//! │                      (Config+Storage)   (Clock + watchdog)   │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          MonitorService (pure logic)                   │  │
//! │  │  Calibration FSM · Sensor reader · Presenter · Render  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result, anyhow};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyInputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use esp_idf_hal::spi::SpiDeviceDriver;
use esp_idf_hal::spi::config::{Config as SpiConfig, DriverConfig as SpiDriverConfig, MODE_0};
use log::{info, warn};
use mipidsi::Builder;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7735s;
use mipidsi::options::ColorOrder;

use aqmonitor::adapters::baseline_store::NvsBaselineStore;
use aqmonitor::adapters::hardware::HardwareAdapter;
use aqmonitor::adapters::log_sink::LogEventSink;
use aqmonitor::adapters::nvs::NvsAdapter;
use aqmonitor::adapters::time::Esp32TimeAdapter;
use aqmonitor::app::ports::ConfigPort;
use aqmonitor::app::service::MonitorService;
use aqmonitor::config::MonitorConfig;
use aqmonitor::display::layout::{HEIGHT, WIDTH};
use aqmonitor::drivers::sgp30::Sgp30;
use aqmonitor::drivers::status_led::AlertLed;
use aqmonitor::drivers::watchdog::Watchdog;
use aqmonitor::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AQ Monitor v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take().context("Peripherals unavailable")?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            MonitorConfig::default()
        }
    };

    // ── 3. Sensor bus + alert LED ─────────────────────────────
    info!(
        "SGP30 on I2C0 (SDA={}, SCL={}), alert LED on GPIO{}",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::ALERT_LED_GPIO
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio41,
        peripherals.pins.gpio40,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz().into()),
    )
    .context("Failed to init I2C")?;
    let led = PinDriver::output(peripherals.pins.gpio18).context("Alert LED pin")?;

    let mut hw = HardwareAdapter::new(Sgp30::new(i2c, Ets), AlertLed::new(led), &config);
    match hw.serial() {
        Ok([a, b, c]) => info!("SGP30 serial {:04X}{:04X}{:04X}", a, b, c),
        Err(e) => warn!("SGP30 serial read failed: {}", e),
    }

    // ── 4. TFT display ────────────────────────────────────────
    let spi = SpiDeviceDriver::new_single(
        peripherals.spi2,
        peripherals.pins.gpio36,
        peripherals.pins.gpio35,
        Option::<AnyInputPin>::None,
        Some(peripherals.pins.gpio5),
        &SpiDriverConfig::new(),
        &SpiConfig::new()
            .baudrate(pins::TFT_SPI_FREQ_HZ.Hz().into())
            .data_mode(MODE_0),
    )
    .context("Failed to init TFT SPI")?;
    let dc = PinDriver::output(peripherals.pins.gpio16)?;
    let rst = PinDriver::output(peripherals.pins.gpio9)?;

    let mut spi_buffer = [0u8; 512];
    let di = SpiInterface::new(spi, dc, &mut spi_buffer);
    let (col, row) = pins::TFT_OFFSET;
    let mut display = Builder::new(ST7735s, di)
        .reset_pin(rst)
        .display_size(WIDTH as u16, HEIGHT as u16)
        .display_offset(col, row)
        .color_order(ColorOrder::Bgr)
        .init(&mut Ets)
        .map_err(|e| anyhow!("Failed to init ST7735 display: {:?}", e))?;

    // ── 5. Remaining adapters ─────────────────────────────────
    let mut store = NvsBaselineStore::new(nvs);
    let mut clock = Esp32TimeAdapter::with_watchdog(Watchdog::default());
    let mut sink = LogEventSink::new();

    // ── 6. Control loop ───────────────────────────────────────
    let mut service = MonitorService::new(config);
    info!("System ready.");
    service.run_forever(&mut clock, &mut hw, &mut store, &mut display, &mut sink)
}
