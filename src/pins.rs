//! GPIO / peripheral pin assignments for the Adafruit QT Py ESP32-S3 build.
//!
//! Single source of truth — the device binary references this module rather
//! than hard-coding pin numbers.
//!
//! The SGP30 breakout hangs off the STEMMA QT connector; the 1.44" ST7735
//! TFT sits on the SPI header pins.

// ---------------------------------------------------------------------------
// I²C bus (STEMMA QT: SGP30)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 41;
pub const I2C_SCL_GPIO: i32 = 40;
/// Standard-mode clock; the SGP30 tops out at 400 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// TFT display (ST7735, 128×128, SPI)
// ---------------------------------------------------------------------------

pub const TFT_SCK_GPIO: i32 = 36;
pub const TFT_MOSI_GPIO: i32 = 35;
pub const TFT_CS_GPIO: i32 = 5;
pub const TFT_DC_GPIO: i32 = 16;
pub const TFT_RST_GPIO: i32 = 9;
pub const TFT_SPI_FREQ_HZ: u32 = 24_000_000;

/// Panel RAM offset of the 1.44" module (column, row).
pub const TFT_OFFSET: (u16, u16) = (2, 1);

// ---------------------------------------------------------------------------
// Alert LED (active high)
// ---------------------------------------------------------------------------

pub const ALERT_LED_GPIO: i32 = 18;
