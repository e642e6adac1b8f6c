//! Pure mapping from a [`Reading`] to what the screen should show.

use core::fmt;

use crate::config::Thresholds;
use crate::sensors::Reading;

/// Mood glyph drawn next to the readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Smile,
    Frown,
}

/// Status colour of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColor {
    Green,
    Red,
}

impl LabelColor {
    const fn for_level(high: bool) -> Self {
        if high { Self::Red } else { Self::Green }
    }
}

/// eCO2 in thousands of ppm with one decimal, truncated.
///
/// Stored as tenths (`co2_ppm / 100`), so 999 ppm shows as "0.9" and never
/// rounds up across the alarm threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryValue {
    tenths: u16,
}

impl PrimaryValue {
    pub const fn from_ppm(co2_ppm: u16) -> Self {
        Self {
            tenths: co2_ppm / 100,
        }
    }

    pub const fn tenths(self) -> u16 {
        self.tenths
    }
}

impl fmt::Display for PrimaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

/// Everything the renderer needs for one frame of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub primary_value: PrimaryValue,
    pub co2_ppm: u16,
    pub face: Face,
    pub co2_color: LabelColor,
    pub voc_ppb: u16,
    pub voc_color: LabelColor,
}

impl DisplayState {
    /// eCO2 is at or over its threshold (inverted screen theme).
    pub fn co2_high(&self) -> bool {
        self.face == Face::Frown
    }

    pub fn voc_high(&self) -> bool {
        self.voc_color == LabelColor::Red
    }

    /// Alert LED state: either signal over its threshold.
    pub fn alert(&self) -> bool {
        self.co2_high() || self.voc_high()
    }
}

/// Map a reading onto the display.  Both thresholds are inclusive and
/// evaluated independently.
pub fn present(reading: &Reading, thresholds: &Thresholds) -> DisplayState {
    let co2_high = reading.co2_ppm >= thresholds.co2_threshold_ppm;
    let voc_high = reading.voc_ppb >= thresholds.voc_threshold_ppb;

    DisplayState {
        primary_value: PrimaryValue::from_ppm(reading.co2_ppm),
        co2_ppm: reading.co2_ppm,
        face: if co2_high { Face::Frown } else { Face::Smile },
        co2_color: LabelColor::for_level(co2_high),
        voc_ppb: reading.voc_ppb,
        voc_color: LabelColor::for_level(voc_high),
    }
}
