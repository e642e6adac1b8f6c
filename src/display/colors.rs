//! Colour constants and screen themes.
//!
//! Plain colours come from the `RgbColor` trait constants.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

use crate::fsm::CalibrationStatus;

use super::presenter::LabelColor;

pub const BLACK: Rgb565 = Rgb565::BLACK;
pub const WHITE: Rgb565 = Rgb565::WHITE;
pub const RED: Rgb565 = Rgb565::RED;
pub const GREEN: Rgb565 = Rgb565::GREEN;
pub const YELLOW: Rgb565 = Rgb565::YELLOW;
pub const CYAN: Rgb565 = Rgb565::CYAN;

/// Background / foreground pair.  The whole screen inverts when eCO2 is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb565,
    pub foreground: Rgb565,
}

/// White text on black.
pub const NORMAL: Theme = Theme {
    background: BLACK,
    foreground: WHITE,
};

/// Black text on white, used while eCO2 is over threshold.
pub const INVERTED: Theme = Theme {
    background: WHITE,
    foreground: BLACK,
};

impl Theme {
    pub const fn for_co2(high: bool) -> Self {
        if high { INVERTED } else { NORMAL }
    }
}

pub const fn label_rgb(color: LabelColor) -> Rgb565 {
    match color {
        LabelColor::Green => GREEN,
        LabelColor::Red => RED,
    }
}

/// Corner badge colour; `None` draws nothing.
pub const fn badge_rgb(status: CalibrationStatus) -> Option<Rgb565> {
    match status {
        CalibrationStatus::Uninitialized => None,
        CalibrationStatus::Restored => Some(CYAN),
        CalibrationStatus::WarmingUp => Some(YELLOW),
        CalibrationStatus::Calibrated => Some(GREEN),
    }
}
