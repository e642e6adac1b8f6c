//! Alert LED driver.
//!
//! A single discrete LED next to the display, lit while either air-quality
//! signal is over its threshold.  Generic over any `embedded-hal` output pin
//! so the same driver runs on the ESP32 GPIO and on a host mock.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct AlertLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> AlertLed<P> {
    /// Take ownership of `pin` and drive it low.
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            warn!("AlertLed: could not drive pin low at init");
        }
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.on = on,
            Err(_) => warn!("AlertLed: pin write failed"),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
