//! Calibration baseline value types.

/// The raw `(eCO2, TVOC)` baseline register pair exchanged with the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselinePair {
    pub co2: u16,
    pub voc: u16,
}

impl BaselinePair {
    pub const fn new(co2: u16, voc: u16) -> Self {
        Self { co2, voc }
    }
}

/// A baseline the monitor can apply to the sensor.
///
/// Both register values are always present together; "no baseline" is
/// `Option::<CalibrationBaseline>::None`, never a half-filled struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationBaseline {
    pub co2_baseline: u16,
    pub voc_baseline: u16,
    /// Monotonic milliseconds at which the pair was read from the sensor.
    /// Only meaningful within the boot that produced it.
    pub saved_at_ms: u64,
}

impl CalibrationBaseline {
    pub const fn new(pair: BaselinePair, saved_at_ms: u64) -> Self {
        Self {
            co2_baseline: pair.co2,
            voc_baseline: pair.voc,
            saved_at_ms,
        }
    }

    pub const fn pair(&self) -> BaselinePair {
        BaselinePair::new(self.co2_baseline, self.voc_baseline)
    }
}
