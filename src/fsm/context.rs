//! Shared mutable context threaded through every calibration state handler.
//!
//! `CalibrationContext` is the blackboard the state handlers read from and
//! write to.  The [`CalibrationManager`](crate::calibration::CalibrationManager)
//! refreshes the inputs (elapsed time, sensor stability) before each tick.

// ---------------------------------------------------------------------------
// CalibrationContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationContext {
    // -- Timing --
    /// Milliseconds since the manager's startup.
    pub elapsed_ms: u64,
    /// Length of the warm-up window (milliseconds).
    pub warmup_ms: u64,

    // -- Sensor --
    /// Latest stability report from the sensor.
    pub sensor_stable: bool,

    // -- Outputs --
    /// A restored baseline is in effect on the sensor.
    pub baseline_applied: bool,
}

impl CalibrationContext {
    pub fn new(warmup_ms: u64) -> Self {
        Self {
            elapsed_ms: 0,
            warmup_ms,
            sensor_stable: false,
            baseline_applied: false,
        }
    }

    /// The warm-up window since startup has fully elapsed.
    pub fn warmup_elapsed(&self) -> bool {
        self.elapsed_ms >= self.warmup_ms
    }
}
