//! Concrete calibration state handlers and table builder.
//!
//! Each state is defined by plain `fn` pointers.  No closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  UNINITIALIZED ──[first tick]──┐
//!                                ▼
//!  RESTORED ─────[first tick]──▶ WARMING_UP ──[window elapsed && stable]──▶ CALIBRATED
//!                                    ▲                                          │
//!                                    └────────────────[not stable]──────────────┘
//! ```
//!
//! `Uninitialized` and `Restored` are entered only by forced transitions:
//! at startup, or when a baseline deferred at startup is finally applied.

use super::context::CalibrationContext;
use super::{CalibrationStatus, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per manager.
pub fn build_state_table() -> [StateDescriptor; CalibrationStatus::COUNT] {
    [
        // Index 0 — Uninitialized
        StateDescriptor {
            id: CalibrationStatus::Uninitialized,
            name: "Uninitialized",
            on_enter: Some(uninitialized_enter),
            on_exit: None,
            on_update: startup_update,
        },
        // Index 1 — Restored
        StateDescriptor {
            id: CalibrationStatus::Restored,
            name: "Restored",
            on_enter: Some(restored_enter),
            on_exit: None,
            on_update: startup_update,
        },
        // Index 2 — WarmingUp
        StateDescriptor {
            id: CalibrationStatus::WarmingUp,
            name: "WarmingUp",
            on_enter: Some(warming_up_enter),
            on_exit: None,
            on_update: warming_up_update,
        },
        // Index 3 — Calibrated
        StateDescriptor {
            id: CalibrationStatus::Calibrated,
            name: "Calibrated",
            on_enter: Some(calibrated_enter),
            on_exit: Some(calibrated_exit),
            on_update: calibrated_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Startup states
// ═══════════════════════════════════════════════════════════════════════════

fn uninitialized_enter(ctx: &mut CalibrationContext) {
    ctx.baseline_applied = false;
}

fn restored_enter(ctx: &mut CalibrationContext) {
    ctx.baseline_applied = true;
}

/// Both startup states hand over to the warm-up window on the first tick.
fn startup_update(_ctx: &mut CalibrationContext) -> Option<CalibrationStatus> {
    Some(CalibrationStatus::WarmingUp)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WARMING_UP state
// ═══════════════════════════════════════════════════════════════════════════

fn warming_up_enter(ctx: &mut CalibrationContext) {
    info!(
        "Warming up ({} of {} ms elapsed, baseline {})",
        ctx.elapsed_ms.min(ctx.warmup_ms),
        ctx.warmup_ms,
        if ctx.baseline_applied { "restored" } else { "learning" }
    );
}

fn warming_up_update(ctx: &mut CalibrationContext) -> Option<CalibrationStatus> {
    if ctx.warmup_elapsed() && ctx.sensor_stable {
        return Some(CalibrationStatus::Calibrated);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CALIBRATED state
// ═══════════════════════════════════════════════════════════════════════════

fn calibrated_enter(ctx: &mut CalibrationContext) {
    info!("Sensor calibrated after {} ms", ctx.elapsed_ms);
}

fn calibrated_exit(ctx: &mut CalibrationContext) {
    if !ctx.sensor_stable {
        warn!("Sensor baseline no longer stable, back to warm-up");
    }
}

fn calibrated_update(ctx: &mut CalibrationContext) -> Option<CalibrationStatus> {
    if !ctx.sensor_stable {
        return Some(CalibrationStatus::WarmingUp);
    }
    None
}
