//! Function-pointer finite state machine engine for calibration status.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────────┬───────────┬──────────┬───────────────────┐│
//! │  │ Status        │ on_enter  │ on_exit  │ on_update         ││
//! │  ├───────────────┼───────────┼──────────┼───────────────────┤│
//! │  │ Uninitialized │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  │ Restored      │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  │ WarmingUp     │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  │ Calibrated    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  └───────────────┴───────────┴──────────┴───────────────────┘│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! At most one transition happens per tick, so every state on a path is
//! observable through [`Fsm::current_state`].

pub mod context;
pub mod states;

use context::CalibrationContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Calibration status of the air-quality sensor.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CalibrationStatus {
    /// No baseline applied; the sensor learns one from scratch.
    Uninitialized = 0,
    /// A stored baseline was accepted by the sensor at startup.
    Restored = 1,
    /// Inside the warm-up window or waiting for the sensor to settle.
    WarmingUp = 2,
    /// Warm-up elapsed and the sensor reports a stable baseline.
    Calibrated = 3,
}

impl CalibrationStatus {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to a status.  Panics on out-of-range in debug
    /// builds; returns `Uninitialized` in release (the conservative state).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Uninitialized,
            1 => Self::Restored,
            2 => Self::WarmingUp,
            3 => Self::Calibrated,
            _ => {
                debug_assert!(false, "invalid status index: {idx}");
                Self::Uninitialized
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut CalibrationContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut CalibrationContext) -> Option<CalibrationStatus>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: CalibrationStatus,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `CalibrationStatus as usize`.
    table: [StateDescriptor; CalibrationStatus::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(
        table: [StateDescriptor; CalibrationStatus::COUNT],
        initial: CalibrationStatus,
    ) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut CalibrationContext) {
        info!("Calibration FSM starting in: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut CalibrationContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (startup restore, restore rejection).
    pub fn force_transition(&mut self, next: CalibrationStatus, ctx: &mut CalibrationContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> CalibrationStatus {
        CalibrationStatus::from_index(self.current)
    }

    fn transition(&mut self, next_id: CalibrationStatus, ctx: &mut CalibrationContext) {
        let next_idx = next_id as usize;

        info!(
            "Calibration: {} -> {} after {} ticks",
            self.table[self.current].name,
            self.table[next_idx].name,
            self.tick_count - self.state_entry_tick
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
