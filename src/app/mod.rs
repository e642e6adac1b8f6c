//! Application core — pure domain logic, zero I/O.
//!
//! This module holds the control loop of the air-quality monitor and the
//! boundary it talks through.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
