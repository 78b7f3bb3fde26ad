//! Integration test utilities for the sanction subsystem
//!
//! Wires the engine and reconciler to in-memory stores, a scriptable
//! member/role directory and a manual clock.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
