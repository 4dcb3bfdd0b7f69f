//! Module Exports
//!
//! - `speed`: validates a speed argument, maps it through the calibration table
//!   and applies it to a `MotorController`.

/// Module for the single-shot speed command.
pub mod speed;

pub use speed::{CommandError, FaultPolicy, SpeedCommand};
