//! Utility re-exports for the vibration motor.
//!
//! - `command`: the single-shot speed command and its error types
//! - `controllers`: the `MotorController` seam and the DRV8835 driver
//! - `math`: the percentage to device-speed calibration table

pub mod command;
pub mod controllers;
pub mod math;

pub use command::{CommandError, FaultPolicy, SpeedCommand};
pub use controllers::{Drv8835, MotorChannel, MotorController};
pub use math::speed_table::{DeviceSpeed, SpeedError, SpeedPercent, SPEED_TABLE};
