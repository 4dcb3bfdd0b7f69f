//! Module Exports
//!
//! This file exports the motor-driver abstraction used by the speed command.
//!
//! - `drv8835`: Pololu DRV8835 dual motor driver over `embedded-hal` PWM and GPIO.

/// Module for the DRV8835 dual motor driver.
pub mod drv8835;

use core::fmt;

pub use drv8835::{DeviceError, Drv8835, MotorPins, MAX_SPEED};

/// Addressable output of a dual motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorChannel {
    M1,
    M2,
}

impl MotorChannel {
    /// 1-based channel number as printed on the driver board.
    pub const fn number(self) -> u8 {
        match self {
            MotorChannel::M1 => 1,
            MotorChannel::M2 => 2,
        }
    }
}

impl TryFrom<u8> for MotorChannel {
    type Error = u8;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(MotorChannel::M1),
            2 => Ok(MotorChannel::M2),
            other => Err(other),
        }
    }
}

impl fmt::Display for MotorChannel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "motor{}", self.number())
    }
}

/// Abstract motor-driver interface.
///
/// Speeds are signed driver units: the sign selects direction and the magnitude
/// is bounded by the implementation's full scale.
pub trait MotorController {
    type Error;

    /// Command a new speed on one channel.
    fn set_speed(
        &mut self,
        channel: MotorChannel,
        speed: i16,
    ) -> Result<(), Self::Error>;

    /// Stop one channel.
    fn stop(
        &mut self,
        channel: MotorChannel,
    ) -> Result<(), Self::Error> {
        self.set_speed(channel, 0)
    }
}
