//! Pololu DRV8835 dual motor driver.
//!
//! The carrier runs in PHASE/ENABLE mode: each motor has a PWM line on ENABLE
//! and a GPIO line on PHASE selecting direction. On the Raspberry Pi kit these
//! are GPIO12/GPIO5 for motor 1 and GPIO13/GPIO6 for motor 2.

use embedded_hal::{
    digital::{OutputPin, PinState},
    pwm::SetDutyCycle,
};

use super::{MotorChannel, MotorController};

/// Full-scale speed accepted by the driver, matching its PWM range.
pub const MAX_SPEED: u16 = 480;

/// Errors that can occur when driving the DRV8835 lines.
#[derive(Debug)]
pub enum DeviceError<PwmE, PinE> {
    Pwm(PwmE),
    Direction(PinE),
}

impl<PwmE: core::fmt::Debug, PinE: core::fmt::Debug> core::fmt::Display for DeviceError<PwmE, PinE> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            DeviceError::Pwm(e) => write!(f, "PWM write failed: {:?}", e),
            DeviceError::Direction(e) => write!(f, "direction pin write failed: {:?}", e),
        }
    }
}

/// ENABLE (PWM) and PHASE (direction) lines of one motor.
pub struct MotorPins<PWM, DIR> {
    pub pwm: PWM,
    pub dir: DIR,
}

impl<PWM, DIR> MotorPins<PWM, DIR> {
    pub fn new(
        pwm: PWM,
        dir: DIR,
    ) -> Self {
        Self { pwm, dir }
    }
}

/// High-level driver for both DRV8835 motor channels.
pub struct Drv8835<PWM, DIR> {
    m1: MotorPins<PWM, DIR>,
    m2: MotorPins<PWM, DIR>,
}

impl<PWM, DIR> Drv8835<PWM, DIR>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
{
    /// Create a driver from the two motors' lines. No lines are written.
    pub fn new(
        m1: MotorPins<PWM, DIR>,
        m2: MotorPins<PWM, DIR>,
    ) -> Self {
        Drv8835 { m1, m2 }
    }

    fn pins(
        &mut self,
        channel: MotorChannel,
    ) -> &mut MotorPins<PWM, DIR> {
        match channel {
            MotorChannel::M1 => &mut self.m1,
            MotorChannel::M2 => &mut self.m2,
        }
    }
}

impl<PWM, DIR> MotorController for Drv8835<PWM, DIR>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
{
    type Error = DeviceError<PWM::Error, DIR::Error>;

    /// Negative speeds run the motor in reverse. Magnitudes above `MAX_SPEED`
    /// are clamped. PHASE is written before ENABLE.
    fn set_speed(
        &mut self,
        channel: MotorChannel,
        speed: i16,
    ) -> Result<(), Self::Error> {
        let reverse = speed < 0;
        let magnitude = speed.unsigned_abs().min(MAX_SPEED);
        tracing::debug!(%channel, reverse, magnitude, "DRV8835 write");

        let pins = self.pins(channel);
        pins.dir
            .set_state(PinState::from(reverse))
            .map_err(DeviceError::Direction)?;
        pins.pwm
            .set_duty_cycle_fraction(magnitude, MAX_SPEED)
            .map_err(DeviceError::Pwm)?;
        Ok(())
    }
}
