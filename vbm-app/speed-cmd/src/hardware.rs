//! Motor controllers the CLI can open: the DRV8835 on the Raspberry Pi's
//! hardware PWM, or a stand-in that only logs.

use std::convert::Infallible;
use std::fmt;

use anyhow::{Context, Result};
use rppal::{
    gpio::{Gpio, OutputPin},
    pwm::{Channel, Polarity, Pwm},
};
use embedded_hal::pwm::{self, ErrorKind, ErrorType, SetDutyCycle};
use tracing::info;
use vbm_core::utils::controllers::{Drv8835, MotorChannel, MotorController, MotorPins};

pub type PiDrv8835 = Drv8835<PiPwm, OutputPin>;

/// `rppal` PWM error surfaced through the embedded-hal 1.0 error trait.
#[derive(Debug)]
pub struct PiPwmError(pub rppal::pwm::Error);

impl fmt::Display for PiPwmError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl pwm::Error for PiPwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Hardware PWM channel exposed as an embedded-hal 1.0 `SetDutyCycle`.
///
/// `rppal` only implements the 0.2 PWM traits, so the duty is forwarded to the
/// inherent `Pwm::set_duty_cycle`, which takes a fraction of the period.
pub struct PiPwm(Pwm);

impl ErrorType for PiPwm {
    type Error = PiPwmError;
}

impl SetDutyCycle for PiPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        self.0.set_duty_cycle(duty_fraction(duty)).map_err(PiPwmError)
    }
}

/// Fraction of the PWM period for a duty on the `0..=u16::MAX` scale.
fn duty_fraction(duty: u16) -> f64 {
    f64::from(duty) / f64::from(u16::MAX)
}

/// Wiring and timing of the DRV8835 carrier.
#[derive(Debug, Clone, Copy)]
pub struct PinConfig {
    pub pwm_frequency: f64,
    pub m1_dir: u8,
    pub m2_dir: u8,
}

/// Open both motor channels. Motor 1 is on PWM0 (GPIO12), motor 2 on PWM1 (GPIO13).
///
/// Only `active` is reconfigured; the other channel keeps whatever the last
/// invocation left running. Nothing is reset on drop, so the commanded speed
/// outlives the process.
pub fn open_drv8835(
    cfg: &PinConfig,
    active: MotorChannel,
) -> Result<PiDrv8835> {
    let gpio = Gpio::new().context("failed to open GPIO (is this a Raspberry Pi, and are you in the gpio group?)")?;

    let m1 = MotorPins::new(
        open_pwm(Channel::Pwm0, cfg, active == MotorChannel::M1)?,
        open_dir(&gpio, cfg.m1_dir)?,
    );
    let m2 = MotorPins::new(
        open_pwm(Channel::Pwm1, cfg, active == MotorChannel::M2)?,
        open_dir(&gpio, cfg.m2_dir)?,
    );
    info!(frequency = cfg.pwm_frequency, m1_dir = cfg.m1_dir, m2_dir = cfg.m2_dir, "DRV8835 opened");
    Ok(Drv8835::new(m1, m2))
}

fn open_pwm(
    channel: Channel,
    cfg: &PinConfig,
    active: bool,
) -> Result<PiPwm> {
    let mut pwm = if active {
        Pwm::with_frequency(channel, cfg.pwm_frequency, 0.0, Polarity::Normal, true)
    } else {
        Pwm::new(channel)
    }
    .with_context(|| format!("failed to open hardware PWM channel {channel:?} (is the pwm-2chan overlay enabled?)"))?;
    pwm.set_reset_on_drop(false);
    Ok(PiPwm(pwm))
}

fn open_dir(
    gpio: &Gpio,
    pin: u8,
) -> Result<OutputPin> {
    let mut dir = gpio
        .get(pin)
        .with_context(|| format!("failed to claim direction pin GPIO{pin}"))?
        .into_output();
    dir.set_reset_on_drop(false);
    Ok(dir)
}

/// Controller used by `--dry-run`: accepts every command and logs it.
#[derive(Debug, Default)]
pub struct LoggingMotor;

impl MotorController for LoggingMotor {
    type Error = Infallible;

    fn set_speed(
        &mut self,
        channel: MotorChannel,
        speed: i16,
    ) -> Result<(), Self::Error> {
        info!(%channel, speed, "dry run: set_speed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbm_core::utils::controllers::MAX_SPEED;

    /// Duty the driver hands to `set_duty_cycle` for a device speed.
    fn duty_for(speed: u16) -> u16 {
        (u32::from(speed) * u32::from(u16::MAX) / u32::from(MAX_SPEED)) as u16
    }

    #[test]
    fn device_speed_maps_onto_period_fraction() {
        assert_eq!(duty_fraction(duty_for(0)), 0.0);
        assert!((duty_fraction(duty_for(240)) - 0.5).abs() < 1e-4);
        assert_eq!(duty_fraction(duty_for(MAX_SPEED)), 1.0);
    }

    #[test]
    fn pi_driver_is_a_motor_controller() {
        fn assert_controller<M: MotorController>() {}
        assert_controller::<PiDrv8835>();
        assert_controller::<LoggingMotor>();
    }
}
