//! Single-shot speed command.
//!
//! Input errors are fatal and reported before the driver is touched. Driver
//! faults are returned as `CommandError::Driver` so the caller decides how loud
//! to be; `FaultPolicy` carries that decision for the CLI.

use core::fmt;

use crate::utils::{
    controllers::{MotorChannel, MotorController},
    math::speed_table::{DeviceSpeed, SpeedError, SpeedPercent},
};

/// Generic line reported for any driver fault.
pub const DRIVER_FAULT_MESSAGE: &str = "Error";

/// Errors returned by `SpeedCommand`.
#[derive(Debug)]
pub enum CommandError<E> {
    /// The speed argument was rejected; the motor was not commanded.
    Input(SpeedError),
    /// The motor controller failed while applying the speed.
    Driver(E),
}

impl<E> From<SpeedError> for CommandError<E> {
    fn from(e: SpeedError) -> Self {
        CommandError::Input(e)
    }
}

impl<E> fmt::Display for CommandError<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CommandError::Input(e) => fmt::Display::fmt(e, f),
            CommandError::Driver(_) => f.write_str(DRIVER_FAULT_MESSAGE),
        }
    }
}

/// How a driver fault affects the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Report the fault and still exit successfully.
    #[default]
    Compat,
    /// Report the fault and exit with `FaultPolicy::STRICT_EXIT_CODE`.
    Strict,
}

impl FaultPolicy {
    pub const STRICT_EXIT_CODE: u8 = 3;
    pub const INPUT_EXIT_CODE: u8 = 1;

    /// Exit status for a command result under this policy.
    pub fn exit_code<T, E>(
        self,
        result: &Result<T, CommandError<E>>,
    ) -> u8 {
        match (result, self) {
            (Ok(_), _) => 0,
            (Err(CommandError::Input(_)), _) => Self::INPUT_EXIT_CODE,
            (Err(CommandError::Driver(_)), FaultPolicy::Compat) => 0,
            (Err(CommandError::Driver(_)), FaultPolicy::Strict) => Self::STRICT_EXIT_CODE,
        }
    }
}

/// Applies a speed percentage to one channel of an injected motor controller.
pub struct SpeedCommand<'a, M> {
    motor: &'a mut M,
    channel: MotorChannel,
}

impl<'a, M> SpeedCommand<'a, M>
where
    M: MotorController,
    M::Error: fmt::Debug,
{
    pub fn new(
        motor: &'a mut M,
        channel: MotorChannel,
    ) -> Self {
        Self { motor, channel }
    }

    /// Parse `input` as a percentage, then apply it.
    pub fn execute(
        &mut self,
        input: &str,
    ) -> Result<DeviceSpeed, CommandError<M::Error>> {
        let percent: SpeedPercent = input.parse()?;
        self.apply(percent)
    }

    /// Look up the device speed for `percent` and send it to the controller.
    ///
    /// A zero speed is issued as `MotorController::stop`.
    pub fn apply(
        &mut self,
        percent: SpeedPercent,
    ) -> Result<DeviceSpeed, CommandError<M::Error>> {
        let speed = percent.device_speed();
        tracing::debug!(percent = percent.get(), speed = speed.get(), "speed lookup");

        let written = if speed.get() == 0 {
            self.motor.stop(self.channel)
        } else {
            self.motor.set_speed(self.channel, i16::from(speed))
        };
        match written {
            Ok(()) => {
                tracing::info!(channel = %self.channel, speed = speed.get(), "Motor speed set");
                Ok(speed)
            }
            Err(e) => {
                tracing::warn!(channel = %self.channel, "Motor driver fault: {:?}", e);
                Err(CommandError::Driver(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(MotorChannel, i16)>,
        stops: Vec<MotorChannel>,
        fail: bool,
    }

    impl MotorController for Recorder {
        type Error = &'static str;

        fn set_speed(
            &mut self,
            channel: MotorChannel,
            speed: i16,
        ) -> Result<(), Self::Error> {
            self.calls.push((channel, speed));
            if self.fail { Err("bus fault") } else { Ok(()) }
        }

        fn stop(
            &mut self,
            channel: MotorChannel,
        ) -> Result<(), Self::Error> {
            self.stops.push(channel);
            self.set_speed(channel, 0)
        }
    }

    #[test]
    fn every_percent_sends_its_table_entry() {
        for p in 0..=100u8 {
            let mut motor = Recorder::default();
            let speed = SpeedCommand::new(&mut motor, MotorChannel::M1)
                .apply(SpeedPercent::new(p).unwrap())
                .unwrap();
            assert_eq!(motor.calls, vec![(MotorChannel::M1, crate::utils::SPEED_TABLE[p as usize] as i16)]);
            assert_eq!(speed.get(), crate::utils::SPEED_TABLE[p as usize]);
        }
    }

    #[test]
    fn zero_percent_stops_the_channel() {
        let mut motor = Recorder::default();
        SpeedCommand::new(&mut motor, MotorChannel::M2).execute("0").unwrap();
        assert_eq!(motor.stops, vec![MotorChannel::M2]);
        assert_eq!(motor.calls, vec![(MotorChannel::M2, 0)]);

        let mut motor = Recorder::default();
        SpeedCommand::new(&mut motor, MotorChannel::M1).execute("1").unwrap();
        assert!(motor.stops.is_empty());
    }

    #[test]
    fn rejected_input_never_reaches_the_motor() {
        for input in ["-1", "101", "abc"] {
            let mut motor = Recorder::default();
            let result = SpeedCommand::new(&mut motor, MotorChannel::M1).execute(input);
            assert!(matches!(result, Err(CommandError::Input(_))), "{input}");
            assert!(motor.calls.is_empty());
        }
    }

    #[test]
    fn driver_fault_is_returned_not_panicked() {
        let mut motor = Recorder { fail: true, ..Default::default() };
        let result = SpeedCommand::new(&mut motor, MotorChannel::M2).execute("50");
        assert!(matches!(result, Err(CommandError::Driver("bus fault"))));
        assert_eq!(motor.calls, vec![(MotorChannel::M2, 240)]);
        assert_eq!(result.unwrap_err().to_string(), "Error");
    }

    #[test]
    fn exit_codes_follow_policy() {
        let ok: Result<(), CommandError<()>> = Ok(());
        let input: Result<(), CommandError<()>> = Err(SpeedError::OutOfRange.into());
        let fault: Result<(), CommandError<()>> = Err(CommandError::Driver(()));

        assert_eq!(FaultPolicy::Compat.exit_code(&ok), 0);
        assert_eq!(FaultPolicy::Compat.exit_code(&input), 1);
        assert_eq!(FaultPolicy::Compat.exit_code(&fault), 0);
        assert_eq!(FaultPolicy::Strict.exit_code(&input), 1);
        assert_eq!(FaultPolicy::Strict.exit_code(&fault), 3);
    }
}
