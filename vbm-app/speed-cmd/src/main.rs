use std::fmt::Debug;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use vbm_core::utils::command::speed::DRIVER_FAULT_MESSAGE;
use vbm_core::utils::{CommandError, FaultPolicy, MotorChannel, MotorController, SpeedCommand, SpeedPercent};

mod hardware;

use hardware::{LoggingMotor, PinConfig};

/// Set the vibration motor speed on a Pololu DRV8835 carrier.
#[derive(Parser, Debug)]
#[clap(version = "1.0")]
struct Opts
{
    /// Speed in percent, 0-100
    #[clap(allow_negative_numbers = true)]
    speed: String,
    /// Motor channel to drive (1 or 2)
    #[clap(long, default_value = "1", value_parser = parse_channel)]
    channel: MotorChannel,
    /// exit with status 3 when the driver reports a fault
    #[clap(long)]
    strict: bool,
    /// log the command instead of touching the hardware
    #[clap(long)]
    dry_run: bool,
    /// PWM frequency in Hz
    #[clap(long, default_value_t = 20_000.0)]
    pwm_frequency: f64,
    /// GPIO of motor 1's direction (PHASE) line
    #[clap(long, default_value_t = 5)]
    m1_dir: u8,
    /// GPIO of motor 2's direction (PHASE) line
    #[clap(long, default_value_t = 6)]
    m2_dir: u8,
}

impl Opts {
    fn policy(&self) -> FaultPolicy {
        if self.strict { FaultPolicy::Strict } else { FaultPolicy::Compat }
    }

    fn pins(&self) -> PinConfig {
        PinConfig {
            pwm_frequency: self.pwm_frequency,
            m1_dir: self.m1_dir,
            m2_dir: self.m2_dir,
        }
    }
}

fn parse_channel(s: &str) -> Result<MotorChannel, String> {
    let number: u8 = s.parse().map_err(|_| format!("`{s}` is not a channel number"))?;
    MotorChannel::try_from(number).map_err(|n| format!("channel {n} does not exist, expected 1 or 2"))
}

/// Validate the speed, open the controller, apply the speed and report.
///
/// Returns the process exit status. The controller is opened only after the
/// input has been accepted.
fn run<M, F>(
    opts: &Opts,
    open: F,
    out: &mut impl Write,
    err: &mut impl Write,
) -> u8
where
    M: MotorController,
    M::Error: Debug,
    F: FnOnce(&Opts) -> anyhow::Result<M>,
{
    let percent: SpeedPercent = match opts.speed.parse() {
        Ok(percent) => percent,
        Err(e) => {
            tracing::debug!(input = %opts.speed, "rejected speed argument");
            let _ = writeln!(err, "{e}");
            return FaultPolicy::INPUT_EXIT_CODE;
        }
    };

    let mut motor = match open(opts) {
        Ok(motor) => motor,
        Err(e) => {
            let _ = writeln!(err, "Error: {e:#}");
            return 1;
        }
    };

    let result = SpeedCommand::new(&mut motor, opts.channel).apply(percent);
    if let Err(CommandError::Driver(_)) = &result {
        let _ = writeln!(out, "{DRIVER_FAULT_MESSAGE}");
    }
    opts.policy().exit_code(&result)
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    let default_level = if opts.dry_run { LevelFilter::INFO } else { LevelFilter::ERROR };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let code = if opts.dry_run {
        run(&opts, |_| Ok(LoggingMotor), &mut out, &mut err)
    } else {
        run(&opts, |o| hardware::open_drv8835(&o.pins(), o.channel), &mut out, &mut err)
    };
    ExitCode::from(code)
}
