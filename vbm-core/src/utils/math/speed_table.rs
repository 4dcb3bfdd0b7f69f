//! Calibration from speed percentage to DRV8835 speed units.
//!
//! The driver accepts speeds in `0..=480` (its PWM range). `SPEED_TABLE` maps each
//! whole percentage onto that range and is the only place the calibration lives.
//!
//! # Example
//! ```rust
//! use vbm_core::utils::math::speed_table::SpeedPercent;
//! let percent: SpeedPercent = "50".parse().unwrap();
//! assert_eq!(percent.device_speed().get(), 240);
//! ```
use core::fmt;
use core::str::FromStr;

/// Full-scale device speed (100 %).
pub const MAX_DEVICE_SPEED: u16 = 480;

/// Device speed for every percentage `0..=100`, monotonically non-decreasing.
#[rustfmt::skip]
pub const SPEED_TABLE: [u16; 101] = [
      0,   4,   9,  14,  19,  24,  28,  33,  38,  43,
     48,  52,  57,  62,  67,  72,  76,  81,  86,  91,
     96, 100, 105, 110, 115, 120, 124, 129, 134, 139,
    144, 148, 153, 158, 163, 168, 172, 177, 182, 187,
    192, 196, 201, 206, 211, 216, 220, 225, 230, 235,
    240, 244, 249, 254, 259, 264, 268, 273, 278, 283,
    288, 292, 297, 302, 307, 312, 316, 321, 326, 331,
    336, 340, 345, 350, 355, 360, 364, 369, 374, 379,
    384, 388, 393, 398, 403, 408, 412, 417, 422, 427,
    432, 436, 441, 446, 451, 456, 460, 465, 470, 475,
    480,
];

/// Reasons a speed argument is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedError {
    /// The argument is not an integer.
    Malformed,
    /// The argument is an integer outside `0..=100`.
    OutOfRange,
}

impl fmt::Display for SpeedError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            SpeedError::Malformed => f.write_str("Invalid speed input! Only integers 0-100 accepted"),
            SpeedError::OutOfRange => f.write_str("Invalid speed input! Only 0-100 accepted"),
        }
    }
}

/// A validated speed percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpeedPercent(u8);

impl SpeedPercent {
    pub const MAX: u8 = 100;

    /// Validate a raw percentage.
    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= Self::MAX {
            Some(Self(percent))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Look up the calibrated device speed for this percentage.
    pub const fn device_speed(self) -> DeviceSpeed {
        // `self.0 <= 100` holds by construction, so the index is in bounds.
        DeviceSpeed(SPEED_TABLE[self.0 as usize])
    }
}

impl TryFrom<i64> for SpeedPercent {
    type Error = SpeedError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(SpeedPercent::new)
            .ok_or(SpeedError::OutOfRange)
    }
}

impl FromStr for SpeedPercent {
    type Err = SpeedError;

    /// Parse a decimal integer. Surrounding whitespace, a leading sign and single
    /// `_` separators between digits are allowed.
    ///
    /// Integers too large for `i64` are reported as out of range, not malformed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpeedPercent::try_from(parse_integer(s)?)
    }
}

fn parse_integer(s: &str) -> Result<i64, SpeedError> {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut overflow = false;
    let mut after_digit = false;
    for b in digits.bytes() {
        match b {
            b'0'..=b'9' => {
                let d = i64::from(b - b'0');
                let next = value.checked_mul(10).and_then(|v| {
                    if negative { v.checked_sub(d) } else { v.checked_add(d) }
                });
                match next {
                    Some(v) => value = v,
                    None => overflow = true,
                }
                after_digit = true;
            }
            b'_' if after_digit => after_digit = false,
            _ => return Err(SpeedError::Malformed),
        }
    }

    // empty, or ends on a separator
    if !after_digit {
        return Err(SpeedError::Malformed);
    }
    if overflow { Err(SpeedError::OutOfRange) } else { Ok(value) }
}

/// Speed in driver units, the value handed to `MotorController::set_speed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeviceSpeed(u16);

impl DeviceSpeed {
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<SpeedPercent> for DeviceSpeed {
    fn from(percent: SpeedPercent) -> Self {
        percent.device_speed()
    }
}

impl From<DeviceSpeed> for i16 {
    fn from(speed: DeviceSpeed) -> Self {
        // Table entries never exceed MAX_DEVICE_SPEED.
        speed.0 as i16
    }
}
