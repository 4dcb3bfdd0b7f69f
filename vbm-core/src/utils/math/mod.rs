//! Math utilities for the vibration motor.
//!
//! This module provides the calibration from user-facing speed percentages to
//! DRV8835 speed units.

pub mod speed_table;
