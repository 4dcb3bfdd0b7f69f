//! Speed calibration and motor drivers for the depth-camera vibration motor on
//! no-std and hosted platforms.
//!
//! The `speed-cmd` binary under `vbm-app/` is the command-line front end.
#![cfg_attr(not(test), no_std)]

pub mod utils;
