#![cfg_attr(not(test), no_std)]

//! NMEA 0183 output for Quadrino / I2C_GPS_NAV receivers.
//!
//! The [`nmea`] module turns a register snapshot into `$GPGGA` and `$GPZDA`
//! sentences using integer arithmetic only. [`gps`] reads those snapshots off
//! an I2C bus.

#[macro_use]
mod macros;

pub mod config;
pub mod gps;
pub mod nmea;
pub mod registers;

pub use config::DriverConfig;
pub use gps::{GpsError, QuadrinoGps, Reading, Sentences};
pub use nmea::{LineEnding, NmeaError, Sentence};
pub use registers::{Coordinates, Detail, StatusSnapshot};
