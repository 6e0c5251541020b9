//! Driver for the AS5048A 14-bit magnetic rotary position sensor.
//!
//! Besides raw register access it keeps a per-sensor angle estimate: null-zone
//! debounced, exponentially smoothed, or the circular mean of several readings,
//! all correct across the 0/16383 seam.

#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

// Must come first so the logging macros are visible to the other modules.
#[macro_use]
mod fmt;

mod angle;
mod average;
mod codec;
mod config;
mod diagnostics;
mod driver;
mod error;
mod filter;
mod register;
mod transport;

pub use angle::{ANGLE_MAX, Angle, TIC_RADIANS, tic_distance};
pub use average::CircularMean;
pub use codec::{Response, decode_response, encode_data, encode_read, encode_write, even_parity};
pub use config::{BitOrder, BusConfig, Config, MAX_FREQUENCY_HZ};
pub use diagnostics::Diagnostics;
pub use driver::As5048a;
pub use error::Error;
pub use filter::{SensorState, blend_exponential, debounce};
pub use register::{ErrorFlags, Register};
