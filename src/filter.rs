//! Smoothing state and the filters that update it.

use crate::angle::ANGLE_MAX;

const HALF_TURN: f32 = 8192.0;
const FULL_TURN: f32 = ANGLE_MAX as f32;

/// Per-driver estimation state
///
/// Only the driver's own reading methods mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorState {
    /// Last raw angle sample read from the sensor
    pub last_raw: u16,
    /// Current smoothed angle estimate, in rounded tics
    pub smoothed: u16,
    /// Error flag of the most recent response frame
    pub error: bool,
    /// Minimum change in tics before the estimate follows a new sample
    pub null_zone: u16,
}

impl SensorState {
    /// Fresh state with a zero estimate and no error
    #[must_use]
    pub const fn new(null_zone: u16) -> Self {
        Self {
            last_raw: 0,
            smoothed: 0,
            error: false,
            null_zone,
        }
    }

    /// Blend `raw` into the estimate and return the new estimate
    pub fn apply_exponential(&mut self, raw: u16, factor: f32) -> u16 {
        self.last_raw = raw;
        self.smoothed = blend_exponential(self.smoothed, raw, factor);
        self.smoothed
    }

    /// Adopt `sample` only if it moved outside the null zone
    pub fn apply_debounced(&mut self, raw: u16, sample: u16) -> u16 {
        self.last_raw = raw;
        self.smoothed = debounce(self.smoothed, sample, self.null_zone);
        self.smoothed
    }
}

/// Exponential smoothing of tic values that takes the short way around the seam
///
/// `result = old * (1 - factor) + new * factor`, where a jump of more than
/// half a turn is treated as a wrap past 0/16383 rather than a real move.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_exponential(old: u16, new: u16, factor: f32) -> u16 {
    let old = f32::from(old % ANGLE_MAX);
    let mut new = f32::from(new % ANGLE_MAX);

    if old - new > HALF_TURN {
        new += FULL_TURN;
    } else if new - old > HALF_TURN {
        new -= FULL_TURN;
    }

    let mut result = old * (1.0 - factor) + new * factor;
    if result < 0.0 {
        result += FULL_TURN;
    }
    (libm::roundf(result) as u32 % u32::from(ANGLE_MAX)) as u16
}

/// Null-zone debounce: keep `previous` unless `sample` differs by more than `null_zone`
#[must_use]
pub fn debounce(previous: u16, sample: u16, null_zone: u16) -> u16 {
    if sample.abs_diff(previous) > null_zone {
        sample
    } else {
        previous
    }
}
