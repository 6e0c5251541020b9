//! Angle value type: tic count, radians, and unit-circle point kept in step.

use core::f32::consts::TAU;

/// Number of distinct positions per revolution (14-bit: 0-16383)
pub const ANGLE_MAX: u16 = 0x3FFF + 1;

/// Angular size of one tic in radians
pub const TIC_RADIANS: f32 = TAU / ANGLE_MAX as f32;

/// An absolute angle in one revolution
///
/// Built from any one representation, the other two are derived at
/// construction so they always agree.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Angle {
    tics: u16,
    radians: f32,
    x: f32,
    y: f32,
}

impl Angle {
    /// Angle from a tic count, taken modulo [`ANGLE_MAX`]
    #[must_use]
    pub fn from_tics(tics: u16) -> Self {
        let tics = tics % ANGLE_MAX;
        let radians = f32::from(tics) * TIC_RADIANS;
        Self {
            tics,
            radians,
            x: libm::cosf(radians),
            y: libm::sinf(radians),
        }
    }

    /// Angle from radians, normalized into `[0, 2π)` before digitizing
    #[must_use]
    pub fn from_radians(radians: f32) -> Self {
        let radians = normalize_radians(radians);
        Self {
            tics: radians_to_tics(radians),
            radians,
            x: libm::cosf(radians),
            y: libm::sinf(radians),
        }
    }

    /// Angle of the point `(x, y)` as seen from the origin
    ///
    /// The stored point is projected onto the unit circle. The origin itself
    /// has no direction and maps to angle zero.
    #[must_use]
    pub fn from_point(x: f32, y: f32) -> Self {
        let radius = libm::hypotf(x, y);
        if radius == 0.0 {
            return Self::from_tics(0);
        }
        let radians = normalize_radians(libm::atan2f(y, x));
        Self {
            tics: radians_to_tics(radians),
            radians,
            x: x / radius,
            y: y / radius,
        }
    }

    /// Tic count in `[0, 16383]`
    #[must_use]
    pub const fn tics(&self) -> u16 {
        self.tics
    }

    /// Radians in `[0, 2π)`
    #[must_use]
    pub const fn radians(&self) -> f32 {
        self.radians
    }

    /// Degrees in `[0, 360)`
    #[must_use]
    pub fn degrees(&self) -> f32 {
        self.radians.to_degrees()
    }

    /// Point on the unit circle
    #[must_use]
    pub const fn point(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl From<u16> for Angle {
    fn from(tics: u16) -> Self {
        Self::from_tics(tics)
    }
}

/// Shortest distance in tics between two positions, across the 0/16383 seam
#[must_use]
pub fn tic_distance(a: u16, b: u16) -> u16 {
    let diff = (a % ANGLE_MAX).abs_diff(b % ANGLE_MAX);
    diff.min(ANGLE_MAX - diff)
}

fn normalize_radians(radians: f32) -> f32 {
    let wrapped = libm::fmodf(radians, TAU);
    let wrapped = if wrapped < 0.0 { wrapped + TAU } else { wrapped };
    // Adding TAU to a tiny negative value can round up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn radians_to_tics(radians: f32) -> u16 {
    let tics = libm::roundf(radians / TIC_RADIANS) as u32;
    (tics % u32::from(ANGLE_MAX)) as u16
}
