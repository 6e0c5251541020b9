//! Circular mean of tic samples.
//!
//! Averaging tic numbers directly breaks at the seam: 1 and 16383 would
//! average to 8192, the opposite side of the circle. Summing unit vectors
//! instead is correct everywhere.

use crate::angle::Angle;

/// Centroid radius below which the samples are considered to cancel out
const DEGENERATE_RADIUS: f32 = 1e-5;

/// Running sum of unit vectors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircularMean {
    sum_x: f32,
    sum_y: f32,
    count: u32,
}

impl CircularMean {
    /// Empty accumulator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum_x: 0.0,
            sum_y: 0.0,
            count: 0,
        }
    }

    /// Add one raw tic sample
    pub fn push(&mut self, tics: u16) {
        let (x, y) = Angle::from_tics(tics).point();
        self.sum_x += x;
        self.sum_y += y;
        self.count += 1;
    }

    /// Number of samples added so far
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Mean angle, or `None` when no samples were added
    ///
    /// Samples that cancel out (for example two readings half a turn apart)
    /// have no meaningful direction and yield tic 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<Angle> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f32;
        let (x, y) = (self.sum_x / n, self.sum_y / n);
        if libm::hypotf(x, y) < DEGENERATE_RADIUS {
            return Some(Angle::from_tics(0));
        }
        Some(Angle::from_point(x, y))
    }
}

impl Extend<u16> for CircularMean {
    fn extend<I: IntoIterator<Item = u16>>(&mut self, iter: I) {
        for tics in iter {
            self.push(tics);
        }
    }
}
