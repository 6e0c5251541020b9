//! Decoded contents of the diagnostics and AGC register

use crate::register::DiagnosticsAgcRegister;

/// Diagnostics flags from the `DIAG_AGC` register (0x3FFD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Automatic gain control value
    ///
    /// 0 means a strong field (magnet close), 255 a weak one (magnet far).
    /// Typical values sit between 60 and 200.
    pub gain: u8,
    /// OCF: the offset compensation algorithm has finished after power-up
    pub offset_compensation_finished: bool,
    /// COF: CORDIC overflow. Angle and magnitude data are invalid while set
    pub cordic_overflow: bool,
    /// Magnetic field too weak
    pub comp_low: bool,
    /// Magnetic field too strong
    pub comp_high: bool,
}

impl Diagnostics {
    /// Decode a raw register value
    #[must_use]
    pub fn new(raw: u16) -> Self {
        let reg = DiagnosticsAgcRegister::new(raw);
        Self {
            gain: reg.agc(),
            offset_compensation_finished: reg.ocf(),
            cordic_overflow: reg.cof(),
            comp_low: reg.comp_low(),
            comp_high: reg.comp_high(),
        }
    }

    /// Check if the magnetic field strength is within acceptable range
    ///
    /// Returns `true` if neither `COMP_HIGH` nor `COMP_LOW` is set
    #[must_use]
    pub const fn magnetic_field_ok(&self) -> bool {
        !self.comp_high && !self.comp_low
    }

    /// Check if data is valid
    ///
    /// Returns `true` if there's no CORDIC overflow and the magnetic
    /// field is within acceptable range
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !self.cordic_overflow && self.magnetic_field_ok()
    }
}

impl From<u16> for Diagnostics {
    fn from(raw: u16) -> Self {
        Self::new(raw)
    }
}
