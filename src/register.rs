//! Register addresses and bit layouts for the AS5048A sensor.

/// Register addresses for AS5048A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u16)]
pub enum Register {
    /// No operation. Reading it returns the result of the previous command
    Nop = 0x0000,
    /// Error register. Accessing it clears its contents
    ErrorFlag = 0x0001,
    /// Programming control register (OTP enable, burn, verify)
    ProgramControl = 0x0003,
    /// Zero position, upper 8 bits
    ZeroHigh = 0x0016,
    /// Zero position, lower 6 bits
    ZeroLow = 0x0017,
    /// Diagnostics and automatic gain control
    AgcDiagnostic = 0x3FFD,
    /// CORDIC magnitude (14-bit)
    Magnitude = 0x3FFE,
    /// Measured angle with zero position correction (14-bit)
    Angle = 0x3FFF,
}

impl From<Register> for u16 {
    fn from(reg: Register) -> u16 {
        reg as u16
    }
}

bitfield::bitfield! {
    /// Contents of the error register
    ///
    /// Reading the register clears it on the sensor
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ErrorFlags(u16);
    impl Debug;
    u8;
    /// Parity error in the last command frame
    pub parity_error, _: 2;
    /// Invalid command: a read or write to a nonexistent register
    pub invalid_command, _: 1;
    /// Framing error: a non-compliant SPI frame was detected
    pub framing_error, _: 0;
}

impl ErrorFlags {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// The three error bits, `{parity, invalid command, framing}` from high to low
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bits(&self) -> u8 {
        (self.0 & 0x7) as u8
    }

    /// `true` when no error bit is set
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.bits() == 0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u8:#b})", self.bits());
    }
}

bitfield::bitfield! {
    /// DIAG + AGC
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct DiagnosticsAgcRegister(u16);
    impl Debug;
    u8;
    /// Magnetic field too strong; AGC=0x00
    pub comp_high, _: 11;
    /// Magnetic field too weak; AGC=0xFF
    pub comp_low, _: 10;
    /// CORDIC overflow
    pub cof, _: 9;
    /// Offset compensation finished
    pub ocf, _: 8;
    /// Automatic gain control value
    pub agc, _: 7, 0;
}

impl DiagnosticsAgcRegister {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }
}

bitfield::bitfield! {
    /// Zero position, upper byte
    pub struct ZeroPositionHigh(u16);
    impl Debug;
    u8;
    /// 8 most significant bits of the zero position
    pub zero_high, set_zero_high: 7, 0;
}

bitfield::bitfield! {
    /// Zero position, lower bits
    pub struct ZeroPositionLow(u16);
    impl Debug;
    u8;
    /// 6 least significant bits of the zero position
    pub zero_low, set_zero_low: 5, 0;
}

impl ZeroPositionHigh {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }
}

impl ZeroPositionLow {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }
}
