//! Blocking driver for the AS5048A magnetic position sensor

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

use crate::{
    angle::Angle,
    average::CircularMean,
    codec::{self, NOP_FRAME},
    config::{BusConfig, Config},
    diagnostics::Diagnostics,
    error::Error,
    filter::SensorState,
    register::{ErrorFlags, Register, ZeroPositionHigh, ZeroPositionLow},
    transport::Transport,
};

/// AS5048A driver instance
///
/// Owns the SPI bus, the chip select pin that identifies this sensor, and
/// a delay source for the gap the sensor needs between frames.
#[derive(Debug)]
pub struct As5048a<SPI, CS, D> {
    transport: Transport<SPI, CS, D>,
    state: SensorState,
    config: Config,
}

impl<SPI, CS, D, SpiE, PinE> As5048a<SPI, CS, D>
where
    SPI: SpiBus<u8, Error = SpiE>,
    CS: OutputPin<Error = PinE>,
    D: DelayNs,
{
    /// Create a new AS5048A driver instance
    pub fn new(spi: SPI, cs: CS, delay: D, config: Config) -> Self {
        Self {
            transport: Transport::new(spi, cs, delay, config.inter_frame_delay_us),
            state: SensorState::new(config.null_zone),
            config,
        }
    }

    /// Release the bus, chip select, and delay, consuming the driver
    pub fn release(self) -> (SPI, CS, D) {
        self.transport.release()
    }

    /// Replace the SPI parameters the host should run the bus with
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBusConfig`] if the clock is zero or above 10 MHz
    pub fn configure(&mut self, bus: BusConfig) -> Result<(), Error<SpiE, PinE>> {
        if !bus.is_valid() {
            warn!("Rejected bus frequency {} Hz", bus.frequency_hz);
            return Err(Error::InvalidBusConfig);
        }
        debug!("Bus configured at {} Hz", bus.frequency_hz);
        self.config.bus = bus;
        Ok(())
    }

    /// SPI parameters the host should run the bus with
    pub fn bus_config(&self) -> BusConfig {
        self.config.bus
    }

    /// Configuration the driver was created with, including bus changes
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current estimation state
    pub fn state(&self) -> &SensorState {
        &self.state
    }

    /// Whether the most recent response carried the sensor's error flag
    ///
    /// Call [`Self::errors`] to find out what went wrong and clear it.
    pub fn has_error(&self) -> bool {
        self.state.error
    }

    /// Read a register
    ///
    /// - Frame 1: send the read command, ignore the response
    /// - Frame 2: send NOP, receive the register contents
    ///
    /// The error flag from the response overwrites [`Self::has_error`]; a set
    /// flag does not make this call fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails, or if parity
    /// checking is enabled and the response has odd parity
    pub fn read_register(&mut self, register: Register) -> Result<u16, Error<SpiE, PinE>> {
        let command = codec::read_command(register);
        let [_, response] = self.transport.exchange([command, NOP_FRAME])?;
        self.accept(response)
    }

    /// Write a register and return the contents the sensor reports back
    ///
    /// - Frame 1: send the write command
    /// - Frame 2: send the data frame
    /// - Frame 3: send NOP, receive the new register contents
    fn write_register(&mut self, register: Register, value: u16) -> Result<u16, Error<SpiE, PinE>> {
        let address = u16::from(register);
        debug!("Writing 0x{:04X} to register 0x{:04X}", value, address);

        let [_, _, response] = self.transport.exchange([
            codec::encode_write(address),
            codec::encode_data(value),
            NOP_FRAME,
        ])?;
        self.accept(response)
    }

    fn accept(&mut self, frame: u16) -> Result<u16, Error<SpiE, PinE>> {
        let response = codec::decode_response(frame);

        if response.error {
            warn!("Sensor error flag set in response 0x{:04X}", frame);
        }
        self.state.error = response.error;

        if self.config.check_response_parity && !response.parity_ok {
            warn!("Parity error in response: 0x{:04X}", frame);
            return Err(Error::ResponseParity(frame));
        }

        Ok(response.payload)
    }

    /// Read and clear the sensor's error register
    ///
    /// Sends the error register read command, then two NOPs: the first
    /// clocks out the register contents, the second completes the clear.
    /// Resets [`Self::has_error`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn errors(&mut self) -> Result<ErrorFlags, Error<SpiE, PinE>> {
        self.state.error = false;
        let [_, contents, _] = self.transport.exchange([
            codec::read_command(Register::ErrorFlag),
            NOP_FRAME,
            NOP_FRAME,
        ])?;

        let flags = ErrorFlags::new(contents & 0x7);
        if !flags.is_clear() {
            warn!("Sensor error register: {:?}", flags);
        }
        Ok(flags)
    }

    /// Get the 14-bit magnitude value from CORDIC
    ///
    /// Useful for checking magnet presence and strength
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn magnitude(&mut self) -> Result<u16, Error<SpiE, PinE>> {
        self.read_register(Register::Magnitude)
    }

    /// One angle reading straight from the sensor, with no filtering
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn raw_angle(&mut self) -> Result<Angle, Error<SpiE, PinE>> {
        self.read_register(Register::Angle).map(Angle::from_tics)
    }

    /// Angle with null-zone debounce
    ///
    /// The stored estimate only follows a new reading when it differs by
    /// more than the configured null zone; otherwise the previous estimate
    /// is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn angle(&mut self) -> Result<Angle, Error<SpiE, PinE>> {
        let raw = self.read_register(Register::Angle)?;
        let previous = self.state.smoothed;
        let tics = self.state.apply_debounced(raw, raw);
        if tics != previous {
            debug!("Angle moved {} -> {}", previous, tics);
        }
        Ok(Angle::from_tics(tics))
    }

    /// Exponentially smoothed angle
    ///
    /// `new = old * (1 - factor) + sample * factor`, taking the short way
    /// around the 0/16383 seam. A factor of 1 follows the sensor exactly and
    /// a factor of 0 freezes the estimate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSmoothingFactor`] if `factor` is not in
    /// `[0, 1]`, or an error if the bus or chip select fails
    pub fn exp_smooth_angle(&mut self, factor: f32) -> Result<Angle, Error<SpiE, PinE>> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(Error::InvalidSmoothingFactor);
        }
        let raw = self.read_register(Register::Angle)?;
        let tics = self.state.apply_exponential(raw, factor);
        trace!("Smoothed sample {} to {}", raw, tics);
        Ok(Angle::from_tics(tics))
    }

    /// Circular mean of `samples` consecutive readings, with null-zone debounce
    ///
    /// Readings are averaged as unit vectors, so samples on both sides of
    /// the seam average to the seam rather than the opposite side. Samples
    /// that cancel out exactly give tic 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSamples`] if `samples` is zero, or an error if the
    /// bus or chip select fails
    pub fn mean_angle(&mut self, samples: u16) -> Result<Angle, Error<SpiE, PinE>> {
        let mut mean = CircularMean::new();
        let mut raw = 0;
        for _ in 0..samples {
            raw = self.read_register(Register::Angle)?;
            mean.push(raw);
        }
        let average = mean.mean().ok_or(Error::NoSamples)?;

        let previous = self.state.smoothed;
        let tics = self.state.apply_debounced(raw, average.tics());
        if tics != previous {
            debug!("Mean angle moved {} -> {}", previous, tics);
        }
        Ok(Angle::from_tics(tics))
    }

    /// Automatic gain control value (0 = strong field, 255 = weak field)
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn gain(&mut self) -> Result<u8, Error<SpiE, PinE>> {
        self.diagnostics().map(|diag| diag.gain)
    }

    /// Get the decoded diagnostics and AGC register
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn diagnostics(&mut self) -> Result<Diagnostics, Error<SpiE, PinE>> {
        self.read_register(Register::AgcDiagnostic)
            .map(Diagnostics::new)
    }

    /// Zero position currently programmed in the volatile registers
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    pub fn zero_position(&mut self) -> Result<u16, Error<SpiE, PinE>> {
        let high = self
            .read_register(Register::ZeroHigh)
            .map(ZeroPositionHigh::new)?;
        let low = self
            .read_register(Register::ZeroLow)
            .map(ZeroPositionLow::new)?;

        Ok((u16::from(high.zero_high()) << 6) | u16::from(low.zero_low()))
    }

    /// Set the zero position in the volatile registers
    ///
    /// Lost on power cycle; OTP programming is not supported.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_zero_position(&mut self, tics: u16) -> Result<(), Error<SpiE, PinE>> {
        let tics = tics % crate::ANGLE_MAX;

        let mut high = ZeroPositionHigh::new(0);
        high.set_zero_high((tics >> 6) as u8);
        let mut low = ZeroPositionLow::new(0);
        low.set_zero_low((tics & 0x3F) as u8);

        self.write_register(Register::ZeroHigh, high.raw())?;
        self.write_register(Register::ZeroLow, low.raw())?;
        Ok(())
    }
}
