//! Frame-level access to the sensor.
//!
//! The sensor answers each frame with the result of the *previous* one, so
//! every logical request is a short sequence of frames. A sequence runs
//! under `&mut self`: the transport owns the bus, so no other transfer can
//! slip between the frames of one exchange.

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

use crate::error::Error;

/// Owned bus, chip select, and delay for one sensor
#[derive(Debug)]
pub struct Transport<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
    inter_frame_delay_us: u32,
}

impl<SPI, CS, D, SpiE, PinE> Transport<SPI, CS, D>
where
    SPI: SpiBus<u8, Error = SpiE>,
    CS: OutputPin<Error = PinE>,
    D: DelayNs,
{
    pub fn new(spi: SPI, cs: CS, delay: D, inter_frame_delay_us: u32) -> Self {
        Self {
            spi,
            cs,
            delay,
            inter_frame_delay_us,
        }
    }

    pub fn release(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }

    /// Send `frames` back to back, pausing between them, and return what
    /// the sensor clocked out for each one
    pub fn exchange<const N: usize>(
        &mut self,
        frames: [u16; N],
    ) -> Result<[u16; N], Error<SpiE, PinE>> {
        let mut responses = [0u16; N];
        for (i, (&frame, response)) in frames.iter().zip(responses.iter_mut()).enumerate() {
            if i > 0 {
                self.delay.delay_us(self.inter_frame_delay_us);
            }
            *response = self.frame(frame)?;
        }
        Ok(responses)
    }

    /// One chip-select pulse carrying a single 16-bit frame
    ///
    /// Chip select is driven high again even when the transfer fails.
    fn frame(&mut self, frame: u16) -> Result<u16, Error<SpiE, PinE>> {
        let mut buf = frame.to_be_bytes();

        self.cs.set_low().map_err(Error::ChipSelect)?;
        let transfer = self
            .spi
            .transfer_in_place(&mut buf)
            .and_then(|()| self.spi.flush());
        let deselect = self.cs.set_high();

        transfer.map_err(Error::Communication)?;
        deselect.map_err(Error::ChipSelect)?;

        let response = u16::from_be_bytes(buf);
        trace!("Sent 0x{:04X}, received 0x{:04X}", frame, response);
        Ok(response)
    }
}
