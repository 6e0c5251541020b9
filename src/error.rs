/// Error type for AS5048A operations
///
/// A set error flag in a response frame is not an error: it is reported
/// through [`As5048a::has_error`](crate::As5048a::has_error) and identified
/// with [`As5048a::errors`](crate::As5048a::errors).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<S, P> {
    /// Communication error on the SPI bus
    Communication(S),
    /// Chip select pin could not be driven
    ChipSelect(P),
    /// Response frame failed the even parity check (carries the raw frame)
    ResponseParity(u16),
    /// Smoothing factor is not a finite value in `[0, 1]`
    InvalidSmoothingFactor,
    /// A mean angle was requested over zero samples
    NoSamples,
    /// Bus frequency is zero or above the sensor's 10 MHz limit
    InvalidBusConfig,
}
