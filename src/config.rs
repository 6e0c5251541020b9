//! Driver configuration

use embedded_hal::spi::{MODE_1, Mode};

/// Highest SPI clock the sensor supports
pub const MAX_FREQUENCY_HZ: u32 = 10_000_000;

/// Bit order on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first, as the sensor expects
    #[default]
    MsbFirst,
    LsbFirst,
}

/// SPI parameters for the host to apply to its bus peripheral
///
/// embedded-hal has no runtime reconfiguration, so the driver only validates
/// and carries these values. Read them back with
/// [`As5048a::bus_config`](crate::As5048a::bus_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub frequency_hz: u32,
    pub bit_order: BitOrder,
    pub mode: Mode,
}

impl BusConfig {
    /// Check the clock against the sensor's limits
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.frequency_hz > 0 && self.frequency_hz <= MAX_FREQUENCY_HZ
    }
}

impl Default for BusConfig {
    /// 1 MHz, MSB first, SPI mode 1
    fn default() -> Self {
        Self {
            frequency_hz: 1_000_000,
            bit_order: BitOrder::MsbFirst,
            mode: MODE_1,
        }
    }
}

/// Driver configuration
///
/// | field                   | default |
/// |-------------------------|---------|
/// | `null_zone`             | 3 tics  |
/// | `bus`                   | [`BusConfig::default`] |
/// | `inter_frame_delay_us`  | 100 µs  |
/// | `check_response_parity` | `false` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Smallest change in tics the debounced readings follow
    pub null_zone: u16,
    pub bus: BusConfig,
    /// Gap between consecutive frames of one exchange; the sensor misses
    /// frames that follow each other more closely
    pub inter_frame_delay_us: u32,
    /// Reject response frames with odd parity
    pub check_response_parity: bool,
}

impl Config {
    #[must_use]
    pub const fn with_null_zone(mut self, null_zone: u16) -> Self {
        self.null_zone = null_zone;
        self
    }

    #[must_use]
    pub const fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    #[must_use]
    pub const fn with_inter_frame_delay_us(mut self, delay_us: u32) -> Self {
        self.inter_frame_delay_us = delay_us;
        self
    }

    #[must_use]
    pub const fn with_response_parity_check(mut self, enabled: bool) -> Self {
        self.check_response_parity = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            null_zone: 3,
            bus: BusConfig::default(),
            inter_frame_delay_us: 100,
            check_response_parity: false,
        }
    }
}
