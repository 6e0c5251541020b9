//! Integration tests for the AS5048A driver using mocked SPI and chip select.

use as5048a::{As5048a, BusConfig, Config, Error, tic_distance};
use embedded_hal::{
    delay::DelayNs,
    spi::{ErrorKind, ErrorType, SpiBus},
};
use embedded_hal_mock::eh1::{
    delay::NoopDelay,
    digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
    spi::{Mock as SpiMock, Transaction as SpiTransaction},
};

/// Helper to set the even parity bit of a 16-bit frame.
fn with_parity(value: u16) -> u16 {
    let bits = value & 0x7FFF;
    if bits.count_ones() % 2 == 1 {
        0x8000 | value
    } else {
        value
    }
}

/// Helper to create a read command frame with parity.
fn read_command(address: u16) -> u16 {
    with_parity(0x4000 | address)
}

/// Helper to create a response frame with parity.
fn response_frame(data: u16, error_flag: bool) -> u16 {
    let frame = if error_flag {
        0x4000 | (data & 0x3FFF)
    } else {
        data & 0x3FFF
    };
    with_parity(frame)
}

/// Expected bus traffic, one chip-select pulse per frame
#[derive(Default)]
struct Expectations {
    spi: Vec<SpiTransaction<u8>>,
    cs: Vec<PinTransaction>,
}

impl Expectations {
    fn frame(&mut self, sent: u16, received: u16) -> &mut Self {
        self.cs.push(PinTransaction::set(PinState::Low));
        self.spi.push(SpiTransaction::transfer_in_place(
            sent.to_be_bytes().to_vec(),
            received.to_be_bytes().to_vec(),
        ));
        self.spi.push(SpiTransaction::flush());
        self.cs.push(PinTransaction::set(PinState::High));
        self
    }

    fn read(&mut self, address: u16, data: u16, error_flag: bool) -> &mut Self {
        self.frame(read_command(address), 0x0000)
            .frame(0x0000, response_frame(data, error_flag))
    }

    fn read_angle(&mut self, tics: u16) -> &mut Self {
        self.read(0x3FFF, tics, false)
    }

    fn write(&mut self, address: u16, data: u16) -> &mut Self {
        self.frame(with_parity(address), 0x0000)
            .frame(with_parity(data), 0x0000)
            .frame(0x0000, response_frame(data, false))
    }

    fn sensor(&self, config: Config) -> As5048a<SpiMock<u8>, PinMock, NoopDelay> {
        As5048a::new(
            SpiMock::new(&self.spi),
            PinMock::new(&self.cs),
            NoopDelay::new(),
            config,
        )
    }
}

fn finish<D: DelayNs>(sensor: As5048a<SpiMock<u8>, PinMock, D>) {
    let (mut spi, mut cs, _) = sensor.release();
    spi.done();
    cs.done();
}

#[test]
fn reads_angle_register() {
    let mut bus = Expectations::default();
    bus.read_angle(0x1234);

    let mut sensor = bus.sensor(Config::default());
    let angle = sensor.raw_angle().unwrap();
    assert_eq!(angle.tics(), 0x1234);
    assert!(!sensor.has_error());

    finish(sensor);
}

#[test]
fn reads_magnitude_register() {
    let mut bus = Expectations::default();
    bus.read(0x3FFE, 0x0ABC, false);

    let mut sensor = bus.sensor(Config::default());
    assert_eq!(sensor.magnitude().unwrap(), 0x0ABC);

    finish(sensor);
}

#[test]
fn reads_diagnostics_register() {
    let mut bus = Expectations::default();
    // OCF set (bit 8), AGC = 128
    bus.read(0x3FFD, 0x0180, false).read(0x3FFD, 0x0C40, false);

    let mut sensor = bus.sensor(Config::default());

    let diag = sensor.diagnostics().unwrap();
    assert_eq!(diag.gain, 128);
    assert!(diag.offset_compensation_finished);
    assert!(diag.is_valid());

    assert_eq!(sensor.gain().unwrap(), 0x40);

    finish(sensor);
}

#[test]
fn error_flag_is_data_not_failure() {
    let mut bus = Expectations::default();
    bus.read(0x3FFF, 0x1234, true).read_angle(0x1235);

    let mut sensor = bus.sensor(Config::default());

    let angle = sensor.raw_angle().unwrap();
    assert_eq!(angle.tics(), 0x1234);
    assert!(sensor.has_error());

    // A clean read overwrites the sticky flag
    sensor.raw_angle().unwrap();
    assert!(!sensor.has_error());

    finish(sensor);
}

#[test]
fn reads_and_clears_error_register() {
    let mut bus = Expectations::default();
    bus.read(0x3FFF, 0x0100, true)
        .frame(0x4001, 0x0000)
        .frame(0x0000, response_frame(0x0005, false))
        .frame(0x0000, response_frame(0x0000, false));

    let mut sensor = bus.sensor(Config::default());
    sensor.raw_angle().unwrap();
    assert!(sensor.has_error());

    let flags = sensor.errors().unwrap();
    assert!(flags.framing_error());
    assert!(!flags.invalid_command());
    assert!(flags.parity_error());
    assert_eq!(flags.bits(), 0b101);
    assert!(!sensor.has_error());

    finish(sensor);
}

#[test]
fn detects_parity_error_when_enabled() {
    // Bits 15, 14 and 0: odd parity
    let bad_response = 0xC001;

    let mut bus = Expectations::default();
    bus.frame(read_command(0x3FFF), 0x0000)
        .frame(0x0000, bad_response);

    let mut sensor = bus.sensor(Config::default().with_response_parity_check(true));
    let result = sensor.raw_angle();
    assert!(matches!(result, Err(Error::ResponseParity(0xC001))));
    assert!(sensor.has_error());

    finish(sensor);
}

#[test]
fn ignores_parity_by_default() {
    let mut bus = Expectations::default();
    bus.frame(read_command(0x3FFF), 0x0000)
        .frame(0x0000, 0x0001);

    let mut sensor = bus.sensor(Config::default());
    assert_eq!(sensor.raw_angle().unwrap().tics(), 1);

    finish(sensor);
}

#[test]
fn exponential_smoothing_wraps_across_seam() {
    let mut bus = Expectations::default();
    bus.read_angle(16380).read_angle(2).read_angle(2);

    let mut sensor = bus.sensor(Config::default());

    assert_eq!(sensor.exp_smooth_angle(1.0).unwrap().tics(), 16380);
    assert_eq!(sensor.exp_smooth_angle(0.5).unwrap().tics(), 16383);
    assert_eq!(sensor.exp_smooth_angle(0.0).unwrap().tics(), 16383);
    assert_eq!(sensor.state().last_raw, 2);

    finish(sensor);
}

#[test]
fn exponential_smoothing_rounds_after_wrapping_negative_blend() {
    let mut bus = Expectations::default();
    bus.read_angle(16383).read_angle(16381);

    let mut sensor = bus.sensor(Config::default());

    // 0 blended halfway toward 16383 is -0.5, i.e. 16383.5, which rounds to the seam
    assert_eq!(sensor.exp_smooth_angle(0.5).unwrap().tics(), 0);
    // 0 halfway toward 16381 is -1.5, i.e. 16382.5
    assert_eq!(sensor.exp_smooth_angle(0.5).unwrap().tics(), 16383);

    finish(sensor);
}

#[test]
fn exponential_smoothing_converges_in_one_step_with_full_factor() {
    let mut bus = Expectations::default();
    bus.read_angle(5000).read_angle(5000);

    let mut sensor = bus.sensor(Config::default());
    assert_eq!(sensor.exp_smooth_angle(1.0).unwrap().tics(), 5000);
    assert_eq!(sensor.exp_smooth_angle(1.0).unwrap().tics(), 5000);

    finish(sensor);
}

#[test]
fn rejects_smoothing_factor_out_of_range() {
    let bus = Expectations::default();
    let mut sensor = bus.sensor(Config::default());

    assert!(matches!(
        sensor.exp_smooth_angle(1.5),
        Err(Error::InvalidSmoothingFactor)
    ));
    assert!(matches!(
        sensor.exp_smooth_angle(-0.1),
        Err(Error::InvalidSmoothingFactor)
    ));
    assert!(matches!(
        sensor.exp_smooth_angle(f32::NAN),
        Err(Error::InvalidSmoothingFactor)
    ));

    finish(sensor);
}

#[test]
fn debounced_angle_ignores_null_zone_jitter() {
    let mut bus = Expectations::default();
    bus.read_angle(2)
        .read_angle(1000)
        .read_angle(1003)
        .read_angle(997)
        .read_angle(996);

    let mut sensor = bus.sensor(Config::default());

    assert_eq!(sensor.angle().unwrap().tics(), 0);
    assert_eq!(sensor.angle().unwrap().tics(), 1000);
    assert_eq!(sensor.angle().unwrap().tics(), 1000);
    assert_eq!(sensor.angle().unwrap().tics(), 1000);
    assert_eq!(sensor.angle().unwrap().tics(), 996);
    assert_eq!(sensor.state().last_raw, 996);

    finish(sensor);
}

#[test]
fn zero_null_zone_follows_every_change() {
    let mut bus = Expectations::default();
    bus.read_angle(1).read_angle(2);

    let mut sensor = bus.sensor(Config::default().with_null_zone(0));
    assert_eq!(sensor.angle().unwrap().tics(), 1);
    assert_eq!(sensor.angle().unwrap().tics(), 2);

    finish(sensor);
}

#[test]
fn mean_angle_across_seam() {
    let mut bus = Expectations::default();
    bus.read_angle(16383).read_angle(0).read_angle(1);

    let mut sensor = bus.sensor(Config::default().with_null_zone(0));
    let mean = sensor.mean_angle(3).unwrap();
    assert!(tic_distance(mean.tics(), 0) <= 1, "mean was {}", mean.tics());
    assert_eq!(sensor.state().smoothed, mean.tics());

    finish(sensor);
}

#[test]
fn mean_angle_applies_null_zone() {
    let mut bus = Expectations::default();
    bus.read_angle(4000)
        .read_angle(4002)
        .read_angle(4001)
        .read_angle(4003);

    let mut sensor = bus.sensor(Config::default());
    assert_eq!(sensor.mean_angle(2).unwrap().tics(), 4001);
    assert_eq!(sensor.mean_angle(2).unwrap().tics(), 4001);

    finish(sensor);
}

#[test]
fn mean_of_opposite_samples_falls_back_to_zero() {
    let mut bus = Expectations::default();
    bus.read_angle(1000).read_angle(0).read_angle(8192);

    let mut sensor = bus.sensor(Config::default());
    assert_eq!(sensor.angle().unwrap().tics(), 1000);
    assert_eq!(sensor.mean_angle(2).unwrap().tics(), 0);

    finish(sensor);
}

#[test]
fn mean_over_no_samples_is_an_error() {
    let bus = Expectations::default();
    let mut sensor = bus.sensor(Config::default());

    assert!(matches!(sensor.mean_angle(0), Err(Error::NoSamples)));

    finish(sensor);
}

#[test]
fn reads_multiple_angles_sequentially() {
    let angles = [0x0000, 0x1000, 0x2000, 0x3000, 0x3FFF];
    let mut bus = Expectations::default();
    for &angle in &angles {
        bus.read_angle(angle);
    }

    let mut sensor = bus.sensor(Config::default());
    for &expected in &angles {
        assert_eq!(sensor.raw_angle().unwrap().tics(), expected);
    }

    finish(sensor);
}

#[test]
fn reads_zero_position() {
    let mut bus = Expectations::default();
    bus.read(0x0016, 0x006A, false).read(0x0017, 0x003C, false);

    let mut sensor = bus.sensor(Config::default());
    assert_eq!(sensor.zero_position().unwrap(), 0x1ABC);

    finish(sensor);
}

#[test]
fn writes_zero_position() {
    let mut bus = Expectations::default();
    bus.write(0x0016, 0x006A).write(0x0017, 0x003C);

    let mut sensor = bus.sensor(Config::default());
    sensor.set_zero_position(0x1ABC).unwrap();
    assert!(!sensor.has_error());

    finish(sensor);
}

#[test]
fn validates_bus_configuration() {
    let bus = Expectations::default();
    let mut sensor = bus.sensor(Config::default());

    let fast = BusConfig {
        frequency_hz: 20_000_000,
        ..BusConfig::default()
    };
    assert!(matches!(
        sensor.configure(fast),
        Err(Error::InvalidBusConfig)
    ));
    assert_eq!(sensor.bus_config(), BusConfig::default());

    let slow = BusConfig {
        frequency_hz: 500_000,
        ..BusConfig::default()
    };
    sensor.configure(slow).unwrap();
    assert_eq!(sensor.bus_config().frequency_hz, 500_000);

    finish(sensor);
}

/// Delay source that records every requested delay
#[derive(Default)]
struct RecordingDelay {
    delays_ns: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ns.push(ns);
    }
}

#[test]
fn waits_between_frames_of_one_exchange() {
    let mut bus = Expectations::default();
    bus.read_angle(0x0100)
        .frame(0x4001, 0x0000)
        .frame(0x0000, 0x0000)
        .frame(0x0000, 0x0000);

    let mut sensor = As5048a::new(
        SpiMock::new(&bus.spi),
        PinMock::new(&bus.cs),
        RecordingDelay::default(),
        Config::default(),
    );
    sensor.raw_angle().unwrap();
    sensor.errors().unwrap();

    let (mut spi, mut cs, delay) = sensor.release();
    spi.done();
    cs.done();
    assert_eq!(delay.delays_ns, vec![100_000; 3]);
}

/// Bus whose every transfer fails
struct FailingBus;

impl ErrorType for FailingBus {
    type Error = ErrorKind;
}

impl SpiBus for FailingBus {
    fn read(&mut self, _words: &mut [u8]) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn write(&mut self, _words: &[u8]) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

#[test]
fn releases_chip_select_when_transfer_fails() {
    let cs_expectations = [
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ];

    let mut sensor = As5048a::new(
        FailingBus,
        PinMock::new(&cs_expectations),
        NoopDelay::new(),
        Config::default(),
    );

    let result = sensor.raw_angle();
    assert!(matches!(result, Err(Error::Communication(ErrorKind::Other))));

    let (_, mut cs, _) = sensor.release();
    cs.done();
}
