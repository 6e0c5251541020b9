//! Command and response frame encoding.
//!
//! Every frame on the wire is 16 bits, MSB first:
//!
//! | bit   | command                     | response        |
//! |-------|-----------------------------|-----------------|
//! | 15    | even parity over bits 0..14 | even parity     |
//! | 14    | 1 = read, 0 = write         | error flag      |
//! | 13..0 | register address            | payload         |

use crate::register::Register;

const READ_BIT: u16 = 0x4000;
const PARITY_BIT: u16 = 0x8000;
const ERROR_FLAG: u16 = 0x4000;
pub(crate) const DATA_MASK: u16 = 0x3FFF;

/// The all-zero frame used to clock out the result of the previous command
pub(crate) const NOP_FRAME: u16 = 0x0000;

/// Width covered by the parity bit: the address plus the read/write bit
const PARITY_WIDTH: u32 = 15;

/// Even parity over the low `width` bits of `value`
///
/// Returns `true` when the number of set bits is odd, so that setting the
/// parity bit makes the total count even. Bits at or above `width` are
/// ignored.
#[must_use]
pub const fn even_parity(value: u16, width: u32) -> bool {
    let mask = if width >= 16 {
        u16::MAX
    } else {
        (1u16 << width) - 1
    };
    (value & mask).count_ones() % 2 == 1
}

/// Check that a full 16-bit frame carries an even number of set bits
#[must_use]
pub const fn verify_parity(frame: u16) -> bool {
    frame.count_ones() % 2 == 0
}

const fn with_parity(frame: u16) -> u16 {
    if even_parity(frame, PARITY_WIDTH) {
        frame | PARITY_BIT
    } else {
        frame
    }
}

/// Build the read command frame for `address`
///
/// Only the low 14 bits of `address` are used.
#[must_use]
pub const fn encode_read(address: u16) -> u16 {
    with_parity(READ_BIT | (address & DATA_MASK))
}

/// Build the write command frame for `address`
#[must_use]
pub const fn encode_write(address: u16) -> u16 {
    with_parity(address & DATA_MASK)
}

/// Build the data frame that follows a write command
#[must_use]
pub const fn encode_data(value: u16) -> u16 {
    with_parity(value & DATA_MASK)
}

/// Read command for a known register
#[must_use]
pub fn read_command(register: Register) -> u16 {
    encode_read(u16::from(register))
}

/// Decoded response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    /// The 14-bit payload
    pub payload: u16,
    /// Error flag reported by the sensor for the previous command
    pub error: bool,
    /// Whether the frame had even parity
    pub parity_ok: bool,
}

/// Split a response frame into payload and flags
#[must_use]
pub const fn decode_response(frame: u16) -> Response {
    Response {
        payload: frame & DATA_MASK,
        error: frame & ERROR_FLAG != 0,
        parity_ok: verify_parity(frame),
    }
}
