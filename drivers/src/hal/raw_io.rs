//! Raw Register I/O Hardware Abstraction Layer.
//!
//! The lowest seam of the driver stack: a single synchronous read/write
//! primitive supplied by the platform. Everything above it (register
//! resolution, mode-bit save/restore, ownership) is expressed in terms of
//! these two calls.

use alloc::boxed::Box;
use core::fmt;

/// Raw I/O failures reported by a bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IoError {
    /// The bus reported an error while accessing `address`.
    Fault { address: u32 },
    /// Access width (in bits) not supported by the bus.
    UnsupportedWidth(u32),
    /// No device decodes `address`.
    Unmapped { address: u32 },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Fault { address } => write!(f, "bus fault at {:#x}", address),
            IoError::UnsupportedWidth(bits) => write!(f, "unsupported access width: {} bits", bits),
            IoError::Unmapped { address } => write!(f, "no device at {:#x}", address),
        }
    }
}

impl core::error::Error for IoError {}

/// Raw register access primitive.
///
/// Both calls are synchronous and side-effecting (reading a receive
/// buffer pops data), and never complete partially: on `Err` the device
/// state is unchanged.
pub trait RawIo {
    /// Read `width_bits` bits from `address`, right-aligned in the result.
    fn read(&mut self, address: u32, width_bits: u32) -> Result<u32, IoError>;

    /// Write the low `width_bits` bits of `value` to `address`.
    fn write(&mut self, address: u32, width_bits: u32, value: u32) -> Result<(), IoError>;
}

impl<T: RawIo + ?Sized> RawIo for Box<T> {
    fn read(&mut self, address: u32, width_bits: u32) -> Result<u32, IoError> {
        (**self).read(address, width_bits)
    }

    fn write(&mut self, address: u32, width_bits: u32, value: u32) -> Result<(), IoError> {
        (**self).write(address, width_bits, value)
    }
}

impl<T: RawIo + ?Sized> RawIo for &mut T {
    fn read(&mut self, address: u32, width_bits: u32) -> Result<u32, IoError> {
        (**self).read(address, width_bits)
    }

    fn write(&mut self, address: u32, width_bits: u32, value: u32) -> Result<(), IoError> {
        (**self).write(address, width_bits, value)
    }
}

/// Absolute address of `offset` inside the instance at `base`.
///
/// An instance placed so high that the sum wraps has no register there.
pub fn offset_address(base: u32, offset: u32) -> Result<u32, IoError> {
    base.checked_add(offset)
        .ok_or(IoError::Unmapped { address: base })
}

/// Reject widths other than 8, 16 or 32 bits.
pub fn check_width(width_bits: u32) -> Result<(), IoError> {
    match width_bits {
        8 | 16 | 32 => Ok(()),
        other => Err(IoError::UnsupportedWidth(other)),
    }
}
