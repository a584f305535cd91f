//! Register access errors.

use crate::hal::raw_io::IoError;
use crate::hw::uart16550::Access;
use core::fmt;

/// Failure of a register access, as surfaced to transport adapters.
///
/// Nothing is retried locally. Repeating a failed transmit write may put
/// a second copy of the byte on the line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The device is already held open by another consumer.
    Busy,
    /// No register is defined at this address.
    InvalidAddress(u32),
    /// The register at `address` does not allow this direction.
    AccessDenied { address: u32, access: Access },
    /// Requested width (bytes) differs from the register width.
    SizeMismatch { expected: usize, requested: usize },
    /// The raw I/O primitive failed.
    IoFailure(IoError),
    /// Repositioning outside the addressable window, or a bad origin.
    InvalidPosition(i64),
}

impl From<IoError> for AccessError {
    fn from(err: IoError) -> Self {
        AccessError::IoFailure(err)
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Busy => write!(f, "device busy"),
            AccessError::InvalidAddress(address) => write!(f, "invalid address {:#x}", address),
            AccessError::AccessDenied { address, access } => {
                write!(f, "{:?} not permitted at {:#x}", access, address)
            }
            AccessError::SizeMismatch {
                expected,
                requested,
            } => write!(
                f,
                "access size {} is not equal to register size {}",
                requested, expected
            ),
            AccessError::IoFailure(err) => write!(f, "I/O failure: {}", err),
            AccessError::InvalidPosition(pos) => write!(f, "invalid position {}", pos),
        }
    }
}

impl core::error::Error for AccessError {}
