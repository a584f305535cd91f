//! x86 port I/O register access.

use super::Backend;
use crate::hal::raw_io::{IoError, RawIo, check_width};
use x86::io::{inb, inl, inw, outb, outl, outw};

/// Legacy COM1 port base.
pub const COM1: u16 = 0x3F8;

/// IOb-UART16550 instances decoded in the I/O port space.
///
/// Addresses passed to [`RawIo`] are offsets from `base`.
pub struct PortBus {
    base: u16,
    size: u16,
}

impl PortBus {
    /// # Safety
    ///
    /// The ports `base..base + size` must belong to the peripheral and
    /// nothing else may drive them.
    pub const unsafe fn new(base: u16, size: u16) -> Self {
        Self { base, size }
    }

    fn port(&self, address: u32, width_bits: u32) -> Result<u16, IoError> {
        check_width(width_bits)?;

        let end = address as u64 + (width_bits / 8) as u64;
        if end > self.size as u64 {
            return Err(IoError::Unmapped { address });
        }

        self.base
            .checked_add(address as u16)
            .ok_or(IoError::Unmapped { address })
    }
}

impl RawIo for PortBus {
    fn read(&mut self, address: u32, width_bits: u32) -> Result<u32, IoError> {
        let port = self.port(address, width_bits)?;

        // SAFETY: `port` is inside the range handed to `new`.
        let value = unsafe {
            match width_bits {
                8 => inb(port) as u32,
                16 => inw(port) as u32,
                _ => inl(port),
            }
        };

        Ok(value)
    }

    fn write(&mut self, address: u32, width_bits: u32, value: u32) -> Result<(), IoError> {
        let port = self.port(address, width_bits)?;

        // SAFETY: as for `read`.
        unsafe {
            match width_bits {
                8 => outb(port, value as u8),
                16 => outw(port, value as u16),
                _ => outl(port, value),
            }
        }

        Ok(())
    }
}

impl Backend for PortBus {
    unsafe fn attach(phys_base: usize, size: usize) -> Self {
        unsafe { Self::new(phys_base as u16, size.min(u16::MAX as usize) as u16) }
    }
}
