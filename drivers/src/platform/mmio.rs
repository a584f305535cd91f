//! Memory-mapped register access.

use super::Backend;
use crate::hal::raw_io::{IoError, RawIo, check_width};
use core::ptr::{read_volatile, write_volatile};

/// A memory-mapped window holding one or more IOb-UART16550 instances.
///
/// Addresses passed to [`RawIo`] are byte offsets into the window.
/// Accesses that would run past its end fail with [`IoError::Unmapped`]
/// instead of touching memory.
pub struct MmioBus {
    base: usize,
    size: usize,
}

impl MmioBus {
    /// # Safety
    ///
    /// - `base` must point to a mapped region of at least `size` bytes
    ///   with device memory attributes
    /// - Nothing else may drive the registers in that region
    pub const unsafe fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    fn ptr(&self, address: u32, width_bits: u32) -> Result<usize, IoError> {
        check_width(width_bits)?;

        let offset = address as usize;
        let bytes = (width_bits / 8) as usize;
        match offset.checked_add(bytes) {
            Some(end) if end <= self.size => {}
            _ => return Err(IoError::Unmapped { address }),
        }
        if offset % bytes != 0 {
            return Err(IoError::Fault { address });
        }

        self.base
            .checked_add(offset)
            .ok_or(IoError::Unmapped { address })
    }
}

impl RawIo for MmioBus {
    fn read(&mut self, address: u32, width_bits: u32) -> Result<u32, IoError> {
        let ptr = self.ptr(address, width_bits)?;

        // SAFETY: `ptr` lies inside the window `new` was promised, and is
        // aligned for the access width.
        let value = unsafe {
            match width_bits {
                8 => read_volatile(ptr as *const u8) as u32,
                16 => read_volatile(ptr as *const u16) as u32,
                _ => read_volatile(ptr as *const u32),
            }
        };

        Ok(value)
    }

    fn write(&mut self, address: u32, width_bits: u32, value: u32) -> Result<(), IoError> {
        let ptr = self.ptr(address, width_bits)?;

        // SAFETY: as for `read`.
        unsafe {
            match width_bits {
                8 => write_volatile(ptr as *mut u8, value as u8),
                16 => write_volatile(ptr as *mut u16, value as u16),
                _ => write_volatile(ptr as *mut u32, value),
            }
        }

        Ok(())
    }
}

impl Backend for MmioBus {
    unsafe fn attach(phys_base: usize, size: usize) -> Self {
        unsafe { Self::new(phys_base, size) }
    }
}

// SAFETY: the bus is a plain address range; exclusive use is the
// caller's contract from `new`.
unsafe impl Send for MmioBus {}
