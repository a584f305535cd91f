//! Single-owner access to one IOb-UART16550 instance.
//!
//! A [`CsrDevice`] is either closed or held by exactly one [`CsrHandle`].
//! Every register access made through the handle is checked against the
//! address-slot view of the register map before it reaches the CSR core:
//!
//! 1. no slot at the address: [`AccessError::InvalidAddress`]
//! 2. direction not permitted by the slot: [`AccessError::AccessDenied`]
//! 3. width differs from the slot width: [`AccessError::SizeMismatch`]
//!
//! Addresses 0 and 1 are resolved through the Line Control mode bit in
//! effect at the time of the access.

use crate::error::AccessError;
use crate::hal::raw_io::RawIo;
use crate::hw::uart16550::{Access, WINDOW, describe};
use crate::peripheral::uart16550::Csrs;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use common::sync::{ExclusiveFlag, SpinLock};

/// Type-erased bus a device drives.
pub type DynBus = Box<dyn RawIo + Send>;

/// One peripheral instance and its open-ownership token.
pub struct CsrDevice {
    name: String,
    owner: ExclusiveFlag,
    csrs: SpinLock<Csrs<DynBus>>,
    window: u64,
}

impl CsrDevice {
    pub fn new(name: impl Into<String>, bus: impl RawIo + Send + 'static, base: u32) -> Self {
        Self {
            name: name.into(),
            owner: ExclusiveFlag::new(),
            csrs: SpinLock::new(Csrs::new(Box::new(bus), base)),
            window: WINDOW,
        }
    }

    /// Overrides the addressable window, e.g. with the size of the
    /// resource the instance was found at.
    pub fn with_window(mut self, window: u64) -> Self {
        self.window = window;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn is_open(&self) -> bool {
        self.owner.is_held()
    }

    /// Takes the ownership token. Fails with `Busy` rather than waiting.
    pub fn open(self: &Arc<Self>) -> Result<CsrHandle, AccessError> {
        if !self.owner.try_acquire() {
            log::info!("[uart16550] {}: open rejected, device busy", self.name);
            return Err(AccessError::Busy);
        }

        log::info!("[uart16550] {}: opened", self.name);
        Ok(CsrHandle {
            device: Arc::clone(self),
            pos: 0,
        })
    }
}

/// Origin for [`CsrHandle::seek`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeekFrom {
    Start(u64),
    Current(i64),
    /// Relative to the end of the addressable window.
    End(i64),
}

/// Data carried by an [`AccessRequest`].
#[derive(Debug)]
pub enum Payload<'a> {
    /// Destination for the value read.
    Read(&'a mut [u8]),
    /// Little-endian value to write.
    Write(&'a [u8]),
}

impl Payload<'_> {
    pub fn access(&self) -> Access {
        match self {
            Payload::Read(_) => Access::Read,
            Payload::Write(_) => Access::Write,
        }
    }
}

/// One register access as a transport adapter hands it over.
#[derive(Debug)]
pub struct AccessRequest<'a> {
    pub address: u32,
    pub width_bytes: usize,
    pub payload: Payload<'a>,
}

impl<'a> AccessRequest<'a> {
    /// Read of `buf.len()` bytes at `address`.
    pub fn read(address: u32, buf: &'a mut [u8]) -> Self {
        Self {
            address,
            width_bytes: buf.len(),
            payload: Payload::Read(buf),
        }
    }

    /// Write of `bytes.len()` bytes at `address`.
    pub fn write(address: u32, bytes: &'a [u8]) -> Self {
        Self {
            address,
            width_bytes: bytes.len(),
            payload: Payload::Write(bytes),
        }
    }
}

/// The ownership token of an open [`CsrDevice`].
///
/// Carries the current position for implicit-address reads and writes.
/// Dropping it closes the device.
pub struct CsrHandle {
    device: Arc<CsrDevice>,
    pos: u64,
}

impl CsrHandle {
    pub fn device(&self) -> &Arc<CsrDevice> {
        &self.device
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Validates `request` and performs it. Returns the number of payload
    /// bytes produced (read) or consumed (write).
    pub fn request(&mut self, request: AccessRequest<'_>) -> Result<usize, AccessError> {
        let AccessRequest {
            address,
            width_bytes,
            payload,
        } = request;
        let access = payload.access();
        let name = self.device.name.as_str();

        let Some(slot) = describe(address) else {
            log::warn!("[uart16550] {}: no register at {:#x}", name, address);
            return Err(AccessError::InvalidAddress(address));
        };

        if !slot.direction.allows(access) {
            log::warn!(
                "[uart16550] {}: {:?} of {} not permitted",
                name,
                access,
                slot.name
            );
            return Err(AccessError::AccessDenied { address, access });
        }

        let expected = slot.width_bytes();
        if width_bytes != expected {
            log::warn!(
                "[uart16550] {}: access size {} is not equal to register size {}",
                name,
                width_bytes,
                expected
            );
            return Err(AccessError::SizeMismatch {
                expected,
                requested: width_bytes,
            });
        }

        let mut csrs = self.device.csrs.lock();
        match payload {
            Payload::Read(buf) => {
                let (reg, value) = csrs.read_at(address)?;
                let n = expected.min(buf.len());
                buf[..n].copy_from_slice(&(value as u32).to_le_bytes()[..n]);
                log::debug!("[uart16550] {}: read {}={:#04x}", name, reg.name(), value);
                Ok(n)
            }
            Payload::Write(bytes) => {
                if bytes.len() < expected {
                    return Err(AccessError::SizeMismatch {
                        expected,
                        requested: bytes.len(),
                    });
                }

                let mut word = [0u8; 4];
                word[..expected].copy_from_slice(&bytes[..expected]);
                let value = u32::from_le_bytes(word) as u8;

                let reg = csrs.write_at(address, value)?;
                log::debug!("[uart16550] {}: write {}={:#04x}", name, reg.name(), value);
                Ok(expected)
            }
        }
    }

    /// Reads `buf.len()` bytes from the register at the current position.
    ///
    /// The position is not advanced.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, AccessError> {
        let address = self.address()?;
        self.request(AccessRequest::read(address, buf))
    }

    /// Writes `bytes` to the register at the current position.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, AccessError> {
        let address = self.address()?;
        self.request(AccessRequest::write(address, bytes))
    }

    /// Reads the one-byte register at `address`.
    pub fn read_reg(&mut self, address: u32) -> Result<u8, AccessError> {
        let mut buf = [0u8; 1];
        self.request(AccessRequest::read(address, &mut buf))?;
        Ok(buf[0])
    }

    /// Writes the one-byte register at `address`.
    pub fn write_reg(&mut self, address: u32, value: u8) -> Result<(), AccessError> {
        self.request(AccessRequest::write(address, &[value]))?;
        Ok(())
    }

    /// Moves the current position within `0..=window`.
    ///
    /// A position with no register behind it is accepted here; accessing
    /// it fails with `InvalidAddress`.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, AccessError> {
        let window = i64::try_from(self.device.window).unwrap_or(i64::MAX);
        let target = match pos {
            SeekFrom::Start(offset) => i64::try_from(offset).unwrap_or(i64::MAX),
            SeekFrom::Current(delta) => (self.pos as i64).saturating_add(delta),
            SeekFrom::End(delta) => window.saturating_add(delta),
        };

        if !(0..=window).contains(&target) {
            log::warn!(
                "[uart16550] {}: position {} outside window of {}",
                self.device.name,
                target,
                window
            );
            return Err(AccessError::InvalidPosition(target));
        }

        self.pos = target as u64;
        Ok(self.pos)
    }

    /// Releases the token.
    pub fn close(self) {}

    fn address(&self) -> Result<u32, AccessError> {
        u32::try_from(self.pos).map_err(|_| AccessError::InvalidAddress(u32::MAX))
    }
}

impl Drop for CsrHandle {
    fn drop(&mut self) {
        self.device.owner.release();
        log::info!("[uart16550] {}: closed", self.device.name);
    }
}
