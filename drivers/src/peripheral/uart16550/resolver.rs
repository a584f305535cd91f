//! Divisor-latch access bit save/restore.
//!
//! Addresses 0 and 1 decode different registers depending on Line Control
//! bit 7. [`DlabScope`] forces that bit for the duration of one access and
//! puts the caller's Line Control value back on every exit path.

use crate::error::AccessError;
use crate::hal::raw_io::{RawIo, offset_address};
use crate::hw::uart16550::bits::LineControl;
use crate::hw::uart16550::{CSR_W, LC_ADDR, Mode};

/// Line Control saved on entry, restored on exit.
///
/// [`DlabScope::restore`] is the success path and reports a failing
/// restore. Dropping the scope without calling it restores on a
/// best-effort basis: the failure is logged and swallowed, since the
/// caller is already unwinding with the primary error.
pub struct DlabScope<'a, B: RawIo> {
    bus: &'a mut B,
    base: u32,
    lc: u32,
    saved: u8,
    restored: bool,
}

impl<'a, B: RawIo> DlabScope<'a, B> {
    /// Reads Line Control at `base` and writes it back with bit 7 set to `dlab`.
    ///
    /// If either step fails Line Control is unchanged and no scope is
    /// created.
    pub fn enter(bus: &'a mut B, base: u32, dlab: bool) -> Result<Self, AccessError> {
        let lc = offset_address(base, LC_ADDR)?;
        let saved = bus.read(lc, CSR_W)? as u8;

        let mut forced = LineControl::from_bits_retain(saved);
        forced.set(LineControl::DLAB, dlab);
        bus.write(lc, CSR_W, forced.bits() as u32)?;

        Ok(Self {
            bus,
            base,
            lc,
            saved,
            restored: false,
        })
    }

    /// Line Control value seen on entry.
    pub fn saved(&self) -> u8 {
        self.saved
    }

    /// Reads the register at `offset` while the forced mode is in effect.
    pub fn read(&mut self, offset: u32) -> Result<u8, AccessError> {
        let address = offset_address(self.base, offset)?;
        Ok(self.bus.read(address, CSR_W)? as u8)
    }

    /// Writes the register at `offset` while the forced mode is in effect.
    pub fn write(&mut self, offset: u32, value: u8) -> Result<(), AccessError> {
        let address = offset_address(self.base, offset)?;
        self.bus.write(address, CSR_W, value as u32)?;
        Ok(())
    }

    /// Writes the saved Line Control value back.
    pub fn restore(mut self) -> Result<(), AccessError> {
        self.restored = true;
        self.bus.write(self.lc, CSR_W, self.saved as u32)?;
        Ok(())
    }
}

impl<B: RawIo> Drop for DlabScope<'_, B> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }

        if let Err(err) = self.bus.write(self.lc, CSR_W, self.saved as u32) {
            log::warn!(
                "[uart16550] failed to restore LC={:#04x} at {:#x}: {}",
                self.saved,
                self.lc,
                err
            );
        }
    }
}

/// Runs `f` with the mode bit forced as `mode` requires.
///
/// Registers with [`Mode::Any`] bypass the save/restore and run against
/// the bus directly.
pub fn with_mode<B, T>(
    bus: &mut B,
    base: u32,
    mode: Mode,
    f: impl FnOnce(&mut Accessor<'_, '_, B>) -> Result<T, AccessError>,
) -> Result<T, AccessError>
where
    B: RawIo,
{
    match mode.required_dlab() {
        None => f(&mut Accessor::Direct { bus, base }),
        Some(dlab) => {
            let mut scope = DlabScope::enter(bus, base, dlab)?;
            let value = f(&mut Accessor::Scoped(&mut scope))?;
            scope.restore()?;
            Ok(value)
        }
    }
}

/// Register access, either straight to the bus or inside a [`DlabScope`].
pub enum Accessor<'s, 'a, B: RawIo> {
    Direct { bus: &'s mut B, base: u32 },
    Scoped(&'s mut DlabScope<'a, B>),
}

impl<B: RawIo> Accessor<'_, '_, B> {
    pub fn read(&mut self, offset: u32) -> Result<u8, AccessError> {
        match self {
            Accessor::Direct { bus, base } => {
                let address = offset_address(*base, offset)?;
                Ok(bus.read(address, CSR_W)? as u8)
            }
            Accessor::Scoped(scope) => scope.read(offset),
        }
    }

    pub fn write(&mut self, offset: u32, value: u8) -> Result<(), AccessError> {
        match self {
            Accessor::Direct { bus, base } => {
                let address = offset_address(*base, offset)?;
                bus.write(address, CSR_W, value as u32)?;
                Ok(())
            }
            Accessor::Scoped(scope) => scope.write(offset, value),
        }
    }
}
