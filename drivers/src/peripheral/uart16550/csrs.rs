//! IOb-UART16550 CSR access core.
//!
//! One logical register access per call. Registers sharing addresses 0
//! and 1 go through [`resolver::with_mode`], everything else straight to
//! the bus.

use super::resolver;
use crate::error::AccessError;
use crate::hal::raw_io::{RawIo, offset_address};
use crate::hw::uart16550::bits::LineControl;
use crate::hw::uart16550::{Access, CSR_W, LC_ADDR, Register, is_multiplexed};

/// Register accessor bound to one instance base address.
///
/// Not synchronized: correct only while a single owner drives it (see
/// [`CsrDevice`](crate::csr_device::CsrDevice)).
pub struct Csrs<B: RawIo> {
    bus: B,
    base: u32,
}

impl<B: RawIo> Csrs<B> {
    pub const fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Retargets later accesses to the instance at `base`. Returns the previous base.
    pub fn set_base(&mut self, base: u32) -> u32 {
        core::mem::replace(&mut self.base, base)
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Reads `reg`, forcing the mode bit it needs for the duration of the access.
    pub fn get(&mut self, reg: Register) -> Result<u8, AccessError> {
        if !reg.direction().allows(Access::Read) {
            return Err(AccessError::AccessDenied {
                address: reg.address(),
                access: Access::Read,
            });
        }

        resolver::with_mode(&mut self.bus, self.base, reg.mode(), |io| {
            io.read(reg.address())
        })
    }

    /// Writes `value` to `reg`, forcing the mode bit it needs for the duration of the access.
    pub fn set(&mut self, reg: Register, value: u8) -> Result<(), AccessError> {
        if !reg.direction().allows(Access::Write) {
            return Err(AccessError::AccessDenied {
                address: reg.address(),
                access: Access::Write,
            });
        }

        resolver::with_mode(&mut self.bus, self.base, reg.mode(), |io| {
            io.write(reg.address(), value)
        })
    }

    /// Current state of Line Control bit 7.
    pub fn dlab(&mut self) -> Result<bool, AccessError> {
        let address = offset_address(self.base, LC_ADDR)?;
        let lc = self.bus.read(address, CSR_W)? as u8;
        Ok(LineControl::from_bits_retain(lc).contains(LineControl::DLAB))
    }

    /// Register decoded for `access` at `address` in the current mode.
    pub fn resolve(&mut self, address: u32, access: Access) -> Result<Register, AccessError> {
        let dlab = if is_multiplexed(address) {
            self.dlab()?
        } else {
            false
        };

        Register::from_access(address, access, dlab)
            .ok_or(AccessError::AccessDenied { address, access })
    }

    /// Reads whatever register `address` decodes right now.
    ///
    /// The mode bit is left as the caller configured it, so addresses 0
    /// and 1 see the divisor latch exactly when Line Control says so.
    pub fn read_at(&mut self, address: u32) -> Result<(Register, u8), AccessError> {
        let reg = self.resolve(address, Access::Read)?;
        let at = offset_address(self.base, address)?;
        let value = self.bus.read(at, CSR_W)? as u8;
        Ok((reg, value))
    }

    /// Writes whatever register `address` decodes right now.
    pub fn write_at(&mut self, address: u32, value: u8) -> Result<Register, AccessError> {
        let reg = self.resolve(address, Access::Write)?;
        let at = offset_address(self.base, address)?;
        self.bus.write(at, CSR_W, value as u32)?;
        Ok(reg)
    }

    pub fn get_rb(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Rb)
    }

    pub fn set_tr(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Tr, value)
    }

    pub fn get_ie(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Ie)
    }

    pub fn set_ie(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Ie, value)
    }

    pub fn get_ii(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Ii)
    }

    pub fn set_fc(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Fc, value)
    }

    pub fn get_lc(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Lc)
    }

    pub fn set_lc(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Lc, value)
    }

    pub fn set_mc(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Mc, value)
    }

    pub fn get_ls(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Ls)
    }

    pub fn get_ms(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Ms)
    }

    pub fn get_sr(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Sr)
    }

    pub fn set_sr(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Sr, value)
    }

    pub fn get_dl1(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Dl1)
    }

    pub fn set_dl1(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Dl1, value)
    }

    pub fn get_dl2(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Dl2)
    }

    pub fn set_dl2(&mut self, value: u8) -> Result<(), AccessError> {
        self.set(Register::Dl2, value)
    }

    pub fn get_db1(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Db1)
    }

    pub fn get_db2(&mut self) -> Result<u8, AccessError> {
        self.get(Register::Db2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::raw_io::IoError;
    use crate::hal::raw_io::mock::MockBus;

    fn csrs() -> Csrs<MockBus> {
        Csrs::new(MockBus::new(64), 0)
    }

    #[test]
    fn set_base_returns_previous_and_retargets() {
        let mut csrs = csrs();
        assert_eq!(csrs.set_base(32), 0);
        csrs.bus_mut().mem[32 + 5] = 0x60;
        assert_eq!(csrs.get_ls().unwrap(), 0x60);
        assert_eq!(csrs.base(), 32);
    }

    #[test]
    fn wrong_direction_is_denied_without_bus_traffic() {
        let mut csrs = csrs();

        assert_eq!(
            csrs.get(Register::Mc),
            Err(AccessError::AccessDenied {
                address: 4,
                access: Access::Read
            })
        );
        assert_eq!(
            csrs.set(Register::Ls, 1),
            Err(AccessError::AccessDenied {
                address: 5,
                access: Access::Write
            })
        );
        assert!(csrs.bus().log.is_empty());
    }

    #[test]
    fn divisor_access_wraps_with_line_control() {
        let mut csrs = csrs();
        csrs.set_lc(0x03).unwrap();
        csrs.bus_mut().log.clear();

        csrs.set_dl1(3).unwrap();

        assert_eq!(
            csrs.bus().log,
            [
                (Access::Read, 3, 0x03),
                (Access::Write, 3, 0x83),
                (Access::Write, 0, 3),
                (Access::Write, 3, 0x03),
            ]
        );
    }

    #[test]
    fn raw_value_is_not_masked() {
        let mut csrs = csrs();
        csrs.bus_mut().mem[2] = 0xC1;
        assert_eq!(csrs.get_ii().unwrap(), 0xC1);
    }

    #[test]
    fn io_failure_propagates_and_line_control_survives() {
        let mut csrs = csrs();
        csrs.set_lc(0x1B).unwrap();
        csrs.bus_mut().fail(Access::Write, 1);

        assert_eq!(
            csrs.set_ie(0x0F),
            Err(AccessError::IoFailure(IoError::Fault { address: 1 }))
        );
        assert_eq!(csrs.get_lc().unwrap(), 0x1B);
    }

    #[test]
    fn address_access_follows_current_mode() {
        let mut csrs = csrs();
        csrs.bus_mut().mem[0] = 0x55;

        assert_eq!(csrs.read_at(0).unwrap(), (Register::Rb, 0x55));

        csrs.set_lc(0x80).unwrap();
        assert_eq!(csrs.read_at(0).unwrap(), (Register::Dl1, 0x55));
        assert_eq!(csrs.write_at(1, 0).unwrap(), Register::Dl2);
        assert_eq!(csrs.get_lc().unwrap(), 0x80);
    }

    #[test]
    fn address_access_rejects_forbidden_direction() {
        let mut csrs = csrs();
        assert_eq!(
            csrs.read_at(4),
            Err(AccessError::AccessDenied {
                address: 4,
                access: Access::Read
            })
        );
    }
}
