//! ioctl command table for `/dev/iob_uart16550`.
//!
//! Commands use the Linux `_IOC` layout with type `'?'`. The command
//! number selects the register slot and direction; the argument is a
//! little-endian word of which only the register's low byte is used.

use crate::errno::Errno;
use uart16550::hw::uart16550::{
    Access, FC_ADDR, IE_ADDR, LC_ADDR, LS_ADDR, MC_ADDR, MS_ADDR, RB_ADDR, VERSION,
};
use uart16550::{AccessRequest, CsrHandle, Payload};

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = 8;
const IOC_SIZESHIFT: u32 = 16;
const IOC_DIRSHIFT: u32 = 30;

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const IOC_MAGIC: u32 = b'?' as u32;
/// Size field of every command: the argument is passed as a pointer.
const IOC_ARG_SIZE: u32 = core::mem::size_of::<usize>() as u32;

const fn ioc(dir: u32, nr: u32) -> u32 {
    (dir << IOC_DIRSHIFT)
        | (IOC_ARG_SIZE << IOC_SIZESHIFT)
        | (IOC_MAGIC << IOC_TYPESHIFT)
        | (nr << IOC_NRSHIFT)
}

const fn iow(nr: u32) -> u32 {
    ioc(IOC_WRITE, nr)
}

const fn ior(nr: u32) -> u32 {
    ioc(IOC_READ, nr)
}

pub const WR_RBR_THR_DLL: u32 = iow(0);
pub const RD_RBR_THR_DLL: u32 = ior(1);
pub const WR_IER_DLM: u32 = iow(2);
pub const RD_IER_DLM: u32 = ior(3);
pub const WR_IIR_FCR: u32 = iow(4);
pub const RD_IIR_FCR: u32 = ior(5);
pub const WR_LCR: u32 = iow(6);
pub const RD_LCR: u32 = ior(7);
pub const WR_MCR: u32 = iow(8);
pub const RD_LSR: u32 = ior(9);
pub const RD_MSR: u32 = ior(10);
pub const RD_VERSION: u32 = ior(11);

/// What a command asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Register { address: u32, access: Access },
    Version,
}

impl Command {
    pub fn decode(cmd: u32) -> Option<Command> {
        let (address, access) = match cmd {
            WR_RBR_THR_DLL => (RB_ADDR, Access::Write),
            RD_RBR_THR_DLL => (RB_ADDR, Access::Read),
            WR_IER_DLM => (IE_ADDR, Access::Write),
            RD_IER_DLM => (IE_ADDR, Access::Read),
            WR_IIR_FCR => (FC_ADDR, Access::Write),
            RD_IIR_FCR => (FC_ADDR, Access::Read),
            WR_LCR => (LC_ADDR, Access::Write),
            RD_LCR => (LC_ADDR, Access::Read),
            WR_MCR => (MC_ADDR, Access::Write),
            RD_LSR => (LS_ADDR, Access::Read),
            RD_MSR => (MS_ADDR, Access::Read),
            RD_VERSION => return Some(Command::Version),
            _ => return None,
        };
        Some(Command::Register { address, access })
    }
}

/// Runs `cmd` against the open device.
///
/// `arg` stands in for the user word; an empty one is `EFAULT`.
pub fn dispatch(handle: &mut CsrHandle, cmd: u32, arg: &mut [u8]) -> Result<(), Errno> {
    let Some(command) = Command::decode(cmd) else {
        log::info!("[devfs] invalid ioctl command {:#x}", cmd);
        return Err(Errno::ENOTTY);
    };

    if arg.is_empty() {
        return Err(Errno::EFAULT);
    }

    match command {
        Command::Register { address, access } => {
            let payload = match access {
                Access::Read => Payload::Read(arg),
                Access::Write => Payload::Write(arg),
            };
            handle.request(AccessRequest {
                address,
                width_bytes: 1,
                payload,
            })?;
        }
        Command::Version => {
            let version = VERSION.to_le_bytes();
            let n = version.len().min(arg.len());
            arg[..n].copy_from_slice(&version[..n]);
        }
    }

    Ok(())
}
