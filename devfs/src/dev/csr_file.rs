use super::ioctl;
use crate::errno::Errno;
use crate::file::{FileOperations, OpenFlags, SEEK_CUR, SEEK_END, SEEK_SET};
use alloc::sync::Arc;
use uart16550::{CsrDevice, CsrHandle, SeekFrom};

/// `/dev/iob_uart16550` - the file position selects the register.
///
/// Holding a `CsrFile` holds the device; a second open fails with
/// `EBUSY` until this one is dropped.
pub struct CsrFile {
    handle: CsrHandle,
    flags: OpenFlags,
}

impl CsrFile {
    pub fn open(device: &Arc<CsrDevice>, flags: OpenFlags) -> Result<Self, Errno> {
        let handle = device.open().map_err(|err| {
            log::info!("[devfs] {}: another process is accessing the device", device.name());
            Errno::from(err)
        })?;

        Ok(Self { handle, flags })
    }

    pub fn position(&self) -> u64 {
        self.handle.position()
    }

    /// Closes the file and releases the device.
    pub fn release(self) {
        self.handle.close();
    }
}

impl FileOperations for CsrFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        if !self.flags.readable() {
            return Err(Errno::EBADF);
        }

        Ok(self.handle.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        if !self.flags.writable() {
            return Err(Errno::EBADF);
        }

        Ok(self.handle.write(buf)?)
    }

    fn llseek(&mut self, offset: i64, whence: i32) -> Result<u64, Errno> {
        let pos = match whence {
            SEEK_SET => SeekFrom::Start(u64::try_from(offset).map_err(|_| Errno::EINVAL)?),
            SEEK_CUR => SeekFrom::Current(offset),
            SEEK_END => SeekFrom::End(offset),
            _ => return Err(Errno::EINVAL),
        };

        Ok(self.handle.seek(pos)?)
    }

    fn ioctl(&mut self, cmd: u32, arg: &mut [u8]) -> Result<(), Errno> {
        ioctl::dispatch(&mut self.handle, cmd, arg)
    }
}
