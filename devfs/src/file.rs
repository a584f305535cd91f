use crate::errno::Errno;
use bitflags::bitflags;

/// `whence` values for [`FileOperations::llseek`].
pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

/// File operations trait
///
/// Dropping the boxed file is `release`.
pub trait FileOperations: Send {
    /// Read from the file
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Write to the file
    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno>;

    /// Reposition (optional, default not supported)
    fn llseek(&mut self, _offset: i64, _whence: i32) -> Result<u64, Errno> {
        Err(Errno::EINVAL)
    }

    /// Device control (optional, default not supported)
    fn ioctl(&mut self, _cmd: u32, _arg: &mut [u8]) -> Result<(), Errno> {
        Err(Errno::ENOTTY)
    }
}

bitflags! {
    /// Open flags for files
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const WRONLY = 1;
        const RDWR = 1 << 1;
    }
}

impl OpenFlags {
    pub const RDONLY: Self = Self::empty();

    pub fn readable(self) -> bool {
        !self.contains(OpenFlags::WRONLY)
    }

    pub fn writable(self) -> bool {
        self.intersects(OpenFlags::WRONLY | OpenFlags::RDWR)
    }
}
