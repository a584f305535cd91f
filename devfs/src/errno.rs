//! Error numbers reported to file-level callers.

use core::fmt;
use uart16550::AccessError;

/// POSIX error number. The discriminant is the positive code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    ENOENT = 2,
    EIO = 5,
    EBADF = 9,
    EACCES = 13,
    EFAULT = 14,
    EBUSY = 16,
    ENODEV = 19,
    EINVAL = 22,
    ENOTTY = 25,
}

impl Errno {
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Kernel-style negative return value.
    pub const fn as_neg(self) -> isize {
        -(self as i32 as isize)
    }
}

impl From<AccessError> for Errno {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Busy => Errno::EBUSY,
            AccessError::InvalidAddress(_)
            | AccessError::AccessDenied { .. }
            | AccessError::SizeMismatch { .. } => Errno::EACCES,
            AccessError::IoFailure(_) => Errno::EIO,
            AccessError::InvalidPosition(_) => Errno::EINVAL,
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Errno::ENOENT => "no such file or directory",
            Errno::EIO => "I/O error",
            Errno::EBADF => "bad file descriptor",
            Errno::EACCES => "permission denied",
            Errno::EFAULT => "bad address",
            Errno::EBUSY => "device or resource busy",
            Errno::ENODEV => "no such device",
            Errno::EINVAL => "invalid argument",
            Errno::ENOTTY => "inappropriate ioctl for device",
        };
        write!(f, "{} ({})", text, self.code())
    }
}

impl core::error::Error for Errno {}
