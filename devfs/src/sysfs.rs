//! Per-register text attributes under
//! `/sys/class/iob_uart16550/iob_uart16550/`.
//!
//! One attribute per address slot. `show` prints the register as decimal
//! followed by a newline; `store` takes decimal text and writes its low
//! byte. Each call holds the device only for its single access, so both
//! fail with `EBUSY` while the character device is open.

use crate::errno::Errno;
use crate::file::{FileOperations, OpenFlags};
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use uart16550::CsrDevice;
use uart16550::hw::uart16550::{Access, RegisterDescriptor, slots};

/// Attribute for `name`, if the register map has a slot by that name.
pub fn attribute(name: &str) -> Option<&'static RegisterDescriptor> {
    slots().iter().find(|slot| slot.name == name)
}

/// Reads the register behind `attr` and formats it.
pub fn show(device: &Arc<CsrDevice>, attr: &RegisterDescriptor) -> Result<String, Errno> {
    let mut handle = device.open()?;
    let value = handle.read_reg(attr.address)?;
    log::debug!("[devfs] show {}: {}", attr.name, value);
    Ok(format!("{}\n", value))
}

/// Parses `text` and writes it to the register behind `attr`.
///
/// Returns the number of bytes consumed, always all of `text`.
pub fn store(
    device: &Arc<CsrDevice>,
    attr: &RegisterDescriptor,
    text: &[u8],
) -> Result<usize, Errno> {
    let value = parse(text)?;
    let mut handle = device.open()?;
    handle.write_reg(attr.address, value as u8)?;
    log::debug!("[devfs] store {}: {}", attr.name, value);
    Ok(text.len())
}

fn parse(text: &[u8]) -> Result<u32, Errno> {
    let text = core::str::from_utf8(text).map_err(|_| Errno::EINVAL)?;
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.parse::<u32>().map_err(|_| Errno::EINVAL)
}

/// An open attribute file.
///
/// The value is sampled on the first read and served from that snapshot
/// until the file is closed.
pub struct SysfsFile {
    device: Arc<CsrDevice>,
    attr: &'static RegisterDescriptor,
    flags: OpenFlags,
    text: Option<String>,
    offset: usize,
}

impl SysfsFile {
    pub fn open(device: Arc<CsrDevice>, name: &str, flags: OpenFlags) -> Result<Self, Errno> {
        let attr = attribute(name).ok_or(Errno::ENOENT)?;

        if (flags.readable() && !attr.direction.allows(Access::Read))
            || (flags.writable() && !attr.direction.allows(Access::Write))
        {
            return Err(Errno::EACCES);
        }

        Ok(Self {
            device,
            attr,
            flags,
            text: None,
            offset: 0,
        })
    }

    pub fn name(&self) -> &'static str {
        self.attr.name
    }
}

impl FileOperations for SysfsFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        if !self.flags.readable() {
            return Err(Errno::EBADF);
        }

        if self.text.is_none() {
            self.text = Some(show(&self.device, self.attr)?);
        }
        let text = self.text.as_deref().unwrap_or_default();

        let rest = &text.as_bytes()[self.offset.min(text.len())..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.offset += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        if !self.flags.writable() {
            return Err(Errno::EBADF);
        }

        store(&self.device, self.attr, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_decimal_with_optional_newline() {
        assert_eq!(parse(b"131"), Ok(131));
        assert_eq!(parse(b"3\n"), Ok(3));
        assert_eq!(parse(b"invalid"), Err(Errno::EINVAL));
        assert_eq!(parse(b""), Err(Errno::EINVAL));
        assert_eq!(parse(b"0x10"), Err(Errno::EINVAL));
        assert_eq!(parse(&[0xFF, b'1']), Err(Errno::EINVAL));
    }

    #[test]
    fn attributes_cover_every_slot() {
        for name in [
            "rbr_thr_dll",
            "ier_dlm",
            "iir_fcr",
            "lcr",
            "mcr",
            "lsr",
            "msr",
            "scr",
            "db1",
            "db2",
        ] {
            assert!(attribute(name).is_some(), "{}", name);
        }
        assert!(attribute("nonexistent").is_none());
    }
}
