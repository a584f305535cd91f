//! File-level access to the IOb-UART16550.
//!
//! Adapts the single-owner register device to three transports:
//!
//! - [`dev::CsrFile`]: `/dev/iob_uart16550`, read/write at the file
//!   position, `llseek`, and the [`dev::ioctl`] command table
//! - [`sysfs`]: one decimal text attribute per register slot
//! - [`DevFs`]: the path namespace that opens either kind of file
//!
//! Every access ends up in [`CsrHandle::request`](uart16550::CsrHandle::request),
//! so address, direction and width checks are the same whichever
//! transport is used. Failures surface as [`Errno`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod dev;
pub mod errno;
pub mod file;
pub mod sysfs;

pub use errno::Errno;
pub use file::{FileOperations, OpenFlags};

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use dev::CsrFile;
use spin::Once;
use sysfs::SysfsFile;
use uart16550::CsrDevice;
use uart16550::device_manager::devices;
use uart16550::hw::uart16550::slots;

/// Character device node.
pub const DEV_PATH: &str = "/dev/iob_uart16550";
/// Directory holding the register attributes.
pub const SYSFS_DIR: &str = "/sys/class/iob_uart16550/iob_uart16550";

/// Device files for the one supported IOb-UART16550 instance.
pub struct DevFs {
    device: Once<Arc<CsrDevice>>,
}

impl DevFs {
    pub const fn new() -> Self {
        Self {
            device: Once::new(),
        }
    }

    /// Binds `device`. Only one device is supported; later probes fail
    /// with `ENODEV`.
    pub fn probe(&self, device: Arc<CsrDevice>) -> Result<(), Errno> {
        let name = String::from(device.name());
        let mut installed = false;
        self.device.call_once(|| {
            installed = true;
            device
        });

        if !installed {
            log::warn!("[devfs] {}: no more devices allowed", name);
            return Err(Errno::ENODEV);
        }

        log::info!("[devfs] {}: probed, {} and {}/*", name, DEV_PATH, SYSFS_DIR);
        Ok(())
    }

    /// Binds the device registered under `name` in the global registry.
    pub fn probe_registered(&self, name: &str) -> Result<(), Errno> {
        let device = devices().lock().get(name).ok_or(Errno::ENODEV)?;
        self.probe(device)
    }

    pub fn device(&self) -> Option<&Arc<CsrDevice>> {
        self.device.get()
    }

    /// Opens `path`. The returned file is released when dropped.
    pub fn open(&self, path: &str, flags: OpenFlags) -> Result<Box<dyn FileOperations>, Errno> {
        let device = self.device.get().ok_or(Errno::ENODEV)?;

        if path == DEV_PATH {
            return Ok(Box::new(CsrFile::open(device, flags)?));
        }

        match path
            .strip_prefix(SYSFS_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(name) => Ok(Box::new(SysfsFile::open(Arc::clone(device), name, flags)?)),
            None => Err(Errno::ENOENT),
        }
    }

    /// Every path `open` accepts.
    pub fn paths(&self) -> Vec<String> {
        if self.device.get().is_none() {
            return Vec::new();
        }

        core::iter::once(String::from(DEV_PATH))
            .chain(
                slots()
                    .iter()
                    .map(|slot| format!("{}/{}", SYSFS_DIR, slot.name)),
            )
            .collect()
    }
}

impl Default for DevFs {
    fn default() -> Self {
        Self::new()
    }
}
