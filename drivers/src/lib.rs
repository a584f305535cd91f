//! IOb-UART16550 Driver Subsystem
//!
//! Register access and arbitration for the IOb-UART16550 peripheral,
//! layered from the bus up:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent traits (raw register I/O, serial port)
//! - [`platform`]: Raw I/O backends (memory-mapped, port I/O, simulated)
//! - [`hw`]: Register map and bit layouts
//! - [`peripheral`]: CSR access core and the polled UART driver
//! - [`csr_device`]: Single-owner device with checked register requests
//! - [`device_manager`]: Name-keyed registry of devices
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use uart16550::csr_device::CsrDevice;
//! use uart16550::platform::{Backend, DefaultBus};
//!
//! let bus = unsafe { DefaultBus::attach(0x4000_0000, 0x20) };
//! let device = Arc::new(CsrDevice::new("uart0", bus, 0));
//!
//! let mut handle = device.open()?;
//! let line_status = handle.read_reg(5)?;
//! handle.close();
//! # Ok::<(), uart16550::AccessError>(())
//! ```

#![cfg_attr(not(test), no_std)]

pub mod csr_device;
pub mod device_manager;
pub mod error;
pub mod hal;
pub mod hw;
pub mod peripheral;
pub mod platform;

// Re-export commonly used types
pub use csr_device::{AccessRequest, CsrDevice, CsrHandle, Payload, SeekFrom};
pub use error::AccessError;
pub use hal::raw_io::{IoError, RawIo};
pub use hal::serial::{SerialConfig, SerialError, SerialPort};
pub use hw::uart16550::{Access, Direction, Register, RegisterDescriptor};
pub use peripheral::uart16550::{Csrs, Uart16550, UartConfig};

extern crate alloc;
