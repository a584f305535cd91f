//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! # Available Interfaces
//!
//! - [`raw_io`]: The register read/write primitive every backend supplies
//! - [`serial`]: Serial port (UART) communication

pub mod raw_io;
pub mod serial;
