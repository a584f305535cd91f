//! Peripheral Drivers
//!
//! # Available Peripherals
//!
//! - [`uart16550`]: IOb-UART16550, CSR access core and polled UART driver

pub mod uart16550;
