//! Synchronization primitives shared by the UART16550 driver crates.
//!
//! Everything here is `no_std` and lock-free at the instruction level:
//! locks spin on an atomic flag instead of parking a thread.

#![cfg_attr(not(test), no_std)]

pub mod sync;
