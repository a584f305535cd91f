//! Register-level hardware descriptions.

pub mod uart16550;
