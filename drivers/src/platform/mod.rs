//! Platform Abstraction Layer
//!
//! Raw register access backends. Each one implements
//! [`RawIo`](crate::hal::raw_io::RawIo); exactly one is exported as
//! [`DefaultBus`], chosen by Cargo feature:
//!
//! - `sim`: [`sim::SimBus`], software register file
//! - `pc`: [`port::PortBus`], x86 port I/O (x86_64 only)
//! - `mmio` (default): [`mmio::MmioBus`], volatile memory-mapped access
//!
//! # Usage
//!
//! ```no_run
//! use uart16550::platform::{Backend, DefaultBus};
//!
//! let bus = unsafe { DefaultBus::attach(0x4000_0000, 0x20) };
//! ```

pub mod mmio;
pub mod sim;

#[cfg(all(feature = "pc", target_arch = "x86_64"))]
pub mod port;

/// A raw I/O backend that can be bound to a physical register window.
pub trait Backend: crate::hal::raw_io::RawIo + Send + Sized {
    /// Binds the backend to `size` bytes of registers at `phys_base`.
    ///
    /// # Safety
    ///
    /// The window must belong to the peripheral and nothing else may
    /// drive it while the backend is alive.
    unsafe fn attach(phys_base: usize, size: usize) -> Self;
}

impl Backend for sim::SimBus {
    /// `phys_base` is ignored; `size` is rounded up to whole instances.
    unsafe fn attach(_phys_base: usize, size: usize) -> Self {
        let window = crate::hw::uart16550::WINDOW as usize;
        sim::SimBus::new(size.div_ceil(window).max(1))
    }
}

// Backend selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "sim")] {
        pub use sim::SimBus as DefaultBus;
    } else if #[cfg(all(feature = "pc", target_arch = "x86_64"))] {
        pub use port::PortBus as DefaultBus;
    } else if #[cfg(feature = "mmio")] {
        pub use mmio::MmioBus as DefaultBus;
    } else {
        compile_error!(
            "No register backend selected!\n\
            Use: cargo build --features mmio\n\
            Or:  cargo build --features pc\n\
            Or:  cargo build --features sim"
        );
    }
}

// Ensure the two hardware backends are not both selected
#[cfg(all(feature = "mmio", feature = "pc"))]
compile_error!("Multiple hardware backends selected! Choose only one: mmio OR pc");
