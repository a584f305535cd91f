//! IOb-UART16550 Control/Status Register map.
//!
//! Static description of every CSR: address, width and access direction.
//! Several logical registers share an address. Addresses 0 and 1 are
//! switched by the divisor-latch access bit of the Line Control register,
//! and address 2 is split by direction (read: interrupt identification,
//! write: FIFO control).
//!
//! Two views are provided:
//!
//! - [`Register`]: the logical register, what a driver means to touch.
//! - [`describe`]: the address slot, what a transport adapter can address.
//!   A slot merges every register decoded at that address in either mode,
//!   so its direction is the union of theirs.

pub mod bits;

/// Used address space width.
pub const ADDR_W: u32 = 5;
/// System bus data width.
pub const DATA_W: u32 = 32;
/// Width of every CSR, in bits.
pub const CSR_W: u32 = 8;
/// Peripheral version.
pub const VERSION: u32 = 0x000105;
/// Size of one instance's addressable window, in bytes.
pub const WINDOW: u64 = 1 << ADDR_W;

// Addresses
pub const RB_ADDR: u32 = 0; // Receiver buffer
pub const TR_ADDR: u32 = 0; // Transmitter
pub const IE_ADDR: u32 = 1; // Interrupt enable
pub const II_ADDR: u32 = 2; // Interrupt identification
pub const FC_ADDR: u32 = 2; // FIFO control
pub const LC_ADDR: u32 = 3; // Line control
pub const MC_ADDR: u32 = 4; // Modem control
pub const LS_ADDR: u32 = 5; // Line status
pub const MS_ADDR: u32 = 6; // Modem status
pub const SR_ADDR: u32 = 7; // Scratch register
pub const DL1_ADDR: u32 = 0; // Divisor latch bytes (1)
pub const DL2_ADDR: u32 = 1; // Divisor latch bytes (2)
pub const DB1_ADDR: u32 = 8; // Debug register 1
pub const DB2_ADDR: u32 = 12; // Debug register 2

/// Direction of a single access.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Directions a register permits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Direction {
    pub const fn allows(self, access: Access) -> bool {
        matches!(
            (self, access),
            (Direction::ReadWrite, _)
                | (Direction::ReadOnly, Access::Read)
                | (Direction::WriteOnly, Access::Write)
        )
    }

    /// Smallest direction permitting everything `self` or `other` permits.
    pub const fn union(self, other: Direction) -> Direction {
        match (self, other) {
            (Direction::ReadOnly, Direction::ReadOnly) => Direction::ReadOnly,
            (Direction::WriteOnly, Direction::WriteOnly) => Direction::WriteOnly,
            _ => Direction::ReadWrite,
        }
    }
}

/// Divisor-latch access state a register needs to be decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Decoded regardless of the mode bit.
    Any,
    /// Decoded only while LC bit 7 is clear.
    DlabClear,
    /// Decoded only while LC bit 7 is set.
    DlabSet,
}

impl Mode {
    /// Mode bit value the register needs, or `None` if it does not care.
    pub const fn required_dlab(self) -> Option<bool> {
        match self {
            Mode::Any => None,
            Mode::DlabClear => Some(false),
            Mode::DlabSet => Some(true),
        }
    }

    pub const fn decodes(self, dlab: bool) -> bool {
        match self.required_dlab() {
            None => true,
            Some(required) => required == dlab,
        }
    }
}

/// Immutable description of a CSR or of an address slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterDescriptor {
    pub name: &'static str,
    pub address: u32,
    pub width_bits: u32,
    pub direction: Direction,
}

impl RegisterDescriptor {
    const fn new(name: &'static str, address: u32, direction: Direction) -> Self {
        Self {
            name,
            address,
            width_bits: CSR_W,
            direction,
        }
    }

    /// Width in bytes.
    pub const fn width_bytes(&self) -> usize {
        (self.width_bits >> 3) as usize
    }
}

/// Logical IOb-UART16550 registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Register {
    /// Receiver buffer.
    Rb,
    /// Transmitter holding.
    Tr,
    /// Interrupt enable.
    Ie,
    /// Interrupt identification.
    Ii,
    /// FIFO control.
    Fc,
    /// Line control.
    Lc,
    /// Modem control.
    Mc,
    /// Line status.
    Ls,
    /// Modem status.
    Ms,
    /// Scratch.
    Sr,
    /// Divisor latch, low byte.
    Dl1,
    /// Divisor latch, high byte.
    Dl2,
    /// Debug register 1.
    Db1,
    /// Debug register 2.
    Db2,
}

static DESCRIPTORS: [RegisterDescriptor; 14] = [
    RegisterDescriptor::new("rb", RB_ADDR, Direction::ReadOnly),
    RegisterDescriptor::new("tr", TR_ADDR, Direction::WriteOnly),
    RegisterDescriptor::new("ie", IE_ADDR, Direction::ReadWrite),
    RegisterDescriptor::new("ii", II_ADDR, Direction::ReadOnly),
    RegisterDescriptor::new("fc", FC_ADDR, Direction::WriteOnly),
    RegisterDescriptor::new("lc", LC_ADDR, Direction::ReadWrite),
    RegisterDescriptor::new("mc", MC_ADDR, Direction::WriteOnly),
    RegisterDescriptor::new("ls", LS_ADDR, Direction::ReadOnly),
    RegisterDescriptor::new("ms", MS_ADDR, Direction::ReadOnly),
    RegisterDescriptor::new("sr", SR_ADDR, Direction::ReadWrite),
    RegisterDescriptor::new("dl1", DL1_ADDR, Direction::ReadWrite),
    RegisterDescriptor::new("dl2", DL2_ADDR, Direction::ReadWrite),
    RegisterDescriptor::new("db1", DB1_ADDR, Direction::ReadOnly),
    RegisterDescriptor::new("db2", DB2_ADDR, Direction::ReadOnly),
];

/// Address slots in address order.
static SLOTS: [RegisterDescriptor; 10] = [
    RegisterDescriptor::new("rbr_thr_dll", 0, Direction::ReadWrite),
    RegisterDescriptor::new("ier_dlm", 1, Direction::ReadWrite),
    RegisterDescriptor::new("iir_fcr", 2, Direction::ReadWrite),
    RegisterDescriptor::new("lcr", 3, Direction::ReadWrite),
    RegisterDescriptor::new("mcr", 4, Direction::WriteOnly),
    RegisterDescriptor::new("lsr", 5, Direction::ReadOnly),
    RegisterDescriptor::new("msr", 6, Direction::ReadOnly),
    RegisterDescriptor::new("scr", 7, Direction::ReadWrite),
    RegisterDescriptor::new("db1", 8, Direction::ReadOnly),
    RegisterDescriptor::new("db2", 12, Direction::ReadOnly),
];

impl Register {
    pub const ALL: [Register; 14] = [
        Register::Rb,
        Register::Tr,
        Register::Ie,
        Register::Ii,
        Register::Fc,
        Register::Lc,
        Register::Mc,
        Register::Ls,
        Register::Ms,
        Register::Sr,
        Register::Dl1,
        Register::Dl2,
        Register::Db1,
        Register::Db2,
    ];

    pub fn descriptor(self) -> &'static RegisterDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn address(self) -> u32 {
        self.descriptor().address
    }

    pub fn direction(self) -> Direction {
        self.descriptor().direction
    }

    pub const fn mode(self) -> Mode {
        match self {
            Register::Rb | Register::Tr | Register::Ie => Mode::DlabClear,
            Register::Dl1 | Register::Dl2 => Mode::DlabSet,
            _ => Mode::Any,
        }
    }

    /// The register decoded for `access` at `address` while the mode bit is `dlab`.
    pub fn from_access(address: u32, access: Access, dlab: bool) -> Option<Register> {
        Self::ALL.into_iter().find(|reg| {
            reg.address() == address && reg.mode().decodes(dlab) && reg.direction().allows(access)
        })
    }
}

/// Address-slot descriptor for `address`, or `None` if nothing is decoded there.
pub fn describe(address: u32) -> Option<RegisterDescriptor> {
    SLOTS.iter().find(|slot| slot.address == address).copied()
}

pub fn width_bits(address: u32) -> Option<u32> {
    describe(address).map(|slot| slot.width_bits)
}

pub fn direction(address: u32) -> Option<Direction> {
    describe(address).map(|slot| slot.direction)
}

/// All address slots, in address order.
pub fn slots() -> &'static [RegisterDescriptor] {
    &SLOTS
}

/// `true` if the register decoded at `address` depends on the mode bit.
pub fn is_multiplexed(address: u32) -> bool {
    Register::ALL
        .iter()
        .any(|reg| reg.address() == address && reg.mode() != Mode::Any)
}
