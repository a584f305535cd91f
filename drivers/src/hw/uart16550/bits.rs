//! Bit positions inside the IOb-UART16550 registers.
//!
//! The `*_XX` constants are bit indices, the single source of truth for
//! field layout. The `bitflags` types below are typed views built from them.

use bitflags::bitflags;

// Interrupt Enable Register bits
pub const IE_RDA: u8 = 0; // Received Data Available
pub const IE_THRE: u8 = 1; // Transmitter Holding Register Empty
pub const IE_RLS: u8 = 2; // Receiver Line Status
pub const IE_MS: u8 = 3; // Modem Status

// Interrupt Identification
pub const II_PND: u8 = 0; // Pending Interrupt (active low)
pub const II_ID: u8 = 1; // ID code, bits [3:1]
pub const II_RLS: u8 = 0b011; // Receiver Line Status
pub const II_RDA: u8 = 0b010; // Receiver Data Available
pub const II_TI: u8 = 0b110; // Timeout Indication
pub const II_THRE: u8 = 0b001; // Transmitter Holding Register empty
pub const II_MS: u8 = 0b000; // Modem Status

// FIFO Control Register
pub const FC_RF: u8 = 1; // Clear Receive FIFO
pub const FC_TF: u8 = 2; // Clear Transmitter FIFO
pub const FC_TL: u8 = 6; // Receiver FIFO Trigger Level, bits [7:6]
pub const FC_TL_1: u8 = 0b00;
pub const FC_TL_4: u8 = 0b01;
pub const FC_TL_8: u8 = 0b10;
pub const FC_TL_14: u8 = 0b11;

// Line Control Register
pub const LC_BITS: u8 = 0; // Bits per character, bits [1:0]
pub const LC_SB: u8 = 2; // Stop bits
pub const LC_PE: u8 = 3; // Parity enable
pub const LC_EP: u8 = 4; // Even parity
pub const LC_SP: u8 = 5; // Stick parity
pub const LC_BC: u8 = 6; // Break control
pub const LC_DL: u8 = 7; // Divisor latch access

// Modem Control Register
pub const MC_DTR: u8 = 0; // Data Terminal Ready
pub const MC_RTS: u8 = 1; // Request To Send
pub const MC_OUT1: u8 = 2; // Loopback -> Ring Indicator
pub const MC_OUT2: u8 = 3; // Loopback -> Data Carrier Detect
pub const MC_LB: u8 = 4; // Loopback mode

// Line Status Register
pub const LS_DR: u8 = 0; // Data Ready
pub const LS_OE: u8 = 1; // Overrun Error
pub const LS_PE: u8 = 2; // Parity Error
pub const LS_FE: u8 = 3; // Framing Error
pub const LS_BI: u8 = 4; // Break Interrupt
pub const LS_TFE: u8 = 5; // Transmit FIFO empty
pub const LS_TE: u8 = 6; // Transmitter Empty Indicator
pub const LS_EI: u8 = 7; // Error indicator

// Modem Status Register
pub const MS_DCTS: u8 = 0; // Delta Clear To Send
pub const MS_DDSR: u8 = 1; // Delta Data Set Ready
pub const MS_TERI: u8 = 2; // Trailing Edge of Ring Indicator
pub const MS_DDCD: u8 = 3; // Delta Data Carrier Detect
pub const MS_CCTS: u8 = 4; // Complement signals
pub const MS_CDSR: u8 = 5;
pub const MS_CRI: u8 = 6;
pub const MS_CDCD: u8 = 7;

bitflags! {
    /// Interrupt Enable Register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct InterruptEnable: u8 {
        const RECEIVED_DATA = 1 << IE_RDA;
        const TX_EMPTY = 1 << IE_THRE;
        const LINE_STATUS = 1 << IE_RLS;
        const MODEM_STATUS = 1 << IE_MS;
    }
}

bitflags! {
    /// FIFO Control Register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FifoControl: u8 {
        const CLEAR_RX = 1 << FC_RF;
        const CLEAR_TX = 1 << FC_TF;
        const TRIGGER = 0b11 << FC_TL;
    }
}

bitflags! {
    /// Line Control Register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LineControl: u8 {
        const WORD_LENGTH = 0b11 << LC_BITS;
        const TWO_STOP_BITS = 1 << LC_SB;
        const PARITY_ENABLE = 1 << LC_PE;
        const EVEN_PARITY = 1 << LC_EP;
        const STICK_PARITY = 1 << LC_SP;
        const BREAK = 1 << LC_BC;
        const DLAB = 1 << LC_DL;
    }
}

bitflags! {
    /// Modem Control Register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ModemControl: u8 {
        const DTR = 1 << MC_DTR;
        const RTS = 1 << MC_RTS;
        const OUT1 = 1 << MC_OUT1;
        const OUT2 = 1 << MC_OUT2;
        const LOOPBACK = 1 << MC_LB;
    }
}

bitflags! {
    /// Line Status Register.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        const DATA_READY = 1 << LS_DR;
        const OVERRUN_ERROR = 1 << LS_OE;
        const PARITY_ERROR = 1 << LS_PE;
        const FRAMING_ERROR = 1 << LS_FE;
        const BREAK_INTERRUPT = 1 << LS_BI;
        const TX_FIFO_EMPTY = 1 << LS_TFE;
        const TX_EMPTY = 1 << LS_TE;
        const ERROR = 1 << LS_EI;
    }
}

bitflags! {
    /// Modem Status Register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ModemStatus: u8 {
        const DELTA_CTS = 1 << MS_DCTS;
        const DELTA_DSR = 1 << MS_DDSR;
        const TRAILING_EDGE_RI = 1 << MS_TERI;
        const DELTA_DCD = 1 << MS_DDCD;
        const CTS = 1 << MS_CCTS;
        const DSR = 1 << MS_CDSR;
        const RI = 1 << MS_CRI;
        const DCD = 1 << MS_CDCD;
    }
}

/// Receiver FIFO trigger level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FifoTrigger {
    Bytes1,
    Bytes4,
    Bytes8,
    Bytes14,
}

impl FifoControl {
    pub const fn with_trigger(trigger: FifoTrigger) -> Self {
        let level = match trigger {
            FifoTrigger::Bytes1 => FC_TL_1,
            FifoTrigger::Bytes4 => FC_TL_4,
            FifoTrigger::Bytes8 => FC_TL_8,
            FifoTrigger::Bytes14 => FC_TL_14,
        };
        Self::from_bits_retain(level << FC_TL)
    }
}

impl LineControl {
    /// Character length in bits (5 to 8).
    pub const fn word_length(self) -> u8 {
        ((self.bits() >> LC_BITS) & 0b11) + 5
    }
}

impl LineStatus {
    /// Receive error bits set in this status.
    pub fn receive_errors(self) -> LineStatus {
        self & (LineStatus::OVERRUN_ERROR
            | LineStatus::PARITY_ERROR
            | LineStatus::FRAMING_ERROR
            | LineStatus::BREAK_INTERRUPT)
    }
}

/// Decoded Interrupt Identification Register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InterruptId {
    None,
    LineStatus,
    ReceivedData,
    Timeout,
    TxEmpty,
    ModemStatus,
    Unknown(u8),
}

impl From<u8> for InterruptId {
    fn from(ii: u8) -> Self {
        if ii & (1 << II_PND) != 0 {
            return InterruptId::None;
        }

        match (ii >> II_ID) & 0b111 {
            II_RLS => InterruptId::LineStatus,
            II_RDA => InterruptId::ReceivedData,
            II_TI => InterruptId::Timeout,
            II_THRE => InterruptId::TxEmpty,
            II_MS => InterruptId::ModemStatus,
            other => InterruptId::Unknown(other),
        }
    }
}
