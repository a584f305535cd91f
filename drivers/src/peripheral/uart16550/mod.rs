//! IOb-UART16550 Driver
//!
//! Polled driver for the IOb-UART16550 peripheral, built entirely on the
//! CSR access core in [`csrs`]. It never touches the bus directly, so every
//! divisor-latch access goes through the Line Control save/restore.
//!
//! # Features
//!
//! - Divisor from input clock and baud rate
//! - 5 to 8 data bits, none/odd/even/mark/space parity, 1 or 2 stop bits
//! - FIFO trigger level and interrupt enable configuration
//! - Bounded blocking and non-blocking I/O
//!
//! # Example
//!
//! ```no_run
//! use uart16550::hal::serial::{SerialConfig, SerialPort};
//! use uart16550::peripheral::uart16550::{Csrs, Uart16550, UartConfig};
//! use uart16550::platform::mmio::MmioBus;
//!
//! let bus = unsafe { MmioBus::new(0x4000_0000, 0x20) };
//! let mut uart = Uart16550::new(Csrs::new(bus, 0), UartConfig::default());
//! uart.configure(SerialConfig::new_8n1(115200))?;
//! uart.write(b"Hello, world!\n")?;
//! # Ok::<(), uart16550::hal::serial::SerialError>(())
//! ```

pub mod csrs;
pub mod resolver;

pub use csrs::Csrs;

use crate::hal::raw_io::RawIo;
use crate::hal::serial::{
    DataBits, NonBlockingSerial, Parity, SerialConfig, SerialError, SerialPort, StopBits,
};
use crate::hw::uart16550::bits::{
    FifoControl, FifoTrigger, II_PND, InterruptEnable, InterruptId, LC_BITS, LineControl,
    LineStatus, ModemStatus,
};

/// Default IOb-UART16550 input clock.
pub const DEFAULT_CLOCK_HZ: u32 = 100_000_000;

/// Line status polls before a blocking call gives up.
pub const DEFAULT_POLL_LIMIT: u32 = 500;

/// Driver configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UartConfig {
    /// Peripheral input clock in Hz.
    pub clock_hz: u32,
    /// Line settings.
    pub serial: SerialConfig,
    /// Receiver FIFO trigger level.
    pub fifo_trigger: FifoTrigger,
    /// Interrupt sources enabled by `init`.
    pub interrupts: InterruptEnable,
    /// Line status polls per blocking byte.
    pub poll_limit: u32,
}

impl UartConfig {
    pub const fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            serial: SerialConfig::new_8n1(115200),
            fifo_trigger: FifoTrigger::Bytes14,
            interrupts: InterruptEnable::RECEIVED_DATA.union(InterruptEnable::TX_EMPTY),
            poll_limit: DEFAULT_POLL_LIMIT,
        }
    }

    pub const fn with_serial(mut self, serial: SerialConfig) -> Self {
        self.serial = serial;
        self
    }

    pub const fn with_fifo_trigger(mut self, trigger: FifoTrigger) -> Self {
        self.fifo_trigger = trigger;
        self
    }

    pub const fn with_interrupts(mut self, interrupts: InterruptEnable) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub const fn with_poll_limit(mut self, poll_limit: u32) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    /// Divisor latch value: `round(clock_hz / baud_rate)`.
    pub fn divisor(&self) -> Result<u16, SerialError> {
        let baud = self.serial.baud_rate as u64;
        if baud == 0 {
            return Err(SerialError::InvalidConfig);
        }

        let div = (self.clock_hz as u64 + baud / 2) / baud;
        match u16::try_from(div) {
            Ok(div) if div != 0 => Ok(div),
            _ => Err(SerialError::InvalidConfig),
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_HZ)
    }
}

/// Line Control value for `serial`, mode bit clear.
pub fn line_control(serial: &SerialConfig) -> LineControl {
    let word = match serial.data_bits {
        DataBits::Five => 0b00,
        DataBits::Six => 0b01,
        DataBits::Seven => 0b10,
        DataBits::Eight => 0b11,
    };
    let mut lc = LineControl::from_bits_retain(word << LC_BITS);

    if serial.stop_bits == StopBits::Two {
        lc |= LineControl::TWO_STOP_BITS;
    }

    lc |= match serial.parity {
        Parity::None => LineControl::empty(),
        Parity::Odd => LineControl::PARITY_ENABLE,
        Parity::Even => LineControl::PARITY_ENABLE | LineControl::EVEN_PARITY,
        Parity::Mark => LineControl::PARITY_ENABLE | LineControl::STICK_PARITY,
        Parity::Space => {
            LineControl::PARITY_ENABLE | LineControl::EVEN_PARITY | LineControl::STICK_PARITY
        }
    };

    lc
}

/// Polled IOb-UART16550.
pub struct Uart16550<B: RawIo> {
    csrs: Csrs<B>,
    config: UartConfig,
}

impl<B: RawIo> Uart16550<B> {
    pub const fn new(csrs: Csrs<B>, config: UartConfig) -> Self {
        Self { csrs, config }
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn csrs(&mut self) -> &mut Csrs<B> {
        &mut self.csrs
    }

    /// Loads the divisor latch, then sets the FIFO trigger level and
    /// interrupt enables. Line Control is left as it was.
    pub fn init(&mut self, div: u16) -> Result<(), SerialError> {
        let [dl1, dl2] = div.to_le_bytes();
        self.csrs.set_dl1(dl1)?;
        self.csrs.set_dl2(dl2)?;
        self.csrs
            .set_fc(FifoControl::with_trigger(self.config.fifo_trigger).bits())?;
        self.csrs.set_ie(self.config.interrupts.bits())?;
        Ok(())
    }

    /// Puts the peripheral back in a known idle state.
    ///
    /// Interrupts off, both FIFOs cleared, 8N1 with the mode bit clear,
    /// modem control lines low, and any stale receive data drained.
    pub fn reset(&mut self) -> Result<(), SerialError> {
        self.csrs.set_ie(0)?;
        self.csrs.get_ii()?;
        self.csrs
            .set_fc((FifoControl::CLEAR_RX | FifoControl::CLEAR_TX).bits())?;
        self.csrs
            .set_fc(FifoControl::with_trigger(FifoTrigger::Bytes14).bits())?;
        self.csrs.set_lc(LineControl::WORD_LENGTH.bits())?;
        self.csrs.set_mc(0)?;

        let mut drained = 0;
        while self.data_ready()? {
            self.csrs.get_rb()?;
            drained += 1;
            if drained >= self.config.poll_limit {
                return Err(SerialError::Timeout);
            }
        }

        self.csrs.get_ms()?;
        Ok(())
    }

    /// Divisor latch as currently programmed.
    pub fn divisor(&mut self) -> Result<u16, SerialError> {
        let dl1 = self.csrs.get_dl1()?;
        let dl2 = self.csrs.get_dl2()?;
        Ok(u16::from_le_bytes([dl1, dl2]))
    }

    pub fn line_status(&mut self) -> Result<LineStatus, SerialError> {
        Ok(LineStatus::from_bits_retain(self.csrs.get_ls()?))
    }

    pub fn modem_status(&mut self) -> Result<ModemStatus, SerialError> {
        Ok(ModemStatus::from_bits_retain(self.csrs.get_ms()?))
    }

    pub fn data_ready(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::DATA_READY))
    }

    pub fn overrun_error(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::OVERRUN_ERROR))
    }

    pub fn parity_error(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::PARITY_ERROR))
    }

    pub fn framing_error(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::FRAMING_ERROR))
    }

    pub fn break_interrupt(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::BREAK_INTERRUPT))
    }

    pub fn transmitter_empty(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::TX_EMPTY))
    }

    /// Transmit FIFO has room for another byte.
    pub fn tx_ready(&mut self) -> Result<bool, SerialError> {
        Ok(self.line_status()?.contains(LineStatus::TX_FIFO_EMPTY))
    }

    pub fn interrupt_pending(&mut self) -> Result<bool, SerialError> {
        Ok(self.csrs.get_ii()? & (1 << II_PND) == 0)
    }

    pub fn interrupt_id(&mut self) -> Result<InterruptId, SerialError> {
        Ok(InterruptId::from(self.csrs.get_ii()?))
    }

    /// Polls `ready` up to `poll_limit` times.
    fn wait_for(
        &mut self,
        mut ready: impl FnMut(LineStatus) -> bool,
    ) -> Result<LineStatus, SerialError> {
        for _ in 0..self.config.poll_limit.max(1) {
            let ls = self.line_status()?;
            if ready(ls) {
                return Ok(ls);
            }
            core::hint::spin_loop();
        }

        Err(SerialError::Timeout)
    }

    /// Maps receive error bits to the error they report, most severe first.
    ///
    /// The byte that carried the error stays queued.
    fn check_receive(ls: LineStatus) -> Result<(), SerialError> {
        let errors = ls.receive_errors();
        if errors.contains(LineStatus::OVERRUN_ERROR) {
            Err(SerialError::Overrun)
        } else if errors.contains(LineStatus::BREAK_INTERRUPT) {
            Err(SerialError::Break)
        } else if errors.contains(LineStatus::FRAMING_ERROR) {
            Err(SerialError::Framing)
        } else if errors.contains(LineStatus::PARITY_ERROR) {
            Err(SerialError::Parity)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

impl<B: RawIo> SerialPort for Uart16550<B> {
    type Error = SerialError;

    fn configure(&mut self, config: SerialConfig) -> Result<(), SerialError> {
        let uart_config = self.config.with_serial(config);
        let div = uart_config.divisor()?;

        self.config = uart_config;
        self.init(div)?;
        self.csrs.set_lc(line_control(&config).bits())?;

        log::info!(
            "[uart16550] base {:#x}: {} baud, divisor {}",
            self.csrs.base(),
            config.baud_rate,
            div
        );
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        self.wait_for(|ls| ls.contains(LineStatus::TX_FIFO_EMPTY))?;
        self.csrs.set_tr(byte)?;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, SerialError> {
        let ls = self.wait_for(|ls| ls.contains(LineStatus::DATA_READY))?;
        Self::check_receive(ls)?;
        Ok(self.csrs.get_rb()?)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.wait_for(|ls| ls.contains(LineStatus::TX_EMPTY))?;
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool, SerialError> {
        Ok(!self.transmitter_empty()?)
    }
}

impl<B: RawIo> NonBlockingSerial for Uart16550<B> {
    fn try_write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        if !self.tx_ready()? {
            return Err(SerialError::WouldBlock);
        }

        self.csrs.set_tr(byte)?;
        Ok(())
    }

    fn try_read_byte(&mut self) -> Result<u8, SerialError> {
        let ls = self.line_status()?;
        if !ls.contains(LineStatus::DATA_READY) {
            return Err(SerialError::WouldBlock);
        }

        Self::check_receive(ls)?;
        Ok(self.csrs.get_rb()?)
    }
}
