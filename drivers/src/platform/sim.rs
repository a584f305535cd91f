//! Software model of one or more IOb-UART16550 instances.
//!
//! Instance `n` decodes `[n << ADDR_W, (n + 1) << ADDR_W)`. Only 8-bit
//! accesses are accepted. Transmission is instantaneous: a byte written
//! to the transmitter lands in the linked peer's receive FIFO (or the
//! instance's own FIFO in loopback mode), or in the instance's
//! transmit log when nothing is attached.
//!
//! The debug registers count traffic: DB1 is the low byte of bytes sent,
//! DB2 the low byte of bytes received.

use crate::hal::raw_io::{IoError, RawIo, check_width};
use crate::hw::uart16550::bits::{
    FifoControl, II_ID, II_RDA, II_RLS, II_THRE, InterruptEnable, LineControl, LineStatus,
    ModemControl,
};
use crate::hw::uart16550::{
    ADDR_W, CSR_W, DB1_ADDR, DB2_ADDR, DL1_ADDR, FC_ADDR, IE_ADDR, II_ADDR, LC_ADDR, LS_ADDR,
    MC_ADDR, MS_ADDR, RB_ADDR, SR_ADDR, TR_ADDR, WINDOW,
};
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use common::sync::SpinLock;

/// Receive FIFO depth of the model.
pub const RX_FIFO_DEPTH: usize = 256;

#[derive(Debug, Default)]
struct SimUart {
    ie: u8,
    lc: u8,
    mc: u8,
    sr: u8,
    dll: u8,
    dlm: u8,
    fc: u8,
    rx: VecDeque<u8>,
    /// Sticky until Line Status is read.
    errors: LineStatus,
    tx_log: Vec<u8>,
    peer: Option<usize>,
    sent: u8,
    received: u8,
}

impl SimUart {
    fn dlab(&self) -> bool {
        LineControl::from_bits_retain(self.lc).contains(LineControl::DLAB)
    }

    fn loopback(&self) -> bool {
        ModemControl::from_bits_retain(self.mc).contains(ModemControl::LOOPBACK)
    }

    fn receive(&mut self, byte: u8) {
        if self.rx.len() >= RX_FIFO_DEPTH {
            self.errors |= LineStatus::OVERRUN_ERROR;
            return;
        }
        self.rx.push_back(byte);
        self.received = self.received.wrapping_add(1);
    }

    fn line_status(&self) -> LineStatus {
        let mut ls = LineStatus::TX_FIFO_EMPTY | LineStatus::TX_EMPTY | self.errors;
        if !self.rx.is_empty() {
            ls |= LineStatus::DATA_READY;
        }
        if !self.errors.is_empty() {
            ls |= LineStatus::ERROR;
        }
        ls
    }

    fn interrupt_id(&self) -> u8 {
        let ie = InterruptEnable::from_bits_retain(self.ie);
        if ie.contains(InterruptEnable::LINE_STATUS) && !self.errors.is_empty() {
            II_RLS << II_ID
        } else if ie.contains(InterruptEnable::RECEIVED_DATA) && !self.rx.is_empty() {
            II_RDA << II_ID
        } else if ie.contains(InterruptEnable::TX_EMPTY) {
            II_THRE << II_ID
        } else {
            0x01
        }
    }

    /// Loopback drives the status inputs from the control outputs.
    fn modem_status(&self) -> u8 {
        if self.loopback() {
            (self.mc & 0x0F) << 4
        } else {
            0
        }
    }

    fn read(&mut self, offset: u32) -> u8 {
        match offset {
            RB_ADDR if self.dlab() => self.dll,
            RB_ADDR => self.rx.pop_front().unwrap_or(0),
            IE_ADDR if self.dlab() => self.dlm,
            IE_ADDR => self.ie,
            II_ADDR => self.interrupt_id(),
            LC_ADDR => self.lc,
            MC_ADDR => self.mc,
            LS_ADDR => {
                let ls = self.line_status();
                self.errors = LineStatus::empty();
                ls.bits()
            }
            MS_ADDR => self.modem_status(),
            SR_ADDR => self.sr,
            DB1_ADDR => self.sent,
            DB2_ADDR => self.received,
            _ => 0,
        }
    }
}

#[derive(Debug)]
struct SimState {
    uarts: Vec<SimUart>,
    fault: Option<u32>,
}

impl SimState {
    fn locate(&mut self, address: u32, width_bits: u32) -> Result<(usize, u32), IoError> {
        check_width(width_bits)?;
        if width_bits != CSR_W {
            return Err(IoError::UnsupportedWidth(width_bits));
        }
        if self.fault == Some(address) {
            self.fault = None;
            return Err(IoError::Fault { address });
        }

        let index = (address >> ADDR_W) as usize;
        if index >= self.uarts.len() {
            return Err(IoError::Unmapped { address });
        }

        Ok((index, address & (WINDOW as u32 - 1)))
    }

    fn transmit(&mut self, index: usize, byte: u8) {
        let uart = &mut self.uarts[index];
        uart.sent = uart.sent.wrapping_add(1);

        if uart.loopback() {
            uart.receive(byte);
        } else if let Some(peer) = uart.peer {
            self.uarts[peer].receive(byte);
        } else {
            uart.tx_log.push(byte);
        }
    }

    fn write(&mut self, index: usize, offset: u32, value: u8) {
        if offset == TR_ADDR && !self.uarts[index].dlab() {
            self.transmit(index, value);
            return;
        }

        let uart = &mut self.uarts[index];
        match offset {
            DL1_ADDR => uart.dll = value,
            IE_ADDR if uart.dlab() => uart.dlm = value,
            IE_ADDR => uart.ie = value,
            FC_ADDR => {
                let fc = FifoControl::from_bits_retain(value);
                if fc.contains(FifoControl::CLEAR_RX) {
                    uart.rx.clear();
                }
                uart.fc = (fc & FifoControl::TRIGGER).bits();
            }
            LC_ADDR => uart.lc = value,
            MC_ADDR => uart.mc = value & 0x1F,
            SR_ADDR => uart.sr = value,
            _ => {}
        }
    }
}

/// Register values of one simulated instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSnapshot {
    pub ie: u8,
    pub lc: u8,
    pub mc: u8,
    pub sr: u8,
    pub dll: u8,
    pub dlm: u8,
    pub fc: u8,
    pub rx_pending: usize,
}

/// Shared handle to the simulated register file.
///
/// Clones share state, so a test can keep one clone for inspection and
/// hand another to the code under test.
#[derive(Clone)]
pub struct SimBus {
    state: Arc<SpinLock<SimState>>,
}

impl SimBus {
    /// `count` unlinked instances at bases `0`, `32`, `64`, ...
    pub fn new(count: usize) -> Self {
        let mut uarts = Vec::with_capacity(count);
        uarts.resize_with(count, SimUart::default);
        Self {
            state: Arc::new(SpinLock::new(SimState {
                uarts,
                fault: None,
            })),
        }
    }

    /// Two instances with their lines cross-connected.
    pub fn pair() -> Self {
        let bus = Self::new(2);
        bus.link(0, 1);
        bus
    }

    /// Connects each instance's transmitter to the other's receiver.
    pub fn link(&self, a: usize, b: usize) {
        let mut state = self.state.lock();
        if a < state.uarts.len() && b < state.uarts.len() {
            state.uarts[a].peer = Some(b);
            state.uarts[b].peer = Some(a);
        }
    }

    /// Makes the next access of either direction at `address` fail.
    pub fn inject_fault(&self, address: u32) {
        self.state.lock().fault = Some(address);
    }

    /// Queues `bytes` in `instance`'s receive FIFO, as if they arrived on the line.
    pub fn push_rx(&self, instance: usize, bytes: &[u8]) {
        let mut state = self.state.lock();
        if let Some(uart) = state.uarts.get_mut(instance) {
            bytes.iter().for_each(|&byte| uart.receive(byte));
        }
    }

    /// Flags a receive error, reported at the next Line Status read.
    pub fn raise_line_error(&self, instance: usize, error: LineStatus) {
        let mut state = self.state.lock();
        if let Some(uart) = state.uarts.get_mut(instance) {
            uart.errors |= error.receive_errors();
        }
    }

    /// Bytes `instance` sent with nothing attached.
    pub fn transmitted(&self, instance: usize) -> Vec<u8> {
        let state = self.state.lock();
        state
            .uarts
            .get(instance)
            .map(|uart| uart.tx_log.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, instance: usize) -> Option<SimSnapshot> {
        let state = self.state.lock();
        state.uarts.get(instance).map(|uart| SimSnapshot {
            ie: uart.ie,
            lc: uart.lc,
            mc: uart.mc,
            sr: uart.sr,
            dll: uart.dll,
            dlm: uart.dlm,
            fc: uart.fc,
            rx_pending: uart.rx.len(),
        })
    }
}

impl RawIo for SimBus {
    fn read(&mut self, address: u32, width_bits: u32) -> Result<u32, IoError> {
        let mut state = self.state.lock();
        let (index, offset) = state.locate(address, width_bits)?;
        Ok(state.uarts[index].read(offset) as u32)
    }

    fn write(&mut self, address: u32, width_bits: u32, value: u32) -> Result<(), IoError> {
        let mut state = self.state.lock();
        let (index, offset) = state.locate(address, width_bits)?;
        state.write(index, offset, value as u8);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(bus: &mut SimBus, address: u32) -> u8 {
        bus.read(address, 8).unwrap() as u8
    }

    #[test]
    fn divisor_latch_is_banked_behind_line_control() {
        let mut bus = SimBus::new(1);
        bus.write(IE_ADDR, 8, 0x03).unwrap();
        bus.write(LC_ADDR, 8, 0x80).unwrap();
        bus.write(IE_ADDR, 8, 0x12).unwrap();

        assert_eq!(read(&mut bus, IE_ADDR), 0x12);
        bus.write(LC_ADDR, 8, 0x00).unwrap();
        assert_eq!(read(&mut bus, IE_ADDR), 0x03);
    }

    #[test]
    fn linked_pair_delivers_bytes() {
        let mut bus = SimBus::pair();
        bus.write(32, 8, 0x42).unwrap();

        assert_eq!(read(&mut bus, LS_ADDR) & 0x01, 1);
        assert_eq!(read(&mut bus, RB_ADDR), 0x42);
        assert_eq!(read(&mut bus, LS_ADDR) & 0x01, 0);
        assert_eq!(read(&mut bus, 32 + DB1_ADDR), 1);
        assert_eq!(read(&mut bus, DB2_ADDR), 1);
    }

    #[test]
    fn loopback_takes_precedence_over_link() {
        let mut bus = SimBus::pair();
        bus.write(MC_ADDR, 8, 0x1F).unwrap();
        bus.write(RB_ADDR, 8, 0x99).unwrap();

        assert_eq!(bus.snapshot(0).unwrap().rx_pending, 1);
        assert_eq!(bus.snapshot(1).unwrap().rx_pending, 0);
        assert_eq!(read(&mut bus, MS_ADDR), 0xF0);
    }

    #[test]
    fn overrun_is_sticky_until_line_status_read() {
        let mut bus = SimBus::new(1);
        bus.push_rx(0, &[0; RX_FIFO_DEPTH + 1]);

        assert_eq!(read(&mut bus, LS_ADDR) & 0x82, 0x82);
        assert_eq!(read(&mut bus, LS_ADDR) & 0x82, 0);
    }

    #[test]
    fn fault_fires_once() {
        let mut bus = SimBus::new(1);
        bus.inject_fault(LC_ADDR);

        assert_eq!(
            bus.read(LC_ADDR, 8),
            Err(IoError::Fault { address: LC_ADDR })
        );
        assert_eq!(bus.read(LC_ADDR, 8), Ok(0));
    }

    #[test]
    fn out_of_range_and_wide_accesses_fail() {
        let mut bus = SimBus::new(1);
        assert_eq!(bus.read(32, 8), Err(IoError::Unmapped { address: 32 }));
        assert_eq!(bus.read(0, 32), Err(IoError::UnsupportedWidth(32)));
        assert_eq!(bus.write(0, 12, 0), Err(IoError::UnsupportedWidth(12)));
    }

    #[test]
    fn interrupt_identification_follows_priority() {
        let mut bus = SimBus::new(1);
        assert_eq!(read(&mut bus, II_ADDR), 0x01);

        bus.write(IE_ADDR, 8, 0x07).unwrap();
        assert_eq!(read(&mut bus, II_ADDR), II_THRE << II_ID);

        bus.push_rx(0, b"a");
        assert_eq!(read(&mut bus, II_ADDR), II_RDA << II_ID);

        bus.raise_line_error(0, LineStatus::FRAMING_ERROR);
        assert_eq!(read(&mut bus, II_ADDR), II_RLS << II_ID);
    }
}
