use uart16550::hal::serial::{SerialConfig, SerialError, SerialPort};
use uart16550::hw::uart16550::bits::LineStatus;
use uart16550::hw::uart16550::{Register, WINDOW};
use uart16550::platform::sim::SimBus;
use uart16550::{AccessError, Csrs, IoError, Uart16550, UartConfig};

const UART0_BASE: u32 = 0;
const UART1_BASE: u32 = WINDOW as u32;

fn wait_data_ready(csrs: &mut Csrs<SimBus>) -> bool {
    (0..500).any(|_| {
        let ls = LineStatus::from_bits_retain(csrs.get_ls().unwrap());
        ls.contains(LineStatus::DATA_READY)
    })
}

#[test]
fn divisor_latch_round_trip_leaves_line_control() {
    let mut uart = Uart16550::new(Csrs::new(SimBus::new(1), UART0_BASE), UartConfig::default());
    uart.csrs().set_lc(0x03).unwrap();

    uart.init(3).unwrap();

    assert_eq!(uart.csrs().get_dl1(), Ok(3));
    assert_eq!(uart.csrs().get_dl2(), Ok(0));
    assert_eq!(uart.divisor(), Ok(3));
    assert_eq!(uart.csrs().get_lc(), Ok(0x03));
}

#[test]
fn transmit_truncates_to_register_width_and_reaches_peer() {
    let mut csrs = Csrs::new(SimBus::pair(), UART0_BASE);

    csrs.set_tr(0x1234_5678_u32 as u8).unwrap();

    csrs.set_base(UART1_BASE);
    assert!(wait_data_ready(&mut csrs));
    assert_eq!(csrs.get_rb(), Ok(0x78));
}

#[test]
fn read_write_registers_round_trip() {
    let mut csrs = Csrs::new(SimBus::new(2), UART1_BASE);

    for reg in [Register::Ie, Register::Lc, Register::Sr, Register::Dl1, Register::Dl2] {
        for value in [0x00, 0x5A, 0x7F, 0xA5, 0xFF] {
            csrs.set(reg, value).unwrap();
            assert_eq!(csrs.get(reg), Ok(value), "{}", reg.name());
            if reg == Register::Lc {
                csrs.set_lc(0).unwrap();
            }
        }
    }
}

#[test]
fn mode_bit_survives_every_multiplexed_access() {
    let bus = SimBus::new(1);
    let mut csrs = Csrs::new(bus.clone(), UART0_BASE);

    for lc in [0x03, 0x83, 0x1B, 0xFF] {
        csrs.set_lc(lc).unwrap();
        csrs.set_dl1(0x10).unwrap();
        csrs.get_dl2().unwrap();
        csrs.set_ie(0x01).unwrap();
        csrs.get_rb().unwrap();
        csrs.set_tr(b'z').unwrap();
        assert_eq!(bus.snapshot(0).unwrap().lc, lc);
    }
}

#[test]
fn failed_divisor_read_restores_line_control() {
    let bus = SimBus::new(1);
    let mut csrs = Csrs::new(bus.clone(), UART0_BASE);
    csrs.set_lc(0x1B).unwrap();

    bus.inject_fault(UART0_BASE);

    assert_eq!(
        csrs.get_dl1(),
        Err(AccessError::IoFailure(IoError::Fault {
            address: UART0_BASE
        }))
    );
    assert_eq!(bus.snapshot(0).unwrap().lc, 0x1B);
    assert_eq!(csrs.get_lc(), Ok(0x1B));
}

#[test]
fn failed_line_control_read_aborts_before_any_write() {
    let bus = SimBus::new(1);
    let mut csrs = Csrs::new(bus.clone(), UART0_BASE);
    csrs.set_lc(0x03).unwrap();

    bus.inject_fault(UART0_BASE + 3);

    assert!(matches!(csrs.set_dl1(9), Err(AccessError::IoFailure(_))));
    let snapshot = bus.snapshot(0).unwrap();
    assert_eq!(snapshot.lc, 0x03);
    assert_eq!(snapshot.dll, 0);
}

#[test]
fn driver_loopback_pair_exchanges_bytes() {
    let bus = SimBus::pair();
    let config = UartConfig::default();
    let mut uart0 = Uart16550::new(Csrs::new(bus.clone(), UART0_BASE), config);
    let mut uart1 = Uart16550::new(Csrs::new(bus, UART1_BASE), config);

    uart0.configure(SerialConfig::new_8n1(115200)).unwrap();
    uart1.configure(SerialConfig::new_8n1(115200)).unwrap();
    assert_eq!(uart1.divisor(), Ok(868));

    uart0.write_byte(0x81).unwrap();
    uart1.write(&[0x42]).unwrap();

    assert_eq!(uart1.read_byte(), Ok(0x81));
    assert_eq!(uart0.read_byte(), Ok(0x42));
    assert_eq!(uart0.read_byte(), Err(SerialError::Timeout));
}

#[test]
fn reset_drains_receiver_and_restores_defaults() {
    let bus = SimBus::new(1);
    let mut uart = Uart16550::new(Csrs::new(bus.clone(), UART0_BASE), UartConfig::default());
    bus.push_rx(0, b"stale");
    uart.csrs().set_lc(0x9F).unwrap();

    uart.reset().unwrap();

    let snapshot = bus.snapshot(0).unwrap();
    assert_eq!(snapshot.rx_pending, 0);
    assert_eq!(snapshot.lc, 0x03);
    assert_eq!(snapshot.ie, 0);
    assert_eq!(snapshot.mc, 0);
    assert_eq!(snapshot.fc, 0xC0);
}

#[test]
fn line_errors_reach_the_reader() {
    let bus = SimBus::new(1);
    let mut uart = Uart16550::new(Csrs::new(bus.clone(), UART0_BASE), UartConfig::default());
    bus.push_rx(0, b"q");
    bus.raise_line_error(0, LineStatus::FRAMING_ERROR);

    assert_eq!(uart.read_byte(), Err(SerialError::Framing));
    assert_eq!(uart.read_byte(), Ok(b'q'));
}

#[test]
fn base_near_end_of_address_space_reports_failure() {
    let mut csrs = Csrs::new(SimBus::new(1), u32::MAX);

    assert_eq!(
        csrs.get_lc(),
        Err(AccessError::IoFailure(IoError::Unmapped { address: u32::MAX }))
    );
    assert!(matches!(csrs.set_dl1(3), Err(AccessError::IoFailure(_))));
    assert!(matches!(csrs.read_at(0), Err(AccessError::IoFailure(_))));

    csrs.set_base(UART0_BASE);
    assert_eq!(csrs.get_lc(), Ok(0));
}
