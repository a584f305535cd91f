use std::sync::Arc;
use uart16550::CsrDevice;
use uart16550::device_manager::devices;
use uart16550::hw::uart16550::{LC_ADDR, LS_ADDR, MC_ADDR, SR_ADDR, VERSION};
use uart16550::platform::sim::SimBus;
use uart16550_devfs::dev::ioctl::{RD_LCR, RD_VERSION, WR_LCR};
use uart16550_devfs::file::{SEEK_CUR, SEEK_END, SEEK_SET};
use uart16550_devfs::{DEV_PATH, DevFs, Errno, OpenFlags, SYSFS_DIR};

fn probed(bus: SimBus) -> DevFs {
    let fs = DevFs::new();
    fs.probe(Arc::new(CsrDevice::new("iob_uart16550", bus, 0))).unwrap();
    fs
}

fn attr(name: &str) -> String {
    format!("{}/{}", SYSFS_DIR, name)
}

#[test]
fn second_open_of_char_device_is_busy() {
    let fs = probed(SimBus::new(1));

    let first = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();
    assert_eq!(fs.open(DEV_PATH, OpenFlags::RDWR).err(), Some(Errno::EBUSY));

    drop(first);
    assert!(fs.open(DEV_PATH, OpenFlags::RDWR).is_ok());
}

#[test]
fn char_device_position_selects_register() {
    let bus = SimBus::new(1);
    let fs = probed(bus.clone());
    let mut file = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();

    assert_eq!(file.llseek(SR_ADDR as i64, SEEK_SET), Ok(7));
    assert_eq!(file.write(&[0x5A]), Ok(1));
    let mut buf = [0u8; 1];
    assert_eq!(file.read(&mut buf), Ok(1));
    assert_eq!(buf, [0x5A]);
    assert_eq!(bus.snapshot(0).unwrap().sr, 0x5A);

    assert_eq!(file.llseek(-2, SEEK_CUR), Ok(5));
    assert_eq!(file.llseek(0, SEEK_END), Ok(32));
}

#[test]
fn char_device_rejects_wrong_direction() {
    let fs = probed(SimBus::new(1));
    let mut file = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();
    let mut buf = [0u8; 1];

    file.llseek(MC_ADDR as i64, SEEK_SET).unwrap();
    assert_eq!(file.read(&mut buf), Err(Errno::EACCES));

    file.llseek(LS_ADDR as i64, SEEK_SET).unwrap();
    assert_eq!(file.write(&[0]), Err(Errno::EACCES));
}

#[test]
fn char_device_seek_bounds() {
    let fs = probed(SimBus::new(1));
    let mut file = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();
    let mut buf = [0u8; 1];

    assert_eq!(file.llseek(0, 3), Err(Errno::EINVAL));
    assert_eq!(file.llseek(33, SEEK_SET), Err(Errno::EINVAL));
    assert_eq!(file.llseek(-1, SEEK_SET), Err(Errno::EINVAL));

    assert_eq!(file.llseek(0x1F, SEEK_SET), Ok(0x1F));
    assert_eq!(file.read(&mut buf), Err(Errno::EACCES));
}

#[test]
fn char_device_honours_open_mode() {
    let fs = probed(SimBus::new(1));
    let mut file = fs.open(DEV_PATH, OpenFlags::RDONLY).unwrap();

    file.llseek(SR_ADDR as i64, SEEK_SET).unwrap();
    assert_eq!(file.write(&[1]), Err(Errno::EBADF));
}

#[test]
fn ioctl_commands() {
    let bus = SimBus::new(1);
    let fs = probed(bus.clone());
    let mut file = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();

    let mut arg = 0x83u32.to_le_bytes();
    assert_eq!(file.ioctl(WR_LCR, &mut arg), Ok(()));
    assert_eq!(bus.snapshot(0).unwrap().lc, 0x83);

    let mut arg = [0u8; 4];
    assert_eq!(file.ioctl(RD_LCR, &mut arg), Ok(()));
    assert_eq!(u32::from_le_bytes(arg), 0x83);

    let mut arg = [0u8; 4];
    assert_eq!(file.ioctl(RD_VERSION, &mut arg), Ok(()));
    assert_eq!(u32::from_le_bytes(arg), VERSION);

    assert_eq!(file.ioctl(0xDEAD, &mut arg), Err(Errno::ENOTTY));
    assert_eq!(file.ioctl(RD_LCR, &mut []), Err(Errno::EFAULT));
}

#[test]
fn sysfs_store_then_show() {
    let fs = probed(SimBus::new(1));

    let mut file = fs.open(&attr("scr"), OpenFlags::WRONLY).unwrap();
    assert_eq!(file.write(b"90\n"), Ok(3));
    drop(file);

    let mut file = fs.open(&attr("scr"), OpenFlags::RDONLY).unwrap();
    let mut buf = [0u8; 16];
    let n = file.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"90\n");
    assert_eq!(file.read(&mut buf), Ok(0));
}

#[test]
fn sysfs_store_keeps_low_byte() {
    let bus = SimBus::new(1);
    let fs = probed(bus.clone());

    let mut file = fs.open(&attr("lcr"), OpenFlags::WRONLY).unwrap();
    assert_eq!(file.write(b"259"), Ok(3));
    assert_eq!(bus.snapshot(0).unwrap().lc, 3);
}

#[test]
fn sysfs_rejects_bad_input_and_names() {
    let fs = probed(SimBus::new(1));

    let mut file = fs.open(&attr("scr"), OpenFlags::WRONLY).unwrap();
    assert_eq!(file.write(b"invalid"), Err(Errno::EINVAL));

    assert_eq!(
        fs.open(&attr("lsr"), OpenFlags::WRONLY).err(),
        Some(Errno::EACCES)
    );
    assert_eq!(
        fs.open(&attr("mcr"), OpenFlags::RDONLY).err(),
        Some(Errno::EACCES)
    );
    assert_eq!(
        fs.open(&attr("nonexistent"), OpenFlags::RDONLY).err(),
        Some(Errno::ENOENT)
    );
    assert_eq!(
        fs.open("/dev/iob_uart16550-1", OpenFlags::RDWR).err(),
        Some(Errno::ENOENT)
    );
}

#[test]
fn sysfs_is_busy_while_char_device_is_open() {
    let fs = probed(SimBus::new(1));
    let mut attr_file = fs.open(&attr("lcr"), OpenFlags::RDONLY).unwrap();

    let chardev = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(attr_file.read(&mut buf), Err(Errno::EBUSY));

    drop(chardev);
    let n = attr_file.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"0\n");
}

#[test]
fn sysfs_show_sees_line_control_through_mode_switch() {
    let bus = SimBus::new(1);
    let fs = probed(bus.clone());

    let mut file = fs.open(DEV_PATH, OpenFlags::RDWR).unwrap();
    file.llseek(LC_ADDR as i64, SEEK_SET).unwrap();
    file.write(&[0x80]).unwrap();
    file.llseek(0, SEEK_SET).unwrap();
    file.write(&[12]).unwrap();
    drop(file);

    let mut dll = fs.open(&attr("rbr_thr_dll"), OpenFlags::RDONLY).unwrap();
    let mut buf = [0u8; 8];
    let n = dll.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"12\n");
    assert_eq!(bus.snapshot(0).unwrap().dll, 12);
}

#[test]
fn only_one_device_can_be_probed() {
    let fs = probed(SimBus::new(1));
    let other = Arc::new(CsrDevice::new("iob_uart16550_1", SimBus::new(1), 0));

    assert_eq!(fs.probe(other), Err(Errno::ENODEV));
    assert_eq!(fs.device().map(|d| d.name()), Some("iob_uart16550"));
}

#[test]
fn open_before_probe_has_no_device() {
    let fs = DevFs::new();
    assert_eq!(
        fs.open(DEV_PATH, OpenFlags::RDWR).err(),
        Some(Errno::ENODEV)
    );
    assert!(fs.paths().is_empty());
}

#[test]
fn probe_from_registry() {
    let device = Arc::new(CsrDevice::new("devfs-registry-test", SimBus::new(1), 0));
    devices().lock().register(device);

    let fs = DevFs::new();
    assert_eq!(fs.probe_registered("missing"), Err(Errno::ENODEV));
    assert_eq!(fs.probe_registered("devfs-registry-test"), Ok(()));
    assert_eq!(fs.paths().len(), 11);
    assert!(fs.paths().contains(&attr("db2")));
}
