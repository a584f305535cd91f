use crate::csr_device::{CsrDevice, CsrHandle};
use crate::error::AccessError;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use common::sync::SpinLock;

/// Registered IOb-UART16550 instances, keyed by name.
pub struct DeviceManager {
    devices: BTreeMap<String, Arc<CsrDevice>>,
}

impl DeviceManager {
    pub const fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
        }
    }

    /// Registers `device` under its own name, replacing any previous entry.
    pub fn register(&mut self, device: Arc<CsrDevice>) -> Option<Arc<CsrDevice>> {
        log::info!("[uart16550] registered {}", device.name());
        self.devices.insert(String::from(device.name()), device)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<CsrDevice>> {
        self.devices.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<CsrDevice>> {
        self.devices.get(name).cloned()
    }

    pub fn list(&self) -> impl Iterator<Item = &String> {
        self.devices.keys()
    }

    /// Opens the named device. `None` if nothing is registered under `name`.
    pub fn open(&self, name: &str) -> Option<Result<CsrHandle, AccessError>> {
        self.devices.get(name).map(|device| device.open())
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

static DEVICE_MANAGER: SpinLock<DeviceManager> = SpinLock::new(DeviceManager::new());

pub fn devices() -> &'static SpinLock<DeviceManager> {
    &DEVICE_MANAGER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::sim::SimBus;

    #[test]
    fn registry_hands_out_shared_devices() {
        let bus = SimBus::pair();
        let mut manager = DeviceManager::new();
        manager.register(Arc::new(CsrDevice::new("uart0", bus.clone(), 0)));
        manager.register(Arc::new(CsrDevice::new("uart1", bus, 32)));

        assert_eq!(manager.list().collect::<Vec<_>>(), ["uart0", "uart1"]);

        let handle = manager.open("uart1").unwrap().unwrap();
        assert!(manager.get("uart1").unwrap().is_open());
        assert_eq!(
            manager.open("uart1").unwrap().err(),
            Some(AccessError::Busy)
        );
        drop(handle);

        assert!(manager.open("uart2").is_none());
        assert!(manager.unregister("uart0").is_some());
    }

    #[test]
    fn global_registry_is_reachable() {
        let device = Arc::new(CsrDevice::new("global-test", SimBus::new(1), 0));
        devices().lock().register(device);
        assert!(devices().lock().get("global-test").is_some());
    }
}
