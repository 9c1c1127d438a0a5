//! SPI bus framework trait

use super::types::{BoardInfo, BusDevice, BusDeviceRef};
use crate::error::Result;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// The SPI bus framework the driver registers with
///
/// Implementations own the device namespace. Device names are unique per
/// bus and built as `<controller>.<chip-select>`.
pub trait SpiBus {
    /// Name of the SPI master for `bus_num`, if one exists (e.g. `spi0`)
    fn controller(&self, bus_num: u16) -> Option<String>;

    /// Look up a child device by name
    fn find_device(&self, name: &str) -> Option<BusDeviceRef>;

    /// Delete a child device
    ///
    /// Must not return before the device is gone from the namespace.
    fn delete_device(&mut self, device: &BusDeviceRef) -> Result<()>;

    /// Create a child device from `info` on `controller`
    fn new_device(&mut self, controller: &str, info: &BoardInfo) -> Result<BusDeviceRef>;

    /// Snapshot of every device currently on the bus
    fn devices(&self) -> Vec<BusDevice>;

    /// Register a driver tag so matching devices get bound to it
    fn register_driver(&mut self, driver: &str) -> Result<()>;

    /// Drop the driver binding for `driver`
    fn unregister_driver(&mut self, driver: &str);
}

// Forwarding impl so backends can be handed around boxed
impl<B: SpiBus + ?Sized> SpiBus for Box<B> {
    fn controller(&self, bus_num: u16) -> Option<String> {
        (**self).controller(bus_num)
    }

    fn find_device(&self, name: &str) -> Option<BusDeviceRef> {
        (**self).find_device(name)
    }

    fn delete_device(&mut self, device: &BusDeviceRef) -> Result<()> {
        (**self).delete_device(device)
    }

    fn new_device(&mut self, controller: &str, info: &BoardInfo) -> Result<BusDeviceRef> {
        (**self).new_device(controller, info)
    }

    fn devices(&self) -> Vec<BusDevice> {
        (**self).devices()
    }

    fn register_driver(&mut self, driver: &str) -> Result<()> {
        (**self).register_driver(driver)
    }

    fn unregister_driver(&mut self, driver: &str) {
        (**self).unregister_driver(driver)
    }
}
