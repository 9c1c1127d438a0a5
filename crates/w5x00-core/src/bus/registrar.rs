//! Bus child registration
//!
//! The bus namespace is keyed by `(controller, chip-select)`. A crash or a
//! forced unload can leave a descriptor behind under our name, and a fresh
//! registration on top of it would either fail or bind to stale state. So
//! registration always deletes whatever sits at our address first and
//! then creates a new child from the template.
//!
//! The decision is made by [`plan_registration`], a pure function over a
//! bus snapshot; [`BusRegistrar::ensure_registered`] then carries the plan
//! out against a live [`SpiBus`].

use super::traits::SpiBus;
use super::types::{device_name, BoardInfo, BusDevice, BusDeviceRef};
use crate::error::{Error, RegistrationFailure, Result};
use alloc::string::String;
use alloc::vec::Vec;

/// What has to happen on the bus to end up with exactly one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPlan {
    /// Controller the device is created on
    pub controller: String,
    /// Name the new device will have
    pub name: String,
    /// Existing device under that name, to be deleted first
    pub stale: Option<BusDeviceRef>,
    /// Template for the new device
    pub info: BoardInfo,
}

impl RegistrationPlan {
    /// Bus state after the plan has run, plus the reference to the new device
    pub fn apply(&self, devices: &[BusDevice]) -> (Vec<BusDevice>, BusDeviceRef) {
        let mut next: Vec<BusDevice> = devices
            .iter()
            .filter(|d| d.name != self.name)
            .cloned()
            .collect();
        next.push(BusDevice::from_board_info(&self.controller, &self.info));
        (next, BusDeviceRef::new(self.name.clone()))
    }
}

/// Decide how to register `template` on `controller` given the current devices
pub fn plan_registration(
    controller: &str,
    devices: &[BusDevice],
    template: &BoardInfo,
) -> RegistrationPlan {
    let name = device_name(controller, template.chip_select);
    let stale = devices
        .iter()
        .find(|d| d.name == name)
        .map(|d| BusDeviceRef::new(d.name.clone()));

    RegistrationPlan {
        controller: String::from(controller),
        name,
        stale,
        info: template.clone(),
    }
}

/// Keeps this driver's bus child registration clean across load cycles
#[derive(Debug, Clone)]
pub struct BusRegistrar {
    driver: String,
}

impl BusRegistrar {
    /// Registrar for the driver tag `driver`
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
        }
    }

    /// Driver tag this registrar manages
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Make sure exactly one fresh child exists at the template's address
    ///
    /// Any device already registered there is deleted unconditionally
    /// before the new one is created. No retry is attempted.
    pub fn ensure_registered<B: SpiBus + ?Sized>(
        &self,
        bus: &mut B,
        template: &BoardInfo,
    ) -> Result<BusDeviceRef> {
        let controller = bus.controller(template.bus_num).ok_or_else(|| {
            log::error!(
                "{}:  no SPI master for bus {}",
                self.driver,
                template.bus_num
            );
            Error::RegistrationFailed(RegistrationFailure::ControllerNotFound {
                bus_num: template.bus_num,
            })
        })?;

        let plan = plan_registration(&controller, &bus.devices(), template);

        if let Some(stale) = &plan.stale {
            log::info!("{}: Deleting {}", self.driver, stale.name());
            bus.delete_device(stale).map_err(|e| {
                log::error!("{}:  failed to delete {}: {}", self.driver, stale.name(), e);
                Error::RegistrationFailed(RegistrationFailure::DeleteFailed)
            })?;
        }

        let device = bus.new_device(&plan.controller, &plan.info).map_err(|e| {
            log::error!("{}:    new device {} failed: {}", self.driver, plan.name, e);
            Error::RegistrationFailed(RegistrationFailure::CreateFailed)
        })?;

        log::debug!(
            "{}: registered {} ({} Hz, mode {})",
            self.driver,
            device.name(),
            plan.info.max_speed_hz,
            plan.info.mode.number()
        );
        Ok(device)
    }

    /// Register the driver tag with the bus
    pub fn register_driver<B: SpiBus + ?Sized>(&self, bus: &mut B) -> Result<()> {
        bus.register_driver(&self.driver).map_err(|e| {
            log::error!("{}: spi driver registration failed: {}", self.driver, e);
            Error::DriverRegisterFailed
        })
    }

    /// Remove the driver's bus binding entirely
    pub fn unregister_driver<B: SpiBus + ?Sized>(&self, bus: &mut B) {
        log::debug!("{}: unregistering driver", self.driver);
        bus.unregister_driver(&self.driver);
    }
}

/// Log every device currently on the bus
pub fn log_bus_devices<B: SpiBus + ?Sized>(bus: &B) {
    log::info!("{}:  SPI devices registered:", crate::DRV_NAME);
    for dev in bus.devices() {
        log::info!(
            "{}:      {} {} {}kHz {} bits mode=0x{:02X}",
            crate::DRV_NAME,
            dev.modalias,
            dev.name,
            dev.max_speed_hz / 1000,
            dev.bits_per_word,
            dev.mode.bits()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SpiMode;
    use alloc::string::ToString;
    use alloc::vec;

    fn spidev(name: &str) -> BusDevice {
        BusDevice {
            name: name.to_string(),
            modalias: "spidev".to_string(),
            max_speed_hz: 500_000,
            bits_per_word: 8,
            mode: SpiMode::MODE_0,
        }
    }

    #[test]
    fn test_plan_on_empty_bus() {
        let plan = plan_registration("spi0", &[], &BoardInfo::default());
        assert_eq!(plan.name, "spi0.0");
        assert_eq!(plan.stale, None);
        assert_eq!(plan.info.max_speed_hz, 26_000_000);
    }

    #[test]
    fn test_plan_finds_stale_device_at_our_address_only() {
        let devices = vec![spidev("spi0.0"), spidev("spi0.1")];
        let template = BoardInfo {
            chip_select: 1,
            ..BoardInfo::default()
        };

        let plan = plan_registration("spi0", &devices, &template);
        assert_eq!(plan.stale, Some(BusDeviceRef::new("spi0.1")));
    }

    #[test]
    fn test_apply_twice_leaves_one_descriptor() {
        let template = BoardInfo::default();
        let neighbour = spidev("spi0.1");

        let first = plan_registration("spi0", &[neighbour.clone()], &template);
        let (state, dev) = first.apply(&[neighbour.clone()]);
        assert_eq!(dev.name(), "spi0.0");

        let second = plan_registration("spi0", &state, &template);
        assert_eq!(second.stale, Some(dev.clone()));
        let (state, dev2) = second.apply(&state);

        assert_eq!(dev2, dev);
        assert_eq!(state.iter().filter(|d| d.name == "spi0.0").count(), 1);
        assert!(state.contains(&neighbour));
        let ours = state.iter().find(|d| d.name == "spi0.0").unwrap();
        assert_eq!(ours.modalias, "w5x00");
    }
}
