//! Module load/unload
//!
//! Ties the registrar and the lifecycle together the way a loadable driver
//! module does: on load, clean up and register the SPI child, register the
//! driver and probe the matched device; on unload, unregister the driver,
//! which removes the device.

use crate::bus::{log_bus_devices, BoardInfo, BusRegistrar, SpiBus, SpiChild};
use crate::chip::ChipDriver;
use crate::error::{Error, Result};
use crate::lifecycle::{DeviceLifecycle, DriverInstance, LifecycleState};
use crate::netif::NetifProvider;
use crate::params::ProbeParams;
use crate::resource::PinResolver;
use crate::{DRV_NAME, DRV_VERSION};

/// A loadable instance of the driver
pub struct DriverModule<R: PinResolver, C: ChipDriver, N: NetifProvider> {
    registrar: BusRegistrar,
    lifecycle: DeviceLifecycle<R, C, N>,
    params: ProbeParams,
    child: Option<SpiChild>,
    last_probe_error: Option<Error>,
}

impl<R: PinResolver, C: ChipDriver, N: NetifProvider> DriverModule<R, C, N> {
    /// Create an unloaded module
    pub fn new(lifecycle: DeviceLifecycle<R, C, N>, params: ProbeParams) -> Self {
        Self {
            registrar: BusRegistrar::new(DRV_NAME),
            lifecycle,
            params,
            child: None,
            last_probe_error: None,
        }
    }

    /// Load the module onto `bus`
    ///
    /// The template's driver tag and chip-select are replaced by the
    /// module's own. Registration failures abort the load. A probe failure
    /// does not: the driver stays registered, the instance stays unbound
    /// and the error is kept in [`last_probe_error`](Self::last_probe_error).
    pub fn load<B: SpiBus + ?Sized>(&mut self, bus: &mut B, template: BoardInfo) -> Result<()> {
        if self.child.is_some() {
            log::warn!("{}: already loaded, reloading", DRV_NAME);
            self.unload(bus);
        }

        log::info!("{}: {}", DRV_NAME, DRV_VERSION);
        log_bus_devices(bus);

        let info = BoardInfo {
            modalias: self.registrar.driver().into(),
            chip_select: self.params.chip_select,
            ..template
        };

        let device = self.registrar.ensure_registered(bus, &info).map_err(|e| {
            log::error!("{}: failed to register SPI device", DRV_NAME);
            e
        })?;

        if let Err(e) = self.registrar.register_driver(bus) {
            if let Err(del) = bus.delete_device(&device) {
                log::warn!("{}: cleanup of {}: {}", DRV_NAME, device.name(), del);
            }
            return Err(e);
        }

        let child = SpiChild {
            device,
            chip_select: info.chip_select,
        };
        self.last_probe_error = match self.lifecycle.probe(&child, &self.params) {
            Ok(()) => None,
            Err(e) => {
                log::error!("{}: probe of {} failed: {}", DRV_NAME, child.device.name(), e);
                Some(e)
            }
        };
        self.child = Some(child);

        log::info!("{} spi register succeed", DRV_NAME);
        log_bus_devices(bus);
        Ok(())
    }

    /// Unload the module; never fails
    pub fn unload<B: SpiBus + ?Sized>(&mut self, bus: &mut B) {
        self.registrar.unregister_driver(bus);
        if let Some(child) = self.child.take() {
            self.lifecycle.remove(&child);
        }
    }

    /// The device went away underneath the driver
    ///
    /// Runs remove but leaves the driver registered.
    pub fn device_removed(&mut self) {
        if let Some(child) = &self.child {
            self.lifecycle.remove(child);
        }
    }

    /// Whether the registered child still exists on `bus`
    pub fn is_attached<B: SpiBus + ?Sized>(&self, bus: &B) -> bool {
        self.lifecycle
            .instance()
            .bus_device()
            .is_some_and(|dev| bus.find_device(dev.name()).is_some())
    }

    /// Whether [`load`](Self::load) has completed without a matching unload
    pub fn is_loaded(&self) -> bool {
        self.child.is_some()
    }

    /// Lifecycle state of the instance
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// The driver instance record
    pub fn instance(&self) -> &DriverInstance<N::Handle> {
        self.lifecycle.instance()
    }

    /// The lifecycle
    pub fn lifecycle(&self) -> &DeviceLifecycle<R, C, N> {
        &self.lifecycle
    }

    /// Configured probe parameters
    pub fn params(&self) -> &ProbeParams {
        &self.params
    }

    /// Error from the most recent probe, if it failed
    pub fn last_probe_error(&self) -> Option<Error> {
        self.last_probe_error
    }
}
