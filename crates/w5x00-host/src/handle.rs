//! ModuleHandle - a driver module bound to one backend
//!
//! The module, its bus and the three collaborator backends are generic in
//! `w5x00-core`. The handle erases them so the CLI can drive any backend
//! through the same calls, the way a module loader drives any driver.

use w5x00_core::bus::{BoardInfo, BusDevice, BusDeviceRef, BusRegistrar, SpiBus};
use w5x00_core::chip::ChipDriver;
use w5x00_core::error::Error;
use w5x00_core::lifecycle::LifecycleState;
use w5x00_core::module::DriverModule;
use w5x00_core::netif::{NetInterface, NetifProvider};
use w5x00_core::resource::{IrqNumber, PinResolver};
use w5x00_core::DRV_NAME;

/// Operations the CLI needs from a module and its bus
pub(crate) trait ModuleOps {
    fn load(&mut self, template: &BoardInfo) -> Result<(), Error>;
    fn unload(&mut self);
    fn register(&mut self, template: &BoardInfo) -> Result<BusDeviceRef, Error>;
    fn devices(&self) -> Vec<BusDevice>;
    fn state(&self) -> LifecycleState;
    fn interface_name(&self) -> Option<String>;
    fn irq(&self) -> Option<IrqNumber>;
    fn last_probe_error(&self) -> Option<Error>;
    fn is_loaded(&self) -> bool;
    fn is_attached(&self) -> bool;
}

/// A bus together with the module loaded onto it
pub(crate) struct Backend<B, R, C, N>
where
    B: SpiBus,
    R: PinResolver,
    C: ChipDriver,
    N: NetifProvider,
{
    pub(crate) bus: B,
    pub(crate) module: DriverModule<R, C, N>,
}

impl<B, R, C, N> ModuleOps for Backend<B, R, C, N>
where
    B: SpiBus,
    R: PinResolver,
    C: ChipDriver,
    N: NetifProvider,
{
    fn load(&mut self, template: &BoardInfo) -> Result<(), Error> {
        self.module.load(&mut self.bus, template.clone())
    }

    fn unload(&mut self) {
        self.module.unload(&mut self.bus);
    }

    fn register(&mut self, template: &BoardInfo) -> Result<BusDeviceRef, Error> {
        let info = BoardInfo {
            modalias: DRV_NAME.into(),
            chip_select: self.module.params().chip_select,
            ..template.clone()
        };
        BusRegistrar::new(DRV_NAME).ensure_registered(&mut self.bus, &info)
    }

    fn devices(&self) -> Vec<BusDevice> {
        self.bus.devices()
    }

    fn state(&self) -> LifecycleState {
        self.module.state()
    }

    fn interface_name(&self) -> Option<String> {
        self.module
            .instance()
            .network_handle()
            .map(|h| h.name().to_string())
    }

    fn irq(&self) -> Option<IrqNumber> {
        self.module.instance().irq()
    }

    fn last_probe_error(&self) -> Option<Error> {
        self.module.last_probe_error()
    }

    fn is_loaded(&self) -> bool {
        self.module.is_loaded()
    }

    fn is_attached(&self) -> bool {
        self.module.is_attached(&self.bus)
    }
}

impl<B, R, C, N> Drop for Backend<B, R, C, N>
where
    B: SpiBus,
    R: PinResolver,
    C: ChipDriver,
    N: NetifProvider,
{
    fn drop(&mut self) {
        if self.module.is_loaded() {
            self.module.unload(&mut self.bus);
        }
    }
}

/// Driver module handle
///
/// Owns the backend and the module. Dropping a loaded handle unloads it.
pub struct ModuleHandle {
    backend: &'static str,
    template: BoardInfo,
    inner: Box<dyn ModuleOps>,
}

impl ModuleHandle {
    pub(crate) fn new(backend: &'static str, template: BoardInfo, inner: Box<dyn ModuleOps>) -> Self {
        Self {
            backend,
            template,
            inner,
        }
    }

    /// Canonical name of the backend
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Registration template used by [`load`](Self::load)
    pub fn template(&self) -> &BoardInfo {
        &self.template
    }

    /// Load the module: register the SPI child and the driver, then probe
    ///
    /// A probe failure does not fail the load; check
    /// [`last_probe_error`](Self::last_probe_error).
    pub fn load(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.inner.load(&self.template).map_err(Into::into)
    }

    /// Unload the module
    pub fn unload(&mut self) {
        self.inner.unload();
    }

    /// Only make sure the SPI child is registered, without loading
    pub fn register(&mut self) -> Result<BusDeviceRef, Box<dyn std::error::Error>> {
        self.inner.register(&self.template).map_err(Into::into)
    }

    /// Snapshot of the devices on the bus
    pub fn devices(&self) -> Vec<BusDevice> {
        self.inner.devices()
    }

    /// Lifecycle state of the driver instance
    pub fn state(&self) -> LifecycleState {
        self.inner.state()
    }

    /// Name of the network interface, once attached
    pub fn interface_name(&self) -> Option<String> {
        self.inner.interface_name()
    }

    /// Interrupt number of the bound instance
    pub fn irq(&self) -> Option<IrqNumber> {
        self.inner.irq()
    }

    /// Error from the most recent probe, if it failed
    pub fn last_probe_error(&self) -> Option<Error> {
        self.inner.last_probe_error()
    }

    /// Whether the module is loaded
    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    /// Whether the registered SPI child is still on the bus
    pub fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }
}
