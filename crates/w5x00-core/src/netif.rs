//! Network interface bridge
//!
//! Creates and destroys the network interface that fronts the chip. The
//! packet path is not handled here; the bridge only owns the handle.

use crate::error::{Error, Result};
use crate::lifecycle::DriverInstance;
use crate::params::MacAddress;
use crate::resource::IrqNumber;
use alloc::boxed::Box;

/// A live network interface
pub trait NetInterface {
    /// Interface name as the network stack knows it (e.g. `w5x0`)
    fn name(&self) -> &str;
}

impl<I: NetInterface + ?Sized> NetInterface for Box<I> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Network stack backend
pub trait NetifProvider {
    /// Handle to a registered interface
    type Handle: NetInterface;

    /// Allocate and register an interface
    fn create(&mut self, mac: MacAddress, irq: IrqNumber) -> Result<Self::Handle>;

    /// Unregister and free an interface
    fn destroy(&mut self, handle: Self::Handle) -> Result<()>;
}

impl<N: NetifProvider + ?Sized> NetifProvider for Box<N> {
    type Handle = N::Handle;

    fn create(&mut self, mac: MacAddress, irq: IrqNumber) -> Result<Self::Handle> {
        (**self).create(mac, irq)
    }

    fn destroy(&mut self, handle: Self::Handle) -> Result<()> {
        (**self).destroy(handle)
    }
}

/// Creates/destroys the interface for a bound driver instance
#[derive(Debug)]
pub struct NetworkInterfaceBridge<N> {
    provider: N,
}

impl<N: NetifProvider> NetworkInterfaceBridge<N> {
    /// Wrap a provider
    pub fn new(provider: N) -> Self {
        Self { provider }
    }

    /// Create the interface for `instance`
    ///
    /// The instance must be bound (have an IRQ); otherwise this fails with
    /// [`Error::InterfaceCreateFailed`] without calling the provider.
    pub fn create(&mut self, instance: &DriverInstance<N::Handle>) -> Result<N::Handle> {
        let irq = instance.irq().ok_or(Error::InterfaceCreateFailed)?;
        let handle = self
            .provider
            .create(instance.mac(), irq)
            .map_err(|e| {
                log::debug!("{}: provider refused interface: {}", crate::DRV_NAME, e);
                Error::InterfaceCreateFailed
            })?;
        log::info!(
            "{}: {} up, hwaddr {}, irq {}",
            crate::DRV_NAME,
            handle.name(),
            instance.mac(),
            irq
        );
        Ok(handle)
    }

    /// Destroy `handle`; a no-op on `None`
    pub fn destroy(&mut self, handle: Option<N::Handle>) {
        let Some(handle) = handle else {
            return;
        };
        log::info!("{}: {} down", crate::DRV_NAME, handle.name());
        if let Err(e) = self.provider.destroy(handle) {
            log::warn!("{}: interface teardown: {}", crate::DRV_NAME, e);
        }
    }

    /// The provider backend
    pub fn provider(&self) -> &N {
        &self.provider
    }

    /// The provider backend, mutably
    pub fn provider_mut(&mut self) -> &mut N {
        &mut self.provider
    }
}
