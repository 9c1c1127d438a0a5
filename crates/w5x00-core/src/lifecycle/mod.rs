//! Probe/remove state machine
//!
//! ```text
//!            probe: bind ok, chip ok        netif ok
//! UNBOUND ───────────────────────────▶ BOUND ─────────▶ ATTACHED
//!    ▲                                   │                  │
//!    └───────────────── remove ──────────┴──────────────────┘
//! ```
//!
//! A failed pin bind or chip init rolls back to `UNBOUND` and fails the
//! probe. A failed interface creation does not: the chip is up, so the
//! instance stays `BOUND` and probe still succeeds. Remove never fails and
//! is a no-op on an unbound instance.
//!
//! Calls are serialized by `&mut self`; a host that shares a lifecycle
//! between threads must put it behind a mutex.

mod instance;

pub use instance::DriverInstance;

use crate::bus::SpiChild;
use crate::chip::{ChipConfig, ChipDriver};
use crate::error::{Error, Result};
use crate::netif::{NetInterface, NetifProvider, NetworkInterfaceBridge};
use crate::params::ProbeParams;
use crate::resource::{PinResolver, ResourceBinder};
use crate::DRV_NAME;
use core::fmt;

/// Where the driver instance is in its attach cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Nothing held
    Unbound,
    /// Pins bound and chip initialized, no network interface
    Bound,
    /// Pins bound, chip initialized, network interface registered
    Attached,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "unbound"),
            Self::Bound => write!(f, "bound"),
            Self::Attached => write!(f, "attached"),
        }
    }
}

/// Owns the driver instance and drives it through probe and remove
pub struct DeviceLifecycle<R: PinResolver, C: ChipDriver, N: NetifProvider> {
    binder: ResourceBinder<R>,
    chip: C,
    bridge: NetworkInterfaceBridge<N>,
    instance: DriverInstance<N::Handle>,
    state: LifecycleState,
}

impl<R: PinResolver, C: ChipDriver, N: NetifProvider> DeviceLifecycle<R, C, N> {
    /// Create an unbound lifecycle over the three backends
    pub fn new(pins: R, chip: C, netif: N) -> Self {
        Self {
            binder: ResourceBinder::new(pins),
            chip,
            bridge: NetworkInterfaceBridge::new(netif),
            instance: DriverInstance::default(),
            state: LifecycleState::Unbound,
        }
    }

    /// Attach to `child` using `params`
    ///
    /// The chip-select recorded is always the configured one, whatever the
    /// bus reported. Errors are not retried here.
    ///
    /// # Panics
    ///
    /// Probing an instance that is not unbound is an ordering bug in the
    /// caller and panics.
    pub fn probe(&mut self, child: &SpiChild, params: &ProbeParams) -> Result<()> {
        log::info!(
            "{} probe [int {}, rst {}, sel {}, mac {}]",
            DRV_NAME,
            params.interrupt_pin,
            params.reset_pin,
            params.chip_select,
            params.mac
        );
        assert_eq!(
            self.state,
            LifecycleState::Unbound,
            "probe of {} while {}",
            child.device.name(),
            self.state
        );

        log::debug!("chip select before: {}", child.chip_select);
        self.instance = DriverInstance::from_params(params, child.device.clone());

        let binding = match self.binder.bind(params.interrupt_pin, params.reset_pin) {
            Ok(binding) => binding,
            Err(e) => {
                log::error!("{}: binding pins failed: {}", DRV_NAME, e);
                self.instance = DriverInstance::default();
                return Err(Error::DeviceInitFailed);
            }
        };
        self.instance.set_irq(binding.irq());

        let config = ChipConfig {
            chip_select: params.chip_select,
            binding,
            mac: params.mac,
        };
        if let Err(e) = self.chip.init(&config) {
            log::error!("{}: chip init failed: {}", DRV_NAME, e);
            self.binder.release();
            self.instance = DriverInstance::default();
            return Err(Error::DeviceInitFailed);
        }
        self.state = LifecycleState::Bound;

        match self.bridge.create(&self.instance) {
            Ok(handle) => {
                self.instance.net = Some(handle);
                self.state = LifecycleState::Attached;
            }
            Err(e) => {
                log::warn!("{}: {}; staying bound without an interface", DRV_NAME, e);
            }
        }

        log::info!("{} probe done ({})", DRV_NAME, self.state);
        Ok(())
    }

    /// Detach from `child`
    ///
    /// Sub-step failures are logged and teardown carries on.
    pub fn remove(&mut self, child: &SpiChild) {
        log::info!("{} remove {}", DRV_NAME, child.device.name());
        self.teardown();
        log::info!("{} remove done", DRV_NAME);
    }

    fn teardown(&mut self) {
        if self.state != LifecycleState::Unbound {
            self.bridge.destroy(self.instance.net.take());
            if let Err(e) = self.chip.exit() {
                log::warn!("{}: chip exit: {}", DRV_NAME, e);
            }
        }
        self.binder.release();
        self.instance = DriverInstance::default();
        self.state = LifecycleState::Unbound;
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The driver instance record
    pub fn instance(&self) -> &DriverInstance<N::Handle> {
        &self.instance
    }

    /// Name of the network interface, if attached
    pub fn interface_name(&self) -> Option<&str> {
        self.instance.network_handle().map(|h| h.name())
    }

    /// Pin binder
    pub fn binder(&self) -> &ResourceBinder<R> {
        &self.binder
    }

    /// Chip backend
    pub fn chip(&self) -> &C {
        &self.chip
    }

    /// Network interface backend
    pub fn netif(&self) -> &N {
        self.bridge.provider()
    }
}

impl<R: PinResolver, C: ChipDriver, N: NetifProvider> Drop for DeviceLifecycle<R, C, N> {
    fn drop(&mut self) {
        if self.state != LifecycleState::Unbound {
            log::debug!("{}: dropped while {}, tearing down", DRV_NAME, self.state);
            self.teardown();
        }
    }
}
