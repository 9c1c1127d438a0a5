//! Driver instance record

use crate::bus::BusDeviceRef;
use crate::params::{MacAddress, ProbeParams};
use crate::resource::IrqNumber;

/// Everything the driver knows about the one chip it manages
///
/// Zeroed between attach cycles. The network handle is `Some` exactly while
/// the lifecycle is attached.
#[derive(Debug)]
pub struct DriverInstance<H> {
    chip_select: u8,
    interrupt_pin: u32,
    reset_pin: u32,
    irq: Option<IrqNumber>,
    mac: MacAddress,
    pub(super) net: Option<H>,
    bus_device: Option<BusDeviceRef>,
}

impl<H> Default for DriverInstance<H> {
    fn default() -> Self {
        Self {
            chip_select: 0,
            interrupt_pin: 0,
            reset_pin: 0,
            irq: None,
            mac: MacAddress([0; 6]),
            net: None,
            bus_device: None,
        }
    }
}

impl<H> DriverInstance<H> {
    /// Fresh instance populated from the configured parameters
    pub(super) fn from_params(params: &ProbeParams, bus_device: BusDeviceRef) -> Self {
        Self {
            chip_select: params.chip_select,
            interrupt_pin: params.interrupt_pin,
            reset_pin: params.reset_pin,
            irq: None,
            mac: params.mac,
            net: None,
            bus_device: Some(bus_device),
        }
    }

    pub(super) fn set_irq(&mut self, irq: IrqNumber) {
        self.irq = Some(irq);
    }

    /// Chip-select the driver is bound to
    pub fn chip_select(&self) -> u8 {
        self.chip_select
    }

    /// Interrupt pin
    pub fn interrupt_pin(&self) -> u32 {
        self.interrupt_pin
    }

    /// Reset pin
    pub fn reset_pin(&self) -> u32 {
        self.reset_pin
    }

    /// IRQ, valid only while bound
    pub fn irq(&self) -> Option<IrqNumber> {
        self.irq
    }

    /// MAC address
    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// The network interface handle, if attached
    pub fn network_handle(&self) -> Option<&H> {
        self.net.as_ref()
    }

    /// The bus child this instance was probed from
    pub fn bus_device(&self) -> Option<&BusDeviceRef> {
        self.bus_device.as_ref()
    }
}
