//! Chip initialization hook
//!
//! Register programming and the SPI wire protocol live outside this crate.
//! The lifecycle only needs to tell the chip side when to come up and when
//! to go away.

use crate::error::Result;
use crate::params::MacAddress;
use crate::resource::PinBinding;
use alloc::boxed::Box;

/// What the chip side gets to work with at init time
#[derive(Debug, Clone, Copy)]
pub struct ChipConfig<'a> {
    /// Chip-select the device is on
    pub chip_select: u8,
    /// Bound interrupt/reset pins
    pub binding: &'a PinBinding,
    /// MAC address to program
    pub mac: MacAddress,
}

/// Chip-level bring-up and shutdown
pub trait ChipDriver {
    /// Initialize the chip
    ///
    /// On failure the implementation must leave nothing allocated; the
    /// lifecycle does not call [`exit`](Self::exit) after a failed init.
    fn init(&mut self, config: &ChipConfig<'_>) -> Result<()>;

    /// Shut the chip down and free its interrupt
    fn exit(&mut self) -> Result<()>;
}

impl<C: ChipDriver + ?Sized> ChipDriver for Box<C> {
    fn init(&mut self, config: &ChipConfig<'_>) -> Result<()> {
        (**self).init(config)
    }

    fn exit(&mut self) -> Result<()> {
        (**self).exit()
    }
}
