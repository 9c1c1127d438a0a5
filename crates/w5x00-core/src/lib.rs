//! w5x00-core - Attach/detach lifecycle for the W5x00 MACRAW driver
//!
//! This crate holds the part of the driver that decides *when* things
//! happen: registering the SPI child device, binding the interrupt and
//! reset pins, bringing the network interface up, and tearing all of it
//! down again. Everything that touches real hardware sits behind a trait:
//!
//! - [`bus::SpiBus`] - the SPI bus framework (device namespace, driver binding)
//! - [`resource::PinResolver`] - GPIO line lookup and pin-to-IRQ mapping
//! - [`chip::ChipDriver`] - chip-level initialization over SPI
//! - [`netif::NetifProvider`] - network interface creation
//!
//! The crate is `no_std` compatible; it only needs `alloc`.
//!
//! # Example
//!
//! ```ignore
//! use w5x00_core::bus::BoardInfo;
//! use w5x00_core::module::DriverModule;
//! use w5x00_core::params::ProbeParams;
//!
//! let mut module = DriverModule::new(lifecycle, ProbeParams::default());
//! module.load(&mut bus, BoardInfo::default())?;
//! println!("state: {}", module.state());
//! module.unload(&mut bus);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod chip;
pub mod error;
pub mod lifecycle;
pub mod module;
pub mod netif;
pub mod params;
pub mod resource;

pub use error::{Error, Result};

/// Driver tag used for the bus registration and in log prefixes
pub const DRV_NAME: &str = "w5x00";

/// Driver version reported at module load
pub const DRV_VERSION: &str = env!("CARGO_PKG_VERSION");
