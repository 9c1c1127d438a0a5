//! w5x00-linux-spi - Linux SPI bus backend
//!
//! This crate lets the W5x00 driver register its SPI child on a real Linux
//! SPI bus, through sysfs, and bring the chip's SPI link up through spidev.
//!
//! # Overview
//!
//! SPI slots on Linux are declared by the device tree and show up under
//! `/sys/bus/spi/devices/spiX.Y`. [`SysfsSpiBus`] implements the bus
//! framework the driver registers against on top of that tree: deleting a
//! stale device unbinds it, registering one binds the slot to a kernel
//! driver (spidev by default) through `driver_override`.
//!
//! [`SpidevChip`] opens `/dev/spidevX.Y` once a slot is bound and applies
//! the registration's mode, word size and clock.
//!
//! # Example
//!
//! ```no_run
//! use w5x00_core::bus::{BoardInfo, BusRegistrar};
//! use w5x00_linux_spi::{LinuxSpiConfig, SysfsSpiBus};
//!
//! let mut bus = SysfsSpiBus::new(LinuxSpiConfig::default());
//! let registrar = BusRegistrar::new("w5x00");
//! let dev = registrar.ensure_registered(&mut bus, &BoardInfo::default())?;
//! println!("registered {}", dev.name());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the w5x00 CLI
//!
//! ```bash
//! # Bind spi0.0 to spidev and attach
//! w5x00 -b linux attach
//!
//! # Bind to a different kernel driver
//! w5x00 -b linux:driver=w5100 register
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with `driver_override` support for SPI (4.20+)
//! - The SPI slot declared in the device tree
//! - Write access to `/sys/bus/spi` (usually root)

pub mod bus;
pub mod error;
pub mod spidev;

// Re-exports
pub use bus::{parse_device_name, parse_options, LinuxSpiConfig, SysfsSpiBus};
pub use error::{LinuxSpiError, Result};
pub use spidev::{SpidevChip, SpidevSettings};
