//! w5x00-linux-tap - TAP network interface backend
//!
//! This crate fronts the W5x00 with a Linux TAP interface, so the chip
//! shows up to the network stack as `w5x0`, `w5x1`, ...
//!
//! # Overview
//!
//! Each created interface is a non-persistent TAP device opened through
//! `/dev/net/tun`. Its hardware address is set to the driver's MAC and it
//! is brought up. Closing the descriptor removes the interface, so
//! [`TapProvider`] destroys an interface by dropping its handle.
//!
//! # Example
//!
//! ```no_run
//! use w5x00_core::netif::{NetInterface, NetifProvider};
//! use w5x00_core::params::MacAddress;
//! use w5x00_core::resource::IrqNumber;
//! use w5x00_linux_tap::{TapConfig, TapProvider};
//!
//! let mut provider = TapProvider::new(TapConfig::default());
//! let iface = provider.create(MacAddress([0x00, 0x08, 0xdc, 1, 2, 3]), IrqNumber(177))?;
//! println!("created {}", iface.name());
//! provider.destroy(iface)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with TUN/TAP support (`CONFIG_TUN`)
//! - `CAP_NET_ADMIN` to create interfaces and change their address

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, IfReq, TapConfig, TapInterface, TapProvider};
pub use error::{Result, TapError};
