//! w5x00-linux-gpio - Linux GPIO pin resolver
//!
//! This crate resolves the W5x00's interrupt and reset pins through the
//! Linux GPIO character device interface (gpiocdev).
//!
//! # Overview
//!
//! Pins are line offsets on one `/dev/gpiochipN`. A pin is available when
//! the line exists and no other consumer holds it. Userspace cannot see
//! the kernel's IRQ numbers, so the interrupt number reported for a pin is
//! `irqbase + offset`, with `irqbase` matching the chip's IRQ domain base.
//!
//! Binding only records the pins; the lines themselves are left unrequested.
//!
//! # Example
//!
//! ```no_run
//! use w5x00_core::resource::ResourceBinder;
//! use w5x00_linux_gpio::{GpioPins, LinuxGpioConfig};
//!
//! let pins = GpioPins::open(&LinuxGpioConfig::new("/dev/gpiochip0"))?;
//! let mut binder = ResourceBinder::new(pins);
//! let binding = binder.bind(17, 27)?;
//! println!("interrupt line maps to irq {}", binding.irq());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the w5x00 CLI
//!
//! ```bash
//! # Use gpiochip0 with the default IRQ base
//! w5x00 -b linux:gpiochip=0 attach
//!
//! # Explicit chip path and IRQ base
//! w5x00 -b linux:dev=/dev/gpiochip1,irqbase=200 attach
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{irq_number, parse_options, GpioPins, LinuxGpioConfig};
pub use error::{LinuxGpioError, Result};
