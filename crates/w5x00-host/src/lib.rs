//! Host-side driver runtime
//!
//! This crate pairs a backend (the bus, pin, chip and network stack
//! implementations) with a [`DriverModule`](w5x00_core::module::DriverModule)
//! and hides the generic plumbing behind a single type. The CLI only
//! interacts with types from this crate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CLI (bin/w5x00)                       │
//! │  - Only imports w5x00-host and w5x00-core (params, types)   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    w5x00-host (this crate)                   │
//! │  - ModuleHandle: a loaded-or-not driver module + its bus     │
//! │  - Backend registry: opens backends by name                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │    w5x00-core            │   │  Backend crates          │
//! │  - DriverModule          │   │  - dummy, linux-spi,     │
//! │  - DeviceLifecycle       │   │    linux-gpio, linux-tap │
//! │  - BusRegistrar          │   │  - Implement the traits  │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use w5x00_core::bus::BoardInfo;
//! use w5x00_core::params::ProbeParams;
//! use w5x00_host::open_module;
//!
//! let mut handle = open_module("dummy:stale=0", ProbeParams::default(), BoardInfo::default())?;
//! handle.load()?;
//! println!("{} is {}", handle.interface_name().unwrap_or_default(), handle.state());
//! handle.unload();
//! ```

mod handle;
mod registry;

pub use handle::ModuleHandle;
pub use registry::{
    available_backends, backend_names_short, open_module, parse_backend_params, BackendInfo,
    BackendParams,
};
