//! SPI bus abstractions
//!
//! This module defines the bus framework trait the driver registers
//! against, the descriptor types it exchanges, and the registrar that
//! keeps exactly one child device registered for the driver.

pub mod registrar;
mod traits;
mod types;

pub use registrar::{log_bus_devices, plan_registration, BusRegistrar, RegistrationPlan};
pub use traits::*;
pub use types::*;
