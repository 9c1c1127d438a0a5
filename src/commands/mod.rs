//! CLI command implementations
//!
//! Every command works on a [`w5x00_host::ModuleHandle`], so the same code
//! drives the dummy and the Linux backends.

mod attach;
mod list;
mod register;

pub use attach::run_attach;
pub use list::{list_backends, list_devices};
pub use register::run_register;
