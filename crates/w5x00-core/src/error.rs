//! Error types for w5x00-core
//!
//! This module provides a no_std compatible error type shared by the
//! lifecycle, the registrar and every backend trait.

use core::fmt;

/// Why a bus registration could not be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationFailure {
    /// No SPI master exists for the requested bus number
    ControllerNotFound {
        /// Bus number that was looked up
        bus_num: u16,
    },
    /// The stale descriptor was found but could not be deleted
    DeleteFailed,
    /// The bus refused to create the new child device
    CreateFailed,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pin could not be mapped (invalid offset, or claimed elsewhere)
    ResourceUnavailable {
        /// The pin that failed to resolve
        pin: u32,
    },
    /// Bus child registration failed
    RegistrationFailed(RegistrationFailure),
    /// The bus refused to register the driver tag
    DriverRegisterFailed,
    /// Resource binding or chip initialization failed during probe
    DeviceInitFailed,
    /// The network subsystem rejected the interface
    InterfaceCreateFailed,
    /// A bus operation failed without a more specific cause
    BusError,
}

impl fmt::Display for RegistrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControllerNotFound { bus_num } => {
                write!(f, "no SPI master for bus {}", bus_num)
            }
            Self::DeleteFailed => write!(f, "stale device could not be deleted"),
            Self::CreateFailed => write!(f, "new SPI device could not be created"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable { pin } => write!(f, "pin {} is not available", pin),
            Self::RegistrationFailed(failure) => {
                write!(f, "failed to register SPI device: {}", failure)
            }
            Self::DriverRegisterFailed => write!(f, "SPI driver registration failed"),
            Self::DeviceInitFailed => write!(f, "device initialization failed"),
            Self::InterfaceCreateFailed => write!(f, "network interface creation failed"),
            Self::BusError => write!(f, "SPI bus error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_nests_registration_cause() {
        let err = Error::RegistrationFailed(RegistrationFailure::ControllerNotFound { bus_num: 3 });
        assert_eq!(
            err.to_string(),
            "failed to register SPI device: no SPI master for bus 3"
        );
        assert_eq!(
            Error::ResourceUnavailable { pin: 17 }.to_string(),
            "pin 17 is not available"
        );
    }
}
