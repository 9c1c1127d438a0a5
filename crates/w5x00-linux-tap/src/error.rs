//! Error types for TAP interface operations

use std::path::PathBuf;
use thiserror::Error;

/// TAP interface specific errors
#[derive(Debug, Error)]
pub enum TapError {
    /// Failed to open the tun clone device
    #[error("Failed to open {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Interface name does not fit in IFNAMSIZ
    #[error("Interface name '{0}' is too long")]
    NameTooLong(String),

    /// An interface ioctl failed
    #[error("{op} on {ifname} failed: {source}")]
    Ioctl {
        op: &'static str,
        ifname: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open the control socket
    #[error("Failed to open control socket: {0}")]
    SocketFailed(#[source] std::io::Error),
}

/// Result type for TAP operations
pub type Result<T> = std::result::Result<T, TapError>;
