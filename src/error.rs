//! Startup error taxonomy
//!
//! Only failures before the server is running are represented here. Errors that
//! happen while answering a request become HTTP statuses inside the handler.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid listen address {0}")]
    InvalidAddress(String),

    #[error("Root directory '{}' is not usable: {source}", path.display())]
    RootDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    Logger(std::io::Error),

    #[error("Failed to start runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

impl ServeError {
    /// Process exit status for this failure.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Bind { .. }
            | Self::Config(_)
            | Self::InvalidAddress(_)
            | Self::RootDirectory { .. }
            | Self::Logger(_)
            | Self::Runtime(_) => 1,
        }
    }

    pub const fn is_bind_error(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}

pub type Result<T> = std::result::Result<T, ServeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_message_names_address() {
        let err = ServeError::Bind {
            addr: "0.0.0.0:8000".parse().unwrap(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.0.0.0:8000"));
        assert!(msg.contains("address in use"));
        assert!(err.is_bind_error());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_startup_errors_exit_nonzero() {
        let err = ServeError::InvalidAddress("'x'".to_string());
        assert!(!err.is_bind_error());
        assert_ne!(err.exit_code(), 0);
    }
}
