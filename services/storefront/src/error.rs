//! services/storefront/src/error.rs
//!
//! Defines the primary error type for the storefront client.

use crate::config::ConfigError;
use markethub_core::ports::PortError;

/// The primary error type for the `storefront` service.
///
/// Every variant renders as the single human-readable line shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(#[from] PortError),

    /// A required form field was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Neither the remote API nor the local user table accepted the credentials.
    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("An account with email {0} already exists")]
    DuplicateEmail(String),

    /// Represents a standard Input/Output error (e.g. creating the data directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
