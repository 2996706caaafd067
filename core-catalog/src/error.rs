//! Error types for catalog requests

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Catalog request errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The server answered with a non-2xx status
    #[error("Catalog API error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// The server could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The response body was not the expected JSON
    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Coarse failure category, used to pick a message and an icon in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    Network,
    Timeout,
    Auth,
    Client,
    Server,
    Unknown,
}

impl CatalogError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            CatalogError::Network(_) => CatalogErrorKind::Network,
            CatalogError::Timeout(_) => CatalogErrorKind::Timeout,
            CatalogError::Parse(_) => CatalogErrorKind::Unknown,
            CatalogError::Http { status, .. } => match status {
                401 | 403 => CatalogErrorKind::Auth,
                400 | 404 => CatalogErrorKind::Client,
                500 | 503 => CatalogErrorKind::Server,
                _ => CatalogErrorKind::Unknown,
            },
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Network(_) => {
                "Unable to reach the server, please check your network connection".to_string()
            }
            CatalogError::Timeout(_) => {
                "Connection timed out, please try again later".to_string()
            }
            CatalogError::Parse(_) => "Unexpected response from the server".to_string(),
            CatalogError::Http { status, .. } => match status {
                400 => "Bad request".to_string(),
                401 => "Unauthorized".to_string(),
                403 => "Access denied".to_string(),
                404 => "The requested resource does not exist".to_string(),
                500 => "Server error".to_string(),
                503 => "Service temporarily unavailable".to_string(),
                other => format!("An error occurred ({})", other),
            },
        }
    }
}

impl From<BridgeError> for CatalogError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Timeout(msg) => CatalogError::Timeout(msg),
            BridgeError::Network(msg) => CatalogError::Network(msg),
            BridgeError::Io(err) => CatalogError::Network(err.to_string()),
            other => CatalogError::Network(other.to_string()),
        }
    }
}
