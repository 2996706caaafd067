use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value or logging setup failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required host bridge was not provided
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
