use thiserror::Error;

/// Startup errors of the service binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid bind address: {addr}")]
    InvalidBindAddress { addr: String },

    #[error("Static prefix must start with '/' and not be the root, got: {prefix}")]
    InvalidStaticPrefix { prefix: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Earth Engine authentication failed: {0}")]
    Credentials(#[from] sarmap::io::CredentialError),

    #[error("Earth Engine client error: {0}")]
    EarthEngine(#[from] sarmap::io::EarthEngineError),
}
