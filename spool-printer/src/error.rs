//! Device errors

use thiserror::Error;

/// Failure while opening, writing or closing a printer
///
/// Every variant counts as one failed print attempt for the caller.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Device node or serial port is missing at open time
    #[error("Device not found: {0}")]
    NotFound(String),

    /// TCP connect refused or reset
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Write or close failed mid-stream
    #[error("Device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// Bad address, encoding name or similar
    #[error("Invalid device configuration: {0}")]
    InvalidConfig(String),
}

pub type PrintResult<T> = Result<T, PrintError>;
