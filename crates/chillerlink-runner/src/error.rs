//! Runner error types.

use thiserror::Error;

/// Errors surfaced by the runner. Transport failures are passed through
/// untouched; retrying is a caller decision.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Byte source/sink failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Serial port open failure.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Protocol-level decode failure.
    #[error(transparent)]
    Protocol(#[from] gree_protocol::ProtocolError),

    /// Invalid hex input to the analyzer.
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    /// No status frame arrived within the allotted attempts.
    #[error("no status response from unit")]
    NoResponse,
}
