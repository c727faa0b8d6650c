//! Error types for scale-keys

use thiserror::Error;

/// Result type alias for scale-keys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in scale-keys
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown pitch class or scale name, or a malformed scale pattern
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// MIDI output could not be opened
    #[error("failed to open MIDI output: {0}")]
    PortOpen(String),

    /// Transmission failure on an open MIDI output
    #[error("failed to send MIDI message: {0}")]
    PortWrite(#[from] midir::SendError),

    /// OS-level keyboard hook could not be registered
    #[error("keyboard hook error: {0}")]
    Hook(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
