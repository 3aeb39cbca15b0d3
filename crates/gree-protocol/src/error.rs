//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the chiller protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// The trailing byte does not match the computed checksum. None of the
    /// frame's fields can be trusted.
    #[error("checksum mismatch: frame carries 0x{expected:02X}, computed 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum byte carried by the frame.
        expected: u8,
        /// Checksum computed over the frame contents.
        actual: u8,
    },

    /// No field-layout profile matches the frame's type and length. No
    /// fields are produced rather than guessed ones.
    #[error("no known layout for frame type 0x{frame_type:02X} with length {length}")]
    UnknownLayout {
        /// Type byte of the rejected frame.
        frame_type: u8,
        /// Total length of the rejected frame.
        length: usize,
    },
}
