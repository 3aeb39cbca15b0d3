//! Frame delimiting over a continuous byte stream.
//!
//! Every frame begins with the 2-byte sync marker followed by a length
//! position:
//!
//! ```text
//! +------+------+-----+------+------+--------------+----------+
//! | 0x7E | 0x7E | len | type | addr | body         | checksum |
//! +------+------+-----+------+------+--------------+----------+
//! ```
//!
//! The declared length covers everything after itself (type through
//! checksum), so the total frame size is `len + 3`. On the network feed the
//! length position instead carries the fixed frame-class indicator `0xFF`
//! and every frame is 69 bytes.

use bytes::{Buf, BytesMut};

use crate::constants::*;
use crate::error::ProtocolError;

/// How frame boundaries are determined on a given byte source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Byte 2 declares the frame length; total size is `declared + 3`.
    /// This is the serial link format.
    LengthPrefixed,
    /// Fixed 69-byte frames beginning `7E 7E FF E0`, as delivered by the
    /// network feed.
    FixedLongStatus,
}

/// One complete, delimited protocol frame.
///
/// The raw bytes are kept whole (sync marker included) so that field
/// offsets match the published byte tables for this protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Wrap an already-delimited frame. The caller is responsible for the
    /// bytes actually being one frame; use [`FrameReader`] for raw streams.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ProtocolError> {
        if bytes.len() < MIN_FRAME_LEN {
            return Err(ProtocolError::FrameTooShort {
                expected: MIN_FRAME_LEN,
                actual: bytes.len(),
            });
        }
        Ok(RawFrame { bytes })
    }

    pub(crate) fn from_buffer(bytes: Vec<u8>) -> Self {
        RawFrame { bytes }
    }

    /// The complete frame, sync marker and checksum included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total frame length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the frame is empty (never true for a reader-produced frame).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The declared length position (byte 2). For long-status frames this
    /// holds the frame-class indicator rather than a length.
    pub fn declared_len(&self) -> u8 {
        self.bytes[2]
    }

    /// The frame type byte.
    pub fn frame_type(&self) -> u8 {
        self.bytes[3]
    }

    /// The address byte.
    pub fn address(&self) -> u8 {
        self.bytes[4]
    }

    /// The trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Body bytes between the header and the checksum.
    pub fn payload(&self) -> &[u8] {
        self.bytes.get(5..self.bytes.len() - 1).unwrap_or(&[])
    }

    /// Checksum over everything after the sync marker, excluding the
    /// checksum byte itself, modulo 256.
    pub fn computed_checksum(&self) -> u8 {
        checksum(&self.bytes)
    }

    /// Validate the trailing checksum. On mismatch no field of the frame
    /// may be trusted.
    pub fn validate_checksum(&self) -> Result<(), ProtocolError> {
        let actual = self.computed_checksum();
        let expected = self.checksum();
        if actual == expected {
            Ok(())
        } else {
            Err(ProtocolError::ChecksumMismatch { expected, actual })
        }
    }

    /// Whether this is a long-status class frame (`7E 7E FF E0`).
    pub fn is_long_status(&self) -> bool {
        self.len() == LONG_STATUS_FRAME_LEN
            && self.declared_len() == LONG_STATUS_CLASS
            && self.frame_type() == LONG_STATUS_SUBTYPE
    }
}

/// Compute the checksum for a complete frame buffer: the sum of all bytes
/// after the sync marker, excluding the final checksum byte, modulo 256.
pub fn checksum(frame: &[u8]) -> u8 {
    frame[2..frame.len() - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Turns an arbitrary byte stream into a sequence of delimited frames,
/// resynchronizing past corruption.
///
/// Feed received bytes with [`push`](FrameReader::push) and drain complete
/// frames by calling [`next_frame`](FrameReader::next_frame) until it
/// returns `None`. Malformed input is silently skipped; the reader never
/// fails and never blocks.
#[derive(Debug)]
pub struct FrameReader {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    format: FrameFormat,
}

impl FrameReader {
    /// Create a reader for the given link format.
    pub fn new(format: FrameFormat) -> Self {
        FrameReader {
            buffer: BytesMut::with_capacity(MAX_FRAME_LEN * 2),
            format,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete frame from the buffer.
    ///
    /// Returns `None` when the buffer holds no complete frame; call again
    /// after the next [`push`](FrameReader::push).
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            self.seek_sync();

            // Sync plus the length position.
            if self.buffer.len() < 3 {
                return None;
            }

            let total = match self.frame_size() {
                Some(total) => total,
                None => {
                    // Not a frame start after all; skip one byte and rescan.
                    self.buffer.advance(1);
                    continue;
                }
            };

            if self.buffer.len() < total {
                return None;
            }

            let frame = self.buffer.split_to(total).to_vec();
            return Some(RawFrame::from_buffer(frame));
        }
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Discard bytes until the buffer starts with the sync marker. With no
    /// marker present the buffer is emptied, except for a trailing 0x7E
    /// which may be the first half of a marker split across reads.
    fn seek_sync(&mut self) {
        while self.buffer.len() >= 2 {
            if self.buffer[0] == SYNC_BYTE && self.buffer[1] == SYNC_BYTE {
                return;
            }
            self.buffer.advance(1);
        }
        if self.buffer.len() == 1 && self.buffer[0] != SYNC_BYTE {
            self.buffer.advance(1);
        }
    }

    /// Total size of the frame at the head of the buffer, or `None` if the
    /// bytes at the head cannot start a frame in this format.
    fn frame_size(&self) -> Option<usize> {
        match self.format {
            FrameFormat::LengthPrefixed => {
                let declared = self.buffer[2] as usize;
                // A real frame declares at least a type and a checksum byte.
                if declared < 2 {
                    return None;
                }
                Some(declared + FRAME_OVERHEAD)
            }
            FrameFormat::FixedLongStatus => {
                if self.buffer[2] != LONG_STATUS_CLASS {
                    return None;
                }
                // The subtype byte is only checkable once buffered.
                if self.buffer.len() >= 4 && self.buffer[3] != LONG_STATUS_SUBTYPE {
                    return None;
                }
                Some(LONG_STATUS_FRAME_LEN)
            }
        }
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        FrameReader::new(FrameFormat::LengthPrefixed)
    }
}
