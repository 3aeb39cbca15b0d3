//! Gree-derived heat pump / chiller serial protocol
//!
//! This crate provides types and utilities for the proprietary serial
//! protocol spoken by Gree-derived heat pump and chiller units (Mr Cool
//! MDUO18060 / Gree FLEXX60HP family). The protocol uses checksummed
//! frames delimited by a `7E 7E` sync marker:
//!
//! - **Status frames** (unit → host): decoded into a [`DecodedStatus`]
//!   through one or more named field-layout [`Profile`]s
//! - **Control frames** (host → unit): built from a sparse
//!   [`ControlIntent`] by the command encoder, always 40 bytes
//! - **Status query**: the fixed 5-byte request `7E 7E 02 02 04`
//!
//! The crate performs no I/O; callers own the byte source, sink, and
//! clock, and feed bytes through [`FrameReader`].
//!
//! # Example
//!
//! ```rust,ignore
//! use gree_protocol::{ControlIntent, DecodedStatus, EncodeProfile, FrameFormat, FrameReader};
//!
//! let mut reader = FrameReader::new(FrameFormat::LengthPrefixed);
//! reader.push(&received);
//! while let Some(frame) = reader.next_frame() {
//!     let status = DecodedStatus::from_frame(&frame)?;
//! }
//!
//! // Build a command
//! let intent = ControlIntent { power: Some(true), ..Default::default() };
//! let frame = intent.encode(EncodeProfile::FixedOffset);
//! ```

mod constants;
mod error;
mod frame;
mod intent;
mod status;
mod types;

pub use constants::*;
pub use error::*;
pub use frame::*;
pub use intent::*;
pub use status::*;
pub use types::*;
