//! Runner library: transports, the polling cycle, capture records, and
//! console formatting for the `chillerlink` CLI.
//!
//! The protocol and control crates are pure transforms; everything that
//! touches a file descriptor or the wall clock lives here.

pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod poll;
pub mod record;
pub mod transport;

pub use error::RunnerError;
