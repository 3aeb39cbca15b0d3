//! Safety evaluation and command scheduling for chiller operation.
//!
//! This crate holds the two decision pieces that sit between decoded
//! status frames and outgoing control frames:
//!
//! - [`evaluate`]: pure check of a [`DecodedStatus`] against immutable
//!   [`SafetyLimits`], producing a [`SafetyVerdict`] with every violated
//!   rule and its observed value
//! - [`CommandScheduler`]: per-tick decision between re-asserting the
//!   baseline command, issuing a protective fallback, or staying quiet
//!
//! Neither piece performs I/O or sleeps; the polling loop owns the
//! transport and the clock and feeds both in.
//!
//! [`DecodedStatus`]: gree_protocol::DecodedStatus

mod guard;
mod limits;
mod scheduler;

pub use guard::*;
pub use limits::*;
pub use scheduler::*;
