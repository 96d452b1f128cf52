//! Observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Spans named `api_client.call` carry the `call` (login, extend, request) and `stage`
//!   (call site) fields and are always emitted through `tracing`.
//! - Enable `metrics` to increment the `api_client_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod errors;
mod metrics;
mod tracing;

pub use errors::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Kinds of outbound calls issued by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Credential login.
	Login,
	/// Token extension.
	Extend,
	/// Authenticated data request.
	Request,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Login => "login",
			CallKind::Extend => "extend",
			CallKind::Request => "request",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// A transport attempt was dispatched.
	Attempt,
	/// The call completed successfully.
	Success,
	/// The call failed after every retry.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
