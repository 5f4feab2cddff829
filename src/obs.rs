//! Instrumentation hooks for the request executor and the auth services.
//!
//! Every helper compiles to a no-op unless its feature is on, so call sites never need `cfg`.
//!
//! With `tracing`, each executed call runs inside a `paydash.call` span carrying `call` and
//! `stage`. Expired sessions log at `warn`, a failed token wipe logs at `error`, and callers
//! joining a running refresh log at `debug`.
//!
//! With `metrics`, `paydash_call_total{call, outcome}` counts attempts and their results.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// What a recorded call was doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Plain API request through `ApiClient::execute`.
	Request,
	/// `POST` to the refresh endpoint.
	Refresh,
	/// Email/password login.
	Login,
}
impl CallKind {
	/// Label used for the `call` field.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stage of a call reported to the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// The call started.
	Attempt,
	/// A response was decoded.
	Success,
	/// An error reached the caller.
	Failure,
}
impl CallOutcome {
	/// Label used for the `outcome` field.
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
