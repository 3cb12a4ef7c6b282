//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `attendance_client.call` with the `call`
//!   (`api`, `refresh` or `login`) and `endpoint` fields. The endpoint is the caller's relative
//!   path (`/leave/my-history/`), never the resolved URL, so spans stay grouped by route.
//! - Enable `metrics` to increment the `attendance_client_call_total` counter labeled by `call`
//!   and `outcome`. A request that recovers through a refresh records one `api` success plus
//!   one `refresh` attempt/success pair; coalesced waiters add no `refresh` samples.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// [`ApiClient::request`](crate::client::ApiClient::request) and every typed resource call.
	Api,
	/// The single refresh exchange run by the request that owns the session gate.
	Refresh,
	/// [`ApiClient::login`](crate::client::ApiClient::login) against the token endpoint.
	Login,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Api => "api",
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

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported through the sink; the caller received `None`.
	SoftFailure,
	/// Failure propagated back to the caller as an error, typically an expired session.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::SoftFailure => "soft_failure",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
