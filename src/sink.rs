//! Presentation-side effects the client triggers but does not own.
//!
//! The client reports application and connectivity failures as [`FailureNotice`]s and asks for a
//! login redirect on terminal authentication failures. Both go through a [`FailureSink`] so the
//! request and refresh logic has no UI dependency: a desktop shell can raise a toast, a CLI can
//! print, and tests can record.

// self
use crate::_prelude::*;

/// Message shown when the backend's error body carries neither `detail` nor
/// `non_field_errors`.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";
/// Message shown when the backend could not be reached.
pub const CONNECTION_MESSAGE: &str =
	"Could not connect to the server. Please check your connection.";

/// Receiver for user-visible failure notices and login redirects.
pub trait FailureSink
where
	Self: Send + Sync,
{
	/// Surfaces a user-visible failure.
	fn notify(&self, notice: &FailureNotice);

	/// Sends the user back to the login entry point.
	fn redirect_to_login(&self);
}

/// Notice categories, each with a fixed title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
	/// The backend answered with a non-success status.
	RequestFailed,
	/// No response was obtained.
	ConnectionError,
}
impl NoticeKind {
	/// Title shown above the notice message.
	pub const fn title(self) -> &'static str {
		match self {
			Self::RequestFailed => "Request Failed",
			Self::ConnectionError => "Connection Error",
		}
	}
}
impl Display for NoticeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.title())
	}
}

/// User-visible failure description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureNotice {
	/// Notice category.
	pub kind: NoticeKind,
	/// Human-readable description.
	pub message: String,
}
impl FailureNotice {
	/// Notice for a non-success response.
	pub fn request_failed(message: impl Into<String>) -> Self {
		Self { kind: NoticeKind::RequestFailed, message: message.into() }
	}

	/// Notice for an unreachable backend.
	pub fn connection_error() -> Self {
		Self { kind: NoticeKind::ConnectionError, message: CONNECTION_MESSAGE.into() }
	}
}
impl Display for FailureNotice {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}: {}", self.kind.title(), self.message)
	}
}

/// Sink that turns notices into structured `tracing` events.
///
/// Without the `tracing` feature it discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;
impl FailureSink for LogSink {
	fn notify(&self, notice: &FailureNotice) {
		#[cfg(feature = "tracing")]
		tracing::warn!(title = notice.kind.title(), message = %notice.message, "api call failed");
		#[cfg(not(feature = "tracing"))]
		let _ = notice;
	}

	fn redirect_to_login(&self) {
		#[cfg(feature = "tracing")]
		tracing::warn!("session expired; login required");
	}
}

/// Sink that records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
	notices: Mutex<Vec<FailureNotice>>,
	redirects: Mutex<usize>,
}
impl RecordingSink {
	/// Returns every notice received so far.
	pub fn notices(&self) -> Vec<FailureNotice> {
		self.notices.lock().clone()
	}

	/// Returns the message of the most recent notice.
	pub fn last_message(&self) -> Option<String> {
		self.notices.lock().last().map(|notice| notice.message.clone())
	}

	/// Returns how many login redirects were requested.
	pub fn redirects(&self) -> usize {
		*self.redirects.lock()
	}
}
impl FailureSink for RecordingSink {
	fn notify(&self, notice: &FailureNotice) {
		self.notices.lock().push(notice.clone());
	}

	fn redirect_to_login(&self) {
		*self.redirects.lock() += 1;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_sink_captures_notices_and_redirects() {
		let sink = RecordingSink::default();

		sink.notify(&FailureNotice::request_failed("Date already taken."));
		sink.notify(&FailureNotice::connection_error());
		sink.redirect_to_login();

		let notices = sink.notices();

		assert_eq!(notices.len(), 2);
		assert_eq!(notices[0].kind, NoticeKind::RequestFailed);
		assert_eq!(notices[0].to_string(), "Request Failed: Date already taken.");
		assert_eq!(sink.last_message().as_deref(), Some(CONNECTION_MESSAGE));
		assert_eq!(sink.redirects(), 1);
	}

	#[test]
	fn log_sink_accepts_notices() {
		LogSink.notify(&FailureNotice::connection_error());
		LogSink.redirect_to_login();
	}
}
