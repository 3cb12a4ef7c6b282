//! Client-level error types shared across requests, refreshes, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Application-level and connectivity failures never show up here; they resolve to `Ok(None)`
/// after a notice reaches the [`FailureSink`](crate::sink::FailureSink).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The session cannot be recovered; stored credentials were wiped and the user must sign in
	/// again.
	#[error(transparent)]
	SessionExpired(#[from] SessionExpiredError),
	/// Typed request payload failed client-side validation.
	#[error(transparent)]
	Validation(#[from] crate::resources::RequestValidationError),
}
impl Error {
	/// Returns `true` when the caller has to send the user back to the login entry point.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired(_))
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Endpoint could not be joined onto the API base.
	#[error("Endpoint `{endpoint}` does not form a valid URL.")]
	InvalidEndpoint {
		/// Endpoint path supplied by the caller.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Stored access credential cannot be used as a header value.
	#[error("Stored access credential contains characters that are not valid in a header.")]
	InvalidCredentialHeader,
	/// Request body could not be encoded as JSON.
	#[error("Request body could not be encoded as JSON.")]
	EncodeBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Terminal authentication failures.
///
/// The value is cloned to every request that was waiting on the same refresh, so all of them
/// observe an identical outcome.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionExpiredError {
	/// A 401 arrived while no refresh credential was stored.
	#[error("No refresh credential is stored; sign in again.")]
	MissingRefreshCredential,
	/// The refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the refresh credential with status {status}.")]
	RefreshRejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
	/// The refresh endpoint could not be reached.
	#[error("Refresh endpoint is unreachable: {message}.")]
	RefreshUnreachable {
		/// Transport failure summary.
		message: String,
	},
	/// The refresh endpoint answered 2xx without a usable access credential.
	#[error("Refresh endpoint returned a malformed response: {message}.")]
	MalformedRefreshResponse {
		/// Parsing failure summary.
		message: String,
	},
	/// The credential store failed while reading or writing credentials during a refresh.
	#[error("Credential store failed during refresh: {message}.")]
	StoreUnavailable {
		/// Store failure summary.
		message: String,
	},
	/// Credentials were cleared (logout or an earlier failed refresh) while the request was in
	/// flight.
	#[error("Credentials were cleared while the request was in flight.")]
	CredentialsCleared,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
