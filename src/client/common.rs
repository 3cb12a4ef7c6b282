//! Shared request plumbing (options, header merging, response classification, call
//! observation).

// crates.io
use http::{
	HeaderMap, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderName},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::ConfigError,
	http::{HttpRequest, HttpResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	sink::{FALLBACK_MESSAGE, FailureNotice},
};

/// Message used when a 2xx body is not valid JSON.
pub const UNREADABLE_MESSAGE: &str = "The server returned an unreadable response.";

/// Method, extra headers, and body for a single API call.
///
/// Caller headers are merged last, so a header set here replaces the client's default
/// `Content-Type` or `Authorization` value.
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// HTTP method.
	pub method: Method,
	/// Extra headers merged over the defaults.
	pub headers: HeaderMap,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
}
impl RequestOptions {
	/// Creates options for `method` with no body and no extra headers.
	pub fn new(method: Method) -> Self {
		Self { method, headers: HeaderMap::new(), body: None }
	}

	/// `GET` request.
	pub fn get() -> Self {
		Self::new(Method::GET)
	}

	/// `POST` request.
	pub fn post() -> Self {
		Self::new(Method::POST)
	}

	/// `PUT` request.
	pub fn put() -> Self {
		Self::new(Method::PUT)
	}

	/// `PATCH` request.
	pub fn patch() -> Self {
		Self::new(Method::PATCH)
	}

	/// `DELETE` request.
	pub fn delete() -> Self {
		Self::new(Method::DELETE)
	}

	/// Encodes `body` as the JSON request body.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let bytes =
			serde_json::to_vec(body).map_err(|source| ConfigError::EncodeBody { source })?;

		self.body = Some(bytes);

		Ok(self)
	}

	/// Sets a raw request body.
	pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
		self.body = Some(bytes.into());

		self
	}

	/// Sets an extra header, replacing any earlier value for the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Builds the outbound request: JSON content type, then bearer credential, then caller
	/// headers.
	pub fn build_request(
		&self,
		url: &Url,
		access: Option<&Credential>,
	) -> Result<HttpRequest, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		if let Some(access) = access {
			let mut value = HeaderValue::from_str(&access.bearer())
				.map_err(|_| ConfigError::InvalidCredentialHeader)?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		headers.extend(self.headers.clone());

		let mut request = http::Request::builder()
			.method(self.method.clone())
			.uri(url.as_str())
			.body(self.body.clone().unwrap_or_default())?;

		*request.headers_mut() = headers;

		Ok(request)
	}
}
impl Default for RequestOptions {
	fn default() -> Self {
		Self::get()
	}
}

/// Successful API response.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
	/// Status 204; no body was read.
	NoContent,
	/// Parsed JSON body (`Value::Null` for an empty 2xx body).
	Json(Value),
}
impl ApiResponse {
	/// Returns `true` for a 204 response.
	pub fn is_no_content(&self) -> bool {
		matches!(self, Self::NoContent)
	}

	/// Borrows the JSON body, if any.
	pub fn json(&self) -> Option<&Value> {
		match self {
			Self::NoContent => None,
			Self::Json(value) => Some(value),
		}
	}

	/// Converts into a JSON value; a 204 becomes `null`.
	pub fn into_value(self) -> Value {
		match self {
			Self::NoContent => Value::Null,
			Self::Json(value) => value,
		}
	}
}

/// Extracts the user-facing message from an error body: `detail`, then the first
/// `non_field_errors` entry, then [`FALLBACK_MESSAGE`].
pub fn failure_message(body: &[u8]) -> String {
	let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
		return FALLBACK_MESSAGE.into();
	};

	if let Some(detail) = fields.get("detail").and_then(Value::as_str).filter(|s| !s.is_empty()) {
		return detail.into();
	}
	if let Some(first) = fields
		.get("non_field_errors")
		.and_then(Value::as_array)
		.and_then(|errors| errors.first())
		.and_then(Value::as_str)
	{
		return first.into();
	}

	FALLBACK_MESSAGE.into()
}

/// Classifies a response that is not being routed into the refresh path.
pub fn classify_response(response: HttpResponse) -> Result<ApiResponse, FailureNotice> {
	let status = response.status();

	if status == StatusCode::NO_CONTENT {
		return Ok(ApiResponse::NoContent);
	}

	let body = response.into_body();

	if !status.is_success() {
		return Err(FailureNotice::request_failed(failure_message(&body)));
	}
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(ApiResponse::Json(Value::Null));
	}

	serde_json::from_slice(&body)
		.map(ApiResponse::Json)
		.map_err(|_| FailureNotice::request_failed(UNREADABLE_MESSAGE))
}

/// Decodes a response into `V`, naming the failing JSON path on mismatch.
pub fn decode<V>(response: ApiResponse) -> Result<V, FailureNotice>
where
	V: DeserializeOwned,
{
	serde_path_to_error::deserialize(response.into_value()).map_err(|e| {
		FailureNotice::request_failed(format!(
			"Unexpected response at `{}`: {}",
			e.path(),
			e.inner()
		))
	})
}

/// Runs `fut` inside a call span and records its outcome.
pub(crate) async fn observe<V, Fut>(kind: CallKind, endpoint: &str, fut: Fut) -> Result<Option<V>>
where
	Fut: Future<Output = Result<Option<V>>>,
{
	let span = CallSpan::new(kind, endpoint);

	obs::record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;
	let outcome = match &result {
		Ok(Some(_)) => CallOutcome::Success,
		Ok(None) => CallOutcome::SoftFailure,
		Err(_) => CallOutcome::Failure,
	};

	obs::record_call_outcome(kind, outcome);

	result
}
