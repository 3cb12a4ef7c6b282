//! Transport primitives for backend API calls.
//!
//! [`ApiClient`](crate::client::ApiClient) never talks to an HTTP stack directly. It builds a
//! fully-formed [`HttpRequest`] (URL, method, merged headers, body) and hands it to an
//! [`ApiTransport`]. Everything that comes back with a status line, including 401 and 5xx, is a
//! successful transport call; only failures to obtain a response at all are reported as
//! [`TransportError`].

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Request handed to an [`ApiTransport`].
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response returned by an [`ApiTransport`].
pub type HttpResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing backend API calls.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by every
/// clone of the client, and the futures they return must be `Send` so requests can hop executor
/// threads while waiting on a refresh.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the full response, whatever its status.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
