//! Authenticated request client.
//!
//! [`ApiClient`] attaches the stored bearer credential to every call, recovers from an expired
//! access credential through a single coalesced refresh, and turns application and
//! connectivity failures into [`FailureNotice`]s so callers only see `Ok(None)`.

pub mod common;
pub mod refresh;

pub use common::*;
pub use refresh::{RefreshMetrics, RefreshOutcome};

// crates.io
use http::StatusCode;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, CredentialPair},
	config::ApiConfig,
	error::SessionExpiredError,
	http::{ApiTransport, HttpResponse},
	obs::CallKind,
	sink::{FailureNotice, FailureSink},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use refresh::SessionGate;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Client for the attendance backend.
///
/// Clones share the transport, the credential store, the failure sink, and the refresh state, so
/// concurrent calls issued through any clone coalesce onto the same refresh.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport executing every outbound request.
	pub transport: Arc<T>,
	/// Store holding the access and refresh credentials.
	pub store: Arc<dyn CredentialStore>,
	/// Receiver for failure notices and login redirects.
	pub sink: Arc<dyn FailureSink>,
	/// API location and auth endpoint paths.
	pub config: ApiConfig,
	refresh_metrics: Arc<RefreshMetrics>,
	session: Arc<SessionGate>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client on top of a caller-provided transport.
	pub fn with_transport(
		config: ApiConfig,
		store: Arc<dyn CredentialStore>,
		sink: Arc<dyn FailureSink>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			sink,
			config,
			refresh_metrics: Default::default(),
			session: Default::default(),
		}
	}

	/// Issues an authenticated call to `endpoint` (a path relative to the API base).
	///
	/// Returns `Ok(Some(_))` on success and `Ok(None)` after reporting an application or
	/// connectivity failure to the sink. A 401 triggers at most one refresh and one retry; when
	/// the session cannot be recovered the credentials are cleared, a login redirect is
	/// requested, and [`Error::SessionExpired`] is returned.
	pub async fn request(
		&self,
		endpoint: &str,
		options: RequestOptions,
	) -> Result<Option<ApiResponse>> {
		common::observe(CallKind::Api, endpoint, self.send(endpoint, &options)).await
	}

	/// Like [`ApiClient::request`] but decodes the body into `V`.
	///
	/// A 204 decodes from JSON `null`, so `V = ()` or `Option<_>` fit no-content endpoints. A
	/// body that does not match `V` is reported as a soft failure naming the offending path.
	pub async fn request_json<V>(&self, endpoint: &str, options: RequestOptions) -> Result<Option<V>>
	where
		V: DeserializeOwned,
	{
		common::observe(CallKind::Api, endpoint, async {
			let Some(response) = self.send(endpoint, &options).await? else {
				return Ok(None);
			};

			Ok(self.report(common::decode(response)))
		})
		.await
	}

	/// Exchanges a username and password for a credential pair and persists it.
	pub async fn login(&self, username: &str, password: &str) -> Result<Option<CredentialPair>> {
		let endpoint = self.config.token_path.as_str();

		common::observe(CallKind::Login, endpoint, async {
			let options = RequestOptions::post().json(&LoginRequest { username, password })?;
			let Some(response) = self.send(endpoint, &options).await? else {
				return Ok(None);
			};
			let Some(pair) = self.report(common::decode::<CredentialPair>(response)) else {
				return Ok(None);
			};

			self.replace_session(self.store.save_pair(pair.clone()), Ok(pair.access.clone()))
				.await?;

			#[cfg(feature = "tracing")]
			tracing::info!("signed in");

			Ok(Some(pair))
		})
		.await
	}

	/// Clears both credentials and requests a login redirect.
	///
	/// Requests still waiting on a refresh observe
	/// [`SessionExpiredError::CredentialsCleared`].
	pub async fn logout(&self) -> Result<()> {
		self.replace_session(self.store.clear(), Err(SessionExpiredError::CredentialsCleared))
			.await?;
		self.sink.redirect_to_login();

		Ok(())
	}

	/// Returns `true` while a refresh (or a login/logout credential swap) holds the session gate.
	pub fn refresh_in_progress(&self) -> bool {
		self.session.is_refreshing()
	}

	/// Counters describing refresh activity across every clone of this client.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	async fn send(&self, endpoint: &str, options: &RequestOptions) -> Result<Option<ApiResponse>> {
		let url = self.config.endpoint_url(endpoint)?;
		// Sampled before the credential read so a refresh that lands in between is detected.
		let observed = self.session.generation();
		let access = self.store.load(CredentialKind::Access).await?;
		let Some(response) = self.dispatch(&url, options, access.as_ref()).await? else {
			return Ok(None);
		};

		if response.status() != StatusCode::UNAUTHORIZED || self.config.is_auth_endpoint(endpoint)
		{
			return Ok(self.report(common::classify_response(response)));
		}

		let access = self.recover_session(observed).await?;
		let Some(retried) = self.dispatch(&url, options, Some(&access)).await? else {
			return Ok(None);
		};

		Ok(self.report(common::classify_response(retried)))
	}

	async fn dispatch(
		&self,
		url: &Url,
		options: &RequestOptions,
		access: Option<&Credential>,
	) -> Result<Option<HttpResponse>> {
		let request = options.build_request(url, access)?;

		match self.transport.execute(request).await {
			Ok(response) => Ok(Some(response)),
			Err(e) => {
				#[cfg(feature = "tracing")]
				tracing::debug!(error = %e, %url, "transport failed");
				#[cfg(not(feature = "tracing"))]
				let _ = e;

				self.sink.notify(&FailureNotice::connection_error());

				Ok(None)
			},
		}
	}

	fn report<V>(&self, outcome: Result<V, FailureNotice>) -> Option<V> {
		match outcome {
			Ok(value) => Some(value),
			Err(notice) => {
				self.sink.notify(&notice);

				None
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(
		config: ApiConfig,
		store: Arc<dyn CredentialStore>,
		sink: Arc<dyn FailureSink>,
	) -> Self {
		Self::with_transport(config, store, sink, ReqwestTransport::default())
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			sink: self.sink.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			session: self.session.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("refresh_in_progress", &self.refresh_in_progress())
			.finish()
	}
}

#[derive(Serialize)]
struct LoginRequest<'a> {
	username: &'a str,
	password: &'a str,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		error::TransportError,
		http::{HttpRequest, TransportFuture},
		sink::{CONNECTION_MESSAGE, RecordingSink},
		store::MemoryStore,
	};

	/// Transport answering from a fixed closure, recording every request it sees.
	struct FnTransport<F> {
		handler: F,
		seen: Mutex<Vec<HttpRequest>>,
	}
	impl<F> ApiTransport for FnTransport<F>
	where
		F: 'static + Send + Sync + Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
	{
		fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
			let outcome = (self.handler)(&request);

			self.seen.lock().push(request);

			Box::pin(async move { outcome })
		}
	}

	fn respond(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Test status code should be valid.");

		Ok(response)
	}

	fn client<F>(
		handler: F,
		store: MemoryStore,
	) -> (ApiClient<FnTransport<F>>, Arc<RecordingSink>)
	where
		F: 'static + Send + Sync + Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
	{
		let sink = Arc::new(RecordingSink::default());
		let config = ApiConfig::localhost().expect("Default config should build.");
		let client = ApiClient::with_transport(
			config,
			Arc::new(store),
			sink.clone(),
			FnTransport { handler, seen: Mutex::new(Vec::new()) },
		);

		(client, sink)
	}

	#[tokio::test]
	async fn bearer_header_comes_from_the_store() {
		let store = MemoryStore::with_pair(CredentialPair::new("access-1", "refresh-1"));
		let (client, sink) = client(|_| respond(200, r#"{"ok":true}"#), store);
		let response = client
			.request("/settings/", RequestOptions::get())
			.await
			.expect("Request should not fail hard.")
			.expect("200 responses should yield a value.");

		assert_eq!(response.json(), Some(&json!({ "ok": true })));
		assert!(sink.notices().is_empty());

		let seen = client.transport.seen.lock();

		assert_eq!(seen[0].uri(), "http://localhost:8000/api/settings/");
		assert_eq!(seen[0].headers()[http::header::AUTHORIZATION], "Bearer access-1");
	}

	#[tokio::test]
	async fn transport_failure_becomes_connection_notice() {
		let (client, sink) = client(
			|_| Err(TransportError::Io(std::io::ErrorKind::ConnectionRefused.into())),
			MemoryStore::default(),
		);
		let response = client
			.request("/leave/my-history/", RequestOptions::get())
			.await
			.expect("Connectivity failures are soft.");

		assert!(response.is_none());
		assert_eq!(sink.last_message().as_deref(), Some(CONNECTION_MESSAGE));
		assert_eq!(sink.redirects(), 0);
	}

	#[tokio::test]
	async fn login_failure_does_not_refresh() {
		let store = MemoryStore::default();
		let (client, sink) = client(
			|_| respond(401, r#"{"detail":"No active account found with the given credentials"}"#),
			store.clone(),
		);
		let pair = client.login("ada", "wrong").await.expect("Bad credentials are soft.");

		assert!(pair.is_none());
		assert_eq!(
			sink.last_message().as_deref(),
			Some("No active account found with the given credentials")
		);
		assert_eq!(client.transport.seen.lock().len(), 1);
		assert_eq!(client.refresh_metrics().attempts(), 0);
		assert!(store.snapshot().is_empty());
	}

	#[tokio::test]
	async fn logout_publishes_cleared_session() {
		let store = MemoryStore::with_pair(CredentialPair::new("access-1", "refresh-1"));
		let (client, sink) = client(|_| respond(200, "{}"), store.clone());

		client.logout().await.expect("Logout should succeed.");

		assert!(store.snapshot().is_empty());
		assert_eq!(sink.redirects(), 1);
		assert!(!client.refresh_in_progress());

		let err = client
			.recover_session(0)
			.await
			.expect_err("A request sent before logout must not reuse old credentials.");

		assert!(matches!(err, Error::SessionExpired(SessionExpiredError::CredentialsCleared)));
		assert_eq!(client.refresh_metrics().coalesced(), 1);
	}
}
