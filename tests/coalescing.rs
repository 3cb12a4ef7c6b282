//! Refresh coalescing against a scripted transport.
//!
//! The transport withholds the refresh response until every request has received its 401, so
//! each run exercises the worst case: all N requests fail before the refresh settles.

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
// self
use attendance_client::{
	auth::{Credential, CredentialKind, CredentialPair},
	client::{ApiClient, ApiResponse, RequestOptions},
	config::ApiConfig,
	error::{Error, Result, SessionExpiredError, TransportError},
	http::{ApiTransport, HttpRequest, HttpResponse, TransportFuture},
	http_types::{StatusCode, header::AUTHORIZATION},
	sink::RecordingSink,
	store::{CredentialStore, MemoryStore, StoreFuture},
};

const REFRESH_PATH: &str = "/api/token/refresh/";

/// Backend double: one valid access credential, a refresh endpoint that rotates it.
struct ScriptedBackend {
	valid_bearer: Mutex<String>,
	expected_unauthorized: usize,
	unauthorized: AtomicUsize,
	refresh_calls: AtomicUsize,
	stalled_refreshes: AtomicUsize,
	accept_refresh: bool,
}
impl ScriptedBackend {
	fn new(expected_unauthorized: usize, accept_refresh: bool) -> Self {
		Self {
			valid_bearer: Mutex::new("Bearer access-1".into()),
			expected_unauthorized,
			unauthorized: AtomicUsize::new(0),
			refresh_calls: AtomicUsize::new(0),
			stalled_refreshes: AtomicUsize::new(0),
			accept_refresh,
		}
	}

	/// Makes the first refresh call hang until its caller gives up.
	fn stall_first_refresh(self) -> Self {
		self.stalled_refreshes.store(1, Ordering::SeqCst);

		self
	}

	async fn handle(&self, request: HttpRequest) -> HttpResponse {
		if request.uri().path() == REFRESH_PATH {
			self.refresh_calls.fetch_add(1, Ordering::SeqCst);

			if self
				.stalled_refreshes
				.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
				.is_ok()
			{
				tokio::time::sleep(Duration::from_secs(30)).await;
			}

			for _ in 0..500 {
				if self.unauthorized.load(Ordering::SeqCst) >= self.expected_unauthorized {
					break;
				}

				tokio::time::sleep(Duration::from_millis(10)).await;
			}

			if !self.accept_refresh {
				return response(StatusCode::UNAUTHORIZED, r#"{"detail":"Token is blacklisted"}"#);
			}

			let next = format!("access-{}", self.refresh_calls.load(Ordering::SeqCst) + 1);

			*self.valid_bearer.lock() = format!("Bearer {next}");

			return response(StatusCode::OK, &format!(r#"{{"access":"{next}"}}"#));
		}

		let authorized = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value == self.valid_bearer.lock().as_str());

		if authorized {
			response(StatusCode::OK, r#"{"ok":true}"#)
		} else {
			self.unauthorized.fetch_add(1, Ordering::SeqCst);

			response(StatusCode::UNAUTHORIZED, r#"{"detail":"Token is invalid or expired"}"#)
		}
	}
}

struct ScriptedTransport(Arc<ScriptedBackend>);
impl ApiTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let backend = self.0.clone();

		Box::pin(async move { Ok::<_, TransportError>(backend.handle(request).await) })
	}
}

/// Memory store that counts how often the session is wiped.
struct CountingStore {
	inner: MemoryStore,
	clears: AtomicUsize,
}
impl CountingStore {
	fn signed_in() -> Arc<Self> {
		Arc::new(Self {
			inner: MemoryStore::with_pair(CredentialPair::new("expired", "refresh-1")),
			clears: AtomicUsize::new(0),
		})
	}

	fn clears(&self) -> usize {
		self.clears.load(Ordering::SeqCst)
	}
}
impl CredentialStore for CountingStore {
	fn load(&self, kind: CredentialKind) -> StoreFuture<'_, Option<Credential>> {
		self.inner.load(kind)
	}

	fn save(&self, kind: CredentialKind, credential: Credential) -> StoreFuture<'_, ()> {
		self.inner.save(kind, credential)
	}

	fn save_pair(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		self.inner.save_pair(pair)
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		self.clears.fetch_add(1, Ordering::SeqCst);

		self.inner.clear()
	}
}

fn response(status: StatusCode, body: &str) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() = status;

	response
}

fn client(
	backend: Arc<ScriptedBackend>,
	store: Arc<CountingStore>,
) -> (ApiClient<ScriptedTransport>, Arc<RecordingSink>) {
	let sink = Arc::new(RecordingSink::default());
	let config = ApiConfig::from_base("http://backend.test/api").expect("Test config should build.");
	let client = ApiClient::with_transport(config, store, sink.clone(), ScriptedTransport(backend));

	(client, sink)
}

async fn fan_out(
	client: &ApiClient<ScriptedTransport>,
	n: usize,
) -> Vec<Result<Option<ApiResponse>>> {
	let tasks = (0..n)
		.map(|_| {
			let client = client.clone();

			tokio::spawn(async move { client.request("/leave/my-history/", RequestOptions::get()).await })
		})
		.collect::<Vec<_>>();
	let mut results = Vec::with_capacity(n);

	for task in tasks {
		results.push(task.await.expect("Request task should not panic."));
	}

	results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn one_refresh_per_wave_of_unauthorized_requests() {
	for n in [1, 2, 10, 100] {
		let backend = Arc::new(ScriptedBackend::new(n, true));
		let store = CountingStore::signed_in();
		let (client, sink) = client(backend.clone(), store.clone());
		let results = fan_out(&client, n).await;

		for result in results {
			let response = result
				.expect("Recovered requests should not fail.")
				.expect("Recovered requests should yield a value.");

			assert!(response.json().is_some());
		}

		assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1, "n = {n}");
		assert_eq!(backend.unauthorized.load(Ordering::SeqCst), n, "n = {n}");
		assert_eq!(client.refresh_metrics().coalesced(), n as u64 - 1, "n = {n}");
		assert_eq!(
			store.inner.snapshot().access.as_ref().map(Credential::expose),
			Some("access-2"),
			"n = {n}"
		);
		assert_eq!(store.clears(), 0, "n = {n}");
		assert!(sink.notices().is_empty(), "n = {n}");
		assert!(!client.refresh_in_progress(), "n = {n}");
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn failed_refresh_rejects_the_whole_wave() {
	for n in [1, 2, 10, 50, 100] {
		let backend = Arc::new(ScriptedBackend::new(n, false));
		let store = CountingStore::signed_in();
		let (client, sink) = client(backend.clone(), store.clone());
		let results = fan_out(&client, n).await;

		for result in results {
			let err = result.expect_err("Every request should observe the terminal outcome.");

			assert!(
				matches!(
					err,
					Error::SessionExpired(SessionExpiredError::RefreshRejected { status: 401 })
				),
				"n = {n}"
			);
		}

		assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1, "n = {n}");
		assert!(store.inner.snapshot().is_empty(), "n = {n}");
		assert_eq!(store.clears(), 1, "n = {n}");
		assert_eq!(sink.redirects(), 1, "n = {n}");
		assert_eq!(client.refresh_metrics().failures(), 1, "n = {n}");
	}
}

#[tokio::test]
async fn requests_after_a_settled_refresh_use_the_new_credential() {
	let backend = Arc::new(ScriptedBackend::new(1, true));
	let (client, _sink) = client(backend.clone(), CountingStore::signed_in());

	for _ in 0..3 {
		client
			.request("/leave/my-history/", RequestOptions::get())
			.await
			.expect("Requests should not fail.")
			.expect("Requests should yield a value.");
	}

	assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
	assert_eq!(backend.unauthorized.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn abandoned_refresh_is_taken_over_by_the_next_waiter() {
	let backend = Arc::new(ScriptedBackend::new(1, true).stall_first_refresh());
	let store = CountingStore::signed_in();
	let (client, sink) = client(backend.clone(), store.clone());
	let leader = {
		let client = client.clone();

		tokio::spawn(async move {
			tokio::time::timeout(
				Duration::from_millis(200),
				client.request("/leave/my-history/", RequestOptions::get()),
			)
			.await
		})
	};

	while !client.refresh_in_progress() {
		tokio::time::sleep(Duration::from_millis(5)).await;
	}

	let follower = {
		let client = client.clone();

		tokio::spawn(async move { client.request("/leave/my-history/", RequestOptions::get()).await })
	};

	assert!(
		leader.await.expect("Leader task should not panic.").is_err(),
		"The stalled refresh should outlive the caller's deadline."
	);

	let response = follower
		.await
		.expect("Follower task should not panic.")
		.expect("The follower should recover the session.")
		.expect("The follower should yield a value.");

	assert!(response.json().is_some());
	assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 2);
	assert_eq!(client.refresh_metrics().attempts(), 2);
	assert_eq!(client.refresh_metrics().coalesced(), 0);
	assert_eq!(store.clears(), 0);
	assert_eq!(sink.redirects(), 0);
	assert!(!client.refresh_in_progress());
}
