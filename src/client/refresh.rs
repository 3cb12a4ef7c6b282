//! Single-flight credential refresh.
//!
//! The refresh state is a two-state machine, `Idle` and `Refreshing(waiters)`, realized as an
//! async mutex: whoever holds the [`SessionGate`] ledger lock is the one refresh in flight, and
//! every other request that hit a 401 meanwhile is parked on the lock's wait list. Entering
//! `Refreshing` is the lock acquisition itself, so the check-then-set step is atomic even on a
//! multi-threaded executor.
//!
//! Each request samples the gate's generation before reading its access credential. When a
//! parked request finally takes the lock and sees the generation moved, the credential it was
//! sent with has already been replaced (or wiped): it adopts the recorded outcome instead of
//! issuing another refresh. A request whose 401 arrives after the refresh settled takes the
//! same path, which keeps one refresh per wave of concurrent failures regardless of how the
//! responses interleave.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind},
	client::{ApiClient, RequestOptions},
	error::SessionExpiredError,
	http::ApiTransport,
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::StoreError,
};

/// Outcome of the latest credential change, shared with every request that waited on it.
pub type RefreshOutcome = Result<Credential, SessionExpiredError>;

/// Refresh state shared by every clone of a client.
#[derive(Debug, Default)]
pub(crate) struct SessionGate {
	generation: AtomicU64,
	ledger: AsyncMutex<Option<RefreshOutcome>>,
}
impl SessionGate {
	pub(crate) fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	pub(crate) fn is_refreshing(&self) -> bool {
		self.ledger.try_lock().is_none()
	}

	/// Records `outcome` as the latest credential change; call with the ledger lock held.
	fn settle(&self, ledger: &mut Option<RefreshOutcome>, outcome: RefreshOutcome) {
		*ledger = Some(outcome);

		self.generation.fetch_add(1, Ordering::AcqRel);
	}
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
	access: String,
	#[serde(default)]
	refresh: Option<String>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Obtains a usable access credential after a 401 observed at `observed_generation`.
	///
	/// Either joins (or reuses) the refresh that settled since then, or performs the refresh
	/// itself while holding the gate.
	///
	/// Dropping this future mid-refresh settles nothing. The generation stays put, so the next
	/// parked request runs the refresh itself and the rest of the wave coalesces onto that one.
	pub(crate) async fn recover_session(&self, observed_generation: u64) -> Result<Credential> {
		let mut ledger = self.session.ledger.lock().await;

		if self.session.generation() != observed_generation {
			self.refresh_metrics.record_coalesced();

			return ledger
				.clone()
				.unwrap_or(Err(SessionExpiredError::CredentialsCleared))
				.map_err(Error::from);
		}

		let outcome = self.run_refresh().await;

		self.session.settle(&mut ledger, outcome.clone());

		outcome.map_err(Error::from)
	}

	/// Persists a new credential state (login or logout) and publishes it to waiting requests.
	pub(crate) async fn replace_session<Fut>(&self, write: Fut, outcome: RefreshOutcome) -> Result<()>
	where
		Fut: Future<Output = Result<(), StoreError>>,
	{
		let mut ledger = self.session.ledger.lock().await;

		write.await?;
		self.session.settle(&mut ledger, outcome);

		Ok(())
	}

	async fn run_refresh(&self) -> RefreshOutcome {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, &self.config.refresh_path);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let outcome = span.instrument(self.exchange_refresh()).await;

		match &outcome {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => {
				self.expire_session().await;
				obs::record_call_outcome(KIND, CallOutcome::Failure);
			},
		}

		outcome
	}

	async fn exchange_refresh(&self) -> RefreshOutcome {
		let refresh = self
			.store
			.load(CredentialKind::Refresh)
			.await
			.map_err(store_unavailable)?
			.ok_or(SessionExpiredError::MissingRefreshCredential)?;

		self.refresh_metrics.record_attempt();

		let request = self
			.config
			.endpoint_url(&self.config.refresh_path)
			.and_then(|url| {
				RequestOptions::post()
					.json(&RefreshRequest { refresh: refresh.expose() })?
					.build_request(&url, None)
			})
			.map_err(|e| {
				self.refresh_metrics.record_failure();

				SessionExpiredError::RefreshUnreachable { message: e.to_string() }
			})?;
		let response = self.transport.execute(request).await.map_err(|e| {
			self.refresh_metrics.record_failure();

			SessionExpiredError::RefreshUnreachable { message: e.to_string() }
		})?;
		let status = response.status();

		if !status.is_success() {
			self.refresh_metrics.record_failure();

			return Err(SessionExpiredError::RefreshRejected { status: status.as_u16() });
		}

		let body = response.into_body();
		let parsed: RefreshResponse =
			serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&body))
				.map_err(|e| {
					self.refresh_metrics.record_failure();

					SessionExpiredError::MalformedRefreshResponse { message: e.to_string() }
				})?;
		let access = Credential::new(parsed.access);

		self.store.save(CredentialKind::Access, access.clone()).await.map_err(|e| {
			self.refresh_metrics.record_failure();

			store_unavailable(e)
		})?;

		if let Some(rotated) = parsed.refresh {
			self.store.save(CredentialKind::Refresh, Credential::new(rotated)).await.map_err(
				|e| {
					self.refresh_metrics.record_failure();

					store_unavailable(e)
				},
			)?;
		}

		self.refresh_metrics.record_success();

		Ok(access)
	}

	/// Wipes stored credentials and asks for a login redirect.
	async fn expire_session(&self) {
		if let Err(e) = self.store.clear().await {
			#[cfg(feature = "tracing")]
			tracing::error!(error = %e, "failed to clear credentials after session expiry");
			#[cfg(not(feature = "tracing"))]
			let _ = e;
		}

		self.sink.redirect_to_login();
	}
}

fn store_unavailable(e: StoreError) -> SessionExpiredError {
	SessionExpiredError::StoreUnavailable { message: e.to_string() }
}
