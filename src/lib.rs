//! Attendance API client: bearer credentials, single-flight token refresh, and soft-failure
//! reporting for workforce-management front-ends.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod resources;
pub mod sink;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::CredentialPair,
		client::{ApiClient, ReqwestApiClient},
		config::ApiConfig,
		http::ReqwestTransport,
		sink::{FailureSink, RecordingSink},
		store::{CredentialStore, MemoryStore},
	};

	/// Everything an integration test needs to drive and inspect a reqwest-backed client.
	pub struct TestHarness {
		/// Client under test.
		pub client: ReqwestApiClient,
		/// Store backing the client, shared for seeding and inspection.
		pub store: Arc<MemoryStore>,
		/// Sink capturing notices and redirects.
		pub sink: Arc<RecordingSink>,
	}

	/// Builds a config rooted at `base_url` (e.g. `server.url("/api")`).
	pub fn test_config(base_url: &str) -> ApiConfig {
		let base = Url::parse(base_url).expect("Failed to parse test API base URL.");

		ApiConfig::builder(base).build().expect("Test API config should build successfully.")
	}

	/// Constructs a reqwest-backed [`ApiClient`] over `store` with a recording sink.
	pub fn build_reqwest_test_client_with_store(base_url: &str, store: MemoryStore) -> TestHarness {
		let store = Arc::new(store);
		let sink = Arc::new(RecordingSink::default());
		let store_dyn: Arc<dyn CredentialStore> = store.clone();
		let sink_dyn: Arc<dyn FailureSink> = sink.clone();
		let client = ApiClient::with_transport(
			test_config(base_url),
			store_dyn,
			sink_dyn,
			ReqwestTransport::default(),
		);

		TestHarness { client, store, sink }
	}

	/// Constructs a reqwest-backed [`ApiClient`] with an empty in-memory store.
	pub fn build_reqwest_test_client(base_url: &str) -> TestHarness {
		build_reqwest_test_client_with_store(base_url, MemoryStore::default())
	}

	/// Constructs a reqwest-backed [`ApiClient`] whose store already holds `access` and
	/// `refresh`.
	pub fn build_signed_in_test_client(base_url: &str, access: &str, refresh: &str) -> TestHarness {
		build_reqwest_test_client_with_store(
			base_url,
			MemoryStore::with_pair(CredentialPair::new(access, refresh)),
		)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Date, OffsetDateTime, Time};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use time;
pub use url;
#[cfg(test)] use color_eyre as _;
#[cfg(all(test, not(feature = "reqwest")))] use httpmock as _;
