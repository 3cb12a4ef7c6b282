//! Storage contracts and built-in credential stores.
//!
//! A store holds at most two values under the well-known keys `access_token` and
//! `refresh_token`. Absence of either is a valid logged-out state, not an error.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, CredentialPair},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the client's credential pair.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Reads the credential stored under `kind`, if present.
	fn load(&self, kind: CredentialKind) -> StoreFuture<'_, Option<Credential>>;

	/// Persists or replaces the credential stored under `kind`.
	fn save(&self, kind: CredentialKind, credential: Credential) -> StoreFuture<'_, ()>;

	/// Persists both credentials of a freshly issued pair.
	fn save_pair(&self, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Removes every stored credential.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Point-in-time view of the stored credentials, shared by the built-in stores.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSnapshot {
	/// Stored access credential.
	#[serde(default, rename = "access_token", skip_serializing_if = "Option::is_none")]
	pub access: Option<Credential>,
	/// Stored refresh credential.
	#[serde(default, rename = "refresh_token", skip_serializing_if = "Option::is_none")]
	pub refresh: Option<Credential>,
	/// Instant of the last mutation.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}
impl CredentialSnapshot {
	/// Returns the credential stored under `kind`.
	pub fn get(&self, kind: CredentialKind) -> Option<&Credential> {
		match kind {
			CredentialKind::Access => self.access.as_ref(),
			CredentialKind::Refresh => self.refresh.as_ref(),
		}
	}

	/// Replaces the credential stored under `kind` and stamps the mutation time.
	pub fn set(&mut self, kind: CredentialKind, credential: Credential) {
		match kind {
			CredentialKind::Access => self.access = Some(credential),
			CredentialKind::Refresh => self.refresh = Some(credential),
		}

		self.touch();
	}

	/// Replaces both credentials.
	pub fn set_pair(&mut self, pair: CredentialPair) {
		self.access = Some(pair.access);
		self.refresh = Some(pair.refresh);

		self.touch();
	}

	/// Drops both credentials.
	pub fn clear(&mut self) {
		self.access = None;
		self.refresh = None;

		self.touch();
	}

	/// Returns `true` when neither credential is stored.
	pub fn is_empty(&self) -> bool {
		self.access.is_none() && self.refresh.is_none()
	}

	fn touch(&mut self) {
		self.updated_at = Some(OffsetDateTime::now_utc());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the underlying store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn snapshot_uses_well_known_keys() {
		let mut snapshot = CredentialSnapshot::default();

		snapshot.set_pair(CredentialPair::new("access-1", "refresh-1"));

		let payload =
			serde_json::to_value(&snapshot).expect("Credential snapshot should serialize to JSON.");

		assert_eq!(payload["access_token"], "access-1");
		assert_eq!(payload["refresh_token"], "refresh-1");
		assert!(payload["updated_at"].is_string());

		snapshot.clear();

		assert!(snapshot.is_empty());
		assert!(snapshot.get(CredentialKind::Access).is_none());
	}
}
