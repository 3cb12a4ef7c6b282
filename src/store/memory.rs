//! Thread-safe in-memory [`CredentialStore`] implementation for embedding and tests.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, CredentialPair},
	store::{CredentialSnapshot, CredentialStore, StoreFuture},
};

/// Storage backend that keeps credentials in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<CredentialSnapshot>>);
impl MemoryStore {
	/// Creates a store already holding `pair`, as if a login had just succeeded.
	pub fn with_pair(pair: CredentialPair) -> Self {
		let store = Self::default();

		store.0.write().set_pair(pair);

		store
	}

	/// Returns a copy of the current contents.
	pub fn snapshot(&self) -> CredentialSnapshot {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self, kind: CredentialKind) -> StoreFuture<'_, Option<Credential>> {
		let inner = self.0.clone();

		Box::pin(async move { Ok(inner.read().get(kind).cloned()) })
	}

	fn save(&self, kind: CredentialKind, credential: Credential) -> StoreFuture<'_, ()> {
		let inner = self.0.clone();

		Box::pin(async move {
			inner.write().set(kind, credential);

			Ok(())
		})
	}

	fn save_pair(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		let inner = self.0.clone();

		Box::pin(async move {
			inner.write().set_pair(pair);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let inner = self.0.clone();

		Box::pin(async move {
			inner.write().clear();

			Ok(())
		})
	}
}
