//! File-backed [`CredentialStore`] that survives process restarts, the durable counterpart of
//! browser local storage.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, CredentialPair},
	store::{CredentialSnapshot, CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential snapshot to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<CredentialSnapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<CredentialSnapshot, StoreError> {
		if !path.exists() {
			return Ok(CredentialSnapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(CredentialSnapshot::default());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &CredentialSnapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate(&self, apply: impl FnOnce(&mut CredentialSnapshot)) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();

		apply(&mut next);
		self.persist_locked(&next)?;

		*guard = next;

		Ok(())
	}
}
impl CredentialStore for FileStore {
	fn load(&self, kind: CredentialKind) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { Ok(self.inner.read().get(kind).cloned()) })
	}

	fn save(&self, kind: CredentialKind, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.set(kind, credential)) })
	}

	fn save_pair(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.set_pair(pair)) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(CredentialSnapshot::clear) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"attendance_client_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[tokio::test]
	async fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save_pair(CredentialPair::new("access-file", "refresh-file"))
			.await
			.expect("Failed to save credential pair to file store.");
		store
			.save(CredentialKind::Access, Credential::new("access-rotated"))
			.await
			.expect("Failed to replace access credential in file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let access = reopened
			.load(CredentialKind::Access)
			.await
			.expect("Failed to load access credential from file store.")
			.expect("File store lost the access credential after reopen.");
		let refresh = reopened
			.load(CredentialKind::Refresh)
			.await
			.expect("Failed to load refresh credential from file store.")
			.expect("File store lost the refresh credential after reopen.");

		assert_eq!(access.expose(), "access-rotated");
		assert_eq!(refresh.expose(), "refresh-file");

		reopened.clear().await.expect("Failed to clear file store.");

		let cleared = FileStore::open(&path).expect("Failed to reopen cleared file store.");

		assert!(
			cleared
				.load(CredentialKind::Refresh)
				.await
				.expect("Failed to load from cleared file store.")
				.is_none()
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_a_serialization_error() {
		let path = temp_path();

		fs::write(&path, b"{not json").expect("Failed to write corrupt snapshot fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshots should fail to open.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
