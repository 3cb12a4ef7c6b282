//! Bearer credentials issued by the backend's token endpoints.

// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping token material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the `Authorization` header value for this credential.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Which half of a [`CredentialPair`] a stored value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
	/// Short-lived bearer credential attached to API calls.
	Access,
	/// Longer-lived credential exchanged for a new access credential.
	Refresh,
}
impl CredentialKind {
	/// Well-known storage key for this credential.
	pub const fn storage_key(self) -> &'static str {
		match self {
			Self::Access => "access_token",
			Self::Refresh => "refresh_token",
		}
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.storage_key())
	}
}

/// Access + refresh credentials issued together by the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Access credential.
	pub access: Credential,
	/// Refresh credential.
	pub refresh: Credential,
}
impl CredentialPair {
	/// Creates a pair from raw strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: Credential::new(access), refresh: Credential::new(refresh) }
	}
}
