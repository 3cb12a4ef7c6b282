//! API location and auth-endpoint configuration.

// self
use crate::{_prelude::*, error::ConfigError};

/// Errors raised while constructing or validating an [`ApiConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ApiConfigError {
	/// Base URL cannot be parsed.
	#[error("The API base URL is invalid: {url}.")]
	InvalidBaseUrl {
		/// Raw base URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL must use HTTP or HTTPS.
	#[error("The API base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry path segments.
	#[error("The API base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL carries a query string or fragment.
	#[error("The API base URL must not carry a query or fragment: {url}.")]
	UnexpectedQueryOrFragment {
		/// Base URL that failed validation.
		url: String,
	},
	/// Auth endpoint path is empty.
	#[error("The {endpoint} endpoint path must not be empty.")]
	EmptyPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
	},
}

/// Immutable API configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	/// Root every endpoint path is appended to.
	pub base_url: Url,
	/// Login endpoint returning `{ access, refresh }`.
	pub token_path: String,
	/// Refresh endpoint returning `{ access }`.
	pub refresh_path: String,
}
impl ApiConfig {
	/// Base URL used when nothing else is configured.
	pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api";
	/// Default login endpoint path.
	pub const DEFAULT_TOKEN_PATH: &'static str = "/token/";
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/token/refresh/";

	/// Creates a new builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> ApiConfigBuilder {
		ApiConfigBuilder::new(base_url)
	}

	/// Parses `base_url` and builds a config with the default auth paths.
	pub fn from_base(base_url: &str) -> Result<Self, ApiConfigError> {
		let base = Url::parse(base_url)
			.map_err(|source| ApiConfigError::InvalidBaseUrl { url: base_url.into(), source })?;

		Self::builder(base).build()
	}

	/// Config pointing at [`ApiConfig::DEFAULT_BASE_URL`].
	pub fn localhost() -> Result<Self, ApiConfigError> {
		Self::from_base(Self::DEFAULT_BASE_URL)
	}

	/// Resolves an endpoint path (leading `/` optional, query allowed) against the base URL.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if endpoint.starts_with('/') {
			format!("{base}{endpoint}")
		} else {
			format!("{base}/{endpoint}")
		};

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: endpoint.into(), source })
	}

	/// Returns `true` when `endpoint` addresses the refresh endpoint.
	pub fn is_refresh_endpoint(&self, endpoint: &str) -> bool {
		normalize(endpoint) == normalize(&self.refresh_path)
	}

	/// Returns `true` when `endpoint` addresses the login endpoint.
	pub fn is_token_endpoint(&self, endpoint: &str) -> bool {
		normalize(endpoint) == normalize(&self.token_path)
	}

	/// Auth endpoints answer 401 for bad credentials; they never enter the refresh path.
	pub fn is_auth_endpoint(&self, endpoint: &str) -> bool {
		self.is_refresh_endpoint(endpoint) || self.is_token_endpoint(endpoint)
	}

	fn validate(&self) -> Result<(), ApiConfigError> {
		let url = &self.base_url;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ApiConfigError::UnsupportedScheme { url: url.to_string() });
		}
		if url.cannot_be_a_base() {
			return Err(ApiConfigError::CannotBeABase { url: url.to_string() });
		}
		if url.query().is_some() || url.fragment().is_some() {
			return Err(ApiConfigError::UnexpectedQueryOrFragment { url: url.to_string() });
		}

		validate_path("token", &self.token_path)?;
		validate_path("refresh", &self.refresh_path)?;

		Ok(())
	}
}

/// Builder for [`ApiConfig`] values.
#[derive(Debug)]
pub struct ApiConfigBuilder {
	/// Root every endpoint path is appended to.
	pub base_url: Url,
	/// Login endpoint path.
	pub token_path: String,
	/// Refresh endpoint path.
	pub refresh_path: String,
}
impl ApiConfigBuilder {
	/// Creates a new builder seeded with the default auth paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			token_path: ApiConfig::DEFAULT_TOKEN_PATH.into(),
			refresh_path: ApiConfig::DEFAULT_REFRESH_PATH.into(),
		}
	}

	/// Overrides the login endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ApiConfig, ApiConfigError> {
		let config = ApiConfig {
			base_url: self.base_url,
			token_path: self.token_path,
			refresh_path: self.refresh_path,
		};

		config.validate()?;

		Ok(config)
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ApiConfigError> {
	if normalize(path).is_empty() {
		Err(ApiConfigError::EmptyPath { endpoint })
	} else {
		Ok(())
	}
}

fn normalize(endpoint: &str) -> &str {
	let path = endpoint.split(['?', '#']).next().unwrap_or_default();

	path.trim_matches('/')
}
