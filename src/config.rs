//! Process-wide HTTP settings and the API's well-known endpoint paths.

// std
use std::env;
// crates.io
use url::Url;
// self
use crate::{_prelude::*, error::ConfigError};

/// Path of the payment listing endpoint.
pub const PAYMENT_LIST_PATH: &str = "/dashboard/v1/payments";

/// Base URL, default headers, and default timeout read by every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfig {
	/// Prefix joined with every request path; may be empty for relative URLs.
	pub base_url: String,
	/// Headers attached to every request.
	pub default_headers: BTreeMap<String, String>,
	/// Timeout applied when a call does not set its own.
	pub timeout: StdDuration,
}
impl HttpConfig {
	/// Default per-request timeout.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);
	/// Environment variable consulted by [`HttpConfig::from_env`].
	pub const BASE_URL_ENV: &'static str = "PAYDASH_API_BASE_URL";

	/// Returns a builder seeded with the defaults.
	pub fn builder() -> HttpConfigBuilder {
		HttpConfigBuilder::default()
	}

	/// Loads the defaults plus the base URL from [`Self::BASE_URL_ENV`] (empty when unset).
	pub fn from_env() -> Result<Self, ConfigError> {
		let base_url = env::var(Self::BASE_URL_ENV).unwrap_or_default();

		Self::builder().base_url(base_url).build()
	}

	/// Validates and normalizes a base URL: trailing slashes are trimmed and non-empty values must
	/// be absolute.
	pub fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
		let trimmed = value.trim().trim_end_matches('/');

		if !trimmed.is_empty() {
			Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
				value: value.to_owned(),
				source,
			})?;
		}

		Ok(trimmed.to_owned())
	}
}
impl Default for HttpConfig {
	fn default() -> Self {
		let mut default_headers = BTreeMap::new();

		default_headers.insert("Content-Type".into(), "application/json".into());

		Self { base_url: String::new(), default_headers, timeout: Self::DEFAULT_TIMEOUT }
	}
}

/// Builder for [`HttpConfig`].
#[derive(Clone, Debug, Default)]
pub struct HttpConfigBuilder {
	base_url: Option<String>,
	headers: BTreeMap<String, String>,
	removed: Vec<String>,
	timeout: Option<StdDuration>,
}
impl HttpConfigBuilder {
	/// Sets the base URL.
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Adds or overrides a default header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Drops one of the built-in default headers.
	pub fn without_header(mut self, name: impl Into<String>) -> Self {
		self.removed.push(name.into());

		self
	}

	/// Sets the default timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the result.
	pub fn build(self) -> Result<HttpConfig, ConfigError> {
		let mut config = HttpConfig::default();

		if let Some(base_url) = self.base_url {
			config.base_url = HttpConfig::normalize_base_url(&base_url)?;
		}
		for name in &self.removed {
			config.default_headers.remove(name);
		}

		config.default_headers.extend(self.headers);

		if let Some(timeout) = self.timeout {
			config.timeout = timeout;
		}

		Ok(config)
	}
}

/// Paths that never carry a bearer token and never trigger a refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthEndpoints {
	/// Credential exchange path.
	pub login: String,
	/// Refresh-token exchange path.
	pub refresh: String,
}
impl AuthEndpoints {
	/// Returns `true` when `path` targets the login or refresh endpoint.
	pub fn is_auth_path(&self, path: &str) -> bool {
		path.contains(self.login.as_str()) || path.contains(self.refresh.as_str())
	}
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self { login: "/dashboard/v1/auth/login".into(), refresh: "/dashboard/v1/auth/refresh".into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_the_api_contract() {
		let config = HttpConfig::default();

		assert_eq!(config.base_url, "");
		assert_eq!(config.timeout, StdDuration::from_secs(30));
		assert_eq!(
			config.default_headers.get("Content-Type").map(String::as_str),
			Some("application/json")
		);
	}

	#[test]
	fn builder_normalizes_and_validates_base_url() {
		let config = HttpConfig::builder()
			.base_url("https://api.example.com/")
			.header("X-Client", "paydash")
			.timeout(StdDuration::from_secs(5))
			.build()
			.expect("Builder should accept an absolute base URL.");

		assert_eq!(config.base_url, "https://api.example.com");
		assert_eq!(config.default_headers.len(), 2);
		assert_eq!(config.timeout, StdDuration::from_secs(5));

		let err = HttpConfig::builder()
			.base_url("not a url")
			.build()
			.expect_err("Relative garbage should be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn builder_can_drop_default_headers() {
		let config = HttpConfig::builder()
			.without_header("Content-Type")
			.build()
			.expect("Builder should succeed without a base URL.");

		assert!(config.default_headers.is_empty());
	}

	#[test]
	fn auth_paths_are_recognized() {
		let endpoints = AuthEndpoints::default();

		assert!(endpoints.is_auth_path("/dashboard/v1/auth/login"));
		assert!(endpoints.is_auth_path("/dashboard/v1/auth/refresh"));
		assert!(!endpoints.is_auth_path(PAYMENT_LIST_PATH));
	}
}
