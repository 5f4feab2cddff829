//! Request descriptors, per-call options, and URL assembly.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// HTTP verbs supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the wire spelling.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Query parameters kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);
impl QueryParams {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `key=value`, coercing the value to its display form.
	pub fn push(&mut self, key: impl Into<String>, value: impl Display) {
		self.0.push((key.into(), value.to_string()));
	}

	/// Appends `key=value` only when a value is present.
	pub fn push_opt(&mut self, key: impl Into<String>, value: Option<impl Display>) {
		if let Some(value) = value {
			self.push(key, value);
		}
	}

	/// Returns the value of the first pair named `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
	}

	/// Returns `true` when no parameters were added.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
		self.0.iter()
	}

	/// Serializes the pairs as an `application/x-www-form-urlencoded` query string.
	pub fn to_query_string(&self) -> String {
		form_urlencoded::Serializer::new(String::new()).extend_pairs(self.0.iter()).finish()
	}
}
impl<K, V> FromIterator<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Display,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::new();

		for (key, value) in iter {
			params.push(key, value);
		}

		params
	}
}

/// Optional per-call settings layered over the client's defaults.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Query parameters appended to the URL.
	pub params: QueryParams,
	/// Extra headers; these override the configured defaults.
	pub headers: BTreeMap<String, String>,
	/// Per-call timeout; falls back to the configured default.
	pub timeout: Option<StdDuration>,
}
impl RequestOptions {
	/// Adds a query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
		self.params.push(key, value);

		self
	}

	/// Replaces the query parameters.
	pub fn with_params(mut self, params: QueryParams) -> Self {
		self.params = params;

		self
	}

	/// Adds or overrides a header for this call.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Overrides the timeout for this call.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Fully resolved request handed to an [`HttpTransport`](crate::http::HttpTransport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: String,
	/// Outgoing headers.
	pub headers: BTreeMap<String, String>,
	/// Serialized JSON body.
	pub body: Option<String>,
	/// Time budget for the whole exchange.
	pub timeout: StdDuration,
}
impl RequestDescriptor {
	/// Header carrying the bearer credential.
	pub const AUTHORIZATION: &'static str = "Authorization";

	/// Returns a copy of the descriptor carrying `Authorization: Bearer <token>`.
	pub fn with_bearer(&self, token: &str) -> Self {
		let mut descriptor = self.clone();

		descriptor.headers.insert(Self::AUTHORIZATION.into(), format!("Bearer {token}"));

		descriptor
	}

	/// Returns the bearer credential currently attached, if any.
	pub fn bearer(&self) -> Option<&str> {
		self.headers.get(Self::AUTHORIZATION)?.strip_prefix("Bearer ")
	}
}

/// Joins `base_url` and `path` and appends the URL-encoded parameters in insertion order.
pub fn build_url(base_url: &str, path: &str, params: &QueryParams) -> String {
	let mut url = format!("{base_url}{path}");

	if params.is_empty() {
		return url;
	}

	url.push(if url.contains('?') { '&' } else { '?' });
	url.push_str(&params.to_query_string());

	url
}
