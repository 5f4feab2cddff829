//! Transport primitives for dashboard API calls.
//!
//! The module exposes [`HttpTransport`] alongside [`HttpResponse`] and [`ResponseBody`] so
//! downstream crates can plug in a custom HTTP stack (or an in-process fake) without touching
//! the executor. Implementations receive a fully resolved [`RequestDescriptor`] and must
//! enforce its `timeout`, reporting expiry as [`TransportError::Timeout`] so callers can tell it
//! apart from other network failures.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::CONTENT_TYPE;
// self
use crate::{_prelude::*, error::TransportError, request::RequestDescriptor};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing one request descriptor.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by every
/// clone of the client, and the returned future must own whatever it needs so it stays `Send`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the full response body is available.
	fn send(&self, request: RequestDescriptor) -> TransportFuture<'_>;
}

/// Raw response captured by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase; empty when the status code has none.
	pub status_text: String,
	/// `Content-Type` header value, if any.
	pub content_type: Option<String>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Status code used by the API to reject a bearer token.
	pub const UNAUTHORIZED: u16 = 401;

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Parses the body according to the content type.
	pub fn parse_body(&self) -> ResponseBody {
		ResponseBody::parse(self.content_type.as_deref(), &self.body)
	}
}

/// Response body parsed as structured data when the content type says JSON, as text otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
	/// Structured JSON body.
	Json(Value),
	/// Anything else, decoded lossily as UTF-8.
	Text(String),
}
impl ResponseBody {
	/// Parses raw bytes. JSON bodies that fail to parse are kept as text; empty JSON bodies become
	/// `null`.
	pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Self {
		let is_json = content_type.is_some_and(|value| value.contains("application/json"));

		if is_json {
			if bytes.iter().all(u8::is_ascii_whitespace) {
				return Self::Json(Value::Null);
			}
			if let Ok(value) = serde_json::from_slice(bytes) {
				return Self::Json(value);
			}
		}

		Self::Text(String::from_utf8_lossy(bytes).into_owned())
	}

	/// Returns a top-level string field of a JSON object body.
	pub fn field_str(&self, name: &str) -> Option<&str> {
		match self {
			Self::Json(Value::Object(map)) => map.get(name)?.as_str(),
			_ => None,
		}
	}

	/// Returns the server-supplied error text: `error` first, then `message`.
	pub fn error_message(&self) -> Option<&str> {
		self.field_str("error").or_else(|| self.field_str("message"))
	}

	/// Converts the body into a JSON value; text becomes a string, empty text becomes `null`.
	pub fn into_value(self) -> Value {
		match self {
			Self::Json(value) => value,
			Self::Text(text) if text.is_empty() => Value::Null,
			Self::Text(text) => Value::String(text),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestTransport(..)")
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: RequestDescriptor) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let RequestDescriptor { method, url, headers, body, timeout } = request;
			let mut builder = client.request(method.into(), url.as_str()).timeout(timeout);

			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse {
				status: status.as_u16(),
				status_text: status.canonical_reason().unwrap_or_default().to_owned(),
				content_type,
				body,
			})
		})
	}
}
