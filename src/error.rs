//! Client-level error types shared across the executor, refresh coordinator, and stores.

// self
use crate::{_prelude::*, http::ResponseBody};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(TransportError),
	/// Server answered outside the 2xx range.
	#[error(transparent)]
	Http(Box<HttpError>),

	/// The request did not settle before its timeout elapsed.
	#[error("Request timeout.")]
	Timeout,
	/// The refresh exchange failed; stored tokens were cleared and the user must log in again.
	#[error("Session expired. Please login again.")]
	SessionExpired {
		/// Why the refresh exchange could not produce a token.
		reason: RefreshFailure,
	},
	/// A 2xx body did not match the caller's expected shape.
	#[error("Response body does not match the expected shape.")]
	Decode {
		/// Path-aware deserialization failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the message a caller should show to a user.
	///
	/// Structured HTTP bodies win (`error` first, then `message`), then the error's own display
	/// text, then `default`.
	pub fn user_message(&self, default: &str) -> String {
		let message = match self {
			Self::Http(err) => err.body.error_message().map(str::to_owned).unwrap_or_else(|| err.message.clone()),
			other => other.to_string(),
		};

		if message.is_empty() { default.to_owned() } else { message }
	}

	/// HTTP status code carried by the error, if the server answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http(err) => Some(err.status),
			_ => None,
		}
	}
}
impl From<HttpError> for Error {
	fn from(e: HttpError) -> Self {
		Self::Http(Box::new(e))
	}
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		match e {
			TransportError::Timeout => Self::Timeout,
			other => Self::Transport(other),
		}
	}
}

/// Normalized non-2xx response.
#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct HttpError {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase for the status code; empty for non-standard codes.
	pub status_text: String,
	/// Parsed response body.
	pub body: ResponseBody,
	/// Primary human-readable message.
	pub message: String,
}
impl HttpError {
	/// Builds an error, lifting `error`/`message` out of a structured body when present.
	pub fn new(status: u16, status_text: impl Into<String>, body: ResponseBody) -> Self {
		let status_text = status_text.into();
		let message = match body.error_message() {
			Some(message) => message.to_owned(),
			None if status_text.is_empty() => format!("HTTP Error: {status}"),
			None => status_text.clone(),
		};

		Self { status, status_text, body, message }
	}
}

/// Why a refresh exchange failed. Cloned to every caller blocked on the same exchange.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshFailure {
	/// No refresh token is stored.
	#[error("No refresh token is available.")]
	MissingRefreshToken,
	/// The refresh endpoint answered outside the 2xx range.
	#[error("Refresh endpoint rejected the token with status {status}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
	},
	/// The refresh call failed before a response arrived.
	#[error("Refresh call failed: {message}.")]
	Transport {
		/// Transport failure summary.
		message: String,
	},
	/// The refresh endpoint answered 2xx without a usable token.
	#[error("Refresh endpoint returned a malformed response: {message}.")]
	MalformedResponse {
		/// Parse failure summary.
		message: String,
	},
	/// The refreshed tokens could not be persisted.
	#[error("Refreshed tokens could not be stored: {message}.")]
	Storage {
		/// Storage failure summary.
		message: String,
	},
	/// The caller driving the exchange was dropped before it settled.
	#[error("Refresh exchange was interrupted.")]
	Interrupted,
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Rejected value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The per-request timeout elapsed before the response settled.
	#[error("Request timeout.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
