//! Unverified bearer-token claim decoding and expiry checks.
//!
//! Tokens are split into three dot-separated segments and the middle one is decoded as
//! base64url JSON. Signatures are never checked; the claims only drive client-side decisions
//! such as refreshing ahead of a request. Anything that fails to decode counts as expired.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Reasons a token could not be decoded.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// The token does not have exactly three segments.
	#[error("Token must have three dot-separated segments.")]
	Segments,
	/// The payload segment is not base64url.
	#[error("Token payload is not valid base64url.")]
	Encoding(#[from] base64::DecodeError),
	/// The payload is not a JSON object.
	#[error("Token payload is not a JSON object.")]
	Payload,
}

/// Decoded claim set of a bearer token.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenClaims(serde_json::Map<String, Value>);
impl TokenClaims {
	/// Decodes the payload segment of `token`.
	pub fn decode(token: &str) -> Result<Self, ClaimsError> {
		let mut segments = token.split('.');
		let (Some(_), Some(payload), Some(_), None) =
			(segments.next(), segments.next(), segments.next(), segments.next())
		else {
			return Err(ClaimsError::Segments);
		};
		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;

		match serde_json::from_slice(&bytes) {
			Ok(Value::Object(map)) => Ok(Self(map)),
			_ => Err(ClaimsError::Payload),
		}
	}

	/// Returns a raw claim.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Numeric `exp` claim in seconds since the epoch.
	pub fn expires_at(&self) -> Option<f64> {
		self.0.get("exp")?.as_f64()
	}

	/// `true` when `exp` is missing, non-numeric, or earlier than `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		match self.expires_at() {
			Some(exp) => exp < unix_seconds(now),
			None => true,
		}
	}
}

/// Checks a token against the current wall clock.
pub fn is_token_expired(token: &str) -> bool {
	is_token_expired_at(token, OffsetDateTime::now_utc())
}

/// Checks a token against `now`; malformed tokens are expired.
pub fn is_token_expired_at(token: &str, now: OffsetDateTime) -> bool {
	TokenClaims::decode(token).map(|claims| claims.is_expired_at(now)).unwrap_or(true)
}

fn unix_seconds(instant: OffsetDateTime) -> f64 {
	instant.unix_timestamp_nanos() as f64 / 1_000_000_000.
}
