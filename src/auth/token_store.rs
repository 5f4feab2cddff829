//! Persisted access/refresh token pair.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret, claims},
	store::{KeyValueStore, StoreError},
};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Reads and writes the token pair in durable client storage.
#[derive(Clone)]
pub struct TokenStore {
	storage: Arc<dyn KeyValueStore>,
}
impl TokenStore {
	/// Wraps a storage backend.
	pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
		Self { storage }
	}

	/// Persists both tokens, overwriting previous values.
	pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
		self.storage.set(ACCESS_TOKEN_KEY, access)?;
		self.storage.set(REFRESH_TOKEN_KEY, refresh)
	}

	/// Persists a freshly issued pair.
	pub fn store_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
		self.set_tokens(pair.access.expose(), pair.refresh.expose())
	}

	/// Stored access token, if any.
	pub fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.storage.get(ACCESS_TOKEN_KEY)?.map(TokenSecret::new))
	}

	/// Stored refresh token, if any.
	pub fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.storage.get(REFRESH_TOKEN_KEY)?.map(TokenSecret::new))
	}

	/// Removes both tokens.
	///
	/// Both removals are attempted even when the first one fails; the first error is returned.
	pub fn clear_tokens(&self) -> Result<(), StoreError> {
		let access = self.storage.remove(ACCESS_TOKEN_KEY);
		let refresh = self.storage.remove(REFRESH_TOKEN_KEY);

		access.and(refresh)
	}

	/// `Bearer <token>` header value for the stored access token.
	pub fn authorization_header(&self) -> Result<Option<String>, StoreError> {
		Ok(self.access_token()?.map(|token| format!("Bearer {}", token.expose())))
	}

	/// `true` when no access token is stored or the stored one is expired at `now`.
	pub fn is_access_token_expired_at(&self, now: OffsetDateTime) -> Result<bool, StoreError> {
		Ok(self
			.access_token()?
			.is_none_or(|token| claims::is_token_expired_at(token.expose(), now)))
	}

	/// `true` when no refresh token is stored or the stored one is expired at `now`.
	pub fn is_refresh_token_expired_at(&self, now: OffsetDateTime) -> Result<bool, StoreError> {
		Ok(self
			.refresh_token()?
			.is_none_or(|token| claims::is_token_expired_at(token.expose(), now)))
	}

	/// Authentication check against the current wall clock.
	pub fn is_authenticated(&self) -> Result<bool, StoreError> {
		self.is_authenticated_at(OffsetDateTime::now_utc())
	}

	/// A live refresh token or a live access token counts as authenticated.
	pub fn is_authenticated_at(&self, now: OffsetDateTime) -> Result<bool, StoreError> {
		Ok(!self.is_refresh_token_expired_at(now)? || !self.is_access_token_expired_at(now)?)
	}
}
impl Debug for TokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenStore(..)")
	}
}
