//! Fixtures shared by the integration suites.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use time::{Duration, OffsetDateTime};
// self
use paydash::{auth::TokenStore, error::RefreshFailure, store::MemoryStore};
#[cfg(feature = "reqwest")] use paydash::{client::ReqwestApiClient, config::HttpConfig};

/// Builds an unsigned bearer token whose `exp` claim sits `expires_in` from now.
pub fn mint_token(subject: &str, expires_in: Duration) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
	let claims = serde_json::json!({
		"sub": subject,
		"exp": (OffsetDateTime::now_utc() + expires_in).unix_timestamp(),
	});

	format!("{header}.{}.signature", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

/// Token that expired a minute ago.
pub fn expired_token(subject: &str) -> String {
	mint_token(subject, Duration::minutes(-1))
}

/// Token valid for another hour.
pub fn live_token(subject: &str) -> String {
	mint_token(subject, Duration::hours(1))
}

/// Seeds the store with a token pair.
pub fn seed_tokens(store: &Arc<MemoryStore>, access: &str, refresh: &str) {
	TokenStore::new(store.clone())
		.set_tokens(access, refresh)
		.expect("Seeding tokens into the memory store should succeed.");
}

/// Counts session-expired notifications.
#[derive(Clone, Debug, Default)]
pub struct ExpiryCounter(Arc<AtomicUsize>);
impl ExpiryCounter {
	/// Notifications received so far.
	pub fn count(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}

	/// Listener closure that bumps this counter.
	pub fn listener(&self) -> impl Fn(&RefreshFailure) + Send + Sync + 'static {
		let counter = self.0.clone();

		move |_: &RefreshFailure| {
			counter.fetch_add(1, Ordering::SeqCst);
		}
	}
}

#[cfg(feature = "reqwest")]
/// Builds a reqwest-backed client pointed at `base_url` over a fresh memory store.
pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestApiClient, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let config = HttpConfig::builder()
		.base_url(base_url)
		.build()
		.expect("Mock server base URL should be accepted.");
	let client = ReqwestApiClient::new(config, store.clone());

	(client, store)
}
