mod common;

// std
use std::{
	sync::{Arc, Mutex},
	time::Duration as StdDuration,
};
// crates.io
use futures::future;
use serde_json::{Value, json};
// self
use common::*;
use paydash::{
	auth::{ACCESS_TOKEN_KEY, TokenStore},
	client::ApiClient,
	config::HttpConfig,
	error::{Error, RefreshFailure, TransportError},
	http::{HttpResponse, HttpTransport, TransportFuture},
	request::{RequestDescriptor, RequestOptions},
	store::{KeyValueStore, MemoryStore, StoreError},
};

const BASE_URL: &str = "https://api.example.test";
const REFRESH_PATH: &str = "/dashboard/v1/auth/refresh";
const DATA_PATH: &str = "/dashboard/v1/reports";

/// In-process API double: the refresh endpoint answers after `refresh_delay` and issues
/// `fresh_access`; every other path accepts only `fresh_access`.
struct ScriptedTransport {
	fresh_access: String,
	refresh_delay: StdDuration,
	requests: Mutex<Vec<RequestDescriptor>>,
}
impl ScriptedTransport {
	fn new(fresh_access: String, refresh_delay: StdDuration) -> Self {
		Self { fresh_access, refresh_delay, requests: Mutex::default() }
	}

	fn requests_to(&self, path: &str) -> Vec<RequestDescriptor> {
		self.requests
			.lock()
			.expect("Request log lock should not be poisoned.")
			.iter()
			.filter(|request| request.url.starts_with(&format!("{BASE_URL}{path}")))
			.cloned()
			.collect()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: RequestDescriptor) -> TransportFuture<'_> {
		Box::pin(async move {
			self.requests.lock().expect("Request log lock should not be poisoned.").push(request.clone());

			if request.url.ends_with(REFRESH_PATH) {
				tokio::time::sleep(self.refresh_delay).await;

				return Ok(json_response(
					200,
					json!({ "token": self.fresh_access, "refreshToken": "refresh-2" }),
				));
			}
			if request.bearer() == Some(self.fresh_access.as_str()) {
				Ok(json_response(200, json!({ "ok": true })))
			} else {
				Ok(HttpResponse { status: 401, status_text: "Unauthorized".into(), ..Default::default() })
			}
		})
	}
}

/// Transport whose every call exceeds its time budget.
struct StalledTransport;
impl HttpTransport for StalledTransport {
	fn send(&self, _: RequestDescriptor) -> TransportFuture<'_> {
		Box::pin(async { Err(TransportError::Timeout) })
	}
}

/// Transport that rejects every call, refresh included.
struct RejectingTransport;
impl HttpTransport for RejectingTransport {
	fn send(&self, _: RequestDescriptor) -> TransportFuture<'_> {
		Box::pin(async {
			Ok(HttpResponse { status: 401, status_text: "Unauthorized".into(), ..Default::default() })
		})
	}
}

/// Memory store that refuses to delete the access token.
#[derive(Default)]
struct PinnedAccessStore(MemoryStore);
impl KeyValueStore for PinnedAccessStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		self.0.get(key)
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.set(key, value)
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		if key == ACCESS_TOKEN_KEY {
			return Err(StoreError::Backend { message: "disk full".into() });
		}

		self.0.remove(key)
	}
}

fn json_response(status: u16, body: Value) -> HttpResponse {
	HttpResponse {
		status,
		status_text: "OK".into(),
		content_type: Some("application/json".into()),
		body: body.to_string().into_bytes(),
	}
}

fn scripted_client(
	refresh_delay: StdDuration,
) -> (ApiClient<ScriptedTransport>, Arc<ScriptedTransport>, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let transport = Arc::new(ScriptedTransport::new(live_token("fresh"), refresh_delay));
	let config = HttpConfig::builder().base_url(BASE_URL).build().expect("Base URL should be valid.");
	let client =
		ApiClient::<ScriptedTransport>::with_transport(config, store.clone(), transport.clone());

	(client, transport, store)
}

#[tokio::test]
async fn custom_transport_sees_one_refresh_for_many_callers() {
	let (client, transport, store) = scripted_client(StdDuration::from_millis(50));

	seed_tokens(&store, &expired_token("stale"), "refresh-1");

	let outcomes = future::join_all(
		(0..8).map(|_| client.get::<Value>(DATA_PATH, RequestOptions::default())),
	)
	.await;

	assert!(outcomes.iter().all(Result::is_ok));

	let refreshes = transport.requests_to(REFRESH_PATH);

	assert_eq!(refreshes.len(), 1);
	assert_eq!(refreshes[0].bearer(), None);
	assert_eq!(refreshes[0].body.as_deref(), Some(r#"{"refreshToken":"refresh-1"}"#));

	let data = transport.requests_to(DATA_PATH);

	assert_eq!(data.len(), 8);
	assert!(data.iter().all(|request| request.bearer() == Some(transport.fresh_access.as_str())));
}

#[tokio::test]
async fn waiters_recover_when_the_leading_call_is_dropped() {
	let (client, transport, store) = scripted_client(StdDuration::from_millis(50));

	seed_tokens(&store, &expired_token("stale"), "refresh-1");

	let mut leader = Box::pin(client.get::<Value>(DATA_PATH, RequestOptions::default()));

	assert!(futures::poll!(leader.as_mut()).is_pending());

	let mut waiter = Box::pin(client.get::<Value>(DATA_PATH, RequestOptions::default()));

	assert!(futures::poll!(waiter.as_mut()).is_pending());
	assert_eq!(client.refresh_coordinator().pending_waiters(), 1);

	drop(leader);

	let body = waiter.await.expect("The waiter should lead a new exchange and succeed.");

	assert_eq!(body, json!({ "ok": true }));
	assert_eq!(transport.requests_to(REFRESH_PATH).len(), 2);
	assert_eq!(client.refresh_coordinator().metrics().exchanges(), 2);
	assert!(!client.refresh_coordinator().is_refreshing());
}

#[tokio::test]
async fn transport_timeouts_map_to_timeout_errors() {
	let store = Arc::new(MemoryStore::default());
	let client = ApiClient::<StalledTransport>::with_transport(
		HttpConfig::default(),
		store,
		StalledTransport,
	);
	let err = client
		.get::<Value>(DATA_PATH, RequestOptions::default())
		.await
		.expect_err("The transport never answers.");

	assert!(matches!(err, paydash::error::Error::Timeout));
	assert_eq!(err.user_message("Something went wrong."), "Request timeout.");
}

#[tokio::test]
async fn config_updates_apply_to_later_calls() {
	let (client, transport, store) = scripted_client(StdDuration::ZERO);

	seed_tokens(&store, &transport.fresh_access, "refresh-1");
	client.set_header("X-Client", "paydash-tests");
	client.remove_header("Content-Type");

	client.get::<Value>(DATA_PATH, RequestOptions::default()).await.expect("Call should succeed.");

	let sent = transport.requests_to(DATA_PATH);

	assert_eq!(sent[0].headers.get("X-Client").map(String::as_str), Some("paydash-tests"));
	assert!(!sent[0].headers.contains_key("Content-Type"));
	assert_eq!(sent[0].timeout, HttpConfig::DEFAULT_TIMEOUT);
	assert!(client.set_base_url("not a url").is_err());
	assert_eq!(client.config().base_url, BASE_URL);

	client.reset_config();

	assert_eq!(client.config(), HttpConfig::default());
}

#[tokio::test]
async fn concurrent_unauthorized_responses_share_one_refresh() {
	let (client, transport, store) = scripted_client(StdDuration::from_millis(50));

	seed_tokens(&store, &live_token("revoked"), "refresh-1");

	let outcomes = future::join_all(
		(0..6).map(|_| client.get::<Value>(DATA_PATH, RequestOptions::default())),
	)
	.await;

	assert!(outcomes.iter().all(Result::is_ok));
	assert_eq!(transport.requests_to(REFRESH_PATH).len(), 1);

	let data = transport.requests_to(DATA_PATH);

	assert_eq!(data.len(), 12);
	assert_eq!(
		data.iter().filter(|r| r.bearer() == Some(transport.fresh_access.as_str())).count(),
		6
	);
	assert_eq!(client.refresh_coordinator().metrics().exchanges(), 1);
}

#[tokio::test]
async fn expiry_clears_refresh_token_even_when_access_removal_fails() {
	let store = Arc::new(PinnedAccessStore::default());
	let expiries = ExpiryCounter::default();
	let client = ApiClient::<RejectingTransport>::with_transport(
		HttpConfig::default(),
		store.clone(),
		RejectingTransport,
	)
	.with_session_listener(expiries.listener());
	let tokens = TokenStore::new(store.clone());

	tokens
		.set_tokens(&expired_token("stale"), &live_token("refresh"))
		.expect("Seeding tokens should succeed.");

	let err = client
		.get::<Value>(DATA_PATH, RequestOptions::default())
		.await
		.expect_err("A rejected refresh should expire the session.");

	assert!(matches!(
		err,
		Error::SessionExpired { reason: RefreshFailure::Rejected { status: 401 } }
	));
	assert_eq!(expiries.count(), 1);
	assert_eq!(tokens.refresh_token().expect("Reads should succeed."), None);
	assert!(!tokens.is_authenticated().expect("Reads should succeed."));
}
