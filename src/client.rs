//! Authenticated request executor.
//!
//! [`ApiClient`] owns everything a call needs: the transport, the live [`HttpConfig`], the
//! session and token stores, and the [`RefreshCoordinator`]. Each call:
//!
//! 1. resolves `base_url + path + query` and merges default and per-call headers;
//! 2. attaches `Authorization: Bearer <access token>` unless the path is the login or refresh
//!    endpoint;
//! 3. refreshes first when the stored access token is already expired, failing with
//!    [`Error::SessionExpired`] (without touching the network) if that refresh fails;
//! 4. sends with the per-call timeout, surfacing expiry as [`Error::Timeout`];
//! 5. on a 401 from a call that has not refreshed yet, refreshes (joining any exchange already in
//!    flight) and retries exactly once with the new token;
//! 6. parses the body and turns non-2xx statuses into [`HttpError`].
//!
//! Service helpers (`login`, `list_payments`, ...) are implemented on the client in
//! [`crate::services`].

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret, TokenStore, claims},
	config::{AuthEndpoints, HttpConfig},
	error::{ConfigError, HttpError, RefreshFailure},
	http::{HttpResponse, HttpTransport, ResponseBody},
	obs::{self, CallKind, CallOutcome, CallSpan},
	refresh::{RefreshCoordinator, RefreshOutcome},
	request::{self, Method, RequestDescriptor, RequestOptions},
	services::auth::RefreshTokenResponse,
	session::SessionStore,
	store::KeyValueStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Receives the session-expired side effect, e.g. to route the user back to the login screen.
pub trait SessionListener
where
	Self: Send + Sync,
{
	/// Called after stored tokens were cleared because no fresh token could be obtained.
	fn session_expired(&self, reason: &RefreshFailure);
}
impl<F> SessionListener for F
where
	F: Fn(&RefreshFailure) + Send + Sync,
{
	fn session_expired(&self, reason: &RefreshFailure) {
		self(reason)
	}
}

/// Executes dashboard API calls with bearer authentication and single-flight token refresh.
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	config: Arc<RwLock<HttpConfig>>,
	session: SessionStore,
	coordinator: Arc<RefreshCoordinator>,
	endpoints: AuthEndpoints,
	session_listener: Option<Arc<dyn SessionListener>>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client over the caller-provided transport and storage.
	pub fn with_transport(
		config: HttpConfig,
		storage: Arc<dyn KeyValueStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			config: Arc::new(RwLock::new(config)),
			session: SessionStore::new(storage),
			coordinator: Default::default(),
			endpoints: AuthEndpoints::default(),
			session_listener: None,
		}
	}

	/// Overrides the login/refresh endpoint paths.
	pub fn with_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Registers the session-expired side effect.
	pub fn with_session_listener(mut self, listener: impl 'static + SessionListener) -> Self {
		self.session_listener = Some(Arc::new(listener));

		self
	}

	/// Login/refresh endpoint paths.
	pub fn endpoints(&self) -> &AuthEndpoints {
		&self.endpoints
	}

	/// Persisted user profile.
	pub fn session(&self) -> &SessionStore {
		&self.session
	}

	/// Persisted token pair.
	pub fn tokens(&self) -> &TokenStore {
		self.session.tokens()
	}

	/// Coordinator shared by every clone of this client.
	pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
		&self.coordinator
	}

	/// Snapshot of the live configuration.
	pub fn config(&self) -> HttpConfig {
		self.config.read().clone()
	}

	/// Replaces the base URL for subsequent calls.
	pub fn set_base_url(&self, base_url: &str) -> Result<(), ConfigError> {
		let normalized = HttpConfig::normalize_base_url(base_url)?;

		self.config.write().base_url = normalized;

		Ok(())
	}

	/// Adds or overrides a default header for subsequent calls.
	pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
		self.config.write().default_headers.insert(name.into(), value.into());
	}

	/// Removes a default header for subsequent calls.
	pub fn remove_header(&self, name: &str) {
		self.config.write().default_headers.remove(name);
	}

	/// Restores the default configuration.
	pub fn reset_config(&self) {
		*self.config.write() = HttpConfig::default();
	}

	/// `GET path`, decoding the body into `R`.
	pub async fn get<R>(&self, path: &str, options: RequestOptions) -> Result<R>
	where
		R: DeserializeOwned,
	{
		decode_body(self.execute(Method::Get, path, None, options).await?)
	}

	/// `POST path` with a JSON body, decoding the response into `R`.
	pub async fn post<B, R>(&self, path: &str, body: &B, options: RequestOptions) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = encode_body(body)?;

		decode_body(self.execute(Method::Post, path, Some(body), options).await?)
	}

	/// `PUT path` with a JSON body, decoding the response into `R`.
	pub async fn put<B, R>(&self, path: &str, body: &B, options: RequestOptions) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = encode_body(body)?;

		decode_body(self.execute(Method::Put, path, Some(body), options).await?)
	}

	/// `PATCH path` with a JSON body, decoding the response into `R`.
	pub async fn patch<B, R>(&self, path: &str, body: &B, options: RequestOptions) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = encode_body(body)?;

		decode_body(self.execute(Method::Patch, path, Some(body), options).await?)
	}

	/// `DELETE path`, decoding the body into `R`.
	pub async fn delete<R>(&self, path: &str, options: RequestOptions) -> Result<R>
	where
		R: DeserializeOwned,
	{
		decode_body(self.execute(Method::Delete, path, None, options).await?)
	}

	/// Performs one logical call and returns the parsed body of a 2xx response.
	pub async fn execute(
		&self,
		method: Method,
		path: &str,
		body: Option<String>,
		options: RequestOptions,
	) -> Result<ResponseBody> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, method.as_str());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.execute_authenticated(method, path, body, options)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Obtains a fresh access token, joining an exchange already in flight.
	///
	/// A failed exchange clears the stored tokens and fires the session listener once, after
	/// which every caller that needed it receives [`Error::SessionExpired`]. A caller whose
	/// exchange was abandoned by a dropped leader starts one more exchange of its own.
	pub async fn refresh_session(&self) -> Result<TokenSecret> {
		let outcome = match self.coordinator.run(|| self.exchange_refresh_token()).await {
			Err(RefreshFailure::Interrupted) =>
				self.coordinator.run(|| self.exchange_refresh_token()).await,
			outcome => outcome,
		};

		outcome.map_err(|reason| Error::SessionExpired { reason })
	}

	async fn execute_authenticated(
		&self,
		method: Method,
		path: &str,
		body: Option<String>,
		options: RequestOptions,
	) -> Result<ResponseBody> {
		let descriptor = self.describe(method, path, body, options);

		if self.endpoints.is_auth_path(path) {
			return settle(self.dispatch(&descriptor, None).await?);
		}

		let mut token = self.tokens().access_token()?;
		let mut renewed = false;

		if token.as_ref().is_some_and(|token| claims::is_token_expired(token.expose())) {
			token = Some(self.refresh_session().await?);
			renewed = true;
		}

		let response = self.dispatch(&descriptor, token.as_ref()).await?;

		if response.status == HttpResponse::UNAUTHORIZED && !renewed {
			let fresh = self.refresh_session().await?;

			return settle(self.dispatch(&descriptor, Some(&fresh)).await?);
		}

		settle(response)
	}

	fn describe(
		&self,
		method: Method,
		path: &str,
		body: Option<String>,
		options: RequestOptions,
	) -> RequestDescriptor {
		let config = self.config.read();
		let mut headers = config.default_headers.clone();

		headers.extend(options.headers);

		RequestDescriptor {
			method,
			url: request::build_url(&config.base_url, path, &options.params),
			headers,
			body,
			timeout: options.timeout.unwrap_or(config.timeout),
		}
	}

	async fn dispatch(
		&self,
		descriptor: &RequestDescriptor,
		token: Option<&TokenSecret>,
	) -> Result<HttpResponse> {
		let outgoing = match token {
			Some(token) => descriptor.with_bearer(token.expose()),
			None => descriptor.clone(),
		};

		Ok(self.transport.send(outgoing).await?)
	}

	async fn exchange_refresh_token(&self) -> RefreshOutcome {
		let outcome = match self.request_token_pair().await {
			Ok(pair) => self
				.tokens()
				.store_pair(&pair)
				.map(|_| pair.access)
				.map_err(|e| RefreshFailure::Storage { message: e.to_string() }),
			Err(failure) => Err(failure),
		};

		if let Err(reason) = &outcome {
			self.expire_session(reason);
		}

		outcome
	}

	async fn request_token_pair(&self) -> Result<TokenPair, RefreshFailure> {
		let previous = self
			.tokens()
			.refresh_token()
			.map_err(|e| RefreshFailure::Storage { message: e.to_string() })?
			.ok_or(RefreshFailure::MissingRefreshToken)?;
		let body = serde_json::json!({ "refreshToken": previous.expose() }).to_string();
		let descriptor =
			self.describe(Method::Post, &self.endpoints.refresh, Some(body), Default::default());
		let response = self
			.transport
			.send(descriptor)
			.await
			.map_err(|e| RefreshFailure::Transport { message: e.to_string() })?;

		if !response.is_success() {
			return Err(RefreshFailure::Rejected { status: response.status });
		}

		let payload: RefreshTokenResponse = serde_json::from_slice(&response.body)
			.map_err(|e| RefreshFailure::MalformedResponse { message: e.to_string() })?;

		payload.into_pair(&previous).ok_or_else(|| RefreshFailure::MalformedResponse {
			message: "response carries no access token".into(),
		})
	}

	fn expire_session(&self, reason: &RefreshFailure) {
		if let Err(e) = self.tokens().clear_tokens() {
			obs::record_token_clear_failed(&e);
		}

		obs::record_session_expired(reason);

		if let Some(listener) = &self.session_listener {
			listener.session_expired(reason);
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(config: HttpConfig, storage: Arc<dyn KeyValueStore>) -> Self {
		Self::with_transport(config, storage, ReqwestTransport::default())
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			session: self.session.clone(),
			coordinator: self.coordinator.clone(),
			endpoints: self.endpoints.clone(),
			session_listener: self.session_listener.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &*self.config.read())
			.field("endpoints", &self.endpoints)
			.field("refreshing", &self.coordinator.is_refreshing())
			.field("session_listener_set", &self.session_listener.is_some())
			.finish()
	}
}

fn settle(response: HttpResponse) -> Result<ResponseBody> {
	let body = response.parse_body();

	if response.is_success() {
		Ok(body)
	} else {
		Err(HttpError::new(response.status, response.status_text, body).into())
	}
}

fn encode_body<B>(body: &B) -> Result<String>
where
	B: ?Sized + Serialize,
{
	serde_json::to_string(body).map_err(|e| ConfigError::from(e).into())
}

fn decode_body<R>(body: ResponseBody) -> Result<R>
where
	R: DeserializeOwned,
{
	serde_path_to_error::deserialize(body.into_value()).map_err(|source| Error::Decode { source })
}
