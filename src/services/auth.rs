//! Credential login, the raw refresh call, and logout.
//!
//! [`ApiClient::login`] is the only place a session is created: when the server answers with
//! both an access and a refresh token, they are persisted together with the user profile.
//! Refresh during ordinary calls goes through [`ApiClient::refresh_session`]; the raw
//! [`ApiClient::refresh`] helper here performs a single exchange without touching storage.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	client::ApiClient,
	http::HttpTransport,
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::RequestOptions,
	session::{User, UserRole},
};

/// Credentials posted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Login email.
	pub email: String,
	/// Plain-text password.
	pub password: String,
}
impl LoginRequest {
	/// Creates a request body.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Login endpoint payload; every field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	/// Email echoed by the server.
	#[serde(default)]
	pub email: Option<String>,
	/// Role label, e.g. `cs` or `operation`.
	#[serde(default)]
	pub role: Option<String>,
	/// Access token.
	#[serde(default)]
	pub token: Option<TokenSecret>,
	/// Refresh token.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
}
impl LoginResponse {
	/// Profile derived from the response; missing email is empty and unknown roles map to `cs`.
	pub fn user(&self) -> User {
		User {
			email: self.email.clone().unwrap_or_default(),
			role: UserRole::from_label(self.role.as_deref()),
		}
	}

	/// Both tokens, when the server issued a non-empty pair.
	pub fn token_pair(&self) -> Option<TokenPair> {
		let access = non_empty(self.token.as_ref())?;
		let refresh = non_empty(self.refresh_token.as_ref())?;

		Some(TokenPair::new(access, refresh))
	}
}

/// Body posted to the refresh endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
	/// Current refresh token.
	pub refresh_token: TokenSecret,
}

/// Refresh endpoint payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
	/// New access token.
	#[serde(default)]
	pub token: Option<TokenSecret>,
	/// Rotated refresh token, if the server rotates.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
}
impl RefreshTokenResponse {
	/// Pairs the new access token with the rotated refresh token, keeping `previous` when the
	/// server did not issue one. Returns `None` when no access token was issued.
	pub fn into_pair(self, previous: &TokenSecret) -> Option<TokenPair> {
		let access = non_empty(self.token.as_ref())?;
		let refresh = non_empty(self.refresh_token.as_ref()).unwrap_or(previous.expose());

		Some(TokenPair::new(access, refresh))
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Signs in and, when the server issues a token pair, persists it with the user profile.
	pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = LoginRequest::new(email, password);
				let response: LoginResponse =
					self.post(&self.endpoints().login, &request, RequestOptions::default()).await?;

				if let Some(pair) = response.token_pair() {
					self.session().set_auth(
						response.user(),
						pair.access.expose(),
						pair.refresh.expose(),
					)?;
				}

				Ok(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Performs one refresh exchange with `refresh_token` without persisting the result.
	pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResponse> {
		let request = RefreshTokenRequest { refresh_token: TokenSecret::new(refresh_token) };

		self.post(&self.endpoints().refresh, &request, RequestOptions::default()).await
	}

	/// Clears the stored tokens and profile.
	pub fn logout(&self) -> Result<()> {
		Ok(self.session().logout()?)
	}
}

fn non_empty(secret: Option<&TokenSecret>) -> Option<&str> {
	secret.map(TokenSecret::expose).filter(|value| !value.is_empty())
}
