//! Persisted user profile tied to the stored token pair.

// self
use crate::{
	_prelude::*,
	auth::TokenStore,
	store::{KeyValueStore, StoreError},
};

/// Storage key of the persisted profile.
pub const USER_SESSION_KEY: &str = "user-storage";

const SESSION_FORMAT_VERSION: u32 = 0;

/// Dashboard role of a signed-in user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
	/// Customer support.
	#[default]
	Cs,
	/// Operations.
	Operation,
}
impl UserRole {
	/// Returns the wire spelling.
	pub const fn as_str(self) -> &'static str {
		match self {
			UserRole::Cs => "cs",
			UserRole::Operation => "operation",
		}
	}

	/// Maps a server-supplied label; anything unrecognized is treated as [`UserRole::Cs`].
	pub fn from_label(label: Option<&str>) -> Self {
		match label {
			Some("operation") => UserRole::Operation,
			_ => UserRole::Cs,
		}
	}
}
impl Display for UserRole {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Signed-in user profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Login email.
	pub email: String,
	/// Dashboard role.
	pub role: UserRole,
}

/// Persisted authentication state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
	/// Current profile, if signed in.
	pub user: Option<User>,
	/// Whether the profile was stored by a successful login.
	pub is_authenticated: bool,
}

#[derive(Serialize, Deserialize)]
struct PersistedSession {
	state: UserSession,
	version: u32,
}

/// Reads and writes the persisted profile alongside the token pair.
#[derive(Clone)]
pub struct SessionStore {
	storage: Arc<dyn KeyValueStore>,
	tokens: TokenStore,
}
impl SessionStore {
	/// Wraps a storage backend shared with the token store.
	pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
		Self { tokens: TokenStore::new(storage.clone()), storage }
	}

	/// Token store backed by the same storage.
	pub fn tokens(&self) -> &TokenStore {
		&self.tokens
	}

	/// Current persisted state; a missing entry yields the signed-out default.
	pub fn current(&self) -> Result<UserSession, StoreError> {
		let Some(raw) = self.storage.get(USER_SESSION_KEY)? else {
			return Ok(UserSession::default());
		};
		let persisted: PersistedSession =
			serde_json::from_str(&raw).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse persisted session: {e}"),
			})?;

		Ok(persisted.state)
	}

	/// Stores `user` and marks the session authenticated.
	pub fn set_user(&self, user: User) -> Result<(), StoreError> {
		self.write(UserSession { user: Some(user), is_authenticated: true })
	}

	/// Stores the token pair and the profile of a fresh login.
	pub fn set_auth(&self, user: User, access: &str, refresh: &str) -> Result<(), StoreError> {
		self.tokens.set_tokens(access, refresh)?;
		self.set_user(user)
	}

	/// Clears tokens and profile.
	pub fn logout(&self) -> Result<(), StoreError> {
		self.tokens.clear_tokens()?;
		self.clear_user()
	}

	/// Clears the profile, leaving tokens untouched.
	pub fn clear_user(&self) -> Result<(), StoreError> {
		self.write(UserSession::default())
	}

	fn write(&self, state: UserSession) -> Result<(), StoreError> {
		let persisted = PersistedSession { state, version: SESSION_FORMAT_VERSION };
		let raw = serde_json::to_string(&persisted).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize session: {e}"),
		})?;

		self.storage.set(USER_SESSION_KEY, &raw)
	}
}
impl Debug for SessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStore").field("tokens", &self.tokens).finish_non_exhaustive()
	}
}
