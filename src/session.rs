//! Session management: login, token extension, and coalesced renewal.
//!
//! [`SessionManager::ensure_valid_token`] is called before every data request. A valid
//! token is returned straight from the [`TokenStore`]. Otherwise the caller takes the
//! renewal guard, re-reads the store, and only then decides between `POST /login` (no
//! token yet) and `GET /auth_token/extend` (token expired). Callers that queued on the
//! guard observe the token installed by the first one, so a burst of concurrent callers
//! produces a single renewal call per expiry window. The store lock is only taken for the
//! snapshot and the commit, never across the network call.

pub mod clock;

mod metrics;

pub use clock::*;
pub use metrics::SessionMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Token, TokenResponse, TokenSecret},
	config::ApiBase,
	error::{ConfigError, DecodeError},
	http::{
		APPLICATION_JSON, AUTH_HEADER, ApiHttpClient, ApiRequest, CONTENT_TYPE, Method, USER_AGENT,
	},
	obs::{self, CallKind, CallOutcome, CallSpan, ErrorCounter},
	retry::RetryPolicy,
	store::{TokenState, TokenStore},
};

/// Login endpoint path.
pub const LOGIN_PATH: &str = "login";
/// Token extension endpoint path.
pub const EXTEND_PATH: &str = "auth_token/extend";

/// Owns the token store and performs login/extend calls through the retry policy.
pub struct SessionManager<C>
where
	C: ?Sized + ApiHttpClient,
{
	http_client: Arc<C>,
	retry: Arc<RetryPolicy>,
	errors: Arc<ErrorCounter>,
	credentials: Credentials,
	login_url: Url,
	extend_url: Url,
	user_agent: String,
	token_lifetime: Duration,
	clock: Arc<dyn Clock>,
	debug: bool,
	store: TokenStore,
	renewal: AsyncMutex<()>,
	metrics: SessionMetrics,
}
impl<C> SessionManager<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Default token lifetime (590 seconds).
	pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::seconds(590);

	/// Creates a session that authenticates against the control-plane `base`.
	pub fn new(
		http_client: impl Into<Arc<C>>,
		retry: Arc<RetryPolicy>,
		errors: Arc<ErrorCounter>,
		credentials: Credentials,
		base: &ApiBase,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			http_client: http_client.into(),
			retry,
			errors,
			credentials,
			login_url: base.join(LOGIN_PATH)?,
			extend_url: base.join(EXTEND_PATH)?,
			user_agent: crate::config::ClientSettings::DEFAULT_USER_AGENT.into(),
			token_lifetime: Self::DEFAULT_TOKEN_LIFETIME,
			clock: Arc::new(SystemClock),
			debug: false,
			store: TokenStore::default(),
			renewal: AsyncMutex::new(()),
			metrics: SessionMetrics::default(),
		})
	}

	/// Overrides the `User-Agent` header sent with login/extend calls.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Overrides the lifetime assigned to freshly issued tokens.
	pub fn with_token_lifetime(mut self, lifetime: Duration) -> Result<Self, ConfigError> {
		if !lifetime.is_positive() {
			return Err(ConfigError::NonPositiveTokenLifetime);
		}

		self.token_lifetime = lifetime;

		Ok(self)
	}

	/// Replaces the clock used for expiry checks.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Toggles debug diagnostics.
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Returns a usable token, logging in or extending first when needed.
	pub async fn ensure_valid_token(&self) -> Result<TokenSecret> {
		if let TokenState::Valid(token) = self.store.state_at(self.clock.now()) {
			return Ok(token);
		}

		let _renewal = self.renewal.lock().await;

		match self.store.state_at(self.clock.now()) {
			TokenState::Valid(token) => Ok(token),
			TokenState::Missing => self.login_locked().await,
			TokenState::Expired(current) => self.extend_locked(&current).await,
		}
	}

	/// Performs a fresh login regardless of the current token.
	pub async fn login(&self) -> Result<TokenSecret> {
		let _renewal = self.renewal.lock().await;

		self.login_locked().await
	}

	/// Extends the current token, logging in instead when none exists.
	pub async fn extend(&self) -> Result<TokenSecret> {
		let _renewal = self.renewal.lock().await;

		match self.store.state_at(self.clock.now()) {
			TokenState::Missing => self.login_locked().await,
			TokenState::Valid(current) | TokenState::Expired(current) =>
				self.extend_locked(&current).await,
		}
	}

	/// Returns `true` when a non-expired token is available.
	pub fn has_valid_token(&self) -> bool {
		self.store.state_at(self.clock.now()).valid().is_some()
	}

	/// Snapshot of the token store at the current instant.
	pub fn token_state(&self) -> TokenState {
		self.store.state_at(self.clock.now())
	}

	/// Expiry instant of the current token, if any.
	pub fn token_expires_at(&self) -> Option<OffsetDateTime> {
		self.store.expires_at()
	}

	/// Drops the current token so the next call logs in again.
	pub fn invalidate(&self) {
		self.store.clear();
	}

	/// Login/extend counters.
	pub fn metrics(&self) -> &SessionMetrics {
		&self.metrics
	}

	async fn login_locked(&self) -> Result<TokenSecret> {
		const KIND: CallKind = CallKind::Login;

		self.metrics.record_login();

		let request = ApiRequest::new(Method::Post, self.login_url.clone())
			.header(CONTENT_TYPE, APPLICATION_JSON)
			.header(USER_AGENT, self.user_agent.as_str())
			.json(&self.credentials.login_body());

		CallSpan::new(KIND, "login").instrument(self.exchange(KIND, request)).await
	}

	async fn extend_locked(&self, current: &TokenSecret) -> Result<TokenSecret> {
		const KIND: CallKind = CallKind::Extend;

		self.metrics.record_extension();

		let request = ApiRequest::new(Method::Get, self.extend_url.clone())
			.header(CONTENT_TYPE, APPLICATION_JSON)
			.header(USER_AGENT, self.user_agent.as_str())
			.header(AUTH_HEADER, current.expose());

		CallSpan::new(KIND, "extend").instrument(self.exchange(KIND, request)).await
	}

	async fn exchange(&self, kind: CallKind, request: ApiRequest) -> Result<TokenSecret> {
		let response = match self
			.retry
			.perform(self.http_client.as_ref(), &request, kind, &self.errors)
			.await
		{
			Ok(response) => response,
			Err(Error::Transport(source)) => {
				let err = Error::AuthenticationTransport { operation: kind, source };

				return Err(self.fail(kind, err));
			},
			Err(err) => return Err(self.fail(kind, err)),
		};

		if !response.is_success() {
			let body = response.text_lossy();

			self.errors.record(
				kind,
				format_args!(
					"API ({}) responded with an error: status {}: {body}",
					request.url, response.status
				),
			);

			return Err(self.fail(
				kind,
				Error::Authentication { operation: kind, status: response.status, body },
			));
		}

		let token = match parse_token(&response.body) {
			Ok(token) => token,
			Err(err) => {
				self.errors.record(kind, format_args!("Token response is unusable: {err}"));

				return Err(self.fail(kind, err.into()));
			},
		};
		let now = self.clock.now();
		let issued = Token::issue(token.clone(), now, self.token_lifetime);
		let expires_at = issued.expires_at;

		self.store.install(issued);
		obs::record_call_outcome(kind, CallOutcome::Success);

		if self.debug {
			tracing::debug!(call = kind.as_str(), %expires_at, "API token installed.");
		}

		Ok(token)
	}

	fn fail(&self, kind: CallKind, err: Error) -> Error {
		if let Error::AuthenticationTransport { source, .. } = &err {
			self.errors.record(kind, source);
		}

		self.metrics.record_failure();
		obs::record_call_outcome(kind, CallOutcome::Failure);

		err
	}
}
impl<C> Debug for SessionManager<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionManager")
			.field("identity", &self.credentials.identity())
			.field("login_url", &self.login_url.as_str())
			.field("token_lifetime", &self.token_lifetime)
			.field("token_expires_at", &self.store.expires_at())
			.finish()
	}
}

fn parse_token(body: &[u8]) -> Result<TokenSecret, DecodeError> {
	let de = &mut serde_json::Deserializer::from_slice(body);
	let response: TokenResponse = serde_path_to_error::deserialize(de)
		.map_err(|source| DecodeError::TokenResponse { source })?;

	if response.token.is_blank() {
		return Err(DecodeError::EmptyToken);
	}

	Ok(response.token)
}
