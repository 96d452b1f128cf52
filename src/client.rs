//! Client facade composed from the session, retry, and transport capabilities.

pub mod execute;
pub mod meta;
pub mod paginate;

pub use execute::*;
pub use paginate::*;

// self
use crate::{
	_prelude::*,
	config::{ApiBase, ClientSettings},
	error::ConfigError,
	http::ApiHttpClient,
	obs::ErrorCounter,
	retry::RetryPolicy,
	session::{Clock, SessionManager, SystemClock},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = Client<ReqwestHttpClient>;

/// Single entry point for authenticated API calls.
///
/// The client holds its collaborators instead of inheriting behavior from them: the
/// [`SessionManager`] owns the token, the [`RetryPolicy`] owns the backoff schedule, and
/// the transport performs single requests. Cloning is cheap and every clone shares the
/// same session, so one instance can serve many concurrent tasks.
pub struct Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Backoff schedule applied to every request.
	pub retry: Arc<RetryPolicy>,
	/// Session that owns the bearer token.
	pub session: Arc<SessionManager<C>>,
	/// Error counter shared by every error-reporting path.
	pub errors: Arc<ErrorCounter>,
	name: String,
	user_agent: String,
	debug: bool,
	control: Option<ApiBase>,
	compute: Arc<RwLock<Option<ApiBase>>>,
}
impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Builds a client around a caller-provided transport.
	pub fn with_http_client(
		settings: &ClientSettings,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		Self::with_http_client_and_clock(settings, http_client, Arc::new(SystemClock))
	}

	/// Builds a client around a caller-provided transport and clock.
	pub fn with_http_client_and_clock(
		settings: &ClientSettings,
		http_client: impl Into<Arc<C>>,
		clock: Arc<dyn Clock>,
	) -> Result<Self> {
		let credentials = settings.credentials()?;
		let endpoints = settings.endpoints()?;
		let control = endpoints.control.ok_or(ConfigError::MissingControlPlane)?;
		let http_client = http_client.into();
		let retry = Arc::new(settings.retry_policy());
		let errors = Arc::new(ErrorCounter::default());
		let session = SessionManager::new(
			http_client.clone(),
			retry.clone(),
			errors.clone(),
			credentials,
			&control,
		)?
		.with_user_agent(settings.user_agent.as_str())
		.with_token_lifetime(settings.token_lifetime()?)?
		.with_clock(clock)
		.with_debug(settings.debug);

		if settings.debug {
			tracing::debug!(name = %settings.name, base = %control, "API client configured.");
		}

		Ok(Self {
			http_client,
			retry,
			session: Arc::new(session),
			errors,
			name: settings.name.clone(),
			user_agent: settings.user_agent.clone(),
			debug: settings.debug,
			control: Some(control),
			compute: Arc::new(RwLock::new(endpoints.compute)),
		})
	}

	/// Tenant label from the settings.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Control-plane base address.
	pub fn control_base(&self) -> Result<&ApiBase, ConfigError> {
		self.control.as_ref().ok_or(ConfigError::MissingControlPlane)
	}

	/// Compute-plane base address, when configured or discovered.
	pub fn compute_base(&self) -> Option<ApiBase> {
		self.compute.read().clone()
	}

	/// Returns `true` when a non-expired token is available.
	pub fn has_valid_token(&self) -> bool {
		self.session.has_valid_token()
	}

	/// Number of errors recorded since the client was built.
	pub fn error_count(&self) -> u64 {
		self.errors.count()
	}

	/// End-of-run summary, `None` when nothing failed.
	pub fn error_report(&self) -> Option<String> {
		self.errors.report()
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Builds a client with its own reqwest transport configured from `settings`.
	pub fn new(settings: &ClientSettings) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_options(settings.transport_options())?;

		Self::with_http_client(settings, http_client)
	}

	/// Builds a client and discovers the compute-plane address through `meta_info`.
	pub async fn connect(settings: &ClientSettings) -> Result<Self> {
		let client = Self::new(settings)?;

		client.discover_compute_endpoint().await?;

		Ok(client)
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			retry: self.retry.clone(),
			session: self.session.clone(),
			errors: self.errors.clone(),
			name: self.name.clone(),
			user_agent: self.user_agent.clone(),
			debug: self.debug,
			control: self.control.clone(),
			compute: self.compute.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("name", &self.name)
			.field("control", &self.control)
			.field("compute", &*self.compute.read())
			.field("session", &self.session)
			.field("errors", &self.errors.count())
			.finish()
	}
}
