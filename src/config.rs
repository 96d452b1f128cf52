//! Client settings, validation, and derived component configuration.

pub mod endpoint;

pub use endpoint::*;

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::ConfigError,
	http::TransportOptions,
	retry::RetryPolicy,
};

/// Settings accepted when building a client.
///
/// Every field except `url`, `identity`, and `secret` has a default, so a minimal JSON
/// document only needs those three keys.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
	/// Free-form label for the tenant/stack (used in logs only).
	pub name: String,
	/// Access key identity.
	pub identity: String,
	/// Access key secret.
	pub secret: String,
	/// API or console URL; normalized and classified by host suffix.
	pub url: String,
	/// Verify TLS certificates.
	pub verify: bool,
	/// Emit request and token diagnostics at `debug` level.
	pub debug: bool,
	/// `User-Agent` header sent with every request.
	pub user_agent: String,
	/// Overrides suffix-based plane classification.
	pub plane: Option<ApiPlane>,
	/// TCP/TLS connect timeout in seconds.
	pub connect_timeout_secs: u64,
	/// Whole-request timeout in seconds.
	pub timeout_secs: u64,
	/// Backoff schedule in seconds; its length is the number of retried attempts.
	pub retry_waits_secs: Vec<u64>,
	/// Lifetime assigned to each login/extend token, in seconds.
	pub token_lifetime_secs: i64,
}
impl ClientSettings {
	/// Default `User-Agent` value.
	pub const DEFAULT_USER_AGENT: &'static str =
		concat!("PrismaCloudAPI/", env!("CARGO_PKG_VERSION"));
	/// Default token lifetime, slightly below the server-side ten minutes.
	pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 590;

	/// Creates settings for the given URL and access key pair.
	pub fn new(
		url: impl Into<String>,
		identity: impl Into<String>,
		secret: impl Into<String>,
	) -> Self {
		Self {
			url: url.into(),
			identity: identity.into(),
			secret: secret.into(),
			..Default::default()
		}
	}

	/// Parses settings from a JSON document, reporting the failing field path.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(de).map_err(|source| ConfigError::Settings { source })
	}

	/// Sets the tenant label.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}

	/// Toggles TLS certificate verification.
	pub fn with_verify(mut self, verify: bool) -> Self {
		self.verify = verify;

		self
	}

	/// Toggles debug diagnostics.
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Forces the configured URL onto a plane regardless of its suffix.
	pub fn with_plane(mut self, plane: ApiPlane) -> Self {
		self.plane = Some(plane);

		self
	}

	/// Replaces the backoff schedule.
	pub fn with_retry_waits_secs(mut self, waits: impl IntoIterator<Item = u64>) -> Self {
		self.retry_waits_secs = waits.into_iter().collect();

		self
	}

	/// Overrides the token lifetime.
	pub fn with_token_lifetime_secs(mut self, secs: i64) -> Self {
		self.token_lifetime_secs = secs;

		self
	}

	/// Validated access key pair.
	pub fn credentials(&self) -> Result<Credentials, ConfigError> {
		Credentials::new(self.identity.clone(), self.secret.clone())
	}

	/// Normalized plane addresses.
	pub fn endpoints(&self) -> Result<ApiEndpoints, ConfigError> {
		ApiEndpoints::resolve(&self.url, self.plane)
	}

	/// Retry schedule derived from `retry_waits_secs`.
	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::from_secs(self.retry_waits_secs.iter().copied())
	}

	/// Transport knobs derived from the timeouts and `verify`.
	pub fn transport_options(&self) -> TransportOptions {
		TransportOptions {
			timeout: StdDuration::from_secs(self.timeout_secs),
			connect_timeout: StdDuration::from_secs(self.connect_timeout_secs),
			verify: self.verify,
		}
	}

	/// Validated token lifetime.
	pub fn token_lifetime(&self) -> Result<Duration, ConfigError> {
		if self.token_lifetime_secs <= 0 {
			return Err(ConfigError::NonPositiveTokenLifetime);
		}

		Ok(Duration::seconds(self.token_lifetime_secs))
	}
}
impl Default for ClientSettings {
	fn default() -> Self {
		Self {
			name: String::new(),
			identity: String::new(),
			secret: String::new(),
			url: String::new(),
			verify: true,
			debug: false,
			user_agent: Self::DEFAULT_USER_AGENT.into(),
			plane: None,
			connect_timeout_secs: 16,
			timeout_secs: 300,
			retry_waits_secs: RetryPolicy::DEFAULT_WAITS_SECS.to_vec(),
			token_lifetime_secs: Self::DEFAULT_TOKEN_LIFETIME_SECS,
		}
	}
}
impl Debug for ClientSettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientSettings")
			.field("name", &self.name)
			.field("identity", &self.identity)
			.field("secret_set", &!self.secret.is_empty())
			.field("url", &self.url)
			.field("verify", &self.verify)
			.field("debug", &self.debug)
			.field("user_agent", &self.user_agent)
			.field("plane", &self.plane)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn minimal_json_fills_defaults() {
		let settings = ClientSettings::from_json(
			r#"{"url":"app.prismacloud.io","identity":"key","secret":"shh"}"#,
		)
		.expect("Minimal settings should parse.");

		assert!(settings.verify);
		assert!(!settings.debug);
		assert_eq!(settings.user_agent, ClientSettings::DEFAULT_USER_AGENT);
		assert_eq!(settings.retry_policy(), RetryPolicy::default());
		assert_eq!(
			settings.token_lifetime().expect("Default lifetime is valid."),
			Duration::seconds(590)
		);
		assert_eq!(settings.transport_options(), TransportOptions::default());
		assert!(settings.endpoints().expect("URL should resolve.").control.is_some());
	}

	#[test]
	fn malformed_json_reports_field_path() {
		let err = ClientSettings::from_json(r#"{"url":"x","verify":"yes"}"#)
			.expect_err("A string verify flag must be rejected.");

		match err {
			ConfigError::Settings { source } => assert_eq!(source.path().to_string(), "verify"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn validation_rejects_blank_credentials_and_lifetimes() {
		let settings = ClientSettings::new("api.prismacloud.io", "", "secret");

		assert!(matches!(settings.credentials(), Err(ConfigError::MissingCredentials)));
		assert!(matches!(
			settings.with_token_lifetime_secs(0).token_lifetime(),
			Err(ConfigError::NonPositiveTokenLifetime)
		));
	}

	#[test]
	fn debug_output_hides_secret() {
		let settings = ClientSettings::new("api.prismacloud.io", "key", "top-secret");

		assert!(!format!("{settings:?}").contains("top-secret"));
	}
}
