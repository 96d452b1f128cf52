//! Access-key credentials supplied once at configuration time.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Access key identity + secret used by the login call.
///
/// Credentials are immutable for the lifetime of a client; the secret never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	identity: String,
	secret: TokenSecret,
}
impl Credentials {
	/// Builds credentials, rejecting blank identities or secrets.
	pub fn new(
		identity: impl Into<String>,
		secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let identity = identity.into();
		let secret = TokenSecret::new(secret);

		if identity.trim().is_empty() || secret.is_blank() {
			return Err(ConfigError::MissingCredentials);
		}

		Ok(Self { identity, secret })
	}

	/// Access key identity (sent as `username`).
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// Access key secret (sent as `password`).
	pub fn secret(&self) -> &TokenSecret {
		&self.secret
	}

	/// JSON payload posted to the login endpoint.
	pub(crate) fn login_body(&self) -> Value {
		serde_json::json!({ "username": self.identity, "password": self.secret.expose() })
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("identity", &self.identity)
			.field("secret", &self.secret)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn blank_credentials_are_rejected() {
		assert!(matches!(Credentials::new("", "secret"), Err(ConfigError::MissingCredentials)));
		assert!(matches!(Credentials::new("  ", "secret"), Err(ConfigError::MissingCredentials)));
		assert!(matches!(Credentials::new("key", ""), Err(ConfigError::MissingCredentials)));
	}

	#[test]
	fn login_body_uses_username_and_password_fields() {
		let credentials = Credentials::new("access-key", "secret-key")
			.expect("Credentials fixture should be valid.");
		let body = credentials.login_body();

		assert_eq!(body, serde_json::json!({ "username": "access-key", "password": "secret-key" }));
	}

	#[test]
	fn debug_redacts_secret() {
		let credentials = Credentials::new("access-key", "secret-key")
			.expect("Credentials fixture should be valid.");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("access-key"));
		assert!(!rendered.contains("secret-key"));
	}
}
