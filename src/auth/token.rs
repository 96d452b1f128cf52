//! Bearer token model and lifecycle helpers.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Current lifecycle status for a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token reached its expiry instant and must be extended.
	Expired,
}

/// Bearer token issued by the login or extend endpoint.
#[derive(Clone)]
pub struct Token {
	/// Token value sent as `x-redlock-auth`; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the token was installed.
	pub issued_at: OffsetDateTime,
	/// Instant after which the token is treated as expired.
	pub expires_at: OffsetDateTime,
}
impl Token {
	/// Creates a token valid for `lifetime` starting at `now`.
	pub fn issue(value: TokenSecret, now: OffsetDateTime, lifetime: Duration) -> Self {
		Self { value, issued_at: now, expires_at: now + lifetime }
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant >= self.expires_at { TokenStatus::Expired } else { TokenStatus::Active }
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Body returned by the login and extend endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
	pub(crate) token: TokenSecret,
}
