//! Client-level error types shared across the session, retry, and facade layers.

// self
use crate::{_prelude::*, obs::CallKind};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Every variant is terminal for the call that produced it. The caller decides whether a
/// failure should also stop the surrounding run; [`Error::status`] exposes the HTTP status
/// when one is known so an exit report can include it.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout) on the final attempt.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded or violated the paging protocol.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Login or token extension failed after every retry; no request can proceed.
	#[error("Authentication ({operation}) failed with status {status}: {body}.")]
	Authentication {
		/// Session operation that failed.
		operation: CallKind,
		/// HTTP status returned by the final attempt.
		status: u16,
		/// Response text returned by the final attempt.
		body: String,
	},
	/// Login or token extension could not reach the API on any attempt.
	#[error("Authentication ({operation}) could not reach the API.")]
	AuthenticationTransport {
		/// Session operation that failed.
		operation: CallKind,
		/// Network failure of the final attempt.
		#[source]
		source: TransportError,
	},
	/// Data call returned a failure status after every retry.
	#[error("API ({url}) responded with status {status}: {body}.")]
	Api {
		/// Request URL.
		url: String,
		/// HTTP status returned by the final attempt.
		status: u16,
		/// Response text returned by the final attempt.
		body: String,
	},
}
impl Error {
	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
			Self::Decode(DecodeError::Json { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the failure came from the login/extend path.
	pub fn is_authentication(&self) -> bool {
		matches!(self, Self::Authentication { .. } | Self::AuthenticationTransport { .. })
	}
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Settings document could not be parsed.
	#[error("Client settings are malformed.")]
	Settings {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Settings do not carry an API URL.
	#[error("Settings are missing the API URL.")]
	MissingUrl,
	/// Settings do not carry an identity and secret.
	#[error("Settings are missing the access key identity or secret.")]
	MissingCredentials,
	/// A URL could not be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The configured URL targets the compute plane only.
	#[error("No control-plane API URL is configured.")]
	MissingControlPlane,
	/// Token lifetime must be positive.
	#[error("The token lifetime must be positive.")]
	NonPositiveTokenLifetime,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
		Self::InvalidUrl { url: url.into(), source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

/// Body decoding and paging protocol failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body is not valid JSON.
	#[error("Response with status {status} is not valid JSON.")]
	Json {
		/// HTTP status of the response.
		status: u16,
		/// Parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// Login or extend response did not carry a usable token.
	#[error("Token response is malformed.")]
	TokenResponse {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Login or extend response carried an empty token.
	#[error("Token response carried an empty token.")]
	EmptyToken,
	/// Text response is not valid UTF-8.
	#[error("Text response is not valid UTF-8.")]
	Text {
		/// Conversion failure.
		#[source]
		source: std::string::FromUtf8Error,
	},
	/// Paginated response has no `items` key.
	#[error("Paginated response is missing the `items` array.")]
	MissingItems,
	/// Paginated response has an `items` key that is not an array.
	#[error("Paginated response carries a non-array `items` value.")]
	InvalidItems,
	/// Paginated response carries a continuation token that is not a string.
	#[error("Paginated response carries a non-string `nextPageToken`.")]
	InvalidPageToken,
	/// A page decoded to something other than JSON.
	#[error("Paginated response returned non-JSON content.")]
	UnexpectedContent,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_is_exposed_for_http_failures() {
		let err = Error::Api {
			url: "https://api.example.com/x".into(),
			status: 503,
			body: "busy".into(),
		};

		assert_eq!(err.status(), Some(503));
		assert!(err.to_string().contains("503"));
		assert!(err.to_string().contains("busy"));
		assert!(!err.is_authentication());

		let err = Error::Authentication {
			operation: CallKind::Login,
			status: 401,
			body: "denied".into(),
		};

		assert_eq!(err.status(), Some(401));
		assert!(err.is_authentication());
		assert!(err.to_string().contains("login"));
	}

	#[test]
	fn unreachable_session_endpoint_is_an_authentication_failure() {
		let source = TransportError::network(
			"https://api.example.com/auth_token/extend",
			std::io::Error::other("connection reset"),
		);
		let err = Error::AuthenticationTransport { operation: CallKind::Extend, source };

		assert!(err.is_authentication());
		assert_eq!(err.status(), None);
		assert!(err.to_string().contains("extend"));
		assert!(StdError::source(&err).is_some());
	}

	#[test]
	fn decode_errors_convert_and_keep_source() {
		let source = serde_json::from_str::<Value>("{oops").expect_err("Fixture must be invalid.");
		let err: Error = DecodeError::Json { status: 200, source }.into();

		assert!(matches!(err, Error::Decode(DecodeError::Json { status: 200, .. })));
		assert!(StdError::source(&err).is_some());
		assert_eq!(err.status(), Some(200));
		assert_eq!(Error::from(DecodeError::MissingItems).status(), None);
	}
}
