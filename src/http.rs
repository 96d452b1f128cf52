//! Transport primitives for API calls.
//!
//! The module exposes [`ApiHttpClient`] alongside the owned [`ApiRequest`] and
//! [`ApiResponse`] values so downstream crates can plug in custom HTTP stacks. A transport
//! performs exactly one request: it knows nothing about tokens, retries, or pagination.
//! HTTP failure statuses are ordinary responses; only network-level failures (DNS, TCP,
//! TLS, timeouts) are reported through [`ApiHttpClient::TransportError`].

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`ApiHttpClient::send`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Header carrying the bearer token on every authenticated request.
pub const AUTH_HEADER: &str = "x-redlock-auth";
/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `User-Agent` header name.
pub const USER_AGENT: &str = "User-Agent";
/// JSON media type used for request bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Abstraction over HTTP transports capable of executing one API request.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every task that holds a clone of the client, and the returned future must be `Send` so
/// callers can spawn `execute` onto a multi-threaded runtime.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Performs a single request.
	fn send(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// HTTP verbs used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the canonical verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Fully resolved request handed to a transport.
///
/// Requests are built per call and cloned for each retry attempt; they are never shared
/// between calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Query parameters appended to the URL.
	pub query: Vec<(String, String)>,
	/// Request headers.
	pub headers: BTreeMap<String, String>,
	/// Serialized request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request without headers, query, or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, query: Vec::new(), headers: BTreeMap::new(), body: None }
	}

	/// Sets a header, replacing any previous value with the same name.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Replaces the header map.
	pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
		self.headers = headers;

		self
	}

	/// Replaces the query parameters.
	pub fn query(mut self, query: Vec<(String, String)>) -> Self {
		self.query = query;

		self
	}

	/// Serializes a JSON body.
	pub fn json(mut self, body: &Value) -> Self {
		self.body = Some(body.to_string().into_bytes());

		self
	}

	/// Returns a header value by case-insensitive name.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Response captured by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw `Content-Type` header, if present.
	pub content_type: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, content_type: None, body: body.into() }
	}

	/// Sets the `Content-Type` header.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());

		self
	}

	/// Returns `true` when the status does not indicate failure (below 400).
	pub fn is_success(&self) -> bool {
		self.status < 400
	}

	/// Lowercased media type without parameters (`text/csv; charset=utf-8` → `text/csv`).
	pub fn media_type(&self) -> Option<String> {
		let raw = self.content_type.as_deref()?;
		let essence = raw.split(';').next().unwrap_or_default().trim();

		if essence.is_empty() { None } else { Some(essence.to_ascii_lowercase()) }
	}

	/// Lossy text rendering of the body for diagnostics.
	pub fn text_lossy(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Transport knobs derived from the client settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportOptions {
	/// Whole-request timeout.
	pub timeout: StdDuration,
	/// TCP/TLS connect timeout.
	pub connect_timeout: StdDuration,
	/// Verify TLS certificates.
	pub verify: bool,
}
impl Default for TransportOptions {
	fn default() -> Self {
		Self {
			timeout: StdDuration::from_secs(300),
			connect_timeout: StdDuration::from_secs(16),
			verify: true,
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the provided timeouts and TLS verification toggle.
	pub fn with_options(options: TransportOptions) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder()
			.timeout(options.timeout)
			.connect_timeout(options.connect_timeout);

		if !options.verify {
			tracing::warn!("TLS certificate verification is disabled for API requests.");

			builder =
				builder.danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn send(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, url, query, headers, body } = request;
			let mut builder = client.request(method.into(), url);

			if !query.is_empty() {
				builder = builder.query(&query);
			}
			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let content_type = response
				.headers()
				.get(reqwest::header::CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, content_type, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn success_means_below_400() {
		assert!(ApiResponse::new(200, "").is_success());
		assert!(ApiResponse::new(302, "").is_success());
		assert!(!ApiResponse::new(404, "").is_success());
		assert!(!ApiResponse::new(503, "").is_success());
	}

	#[test]
	fn media_type_strips_parameters_and_case() {
		let response = ApiResponse::new(200, "a,b").with_content_type("Text/CSV; charset=utf-8");

		assert_eq!(response.media_type().as_deref(), Some("text/csv"));
		assert_eq!(ApiResponse::new(200, "").media_type(), None);
		assert_eq!(ApiResponse::new(200, "").with_content_type(" ; x=y").media_type(), None);
	}

	#[test]
	fn request_builder_sets_json_body_and_headers() {
		let url = Url::parse("https://api.example.com/v2/alert")
			.expect("Request fixture URL should parse.");
		let request = ApiRequest::new(Method::Post, url)
			.header(CONTENT_TYPE, APPLICATION_JSON)
			.json(&serde_json::json!({ "pageToken": "A" }));

		assert_eq!(request.header_value("content-type"), Some(APPLICATION_JSON));
		assert_eq!(request.body.as_deref(), Some(br#"{"pageToken":"A"}"#.as_slice()));
		assert_eq!(request.method.to_string(), "POST");
	}
}
