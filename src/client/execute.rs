//! The `execute` entry point: request building, response classification, and error
//! policy for single-page calls.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::Client,
	error::DecodeError,
	http::{
		APPLICATION_JSON, AUTH_HEADER, ApiHttpClient, ApiRequest, ApiResponse, CONTENT_TYPE, Method,
		USER_AGENT,
	},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Media types returned verbatim as bytes.
pub const BINARY_MEDIA_TYPES: [&str; 3] =
	["application/x-gzip", "application/gzip", "application/octet-stream"];
/// Media type returned verbatim as text.
pub const CSV_MEDIA_TYPE: &str = "text/csv";

/// Description of one logical API call.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiCall {
	/// HTTP verb.
	pub method: Method,
	/// Endpoint path below the control-plane base.
	pub endpoint: String,
	/// Query parameters.
	pub query: Vec<(String, String)>,
	/// JSON body of the first request; continuation pages replace it.
	pub body: Option<Value>,
	/// Header overrides merged over the defaults.
	pub headers: Option<BTreeMap<String, String>>,
	/// Return partial results instead of failing when a page cannot be fetched or decoded.
	pub force: bool,
	/// Follow `nextPageToken` continuation tokens and accumulate `items`.
	pub paginated: bool,
}
impl ApiCall {
	/// Creates a call for `method` + `endpoint`.
	pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
		Self {
			method,
			endpoint: endpoint.into(),
			query: Vec::new(),
			body: None,
			headers: None,
			force: false,
			paginated: false,
		}
	}

	/// Shorthand for a `GET` call.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Get, endpoint)
	}

	/// Shorthand for a `POST` call.
	pub fn post(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Post, endpoint)
	}

	/// Appends a query parameter.
	pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Sets the JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Adds a header override.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.get_or_insert_with(BTreeMap::new).insert(name.into(), value.into());

		self
	}

	/// Forces partial results on failure.
	pub fn force(mut self) -> Self {
		self.force = true;

		self
	}

	/// Overrides the force flag.
	pub fn with_force(mut self, force: bool) -> Self {
		self.force = force;

		self
	}

	/// Enables pagination.
	pub fn paginated(mut self) -> Self {
		self.paginated = true;

		self
	}

	/// Overrides the pagination flag.
	pub fn with_paginated(mut self, paginated: bool) -> Self {
		self.paginated = paginated;

		self
	}
}

/// Decoded result of [`Client::execute`].
#[derive(Clone, Debug, PartialEq)]
pub enum ApiOutput {
	/// The response body was empty.
	Empty,
	/// Binary/gzip payload, untouched.
	Bytes(Vec<u8>),
	/// CSV payload, untouched.
	Text(String),
	/// Decoded JSON body of a single-page call.
	Json(Value),
	/// Accumulated `items` of a paginated call (or partial results under `force`).
	Items(Vec<Value>),
}
impl ApiOutput {
	/// Returns `true` for [`ApiOutput::Empty`].
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	/// Returns the JSON body, if any.
	pub fn into_json(self) -> Option<Value> {
		match self {
			Self::Json(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the accumulated items, if any.
	pub fn into_items(self) -> Option<Vec<Value>> {
		match self {
			Self::Items(items) => Some(items),
			_ => None,
		}
	}

	/// Returns the CSV text, if any.
	pub fn into_text(self) -> Option<String> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// Returns the raw bytes, if any.
	pub fn into_bytes(self) -> Option<Vec<u8>> {
		match self {
			Self::Bytes(bytes) => Some(bytes),
			_ => None,
		}
	}
}

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Executes an authenticated call against the control plane.
	///
	/// A valid token is ensured before every page. Single-page calls return the decoded
	/// body; paginated calls return every page's `items` in server order. With `force`,
	/// fetch and decode failures yield the items gathered so far instead of an error;
	/// authentication failures are never forced.
	pub async fn execute(&self, call: ApiCall) -> Result<ApiOutput> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "execute");
		let result = span
			.instrument(async {
				let url = self.control_base()?.join(&call.endpoint)?;

				if call.paginated {
					return self.paginate(&call, &url).await;
				}

				let response = self.send_page(&call, &url, call.body.as_ref()).await?;

				if !response.is_success() {
					return Err(self.api_failure(&url, response));
				}

				match decode_body(response) {
					Ok(output) => Ok(output),
					Err(err) => self.decode_failure(&call, err, Vec::new()),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Runs one page through the retry policy, ensuring a valid token before every attempt.
	///
	/// Session failures surface unchanged; only a network failure of the data request itself
	/// is returned as [`Error::Transport`].
	pub(crate) async fn send_page(
		&self,
		call: &ApiCall,
		url: &Url,
		body: Option<&Value>,
	) -> Result<ApiResponse> {
		let prepare = move || async move {
			let token = self.session.ensure_valid_token().await?;
			let request = self.build_request(call, url, body, &token);

			if self.debug {
				tracing::debug!(
					method = %request.method,
					url = %request.url,
					"Dispatching API request."
				);
			}

			Ok(request)
		};

		self.retry
			.perform_with(self.http_client.as_ref(), CallKind::Request, &self.errors, prepare)
			.await
			.inspect_err(|err| {
				if let Error::Transport(inner) = err {
					self.errors.record(CallKind::Request, inner);
				}
			})
	}

	pub(crate) fn build_request(
		&self,
		call: &ApiCall,
		url: &Url,
		body: Option<&Value>,
		token: &TokenSecret,
	) -> ApiRequest {
		let mut headers = BTreeMap::from([
			(CONTENT_TYPE.to_owned(), APPLICATION_JSON.to_owned()),
			(USER_AGENT.to_owned(), self.user_agent.clone()),
			(AUTH_HEADER.to_owned(), token.expose().to_owned()),
		]);

		if let Some(overrides) = &call.headers {
			for (name, value) in overrides {
				headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
				headers.insert(name.clone(), value.clone());
			}
		}

		let request =
			ApiRequest::new(call.method, url.clone()).headers(headers).query(call.query.clone());

		match body {
			Some(body) => request.json(body),
			None => request,
		}
	}

	/// Logs, counts, and converts a failure status into [`Error::Api`].
	pub(crate) fn api_failure(&self, url: &Url, response: ApiResponse) -> Error {
		let body = response.text_lossy();

		self.errors.record(
			CallKind::Request,
			format_args!("API ({url}) error response: status {}: {body}", response.status),
		);

		Error::Api { url: url.to_string(), status: response.status, body }
	}

	/// Logs and counts a decode failure; `force` turns it into the partial result.
	pub(crate) fn decode_failure(
		&self,
		call: &ApiCall,
		err: DecodeError,
		partial: Vec<Value>,
	) -> Result<ApiOutput> {
		self.errors.record(CallKind::Request, format_args!("Response parsing error: {err}"));

		if call.force { Ok(ApiOutput::Items(partial)) } else { Err(err.into()) }
	}
}

/// Classifies a successful response by body and media type.
pub fn decode_body(response: ApiResponse) -> Result<ApiOutput, DecodeError> {
	let media_type = response.media_type();
	let ApiResponse { status, body, .. } = response;

	if body.is_empty() {
		return Ok(ApiOutput::Empty);
	}

	match media_type.as_deref() {
		Some(media) if BINARY_MEDIA_TYPES.contains(&media) => Ok(ApiOutput::Bytes(body)),
		Some(CSV_MEDIA_TYPE) =>
			String::from_utf8(body)
				.map(ApiOutput::Text)
				.map_err(|source| DecodeError::Text { source }),
		_ => serde_json::from_slice(&body)
			.map(ApiOutput::Json)
			.map_err(|source| DecodeError::Json { status, source }),
	}
}
