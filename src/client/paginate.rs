//! Continuation-token pagination.
//!
//! Each page must be a JSON object with an `items` array and an optional
//! `nextPageToken`. Items are appended in server order; the loop stops once the token is
//! absent, `null`, or empty. Continuation requests reuse the endpoint and method and
//! replace the body with `{"pageToken": <token>}`. A page without `items` is a protocol
//! violation, never an implicit last page.

// self
use crate::{
	_prelude::*,
	client::{ApiCall, ApiOutput, Client, decode_body},
	error::DecodeError,
	http::ApiHttpClient,
};

/// Items accumulated by one paginated call plus the pending continuation token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageState {
	items: Vec<Value>,
	next_page_token: Option<String>,
	pages: usize,
}
impl PageState {
	/// Absorbs one decoded page.
	///
	/// The page is validated before anything is appended, so a malformed page leaves the
	/// accumulated items untouched.
	pub fn absorb(&mut self, page: Value) -> Result<(), DecodeError> {
		let Value::Object(mut page) = page else {
			return Err(DecodeError::MissingItems);
		};
		let items = match page.remove("items") {
			Some(Value::Array(items)) => items,
			Some(_) => return Err(DecodeError::InvalidItems),
			None => return Err(DecodeError::MissingItems),
		};
		let next_page_token = match page.remove("nextPageToken") {
			None | Some(Value::Null) => None,
			Some(Value::String(token)) if token.is_empty() => None,
			Some(Value::String(token)) => Some(token),
			Some(_) => return Err(DecodeError::InvalidPageToken),
		};

		self.items.extend(items);
		self.next_page_token = next_page_token;
		self.pages += 1;

		Ok(())
	}

	/// Body of the next continuation request, or `None` once the last page was absorbed.
	pub fn continuation_body(&self) -> Option<Value> {
		self.next_page_token.as_ref().map(|token| serde_json::json!({ "pageToken": token }))
	}

	/// Pending continuation token.
	pub fn next_page_token(&self) -> Option<&str> {
		self.next_page_token.as_deref()
	}

	/// Items accumulated so far.
	pub fn items(&self) -> &[Value] {
		&self.items
	}

	/// Number of pages absorbed.
	pub fn pages(&self) -> usize {
		self.pages
	}

	/// Consumes the state, returning the accumulated items.
	pub fn into_items(self) -> Vec<Value> {
		self.items
	}
}

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Runs a paginated call and returns every page's `items`.
	///
	/// An empty first response yields no items; CSV or binary responses are rejected with
	/// [`DecodeError::UnexpectedContent`].
	pub async fn collect_pages(&self, call: ApiCall) -> Result<Vec<Value>> {
		match self.execute(call.with_paginated(true)).await? {
			ApiOutput::Items(items) => Ok(items),
			ApiOutput::Empty => Ok(Vec::new()),
			_ => Err(DecodeError::UnexpectedContent.into()),
		}
	}

	/// Drives the continuation loop for a paginated [`ApiCall`].
	///
	/// A page that comes back empty, or as CSV/binary, ends the loop and is returned as-is;
	/// items accumulated from earlier pages are discarded in that case. With `force`, a data
	/// request that fails (HTTP status or network) or a page that cannot be decoded yields
	/// the items gathered so far. Session failures are never forced.
	pub(crate) async fn paginate(&self, call: &ApiCall, url: &Url) -> Result<ApiOutput> {
		let mut state = PageState::default();
		let mut body = call.body.clone();

		loop {
			let response = match self.send_page(call, url, body.as_ref()).await {
				Ok(response) => response,
				Err(Error::Transport(_)) if call.force => return Ok(self.partial(state)),
				Err(err) => return Err(err),
			};

			if !response.is_success() {
				let err = self.api_failure(url, response);

				return if call.force { Ok(self.partial(state)) } else { Err(err) };
			}

			let page = match decode_body(response) {
				Ok(ApiOutput::Json(page)) => page,
				Ok(other) => return Ok(other),
				Err(err) => return self.decode_failure(call, err, state.into_items()),
			};

			if let Err(err) = state.absorb(page) {
				return self.decode_failure(call, err, state.into_items());
			}

			match state.continuation_body() {
				Some(next) => body = Some(next),
				None => return Ok(ApiOutput::Items(state.into_items())),
			}
		}
	}

	fn partial(&self, state: PageState) -> ApiOutput {
		tracing::warn!(
			pages = state.pages(),
			items = state.items().len(),
			"Returning partial results after a failed page."
		);

		ApiOutput::Items(state.into_items())
	}
}
