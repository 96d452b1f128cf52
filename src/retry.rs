//! Fixed-schedule retry policy wrapped around a single transport.
//!
//! [`RetryPolicy::perform`] makes one attempt per configured backoff delay, sleeping that
//! delay after every unsuccessful attempt, then one final attempt whose outcome is returned
//! as-is. A network error consumes a slot exactly like an HTTP failure; only a network
//! error on the final attempt becomes an [`Error`]. The schedule is deterministic: no
//! jitter is applied.

// std
use std::future;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{ApiHttpClient, ApiRequest, ApiResponse},
	obs::{self, CallKind, CallOutcome, ErrorCounter},
};

/// Status codes the API uses to signal transient trouble.
///
/// The list only drives log classification; every failed attempt is retried the same way.
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [425, 429, 500, 502, 503, 504];

/// Returns `true` for status codes the API documents as transient.
pub fn is_retryable_status(status: u16) -> bool {
	RETRYABLE_STATUS_CODES.contains(&status)
}

/// Ordered backoff schedule applied between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	backoff: Vec<StdDuration>,
}
impl RetryPolicy {
	/// Default schedule in seconds.
	pub const DEFAULT_WAITS_SECS: [u64; 6] = [1, 2, 4, 8, 16, 32];

	/// Creates a policy from explicit delays.
	pub fn new(backoff: impl IntoIterator<Item = StdDuration>) -> Self {
		Self { backoff: backoff.into_iter().collect() }
	}

	/// Creates a policy from delays expressed in whole seconds.
	pub fn from_secs(waits: impl IntoIterator<Item = u64>) -> Self {
		Self::new(waits.into_iter().map(StdDuration::from_secs))
	}

	/// A policy that performs only the final attempt.
	pub fn none() -> Self {
		Self { backoff: Vec::new() }
	}

	/// Configured delays, in order.
	pub fn backoff(&self) -> &[StdDuration] {
		&self.backoff
	}

	/// Total number of attempts, including the final unconditional one.
	pub fn max_attempts(&self) -> usize {
		self.backoff.len() + 1
	}

	/// Sends `request` until it succeeds or the schedule is exhausted.
	///
	/// Returns the first successful response, or the final attempt's response even when its
	/// status indicates failure. Network errors on earlier attempts are logged through
	/// `errors` and retried.
	pub async fn perform<C>(
		&self,
		client: &C,
		request: &ApiRequest,
		kind: CallKind,
		errors: &ErrorCounter,
	) -> Result<ApiResponse>
	where
		C: ?Sized + ApiHttpClient,
	{
		self.perform_with(client, kind, errors, || future::ready(Ok(request.clone()))).await
	}

	/// Like [`perform`](Self::perform), but rebuilds the request before every attempt.
	///
	/// An error from `prepare` ends the call immediately without consuming a slot; data
	/// calls use it to re-check the session token before each attempt.
	pub async fn perform_with<C, F, Fut>(
		&self,
		client: &C,
		kind: CallKind,
		errors: &ErrorCounter,
		mut prepare: F,
	) -> Result<ApiResponse>
	where
		C: ?Sized + ApiHttpClient,
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<ApiRequest>>,
	{
		for (idx, wait) in self.backoff.iter().enumerate() {
			let attempt = idx + 1;
			let request = prepare().await?;

			obs::record_call_outcome(kind, CallOutcome::Attempt);

			match client.send(request.clone()).await {
				Ok(response) if response.is_success() => return Ok(response),
				Ok(response) => {
					tracing::warn!(
						call = kind.as_str(),
						attempt,
						status = response.status,
						retryable = is_retryable_status(response.status),
						url = %request.url,
						"Attempt failed; retrying in {wait:?}."
					);
				},
				Err(err) => errors.record(
					kind,
					format_args!(
						"Request exception during attempt {attempt} ({}): {err}",
						request.url
					),
				),
			}

			tokio::time::sleep(*wait).await;
		}

		let request = prepare().await?;
		let url = request.url.clone();

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		client
			.send(request)
			.await
			.map_err(|err| TransportError::network(url.as_str(), err).into())
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::from_secs(Self::DEFAULT_WAITS_SECS)
	}
}
