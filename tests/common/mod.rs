//! Shared fixtures for the integration suites: a scripted transport and a manual clock.

#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
use prisma_cloud_client::{
	Client,
	config::ClientSettings,
	http::{APPLICATION_JSON, ApiHttpClient, ApiRequest, ApiResponse, TransportFuture},
	serde_json::{self, Value},
	session::Clock,
};
use time::{Duration, OffsetDateTime, macros::datetime};

pub const IDENTITY: &str = "access-key";
pub const SECRET: &str = "secret-key";
pub const API_URL: &str = "https://api.prismacloud.io";

pub type Reply = Result<ApiResponse, FakeTransportError>;
type Handler = Box<dyn Fn(&ApiRequest, usize) -> Reply + Send + Sync>;

/// Network-level failure produced by [`FakeHttpClient`].
#[derive(Debug, thiserror::Error)]
#[error("connection reset by peer")]
pub struct FakeTransportError;

/// Transport that answers from a closure and records every request it sees.
///
/// The closure receives the request and the zero-based index of the call for the same path.
pub struct FakeHttpClient {
	handler: Handler,
	delay: Option<StdDuration>,
	requests: Mutex<Vec<ApiRequest>>,
	calls: AtomicUsize,
}
impl FakeHttpClient {
	pub fn new(handler: impl Fn(&ApiRequest, usize) -> Reply + Send + Sync + 'static) -> Self {
		Self {
			handler: Box::new(handler),
			delay: None,
			requests: Mutex::new(Vec::new()),
			calls: AtomicUsize::new(0),
		}
	}

	/// Answers `/login` with `T1`, `/auth_token/extend` with `T2`, and everything else with
	/// `handler`.
	pub fn api(handler: impl Fn(&ApiRequest, usize) -> Reply + Send + Sync + 'static) -> Self {
		Self::new(move |request, nth| match request.url.path() {
			"/login" => Ok(json(200, serde_json::json!({ "token": "T1" }))),
			"/auth_token/extend" => Ok(json(200, serde_json::json!({ "token": "T2" }))),
			_ => handler(request, nth),
		})
	}

	pub fn with_delay(mut self, delay: StdDuration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}

	pub fn paths(&self) -> Vec<String> {
		self.requests.lock().iter().map(|request| request.url.path().to_owned()).collect()
	}

	pub fn calls_to(&self, path: &str) -> usize {
		self.requests.lock().iter().filter(|request| request.url.path() == path).count()
	}

	pub fn total_calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ApiHttpClient for FakeHttpClient {
	type TransportError = FakeTransportError;

	fn send(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			self.calls.fetch_add(1, Ordering::SeqCst);

			let nth = {
				let mut requests = self.requests.lock();
				let nth =
					requests.iter().filter(|seen| seen.url.path() == request.url.path()).count();

				requests.push(request.clone());

				nth
			};

			(self.handler)(&request, nth)
		})
	}
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	pub fn new() -> Self {
		Self(Mutex::new(datetime!(2025-01-01 00:00 UTC)))
	}

	pub fn advance(&self, by: Duration) {
		*self.0.lock() += by;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

pub fn json(status: u16, body: Value) -> ApiResponse {
	ApiResponse::new(status, body.to_string()).with_content_type(APPLICATION_JSON)
}

pub fn request_json(request: &ApiRequest) -> Option<Value> {
	request
		.body
		.as_deref()
		.map(|body| serde_json::from_slice(body).expect("Recorded request body should be JSON."))
}

/// Settings pointing at a control-plane host with an immediate retry schedule.
pub fn settings() -> ClientSettings {
	ClientSettings::new(API_URL, IDENTITY, SECRET).with_retry_waits_secs([0, 0])
}

pub fn fake_client(
	settings: &ClientSettings,
	http_client: FakeHttpClient,
) -> (Client<FakeHttpClient>, Arc<FakeHttpClient>, Arc<ManualClock>) {
	fake_client_with_clock(settings, http_client, Arc::new(ManualClock::new()))
}

/// Like [`fake_client`], with a clock the transport handler can also hold.
pub fn fake_client_with_clock(
	settings: &ClientSettings,
	http_client: FakeHttpClient,
	clock: Arc<ManualClock>,
) -> (Client<FakeHttpClient>, Arc<FakeHttpClient>, Arc<ManualClock>) {
	let http_client = Arc::new(http_client);
	let client = Client::<FakeHttpClient>::with_http_client_and_clock(
		settings,
		http_client.clone(),
		clock.clone(),
	)
	.expect("Client should build from fixture settings.");

	(client, http_client, clock)
}
