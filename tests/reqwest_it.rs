// crates.io
use httpmock::prelude::*;
use prisma_cloud_client::{
	ApiCall, ApiOutput, ReqwestApiClient,
	config::{ApiPlane, ClientSettings},
	error::Error,
	serde_json::json,
};

const IDENTITY: &str = "access-key";
const SECRET: &str = "secret-key";

fn build_client(server: &MockServer) -> ReqwestApiClient {
	let settings = ClientSettings::new(server.base_url(), IDENTITY, SECRET)
		.with_name("mock-tenant")
		.with_plane(ApiPlane::Control)
		.with_verify(false)
		.with_retry_waits_secs([0, 0]);

	ReqwestApiClient::new(&settings).expect("Reqwest client should build from mock settings.")
}

async fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/login")
				.header("content-type", "application/json")
				.json_body(json!({ "username": IDENTITY, "password": SECRET }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "T1", "message": "login_successful" }));
		})
		.await
}

#[tokio::test]
async fn pagination_round_trips_over_http() {
	let server = MockServer::start_async().await;
	let login = mock_login(&server).await;
	let first = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v2/alert")
				.header("x-redlock-auth", "T1")
				.json_body(json!({ "limit": 2 }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "items": [1, 2], "nextPageToken": "A" }));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v2/alert")
				.header("x-redlock-auth", "T1")
				.json_body(json!({ "pageToken": "A" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "items": [3] }));
		})
		.await;
	let client = build_client(&server);
	let output = client
		.execute(ApiCall::post("v2/alert").with_body(json!({ "limit": 2 })).paginated())
		.await
		.expect("Paginated call should succeed.");

	assert_eq!(output, ApiOutput::Items(vec![json!(1), json!(2), json!(3)]));

	login.assert_calls_async(1).await;
	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;
}

#[tokio::test]
async fn csv_and_query_parameters_pass_through() {
	let server = MockServer::start_async().await;
	let _login = mock_login(&server).await;
	let report = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/inventory").query_param("timeType", "relative");
			then.status(200).header("content-type", "text/csv").body("id,name\n1,a\n");
		})
		.await;
	let client = build_client(&server);
	let output = client
		.execute(ApiCall::get("v2/inventory").query_param("timeType", "relative"))
		.await
		.expect("CSV call should succeed.");

	assert_eq!(output, ApiOutput::Text("id,name\n1,a\n".into()));

	report.assert_async().await;
}

#[tokio::test]
async fn persistent_server_errors_are_retried_then_raised() {
	let server = MockServer::start_async().await;
	let _login = mock_login(&server).await;
	let busy = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/alert");
			then.status(503).body("busy");
		})
		.await;
	let client = build_client(&server);
	let err = client
		.execute(ApiCall::get("v2/alert"))
		.await
		.expect_err("Exhausted retries must surface the final status.");

	assert!(matches!(err, Error::Api { status: 503, .. }));
	assert_eq!(client.error_report().as_deref(), Some("API responded with 1 error(s)"));

	busy.assert_calls_async(3).await;
}

#[tokio::test]
async fn connect_discovers_the_compute_plane() {
	let server = MockServer::start_async().await;
	let _login = mock_login(&server).await;
	let meta = server
		.mock_async(|when, then| {
			when.method(GET).path("/meta_info").header("x-redlock-auth", "T1");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "twistlockUrl": "https://us-east1.cloud.twistlock.com/us-1-111" }));
		})
		.await;
	let settings = ClientSettings::new(server.base_url(), IDENTITY, SECRET)
		.with_plane(ApiPlane::Control)
		.with_verify(false);
	let client = ReqwestApiClient::connect(&settings).await.expect("Connect should succeed.");

	assert_eq!(
		client.compute_base().map(|base| base.to_string()).as_deref(),
		Some("https://us-east1.cloud.twistlock.com/us-1-111/")
	);
	assert!(client.has_valid_token());

	meta.assert_async().await;
}
