//! Demonstrates a paginated alert listing against a mock API with the default reqwest
//! transport: one login, two pages joined by a continuation token, and the error summary.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use prisma_cloud_client::{
	ApiCall, ReqwestApiClient,
	config::{ApiPlane, ClientSettings},
	serde_json::json,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/login");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "demo-token" }));
		})
		.await;
	let first_page = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/alert").json_body(json!({ "limit": 2 }));
			then.status(200).header("content-type", "application/json").json_body(
				json!({ "items": [{ "id": "P-1" }, { "id": "P-2" }], "nextPageToken": "next" }),
			);
		})
		.await;
	let second_page = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/alert").json_body(json!({ "pageToken": "next" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "items": [{ "id": "P-3" }] }));
		})
		.await;
	let settings = ClientSettings::new(server.base_url(), "demo-access-key", "demo-secret")
		.with_name("demo")
		.with_plane(ApiPlane::Control)
		.with_verify(false);
	let client = ReqwestApiClient::new(&settings)?;
	let alerts = client
		.collect_pages(ApiCall::post("v2/alert").with_body(json!({ "limit": 2 })))
		.await?;

	for alert in &alerts {
		println!("Alert: {}.", alert["id"]);
	}

	println!("{}", client.error_report().unwrap_or_else(|| "No API errors.".into()));

	login_mock.assert_async().await;
	first_page.assert_async().await;
	second_page.assert_async().await;

	Ok(())
}
