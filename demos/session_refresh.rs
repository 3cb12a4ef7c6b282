//! Demonstrates signing in, recovering from an expired access credential, and the soft-failure
//! path against a mock attendance backend.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use attendance_client::{
	client::ApiClient,
	config::ApiConfig,
	resources::{ReviewAction, ReviewQueue},
	sink::{FailureSink, RecordingSink},
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).json_body(json!({ "access": "expired", "refresh": "refresh-1" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/").json_body(json!({ "refresh": "refresh-1" }));
			then.status(200).json_body(json!({ "access": "access-2" }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/manager/pending-requests/").header("authorization", "Bearer expired");
			then.status(401).json_body(json!({ "detail": "Given token not valid for any token type" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/manager/pending-requests/").header("authorization", "Bearer access-2");
			then.status(200).json_body(json!([
				{ "id": 7, "date": "2025-01-06", "employee_name": "Grace Hopper", "requested_minutes": 45, "status": "Pending" }
			]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/manager/review/7/");
			then.status(404).json_body(json!({ "detail": "Pending request not found" }));
		})
		.await;

	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let sink = Arc::new(RecordingSink::default());
	let sink_dyn: Arc<dyn FailureSink> = sink.clone();
	let client = ApiClient::new(ApiConfig::from_base(&server.url("/api"))?, store, sink_dyn);

	client.login("manager", "demo-password").await?;
	login.assert_async().await;

	let pending = client.pending_overtime().await?.unwrap_or_default();

	println!("Pending overtime requests: {pending:#?}");
	println!("Refresh calls issued: {}", refresh.hits_async().await);

	let review = client.review(ReviewQueue::Overtime, 7, ReviewAction::Approve).await?;

	println!("Review result: {review:?}");

	for notice in sink.notices() {
		println!("{notice}");
	}

	Ok(())
}
