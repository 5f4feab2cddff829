#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use paydash::{
	services::{PaymentListParams, PaymentSort, PaymentStatus},
	session::{User, UserRole},
};

const LOGIN_PATH: &str = "/dashboard/v1/auth/login";
const PAYMENTS_PATH: &str = "/dashboard/v1/payments";

fn payments_fixture() -> serde_json::Value {
	json!({
		"payments": [
			{ "id": "pay_1", "merchant": "Kopi Kenangan", "status": "completed", "amount": "150000.00", "created_at": "2025-10-06T09:30:00Z" },
			{ "id": "pay_2", "merchant": "Tokopedia", "status": "failed", "amount": "50000", "created_at": "2025-10-05T10:00:00Z" },
			{ "id": "pay_3", "merchant": "Gojek", "status": "processing", "amount": "25000.50", "created_at": "2025-10-06T18:45:00+07:00" }
		]
	})
}

#[tokio::test]
async fn login_persists_tokens_and_profile() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());
	let access = live_token("ops");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(LOGIN_PATH)
				.json_body(json!({ "email": "ops@example.com", "password": "s3cret" }));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"email": "ops@example.com",
				"role": "operation",
				"token": access,
				"refreshToken": "refresh-1",
			}));
		})
		.await;
	let response =
		client.login("ops@example.com", "s3cret").await.expect("Login should succeed.");

	mock.assert_async().await;

	assert_eq!(response.user(), User { email: "ops@example.com".into(), role: UserRole::Operation });

	let session = client.session().current().expect("Session should be readable.");

	assert!(session.is_authenticated);
	assert_eq!(session.user, Some(response.user()));
	assert!(client.tokens().is_authenticated().expect("Token reads should succeed."));
	assert_eq!(
		client.tokens().authorization_header().expect("Token reads should succeed."),
		Some(format!("Bearer {access}"))
	);

	client.logout().expect("Logout should succeed.");

	assert!(!client.session().current().expect("Session should be readable.").is_authenticated);
	assert!(!client.tokens().is_authenticated().expect("Token reads should succeed."));
}

#[tokio::test]
async fn login_without_token_pair_stores_nothing() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(POST).path(LOGIN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "email": "cs@example.com", "token": "only-access" }));
		})
		.await;

	let response = client.login("cs@example.com", "pw").await.expect("Login should succeed.");

	assert_eq!(response.user().role, UserRole::Cs);
	assert!(store.is_empty());
}

#[tokio::test]
async fn list_payments_sends_filters_as_query() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());
	let access = live_token("cs");

	seed_tokens(&store, &access, "refresh-1");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PAYMENTS_PATH)
				.query_param("status", "failed")
				.query_param("sort", "-amount")
				.query_param_missing("id")
				.header("authorization", format!("Bearer {access}"));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "payments": [payments_fixture()["payments"][1]] }));
		})
		.await;
	let params = PaymentListParams::default()
		.status(PaymentStatus::Failed)
		.sort(PaymentSort::HighestAmount)
		.id("");
	let response = client.list_payments(&params).await.expect("Listing should succeed.");

	mock.assert_async().await;

	assert_eq!(response.payments.len(), 1);
	assert_eq!(response.payments[0].id, "pay_2");
	assert_eq!(response.payments[0].status, PaymentStatus::Failed);
}

#[tokio::test]
async fn dashboard_summarizes_the_unfiltered_list() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_tokens(&store, &live_token("cs"), "refresh-1");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PAYMENTS_PATH)
				.query_param_missing("status")
				.query_param_missing("sort");
			then.status(200).header("content-type", "application/json").json_body(payments_fixture());
		})
		.await;
	let view = client.dashboard().await.expect("Dashboard should load.");

	mock.assert_async().await;

	assert_eq!(
		(view.summary.total, view.summary.completed, view.summary.processing, view.summary.failed),
		(3, 1, 1, 1)
	);
	assert_eq!(
		view.summary.recent.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
		["pay_3", "pay_1", "pay_2"]
	);
	assert_eq!(
		view.chart.iter().map(|p| (p.date.as_str(), p.total)).collect::<Vec<_>>(),
		[("Oct 5", 50_000), ("Oct 6", 175_001)]
	);
}
