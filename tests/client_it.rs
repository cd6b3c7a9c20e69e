#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use parking_lot::Mutex;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use common::FakeTransport;
use freee_oauth::{
	client::{ApiError, Client, HookStage, RequestHooks},
	error::{ConfigError, Error},
	oauth2::http::{HeaderValue, Method},
};

fn fresh_credential_client(server: &MockServer) -> Client<freee_oauth::http::ReqwestHttpClient> {
	let oauth_client = common::reqwest_oauth_client(&server.base_url());
	let credential = common::credential(
		"access-1",
		"refresh-1",
		OffsetDateTime::now_utc(),
		Duration::hours(6),
	);

	Client::new(oauth_client, credential)
}

#[tokio::test]
async fn login_user_is_fetched_with_the_bearer_token() {
	let server = MockServer::start_async().await;
	let client = fresh_credential_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/hr/api/v1/users/me")
				.header("authorization", "Bearer access-1")
				.header("accept", "application/json");
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":7,"companies":[{"id":10,"name":"Acme","role":"company_admin","external_cid":"0001","employee_id":null,"display_name":null}]}"#,
			);
		})
		.await;
	let user = client.login_user().await.expect("Login user should be fetched.");

	mock.assert_async().await;

	assert_eq!(user.id, 7);
	assert_eq!(user.companies[0].id, 10);
	assert_eq!(user.companies[0].role, "company_admin");
	assert_eq!(user.companies[0].employee_id, None);
}

#[tokio::test]
async fn expired_credential_is_refreshed_before_the_call() {
	let server = MockServer::start_async().await;
	let oauth_client = common::reqwest_oauth_client(&server.base_url());
	let client = Client::new(oauth_client, common::expired_credential("access-1", "refresh-1"));
	let persisted = Arc::new(Mutex::new(None));

	client.token_manager().set_refresh_observer({
		let persisted = persisted.clone();

		move |credential| {
			*persisted.lock() = Some(credential.clone());

			Ok(())
		}
	});

	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", "refresh-1");
			then.status(200)
				.header("content-type", "application/json")
				.body(common::token_body("access-2", "refresh-2"));
		})
		.await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/hr/api/v1/users/me").header("authorization", "Bearer access-2");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":7,"companies":[]}"#);
		})
		.await;
	let user = client.login_user().await.expect("Call after refresh should succeed.");

	token.assert_async().await;
	resource.assert_async().await;

	assert_eq!(user.id, 7);
	assert_eq!(
		persisted.lock().as_ref().map(|credential| credential.access_token.expose().to_owned()),
		Some("access-2".into())
	);
}

#[tokio::test]
async fn json_payloads_and_query_pairs_are_sent() {
	let server = MockServer::start_async().await;
	let client = fresh_credential_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/api/hr/api/v1/employees/5")
				.query_param("company_id", "10")
				.header("content-type", "application/json; charset=UTF-8")
				.json_body(json!({ "employee": { "display_name": "Taro" } }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"employee":{"id":5}}"#);
		})
		.await;
	let updated: Value = client
		.send_json(
			Method::PUT,
			"/hr/api/v1/employees/5",
			&[("company_id", "10")],
			&json!({ "employee": { "display_name": "Taro" } }),
		)
		.await
		.expect("JSON update should succeed.");

	mock.assert_async().await;

	assert_eq!(updated["employee"]["id"], 5);
}

#[tokio::test]
async fn problem_json_errors_are_joined() {
	let server = MockServer::start_async().await;
	let client = fresh_credential_client(&server);

	server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/hr/api/v1/employees/5");
			then.status(400).header("content-type", "application/problem+json").body(
				r#"{"status_code":400,"errors":[{"type":"validation","messages":["company_id is","required"]},{"type":"status","messages":["bad request"]}]}"#,
			);
		})
		.await;

	let err = client
		.delete("hr/api/v1/employees/5", &[])
		.await
		.expect_err("Problem response should fail.");

	assert_eq!(err.to_string(), "company_id is required (validation)\nbad request (status)");
	assert!(matches!(err, Error::Api(ApiError::Problem { status: 400, .. })));
}

#[tokio::test]
async fn oauth_json_and_unknown_errors_are_classified() {
	let server = MockServer::start_async().await;
	let client = fresh_credential_client(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/denied");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_token","error_description":"expired"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/broken");
			then.status(503).header("content-type", "text/plain").body("maintenance");
		})
		.await;

	let denied = client.get::<Value>("denied", &[]).await.expect_err("401 should fail.");

	assert!(matches!(
		denied,
		Error::Api(ApiError::OAuth { status: 401, ref error, ref description })
			if error == "invalid_token" && description == "expired"
	));

	let broken = client.get::<Value>("broken", &[]).await.expect_err("503 should fail.");

	assert!(matches!(
		broken,
		Error::UnexpectedStatus { status: 503, ref reason } if reason == "Service Unavailable"
	));
}

#[tokio::test]
async fn malformed_success_bodies_are_reported_with_their_path() {
	let transport = FakeTransport::default();
	let client = Client::new(
		common::fake_oauth_client(transport.clone()),
		common::credential("access-1", "refresh-1", OffsetDateTime::now_utc(), Duration::hours(6)),
	);

	transport.push_json(200, r#"{"id":"seven","companies":[]}"#);

	let err = client.login_user().await.expect_err("Malformed body should fail.");
	let requests = transport.requests();

	assert!(matches!(
		err,
		Error::InvalidResponseBody { ref source, status: 200 } if source.path().to_string() == "id"
	));
	assert_eq!(requests[0].uri, "https://api.freee.co.jp/hr/api/v1/users/me");
	assert_eq!(requests[0].header("authorization"), Some("Bearer access-1"));
}

#[tokio::test]
async fn hooks_wrap_every_request_in_order() {
	let server = MockServer::start_async().await;
	let statuses = Arc::new(Mutex::new(Vec::new()));
	let client = fresh_credential_client(&server).with_hooks(
		RequestHooks::default()
			.before_request(|mut request| {
				request.headers_mut().insert("x-request-id", HeaderValue::from_static("req-1"));

				Ok(request)
			})
			.after_response({
				let statuses = statuses.clone();

				move |response| {
					statuses.lock().push(response.status().as_u16());

					Ok(response)
				}
			}),
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/hr/api/v1/users/me")
				.header("authorization", "Bearer access-1")
				.header("x-request-id", "req-1");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":7,"companies":[]}"#);
		})
		.await;

	client.login_user().await.expect("Hooked call should succeed.");
	mock.assert_async().await;

	assert_eq!(*statuses.lock(), vec![200]);
}

#[tokio::test]
async fn failing_before_hook_sends_nothing() {
	let transport = FakeTransport::default();
	let client = Client::new(
		common::fake_oauth_client(transport.clone()),
		common::credential("access-1", "refresh-1", OffsetDateTime::now_utc(), Duration::hours(6)),
	)
	.with_hooks(RequestHooks::default().before_request(|_| Err("offline mode".into())));
	let err = client.login_user().await.expect_err("Vetoed request should fail.");

	assert!(matches!(
		err,
		Error::Hook { stage: HookStage::BeforeRequest, ref source } if source.to_string() == "offline mode"
	));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn after_hook_runs_before_status_classification() {
	let transport = FakeTransport::default();
	let client = Client::new(
		common::fake_oauth_client(transport.clone()),
		common::credential("access-1", "refresh-1", OffsetDateTime::now_utc(), Duration::hours(6)),
	)
	.with_hooks(RequestHooks::default().after_response(|response| {
		if response.status().is_server_error() {
			Err(format!("upstream {}", response.status().as_u16()).into())
		} else {
			Ok(response)
		}
	}));

	transport.push(503, "text/plain", "maintenance");

	let err = client.get::<Value>("denied", &[]).await.expect_err("Hook should reject 503.");

	assert!(matches!(
		err,
		Error::Hook { stage: HookStage::AfterResponse, ref source } if source.to_string() == "upstream 503"
	));
	assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn absolute_paths_are_rejected_before_the_token_is_used() {
	let transport = FakeTransport::default();
	let client = Client::new(
		common::fake_oauth_client(transport.clone()),
		common::expired_credential("access-1", "refresh-1"),
	);

	for path in ["https://other.example/steal", "//other.example/steal"] {
		let err = client.get::<Value>(path, &[]).await.expect_err("Foreign path should fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::ForeignResourcePath { path: ref rejected }) if rejected == path
		));
	}

	assert!(transport.requests().is_empty());
}
