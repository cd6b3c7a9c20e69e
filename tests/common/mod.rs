//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, VecDeque},
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};
// self
use freee_oauth::{
	auth::Credential,
	flows::OAuthClient,
	http::HttpTransport,
	oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{StatusCode, header::CONTENT_TYPE},
	},
	provider::ProviderDescriptor,
	url::{Url, form_urlencoded},
};
#[cfg(feature = "reqwest")]
use freee_oauth::{
	http::ReqwestHttpClient,
	reqwest::{Client as ReqwestClient, redirect::Policy},
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";

#[derive(Debug)]
pub struct FakeTransportError;
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Fake transport failure.")
	}
}
impl StdError for FakeTransportError {}

/// Request captured by [`FakeTransport`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: String,
	pub uri: String,
	pub headers: HashMap<String, String>,
	pub body: Vec<u8>,
}
impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}

	pub fn form(&self) -> HashMap<String, String> {
		form_urlencoded::parse(&self.body).into_owned().collect()
	}
}

#[derive(Default)]
struct FakeState {
	responses: VecDeque<HttpResponse>,
	requests: Vec<RecordedRequest>,
}

/// Transport that replays canned responses in order and records every request.
#[derive(Clone, Default)]
pub struct FakeTransport {
	state: Arc<Mutex<FakeState>>,
	delay: Option<StdDuration>,
}
impl FakeTransport {
	/// Holds every request for `delay` before answering.
	pub fn with_delay(delay: StdDuration) -> Self {
		Self { delay: Some(delay), ..Default::default() }
	}

	pub fn push(&self, status: u16, content_type: &str, body: impl Into<String>) {
		let mut response = HttpResponse::new(body.into().into_bytes());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Status fixture should be a valid status code.");

		response.headers_mut().insert(
			CONTENT_TYPE,
			content_type.parse().expect("Content type fixture should be a valid header value."),
		);

		self.state.lock().responses.push_back(response);
	}

	pub fn push_json(&self, status: u16, body: impl Into<String>) {
		self.push(status, "application/json", body);
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.state.lock().requests.clone()
	}
}
impl HttpTransport for FakeTransport {
	type Handle = FakeHandle;
	type TransportError = FakeTransportError;

	fn handle(&self) -> Self::Handle {
		FakeHandle(self.clone())
	}
}

pub struct FakeHandle(FakeTransport);
impl<'c> AsyncHttpClient<'c> for FakeHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let transport = self.0.clone();

		Box::pin(async move {
			if let Some(delay) = transport.delay {
				tokio::time::sleep(delay).await;
			}

			let recorded = RecordedRequest {
				method: request.method().to_string(),
				uri: request.uri().to_string(),
				headers: request
					.headers()
					.iter()
					.map(|(name, value)| {
						(name.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned())
					})
					.collect(),
				body: request.body().clone(),
			};
			let mut state = transport.state.lock();

			state.requests.push(recorded);
			state
				.responses
				.pop_front()
				.ok_or_else(|| HttpClientError::Other("No canned response left.".into()))
		})
	}
}

pub fn fake_oauth_client(transport: FakeTransport) -> OAuthClient<FakeTransport> {
	let descriptor = ProviderDescriptor::freee().expect("Built-in descriptor should be valid.");

	OAuthClient::with_http_client(descriptor, CLIENT_ID, CLIENT_SECRET, transport)
}

/// Reqwest transport that accepts the self-signed certificates served by `httpmock`.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(Policy::none())
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Reqwest-backed client pointed at a mock provider rooted at `base_url`.
#[cfg(feature = "reqwest")]
pub fn reqwest_oauth_client(base_url: &str) -> OAuthClient<ReqwestHttpClient> {
	OAuthClient::with_http_client(
		mock_descriptor(base_url),
		CLIENT_ID,
		CLIENT_SECRET,
		test_reqwest_http_client(),
	)
}

pub fn mock_descriptor(base_url: &str) -> ProviderDescriptor {
	let url = |path: &str| {
		Url::parse(&format!("{base_url}{path}")).expect("Mock endpoint should parse.")
	};

	ProviderDescriptor::builder()
		.authorization_endpoint(url("/authorize"))
		.token_endpoint(url("/token"))
		.api_endpoint(url("/api/"))
		.build()
		.expect("Mock descriptor should build.")
}

/// Credential issued at `issued_at` and valid for `lifetime`.
pub fn credential(
	access: &str,
	refresh: &str,
	issued_at: OffsetDateTime,
	lifetime: Duration,
) -> Credential {
	Credential::builder()
		.access_token(access)
		.refresh_token(refresh)
		.scope("read write")
		.issued_at(issued_at)
		.expires_in(lifetime)
		.company_id(42)
		.build()
		.expect("Credential fixture should build.")
}

/// Credential that expired an hour ago.
pub fn expired_credential(access: &str, refresh: &str) -> Credential {
	credential(access, refresh, OffsetDateTime::now_utc() - Duration::hours(2), Duration::hours(1))
}

/// Token endpoint body minted now with a six-hour lifetime.
pub fn token_body(access: &str, refresh: &str) -> String {
	format!(
		r#"{{"access_token":"{access}","token_type":"bearer","expires_in":21600,"refresh_token":"{refresh}","scope":"read write","created_at":{},"company_id":42}}"#,
		OffsetDateTime::now_utc().unix_timestamp()
	)
}
