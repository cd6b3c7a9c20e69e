//! Authenticated resource API client.
//!
//! Every call asks the [`TokenManager`] for a valid credential right before the request is
//! built, so an expired token is refreshed transparently and the bearer value is never
//! cached beyond a single call. Non-2xx answers are classified by media type into
//! [`ApiError`] or [`Error::UnexpectedStatus`].

mod hooks;
mod login_user;

pub use hooks::*;
pub use login_user::*;

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::ConfigError,
	flows::OAuthClient,
	http::{self, HttpTransport},
	manager::TokenManager,
	obs::{FlowKind, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestApiClient = Client<ReqwestHttpClient>;

/// Error bodies returned by the resource API.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// `application/problem+json` body with one or more sub-errors.
	#[error("{}", join_problems(.errors))]
	Problem {
		/// HTTP status code of the response.
		status: u16,
		/// Sub-errors in the order the API reported them.
		errors: Vec<ProblemDetail>,
	},
	/// `application/json` OAuth-style error body.
	#[error("{description} ({error}).")]
	OAuth {
		/// HTTP status code of the response.
		status: u16,
		/// Provider-supplied `error` code.
		error: String,
		/// Provider-supplied `error_description`, empty when omitted.
		description: String,
	},
}
impl ApiError {
	/// HTTP status code of the failed response.
	pub fn status(&self) -> u16 {
		match self {
			Self::Problem { status, .. } | Self::OAuth { status, .. } => *status,
		}
	}
}

/// One entry of a problem+json `errors` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetail {
	/// Error category (`type` on the wire).
	#[serde(rename = "type")]
	pub kind: String,
	/// Human-readable messages.
	#[serde(default)]
	pub messages: Vec<String>,
}
impl Display for ProblemDetail {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} ({})", self.messages.join(" "), self.kind)
	}
}

#[derive(Debug, Deserialize)]
struct ProblemBody {
	#[serde(default)]
	errors: Vec<ProblemDetail>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: String,
}

/// Resource API client bound to one [`TokenManager`].
pub struct Client<C>
where
	C: ?Sized + HttpTransport,
{
	token: Arc<TokenManager<C>>,
	hooks: RequestHooks,
}
impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that manages `credential` with `oauth_client`.
	pub fn new(oauth_client: impl Into<Arc<OAuthClient<C>>>, credential: Credential) -> Self {
		Self::with_token_manager(Arc::new(TokenManager::new(oauth_client, credential)))
	}

	/// Creates a client on top of an existing (possibly shared) manager.
	pub fn with_token_manager(token: Arc<TokenManager<C>>) -> Self {
		Self { token, hooks: RequestHooks::default() }
	}

	/// Appends `hooks` after any hooks already installed.
	pub fn with_hooks(mut self, hooks: RequestHooks) -> Self {
		self.hooks.extend(hooks);

		self
	}

	/// Token manager backing this client, e.g. to install a refresh observer.
	pub fn token_manager(&self) -> &Arc<TokenManager<C>> {
		&self.token
	}

	/// `GET path` and decodes the JSON answer.
	pub async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.call(Method::GET, path, query, None).await?;

		http::decode_json(&response)
	}

	/// Sends `payload` as JSON with `method` and decodes the JSON answer.
	pub async fn send_json<T, P>(
		&self,
		method: Method,
		path: &str,
		query: &[(&str, &str)],
		payload: &P,
	) -> Result<T>
	where
		T: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		let body =
			serde_json::to_vec(payload).map_err(|source| ConfigError::Payload { source })?;
		let response = self.call(method, path, query, Some(body)).await?;

		http::decode_json(&response)
	}

	/// `DELETE path`; the response body is ignored.
	pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<()> {
		self.call(Method::DELETE, path, query, None).await.map(|_| ())
	}

	/// Performs an authenticated request and returns the raw 2xx response.
	pub async fn call(
		&self,
		method: Method,
		path: &str,
		query: &[(&str, &str)],
		body: Option<Vec<u8>>,
	) -> Result<HttpResponse> {
		let span = FlowSpan::new(FlowKind::ApiCall, "call");

		span.observe(async {
			let url = self.resource_url(path, query)?;
			let credential = self.token.valid_token().await?;
			let request = build_request(method, &url, &credential, body)?;
			let request = self.hooks.run_before(request)?;
			let response = self.hooks.run_after(
				http::execute(self.token.oauth_client().http_client.as_ref(), request).await?,
			)?;

			span.record_status(response.status().as_u16());

			if response.status().is_success() { Ok(response) } else { Err(classify_error(&response)) }
		})
		.await
	}

	fn resource_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
		// The bearer token must never leave the API host.
		if Url::parse(path).is_ok() || path.starts_with("//") {
			return Err(ConfigError::ForeignResourcePath { path: path.to_owned() }.into());
		}

		let mut url = self
			.token
			.oauth_client()
			.descriptor
			.endpoints
			.api
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidUrl { source })?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { token: self.token.clone(), hooks: self.hooks.clone() }
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client").field("token", &self.token).field("hooks", &self.hooks).finish()
	}
}

fn build_request(
	method: Method,
	url: &Url,
	credential: &Credential,
	body: Option<Vec<u8>>,
) -> Result<HttpRequest> {
	let mut builder = Request::builder()
		.method(method)
		.uri(url.as_str())
		.header(AUTHORIZATION, credential.bearer())
		.header(ACCEPT, "application/json");

	if body.is_some() {
		builder = builder.header(CONTENT_TYPE, "application/json; charset=UTF-8");
	}

	let request = builder.body(body.unwrap_or_default()).map_err(ConfigError::from)?;

	Ok(request)
}

fn classify_error(response: &HttpResponse) -> Error {
	let status = response.status().as_u16();

	match http::media_type(response).as_deref() {
		Some("application/problem+json") => {
			if let Ok(body) = serde_json::from_slice::<ProblemBody>(response.body()) {
				return ApiError::Problem { status, errors: body.errors }.into();
			}
		},
		Some("application/json") => {
			if let Ok(body) = serde_json::from_slice::<OAuthErrorBody>(response.body()) {
				return ApiError::OAuth {
					status,
					error: body.error,
					description: body.error_description,
				}
				.into();
			}
		},
		_ => {},
	}

	Error::UnexpectedStatus { status, reason: http::reason_phrase(response) }
}

fn join_problems(errors: &[ProblemDetail]) -> String {
	errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;

	fn response(status: StatusCode, content_type: &str, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = status;

		response.headers_mut().insert(
			CONTENT_TYPE,
			content_type.parse().expect("Content type fixture should be a valid header value."),
		);

		response
	}

	#[test]
	fn problem_json_joins_sub_errors() {
		let err = classify_error(&response(
			StatusCode::BAD_REQUEST,
			"application/problem+json",
			r#"{"status_code":400,"errors":[{"type":"validation","messages":["a","b"]},{"type":"status","messages":["c"]}]}"#,
		));

		assert_eq!(err.to_string(), "a b (validation)\nc (status)");
		assert!(matches!(
			err,
			Error::Api(ApiError::Problem { status: 400, ref errors }) if errors.len() == 2
		));
	}

	#[test]
	fn json_error_surfaces_both_fields() {
		let err = classify_error(&response(
			StatusCode::UNAUTHORIZED,
			"application/json; charset=utf-8",
			r#"{"error":"invalid_token","error_description":"token revoked"}"#,
		));

		assert_eq!(err.to_string(), "token revoked (invalid_token).");

		let Error::Api(api) = err else { panic!("Expected an API error.") };

		assert_eq!(api.status(), 401);
	}

	#[test]
	fn undecodable_bodies_fall_back_to_status() {
		for (content_type, body) in [
			("text/html", "<html></html>"),
			("application/json", "{"),
			("application/problem+json", "oops"),
		] {
			let err = classify_error(&response(StatusCode::FORBIDDEN, content_type, body));

			assert!(matches!(
				err,
				Error::UnexpectedStatus { status: 403, ref reason } if reason == "Forbidden"
			));
		}
	}

	#[test]
	fn requests_carry_bearer_and_json_headers() {
		let credential = Credential::builder()
			.access_token("access")
			.refresh_token("refresh")
			.expires_in(Duration::hours(6))
			.build()
			.expect("Credential fixture should build.");
		let url = Url::parse("https://api.example.com/hr/api/v1/users/me")
			.expect("URL fixture should parse.");
		let get = build_request(Method::GET, &url, &credential, None)
			.expect("GET request should build.");
		let post = build_request(Method::POST, &url, &credential, Some(b"{}".to_vec()))
			.expect("POST request should build.");

		assert_eq!(get.headers()[AUTHORIZATION], "Bearer access");
		assert_eq!(get.headers()[ACCEPT], "application/json");
		assert!(get.headers().get(CONTENT_TYPE).is_none());
		assert_eq!(post.method(), Method::POST);
		assert_eq!(post.headers()[CONTENT_TYPE], "application/json; charset=UTF-8");
		assert_eq!(post.body(), b"{}");
	}
}
