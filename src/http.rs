//! Transport primitives shared by token exchanges and resource API calls.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. It hands out
//! short-lived [`AsyncHttpClient`] handles so callers can plug in any client (or a
//! deterministic fake in tests) while the crate keeps ownership of request building and
//! response classification.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Abstraction over HTTP transports used for every outbound provider request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back the
/// exchange client, the token manager, and the API client at once. The handles they
/// return must own whatever state is required so their request futures stay `Send`
/// for the lifetime of the in-flight call.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects; [`ReqwestHttpClient::new`] builds a client
/// with redirects disabled. Configure any custom [`ReqwestClient`] the same way, since
/// [`Default`] keeps reqwest's own redirect policy.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Request handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Dispatches `request` through a fresh transport handle.
pub(crate) async fn execute<C>(http_client: &C, request: HttpRequest) -> Result<HttpResponse>
where
	C: ?Sized + HttpTransport,
{
	let handle = http_client.handle();

	handle.call(request).await.map_err(map_transport_error)
}

/// Converts an [`HttpClientError`] emitted by a transport into a crate error.
pub(crate) fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner }.into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: "unknown transport failure".into() }.into(),
	}
}

/// Decodes a JSON response body, keeping the path of the offending field on failure.
pub(crate) fn decode_json<T>(response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::InvalidResponseBody { source, status: response.status().as_u16() })
}

/// Returns the lowercase media type of a response, ignoring parameters such as `charset`.
pub(crate) fn media_type(response: &HttpResponse) -> Option<String> {
	let value = response.headers().get(oauth2::http::header::CONTENT_TYPE)?.to_str().ok()?;
	let essence = value.split(';').next()?.trim();

	if essence.is_empty() { None } else { Some(essence.to_ascii_lowercase()) }
}

/// Canonical reason phrase for the response status.
pub(crate) fn reason_phrase(response: &HttpResponse) -> String {
	response.status().canonical_reason().unwrap_or("Unknown Status").to_owned()
}
