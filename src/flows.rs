//! OAuth flows powered by a single provider client.
//!
//! [`OAuthClient`] owns the transport, provider descriptor, and client credentials. The
//! grant-specific logic lives in submodules as `impl OAuthClient` blocks:
//!
//! - [`exchange`] posts `authorization_code`/`refresh_token` grants to the token endpoint.
//! - [`capture`] runs the single-use loopback listener that catches the authorization redirect.
//! - [`authorize`] sequences the two.

pub mod authorize;
pub mod capture;
pub mod exchange;

pub use capture::*;
pub use exchange::*;

// self
use crate::{_prelude::*, auth::TokenSecret, http::HttpTransport, provider::ProviderDescriptor};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestOAuthClient = OAuthClient<ReqwestHttpClient>;

/// Coordinates OAuth 2.0 flows against a single provider descriptor.
pub struct OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP transport used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Provider descriptor that defines the OAuth and API endpoints.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier used in every grant.
	pub client_id: String,
	client_secret: TokenSecret,
}
impl<C> OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			descriptor,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
		}
	}

	pub(crate) fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}
}
#[cfg(feature = "reqwest")]
impl OAuthClient<ReqwestHttpClient> {
	/// Creates a client backed by its own reqwest transport, with redirects disabled.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self> {
		Ok(Self::with_http_client(descriptor, client_id, client_secret, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			descriptor: self.descriptor.clone(),
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
		}
	}
}
impl<C> Debug for OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}
