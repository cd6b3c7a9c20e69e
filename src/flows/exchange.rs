//! Token endpoint exchanges for the `authorization_code` and `refresh_token` grants.
//!
//! Both grants are a single form-encoded `POST` carrying the client credentials. Responses are
//! classified without retries:
//!
//! - 2xx: the JSON body becomes a [`Credential`]; a malformed body is
//!   [`Error::InvalidResponseBody`].
//! - 4xx with an `application/json` `{error, error_description}` body:
//!   [`Error::OAuthRejected`].
//! - Anything else: [`Error::UnexpectedStatus`] with the canonical reason phrase.

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	error::ConfigError,
	flows::OAuthClient,
	http::{self, HttpTransport},
	obs::{FlowKind, FlowSpan},
	provider::GrantType,
};

/// Grant submitted to the token endpoint.
#[derive(Clone)]
pub enum Grant {
	/// Exchange a captured authorization code.
	AuthorizationCode {
		/// One-time code delivered on the redirect.
		code: String,
		/// Redirect URI used for the authorize request; the provider compares it verbatim.
		redirect_uri: Url,
	},
	/// Mint a new credential from a refresh token.
	RefreshToken {
		/// Refresh secret from the current credential.
		refresh_token: TokenSecret,
	},
}
impl Grant {
	/// Grant type sent as `grant_type`.
	pub fn grant_type(&self) -> GrantType {
		match self {
			Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
			Self::RefreshToken { .. } => GrantType::RefreshToken,
		}
	}
}
impl Debug for Grant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::AuthorizationCode { redirect_uri, .. } => f
				.debug_struct("Grant::AuthorizationCode")
				.field("code", &"<redacted>")
				.field("redirect_uri", &redirect_uri.as_str())
				.finish(),
			Self::RefreshToken { refresh_token } => f
				.debug_struct("Grant::RefreshToken")
				.field("refresh_token", refresh_token)
				.finish(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: String,
}

impl<C> OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Submits `grant` to the token endpoint and parses the resulting credential.
	pub async fn exchange(&self, grant: Grant) -> Result<Credential> {
		let span = FlowSpan::new(FlowKind::Exchange, grant.grant_type().as_str());

		span.observe(async {
			let request = self.token_request(&grant)?;
			let response = http::execute(self.http_client.as_ref(), request).await?;

			span.record_status(response.status().as_u16());

			parse_token_response(response)
		})
		.await
	}

	/// Exchanges an authorization code captured for `redirect_uri`.
	pub async fn exchange_code(
		&self,
		code: impl Into<String>,
		redirect_uri: Url,
	) -> Result<Credential> {
		self.exchange(Grant::AuthorizationCode { code: code.into(), redirect_uri }).await
	}

	/// Mints a replacement credential from `refresh_token`.
	pub async fn refresh_credential(&self, refresh_token: &TokenSecret) -> Result<Credential> {
		self.exchange(Grant::RefreshToken { refresh_token: refresh_token.clone() }).await
	}

	fn token_request(&self, grant: &Grant) -> Result<HttpRequest> {
		let mut form = Serializer::new(String::new());

		form.append_pair("grant_type", grant.grant_type().as_str());
		form.append_pair("client_id", &self.client_id);
		form.append_pair("client_secret", self.client_secret().expose());

		match grant {
			Grant::AuthorizationCode { code, redirect_uri } => {
				form.append_pair("code", code);
				form.append_pair("redirect_uri", redirect_uri.as_str());
			},
			Grant::RefreshToken { refresh_token } => {
				form.append_pair("refresh_token", refresh_token.expose());
			},
		}

		let request = Request::builder()
			.method(Method::POST)
			.uri(self.descriptor.endpoints.token.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(form.finish().into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}

fn parse_token_response(response: HttpResponse) -> Result<Credential> {
	let status = response.status();

	if status.is_success() {
		return http::decode_json(&response);
	}
	if status.is_client_error()
		&& http::media_type(&response).as_deref() == Some("application/json")
		&& let Ok(body) = serde_json::from_slice::<OAuthErrorBody>(response.body())
	{
		return Err(Error::OAuthRejected {
			error: body.error,
			description: body.error_description,
		});
	}

	Err(Error::UnexpectedStatus { status: status.as_u16(), reason: http::reason_phrase(&response) })
}
