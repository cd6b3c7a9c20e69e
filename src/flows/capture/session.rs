// crates.io
use rand::{Rng, distr::Alphanumeric};
use url::form_urlencoded;
// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderDescriptor};

const STATE_LEN: usize = 32;

/// Per-flow authorization metadata: the nonce, the redirect URI, and the authorize URL.
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Opaque nonce that must round-trip through the redirect.
	pub state: String,
	/// Loopback redirect URI registered for the flow.
	pub redirect_uri: Url,
	/// Authorize URL the user must open in a browser.
	pub authorize_url: Url,
}
impl AuthorizationSession {
	/// Creates a session with a fresh nonce for a listener on `port`.
	pub fn new(descriptor: &ProviderDescriptor, client_id: &str, port: u16) -> Result<Self> {
		let redirect_uri = redirect_uri(port)?;
		let state = random_string(STATE_LEN);
		let authorize_url = build_authorize_url(descriptor, client_id, &redirect_uri, &state);

		Ok(Self { state, redirect_uri, authorize_url })
	}

	/// Classifies a redirect against this session.
	///
	/// A mismatched (or missing) `state` wins over everything else so that a forged
	/// redirect can never deliver a code. After that, a provider `error` wins over a code.
	pub fn evaluate(&self, params: &RedirectParams) -> Result<String> {
		let state_matches = params
			.state
			.as_deref()
			.is_some_and(|state| constant_time_eq(state.as_bytes(), self.state.as_bytes()));

		if !state_matches {
			return Err(Error::StateMismatch);
		}
		if let Some(error) = params.error.as_deref().filter(|error| !error.is_empty()) {
			return Err(Error::ProviderDenied {
				error: error.to_owned(),
				description: params.error_description.clone().unwrap_or_default(),
			});
		}

		match params.code.as_deref() {
			Some(code) if !code.is_empty() => Ok(code.to_owned()),
			_ => Err(Error::MissingCode),
		}
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("state", &"<redacted>")
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("authorize_url", &self.authorize_url.as_str())
			.finish()
	}
}

/// Query parameters carried by the authorization redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedirectParams {
	/// One-time authorization code.
	pub code: Option<String>,
	/// Echoed nonce.
	pub state: Option<String>,
	/// Provider error code.
	pub error: Option<String>,
	/// Human-readable provider error description.
	pub error_description: Option<String>,
}
impl RedirectParams {
	/// Parses a raw (still percent-encoded) query string. The first occurrence of a key wins.
	pub fn parse(query: &str) -> Self {
		let mut params = Self::default();

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}
}

/// Loopback redirect URI for a listener on `port`.
pub fn redirect_uri(port: u16) -> Result<Url> {
	Url::parse(&format!("http://localhost:{port}/"))
		.map_err(|source| ConfigError::InvalidUrl { source }.into())
}

fn build_authorize_url(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	redirect_uri: &Url,
	state: &str,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());
	pairs.append_pair("state", state);

	if let Some(prompt) = descriptor.quirks.authorize_prompt.as_deref() {
		pairs.append_pair("prompt", prompt);
	}

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}

	a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
