//! OAuth credential record, expiry helpers, and builder.

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no refresh token value was provided.
	#[error("Refresh token is required.")]
	MissingRefreshToken,
	/// Issued when no lifetime was configured.
	#[error("Expiry must be supplied via expires_in.")]
	MissingExpiry,
}

/// Credential minted by the token endpoint.
///
/// The serde shape is exactly the provider's token response, so a stored credential can be
/// parsed back with the same code that parses the endpoint. A credential is valid up to and
/// including `created_at + expires_in`; strictly after that instant it must be refreshed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Bearer token sent as `Authorization: Bearer <token>`.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (usually `bearer`).
	#[serde(default, deserialize_with = "null_as_default")]
	pub token_type: String,
	/// Lifetime in seconds, relative to `created_at`.
	pub expires_in: i64,
	/// Secret used to mint a replacement credential without user interaction.
	pub refresh_token: TokenSecret,
	/// Granted scope string, passed through untouched.
	#[serde(default, deserialize_with = "null_as_default")]
	pub scope: String,
	/// Unix seconds at which the provider minted the token.
	pub created_at: i64,
	/// Provider tenant (company) identifier, passed through untouched.
	#[serde(default, deserialize_with = "null_as_default")]
	pub company_id: i64,
}
impl Credential {
	/// Returns a builder for hand-assembled credentials (e.g. loaded from a secret store).
	pub fn builder() -> CredentialBuilder {
		CredentialBuilder::default()
	}

	/// Instant at which the provider minted the token.
	pub fn issued_at(&self) -> OffsetDateTime {
		OffsetDateTime::from_unix_timestamp(self.created_at).unwrap_or(OffsetDateTime::UNIX_EPOCH)
	}

	/// Last instant at which the token is still valid.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.issued_at().saturating_add(Duration::seconds(self.expires_in))
	}

	/// Returns `true` if the credential must be refreshed before use at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at()
	}

	/// Returns `true` if the credential is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// `Authorization` header value for resource calls.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.access_token.expose())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &"<redacted>")
			.field("scope", &self.scope)
			.field("created_at", &self.created_at)
			.field("company_id", &self.company_id)
			.finish()
	}
}

// Passthrough fields accept an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Builder for [`Credential`].
#[derive(Clone, Debug, Default)]
pub struct CredentialBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	scope: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	company_id: i64,
}
impl CredentialBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to `bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the issued-at instant (truncated to whole seconds).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the lifetime relative to the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Sets the provider tenant identifier.
	pub fn company_id(mut self, company_id: i64) -> Self {
		self.company_id = company_id;

		self
	}

	/// Consumes the builder and produces a [`Credential`].
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(CredentialBuilderError::MissingAccessToken)?;
		let refresh_token = self
			.refresh_token
			.filter(|token| !token.is_empty())
			.ok_or(CredentialBuilderError::MissingRefreshToken)?;
		let expires_in = self.expires_in.ok_or(CredentialBuilderError::MissingExpiry)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);

		Ok(Credential {
			access_token,
			token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
			expires_in: expires_in.whole_seconds(),
			refresh_token,
			scope: self.scope.unwrap_or_default(),
			created_at: issued_at.unix_timestamp(),
			company_id: self.company_id,
		})
	}
}
