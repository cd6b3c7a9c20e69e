//! Provider descriptor data structures and helpers shared by all flows.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant identifiers understood by the token endpoint.
pub mod grant;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use grant::*;
pub use quirks::*;

// self
use crate::{_prelude::*, error::ConfigError};

const FREEE_AUTHORIZATION: &str = "https://accounts.secure.freee.co.jp/public_api/authorize";
const FREEE_TOKEN: &str = "https://accounts.secure.freee.co.jp/public_api/token";
const FREEE_API: &str = "https://api.freee.co.jp/";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Browser-facing authorization endpoint.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// Base URL that resource paths are joined onto.
	pub api: Url,
}

/// Immutable provider descriptor consumed by flows and the API client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::default()
	}

	/// Descriptor for the production freee endpoints.
	pub fn freee() -> Result<Self> {
		let parse =
			|raw: &str| Url::parse(raw).map_err(|source| ConfigError::InvalidDescriptor { source });
		let descriptor = Self::builder()
			.authorization_endpoint(parse(FREEE_AUTHORIZATION)?)
			.token_endpoint(parse(FREEE_TOKEN)?)
			.api_endpoint(parse(FREEE_API)?)
			.build()
			.map_err(ConfigError::from)?;

		Ok(descriptor)
	}
}
