//! Crate-level error types shared across flows, the token manager, and the API client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error returned by caller-supplied callbacks (prompt, refresh observer).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) while talking to the provider.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Loopback listener failure.
	#[error(transparent)]
	Server(#[from] ServerError),
	/// Resource API returned an error body.
	#[error(transparent)]
	Api(#[from] crate::client::ApiError),

	/// A 2xx response carried a body that could not be decoded.
	#[error("Provider returned a malformed response body (HTTP {status}).")]
	InvalidResponseBody {
		/// Structured parsing failure, including the path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint rejected the grant with an OAuth error body.
	#[error("Token endpoint rejected the request: {description} ({error}).")]
	OAuthRejected {
		/// Provider-supplied `error` code.
		error: String,
		/// Provider-supplied `error_description`, empty when omitted.
		description: String,
	},
	/// Provider answered with a status that carries no usable error body.
	#[error("Provider returned an unexpected status: {status} {reason}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Canonical reason phrase for the status.
		reason: String,
	},
	/// Authorization redirect did not carry the nonce issued for this flow.
	#[error("Authorization redirect carried a mismatched state parameter.")]
	StateMismatch,
	/// Provider redirected back with an `error` parameter.
	#[error("Authorization was denied by the provider: {description} ({error}).")]
	ProviderDenied {
		/// Provider-supplied `error` code.
		error: String,
		/// Provider-supplied `error_description`, empty when omitted.
		description: String,
	},
	/// Authorization redirect carried neither a code nor an error.
	#[error("Authorization redirect carried no authorization code.")]
	MissingCode,
	/// The prompt callback failed to present the authorize URL.
	#[error("Authorization prompt failed.")]
	Prompt {
		/// Callback failure.
		#[source]
		source: BoxError,
	},
	/// The refresh observer rejected a freshly minted credential.
	#[error("Refresh observer failed; the previous credential was kept.")]
	Observer {
		/// Callback failure.
		#[source]
		source: BoxError,
	},
	/// A resource request hook rejected the request or response.
	#[error("Request hook failed at {stage}.")]
	Hook {
		/// Lifecycle point of the failing hook.
		stage: crate::client::HookStage,
		/// Hook failure.
		#[source]
		source: BoxError,
	},
	/// No authorization redirect arrived within the configured window.
	#[error("No authorization redirect arrived within {waited:?}.")]
	Timeout {
		/// Configured wait window.
		waited: StdDuration,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Built-in provider endpoint could not be parsed.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Redirect URI or resource path cannot be turned into a URL.
	#[error("URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Resource path is an absolute or scheme-relative URL instead of a path under the API base.
	#[error("Resource path `{path}` must be relative to the API base.")]
	ForeignResourcePath {
		/// Rejected path.
		path: String,
	},
	/// Request payload could not be serialized to JSON.
	#[error("Request payload could not be serialized.")]
	Payload {
		/// Serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Credential builder validation failed.
	#[error("Unable to build credential.")]
	CredentialBuild(#[from] crate::auth::CredentialBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured cause.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Loopback listener failures raised by the authorization capture server.
#[derive(Debug, ThisError)]
pub enum ServerError {
	/// The listener could not bind the requested address.
	#[error("Failed to bind the loopback listener on {addr}.")]
	Bind {
		/// Address that was requested.
		addr: String,
		/// Underlying socket failure.
		#[source]
		source: std::io::Error,
	},
	/// The listener failed while waiting for the redirect.
	#[error("Loopback listener failed while waiting for the redirect.")]
	Serve(#[source] std::io::Error),
	/// The listener stopped before producing an outcome.
	#[error("Loopback listener stopped before an authorization outcome was produced.")]
	Aborted,
	/// The flow already produced its single outcome.
	#[error("Authorization flow has already completed.")]
	Completed,
}
