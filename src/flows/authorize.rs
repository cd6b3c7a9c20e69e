//! One-call authorization: capture the code on the loopback listener, then exchange it.

// crates.io
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	flows::{AuthorizeOptions, OAuthClient, capture},
	http::HttpTransport,
	obs::{FlowKind, FlowSpan},
};

impl<C> OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Runs the full interactive flow on `localhost:port` and returns the minted credential.
	///
	/// Port `0` picks an ephemeral port; the code is exchanged against the port actually bound.
	pub async fn authorize(&self, port: u16, options: &AuthorizeOptions) -> Result<Credential> {
		instrumented(async {
			let listener = capture::bind(port).await?;

			self.capture_and_exchange(listener, options).await
		})
		.await
	}

	/// Same as [`OAuthClient::authorize`] on a listener the caller already bound.
	pub async fn authorize_with_listener(
		&self,
		listener: TcpListener,
		options: &AuthorizeOptions,
	) -> Result<Credential> {
		instrumented(self.capture_and_exchange(listener, options)).await
	}

	async fn capture_and_exchange(
		&self,
		listener: TcpListener,
		options: &AuthorizeOptions,
	) -> Result<Credential> {
		let captured = self.capture_redirect(listener, options).await?;

		self.exchange_code(captured.code, captured.redirect_uri).await
	}
}

async fn instrumented<F>(flow: F) -> Result<Credential>
where
	F: Future<Output = Result<Credential>>,
{
	FlowSpan::new(FlowKind::Authorize, "authorize").observe(flow).await
}
