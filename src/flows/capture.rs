//! Single-use loopback listener that captures one authorization code.
//!
//! The flow binds `localhost:<port>`, hands the authorize URL to a [`Prompt`], and serves
//! `GET /` until the first redirect is classified. That redirect decides the outcome; the
//! listener then shuts down gracefully and the port is released on every exit path.

mod options;
mod server;
mod session;

pub use options::*;
pub use session::*;

// crates.io
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	error::ServerError,
	flows::{OAuthClient, capture::server::CaptureServer},
	http::HttpTransport,
	obs::{FlowKind, FlowSpan},
};

impl<C> OAuthClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Binds `localhost:port` and waits for the authorization redirect.
	///
	/// Returns the captured code, or the first redirect's failure.
	pub async fn capture_code(&self, port: u16, options: &AuthorizeOptions) -> Result<String> {
		let listener = bind(port).await?;

		self.capture_code_with_listener(listener, options).await
	}

	/// Same as [`OAuthClient::capture_code`] on a listener the caller already bound.
	///
	/// The redirect URI is derived from the listener's local port.
	pub async fn capture_code_with_listener(
		&self,
		listener: TcpListener,
		options: &AuthorizeOptions,
	) -> Result<String> {
		self.capture_redirect(listener, options).await.map(|captured| captured.code)
	}

	pub(crate) async fn capture_redirect(
		&self,
		listener: TcpListener,
		options: &AuthorizeOptions,
	) -> Result<CapturedCode> {
		let span = FlowSpan::new(FlowKind::Capture, "capture_code");

		if let Ok(addr) = listener.local_addr() {
			span.record_port(addr.port());
		}

		span.observe(self.run_capture(listener, options)).await
	}

	async fn run_capture(
		&self,
		listener: TcpListener,
		options: &AuthorizeOptions,
	) -> Result<CapturedCode> {
		let port = listener.local_addr().map_err(ServerError::Serve)?.port();
		let session = AuthorizationSession::new(&self.descriptor, &self.client_id, port)?;
		let redirect_uri = session.redirect_uri.clone();

		// The listener is dropped on return, so a failed prompt frees the port.
		options.prompt.prompt(&session.authorize_url).map_err(|source| Error::Prompt { source })?;

		#[cfg(feature = "tracing")]
		tracing::debug!(port, "waiting for the authorization redirect");

		let (mut server, mut outcome_rx) =
			CaptureServer::spawn(listener, session, options.renderer.clone());
		let wait = async {
			tokio::select! {
				biased;

				outcome = &mut outcome_rx => outcome.unwrap_or_else(|_| Err(ServerError::Aborted.into())),
				err = server.exited() => Err(err),
			}
		};
		let result = match options.timeout {
			Some(waited) =>
				tokio::time::timeout(waited, wait).await.unwrap_or(Err(Error::Timeout { waited })),
			None => wait.await,
		};

		server.shutdown().await;

		result.map(|code| CapturedCode { code, redirect_uri })
	}
}

/// Code captured on the listener, with the redirect URI it must be exchanged against.
#[derive(Debug)]
pub(crate) struct CapturedCode {
	pub(crate) code: String,
	pub(crate) redirect_uri: Url,
}

pub(crate) async fn bind(port: u16) -> Result<TcpListener> {
	let listener = TcpListener::bind(("localhost", port))
		.await
		.map_err(|source| ServerError::Bind { addr: format!("localhost:{port}"), source })?;

	#[cfg(feature = "tracing")]
	tracing::debug!(port, "loopback listener bound");

	Ok(listener)
}
