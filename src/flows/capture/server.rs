// std
use std::io;
// crates.io
use axum::{
	Router,
	extract::{RawQuery, State},
	http::StatusCode,
	routing::get,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	error::ServerError,
	flows::capture::{AuthorizationSession, Page, RedirectParams, Renderer},
};

const SHUTDOWN_GRACE: StdDuration = StdDuration::from_secs(5);

struct Handoff {
	outcome: oneshot::Sender<Result<String>>,
	shutdown: oneshot::Sender<()>,
}

struct CaptureState {
	session: AuthorizationSession,
	renderer: Arc<dyn Renderer>,
	// Taken by the first redirect; `None` afterwards.
	slot: Mutex<Option<Handoff>>,
}

/// Running loopback listener. Dropping it aborts the serving task and frees the port.
pub(super) struct CaptureServer {
	state: Arc<CaptureState>,
	task: Option<JoinHandle<io::Result<()>>>,
}
impl CaptureServer {
	/// Starts serving on `listener`; the receiver resolves with the first redirect's outcome.
	pub(super) fn spawn(
		listener: TcpListener,
		session: AuthorizationSession,
		renderer: Arc<dyn Renderer>,
	) -> (Self, oneshot::Receiver<Result<String>>) {
		let (outcome_tx, outcome_rx) = oneshot::channel();
		let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
		let state = Arc::new(CaptureState {
			session,
			renderer,
			slot: Mutex::new(Some(Handoff { outcome: outcome_tx, shutdown: shutdown_tx })),
		});
		let app = Router::new()
			.route("/", get(handle_redirect))
			.fallback(not_found)
			.with_state(state.clone());
		let task = tokio::spawn(async move {
			axum::serve(listener, app)
				.with_graceful_shutdown(async move {
					let _ = shutdown_rx.await;
				})
				.await
		});

		(Self { state, task: Some(task) }, outcome_rx)
	}

	/// Resolves only if the serving task ends on its own.
	pub(super) async fn exited(&mut self) -> Error {
		let Some(task) = self.task.as_mut() else {
			return std::future::pending().await;
		};
		let joined = task.await;

		self.task = None;

		match joined {
			Ok(Err(e)) => ServerError::Serve(e).into(),
			Ok(Ok(())) | Err(_) => ServerError::Aborted.into(),
		}
	}

	/// Stops accepting, lets in-flight responses finish, and waits for the port to be released.
	pub(super) async fn shutdown(mut self) {
		// Dropping the handoff fires the shutdown signal if no redirect did.
		drop(self.state.slot.lock().take());

		let Some(mut task) = self.task.take() else { return };

		if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
			#[cfg(feature = "tracing")]
			tracing::warn!("loopback listener did not drain in time; aborting");

			task.abort();

			let _ = task.await;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!("loopback listener stopped");
	}
}
impl Drop for CaptureServer {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}

async fn handle_redirect(
	State(state): State<Arc<CaptureState>>,
	RawQuery(query): RawQuery,
) -> Page {
	let Some(handoff) = state.slot.lock().take() else {
		#[cfg(feature = "tracing")]
		tracing::debug!("redirect arrived after the flow completed");

		let completed = Error::from(ServerError::Completed);

		return state.renderer.render(Err(&completed));
	};
	let params = RedirectParams::parse(query.as_deref().unwrap_or_default());
	let outcome = state.session.evaluate(&params);
	let page = state.renderer.render(outcome.as_deref());

	#[cfg(feature = "tracing")]
	{
		match &outcome {
			Ok(_) => tracing::debug!("authorization code captured"),
			Err(e) => tracing::debug!(error = %e, "authorization redirect rejected"),
		}
	}

	// The receiver may already be gone if the caller timed out or was dropped.
	let _ = handoff.outcome.send(outcome);
	let _ = handoff.shutdown.send(());

	page
}

async fn not_found() -> StatusCode {
	StatusCode::NOT_FOUND
}
