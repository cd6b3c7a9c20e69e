// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome},
};

/// Span for one instrumented operation.
///
/// With `tracing` enabled the span is `freee_oauth.flow` carrying `flow` and `stage`, plus
/// `port` (loopback listener) and `status` (last HTTP status) once they are known.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at the given call site.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"freee_oauth.flow",
				flow = kind.as_str(),
				stage,
				port = tracing::field::Empty,
				status = tracing::field::Empty,
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Flow kind this span reports under.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// Records the loopback port the listener is bound to.
	pub fn record_port(&self, port: u16) {
		#[cfg(feature = "tracing")]
		self.span.record("port", port);
		#[cfg(not(feature = "tracing"))]
		let _ = port;
	}

	/// Records the HTTP status of the response being classified.
	pub fn record_status(&self, status: u16) {
		#[cfg(feature = "tracing")]
		self.span.record("status", status);
		#[cfg(not(feature = "tracing"))]
		let _ = status;
	}

	/// Runs `flow` inside the span and reports its attempt, outcome, and duration.
	pub async fn observe<T, F>(&self, flow: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let started = Instant::now();

		obs::record_flow_outcome(self.kind, FlowOutcome::Attempt);

		#[cfg(feature = "tracing")]
		let result = {
			use tracing::Instrument;

			flow.instrument(self.span.clone()).await
		};
		#[cfg(not(feature = "tracing"))]
		let result = flow.await;

		let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

		obs::record_flow_outcome(self.kind, outcome);
		obs::record_flow_duration(self.kind, outcome, started.elapsed());

		#[cfg(feature = "tracing")]
		if let Err(e) = &result {
			self.span.in_scope(|| tracing::debug!(error = %e, "flow failed"));
		}

		result
	}
}
