//! Optional observability helpers for the authorization, exchange, refresh, and API flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `freee_oauth.flow` with the `flow` and
//!   `stage` (call site) fields, `port` for the loopback listener, and `status` for the last
//!   HTTP response, plus debug events from the listener.
//! - Enable `metrics` to increment the `freee_oauth_flow_total` counter for every attempt,
//!   success, and failure, and to record `freee_oauth_flow_duration_seconds`. Both are labeled
//!   by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Capture followed by the code exchange.
	Authorize,
	/// Loopback listener waiting for the redirect.
	Capture,
	/// Single token endpoint call.
	Exchange,
	/// Token manager refresh, observer included.
	Refresh,
	/// Authenticated resource API request.
	ApiCall,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::Capture => "capture",
			FlowKind::Exchange => "exchange",
			FlowKind::Refresh => "refresh",
			FlowKind::ApiCall => "api_call",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an instrumented operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::ApiCall.to_string(), "api_call");
		assert_eq!(FlowKind::Exchange.as_str(), "exchange");
		assert_eq!(FlowOutcome::Failure.to_string(), "failure");
	}
}
