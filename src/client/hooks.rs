//! Caller-supplied hooks run around every resource API request.

// crates.io
use oauth2::{HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Hook that may rewrite (or veto) an outbound request after the bearer header is set.
pub type BeforeRequest = Arc<dyn Fn(HttpRequest) -> Result<HttpRequest, BoxError> + Send + Sync>;
/// Hook that may rewrite (or veto) a response before its status is classified.
pub type AfterResponse =
	Arc<dyn Fn(HttpResponse) -> Result<HttpResponse, BoxError> + Send + Sync>;

/// Ordered request/response hooks for [`Client`](crate::client::Client).
///
/// Hooks run in registration order. The first failing hook aborts the call with
/// [`Error::Hook`]; a failing before-request hook means nothing is sent.
#[derive(Clone, Default)]
pub struct RequestHooks {
	before_request: Vec<BeforeRequest>,
	after_response: Vec<AfterResponse>,
}
impl RequestHooks {
	/// Appends a before-request hook.
	pub fn before_request<F>(mut self, hook: F) -> Self
	where
		F: 'static + Send + Sync + Fn(HttpRequest) -> Result<HttpRequest, BoxError>,
	{
		self.before_request.push(Arc::new(hook));

		self
	}

	/// Appends an after-response hook.
	pub fn after_response<F>(mut self, hook: F) -> Self
	where
		F: 'static + Send + Sync + Fn(HttpResponse) -> Result<HttpResponse, BoxError>,
	{
		self.after_response.push(Arc::new(hook));

		self
	}

	/// Returns `true` if no hook is registered.
	pub fn is_empty(&self) -> bool {
		self.before_request.is_empty() && self.after_response.is_empty()
	}

	pub(crate) fn extend(&mut self, other: RequestHooks) {
		self.before_request.extend(other.before_request);
		self.after_response.extend(other.after_response);
	}

	pub(crate) fn run_before(&self, request: HttpRequest) -> Result<HttpRequest> {
		self.before_request.iter().try_fold(request, |request, hook| {
			hook(request).map_err(|source| Error::Hook { stage: HookStage::BeforeRequest, source })
		})
	}

	pub(crate) fn run_after(&self, response: HttpResponse) -> Result<HttpResponse> {
		self.after_response.iter().try_fold(response, |response, hook| {
			hook(response).map_err(|source| Error::Hook { stage: HookStage::AfterResponse, source })
		})
	}
}
impl Debug for RequestHooks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestHooks")
			.field("before_request", &self.before_request.len())
			.field("after_response", &self.after_response.len())
			.finish()
	}
}

/// Point in the request lifecycle at which a hook failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
	/// Before the request was sent.
	BeforeRequest,
	/// After the response arrived, before its status was classified.
	AfterResponse,
}
impl Display for HookStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			Self::BeforeRequest => "before_request",
			Self::AfterResponse => "after_response",
		})
	}
}
