// std
use std::io::Write;
// crates.io
use axum::{
	http::{StatusCode, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

const SUCCESS_BODY: &str = "Authorization succeeded. You may close this browser window.";
const FAILURE_BODY: &str =
	"Authorization failed. Close this browser window and run the application again.";

/// Presents the authorize URL to the user.
///
/// Called once per flow after the listener is bound and before any redirect can arrive.
/// Returning an error aborts the flow with [`Error::Prompt`].
pub trait Prompt
where
	Self: Send + Sync,
{
	/// Shows `authorize_url` to the user.
	fn prompt(&self, authorize_url: &Url) -> Result<(), BoxError>;
}
impl<F> Prompt for F
where
	F: Send + Sync + Fn(&Url) -> Result<(), BoxError>,
{
	fn prompt(&self, authorize_url: &Url) -> Result<(), BoxError> {
		self(authorize_url)
	}
}

/// Default prompt: prints instructions and the URL to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsolePrompt;
impl Prompt for ConsolePrompt {
	fn prompt(&self, authorize_url: &Url) -> Result<(), BoxError> {
		let mut stdout = std::io::stdout().lock();

		writeln!(stdout, "Open the following URL in your browser and authorize the application:")?;
		writeln!(stdout, "{authorize_url}")?;
		stdout.flush()?;

		Ok(())
	}
}

/// Renders the page shown in the browser once the redirect has been classified.
pub trait Renderer
where
	Self: Send + Sync,
{
	/// Builds the page for `outcome`: the code on success, the flow error otherwise.
	fn render(&self, outcome: Result<&str, &Error>) -> Page;
}
impl<F> Renderer for F
where
	F: Send + Sync + Fn(Result<&str, &Error>) -> Page,
{
	fn render(&self, outcome: Result<&str, &Error>) -> Page {
		self(outcome)
	}
}

/// Default renderer: fixed plain-text pages, always `200 OK`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextRenderer;
impl Renderer for PlainTextRenderer {
	fn render(&self, outcome: Result<&str, &Error>) -> Page {
		Page::text(if outcome.is_ok() { SUCCESS_BODY } else { FAILURE_BODY })
	}
}

/// Browser-facing response produced by a [`Renderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value.
	pub content_type: String,
	/// Response body.
	pub body: Vec<u8>,
}
impl Page {
	/// `200 OK` plain-text page.
	pub fn text(body: impl Into<String>) -> Self {
		Self {
			status: 200,
			content_type: "text/plain; charset=UTF-8".into(),
			body: body.into().into_bytes(),
		}
	}

	/// `200 OK` HTML page.
	pub fn html(body: impl Into<String>) -> Self {
		Self {
			status: 200,
			content_type: "text/html; charset=UTF-8".into(),
			body: body.into().into_bytes(),
		}
	}

	/// Overrides the status code.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = status;

		self
	}
}
impl IntoResponse for Page {
	fn into_response(self) -> Response {
		let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);

		(status, [(CONTENT_TYPE, self.content_type)], self.body).into_response()
	}
}

/// Knobs for a single authorization capture.
#[derive(Clone)]
pub struct AuthorizeOptions {
	/// Presents the authorize URL.
	pub prompt: Arc<dyn Prompt>,
	/// Renders the browser page.
	pub renderer: Arc<dyn Renderer>,
	/// Upper bound on the wait for the redirect; `None` waits indefinitely.
	pub timeout: Option<StdDuration>,
}
impl AuthorizeOptions {
	/// Replaces the prompt.
	pub fn with_prompt<P>(mut self, prompt: P) -> Self
	where
		P: 'static + Prompt,
	{
		self.prompt = Arc::new(prompt);

		self
	}

	/// Replaces the prompt with a closure.
	pub fn with_prompt_fn<F>(self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Url) -> Result<(), BoxError>,
	{
		self.with_prompt(f)
	}

	/// Replaces the renderer.
	pub fn with_renderer<R>(mut self, renderer: R) -> Self
	where
		R: 'static + Renderer,
	{
		self.renderer = Arc::new(renderer);

		self
	}

	/// Replaces the renderer with a closure.
	pub fn with_renderer_fn<F>(self, f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(Result<&str, &Error>) -> Page,
	{
		self.with_renderer(f)
	}

	/// Bounds the wait for the redirect.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}
impl Default for AuthorizeOptions {
	fn default() -> Self {
		Self { prompt: Arc::new(ConsolePrompt), renderer: Arc::new(PlainTextRenderer), timeout: None }
	}
}
impl Debug for AuthorizeOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizeOptions")
			.field("prompt", &"<callback>")
			.field("renderer", &"<callback>")
			.field("timeout", &self.timeout)
			.finish()
	}
}
