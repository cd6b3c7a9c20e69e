//! Thread-safe credential holder with lazy refresh.
//!
//! [`TokenManager`] owns the current [`Credential`] behind an async mutex. Every
//! [`TokenManager::valid_token`] call runs check, refresh, and store as one critical
//! section, so concurrent callers arriving at expiry trigger a single `refresh_token`
//! exchange and the rest receive its result. A refresh only replaces the held
//! credential once the optional observer has accepted it; on any failure the previous
//! credential stays in place and the next call retries.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::Credential,
	flows::OAuthClient,
	http::HttpTransport,
	obs::{FlowKind, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Manager specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestTokenManager = TokenManager<ReqwestHttpClient>;

/// Callback invoked with every freshly minted credential before it is installed.
///
/// Typically persists the credential. An error vetoes the swap.
pub type RefreshObserver = Arc<dyn Fn(&Credential) -> Result<(), BoxError> + Send + Sync>;

/// Holds one credential and refreshes it on demand.
pub struct TokenManager<C>
where
	C: ?Sized + HttpTransport,
{
	client: Arc<OAuthClient<C>>,
	credential: AsyncMutex<Credential>,
	observer: RwLock<Option<RefreshObserver>>,
	metrics: RefreshMetrics,
}
impl<C> TokenManager<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a manager seeded with `credential`.
	pub fn new(client: impl Into<Arc<OAuthClient<C>>>, credential: Credential) -> Self {
		Self {
			client: client.into(),
			credential: AsyncMutex::new(credential),
			observer: RwLock::new(None),
			metrics: RefreshMetrics::default(),
		}
	}

	/// Installs `observer`, replacing any previous one.
	pub fn set_refresh_observer<F>(&self, observer: F)
	where
		F: 'static + Send + Sync + Fn(&Credential) -> Result<(), BoxError>,
	{
		*self.observer.write() = Some(Arc::new(observer));
	}

	/// Removes the observer.
	pub fn clear_refresh_observer(&self) {
		*self.observer.write() = None;
	}

	/// Returns a credential valid at the current instant, refreshing it first if needed.
	pub async fn valid_token(&self) -> Result<Credential> {
		self.valid_token_at(OffsetDateTime::now_utc()).await
	}

	/// Returns a credential valid at `now`, refreshing it first if needed.
	pub async fn valid_token_at(&self, now: OffsetDateTime) -> Result<Credential> {
		let mut held = self.credential.lock().await;

		if !held.is_expired_at(now) {
			return Ok(held.clone());
		}

		self.metrics.record_attempt();

		let span = FlowSpan::new(FlowKind::Refresh, "valid_token");

		match span.observe(self.refresh(&held)).await {
			Ok(fresh) => {
				*held = fresh.clone();

				self.metrics.record_success();

				Ok(fresh)
			},
			Err(e) => {
				self.metrics.record_failure();

				Err(e)
			},
		}
	}

	/// Snapshot of the held credential. Waits for an in-flight refresh to settle.
	pub async fn credential(&self) -> Credential {
		self.credential.lock().await.clone()
	}

	/// Refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Client used for refresh exchanges.
	pub fn oauth_client(&self) -> &Arc<OAuthClient<C>> {
		&self.client
	}

	async fn refresh(&self, current: &Credential) -> Result<Credential> {
		let fresh = self.client.refresh_credential(&current.refresh_token).await?;
		let observer = self.observer.read().clone();

		if let Some(observer) = observer {
			observer(&fresh).map_err(|source| Error::Observer { source })?;
		}

		Ok(fresh)
	}
}
impl<C> Debug for TokenManager<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("client", &self.client)
			.field("observer", &self.observer.read().as_ref().map(|_| "<callback>"))
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}
