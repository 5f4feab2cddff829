// self
use crate::{_prelude::*, error::RefreshFailure, obs::CallKind, store::StoreError};

/// Future returned by [`CallSpan::instrument`]: wrapped in the span under `tracing`.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`CallSpan::instrument`]: the input future itself.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// `paydash.call` span covering one executed call.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens the span for `kind`, naming the client method in `stage`.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("paydash.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span; nothing is entered while the future is idle.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event for a session that could not be renewed.
pub fn record_session_expired(reason: &RefreshFailure) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%reason, "Session expired; stored tokens were cleared.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}

/// Emits an `error` event when expiring a session could not wipe the stored tokens.
pub fn record_token_clear_failed(error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(%error, "Failed to clear stored tokens after session expiry.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

/// Emits a `debug` event when a caller joins an in-flight refresh instead of starting one.
pub fn record_refresh_coalesced(waiters: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(waiters, "Joined in-flight refresh exchange.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = waiters;
	}
}
