// self
use crate::{
	_prelude::*,
	obs::{CallKind, TokenSource},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by transport calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the call shape and request path.
	pub fn new(kind: CallKind, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("zai_sdk.call", call = kind.as_str(), path);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
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

/// Emits a debug event describing where a token came from.
pub(crate) fn trace_token_issue(source: TokenSource) {
	#[cfg(feature = "tracing")]
	tracing::debug!(source = source.as_str(), "authentication token issued");
	#[cfg(not(feature = "tracing"))]
	let _ = source;
}

/// Emits a debug event for a non-success HTTP status.
pub(crate) fn trace_failed_status(status: u16) {
	#[cfg(feature = "tracing")]
	tracing::debug!(status, "API responded with a failure status");
	#[cfg(not(feature = "tracing"))]
	let _ = status;
}
