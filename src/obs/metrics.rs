// self
use crate::obs::{self, CallKind, CallOutcome, TokenSource};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"zai_sdk_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a token issuance via the global metrics recorder and tracing (when enabled).
pub fn record_token_issue(source: TokenSource) {
	obs::trace_token_issue(source);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("zai_sdk_token_issue_total", "source" => source.as_str()).increment(1);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_installed_recorder() {
		record_call_outcome(CallKind::Stream, CallOutcome::Failure);
		record_token_issue(TokenSource::Signed);
	}
}
