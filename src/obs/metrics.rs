// self
use crate::obs::{CallKind, CallOutcome};

/// Bumps `attendance_client_call_total{call, outcome}` on the global recorder.
///
/// Compiles to nothing without the `metrics` feature. Per-client refresh counts that tests and
/// callers can read back live in [`RefreshMetrics`](crate::client::RefreshMetrics) instead.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"attendance_client_call_total",
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
