// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{_prelude::*, obs::CallKind};

/// Explicit error counter fed by every error-reporting path of the client.
///
/// Each [`record`](ErrorCounter::record) call emits one `error` event and bumps the counter,
/// so an end-of-run summary never needs to scrape logs.
#[derive(Debug, Default)]
pub struct ErrorCounter {
	count: AtomicU64,
}
impl ErrorCounter {
	/// Logs an error for the given call kind and counts it.
	pub fn record(&self, kind: CallKind, message: impl Display) {
		self.count.fetch_add(1, Ordering::Relaxed);

		tracing::error!(call = kind.as_str(), "{message}");
	}

	/// Returns the number of errors recorded so far.
	pub fn count(&self) -> u64 {
		self.count.load(Ordering::Relaxed)
	}

	/// Summary line for end-of-run reporting; `None` when nothing failed.
	pub fn report(&self) -> Option<String> {
		match self.count() {
			0 => None,
			n => Some(format!("API responded with {n} error(s)")),
		}
	}
}
