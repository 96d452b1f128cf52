// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for session renewals.
#[derive(Debug, Default)]
pub struct SessionMetrics {
	logins: AtomicU64,
	extensions: AtomicU64,
	failures: AtomicU64,
}
impl SessionMetrics {
	/// Returns the number of login calls issued.
	pub fn logins(&self) -> u64 {
		self.logins.load(Ordering::Relaxed)
	}

	/// Returns the number of extend calls issued.
	pub fn extensions(&self) -> u64 {
		self.extensions.load(Ordering::Relaxed)
	}

	/// Returns the number of login/extend calls that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_login(&self) {
		self.logins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_extension(&self) {
		self.extensions.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
