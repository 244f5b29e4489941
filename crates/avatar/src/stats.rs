use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of loader counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
	/// Calls to `request_avatar`.
	pub requests: u64,
	/// Requests answered by a task already pending for the same item.
	pub reused: u64,
	/// Tasks created.
	pub started: u64,
	/// Tasks satisfied by the cached-only probe on the render thread.
	pub fast_hits: u64,
	/// Background results painted into their slot.
	pub applied: u64,
	/// Tasks whose source had nothing to show.
	pub empty: u64,
	/// Background results discarded because their slot moved on.
	pub stale: u64,
	/// Cancellation requests issued to pending tasks.
	pub cancelled: u64,
	/// Background jobs the pool refused.
	pub rejected: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
	pub requests: AtomicU64,
	pub reused: AtomicU64,
	pub started: AtomicU64,
	pub fast_hits: AtomicU64,
	pub applied: AtomicU64,
	pub empty: AtomicU64,
	pub stale: AtomicU64,
	pub cancelled: AtomicU64,
	pub rejected: AtomicU64,
}

pub(crate) fn bump(counter: &AtomicU64) {
	counter.fetch_add(1, Ordering::Relaxed);
}

impl Counters {
	pub fn snapshot(&self) -> LoaderStats {
		let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
		LoaderStats {
			requests: load(&self.requests),
			reused: load(&self.reused),
			started: load(&self.started),
			fast_hits: load(&self.fast_hits),
			applied: load(&self.applied),
			empty: load(&self.empty),
			stale: load(&self.stale),
			cancelled: load(&self.cancelled),
			rejected: load(&self.rejected),
		}
	}
}
