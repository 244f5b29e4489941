use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Identifier handed out by a [`TaskClock`].
///
/// Ids are unique per clock and strictly increasing in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
	/// Returns the raw id.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Monotonic id clock for background tasks.
///
/// Clones share the same counter.
#[derive(Debug, Default, Clone)]
pub struct TaskClock {
	next: Arc<AtomicU64>,
}

impl TaskClock {
	/// Creates a new clock whose first id is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next task id.
	pub fn next(&self) -> TaskId {
		TaskId(self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}
}

/// Cooperative cancellation flag shared between a task's owner and the code
/// running it.
///
/// Blocking work polls [`CancelFlag::is_cancelled`] at its own checkpoints;
/// nothing is preempted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
	cancel: CancellationToken,
}

impl CancelFlag {
	/// Creates a flag that is not cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true once cancellation has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation. Idempotent.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}
}
