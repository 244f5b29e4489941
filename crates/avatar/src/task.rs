use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use roster_worker::{CancelFlag, TaskId};

/// Lifecycle of an [`AvatarTask`].
///
/// A task leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
	Pending = 0,
	/// A bitmap was produced and handed to the sink.
	Completed = 1,
	/// The source had nothing for this item; the placeholder stays.
	Empty = 2,
	/// Superseded, forgotten or shut down before its result could be applied.
	Cancelled = 3,
	/// The pool refused the background job.
	Rejected = 4,
}

impl TaskState {
	fn from_u8(raw: u8) -> Self {
		match raw {
			0 => Self::Pending,
			1 => Self::Completed,
			2 => Self::Empty,
			3 => Self::Cancelled,
			_ => Self::Rejected,
		}
	}
}

struct TaskInner<I> {
	id: TaskId,
	item: I,
	size_px: u32,
	cancel: CancelFlag,
	state: AtomicU8,
}

/// One "compute the avatar for `item` at `size_px`" unit of work.
///
/// Cheap to clone; clones share cancellation and state. Two handles are
/// equal when they refer to the same task, regardless of item.
pub struct AvatarTask<I> {
	inner: Arc<TaskInner<I>>,
}

impl<I> Clone for AvatarTask<I> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<I> PartialEq for AvatarTask<I> {
	fn eq(&self, other: &Self) -> bool {
		self.inner.id == other.inner.id
	}
}

impl<I> Eq for AvatarTask<I> {}

impl<I: fmt::Debug> fmt::Debug for AvatarTask<I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AvatarTask")
			.field("id", &self.inner.id)
			.field("item", &self.inner.item)
			.field("size_px", &self.inner.size_px)
			.field("cancelled", &self.is_cancelled())
			.field("state", &self.state())
			.finish()
	}
}

impl<I> AvatarTask<I> {
	pub(crate) fn new(id: TaskId, item: I, size_px: u32) -> Self {
		Self {
			inner: Arc::new(TaskInner {
				id,
				item,
				size_px,
				cancel: CancelFlag::new(),
				state: AtomicU8::new(TaskState::Pending as u8),
			}),
		}
	}

	pub fn id(&self) -> TaskId {
		self.inner.id
	}

	pub fn item(&self) -> &I {
		&self.inner.item
	}

	pub fn size_px(&self) -> u32 {
		self.inner.size_px
	}

	/// Flag handed to the avatar source.
	pub fn cancel_flag(&self) -> &CancelFlag {
		&self.inner.cancel
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.cancel.is_cancelled()
	}

	/// Requests cooperative cancellation. Does not resolve the task.
	pub(crate) fn cancel(&self) {
		self.inner.cancel.cancel();
	}

	pub fn state(&self) -> TaskState {
		TaskState::from_u8(self.inner.state.load(Ordering::Acquire))
	}

	/// Moves the task out of `Pending`. Returns false if it already left.
	pub(crate) fn resolve(&self, outcome: TaskState) -> bool {
		debug_assert_ne!(outcome, TaskState::Pending);
		self.inner
			.state
			.compare_exchange(TaskState::Pending as u8, outcome as u8, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
	}
}
