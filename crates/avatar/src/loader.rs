//! Per-slot avatar loading for recycled list rows.
//!
//! The render loop calls [`AvatarLoader::request_avatar`] once per visible
//! row. Each request is checked against the slot's current binding (see
//! [`crate::guard`]); stale work is cancelled before the new task is bound.
//! Results are applied only through [`SlotRegistry::clear_if_current`], so
//! a task that finishes after its slot was recycled is dropped even if it
//! never noticed its cancellation flag.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use roster_worker::{TaskClock, TaskId, WorkerPool, panic_message};

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::guard::{Decision, decide};
use crate::registry::SlotRegistry;
use crate::source::{AvatarSource, Fetch, Key, RenderSink};
use crate::stats::{Counters, LoaderStats, bump};
use crate::task::{AvatarTask, TaskState};

type Item<Src> = <Src as AvatarSource>::Item;
type Bitmap<Src> = <Src as AvatarSource>::Bitmap;

/// What a [`AvatarLoader::request_avatar`] call did. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
	/// A task for the same item was already pending; nothing changed.
	Reused,
	/// The cached-only probe hit and the bitmap was applied inline.
	Ready,
	/// The placeholder is showing and a background task is running.
	Scheduled,
	/// The placeholder is showing; the pool refused the background task.
	/// The next request for this slot tries again.
	Rejected,
	/// The slot was forgotten while the request was in progress.
	Discarded,
}

struct LoaderInner<S, Src: AvatarSource, K> {
	config: LoaderConfig,
	source: Src,
	sink: K,
	registry: Mutex<SlotRegistry<S, Item<Src>>>,
	pool: WorkerPool,
	clock: TaskClock,
	counters: Counters,
}

/// Loads avatars into reusable render slots.
///
/// Cloning yields another handle to the same loader.
pub struct AvatarLoader<S, Src: AvatarSource, K> {
	inner: Arc<LoaderInner<S, Src, K>>,
}

impl<S, Src: AvatarSource, K> Clone for AvatarLoader<S, Src, K> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<S, Src, K> AvatarLoader<S, Src, K>
where
	S: Key,
	Src: AvatarSource,
	K: RenderSink<S, Bitmap<Src>>,
{
	/// Creates a loader with its own pool of `config.max_in_flight` permits.
	pub fn new(config: LoaderConfig, source: Src, sink: K) -> Result<Self> {
		config.validate()?;
		let pool = WorkerPool::new("avatar", config.max_in_flight);
		Ok(Self::with_pool(config, pool, source, sink))
	}

	/// Creates a loader that runs background work on `pool`.
	///
	/// The pool's capacity takes precedence over `config.max_in_flight`.
	pub fn with_pool(config: LoaderConfig, pool: WorkerPool, source: Src, sink: K) -> Self {
		Self {
			inner: Arc::new(LoaderInner {
				config,
				source,
				sink,
				registry: Mutex::new(SlotRegistry::new()),
				pool,
				clock: TaskClock::new(),
				counters: Counters::default(),
			}),
		}
	}

	pub fn config(&self) -> &LoaderConfig {
		&self.inner.config
	}

	pub fn pool(&self) -> &WorkerPool {
		&self.inner.pool
	}

	pub fn source(&self) -> &Src {
		&self.inner.source
	}

	pub fn sink(&self) -> &K {
		&self.inner.sink
	}

	pub fn stats(&self) -> LoaderStats {
		self.inner.counters.snapshot()
	}

	/// Number of slots with pending work.
	pub fn pending_slots(&self) -> usize {
		self.inner.registry.lock().len()
	}

	/// Id and item of the task pending for `slot`.
	pub fn pending(&self, slot: &S) -> Option<(TaskId, Item<Src>)> {
		let registry = self.inner.registry.lock();
		registry.binding_for(slot).map(|task| (task.id(), task.item().clone()))
	}

	/// [`Self::request_avatar`] at the configured size.
	pub fn request_avatar_default(&self, slot: S, item: Item<Src>) -> RequestOutcome {
		self.request_avatar(slot, item, self.inner.config.avatar_size_px)
	}

	/// Makes `slot` show the avatar for `item`.
	///
	/// Never blocks on background work. Repeating a request while the same
	/// item is pending is a no-op.
	pub fn request_avatar(&self, slot: S, item: Item<Src>, size_px: u32) -> RequestOutcome {
		let inner = &self.inner;
		bump(&inner.counters.requests);

		let task = {
			let mut registry = inner.registry.lock();
			match decide(registry.binding_for(&slot), &item) {
				Decision::Reuse => {
					bump(&inner.counters.reused);
					tracing::trace!(?slot, ?item, "avatar.request.reused");
					return RequestOutcome::Reused;
				}
				Decision::Replace(old) => {
					old.cancel();
					bump(&inner.counters.cancelled);
					tracing::trace!(?slot, task = %old.id(), item = ?old.item(), "avatar.cancel");
				}
				Decision::Start => {}
			}
			let task = AvatarTask::new(inner.clock.next(), item, size_px);
			registry.bind(slot.clone(), task.clone());
			task
		};
		bump(&inner.counters.started);
		tracing::trace!(?slot, task = %task.id(), item = ?task.item(), size_px, "avatar.request");

		if let Some(bitmap) = inner.probe(&slot, &task) {
			return inner.finish_inline(&slot, &task, bitmap);
		}

		{
			let registry = inner.registry.lock();
			if registry.binding_for(&slot) != Some(&task) {
				task.resolve(TaskState::Cancelled);
				return RequestOutcome::Discarded;
			}
			inner.sink.apply_placeholder(&slot, inner.source.placeholder_color(task.item()));
		}

		let work = {
			let inner = Arc::clone(inner);
			let task = task.clone();
			move || inner.compute(&task)
		};
		let done = {
			let inner = Arc::clone(inner);
			let task = task.clone();
			let slot = slot.clone();
			move |output: Option<Option<Bitmap<Src>>>| inner.complete(&slot, &task, output.flatten())
		};

		match inner.pool.try_spawn(work, done) {
			Ok(()) => RequestOutcome::Scheduled,
			Err(error) => {
				inner.registry.lock().clear_if_current(&slot, &task);
				task.resolve(TaskState::Rejected);
				bump(&inner.counters.rejected);
				tracing::debug!(?slot, task = %task.id(), %error, "avatar.rejected");
				RequestOutcome::Rejected
			}
		}
	}

	/// Drops whatever `slot` is waiting for, e.g. when the row is torn down.
	///
	/// Returns true if a task was pending.
	pub fn forget_slot(&self, slot: &S) -> bool {
		let Some(task) = self.inner.registry.lock().unbind(slot) else {
			return false;
		};
		task.cancel();
		bump(&self.inner.counters.cancelled);
		tracing::trace!(?slot, task = %task.id(), "avatar.forget");
		true
	}

	/// Cancels all pending work and closes the pool.
	///
	/// Later requests still probe the cache but never start background work.
	pub fn shutdown(&self) {
		let drained = self.inner.registry.lock().drain();
		for (_, task) in &drained {
			task.cancel();
			bump(&self.inner.counters.cancelled);
		}
		self.inner.pool.close();
		tracing::debug!(cancelled = drained.len(), "avatar.shutdown");
	}
}

impl<S, Src, K> LoaderInner<S, Src, K>
where
	S: Key,
	Src: AvatarSource,
	K: RenderSink<S, Bitmap<Src>>,
{
	/// Render-thread side. A panicking probe counts as a miss so the slot
	/// still gets its placeholder and the slow path.
	fn probe(&self, slot: &S, task: &AvatarTask<Item<Src>>) -> Option<Bitmap<Src>> {
		let probe = catch_unwind(AssertUnwindSafe(|| {
			self.source.get(task.item(), task.size_px(), Fetch::CachedOnly, task.cancel_flag())
		}));
		probe.unwrap_or_else(|payload| {
			let message = panic_message(&*payload).unwrap_or_default();
			tracing::warn!(?slot, task = %task.id(), %message, "avatar.probe_panicked");
			None
		})
	}

	fn finish_inline(&self, slot: &S, task: &AvatarTask<Item<Src>>, bitmap: Bitmap<Src>) -> RequestOutcome {
		let mut registry = self.registry.lock();
		if !registry.clear_if_current(slot, task) || !task.resolve(TaskState::Completed) {
			task.resolve(TaskState::Cancelled);
			return RequestOutcome::Discarded;
		}
		self.sink.apply(slot, bitmap);
		bump(&self.counters.fast_hits);
		tracing::trace!(?slot, task = %task.id(), "avatar.fast_hit");
		RequestOutcome::Ready
	}

	/// Pool side. Skips the source entirely if the task was cancelled
	/// while queued.
	fn compute(&self, task: &AvatarTask<Item<Src>>) -> Option<Bitmap<Src>> {
		if task.is_cancelled() {
			return None;
		}
		self.source.get(task.item(), task.size_px(), Fetch::Compute, task.cancel_flag())
	}

	fn complete(&self, slot: &S, task: &AvatarTask<Item<Src>>, bitmap: Option<Bitmap<Src>>) {
		let mut registry = self.registry.lock();
		if !registry.clear_if_current(slot, task) || task.is_cancelled() {
			task.resolve(TaskState::Cancelled);
			bump(&self.counters.stale);
			tracing::trace!(?slot, task = %task.id(), "avatar.stale");
			return;
		}

		match bitmap {
			Some(bitmap) => {
				if task.resolve(TaskState::Completed) {
					self.sink.apply(slot, bitmap);
					bump(&self.counters.applied);
					tracing::trace!(?slot, task = %task.id(), "avatar.apply");
				}
			}
			None => {
				task.resolve(TaskState::Empty);
				bump(&self.counters.empty);
				tracing::trace!(?slot, task = %task.id(), item = ?task.item(), "avatar.empty");
			}
		}
	}
}
