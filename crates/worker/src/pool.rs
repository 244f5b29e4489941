use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::{Semaphore, TryAcquireError};

use crate::panic::panic_message;
use crate::spawn::runtime_handle;

/// Errors returned when a pool refuses new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
	/// Every slot of the pool is occupied. The work was not queued.
	#[error("worker pool saturated ({capacity} jobs in flight)")]
	Saturated { capacity: usize },
	/// The pool was closed and accepts no further work.
	#[error("worker pool closed")]
	Closed,
}

struct PoolInner {
	name: String,
	handle: tokio::runtime::Handle,
	permits: Arc<Semaphore>,
	capacity: usize,
	in_flight: Mutex<usize>,
	idle: Condvar,
}

/// Bounded pool for blocking jobs with a completion callback.
///
/// Admission is non-blocking: a job either gets one of `capacity` permits
/// immediately or is rejected with [`PoolError::Saturated`]. Admitted jobs
/// run on the tokio blocking pool. The completion callback runs on the same
/// blocking thread right after the job returns or panics, so it may take
/// locks without stalling the runtime's async workers.
#[derive(Clone)]
pub struct WorkerPool {
	inner: Arc<PoolInner>,
}

impl std::fmt::Debug for WorkerPool {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WorkerPool")
			.field("name", &self.inner.name)
			.field("capacity", &self.inner.capacity)
			.field("in_flight", &self.in_flight())
			.field("closed", &self.is_closed())
			.finish()
	}
}

/// Decrements the in-flight count on drop so waiters wake even if the
/// completion callback panics.
struct InFlightGuard(Arc<PoolInner>);

impl InFlightGuard {
	fn enter(inner: &Arc<PoolInner>) -> Self {
		*inner.in_flight.lock() += 1;
		Self(Arc::clone(inner))
	}
}

impl Drop for InFlightGuard {
	fn drop(&mut self) {
		let mut in_flight = self.0.in_flight.lock();
		*in_flight = in_flight.saturating_sub(1);
		if *in_flight == 0 {
			self.0.idle.notify_all();
		}
	}
}

impl WorkerPool {
	/// Creates a pool on the ambient runtime (see [`runtime_handle`]).
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn new(name: impl Into<String>, capacity: usize) -> Self {
		Self::with_handle(name, capacity, runtime_handle())
	}

	/// Creates a pool that spawns onto `handle`.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn with_handle(name: impl Into<String>, capacity: usize, handle: tokio::runtime::Handle) -> Self {
		assert!(capacity > 0, "worker pool capacity must be > 0");
		Self {
			inner: Arc::new(PoolInner {
				name: name.into(),
				handle,
				permits: Arc::new(Semaphore::new(capacity)),
				capacity,
				in_flight: Mutex::new(0),
				idle: Condvar::new(),
			}),
		}
	}

	/// Returns the maximum number of jobs in flight.
	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	/// Returns the number of admitted jobs whose completion has not finished.
	pub fn in_flight(&self) -> usize {
		*self.inner.in_flight.lock()
	}

	/// Returns true once [`Self::close`] was called.
	pub fn is_closed(&self) -> bool {
		self.inner.permits.is_closed()
	}

	/// Stops admitting work. Jobs already admitted run to completion.
	pub fn close(&self) {
		self.inner.permits.close();
		tracing::debug!(pool = %self.inner.name, in_flight = self.in_flight(), "worker.pool.close");
	}

	/// Admits `work` if a permit is free, then runs it on the blocking pool
	/// and hands its output to `done`.
	///
	/// `done` receives `None` when `work` panicked. Never blocks the caller.
	pub fn try_spawn<W, R, D>(&self, work: W, done: D) -> Result<(), PoolError>
	where
		W: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
		D: FnOnce(Option<R>) + Send + 'static,
	{
		let permit = match Arc::clone(&self.inner.permits).try_acquire_owned() {
			Ok(permit) => permit,
			Err(TryAcquireError::NoPermits) => {
				tracing::debug!(pool = %self.inner.name, capacity = self.inner.capacity, "worker.pool.rejected");
				return Err(PoolError::Saturated {
					capacity: self.inner.capacity,
				});
			}
			Err(TryAcquireError::Closed) => return Err(PoolError::Closed),
		};

		let guard = InFlightGuard::enter(&self.inner);
		tracing::trace!(pool = %self.inner.name, in_flight = self.in_flight(), "worker.pool.spawn");

		let name = self.inner.name.clone();
		self.inner.handle.spawn_blocking(move || {
			// Declared before the permit so the permit is released first.
			let _guard = guard;
			let _permit = permit;
			let output = match catch_unwind(AssertUnwindSafe(work)) {
				Ok(output) => Some(output),
				Err(payload) => {
					let message = panic_message(&*payload).unwrap_or_default();
					tracing::warn!(pool = %name, %message, "worker.pool.panicked");
					None
				}
			};
			done(output);
		});
		Ok(())
	}

	/// Blocks the calling thread until no job is in flight or `timeout`
	/// elapses. Returns true when the pool went idle.
	///
	/// Must not be called from inside a completion callback of this pool.
	pub fn wait_idle(&self, timeout: Duration) -> bool {
		let mut in_flight = self.inner.in_flight.lock();
		let _ = self.inner.idle.wait_while_for(&mut in_flight, |n| *n > 0, timeout);
		*in_flight == 0
	}
}
