//! Background execution primitives for roster: task ids, cooperative
//! cancellation flags and a bounded pool for blocking jobs.

mod panic;
mod pool;
mod spawn;
mod token;

pub use panic::panic_message;
pub use pool::{PoolError, WorkerPool};
pub use spawn::runtime_handle;
pub use token::{CancelFlag, TaskClock, TaskId};
