//! Decides what happens to a slot's pending work when the slot is asked to
//! show an item.
//!
//! | bound task        | requested | decision                    |
//! |-------------------|-----------|-----------------------------|
//! | none              | I         | [`Decision::Start`]         |
//! | live task for I   | I         | [`Decision::Reuse`]         |
//! | task for J != I   | I         | [`Decision::Replace`]       |
//!
//! A bound task that is already cancelled never satisfies a request; it is
//! replaced like a mismatch.

use crate::task::AvatarTask;

/// Outcome of [`decide`].
#[derive(Debug, PartialEq, Eq)]
pub enum Decision<I> {
	/// Nothing is bound; start a new task.
	Start,
	/// The bound task already serves the requested item. Leave it alone.
	Reuse,
	/// The bound task serves something else. Cancel it, then start a new one.
	Replace(AvatarTask<I>),
}

pub fn decide<I: PartialEq>(bound: Option<&AvatarTask<I>>, requested: &I) -> Decision<I> {
	match bound {
		None => Decision::Start,
		Some(task) if task.item() == requested && !task.is_cancelled() => Decision::Reuse,
		Some(task) => Decision::Replace(task.clone()),
	}
}
