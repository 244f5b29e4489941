use rustc_hash::FxHashMap;

use crate::source::Key;
use crate::task::AvatarTask;

/// Slot to task bindings.
///
/// Holds at most one task per slot. A slot with nothing pending has no
/// entry. The registry never cancels anything itself; callers cancel a task
/// before displacing it.
#[derive(Debug)]
pub struct SlotRegistry<S, I> {
	bindings: FxHashMap<S, AvatarTask<I>>,
}

impl<S, I> Default for SlotRegistry<S, I> {
	fn default() -> Self {
		Self {
			bindings: FxHashMap::default(),
		}
	}
}

impl<S: Key, I> SlotRegistry<S, I> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the task currently bound to `slot`.
	pub fn binding_for(&self, slot: &S) -> Option<&AvatarTask<I>> {
		self.bindings.get(slot)
	}

	/// Binds `task` to `slot`, returning the displaced task.
	pub fn bind(&mut self, slot: S, task: AvatarTask<I>) -> Option<AvatarTask<I>> {
		debug_assert!(
			self.bindings.iter().all(|(other, bound)| other == &slot || bound != &task),
			"task already bound to another slot"
		);
		self.bindings.insert(slot, task)
	}

	/// Removes the binding for `slot` only if it is still `task`.
	pub fn clear_if_current(&mut self, slot: &S, task: &AvatarTask<I>) -> bool {
		if self.bindings.get(slot) == Some(task) {
			self.bindings.remove(slot);
			true
		} else {
			false
		}
	}

	/// Removes whatever is bound to `slot`.
	pub fn unbind(&mut self, slot: &S) -> Option<AvatarTask<I>> {
		self.bindings.remove(slot)
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// Takes every binding out of the registry.
	pub fn drain(&mut self) -> Vec<(S, AvatarTask<I>)> {
		self.bindings.drain().collect()
	}
}
