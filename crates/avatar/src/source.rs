use std::fmt;
use std::hash::Hash;

use roster_worker::CancelFlag;

use crate::color::{PlaceholderColor, color_for};

/// Bounds shared by slot handles and item identities.
pub trait Key: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> Key for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

/// How hard an [`AvatarSource`] should try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
	/// Return a bitmap only if it is already cached; never compute.
	///
	/// Used on the render thread before any background work is scheduled.
	CachedOnly,
	/// Compute the bitmap if needed. Runs on a pool thread.
	Compute,
}

/// Produces avatar bitmaps for item identities.
///
/// Both fetch modes go through [`AvatarSource::get`]. Implementations should
/// poll `cancel` at their own checkpoints during [`Fetch::Compute`] and bail
/// out with `None` once it is set; the loader never relies on it.
pub trait AvatarSource: Send + Sync + 'static {
	type Item: Key;
	type Bitmap: Send + 'static;

	fn get(&self, item: &Self::Item, size_px: u32, fetch: Fetch, cancel: &CancelFlag) -> Option<Self::Bitmap>;

	/// Color shown while no bitmap is available.
	fn placeholder_color(&self, item: &Self::Item) -> PlaceholderColor {
		color_for(item)
	}
}

/// Widget side of the loader: paints into one slot.
///
/// Calls are made while the loader holds its registry lock, from the render
/// thread or from the blocking pool thread that computed the bitmap (never
/// from an async runtime worker). Implementations must not call back into
/// the loader.
pub trait RenderSink<S, B>: Send + Sync + 'static {
	fn apply(&self, slot: &S, bitmap: B);

	fn apply_placeholder(&self, slot: &S, color: PlaceholderColor);
}
