//! Deterministic placeholder colors keyed by item identity.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

const SATURATION: f32 = 0.55;
const LIGHTNESS: f32 = 0.5;

/// Opaque RGB color painted behind a slot while its avatar is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderColor(u32);

impl PlaceholderColor {
	/// Creates a color from `0xRRGGBB`. Higher bits are discarded.
	pub const fn from_rgb(rgb: u32) -> Self {
		Self(rgb & 0x00ff_ffff)
	}

	/// Returns `0xRRGGBB`.
	pub const fn rgb(self) -> u32 {
		self.0
	}

	/// Returns `0xAARRGGBB` with full alpha.
	pub const fn argb(self) -> u32 {
		0xff00_0000 | self.0
	}
}

impl fmt::Display for PlaceholderColor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:06x}", self.0)
	}
}

/// Derives a stable color for `item`.
///
/// The hue comes from a seedless hash, so the same identity maps to the same
/// color across runs; saturation and lightness are fixed so every hue stays
/// readable under white initials.
pub fn color_for<T: Hash + ?Sized>(item: &T) -> PlaceholderColor {
	let mut hasher = FxHasher::default();
	item.hash(&mut hasher);
	let hue = (hasher.finish() % 360) as f32;
	PlaceholderColor::from_rgb(hsl_to_rgb(hue, SATURATION, LIGHTNESS))
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> u32 {
	let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
	let sector = hue / 60.0;
	let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
	let (r, g, b) = match sector as u32 {
		0 => (chroma, x, 0.0),
		1 => (x, chroma, 0.0),
		2 => (0.0, chroma, x),
		3 => (0.0, x, chroma),
		4 => (x, 0.0, chroma),
		_ => (chroma, 0.0, x),
	};
	let m = lightness - chroma / 2.0;
	let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u32;
	(channel(r) << 16) | (channel(g) << 8) | channel(b)
}
