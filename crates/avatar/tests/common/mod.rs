//! Shared fixtures for loader integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use roster_avatar::{AvatarLoader, AvatarSource, CancelFlag, Fetch, LoaderConfig, PlaceholderColor, RenderSink};

pub const WAIT: Duration = Duration::from_secs(5);

pub type Slot = u32;
pub type Bitmap = &'static str;
pub type Loader = AvatarLoader<Slot, ScriptedSource, RecordingSink>;

/// Blocks a slow-path computation until the test opens it.
pub struct Gate {
	open: Mutex<bool>,
	cv: Condvar,
	honors_cancel: bool,
}

impl Gate {
	fn new(honors_cancel: bool) -> Arc<Self> {
		Arc::new(Self {
			open: Mutex::new(false),
			cv: Condvar::new(),
			honors_cancel,
		})
	}

	pub fn open(&self) {
		*self.open.lock() = true;
		self.cv.notify_all();
	}

	/// Returns false if the wait was abandoned because of cancellation.
	fn wait(&self, cancel: &CancelFlag) -> bool {
		let mut open = self.open.lock();
		let deadline = Instant::now() + WAIT;
		while !*open {
			if self.honors_cancel && cancel.is_cancelled() {
				return false;
			}
			if Instant::now() >= deadline {
				panic!("gate never opened");
			}
			self.cv.wait_for(&mut open, Duration::from_millis(5));
		}
		true
	}
}

/// Avatar source driven entirely by the test.
///
/// Items missing from `computed` come back empty. Items named `"boom"`
/// panic on the slow path and items named `"glitch"` panic on the probe.
#[derive(Default)]
pub struct ScriptedSource {
	cached: Mutex<HashMap<&'static str, Bitmap>>,
	computed: Mutex<HashMap<&'static str, Bitmap>>,
	gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
	probe_gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
	calls: Mutex<Vec<(&'static str, Fetch)>>,
	produced: Mutex<Vec<Bitmap>>,
	observed_cancel: Mutex<Vec<&'static str>>,
}

impl ScriptedSource {
	pub fn cached(self, item: &'static str, bitmap: Bitmap) -> Self {
		self.cached.lock().insert(item, bitmap);
		self
	}

	pub fn computed(self, item: &'static str, bitmap: Bitmap) -> Self {
		self.computed.lock().insert(item, bitmap);
		self
	}

	/// Gates `item`'s slow path. The gate gives up early on cancellation.
	pub fn gate(&self, item: &'static str) -> Arc<Gate> {
		let gate = Gate::new(true);
		self.gates.lock().insert(item, Arc::clone(&gate));
		gate
	}

	/// Gates `item`'s slow path and keeps waiting even once cancelled.
	pub fn stubborn_gate(&self, item: &'static str) -> Arc<Gate> {
		let gate = Gate::new(false);
		self.gates.lock().insert(item, Arc::clone(&gate));
		gate
	}

	/// Blocks `item`'s cached-only probe until the gate opens.
	pub fn probe_gate(&self, item: &'static str) -> Arc<Gate> {
		let gate = Gate::new(false);
		self.probe_gates.lock().insert(item, Arc::clone(&gate));
		gate
	}

	pub fn calls(&self, item: &'static str, fetch: Fetch) -> usize {
		self.calls.lock().iter().filter(|(i, f)| *i == item && *f == fetch).count()
	}

	/// Bitmaps the slow path actually returned, painted or not.
	pub fn produced(&self) -> Vec<Bitmap> {
		self.produced.lock().clone()
	}

	pub fn observed_cancel(&self) -> Vec<&'static str> {
		self.observed_cancel.lock().clone()
	}
}

impl AvatarSource for ScriptedSource {
	type Item = &'static str;
	type Bitmap = Bitmap;

	fn get(&self, item: &Self::Item, _size_px: u32, fetch: Fetch, cancel: &CancelFlag) -> Option<Bitmap> {
		self.calls.lock().push((*item, fetch));
		match fetch {
			Fetch::CachedOnly => {
				if *item == "glitch" {
					panic!("cache lookup failed for {item}");
				}
				let gate = self.probe_gates.lock().get(item).cloned();
				if let Some(gate) = gate {
					gate.wait(cancel);
				}
				self.cached.lock().get(item).copied()
			}
			Fetch::Compute => {
				if *item == "boom" {
					panic!("synthesis failed for {item}");
				}
				let gate = self.gates.lock().get(item).cloned();
				if let Some(gate) = gate
					&& !gate.wait(cancel)
				{
					self.observed_cancel.lock().push(*item);
					return None;
				}
				let bitmap = self.computed.lock().get(item).copied();
				self.produced.lock().extend(bitmap);
				bitmap
			}
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
	Bitmap(Bitmap),
	Placeholder(PlaceholderColor),
}

/// Sink that records every paint call.
#[derive(Default)]
pub struct RecordingSink {
	events: Mutex<Vec<(Slot, Paint)>>,
}

impl RecordingSink {
	pub fn events(&self) -> Vec<(Slot, Paint)> {
		self.events.lock().clone()
	}

	pub fn for_slot(&self, slot: Slot) -> Vec<Paint> {
		self.events.lock().iter().filter(|(s, _)| *s == slot).map(|(_, p)| *p).collect()
	}

	pub fn last(&self, slot: Slot) -> Option<Paint> {
		self.for_slot(slot).last().copied()
	}

	pub fn applied(&self, slot: Slot) -> Vec<Bitmap> {
		self.for_slot(slot)
			.into_iter()
			.filter_map(|p| match p {
				Paint::Bitmap(b) => Some(b),
				Paint::Placeholder(_) => None,
			})
			.collect()
	}
}

impl RenderSink<Slot, Bitmap> for RecordingSink {
	fn apply(&self, slot: &Slot, bitmap: Bitmap) {
		self.events.lock().push((*slot, Paint::Bitmap(bitmap)));
	}

	fn apply_placeholder(&self, slot: &Slot, color: PlaceholderColor) {
		self.events.lock().push((*slot, Paint::Placeholder(color)));
	}
}

pub fn loader(source: ScriptedSource) -> Loader {
	loader_with(LoaderConfig::default(), source)
}

pub fn loader_with(config: LoaderConfig, source: ScriptedSource) -> Loader {
	let _ = tracing_subscriber::fmt::try_init();
	AvatarLoader::new(config, source, RecordingSink::default()).expect("valid config")
}

/// Polls `f` until it holds or `WAIT` elapses.
pub fn wait_until(mut f: impl FnMut() -> bool) -> bool {
	let start = Instant::now();
	while start.elapsed() < WAIT {
		if f() {
			return true;
		}
		std::thread::sleep(Duration::from_millis(2));
	}
	false
}
