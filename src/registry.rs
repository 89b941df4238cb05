//! An owning container of streaming sources.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	device::AudioDevice,
	error::StreamError,
	source::ChunkProducer,
	stream::{StreamingSource,Tick},
	macros::{info2,debug2,warn2},
};
use std::collections::BTreeMap;

//---------------------------------------------------------------------------------------------------- SourceKey
/// Handle to a [`StreamingSource`] inside a [`Registry`].
///
/// Keys are never re-used by the same registry.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
pub struct SourceKey(usize);

impl SourceKey {
	#[must_use]
	#[inline]
	/// The raw key value.
	pub const fn get(self) -> usize {
		self.0
	}
}

//---------------------------------------------------------------------------------------------------- Registry
/// Every live [`StreamingSource`], owned in one place.
///
/// Sources are inserted once and then addressed by [`SourceKey`].
/// [`Registry::teardown`] stops and releases all of them.
#[derive(Debug)]
pub struct Registry<D: AudioDevice, P: ChunkProducer = Box<dyn ChunkProducer>> {
	sources: BTreeMap<SourceKey, StreamingSource<D, P>>,
	next_key: usize,
}

impl<D: AudioDevice, P: ChunkProducer> Registry<D, P> {
	#[must_use]
	/// An empty registry.
	pub const fn new() -> Self {
		Self {
			sources: BTreeMap::new(),
			next_key: 0,
		}
	}

	/// Take ownership of `source`.
	pub fn insert(&mut self, source: StreamingSource<D, P>) -> SourceKey {
		let key = SourceKey(self.next_key);
		self.next_key += 1;
		self.sources.insert(key, source);
		debug2!("Registry - inserted source {}", key.0);
		key
	}

	#[must_use]
	/// The source behind `key`.
	pub fn get(&self, key: SourceKey) -> Option<&StreamingSource<D, P>> {
		self.sources.get(&key)
	}

	/// The source behind `key`, mutably.
	pub fn get_mut(&mut self, key: SourceKey) -> Option<&mut StreamingSource<D, P>> {
		self.sources.get_mut(&key)
	}

	/// Remove the source behind `key`, stopping and releasing it.
	///
	/// Returns `Ok(false)` if `key` is unknown.
	///
	/// # Errors
	/// If the source could not be released.
	/// It is removed from the registry either way.
	pub fn remove(&mut self, key: SourceKey) -> Result<bool, StreamError> {
		let Some(mut source) = self.sources.remove(&key) else {
			return Ok(false);
		};

		source.destroy()?;
		debug2!("Registry - removed source {}", key.0);
		Ok(true)
	}

	#[must_use]
	/// How many sources are registered.
	pub fn len(&self) -> usize {
		self.sources.len()
	}

	#[must_use]
	/// If no sources are registered.
	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}

	/// Every key, in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = SourceKey> + '_ {
		self.sources.keys().copied()
	}

	/// [`StreamingSource::service`] every source, in insertion order.
	pub fn service_all(&mut self) -> Vec<(SourceKey, Result<Tick, StreamError>)> {
		self.sources
			.iter_mut()
			.map(|(key, source)| (*key, source.service()))
			.collect()
	}

	#[cold]
	#[inline(never)]
	/// Stop and release every source, emptying the registry.
	///
	/// Every source is torn down even if some fail.
	///
	/// # Errors
	/// The first error encountered.
	pub fn teardown(&mut self) -> Result<(), StreamError> {
		let count = self.sources.len();
		let mut first_error = None;

		for (key, mut source) in std::mem::take(&mut self.sources) {
			if let Err(e) = source.destroy() {
				warn2!("Registry - failed to tear down source {}: {e}", key.0);
				first_error.get_or_insert(e);
			}
		}

		info2!("Registry - tore down {count} sources");

		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

impl<D: AudioDevice, P: ChunkProducer> Default for Registry<D, P> {
	fn default() -> Self {
		Self::new()
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		device::DummyDevice,
		error::DeviceError,
		source::ChunkQueue,
		state::PlayState,
		tests::{chunks,source},
	};
	use pretty_assertions::assert_eq;

	fn registry() -> (Registry<DummyDevice, ChunkQueue>, Vec<SourceKey>) {
		let mut registry = Registry::new();
		let keys = (0..3).map(|_| registry.insert(source(2, 5))).collect();
		(registry, keys)
	}

	#[test]
	fn insert_get_remove() {
		let (mut registry, keys) = registry();
		assert_eq!(registry.len(), 3);
		assert_eq!(keys.iter().map(|k| k.get()).collect::<Vec<_>>(), [0, 1, 2]);

		registry.get_mut(keys[1]).unwrap().play().unwrap();
		assert_eq!(registry.get(keys[1]).unwrap().play_state(), PlayState::Playing);

		assert_eq!(registry.remove(keys[1]), Ok(true));
		assert_eq!(registry.remove(keys[1]), Ok(false));
		assert!(registry.get(keys[1]).is_none());
		assert_eq!(registry.len(), 2);

		// Keys are not re-used.
		let key = registry.insert(source(2, 5));
		assert_eq!(key.get(), 3);
	}

	#[test]
	fn service_all() {
		let (mut registry, keys) = registry();
		for key in &keys {
			let source = registry.get_mut(*key).unwrap();
			source.play().unwrap();
			source.device_mut().consume_buffers(1);
		}

		let ticks = registry.service_all();
		assert_eq!(ticks.len(), 3);
		for ((key, tick), expected) in ticks.into_iter().zip(&keys) {
			assert_eq!(key, *expected);
			assert_eq!(tick.unwrap().refilled, 1);
		}
	}

	#[test]
	fn teardown_releases_everything() {
		let (mut registry, keys) = registry();
		registry.get_mut(keys[0]).unwrap().play().unwrap();

		registry.teardown().unwrap();
		assert!(registry.is_empty());

		// Nothing left, tearing down again is fine.
		registry.teardown().unwrap();
	}

	/// Move the head of the device queue to its back,
	/// so the source can no longer unqueue (or release) it.
	fn requeue_head(device: &mut DummyDevice) {
		let head = device.queue().next().unwrap();
		device.stop().unwrap();
		device.unqueue_buffer(head).unwrap();
		device.queue_buffer(head).unwrap();
	}

	#[test]
	fn teardown_tries_everything_and_reports_first_error() {
		let mut a = DummyDevice::new();
		let mut b = DummyDevice::new();
		let mut c = DummyDevice::new();
		// Different handles than `a`.
		c.gen_buffers(10).unwrap();

		let mut registry: Registry<&mut DummyDevice, ChunkQueue> = Registry::new();
		let keys: Vec<_> = [&mut a, &mut b, &mut c]
			.into_iter()
			.map(|device| registry.insert(StreamingSource::new(device, chunks(5), 2).unwrap()))
			.collect();

		let first = registry.get(keys[0]).unwrap().pool().slot(0).unwrap();
		requeue_head(registry.get_mut(keys[0]).unwrap().device_mut());
		requeue_head(registry.get_mut(keys[2]).unwrap().device_mut());
		registry.get_mut(keys[1]).unwrap().play().unwrap();

		assert_eq!(registry.teardown(), Err(StreamError::Device(DeviceError::BufferInUse(first))));
		assert!(registry.is_empty());
		drop(registry);

		// The failed sources kept their buffers, the other one was released.
		assert_eq!(a.live_buffers(), 2);
		assert_eq!(b.live_buffers(), 0);
		assert_eq!(c.live_buffers(), 12);
		assert_eq!(b.queue().count(), 0);
	}
}
