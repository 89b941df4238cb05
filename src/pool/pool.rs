//! `BufferPool`, the ring of buffers and its bookkeeping.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	device::{AudioDevice,BufferId},
	error::{DeviceError,StreamError},
	format::BufferFormat,
	source::ChunkProducer,
	macros::{debug2,trace2,warn2},
};

//---------------------------------------------------------------------------------------------------- BufferPool
/// A fixed ring of device buffers, filled from a [`ChunkProducer`].
///
/// The pool owns the buffer handles and the producer, but not the
/// device, every operation touching buffers borrows it.
///
/// ## Ring
/// The device plays buffers strictly in the order they were queued,
/// so instead of a separate FIFO the pool keeps a `cursor`: the ring
/// position of the head of the device queue. The queued slots are
/// always `cursor, cursor + 1, .., cursor + queued - 1`, modulo
/// [`Self::active_count`].
///
/// Every reclaimed slot moves the cursor forward by exactly 1, so after
/// `k` refills (starting from a full ring) the cursor is `k % active_count`.
///
/// ## Invariant
/// A slot is never loaded while it is queued.
#[derive(Debug)]
pub struct BufferPool<P> {
	/// Where the PCM comes from.
	producer: P,
	/// The buffer handles, index == ring position.
	slots: Vec<BufferId>,
	/// How many slots were asked for.
	requested: usize,
	/// What every buffer is loaded as.
	format: BufferFormat,
	/// The producer's sample rate.
	sample_rate: u32,
	/// Ring position of the head of the device queue.
	cursor: usize,
	/// How many slots, from `cursor`, are queued.
	queued: usize,
	/// No more data will be loaded.
	exhausted: bool,
	/// The handles were released.
	destroyed: bool,
}

//---------------------------------------------------------------------------------------------------- BufferPool Impl
impl<P: ChunkProducer> BufferPool<P> {
	/// Allocate `requested` buffers on `device` and fill them from `producer`.
	///
	/// The pool may end up with fewer slots than requested:
	/// - the device handed out fewer buffers
	/// - the producer ran out before every slot was filled
	///
	/// In both cases the unused handles are released and the
	/// pool shrinks, this is not an error. If the producer ran
	/// out, the pool starts [`Self::exhausted`].
	///
	/// Nothing is queued, that is up to the owner.
	///
	/// # Errors
	/// - [`StreamError::Configuration`] if the producer's PCM spec is not a valid [`BufferFormat`]
	/// - [`StreamError::Allocation`] if the device could not allocate a single buffer
	/// - [`StreamError::Device`] if loading a buffer failed, every buffer is released first
	pub fn new<D: AudioDevice>(device: &mut D, producer: P, requested: usize) -> Result<Self, StreamError> {
		let spec   = producer.spec();
		let format = BufferFormat::try_from(spec)?;

		let slots = match device.gen_buffers(requested) {
			Ok(slots) if slots.is_empty() => return Err(StreamError::Allocation(DeviceError::OutOfMemory)),
			Ok(slots) => slots,
			Err(e) => return Err(StreamError::Allocation(e)),
		};

		if slots.len() < requested {
			debug2!("BufferPool - device allocated {}/{requested} buffers", slots.len());
		}

		let mut this = Self {
			producer,
			slots,
			requested,
			format,
			sample_rate: spec.sample_rate,
			cursor: 0,
			queued: 0,
			exhausted: false,
			destroyed: false,
		};

		let mut filled = 0;
		while filled < this.slots.len() {
			match this.fill_slot(device, filled) {
				Ok(true) => filled += 1,
				Ok(false) => break,
				Err(e) => {
					if let Err(e) = this.destroy(device) {
						warn2!("BufferPool - failed to release buffers: {e}");
					}
					return Err(e);
				},
			}
		}

		if filled < this.slots.len() {
			let unused = this.slots.split_off(filled);
			debug2!("BufferPool - producer ran out, releasing {} unused buffers", unused.len());
			if let Err(e) = device.delete_buffers(&unused) {
				warn2!("BufferPool - failed to release unused buffers: {e}");
			}
		}

		debug2!("BufferPool - {} active buffers, format: {format}, exhausted: {}", this.slots.len(), this.exhausted);
		Ok(this)
	}

	/// Load the next chunk into the slot at ring position `index`.
	///
	/// `index` wraps around [`Self::active_count`].
	///
	/// Returns `true` if the slot was loaded, `false` if the
	/// producer ran out (the pool becomes [`Self::exhausted`]
	/// and nothing is loaded).
	///
	/// # Errors
	/// - [`DeviceError::BufferInUse`] if the slot is queued, the producer is not touched
	/// - any error the device returns when loading
	pub fn fill_slot<D: AudioDevice>(&mut self, device: &mut D, index: usize) -> Result<bool, StreamError> {
		if self.exhausted || self.slots.is_empty() {
			return Ok(false);
		}

		let index  = index % self.slots.len();
		let buffer = self.slots[index];

		if self.is_queued(index) {
			return Err(StreamError::Device(DeviceError::BufferInUse(buffer)));
		}

		let Some(chunk) = self.producer.next_chunk() else {
			debug2!("BufferPool - producer exhausted");
			self.exhausted = true;
			return Ok(false);
		};

		trace2!("BufferPool - loading {} bytes into slot {index} ({buffer})", chunk.len());
		device.buffer_data(buffer, self.format, self.sample_rate, chunk)?;
		Ok(true)
	}

	/// Queue every slot, in ring order, starting from a fresh ring.
	///
	/// On error, the slots queued so far stay queued (and counted).
	pub(crate) fn queue_all<D: AudioDevice>(&mut self, device: &mut D) -> Result<(), StreamError> {
		debug_assert_eq!(self.queued, 0);
		self.cursor = 0;

		for buffer in &self.slots {
			device.queue_buffer(*buffer)?;
			self.queued += 1;
		}

		Ok(())
	}

	/// Reclaim the head slot (which the device must have played),
	/// refill it, and queue it to the back.
	///
	/// Only valid while every slot is queued, i.e. before exhaustion.
	///
	/// Returns `true` if the slot was refilled and requeued, `false` if
	/// the producer ran out: the slot then stays out of the queue.
	///
	/// # Errors
	/// If unqueueing fails, nothing changed.
	///
	/// If loading or requeueing fails, the slot is already out of the
	/// queue: it is left out and the pool marks itself exhausted.
	pub(crate) fn recycle<D: AudioDevice>(&mut self, device: &mut D) -> Result<bool, StreamError> {
		if self.exhausted || self.queued == 0 {
			return Ok(false);
		}
		debug_assert_eq!(self.queued, self.slots.len());

		let index  = self.cursor;
		let buffer = self.slots[index];

		device.unqueue_buffer(buffer)?;
		self.queued -= 1;
		self.advance();

		let result = match self.fill_slot(device, index) {
			Ok(true) => device.queue_buffer(buffer).map_err(StreamError::from),
			Ok(false) => return Ok(false),
			Err(e) => Err(e),
		};

		match result {
			Ok(()) => {
				self.queued += 1;
				Ok(true)
			},
			Err(e) => {
				warn2!("BufferPool - dropping slot {index} ({buffer}) after refill failure: {e}");
				self.exhausted = true;
				Err(e)
			},
		}
	}

	/// Unqueue the head slot without refilling it.
	///
	/// This is best-effort, a device error is swallowed (the device
	/// may have discarded the buffer already) and the cursor moves on.
	///
	/// Returns `false` if nothing was queued.
	pub(crate) fn drain_one<D: AudioDevice>(&mut self, device: &mut D) -> bool {
		if self.queued == 0 {
			return false;
		}

		let buffer = self.slots[self.cursor];
		match device.unqueue_buffer(buffer) {
			Ok(()) => trace2!("BufferPool - drained slot {} ({buffer})", self.cursor),
			Err(e) => debug2!("BufferPool - ignoring drain failure on {buffer}: {e}"),
		}

		self.queued -= 1;
		self.advance();
		true
	}

	/// Release every buffer.
	///
	/// Calling this again is a no-op.
	///
	/// # Errors
	/// If the device refuses (e.g. a buffer is still queued),
	/// the pool is left untouched and this can be retried.
	pub fn destroy<D: AudioDevice>(&mut self, device: &mut D) -> Result<(), StreamError> {
		if self.destroyed {
			return Ok(());
		}

		device.delete_buffers(&self.slots)?;
		debug2!("BufferPool - released {} buffers", self.slots.len());

		self.slots.clear();
		self.cursor    = 0;
		self.queued    = 0;
		self.exhausted = true;
		self.destroyed = true;
		Ok(())
	}

	//------------------------------------------------------------------ Accessors
	#[must_use]
	/// How many slots the pool actually has.
	pub fn active_count(&self) -> usize {
		self.slots.len()
	}

	#[must_use]
	/// How many slots were requested at construction.
	pub const fn requested_count(&self) -> usize {
		self.requested
	}

	#[must_use]
	/// Ring position of the head of the device queue.
	pub const fn cursor(&self) -> usize {
		self.cursor
	}

	#[must_use]
	/// How many slots are queued on the device.
	pub const fn queued(&self) -> usize {
		self.queued
	}

	#[must_use]
	/// If no more data will be loaded.
	pub const fn exhausted(&self) -> bool {
		self.exhausted
	}

	#[must_use]
	/// If [`Self::destroy`] succeeded.
	pub const fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	#[must_use]
	/// The format every buffer is loaded with.
	pub const fn format(&self) -> BufferFormat {
		self.format
	}

	#[must_use]
	/// The sample rate every buffer is loaded with.
	pub const fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	#[must_use]
	/// The handle at ring position `index`.
	pub fn slot(&self, index: usize) -> Option<BufferId> {
		self.slots.get(index).copied()
	}

	/// The queued handles, head of the device queue first.
	pub fn queued_slots(&self) -> impl Iterator<Item = BufferId> + '_ {
		let n = self.slots.len();
		(0..self.queued).map(move |i| self.slots[(self.cursor + i) % n])
	}

	#[must_use]
	/// The producer.
	pub const fn producer(&self) -> &P {
		&self.producer
	}

	//------------------------------------------------------------------ Private
	/// If the slot at ring position `index` is queued.
	fn is_queued(&self, index: usize) -> bool {
		let n = self.slots.len();
		n != 0 && (index + n - self.cursor) % n < self.queued
	}

	/// Move the cursor forward by one slot.
	fn advance(&mut self) {
		let n = self.slots.len();
		if n != 0 {
			self.cursor = (self.cursor + 1) % n;
		}
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		device::DummyDevice,
		error::ConfigError,
		format::PcmSpec,
		source::ChunkQueue,
		tests::{chunks,chunk_bytes},
	};
	use pretty_assertions::assert_eq;

	#[test]
	fn full_pool() {
		let mut device = DummyDevice::new();
		let pool = BufferPool::new(&mut device, chunks(10), 4).unwrap();

		assert_eq!(pool.active_count(), 4);
		assert_eq!(pool.requested_count(), 4);
		assert!(!pool.exhausted());
		assert_eq!(pool.cursor(), 0);
		assert_eq!(pool.queued(), 0);
		assert_eq!(pool.format(), BufferFormat::Stereo16);
		assert_eq!(pool.producer().yielded(), 4);

		// Slot `i` holds chunk `i`.
		for i in 0..4 {
			let buffer = pool.slot(i).unwrap();
			assert_eq!(device.loaded_bytes(buffer), Some(chunk_bytes(i)));
		}
		assert_eq!(pool.slot(4), None);
	}

	#[test]
	fn producer_shorter_than_pool() {
		let mut device = DummyDevice::new();
		let pool = BufferPool::new(&mut device, chunks(2), 4).unwrap();

		assert_eq!(pool.active_count(), 2);
		assert_eq!(pool.requested_count(), 4);
		assert!(pool.exhausted());
		// The 2 unused buffers were released.
		assert_eq!(device.live_buffers(), 2);
	}

	#[test]
	fn empty_producer() {
		let mut device = DummyDevice::new();
		let pool = BufferPool::new(&mut device, chunks(0), 4).unwrap();

		assert_eq!(pool.active_count(), 0);
		assert!(pool.exhausted());
		assert_eq!(device.live_buffers(), 0);
	}

	#[test]
	fn partial_allocation() {
		let mut device = DummyDevice::with_buffer_limit(3);
		let pool = BufferPool::new(&mut device, chunks(10), 5).unwrap();

		assert_eq!(pool.active_count(), 3);
		assert_eq!(pool.requested_count(), 5);
		assert!(!pool.exhausted());
	}

	#[test]
	fn no_allocation() {
		let mut device = DummyDevice::with_buffer_limit(0);
		let result = BufferPool::new(&mut device, chunks(10), 4);
		assert_eq!(result.unwrap_err(), StreamError::Allocation(DeviceError::OutOfMemory));
	}

	#[test]
	fn unsupported_spec() {
		let mut device = DummyDevice::new();
		let spec = PcmSpec { channels: 6, ..PcmSpec::STEREO_I16_44100 };
		let result = BufferPool::new(&mut device, ChunkQueue::new(spec, [vec![0_u8; 12]]), 4);

		assert_eq!(result.unwrap_err(), StreamError::Configuration(ConfigError::Channels(6)));
		assert_eq!(device.live_buffers(), 0);
	}

	#[test]
	fn load_failure_releases_everything() {
		let mut device = DummyDevice::new();
		// 3 bytes is not a whole stereo 16-bit frame.
		let queue = ChunkQueue::new(PcmSpec::STEREO_I16_44100, [vec![0_u8; 4], vec![0_u8; 3]]);
		let result = BufferPool::new(&mut device, queue, 4);

		assert_eq!(result.unwrap_err(), StreamError::Device(DeviceError::InvalidFormat));
		assert_eq!(device.live_buffers(), 0);
	}

	#[test]
	fn queued_slot_is_never_filled() {
		let mut device = DummyDevice::new();
		let mut pool = BufferPool::new(&mut device, chunks(10), 3).unwrap();
		pool.queue_all(&mut device).unwrap();
		assert_eq!(pool.queued(), 3);

		for i in 0..3 {
			let buffer = pool.slot(i).unwrap();
			assert_eq!(
				pool.fill_slot(&mut device, i),
				Err(StreamError::Device(DeviceError::BufferInUse(buffer))),
			);
		}

		// The producer was never asked.
		assert_eq!(pool.producer().yielded(), 3);
	}

	#[test]
	fn recycle_moves_the_cursor() {
		let mut device = DummyDevice::new();
		let mut pool = BufferPool::new(&mut device, chunks(10), 3).unwrap();
		pool.queue_all(&mut device).unwrap();
		device.play().unwrap();

		for k in 1..=6 {
			assert_eq!(device.consume_buffers(1), 1);
			assert_eq!(pool.recycle(&mut device), Ok(true));
			assert_eq!(pool.cursor(), k % 3);
			assert_eq!(pool.queued(), 3);
			assert_eq!(pool.queued_slots().collect::<Vec<_>>(), device.queue().collect::<Vec<_>>());
		}

		assert_eq!(pool.producer().yielded(), 9);
	}

	#[test]
	fn recycle_unplayed_head_fails_cleanly() {
		let mut device = DummyDevice::new();
		let mut pool = BufferPool::new(&mut device, chunks(10), 2).unwrap();
		pool.queue_all(&mut device).unwrap();

		let head = pool.slot(0).unwrap();
		assert_eq!(pool.recycle(&mut device), Err(StreamError::Device(DeviceError::NotProcessed(head))));
		assert_eq!(pool.cursor(), 0);
		assert_eq!(pool.queued(), 2);
		assert!(!pool.exhausted());
	}

	#[test]
	fn destroy_is_idempotent() {
		let mut device = DummyDevice::new();
		let mut pool = BufferPool::new(&mut device, chunks(10), 4).unwrap();

		pool.destroy(&mut device).unwrap();
		assert!(pool.is_destroyed());
		assert_eq!(pool.active_count(), 0);
		assert_eq!(device.live_buffers(), 0);

		let events = device.events().len();
		pool.destroy(&mut device).unwrap();
		assert_eq!(device.events().len(), events);
	}

	#[test]
	fn destroy_refuses_queued_buffers() {
		let mut device = DummyDevice::new();
		let mut pool = BufferPool::new(&mut device, chunks(10), 2).unwrap();
		pool.queue_all(&mut device).unwrap();

		let result = pool.destroy(&mut device);
		assert!(matches!(result, Err(StreamError::Device(DeviceError::BufferInUse(_)))));
		assert!(!pool.is_destroyed());
		assert_eq!(device.live_buffers(), 2);
	}
}
