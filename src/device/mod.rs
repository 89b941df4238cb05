//! Audio output devices.
//!
//! The trait [`AudioDevice`] is the abstract simplification of what a
//! playback voice must offer for streaming: buffers that can be loaded,
//! a queue those buffers are played from in order, and a way to ask
//! how many queued buffers were already played.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	error::DeviceError,
	format::BufferFormat,
	state::PlayState,
};

mod dummy;
pub use dummy::{DummyDevice,DeviceEvent};

#[cfg(feature = "cpal")]
mod cpal;
#[cfg(feature = "cpal")]
pub use self::cpal::CpalDevice;

// Use `cpal` if:
// - it is enabled
// - `dummy` is not forced
cfg_if::cfg_if! {
	if #[cfg(all(feature = "cpal", not(feature = "dummy")))] {
		/// The audio device backend used by default.
		pub type DefaultDevice = CpalDevice;
		/// The name of the default audio device backend.
		pub const DEVICE_BACKEND: &str = "cpal";
	} else {
		/// The audio device backend used by default.
		pub type DefaultDevice = DummyDevice;
		/// The name of the default audio device backend.
		pub const DEVICE_BACKEND: &str = "dummy";
	}
}

//---------------------------------------------------------------------------------------------------- BufferId
/// Opaque handle to one buffer on an [`AudioDevice`].
///
/// Only the device that created it can interpret it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
pub struct BufferId(u32);

impl BufferId {
	#[must_use]
	#[inline]
	/// Create a handle, for [`AudioDevice`] implementors.
	pub const fn new(id: u32) -> Self {
		Self(id)
	}

	#[must_use]
	#[inline]
	/// The raw handle value.
	pub const fn get(self) -> u32 {
		self.0
	}
}

impl std::fmt::Display for BufferId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

//---------------------------------------------------------------------------------------------------- AudioDevice Trait
/// A single playback voice, with the buffers it plays from.
///
/// # Invariants
/// Implementors are expected to follow these, the
/// [`BufferPool`](crate::BufferPool) relies on them:
/// 1. Queued buffers are played strictly in queue order
/// 2. [`Self::processed`] counts played buffers from the _head_ of the queue
/// 3. A queued buffer is never loaded or released (error instead)
/// 4. Only the head of the queue can be unqueued, and only once processed
/// 5. When a playing voice has played every queued buffer, it becomes [`PlayState::Stopped`]
/// 6. [`Self::stop`] marks every queued buffer as processed
pub trait AudioDevice {
	/// Allocate up to `count` buffers.
	///
	/// Devices may hand out _fewer_ buffers than requested,
	/// and must error if they cannot allocate a single one.
	fn gen_buffers(&mut self, count: usize) -> Result<Vec<BufferId>, DeviceError>;

	/// Release buffers.
	///
	/// Either all of `buffers` are released, or none are.
	fn delete_buffers(&mut self, buffers: &[BufferId]) -> Result<(), DeviceError>;

	/// Load PCM `data` into `buffer`, replacing what it held.
	///
	/// `data` is interleaved, little endian, in `format`.
	fn buffer_data(
		&mut self,
		buffer: BufferId,
		format: BufferFormat,
		sample_rate: u32,
		data: &[u8],
	) -> Result<(), DeviceError>;

	/// Append `buffer` to the back of the play queue.
	fn queue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError>;

	/// Remove `buffer` from the front of the play queue.
	///
	/// `buffer` must be at the head of the queue and processed.
	fn unqueue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError>;

	/// How many buffers, from the head of the queue, have been played.
	fn processed(&mut self) -> Result<usize, DeviceError>;

	/// How many buffers are in the play queue (processed or not).
	fn queued(&mut self) -> Result<usize, DeviceError>;

	/// The current play state of the voice.
	fn state(&mut self) -> Result<PlayState, DeviceError>;

	/// Start (or resume) playback.
	///
	/// Playing a stopped voice restarts its queue from the head.
	fn play(&mut self) -> Result<(), DeviceError>;

	/// Pause playback, keeping the position.
	fn pause(&mut self) -> Result<(), DeviceError>;

	/// Stop playback, every queued buffer becomes processed.
	fn stop(&mut self) -> Result<(), DeviceError>;

	/// Return to [`PlayState::Initial`], every queued buffer becomes unprocessed.
	fn rewind(&mut self) -> Result<(), DeviceError>;
}

impl<D: AudioDevice + ?Sized> AudioDevice for &mut D {
	#[inline]
	fn gen_buffers(&mut self, count: usize) -> Result<Vec<BufferId>, DeviceError> {
		(**self).gen_buffers(count)
	}

	#[inline]
	fn delete_buffers(&mut self, buffers: &[BufferId]) -> Result<(), DeviceError> {
		(**self).delete_buffers(buffers)
	}

	#[inline]
	fn buffer_data(
		&mut self,
		buffer: BufferId,
		format: BufferFormat,
		sample_rate: u32,
		data: &[u8],
	) -> Result<(), DeviceError> {
		(**self).buffer_data(buffer, format, sample_rate, data)
	}

	#[inline]
	fn queue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError> {
		(**self).queue_buffer(buffer)
	}

	#[inline]
	fn unqueue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError> {
		(**self).unqueue_buffer(buffer)
	}

	#[inline]
	fn processed(&mut self) -> Result<usize, DeviceError> {
		(**self).processed()
	}

	#[inline]
	fn queued(&mut self) -> Result<usize, DeviceError> {
		(**self).queued()
	}

	#[inline]
	fn state(&mut self) -> Result<PlayState, DeviceError> {
		(**self).state()
	}

	#[inline]
	fn play(&mut self) -> Result<(), DeviceError> {
		(**self).play()
	}

	#[inline]
	fn pause(&mut self) -> Result<(), DeviceError> {
		(**self).pause()
	}

	#[inline]
	fn stop(&mut self) -> Result<(), DeviceError> {
		(**self).stop()
	}

	#[inline]
	fn rewind(&mut self) -> Result<(), DeviceError> {
		(**self).rewind()
	}
}
