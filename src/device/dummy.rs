//! Dummy audio device.
//!
//! This file implements the abstract `AudioDevice`
//! trait using a simulated voice.
//!
//! Nothing is played, time does not pass on its own:
//! the owner advances playback with [`DummyDevice::consume_buffers`]
//! or [`DummyDevice::consume_bytes`].
//!
//! Functionally, it should behave the exact same as
//! other backends, including rejecting everything the
//! [`AudioDevice`] invariants forbid, which makes it
//! the device used for testing.

//----------------------------------------------------------------------------------------------- use
use crate::{
	device::{AudioDevice,BufferId},
	error::DeviceError,
	format::BufferFormat,
	state::PlayState,
	macros::{trace2,debug2},
};
use std::collections::{BTreeMap,VecDeque};

//----------------------------------------------------------------------------------------------- DeviceEvent
/// Something that happened on a [`DummyDevice`].
///
/// Every successful [`AudioDevice`] call is recorded, in order.
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
pub enum DeviceEvent {
	/// A buffer was allocated.
	Generated(BufferId),
	/// A buffer was released.
	Deleted(BufferId),
	/// A buffer was loaded with `bytes` bytes.
	Loaded {
		/// The buffer.
		buffer: BufferId,
		/// How many bytes of PCM it now holds.
		bytes: usize,
	},
	/// A buffer was appended to the queue.
	Queued(BufferId),
	/// A buffer was removed from the queue.
	Unqueued(BufferId),
	/// A buffer finished playing.
	Processed(BufferId),
	/// `play()`
	Play,
	/// `pause()`
	Pause,
	/// `stop()`
	Stop,
	/// `rewind()`
	Rewind,
}

//----------------------------------------------------------------------------------------------- DummyDevice
/// A simulated voice.
#[derive(Clone,Debug,Default)]
pub struct DummyDevice {
	/// The next handle to hand out.
	next_id: u32,
	/// If `Some`, no more than this many buffers can be alive.
	buffer_limit: Option<usize>,
	/// Live buffers and how many bytes they hold.
	buffers: BTreeMap<BufferId, usize>,
	/// The play queue, front is the head.
	queue: VecDeque<BufferId>,
	/// How many buffers from the head of `queue` were played.
	///
	/// INVARIANT: `processed <= queue.len()`
	processed: usize,
	/// How many bytes of the first unprocessed buffer were played.
	offset: usize,
	/// Current play state.
	state: PlayState,
	/// Everything that happened.
	events: Vec<DeviceEvent>,
}

impl DummyDevice {
	#[must_use]
	/// A device with unlimited buffers.
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	/// A device that can only keep `limit` buffers alive at once.
	///
	/// This simulates a backend running out of buffer memory.
	pub fn with_buffer_limit(limit: usize) -> Self {
		Self {
			buffer_limit: Some(limit),
			..Self::default()
		}
	}

	/// Play the next `count` buffers to completion.
	///
	/// Returns how many buffers were actually finished, this
	/// is less than `count` if the queue ran dry (which stops
	/// the device) or if the device is not playing.
	pub fn consume_buffers(&mut self, count: usize) -> usize {
		if !self.state.is_playing() {
			return 0;
		}

		let mut finished = 0;
		while finished < count && self.processed < self.queue.len() {
			self.finish_head();
			finished += 1;
		}

		self.settle();
		finished
	}

	/// Play `bytes` bytes of audio, crossing buffers as needed.
	///
	/// Returns how many buffers were finished.
	pub fn consume_bytes(&mut self, mut bytes: usize) -> usize {
		if !self.state.is_playing() {
			return 0;
		}

		let mut finished = 0;
		while self.processed < self.queue.len() {
			let buffer = self.queue[self.processed];
			let len = self.buffers.get(&buffer).copied().unwrap_or(0);
			let left = len.saturating_sub(self.offset);

			if bytes < left {
				self.offset += bytes;
				break;
			}

			bytes -= left;
			self.finish_head();
			finished += 1;
		}

		self.settle();
		finished
	}

	/// Everything that happened on this device, oldest first.
	pub fn events(&self) -> &[DeviceEvent] {
		&self.events
	}

	/// Take (and clear) the event log.
	pub fn take_events(&mut self) -> Vec<DeviceEvent> {
		std::mem::take(&mut self.events)
	}

	/// The play queue, head first.
	pub fn queue(&self) -> impl Iterator<Item = BufferId> + '_ {
		self.queue.iter().copied()
	}

	/// The queued buffers not yet played, head first.
	pub fn pending(&self) -> impl Iterator<Item = BufferId> + '_ {
		self.queue.iter().skip(self.processed).copied()
	}

	#[must_use]
	/// How many buffers are allocated.
	pub fn live_buffers(&self) -> usize {
		self.buffers.len()
	}

	#[must_use]
	/// How many bytes `buffer` holds, `None` if it does not exist.
	pub fn loaded_bytes(&self, buffer: BufferId) -> Option<usize> {
		self.buffers.get(&buffer).copied()
	}

	//------------------------------------------------------------------ Private
	/// Mark the first unprocessed buffer as processed.
	fn finish_head(&mut self) {
		let buffer = self.queue[self.processed];
		trace2!("DummyDevice - processed {buffer}");
		self.processed += 1;
		self.offset = 0;
		self.events.push(DeviceEvent::Processed(buffer));
	}

	/// A playing voice with nothing left to play stops itself.
	fn settle(&mut self) {
		if self.state.is_playing() && self.processed == self.queue.len() {
			debug2!("DummyDevice - queue ran dry, stopping");
			self.state = PlayState::Stopped;
		}
	}

	/// Error if `buffer` is not alive.
	fn check_alive(&self, buffer: BufferId) -> Result<(), DeviceError> {
		if self.buffers.contains_key(&buffer) {
			Ok(())
		} else {
			Err(DeviceError::InvalidBuffer(buffer))
		}
	}

	/// Error if `buffer` is queued.
	fn check_not_queued(&self, buffer: BufferId) -> Result<(), DeviceError> {
		if self.queue.contains(&buffer) {
			Err(DeviceError::BufferInUse(buffer))
		} else {
			Ok(())
		}
	}
}

//----------------------------------------------------------------------------------------------- `AudioDevice` Impl
impl AudioDevice for DummyDevice {
	fn gen_buffers(&mut self, count: usize) -> Result<Vec<BufferId>, DeviceError> {
		let available = match self.buffer_limit {
			Some(limit) => limit.saturating_sub(self.buffers.len()),
			None => count,
		};

		if count > 0 && available == 0 {
			return Err(DeviceError::OutOfMemory);
		}

		let count = count.min(available);
		let mut vec = Vec::with_capacity(count);
		for _ in 0..count {
			self.next_id += 1;
			let buffer = BufferId::new(self.next_id);
			self.buffers.insert(buffer, 0);
			self.events.push(DeviceEvent::Generated(buffer));
			vec.push(buffer);
		}

		trace2!("DummyDevice - generated {count} buffers");
		Ok(vec)
	}

	fn delete_buffers(&mut self, buffers: &[BufferId]) -> Result<(), DeviceError> {
		for buffer in buffers {
			self.check_alive(*buffer)?;
			self.check_not_queued(*buffer)?;
		}

		for buffer in buffers {
			self.buffers.remove(buffer);
			self.events.push(DeviceEvent::Deleted(*buffer));
		}

		Ok(())
	}

	fn buffer_data(
		&mut self,
		buffer: BufferId,
		format: BufferFormat,
		sample_rate: u32,
		data: &[u8],
	) -> Result<(), DeviceError> {
		self.check_alive(buffer)?;
		self.check_not_queued(buffer)?;

		if sample_rate == 0 || data.len() % format.frame_bytes() != 0 {
			return Err(DeviceError::InvalidFormat);
		}

		self.buffers.insert(buffer, data.len());
		self.events.push(DeviceEvent::Loaded { buffer, bytes: data.len() });
		Ok(())
	}

	fn queue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError> {
		self.check_alive(buffer)?;
		self.check_not_queued(buffer)?;

		self.queue.push_back(buffer);
		self.events.push(DeviceEvent::Queued(buffer));
		Ok(())
	}

	fn unqueue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError> {
		self.check_alive(buffer)?;

		if self.queue.front() != Some(&buffer) {
			return Err(DeviceError::QueueOrder(buffer));
		}

		if self.processed == 0 {
			return Err(DeviceError::NotProcessed(buffer));
		}

		self.queue.pop_front();
		self.processed -= 1;
		self.events.push(DeviceEvent::Unqueued(buffer));
		Ok(())
	}

	fn processed(&mut self) -> Result<usize, DeviceError> {
		Ok(self.processed)
	}

	fn queued(&mut self) -> Result<usize, DeviceError> {
		Ok(self.queue.len())
	}

	fn state(&mut self) -> Result<PlayState, DeviceError> {
		Ok(self.state)
	}

	fn play(&mut self) -> Result<(), DeviceError> {
		debug2!("DummyDevice - play()");

		if self.state.is_stopped() {
			// Restart the queue from the head.
			self.processed = 0;
			self.offset = 0;
		}

		self.state = PlayState::Playing;
		self.events.push(DeviceEvent::Play);
		self.settle();
		Ok(())
	}

	fn pause(&mut self) -> Result<(), DeviceError> {
		debug2!("DummyDevice - pause()");

		if self.state.is_playing() {
			self.state = PlayState::Paused;
		}
		self.events.push(DeviceEvent::Pause);
		Ok(())
	}

	fn stop(&mut self) -> Result<(), DeviceError> {
		debug2!("DummyDevice - stop()");

		self.state = PlayState::Stopped;
		self.processed = self.queue.len();
		self.offset = 0;
		self.events.push(DeviceEvent::Stop);
		Ok(())
	}

	fn rewind(&mut self) -> Result<(), DeviceError> {
		debug2!("DummyDevice - rewind()");

		self.state = PlayState::Initial;
		self.processed = 0;
		self.offset = 0;
		self.events.push(DeviceEvent::Rewind);
		Ok(())
	}
}
