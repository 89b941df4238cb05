//! `StreamingSource`, a voice fed from a `BufferPool`.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	config::StreamConfig,
	device::AudioDevice,
	error::{StreamError,Underrun},
	pool::BufferPool,
	source::ChunkProducer,
	state::{PlayState,SourceState},
	stream::Tick,
	macros::{error2,warn2,info2,debug2,trace2},
};

//---------------------------------------------------------------------------------------------------- StreamingSource
/// A playback voice streaming from a ring of buffers.
///
/// The source owns the [`AudioDevice`] (the voice), and a
/// [`BufferPool`] which owns the [`ChunkProducer`].
///
/// On construction, the pool is filled and every buffer is queued.
/// After [`Self::play`], the owner must call [`Self::service`]
/// periodically: each call reclaims the buffers the device has
/// finished playing, refills them and queues them again. Once the
/// producer runs out, the remaining buffers are drained and the
/// source stops by itself.
///
/// There is no background thread. If [`Self::service`] is not called
/// often enough, the device plays every queued buffer and stops, this
/// is reported as an [`Underrun`].
///
/// [`PlayState::Stopped`] is terminal, a new source
/// (and producer) is required to stream again.
///
/// Dropping the source stops the voice and releases its buffers.
#[derive(Debug)]
pub struct StreamingSource<D: AudioDevice, P: ChunkProducer = Box<dyn ChunkProducer>> {
	/// The voice.
	device: D,
	/// The buffers (and producer).
	pool: BufferPool<P>,
	/// Settings given at construction.
	config: StreamConfig,
	/// Our state, set on command.
	play_state: PlayState,
	/// `false` once the producer ran out (or streaming was ended).
	continue_streaming: bool,
	/// How many underruns were seen.
	underruns: usize,
	/// The current underrun was already counted.
	stalled: bool,
}

//---------------------------------------------------------------------------------------------------- Construction
impl<D: AudioDevice, P: ChunkProducer> StreamingSource<D, P> {
	/// Create a source with `buffer_count` buffers.
	///
	/// Every other setting is [`StreamConfig::DEFAULT`].
	///
	/// # Errors
	/// See [`Self::with_config`].
	pub fn new(device: D, producer: P, buffer_count: usize) -> Result<Self, StreamError> {
		Self::with_config(device, producer, StreamConfig::with_buffer_count(buffer_count))
	}

	/// Create a source, fill its buffers and queue them on `device`.
	///
	/// If the producer yields fewer chunks than there are buffers,
	/// the pool shrinks and the source starts with
	/// [`Self::continue_streaming`] already `false`.
	///
	/// # Errors
	/// - [`StreamError::Configuration`] if `config` is invalid (e.g. less than 2 buffers)
	/// - [`StreamError::Allocation`] if the device could not allocate a buffer
	/// - [`StreamError::Device`] if the device rejected the initial fill
	pub fn with_config(mut device: D, producer: P, config: StreamConfig) -> Result<Self, StreamError> {
		config.validate()?;

		let pool = BufferPool::new(&mut device, producer, config.buffer_count)?;

		let mut this = Self {
			continue_streaming: !pool.exhausted(),
			device,
			pool,
			config,
			play_state: PlayState::DEFAULT,
			underruns: 0,
			stalled: false,
		};

		// On error, `Drop` releases the pool.
		this.pool.queue_all(&mut this.device)?;

		debug2!(
			"StreamingSource - queued {}/{} buffers, continue_streaming: {}",
			this.pool.queued(),
			this.pool.requested_count(),
			this.continue_streaming,
		);

		Ok(this)
	}
}

//---------------------------------------------------------------------------------------------------- Commands
impl<D: AudioDevice, P: ChunkProducer> StreamingSource<D, P> {
	/// Start (or resume) playback.
	///
	/// This also restarts a device that stopped because of an [`Underrun`].
	///
	/// # Errors
	/// [`StreamError::Transition`] if the source is stopped.
	pub fn play(&mut self) -> Result<(), StreamError> {
		let next = self.transition(self.play_state.play(), PlayState::Playing)?;

		self.device.play()?;
		self.play_state = next;
		self.stalled = false;
		Ok(())
	}

	/// Pause playback, keeping every queued buffer.
	///
	/// Pausing a source that never played does nothing.
	///
	/// # Errors
	/// [`StreamError::Transition`] if the source is stopped.
	pub fn pause(&mut self) -> Result<(), StreamError> {
		let next = self.transition(self.play_state.pause(), PlayState::Paused)?;

		if next == PlayState::Paused {
			self.device.pause()?;
		}

		self.play_state = next;
		Ok(())
	}

	/// Stop playback and end streaming.
	///
	/// Every queued buffer is unqueued (best-effort),
	/// nothing will be refilled again.
	///
	/// Stopping is always allowed, stopping twice does nothing new.
	///
	/// # Errors
	/// If the device refuses to stop, nothing changes.
	pub fn stop(&mut self) -> Result<(), StreamError> {
		self.device.stop()?;

		let drained = self.drain(usize::MAX);
		debug2!("StreamingSource - stopped, drained {drained} buffers");

		self.play_state = self.play_state.stop();
		self.continue_streaming = false;
		Ok(())
	}

	/// Return to [`PlayState::Initial`].
	///
	/// The device plays its queue from the head again on the next [`Self::play`].
	///
	/// # Errors
	/// [`StreamError::Transition`] if the source is stopped.
	pub fn rewind(&mut self) -> Result<(), StreamError> {
		let next = self.transition(self.play_state.rewind(), PlayState::Initial)?;

		self.device.rewind()?;
		self.play_state = next;
		self.stalled = false;
		Ok(())
	}

	/// Validate a state transition.
	fn transition(&self, next: Option<PlayState>, to: PlayState) -> Result<PlayState, StreamError> {
		next.ok_or(StreamError::Transition { from: self.play_state, to })
	}
}

//---------------------------------------------------------------------------------------------------- Service
impl<D: AudioDevice, P: ChunkProducer> StreamingSource<D, P> {
	/// Reclaim played buffers and refill them.
	///
	/// This must be called periodically while playing, often
	/// enough that the device never plays every queued buffer.
	///
	/// Does nothing unless the source is [`PlayState::Playing`].
	///
	/// While the producer has data, every buffer the device finished
	/// is unqueued, refilled and queued again, in ring order.
	/// Once it runs out, finished buffers are only unqueued. When
	/// the last one is unqueued, the source becomes [`PlayState::Stopped`].
	///
	/// If the device was found stopped with data left to stream,
	/// [`Tick::underrun`] is set. With [`StreamConfig::underrun_recovery`]
	/// playback is then restarted after the refill.
	///
	/// # Errors
	/// A device error while reclaiming leaves the ring untouched.
	///
	/// A device error while refilling drops that buffer from the
	/// ring and ends streaming, the rest of the queue still drains.
	pub fn service(&mut self) -> Result<Tick, StreamError> {
		let mut tick = Tick {
			continue_streaming: self.continue_streaming,
			..Tick::default()
		};

		if !self.play_state.is_playing() {
			return Ok(tick);
		}

		let device_state  = self.device.state()?;
		let mut processed = self.device.processed()?;
		tick.underrun     = self.check_underrun(device_state, processed);

		if self.continue_streaming {
			while processed > 0 {
				processed -= 1;
				match self.pool.recycle(&mut self.device) {
					Ok(true) => tick.refilled += 1,
					Ok(false) => {
						debug2!("StreamingSource - producer exhausted, draining");
						self.continue_streaming = false;
						break;
					},
					Err(e) => {
						error2!("StreamingSource - refill failed after {} refills: {e}", tick.refilled);
						self.continue_streaming = !self.pool.exhausted();
						return Err(e);
					},
				}
			}
		}

		if !self.continue_streaming {
			tick.drained = self.drain(processed);
		}

		trace2!(
			"StreamingSource - tick: refilled {}, drained {}, cursor {}",
			tick.refilled,
			tick.drained,
			self.pool.cursor(),
		);

		if !self.continue_streaming && self.pool.queued() == 0 {
			self.finish(device_state)?;
		} else if tick.underrun.is_some() && self.config.underrun_recovery && self.pool.queued() > 0 {
			info2!("StreamingSource - restarting playback after underrun");
			self.device.play()?;
			self.stalled = false;
		}

		debug_assert_eq!(self.pool.queued(), self.device.queued()?, "ring and device queue diverged");

		tick.continue_streaming = self.continue_streaming;
		Ok(tick)
	}

	/// Read the device's play state.
	///
	/// If the device stopped while this source is playing:
	/// - with audio left to play, an [`Underrun`] is reported
	/// - without, the stream finished: the rest of the
	///   queue is drained and the source becomes [`PlayState::Stopped`]
	///
	/// # Errors
	/// If the device could not be queried.
	pub fn state(&mut self) -> Result<SourceState, StreamError> {
		let play_state = self.device.state()?;
		let processed  = self.device.processed()?;
		let underrun   = self.check_underrun(play_state, processed);

		if play_state.is_stopped() && self.play_state.is_playing() && underrun.is_none() {
			self.continue_streaming = false;
			self.drain(processed);
			self.finish(play_state)?;
		}

		Ok(SourceState { play_state, underrun })
	}

	/// Report an underrun if the device stopped while there is still audio:
	/// either the producer has data left, or queued buffers were never played.
	///
	/// An underrun is counted once, until the device is seen playing again.
	fn check_underrun(&mut self, device_state: PlayState, processed: usize) -> Option<Underrun> {
		let unplayed = self.pool.queued().saturating_sub(processed);
		let starved  = !self.pool.exhausted() || unplayed > 0;

		if !(self.play_state.is_playing() && device_state.is_stopped() && starved) {
			self.stalled = false;
			return None;
		}

		if !self.stalled {
			self.stalled    = true;
			self.underruns += 1;
			warn2!(
				"StreamingSource - underrun #{}: device stopped with {} buffers, service() more often or use more buffers",
				self.underruns,
				self.pool.active_count(),
			);
		}

		Some(Underrun {
			buffers: self.pool.active_count(),
			count:   self.underruns,
		})
	}

	/// Unqueue up to `count` buffers without refilling, returning how many.
	fn drain(&mut self, count: usize) -> usize {
		let mut drained = 0;
		while drained < count && self.pool.drain_one(&mut self.device) {
			drained += 1;
		}
		drained
	}

	/// The queue is empty and nothing is left: stop.
	fn finish(&mut self, device_state: PlayState) -> Result<(), StreamError> {
		if !device_state.is_stopped() {
			self.device.stop()?;
		}

		debug2!("StreamingSource - stream drained, stopped");
		self.play_state = PlayState::Stopped;
		Ok(())
	}
}

//---------------------------------------------------------------------------------------------------- Teardown
impl<D: AudioDevice, P: ChunkProducer> StreamingSource<D, P> {
	/// Stop the voice and release every buffer.
	///
	/// Calling this again is a no-op.
	///
	/// # Errors
	/// If the device refuses to stop or release the buffers,
	/// this can be retried.
	pub fn destroy(&mut self) -> Result<(), StreamError> {
		if self.pool.is_destroyed() {
			return Ok(());
		}

		if self.play_state.is_active() || self.pool.queued() > 0 {
			self.device.stop()?;
		}
		self.drain(usize::MAX);

		self.play_state = PlayState::Stopped;
		self.continue_streaming = false;
		self.pool.destroy(&mut self.device)
	}
}

impl<D: AudioDevice, P: ChunkProducer> Drop for StreamingSource<D, P> {
	fn drop(&mut self) {
		if let Err(e) = self.destroy() {
			error2!("StreamingSource - failed to release buffers: {e}");
		}
	}
}

//---------------------------------------------------------------------------------------------------- Accessors
impl<D: AudioDevice, P: ChunkProducer> StreamingSource<D, P> {
	#[must_use]
	/// The voice.
	pub const fn device(&self) -> &D {
		&self.device
	}

	/// The voice, mutably.
	///
	/// Queueing or unqueueing buffers behind the
	/// source's back breaks its bookkeeping.
	pub fn device_mut(&mut self) -> &mut D {
		&mut self.device
	}

	#[must_use]
	/// The buffer ring.
	pub const fn pool(&self) -> &BufferPool<P> {
		&self.pool
	}

	#[must_use]
	/// The configuration this source was created with.
	pub const fn config(&self) -> &StreamConfig {
		&self.config
	}

	#[must_use]
	/// The play state, as last commanded (or reached by draining).
	pub const fn play_state(&self) -> PlayState {
		self.play_state
	}

	#[must_use]
	/// `true` while the producer is still supplying data.
	pub const fn continue_streaming(&self) -> bool {
		self.continue_streaming
	}

	#[must_use]
	/// How many underruns this source has seen.
	pub const fn underruns(&self) -> usize {
		self.underruns
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		device::{DeviceEvent,DummyDevice},
		error::{ConfigError,DeviceError},
		format::PcmSpec,
		source::ChunkQueue,
		tests::{chunks,source},
	};
	use pretty_assertions::assert_eq;
	use rand::{Rng,SeedableRng,rngs::StdRng};

	#[test]
	fn construction_queues_in_ring_order() {
		let s = source(4, 10);

		assert_eq!(s.pool().active_count(), 4);
		assert_eq!(s.pool().cursor(), 0);
		assert_eq!(s.pool().queued(), 4);
		assert_eq!(s.play_state(), PlayState::Initial);
		assert!(s.continue_streaming());

		let expected: Vec<_> = (0..4).map(|i| s.pool().slot(i).unwrap()).collect();
		assert_eq!(s.device().queue().collect::<Vec<_>>(), expected);
	}

	#[test]
	fn single_buffer_is_rejected() {
		let result = StreamingSource::new(DummyDevice::new(), chunks(5), 1);
		assert_eq!(
			result.unwrap_err(),
			StreamError::Configuration(ConfigError::BufferCount { count: 1, min: 2 }),
		);
	}

	#[test]
	fn short_producer_starts_draining() {
		let mut s = source(3, 2);
		assert_eq!(s.pool().active_count(), 2);
		assert!(s.pool().exhausted());
		assert!(!s.continue_streaming());

		s.play().unwrap();
		s.device_mut().consume_buffers(2);

		let state = s.state().unwrap();
		assert_eq!(state, SourceState { play_state: PlayState::Stopped, underrun: None });
		assert_eq!(s.play_state(), PlayState::Stopped);
		assert_eq!(s.pool().queued(), 0);
	}

	#[test]
	fn empty_producer_stops_on_first_tick() {
		let mut s = source(2, 0);
		assert_eq!(s.pool().active_count(), 0);

		s.play().unwrap();
		let tick = s.service().unwrap();
		assert!(!tick.continue_streaming());
		assert_eq!(tick.underrun, None);
		assert_eq!(s.play_state(), PlayState::Stopped);
	}

	#[test]
	fn sufficient_supply_drains_and_stops() {
		let mut s = source(2, 5);
		s.play().unwrap();

		// 3 refill cycles.
		for k in 1..=3 {
			assert_eq!(s.device_mut().consume_buffers(1), 1);
			let tick = s.service().unwrap();
			assert_eq!(tick, Tick { continue_streaming: true, refilled: 1, drained: 0, underrun: None });
			assert_eq!(s.pool().cursor(), k % 2);
		}

		// The 4th finds the producer exhausted, that slot leaves the ring.
		assert_eq!(s.device_mut().consume_buffers(1), 1);
		let tick = s.service().unwrap();
		assert_eq!(tick, Tick { continue_streaming: false, refilled: 0, drained: 0, underrun: None });
		assert!(s.pool().exhausted());
		assert_eq!(s.pool().queued(), 1);
		assert_eq!(s.device_mut().queued().unwrap(), 1);

		// The last buffer plays out, the device stops by itself.
		assert_eq!(s.device_mut().consume_buffers(1), 1);
		let tick = s.service().unwrap();
		assert_eq!(tick, Tick { continue_streaming: false, refilled: 0, drained: 1, underrun: None });
		assert_eq!(s.play_state(), PlayState::Stopped);

		let state = s.state().unwrap();
		assert_eq!(state, SourceState { play_state: PlayState::Stopped, underrun: None });
		assert_eq!(s.underruns(), 0);

		// Every chunk was loaded exactly once.
		let loaded = s.device().events().iter().filter(|e| matches!(e, DeviceEvent::Loaded { .. })).count();
		assert_eq!(loaded, 5);
	}

	#[test]
	fn infrequent_service_underruns() {
		let mut s = source(2, 5);
		s.play().unwrap();

		// Both buffers play before a single tick.
		assert_eq!(s.device_mut().consume_buffers(2), 2);

		let state = s.state().unwrap();
		assert_eq!(state.play_state, PlayState::Stopped);
		assert_eq!(state.underrun, Some(Underrun { buffers: 2, count: 1 }));
		assert!(!s.pool().exhausted());

		// The tick refills, reports the same underrun, but does not restart.
		let tick = s.service().unwrap();
		assert_eq!(tick.refilled, 2);
		assert_eq!(tick.underrun, Some(Underrun { buffers: 2, count: 1 }));
		assert!(tick.continue_streaming());
		assert_eq!(s.device_mut().state().unwrap(), PlayState::Stopped);
		assert_eq!(s.underruns(), 1);

		// The owner restarts.
		s.play().unwrap();
		let tick = s.service().unwrap();
		assert_eq!(tick.underrun, None);
		assert_eq!(s.device_mut().state().unwrap(), PlayState::Playing);
		assert_eq!(s.underruns(), 1);
	}

	#[test]
	fn underrun_recovery_restarts() {
		let config = StreamConfig {
			buffer_count: 2,
			underrun_recovery: true,
			..StreamConfig::DEFAULT
		};
		let mut s = StreamingSource::with_config(DummyDevice::new(), chunks(10), config).unwrap();
		s.play().unwrap();

		s.device_mut().consume_buffers(2);
		let tick = s.service().unwrap();
		assert_eq!(tick.refilled, 2);
		assert_eq!(tick.underrun, Some(Underrun { buffers: 2, count: 1 }));
		assert_eq!(s.device_mut().state().unwrap(), PlayState::Playing);

		// Again.
		s.device_mut().consume_buffers(2);
		let tick = s.service().unwrap();
		assert_eq!(tick.underrun, Some(Underrun { buffers: 2, count: 2 }));
		assert_eq!(s.underruns(), 2);
	}

	#[test]
	fn drain_only_unqueues() {
		let mut s = source(3, 7);
		s.play().unwrap();

		loop {
			s.device_mut().consume_buffers(1);
			if !s.service().unwrap().continue_streaming() {
				break;
			}
		}

		s.device_mut().take_events();
		while s.play_state() != PlayState::Stopped {
			let before = s.pool().cursor();
			s.device_mut().consume_buffers(1);
			let tick = s.service().unwrap();
			assert_eq!(tick.refilled, 0);
			assert_eq!(s.pool().cursor(), (before + tick.drained) % 3);
		}

		for event in s.device().events() {
			assert!(
				matches!(event, DeviceEvent::Processed(_) | DeviceEvent::Unqueued(_)),
				"unexpected event while draining: {event:?}",
			);
		}
		assert_eq!(s.pool().queued(), 0);
	}

	#[test]
	fn pause_makes_service_a_noop() {
		let mut s = source(2, 5);
		s.play().unwrap();
		s.device_mut().consume_buffers(1);
		s.pause().unwrap();
		assert_eq!(s.play_state(), PlayState::Paused);

		s.device_mut().take_events();
		let tick = s.service().unwrap();
		assert_eq!(tick, Tick { continue_streaming: true, ..Tick::default() });
		assert!(s.device().events().is_empty());

		// Resuming picks up the played buffer.
		s.play().unwrap();
		assert_eq!(s.service().unwrap().refilled, 1);
	}

	#[test]
	fn pause_before_play_is_a_noop() {
		let mut s = source(2, 5);
		s.pause().unwrap();
		assert_eq!(s.play_state(), PlayState::Initial);
		assert!(!s.device().events().contains(&DeviceEvent::Pause));
	}

	#[test]
	fn stopped_is_terminal() {
		let mut s = source(2, 5);
		s.play().unwrap();
		s.stop().unwrap();

		assert_eq!(s.play_state(), PlayState::Stopped);
		assert!(!s.continue_streaming());
		assert_eq!(s.pool().queued(), 0);
		assert_eq!(s.device().queue().count(), 0);

		assert_eq!(s.play(), Err(StreamError::Transition { from: PlayState::Stopped, to: PlayState::Playing }));
		assert_eq!(s.pause(), Err(StreamError::Transition { from: PlayState::Stopped, to: PlayState::Paused }));
		assert_eq!(s.rewind(), Err(StreamError::Transition { from: PlayState::Stopped, to: PlayState::Initial }));

		let tick = s.service().unwrap();
		assert_eq!(tick, Tick::default());

		// Stopping again is fine.
		s.stop().unwrap();
	}

	#[test]
	fn stop_from_paused_drains() {
		let mut s = source(3, 10);
		s.play().unwrap();
		s.device_mut().consume_buffers(1);
		s.pause().unwrap();
		assert_eq!(s.play_state(), PlayState::Paused);

		s.stop().unwrap();
		assert_eq!(s.play_state(), PlayState::Stopped);
		assert!(!s.continue_streaming());
		assert_eq!(s.pool().queued(), 0);
		assert_eq!(s.device().queue().count(), 0);
		assert_eq!(s.device_mut().state().unwrap(), PlayState::Stopped);

		// Nothing was refilled on the way out.
		let loaded = s.device().events().iter().filter(|e| matches!(e, DeviceEvent::Loaded { .. })).count();
		assert_eq!(loaded, 3);
	}

	#[test]
	fn rewind_returns_to_initial() {
		let mut s = source(2, 5);
		s.play().unwrap();
		s.rewind().unwrap();
		assert_eq!(s.play_state(), PlayState::Initial);
		assert_eq!(s.device_mut().state().unwrap(), PlayState::Initial);

		// Nothing is serviced until playing again.
		assert_eq!(s.service().unwrap().refilled, 0);
		s.play().unwrap();
		assert_eq!(s.play_state(), PlayState::Playing);
	}

	#[test]
	fn refill_failure_ends_streaming() {
		// The 3rd chunk is not a whole frame.
		let queue = ChunkQueue::new(
			PcmSpec::STEREO_I16_44100,
			[vec![0_u8; 4], vec![0_u8; 4], vec![0_u8; 3], vec![0_u8; 4]],
		);
		let mut s = StreamingSource::new(DummyDevice::new(), queue, 2).unwrap();
		s.play().unwrap();

		s.device_mut().consume_buffers(1);
		assert_eq!(s.service(), Err(StreamError::Device(DeviceError::InvalidFormat)));
		assert!(!s.continue_streaming());
		assert_eq!(s.pool().queued(), 1);

		// The rest drains without an underrun.
		s.device_mut().consume_buffers(1);
		let tick = s.service().unwrap();
		assert_eq!(tick.drained, 1);
		assert_eq!(tick.underrun, None);
		assert_eq!(s.play_state(), PlayState::Stopped);
	}

	#[test]
	fn destroy_releases_everything() {
		let mut s = source(3, 10);
		s.play().unwrap();
		s.device_mut().consume_buffers(1);

		s.destroy().unwrap();
		assert_eq!(s.device().live_buffers(), 0);
		assert_eq!(s.device().queue().count(), 0);
		assert_eq!(s.play_state(), PlayState::Stopped);
		assert!(s.pool().is_destroyed());

		// Again is a no-op.
		let events = s.device().events().len();
		s.destroy().unwrap();
		assert_eq!(s.device().events().len(), events);
	}

	#[test]
	fn boxed_producer() {
		let producer: Box<dyn ChunkProducer> = Box::new(chunks(6));
		let mut s: StreamingSource<DummyDevice> = StreamingSource::new(DummyDevice::new(), producer, 2).unwrap();
		s.play().unwrap();

		let mut ticks = 0;
		while s.play_state() != PlayState::Stopped {
			s.device_mut().consume_buffers(1);
			s.service().unwrap();
			ticks += 1;
			assert!(ticks < 100);
		}
		assert_eq!(s.underruns(), 0);
	}

	/// Random consumption, random ticks, random pauses:
	/// the ring must always mirror the device queue, and
	/// every chunk must be loaded exactly once.
	#[test]
	fn random_schedule_keeps_ring_in_sync() {
		for seed in 0..64 {
			let mut rng     = StdRng::seed_from_u64(seed);
			let buffers     = rng.gen_range(2..=6);
			let chunk_count = rng.gen_range(0..=30);

			let mut s = source(buffers, chunk_count);
			s.play().unwrap();

			let mut refills = 0;
			let mut steps   = 0;
			while s.play_state() != PlayState::Stopped {
				steps += 1;
				assert!(steps < 10_000, "seed {seed} never finished");

				match rng.gen_range(0..10) {
					0 => s.pause().unwrap(),
					1 | 2 => s.play().unwrap(),
					_ => { s.device_mut().consume_buffers(rng.gen_range(0..=buffers)); },
				}

				// Occasionally skip a tick.
				if rng.gen_bool(0.2) {
					continue;
				}

				let before    = s.pool().cursor();
				let active    = s.pool().active_count();
				let streaming = s.continue_streaming();
				let tick      = s.service().unwrap();
				refills += tick.refilled;

				// Every reclaimed slot moves the cursor by 1.
				if active != 0 && streaming == tick.continue_streaming() {
					assert_eq!(s.pool().cursor(), (before + tick.refilled + tick.drained) % active, "seed {seed}");
				}

				// The owner restarts after an underrun.
				if tick.underrun.is_some() && s.play_state() != PlayState::Stopped {
					s.play().unwrap();
				}

				let ring: Vec<_>  = s.pool().queued_slots().collect();
				let queue: Vec<_> = s.device().queue().collect();
				assert_eq!(ring, queue, "seed {seed}");
			}

			let loaded = s.device().events().iter().filter(|e| matches!(e, DeviceEvent::Loaded { .. })).count();
			assert_eq!(loaded, chunk_count, "seed {seed}");
			assert_eq!(refills, chunk_count.saturating_sub(s.pool().active_count()), "seed {seed}");
			assert!(!s.continue_streaming());
			assert_eq!(s.pool().queued(), 0);
		}
	}
}
