//! Audio hardware output.
//!
//! This file implements the abstract `AudioDevice`
//! trait using `cpal` as a backend.
//!
//! `cpal` pulls samples from a callback on its own thread, so the
//! buffer queue is emulated on top of it: loaded buffers are converted
//! to `f32` frames matching the stream, queued buffers are sent to the
//! callback over a channel, and the callback reports every buffer it
//! finished back over another channel.
//!
//! For documentation on `AudioDevice`, see `mod.rs`.

//----------------------------------------------------------------------------------------------- use
use crate::{
	device::{AudioDevice,BufferId},
	error::DeviceError,
	format::{BufferFormat,PcmSpec},
	state::PlayState,
	macros::{trace2,debug2,error2},
};
use crossbeam::channel::{Sender,Receiver};
use std::{
	borrow::Cow,
	collections::{HashMap,VecDeque},
	sync::{
		Arc,
		atomic::{AtomicU64,Ordering},
	},
};
use cpal::traits::{DeviceTrait,StreamTrait,HostTrait};

//----------------------------------------------------------------------------------------------- Packet
/// A queued buffer, on its way to the audio callback.
struct Packet {
	/// Packets from an older generation were discarded (stop/rewind).
	generation: u64,
	buffer: BufferId,
	samples: Arc<[f32]>,
}

/// The audio callback finished playing a buffer.
struct Finished {
	generation: u64,
	buffer: BufferId,
}

//----------------------------------------------------------------------------------------------- CpalDevice
/// A voice on the default `cpal` output device.
pub struct CpalDevice {
	/// The actual audio stream.
	stream: cpal::Stream,

	/// Stream channel count.
	channels: usize,
	/// Stream sample rate.
	sample_rate: u32,

	/// The next handle to hand out.
	next_id: u32,
	/// Live buffers, converted to stream frames.
	buffers: HashMap<BufferId, Arc<[f32]>>,
	/// The play queue, front is the head.
	queue: VecDeque<BufferId>,
	/// How many buffers from the head of `queue` were played.
	processed: usize,
	/// Current play state.
	state: PlayState,

	/// Bumped to make the callback drop everything in flight.
	generation: Arc<AtomicU64>,
	/// Queued buffers are sent to the callback through this.
	to_callback: Sender<Packet>,
	/// Finished buffers come back through this.
	from_callback: Receiver<Finished>,
	/// Errors the stream hit on its own thread.
	error: Receiver<cpal::StreamError>,
}

impl std::fmt::Debug for CpalDevice {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CpalDevice")
			.field("channels", &self.channels)
			.field("sample_rate", &self.sample_rate)
			.field("buffers", &self.buffers.len())
			.field("queue", &self.queue)
			.field("processed", &self.processed)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl CpalDevice {
	#[cold]
	#[inline(never)]
	/// Open a voice on the default output device.
	///
	/// The stream is opened with `spec`'s channel count (at least stereo)
	/// and sample rate where the platform allows it. Buffers loaded with
	/// another sample rate are rejected, there is no resampling.
	///
	/// The voice starts in [`PlayState::Initial`].
	///
	/// # Errors
	/// If there is no output device, or it cannot play `f32` audio.
	pub fn open(spec: PcmSpec) -> Result<Self, DeviceError> {
		debug2!("CpalDevice - open(), spec: {spec:?}");

		if spec.sample_rate == 0 {
			return Err(DeviceError::InvalidFormat);
		}
		let channels = std::cmp::max(usize::from(spec.channels), 2);

		let host = cpal::default_host();
		let Some(device) = host.default_output_device() else {
			return Err(DeviceError::DeviceUnavailable);
		};

		let supported = device.default_output_config()?;
		debug2!("CpalDevice - device_config:\n{supported:#?}");

		// SOMEDAY: support non-f32.
		if supported.sample_format() != cpal::SampleFormat::F32 {
			return Err(DeviceError::InvalidFormat);
		}

		let config = if cfg!(windows) {
			supported.config()
		} else {
			cpal::StreamConfig {
				channels:    channels as cpal::ChannelCount,
				sample_rate: cpal::SampleRate(spec.sample_rate),
				buffer_size: cpal::BufferSize::Default,
			}
		};
		debug2!("CpalDevice - config:\n{config:#?}");

		let (to_callback, packets)       = crossbeam::channel::unbounded::<Packet>();
		let (finished, from_callback)    = crossbeam::channel::unbounded::<Finished>();
		let (error_send, error)          = crossbeam::channel::unbounded();
		let generation                   = Arc::new(AtomicU64::new(0));
		let generation_callback          = Arc::clone(&generation);

		// The packet being played and how far into it we are.
		let mut current: Option<(Packet, usize)> = None;

		// The actual callback `cpal` will call when polling for audio data.
		let data_callback = move |output: &mut [f32], _: &cpal::OutputCallbackInfo| {
			let now = generation_callback.load(Ordering::Acquire);
			let mut written = 0;

			while written < output.len() {
				// Drop anything from before a stop/rewind.
				if current.as_ref().is_some_and(|(p, _)| p.generation != now) {
					current = None;
				}

				if current.is_none() {
					match packets.try_recv() {
						Ok(p) if p.generation == now => current = Some((p, 0)),
						Ok(_) => continue,
						Err(_) => break,
					}
				}

				let Some((packet, position)) = current.as_mut() else {
					break;
				};

				let left = &packet.samples[*position..];
				let n = left.len().min(output.len() - written);
				output[written..written + n].copy_from_slice(&left[..n]);
				written  += n;
				*position += n;

				if *position == packet.samples.len() {
					drop(finished.try_send(Finished {
						generation: packet.generation,
						buffer:     packet.buffer,
					}));
					current = None;
				}
			}

			// Silence for whatever we had nothing for.
			output[written..].fill(0.0);
		};

		// The callback `cpal` will call when errors occur.
		let error_callback = move |error: cpal::StreamError| {
			drop(error_send.try_send(error));
		};

		let stream = device.build_output_stream(&config, data_callback, error_callback, None)?;

		// Some backends start streams on creation.
		stream.pause()?;

		Ok(Self {
			stream,
			channels: usize::from(config.channels),
			sample_rate: config.sample_rate.0,
			next_id: 0,
			buffers: HashMap::new(),
			queue: VecDeque::new(),
			processed: 0,
			state: PlayState::Initial,
			generation,
			to_callback,
			from_callback,
			error,
		})
	}

	//------------------------------------------------------------------ Private
	/// Forward an error the stream hit on its own thread.
	fn check_error(&self) -> Result<(), DeviceError> {
		match self.error.try_recv() {
			Ok(error) => {
				error2!("CpalDevice - stream error: {error}");
				Err(error.into())
			},
			Err(_) => Ok(()),
		}
	}

	/// Count the buffers the callback reported as finished.
	fn collect_finished(&mut self) {
		let now = self.generation.load(Ordering::Acquire);

		while let Ok(f) = self.from_callback.try_recv() {
			if f.generation != now || self.processed >= self.queue.len() {
				continue;
			}
			debug_assert_eq!(self.queue.get(self.processed), Some(&f.buffer));
			trace2!("CpalDevice - processed {}", f.buffer);
			self.processed += 1;
		}

		// A playing voice with nothing left to play stops itself.
		if self.state.is_playing() && self.processed == self.queue.len() {
			debug2!("CpalDevice - queue ran dry, stopping");
			self.state = PlayState::Stopped;
			drop(self.stream.pause());
		}
	}

	/// Drop everything in flight and re-send the whole queue.
	fn restart_queue(&mut self) -> Result<(), DeviceError> {
		let now = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
		self.processed = 0;

		for buffer in &self.queue {
			let samples = self.buffers.get(buffer).ok_or(DeviceError::InvalidBuffer(*buffer))?;
			self.send(now, *buffer, samples)?;
		}

		Ok(())
	}

	/// Send a buffer to the callback.
	fn send(&self, generation: u64, buffer: BufferId, samples: &Arc<[f32]>) -> Result<(), DeviceError> {
		self.to_callback
			.send(Packet { generation, buffer, samples: Arc::clone(samples) })
			.map_err(|_| DeviceError::StreamClosed)
	}

	/// Convert interleaved PCM in `format` into stream frames.
	fn convert(&self, format: BufferFormat, data: &[u8]) -> Vec<f32> {
		let sample_bytes = format.bytes_per_sample();
		let in_channels  = usize::from(format.channels());
		let frames       = data.len() / format.frame_bytes();

		let mut vec = Vec::with_capacity(frames * self.channels);
		for frame in data.chunks_exact(format.frame_bytes()) {
			let left = format.sample_to_f32(&frame[..sample_bytes]);
			let right = if in_channels == 2 {
				format.sample_to_f32(&frame[sample_bytes..])
			} else {
				left
			};

			match self.channels {
				1 => vec.push((left + right) / 2.0),
				n => {
					vec.push(left);
					vec.push(right);
					// Anything past stereo is silent.
					vec.extend(std::iter::repeat(0.0).take(n - 2));
				},
			}
		}

		vec
	}
}

//----------------------------------------------------------------------------------------------- `AudioDevice` Impl
impl AudioDevice for CpalDevice {
	fn gen_buffers(&mut self, count: usize) -> Result<Vec<BufferId>, DeviceError> {
		let mut vec = Vec::with_capacity(count);
		for _ in 0..count {
			self.next_id = self.next_id.checked_add(1).ok_or(DeviceError::OutOfMemory)?;
			let buffer = BufferId::new(self.next_id);
			self.buffers.insert(buffer, Arc::from(Vec::new()));
			vec.push(buffer);
		}
		Ok(vec)
	}

	fn delete_buffers(&mut self, buffers: &[BufferId]) -> Result<(), DeviceError> {
		for buffer in buffers {
			if !self.buffers.contains_key(buffer) {
				return Err(DeviceError::InvalidBuffer(*buffer));
			}
			if self.queue.contains(buffer) {
				return Err(DeviceError::BufferInUse(*buffer));
			}
		}

		for buffer in buffers {
			self.buffers.remove(buffer);
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
		if !self.buffers.contains_key(&buffer) {
			return Err(DeviceError::InvalidBuffer(buffer));
		}
		if self.queue.contains(&buffer) {
			return Err(DeviceError::BufferInUse(buffer));
		}
		if sample_rate != self.sample_rate || data.len() % format.frame_bytes() != 0 {
			return Err(DeviceError::InvalidFormat);
		}

		let samples = Arc::from(self.convert(format, data));
		self.buffers.insert(buffer, samples);
		Ok(())
	}

	fn queue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError> {
		let Some(samples) = self.buffers.get(&buffer) else {
			return Err(DeviceError::InvalidBuffer(buffer));
		};
		if self.queue.contains(&buffer) {
			return Err(DeviceError::BufferInUse(buffer));
		}

		// A stopped voice replays its queue on `play()`, not now.
		if !self.state.is_stopped() {
			self.send(self.generation.load(Ordering::Acquire), buffer, samples)?;
		}

		self.queue.push_back(buffer);
		Ok(())
	}

	fn unqueue_buffer(&mut self, buffer: BufferId) -> Result<(), DeviceError> {
		self.collect_finished();

		if self.queue.front() != Some(&buffer) {
			return Err(DeviceError::QueueOrder(buffer));
		}
		if self.processed == 0 {
			return Err(DeviceError::NotProcessed(buffer));
		}

		self.queue.pop_front();
		self.processed -= 1;
		Ok(())
	}

	fn processed(&mut self) -> Result<usize, DeviceError> {
		self.check_error()?;
		self.collect_finished();
		Ok(self.processed)
	}

	fn queued(&mut self) -> Result<usize, DeviceError> {
		Ok(self.queue.len())
	}

	fn state(&mut self) -> Result<PlayState, DeviceError> {
		self.check_error()?;
		self.collect_finished();
		Ok(self.state)
	}

	fn play(&mut self) -> Result<(), DeviceError> {
		debug2!("CpalDevice - play()");

		if self.state.is_stopped() {
			self.restart_queue()?;
		}

		self.stream.play()?;
		self.state = PlayState::Playing;
		self.collect_finished();
		Ok(())
	}

	fn pause(&mut self) -> Result<(), DeviceError> {
		debug2!("CpalDevice - pause()");

		if self.state.is_playing() {
			self.stream.pause()?;
			self.state = PlayState::Paused;
		}
		Ok(())
	}

	fn stop(&mut self) -> Result<(), DeviceError> {
		debug2!("CpalDevice - stop()");

		self.stream.pause()?;
		self.generation.fetch_add(1, Ordering::AcqRel);
		self.processed = self.queue.len();
		self.state = PlayState::Stopped;
		Ok(())
	}

	fn rewind(&mut self) -> Result<(), DeviceError> {
		debug2!("CpalDevice - rewind()");

		self.stream.pause()?;
		self.restart_queue()?;
		self.state = PlayState::Initial;
		Ok(())
	}
}

//----------------------------------------------------------------------------------------------- Error re-map
impl From<cpal::DefaultStreamConfigError> for DeviceError {
	fn from(error: cpal::DefaultStreamConfigError) -> Self {
		use cpal::DefaultStreamConfigError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::StreamTypeNotSupported => Self::InvalidFormat,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::StreamError> for DeviceError {
	fn from(error: cpal::StreamError) -> Self {
		use cpal::StreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::BuildStreamError> for DeviceError {
	fn from(error: cpal::BuildStreamError) -> Self {
		use cpal::BuildStreamError as E;
		match error {
			E::DeviceNotAvailable | E::InvalidArgument | E::StreamIdOverflow => Self::DeviceUnavailable,
			E::StreamConfigNotSupported => Self::InvalidFormat,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::PlayStreamError> for DeviceError {
	fn from(error: cpal::PlayStreamError) -> Self {
		use cpal::PlayStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::PauseStreamError> for DeviceError {
	fn from(error: cpal::PauseStreamError) -> Self {
		use cpal::PauseStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}
