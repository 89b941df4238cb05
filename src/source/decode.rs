//! Encoded audio, decoded on demand with `symphonia`.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	error::SourceError,
	format::{PcmSpec,SampleFormat},
	source::{ChunkProducer,frame_aligned},
	macros::{debug2,warn2,error2},
};
use std::{
	ffi::OsStr,
	fs::File,
	io::{Cursor,ErrorKind},
	path::Path,
};
use symphonia::core::{
	audio::SampleBuffer,
	codecs::{Decoder,DecoderOptions,CODEC_TYPE_NULL},
	errors::Error as SymphoniaError,
	formats::{FormatReader,FormatOptions},
	io::{MediaSourceStream,MediaSourceStreamOptions},
	meta::{MetadataOptions,Limit},
	probe::Hint,
};
use symphonia::default::{get_probe,get_codecs};

//---------------------------------------------------------------------------------------------------- Constants
// `symphonia` format options.
//
// These are some misc options `Symphonia` needs.
// Most of these are the default values, but as `const`.

/// Gapless on, no seek index (we never seek).
pub(crate) const FORMAT_OPTIONS: FormatOptions = FormatOptions {
	enable_gapless: true,
	prebuild_seek_index: false,
	seek_index_fill_rate: 20,
};

/// Default metadata limits.
pub(crate) const METADATA_OPTIONS: MetadataOptions = MetadataOptions {
	limit_metadata_bytes: Limit::Default,
	limit_visual_bytes: Limit::Default,
};

/// Don't verify decoded audio against embedded checksums.
pub(crate) const DECODER_OPTIONS: DecoderOptions = DecoderOptions {
	verify: false,
};

/// 64KiB read-ahead.
pub(crate) const MEDIA_SOURCE_STREAM_OPTIONS: MediaSourceStreamOptions = MediaSourceStreamOptions {
	buffer_len: 64 * 1024,
};

//---------------------------------------------------------------------------------------------------- DecodeProducer
/// A [`ChunkProducer`] decoding a file (or bytes) of encoded audio.
///
/// Every format/codec `symphonia` supports is accepted.
/// The first track with a known codec is decoded into
/// interleaved [`SampleFormat::I16`] PCM, in chunks of
/// `chunk_bytes` (rounded down to whole frames).
///
/// Packets that fail to decode are skipped. Any other
/// error ends the stream early, it can be inspected
/// afterwards with [`DecodeProducer::error`].
pub struct DecodeProducer {
	/// The container.
	reader: Box<dyn FormatReader>,
	/// The codec of the selected track.
	decoder: Box<dyn Decoder>,
	/// The selected track.
	track_id: u32,
	spec: PcmSpec,
	chunk_bytes: usize,
	/// Re-used conversion buffer, re-created when a packet does not fit.
	samples: Option<SampleBuffer<i16>>,
	/// Decoded bytes not yet handed out.
	pending: Vec<u8>,
	/// How many bytes of `pending` were handed out last call.
	handed: usize,
	/// The container ran out of packets (or errored).
	done: bool,
	/// The error that ended the stream, if any.
	error: Option<SymphoniaError>,
}

impl DecodeProducer {
	/// Decode the audio file at `path`.
	///
	/// The file extension is used as a hint when probing.
	///
	/// # Errors
	/// If the file cannot be opened or is not decodable audio.
	pub fn from_path<P: AsRef<Path>>(path: P, chunk_bytes: usize) -> Result<Self, SourceError> {
		let path = path.as_ref();
		let file = File::open(path)?;

		let mut hint = Hint::new();
		if let Some(ext) = path.extension().and_then(OsStr::to_str) {
			hint.with_extension(ext);
		}

		let mss = MediaSourceStream::new(Box::new(file), MEDIA_SOURCE_STREAM_OPTIONS);
		Self::from_stream(mss, &hint, chunk_bytes)
	}

	/// Decode encoded audio held in memory.
	///
	/// # Errors
	/// If the bytes are not decodable audio.
	pub fn from_bytes(bytes: Vec<u8>, chunk_bytes: usize) -> Result<Self, SourceError> {
		let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), MEDIA_SOURCE_STREAM_OPTIONS);
		Self::from_stream(mss, &Hint::new(), chunk_bytes)
	}

	fn from_stream(mss: MediaSourceStream, hint: &Hint, chunk_bytes: usize) -> Result<Self, SourceError> {
		let reader = get_probe().format(
			hint,
			mss,
			&FORMAT_OPTIONS,
			&METADATA_OPTIONS
		)?.format;

		let codecs = get_codecs();

		// Select the first track with a known codec.
		let Some(track) = reader
			.tracks()
			.iter()
			.find(|t| {
				// Make sure it is not null.
				t.codec_params.codec != CODEC_TYPE_NULL &&
				// And it exists in our codec registry.
				codecs.get_codec(t.codec_params.codec).is_some()
			})
		else {
			return Err(SourceError::Track);
		};

		let Some(sample_rate) = track.codec_params.sample_rate else {
			return Err(SourceError::SampleRate);
		};

		let Some(channels) = track.codec_params.channels else {
			return Err(SourceError::Channels);
		};
		let Ok(channels) = u16::try_from(channels.count()) else {
			return Err(SourceError::Channels);
		};

		let decoder  = codecs.make(&track.codec_params, &DECODER_OPTIONS)?;
		let track_id = track.id;

		let spec = PcmSpec {
			channels,
			sample_rate,
			sample_format: SampleFormat::I16,
		};

		debug2!("DecodeProducer - track {track_id}, {channels} channel(s), {sample_rate}Hz");

		Ok(Self {
			reader,
			decoder,
			track_id,
			spec,
			chunk_bytes: frame_aligned(chunk_bytes, &spec),
			samples: None,
			pending: Vec::new(),
			handed: 0,
			done: false,
			error: None,
		})
	}

	#[must_use]
	/// The error that ended the stream early, if any.
	pub const fn error(&self) -> Option<&SymphoniaError> {
		self.error.as_ref()
	}

	/// Decode the next packet of our track into `pending`.
	fn decode_packet(&mut self) {
		let packet = match self.reader.next_packet() {
			Ok(packet) => packet,
			Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
				self.done = true;
				return;
			},
			Err(e) => {
				error2!("DecodeProducer - reader error, ending stream: {e}");
				self.done = true;
				self.error = Some(e);
				return;
			},
		};

		if packet.track_id() != self.track_id {
			return;
		}

		let decoded = match self.decoder.decode(&packet) {
			Ok(decoded) => decoded,
			Err(SymphoniaError::DecodeError(e)) => {
				warn2!("DecodeProducer - skipping packet: {e}");
				return;
			},
			Err(e) => {
				error2!("DecodeProducer - decoder error, ending stream: {e}");
				self.done = true;
				self.error = Some(e);
				return;
			},
		};

		let signal = *decoded.spec();
		let channels = signal.channels.count();
		if channels != usize::from(self.spec.channels) {
			warn2!("DecodeProducer - skipping packet with {channels} channel(s), expected {}", self.spec.channels);
			return;
		}

		let needed = decoded.capacity() * channels;
		if self.samples.as_ref().map_or(true, |s| s.capacity() < needed) {
			self.samples = Some(SampleBuffer::new(decoded.capacity() as u64, signal));
		}

		if let Some(samples) = self.samples.as_mut() {
			samples.copy_interleaved_ref(decoded);
			self.pending.reserve(samples.len() * 2);
			for sample in samples.samples() {
				self.pending.extend_from_slice(&sample.to_le_bytes());
			}
		}
	}
}

impl ChunkProducer for DecodeProducer {
	fn spec(&self) -> PcmSpec {
		self.spec
	}

	fn next_chunk(&mut self) -> Option<&[u8]> {
		self.pending.drain(..self.handed);
		self.handed = 0;

		while self.pending.len() < self.chunk_bytes && !self.done {
			self.decode_packet();
		}

		if self.pending.is_empty() {
			return None;
		}

		self.handed = self.chunk_bytes.min(self.pending.len());
		Some(&self.pending[..self.handed])
	}
}

impl std::fmt::Debug for DecodeProducer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DecodeProducer")
			.field("track_id", &self.track_id)
			.field("spec", &self.spec)
			.field("chunk_bytes", &self.chunk_bytes)
			.field("pending", &self.pending.len())
			.field("done", &self.done)
			.finish_non_exhaustive()
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	/// A canonical 44-byte header PCM WAV.
	fn wav(channels: u16, sample_rate: u32, pcm: &[u8]) -> Vec<u8> {
		let block_align = channels * 2;
		let data_len = u32::try_from(pcm.len()).unwrap();

		let mut wav = Vec::with_capacity(44 + pcm.len());
		wav.extend_from_slice(b"RIFF");
		wav.extend_from_slice(&(36 + data_len).to_le_bytes());
		wav.extend_from_slice(b"WAVE");
		wav.extend_from_slice(b"fmt ");
		wav.extend_from_slice(&16_u32.to_le_bytes());
		wav.extend_from_slice(&1_u16.to_le_bytes()); // PCM
		wav.extend_from_slice(&channels.to_le_bytes());
		wav.extend_from_slice(&sample_rate.to_le_bytes());
		wav.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
		wav.extend_from_slice(&block_align.to_le_bytes());
		wav.extend_from_slice(&16_u16.to_le_bytes());
		wav.extend_from_slice(b"data");
		wav.extend_from_slice(&data_len.to_le_bytes());
		wav.extend_from_slice(pcm);
		wav
	}

	fn pcm(samples: usize) -> Vec<u8> {
		(0..samples)
			.flat_map(|i| ((i as i16).wrapping_mul(97)).to_le_bytes())
			.collect()
	}

	#[test]
	fn wav_decodes_to_same_pcm() {
		let pcm = pcm(2 * 3000);
		// Not whole frames, rounds down to 1000 (250 frames).
		let mut producer = DecodeProducer::from_bytes(wav(2, 8000, &pcm), 1002).unwrap();

		assert_eq!(producer.spec(), PcmSpec {
			channels: 2,
			sample_rate: 8000,
			sample_format: SampleFormat::I16,
		});

		let mut out  = Vec::new();
		let mut lens = Vec::new();
		while let Some(chunk) = producer.next_chunk() {
			assert!(chunk.len() <= 1000);
			assert_eq!(chunk.len() % 4, 0);
			lens.push(chunk.len());
			out.extend_from_slice(chunk);
		}

		// Only the last chunk may be short.
		let (last, full) = lens.split_last().unwrap();
		assert!(full.iter().all(|len| *len == 1000), "{lens:?}");
		assert!(*last > 0);

		assert!(producer.error().is_none());
		assert_eq!(out.len(), pcm.len());
		assert!(out == pcm);
		assert_eq!(producer.next_chunk(), None);
	}

	#[test]
	fn garbage_is_rejected() {
		let garbage = vec![0xAB_u8; 4096];
		let result = DecodeProducer::from_bytes(garbage, 1000);
		assert!(matches!(result, Err(SourceError::Probe(_))));
	}

	#[test]
	fn missing_file() {
		let result = DecodeProducer::from_path("/this/file/does/not/exist.flac", 1000);
		assert!(matches!(result, Err(SourceError::File(_))));
	}
}
