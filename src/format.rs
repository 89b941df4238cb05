//! PCM specification and buffer formats.
//!
//! A [`ChunkProducer`](crate::ChunkProducer) describes its output with a
//! [`PcmSpec`], which is mapped once (at pool construction) to the
//! [`BufferFormat`] every buffer of the pool is loaded with.

//---------------------------------------------------------------------------------------------------- use
use crate::error::ConfigError;
use strum::{
	AsRefStr,
	Display,
	EnumCount,
	EnumIter,
	IntoStaticStr,
};

//---------------------------------------------------------------------------------------------------- SampleFormat
/// The encoding of a single PCM sample.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Default,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SampleFormat {
	/// Unsigned 8-bit, silence is `128`.
	U8,
	#[default]
	/// Signed 16-bit, little endian.
	I16,
	/// 32-bit float, little endian, `-1.0..=1.0`.
	F32,
}

impl SampleFormat {
	#[must_use]
	#[inline]
	/// How many bytes a single sample takes.
	pub const fn bytes(self) -> usize {
		match self {
			Self::U8  => 1,
			Self::I16 => 2,
			Self::F32 => 4,
		}
	}
}

//---------------------------------------------------------------------------------------------------- PcmSpec
/// The shape of the raw PCM a producer hands out.
///
/// Samples are always interleaved.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
pub struct PcmSpec {
	/// Channel count.
	pub channels: u16,
	/// Frames per second.
	pub sample_rate: u32,
	/// Encoding of each sample.
	pub sample_format: SampleFormat,
}

impl PcmSpec {
	/// CD quality: stereo, 16-bit, 44.1kHz.
	pub const STEREO_I16_44100: Self = Self {
		channels:      2,
		sample_rate:   44_100,
		sample_format: SampleFormat::I16,
	};

	/// Mono, 16-bit, 44.1kHz.
	pub const MONO_I16_44100: Self = Self {
		channels:      1,
		sample_rate:   44_100,
		sample_format: SampleFormat::I16,
	};

	#[must_use]
	#[inline]
	/// How many bytes a single frame (one sample per channel) takes.
	pub const fn frame_bytes(&self) -> usize {
		self.channels as usize * self.sample_format.bytes()
	}
}

//---------------------------------------------------------------------------------------------------- BufferFormat
/// The format tag a buffer is loaded with.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BufferFormat {
	/// 1 channel, [`SampleFormat::U8`].
	Mono8,
	/// 1 channel, [`SampleFormat::I16`].
	Mono16,
	/// 1 channel, [`SampleFormat::F32`].
	MonoF32,
	/// 2 channels, [`SampleFormat::U8`].
	Stereo8,
	/// 2 channels, [`SampleFormat::I16`].
	Stereo16,
	/// 2 channels, [`SampleFormat::F32`].
	StereoF32,
}

impl BufferFormat {
	#[must_use]
	/// Channel count.
	pub const fn channels(self) -> u16 {
		match self {
			Self::Mono8 | Self::Mono16 | Self::MonoF32 => 1,
			Self::Stereo8 | Self::Stereo16 | Self::StereoF32 => 2,
		}
	}

	#[must_use]
	/// Encoding of each sample.
	pub const fn sample_format(self) -> SampleFormat {
		match self {
			Self::Mono8 | Self::Stereo8 => SampleFormat::U8,
			Self::Mono16 | Self::Stereo16 => SampleFormat::I16,
			Self::MonoF32 | Self::StereoF32 => SampleFormat::F32,
		}
	}

	#[must_use]
	#[inline]
	/// How many bytes a single sample takes.
	pub const fn bytes_per_sample(self) -> usize {
		self.sample_format().bytes()
	}

	#[must_use]
	#[inline]
	/// How many bytes a single frame takes.
	pub const fn frame_bytes(self) -> usize {
		self.channels() as usize * self.bytes_per_sample()
	}

	#[must_use]
	/// Decode one little-endian sample into `f32`.
	///
	/// # Panics
	/// `bytes` must be at least [`Self::bytes_per_sample`] long.
	pub fn sample_to_f32(self, bytes: &[u8]) -> f32 {
		match self.sample_format() {
			SampleFormat::U8  => (f32::from(bytes[0]) - 128.0) / 128.0,
			SampleFormat::I16 => f32::from(i16::from_le_bytes([bytes[0], bytes[1]])) / 32768.0,
			SampleFormat::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
		}
	}
}

impl TryFrom<PcmSpec> for BufferFormat {
	type Error = ConfigError;

	fn try_from(spec: PcmSpec) -> Result<Self, Self::Error> {
		if spec.sample_rate == 0 {
			return Err(ConfigError::SampleRate);
		}

		Ok(match (spec.channels, spec.sample_format) {
			(1, SampleFormat::U8)  => Self::Mono8,
			(1, SampleFormat::I16) => Self::Mono16,
			(1, SampleFormat::F32) => Self::MonoF32,
			(2, SampleFormat::U8)  => Self::Stereo8,
			(2, SampleFormat::I16) => Self::Stereo16,
			(2, SampleFormat::F32) => Self::StereoF32,
			(c, _) => return Err(ConfigError::Channels(c)),
		})
	}
}
