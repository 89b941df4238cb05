//---------------------------------------------------------------------------------------------------- use
#[allow(unused_imports)] // docs
use crate::config::StreamConfig;

//---------------------------------------------------------------------------------------------------- Config Errors
/// Invalid configuration passed to a constructor.
///
/// This is fatal to construction, nothing is allocated
/// on the device if one of these is returned.
#[derive(thiserror::Error,Copy,Clone,Debug,PartialEq,Eq)]
pub enum ConfigError {
	#[error("buffer count must be at least {min}, got {count}")]
	/// A buffer count below the minimum was requested.
	///
	/// A single buffer cannot be refilled ahead of
	/// playback without an audible gap.
	BufferCount {
		/// The requested count.
		count: usize,
		/// The minimum allowed count.
		min: usize,
	},

	#[error("chunk size must be non-zero")]
	/// [`StreamConfig::chunk_bytes`] was `0`.
	ChunkBytes,

	#[error("unsupported channel count: {0}")]
	/// Only mono and stereo PCM can be loaded into buffers.
	Channels(u16),

	#[error("sample rate must be non-zero")]
	/// The PCM specification had a `0` sample rate.
	SampleRate,
}
