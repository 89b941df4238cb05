//---------------------------------------------------------------------------------------------------- use
use crate::{
	config::{MIN_BUFFER_COUNT,DEFAULT_BUFFER_COUNT,DEFAULT_CHUNK_BYTES},
	error::ConfigError,
};

#[allow(unused_imports)] // docs
use crate::StreamingSource;

//---------------------------------------------------------------------------------------------------- StreamConfig
/// Configuration for a [`StreamingSource`].
///
/// This is passed once to [`StreamingSource::with_config`]
/// and used for the rest of the source's lifetime.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
pub struct StreamConfig {
	/// How many buffers to request for the pool.
	///
	/// Must be at least [`MIN_BUFFER_COUNT`].
	///
	/// More buffers means more audio queued ahead of the device,
	/// which means [`StreamingSource::service`] can be called
	/// less often without underrunning.
	pub buffer_count: usize,

	/// How many bytes producers that coalesce their
	/// output should aim for per chunk.
	///
	/// Must be non-zero.
	pub chunk_bytes: usize,

	/// Should a tick that refills buffers after an underrun
	/// (the device stopped itself) restart playback?
	///
	/// If `false`, the [`Underrun`](crate::error::Underrun) is only
	/// reported, and the caller must [`StreamingSource::play`] again.
	pub underrun_recovery: bool,
}

//---------------------------------------------------------------------------------------------------- StreamConfig Impl
impl StreamConfig {
	/// A reasonable default [`StreamConfig`].
	///
	/// ```rust
	/// # use ringvoice::config::*;
	/// assert_eq!(StreamConfig::DEFAULT, StreamConfig {
	///     buffer_count:      4,
	///     chunk_bytes:       16 * 1024,
	///     underrun_recovery: false,
	/// });
	/// ```
	pub const DEFAULT: Self = Self {
		buffer_count:      DEFAULT_BUFFER_COUNT,
		chunk_bytes:       DEFAULT_CHUNK_BYTES,
		underrun_recovery: false,
	};

	/// [`Self::DEFAULT`] with a different `buffer_count`.
	#[must_use]
	pub const fn with_buffer_count(buffer_count: usize) -> Self {
		Self {
			buffer_count,
			..Self::DEFAULT
		}
	}

	/// Check the configuration is usable.
	///
	/// # Errors
	/// - [`ConfigError::BufferCount`] if `buffer_count < MIN_BUFFER_COUNT`
	/// - [`ConfigError::ChunkBytes`] if `chunk_bytes == 0`
	pub const fn validate(&self) -> Result<(), ConfigError> {
		if self.buffer_count < MIN_BUFFER_COUNT {
			return Err(ConfigError::BufferCount {
				count: self.buffer_count,
				min:   MIN_BUFFER_COUNT,
			});
		}

		if self.chunk_bytes == 0 {
			return Err(ConfigError::ChunkBytes);
		}

		Ok(())
	}
}

impl Default for StreamConfig {
	fn default() -> Self {
		Self::DEFAULT
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_valid() {
		assert_eq!(StreamConfig::default().validate(), Ok(()));
	}

	#[test]
	fn single_buffer_is_rejected() {
		let config = StreamConfig::with_buffer_count(1);
		assert_eq!(
			config.validate(),
			Err(ConfigError::BufferCount { count: 1, min: 2 }),
		);

		let config = StreamConfig::with_buffer_count(0);
		assert!(config.validate().is_err());
	}

	#[test]
	fn two_buffers_is_enough() {
		assert_eq!(StreamConfig::with_buffer_count(2).validate(), Ok(()));
	}

	#[test]
	fn zero_chunk_is_rejected() {
		let config = StreamConfig { chunk_bytes: 0, ..StreamConfig::DEFAULT };
		assert_eq!(config.validate(), Err(ConfigError::ChunkBytes));
	}
}
