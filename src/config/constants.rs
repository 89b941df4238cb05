//! Configuration constants.

//---------------------------------------------------------------------------------------------------- Constants
/// The least amount of buffers a pool may be created with.
///
/// With a single buffer, there is nothing playing
/// while it gets refilled, which is an audible gap.
pub const MIN_BUFFER_COUNT: usize = 2;

/// The default amount of buffers a pool is created with.
pub const DEFAULT_BUFFER_COUNT: usize = 4;

/// The default chunk size producers aim for, in bytes.
///
/// 16 KiB is ~93ms of stereo 16-bit audio at 44.1kHz.
pub const DEFAULT_CHUNK_BYTES: usize = 16 * 1024;

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_buffer_count_is_valid() {
		assert!(DEFAULT_BUFFER_COUNT >= MIN_BUFFER_COUNT);
	}

	#[test]
	fn default_chunk_is_frame_aligned() {
		// Every supported frame size (1, 2, 4, 8 bytes).
		for frame in [1, 2, 4, 8] {
			assert_eq!(DEFAULT_CHUNK_BYTES % frame, 0);
		}
	}
}
