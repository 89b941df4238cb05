//! These are helper functions used for testing throughout the codebase.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	device::DummyDevice,
	format::PcmSpec,
	source::ChunkQueue,
	StreamingSource,
};

//---------------------------------------------------------------------------------------------------- Test Init Helpers
/// How many bytes chunk `i` of [`chunks`] holds.
///
/// Every chunk has a different length, so the
/// `DummyDevice` event log shows which one was loaded.
pub(crate) const fn chunk_bytes(i: usize) -> usize {
	4 * (i + 1)
}

/// A stereo 16-bit producer of `n` chunks.
///
/// Chunk `i` is [`chunk_bytes`]`(i)` long, filled with `i as u8`.
pub(crate) fn chunks(n: usize) -> ChunkQueue {
	ChunkQueue::new(
		PcmSpec::STEREO_I16_44100,
		(0..n).map(|i| vec![i as u8; chunk_bytes(i)]),
	)
}

/// A source of `buffers` buffers streaming `n` [`chunks`].
pub(crate) fn source(buffers: usize, n: usize) -> StreamingSource<DummyDevice, ChunkQueue> {
	StreamingSource::new(DummyDevice::new(), chunks(n), buffers).unwrap()
}
