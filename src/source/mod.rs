//! Chunk producers.
//!
//! A [`ChunkProducer`] hands out raw PCM, one chunk at a time,
//! until it runs out. It owns its own read/decode state, the
//! [`BufferPool`](crate::BufferPool) only ever asks for the next chunk.

//---------------------------------------------------------------------------------------------------- use
use crate::format::PcmSpec;

mod queue;
pub use queue::ChunkQueue;

mod reader;
pub use reader::ReaderProducer;

mod decode;
pub use decode::DecodeProducer;

//---------------------------------------------------------------------------------------------------- ChunkProducer Trait
/// A lazily-produced source of raw PCM chunks.
pub trait ChunkProducer {
	/// The shape of every chunk this producer hands out.
	///
	/// This is read once, when a pool is created,
	/// it must not change afterwards.
	fn spec(&self) -> PcmSpec;

	/// The next chunk of interleaved PCM, `None` once exhausted.
	///
	/// The chunk's length must be a multiple of the frame size.
	///
	/// After returning `None` once, the producer is
	/// never asked again by a [`BufferPool`](crate::BufferPool).
	fn next_chunk(&mut self) -> Option<&[u8]>;
}

impl<P: ChunkProducer + ?Sized> ChunkProducer for Box<P> {
	#[inline]
	fn spec(&self) -> PcmSpec {
		(**self).spec()
	}

	#[inline]
	fn next_chunk(&mut self) -> Option<&[u8]> {
		(**self).next_chunk()
	}
}

impl<P: ChunkProducer + ?Sized> ChunkProducer for &mut P {
	#[inline]
	fn spec(&self) -> PcmSpec {
		(**self).spec()
	}

	#[inline]
	fn next_chunk(&mut self) -> Option<&[u8]> {
		(**self).next_chunk()
	}
}

/// Round `chunk_bytes` down to whole frames, at least one frame.
pub(crate) const fn frame_aligned(chunk_bytes: usize, spec: &PcmSpec) -> usize {
	let frame = spec.frame_bytes();
	if frame == 0 {
		return chunk_bytes;
	}

	let aligned = chunk_bytes - (chunk_bytes % frame);
	if aligned == 0 {
		frame
	} else {
		aligned
	}
}
