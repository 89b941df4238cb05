//---------------------------------------------------------------------------------------------------- use
use crate::{
	format::PcmSpec,
	source::ChunkProducer,
};
use std::collections::VecDeque;

//---------------------------------------------------------------------------------------------------- ChunkQueue
/// An in-memory [`ChunkProducer`].
///
/// Chunks are handed out in the order they were pushed,
/// useful for generated audio, or audio decoded elsewhere.
///
/// ```rust
/// # use ringvoice::{ChunkProducer,source::ChunkQueue,format::PcmSpec};
/// let mut queue = ChunkQueue::new(PcmSpec::MONO_I16_44100, [vec![0_u8; 4]]);
/// queue.push(vec![1_u8; 4]);
///
/// assert_eq!(queue.next_chunk(), Some([0; 4].as_slice()));
/// assert_eq!(queue.next_chunk(), Some([1; 4].as_slice()));
/// assert_eq!(queue.next_chunk(), None);
/// ```
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct ChunkQueue {
	spec: PcmSpec,
	chunks: VecDeque<Vec<u8>>,
	/// The chunk last handed out.
	current: Vec<u8>,
	/// How many chunks were handed out.
	yielded: usize,
}

impl ChunkQueue {
	/// Create a queue from pre-built chunks.
	pub fn new<I, C>(spec: PcmSpec, chunks: I) -> Self
	where
		I: IntoIterator<Item = C>,
		C: Into<Vec<u8>>,
	{
		Self {
			spec,
			chunks: chunks.into_iter().map(Into::into).collect(),
			current: Vec::new(),
			yielded: 0,
		}
	}

	/// Append a chunk to the back of the queue.
	pub fn push<C: Into<Vec<u8>>>(&mut self, chunk: C) {
		self.chunks.push_back(chunk.into());
	}

	#[must_use]
	/// How many chunks are left.
	pub fn remaining(&self) -> usize {
		self.chunks.len()
	}

	#[must_use]
	/// How many chunks were handed out.
	pub const fn yielded(&self) -> usize {
		self.yielded
	}
}

impl ChunkProducer for ChunkQueue {
	fn spec(&self) -> PcmSpec {
		self.spec
	}

	fn next_chunk(&mut self) -> Option<&[u8]> {
		self.current = self.chunks.pop_front()?;
		self.yielded += 1;
		Some(&self.current)
	}
}
