//---------------------------------------------------------------------------------------------------- use
use crate::error::Underrun;

#[allow(unused_imports)] // docs
use crate::StreamingSource;

//---------------------------------------------------------------------------------------------------- Tick
/// What a single [`StreamingSource::service`] call did.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Default,Debug,PartialEq,Eq,Hash)]
pub struct Tick {
	/// `true` while the producer is still supplying data.
	///
	/// Once `false`, further ticks only drain the queue.
	pub continue_streaming: bool,

	/// How many buffers were refilled and requeued.
	pub refilled: usize,

	/// How many buffers were unqueued without a refill.
	pub drained: usize,

	/// `Some` if the device was found stopped with data left to stream.
	pub underrun: Option<Underrun>,
}

impl Tick {
	#[must_use]
	#[inline]
	/// If further ticks will supply new data.
	pub const fn continue_streaming(&self) -> bool {
		self.continue_streaming
	}

	#[must_use]
	#[inline]
	/// If an [`Underrun`] was observed.
	pub const fn is_underrun(&self) -> bool {
		self.underrun.is_some()
	}
}
