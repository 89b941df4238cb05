//---------------------------------------------------------------------------------------------------- Underrun
/// The device drained its queue before a refill arrived.
///
/// This is a warning, not an error: playback was most
/// likely audibly interrupted, but the source keeps working.
///
/// It means the buffer count or the service
/// frequency is too low for the playback rate.
///
/// This is never returned as an `Err`, it is reported inside
/// [`Tick`](crate::Tick) and [`SourceState`](crate::state::SourceState).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(thiserror::Error,Copy,Clone,Debug,PartialEq,Eq,Hash)]
#[error("buffer underrun: device stopped with {buffers} buffer(s) still in the pool and data left to stream")]
pub struct Underrun {
	/// How many buffers the pool had active when it happened.
	pub buffers: usize,
	/// How many underruns this source has seen, including this one.
	pub count: usize,
}
