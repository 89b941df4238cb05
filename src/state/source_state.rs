//---------------------------------------------------------------------------------------------------- use
use crate::{
	error::Underrun,
	state::PlayState,
};

#[allow(unused_imports)] // docs
use crate::StreamingSource;

//---------------------------------------------------------------------------------------------------- SourceState
/// What [`StreamingSource::state`] observed on the device.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
pub struct SourceState {
	/// The play state the device reported.
	pub play_state: PlayState,

	/// `Some` if the device stopped while there was still data to stream.
	pub underrun: Option<Underrun>,
}

impl SourceState {
	#[must_use]
	#[inline]
	/// If an [`Underrun`] was observed.
	pub const fn is_underrun(&self) -> bool {
		self.underrun.is_some()
	}
}
