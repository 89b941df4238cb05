//---------------------------------------------------------------------------------------------------- use
use crate::{
	error::{ConfigError,DeviceError},
	state::PlayState,
};

//---------------------------------------------------------------------------------------------------- Stream Errors
/// Error returned by [`BufferPool`](crate::BufferPool)
/// and [`StreamingSource`](crate::StreamingSource) operations.
///
/// Running out of data is _not_ an error, it is reported
/// by [`Tick::continue_streaming`](crate::Tick::continue_streaming).
#[derive(thiserror::Error,Clone,Debug,PartialEq,Eq)]
pub enum StreamError {
	#[error("invalid configuration: {0}")]
	/// The configuration was rejected, fatal to construction.
	Configuration(#[from] ConfigError),

	#[error("buffer allocation failed: {0}")]
	/// The device could not allocate a single buffer, fatal to construction.
	Allocation(DeviceError),

	#[error("audio device error: {0}")]
	/// The device rejected an operation.
	Device(#[from] DeviceError),

	#[error("invalid play state transition: {from} -> {to}")]
	/// The requested command is not valid in the current state.
	///
	/// [`PlayState::Stopped`] is terminal, a new
	/// source is required to stream again.
	Transition {
		/// The state the source was in.
		from: PlayState,
		/// The state that was requested.
		to: PlayState,
	},
}
