//---------------------------------------------------------------------------------------------------- use
use crate::device::BufferId;
use std::borrow::Cow;

//---------------------------------------------------------------------------------------------------- Device Errors
/// Error reported by an [`AudioDevice`](crate::AudioDevice).
///
/// This can be due to many reasons, e.g:
/// - Audio device was unplugged
/// - Audio server disconnected/killed
/// - A buffer was used in a way the device does not allow
#[derive(thiserror::Error,Clone,Debug,PartialEq,Eq)]
pub enum DeviceError {
	#[error("audio device could not allocate buffers")]
	/// The device has no memory (or handles) left for buffers.
	OutOfMemory,

	#[error("unknown buffer: {0}")]
	/// The buffer handle does not belong to this device.
	InvalidBuffer(BufferId),

	#[error("buffer {0} is queued on the device")]
	/// The buffer is still queued, it cannot be loaded or released.
	BufferInUse(BufferId),

	#[error("buffer {0} has not been processed yet")]
	/// Attempted to unqueue a buffer the device is still playing.
	NotProcessed(BufferId),

	#[error("buffer {0} is not at the head of the queue")]
	/// Attempted to unqueue a buffer out of queue order.
	QueueOrder(BufferId),

	#[error("audio format is invalid or unsupported")]
	/// The audio format is invalid or unsupported.
	InvalidFormat,

	#[error("audio hardware/server is unavailable")]
	/// The audio hardware/server is unavailable.
	DeviceUnavailable,

	#[error("audio stream was closed")]
	/// The audio stream was closed.
	StreamClosed,

	#[error("unknown error: {0}")]
	/// An unknown or very specific error occurred.
	///
	/// The `str` will contain more information.
	Unknown(Cow<'static, str>),
}
