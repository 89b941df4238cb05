//! Gapless streaming playback from a ring of fixed-size audio buffers.
//!
//! This is the API reference for `ringvoice`, meant to
//! document inputs/outputs and other note-worthy things.
//!
//! A [`StreamingSource`] feeds a single output voice (an [`AudioDevice`])
//! from a [`BufferPool`] of hardware buffers. The buffers are refilled
//! on demand from a lazily-produced PCM [`ChunkProducer`].
//!
//! There is no background thread, the caller must call
//! [`StreamingSource::service`] often enough that the
//! device never runs out of queued buffers.
//!
//! ```rust
//! # use ringvoice::{StreamingSource,device::DummyDevice,source::ChunkQueue,format::PcmSpec};
//! let spec     = PcmSpec::STEREO_I16_44100;
//! let chunks   = (0..8).map(|_| vec![0_u8; 4096]);
//! let producer = ChunkQueue::new(spec, chunks);
//!
//! let mut source = StreamingSource::new(DummyDevice::new(), producer, 4).unwrap();
//! source.play().unwrap();
//!
//! loop {
//!     // Pretend the hardware played a buffer.
//!     source.device_mut().consume_buffers(1);
//!
//!     let tick = source.service().unwrap();
//!     if !tick.continue_streaming() && source.pool().queued() == 0 {
//!         break;
//!     }
//! }
//! ```

//---------------------------------------------------------------------------------------------------- Lints
#![allow(
	clippy::len_zero,
	clippy::type_complexity,
	clippy::module_inception,
)]

#![deny(
	nonstandard_style,
	deprecated,
)]

#![warn(
	missing_docs,
)]

#![forbid(
	unused_unsafe,
	future_incompatible,
	break_with_label_and_loop,
	coherence_leak_check,
	duplicate_macro_attributes,
	exported_private_dependencies,
	for_loops_over_fallibles,
	overlapping_range_endpoints,
	semicolon_in_expressions_from_macros,
	redundant_semicolons,
	unconditional_recursion,
	unused_allocation,
	unused_comparisons,
	unused_labels,
	while_true,
	keyword_idents,
	non_ascii_idents,
	noop_method_call,
)]

//---------------------------------------------------------------------------------------------------- Public API
pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod source;
pub mod state;

mod pool;
pub use pool::BufferPool;

mod stream;
pub use stream::{StreamingSource,Tick};

mod registry;
pub use registry::{Registry,SourceKey};

pub use device::AudioDevice;
pub use source::ChunkProducer;

//---------------------------------------------------------------------------------------------------- Private Usage
mod macros;

#[cfg(test)]
mod tests;
