//! Configuration for [`StreamingSource`](crate::StreamingSource)'s.

mod config;
pub use config::StreamConfig;

mod constants;
pub use constants::{
	MIN_BUFFER_COUNT,
	DEFAULT_BUFFER_COUNT,
	DEFAULT_CHUNK_BYTES,
};
