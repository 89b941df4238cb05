//! The streaming voice.

mod stream;
pub use stream::StreamingSource;

mod tick;
pub use tick::Tick;
