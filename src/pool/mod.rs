//! The ring of device buffers a source streams through.

mod pool;
pub use pool::BufferPool;
