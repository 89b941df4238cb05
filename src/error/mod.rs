//! Errors (and warnings) that can occur.

mod config;
pub use config::ConfigError;

mod device;
pub use device::DeviceError;

mod source;
pub use source::SourceError;

mod stream;
pub use stream::StreamError;

mod underrun;
pub use underrun::Underrun;
