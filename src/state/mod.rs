//! Playback state

mod play_state;
pub use play_state::PlayState;

mod source_state;
pub use source_state::SourceState;
