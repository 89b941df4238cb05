//! Play state of a voice.

//---------------------------------------------------------------------------------------------------- use
use strum::{
	AsRefStr,
	Display,
	EnumCount,
	EnumIter,
	IntoStaticStr,
};

#[allow(unused_imports)] // docs
use crate::StreamingSource;

//---------------------------------------------------------------------------------------------------- PlayState
/// The play state of a voice.
///
/// This is what both the [`AudioDevice`](crate::AudioDevice) reports
/// and what a [`StreamingSource`] tracks locally.
///
/// ```text
/// Initial --play--> Playing --pause--> Paused
///                   Playing <--play--- Paused
///         Playing|Paused --stop/drain--> Stopped
/// ```
///
/// [`PlayState::Stopped`] is terminal for a [`StreamingSource`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[derive(Copy,Clone,Default,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PlayState {
	#[default]
	/// Created (or rewound), nothing played yet.
	Initial,
	/// Consuming queued buffers.
	Playing,
	/// Holding position, queued buffers are kept.
	Paused,
	/// Finished, either by command or because the queue ran dry.
	Stopped,
}

//---------------------------------------------------------------------------------------------------- PlayState Impl
impl PlayState {
	/// The state every voice starts in.
	pub const DEFAULT: Self = Self::Initial;

	#[must_use]
	/// The state after a `play` command, `None` if not allowed.
	pub const fn play(self) -> Option<Self> {
		match self {
			Self::Initial | Self::Playing | Self::Paused => Some(Self::Playing),
			Self::Stopped => None,
		}
	}

	#[must_use]
	/// The state after a `pause` command, `None` if not allowed.
	///
	/// Pausing a voice that never started leaves it [`Self::Initial`].
	pub const fn pause(self) -> Option<Self> {
		match self {
			Self::Initial => Some(Self::Initial),
			Self::Playing | Self::Paused => Some(Self::Paused),
			Self::Stopped => None,
		}
	}

	#[must_use]
	/// The state after a `stop` command, always allowed.
	pub const fn stop(self) -> Self {
		Self::Stopped
	}

	#[must_use]
	/// The state after a `rewind` command, `None` if not allowed.
	pub const fn rewind(self) -> Option<Self> {
		match self {
			Self::Stopped => None,
			_ => Some(Self::Initial),
		}
	}

	#[must_use]
	#[inline]
	/// [`Self::Playing`] or [`Self::Paused`].
	pub const fn is_active(self) -> bool {
		matches!(self, Self::Playing | Self::Paused)
	}

	#[must_use]
	#[inline]
	/// If `self` is [`Self::Playing`].
	pub const fn is_playing(self) -> bool {
		matches!(self, Self::Playing)
	}

	#[must_use]
	#[inline]
	/// If `self` is [`Self::Stopped`].
	pub const fn is_stopped(self) -> bool {
		matches!(self, Self::Stopped)
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use strum::IntoEnumIterator;

	#[test]
	fn stopped_is_terminal() {
		let s = PlayState::Stopped;
		assert_eq!(s.play(), None);
		assert_eq!(s.pause(), None);
		assert_eq!(s.rewind(), None);
		assert_eq!(s.stop(), PlayState::Stopped);
	}

	#[test]
	fn play_pause_cycle() {
		let s = PlayState::DEFAULT;
		let s = s.play().unwrap();
		assert_eq!(s, PlayState::Playing);
		let s = s.pause().unwrap();
		assert_eq!(s, PlayState::Paused);
		let s = s.play().unwrap();
		assert_eq!(s, PlayState::Playing);
		assert_eq!(s.stop(), PlayState::Stopped);
	}

	#[test]
	fn pause_before_play_is_noop() {
		assert_eq!(PlayState::Initial.pause(), Some(PlayState::Initial));
	}

	#[test]
	fn every_state_can_stop() {
		for s in PlayState::iter() {
			assert_eq!(s.stop(), PlayState::Stopped);
		}
	}

	#[test]
	fn rewind_returns_to_initial() {
		for s in PlayState::iter().filter(|s| !s.is_stopped()) {
			assert_eq!(s.rewind(), Some(PlayState::Initial));
		}
	}

	#[test]
	fn display() {
		assert_eq!(PlayState::Initial.to_string(), "initial");
		assert_eq!(PlayState::Stopped.as_ref(), "stopped");
	}
}
