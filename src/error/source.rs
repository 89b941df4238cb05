//---------------------------------------------------------------------------------------------------- Source Errors
#[allow(unused_imports)] // docs
use crate::source::DecodeProducer;

#[derive(thiserror::Error, Debug)]
/// Errors when opening an encoded audio source.
///
/// This `enum` represents all the potential errors that can
/// occur when attempting to turn encoded audio into a
/// [`DecodeProducer`].
///
/// This includes things like:
/// - The data not actually be audio
/// - File IO errors (non-existent PATH, lacking-permissions, etc)
/// - Unsupported audio codec
pub enum SourceError {
	#[error("failed to open file: {0}")]
	/// Error occurred while reading a [`std::fs::File`] (most likely missing)
	File(#[from] std::io::Error),

	#[error("failed to probe audio data: {0}")]
	/// Error occurred while attempting to probe or decode the audio data
	Probe(#[from] symphonia::core::errors::Error),

	#[error("failed to find a decodable track")]
	/// The container did not hold a track with a known codec
	Track,

	#[error("failed to find the codecs sample rate")]
	/// The audio codec did not specify a sample rate
	SampleRate,

	#[error("failed to find the codecs channel layout")]
	/// The audio codec did not specify its channels
	Channels,
}
