//! Raw PCM from any reader.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	error::SourceError,
	format::PcmSpec,
	source::{ChunkProducer,frame_aligned},
	macros::{warn2,error2},
};
use std::{
	fs::File,
	io::{BufReader,ErrorKind,Read},
	path::Path,
};

//---------------------------------------------------------------------------------------------------- ReaderProducer
/// A [`ChunkProducer`] reading headerless PCM from a [`Read`].
///
/// Chunks are `chunk_bytes` long (rounded down to whole frames),
/// the last one may be shorter. A trailing partial frame is dropped.
///
/// A read error ends the stream early, it can be inspected
/// afterwards with [`ReaderProducer::error`].
#[derive(Debug)]
pub struct ReaderProducer<R> {
	reader: R,
	spec: PcmSpec,
	/// The chunk being handed out, always `chunk_bytes` long.
	buf: Vec<u8>,
	/// The reader hit EOF (or an error).
	done: bool,
	/// The error that ended the stream, if any.
	error: Option<std::io::Error>,
}

impl<R: Read> ReaderProducer<R> {
	/// Read `spec` shaped PCM from `reader`.
	pub fn new(reader: R, spec: PcmSpec, chunk_bytes: usize) -> Self {
		Self {
			reader,
			spec,
			buf: vec![0; frame_aligned(chunk_bytes, &spec)],
			done: false,
			error: None,
		}
	}

	#[must_use]
	/// The error that ended the stream early, if any.
	pub const fn error(&self) -> Option<&std::io::Error> {
		self.error.as_ref()
	}

	/// Get back the reader.
	pub fn into_inner(self) -> R {
		self.reader
	}

	/// Fill `buf` as far as the reader allows, returning how many bytes.
	fn fill(&mut self) -> usize {
		let mut filled = 0;

		while filled < self.buf.len() {
			match self.reader.read(&mut self.buf[filled..]) {
				Ok(0) => {
					self.done = true;
					break;
				},
				Ok(n) => filled += n,
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => {
					error2!("ReaderProducer - read error, ending stream: {e}");
					self.done = true;
					self.error = Some(e);
					break;
				},
			}
		}

		filled
	}
}

impl ReaderProducer<BufReader<File>> {
	/// Read headerless PCM from the file at `path`.
	///
	/// # Errors
	/// If the file cannot be opened.
	pub fn open<P: AsRef<Path>>(path: P, spec: PcmSpec, chunk_bytes: usize) -> Result<Self, SourceError> {
		let file = File::open(path)?;
		Ok(Self::new(BufReader::new(file), spec, chunk_bytes))
	}
}

impl<R: Read> ChunkProducer for ReaderProducer<R> {
	fn spec(&self) -> PcmSpec {
		self.spec
	}

	fn next_chunk(&mut self) -> Option<&[u8]> {
		if self.done {
			return None;
		}

		let filled = self.fill();
		let frame = self.spec.frame_bytes().max(1);
		let aligned = filled - (filled % frame);

		if aligned != filled {
			warn2!("ReaderProducer - dropping {} trailing bytes (partial frame)", filled - aligned);
		}

		if aligned == 0 {
			self.done = true;
			return None;
		}

		Some(&self.buf[..aligned])
	}
}
