/*!
# Aplasta: Errors
*/

use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Encoding Errors.
///
/// These cover everything that can go wrong with an individual file or an
/// individual trial. The batch carries on regardless.
pub(crate) enum EncodingError {
	/// # Row Buffer Allocation.
	Allocation,

	/// # Output Is Input.
	Collision,

	/// # Checksum Mismatch.
	Crc,

	/// # Bad PNG Data.
	Decode,

	/// # Output Directory.
	Directory,

	/// # Empty File.
	Empty,

	/// # Compression Error.
	Encode,

	/// # Invalid Chunk Length.
	Length,

	/// # No Candidate Survived.
	NoCandidate,

	/// # No IDAT.
	NoPayload,

	/// # Read Error.
	Read,

	/// # Wrong/Unknown Format.
	Signature,

	/// # Truncated Stream.
	Truncated,

	/// # Verification Mismatch.
	Verify,

	/// # Write Error.
	Write,
}

impl AsRef<str> for EncodingError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl Error for EncodingError {}

impl fmt::Display for EncodingError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<png::DecodingError> for EncodingError {
	#[inline]
	fn from(_err: png::DecodingError) -> Self { Self::Decode }
}

impl EncodingError {
	#[must_use]
	/// # As Str.
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Allocation => "unable to allocate row buffers",
			Self::Collision => "cannot overwrite the input file",
			Self::Crc => "chunk checksum mismatch",
			Self::Decode => "invalid image data",
			Self::Directory => "unable to create the output directory",
			Self::Empty => "empty file",
			Self::Encode => "compression failed",
			Self::Length => "invalid chunk length",
			Self::NoCandidate => "no method produced a valid image",
			Self::NoPayload => "no image data",
			Self::Read => "read error",
			Self::Signature => "not a PNG",
			Self::Truncated => "truncated file",
			Self::Verify => "output verification failed",
			Self::Write => "write error",
		}
	}

	#[must_use]
	/// # File-Fatal?
	///
	/// Most problems only knock out a single trial, but a few mean there is
	/// no point trying anything else with the file.
	pub(crate) const fn is_fatal(self) -> bool {
		matches!(
			self,
			Self::Allocation | Self::Collision | Self::Directory |
			Self::Empty | Self::NoCandidate | Self::NoPayload |
			Self::Read | Self::Write
		)
	}
}



#[derive(Debug, Clone)]
/// # General/Deal-Breaking Errors.
pub(super) enum AplastaError {
	/// # Invalid CLI Arg.
	InvalidCli(String),

	/// # Killed Early.
	Killed,

	/// # Odd Number of Paths.
	OddPaths,
}

impl Error for AplastaError {}

impl fmt::Display for AplastaError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let prefix = self.as_str();
		match self {
			Self::InvalidCli(s) => write!(f, "{prefix} {s}"),
			_ => f.write_str(prefix),
		}
	}
}

impl AplastaError {
	#[must_use]
	/// # As Str.
	pub(super) const fn as_str(&self) -> &'static str {
		match self {
			Self::InvalidCli(_) => "Invalid/unknown argument:",
			Self::Killed => "The process was aborted early.",
			Self::OddPaths => "Paths must be given in <INPUT> <OUTPUT> pairs.",
		}
	}
}
