/*!
# Aplasta: File Handles

Every file this program opens goes through an `OpenFiles` counter, which
makes it easy to check nothing is left dangling once a file is done.
*/

use crate::EncodingError;
use std::{
	cell::Cell,
	fs::File,
	io::{
		self,
		Read,
	},
	path::Path,
};



#[derive(Debug, Default)]
/// # Open File Counter.
pub(crate) struct OpenFiles {
	/// # Currently Open.
	open: Cell<usize>,

	/// # Most Open At Once.
	peak: Cell<usize>,
}

impl OpenFiles {
	#[must_use]
	/// # Open Count.
	pub(crate) fn count(&self) -> usize { self.open.get() }

	#[must_use]
	/// # Peak Count.
	pub(crate) fn peak(&self) -> usize { self.peak.get() }

	/// # Track.
	fn track(&self) -> OpenGuard<'_> {
		let next = self.open.get() + 1;
		self.open.set(next);
		if self.peak.get() < next { self.peak.set(next); }
		OpenGuard(&self.open)
	}

	/// # Open (Read).
	///
	/// ## Errors
	///
	/// An error is returned if the file can't be opened.
	pub(crate) fn open(&self, path: &Path) -> Result<TrackedFile<'_>, EncodingError> {
		let file = File::open(path).map_err(|_| EncodingError::Read)?;
		Ok(TrackedFile { file, _guard: self.track() })
	}

	/// # Read.
	///
	/// Read the entire file, closing it before returning.
	///
	/// ## Errors
	///
	/// An error is returned if the file can't be read or is empty.
	pub(crate) fn read(&self, path: &Path) -> Result<Vec<u8>, EncodingError> {
		let mut file = self.open(path)?;
		let mut out = Vec::new();
		file.read_to_end(&mut out).map_err(|_| EncodingError::Read)?;
		if out.is_empty() { Err(EncodingError::Empty) }
		else { Ok(out) }
	}

	/// # Write.
	///
	/// Write `data` to `path` atomically.
	///
	/// ## Errors
	///
	/// An error is returned if the file can't be written.
	pub(crate) fn write(&self, path: &Path, data: &[u8]) -> Result<(), EncodingError> {
		let _guard = self.track();
		write_atomic::write_file(path, data).map_err(|_| EncodingError::Write)
	}
}



/// # Open Guard.
///
/// Decrement the counter on drop.
struct OpenGuard<'a>(&'a Cell<usize>);

impl std::fmt::Debug for OpenGuard<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("OpenGuard").field(&self.0.get()).finish()
	}
}

impl Drop for OpenGuard<'_> {
	fn drop(&mut self) { self.0.set(self.0.get().saturating_sub(1)); }
}



#[derive(Debug)]
/// # Tracked File.
pub(crate) struct TrackedFile<'a> {
	/// # File.
	file: File,

	/// # Guard.
	_guard: OpenGuard<'a>,
}

impl Read for TrackedFile<'_> {
	#[inline]
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { self.file.read(buf) }
}
