/*!
# Aplasta: Metadata
*/

use crate::EncodingError;
use super::{
	Chunk,
	Chunks,
	Header,
	chunk::{
		IDAT,
		IEND,
		IHDR,
		PLTE,
	},
};



/// # Color-Dependent Chunks.
///
/// These only make sense for the color type and depth they were written
/// for.
const COLOR_DEPENDENT: [[u8; 4]; 8] = [
	PLTE,
	*b"tRNS",
	*b"bKGD",
	*b"sBIT",
	*b"hIST",
	*b"acTL",
	*b"fcTL",
	*b"fdAT",
];



#[derive(Debug, Clone)]
/// # Metadata.
///
/// Everything in a PNG besides the image data, borrowed from the source.
/// Chunks are kept in their original order, split into those that came
/// before the image data and those that came after.
pub(crate) struct Metadata<'a> {
	/// # Header.
	header: Header,

	/// # Chunks Before IDAT.
	before: Vec<Chunk<'a>>,

	/// # Chunks After IDAT.
	after: Vec<Chunk<'a>>,

	#[cfg(test)]
	/// # IDAT Total.
	idat: u64,
}

impl<'a> Metadata<'a> {
	/// # Scan.
	///
	/// ## Errors
	///
	/// An error is returned if the file isn't a well-formed PNG, or has no
	/// image data.
	pub(crate) fn scan(raw: &'a [u8]) -> Result<Self, EncodingError> {
		let mut chunks = Chunks::new(raw)?;

		// IHDR has to come first.
		let first = chunks.next().ok_or(EncodingError::Truncated)??;
		if first.kind != IHDR { return Err(EncodingError::Decode); }
		let header = Header::from_ihdr(first.data)?;

		let mut before = Vec::new();
		let mut after = Vec::new();
		let mut idat = 0;
		let mut seen_idat = false;
		let mut ended = false;
		for chunk in chunks {
			let chunk = chunk?;
			match chunk.kind {
				IHDR => return Err(EncodingError::Decode),
				IDAT =>
					// The image data has to be contiguous.
					if seen_idat && ! after.is_empty() { return Err(EncodingError::Decode); }
					else {
						seen_idat = true;
						idat += chunk.data.len() as u64;
					},
				IEND => { ended = true; },
				_ =>
					if seen_idat { after.push(chunk); }
					else { before.push(chunk); },
			}
		}

		if ! ended { Err(EncodingError::Truncated) }
		else if idat == 0 { Err(EncodingError::NoPayload) }
		else {
			Ok(Self {
				header,
				before,
				after,
				#[cfg(test)] idat,
			})
		}
	}

	#[must_use]
	/// # Header.
	pub(crate) const fn header(&self) -> &Header { &self.header }

	#[cfg(test)]
	#[must_use]
	/// # IDAT Total.
	pub(crate) const fn idat(&self) -> u64 { self.idat }

	#[must_use]
	/// # Has Chunk?
	pub(crate) fn has(&self, kind: [u8; 4]) -> bool {
		self.before.iter().chain(self.after.iter()).any(|c| c.kind == kind)
	}

	#[must_use]
	/// # Chunks Before IDAT.
	pub(crate) fn before(&self) -> &[Chunk<'a>] { &self.before }

	#[must_use]
	/// # Chunks After IDAT.
	pub(crate) fn after(&self) -> &[Chunk<'a>] { &self.after }

	/// # All Chunks (Sans Image Data).
	pub(crate) fn iter(&self) -> impl Iterator<Item=&Chunk<'a>> {
		self.before.iter().chain(self.after.iter())
	}

	#[must_use]
	/// # For Output.
	///
	/// Return the metadata to write alongside an image with header `out`.
	/// If the color type or depth changed, anything tied to the old format
	/// is left out.
	pub(crate) fn for_output(&self, out: &Header) -> Self {
		let mut next = self.clone();
		next.header = *out;
		if
			self.header.color_type != out.color_type ||
			self.header.bit_depth != out.bit_depth
		{
			next.before.retain(|c| ! COLOR_DEPENDENT.contains(&c.kind));
			next.after.retain(|c| ! COLOR_DEPENDENT.contains(&c.kind));
		}
		next
	}
}
