/*!
# Aplasta: Chunks
*/

use crate::EncodingError;
use std::io::{
	self,
	Write,
};



/// # PNG Signature.
pub(crate) const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// # Max Chunk Length.
pub(crate) const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

/// # IHDR.
pub(crate) const IHDR: [u8; 4] = *b"IHDR";

/// # IDAT.
pub(crate) const IDAT: [u8; 4] = *b"IDAT";

/// # IEND.
pub(crate) const IEND: [u8; 4] = *b"IEND";

/// # PLTE.
pub(crate) const PLTE: [u8; 4] = *b"PLTE";



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Chunk.
pub(crate) struct Chunk<'a> {
	/// # Type.
	pub(crate) kind: [u8; 4],

	/// # Data.
	pub(crate) data: &'a [u8],
}

impl Chunk<'_> {
	#[must_use]
	/// # Name.
	pub(crate) fn name(&self) -> &str {
		std::str::from_utf8(&self.kind).unwrap_or("????")
	}
}



#[derive(Debug)]
/// # Chunk Iterator.
///
/// Walk the chunks of an in-memory PNG, checking lengths and checksums
/// along the way. Iteration ends after `IEND`, or at the first error.
pub(crate) struct Chunks<'a> {
	/// # Remaining Data.
	raw: &'a [u8],

	/// # Done?
	done: bool,
}

impl<'a> Chunks<'a> {
	/// # New.
	///
	/// ## Errors
	///
	/// An error is returned if the signature is missing.
	pub(crate) fn new(raw: &'a [u8]) -> Result<Self, EncodingError> {
		let rest = raw.strip_prefix(SIGNATURE.as_slice()).ok_or(
			if raw.is_empty() { EncodingError::Empty }
			else { EncodingError::Signature }
		)?;
		Ok(Self { raw: rest, done: false })
	}

	/// # Next Chunk.
	fn next_chunk(&mut self) -> Result<Chunk<'a>, EncodingError> {
		let raw: &'a [u8] = self.raw;
		let [l1, l2, l3, l4, k1, k2, k3, k4, rest @ ..] = raw
		else { return Err(EncodingError::Truncated); };

		let len = u32::from_be_bytes([*l1, *l2, *l3, *l4]);
		if MAX_CHUNK_LEN < len { return Err(EncodingError::Length); }

		let len = len as usize;
		if rest.len() < len + 4 { return Err(EncodingError::Truncated); }
		let (data, rest) = rest.split_at(len);
		let (crc, rest) = rest.split_at(4);

		let kind = [*k1, *k2, *k3, *k4];
		if crc != crc32(&kind, data).to_be_bytes() { return Err(EncodingError::Crc); }

		self.raw = rest;
		Ok(Chunk { kind, data })
	}
}

impl<'a> Iterator for Chunks<'a> {
	type Item = Result<Chunk<'a>, EncodingError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done { return None; }
		let next = self.next_chunk();
		self.done = next.as_ref().map_or(true, |c| c.kind == IEND);
		Some(next)
	}
}



#[must_use]
/// # Chunk Checksum.
pub(crate) fn crc32(kind: &[u8; 4], data: &[u8]) -> u32 {
	let mut h = crc32fast::Hasher::new();
	h.update(kind);
	h.update(data);
	h.finalize()
}

/// # Write Chunk.
///
/// ## Errors
///
/// Write errors are passed through, and chunks that are too big are
/// rejected.
pub(crate) fn write_chunk<W: Write>(out: &mut W, kind: &[u8; 4], data: &[u8])
-> io::Result<()> {
	let len = u32::try_from(data.len())
		.ok()
		.filter(|&n| n <= MAX_CHUNK_LEN)
		.ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;

	out.write_all(&len.to_be_bytes())?;
	out.write_all(kind)?;
	out.write_all(data)?;
	out.write_all(&crc32(kind, data).to_be_bytes())
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_write_iend() {
		let mut out = Vec::new();
		write_chunk(&mut out, &IEND, &[]).unwrap();
		assert_eq!(out, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
	}

	#[test]
	fn t_chunks() {
		let mut raw = SIGNATURE.to_vec();
		write_chunk(&mut raw, b"tEXt", b"hello").unwrap();
		write_chunk(&mut raw, &IDAT, &[1, 2, 3]).unwrap();
		write_chunk(&mut raw, &IEND, &[]).unwrap();
		raw.extend_from_slice(b"trailing junk is ignored");

		let chunks = Chunks::new(&raw).unwrap()
			.collect::<Result<Vec<_>, _>>()
			.unwrap();
		assert_eq!(chunks.len(), 3);
		assert_eq!(chunks[0].name(), "tEXt");
		assert_eq!(chunks[0].data, b"hello");
		assert_eq!(chunks[1].kind, IDAT);
		assert_eq!(chunks[2].kind, IEND);
	}

	#[test]
	fn t_chunks_bad() {
		assert_eq!(Chunks::new(&[]).err(), Some(EncodingError::Empty));
		assert_eq!(Chunks::new(b"GIF89a").err(), Some(EncodingError::Signature));

		let mut raw = SIGNATURE.to_vec();
		write_chunk(&mut raw, &IDAT, &[1, 2, 3]).unwrap();

		// Truncated.
		let mut iter = Chunks::new(&raw[..raw.len() - 1]).unwrap();
		assert_eq!(iter.next(), Some(Err(EncodingError::Truncated)));
		assert_eq!(iter.next(), None);

		// Checksum.
		let mut bad = raw.clone();
		let last = bad.len() - 1;
		bad[last] ^= 1;
		let mut iter = Chunks::new(&bad).unwrap();
		assert_eq!(iter.next(), Some(Err(EncodingError::Crc)));

		// Length.
		let mut bad = raw.clone();
		bad[8] = 0x80;
		let mut iter = Chunks::new(&bad).unwrap();
		assert_eq!(iter.next(), Some(Err(EncodingError::Length)));

		// No IEND.
		let mut iter = Chunks::new(&raw).unwrap();
		assert!(matches!(iter.next(), Some(Ok(_))));
		assert_eq!(iter.next(), Some(Err(EncodingError::Truncated)));
	}
}
