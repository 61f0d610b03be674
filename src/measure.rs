/*!
# Aplasta: Size Measurement

The one number that matters when comparing PNGs here is the total length
of the image data chunks. Getting at it only requires a walk through the
chunk headers, so that's all this does.
*/

use crate::{
	EncodingError,
	OpenFiles,
	codec::{
		MAX_CHUNK_LEN,
		SIGNATURE,
	},
};
use std::{
	io::{
		BufReader,
		ErrorKind,
		Read,
	},
	path::Path,
};



/// # Read Buffer Size.
const BUF_SIZE: usize = 8192;



/// # Measure Payload Size.
///
/// Return the sum of all IDAT chunk lengths. Every chunk's checksum is
/// verified along the way, and the walk stops at `IEND`.
///
/// ## Errors
///
/// An error is returned if the signature is wrong, a chunk is malformed or
/// corrupt, or the stream ends before `IEND`.
pub(crate) fn measure_payload_size<R: Read>(mut src: R) -> Result<u64, EncodingError> {
	let mut sig = [0_u8; 8];
	match fill(&mut src, &mut sig)? {
		0 => return Err(EncodingError::Empty),
		8 if sig == SIGNATURE => {},
		_ => return Err(EncodingError::Signature),
	}

	let mut buf = [0_u8; BUF_SIZE];
	let mut total = 0_u64;
	loop {
		let mut head = [0_u8; 8];
		read_exact(&mut src, &mut head)?;
		let len = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
		if MAX_CHUNK_LEN < len { return Err(EncodingError::Length); }
		let kind = [head[4], head[5], head[6], head[7]];

		let mut crc = crc32fast::Hasher::new();
		crc.update(&kind);
		let mut left = len as usize;
		while left != 0 {
			let part = &mut buf[..left.min(BUF_SIZE)];
			read_exact(&mut src, part)?;
			crc.update(part);
			left -= part.len();
		}

		let mut expected = [0_u8; 4];
		read_exact(&mut src, &mut expected)?;
		if crc.finalize() != u32::from_be_bytes(expected) {
			return Err(EncodingError::Crc);
		}

		match &kind {
			b"IDAT" => { total += u64::from(len); },
			b"IEND" => return Ok(total),
			_ => {},
		}
	}
}

/// # Measure File.
///
/// ## Errors
///
/// An error is returned if the file can't be opened, or any of the reasons
/// listed for `measure_payload_size`.
pub(crate) fn measure_file(path: &Path, files: &OpenFiles) -> Result<u64, EncodingError> {
	let file = files.open(path)?;
	measure_payload_size(BufReader::new(file))
}



/// # Fill Buffer.
///
/// Read as much as possible into `buf`, returning the amount read. Unlike
/// `read_exact`, a short read isn't an error.
fn fill<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<usize, EncodingError> {
	let mut len = 0;
	while len < buf.len() {
		match src.read(&mut buf[len..]) {
			Ok(0) => break,
			Ok(n) => { len += n; },
			Err(e) if e.kind() == ErrorKind::Interrupted => {},
			Err(_) => return Err(EncodingError::Read),
		}
	}
	Ok(len)
}

/// # Read Exact.
fn read_exact<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<(), EncodingError> {
	if fill(src, buf)? == buf.len() { Ok(()) }
	else { Err(EncodingError::Truncated) }
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		codec::write_chunk,
		fixture,
	};

	fn build(parts: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
		let mut raw = SIGNATURE.to_vec();
		for (kind, data) in parts { write_chunk(&mut raw, kind, data).unwrap(); }
		raw
	}

	#[test]
	fn t_measure() {
		let big = vec![7_u8; BUF_SIZE * 2 + 5];
		let raw = build(&[
			(b"IHDR", &[0_u8; 13][..]),
			(b"IDAT", &[1_u8, 2, 3][..]),
			(b"IDAT", big.as_slice()),
			(b"tEXt", &b"a\0b"[..]),
			(b"IEND", &b""[..]),
		]);
		assert_eq!(measure_payload_size(raw.as_slice()), Ok(3 + big.len() as u64));

		// Anything after IEND doesn't matter.
		let mut extra = raw.clone();
		extra.extend_from_slice(b"garbage");
		assert_eq!(measure_payload_size(extra.as_slice()), Ok(3 + big.len() as u64));

		// No IDAT is zero.
		let raw = build(&[(b"IHDR", &[0_u8; 13][..]), (b"IEND", &b""[..])]);
		assert_eq!(measure_payload_size(raw.as_slice()), Ok(0));
	}

	#[test]
	fn t_measure_bad() {
		assert_eq!(measure_payload_size(&b""[..]), Err(EncodingError::Empty));
		assert_eq!(measure_payload_size(&b"GIF89a"[..]), Err(EncodingError::Signature));
		assert_eq!(measure_payload_size(&b"GIF89a\0\0\0\0"[..]), Err(EncodingError::Signature));

		let raw = build(&[
			(b"IHDR", &[0_u8; 13][..]),
			(b"IDAT", &[1_u8, 2, 3][..]),
			(b"IEND", &b""[..]),
		]);

		// Truncated anywhere.
		for len in [8, 12, 20, raw.len() - 1] {
			assert_eq!(
				measure_payload_size(&raw[..len]),
				Err(EncodingError::Truncated),
				"Length {len} should be truncated.",
			);
		}

		// Corrupt IDAT data.
		let mut bad = raw.clone();
		bad[8 + 25 + 8] ^= 1;
		assert_eq!(measure_payload_size(bad.as_slice()), Err(EncodingError::Crc));

		// Bad length.
		let mut bad = raw.clone();
		bad[8] = 0xFF;
		assert_eq!(measure_payload_size(bad.as_slice()), Err(EncodingError::Length));
	}

	#[test]
	fn t_measure_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("image.png");
		let pixels = fixture::gradient(16, 16, 3);
		let raw = fixture::png(16, 16, png::ColorType::Rgb, png::BitDepth::Eight, &pixels);
		std::fs::write(&path, &raw).unwrap();

		let files = OpenFiles::default();
		let size = measure_file(&path, &files).unwrap();
		assert_eq!(size, crate::codec::Metadata::scan(&raw).unwrap().idat());
		assert_eq!(files.count(), 0);
		assert_eq!(files.peak(), 1);

		assert_eq!(
			measure_file(&dir.path().join("missing.png"), &files),
			Err(EncodingError::Read),
		);
	}
}
