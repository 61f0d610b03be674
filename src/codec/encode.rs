/*!
# Aplasta: Encoder
*/

use crate::{
	EncodingError,
	Filter,
	Strategy,
};
use std::io::Write;
use super::{
	Header,
	Metadata,
	chunk::{
		IDAT,
		IEND,
		IHDR,
		SIGNATURE,
		write_chunk,
	},
	filter::RowFilter,
	zlib::Deflate,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Encoder Configuration.
pub(crate) struct EncoderConfig {
	/// # Row Filter.
	pub(crate) filter: Filter,

	/// # Compression Level.
	pub(crate) level: u8,

	/// # Compression Strategy.
	pub(crate) strategy: Strategy,

	/// # Window Bits.
	pub(crate) window_bits: u8,

	/// # Max IDAT Size.
	pub(crate) max_idat: usize,
}



#[derive(Debug)]
/// # Encoder.
///
/// Rows go in one at a time (pass by pass for interlaced images); a
/// complete PNG comes out the other side.
pub(crate) struct Encoder<'m, W: Write> {
	/// # Output.
	out: W,

	/// # Metadata.
	meta: &'m Metadata<'m>,

	/// # Row Filter.
	filter: RowFilter,

	/// # Compressor.
	zlib: Deflate,

	/// # Filtered Row.
	filtered: Vec<u8>,

	/// # Compressed, Not Yet Written.
	pending: Vec<u8>,

	/// # Max IDAT Size.
	max_idat: usize,

	/// # IDAT Bytes Written.
	idat: u64,

	/// # Pass Row Lengths and Counts.
	passes: Vec<(usize, u32)>,

	/// # Current Pass.
	pass: usize,

	/// # Rows Left in Pass.
	left: u32,
}

impl<'m, W: Write> Encoder<'m, W> {
	/// # New.
	///
	/// This writes everything up to the image data straight away.
	///
	/// ## Errors
	///
	/// An error is returned if the configuration is rejected or the output
	/// can't be written to.
	pub(crate) fn new(mut out: W, meta: &'m Metadata<'m>, config: EncoderConfig)
	-> Result<Self, EncodingError> {
		let header: &Header = meta.header();
		let passes = header.passes()
			.into_iter()
			.map(|(w, h)| header.row_bytes(w).map(|len| (len, h)))
			.collect::<Option<Vec<_>>>()
			.ok_or(EncodingError::Allocation)?;

		let mut filtered = Vec::new();
		filtered.try_reserve_exact(
			passes.iter().map(|(len, _)| *len).max().unwrap_or(0) + 1
		).map_err(|_| EncodingError::Allocation)?;

		let zlib = Deflate::new(config.level, config.strategy, config.window_bits)?;

		out.write_all(&SIGNATURE).map_err(|_| EncodingError::Encode)?;
		write_chunk(&mut out, &IHDR, &header.to_ihdr()).map_err(|_| EncodingError::Encode)?;
		for chunk in meta.before() {
			write_chunk(&mut out, &chunk.kind, chunk.data).map_err(|_| EncodingError::Encode)?;
		}

		let left = passes.first().map_or(0, |(_, h)| *h);
		Ok(Self {
			out,
			meta,
			filter: RowFilter::new(config.filter, header.filter_bpp()),
			zlib,
			filtered,
			pending: Vec::new(),
			max_idat: config.max_idat.max(1),
			idat: 0,
			passes,
			pass: 0,
			left,
		})
	}

	/// # Write Row.
	///
	/// ## Errors
	///
	/// An error is returned if the row is the wrong length, there are too
	/// many rows, or compression fails.
	pub(crate) fn write_row(&mut self, row: &[u8]) -> Result<(), EncodingError> {
		let Some((len, _)) = self.passes.get(self.pass) else {
			return Err(EncodingError::Encode);
		};
		if row.len() != *len { return Err(EncodingError::Encode); }

		self.filtered.clear();
		self.filter.filter(row, &mut self.filtered);
		self.zlib.write(&self.filtered, &mut self.pending)?;
		self.flush_idat(false)?;

		// Move along.
		self.left -= 1;
		while self.left == 0 && self.pass < self.passes.len() {
			self.pass += 1;
			self.filter.reset();
			self.left = self.passes.get(self.pass).map_or(0, |(_, h)| *h);
		}

		Ok(())
	}

	/// # Finish.
	///
	/// Flush the image data, write the trailing chunks, and return the
	/// output along with the total IDAT payload size.
	///
	/// ## Errors
	///
	/// An error is returned if rows are missing or anything fails to write.
	pub(crate) fn finish(mut self) -> Result<(W, u64), EncodingError> {
		if self.pass < self.passes.len() { return Err(EncodingError::Encode); }

		self.zlib.finish(&mut self.pending)?;
		self.flush_idat(true)?;

		for chunk in self.meta.after() {
			write_chunk(&mut self.out, &chunk.kind, chunk.data).map_err(|_| EncodingError::Encode)?;
		}
		write_chunk(&mut self.out, &IEND, &[]).map_err(|_| EncodingError::Encode)?;
		self.out.flush().map_err(|_| EncodingError::Encode)?;

		Ok((self.out, self.idat))
	}

	/// # Flush IDAT.
	///
	/// Write out as many full-sized IDAT chunks as possible, and if `all`,
	/// whatever is left over too.
	fn flush_idat(&mut self, all: bool) -> Result<(), EncodingError> {
		let mut written = 0;
		for part in self.pending.chunks(self.max_idat) {
			if part.len() < self.max_idat && ! all { break; }
			write_chunk(&mut self.out, &IDAT, part).map_err(|_| EncodingError::Encode)?;
			written += part.len();
		}

		if written != 0 {
			self.idat += written as u64;
			self.pending.drain(..written);
		}
		Ok(())
	}
}
