/*!
# Aplasta: Decoder
*/

use crate::{
	ColorType,
	EncodingError,
};
use std::io::Cursor;
use super::{
	Header,
	transform::{
		Convert,
		Transform,
	},
};



/// # Decoder.
///
/// Rows are handed out one at a time, already in the output format.
pub(crate) struct Decoder<'a> {
	/// # Reader.
	reader: png::Reader<Cursor<&'a [u8]>>,

	/// # Output Header.
	output: Header,

	/// # Row Converter.
	convert: Option<Convert>,

	/// # Converted Row Buffer.
	buf: Vec<u8>,

	/// # Rows Read.
	rows: u64,
}

impl std::fmt::Debug for Decoder<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Decoder")
			.field("output", &self.output)
			.field("convert", &self.convert)
			.field("rows", &self.rows)
			.finish_non_exhaustive()
	}
}

impl<'a> Decoder<'a> {
	/// # New.
	///
	/// ## Errors
	///
	/// An error is returned if the image can't be read, or if buffers for
	/// its rows can't be allocated.
	pub(crate) fn new(raw: &'a [u8], transform: &Transform) -> Result<Self, EncodingError> {
		let mut limits = png::Limits::default();
		limits.bytes = usize::MAX;

		let mut decoder = png::Decoder::new_with_limits(Cursor::new(raw), limits);
		decoder.set_transformations(transform.transformations());
		let reader = decoder.read_info()?;

		// The decoder should agree with our read of the header.
		let info = reader.info();
		if
			info.width != transform.input.width ||
			info.height != transform.input.height ||
			info.interlaced != transform.input.interlaced
		{
			return Err(EncodingError::Decode);
		}

		// Work out what's left to convert.
		let output = transform.output;
		let convert =
			if transform.is_identity() { None }
			else {
				let (color, depth) = reader.output_color_type();
				Convert::new(
					ColorType::from(color),
					depth as u8,
					output.color_type,
					output.bit_depth,
				)
			};

		// Make sure there's room for the widest row.
		let mut buf = Vec::new();
		if convert.is_some() {
			let len = output.row_bytes(output.width).ok_or(EncodingError::Allocation)?;
			buf.try_reserve_exact(len).map_err(|_| EncodingError::Allocation)?;
		}

		Ok(Self {
			reader,
			output,
			convert,
			buf,
			rows: 0,
		})
	}

	#[cfg(test)]
	#[must_use]
	/// # Output Header.
	pub(crate) const fn output(&self) -> &Header { &self.output }

	/// # Read Row.
	///
	/// Return the next row (of the current interlacing pass, if any), or
	/// `None` once the image has been exhausted.
	///
	/// ## Errors
	///
	/// Decoding errors are passed through.
	pub(crate) fn read_row(&mut self) -> Result<Option<&[u8]>, EncodingError> {
		let Some(row) = self.reader.next_row()? else { return Ok(None); };
		self.rows += 1;

		match &self.convert {
			None => Ok(Some(row.data())),
			Some(c) => {
				c.apply(row.data(), &mut self.buf);
				Ok(Some(&self.buf))
			},
		}
	}

	/// # Finish.
	///
	/// Read through to the end of the file, making sure nothing is amiss,
	/// and return the number of rows read.
	///
	/// ## Errors
	///
	/// An error is returned if the trailing chunks are corrupt.
	pub(crate) fn finish(mut self) -> Result<u64, EncodingError> {
		self.reader.finish()?;
		Ok(self.rows)
	}
}
