/*!
# Aplasta: Zlib

A thin, safe wrapper around zlib's deflate stream, which is the only way to
get at all three knobs we care about: level, strategy, and window size.
*/

use crate::{
	EncodingError,
	Strategy,
};
use libz_sys::{
	uInt,
	voidpf,
	z_stream,
};
use std::{
	ffi::{
		c_int,
		c_void,
	},
	fmt,
	mem::MaybeUninit,
	ptr::addr_of_mut,
};



/// # Output Buffer Size.
const ZBUF_SIZE: usize = 8192;

/// # Memory Level.
const MEM_LEVEL: c_int = 8;



/// # Deflate Stream.
pub(super) struct Deflate {
	/// # Stream.
	///
	/// zlib keeps pointers back into this, so it has to stay put.
	stream: Box<z_stream>,

	/// # Output Buffer.
	buf: Box<[u8; ZBUF_SIZE]>,

	/// # Finished?
	done: bool,
}

impl fmt::Debug for Deflate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Deflate")
			.field("total_in", &self.stream.total_in)
			.field("total_out", &self.stream.total_out)
			.field("done", &self.done)
			.finish_non_exhaustive()
	}
}

impl Drop for Deflate {
	fn drop(&mut self) {
		// Safety: the stream was initialized by deflateInit2_.
		unsafe { libz_sys::deflateEnd(&mut *self.stream); }
	}
}

impl Deflate {
	/// # New.
	///
	/// ## Errors
	///
	/// An error is returned if zlib rejects the settings.
	pub(super) fn new(level: u8, strategy: Strategy, window_bits: u8)
	-> Result<Self, EncodingError> {
		let mut stream: Box<MaybeUninit<z_stream>> = Box::new(MaybeUninit::zeroed());

		// Safety: zlib only requires the allocator fields and opaque to be
		// set before init; the function pointers aren't nullable on the Rust
		// side so they need to be written before assuming anything.
		let mut stream = unsafe {
			let ptr = stream.as_mut_ptr();
			addr_of_mut!((*ptr).zalloc).write(zalloc);
			addr_of_mut!((*ptr).zfree).write(zfree);
			let res = libz_sys::deflateInit2_(
				ptr,
				c_int::from(level.min(9)),
				libz_sys::Z_DEFLATED,
				c_int::from(window_bits.clamp(8, 15)),
				MEM_LEVEL,
				strategy_int(strategy),
				libz_sys::zlibVersion(),
				std::mem::size_of::<z_stream>() as c_int,
			);
			if res != libz_sys::Z_OK { return Err(EncodingError::Encode); }
			Box::from_raw(Box::into_raw(stream).cast::<z_stream>())
		};

		stream.next_out = std::ptr::null_mut();
		stream.avail_out = 0;

		Ok(Self {
			stream,
			buf: Box::new([0; ZBUF_SIZE]),
			done: false,
		})
	}

	/// # Write.
	///
	/// Compress `data`, appending whatever zlib has ready to `out`.
	///
	/// ## Errors
	///
	/// An error is returned if zlib chokes or the stream was already
	/// finished.
	pub(super) fn write(&mut self, data: &[u8], out: &mut Vec<u8>)
	-> Result<(), EncodingError> {
		if self.done { return Err(EncodingError::Encode); }
		if data.is_empty() { return Ok(()); }

		for part in data.chunks(uInt::MAX as usize) {
			self.stream.next_in = part.as_ptr().cast_mut();
			self.stream.avail_in = part.len() as uInt;

			while self.stream.avail_in != 0 {
				self.deflate(libz_sys::Z_NO_FLUSH, out)?;
			}
		}

		self.stream.next_in = std::ptr::null_mut();
		Ok(())
	}

	/// # Finish.
	///
	/// Flush everything that's left, appending it to `out`.
	///
	/// ## Errors
	///
	/// An error is returned if zlib chokes or the stream was already
	/// finished.
	pub(super) fn finish(&mut self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
		if self.done { return Err(EncodingError::Encode); }
		self.stream.next_in = std::ptr::null_mut();
		self.stream.avail_in = 0;

		while ! self.deflate(libz_sys::Z_FINISH, out)? {}
		self.done = true;
		Ok(())
	}

	/// # Deflate (Once).
	///
	/// Run a single deflate call through the output buffer, returning `true`
	/// if zlib says the stream has ended.
	fn deflate(&mut self, flush: c_int, out: &mut Vec<u8>) -> Result<bool, EncodingError> {
		self.stream.next_out = self.buf.as_mut_ptr();
		self.stream.avail_out = ZBUF_SIZE as uInt;

		// Safety: the input pointer/length were set by the caller and the
		// output buffer is ours.
		let res = unsafe { libz_sys::deflate(&mut *self.stream, flush) };

		let len = ZBUF_SIZE - self.stream.avail_out as usize;
		out.extend_from_slice(&self.buf[..len]);
		self.stream.next_out = std::ptr::null_mut();
		self.stream.avail_out = 0;

		match res {
			libz_sys::Z_STREAM_END => Ok(true),
			libz_sys::Z_OK => Ok(false),
			_ => Err(EncodingError::Encode),
		}
	}
}



/// # Strategy Constant.
const fn strategy_int(strategy: Strategy) -> c_int {
	match strategy {
		Strategy::Default => libz_sys::Z_DEFAULT_STRATEGY,
		Strategy::Filtered => libz_sys::Z_FILTERED,
		Strategy::HuffmanOnly => libz_sys::Z_HUFFMAN_ONLY,
	}
}

/// # Allocate.
extern "C" fn zalloc(_opaque: voidpf, items: uInt, size: uInt) -> voidpf {
	// Safety: calloc is fine with whatever; null is an acceptable answer.
	unsafe { libc::calloc(items as libc::size_t, size as libc::size_t).cast::<c_void>() }
}

/// # Free.
extern "C" fn zfree(_opaque: voidpf, address: voidpf) {
	// Safety: the pointer came from zalloc.
	unsafe { libc::free(address.cast::<libc::c_void>()) }
}



#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Read;

	/// # Inflate.
	///
	/// Run the output back through zlib to make sure it's a valid stream.
	fn inflate(src: &[u8]) -> Vec<u8> {
		let mut stream: Box<MaybeUninit<z_stream>> = Box::new(MaybeUninit::zeroed());
		let mut out = vec![0_u8; 1 << 20];
		unsafe {
			let ptr = stream.as_mut_ptr();
			addr_of_mut!((*ptr).zalloc).write(zalloc);
			addr_of_mut!((*ptr).zfree).write(zfree);
			assert_eq!(
				libz_sys::inflateInit_(ptr, libz_sys::zlibVersion(), std::mem::size_of::<z_stream>() as c_int),
				libz_sys::Z_OK,
			);
			let s = &mut *ptr;
			s.next_in = src.as_ptr().cast_mut();
			s.avail_in = src.len() as uInt;
			s.next_out = out.as_mut_ptr();
			s.avail_out = out.len() as uInt;
			assert_eq!(libz_sys::inflate(s, libz_sys::Z_FINISH), libz_sys::Z_STREAM_END);
			let len = s.total_out as usize;
			libz_sys::inflateEnd(s);
			out.truncate(len);
		}
		out
	}

	#[test]
	fn t_roundtrip() {
		let mut raw = Vec::new();
		std::io::repeat(b'a').take(5000).read_to_end(&mut raw).unwrap();
		raw.extend((0..=255_u8).cycle().take(70_000));

		for strategy in Strategy::ALL {
			for (level, window) in [(0, 15), (1, 9), (9, 12), (9, 15)] {
				let mut z = Deflate::new(level, strategy, window).unwrap();
				let mut out = Vec::new();
				for chunk in raw.chunks(777) { z.write(chunk, &mut out).unwrap(); }
				z.finish(&mut out).unwrap();
				assert_eq!(inflate(&out), raw, "{strategy:?}/{level}/{window}");

				// Done is done.
				assert!(z.write(b"more", &mut out).is_err());
				assert!(z.finish(&mut out).is_err());
			}
		}
	}

	#[test]
	fn t_window_header() {
		// The window shows up in the zlib header's CINFO nibble.
		for window in 9..=15_u8 {
			let mut z = Deflate::new(9, Strategy::Default, window).unwrap();
			let mut out = Vec::new();
			z.write(b"Hello hello hello hello", &mut out).unwrap();
			z.finish(&mut out).unwrap();
			assert_eq!(out[0] >> 4, window - 8);
		}
	}

	#[test]
	fn t_empty() {
		let mut z = Deflate::new(9, Strategy::Default, 15).unwrap();
		let mut out = Vec::new();
		z.write(&[], &mut out).unwrap();
		z.finish(&mut out).unwrap();
		assert!(inflate(&out).is_empty());
	}
}
