/*!
# Aplasta: Image Header
*/

use crate::EncodingError;
use std::fmt;



/// # Adam7 Passes.
///
/// Column offset, row offset, column step, row step.
const ADAM7: [(u32, u32, u32, u32); 7] = [
	(0, 0, 8, 8),
	(4, 0, 8, 8),
	(0, 4, 4, 8),
	(2, 0, 4, 4),
	(0, 2, 2, 4),
	(1, 0, 2, 2),
	(0, 1, 1, 2),
];



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Color Type.
pub(crate) enum ColorType {
	/// # Grayscale.
	Gray = 0,

	/// # Truecolor.
	Rgb = 2,

	/// # Indexed.
	Indexed = 3,

	/// # Grayscale + Alpha.
	GrayAlpha = 4,

	/// # Truecolor + Alpha.
	Rgba = 6,
}

impl fmt::Display for ColorType {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<png::ColorType> for ColorType {
	fn from(src: png::ColorType) -> Self {
		match src {
			png::ColorType::Grayscale => Self::Gray,
			png::ColorType::Rgb => Self::Rgb,
			png::ColorType::Indexed => Self::Indexed,
			png::ColorType::GrayscaleAlpha => Self::GrayAlpha,
			png::ColorType::Rgba => Self::Rgba,
		}
	}
}

impl ColorType {
	#[must_use]
	/// # From Number.
	pub(crate) const fn from_u8(raw: u8) -> Option<Self> {
		match raw {
			0 => Some(Self::Gray),
			2 => Some(Self::Rgb),
			3 => Some(Self::Indexed),
			4 => Some(Self::GrayAlpha),
			6 => Some(Self::Rgba),
			_ => None,
		}
	}

	#[must_use]
	/// # As Number.
	pub(crate) const fn as_u8(self) -> u8 { self as u8 }

	#[must_use]
	/// # As Str.
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Gray => "grayscale",
			Self::Rgb => "RGB",
			Self::Indexed => "indexed",
			Self::GrayAlpha => "grayscale+alpha",
			Self::Rgba => "RGBA",
		}
	}

	#[must_use]
	/// # Channels.
	pub(crate) const fn channels(self) -> u8 {
		match self {
			Self::Gray | Self::Indexed => 1,
			Self::GrayAlpha => 2,
			Self::Rgb => 3,
			Self::Rgba => 4,
		}
	}

	#[must_use]
	/// # Has Alpha Channel?
	pub(crate) const fn has_alpha(self) -> bool {
		matches!(self, Self::GrayAlpha | Self::Rgba)
	}

	#[must_use]
	/// # Valid Depth?
	pub(crate) const fn valid_depth(self, depth: u8) -> bool {
		match self {
			Self::Gray => matches!(depth, 1 | 2 | 4 | 8 | 16),
			Self::Indexed => matches!(depth, 1 | 2 | 4 | 8),
			Self::Rgb | Self::GrayAlpha | Self::Rgba => matches!(depth, 8 | 16),
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Image Header.
pub(crate) struct Header {
	/// # Width.
	pub(crate) width: u32,

	/// # Height.
	pub(crate) height: u32,

	/// # Bit Depth.
	pub(crate) bit_depth: u8,

	/// # Color Type.
	pub(crate) color_type: ColorType,

	/// # Interlaced?
	pub(crate) interlaced: bool,
}

impl Header {
	/// # From IHDR.
	///
	/// ## Errors
	///
	/// An error is returned if the chunk is the wrong size or describes
	/// something impossible.
	pub(crate) fn from_ihdr(data: &[u8]) -> Result<Self, EncodingError> {
		let [w1, w2, w3, w4, h1, h2, h3, h4, depth, color, 0, 0, interlace] = *data
		else { return Err(EncodingError::Decode); };

		let width = u32::from_be_bytes([w1, w2, w3, w4]);
		let height = u32::from_be_bytes([h1, h2, h3, h4]);
		let color_type = ColorType::from_u8(color).ok_or(EncodingError::Decode)?;
		if
			width == 0 || height == 0 ||
			width > 0x7FFF_FFFF || height > 0x7FFF_FFFF ||
			! color_type.valid_depth(depth) || 1 < interlace
		{
			return Err(EncodingError::Decode);
		}

		Ok(Self {
			width,
			height,
			bit_depth: depth,
			color_type,
			interlaced: interlace == 1,
		})
	}

	#[must_use]
	/// # To IHDR.
	pub(crate) fn to_ihdr(&self) -> [u8; 13] {
		let mut out = [0_u8; 13];
		out[..4].copy_from_slice(&self.width.to_be_bytes());
		out[4..8].copy_from_slice(&self.height.to_be_bytes());
		out[8] = self.bit_depth;
		out[9] = self.color_type.as_u8();
		out[12] = u8::from(self.interlaced);
		out
	}

	#[must_use]
	/// # Bits Per Pixel.
	pub(crate) const fn bits_per_pixel(&self) -> u64 {
		self.color_type.channels() as u64 * self.bit_depth as u64
	}

	#[must_use]
	/// # Filter Distance.
	///
	/// This is the byte distance filters look back for the "left" pixel.
	pub(crate) const fn filter_bpp(&self) -> usize {
		let bytes = (self.bits_per_pixel() / 8) as usize;
		if bytes == 0 { 1 }
		else { bytes }
	}

	#[must_use]
	/// # Row Bytes.
	///
	/// Return the unfiltered length of a row `width` pixels wide.
	pub(crate) const fn row_bytes(&self, width: u32) -> Option<usize> {
		let bits = match (width as u64).checked_mul(self.bits_per_pixel()) {
			Some(b) => b,
			None => return None,
		};
		let bytes = bits.div_ceil(8);
		if bytes <= usize::MAX as u64 { Some(bytes as usize) }
		else { None }
	}

	#[must_use]
	/// # Required Bytes.
	///
	/// This approximates the size of the filtered image data, which is what
	/// the compression window has to cover.
	pub(crate) const fn required_bytes(&self) -> u64 {
		let row = (self.width as u64 * self.bits_per_pixel() + 15) >> 3;
		row.saturating_mul(self.height as u64)
	}

	#[must_use]
	/// # Passes.
	///
	/// Return the width and height of each (non-empty) pass, or just the
	/// image dimensions if not interlaced.
	pub(crate) fn passes(&self) -> Vec<(u32, u32)> {
		if self.interlaced {
			ADAM7.iter()
				.filter_map(|&(x, y, dx, dy)| {
					let w = pass_len(self.width, x, dx);
					let h = pass_len(self.height, y, dy);
					if w == 0 || h == 0 { None }
					else { Some((w, h)) }
				})
				.collect()
		}
		else { vec![(self.width, self.height)] }
	}

	#[must_use]
	/// # Change Color?
	///
	/// Return a copy with a different color type and/or depth.
	pub(crate) const fn with_format(mut self, color_type: ColorType, bit_depth: u8) -> Self {
		self.color_type = color_type;
		self.bit_depth = bit_depth;
		self
	}
}

/// # Pass Length.
const fn pass_len(total: u32, start: u32, step: u32) -> u32 {
	if total <= start { 0 }
	else { (total - start).div_ceil(step) }
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_ihdr() {
		let h = Header {
			width: 300,
			height: 17,
			bit_depth: 16,
			color_type: ColorType::Rgba,
			interlaced: true,
		};
		let raw = h.to_ihdr();
		assert_eq!(raw, [0, 0, 1, 44, 0, 0, 0, 17, 16, 6, 0, 0, 1]);
		assert_eq!(Header::from_ihdr(&raw), Ok(h));

		// Bad bits.
		assert!(Header::from_ihdr(&raw[..12]).is_err());
		let mut bad = raw;
		bad[9] = 5;
		assert!(Header::from_ihdr(&bad).is_err());
		bad = raw;
		bad[8] = 4;
		assert!(Header::from_ihdr(&bad).is_err());
		bad = raw;
		bad[3] = 0;
		bad[2] = 0;
		assert!(Header::from_ihdr(&bad).is_err());
		bad = raw;
		bad[12] = 2;
		assert!(Header::from_ihdr(&bad).is_err());
	}

	#[test]
	fn t_sizes() {
		let h = Header {
			width: 13,
			height: 5,
			bit_depth: 1,
			color_type: ColorType::Gray,
			interlaced: false,
		};
		assert_eq!(h.filter_bpp(), 1);
		assert_eq!(h.row_bytes(13), Some(2));
		assert_eq!(h.required_bytes(), 5 * 3);

		let h = h.with_format(ColorType::Rgb, 16);
		assert_eq!(h.filter_bpp(), 6);
		assert_eq!(h.row_bytes(13), Some(78));
		assert_eq!(h.required_bytes(), 5 * 79);
	}

	#[test]
	fn t_passes() {
		let mut h = Header {
			width: 1,
			height: 1,
			bit_depth: 8,
			color_type: ColorType::Gray,
			interlaced: true,
		};
		assert_eq!(h.passes(), vec![(1, 1)]);

		h.width = 8;
		h.height = 8;
		assert_eq!(
			h.passes(),
			vec![(1, 1), (1, 1), (2, 1), (2, 2), (4, 2), (4, 4), (8, 4)],
		);

		h.width = 3;
		h.height = 2;
		assert_eq!(h.passes(), vec![(1, 1), (1, 1), (1, 1), (3, 1)]);

		h.interlaced = false;
		assert_eq!(h.passes(), vec![(3, 2)]);
	}
}
