/*!
# Aplasta: Color Transforms

Most of the time images are re-encoded exactly as they came, rows and all,
but the output color type and bit depth can be overridden. Conversions are
lossless except where the request itself throws information away (dropping
color, alpha, or precision).
*/

use crate::ColorType;
use super::Header;



/// # Luminance Weights (Red, Green, Blue, out of 32768).
const LUMA: (u32, u32, u32) = (6968, 23_434, 2366);



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Transform Options.
pub(crate) struct TransformOptions {
	/// # Output Color Type.
	pub(crate) color_type: Option<ColorType>,

	/// # Output Bit Depth.
	pub(crate) bit_depth: Option<u8>,
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Transform Plan.
pub(crate) struct Transform {
	/// # Source Header.
	pub(crate) input: Header,

	/// # Output Header.
	pub(crate) output: Header,

	/// # Expand Palette/Low Depth/tRNS?
	pub(crate) expand: bool,

	/// # Strip 16-bit to 8-bit?
	pub(crate) strip16: bool,

	/// # Request Partially Refused?
	///
	/// This is set when the requested format couldn't be honored and the
	/// source format was kept instead.
	pub(crate) refused: bool,
}

impl Transform {
	#[must_use]
	/// # Plan.
	///
	/// Work out what the output should look like and what the decoder has
	/// to do to get there.
	pub(crate) fn plan(input: &Header, has_trns: bool, opts: TransformOptions) -> Self {
		let mut refused = false;
		let mut color = opts.color_type.unwrap_or(input.color_type);
		let mut depth = opts.bit_depth.unwrap_or(input.bit_depth);

		// Palettes can't be conjured from nothing, nor can their depth be
		// changed.
		if color == ColorType::Indexed {
			if input.color_type != ColorType::Indexed {
				refused = true;
				color = input.color_type;
			}
			if depth != input.bit_depth {
				refused = refused || opts.bit_depth.is_some();
				depth = input.bit_depth;
			}
		}

		// Nothing to do?
		if color == input.color_type && depth == input.bit_depth {
			return Self::identity(input, refused);
		}

		// Anything else comes out at 8 or 16 bits.
		if depth < 8 { depth = 8; }
		else if ! color.valid_depth(depth) { depth = 16; }

		let expand =
			input.color_type == ColorType::Indexed ||
			input.bit_depth < 8 ||
			(has_trns && color.has_alpha());
		let strip16 = input.bit_depth == 16 && depth == 8;

		Self {
			input: *input,
			output: input.with_format(color, depth),
			expand,
			strip16,
			refused,
		}
	}

	#[must_use]
	/// # Identity.
	const fn identity(input: &Header, refused: bool) -> Self {
		Self {
			input: *input,
			output: *input,
			expand: false,
			strip16: false,
			refused,
		}
	}

	#[must_use]
	/// # Is Identity?
	pub(crate) fn is_identity(&self) -> bool { self.input == self.output }

	#[must_use]
	/// # PNG Transformations.
	pub(crate) fn transformations(&self) -> png::Transformations {
		let mut out = png::Transformations::IDENTITY;
		if self.expand { out |= png::Transformations::EXPAND; }
		if self.strip16 { out |= png::Transformations::STRIP_16; }
		out
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Row Converter.
///
/// This handles whatever the decoder's own transformations didn't: channel
/// layout and 8-to-16-bit promotion.
pub(crate) struct Convert {
	/// # Source Color.
	src: ColorType,

	/// # Source Depth (8 or 16).
	src_depth: u8,

	/// # Destination Color.
	dst: ColorType,

	/// # Destination Depth (8 or 16).
	dst_depth: u8,
}

impl Convert {
	#[must_use]
	/// # New.
	///
	/// Return a converter from the decoder's output format to the final
	/// one, or `None` if they're already the same.
	pub(crate) fn new(src: ColorType, src_depth: u8, dst: ColorType, dst_depth: u8)
	-> Option<Self> {
		if src == dst && src_depth == dst_depth { None }
		else { Some(Self { src, src_depth, dst, dst_depth }) }
	}

	/// # Convert Row.
	///
	/// The result is written to `out`, replacing whatever was there.
	pub(crate) fn apply(&self, row: &[u8], out: &mut Vec<u8>) {
		out.clear();
		let src_bytes = usize::from(self.src.channels()) * usize::from(self.src_depth / 8);
		for px in row.chunks_exact(src_bytes) {
			let (r, g, b, a) = self.read(px);
			self.write(r, g, b, a, out);
		}
	}

	/// # Read Pixel.
	///
	/// Return RGBA at 16 bits.
	fn read(&self, px: &[u8]) -> (u16, u16, u16, u16) {
		let sample = |idx: usize| -> u16 {
			if self.src_depth == 16 {
				u16::from_be_bytes([px[idx * 2], px[idx * 2 + 1]])
			}
			else { u16::from(px[idx]) * 257 }
		};

		match self.src {
			ColorType::Gray | ColorType::Indexed => {
				let v = sample(0);
				(v, v, v, u16::MAX)
			},
			ColorType::GrayAlpha => {
				let v = sample(0);
				(v, v, v, sample(1))
			},
			ColorType::Rgb => (sample(0), sample(1), sample(2), u16::MAX),
			ColorType::Rgba => (sample(0), sample(1), sample(2), sample(3)),
		}
	}

	/// # Write Pixel.
	fn write(&self, r: u16, g: u16, b: u16, a: u16, out: &mut Vec<u8>) {
		let mut push = |v: u16| {
			if self.dst_depth == 16 { out.extend_from_slice(&v.to_be_bytes()); }
			else { out.push((v >> 8) as u8); }
		};

		match self.dst {
			ColorType::Gray | ColorType::Indexed => push(luma(r, g, b)),
			ColorType::GrayAlpha => {
				push(luma(r, g, b));
				push(a);
			},
			ColorType::Rgb => {
				push(r);
				push(g);
				push(b);
			},
			ColorType::Rgba => {
				push(r);
				push(g);
				push(b);
				push(a);
			},
		}
	}
}



#[must_use]
/// # Luminance.
///
/// Gray pixels pass through unchanged.
const fn luma(r: u16, g: u16, b: u16) -> u16 {
	if r == g && g == b { r }
	else {
		let v = (
			LUMA.0 * r as u32 +
			LUMA.1 * g as u32 +
			LUMA.2 * b as u32 +
			16_384
		) >> 15;
		if v > u16::MAX as u32 { u16::MAX }
		else { v as u16 }
	}
}
