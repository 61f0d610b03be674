/*!
# Aplasta: Settings
*/

use crate::{
	ColorType,
	SearchConfig,
	codec::TransformOptions,
};



/// # Default Window Ceiling (Bits).
pub(crate) const MAX_WINDOW_BITS: u8 = 15;

/// # Default (and Max) IDAT Chunk Size.
pub(crate) const MAX_IDAT_SIZE: usize = 8192;

/// # Fallback Window (Bits).
///
/// This is used when `-w` gets a value it doesn't understand.
const FALLBACK_WINDOW_BITS: u8 = 12;



#[must_use]
/// # Window Bits.
///
/// Return the smallest window that comfortably holds `required` bytes of
/// filtered image data, never exceeding `ceiling`.
pub(crate) const fn window_bits(required: u64, ceiling: u8) -> u8 {
	let bits =
		if required <= 512 { 9 }
		else if required <= 1024 { 10 }
		else if required <= 2048 { 11 }
		else if required <= 4096 { 12 }
		else if required <= 8192 { 13 }
		else if required <= 16_386 { 14 }
		else { 15 };

	if ceiling < bits { ceiling }
	else { bits }
}

#[must_use]
/// # Window Bits From CLI Value.
///
/// Values are in KiB (`32` through `1`), except for `512` and `256`, which
/// are bytes. Anything else returns `None`.
pub(crate) const fn window_bits_from_size(raw: u32) -> Option<u8> {
	match raw {
		32 => Some(15),
		16 => Some(14),
		8 => Some(13),
		4 => Some(12),
		2 => Some(11),
		1 => Some(10),
		512 => Some(9),
		256 => Some(8),
		_ => None,
	}
}



#[derive(Debug, Clone)]
/// # Settings.
///
/// Everything that shapes a run, decided once up front.
pub(crate) struct Settings {
	/// # Search.
	search: SearchConfig,

	/// # Output Color Type.
	color_type: Option<ColorType>,

	/// # Output Bit Depth.
	bit_depth: Option<u8>,

	/// # Window Ceiling (Bits).
	window: u8,

	/// # Max IDAT Size.
	max_idat: usize,

	/// # Always Write?
	force: bool,

	/// # Never Write?
	nosave: bool,
}

impl Default for Settings {
	fn default() -> Self { Self::new(SearchConfig::default()) }
}

impl Settings {
	#[must_use]
	/// # New.
	pub(crate) const fn new(search: SearchConfig) -> Self {
		Self {
			search,
			color_type: None,
			bit_depth: None,
			window: MAX_WINDOW_BITS,
			max_idat: MAX_IDAT_SIZE,
			force: false,
			nosave: false,
		}
	}

	#[must_use]
	/// # With Color Type.
	pub(crate) fn with_color_type(mut self, color: ColorType) -> Self {
		self.color_type = Some(color);
		self
	}

	#[must_use]
	/// # With Bit Depth.
	///
	/// Only `8` and `16` can be forced; anything else is ignored.
	pub(crate) fn with_bit_depth(mut self, depth: u8) -> Self {
		if depth == 8 || depth == 16 { self.bit_depth = Some(depth); }
		self
	}

	#[must_use]
	/// # With Window Ceiling.
	///
	/// This takes the raw `-w` value; unknown sizes fall back to 4KiB.
	pub(crate) fn with_window_size(mut self, raw: u32) -> Self {
		self.window = match window_bits_from_size(raw) {
			Some(w) => w,
			None => FALLBACK_WINDOW_BITS,
		};
		self
	}

	#[must_use]
	/// # With Max IDAT Size.
	///
	/// The value is clamped to `1..=8192`.
	pub(crate) fn with_max_idat(mut self, raw: u64) -> Self {
		self.max_idat =
			if raw == 0 { 1 }
			else if raw >= MAX_IDAT_SIZE as u64 { MAX_IDAT_SIZE }
			else { raw as usize };
		self
	}

	#[must_use]
	/// # With Force.
	pub(crate) fn with_force(mut self) -> Self {
		self.force = true;
		self
	}

	#[must_use]
	/// # With No-Save.
	pub(crate) fn with_nosave(mut self) -> Self {
		self.nosave = true;
		self
	}
}

impl Settings {
	#[must_use]
	/// # Search Configuration.
	pub(crate) const fn search(&self) -> &SearchConfig { &self.search }

	#[must_use]
	/// # Output Color Type.
	pub(crate) const fn color_type(&self) -> Option<ColorType> { self.color_type }

	#[must_use]
	/// # Output Bit Depth.
	pub(crate) const fn bit_depth(&self) -> Option<u8> { self.bit_depth }

	#[must_use]
	/// # Transform Options.
	pub(crate) const fn transform_options(&self) -> TransformOptions {
		TransformOptions {
			color_type: self.color_type,
			bit_depth: self.bit_depth,
		}
	}

	#[must_use]
	/// # Window Ceiling.
	pub(crate) const fn window(&self) -> u8 { self.window }

	#[must_use]
	/// # Max IDAT Size.
	pub(crate) const fn max_idat(&self) -> usize { self.max_idat }

	#[must_use]
	/// # Force?
	pub(crate) const fn force(&self) -> bool { self.force }

	#[must_use]
	/// # No-Save?
	pub(crate) const fn nosave(&self) -> bool { self.nosave }
}
