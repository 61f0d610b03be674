/*!
# Aplasta: Test Fixtures

Test images are built on the fly with the `png` crate's own encoder, which
also makes for an independent check on our output.
*/

#![allow(clippy::cast_possible_truncation)]



/// # Gradient Pixels.
pub(crate) fn gradient(width: u32, height: u32, channels: u8) -> Vec<u8> {
	let mut out = Vec::with_capacity(width as usize * height as usize * usize::from(channels));
	for y in 0..height {
		for x in 0..width {
			for c in 0..u32::from(channels) {
				out.push(((x * 7 + y * 13 + c * 29) % 256) as u8);
			}
		}
	}
	out
}

/// # Noisy Pixels.
///
/// A cheap, deterministic LCG; hard to compress, which is the point.
pub(crate) fn noise(width: u32, height: u32, channels: u8) -> Vec<u8> {
	let len = width as usize * height as usize * usize::from(channels);
	let mut state = 0x2545_F491_u32;
	(0..len).map(|_| {
		state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		(state >> 24) as u8
	}).collect()
}

/// # Encode PNG.
pub(crate) fn png(
	width: u32,
	height: u32,
	color: png::ColorType,
	depth: png::BitDepth,
	pixels: &[u8],
) -> Vec<u8> {
	encode(width, height, color, depth, pixels, None, None)
}

/// # Encode Indexed PNG.
pub(crate) fn paletted(
	width: u32,
	height: u32,
	depth: png::BitDepth,
	palette: &[u8],
	trns: Option<&[u8]>,
	pixels: &[u8],
) -> Vec<u8> {
	encode(width, height, png::ColorType::Indexed, depth, pixels, Some(palette), trns)
}

/// # Encode.
fn encode(
	width: u32,
	height: u32,
	color: png::ColorType,
	depth: png::BitDepth,
	pixels: &[u8],
	palette: Option<&[u8]>,
	trns: Option<&[u8]>,
) -> Vec<u8> {
	let mut out = Vec::new();
	let mut enc = png::Encoder::new(&mut out, width, height);
	enc.set_color(color);
	enc.set_depth(depth);
	if let Some(p) = palette { enc.set_palette(p.to_vec()); }
	if let Some(t) = trns { enc.set_trns(t.to_vec()); }
	let mut writer = enc.write_header().expect("Header failed.");
	writer.write_image_data(pixels).expect("Image data failed.");
	writer.finish().expect("Finish failed.");
	out
}

/// # Decode PNG.
///
/// Return the raw (untransformed) pixels and color type.
pub(crate) fn decode(raw: &[u8]) -> (Vec<u8>, png::ColorType) {
	let mut dec = png::Decoder::new(raw);
	dec.set_transformations(png::Transformations::IDENTITY);
	let mut reader = dec.read_info().expect("Read info failed.");
	let mut buf = vec![0; reader.output_buffer_size()];
	let info = reader.next_frame(&mut buf).expect("Frame failed.");
	buf.truncate(info.buffer_size());
	(buf, info.color_type)
}

/// # Find Chunk.
///
/// Return the offset of the first `kind` chunk's data.
pub(crate) fn find_chunk(raw: &[u8], kind: [u8; 4]) -> Option<usize> {
	let mut pos = 8;
	while pos + 8 <= raw.len() {
		let len = u32::from_be_bytes([raw[pos], raw[pos + 1], raw[pos + 2], raw[pos + 3]]) as usize;
		if raw[pos + 4..pos + 8] == kind { return Some(pos + 8); }
		pos += 12 + len;
	}
	None
}
