/*!
# Aplasta: Row Filters
*/

use crate::Filter;



#[derive(Debug)]
/// # Row Filterer.
///
/// This holds the previous (unfiltered) row along with scratch space for
/// adaptive selection. Output rows are written with their filter-type byte
/// prefixed.
pub(super) struct RowFilter {
	/// # Filter.
	filter: Filter,

	/// # Bytes Per Pixel (Rounded Up).
	bpp: usize,

	/// # Previous Row.
	prev: Vec<u8>,

	/// # Scratch (Adaptive Only).
	scratch: [Vec<u8>; 5],
}

impl RowFilter {
	/// # New.
	pub(super) fn new(filter: Filter, bpp: usize) -> Self {
		Self {
			filter,
			bpp: bpp.max(1),
			prev: Vec::new(),
			scratch: Default::default(),
		}
	}

	/// # Reset.
	///
	/// The first row of an image (or interlacing pass) has nothing above it.
	pub(super) fn reset(&mut self) { self.prev.clear(); }

	/// # Filter Row.
	///
	/// Append the filtered row to `out`.
	pub(super) fn filter(&mut self, row: &[u8], out: &mut Vec<u8>) {
		// A missing row above is all zeroes.
		if self.prev.len() != row.len() {
			self.prev.clear();
			self.prev.resize(row.len(), 0);
		}

		match self.filter {
			Filter::Adaptive => self.adaptive(row, out),
			f => {
				out.push(f.as_u8());
				apply(f, row, &self.prev, self.bpp, out);
			},
		}

		self.prev.copy_from_slice(row);
	}

	/// # Adaptive Filter.
	///
	/// Try all five and keep whichever minimizes the sum of the residuals
	/// (treated as signed), ties going to the simpler filter.
	fn adaptive(&mut self, row: &[u8], out: &mut Vec<u8>) {
		let mut best = 0;
		let mut best_score = u64::MAX;
		for (idx, f) in Filter::ALL[..5].iter().enumerate() {
			let buf = &mut self.scratch[idx];
			buf.clear();
			apply(*f, row, &self.prev, self.bpp, buf);
			let score = score(buf);
			if score < best_score {
				best = idx;
				best_score = score;
			}
		}

		out.push(best as u8);
		out.extend_from_slice(&self.scratch[best]);
	}
}



/// # Apply Filter.
fn apply(filter: Filter, row: &[u8], prev: &[u8], bpp: usize, out: &mut Vec<u8>) {
	match filter {
		Filter::None | Filter::Adaptive => out.extend_from_slice(row),
		Filter::Sub => out.extend(
			row.iter().enumerate().map(|(i, &b)|
				if i < bpp { b }
				else { b.wrapping_sub(row[i - bpp]) }
			)
		),
		Filter::Up => out.extend(
			row.iter().zip(prev).map(|(&b, &up)| b.wrapping_sub(up))
		),
		Filter::Average => out.extend(
			row.iter().zip(prev).enumerate().map(|(i, (&b, &up))| {
				let left = if i < bpp { 0 } else { u16::from(row[i - bpp]) };
				b.wrapping_sub(((left + u16::from(up)) >> 1) as u8)
			})
		),
		Filter::Paeth => out.extend(
			row.iter().zip(prev).enumerate().map(|(i, (&b, &up))|
				if i < bpp { b.wrapping_sub(up) }
				else {
					b.wrapping_sub(paeth(row[i - bpp], up, prev[i - bpp]))
				}
			)
		),
	}
}

#[must_use]
/// # Paeth Predictor.
///
/// Return whichever of left, above, or upper-left is closest to
/// `left + above - upper_left`.
const fn paeth(a: u8, b: u8, c: u8) -> u8 {
	let p = a as i16 + b as i16 - c as i16;
	let pa = (p - a as i16).abs();
	let pb = (p - b as i16).abs();
	let pc = (p - c as i16).abs();

	if pa <= pb && pa <= pc { a }
	else if pb <= pc { b }
	else { c }
}

#[must_use]
/// # Score.
fn score(buf: &[u8]) -> u64 {
	buf.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum()
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_paeth() {
		assert_eq!(paeth(0, 0, 0), 0);
		assert_eq!(paeth(10, 20, 10), 20);
		assert_eq!(paeth(20, 10, 10), 20);
		assert_eq!(paeth(10, 10, 20), 10);
		assert_eq!(paeth(100, 50, 60), 100);
	}

	#[test]
	fn t_fixed() {
		let row1 = [1_u8, 2, 3, 4, 5, 6];
		let row2 = [2_u8, 4, 6, 8, 10, 12];

		// No previous row.
		let mut f = RowFilter::new(Filter::Sub, 2);
		let mut out = Vec::new();
		f.filter(&row1, &mut out);
		assert_eq!(out, [1, 1, 2, 2, 2, 2, 2]);

		// Up uses the previous row, zeroes the first time.
		let mut f = RowFilter::new(Filter::Up, 1);
		let mut out = Vec::new();
		f.filter(&row1, &mut out);
		f.filter(&row2, &mut out);
		assert_eq!(out, [2, 1, 2, 3, 4, 5, 6, 2, 1, 2, 3, 4, 5, 6]);

		// Average.
		let mut f = RowFilter::new(Filter::Average, 1);
		let mut out = Vec::new();
		f.filter(&row1, &mut out);
		assert_eq!(out, [3, 1, 2, 2, 3, 3, 4]);

		// Reset forgets the previous row.
		let mut f = RowFilter::new(Filter::Up, 1);
		let mut out = Vec::new();
		f.filter(&row1, &mut out);
		f.reset();
		out.clear();
		f.filter(&row2, &mut out);
		assert_eq!(out[1..], row2);
	}

	#[test]
	fn t_adaptive() {
		// A flat row is best left alone.
		let mut f = RowFilter::new(Filter::Adaptive, 1);
		let mut out = Vec::new();
		f.filter(&[0, 0, 0, 0], &mut out);
		assert_eq!(out, [0, 0, 0, 0, 0]);

		// A ramp is best as Sub.
		let mut f = RowFilter::new(Filter::Adaptive, 1);
		let mut out = Vec::new();
		f.filter(&[10, 20, 30, 40, 50], &mut out);
		assert_eq!(out, [1, 10, 10, 10, 10, 10]);

		// The same row twice is best as Up.
		out.clear();
		f.filter(&[10, 20, 30, 40, 50], &mut out);
		assert_eq!(out, [2, 0, 0, 0, 0, 0]);
	}
}
