/*!
# Aplasta: Trials
*/

use crate::{
	Candidate,
	EncodingError,
	Metadata,
	OpenFiles,
	Settings,
	codec::{
		Decoder,
		Encoder,
		EncoderConfig,
		Transform,
	},
	measure::measure_payload_size,
	opts::window_bits,
};
use std::{
	path::Path,
	time::{
		Duration,
		Instant,
	},
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Trial Outcome.
pub(super) struct Outcome {
	/// # Verified IDAT Size.
	pub(super) size: u64,

	/// # Encoded File.
	pub(super) data: Vec<u8>,

	/// # Window Bits Used.
	pub(super) window: u8,

	/// # Time Spent Decoding.
	pub(super) decode: Duration,

	/// # Time Spent Encoding.
	pub(super) encode: Duration,
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Trial Result.
pub(super) enum Trial {
	/// # Success.
	Done(Outcome),

	/// # Failure (Candidate Excluded).
	Failed(EncodingError),
}



/// # Run Trial.
///
/// Read the input fresh, decode it, and re-encode it with the candidate's
/// parameters, returning the verified result.
///
/// Faults in the image data only fail the trial. The `Err` side is reserved
/// for problems that would doom every trial equally, like the input
/// vanishing or memory running out.
///
/// ## Errors
///
/// An error is returned if the input can't be read, or buffers can't be
/// allocated.
pub(super) fn run_trial(
	src: &Path,
	candidate: &Candidate,
	settings: &Settings,
	files: &OpenFiles,
) -> Result<Trial, EncodingError> {
	// The handle is closed again before any decoding happens.
	let raw = files.read(src)?;
	match encode(&raw, candidate, settings) {
		Ok(out) => Ok(Trial::Done(out)),
		Err(e) if e.is_fatal() => Err(e),
		Err(e) => Ok(Trial::Failed(e)),
	}
}

/// # Encode.
fn encode(raw: &[u8], candidate: &Candidate, settings: &Settings)
-> Result<Outcome, EncodingError> {
	let mut decode = Duration::ZERO;
	let mut encode = Duration::ZERO;

	// The header is reread every time; the output format decides the window.
	let now = Instant::now();
	let meta = Metadata::scan(raw)?;
	let transform = Transform::plan(
		meta.header(),
		meta.has(*b"tRNS"),
		settings.transform_options(),
	);
	let mut decoder = Decoder::new(raw, &transform)?;
	decode += now.elapsed();

	let now = Instant::now();
	let out_meta = meta.for_output(&transform.output);
	let window = window_bits(transform.output.required_bytes(), settings.window());
	let mut encoder = Encoder::new(
		Vec::with_capacity(raw.len()),
		&out_meta,
		EncoderConfig {
			filter: candidate.filter,
			level: candidate.level,
			strategy: candidate.strategy,
			window_bits: window,
			max_idat: settings.max_idat(),
		},
	)?;
	encode += now.elapsed();

	// One row at a time.
	loop {
		let now = Instant::now();
		let row = decoder.read_row()?;
		decode += now.elapsed();
		let Some(row) = row else { break; };

		let now = Instant::now();
		encoder.write_row(row)?;
		encode += now.elapsed();
	}

	let now = Instant::now();
	decoder.finish()?;
	decode += now.elapsed();

	let now = Instant::now();
	let (data, size) = encoder.finish()?;
	encode += now.elapsed();

	// Make sure what we wrote measures the way we think it does.
	match measure_payload_size(data.as_slice()) {
		Ok(measured) if measured == size && size != 0 => Ok(Outcome {
			size,
			data,
			window,
			decode,
			encode,
		}),
		_ => Err(EncodingError::Verify),
	}
}
