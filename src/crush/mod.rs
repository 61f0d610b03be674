/*!
# Aplasta: Crush

This is where a single file gets worked over: measure it, try the candidate
encodings the search calls for, then write the winner (or the original, or
nothing at all).
*/

mod policy;
mod report;
mod trial;

pub(crate) use report::{
	Report,
	Totals,
};

use crate::{
	CandidateTable,
	EncodingError,
	Metadata,
	OpenFiles,
	Settings,
	Status,
	codec::Transform,
	measure::measure_file,
};
use policy::RunState;
use std::{
	path::Path,
	time::Duration,
};
use trial::{
	Outcome,
	Trial,
	run_trial,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Disposition.
pub(crate) enum Disposition {
	/// # Wrote the Re-Encoded Winner.
	Commit(u8),

	/// # Kept the Original.
	CopyOriginal,

	/// # Measured Only (Winner ID).
	Measured(u8),
}



/// # Run.
///
/// Crush `input`, saving the result to `output`.
///
/// ## Errors
///
/// An error is returned if the file has to be skipped or every trial fails.
/// Either way, nothing is written.
pub(crate) fn run(input: &Path, output: &Path, settings: &Settings, status: Status)
-> Result<Report, EncodingError> {
	let files = OpenFiles::default();
	let mut report = crush(input, output, settings, status, &files)?;
	report.open_files = files.count();
	report.peak_files = files.peak();
	Ok(report)
}

/// # Crush (Inner).
fn crush(
	input: &Path,
	output: &Path,
	settings: &Settings,
	status: Status,
	files: &OpenFiles,
) -> Result<Report, EncodingError> {
	if same_file(input, output) { return Err(EncodingError::Collision); }

	// Nothing to work with?
	let baseline = measure_file(input, files)?;
	if baseline == 0 { return Err(EncodingError::NoPayload); }
	status.custom(Status::NORMAL, "Baseline", 199, &format!(
		"{}: {} bytes of image data.",
		input.display(),
		dactyl::NiceU64::from(baseline),
	));

	// Work out whether the output is meant to differ from the input.
	let raw = files.read(input)?;
	let meta = Metadata::scan(&raw)?;
	let transform = Transform::plan(
		meta.header(),
		meta.has(*b"tRNS"),
		settings.transform_options(),
	);
	describe(&meta, &transform, status);
	if transform.refused {
		status.warning(&format!(
			"{}: the requested color type or bit depth is not possible; keeping {} at {} bits.",
			input.display(),
			transform.output.color_type,
			transform.output.bit_depth,
		));
	}
	let semantic = ! transform.is_identity();

	// Run the search, holding on to the best output seen.
	let table = CandidateTable::build(settings.search());
	let mut state = RunState::new(baseline);
	let mut best: Option<(u8, Outcome)> = None;
	let mut decode = Duration::ZERO;
	let mut encode = Duration::ZERO;
	let pruned = policy::search(&mut state, settings.search(), &table, |candidate| {
		match run_trial(input, &candidate, settings, files)? {
			Trial::Done(out) => {
				decode += out.decode;
				encode += out.encode;
				status.custom(Status::NORMAL, "Trial", 12, &format!(
					"Method {:>3} (fm {} zl {} zs {}): IDAT = {}{}",
					candidate.id,
					candidate.filter.as_u8(),
					candidate.level,
					candidate.strategy.as_str(),
					dactyl::NiceU64::from(out.size),
					if status.at_least(Status::VERBOSE) { format!(" (window {} bits)", out.window) }
					else { String::new() },
				));
				let size = out.size;
				if best.as_ref().map_or(true, |(_, b)| size < b.size) {
					best.replace((candidate.id, out));
				}
				Ok(Some(size))
			},
			Trial::Failed(e) => {
				status.custom(Status::NORMAL, "Trial", 11, &format!(
					"Method {:>3} failed: {e}.",
					candidate.id,
				));
				Ok(None)
			},
		}
	})?;
	if ! pruned.is_empty() {
		status.custom(Status::VERBOSE, "Pruned", 199, &format!("{pruned:?}"));
	}

	// Pick the winner.
	let chosen = policy::finalize(&state, ! semantic && ! settings.force())?;
	let input_bytes = raw.len() as u64;
	let data: Option<Vec<u8>> =
		if chosen == 0 { None }
		else {
			match best {
				Some((id, out)) if id == chosen => Some(out.data),
				_ => Some(rerun(input, &table, chosen, settings, files)?),
			}
		};

	let (disposition, idat, output_bytes) = match data {
		Some(data) => {
			let len = data.len() as u64;
			let idat = state.result(chosen).unwrap_or(0);
			if settings.nosave() { (Disposition::Measured(chosen), idat, len) }
			else {
				save(output, &data, files)?;
				(Disposition::Commit(chosen), idat, len)
			}
		},
		None =>
			if settings.nosave() { (Disposition::Measured(0), baseline, input_bytes) }
			else {
				copy_original(output, &raw, files)?;
				(Disposition::CopyOriginal, baseline, input_bytes)
			},
	};

	Ok(Report {
		trials: state.trials().collect(),
		pruned,
		chosen,
		disposition,
		baseline: state.baseline(),
		idat,
		input_bytes,
		output_bytes,
		decode,
		encode,
		open_files: files.count(),
		peak_files: files.peak(),
	})
}

/// # Re-Run Winner.
///
/// This only happens if the retained buffer somehow doesn't belong to the
/// winner.
fn rerun(
	input: &Path,
	table: &CandidateTable,
	id: u8,
	settings: &Settings,
	files: &OpenFiles,
) -> Result<Vec<u8>, EncodingError> {
	let candidate = table.get(id).ok_or(EncodingError::NoCandidate)?;
	match run_trial(input, &candidate, settings, files)? {
		Trial::Done(out) => Ok(out.data),
		Trial::Failed(e) => Err(e),
	}
}

/// # Copy Original.
///
/// The output gets an exact copy of the input, unless it already is one.
fn copy_original(output: &Path, raw: &[u8], files: &OpenFiles)
-> Result<(), EncodingError> {
	if output.is_file() {
		if let Ok(old) = files.read(output) {
			if old == raw { return Ok(()); }
		}
	}
	save(output, raw, files)
}

/// # Save.
///
/// Write the data to `output` atomically, creating the parent directory if
/// needed.
fn save(output: &Path, data: &[u8], files: &OpenFiles) -> Result<(), EncodingError> {
	if let Some(parent) = output.parent() {
		if ! parent.as_os_str().is_empty() && ! parent.is_dir() {
			std::fs::create_dir_all(parent).map_err(|_| EncodingError::Directory)?;
		}
	}
	files.write(output, data)
}

/// # Same File?
fn same_file(a: &Path, b: &Path) -> bool {
	if a == b { return true; }
	match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
		(Ok(a), Ok(b)) => a == b,
		_ => false,
	}
}

/// # Describe Image.
fn describe(meta: &Metadata, transform: &Transform, status: Status) {
	if ! status.at_least(Status::VERBOSE) { return; }

	let h = meta.header();
	status.custom(Status::VERBOSE, "Header", 199, &format!(
		"{}x{}, {} at {} bits{}.",
		h.width,
		h.height,
		h.color_type,
		h.bit_depth,
		if h.interlaced { ", interlaced" } else { "" },
	));
	if ! transform.is_identity() {
		status.custom(Status::VERBOSE, "Transform", 199, &format!(
			"{} at {} bits \x1b[2m→\x1b[0m {} at {} bits.",
			h.color_type,
			h.bit_depth,
			transform.output.color_type,
			transform.output.bit_depth,
		));
	}

	if status.at_least(Status::DEBUG) {
		for chunk in meta.iter() {
			status.custom(Status::DEBUG, "Chunk", 199, &format!(
				"{} ({} bytes)",
				chunk.name(),
				chunk.data.len(),
			));
		}
	}
}
