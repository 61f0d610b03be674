/*!
# Aplasta: Reports
*/

use crate::Status;
use dactyl::NiceU64;
use std::time::Duration;
use super::Disposition;



#[derive(Debug, Clone, Eq, PartialEq)]
/// # File Report.
pub(crate) struct Report {
	/// # Trials (ID and Size, in the Order Run).
	pub(crate) trials: Vec<(u8, Option<u64>)>,

	/// # Pruned IDs.
	pub(crate) pruned: Vec<u8>,

	/// # Chosen ID (Zero for the Original).
	pub(crate) chosen: u8,

	/// # What Happened.
	pub(crate) disposition: Disposition,

	/// # Original IDAT Size.
	pub(crate) baseline: u64,

	/// # Chosen IDAT Size.
	pub(crate) idat: u64,

	/// # Input File Size.
	pub(crate) input_bytes: u64,

	/// # Output File Size.
	///
	/// For measure-only runs, this is what the file would have been.
	pub(crate) output_bytes: u64,

	/// # Total Decode Time.
	pub(crate) decode: Duration,

	/// # Total Encode Time.
	pub(crate) encode: Duration,

	/// # Open Files at Return.
	pub(crate) open_files: usize,

	/// # Most Files Open at Once.
	pub(crate) peak_files: usize,
}

impl Report {
	/// # Print Summary.
	pub(crate) fn summarize(&self, status: Status) {
		let verb = match self.disposition {
			Disposition::Commit(_) => "Wrote",
			Disposition::CopyOriginal => "Copied",
			Disposition::Measured(_) => "Measured",
		};
		let method =
			if self.chosen == 0 { "the original".to_owned() }
			else { format!("method {}", self.chosen) };

		status.success(&format!(
			"{verb} {method}: IDAT {} \x1b[2m→\x1b[0m {} bytes, file {} \x1b[2m→\x1b[0m {} bytes ({}).",
			NiceU64::from(self.baseline),
			NiceU64::from(self.idat),
			NiceU64::from(self.input_bytes),
			NiceU64::from(self.output_bytes),
			change(self.input_bytes, self.output_bytes),
		));
		status.custom(
			Status::DEBUG,
			"Files",
			199,
			&format!("{} left open; at most {} open at once.", self.open_files, self.peak_files),
		);
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Batch Totals.
pub(crate) struct Totals {
	/// # Files Finished.
	done: u64,

	/// # Files Failed.
	failed: u64,

	/// # Input Bytes.
	input: u64,

	/// # Output Bytes.
	output: u64,

	/// # Decode Time.
	decode: Duration,

	/// # Encode Time.
	encode: Duration,
}

impl Totals {
	/// # Add Report.
	pub(crate) fn push(&mut self, report: &Report) {
		self.done += 1;
		self.input += report.input_bytes;
		self.output += report.output_bytes;
		self.decode += report.decode;
		self.encode += report.encode;
	}

	/// # Add Failure.
	pub(crate) fn fail(&mut self) { self.failed += 1; }

	#[must_use]
	/// # Other Time.
	///
	/// Whatever part of `elapsed` wasn't spent decoding or encoding.
	pub(crate) fn other(&self, elapsed: Duration) -> Duration {
		elapsed.saturating_sub(self.decode + self.encode)
	}

	/// # Print Summary.
	pub(crate) fn summarize(&self, elapsed: Duration, status: Status) {
		if self.done == 0 && self.failed == 0 { return; }

		let mut msg = format!(
			"{} \x1b[2m→\x1b[0m {} bytes ({}) across {} file{}",
			NiceU64::from(self.input),
			NiceU64::from(self.output),
			change(self.input, self.output),
			NiceU64::from(self.done),
			if self.done == 1 { "" } else { "s" },
		);
		if self.failed != 0 {
			msg.push_str(&format!(", with {} failure{}", NiceU64::from(self.failed), if self.failed == 1 { "" } else { "s" }));
		}
		msg.push('.');
		status.custom(Status::NORMAL, "Overall", 13, &msg);

		status.custom(Status::NORMAL, "CPU Time", 13, &format!(
			"{:.3}s decoding, {:.3}s encoding, {:.3}s other.",
			self.decode.as_secs_f64(),
			self.encode.as_secs_f64(),
			self.other(elapsed).as_secs_f64(),
		));
	}
}



/// # Describe Change.
fn change(before: u64, after: u64) -> String {
	if before == 0 || before == after { return "no change".to_owned(); }

	#[allow(clippy::cast_precision_loss)]
	let pct = (before.abs_diff(after) as f64 * 100.0) / before as f64;
	if after < before { format!("{pct:.2}% reduction") }
	else { format!("{pct:.2}% increase") }
}
