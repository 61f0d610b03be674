/*!
# Aplasta

Brute-force, lossless PNG recompression.
*/

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused_import_braces)]

#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::pedantic)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::redundant_pub_crate)]



mod candidate;
mod cli;
mod codec;
mod crush;
mod error;
mod files;
#[cfg(test)] mod fixture;
mod measure;
mod opts;
mod status;

pub(crate) use candidate::{
	Candidate,
	CandidateTable,
	Filter,
	SearchConfig,
	SearchMode,
	Strategy,
};
pub(crate) use codec::{
	ColorType,
	Metadata,
};
pub(crate) use error::{
	AplastaError,
	EncodingError,
};
pub(crate) use files::OpenFiles;
pub(crate) use opts::Settings;
pub(crate) use status::Status;

use cli::Cli;
use crush::{
	Disposition,
	Totals,
};
use fyi_msg::Msg;
use std::{
	sync::{
		Arc,
		atomic::{
			AtomicBool,
			Ordering::{
				Acquire,
				Relaxed,
				SeqCst,
			},
		},
	},
	time::Instant,
};



/// # Main.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(e) => { Msg::error(e.to_string()).die(1); },
	}
}

#[inline]
/// # Actual Main.
fn _main() -> Result<(), AplastaError> {
	let cli = Cli::parse_env()?;
	let status = cli.status();
	let pairs = cli.pairs()?;
	let settings = cli.settings(status);

	let killed = Arc::new(AtomicBool::new(false));
	sigint(Arc::clone(&killed));

	let now = Instant::now();
	let mut totals = Totals::default();
	for (input, output) in pairs {
		if killed.load(Acquire) { break; }

		match crush::run(&input, &output, &settings, status) {
			Ok(report) => {
				report.summarize(status);
				if let Disposition::Measured(_) = report.disposition {
					status.custom(
						Status::VERBOSE,
						"Unsaved",
						199,
						&format!("{} was not written.", output.display()),
					);
				}
				totals.push(&report);
			},
			Err(e) => {
				totals.fail();
				status.custom(Status::NORMAL, "Skipped", 11, &format!(
					"{} \x1b[2m({})\x1b[0m",
					input.display(),
					e.as_str(),
				));
			},
		}
	}

	totals.summarize(now.elapsed(), status);

	if killed.load(Acquire) { Err(AplastaError::Killed) }
	else { Ok(()) }
}

#[inline(never)]
/// # Hook Up CTRL+C.
///
/// Once stops processing new files, twice forces immediate shutdown.
fn sigint(killed: Arc<AtomicBool>) {
	let _res = ctrlc::set_handler(move ||
		if killed.compare_exchange(false, true, SeqCst, Relaxed).is_ok() {
			Msg::warning("Finishing the current file before quitting.")
				.with_newline(true)
				.eprint();
		}
		else { std::process::exit(1); }
	);
}
