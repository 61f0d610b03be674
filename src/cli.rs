/*!
# Aplasta: CLI
*/

use clap::{
	ArgAction,
	Parser,
	error::ErrorKind,
};
use crate::{
	AplastaError,
	ColorType,
	SearchConfig,
	SearchMode,
	Settings,
	Status,
	candidate::{
		FAST_METHODS,
		Filter,
		HUFFMAN_METHODS,
		Override,
		Strategy,
		clamp_level,
	},
	opts::window_bits_from_size,
};
use std::path::PathBuf;



#[derive(Debug, Parser)]
#[command(name = "Aplasta", version, about, long_about = None)]
/// # Command Line.
pub(super) struct Cli {
	/// Try every filter/level/strategy combination (ids 11..=124) that
	/// survives the -f/-l/-z restrictions. Any -m ids are tried too.
	#[arg(short, long)]
	brute: bool,

	/// Only try methods 16 and 53.
	#[arg(long)]
	fast: bool,

	/// Only try the Huffman-only methods (11..=15).
	#[arg(long)]
	huffman: bool,

	/// Only try this method (1..=200). Repeatable. 0 tries the ten default
	/// methods without pruning.
	#[arg(short, long, value_name = "NUM", allow_negative_numbers = true)]
	method: Vec<i64>,

	/// Force the row filter (0..=5, where 5 is adaptive). Repeatable.
	#[arg(short, long, value_name = "NUM", allow_negative_numbers = true)]
	filter: Vec<i64>,

	/// Force the zlib compression level (0..=9). Repeatable.
	#[arg(short, long, value_name = "NUM", allow_negative_numbers = true)]
	level: Vec<i64>,

	/// Force the zlib strategy (0 = default, 1 = filtered, 2 = huffman only).
	/// Repeatable.
	#[arg(short = 'z', long, value_name = "NUM", allow_negative_numbers = true)]
	strategy: Vec<i64>,

	/// Maximum compression window, in KiB (32, 16, 8, 4, 2, 1) or bytes
	/// (512, 256).
	#[arg(short, long, value_name = "NUM")]
	window: Option<u32>,

	/// Output color type (0, 2, 3, 4, or 6).
	#[arg(short, long, value_name = "NUM", allow_negative_numbers = true)]
	color_type: Option<i64>,

	/// Output bit depth (8 or 16).
	#[arg(long, value_name = "NUM", allow_negative_numbers = true)]
	bit_depth: Option<i64>,

	/// Maximum IDAT chunk size in bytes.
	#[arg(long, value_name = "NUM", default_value_t = 8192)]
	max: u64,

	/// Write the best re-encoded result even if it is no smaller than the
	/// original.
	#[arg(long)]
	force: bool,

	/// Measure every candidate, but do not write anything.
	#[arg(short, long)]
	nosave: bool,

	/// Increase status verbosity (repeatable).
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,

	/// Suppress all status output.
	#[arg(short, long)]
	silent: bool,

	/// One or more <INPUT> <OUTPUT> pairs.
	#[arg(value_name = "PATH", num_args = 2.., required = true)]
	paths: Vec<PathBuf>,
}

impl Cli {
	/// # Parse.
	///
	/// Help and version requests print and exit straight away.
	///
	/// ## Errors
	///
	/// Any other parsing failure is returned as an error.
	pub(super) fn parse_env() -> Result<Self, AplastaError> {
		Self::try_parse().map_err(|e| match e.kind() {
			ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
			_ => AplastaError::InvalidCli(describe(&e)),
		})
	}

	#[must_use]
	/// # Status.
	pub(super) const fn status(&self) -> Status {
		Status::from_flags(self.verbose, self.silent)
	}

	/// # Settings.
	///
	/// Out-of-range values are clamped or ignored (with a warning) rather
	/// than rejected.
	pub(super) fn settings(&self, status: Status) -> Settings {
		let mut search = SearchConfig::default();
		if self.brute { search.set_brute(); }
		if self.fast { search.add_methods(&FAST_METHODS); }
		if self.huffman { search.add_methods(&HUFFMAN_METHODS); }
		for &m in &self.method { search.add_method(m); }

		for &f in &self.filter { search.add_override(Override::Filter(Filter::clamped(f))); }
		for &l in &self.level { search.add_override(Override::Level(clamp_level(l))); }
		for &z in &self.strategy { search.add_override(Override::Strategy(Strategy::clamped(z))); }
		if search.has_overrides() && search.mode() == SearchMode::Seeded {
			status.warning("-f/-l/-z only apply with -b or -m; ignoring them.");
		}

		let mut out = Settings::new(search).with_max_idat(self.max);
		if self.force { out = out.with_force(); }
		if self.nosave { out = out.with_nosave(); }

		if let Some(w) = self.window {
			if window_bits_from_size(w).is_none() {
				status.warning(&format!("Invalid window size {w}; using 4KiB."));
			}
			out = out.with_window_size(w);
		}

		if let Some(c) = self.color_type {
			match u8::try_from(c).ok().and_then(ColorType::from_u8) {
				Some(c) => { out = out.with_color_type(c); },
				None => { status.warning(&format!("Invalid color type {c}; ignoring.")); },
			}
		}

		if let Some(d) = self.bit_depth {
			match u8::try_from(d) {
				Ok(d @ (8 | 16)) => { out = out.with_bit_depth(d); },
				_ => { status.warning(&format!("Invalid bit depth {d}; ignoring.")); },
			}
		}

		out
	}

	/// # Path Pairs.
	///
	/// ## Errors
	///
	/// An error is returned if the paths don't pair up evenly.
	pub(super) fn pairs(&self) -> Result<Vec<(PathBuf, PathBuf)>, AplastaError> {
		if self.paths.len() % 2 != 0 { return Err(AplastaError::OddPaths); }
		Ok(
			self.paths.chunks_exact(2)
				.map(|p| (p[0].clone(), p[1].clone()))
				.collect()
		)
	}
}



/// # Describe Clap Error.
///
/// Keep just the gist, without the "error:" prefix or usage block.
fn describe(err: &clap::Error) -> String {
	let raw = err.to_string();
	let line = raw.lines().next().unwrap_or_default();
	line.strip_prefix("error:").unwrap_or(line).trim().to_owned()
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::CandidateTable;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("aplasta").chain(args.iter().copied()))
			.expect("Parse failed.")
	}

	#[test]
	fn t_defaults() {
		let cli = parse(&["a.png", "b.png"]);
		let settings = cli.settings(Status::SILENT);
		assert_eq!(settings.search().mode(), SearchMode::Seeded);
		assert_eq!(settings.max_idat(), 8192);
		assert_eq!(settings.window(), 15);
		assert!(! settings.force());
		assert!(! settings.nosave());
		assert_eq!(cli.status(), Status::NORMAL);
		assert_eq!(
			cli.pairs().unwrap(),
			[(PathBuf::from("a.png"), PathBuf::from("b.png"))],
		);
	}

	#[test]
	fn t_methods() {
		let cli = parse(&["-m", "7", "--method", "300", "-m", "-4", "a", "b"]);
		let settings = cli.settings(Status::SILENT);
		assert_eq!(settings.search().mode(), SearchMode::Explicit);
		let ids: Vec<u8> = settings.search().methods().iter().copied().collect();
		assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 200]);

		let cli = parse(&["--fast", "--huffman", "a", "b"]);
		let ids: Vec<u8> = cli.settings(Status::SILENT).search().methods().iter().copied().collect();
		assert_eq!(ids, [11, 12, 13, 14, 15, 16, 53]);
	}

	#[test]
	fn t_brute() {
		let cli = parse(&["-b", "-f", "0", "-f", "4", "-z", "1", "-l", "9", "a", "b"]);
		let settings = cli.settings(Status::SILENT);
		assert_eq!(settings.search().mode(), SearchMode::Brute);
		let table = CandidateTable::build(settings.search());
		let ids = settings.search().planned(&table).unwrap();
		assert_eq!(ids, [119, 123]);
	}

	#[test]
	fn t_options() {
		let cli = parse(&[
			"-w", "2", "-c", "4", "--bit-depth", "16", "--max", "0",
			"--force", "-n", "-vv", "a", "b", "c", "d",
		]);
		let settings = cli.settings(Status::SILENT);
		assert_eq!(settings.window(), 11);
		assert_eq!(settings.color_type(), Some(ColorType::GrayAlpha));
		assert_eq!(settings.bit_depth(), Some(16));
		assert_eq!(settings.max_idat(), 1);
		assert!(settings.force());
		assert!(settings.nosave());
		assert_eq!(cli.status(), Status::DEBUG);
		assert_eq!(cli.pairs().unwrap().len(), 2);

		// Bad values are ignored.
		let cli = parse(&["-w", "3", "-c", "5", "--bit-depth", "4", "-s", "a", "b"]);
		let settings = cli.settings(Status::SILENT);
		assert_eq!(settings.window(), 12);
		assert_eq!(settings.color_type(), None);
		assert_eq!(settings.bit_depth(), None);
		assert_eq!(cli.status(), Status::SILENT);
	}

	#[test]
	fn t_bad() {
		let cli = parse(&["a", "b", "c"]);
		assert!(matches!(cli.pairs(), Err(AplastaError::OddPaths)));

		assert!(Cli::try_parse_from(["aplasta", "a"]).is_err());
		assert!(Cli::try_parse_from(["aplasta", "--nope", "a", "b"]).is_err());
	}
}
