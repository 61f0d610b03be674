/*!
# Aplasta: Candidates

Every compression attempt is described by a method id and the filter, level,
and strategy that id stands for. Ids `1..=10` are a hand-picked set that
covers most images well; `11..=124` enumerate every combination worth
brute-forcing; the remainder fall back to a safe default and are only
reachable when asked for by id.
*/

use std::collections::BTreeSet;



/// # Highest Method ID.
pub(crate) const MAX_METHOD: u8 = 200;

/// # Number of Curated Methods.
pub(crate) const DEFAULT_METHODS: u8 = 10;

/// # First Brute-Force Method.
pub(crate) const BRUTE_FIRST: u8 = 11;

/// # Last Brute-Force Method.
pub(crate) const BRUTE_LAST: u8 = 124;

/// # Seed Groups.
///
/// After seeds `1..=3` have run, only the group belonging to the smallest
/// seed is tried.
pub(crate) const SEED_GROUPS: [(u8, &[u8]); 3] = [
	(1, &[4, 7]),
	(2, &[5, 8]),
	(3, &[6, 9, 10]),
];

/// # Fast Methods.
pub(crate) const FAST_METHODS: [u8; 2] = [16, 53];

/// # Huffman Methods.
pub(crate) const HUFFMAN_METHODS: [u8; 5] = [11, 12, 13, 14, 15];

/// # Curated Methods.
///
/// Filter, level, strategy for ids `1..=10`.
const CURATED: [(Filter, u8, Strategy); DEFAULT_METHODS as usize] = [
	(Filter::None, 4, Strategy::Default),
	(Filter::Sub, 4, Strategy::Default),
	(Filter::Adaptive, 4, Strategy::Filtered),
	(Filter::None, 9, Strategy::Filtered),
	(Filter::Sub, 9, Strategy::Default),
	(Filter::Adaptive, 9, Strategy::Default),
	(Filter::None, 9, Strategy::Default),
	(Filter::Sub, 9, Strategy::Filtered),
	(Filter::Adaptive, 2, Strategy::HuffmanOnly),
	(Filter::Adaptive, 9, Strategy::Filtered),
];

/// # Huffman Row Level.
const HUFFMAN_LEVEL: u8 = 2;

/// # Max Compression Level.
pub(crate) const MAX_LEVEL: u8 = 9;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
/// # Row Filter.
///
/// The first five match the PNG filter types; `Adaptive` picks the best of
/// them for each row.
pub(crate) enum Filter {
	/// # None.
	None = 0,

	/// # Sub.
	Sub = 1,

	/// # Up.
	Up = 2,

	/// # Average.
	Average = 3,

	/// # Paeth.
	Paeth = 4,

	/// # Adaptive.
	Adaptive = 5,
}

impl Filter {
	/// # All Filters.
	pub(crate) const ALL: [Self; 6] = [
		Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth, Self::Adaptive,
	];

	#[must_use]
	/// # From Number (Clamped).
	pub(crate) const fn clamped(raw: i64) -> Self {
		match raw {
			i64::MIN..=0 => Self::None,
			1 => Self::Sub,
			2 => Self::Up,
			3 => Self::Average,
			4 => Self::Paeth,
			_ => Self::Adaptive,
		}
	}

	#[must_use]
	/// # As Number.
	pub(crate) const fn as_u8(self) -> u8 { self as u8 }
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
/// # Compression Strategy.
pub(crate) enum Strategy {
	/// # Default.
	Default = 0,

	/// # Filtered.
	Filtered = 1,

	/// # Huffman Only.
	HuffmanOnly = 2,
}

impl Strategy {
	/// # All Strategies.
	pub(crate) const ALL: [Self; 3] = [Self::Default, Self::Filtered, Self::HuffmanOnly];

	#[must_use]
	/// # From Number (Clamped).
	pub(crate) const fn clamped(raw: i64) -> Self {
		match raw {
			i64::MIN..=0 => Self::Default,
			1 => Self::Filtered,
			_ => Self::HuffmanOnly,
		}
	}

	#[must_use]
	/// # As Number.
	pub(crate) const fn as_u8(self) -> u8 { self as u8 }

	#[must_use]
	/// # As Str.
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Default => "default",
			Self::Filtered => "filtered",
			Self::HuffmanOnly => "huffman",
		}
	}
}



#[must_use]
/// # Clamp Level.
pub(crate) const fn clamp_level(raw: i64) -> u8 {
	if raw <= 0 { 0 }
	else if raw >= MAX_LEVEL as i64 { MAX_LEVEL }
	else { raw as u8 }
}

#[must_use]
/// # Clamp Method.
pub(crate) const fn clamp_method(raw: i64) -> u8 {
	if raw <= 0 { 0 }
	else if raw >= MAX_METHOD as i64 { MAX_METHOD }
	else { raw as u8 }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Candidate.
pub(crate) struct Candidate {
	/// # Method ID.
	pub(crate) id: u8,

	/// # Row Filter.
	pub(crate) filter: Filter,

	/// # Compression Level.
	pub(crate) level: u8,

	/// # Compression Strategy.
	pub(crate) strategy: Strategy,
}

impl Candidate {
	#[must_use]
	/// # New.
	const fn new(id: u8, filter: Filter, level: u8, strategy: Strategy) -> Self {
		Self { id, filter, level, strategy }
	}

	#[must_use]
	/// # Fallback.
	///
	/// This is what every id past the brute-force range maps to.
	const fn fallback(id: u8) -> Self {
		Self::new(id, Filter::Adaptive, MAX_LEVEL, Strategy::Filtered)
	}

	/// # Apply Override.
	fn apply(&mut self, ov: Override) {
		match ov {
			Override::Filter(f) => { self.filter = f; },
			Override::Level(l) => { self.level = l; },
			Override::Strategy(s) => { self.strategy = s; },
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Parameter Override.
pub(crate) enum Override {
	/// # Forced Filter.
	Filter(Filter),

	/// # Forced Level.
	Level(u8),

	/// # Forced Strategy.
	Strategy(Strategy),
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Brute-Force Masks.
///
/// Each kind starts out fully open. The first override of a kind narrows it
/// to that one value, and later overrides of the same kind add to it.
/// Different kinds intersect.
pub(crate) struct Masks {
	/// # Filters.
	filters: [bool; 6],

	/// # Levels.
	levels: [bool; 10],

	/// # Strategies.
	strategies: [bool; 3],

	/// # Narrowed Kinds (filter, level, strategy).
	narrowed: [bool; 3],

	/// # Last Level Given.
	last_level: Option<u8>,
}

impl Default for Masks {
	fn default() -> Self { Self::new() }
}

impl Masks {
	#[must_use]
	/// # New (Everything Allowed).
	pub(crate) const fn new() -> Self {
		Self {
			filters: [true; 6],
			levels: [true; 10],
			strategies: [true; 3],
			narrowed: [false; 3],
			last_level: None,
		}
	}

	/// # Apply Override.
	pub(crate) fn apply(&mut self, ov: Override) {
		match ov {
			Override::Filter(f) => {
				if ! self.narrowed[0] {
					self.narrowed[0] = true;
					self.filters = [false; 6];
				}
				self.filters[usize::from(f.as_u8())] = true;
			},
			Override::Level(l) => {
				if ! self.narrowed[1] {
					self.narrowed[1] = true;
					self.levels = [false; 10];
				}
				self.levels[usize::from(l)] = true;
				self.last_level = Some(l);
			},
			Override::Strategy(s) => {
				if ! self.narrowed[2] {
					self.narrowed[2] = true;
					self.strategies = [false; 3];
				}
				self.strategies[usize::from(s.as_u8())] = true;
			},
		}
	}

	#[must_use]
	/// # Admits Candidate?
	///
	/// Huffman-only rows ignore the level mask; their level is rewritten
	/// instead. See `forced_level`.
	pub(crate) const fn admits(&self, c: &Candidate) -> bool {
		self.filters[c.filter as usize] &&
		self.strategies[c.strategy as usize] &&
		(
			matches!(c.strategy, Strategy::HuffmanOnly) ||
			self.levels[c.level as usize]
		)
	}

	#[must_use]
	/// # Forced Level.
	///
	/// Huffman-only rows take whichever level was given last.
	pub(crate) const fn forced_level(&self) -> Option<u8> { self.last_level }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Search Mode.
pub(crate) enum SearchMode {
	/// # Seed and Prune.
	Seeded,

	/// # Brute Force (plus any explicit ids).
	Brute,

	/// # Explicit IDs Only.
	Explicit,
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Search Configuration.
///
/// This is assembled once from the command line and then only ever read.
pub(crate) struct SearchConfig {
	/// # Brute Force?
	brute: bool,

	/// # Explicit Method IDs.
	methods: BTreeSet<u8>,

	/// # Overrides (in the order given).
	overrides: Vec<Override>,

	/// # Masks.
	masks: Masks,
}

impl SearchConfig {
	/// # Enable Brute Force.
	pub(crate) fn set_brute(&mut self) { self.brute = true; }

	/// # Add Method.
	///
	/// The value is clamped to `0..=200`; zero adds the curated set.
	pub(crate) fn add_method(&mut self, raw: i64) {
		match clamp_method(raw) {
			0 => { self.methods.extend(1..=DEFAULT_METHODS); },
			id => { self.methods.insert(id); },
		}
	}

	/// # Add Methods.
	pub(crate) fn add_methods(&mut self, ids: &[u8]) {
		for &id in ids { self.add_method(i64::from(id)); }
	}

	/// # Add Override.
	pub(crate) fn add_override(&mut self, ov: Override) {
		self.masks.apply(ov);
		self.overrides.push(ov);
	}

	#[must_use]
	/// # Mode.
	pub(crate) fn mode(&self) -> SearchMode {
		if self.brute { SearchMode::Brute }
		else if self.methods.is_empty() { SearchMode::Seeded }
		else { SearchMode::Explicit }
	}

	#[cfg(test)]
	#[must_use]
	/// # Explicit Methods.
	pub(crate) const fn methods(&self) -> &BTreeSet<u8> { &self.methods }

	#[must_use]
	/// # Has Overrides?
	pub(crate) fn has_overrides(&self) -> bool { ! self.overrides.is_empty() }

	#[cfg(test)]
	#[must_use]
	/// # Single Method.
	///
	/// Shorthand for a configuration that runs exactly one id.
	pub(crate) fn single(id: u8) -> Self {
		let mut out = Self::default();
		out.add_method(i64::from(id));
		out
	}

	#[must_use]
	/// # Planned IDs.
	///
	/// Return the ids to run, ascending, or `None` for seed-and-prune mode,
	/// which decides as it goes.
	pub(crate) fn planned(&self, table: &CandidateTable) -> Option<Vec<u8>> {
		match self.mode() {
			SearchMode::Seeded => None,
			SearchMode::Explicit => Some(self.methods.iter().copied().collect()),
			SearchMode::Brute => {
				let mut ids: BTreeSet<u8> = table.brute_ids(&self.masks).collect();
				ids.extend(self.methods.iter().copied());
				Some(ids.into_iter().collect())
			},
		}
	}
}



#[derive(Debug, Clone)]
/// # Candidate Table.
pub(crate) struct CandidateTable(Vec<Candidate>);

impl CandidateTable {
	#[must_use]
	/// # Build Default Table.
	pub(crate) fn build_default() -> Self {
		let mut out = Vec::with_capacity(usize::from(MAX_METHOD));

		// The curated set.
		let mut id = 0_u8;
		for (filter, level, strategy) in CURATED {
			id += 1;
			out.push(Candidate::new(id, filter, level, strategy));
		}

		// Huffman rows.
		for filter in Filter::ALL {
			id += 1;
			out.push(Candidate::new(id, filter, HUFFMAN_LEVEL, Strategy::HuffmanOnly));
		}

		// Everything else worth trying; filter moves fastest.
		for level in 1..=MAX_LEVEL {
			for &strategy in &Strategy::ALL[..2] {
				for filter in Filter::ALL {
					id += 1;
					out.push(Candidate::new(id, filter, level, strategy));
				}
			}
		}
		debug_assert_eq!(id, BRUTE_LAST, "BUG: brute-force range is misnumbered.");

		// Fallbacks.
		while id < MAX_METHOD {
			id += 1;
			out.push(Candidate::fallback(id));
		}

		Self(out)
	}

	#[must_use]
	/// # Build.
	///
	/// Start with the default table, then let the configuration have its
	/// way with it.
	pub(crate) fn build(config: &SearchConfig) -> Self {
		let mut out = Self::build_default();

		// Brute force rewrites the Huffman row levels.
		if config.brute {
			if let Some(level) = config.masks.forced_level() {
				for c in &mut out.0[usize::from(BRUTE_FIRST - 1)..usize::from(BRUTE_FIRST + 5)] {
					c.level = level;
				}
			}
		}

		// Explicit ids take every override, last one winning.
		for &id in &config.methods {
			if let Some(c) = out.get_mut(id) {
				for &ov in &config.overrides { c.apply(ov); }
			}
		}

		out
	}

	#[must_use]
	/// # Get Candidate.
	pub(crate) fn get(&self, id: u8) -> Option<Candidate> {
		let idx = usize::from(id).checked_sub(1)?;
		self.0.get(idx).copied()
	}

	/// # Get Candidate (Mutable).
	fn get_mut(&mut self, id: u8) -> Option<&mut Candidate> {
		let idx = usize::from(id).checked_sub(1)?;
		self.0.get_mut(idx)
	}

	/// # Brute-Force IDs.
	///
	/// Return the ids in `11..=124` the masks allow, ascending.
	pub(crate) fn brute_ids<'a>(&'a self, masks: &'a Masks)
	-> impl Iterator<Item=u8> + 'a {
		self.0[usize::from(BRUTE_FIRST - 1)..usize::from(BRUTE_LAST)]
			.iter()
			.filter(|c| masks.admits(c))
			.map(|c| c.id)
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_curated() {
		let table = CandidateTable::build_default();
		let expected = [
			(1, Filter::None, 4, Strategy::Default),
			(2, Filter::Sub, 4, Strategy::Default),
			(3, Filter::Adaptive, 4, Strategy::Filtered),
			(4, Filter::None, 9, Strategy::Filtered),
			(5, Filter::Sub, 9, Strategy::Default),
			(6, Filter::Adaptive, 9, Strategy::Default),
			(7, Filter::None, 9, Strategy::Default),
			(8, Filter::Sub, 9, Strategy::Filtered),
			(9, Filter::Adaptive, 2, Strategy::HuffmanOnly),
			(10, Filter::Adaptive, 9, Strategy::Filtered),
		];
		for (id, filter, level, strategy) in expected {
			assert_eq!(
				table.get(id),
				Some(Candidate { id, filter, level, strategy }),
				"Method {id} is wrong.",
			);
		}
	}

	#[test]
	fn t_table() {
		let table = CandidateTable::build_default();
		assert!(table.get(0).is_none());
		assert!(table.get(MAX_METHOD + 1).is_none());

		// Ids are contiguous.
		for id in 1..=MAX_METHOD {
			assert_eq!(table.get(id).map(|c| c.id), Some(id));
		}

		// Huffman rows.
		for (idx, id) in (11..=16).enumerate() {
			let c = table.get(id).unwrap();
			assert_eq!(c.filter, Filter::ALL[idx]);
			assert_eq!(c.level, 2);
			assert_eq!(c.strategy, Strategy::HuffmanOnly);
		}

		// Filter moves fastest, then strategy, then level.
		let c = table.get(17).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::None, 1, Strategy::Default));
		let c = table.get(22).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::Adaptive, 1, Strategy::Default));
		let c = table.get(23).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::None, 1, Strategy::Filtered));
		let c = table.get(29).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::None, 2, Strategy::Default));
		let c = table.get(BRUTE_LAST).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::Adaptive, 9, Strategy::Filtered));

		// The fast pair.
		let c = table.get(16).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::Adaptive, 2, Strategy::HuffmanOnly));
		let c = table.get(53).unwrap();
		assert_eq!((c.filter, c.level, c.strategy), (Filter::None, 4, Strategy::Default));

		// Fallbacks.
		for id in BRUTE_LAST + 1..=MAX_METHOD {
			let c = table.get(id).unwrap();
			assert_eq!((c.filter, c.level, c.strategy), (Filter::Adaptive, 9, Strategy::Filtered));
		}
	}

	#[test]
	fn t_clamp() {
		assert_eq!(Filter::clamped(-3), Filter::None);
		assert_eq!(Filter::clamped(3), Filter::Average);
		assert_eq!(Filter::clamped(99), Filter::Adaptive);
		assert_eq!(Strategy::clamped(-1), Strategy::Default);
		assert_eq!(Strategy::clamped(7), Strategy::HuffmanOnly);
		assert_eq!(clamp_level(-1), 0);
		assert_eq!(clamp_level(5), 5);
		assert_eq!(clamp_level(12), 9);
		assert_eq!(clamp_method(-1), 0);
		assert_eq!(clamp_method(250), MAX_METHOD);
	}

	#[test]
	fn t_brute_all() {
		let config = {
			let mut c = SearchConfig::default();
			c.set_brute();
			c
		};
		let table = CandidateTable::build(&config);
		let ids = config.planned(&table).unwrap();
		assert_eq!(ids, (BRUTE_FIRST..=BRUTE_LAST).collect::<Vec<u8>>());
	}

	#[test]
	fn t_brute_masks() {
		// A single filter.
		let mut config = SearchConfig::default();
		config.set_brute();
		config.add_override(Override::Filter(Filter::Paeth));
		let table = CandidateTable::build(&config);
		let ids = config.planned(&table).unwrap();
		assert_eq!(ids.len(), 1 + 9 * 2);
		assert!(ids.iter().all(|&id| table.get(id).unwrap().filter == Filter::Paeth));

		// A second filter widens, a level narrows.
		config.add_override(Override::Filter(Filter::None));
		config.add_override(Override::Level(9));
		let table = CandidateTable::build(&config);
		let ids = config.planned(&table).unwrap();
		assert_eq!(ids, vec![11, 15, 113, 117, 119, 123]);

		// Huffman rows pick up the forced level.
		assert_eq!(table.get(11).unwrap().level, 9);
		assert_eq!(table.get(16).unwrap().level, 9);

		// The most recent level wins there, not the lowest.
		let mut other = config.clone();
		other.add_override(Override::Level(3));
		let table = CandidateTable::build(&other);
		assert_eq!(table.get(11).unwrap().level, 3);
		other.add_override(Override::Level(7));
		let table = CandidateTable::build(&other);
		assert_eq!(table.get(11).unwrap().level, 7);
		assert_eq!(table.get(16).unwrap().level, 7);

		// A non-huffman strategy knocks out the huffman rows.
		config.add_override(Override::Strategy(Strategy::Filtered));
		let table = CandidateTable::build(&config);
		let ids = config.planned(&table).unwrap();
		assert_eq!(ids, vec![119, 123]);
	}

	#[test]
	fn t_brute_plus_explicit() {
		let mut config = SearchConfig::default();
		config.set_brute();
		config.add_override(Override::Strategy(Strategy::HuffmanOnly));
		config.add_method(150);
		let table = CandidateTable::build(&config);
		assert_eq!(
			config.planned(&table),
			Some(vec![11, 12, 13, 14, 15, 16, 150]),
		);
	}

	#[test]
	fn t_explicit() {
		let mut config = SearchConfig::default();
		assert_eq!(config.mode(), SearchMode::Seeded);
		assert!(config.planned(&CandidateTable::build(&config)).is_none());

		// Order given doesn't matter; the plan is ascending.
		config.add_method(7);
		config.add_method(3);
		config.add_method(7);
		assert_eq!(config.mode(), SearchMode::Explicit);
		config.add_override(Override::Level(1));
		config.add_override(Override::Level(6));
		let table = CandidateTable::build(&config);
		assert_eq!(config.planned(&table), Some(vec![3, 7]));

		// Last override wins for explicit ids; others are left alone.
		assert_eq!(table.get(3).unwrap().level, 6);
		assert_eq!(table.get(7).unwrap().level, 6);
		assert_eq!(table.get(5).unwrap().level, 9);

		// Zero means the curated set.
		let mut config = SearchConfig::default();
		config.add_method(0);
		let table = CandidateTable::build(&config);
		assert_eq!(config.planned(&table), Some((1..=10).collect()));

		// Single.
		let config = SearchConfig::single(42);
		assert_eq!(config.planned(&CandidateTable::build(&config)), Some(vec![42]));
	}

	#[test]
	fn t_seed_groups() {
		// Every curated id past the seeds belongs to exactly one group.
		let mut all: Vec<u8> = SEED_GROUPS.iter()
			.flat_map(|(_, g)| g.iter().copied())
			.collect();
		all.sort_unstable();
		assert_eq!(all, (4..=DEFAULT_METHODS).collect::<Vec<u8>>());
	}
}
