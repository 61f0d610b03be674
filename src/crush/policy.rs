/*!
# Aplasta: Selection Policy

This decides which candidates actually get run for a given file, keeps
track of how they did, and picks the winner.
*/

use crate::{
	Candidate,
	CandidateTable,
	EncodingError,
	SearchConfig,
	candidate::{
		MAX_METHOD,
		SEED_GROUPS,
	},
};



/// # Result Slots (Baseline + Methods).
const SLOTS: usize = MAX_METHOD as usize + 1;

/// # Seed IDs.
const SEEDS: [u8; 3] = [1, 2, 3];



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Run State.
///
/// One of these exists per file. Slot zero holds the baseline (the input's
/// own size); the rest hold the sizes of trials that succeeded.
pub(super) struct RunState {
	/// # Results.
	results: [Option<u64>; SLOTS],

	/// # IDs Run (in order).
	order: Vec<u8>,

	/// # Best Trial Size.
	best: Option<u64>,
}

impl RunState {
	#[must_use]
	/// # New.
	pub(super) fn new(baseline: u64) -> Self {
		let mut results = [None; SLOTS];
		results[0] = Some(baseline);
		Self {
			results,
			order: Vec::new(),
			best: None,
		}
	}

	#[must_use]
	/// # Baseline.
	pub(super) const fn baseline(&self) -> u64 {
		match self.results[0] {
			Some(s) => s,
			None => 0,
		}
	}

	#[cfg(test)]
	#[must_use]
	/// # Best Trial Size.
	pub(super) const fn best(&self) -> Option<u64> { self.best }

	#[must_use]
	/// # Result.
	pub(super) fn result(&self, id: u8) -> Option<u64> {
		self.results.get(usize::from(id)).copied().flatten()
	}

	/// # Trials (in the order they ran).
	pub(super) fn trials(&self) -> impl Iterator<Item=(u8, Option<u64>)> + '_ {
		self.order.iter().map(|&id| (id, self.results[usize::from(id)]))
	}

	/// # Record.
	///
	/// Save the result of trial `id`. `None` marks a failure; the slot stays
	/// empty and the candidate is out of the running.
	fn record(&mut self, id: u8, size: Option<u64>) {
		let idx = usize::from(id);
		if idx == 0 || SLOTS <= idx || self.order.contains(&id) { return; }

		self.order.push(id);
		self.results[idx] = size;
		if let Some(size) = size {
			if self.best.map_or(true, |b| size < b) { self.best = Some(size); }
		}
	}

	/// # Is Smaller?
	///
	/// Compare two trial slots, treating failures as worst.
	fn smaller(&self, a: u8, b: u8) -> bool {
		match (self.result(a), self.result(b)) {
			(Some(a), Some(b)) => a < b,
			(Some(_), None) => true,
			_ => false,
		}
	}
}



/// # Search.
///
/// Run the candidates called for by `config`, in ascending order, passing
/// each to `trial`. The callback returns the trial size, or `None` if it
/// failed.
///
/// The ids that were pruned (if any) are returned for reporting purposes.
///
/// ## Errors
///
/// Errors from the callback are passed through, ending the search.
pub(super) fn search<F>(
	state: &mut RunState,
	config: &SearchConfig,
	table: &CandidateTable,
	mut trial: F,
) -> Result<Vec<u8>, EncodingError>
where F: FnMut(Candidate) -> Result<Option<u64>, EncodingError> {
	let mut run = |state: &mut RunState, id: u8| -> Result<(), EncodingError> {
		if let Some(candidate) = table.get(id) {
			let size = trial(candidate)?;
			state.record(id, size);
		}
		Ok(())
	};

	// Brute force and explicit lists just go in order.
	if let Some(ids) = config.planned(table) {
		for id in ids { run(state, id)?; }
		return Ok(Vec::new());
	}

	// Plant the seeds.
	let mut best_of_three = SEEDS[0];
	for id in SEEDS {
		run(state, id)?;
		if id != SEEDS[0] && state.smaller(id, best_of_three) { best_of_three = id; }
	}

	// Grow the one that did best.
	let mut pruned = Vec::new();
	for (seed, group) in SEED_GROUPS {
		if seed == best_of_three {
			for &id in group { run(state, id)?; }
		}
		else { pruned.extend_from_slice(group); }
	}
	pruned.sort_unstable();

	Ok(pruned)
}

/// # Finalize.
///
/// Return the id of the smallest result, or zero if the original should be
/// kept. The baseline is only in the running if `include_baseline`. Ties go
/// to the lowest id.
///
/// ## Errors
///
/// If every trial failed, `EncodingError::NoCandidate` is returned.
pub(super) fn finalize(state: &RunState, include_baseline: bool)
-> Result<u8, EncodingError> {
	if state.best.is_none() { return Err(EncodingError::NoCandidate); }

	let mut best: Option<(u8, u64)> =
		if include_baseline { state.results[0].map(|s| (0, s)) }
		else { None };

	for id in 1..=MAX_METHOD {
		if let Some(size) = state.result(id) {
			if best.map_or(true, |(_, b)| size < b) { best = Some((id, size)); }
		}
	}

	best.map(|(id, _)| id).ok_or(EncodingError::NoCandidate)
}
