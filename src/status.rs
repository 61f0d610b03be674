/*!
# Aplasta: Status
*/

use fyi_msg::Msg;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Status Output.
///
/// All status messages go to STDERR, but only if the verbosity is high
/// enough for them.
pub(crate) struct Status(u8);

impl Default for Status {
	fn default() -> Self { Self::NORMAL }
}

impl Status {
	/// # Silent.
	pub(crate) const SILENT: Self = Self(0);

	/// # Normal.
	pub(crate) const NORMAL: Self = Self(1);

	/// # Verbose.
	pub(crate) const VERBOSE: Self = Self(2);

	/// # Debug.
	pub(crate) const DEBUG: Self = Self(3);

	#[must_use]
	/// # From Flags.
	///
	/// Silence wins; otherwise each `-v` bumps the level, up to three.
	pub(crate) const fn from_flags(verbose: u8, silent: bool) -> Self {
		if silent { Self::SILENT }
		else if verbose >= 2 { Self::DEBUG }
		else { Self(verbose + 1) }
	}

	#[must_use]
	/// # At Least?
	pub(crate) const fn at_least(self, other: Self) -> bool { other.0 <= self.0 }

	/// # Print.
	///
	/// Print the message if the level is at least `min`.
	pub(crate) fn print(self, min: Self, msg: Msg) {
		if self.at_least(min) { msg.with_newline(true).eprint(); }
	}

	/// # Custom.
	pub(crate) fn custom(self, min: Self, prefix: &str, color: u8, msg: &str) {
		if self.at_least(min) {
			Msg::custom(prefix, color, msg).with_newline(true).eprint();
		}
	}

	/// # Success.
	pub(crate) fn success(self, msg: &str) { self.print(Self::NORMAL, Msg::success(msg)); }

	/// # Warning.
	pub(crate) fn warning(self, msg: &str) { self.print(Self::NORMAL, Msg::warning(msg)); }
}
