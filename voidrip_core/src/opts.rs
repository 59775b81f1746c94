/*!
# Void Rip: Rip Options
*/

use crate::ReadOffset;
use std::time::Duration;



/// # FLAG: Allow Duplicates.
const FLAG_ALLOW_DUPLICATE: u8 = 0b0000_0001;

/// # FLAG: Encode FLAC.
const FLAG_FLAC: u8 =            0b0000_0010;

/// # FLAG: JSON Output.
const FLAG_JSON: u8 =            0b0000_0100;

/// # FLAG: Rip (vs. verify an existing rip).
const FLAG_RIP: u8 =             0b0000_1000;

/// # FLAG: Verbose.
const FLAG_VERBOSE: u8 =         0b0001_0000;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_RIP;

/// # Minimum Confidence.
const CONFIDENCE_MIN: u8 = 1;

/// # Maximum Confidence.
const CONFIDENCE_MAX: u8 = 99;

/// # Default Confidence.
const CONFIDENCE_DEFAULT: u8 = 10;

/// # Default Lock Timeout (Seconds).
const LOCK_TIMEOUT_DEFAULT: u16 = 30;

/// # Maximum Lock Timeout (Seconds).
const LOCK_TIMEOUT_MAX: u16 = 3600;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Rip Options.
///
/// This struct holds the job-related options like the read offset override,
/// AccurateRip confidence threshold, and output preferences.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use voidrip_core::RipOptions;
///
/// let opts = RipOptions::default()
///     .with_confidence(5)
///     .with_track(3) // Order doesn't matter.
///     .with_track(2);
///
/// assert_eq!(opts.confidence(), 5);
/// assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[2, 3]);
/// ```
pub struct RipOptions {
	offset: Option<ReadOffset>,
	confidence: u8,
	lock_timeout: u16,
	flags: u8,
	tracks: u128,
}

impl Default for RipOptions {
	fn default() -> Self {
		Self {
			offset: None,
			confidence: CONFIDENCE_DEFAULT,
			lock_timeout: LOCK_TIMEOUT_DEFAULT,
			flags: FLAG_DEFAULT,
			tracks: 0,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl RipOptions {
	with_flag!(
		with_allow_duplicate,
		FLAG_ALLOW_DUPLICATE,
		"# Allow Duplicates.",
		"",
		"When `true`, discs that have already been ripped by an earlier job",
		"will be ripped again instead of aborting.",
		"",
		"The default is `false`.",
	);

	#[must_use]
	/// # Confidence Threshold.
	///
	/// Every track needs at least this many AccurateRip confirmations for the
	/// rip to be accepted.
	///
	/// Values are capped to `1..=99`, with a default of `10`.
	pub const fn with_confidence(self, mut confidence: u8) -> Self {
		if confidence < CONFIDENCE_MIN { confidence = CONFIDENCE_MIN; }
		else if CONFIDENCE_MAX < confidence { confidence = CONFIDENCE_MAX; }

		Self {
			confidence,
			..self
		}
	}

	with_flag!(
		with_flac,
		FLAG_FLAC,
		"# Encode FLAC.",
		"",
		"When `true`, an accepted rip will be compressed to FLAC.",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_json,
		FLAG_JSON,
		"# JSON Output.",
		"",
		"When `true`, results are printed as JSON rather than tables.",
		"",
		"The default is `false`.",
	);

	#[must_use]
	/// # Ledger Lock Timeout.
	///
	/// How long to wait (in seconds) for another process to release the
	/// duplicate ledger before giving up.
	///
	/// Values are capped to `1..=3600`, with a default of `30`.
	pub const fn with_lock_timeout(self, mut lock_timeout: u16) -> Self {
		if lock_timeout == 0 { lock_timeout = 1; }
		else if LOCK_TIMEOUT_MAX < lock_timeout { lock_timeout = LOCK_TIMEOUT_MAX; }

		Self {
			lock_timeout,
			..self
		}
	}

	#[must_use]
	/// # Read Offset.
	///
	/// Optical drives have weirdly arbitrary precision problems, causing them
	/// to read data a little earlier or later than another drive might.
	///
	/// The offset is normally looked up from the drive's vendor and model,
	/// but can be set explicitly for drives missing from the table. See
	/// [here](http://www.accuraterip.com/driveoffsets.htm) if you're not sure
	/// what your drive's offset is.
	pub const fn with_offset(self, offset: ReadOffset) -> Self {
		Self {
			offset: Some(offset),
			..self
		}
	}

	with_flag!(
		with_rip,
		FLAG_RIP,
		"# Rip.",
		"",
		"When `false`, no audio is extracted; an existing rip in the job",
		"directory is verified instead.",
		"",
		"The default is `true`.",
	);

	#[must_use]
	/// # Include Track.
	///
	/// Add a given track number to the manual re-rip list.
	pub const fn with_track(self, track: u8) -> Self {
		let tracks = self.tracks | track_idx_to_bits(track);
		Self {
			tracks,
			..self
		}
	}

	with_flag!(
		with_verbose,
		FLAG_VERBOSE,
		"# Verbose.",
		"",
		"When `true`, per-track checksum details are printed.",
		"",
		"The default is `false`.",
	);
}

macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl RipOptions {
	get_flag!(allow_duplicate, FLAG_ALLOW_DUPLICATE, "Allow Duplicates");
	get_flag!(flac, FLAG_FLAC, "Encode FLAC");
	get_flag!(json, FLAG_JSON, "JSON Output");
	get_flag!(rip, FLAG_RIP, "Rip");
	get_flag!(verbose, FLAG_VERBOSE, "Verbose");

	#[must_use]
	/// # Confidence Threshold.
	pub const fn confidence(&self) -> u8 { self.confidence }

	#[must_use]
	/// # Has Any Tracks?
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Ledger Lock Timeout.
	pub const fn lock_timeout(&self) -> Duration {
		Duration::from_secs(self.lock_timeout as u64)
	}

	#[must_use]
	/// # Read Offset (Override).
	pub const fn offset(&self) -> Option<ReadOffset> { self.offset }

	#[must_use]
	/// # Tracks.
	///
	/// Return an iterator over the included track numbers.
	pub const fn tracks(&self) -> RipOptionsTracks {
		RipOptionsTracks {
			set: self.tracks,
			pos: 1,
		}
	}
}



#[derive(Debug, Clone)]
/// # Rip Option Tracks.
///
/// This iterator converts the `u128` monster flag back into individual `u8`
/// track numbers.
pub struct RipOptionsTracks {
	set: u128,
	pos: u8,
}

impl Iterator for RipOptionsTracks {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		while self.pos < 100 {
			let idx = self.pos;
			self.pos += 1;
			if 0 != self.set & track_idx_to_bits(idx) {
				return Some(idx);
			}
		}
		None
	}

	/// # Size Hint.
	///
	/// There will never be more than 99 tracks.
	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, Some(100_usize.saturating_sub(usize::from(self.pos))))
	}
}



/// # Track Number to Bitflag.
///
/// Audio CDs can only have 99 tracks, so every combination fits in a single
/// `u128`, which keeps the options `Copy` and the list sorted for free.
///
/// Out of range values, including zero, are silently ignored.
const fn track_idx_to_bits(idx: u8) -> u128 {
	if idx == 0 || 99 < idx { 0 }
	else { 2_u128.pow(idx as u32) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_rip_flags() {
		// Make sure our flags are unique.
		let mut all = vec![
			FLAG_ALLOW_DUPLICATE,
			FLAG_FLAC,
			FLAG_JSON,
			FLAG_RIP,
			FLAG_VERBOSE,
		];
		all.sort_unstable();
		all.dedup();
		assert_eq!(all.len(), 5);
	}

	#[test]
	fn t_rip_options_defaults() {
		let opts = RipOptions::default();
		assert_eq!(opts.confidence(), 10);
		assert_eq!(opts.lock_timeout(), Duration::from_secs(30));
		assert_eq!(opts.offset(), None);
		assert!(opts.rip());
		assert!(! opts.allow_duplicate());
		assert!(! opts.has_tracks());
	}

	#[test]
	fn t_rip_options_confidence() {
		for v in [1, 10, 50, 99] {
			let opts = RipOptions::default().with_confidence(v);
			assert_eq!(opts.confidence(), v);
		}

		assert_eq!(RipOptions::default().with_confidence(0).confidence(), CONFIDENCE_MIN);
		assert_eq!(RipOptions::default().with_confidence(200).confidence(), CONFIDENCE_MAX);
	}

	#[test]
	fn t_rip_options_flags() {
		macro_rules! t_flags {
			($name:literal, $set:ident, $get:ident) => (
				let mut opts = RipOptions::default();
				for v in [false, true, false, true] {
					opts = opts.$set(v);
					assert_eq!(
						opts.$get(),
						v,
						concat!("Setting ", $name, " to {} failed."),
						v
					);
				}
			);
		}

		t_flags!("allow_duplicate", with_allow_duplicate, allow_duplicate);
		t_flags!("flac", with_flac, flac);
		t_flags!("json", with_json, json);
		t_flags!("rip", with_rip, rip);
		t_flags!("verbose", with_verbose, verbose);
	}

	#[test]
	fn t_rip_options_lock_timeout() {
		assert_eq!(
			RipOptions::default().with_lock_timeout(0).lock_timeout(),
			Duration::from_secs(1),
		);
		assert_eq!(
			RipOptions::default().with_lock_timeout(5).lock_timeout(),
			Duration::from_secs(5),
		);
		assert_eq!(
			RipOptions::default().with_lock_timeout(u16::MAX).lock_timeout(),
			Duration::from_secs(u64::from(LOCK_TIMEOUT_MAX)),
		);
	}

	#[test]
	fn t_rip_options_offset() {
		let offset5 = ReadOffset::try_from(b"5".as_slice()).expect("Read offset 5 failed.");
		let offset667 = ReadOffset::try_from(b"-667".as_slice()).expect("Read offset -667 failed.");
		for v in [offset5, offset667] {
			let opts = RipOptions::default().with_offset(v);
			assert_eq!(opts.offset(), Some(v));
		}
	}

	#[test]
	fn t_rip_options_tracks() {
		let mut opts = RipOptions::default();

		// Zero and 100 don't count.
		opts = opts.with_track(0).with_track(100);
		assert!(! opts.has_tracks(), "The track list should be empty!");

		// Add all possible tracks.
		for idx in 0..=u8::MAX { opts = opts.with_track(idx); }
		let tracks = opts.tracks().collect::<Vec<u8>>();
		assert_eq!(tracks.len(), 99, "Expected 99 tracks.");
		for (real, expected) in tracks.into_iter().zip(1..=99_u8) {
			assert_eq!(real, expected, "Options track mismatch: {real} instead of {expected}.");
		}

		// And a somewhat random list.
		opts = RipOptions::default().with_track(15).with_track(1).with_track(5);
		assert_eq!(opts.tracks().collect::<Vec<u8>>(), [1, 5, 15]);
	}
}
