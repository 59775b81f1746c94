/*!
# Void Rip: Checksums

AccurateRip checksums are more or less the sum of the product of each sample
(in little-endian `u32` form) and its one-based index within the track. All
data is factored, except the first `2939` samples of the first track, and the
last `2940` samples of the last track.

Drives read from slightly different positions, and so do the pressings
AccurateRip's contributors happened to own, so a rip is checked at every
sample offset within `±2940` of where it ought to be.
*/

use crate::{
	AccurateRipId,
	AccurateRipResults,
	AudioSource,
	CHECKSUM_WINDOW,
	Disc,
	Track,
	VoidRipError,
};
use dactyl::NoHash;
use serde::Serialize;
use std::collections::{
	BTreeMap,
	HashMap,
};



/// # Default Confidence Threshold.
const DEFAULT_THRESHOLD: u8 = 10;

/// # Maximum Confidence Threshold.
const MAX_THRESHOLD: u8 = 99;



#[must_use]
/// # Checksum (v1).
///
/// Crunch the classic AccurateRip checksum for a track's nominal samples.
pub fn checksum_v1(samples: &[u32], first: bool, last: bool) -> u32 {
	let (a, b) = bounds(samples.len(), first, last);
	let mut crc = 0_u32;
	for (k, v) in (a..b).zip(&samples[a.min(b)..b]) {
		crc = crc.wrapping_add(weight(k).wrapping_mul(*v));
	}
	crc
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
/// # Checksum (v2).
///
/// The second version folds the high half of each product back in, so bits
/// that would have overflowed still count for something.
pub fn checksum_v2(samples: &[u32], first: bool, last: bool) -> u32 {
	let (a, b) = bounds(samples.len(), first, last);
	let mut crc = 0_u32;
	for (k, v) in (a..b).zip(&samples[a.min(b)..b]) {
		let kv = u64::from(weight(k)) * u64::from(*v);
		crc = crc
			.wrapping_add((kv >> 32) as u32)
			.wrapping_add((kv & 0xFFFF_FFFF) as u32);
	}
	crc
}

/// # Sweep Offsets.
///
/// Compute the v1 checksum for every offset in `-window..=window`. The buffer
/// must hold the track's nominal samples plus `window` samples of padding on
/// either side.
///
/// Only offset zero is computed the slow way; its neighbors are derived by
/// sliding the range one sample at a time, backward and forward in their own
/// threads.
///
/// ## Errors
///
/// Returns an error if the window is absurdly large or a worker thread
/// panics.
pub fn sweep(buf: &[u32], window: usize, first: bool, last: bool)
-> Result<OffsetChecksums, VoidRipError> {
	let w = i32::try_from(window).map_err(|_| VoidRipError::Bug("checksum window out of range"))?;
	let n = buf.len().saturating_sub(window * 2);
	let (a, b) = bounds(n, first, last);

	// Nothing to sum!
	if b <= a { return Ok((-w..=w).map(|o| (o, 0)).collect()); }

	// Offset zero.
	let mut sum = 0_u32;
	let mut total = 0_u32;
	for (k, v) in (a..b).zip(&buf[window + a..window + b]) {
		sum = sum.wrapping_add(weight(k).wrapping_mul(*v));
		total = total.wrapping_add(*v);
	}

	let wa = weight(a);
	let wb = weight(b);

	// One thread per direction.
	let (neg, pos) = std::thread::scope(|s| {
		let neg = s.spawn(|| {
			let mut out = Vec::with_capacity(window);
			let (mut sum, mut total) = (sum, total);
			for p in (0..window).rev() {
				let head = buf[p + a];
				let tail = buf[p + b];
				sum = sum
					.wrapping_add(wa.wrapping_mul(head))
					.wrapping_sub(wb.wrapping_mul(tail))
					.wrapping_add(total);
				total = total.wrapping_add(head).wrapping_sub(tail);
				out.push(sum);
			}
			out
		});

		let pos = s.spawn(|| {
			let mut out = Vec::with_capacity(window);
			let (mut sum, mut total) = (sum, total);
			for p in window..window * 2 {
				let head = buf[p + a];
				let tail = buf[p + b];
				total = total.wrapping_sub(head).wrapping_add(tail);
				sum = sum
					.wrapping_sub(wa.wrapping_mul(head))
					.wrapping_add(wb.wrapping_mul(tail))
					.wrapping_sub(total);
				out.push(sum);
			}
			out
		});

		(neg.join(), pos.join())
	});
	let (Ok(neg), Ok(pos)) = (neg, pos) else {
		return Err(VoidRipError::Bug("checksum sweep thread panicked"));
	};

	let mut out = OffsetChecksums::default();
	out.0.insert(0, sum);
	out.0.extend((1..=w).map(|o| -o).zip(neg));
	out.0.extend((1..=w).zip(pos));
	Ok(out)
}

/// # Summing Bounds.
///
/// Return the (zero-based) range of samples that count toward the checksum
/// for a track `n` samples long.
const fn bounds(n: usize, first: bool, last: bool) -> (usize, usize) {
	let a =
		if first { CHECKSUM_WINDOW as usize - 1 }
		else { 0 };
	let b =
		if last { n.saturating_sub(CHECKSUM_WINDOW as usize) }
		else { n };
	(a, b)
}

#[allow(clippy::cast_possible_truncation)]
/// # Weight.
///
/// Samples are weighted by their one-based position.
const fn weight(k: usize) -> u32 { (k as u32).wrapping_add(1) }



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Offset Checksums.
///
/// The v1 checksums for a single track, keyed by sample offset.
pub struct OffsetChecksums(BTreeMap<i32, u32>);

impl FromIterator<(i32, u32)> for OffsetChecksums {
	fn from_iter<I: IntoIterator<Item=(i32, u32)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl OffsetChecksums {
	#[must_use]
	/// # Get Checksum.
	pub fn get(&self, offset: i32) -> Option<u32> { self.0.get(&offset).copied() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.0.len() }

	/// # Iterate.
	///
	/// Offsets are returned in ascending order.
	pub fn iter(&self) -> impl Iterator<Item=(i32, u32)> + '_ {
		self.0.iter().map(|(k, v)| (*k, *v))
	}

	#[must_use]
	/// # Nearest Offset.
	///
	/// Return the offset closest to zero producing `crc`, if any. Negative
	/// offsets win ties.
	pub fn nearest(&self, crc: u32) -> Option<i32> {
		self.index().get(&crc).copied()
	}

	/// # Index.
	///
	/// Map each checksum to its nearest-zero offset so candidates can be
	/// looked up in one go.
	fn index(&self) -> HashMap<u32, i32, NoHash> {
		let mut out: HashMap<u32, i32, NoHash> = HashMap::with_hasher(NoHash::default());
		for (offset, crc) in self.iter() {
			out.entry(crc)
				.and_modify(|o| if rank(offset) < rank(*o) { *o = offset; })
				.or_insert(offset);
		}
		out
	}
}

/// # Offset Rank.
///
/// Sort order for offsets: 0, -1, +1, -2, +2…
const fn rank(offset: i32) -> (u32, bool) { (offset.unsigned_abs(), 0 < offset) }



#[must_use]
/// # Find Confidence (Track).
///
/// Look for the database's checksums among the local ones, trying the most
/// confident candidates first. The first hit yields its confidence and the
/// offset it was found at; no hit yields `(0, 0)`.
///
/// Candidates with equal confidence are tried in the order given.
pub fn find_confidence_track(local: &OffsetChecksums, candidates: &[(u32, u8)]) -> (u8, i32) {
	let index = local.index();
	let mut sorted: Vec<&(u32, u8)> = candidates.iter().collect();
	sorted.sort_by(|a, b| b.1.cmp(&a.1));

	sorted.into_iter()
		.find_map(|(crc, confidence)| index.get(crc).map(|o| (*confidence, *o)))
		.unwrap_or((0, 0))
}

#[must_use]
/// # Find Confidence (Disc).
///
/// Run [`find_confidence_track`] for each track, returning the
/// `(confidence, offset)` pairs keyed by track number. `checksums` should be
/// in track order.
///
/// If the database has nothing for the disc, every track comes back
/// `(0, 0)`.
pub fn find_confidence(
	disc: &Disc,
	results: Option<&AccurateRipResults>,
	checksums: &[OffsetChecksums],
) -> BTreeMap<u8, (u8, i32)> {
	disc.tracks()
		.iter()
		.enumerate()
		.map(|(k, track)| {
			let num = track.number();
			let found = results.zip(checksums.get(k))
				.map_or((0, 0), |(res, local)|
					find_confidence_track(local, &res.candidates(num))
				);
			(num, found)
		})
		.collect()
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
/// # Track Match.
///
/// The outcome of verifying a single track.
pub struct TrackMatch {
	/// # Track Number.
	pub track: u8,

	/// # Confidence.
	pub confidence: u8,

	/// # Offset.
	///
	/// The sample offset the match was found at.
	pub offset: i32,

	/// # Checksum (v1).
	pub crc1: u32,

	/// # Checksum (v2).
	pub crc2: u32,
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Checksum Matcher.
///
/// This reads each track (plus padding) from the rip, computes its checksums
/// at every offset in the window, and compares them against what AccurateRip
/// knows.
pub struct ChecksumMatcher {
	/// # Confidence Threshold.
	threshold: u8,

	/// # Window.
	window: u16,
}

impl Default for ChecksumMatcher {
	fn default() -> Self {
		Self {
			threshold: DEFAULT_THRESHOLD,
			window: CHECKSUM_WINDOW,
		}
	}
}

impl ChecksumMatcher {
	#[must_use]
	/// # New.
	///
	/// Set the minimum confidence a track needs to be accepted. Values are
	/// clamped to `1..=99`.
	pub const fn new(threshold: u8) -> Self {
		let threshold =
			if threshold == 0 { 1 }
			else if threshold > MAX_THRESHOLD { MAX_THRESHOLD }
			else { threshold };
		Self { threshold, window: CHECKSUM_WINDOW }
	}

	#[must_use]
	/// # Threshold.
	pub const fn threshold(&self) -> u8 { self.threshold }

	/// # Checksums.
	///
	/// Sweep every track on the disc, returning the per-offset checksums in
	/// track order.
	///
	/// ## Errors
	///
	/// Returns an error if the audio cannot be read.
	pub fn checksums<A>(&self, disc: &Disc, audio: &mut A)
	-> Result<Vec<OffsetChecksums>, VoidRipError>
	where A: AudioSource + ?Sized {
		let window = usize::from(self.window);
		let mut out = Vec::with_capacity(usize::from(disc.num_tracks()));
		for track in disc.tracks() {
			let buf = self.read_window(track, rip_start(disc, track), audio)?;
			out.push(sweep(&buf, window, track.is_first(), track.is_last())?);
		}
		Ok(out)
	}

	/// # Verify.
	///
	/// Check each track of a whole-disc rip against the database results, if
	/// any.
	///
	/// ## Errors
	///
	/// Returns an error if the audio cannot be read.
	pub fn verify<A>(&self, disc: &Disc, results: Option<&AccurateRipResults>, audio: &mut A)
	-> Result<Verification, VoidRipError>
	where A: AudioSource + ?Sized {
		let local = self.checksums(disc, audio)?;
		let found = find_confidence(disc, results, &local);

		let mut tracks = Vec::with_capacity(usize::from(disc.num_tracks()));
		for (track, local) in disc.tracks().iter().zip(&local) {
			let (confidence, offset) = found.get(&track.number()).copied().unwrap_or((0, 0));
			let start = rip_start(disc, track) + i64::from(offset);
			tracks.push(TrackMatch {
				track: track.number(),
				confidence,
				offset,
				crc1: local.get(offset).unwrap_or_default(),
				crc2: Self::crc2(track, start, audio)?,
			});
		}

		Ok(Verification {
			id: disc.id_accuraterip(),
			found: results.is_some_and(|r| ! r.is_empty()),
			threshold: self.threshold,
			tracks,
		})
	}

	/// # Verify Track.
	///
	/// Check a single-track rip, like those from `cdparanoia`, against the
	/// database. The audio should hold just the one track with the read
	/// offset already applied.
	///
	/// ## Errors
	///
	/// Returns an error if the track isn't on the disc or the audio cannot be
	/// read.
	pub fn verify_track<A>(
		&self,
		disc: &Disc,
		num: u8,
		results: Option<&AccurateRipResults>,
		audio: &mut A,
	) -> Result<TrackMatch, VoidRipError>
	where A: AudioSource + ?Sized {
		let track = disc.track(num).ok_or(VoidRipError::NoTrack(num))?;
		let buf = self.read_window(track, 0, audio)?;
		let local = sweep(&buf, usize::from(self.window), track.is_first(), track.is_last())?;
		let (confidence, offset) = results.map_or((0, 0), |res|
			find_confidence_track(&local, &res.candidates(num))
		);

		Ok(TrackMatch {
			track: num,
			confidence,
			offset,
			crc1: local.get(offset).unwrap_or_default(),
			crc2: Self::crc2(track, i64::from(offset), audio)?,
		})
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	/// # Read Window.
	///
	/// Pull the track's samples starting from `start`, plus the window on
	/// either side.
	fn read_window<A>(&self, track: &Track, start: i64, audio: &mut A)
	-> Result<Vec<u32>, VoidRipError>
	where A: AudioSource + ?Sized {
		let window = i64::from(self.window);
		let len = track.length_samples() + window * 2;
		audio.read_samples(start - window, len as usize)
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	/// # Checksum (v2) at Position.
	fn crc2<A>(track: &Track, start: i64, audio: &mut A)
	-> Result<u32, VoidRipError>
	where A: AudioSource + ?Sized {
		let buf = audio.read_samples(start, track.length_samples() as usize)?;
		Ok(checksum_v2(&buf, track.is_first(), track.is_last()))
	}
}

/// # Rip Start.
///
/// In a whole-disc rip that hasn't been corrected, the track's first sample
/// sits `read_offset` samples later than it ought to.
fn rip_start(disc: &Disc, track: &Track) -> i64 {
	track.first_sample() + i64::from(disc.read_offset().samples())
}



#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
/// # Verification.
///
/// The AccurateRip results for a whole rip.
pub struct Verification {
	/// # Disc ID.
	id: AccurateRipId,

	/// # In Database?
	found: bool,

	/// # Confidence Threshold.
	threshold: u8,

	/// # Tracks.
	tracks: Vec<TrackMatch>,
}

impl Verification {
	#[must_use]
	/// # Disc ID.
	pub const fn id(&self) -> &AccurateRipId { &self.id }

	#[must_use]
	/// # In Database?
	///
	/// Returns `false` if AccurateRip has never heard of the disc.
	pub const fn found(&self) -> bool { self.found }

	#[must_use]
	/// # Threshold.
	pub const fn threshold(&self) -> u8 { self.threshold }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[TrackMatch] { &self.tracks }

	/// # Replace Track.
	///
	/// Swap in the result of a fresh single-track verification, e.g. after a
	/// re-rip. Tracks not already present are ignored.
	pub fn replace_track(&mut self, track: TrackMatch) {
		if let Some(old) = self.tracks.iter_mut().find(|t| t.track == track.track) {
			*old = track;
		}
	}

	#[must_use]
	/// # Is Accurate?
	///
	/// Returns `true` if every track meets the confidence threshold.
	pub fn is_accurate(&self) -> bool {
		self.tracks.iter().all(|t| self.threshold <= t.confidence)
	}

	#[must_use]
	/// # Flagged Tracks.
	///
	/// Return the track numbers and confidences of any that fall short.
	pub fn flagged(&self) -> Vec<(u8, u8)> {
		self.tracks.iter()
			.filter_map(|t|
				if t.confidence < self.threshold { Some((t.track, t.confidence)) }
				else { None }
			)
			.collect()
	}

	/// # Require Accuracy.
	///
	/// Re-ripping individual tracks requires a human, so anything short of
	/// full accuracy is an error.
	///
	/// ## Errors
	///
	/// Returns `NeedsRerip` listing the low-confidence tracks.
	pub fn require_accurate(&self) -> Result<(), VoidRipError> {
		let flagged = self.flagged();
		if flagged.is_empty() { Ok(()) }
		else { Err(VoidRipError::NeedsRerip(self.id.to_string(), flagged)) }
	}

	/// # JSON.
	///
	/// ## Errors
	///
	/// This shouldn't fail, but the serializer is fallible.
	pub fn to_json(&self) -> Result<String, VoidRipError> {
		serde_json::to_string_pretty(self)
			.map_err(|_| VoidRipError::Bug("unable to serialize the verification"))
	}
}
