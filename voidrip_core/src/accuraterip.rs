/*!
# Void Rip: AccurateRip

AccurateRip publishes per-track checksums for each pressing it knows about,
keyed by a disc ID derived from the table of contents. The responses are
small binary blobs; this module builds the requests and parses the answers.
*/

use crate::{
	AHASHER,
	cache::write_atomic,
	VoidRipError,
};
use serde::{
	Serialize,
	Serializer,
};
use std::{
	collections::HashMap,
	fmt,
	io::Read,
	path::Path,
	sync::OnceLock,
	time::Duration,
};
use ureq::{
	Agent,
	AgentBuilder,
};



/// # Connection Agent.
static AGENT: OnceLock<Agent> = OnceLock::new();

/// # Base URL.
const BASE_URL: &str = "http://www.accuraterip.com/accuraterip";

/// # Header Size.
const HEADER_SIZE: usize = 13;

/// # Entry Size.
const ENTRY_SIZE: usize = 9;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # AccurateRip ID.
pub struct AccurateRipId {
	/// # Number of Tracks.
	num_tracks: u8,

	/// # ID One (Sum of Offsets).
	id1: u32,

	/// # ID Two (Weighted Sum of Offsets).
	id2: u32,

	/// # ID Three (CDDB).
	id3: u32,
}

impl fmt::Display for AccurateRipId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"dBAR-{:03}-{:08x}-{:08x}-{:08x}",
			self.num_tracks,
			self.id1,
			self.id2,
			self.id3,
		)
	}
}

impl Serialize for AccurateRipId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		serializer.collect_str(self)
	}
}

impl AccurateRipId {
	#[must_use]
	/// # New.
	pub const fn new(num_tracks: u8, id1: u32, id2: u32, id3: u32) -> Self {
		Self { num_tracks, id1, id2, id3 }
	}

	#[must_use]
	/// # Number of Tracks.
	pub const fn num_tracks(&self) -> u8 { self.num_tracks }

	#[must_use]
	/// # ID One.
	pub const fn id1(&self) -> u32 { self.id1 }

	#[must_use]
	/// # ID Two.
	pub const fn id2(&self) -> u32 { self.id2 }

	#[must_use]
	/// # ID Three.
	pub const fn id3(&self) -> u32 { self.id3 }

	#[must_use]
	/// # To Bytes.
	///
	/// This is the thirteen-byte header AccurateRip prefixes each record
	/// with: the track count, then the three IDs, little endian.
	pub const fn to_bytes(&self) -> [u8; 13] {
		let a = self.id1.to_le_bytes();
		let b = self.id2.to_le_bytes();
		let c = self.id3.to_le_bytes();
		[
			self.num_tracks,
			a[0], a[1], a[2], a[3],
			b[0], b[1], b[2], b[3],
			c[0], c[1], c[2], c[3],
		]
	}

	#[must_use]
	/// # From Bytes.
	///
	/// Parse a header from the first thirteen bytes of `src`, if there are
	/// that many.
	pub const fn from_bytes(src: &[u8]) -> Option<Self> {
		if let [n, a0, a1, a2, a3, b0, b1, b2, b3, c0, c1, c2, c3, ..] = *src {
			Some(Self {
				num_tracks: n,
				id1: u32::from_le_bytes([a0, a1, a2, a3]),
				id2: u32::from_le_bytes([b0, b1, b2, b3]),
				id3: u32::from_le_bytes([c0, c1, c2, c3]),
			})
		}
		else { None }
	}

	#[must_use]
	/// # Checksum URL.
	///
	/// The path is bucketed by the last three hex digits of the first ID,
	/// lowest first.
	pub fn checksum_url(&self) -> String {
		format!(
			"{BASE_URL}/{:x}/{:x}/{:x}/{self}.bin",
			self.id1 & 0xF,
			(self.id1 >> 4) & 0xF,
			(self.id1 >> 8) & 0xF,
		)
	}

	#[must_use]
	/// # Cache File Name.
	pub fn file_name(&self) -> String { format!("{self}.bin") }
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Checksum Pair.
///
/// Each AccurateRip entry carries two checksums; the first is the classic
/// "v1" track checksum.
pub struct ChecksumPair {
	/// # CRC One.
	pub crc1: u32,

	/// # CRC Two.
	pub crc2: u32,
}

impl fmt::Display for ChecksumPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({:08x},{:08x})", self.crc1, self.crc2)
	}
}

impl ChecksumPair {
	#[must_use]
	/// # New.
	pub const fn new(crc1: u32, crc2: u32) -> Self { Self { crc1, crc2 } }
}



/// # Track Checksums (pair, confidence).
type TrackChecksums = HashMap<ChecksumPair, u8, ahash::RandomState>;

#[derive(Debug, Clone)]
/// # AccurateRip Results.
///
/// The known checksums for each track of a disc, along with how many people
/// have independently submitted them.
pub struct AccurateRipResults {
	/// # Disc ID.
	id: AccurateRipId,

	/// # Per-Track Checksums (Zero-Indexed).
	tracks: Vec<TrackChecksums>,
}

impl AccurateRipResults {
	#[must_use]
	/// # New (Empty).
	pub fn new(id: AccurateRipId) -> Self {
		Self {
			id,
			tracks: (0..id.num_tracks)
				.map(|_| HashMap::with_hasher(AHASHER))
				.collect(),
		}
	}

	/// # Decode.
	///
	/// Parse a raw AccurateRip response. Each record is a copy of the disc
	/// header followed by one nine-byte entry per track: the confidence, then
	/// the two checksums, little endian.
	///
	/// Records are merged together; if the same checksums turn up more than
	/// once, the last one wins.
	///
	/// ## Errors
	///
	/// Returns an error if a record belongs to a different disc or is cut
	/// short.
	pub fn decode(bin: &[u8], id: &AccurateRipId) -> Result<Self, VoidRipError> {
		let mut out = Self::new(*id);

		let mut pos = 0;
		while pos < bin.len() {
			let found = AccurateRipId::from_bytes(&bin[pos..])
				.ok_or(VoidRipError::AccurateRipTruncated(pos))?;
			if found != *id {
				return Err(VoidRipError::AccurateRipMismatch(*id, found));
			}

			let start = pos + HEADER_SIZE;
			let end = start + ENTRY_SIZE * usize::from(found.num_tracks);
			let entries = bin.get(start..end)
				.ok_or(VoidRipError::AccurateRipTruncated(pos))?;

			for (chunk, map) in entries.chunks_exact(ENTRY_SIZE).zip(out.tracks.iter_mut()) {
				let confidence = chunk[0];
				let crc1 = u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]);
				let crc2 = u32::from_le_bytes([chunk[5], chunk[6], chunk[7], chunk[8]]);
				map.insert(ChecksumPair::new(crc1, crc2), confidence);
			}

			pos = end;
		}

		Ok(out)
	}

	/// # Add Track Entry.
	///
	/// ## Errors
	///
	/// Track numbers are one-based; anything outside `1..=num_tracks` is an
	/// error.
	pub fn add_track(&mut self, track: u8, pair: ChecksumPair, confidence: u8)
	-> Result<(), VoidRipError> {
		let num_tracks = self.id.num_tracks;
		let map = track.checked_sub(1)
			.and_then(|idx| self.tracks.get_mut(usize::from(idx)))
			.ok_or(VoidRipError::AccurateRipTrack(track, num_tracks))?;
		map.insert(pair, confidence);
		Ok(())
	}
}

impl AccurateRipResults {
	#[must_use]
	/// # Disc ID.
	pub const fn id(&self) -> &AccurateRipId { &self.id }

	#[must_use]
	/// # Is Empty?
	///
	/// Returns `true` if there are no checksums for any track.
	pub fn is_empty(&self) -> bool { self.tracks.iter().all(HashMap::is_empty) }

	#[must_use]
	/// # Number of Tracks.
	pub const fn num_tracks(&self) -> u8 { self.id.num_tracks }

	/// # Track Checksums.
	///
	/// Return the checksum/confidence map for a (one-based) track.
	///
	/// ## Errors
	///
	/// Returns an error if the track number is out of range.
	pub fn track(&self, track: u8) -> Result<&HashMap<ChecksumPair, u8, ahash::RandomState>, VoidRipError> {
		track.checked_sub(1)
			.and_then(|idx| self.tracks.get(usize::from(idx)))
			.ok_or(VoidRipError::AccurateRipTrack(track, self.id.num_tracks))
	}

	#[must_use]
	/// # Find Checksum.
	///
	/// Return the confidence for an exact checksum pair, if known.
	pub fn find_crc(&self, track: u8, pair: ChecksumPair) -> Option<u8> {
		self.track(track).ok()?.get(&pair).copied()
	}

	#[must_use]
	/// # V1 Candidates.
	///
	/// Return the distinct first checksums for a track along with their
	/// (highest) confidences, most confident first. Ties are ordered by
	/// checksum so results are stable.
	pub fn candidates(&self, track: u8) -> Vec<(u32, u8)> {
		let Ok(map) = self.track(track) else { return Vec::new(); };

		let mut best: HashMap<u32, u8, ahash::RandomState> = HashMap::with_hasher(AHASHER);
		for (pair, &confidence) in map {
			let e = best.entry(pair.crc1).or_insert(confidence);
			if *e < confidence { *e = confidence; }
		}

		let mut out: Vec<(u32, u8)> = best.into_iter().collect();
		out.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		out
	}
}



/// # Fetch Checksums.
///
/// Return the AccurateRip results for a disc, pulling them from
/// `cache_dir` if previously downloaded, or from the AccurateRip servers
/// otherwise. Fresh downloads are cached for next time.
///
/// A disc AccurateRip doesn't know about returns `None`.
///
/// ## Errors
///
/// Network failures (other than a 404) and unparseable responses are
/// errors.
pub fn fetch_checksums(id: &AccurateRipId, cache_dir: &Path)
-> Result<Option<AccurateRipResults>, VoidRipError> {
	let dst = cache_dir.join(id.file_name());

	// Cached?
	if let Some(out) = read_cached(&dst, id) { return Ok(Some(out)); }

	// Download it.
	let Some(raw) = download(&id.checksum_url())? else { return Ok(None); };
	let out = AccurateRipResults::decode(&raw, id)?;

	// Failing to cache isn't fatal.
	let _res = write_atomic(&dst, &raw);

	Ok(Some(out))
}

/// # Read Cached.
///
/// Decode a previously downloaded response. A cache file that no longer
/// decodes is deleted so it can be fetched fresh.
fn read_cached(src: &Path, id: &AccurateRipId) -> Option<AccurateRipResults> {
	let raw = std::fs::read(src).ok()?;
	if ! raw.is_empty() {
		if let Ok(out) = AccurateRipResults::decode(&raw, id) { return Some(out); }
	}

	let _res = std::fs::remove_file(src);
	None
}

/// # Connection Agent.
///
/// Storing the agent statically saves a little bit of overhead on reuse. Since
/// the checksums are cached locally, this may not get called at all.
fn agent() -> &'static Agent {
	AGENT.get_or_init(||
		AgentBuilder::new()
			.timeout(Duration::from_secs(15))
			.user_agent(concat!(
				"Mozilla/5.0 (X11; Linux x86_64; rv:",
				env!("CARGO_PKG_VERSION"),
				") VoidRip/",
				env!("CARGO_PKG_VERSION"),
			))
			.max_idle_connections(0)
			.build()
	)
}

/// # Download.
///
/// Download and return the data, or `None` for a 404.
fn download(url: &str) -> Result<Option<Vec<u8>>, VoidRipError> {
	let res = match agent().get(url).call() {
		Ok(res) => res,
		Err(ureq::Error::Status(404, _)) => return Ok(None),
		Err(_) => return Err(VoidRipError::Download(url.to_owned())),
	};

	let mut out = Vec::new();
	res.into_reader()
		.read_to_end(&mut out)
		.map_err(|_| VoidRipError::Download(url.to_owned()))?;

	if out.is_empty() { Ok(None) }
	else { Ok(Some(out)) }
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Test ID.
	const ID: AccurateRipId = AccurateRipId::new(3, 0x0002_6ef1, 0x0009_0b2c, 0x2a0a_6a03);

	/// # Build a Record.
	fn record(id: &AccurateRipId, entries: &[(u8, u32, u32)]) -> Vec<u8> {
		let mut out = id.to_bytes().to_vec();
		for (c, a, b) in entries {
			out.push(*c);
			out.extend_from_slice(&a.to_le_bytes());
			out.extend_from_slice(&b.to_le_bytes());
		}
		out
	}

	#[test]
	fn t_id() {
		assert_eq!(ID.to_string(), "dBAR-003-00026ef1-00090b2c-2a0a6a03");
		assert_eq!(
			ID.checksum_url(),
			"http://www.accuraterip.com/accuraterip/1/f/e/dBAR-003-00026ef1-00090b2c-2a0a6a03.bin",
		);
		assert_eq!(ID.to_bytes(), [3, 0xf1, 0x6e, 0x02, 0, 0x2c, 0x0b, 0x09, 0, 0x03, 0x6a, 0x0a, 0x2a]);
		assert_eq!(AccurateRipId::from_bytes(&ID.to_bytes()), Some(ID));
		assert_eq!(AccurateRipId::from_bytes(&[3, 0, 0]), None);

		let id = AccurateRipId::new(6, 0x0005_13be, 0x001b_2231, 0x3404_f606);
		assert_eq!(
			id.checksum_url(),
			"http://www.accuraterip.com/accuraterip/e/b/3/dBAR-006-000513be-001b2231-3404f606.bin",
		);
	}

	#[test]
	fn t_decode() {
		let mut bin = record(&ID, &[(7, 1, 2), (3, 3, 4), (0, 5, 6)]);
		bin.extend(record(&ID, &[(2, 1, 9), (12, 33, 44), (5, 5, 6)]));

		let res = AccurateRipResults::decode(&bin, &ID).expect("Decode failed.");
		assert_eq!(res.find_crc(1, ChecksumPair::new(1, 2)), Some(7));
		assert_eq!(res.find_crc(1, ChecksumPair::new(1, 9)), Some(2));
		assert_eq!(res.find_crc(2, ChecksumPair::new(33, 44)), Some(12));
		assert_eq!(res.find_crc(3, ChecksumPair::new(5, 6)), Some(5), "Last write should win.");
		assert_eq!(res.find_crc(3, ChecksumPair::new(7, 7)), None);
		assert_eq!(res.find_crc(4, ChecksumPair::new(5, 6)), None);
		assert_eq!(res.track(1).map(HashMap::len), Ok(2));
		assert!(res.track(0).is_err());
		assert!(res.track(4).is_err());

		// Candidates collapse by the first checksum.
		assert_eq!(res.candidates(1), vec![(1, 7)]);
		assert_eq!(res.candidates(2), vec![(33, 12), (3, 3)]);
	}

	#[test]
	fn t_decode_empty() {
		let res = AccurateRipResults::decode(&[], &ID).expect("Decode failed.");
		assert!(res.is_empty());
		assert_eq!(res.num_tracks(), 3);
		assert!(res.candidates(1).is_empty());
	}

	#[test]
	fn t_decode_bad() {
		let other = AccurateRipId::new(3, 1, 2, 3);
		let bin = record(&other, &[(1, 1, 1), (1, 1, 1), (1, 1, 1)]);
		assert_eq!(
			AccurateRipResults::decode(&bin, &ID).err(),
			Some(VoidRipError::AccurateRipMismatch(ID, other)),
		);

		// Short entries.
		let mut bin = record(&ID, &[(1, 1, 1), (1, 1, 1), (1, 1, 1)]);
		let len = bin.len();
		bin.extend(record(&ID, &[(1, 1, 1), (1, 1, 1)]));
		assert_eq!(
			AccurateRipResults::decode(&bin, &ID).err(),
			Some(VoidRipError::AccurateRipTruncated(len)),
		);

		// Short header.
		let mut bin = record(&ID, &[(1, 1, 1), (1, 1, 1), (1, 1, 1)]);
		bin.extend_from_slice(&[3, 0, 0, 0]);
		assert_eq!(
			AccurateRipResults::decode(&bin, &ID).err(),
			Some(VoidRipError::AccurateRipTruncated(len)),
		);
	}

	#[test]
	fn t_add_track() {
		let mut res = AccurateRipResults::new(ID);
		assert!(res.add_track(1, ChecksumPair::new(10, 20), 4).is_ok());
		assert!(res.add_track(3, ChecksumPair::new(11, 21), 5).is_ok());
		assert_eq!(
			res.add_track(0, ChecksumPair::new(1, 1), 1),
			Err(VoidRipError::AccurateRipTrack(0, 3)),
		);
		assert_eq!(
			res.add_track(4, ChecksumPair::new(1, 1), 1),
			Err(VoidRipError::AccurateRipTrack(4, 3)),
		);
		assert_eq!(res.find_crc(3, ChecksumPair::new(11, 21)), Some(5));
		assert!(! res.is_empty());
	}

	#[test]
	fn t_fetch_cached() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let bin = record(&ID, &[(9, 100, 200), (8, 300, 400), (7, 500, 600)]);
		std::fs::write(dir.path().join(ID.file_name()), &bin).expect("Write failed.");

		let res = fetch_checksums(&ID, dir.path())
			.expect("Fetch failed.")
			.expect("Missing results.");
		assert_eq!(res.find_crc(2, ChecksumPair::new(300, 400)), Some(8));
	}

	#[test]
	fn t_read_cached_corrupt() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let dst = dir.path().join(ID.file_name());

		// Nothing there.
		assert!(read_cached(&dst, &ID).is_none());

		// A truncated record gets tossed.
		let mut bin = record(&ID, &[(9, 100, 200), (8, 300, 400), (7, 500, 600)]);
		bin.truncate(bin.len() - 2);
		std::fs::write(&dst, &bin).expect("Write failed.");
		assert!(read_cached(&dst, &ID).is_none());
		assert!(! dst.exists(), "The corrupt cache should have been deleted.");

		// So does an empty one.
		std::fs::write(&dst, b"").expect("Write failed.");
		assert!(read_cached(&dst, &ID).is_none());
		assert!(! dst.exists(), "The empty cache should have been deleted.");

		// A good one is kept.
		let bin = record(&ID, &[(9, 100, 200), (8, 300, 400), (7, 500, 600)]);
		std::fs::write(&dst, &bin).expect("Write failed.");
		let res = read_cached(&dst, &ID).expect("Missing results.");
		assert_eq!(res.find_crc(3, ChecksumPair::new(500, 600)), Some(7));
		assert!(dst.exists());
	}
}
