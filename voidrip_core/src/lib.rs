/*!
# Void Rip: Library

This crate handles the non-interactive parts of Void Rip: turning a disc's
table of contents into its various identifiers, verifying ripped audio
against the AccurateRip database, and keeping track of rip jobs (and the
discs they've already covered).
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod accuraterip;
pub mod address;
mod audio;
mod barcode;
mod cache;
mod cdtext;
mod chk;
mod command;
mod disc;
mod drive;
mod error;
mod job;
mod musicbrainz;
mod offset;
mod opts;
mod rip;

pub use accuraterip::{
	AccurateRipId,
	AccurateRipResults,
	ChecksumPair,
	fetch_checksums,
};
pub use address::Msf;
pub use audio::{
	AudioSource,
	WavAudio,
};
pub use barcode::Barcode;
pub use cache::cache_path;
pub use cdtext::{
	CdText,
	CDTextKind,
	CDTextLanguage,
};
pub use chk::{
	checksum_v1,
	checksum_v2,
	ChecksumMatcher,
	find_confidence,
	find_confidence_track,
	OffsetChecksums,
	sweep,
	TrackMatch,
	Verification,
};
pub use command::{
	Command,
	CommandOutput,
	SystemCommand,
};
pub use disc::{
	Disc,
	DiscMode,
	DiscReader,
	Preemphasis,
	RawDisc,
	RawTrack,
	Track,
	TrackFormat,
};
pub use drive::DriveVendorModel;
pub use error::VoidRipError;
pub use job::{
	JobId,
	JobPhase,
	JobStatus,
	RipJob,
	RipJobs,
};
pub use musicbrainz::{
	MusicBrainz,
	Release,
	ReleaseLookup,
	ReleaseTrack,
};
pub use offset::ReadOffset;
pub use opts::{
	RipOptions,
	RipOptionsTracks,
};
pub use rip::Ripper;



/// # Static Hasher.
///
/// The AccurateRip checksum maps are keyed by values we didn't choose, but
/// there's no need for per-process randomness either.
pub(crate) const AHASHER: ahash::RandomState = ahash::RandomState::with_seeds(13, 19, 23, 71);

/// # Cache Base.
///
/// The cache root is thus `CWD/CACHE_BASE`.
pub const CACHE_BASE: &str = "_voidrip";

/// # AccurateRip Cache Folder.
///
/// Downloaded checksum blobs live in `CWD/CACHE_BASE/CACHE_ACCURATERIP`.
pub const CACHE_ACCURATERIP: &str = "accuraterip";

/// # Status Folder.
///
/// Job status files and the ledger live in `CWD/CACHE_BASE/CACHE_STATUS` by
/// default.
pub const CACHE_STATUS: &str = "status";

/// # Work Folder.
///
/// Per-job working directories live in `CWD/CACHE_BASE/CACHE_WORK` by
/// default.
pub const CACHE_WORK: &str = "work";

/// # Bytes Per Sample.
pub const BYTES_PER_SAMPLE: u16 = 4;

/// # Bytes Per Sector.
///
/// This is the number of bytes per sector of _audio_ data.
pub const BYTES_PER_SECTOR: u16 = SAMPLES_PER_SECTOR * BYTES_PER_SAMPLE;

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Sectors per second.
pub const SECTORS_PER_SECOND: u16 = 75;

/// # Number of lead-in sectors.
///
/// All discs have a 2-second region at the start before any data. Different
/// contexts include or exclude this amount, so it's good to keep it handy.
pub const CD_LEADIN: u16 = 150;

/// # Lead-out Label.
///
/// This is used solely for the table of contents printout; e.g. 01 02 03 AA.
pub const CD_LEADOUT_LABEL: &str = "AA";

/// # Maximum Track Number.
pub const MAX_TRACKS: u8 = 100;

/// # Checksum Window.
///
/// AccurateRip matches are searched for within this many samples either side
/// of the nominal track position.
pub const CHECKSUM_WINDOW: u16 = 2940;

/// # Wave Spec.
pub(crate) const WAVE_SPEC: hound::WavSpec = hound::WavSpec {
	channels: 2,
	sample_rate: 44100,
	bits_per_sample: 16,
	sample_format: hound::SampleFormat::Int,
};
