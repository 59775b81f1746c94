/*!
# Void Rip: Errors
*/

use cdtoc::TocError;
use crate::{
	AccurateRipId,
	DiscMode,
	JobPhase,
	TrackFormat,
};
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r"
Void Rip v", env!("CARGO_PKG_VERSION"), r"
Identify audio CDs, verify rips against AccurateRip,
and keep track of what has already been ripped.

USAGE:
    voidrip [OPTIONS] --toc <CDTOC>

DISC:
    -t, --toc <CDTOC> The disc's table of contents in CDTOC format, e.g.
                      4+96+2D2B+6256+B327+D84A.
        --drive <VENDOR:MODEL>
                      The drive vendor and model, used to look up the read
                      offset from the AccurateRip drive table.
    -o, --offset <SAMPLES>
                      An explicit read offset, overriding the drive table.
                      [range: ±5880]

RIPPING:
    -d, --dev <PATH>  Rip the disc in this device with cdrdao and sox before
                      verifying. Without it, --wav must point to an existing
                      rip.
    -w, --wav <PATH>  Verify this (whole-disc, 44.1kHz/16-bit/stereo) WAV
                      file instead of ripping.
        --track <NUM> Re-rip this track with cdparanoia once the disc has
                      been ripped, and verify it on its own. This option may
                      be repeated.
        --flac        Encode the verified rip to FLAC.
        --artist <STR>
        --album <STR> Record artist/album details for the job. Anything left
                      blank is filled from CD-TEXT or MusicBrainz.
        --no-musicbrainz
                      Don't look the disc up on MusicBrainz.

VERIFICATION:
        --bin <PATH>  Use this AccurateRip response instead of downloading
                      one.
        --confidence <NUM>
                      Require at least this AccurateRip confidence for every
                      track. [default: 10; range: 1..=99]

BOOKKEEPING:
        --status-dir <PATH>
                      Keep job status files and the ledger here.
                      [default: ./_voidrip/status]
        --lock-timeout <SECS>
                      Give up waiting for the ledger lock after this many
                      seconds. [default: 30; range: 1..=3600]
        --allow-duplicate
                      Rip even if the ledger says this disc has been done.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
        --json        Print the disc (and verification) as JSON.
        --no-rip      Print the disc information and exit.
    -v, --verbose     Print the per-track match details to STDOUT.
    -V, --version     Print version information to STDOUT and exit.
");



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum VoidRipError {
	/// # AccurateRip Header Mismatch (expected, found).
	AccurateRipMismatch(AccurateRipId, AccurateRipId),

	/// # AccurateRip Track Out of Range (track, total).
	AccurateRipTrack(u8, u8),

	/// # AccurateRip Response Cut Short (byte offset).
	AccurateRipTruncated(usize),

	/// # Audio Read.
	Audio(String),

	/// # Audio Format.
	AudioFormat(String),

	/// # Invalid Barcode.
	Barcode,

	/// # Bug!
	Bug(&'static str),

	/// # Cache directory.
	Cache,

	/// # CDTOC passthrough.
	Cdtoc(TocError),

	/// # External Command (name, exit code, stderr).
	Command(String, i32, String),

	/// # External Command Missing or Unstartable.
	CommandSpawn(String),

	/// # First Track Isn't One.
	DiscFirstTrack(u8),

	/// # Last Track Out of Range (first, last).
	DiscLastTrack(u8, u8),

	/// # Unsupported Disc Mode.
	DiscMode(DiscMode),

	/// # No Device.
	Device,

	/// # Network Failure.
	Download(String),

	/// # Duplicate Disc.
	Duplicate(String),

	/// # Unknown Drive (no offset).
	DriveOffset(String),

	/// # Invalid drive model.
	DriveModel,

	/// # Invalid drive vendor.
	DriveVendor,

	/// # Job ID Allocation.
	JobCreate(String),

	/// # Unsupported Joliet Level.
	JolietLevel(u8),

	/// # Ledger Lock Timeout.
	LedgerLock(String),

	/// # Ledger Read.
	LedgerRead(String),

	/// # Ledger Write.
	LedgerWrite(String),

	/// # Unparseable MusicBrainz Response.
	MusicBrainz(String),

	/// # Low Confidence (AccurateRip ID, (track, confidence)).
	NeedsRerip(String, Vec<(u8, u8)>),

	/// # No Such Track.
	NoTrack(u8),

	/// # Invalid Phase Transition (from, to).
	PhaseTransition(JobPhase, JobPhase),

	/// # Read Offset.
	ReadOffset,

	/// # Status File Corruption (job, bad value).
	StatusCorrupt(String, String),

	/// # Status Read.
	StatusRead(String),

	/// # Status Write.
	StatusWrite(String),

	/// # Track Channels (track, channels).
	TrackChannels(u8, u8),

	/// # Unsupported Track Format.
	TrackFormat(u8, TrackFormat),

	/// # Green Track.
	TrackGreen(u8),

	/// # Invalid Track LBA (track, first, last).
	TrackLba(u8, u32, u32),

	/// # Pre-emphasis.
	TrackPreemphasis(u8),

	/// # Unknown Pre-emphasis Code (track, code).
	TrackPreemphasisCode(u8, u8),

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for VoidRipError {}

impl From<TocError> for VoidRipError {
	#[inline]
	fn from(err: TocError) -> Self { Self::Cdtoc(err) }
}

impl From<VoidRipError> for Msg {
	#[inline]
	fn from(src: VoidRipError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for VoidRipError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AccurateRipMismatch(a, b) => write!(f, "AccurateRip returned {b} when asked for {a}."),
			Self::AccurateRipTrack(n, total) => write!(f, "AccurateRip track #{n} is out of range (1..={total})."),
			Self::AccurateRipTruncated(pos) => write!(f, "The AccurateRip response is truncated at byte {pos}."),
			Self::Audio(s) => write!(f, "Unable to read audio from {s}."),
			Self::AudioFormat(s) => write!(f, "Unsupported audio format: {s}."),
			Self::Barcode => f.write_str("Invalid/unsupported barcode."),
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::Cache => f.write_str("Unable to establish a cache directory."),
			Self::Cdtoc(s) => write!(f, "{s}"),
			Self::Command(name, code, err) =>
				if err.is_empty() { write!(f, "{name} failed with exit code {code}.") }
				else { write!(f, "{name} failed with exit code {code}: {err}") },
			Self::CommandSpawn(s) => write!(f, "Unable to run {s}."),
			Self::DiscFirstTrack(n) => write!(f, "Disc starts with track #{n}; only discs starting with #1 are supported."),
			Self::DiscLastTrack(a, b) => write!(f, "Invalid track range {a}..={b}; the disc is probably misread."),
			Self::DiscMode(m) => write!(f, "Disc has mode {m}; only CD-DA is supported."),
			Self::Device => f.write_str("A CD device is required for ripping."),
			Self::Download(s) => write!(f, "Unable to download {s}."),
			Self::Duplicate(s) => f.write_str(s),
			Self::DriveOffset(s) => write!(f, "The read offset for {s} is unknown; set one explicitly."),
			Self::DriveModel => f.write_str("Invalid drive model."),
			Self::DriveVendor => f.write_str("Invalid drive vendor."),
			Self::JobCreate(s) => write!(f, "Unable to reserve a job ID in {s}."),
			Self::JolietLevel(n) => write!(f, "Disc has Joliet level {n}; this is unsupported."),
			Self::LedgerLock(s) => write!(f, "Timed out waiting for the ledger lock on {s}."),
			Self::LedgerRead(s) => write!(f, "Unable to read the ledger {s}."),
			Self::LedgerWrite(s) => write!(f, "Unable to write to the ledger {s}."),
			Self::MusicBrainz(s) => write!(f, "Unable to parse the MusicBrainz response for {s}."),
			Self::NeedsRerip(id, tracks) => {
				write!(f, "{id} needs a manual re-rip; low confidence for")?;
				for (k, (n, c)) in tracks.iter().enumerate() {
					if k != 0 { f.write_str(",")?; }
					write!(f, " track #{n} ({c})")?;
				}
				f.write_str(".")
			},
			Self::NoTrack(n) => write!(f, "Track #{n} is not on the disc."),
			Self::PhaseTransition(a, b) => write!(f, "A job cannot go from {a} to {b}."),
			Self::ReadOffset => f.write_str("Invalid read offset."),
			Self::StatusCorrupt(job, s) => write!(f, "The status file for {job} is corrupt (unknown phase {s:?})."),
			Self::StatusRead(s) => write!(f, "Unable to read the status file {s}."),
			Self::StatusWrite(s) => write!(f, "Unable to save the status file {s}."),
			Self::TrackChannels(n, c) => write!(f, "Track #{n} has {c} channels; only stereo is supported."),
			Self::TrackFormat(n, kind) => write!(f, "Track #{n} has unsupported format {kind}."),
			Self::TrackGreen(n) => write!(f, "Track #{n} is flagged green; this is unsupported."),
			Self::TrackLba(n, a, b) => write!(f, "Track #{n} has an invalid sector range ({a}..={b})."),
			Self::TrackPreemphasis(n) => write!(f, "Track #{n} has pre-emphasis; this is unsupported."),
			Self::TrackPreemphasisCode(n, c) => write!(f, "Track #{n} has an unknown pre-emphasis value ({c})."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Void Rip v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
