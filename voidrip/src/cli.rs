/*!
# Void Rip: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use std::path::PathBuf;
use voidrip_core::{
	Disc,
	DriveVendorModel,
	RawDisc,
	ReadOffset,
	RipOptions,
	VoidRipError,
};



#[derive(Debug)]
/// # Parsed Options.
///
/// Unlike the tuples of yore, there are enough of these to warrant names.
pub(super) struct Parsed {
	/// # Rip Options.
	pub(super) opts: RipOptions,

	/// # Disc.
	pub(super) disc: Disc,

	/// # Device.
	pub(super) dev: Option<PathBuf>,

	/// # Existing Rip.
	pub(super) wav: Option<PathBuf>,

	/// # AccurateRip Response.
	pub(super) bin: Option<PathBuf>,

	/// # Status Directory.
	pub(super) status_dir: Option<PathBuf>,

	/// # Artist.
	pub(super) artist: Option<String>,

	/// # Album.
	pub(super) album: Option<String>,

	/// # Skip MusicBrainz?
	pub(super) no_musicbrainz: bool,

	/// # Print and Exit?
	pub(super) no_rip: bool,
}



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, VoidRipError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = RipOptions::default();
	let mut no_musicbrainz = false;
	let mut no_rip = false;
	let mut toc = None;
	let mut drive = None;
	let mut dev = None;
	let mut wav = None;
	let mut bin = None;
	let mut status_dir = None;
	let mut artist = None;
	let mut album = None;
	for arg in args {
		match arg {
			Argument::Key("--allow-duplicate") => { opts = opts.with_allow_duplicate(true); },
			Argument::Key("--flac") => { opts = opts.with_flac(true); },
			Argument::Key("-h" | "--help") => return Err(VoidRipError::PrintHelp),
			Argument::Key("--json") => { opts = opts.with_json(true); },
			Argument::Key("--no-musicbrainz") => { no_musicbrainz = true; },
			Argument::Key("--no-rip") => { no_rip = true; },
			Argument::Key("-v" | "--verbose") => { opts = opts.with_verbose(true); },
			Argument::Key("-V" | "--version") => return Err(VoidRipError::PrintVersion),

			Argument::KeyWithValue("--album", s) => { album = non_empty(s); },
			Argument::KeyWithValue("--artist", s) => { artist = non_empty(s); },
			Argument::KeyWithValue("--bin", s) => { bin.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("--confidence", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(VoidRipError::CliParse("--confidence"))?;
				opts = opts.with_confidence(s);
			},
			Argument::KeyWithValue("-d" | "--dev", s) => { dev.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("--drive", s) => {
				let s = DriveVendorModel::try_from(s.as_str())
					.map_err(|_| VoidRipError::CliParse("--drive"))?;
				drive.replace(s);
			},
			Argument::KeyWithValue("--lock-timeout", s) => {
				let s = u16::btou(s.trim().as_bytes())
					.ok_or(VoidRipError::CliParse("--lock-timeout"))?;
				opts = opts.with_lock_timeout(s);
			},
			Argument::KeyWithValue("-o" | "--offset", s) => {
				let s = ReadOffset::try_from(s.trim().as_bytes())
					.map_err(|_| VoidRipError::CliParse("-o/--offset"))?;
				opts = opts.with_offset(s);
			},
			Argument::KeyWithValue("--status-dir", s) => { status_dir.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("-t" | "--toc", s) => { toc.replace(s); },
			Argument::KeyWithValue("--track", s) => {
				for v in s.split(',') {
					let v = v.trim();
					if v.is_empty() { continue; }
					let v = u8::btou(v.as_bytes())
						.filter(|n| (1..=99).contains(n))
						.ok_or(VoidRipError::CliParse("--track"))?;
					opts = opts.with_track(v);
				}
			},
			Argument::KeyWithValue("-w" | "--wav", s) => { wav.replace(PathBuf::from(s)); },

			_ => {},
		}
	}

	// Build the disc.
	let toc = toc.ok_or_else(|| VoidRipError::CliArg("-t/--toc is required".to_owned()))?;
	let mut raw = RawDisc::from_cdtoc(&toc)?;
	if let Some(d) = drive { raw = raw.with_drive(d); }
	let disc = Disc::with_offset(&raw, opts.offset())?;

	// Make sure any re-rips are actually on the disc.
	for idx in opts.tracks() {
		if disc.track(idx).is_none() { return Err(VoidRipError::NoTrack(idx)); }
	}

	// An existing rip means no ripping.
	opts = opts.with_rip(wav.is_none());

	Ok(Parsed {
		opts,
		disc,
		dev,
		wav,
		bin,
		status_dir,
		artist,
		album,
		no_musicbrainz,
		no_rip,
	})
}

/// # Non-Empty.
fn non_empty(s: String) -> Option<String> {
	let trimmed = s.trim();
	if trimmed.is_empty() { None }
	else if trimmed.len() == s.len() { Some(s) }
	else { Some(trimmed.to_owned()) }
}
