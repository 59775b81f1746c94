/*!
# Void Rip: Disc
*/

use cdtoc::{
	Toc,
	TocKind,
};
use crate::{
	AccurateRipId,
	address::{
		lba_to_lsn,
		lba_to_msf,
		lba_to_sample,
		lsn_to_sample,
		Msf,
	},
	Barcode,
	CD_LEADIN,
	CD_LEADOUT_LABEL,
	CdText,
	DriveVendorModel,
	MAX_TRACKS,
	ReadOffset,
	VoidRipError,
};
use serde::{
	ser::SerializeStruct,
	Serialize,
	Serializer,
};
use std::fmt;



/// # Helper: Simple Labelled Enums.
macro_rules! labels {
	( $ty:ident $( $k:ident $v:literal ),+ $(,)? ) => (
		impl $ty {
			#[must_use]
			/// # As Str.
			pub const fn as_str(self) -> &'static str {
				match self {
					$( Self::$k => $v, )+
				}
			}
		}

		impl fmt::Display for $ty {
			#[inline]
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl Serialize for $ty {
			#[inline]
			fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
			where S: Serializer {
				serializer.serialize_str(self.as_str())
			}
		}
	);
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Disc Mode.
pub enum DiscMode {
	#[default]
	/// # Audio CD.
	CdDa,

	/// # Data CD (Mode 1).
	CdData,

	/// # Data CD (Mode 2).
	CdXa,

	/// # Mixed CD.
	CdMixed,

	/// # CD-i.
	CdI,

	/// # DVD (any kind).
	Dvd,

	/// # No Information.
	NoInfo,

	/// # Error.
	Error,
}

labels! {
	DiscMode
	CdDa "CD-DA",
	CdData "CD-DATA (Mode 1)",
	CdXa "CD-DATA (Mode 2)",
	CdMixed "CD-ROM Mixed",
	CdI "CD-i",
	Dvd "DVD",
	NoInfo "No information",
	Error "Error in getting information",
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Track Format.
pub enum TrackFormat {
	#[default]
	/// # Audio.
	Audio,

	/// # Data (Mode 1).
	Mode1,

	/// # Data (Mode 2).
	Mode2,
}

labels! {
	TrackFormat
	Audio "audio",
	Mode1 "mode1",
	Mode2 "mode2",
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
/// # Pre-emphasis.
///
/// Drives report this as a raw code; `3` is their way of saying they don't
/// know, which isn't an error in and of itself.
pub enum Preemphasis {
	#[default]
	/// # Off.
	Off,

	/// # On.
	On,

	/// # Unknown.
	Unknown,
}

impl Serialize for Preemphasis {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		match self {
			Self::Off => serializer.serialize_bool(false),
			Self::On => serializer.serialize_bool(true),
			Self::Unknown => serializer.serialize_none(),
		}
	}
}

impl Preemphasis {
	/// # From Raw Code.
	///
	/// ## Errors
	///
	/// Codes other than `0`, `1`, or `3` are an error.
	pub const fn from_code(track: u8, code: u8) -> Result<Self, VoidRipError> {
		match code {
			0 => Ok(Self::Off),
			1 => Ok(Self::On),
			3 => Ok(Self::Unknown),
			_ => Err(VoidRipError::TrackPreemphasisCode(track, code)),
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Raw Track.
///
/// This is the unvalidated track metadata as a `DiscReader` reports it.
pub struct RawTrack {
	/// # First LBA.
	pub first_lba: u32,

	/// # Last LBA (Inclusive).
	pub last_lba: u32,

	/// # Audio Channels.
	pub channels: u8,

	/// # Format.
	pub format: TrackFormat,

	/// # Copy Permitted?
	pub copy_permit: bool,

	/// # Pre-emphasis Code.
	pub preemphasis: u8,

	/// # Green?
	pub green: bool,

	/// # ISRC.
	pub isrc: Option<String>,
}

impl RawTrack {
	#[must_use]
	/// # New (Plain Audio).
	///
	/// Return a stereo audio track spanning the given (inclusive) range with
	/// all the other details zeroed out.
	pub const fn audio(first_lba: u32, last_lba: u32) -> Self {
		Self {
			first_lba,
			last_lba,
			channels: 2,
			format: TrackFormat::Audio,
			copy_permit: false,
			preemphasis: 0,
			green: false,
			isrc: None,
		}
	}
}



/// # Disc Reader.
///
/// This is the seam between the disc model and whatever is actually talking
/// to the drive.
pub trait DiscReader {
	/// # First Track Number.
	fn first_track(&self) -> u8;

	/// # Last Track Number.
	fn last_track(&self) -> u8;

	/// # Disc Mode.
	fn disc_mode(&self) -> DiscMode;

	/// # Joliet Level.
	fn joliet_level(&self) -> u8;

	/// # Track.
	///
	/// Return the raw details for the given track number.
	///
	/// ## Errors
	///
	/// Implementations should return an error if the track cannot be read.
	fn track(&self, num: u8) -> Result<RawTrack, VoidRipError>;

	/// # Media Catalogue Number.
	///
	/// This is returned raw; validation happens elsewhere.
	fn mcn(&self) -> Option<String>;

	/// # CDText.
	fn cdtext(&self) -> CdText;

	/// # Drive Vendor/Model.
	fn drive_vendor_model(&self) -> Option<DriveVendorModel>;

	/// # Read Offset.
	///
	/// ## Errors
	///
	/// By default, the offset is looked up from the drive table, and drives
	/// that can't be found there are an error.
	fn read_offset(&self) -> Result<ReadOffset, VoidRipError> {
		self.drive_vendor_model()
			.ok_or_else(|| VoidRipError::DriveOffset("an unidentified drive".to_owned()))?
			.detect_offset()
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # In-Memory Disc.
///
/// A `DiscReader` for discs that have already been read (or are being made
/// up for testing purposes).
pub struct RawDisc {
	/// # First Track.
	pub first_track: u8,

	/// # Last Track.
	pub last_track: u8,

	/// # Mode.
	pub mode: DiscMode,

	/// # Joliet Level.
	pub joliet_level: u8,

	/// # Tracks (In Order).
	pub tracks: Vec<RawTrack>,

	/// # MCN.
	pub mcn: Option<String>,

	/// # CDText.
	pub cdtext: CdText,

	/// # Drive Vendor/Model.
	pub drive: Option<DriveVendorModel>,
}

impl DiscReader for RawDisc {
	fn first_track(&self) -> u8 { self.first_track }
	fn last_track(&self) -> u8 { self.last_track }
	fn disc_mode(&self) -> DiscMode { self.mode }
	fn joliet_level(&self) -> u8 { self.joliet_level }
	fn track(&self, num: u8) -> Result<RawTrack, VoidRipError> {
		num.checked_sub(self.first_track)
			.and_then(|idx| self.tracks.get(usize::from(idx)))
			.cloned()
			.ok_or(VoidRipError::NoTrack(num))
	}
	fn mcn(&self) -> Option<String> { self.mcn.clone() }
	fn cdtext(&self) -> CdText { self.cdtext.clone() }
	fn drive_vendor_model(&self) -> Option<DriveVendorModel> { self.drive }
}

impl RawDisc {
	#[must_use]
	#[allow(clippy::cast_possible_truncation)]
	/// # From Track Starts.
	///
	/// Build an audio-only disc from the starting LBA of each track and the
	/// lead-out. Each track ends where the next begins.
	pub fn from_lbas(starts: &[u32], leadout: u32) -> Self {
		let tracks: Vec<RawTrack> = starts.iter()
			.enumerate()
			.map(|(k, &first)| {
				let next = starts.get(k + 1).copied().unwrap_or(leadout);
				RawTrack::audio(first, next.saturating_sub(1))
			})
			.collect();

		Self {
			first_track: 1,
			last_track: tracks.len() as u8,
			tracks,
			..Self::default()
		}
	}

	/// # From CDTOC.
	///
	/// Parse a CDTOC-style table of contents, e.g. `4+96+2D2B+6256+B327+D84A`.
	///
	/// ## Errors
	///
	/// Returns an error if the string can't be parsed. Discs with data
	/// tracks are accepted here but will fail validation later on.
	pub fn from_cdtoc(src: &str) -> Result<Self, VoidRipError> {
		let toc = Toc::from_cdtoc(src)?;
		let mut out = Self::from_lbas(toc.audio_sectors(), toc.audio_leadout());
		if ! matches!(toc.kind(), TocKind::Audio) { out.mode = DiscMode::CdMixed; }
		Ok(out)
	}

	#[must_use]
	/// # With Drive.
	pub const fn with_drive(mut self, drive: DriveVendorModel) -> Self {
		self.drive = Some(drive);
		self
	}

	#[must_use]
	/// # With MCN.
	pub fn with_mcn<S>(mut self, mcn: S) -> Self
	where S: Into<String> {
		self.mcn = Some(mcn.into());
		self
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track.
///
/// A validated audio track.
pub struct Track {
	/// # Number.
	num: u8,

	/// # First LBA.
	first_lba: u32,

	/// # Last LBA (Inclusive).
	last_lba: u32,

	/// # Channels.
	channels: u8,

	/// # Format.
	format: TrackFormat,

	/// # Copy Permitted?
	copy_permit: bool,

	/// # Pre-emphasis.
	preemphasis: Preemphasis,

	/// # ISRC.
	isrc: Option<String>,

	/// # Last Track?
	is_last: bool,
}

impl Serialize for Track {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		let mut out = serializer.serialize_struct("Track", 15)?;
		out.serialize_field("num", &self.num)?;
		out.serialize_field("is_last_track", &self.is_last)?;
		out.serialize_field("first_lba", &self.first_lba)?;
		out.serialize_field("last_lba", &self.last_lba)?;
		out.serialize_field("channels", &self.channels)?;
		out.serialize_field("format", &self.format)?;
		out.serialize_field("copy_permit", &self.copy_permit)?;
		out.serialize_field("preemphasis", &self.preemphasis)?;
		out.serialize_field("is_green", &false)?;
		out.serialize_field("isrc", &self.isrc)?;
		out.serialize_field("length", &self.length_msf())?;
		out.serialize_field("first_sample", &self.first_sample())?;
		out.serialize_field("length_sample", &self.length_samples())?;
		out.serialize_field("first_lsn", &self.first_lsn())?;
		out.serialize_field("first_msf", &self.start_msf())?;
		out.end()
	}
}

impl Track {
	/// # New.
	///
	/// Validate the raw track details. The previous track's last LBA, if
	/// any, is used to make sure the tracks don't overlap.
	///
	/// ## Errors
	///
	/// Anything other than a plain stereo audio track is an error.
	fn new(num: u8, raw: RawTrack, is_last: bool, prev: Option<u32>)
	-> Result<Self, VoidRipError> {
		if raw.format != TrackFormat::Audio {
			return Err(VoidRipError::TrackFormat(num, raw.format));
		}
		if raw.channels != 2 {
			return Err(VoidRipError::TrackChannels(num, raw.channels));
		}
		let preemphasis = Preemphasis::from_code(num, raw.preemphasis)?;
		if matches!(preemphasis, Preemphasis::On) {
			return Err(VoidRipError::TrackPreemphasis(num));
		}
		if raw.green { return Err(VoidRipError::TrackGreen(num)); }
		if
			raw.last_lba < raw.first_lba ||
			prev.is_some_and(|prev| raw.first_lba <= prev)
		{
			return Err(VoidRipError::TrackLba(num, raw.first_lba, raw.last_lba));
		}

		Ok(Self {
			num,
			first_lba: raw.first_lba,
			last_lba: raw.last_lba,
			channels: raw.channels,
			format: raw.format,
			copy_permit: raw.copy_permit,
			preemphasis,
			isrc: raw.isrc.filter(|v| ! v.trim().is_empty()),
			is_last,
		})
	}
}

impl Track {
	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.num }

	#[must_use]
	/// # First LBA.
	pub const fn first_lba(&self) -> u32 { self.first_lba }

	#[must_use]
	/// # Last LBA (Inclusive).
	pub const fn last_lba(&self) -> u32 { self.last_lba }

	#[must_use]
	/// # Channels.
	pub const fn channels(&self) -> u8 { self.channels }

	#[must_use]
	/// # Format.
	pub const fn format(&self) -> TrackFormat { self.format }

	#[must_use]
	/// # Copy Permitted?
	pub const fn copy_permit(&self) -> bool { self.copy_permit }

	#[must_use]
	/// # Pre-emphasis.
	pub const fn preemphasis(&self) -> Preemphasis { self.preemphasis }

	#[must_use]
	/// # ISRC.
	pub fn isrc(&self) -> Option<&str> { self.isrc.as_deref() }

	#[must_use]
	/// # First Track?
	pub const fn is_first(&self) -> bool { self.num == 1 }

	#[must_use]
	/// # Last Track?
	pub const fn is_last(&self) -> bool { self.is_last }

	#[must_use]
	/// # Length (Frames).
	pub const fn length(&self) -> u32 { self.last_lba - self.first_lba + 1 }

	#[must_use]
	#[allow(clippy::cast_possible_wrap)]
	/// # First LSN.
	pub const fn first_lsn(&self) -> i32 { lba_to_lsn(self.first_lba as i32) }

	#[must_use]
	#[allow(clippy::cast_possible_wrap)]
	/// # Last LSN (Inclusive).
	pub const fn last_lsn(&self) -> i32 { lba_to_lsn(self.last_lba as i32) }

	#[must_use]
	#[allow(clippy::cast_possible_wrap)]
	/// # First Sample.
	pub const fn first_sample(&self) -> i64 { lba_to_sample(self.first_lba as i32) }

	#[must_use]
	#[allow(clippy::cast_possible_wrap)]
	/// # Length (Samples).
	pub const fn length_samples(&self) -> i64 { lsn_to_sample(self.length() as i32) }

	#[must_use]
	#[allow(clippy::cast_possible_wrap)]
	/// # Start MSF.
	pub const fn start_msf(&self) -> Msf { lba_to_msf(self.first_lba as i32) }

	#[must_use]
	#[allow(clippy::cast_possible_wrap)]
	/// # Length MSF.
	pub const fn length_msf(&self) -> Msf { lba_to_msf(self.length() as i32) }
}



#[derive(Debug, Clone)]
/// # Disc.
///
/// A validated audio CD. Everything about it is read up front; identifiers
/// are computed on demand.
pub struct Disc {
	/// # First Track.
	first_track: u8,

	/// # Last Track.
	last_track: u8,

	/// # Tracks.
	tracks: Vec<Track>,

	/// # Barcode.
	mcn: Option<Barcode>,

	/// # Mode.
	mode: DiscMode,

	/// # Joliet Level.
	joliet_level: u8,

	/// # CDText.
	cdtext: CdText,

	/// # Drive.
	drive: Option<DriveVendorModel>,

	/// # Read Offset.
	offset: ReadOffset,

	/// # Table of Contents.
	///
	/// This is kept for the MusicBrainz ID.
	toc: Toc,
}

impl fmt::Display for Disc {
	/// # Summarize the Disc.
	///
	/// This prints various disc identifiers and table of contents-type
	/// information in a nice little table.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// # Divider.
		const DIVIDER: &str = "----------------------------------------\n";

		// A few key/value pairs.
		let mut kv: Vec<(&str, String)> = vec![
			("AccurateRip:", self.id_accuraterip().to_string()),
			("CDDB:", self.id_cddb()),
			("MusicBrainz:", self.id_musicbrainz()),
		];
		if let Some(barcode) = self.mcn.as_ref() {
			kv.push(("Barcode:", barcode.to_string()));
		}
		if let Some(drive) = self.drive.as_ref() {
			kv.push(("Drive:", drive.to_string()));
		}
		kv.push(("Read Offset:", self.offset.to_string()));

		let col_max: usize = kv.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
		for (k, v) in kv {
			writeln!(f, "{k:col_max$} {v}")?;
		}

		// Start the table of contents.
		let any_isrc = self.tracks.iter().any(|t| t.isrc.is_some());
		writeln!(
			f,
			"\n##   FIRST    LAST  LENGTH  {}",
			if any_isrc { "        ISRC" } else { "" },
		)?;
		f.write_str(DIVIDER)?;

		for t in &self.tracks {
			writeln!(
				f,
				"{:02}  {:>6}  {:>6}  {:>6}  {:>12}",
				t.num,
				t.first_lsn(),
				t.last_lsn(),
				t.length(),
				t.isrc().unwrap_or_default(),
			)?;
		}

		// The leadout.
		writeln!(
			f,
			"{}  {:>6}                      LEAD-OUT",
			CD_LEADOUT_LABEL,
			self.num_frames().saturating_sub(u32::from(CD_LEADIN)),
		)?;

		// Close it off!
		f.write_str(DIVIDER)
	}
}

impl Serialize for Disc {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		let mut out = serializer.serialize_struct("Disc", 13)?;
		out.serialize_field("first_track", &self.first_track)?;
		out.serialize_field("num_tracks", &self.tracks.len())?;
		out.serialize_field("last_track", &self.last_track)?;
		out.serialize_field("tracks", &self.tracks)?;
		out.serialize_field("cdtext", &self.cdtext)?;
		out.serialize_field("mcn", &self.mcn)?;
		out.serialize_field("mode", &self.mode)?;
		out.serialize_field("jolietlvl", &self.joliet_level)?;
		out.serialize_field("drive", &self.drive.map(|d| d.to_string()))?;
		out.serialize_field("read_offset", &self.offset.samples())?;
		out.serialize_field("id_cddb", &self.id_cddb())?;
		out.serialize_field("id_musicbrainz", &self.id_musicbrainz())?;
		out.serialize_field("id_accuraterip", &self.id_accuraterip())?;
		out.end()
	}
}

impl Disc {
	/// # New.
	///
	/// Read and validate the disc.
	///
	/// ## Errors
	///
	/// This will return an error if the disc is anything other than a plain
	/// audio CD, or the drive's read offset is unknown.
	pub fn new<R: DiscReader>(reader: &R) -> Result<Self, VoidRipError> {
		Self::with_offset(reader, None)
	}

	/// # New (With Offset).
	///
	/// Same as `Disc::new`, but an explicit read offset, if provided, takes
	/// precedence over the drive table.
	///
	/// ## Errors
	///
	/// This will return an error if the disc is anything other than a plain
	/// audio CD, or no offset is given and the drive's is unknown.
	pub fn with_offset<R: DiscReader>(reader: &R, offset: Option<ReadOffset>)
	-> Result<Self, VoidRipError> {
		let first_track = reader.first_track();
		let last_track = reader.last_track();
		if first_track != 1 { return Err(VoidRipError::DiscFirstTrack(first_track)); }
		if MAX_TRACKS < last_track || last_track < first_track {
			return Err(VoidRipError::DiscLastTrack(first_track, last_track));
		}

		let mode = reader.disc_mode();
		if mode != DiscMode::CdDa { return Err(VoidRipError::DiscMode(mode)); }

		let joliet_level = reader.joliet_level();
		if joliet_level != 0 { return Err(VoidRipError::JolietLevel(joliet_level)); }

		// Load and validate the tracks.
		let mut tracks: Vec<Track> = Vec::with_capacity(usize::from(last_track));
		for num in first_track..=last_track {
			let raw = reader.track(num)?;
			let prev = tracks.last().map(Track::last_lba);
			tracks.push(Track::new(num, raw, num == last_track, prev)?);
		}

		// Everything else.
		let mcn = reader.mcn().as_deref().and_then(Barcode::from_mcn);
		let cdtext = reader.cdtext();
		let drive = reader.drive_vendor_model();
		let offset = match offset {
			Some(o) => o,
			None => reader.read_offset()?,
		};

		// Build a ToC for the MusicBrainz ID.
		let leadout = tracks.last().map_or(0, |t| t.last_lba + 1);
		let toc = Toc::from_parts(
			tracks.iter().map(Track::first_lba).collect(),
			None,
			leadout,
		)?;

		Ok(Self {
			first_track,
			last_track,
			tracks,
			mcn,
			mode,
			joliet_level,
			cdtext,
			drive,
			offset,
			toc,
		})
	}
}

impl Disc {
	#[must_use]
	/// # First Track Number.
	pub const fn first_track(&self) -> u8 { self.first_track }

	#[must_use]
	/// # Last Track Number.
	pub const fn last_track(&self) -> u8 { self.last_track }

	#[must_use]
	#[allow(clippy::cast_possible_truncation)]
	/// # Number of Tracks.
	pub const fn num_tracks(&self) -> u8 { self.tracks.len() as u8 }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[Track] { &self.tracks }

	#[must_use]
	/// # Track.
	pub fn track(&self, num: u8) -> Option<&Track> {
		num.checked_sub(self.first_track)
			.and_then(|idx| self.tracks.get(usize::from(idx)))
	}

	#[must_use]
	/// # Barcode (MCN).
	pub const fn mcn(&self) -> Option<Barcode> { self.mcn }

	#[must_use]
	/// # Mode.
	pub const fn mode(&self) -> DiscMode { self.mode }

	#[must_use]
	/// # Joliet Level.
	pub const fn joliet_level(&self) -> u8 { self.joliet_level }

	#[must_use]
	/// # CDText.
	pub const fn cdtext(&self) -> &CdText { &self.cdtext }

	#[must_use]
	/// # Drive Vendor and Model.
	pub const fn drive_vendor_model(&self) -> Option<DriveVendorModel> { self.drive }

	#[must_use]
	/// # Read Offset.
	pub const fn read_offset(&self) -> ReadOffset { self.offset }

	#[must_use]
	/// # Table of Contents.
	pub const fn toc(&self) -> &Toc { &self.toc }

	#[must_use]
	/// # Number of Frames.
	///
	/// This is the LBA of the lead-out, one past the end of the last track.
	pub fn num_frames(&self) -> u32 {
		self.tracks.last().map_or(0, |t| t.last_lba + 1)
	}

	/// # Track Start LBAs.
	pub fn tracks_lba(&self) -> impl Iterator<Item=u32> + '_ {
		self.tracks.iter().map(Track::first_lba)
	}

}

impl Disc {
	#[must_use]
	/// # CDDB ID (Raw).
	pub fn cddb_id(&self) -> u32 {
		u32::from_str_radix(&self.id_cddb(), 16).unwrap_or_default()
	}

	#[must_use]
	/// # CDDB ID.
	///
	/// The classic FreeDB checksum, formatted as eight lowercase hex digits.
	pub fn id_cddb(&self) -> String { self.toc.cddb_id().to_string() }

	#[must_use]
	/// # MusicBrainz ID.
	pub fn id_musicbrainz(&self) -> String { self.toc.musicbrainz_id().to_string() }

	#[must_use]
	/// # AccurateRip ID.
	pub fn id_accuraterip(&self) -> AccurateRipId {
		let leadout = lba_to_lsn_u32(self.num_frames());

		let mut id1: u32 = leadout;
		let mut id2: u32 = u32::from(self.last_track + 1).wrapping_mul(leadout);
		for t in &self.tracks {
			let lsn = lba_to_lsn_u32(t.first_lba);
			id1 = id1.wrapping_add(lsn);
			id2 = id2.wrapping_add(u32::from(t.num).wrapping_mul(lsn.max(1)));
		}

		AccurateRipId::new(self.num_tracks(), id1, id2, self.cddb_id())
	}

	#[must_use]
	/// # TOC String.
	///
	/// Return the space-separated first track, last track, lead-out, and
	/// track offsets, as used by MusicBrainz.
	pub fn toc_string(&self) -> String {
		use std::fmt::Write;

		let mut out = format!("{} {} {}", self.first_track, self.last_track, self.num_frames());
		for lba in self.tracks_lba() {
			let _res = write!(out, " {lba}");
		}
		out
	}

	#[must_use]
	/// # MusicBrainz Submission URL.
	///
	/// Unknown discs can be attached to a release by visiting this link.
	pub fn musicbrainz_submission_url(&self) -> String {
		format!(
			"https://musicbrainz.org/cdtoc/attach?id={}&tracks={}&toc={}",
			self.id_musicbrainz(),
			self.num_tracks(),
			self.toc_string().replace(' ', "+"),
		)
	}

	/// # JSON.
	///
	/// Render the disc (and its tracks and identifiers) as pretty JSON.
	///
	/// ## Errors
	///
	/// This shouldn't fail, but the serializer is fallible.
	pub fn to_json(&self) -> Result<String, VoidRipError> {
		serde_json::to_string_pretty(self)
			.map_err(|_| VoidRipError::Bug("unable to serialize the disc"))
	}
}



/// # LBA to LSN (Wrapping).
///
/// AccurateRip does its sums in 32-bit unsigned space.
const fn lba_to_lsn_u32(lba: u32) -> u32 { lba.wrapping_sub(CD_LEADIN as u32) }



#[cfg(test)]
mod test {
	use super::*;
	use crate::CDTextKind;

	/// # MusicBrainz Wiki Disc.
	const DISC_A: (&[u32], u32) = (&[150, 15363, 32314, 46592, 63414, 80489], 95462);

	/// # Libdiscid Test Disc.
	const DISC_B: (&[u32], u32) = (
		&[
			150, 17510, 33275, 45910, 57805, 78310, 94650, 109580, 132010,
			149160, 165115, 177710, 203325, 215555, 235590,
		],
		258725,
	);

	fn disc(src: (&[u32], u32)) -> Disc {
		let raw = RawDisc::from_lbas(src.0, src.1);
		Disc::with_offset(&raw, Some(ReadOffset(6))).expect("Disc failed.")
	}

	#[test]
	fn t_identifiers() {
		let d = disc(DISC_A);
		assert_eq!(d.num_frames(), 95462);
		assert_eq!(d.id_cddb(), "3404f606");
		assert_eq!(d.id_musicbrainz(), "49HHV7Eb8UKF3aQiNmu1GR8vKTY-");
		assert_eq!(d.id_accuraterip().to_string(), "dBAR-006-000513be-001b2231-3404f606");
		assert_eq!(d.toc_string(), "1 6 95462 150 15363 32314 46592 63414 80489");

		let d = disc(DISC_B);
		assert_eq!(d.id_cddb(), "b60d770f");
		assert_eq!(d.id_musicbrainz(), "TqvKjMu7dMliSfmVEBtrL7sBSno-");
		assert_eq!(d.id_accuraterip().to_string(), "dBAR-015-001e170c-015839ff-b60d770f");
		assert_eq!(
			d.musicbrainz_submission_url(),
			"https://musicbrainz.org/cdtoc/attach?id=TqvKjMu7dMliSfmVEBtrL7sBSno-&tracks=15&toc=1+15+258725+150+17510+33275+45910+57805+78310+94650+109580+132010+149160+165115+177710+203325+215555+235590",
		);
	}

	#[test]
	fn t_from_cdtoc() {
		let raw = RawDisc::from_cdtoc("E+96+3B5D+78E3+B441+EC83+134F4+17225+1A801+1EA5C+23B5B+27CEF+2B58B+2F974+35D56+514C8")
			.expect("CDTOC failed.");
		assert_eq!(raw.first_track, 1);
		assert_eq!(raw.last_track, 14);

		let d = Disc::with_offset(&raw, Some(ReadOffset(0))).expect("Disc failed.");
		assert_eq!(d.id_cddb(), "b611560e");
		assert_eq!(d.id_cddb(), d.toc().cddb_id().to_string(), "CDDB disagrees with cdtoc.");
		assert_eq!(d.id_musicbrainz(), "YN4.THnRKQPryHQW2glI1Q.iKR4-");
		assert_eq!(d.id_accuraterip().to_string(), "dBAR-014-001b5fad-012800b1-b611560e");
		assert_eq!(d.cddb_id(), 0xb611_560e);

		// The AccurateRip math should agree with cdtoc's.
		let theirs = d.toc().accuraterip_id().to_string();
		assert!(
			d.id_accuraterip().to_string().ends_with(&theirs),
			"AccurateRip disagrees with cdtoc: {theirs}",
		);
	}

	#[test]
	fn t_track_math() {
		let d = disc(DISC_A);
		let t = d.track(1).expect("Missing track.");
		assert!(t.is_first());
		assert!(! t.is_last());
		assert_eq!(t.first_lba(), 150);
		assert_eq!(t.last_lba(), 15362);
		assert_eq!(t.length(), 15213);
		assert_eq!(t.first_lsn(), 0);
		assert_eq!(t.first_sample(), 0);
		assert_eq!(t.length_samples(), 15213 * 588);
		assert_eq!(t.start_msf(), Msf::new(0, 2, 0));

		let t = d.track(6).expect("Missing track.");
		assert!(t.is_last());
		assert_eq!(t.first_sample(), (80489 - 150) * 588);
		assert_eq!(t.length(), 95462 - 80489);
		assert!(d.track(7).is_none());
		assert!(d.track(0).is_none());
	}

	#[test]
	fn t_validation() {
		let good = RawDisc::from_lbas(DISC_A.0, DISC_A.1);
		let offset = Some(ReadOffset(0));

		let mut raw = good.clone();
		raw.first_track = 2;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::DiscFirstTrack(2)));

		let mut raw = good.clone();
		raw.last_track = 101;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::DiscLastTrack(1, 101)));

		// A track the reader doesn't actually have.
		let mut raw = good.clone();
		raw.last_track = 7;
		assert_eq!(raw.track(7).err(), Some(VoidRipError::NoTrack(7)));
		assert_eq!(raw.track(0).err(), Some(VoidRipError::NoTrack(0)));
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::NoTrack(7)));

		let mut raw = good.clone();
		raw.mode = DiscMode::CdXa;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::DiscMode(DiscMode::CdXa)));

		let mut raw = good.clone();
		raw.joliet_level = 3;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::JolietLevel(3)));

		let mut raw = good.clone();
		raw.tracks[2].format = TrackFormat::Mode1;
		assert_eq!(
			Disc::with_offset(&raw, offset).err(),
			Some(VoidRipError::TrackFormat(3, TrackFormat::Mode1)),
		);

		let mut raw = good.clone();
		raw.tracks[1].channels = 4;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::TrackChannels(2, 4)));

		let mut raw = good.clone();
		raw.tracks[0].preemphasis = 1;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::TrackPreemphasis(1)));

		let mut raw = good.clone();
		raw.tracks[0].preemphasis = 2;
		assert_eq!(
			Disc::with_offset(&raw, offset).err(),
			Some(VoidRipError::TrackPreemphasisCode(1, 2)),
		);

		// Unknown is fine.
		let mut raw = good.clone();
		raw.tracks[0].preemphasis = 3;
		let d = Disc::with_offset(&raw, offset).expect("Unknown pre-emphasis should be allowed.");
		assert_eq!(d.tracks()[0].preemphasis(), Preemphasis::Unknown);

		let mut raw = good.clone();
		raw.tracks[5].green = true;
		assert_eq!(Disc::with_offset(&raw, offset).err(), Some(VoidRipError::TrackGreen(6)));

		let mut raw = good.clone();
		raw.tracks[3].last_lba = raw.tracks[3].first_lba - 1;
		assert!(matches!(
			Disc::with_offset(&raw, offset),
			Err(VoidRipError::TrackLba(4, _, _)),
		));

		// Overlap.
		let mut raw = good.clone();
		raw.tracks[3].first_lba = raw.tracks[2].last_lba;
		assert!(matches!(
			Disc::with_offset(&raw, offset),
			Err(VoidRipError::TrackLba(4, _, _)),
		));

		// Without an offset or a drive, it's a no-go.
		assert!(matches!(Disc::new(&good), Err(VoidRipError::DriveOffset(_))));
	}

	#[test]
	fn t_drive_offset() {
		let drive = DriveVendorModel::new("PLEXTOR", "DVDR   PX-716A").expect("Drive failed.");
		let raw = RawDisc::from_lbas(DISC_A.0, DISC_A.1).with_drive(drive);
		let d = Disc::new(&raw).expect("Disc failed.");
		assert_eq!(d.read_offset(), ReadOffset(30));

		// Explicit wins.
		let d = Disc::with_offset(&raw, Some(ReadOffset(-12))).expect("Disc failed.");
		assert_eq!(d.read_offset(), ReadOffset(-12));

		// Unknown drive.
		let drive = DriveVendorModel::new("ACME", "ROADRUNNER").expect("Drive failed.");
		let raw = RawDisc::from_lbas(DISC_A.0, DISC_A.1).with_drive(drive);
		assert!(matches!(Disc::new(&raw), Err(VoidRipError::DriveOffset(_))));
	}

	#[test]
	fn t_mcn_cdtext() {
		let raw = RawDisc::from_lbas(DISC_A.0, DISC_A.1).with_mcn("0000000000000");
		let d = Disc::with_offset(&raw, Some(ReadOffset(0))).expect("Disc failed.");
		assert_eq!(d.mcn(), None, "All-zero MCN should be none.");

		let mut raw = RawDisc::from_lbas(DISC_A.0, DISC_A.1).with_mcn("0731455829921");
		raw.cdtext.add(crate::CDTextLanguage::ENGLISH, 0, CDTextKind::Title, "Album");
		let d = Disc::with_offset(&raw, Some(ReadOffset(0))).expect("Disc failed.");
		assert_eq!(d.mcn().map(|b| b.to_string()), Some("7-31455-82992-1".to_owned()));
		assert_eq!(d.cdtext().get(0, CDTextKind::Title), Some("Album"));
	}

	#[test]
	fn t_json() {
		let d = disc(DISC_A);
		let json = d.to_json().expect("JSON failed.");
		let parsed: serde_json::Value = serde_json::from_str(&json).expect("Invalid JSON.");
		assert_eq!(parsed["id_cddb"], "3404f606");
		assert_eq!(parsed["id_accuraterip"], "dBAR-006-000513be-001b2231-3404f606");
		assert_eq!(parsed["mode"], "CD-DA");
		assert_eq!(parsed["read_offset"], 6);
		assert_eq!(parsed["tracks"][0]["first_msf"], "00:02:00");
		assert_eq!(parsed["tracks"][5]["is_last_track"], true);
		assert_eq!(parsed["tracks"][0]["preemphasis"], false);
	}

	#[test]
	fn t_display() {
		let d = disc(DISC_A);
		let out = d.to_string();
		assert!(out.contains("CDDB:        3404f606"), "Missing CDDB line:\n{out}");
		assert!(out.contains("01       0   15212   15213"), "Missing track line:\n{out}");
		assert!(out.contains("AA   95312"), "Missing lead-out:\n{out}");
	}
}
