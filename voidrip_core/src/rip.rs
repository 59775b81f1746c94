/*!
# Void Rip: Ripping

The heavy lifting is done by `cdrdao` (a quick whole-disc pass), `sox` (raw
to WAV, offset correction), `cdparanoia` (careful single-track re-rips), and
`flac` (archiving). The [`Ripper`] strings them together and keeps the job's
phase up to date as it goes.

Intermediate files live in the job's working directory and are reused if
they already exist, so an interrupted job can simply be run again.
*/

use crate::{
	CDTextKind,
	Command,
	CommandOutput,
	Disc,
	JobId,
	JobPhase,
	ReleaseLookup,
	RipJob,
	RipJobs,
	SystemCommand,
	Verification,
	VoidRipError,
};
use fyi_msg::Msg;
use std::path::{
	Path,
	PathBuf,
};



/// # Raw Rip.
const FILE_RAW: &str = "cdrdao.raw";

/// # Raw Rip (Offset-Corrected).
const FILE_SHIFTED: &str = "cdrdao_shifted.raw";

/// # Rip TOC.
const FILE_TOC: &str = "cdrdao.toc";

/// # Rip WAV.
const FILE_WAV: &str = "cdrdao.wav";

/// # Archive.
const FILE_FLAC: &str = "cd.flac";

/// # Sox Raw Format.
const SOX_RAW: [&str; 8] = ["-t", "raw", "--endian", "little", "-b16", "-esigned", "-c2", "-r44100"];

/// # Sox WAV Format.
const SOX_WAV: [&str; 8] = ["-t", "wav", "--endian", "little", "-b16", "-esigned", "-c2", "-r44100"];

/// # FLAC Raw Input Format.
const FLAC_RAW: [&str; 6] = [
	"--force-raw-format",
	"--endian=little",
	"--sign=signed",
	"--channels=2",
	"--bps=16",
	"--sample-rate=44100",
];



#[derive(Debug)]
/// # Ripper.
///
/// This handles the extraction side of a rip job.
pub struct Ripper<'a> {
	/// # Disc.
	disc: &'a Disc,

	/// # Job Manager.
	jobs: &'a RipJobs,

	/// # Job ID.
	job: JobId,

	/// # Working Directory.
	dir: PathBuf,

	/// # Device.
	device: Option<PathBuf>,

	/// # Programs.
	commands: Vec<Box<dyn Command>>,

	/// # Release Lookup.
	lookup: Option<Box<dyn ReleaseLookup>>,
}

impl<'a> Ripper<'a> {
	#[must_use]
	/// # New.
	///
	/// The system copies of the external programs are used by default.
	pub fn new(disc: &'a Disc, jobs: &'a RipJobs, job: &RipJob) -> Self {
		Self {
			disc,
			jobs,
			job: job.id(),
			dir: job.dir().to_path_buf(),
			device: None,
			commands: SystemCommand::all()
				.map(|c| Box::new(c) as Box<dyn Command>)
				.collect(),
			lookup: None,
		}
	}

	#[must_use]
	/// # With Device.
	pub fn with_device<P>(mut self, device: P) -> Self
	where P: AsRef<Path> {
		self.device = Some(device.as_ref().to_path_buf());
		self
	}

	#[must_use]
	/// # With Command.
	///
	/// Add or replace the program with the same name.
	pub fn with_command<C>(mut self, cmd: C) -> Self
	where C: Command + 'static {
		self.commands.retain(|c| c.name() != cmd.name());
		self.commands.push(Box::new(cmd));
		self
	}

	#[must_use]
	/// # With Release Lookup.
	///
	/// Consult an online database for any artist/album information CD-TEXT
	/// doesn't have.
	pub fn with_lookup<L>(mut self, lookup: L) -> Self
	where L: ReleaseLookup + 'static {
		self.lookup = Some(Box::new(lookup));
		self
	}

	#[must_use]
	/// # Working Directory.
	pub fn dir(&self) -> &Path { &self.dir }

	#[must_use]
	/// # WAV Path.
	///
	/// This is where the whole-disc rip ends up.
	pub fn wav_path(&self) -> PathBuf { self.dir.join(FILE_WAV) }
}

impl Ripper<'_> {
	/// # Rip.
	///
	/// Pull the whole disc with `cdrdao` and convert it to WAV, moving the
	/// job from `RIPPING` to `RIP_DONE`. The WAV path is returned.
	///
	/// ## Errors
	///
	/// Returns an error if there's no device, a program fails, or the job
	/// status can't be updated.
	pub fn rip(&self) -> Result<PathBuf, VoidRipError> {
		self.advance(JobPhase::Ripping)?;
		self.rip_disc()?;
		let wav = self.convert_to_wav()?;
		self.advance(JobPhase::RipDone)?;
		Ok(wav)
	}

	/// # Adopt.
	///
	/// Accept a WAV ripped elsewhere in lieu of running [`Ripper::rip`],
	/// moving the job through the same phases.
	///
	/// ## Errors
	///
	/// Returns an error if the file is missing or the job status can't be
	/// updated.
	pub fn adopt(&self, wav: &Path) -> Result<PathBuf, VoidRipError> {
		if ! wav.is_file() {
			return Err(VoidRipError::Audio(wav.to_string_lossy().into_owned()));
		}
		self.advance(JobPhase::RipDone)?;
		Ok(wav.to_path_buf())
	}

	/// # Rip Track.
	///
	/// Carefully re-rip a single track with `cdparanoia`, applying the read
	/// offset. This is always done fresh.
	///
	/// ## Errors
	///
	/// Returns an error if there's no device, the track doesn't exist, or
	/// `cdparanoia` fails.
	pub fn rip_track(&self, track: u8) -> Result<PathBuf, VoidRipError> {
		let device = self.device()?;
		if self.disc.track(track).is_none() { return Err(VoidRipError::NoTrack(track)); }

		let dst = format!("cdparanoia_{track:02}.wav");
		self.exec("cdparanoia", vec![
			"--output-wav".to_owned(),
			"--force-cdrom-device".to_owned(),
			device,
			"--sample-offset".to_owned(),
			self.disc.read_offset().samples().to_string(),
			track.to_string(),
			dst.clone(),
		])?;

		Ok(self.dir.join(dst))
	}

	/// # Finish.
	///
	/// Once a rip has been verified, fill in any missing artist/album details
	/// from the CD-TEXT, optionally archive it as FLAC, and mark the job
	/// done.
	///
	/// Returns the FLAC path, if one was made.
	///
	/// ## Errors
	///
	/// Returns an error if the verification fell short, a program fails, or
	/// the job status can't be updated.
	pub fn finish(&self, verification: &Verification, flac: bool)
	-> Result<Option<PathBuf>, VoidRipError> {
		verification.require_accurate()?;

		self.advance(JobPhase::Metadata)?;
		self.fill_metadata()?;

		let out =
			if ! flac { None }
			else if exists(&self.dir.join(FILE_RAW)) {
				self.correct_offset()?;
				Some(self.encode_flac()?)
			}
			else {
				Msg::warning(format!("There is no {FILE_RAW} to archive; skipping FLAC.")).eprint();
				None
			};

		self.advance(JobPhase::Done)?;
		Ok(out)
	}
}

impl Ripper<'_> {
	/// # Rip Disc.
	///
	/// Run `cdrdao` unless a previous raw rip is lying around.
	fn rip_disc(&self) -> Result<PathBuf, VoidRipError> {
		let dst = self.dir.join(FILE_RAW);
		if exists(&dst) {
			Msg::info(format!("Reusing the existing {FILE_RAW}.")).eprint();
			return Ok(dst);
		}

		let device = self.device()?;
		self.exec("cdrdao", vec![
			"read-cd".to_owned(),
			"--datafile".to_owned(),
			FILE_RAW.to_owned(),
			"--paranoia-mode".to_owned(),
			"1".to_owned(),
			"--device".to_owned(),
			device,
			FILE_TOC.to_owned(),
		])?;
		Ok(dst)
	}

	/// # Convert to WAV.
	fn convert_to_wav(&self) -> Result<PathBuf, VoidRipError> {
		let dst = self.wav_path();
		if exists(&dst) {
			Msg::info(format!("Reusing the existing {FILE_WAV}.")).eprint();
			return Ok(dst);
		}

		let mut args = sox_args(&SOX_RAW, FILE_RAW);
		args.extend(sox_args(&SOX_WAV, FILE_WAV));
		self.exec("sox", args)?;
		Ok(dst)
	}

	/// # Fill Metadata.
	///
	/// Fill in a missing artist or album from CD-TEXT, then from the release
	/// lookup, if any. Lookup failures are only worth a warning.
	fn fill_metadata(&self) -> Result<(), VoidRipError> {
		let status = self.jobs.status(self.job)?;
		let cdtext = self.disc.cdtext();
		let artist = cdtext.get(0, CDTextKind::Performer).filter(|_| status.artist.is_none());
		let album = cdtext.get(0, CDTextKind::Title).filter(|_| status.album.is_none());
		if artist.is_some() || album.is_some() {
			self.jobs.update(self.job, None, artist, album)?;
		}

		let Some(lookup) = self.lookup.as_ref() else { return Ok(()); };
		let status = self.jobs.status(self.job)?;
		if status.artist.is_some() && status.album.is_some() { return Ok(()); }

		match lookup.lookup(self.disc) {
			Ok(Some(release)) => {
				let artist = Some(release.artist.as_str())
					.filter(|s| status.artist.is_none() && ! s.is_empty());
				let album = Some(release.title.as_str())
					.filter(|s| status.album.is_none() && ! s.is_empty());
				if artist.is_some() || album.is_some() {
					self.jobs.update(self.job, None, artist, album)?;
				}
			},
			Ok(None) => {
				Msg::info(format!(
					"The disc is not in MusicBrainz; it can be added at {}",
					self.disc.musicbrainz_submission_url(),
				)).eprint();
			},
			Err(e) => { Msg::warning(e.to_string()).eprint(); },
		}

		Ok(())
	}

	/// # Correct Offset.
	///
	/// Shift the raw rip by the drive's read offset, trimming from one end and
	/// padding the other with silence so the length stays the same.
	fn correct_offset(&self) -> Result<PathBuf, VoidRipError> {
		let dst = self.dir.join(FILE_SHIFTED);
		if exists(&dst) { return Ok(dst); }

		let mut args = sox_args(&SOX_RAW, FILE_RAW);
		args.extend(sox_args(&SOX_RAW, FILE_SHIFTED));
		args.extend(offset_args(self.disc.read_offset().samples()));
		self.exec("sox", args)?;
		Ok(dst)
	}

	/// # Encode FLAC.
	fn encode_flac(&self) -> Result<PathBuf, VoidRipError> {
		let mut args = vec!["--silent".to_owned(), "--force".to_owned()];
		args.extend(FLAC_RAW.iter().map(|v| (*v).to_owned()));
		args.push("-o".to_owned());
		args.push(FILE_FLAC.to_owned());
		args.push(FILE_SHIFTED.to_owned());
		self.exec("flac", args)?;
		Ok(self.dir.join(FILE_FLAC))
	}

	/// # Advance Phase.
	///
	/// Move the job along to `phase` one step at a time, unless it's already
	/// there (or beyond).
	fn advance(&self, phase: JobPhase) -> Result<(), VoidRipError> {
		let mut now = self.jobs.status(self.job)?.phase;
		while now < phase {
			let Some(next) = now.next() else { break; };
			self.jobs.update(self.job, Some(next), None, None)?;
			now = next;
		}
		Ok(())
	}

	/// # Device.
	fn device(&self) -> Result<String, VoidRipError> {
		self.device.as_ref()
			.map(|p| p.to_string_lossy().into_owned())
			.ok_or(VoidRipError::Device)
	}

	/// # Execute.
	///
	/// Run the named program from the working directory.
	fn exec(&self, name: &str, args: Vec<String>) -> Result<CommandOutput, VoidRipError> {
		let cmd = self.commands.iter()
			.find(|c| c.name() == name)
			.ok_or_else(|| VoidRipError::CommandSpawn(name.to_owned()))?;

		std::fs::create_dir_all(&self.dir)
			.map_err(|_| VoidRipError::Write(self.dir.to_string_lossy().into_owned()))?;
		cmd.run(&args, &self.dir)?.check(name)
	}
}



/// # File Exists (and isn't empty)?
fn exists(path: &Path) -> bool {
	std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() != 0)
}

/// # Offset Correction Arguments.
///
/// A positive offset means the audio landed late, so the start is trimmed;
/// a negative one means it landed early, so the end is trimmed.
fn offset_args(offset: i16) -> Vec<String> {
	let n = offset.unsigned_abs();
	if offset > 0 {
		vec![
			"trim".to_owned(), format!("{n}s"),
			"pad".to_owned(), "0".to_owned(), format!("{n}s"),
		]
	}
	else if offset < 0 {
		vec![
			"trim".to_owned(), "0".to_owned(), format!("-{n}s"),
			"pad".to_owned(), format!("{n}s"), "0".to_owned(),
		]
	}
	else { Vec::new() }
}

/// # Sox File Arguments.
fn sox_args(spec: &[&str], file: &str) -> Vec<String> {
	spec.iter()
		.copied()
		.chain(std::iter::once(file))
		.map(str::to_owned)
		.collect()
}
