/*!
# Void Rip: Rip Jobs

Every rip gets a numbered job with its own status file and working
directory. A shared ledger records which discs (by MusicBrainz ID) each job
covered so the same disc doesn't get ripped twice by accident.
*/

use crate::{
	cache::write_atomic,
	cache_path,
	CACHE_STATUS,
	CACHE_WORK,
	VoidRipError,
};
use serde::{
	ser::SerializeStruct,
	Serialize,
	Serializer,
};
use std::{
	fmt,
	fs::{
		File,
		OpenOptions,
		TryLockError,
	},
	io::{
		ErrorKind,
		Read,
		Seek,
		SeekFrom,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
	time::{
		Duration,
		Instant,
	},
};



/// # Ledger File Name.
const LEDGER: &str = "ledger";

/// # Lock Poll Interval.
const LOCK_POLL: Duration = Duration::from_millis(50);

/// # Default Lock Timeout.
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// # Status File Extension.
const STATUS_EXT: &str = "status";



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Job Phase.
///
/// Jobs only ever move forward, one phase at a time.
pub enum JobPhase {
	#[default]
	/// # Initializing.
	Initializing,

	/// # Ripping.
	Ripping,

	/// # Rip Done.
	RipDone,

	/// # Metadata.
	Metadata,

	/// # Done.
	Done,
}

impl fmt::Display for JobPhase {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for JobPhase {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		serializer.serialize_str(self.as_str())
	}
}

impl TryFrom<&str> for JobPhase {
	type Error = VoidRipError;

	fn try_from(src: &str) -> Result<Self, Self::Error> {
		match src.trim() {
			"INITIALIZING" => Ok(Self::Initializing),
			"RIPPING" => Ok(Self::Ripping),
			"RIP_DONE" => Ok(Self::RipDone),
			"METADATA" => Ok(Self::Metadata),
			"DONE" => Ok(Self::Done),
			_ => Err(VoidRipError::StatusCorrupt(String::new(), src.trim().to_owned())),
		}
	}
}

impl JobPhase {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Initializing => "INITIALIZING",
			Self::Ripping => "RIPPING",
			Self::RipDone => "RIP_DONE",
			Self::Metadata => "METADATA",
			Self::Done => "DONE",
		}
	}

	#[must_use]
	/// # Next Phase.
	///
	/// Returns `None` once the job is done.
	pub const fn next(self) -> Option<Self> {
		match self {
			Self::Initializing => Some(Self::Ripping),
			Self::Ripping => Some(Self::RipDone),
			Self::RipDone => Some(Self::Metadata),
			Self::Metadata => Some(Self::Done),
			Self::Done => None,
		}
	}

	/// # Transition.
	///
	/// Moving to the current phase is a no-op; otherwise the target must be
	/// the very next phase.
	///
	/// ## Errors
	///
	/// Returns an error for skips and backward moves.
	pub fn transition(self, to: Self) -> Result<Self, VoidRipError> {
		if self == to || self.next() == Some(to) { Ok(to) }
		else { Err(VoidRipError::PhaseTransition(self, to)) }
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Job ID.
///
/// IDs start at one and are rendered as `cd_00001`, etc.
pub struct JobId(u32);

impl fmt::Display for JobId {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "cd_{:05}", self.0)
	}
}

impl From<JobId> for u32 {
	#[inline]
	fn from(src: JobId) -> Self { src.0 }
}

impl TryFrom<&str> for JobId {
	type Error = VoidRipError;

	fn try_from(src: &str) -> Result<Self, Self::Error> {
		src.trim()
			.strip_prefix("cd_")
			.and_then(|n| n.parse::<u32>().ok())
			.filter(|n| 0 != *n)
			.map(Self)
			.ok_or_else(|| VoidRipError::JobCreate(src.to_owned()))
	}
}

impl JobId {
	#[must_use]
	/// # New.
	///
	/// Returns `None` for zero.
	pub const fn new(id: u32) -> Option<Self> {
		if id == 0 { None }
		else { Some(Self(id)) }
	}

	#[must_use]
	/// # Number.
	pub const fn get(self) -> u32 { self.0 }

	#[must_use]
	/// # Status File Name.
	pub fn status_file(self) -> String { format!("{self}.{STATUS_EXT}") }
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Job Status.
///
/// This is what gets persisted to the status file: the phase, artist, and
/// album, one per line. Unknown values are left blank.
pub struct JobStatus {
	/// # Phase.
	pub phase: JobPhase,

	/// # Artist.
	pub artist: Option<String>,

	/// # Album.
	pub album: Option<String>,
}

impl fmt::Display for JobStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}", self.phase)?;
		writeln!(f, "{}", self.artist.as_deref().unwrap_or_default())?;
		writeln!(f, "{}", self.album.as_deref().unwrap_or_default())
	}
}

impl JobStatus {
	/// # Parse.
	///
	/// ## Errors
	///
	/// Returns an error if the phase is not recognized.
	fn parse(job: JobId, src: &str) -> Result<Self, VoidRipError> {
		let mut lines = src.lines();
		let phase = lines.next().unwrap_or_default();
		let phase = JobPhase::try_from(phase)
			.map_err(|_| VoidRipError::StatusCorrupt(job.to_string(), phase.trim().to_owned()))?;

		Ok(Self {
			phase,
			artist: lines.next().and_then(flatten),
			album: lines.next().and_then(flatten),
		})
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Rip Job.
///
/// A snapshot of a job's details.
pub struct RipJob {
	/// # ID.
	id: JobId,

	/// # Working Directory.
	dir: PathBuf,

	/// # Status.
	status: JobStatus,
}

impl Serialize for RipJob {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		let mut out = serializer.serialize_struct("RipJob", 6)?;
		out.serialize_field("id", &self.id.0)?;
		out.serialize_field("name", &self.id.to_string())?;
		out.serialize_field("phase", &self.status.phase)?;
		out.serialize_field("dir", &self.dir)?;
		out.serialize_field("artist", &self.status.artist)?;
		out.serialize_field("album", &self.status.album)?;
		out.end()
	}
}

impl RipJob {
	#[must_use]
	/// # ID.
	pub const fn id(&self) -> JobId { self.id }

	#[must_use]
	/// # Working Directory.
	pub fn dir(&self) -> &Path { &self.dir }

	#[must_use]
	/// # Status.
	pub const fn status(&self) -> &JobStatus { &self.status }

	#[must_use]
	/// # Phase.
	pub const fn phase(&self) -> JobPhase { self.status.phase }
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Rip Jobs.
///
/// This manages the status files, working directories, and duplicate
/// ledger.
pub struct RipJobs {
	/// # Status Directory.
	status_dir: PathBuf,

	/// # Work Directory Root.
	work_root: PathBuf,

	/// # Ledger Lock Timeout.
	lock_timeout: Duration,
}

impl RipJobs {
	#[must_use]
	/// # New.
	pub fn new<P1, P2>(status_dir: P1, work_root: P2) -> Self
	where P1: AsRef<Path>, P2: AsRef<Path> {
		Self {
			status_dir: status_dir.as_ref().to_path_buf(),
			work_root: work_root.as_ref().to_path_buf(),
			lock_timeout: LOCK_TIMEOUT,
		}
	}

	/// # From Cache.
	///
	/// Use the default status and work directories under the cache root.
	///
	/// ## Errors
	///
	/// Returns an error if the cache root cannot be established.
	pub fn from_cache() -> Result<Self, VoidRipError> {
		Ok(Self::new(cache_path(CACHE_STATUS)?, cache_path(CACHE_WORK)?))
	}

	#[must_use]
	/// # With Lock Timeout.
	pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
		self.lock_timeout = timeout;
		self
	}

	#[must_use]
	/// # Status Directory.
	pub fn status_dir(&self) -> &Path { &self.status_dir }

	#[must_use]
	/// # Ledger Path.
	pub fn ledger_path(&self) -> PathBuf { self.status_dir.join(LEDGER) }

	#[must_use]
	/// # Status File Path.
	pub fn status_path(&self, id: JobId) -> PathBuf {
		self.status_dir.join(id.status_file())
	}

	#[must_use]
	/// # Working Directory.
	pub fn work_dir(&self, id: JobId) -> PathBuf {
		self.work_root.join(id.to_string())
	}
}

impl RipJobs {
	/// # Allocate Job.
	///
	/// Reserve the lowest available job ID by exclusively creating its status
	/// file, then create its working directory. If another process gets to a
	/// given ID first, the next one is tried.
	///
	/// ## Errors
	///
	/// Returns an error if the status directory is unusable or the working
	/// directory cannot be created.
	pub fn allocate(&self) -> Result<RipJob, VoidRipError> {
		let err = || VoidRipError::JobCreate(self.status_dir.to_string_lossy().into_owned());
		std::fs::create_dir_all(&self.status_dir).map_err(|_| err())?;

		let status = JobStatus::default();
		let mut n = 1_u32;
		let id = loop {
			let id = JobId(n);
			match OpenOptions::new().write(true).create_new(true).open(self.status_path(id)) {
				Ok(mut file) => {
					file.write_all(status.to_string().as_bytes())
						.and_then(|()| file.sync_all())
						.map_err(|_| err())?;
					break id;
				},
				Err(e) if e.kind() == ErrorKind::AlreadyExists => {
					n = n.checked_add(1).ok_or_else(err)?;
				},
				Err(_) => return Err(err()),
			}
		};

		let dir = self.work_dir(id);
		std::fs::create_dir_all(&dir).map_err(|_| err())?;

		Ok(RipJob { id, dir, status })
	}

	/// # Job.
	///
	/// Return the details for an existing job.
	///
	/// ## Errors
	///
	/// Returns an error if the status file cannot be read.
	pub fn job(&self, id: JobId) -> Result<RipJob, VoidRipError> {
		Ok(RipJob {
			id,
			dir: self.work_dir(id),
			status: self.status(id)?,
		})
	}

	/// # Status.
	///
	/// A missing status file is treated as a freshly-initialized job.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be read or its phase is bogus.
	pub fn status(&self, id: JobId) -> Result<JobStatus, VoidRipError> {
		let path = self.status_path(id);
		match std::fs::read_to_string(&path) {
			Ok(raw) => JobStatus::parse(id, &raw),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(JobStatus::default()),
			Err(_) => Err(VoidRipError::StatusRead(path.to_string_lossy().into_owned())),
		}
	}

	/// # Update Status.
	///
	/// Overlay whichever fields are provided onto the current status and save
	/// it. Fields left as `None` are untouched.
	///
	/// ## Errors
	///
	/// Returns an error if the status cannot be read or written, or if the
	/// phase change is not allowed.
	pub fn update(
		&self,
		id: JobId,
		phase: Option<JobPhase>,
		artist: Option<&str>,
		album: Option<&str>,
	) -> Result<JobStatus, VoidRipError> {
		let mut status = self.status(id)?;
		if let Some(phase) = phase { status.phase = status.phase.transition(phase)?; }
		if let Some(artist) = artist { status.artist = flatten(artist); }
		if let Some(album) = album { status.album = flatten(album); }

		let path = self.status_path(id);
		write_atomic(&path, status.to_string().as_bytes())
			.map_err(|_| VoidRipError::StatusWrite(path.to_string_lossy().into_owned()))?;

		Ok(status)
	}

	/// # Register Disc.
	///
	/// Look up the MusicBrainz ID in the ledger, returning the names of any
	/// jobs that have already claimed it. If there are none, the disc is
	/// recorded for this job.
	///
	/// The lookup and append happen under an exclusive lock, so concurrent
	/// processes can't both claim the same disc.
	///
	/// ## Errors
	///
	/// Returns an error if the lock can't be acquired in time or the ledger
	/// can't be read or written.
	pub fn register_disc(&self, id: JobId, mbid: &str) -> Result<Vec<String>, VoidRipError> {
		let path = self.ledger_path();
		let name = path.to_string_lossy().into_owned();
		std::fs::create_dir_all(&self.status_dir)
			.map_err(|_| VoidRipError::LedgerWrite(name.clone()))?;

		let file = OpenOptions::new()
			.read(true)
			.append(true)
			.create(true)
			.open(&path)
			.map_err(|_| VoidRipError::LedgerRead(name.clone()))?;
		let mut lock = LedgerLock::acquire(file, self.lock_timeout, &name)?;

		let mut raw = String::new();
		lock.file.seek(SeekFrom::Start(0))
			.and_then(|_| lock.file.read_to_string(&mut raw))
			.map_err(|_| VoidRipError::LedgerRead(name.clone()))?;

		let mbid = mbid.trim();
		let found: Vec<String> = raw.lines()
			.filter_map(|line| {
				let (job, disc) = line.trim().split_once(' ')?;
				if disc.trim() == mbid && ! job.is_empty() { Some(job.to_owned()) }
				else { None }
			})
			.collect();

		if found.is_empty() {
			lock.file.write_all(format!("{id} {mbid}\n").as_bytes())
				.and_then(|()| lock.file.sync_data())
				.map_err(|_| VoidRipError::LedgerWrite(name))?;
		}

		Ok(found)
	}
}



/// # Ledger Lock.
///
/// An exclusive advisory lock on the ledger, released on drop.
struct LedgerLock {
	/// # File.
	file: File,
}

impl Drop for LedgerLock {
	fn drop(&mut self) { let _res = self.file.unlock(); }
}

impl LedgerLock {
	/// # Acquire.
	///
	/// Poll for the lock until it is granted or the timeout elapses.
	///
	/// ## Errors
	///
	/// Returns an error on timeout or if locking isn't possible.
	fn acquire(file: File, timeout: Duration, name: &str) -> Result<Self, VoidRipError> {
		let start = Instant::now();
		loop {
			match file.try_lock() {
				Ok(()) => return Ok(Self { file }),
				Err(TryLockError::WouldBlock) => {
					if timeout <= start.elapsed() {
						return Err(VoidRipError::LedgerLock(name.to_owned()));
					}
					std::thread::sleep(LOCK_POLL);
				},
				Err(TryLockError::Error(_)) => return Err(VoidRipError::LedgerRead(name.to_owned())),
			}
		}
	}
}



/// # Flatten Value.
///
/// Status values are one per line, so line breaks are swapped for spaces.
/// Empty values are `None`.
fn flatten(src: &str) -> Option<String> {
	let out: String = src.trim()
		.chars()
		.map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
		.collect();
	if out.is_empty() { None }
	else { Some(out) }
}



#[cfg(test)]
mod test {
	use super::*;
	use std::collections::BTreeSet;

	/// # Test Jobs.
	fn jobs(dir: &Path) -> RipJobs {
		RipJobs::new(dir.join("status"), dir.join("work"))
			.with_lock_timeout(Duration::from_secs(5))
	}

	#[test]
	fn t_phase() {
		let mut phase = JobPhase::default();
		let mut all = vec![phase];
		while let Some(next) = phase.next() {
			all.push(next);
			phase = next;
		}
		assert_eq!(
			all.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
			["INITIALIZING", "RIPPING", "RIP_DONE", "METADATA", "DONE"],
		);
		for p in all {
			assert_eq!(JobPhase::try_from(p.as_str()).ok(), Some(p));
		}
		assert!(JobPhase::try_from("HALF_DONE").is_err());
		assert_eq!(JobPhase::Done.next(), None);
	}

	#[test]
	fn t_transition() {
		assert_eq!(JobPhase::Initializing.transition(JobPhase::Ripping).ok(), Some(JobPhase::Ripping));
		assert_eq!(JobPhase::Ripping.transition(JobPhase::Ripping).ok(), Some(JobPhase::Ripping));

		// Skips.
		assert_eq!(
			JobPhase::Initializing.transition(JobPhase::RipDone),
			Err(VoidRipError::PhaseTransition(JobPhase::Initializing, JobPhase::RipDone)),
		);

		// Backward.
		assert!(JobPhase::Done.transition(JobPhase::Metadata).is_err());
		assert!(JobPhase::RipDone.transition(JobPhase::Initializing).is_err());
	}

	#[test]
	fn t_job_id() {
		let id = JobId::new(12).expect("Job ID failed.");
		assert_eq!(id.to_string(), "cd_00012");
		assert_eq!(id.status_file(), "cd_00012.status");
		assert_eq!(JobId::try_from("cd_00012").ok(), Some(id));
		assert!(JobId::try_from("cd_00000").is_err());
		assert!(JobId::try_from("dvd_00001").is_err());
		assert_eq!(JobId::new(0), None);
	}

	#[test]
	fn t_allocate() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());

		let one = jobs.allocate().expect("Allocation failed.");
		let two = jobs.allocate().expect("Allocation failed.");
		assert_eq!(one.id().get(), 1);
		assert_eq!(two.id().get(), 2);
		assert!(one.dir().is_dir());
		assert_eq!(
			std::fs::read_to_string(jobs.status_path(one.id())).ok().as_deref(),
			Some("INITIALIZING\n\n\n"),
		);
	}

	#[test]
	fn t_allocate_existing() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());
		std::fs::create_dir_all(jobs.status_dir()).expect("Mkdir failed.");
		std::fs::write(jobs.status_dir().join("cd_00001.status"), "DONE\n\n\n")
			.expect("Write failed.");

		let job = jobs.allocate().expect("Allocation failed.");
		assert_eq!(job.id().get(), 2);
	}

	#[test]
	fn t_allocate_threads() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());

		let ids: Vec<u32> = std::thread::scope(|s| {
			let handles: Vec<_> = (0..8)
				.map(|_| s.spawn(|| jobs.allocate().map(|j| j.id().get())))
				.collect();
			handles.into_iter()
				.map(|h| h.join().expect("Thread failed.").expect("Allocation failed."))
				.collect()
		});

		let unique: BTreeSet<u32> = ids.iter().copied().collect();
		assert_eq!(unique.len(), 8, "IDs were handed out twice: {ids:?}");
		assert_eq!(unique.into_iter().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 7, 8]);
	}

	#[test]
	fn t_status() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());
		let id = JobId::new(7).expect("Job ID failed.");

		// Nothing yet.
		assert_eq!(jobs.status(id).ok(), Some(JobStatus::default()));

		let status = jobs.update(id, Some(JobPhase::Ripping), Some("Artist"), None)
			.expect("Update failed.");
		assert_eq!(status.artist.as_deref(), Some("Artist"));

		let status = jobs.update(id, None, None, Some("Album")).expect("Update failed.");
		assert_eq!(status, JobStatus {
			phase: JobPhase::Ripping,
			artist: Some("Artist".to_owned()),
			album: Some("Album".to_owned()),
		});
		assert_eq!(jobs.status(id).ok(), Some(status));

		// Line breaks get flattened.
		let status = jobs.update(id, None, None, Some("Greatest\nHits")).expect("Update failed.");
		assert_eq!(status.album.as_deref(), Some("Greatest Hits"));

		// Bad transitions are rejected without touching the file.
		assert!(matches!(
			jobs.update(id, Some(JobPhase::Done), Some("Nope"), None),
			Err(VoidRipError::PhaseTransition(JobPhase::Ripping, JobPhase::Done)),
		));
		assert_eq!(jobs.status(id).ok().and_then(|s| s.artist), Some("Artist".to_owned()));
	}

	#[test]
	fn t_status_corrupt() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());
		let id = JobId::new(3).expect("Job ID failed.");
		std::fs::create_dir_all(jobs.status_dir()).expect("Mkdir failed.");
		std::fs::write(jobs.status_path(id), "SPINNING\nA\nB\n").expect("Write failed.");

		assert_eq!(
			jobs.status(id),
			Err(VoidRipError::StatusCorrupt("cd_00003".to_owned(), "SPINNING".to_owned())),
		);
	}

	#[test]
	fn t_register_disc() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());
		let one = JobId::new(1).expect("Job ID failed.");
		let two = JobId::new(2).expect("Job ID failed.");

		assert!(jobs.register_disc(one, "abc").expect("Ledger failed.").is_empty());
		assert_eq!(jobs.register_disc(two, "abc").expect("Ledger failed."), ["cd_00001"]);
		assert!(jobs.register_disc(two, "xyz").expect("Ledger failed.").is_empty());
		assert_eq!(jobs.register_disc(one, "xyz").expect("Ledger failed."), ["cd_00002"]);

		assert_eq!(
			std::fs::read_to_string(jobs.ledger_path()).ok().as_deref(),
			Some("cd_00001 abc\ncd_00002 xyz\n"),
		);

		// Historical duplicates are all returned; junk lines are skipped.
		std::fs::write(jobs.ledger_path(), "cd_00001 abc\ngarbage\ncd_00004 abc\n")
			.expect("Write failed.");
		assert_eq!(
			jobs.register_disc(two, "abc").expect("Ledger failed."),
			["cd_00001", "cd_00004"],
		);
	}

	#[test]
	fn t_register_threads() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());

		let claimed: usize = std::thread::scope(|s| {
			let handles: Vec<_> = (1..=8_u32)
				.map(|n| {
					let jobs = &jobs;
					s.spawn(move || {
						let id = JobId::new(n).expect("Job ID failed.");
						jobs.register_disc(id, "same-disc").expect("Ledger failed.").is_empty()
					})
				})
				.collect();
			handles.into_iter()
				.map(|h| h.join().expect("Thread failed."))
				.filter(|fresh| *fresh)
				.count()
		});

		assert_eq!(claimed, 1, "The disc was registered more than once.");
		let ledger = std::fs::read_to_string(jobs.ledger_path()).expect("Read failed.");
		assert_eq!(ledger.lines().count(), 1);
	}

	#[test]
	fn t_lock_timeout() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path()).with_lock_timeout(Duration::from_millis(100));
		std::fs::create_dir_all(jobs.status_dir()).expect("Mkdir failed.");

		let holder = OpenOptions::new()
			.read(true)
			.append(true)
			.create(true)
			.open(jobs.ledger_path())
			.expect("Open failed.");
		holder.lock().expect("Lock failed.");

		let id = JobId::new(1).expect("Job ID failed.");
		assert!(matches!(jobs.register_disc(id, "abc"), Err(VoidRipError::LedgerLock(_))));

		holder.unlock().expect("Unlock failed.");
		assert!(jobs.register_disc(id, "abc").expect("Ledger failed.").is_empty());
	}

	#[test]
	fn t_serialize() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let jobs = jobs(dir.path());
		let job = jobs.allocate().expect("Allocation failed.");
		jobs.update(job.id(), None, Some("Band"), None).expect("Update failed.");

		let job = jobs.job(job.id()).expect("Job failed.");
		let json = serde_json::to_value(&job).expect("Serialization failed.");
		assert_eq!(json["id"], 1);
		assert_eq!(json["name"], "cd_00001");
		assert_eq!(json["phase"], "INITIALIZING");
		assert_eq!(json["artist"], "Band");
		assert!(json["album"].is_null());
	}
}
