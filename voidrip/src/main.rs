/*!
# Void Rip
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;

use cli::Parsed;
use fyi_msg::{
	fyi_ansi::{
		ansi,
		dim,
	},
	Msg,
};
use oxford_join::OxfordJoin;
use std::{
	path::PathBuf,
	process::ExitCode,
};
use utc2k::FmtUtc2k;
use voidrip_core::{
	AccurateRipResults,
	CACHE_ACCURATERIP,
	CACHE_WORK,
	ChecksumMatcher,
	Disc,
	MusicBrainz,
	RipJob,
	RipJobs,
	RipOptions,
	Ripper,
	Verification,
	VoidRipError,
	WavAudio,
};



/// # A Divider Line.
///
/// This is used to encase the drive vendor/model during summary. We'll slice
/// it to match the length rather than `"-".repeat()` or whatever.
const DIVIDER: &str = "-------------------------";



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (VoidRipError::PrintHelp | VoidRipError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), VoidRipError> {
	let Parsed {
		opts, disc, dev, wav, bin, status_dir, artist, album, no_musicbrainz, no_rip,
	} = cli::parse()?;

	// Show the disc.
	if opts.json() { println!("{}", disc.to_json()?); }
	else { print_disc(&disc); }

	// Go ahead and leave if there's no ripping to do.
	if no_rip { return Ok(()); }
	if opts.rip() && dev.is_none() { return Err(VoidRipError::Device); }

	// Start a job.
	let jobs = match status_dir {
		Some(dir) => RipJobs::new(dir, voidrip_core::cache_path(CACHE_WORK)?),
		None => RipJobs::from_cache()?,
	};
	let jobs = jobs.with_lock_timeout(opts.lock_timeout());
	let job = start_job(&jobs, &disc, &opts, artist.as_deref(), album.as_deref())?;
	Msg::info(format!("Started {} in {}.", job.id(), job.dir().display())).eprint();

	// Rip or adopt.
	let mut ripper = Ripper::new(&disc, &jobs, &job);
	if let Some(d) = dev { ripper = ripper.with_device(d); }
	if ! no_musicbrainz { ripper = ripper.with_lookup(MusicBrainz); }
	let wav = match wav {
		Some(w) => ripper.adopt(&w)?,
		None => ripper.rip()?,
	};

	// Verify.
	let results = accuraterip_results(&disc, bin)?;
	if results.is_none() {
		Msg::warning(format!("{} is not in the AccurateRip database.", disc.id_accuraterip())).eprint();
	}
	let matcher = ChecksumMatcher::new(opts.confidence());
	let mut audio = WavAudio::open(&wav)?;
	let mut verification = matcher.verify(&disc, results.as_ref(), &mut audio)?;

	// Re-rip and re-verify individual tracks, if requested.
	if opts.has_tracks() {
		for idx in opts.tracks() {
			let dst = ripper.rip_track(idx)?;
			let mut audio = WavAudio::open(&dst)?;
			let m = matcher.verify_track(&disc, idx, results.as_ref(), &mut audio)?;
			Msg::info(format!(
				"Re-ripped track #{idx} to {} (confidence {}).",
				dst.display(),
				m.confidence,
			)).eprint();
			verification.replace_track(m);
		}
	}

	if opts.json() { println!("{}", verification.to_json()?); }
	else if opts.verbose() { print_verification(&disc, &verification); }

	// Finish up.
	let flac = ripper.finish(&verification, opts.flac())?;
	Msg::success(flac.map_or_else(
		|| format!("{} is accurate!", job.id()),
		|p| format!("{} is accurate! The archive is at {}.", job.id(), p.display()),
	)).eprint();

	Ok(())
}

/// # Start Job.
///
/// Allocate a job, record what we know, and claim the disc in the ledger.
/// Duplicates abort the run unless explicitly allowed.
fn start_job(
	jobs: &RipJobs,
	disc: &Disc,
	opts: &RipOptions,
	artist: Option<&str>,
	album: Option<&str>,
) -> Result<RipJob, VoidRipError> {
	let job = jobs.allocate()?;
	if artist.is_some() || album.is_some() {
		jobs.update(job.id(), None, artist, album)?;
	}

	let mbid = disc.id_musicbrainz();
	let dupes = jobs.register_disc(job.id(), &mbid)?;
	if ! dupes.is_empty() {
		let msg = format!("{mbid} was already ripped by {}.", dupes.oxford_and());
		if opts.allow_duplicate() { Msg::warning(msg).eprint(); }
		else { return Err(VoidRipError::Duplicate(msg)); }
	}

	Ok(job)
}

/// # AccurateRip Results.
///
/// Load the checksums from a local file if one was given, otherwise fetch
/// (or reuse) them from the AccurateRip server.
fn accuraterip_results(disc: &Disc, bin: Option<PathBuf>)
-> Result<Option<AccurateRipResults>, VoidRipError> {
	let id = disc.id_accuraterip();
	if let Some(bin) = bin {
		let raw = std::fs::read(&bin)
			.map_err(|_| VoidRipError::CliParse("--bin"))?;
		return AccurateRipResults::decode(&raw, &id).map(Some);
	}

	let cache = voidrip_core::cache_path(CACHE_ACCURATERIP)?;
	voidrip_core::fetch_checksums(&id, &cache)
}

/// # Print Disc.
///
/// The drive (if any) gets a little header, then the disc summary.
fn print_disc(disc: &Disc) {
	if let Some(vm) = disc.drive_vendor_model() {
		let vm = vm.to_string();
		if ! vm.is_empty() && vm.len() <= DIVIDER.len() {
			eprintln!(
				concat!(
					ansi!((dim, cyan) "{}\n"),
					ansi!((bold, cyan) "{vm}\n"),
					ansi!((dim, cyan) "{}\n"),
				),
				&DIVIDER[..vm.len()],
				&DIVIDER[..vm.len()],
				vm=vm
			);
		}
	}

	eprintln!("{disc}");
}

/// # Print Verification.
///
/// Write the per-track details to STDOUT for the log.
fn print_verification(disc: &Disc, verification: &Verification) {
	use std::io::Write;

	let writer = std::io::stdout();
	let mut handle = writer.lock();

	let _res = writeln!(
		&mut handle,
		concat!("#####
## Void Rip v", env!("CARGO_PKG_VERSION"), "
## Disc:        {id}
## Date:        {date}
## Read Offset: {offset}
## Threshold:   {threshold}
#####"),
		id=verification.id(),
		date=FmtUtc2k::now(),
		offset=disc.read_offset().samples(),
		threshold=verification.threshold(),
	);

	for t in verification.tracks() {
		let flag =
			if verification.threshold() <= t.confidence { "" }
			else { dim!("  (low)") };
		let _res = writeln!(
			&mut handle,
			"{:02}  {:>3}  {:>+5}  {:08x}  {:08x}{flag}",
			t.track,
			t.confidence,
			t.offset,
			t.crc1,
			t.crc2,
		);
	}

	let _res = handle.flush();
}
