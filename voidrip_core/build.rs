/*!
# Void Rip: Build

This downloads and parses the AccurateRip drive offset list into a constant
array that can be easily searched at runtime.

If the download fails (e.g. an offline build), the abridged list in
`skel/drive-offsets.txt` is used instead.
*/

use cdtoc::AccurateRip;
use std::{
	collections::BTreeMap,
	env,
	fs::{
		File,
		Metadata,
	},
	io::{
		Read,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
};



/// # Glumped Vendor/Model.
///
/// This mirrors the DriveVendorModel type in the living program.
type VendorModel = [u8; 24];



/// # Main.
fn main() {
	println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
	println!("cargo:rerun-if-changed=skel");

	let offsets = fetch_offsets()
		.map(|raw| parse_offsets(&raw))
		.filter(|parsed| ! parsed.is_empty())
		.unwrap_or_else(|| {
			println!("cargo:warning=Using the abridged drive offset list.");
			parse_skel_offsets()
		});

	// Announce the totals for reference.
	if env::var("SHOW_TOTALS").is_ok() {
		println!("cargo:warning=Read Offsets: {}", offsets.len());
	}

	// Save it!
	let data = nice_offsets(offsets);
	File::create(out_path("drives.rs"))
		.and_then(|mut f| f.write_all(data.as_bytes()).and_then(|_| f.flush()))
		.expect("Unable to save drive data.");
}



/// # Download/Cache Raw Data.
///
/// This will try to pull the data from the build cache if it exists, otherwise
/// it will download it fresh (and save it to the build cache for next time).
fn fetch_offsets() -> Option<Vec<u8>> {
	// Pull from cache?
	let cache = out_path("DriveOffsets.bin");
	if let Some(x) = try_cache(&cache) { return Some(x); }

	// Download it fresh.
	let res = ureq::get(AccurateRip::DRIVE_OFFSET_URL)
		.set("user-agent", "Mozilla/5.0")
		.timeout(std::time::Duration::from_secs(30))
		.call()
		.ok()?;

	let mut out = Vec::new();
	res.into_reader().read_to_end(&mut out).ok()?;
	if out.is_empty() { return None; }

	// Try to cache for next time.
	let _res = File::create(cache)
		.and_then(|mut f| f.write_all(&out).and_then(|_| f.flush()));

	Some(out)
}

/// # Nice Drive Offsets.
///
/// Reformat the offsets as Rust code that can be included directly in a
/// library script.
///
/// The generated code takes the form of a static array, allowing for
/// reasonably fast and straightforward binary search at runtime.
fn nice_offsets(parsed: BTreeMap<VendorModel, i16>) -> String {
	use std::fmt::Write;

	// Reformat the data into "code" for the array we're about to generate.
	let nice = parsed.into_iter()
		.map(|(vendormodel, offset)|
			format!("(DriveVendorModel({vendormodel:?}), ReadOffset({offset})),")
		)
		.collect::<Vec<String>>();

	// Start the array.
	let mut out = format!(
		r#"
/// # Drive Offsets.
const DRIVE_OFFSETS: [(DriveVendorModel, ReadOffset); {}] = ["#,
		nice.len(),
	);

	// One entry per line keeps the output readable.
	for line in nice {
		write!(&mut out, "\n\t{line}").expect("Failed to write string.");
	}

	// Close out the array.
	out.push_str("\n];\n");
	out
}

/// # Out path.
///
/// This generates a (file/dir) path relative to `OUT_DIR`.
fn out_path(name: &str) -> PathBuf {
	let dir = env::var("OUT_DIR").expect("Missing OUT_DIR.");
	let mut out = std::fs::canonicalize(dir).expect("Missing OUT_DIR.");
	out.push(name);
	out
}

/// # Parse Drive Offsets.
///
/// The raw bin data is stored in fixed-length chunks of 69 bytes that break
/// down as follows:
/// * 02 byte i16 offset
/// * 32 byte glumped vendor/model string
/// * 01 byte string terminator
/// * 01 byte u8 submission count
/// * 33 bytes (unused by the look of it)
///
/// CDTOC does the heavy lifting; we just uppercase the vendor/model pairs for
/// case-insensitive searching. Zero-offset entries are kept, since an unknown
/// drive is an error.
fn parse_offsets(raw: &[u8]) -> BTreeMap<VendorModel, i16> {
	let Ok(parsed) = AccurateRip::parse_drive_offsets(raw) else {
		println!("cargo:warning=Unable to parse the AccurateRip drive offsets.");
		return BTreeMap::new();
	};

	parsed.into_iter()
		.filter_map(|((v, m), o)| {
			if 8 < v.len() || m.is_empty() || 16 < m.len() || ! (-5880..=5880).contains(&o) {
				return None;
			}

			let mut vm = VendorModel::default();
			for (old, new) in vm.iter_mut().zip(v.bytes()) {
				*old = new.to_ascii_uppercase();
			}
			for (old, new) in vm.iter_mut().skip(8).zip(m.bytes()) {
				*old = new.to_ascii_uppercase();
			}
			Some((vm, o))
		})
		.collect()
}

/// # Parse Abridged Drive Offsets.
///
/// The list is tab-separated: vendor, model, offset. Blank lines and lines
/// starting with a `#` are ignored.
fn parse_skel_offsets() -> BTreeMap<VendorModel, i16> {
	let raw = std::fs::read_to_string("skel/drive-offsets.txt")
		.expect("Unable to open skel/drive-offsets.txt");

	let mut parsed: BTreeMap<VendorModel, i16> = BTreeMap::new();
	for line in raw.lines() {
		if line.trim().is_empty() || line.starts_with('#') { continue; }
		let Some((vm, offset)) = parse_offset_line(line) else {
			println!("cargo:warning=Invalid offset line: {line}.");
			continue;
		};
		if parsed.insert(vm, offset).is_some() {
			println!("cargo:warning=Duplicate offset line: {line}.");
		}
	}

	// Make sure we parsed something.
	assert!(! parsed.is_empty(), "No drive offsets could be parsed.");

	// Done!
	parsed
}

/// # Parse a Single Offset Entry.
fn parse_offset_line(line: &str) -> Option<(VendorModel, i16)> {
	let mut parts = line.split('\t');
	let v = parts.next()?.trim();
	let m = parts.next()?.trim();
	let o = parts.next()?.trim();
	if parts.next().is_some() || ! v.is_ascii() || ! m.is_ascii() { return None; }
	if 8 < v.len() || m.is_empty() || 16 < m.len() { return None; }

	// Offsets are restricted to ±5880, same as ReadOffset.
	let o: i16 = o.strip_prefix('+').unwrap_or(o).parse().ok()?;
	if ! (-5880..=5880).contains(&o) { return None; }

	// Uppercase and pad, vendor first.
	let mut vm = VendorModel::default();
	for (old, new) in vm.iter_mut().zip(v.bytes()) {
		*old = new.to_ascii_uppercase();
	}
	for (old, new) in vm.iter_mut().skip(8).zip(m.bytes()) {
		*old = new.to_ascii_uppercase();
	}

	Some((vm, o))
}

/// # Try Cache.
///
/// Return a previously-cached copy of the raw data (from `target`), unless it
/// doesn't exist or was generated more than a day ago.
fn try_cache(path: &Path) -> Option<Vec<u8>> {
	std::fs::metadata(path)
		.ok()
		.filter(Metadata::is_file)
		.and_then(|meta| meta.modified().ok())
		.and_then(|time| time.elapsed().ok().filter(|secs| secs.as_secs() < 86400))
		.and_then(|_| std::fs::read(path).ok())
}
