/*!
# Void Rip: Cache
*/

use crate::{
	CACHE_BASE,
	VoidRipError,
};
use fyi_msg::Msg;
use std::{
	io::Write,
	path::{
		Path,
		PathBuf,
	},
	sync::OnceLock,
};
use tempfile::NamedTempFile;



/// # Cache Root.
///
/// This will ultimately hold `CWD/CACHE_BASE`.
static CACHE_ROOT: OnceLock<Option<PathBuf>> = OnceLock::new();



/// # Cache Path.
///
/// Glue `src` onto the cache path and return it.
///
/// ## Errors
///
/// This will return an error if the cache root cannot be established.
pub fn cache_path<P>(src: P) -> Result<PathBuf, VoidRipError>
where P: AsRef<Path> {
	cache_root().map(|root| root.join(src))
}

/// # Write Atomically.
///
/// Write the data to a temporary file in the destination's directory, then
/// move it into place, so readers never see a partial file. The parent
/// directory is created if needed.
///
/// ## Errors
///
/// Returns an error if any part of the write fails.
pub(crate) fn write_atomic(dst: &Path, data: &[u8]) -> Result<(), VoidRipError> {
	let err = || VoidRipError::Write(dst.to_string_lossy().into_owned());
	let parent = dst.parent().ok_or_else(err)?;
	if ! parent.is_dir() { std::fs::create_dir_all(parent).map_err(|_| err())?; }

	let mut tmp = NamedTempFile::new_in(parent).map_err(|_| err())?;
	tmp.write_all(data)
		.and_then(|()| tmp.as_file().sync_all())
		.map_err(|_| err())?;
	tmp.persist(dst).map_err(|_| err())?;
	Ok(())
}

/// # Cache Root.
///
/// Return the canonical cache root for the program, creating it if it doesn't
/// already exist.
///
/// ## Errors
///
/// This will return an error if the path cannot be determined or the current
/// working directory does not exist.
fn cache_root() -> Result<&'static Path, VoidRipError> {
	let out = CACHE_ROOT.get_or_init(|| {
		// The base must already exist.
		let dir = std::env::current_dir().ok()?;
		if ! dir.is_dir() { return None; }

		// Our root.
		let dir = dir.join(CACHE_BASE);

		// Make it if necessary.
		if ! dir.is_dir() {
			std::fs::create_dir_all(&dir).ok()?;
		}

		// Make sure it is really there.
		std::fs::canonicalize(dir).ok()
	})
		.as_deref()
		.ok_or(VoidRipError::Cache)?;

	if out.is_dir() { Ok(out) }
	// It seems to have vanished. Try to recreate it.
	else {
		Msg::warning(format!("The {CACHE_BASE} cache directory has vanished!")).eprint();
		std::fs::create_dir_all(out).map_err(|_| VoidRipError::Cache)?;
		if out.is_dir() { Ok(out) }
		else { Err(VoidRipError::Cache) }
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_write_atomic() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let dst = dir.path().join("nested/file.bin");

		write_atomic(&dst, b"hello").expect("Write failed.");
		assert_eq!(std::fs::read(&dst).ok(), Some(b"hello".to_vec()));

		// Replacement.
		write_atomic(&dst, b"bye").expect("Write failed.");
		assert_eq!(std::fs::read(&dst).ok(), Some(b"bye".to_vec()));

		// Only the one file should be left behind.
		let count = std::fs::read_dir(dst.parent().expect("Missing parent."))
			.expect("Read dir failed.")
			.count();
		assert_eq!(count, 1, "Temporary files were left behind.");
	}
}
