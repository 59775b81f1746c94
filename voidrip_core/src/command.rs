/*!
# Void Rip: External Commands

Extraction and encoding are handed off to the usual suspects: `cdrdao`,
`cdparanoia`, `sox`, and `flac`. Everything else only ever sees them through
the [`Command`] trait.
*/

use crate::VoidRipError;
use std::{
	fmt,
	path::{
		Path,
		PathBuf,
	},
	process::Stdio,
};



/// # Known Programs (name, default path).
const PROGRAMS: [(&str, &str); 4] = [
	("cdparanoia", "/usr/bin/cdparanoia"),
	("cdrdao", "/usr/bin/cdrdao"),
	("flac", "/usr/bin/flac"),
	("sox", "/usr/bin/sox"),
];



/// # External Command.
pub trait Command: fmt::Debug {
	/// # Name.
	///
	/// This is the program's short name, e.g. `sox`.
	fn name(&self) -> &str;

	/// # Run.
	///
	/// Run the program with the given arguments from within `cwd`.
	///
	/// ## Errors
	///
	/// Returns an error if the program could not be run at all. A non-zero
	/// exit is _not_ an error at this level; see [`CommandOutput::check`].
	fn run(&self, args: &[String], cwd: &Path) -> Result<CommandOutput, VoidRipError>;
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Command Output.
pub struct CommandOutput {
	/// # Exit Code.
	///
	/// Programs killed by a signal report `-1`.
	pub code: i32,

	/// # STDOUT.
	pub stdout: String,

	/// # STDERR.
	pub stderr: String,
}

impl CommandOutput {
	#[must_use]
	/// # Success?
	pub const fn is_success(&self) -> bool { self.code == 0 }

	/// # Check.
	///
	/// Pass successful output through, turning failures into errors.
	///
	/// ## Errors
	///
	/// Returns an error with the exit code and STDERR if the program failed.
	pub fn check(self, name: &str) -> Result<Self, VoidRipError> {
		if self.is_success() { Ok(self) }
		else {
			Err(VoidRipError::Command(name.to_owned(), self.code, self.stderr.trim().to_owned()))
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # System Command.
///
/// A real program on the real filesystem.
pub struct SystemCommand {
	/// # Name.
	name: String,

	/// # Path.
	path: PathBuf,
}

impl Command for SystemCommand {
	fn name(&self) -> &str { &self.name }

	fn run(&self, args: &[String], cwd: &Path) -> Result<CommandOutput, VoidRipError> {
		let out = std::process::Command::new(&self.path)
			.args(args)
			.current_dir(cwd)
			.stdin(Stdio::null())
			.output()
			.map_err(|_| VoidRipError::CommandSpawn(self.path.to_string_lossy().into_owned()))?;

		Ok(CommandOutput {
			code: out.status.code().unwrap_or(-1),
			stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
			stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
		})
	}
}

impl SystemCommand {
	#[must_use]
	/// # New.
	///
	/// Return the command for one of the known programs, or `None` if the
	/// name isn't one of them.
	pub fn new(name: &str) -> Option<Self> {
		PROGRAMS.iter()
			.find(|(k, _)| *k == name)
			.map(|(k, v)| Self { name: (*k).to_owned(), path: PathBuf::from(v) })
	}

	#[must_use]
	/// # With Path.
	///
	/// Point a command at a specific binary.
	pub fn with_path<S, P>(name: S, path: P) -> Self
	where S: AsRef<str>, P: AsRef<Path> {
		Self {
			name: name.as_ref().to_owned(),
			path: path.as_ref().to_path_buf(),
		}
	}

	#[must_use]
	/// # Path.
	pub fn path(&self) -> &Path { &self.path }

	/// # All Known Programs.
	pub fn all() -> impl Iterator<Item=Self> {
		PROGRAMS.iter()
			.map(|(k, v)| Self { name: (*k).to_owned(), path: PathBuf::from(v) })
	}
}
