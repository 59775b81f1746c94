/*!
# Void Rip: Read Offset
*/

use crate::VoidRipError;
use dactyl::traits::BytesToSigned;
use std::fmt;



/// # Min Offset.
const MIN_OFFSET: i16 = -5880;

/// # Max Offset.
const MAX_OFFSET: i16 = 5880;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Read Offset.
///
/// This holds a drive's read offset in samples. Positive values mean the
/// drive returns data from _later_ in the stream than requested, so the
/// correct audio for a given position is found that many samples further on.
///
/// For historical reasons, values are restricted to `-5880..=5880`.
pub struct ReadOffset(pub(crate) i16);

impl fmt::Display for ReadOffset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if 0 < self.0 { write!(f, "+{}", self.0) }
		else { write!(f, "{}", self.0) }
	}
}

impl TryFrom<i16> for ReadOffset {
	type Error = VoidRipError;
	fn try_from(src: i16) -> Result<Self, Self::Error> {
		if (MIN_OFFSET..=MAX_OFFSET).contains(&src) { Ok(Self(src)) }
		else { Err(VoidRipError::ReadOffset) }
	}
}

impl TryFrom<&[u8]> for ReadOffset {
	type Error = VoidRipError;
	fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
		// A leading plus is allowed, but the parser doesn't like it.
		let src = src.trim_ascii();
		let src = src.strip_prefix(b"+").unwrap_or(src);
		if src.is_empty() { Ok(Self(0)) }
		else {
			i16::btoi(src)
				.ok_or(VoidRipError::ReadOffset)
				.and_then(Self::try_from)
		}
	}
}

impl TryFrom<&str> for ReadOffset {
	type Error = VoidRipError;
	fn try_from(src: &str) -> Result<Self, Self::Error> {
		Self::try_from(src.as_bytes())
	}
}

impl ReadOffset {
	#[must_use]
	/// # Is Negative?
	pub const fn is_negative(self) -> bool { self.0 < 0 }

	#[must_use]
	/// # Samples.
	pub const fn samples(self) -> i16 { self.0 }

	#[must_use]
	/// # Samples (Absolute).
	pub const fn samples_abs(self) -> u16 { self.0.unsigned_abs() }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_parse() {
		for (raw, expected) in [
			("", Some(0)),
			("0", Some(0)),
			("6", Some(6)),
			("+667", Some(667)),
			(" -1164 ", Some(-1164)),
			("5880", Some(5880)),
			("-5880", Some(-5880)),
			("5881", None),
			("-5881", None),
			("twelve", None),
		] {
			assert_eq!(
				ReadOffset::try_from(raw).ok().map(ReadOffset::samples),
				expected,
				"Read offset {raw:?} parsed wrong.",
			);
		}
	}

	#[test]
	fn t_display() {
		assert_eq!(ReadOffset(30).to_string(), "+30");
		assert_eq!(ReadOffset(0).to_string(), "0");
		assert_eq!(ReadOffset(-472).to_string(), "-472");
		assert_eq!(ReadOffset(-472).samples_abs(), 472);
		assert!(ReadOffset(-1).is_negative());
	}
}
