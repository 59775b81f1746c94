/*!
# Void Rip: Barcodes
*/

use crate::VoidRipError;
use serde::{
	Serialize,
	Serializer,
};
use std::fmt;
use trimothy::TrimSliceMatches;



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Barcode.
///
/// This is a simple wrapper for UPC/EAN barcodes (the disc's MCN) that
/// ensures validity and consistent formatting.
pub struct Barcode([u8; 13]);

impl fmt::Display for Barcode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = self.as_str();

		// Treat like UPC12 if the first digit is zero.
		if self.0[0] == b'0' {
			write!(f, "{}-{}-{}-{}", &s[1..2], &s[2..7], &s[7..12], &s[12..])
		}
		// Otherwise like an EAN13.
		else {
			write!(f, "{}-{}-{}", &s[..1], &s[1..7], &s[7..])
		}
	}
}

impl Serialize for Barcode {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		serializer.serialize_str(self.as_str())
	}
}

impl TryFrom<&[u8]> for Barcode {
	type Error = VoidRipError;
	fn try_from(mut src: &[u8]) -> Result<Self, Self::Error> {
		// Remove whitespace, leading *ASCII* zeroes, and trailing nulls. An
		// all-zero MCN is what drives report when there isn't one, and it
		// won't survive this.
		src = src.trim_start_matches(|b| b.is_ascii_whitespace() || b == b'0');
		src = src.trim_end_matches(|b| b.is_ascii_whitespace() || b == 0);

		// Make sure we've got 8-13 ASCII digits and nothing else.
		if ! (8..=13).contains(&src.len()) || ! src.iter().all(u8::is_ascii_digit) {
			return Err(VoidRipError::Barcode);
		}

		// Move the data into place, zero-padding the left as needed so that it
		// occupies thirteen bytes.
		let mut maybe = [b'0'; 13];
		maybe[13 - src.len()..].copy_from_slice(src);

		// Make sure it validates.
		if is_ean13(&maybe) { Ok(Self(maybe)) }
		else { Err(VoidRipError::Barcode) }
	}
}

impl TryFrom<&str> for Barcode {
	type Error = VoidRipError;

	#[inline]
	fn try_from(src: &str) -> Result<Self, Self::Error> {
		Self::try_from(src.as_bytes())
	}
}

impl Barcode {
	#[must_use]
	/// # From MCN.
	///
	/// Drives return MCNs as-is, garbage and all; anything that doesn't
	/// validate is treated as absent.
	pub fn from_mcn(src: &str) -> Option<Self> { Self::try_from(src).ok() }

	#[must_use]
	/// # As Str.
	///
	/// Return the thirteen digits without any formatting.
	pub fn as_str(&self) -> &str {
		std::str::from_utf8(self.0.as_slice()).unwrap_or_default()
	}
}



/// # Is EAN13?
fn is_ean13(src: &[u8; 13]) -> bool {
	let mut chk = 0;
	let mut total = 0;
	let mut k = 13;
	for num in src.iter().copied().rev() {
		k -= 1;

		// Convert ASCII to decimal. (TryFrom verifies all values are digits.)
		let num = num ^ b'0';

		// The last entry (the first we're checking) is the check digit.
		if k == 12 {
			if num == 0 { chk = 10; }
			else { chk = num; }
		}
		// Everything else goes into the total.
		else { total += ((k % 2) * 2 + 1) * num; }
	}

	10 - (total % 10) == chk
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_is_ean13() {
		for (raw, expected) in [
			(b"0008811126827", true),
			(b"0018861006529", true),
			(b"0075597996524", true),
			(b"0089218545555", false),
			(b"0731455829921", true),
			(b"0732455829921", false),
			(b"9332727016318", true),
		] {
			assert_eq!(
				is_ean13(raw),
				expected,
				"EAN13 check failed for {}.",
				String::from_utf8_lossy(raw),
			);
		}
	}

	#[test]
	fn t_format() {
		let bc = Barcode::try_from("9332727016318").expect("Barcode failed.");
		assert_eq!(bc.to_string(), "9-332727-016318");
		assert_eq!(bc.as_str(), "9332727016318");

		let bc = Barcode::try_from("0018861006529").expect("Barcode failed.");
		assert_eq!(bc.to_string(), "0-18861-00652-9");
	}

	#[test]
	fn t_mcn() {
		assert_eq!(Barcode::from_mcn("0000000000000"), None, "All-zero MCN should be none.");
		assert_eq!(Barcode::from_mcn(""), None);
		assert_eq!(Barcode::from_mcn("0732455829921"), None, "Invalid MCN should be none.");
		assert!(Barcode::from_mcn("0731455829921\0").is_some(), "Trailing nulls should be ignored.");
	}
}
