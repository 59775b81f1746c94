/*!
# Void Rip: Drives
*/

use crate::{
	ReadOffset,
	VoidRipError,
};
use std::fmt;
use trimothy::TrimSliceMatches;



include!(concat!(env!("OUT_DIR"), "/drives.rs"));



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Drive Vendor and Model.
///
/// This is a combined vendor/model string, formatted the way AccurateRip
/// does it: eight bytes of vendor followed by sixteen bytes of model, both
/// uppercased and null-padded.
pub struct DriveVendorModel([u8; 24]);

impl fmt::Display for DriveVendorModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let vendor = self.vendor();
		let model = self.model();
		if vendor.is_empty() { f.write_str(model) }
		else { write!(f, "{vendor} {model}") }
	}
}

impl TryFrom<&str> for DriveVendorModel {
	type Error = VoidRipError;

	/// # From "VENDOR:MODEL".
	///
	/// A string without a colon is treated as a vendorless model.
	fn try_from(src: &str) -> Result<Self, Self::Error> {
		match src.split_once(':') {
			Some((v, m)) => Self::new(v, m),
			None => Self::new("", src),
		}
	}
}

impl DriveVendorModel {
	/// # New.
	///
	/// ## Errors
	///
	/// This will return an error if the vendor is longer than eight bytes, the
	/// model is empty or longer than sixteen bytes, or either contains
	/// non-ASCII characters.
	pub fn new(vendor: &str, model: &str) -> Result<Self, VoidRipError> {
		let vendor = vendor.trim().as_bytes();
		let model = model.trim().as_bytes();

		if 8 < vendor.len() || ! vendor.is_ascii() {
			return Err(VoidRipError::DriveVendor);
		}
		if model.is_empty() || 16 < model.len() || ! model.is_ascii() {
			return Err(VoidRipError::DriveModel);
		}

		let mut out = [0_u8; 24];
		for (old, new) in out.iter_mut().zip(vendor) {
			*old = new.to_ascii_uppercase();
		}
		for (old, new) in out.iter_mut().skip(8).zip(model) {
			*old = new.to_ascii_uppercase();
		}

		Ok(Self(out))
	}

	#[must_use]
	/// # Vendor.
	pub fn vendor(&self) -> &str {
		std::str::from_utf8(self.0[..8].trim_end_matches(|b| b == 0))
			.unwrap_or_default()
	}

	#[must_use]
	/// # Model.
	pub fn model(&self) -> &str {
		std::str::from_utf8(self.0[8..].trim_end_matches(|b| b == 0))
			.unwrap_or_default()
	}

	/// # Detect Offset.
	///
	/// Look up the drive's read offset in the AccurateRip-derived table.
	///
	/// ## Errors
	///
	/// Unknown drives return an error; the caller will need to supply an
	/// offset explicitly.
	pub fn detect_offset(&self) -> Result<ReadOffset, VoidRipError> {
		DRIVE_OFFSETS.binary_search_by(|(vm, _)| vm.cmp(self))
			.map(|idx| DRIVE_OFFSETS[idx].1)
			.map_err(|_| VoidRipError::DriveOffset(self.to_string()))
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_sorted() {
		assert!(
			DRIVE_OFFSETS.windows(2).all(|w| w[0].0 < w[1].0),
			"Drive offsets are not sorted/unique.",
		);
	}

	#[test]
	fn t_detect_offset() {
		let vm = DriveVendorModel::new("plextor", "dvdr   px-716a").expect("Invalid vendor/model.");
		assert_eq!(vm.vendor(), "PLEXTOR");
		assert_eq!(vm.model(), "DVDR   PX-716A");
		assert_eq!(vm.to_string(), "PLEXTOR DVDR   PX-716A");
		assert_eq!(vm.detect_offset(), Ok(ReadOffset(30)));

		let vm = DriveVendorModel::try_from("PIONEER:BD-RW   BDR-209D").expect("Invalid vendor/model.");
		assert_eq!(vm.detect_offset(), Ok(ReadOffset(667)));

		let vm = DriveVendorModel::try_from("NOBODY:NOTHING").expect("Invalid vendor/model.");
		assert_eq!(
			vm.detect_offset(),
			Err(VoidRipError::DriveOffset("NOBODY NOTHING".to_owned())),
		);
	}

	#[test]
	fn t_invalid() {
		assert_eq!(DriveVendorModel::new("TOOLONGVENDOR", "X"), Err(VoidRipError::DriveVendor));
		assert_eq!(DriveVendorModel::new("ASUS", ""), Err(VoidRipError::DriveModel));
		assert_eq!(
			DriveVendorModel::new("ASUS", "THIS MODEL IS FAR TOO LONG"),
			Err(VoidRipError::DriveModel),
		);
	}
}
