/*!
# Void Rip: Addressing

CDs can be addressed a few different ways:
* LBA: absolute sector position, with track one starting at `150`;
* LSN: the LBA minus the two-second lead-in;
* MSF: minutes, seconds, and frames (sectors), 75 frames per second;
* Samples: the LSN times `588`.

The conversions are all exact integer math.
*/

use crate::{
	CD_LEADIN,
	SAMPLES_PER_SECTOR,
	SECTORS_PER_SECOND,
};
use serde::{
	Serialize,
	Serializer,
};
use std::fmt;



/// # Frames Per Minute.
const FRAMES_PER_MINUTE: i32 = SECTORS_PER_SECOND as i32 * 60;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Minutes/Seconds/Frames.
pub struct Msf {
	/// # Minutes.
	pub min: i32,

	/// # Seconds.
	pub sec: i32,

	/// # Frames.
	pub frame: i32,
}

impl fmt::Display for Msf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02}:{:02}", self.min, self.sec, self.frame)
	}
}

impl Serialize for Msf {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		serializer.collect_str(self)
	}
}

impl Msf {
	#[must_use]
	/// # New.
	pub const fn new(min: i32, sec: i32, frame: i32) -> Self {
		Self { min, sec, frame }
	}
}



#[must_use]
#[allow(clippy::integer_division)]
/// # LBA to MSF.
///
/// Minutes are peeled off first, then seconds, with whatever's left being the
/// frame.
pub const fn lba_to_msf(lba: i32) -> Msf {
	let min = lba / FRAMES_PER_MINUTE;
	let rem = lba - min * FRAMES_PER_MINUTE;
	let sec = rem / SECTORS_PER_SECOND as i32;
	let frame = rem - sec * SECTORS_PER_SECOND as i32;
	Msf { min, sec, frame }
}

#[must_use]
/// # MSF to LBA.
pub const fn msf_to_lba(msf: Msf) -> i32 {
	msf.min * FRAMES_PER_MINUTE + msf.sec * SECTORS_PER_SECOND as i32 + msf.frame
}

#[must_use]
/// # LBA to LSN.
pub const fn lba_to_lsn(lba: i32) -> i32 { lba - CD_LEADIN as i32 }

#[must_use]
/// # LSN to LBA.
pub const fn lsn_to_lba(lsn: i32) -> i32 { lsn + CD_LEADIN as i32 }

#[must_use]
/// # LSN to Sample.
pub const fn lsn_to_sample(lsn: i32) -> i64 { lsn as i64 * SAMPLES_PER_SECTOR as i64 }

#[must_use]
/// # LBA to Sample.
pub const fn lba_to_sample(lba: i32) -> i64 { lsn_to_sample(lba_to_lsn(lba)) }



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_msf() {
		for (lba, msf) in [
			(0, Msf::new(0, 0, 0)),
			(74, Msf::new(0, 0, 74)),
			(75, Msf::new(0, 1, 0)),
			(150, Msf::new(0, 2, 0)),
			(4499, Msf::new(0, 59, 74)),
			(4500, Msf::new(1, 0, 0)),
			(95462, Msf::new(21, 12, 62)),
		] {
			assert_eq!(lba_to_msf(lba), msf, "LBA {lba} converted wrong.");
			assert_eq!(msf_to_lba(msf), lba, "MSF {msf} converted wrong.");
		}

		assert_eq!(Msf::new(21, 12, 62).to_string(), "21:12:62");
		assert_eq!(Msf::new(1, 2, 3).to_string(), "01:02:03");
	}

	#[test]
	fn t_lsn() {
		for x in [-150, -1, 0, 1, 150, 95_462, 360_000] {
			assert_eq!(lba_to_lsn(lsn_to_lba(x)), x, "LSN/LBA round trip failed.");
		}
		assert_eq!(lba_to_lsn(150), 0);
		assert_eq!(lsn_to_lba(0), 150);
		assert_eq!(lsn_to_sample(10), 5880);
		assert_eq!(lba_to_sample(150), 0);
		assert_eq!(lba_to_sample(151), 588);
		assert_eq!(lba_to_sample(0), -88_200);
	}

	#[test]
	fn t_msf_serialize() {
		let json = serde_json::to_string(&Msf::new(3, 4, 5)).expect("Serialization failed.");
		assert_eq!(json, "\"03:04:05\"");
	}
}
