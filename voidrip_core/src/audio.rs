/*!
# Void Rip: Audio Sources

Checksums are computed over "samples", i.e. 16-bit stereo pairs packed into
a little-endian `u32`: the right channel in the high half, the left in the
low half.

Reads are allowed to run off either end of the source; anything outside it
is treated as silence.
*/

use crate::{
	VoidRipError,
	WAVE_SPEC,
};
use hound::WavReader;
use std::{
	fmt,
	fs::File,
	io::BufReader,
	path::Path,
};



/// # Audio Source.
pub trait AudioSource {
	/// # Length (Samples).
	fn len_samples(&self) -> u64;

	/// # Read Samples.
	///
	/// Return `len` samples starting at `start`, zero-padded wherever the
	/// range falls outside the source.
	///
	/// ## Errors
	///
	/// Implementations should return an error if the underlying read fails.
	fn read_samples(&mut self, start: i64, len: usize) -> Result<Vec<u32>, VoidRipError>;
}

impl AudioSource for [u32] {
	fn len_samples(&self) -> u64 { self.len() as u64 }

	#[allow(clippy::cast_possible_truncation)]
	fn read_samples(&mut self, start: i64, len: usize) -> Result<Vec<u32>, VoidRipError> {
		let mut out = vec![0; len];
		if let Some((dst, src, count)) = overlap(start, len, self.len_samples()) {
			let src = src as usize;
			out[dst..dst + count].copy_from_slice(&self[src..src + count]);
		}
		Ok(out)
	}
}



/// # WAV File.
///
/// This must be plain CD audio: 16-bit, stereo, 44.1kHz.
pub struct WavAudio {
	/// # Source Name.
	name: String,

	/// # Reader.
	reader: WavReader<BufReader<File>>,
}

impl fmt::Debug for WavAudio {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WavAudio")
			.field("name", &self.name)
			.field("spec", &self.reader.spec())
			.finish_non_exhaustive()
	}
}

impl AudioSource for WavAudio {
	fn len_samples(&self) -> u64 { u64::from(self.reader.duration()) }

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn read_samples(&mut self, start: i64, len: usize) -> Result<Vec<u32>, VoidRipError> {
		let mut out = vec![0; len];
		let Some((dst, src, count)) = overlap(start, len, self.len_samples()) else {
			return Ok(out);
		};

		let err = || VoidRipError::Audio(self.name.clone());
		self.reader.seek(src as u32).map_err(|_| err())?;

		let mut iter = self.reader.samples::<i16>();
		for slot in &mut out[dst..dst + count] {
			let left = iter.next().and_then(Result::ok).ok_or_else(err)?;
			let right = iter.next().and_then(Result::ok).ok_or_else(err)?;
			*slot = sample(left, right);
		}

		Ok(out)
	}
}

impl WavAudio {
	/// # Open.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be opened or isn't CD audio.
	pub fn open<P>(src: P) -> Result<Self, VoidRipError>
	where P: AsRef<Path> {
		let src = src.as_ref();
		let name = src.to_string_lossy().into_owned();
		let reader = WavReader::open(src)
			.map_err(|_| VoidRipError::Audio(name.clone()))?;

		let spec = reader.spec();
		if spec != WAVE_SPEC {
			return Err(VoidRipError::AudioFormat(format!(
				"{name} is {}-channel {}-bit {}Hz",
				spec.channels,
				spec.bits_per_sample,
				spec.sample_rate,
			)));
		}

		Ok(Self { name, reader })
	}
}



#[must_use]
#[allow(clippy::cast_sign_loss)]
/// # Pack Sample.
///
/// Combine the left and right channels into a single checksum sample.
pub const fn sample(left: i16, right: i16) -> u32 {
	((right as u16 as u32) << 16) | (left as u16 as u32)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
/// # Overlap.
///
/// Figure out where a read of `len` samples from `start` intersects a source
/// `total` samples long, returning the destination index, source index, and
/// count, or `None` if they don't touch.
fn overlap(start: i64, len: usize, total: u64) -> Option<(usize, u64, usize)> {
	let end = start.checked_add(len as i64)?;
	let from = start.max(0);
	let to = end.min(total as i64);
	if to <= from { return None; }

	Some(((from - start) as usize, from as u64, (to - from) as usize))
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_sample() {
		assert_eq!(sample(0, 0), 0);
		assert_eq!(sample(1, 0), 1);
		assert_eq!(sample(0, 1), 0x0001_0000);
		assert_eq!(sample(-1, 0), 0x0000_FFFF);
		assert_eq!(sample(-2, -1), 0xFFFF_FFFE);
	}

	#[test]
	fn t_overlap() {
		assert_eq!(overlap(0, 4, 10), Some((0, 0, 4)));
		assert_eq!(overlap(-2, 4, 10), Some((2, 0, 2)));
		assert_eq!(overlap(8, 4, 10), Some((0, 8, 2)));
		assert_eq!(overlap(-5, 20, 10), Some((5, 0, 10)));
		assert_eq!(overlap(-5, 5, 10), None);
		assert_eq!(overlap(10, 5, 10), None);
	}

	#[test]
	fn t_slice() {
		let mut data: Vec<u32> = (1..=10).collect();
		let src = data.as_mut_slice();
		assert_eq!(src.read_samples(-2, 4).ok(), Some(vec![0, 0, 1, 2]));
		assert_eq!(src.read_samples(8, 4).ok(), Some(vec![9, 10, 0, 0]));
		assert_eq!(src.read_samples(20, 2).ok(), Some(vec![0, 0]));
	}

	#[test]
	fn t_wav() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let dst = dir.path().join("test.wav");
		{
			let mut writer = hound::WavWriter::create(&dst, WAVE_SPEC).expect("WAV failed.");
			for v in [1_i16, 2, 3, 4, -1, -2] { writer.write_sample(v).expect("Write failed."); }
			writer.finalize().expect("Finalize failed.");
		}

		let mut wav = WavAudio::open(&dst).expect("Open failed.");
		assert_eq!(wav.len_samples(), 3);
		assert_eq!(
			wav.read_samples(1, 4).ok(),
			Some(vec![sample(3, 4), sample(-1, -2), 0, 0]),
		);
		assert_eq!(wav.read_samples(-1, 2).ok(), Some(vec![0, sample(1, 2)]));

		// Mono is no good.
		let dst = dir.path().join("mono.wav");
		{
			let spec = hound::WavSpec { channels: 1, ..WAVE_SPEC };
			let mut writer = hound::WavWriter::create(&dst, spec).expect("WAV failed.");
			writer.write_sample(1_i16).expect("Write failed.");
			writer.finalize().expect("Finalize failed.");
		}
		assert!(matches!(WavAudio::open(&dst), Err(VoidRipError::AudioFormat(_))));
	}
}
