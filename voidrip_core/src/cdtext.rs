/*!
# Void Rip: CDText.
*/

use serde::{
	ser::{
		SerializeSeq,
		SerializeStruct,
	},
	Serialize,
	Serializer,
};
use std::{
	cmp::Ordering,
	collections::BTreeMap,
	fmt,
};



/// # Helper: CDText Fields.
macro_rules! fields {
	( $( $k:ident $v:literal $vstr:literal ),+ $(,)? ) => (
		#[repr(u8)]
		#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
		/// # CDText Field.
		///
		/// The discriminants are the pack types used on the disc.
		pub enum CDTextKind {
			$(
				#[doc = concat!("# ", stringify!($k), ".")]
				$k = $v,
			)+
		}

		impl CDTextKind {
			/// # All Fields.
			pub const ALL: [Self; 10] = [ $( Self::$k, )+ ];

			#[must_use]
			/// # As Str.
			///
			/// Return the field as an uppercase string, similar to how it would
			/// appear in track metadata.
			pub const fn as_str(self) -> &'static str {
				match self {
					$( Self::$k => $vstr, )+
				}
			}

			#[must_use]
			/// # From Pack Type.
			pub const fn from_u8(src: u8) -> Option<Self> {
				match src {
					$( $v => Some(Self::$k), )+
					_ => None,
				}
			}
		}
	);
}

fields! {
	Title      0x80 "TITLE",
	Performer  0x81 "ARTIST",
	Songwriter 0x82 "SONGWRITER",
	Composer   0x83 "COMPOSER",
	Arranger   0x84 "ARRANGER",
	Message    0x85 "COMMENT",
	DiscId     0x86 "DISCID",
	Genre      0x87 "GENRE",
	Isrc       0x8E "ISRC",
	Barcode    0x8F "BARCODE",
}

impl AsRef<str> for CDTextKind {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for CDTextKind {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}

impl Ord for CDTextKind {
	#[inline]
	fn cmp(&self, rhs: &Self) -> Ordering { self.as_str().cmp(rhs.as_str()) }
}

impl PartialOrd for CDTextKind {
	#[inline]
	fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> { Some(self.cmp(rhs)) }
}

impl Serialize for CDTextKind {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		serializer.serialize_str(self.as_str())
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # CDText Language.
///
/// Language codes are the EBU ones; the two values past the `u8` range are
/// what drives report for junk and empty blocks, respectively.
pub struct CDTextLanguage(u16);

impl fmt::Display for CDTextLanguage {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<u16> for CDTextLanguage {
	#[inline]
	fn from(src: u16) -> Self { Self(src) }
}

impl CDTextLanguage {
	/// # Invalid.
	pub const INVALID: Self = Self(0x100);

	/// # Unused Block.
	pub const BLOCK_UNUSED: Self = Self(0x101);

	/// # English.
	pub const ENGLISH: Self = Self(0x09);

	#[must_use]
	/// # Is Valid?
	///
	/// Returns `false` for the invalid and unused markers.
	pub const fn is_valid(self) -> bool { self.0 < 0x100 }

	#[must_use]
	/// # Code.
	pub const fn code(self) -> u16 { self.0 }

	#[must_use]
	/// # Name.
	pub const fn as_str(self) -> &'static str {
		match self.0 {
			0x01 => "Albanian",
			0x02 => "Breton",
			0x03 => "Catalan",
			0x04 => "Croatian",
			0x05 => "Welsh",
			0x06 => "Czech",
			0x07 => "Danish",
			0x08 => "German",
			0x09 => "English",
			0x0A => "Spanish",
			0x0B => "Esperanto",
			0x0C => "Estonian",
			0x0D => "Basque",
			0x0E => "Faroese",
			0x0F => "French",
			0x10 => "Frisian",
			0x11 => "Irish",
			0x12 => "Gaelic",
			0x13 => "Galician",
			0x14 => "Icelandic",
			0x15 => "Italian",
			0x16 => "Lappish",
			0x17 => "Latin",
			0x18 => "Latvian",
			0x19 => "Luxembourgian",
			0x1A => "Lithuanian",
			0x1B => "Hungarian",
			0x1C => "Maltese",
			0x1D => "Dutch",
			0x1E => "Norwegian",
			0x1F => "Occitan",
			0x20 => "Polish",
			0x21 => "Portuguese",
			0x22 => "Romanian",
			0x23 => "Romansh",
			0x24 => "Serbian",
			0x25 => "Slovak",
			0x26 => "Slovenian",
			0x27 => "Finnish",
			0x28 => "Swedish",
			0x29 => "Turkish",
			0x2A => "Flemish",
			0x2B => "Wallon",
			0x56 => "Russian",
			0x65 => "Korean",
			0x69 => "Japanese",
			0x70 => "Greek",
			0x75 => "Chinese",
			0x100 => "INVALID",
			0x101 => "BLOCK_UNUSED",
			_ => "Unknown",
		}
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # CDText.
///
/// A disc can carry up to eight blocks of CDText, one per language. Each
/// holds per-track fields, with track `0` reserved for the album as a whole.
pub struct CdText {
	/// # Blocks (by Language).
	blocks: BTreeMap<CDTextLanguage, CdTextBlock>,
}

/// # Block Data (track, field, text).
type CdTextBlock = BTreeMap<u8, BTreeMap<CDTextKind, String>>;

impl Serialize for CdText {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		/// # One Language.
		struct Block<'a>(CDTextLanguage, &'a CdTextBlock);

		impl Serialize for Block<'_> {
			fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
			where S: Serializer {
				let mut out = serializer.serialize_struct("CdTextBlock", 2)?;
				out.serialize_field("language", self.0.as_str())?;
				out.serialize_field("data", self.1)?;
				out.end()
			}
		}

		let mut out = serializer.serialize_seq(Some(self.blocks.len()))?;
		for (lang, block) in &self.blocks {
			out.serialize_element(&Block(*lang, block))?;
		}
		out.end()
	}
}

impl CdText {
	/// # Add Field.
	///
	/// Record a value for the given language, track, and field. Invalid and
	/// unused language blocks are skipped, as are empty values.
	///
	/// Returns `true` if the value was recorded.
	pub fn add<S>(&mut self, language: CDTextLanguage, track: u8, kind: CDTextKind, text: S)
	-> bool
	where S: AsRef<str> {
		let text = text.as_ref().trim_matches(|c: char| c.is_whitespace() || c == '\0');
		if ! language.is_valid() || text.is_empty() { return false; }

		self.blocks.entry(language)
			.or_default()
			.entry(track)
			.or_default()
			.insert(kind, text.to_owned());
		true
	}

	#[must_use]
	/// # Get Field.
	///
	/// Return the value from the first language block that has one.
	pub fn get(&self, track: u8, kind: CDTextKind) -> Option<&str> {
		self.blocks.values()
			.find_map(|b| b.get(&track).and_then(|t| t.get(&kind)))
			.map(String::as_str)
	}

	#[must_use]
	/// # Get Field (Specific Language).
	pub fn get_language(&self, language: CDTextLanguage, track: u8, kind: CDTextKind)
	-> Option<&str> {
		self.blocks.get(&language)
			.and_then(|b| b.get(&track))
			.and_then(|t| t.get(&kind))
			.map(String::as_str)
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

	/// # Languages.
	pub fn languages(&self) -> impl Iterator<Item=CDTextLanguage> + '_ {
		self.blocks.keys().copied()
	}
}
