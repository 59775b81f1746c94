/*!
# Void Rip: MusicBrainz

Discs are looked up by their MusicBrainz disc ID. A known disc maps to one or
more releases (the first is taken), while a disc someone only half-entered
comes back as a "CD stub" with a bare artist and title. Either way, the
result is boiled down to a [`Release`].
*/

use crate::{
	Disc,
	VoidRipError,
};
use serde::{
	Deserialize,
	Serialize,
};
use std::{
	fmt,
	sync::OnceLock,
	time::Duration,
};
use ureq::{
	Agent,
	AgentBuilder,
};



/// # Connection Agent.
static AGENT: OnceLock<Agent> = OnceLock::new();

/// # Web Service URL.
const BASE_URL: &str = "https://musicbrainz.org/ws/2/discid";



/// # Release Lookup.
///
/// The [`Ripper`](crate::Ripper) uses this to fill in whatever metadata
/// CD-TEXT didn't supply.
pub trait ReleaseLookup: fmt::Debug {
	/// # Lookup.
	///
	/// Return the release information for the disc, or `None` if it is
	/// unknown.
	///
	/// ## Errors
	///
	/// Network and parsing failures are errors; an unknown disc is not.
	fn lookup(&self, disc: &Disc) -> Result<Option<Release>, VoidRipError>;
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # MusicBrainz.
///
/// Look discs up using the public MusicBrainz web service.
pub struct MusicBrainz;

impl ReleaseLookup for MusicBrainz {
	fn lookup(&self, disc: &Disc) -> Result<Option<Release>, VoidRipError> {
		let id = disc.id_musicbrainz();
		let url = format!("{BASE_URL}/{id}?fmt=json&cdstubs=yes&inc=artist-credits+recordings");
		let res = match agent().get(&url).call() {
			Ok(res) => res,
			Err(ureq::Error::Status(404, _)) => return Ok(None),
			Err(_) => return Err(VoidRipError::Download(url)),
		};

		let body = res.into_string().map_err(|_| VoidRipError::Download(url))?;
		Release::from_json(&body, &id)
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
/// # Release.
pub struct Release {
	/// # Release ID.
	///
	/// This is empty for CD stubs.
	pub id: String,

	/// # Artist.
	pub artist: String,

	/// # Title.
	pub title: String,

	/// # Release Date.
	pub date: Option<String>,

	/// # Disc Number.
	pub disc_num: Option<u16>,

	/// # Disc Total.
	pub disc_total: u16,

	/// # Tracks.
	pub tracks: Vec<ReleaseTrack>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
/// # Release Track.
pub struct ReleaseTrack {
	/// # Number (as printed).
	pub number: String,

	/// # Position.
	pub position: u16,

	/// # Title.
	pub title: String,
}

impl Release {
	/// # From JSON.
	///
	/// Parse a MusicBrainz disc ID response. If the disc matches more than
	/// one release, the first is used. The medium the disc belongs to
	/// determines the disc number and track list.
	///
	/// ## Errors
	///
	/// Returns an error if the JSON is malformed.
	pub fn from_json(src: &str, disc_id: &str) -> Result<Option<Self>, VoidRipError> {
		let raw: MbResponse = serde_json::from_str(src)
			.map_err(|_| VoidRipError::MusicBrainz(disc_id.to_owned()))?;

		// A proper release.
		if let Some(release) = raw.releases.into_iter().next() {
			let artist = release.artist_credit.iter()
				.fold(String::new(), |mut acc, c| {
					acc.push_str(&c.name);
					acc.push_str(&c.joinphrase);
					acc
				});
			let disc_total = u16::try_from(release.media.len()).unwrap_or(u16::MAX);
			let medium = release.media.into_iter()
				.find(|m| m.discs.iter().any(|d| d.id == disc_id));

			let (disc_num, tracks) = medium.map_or_else(
				|| (None, Vec::new()),
				|m| (m.position, m.tracks.into_iter().map(ReleaseTrack::from).collect()),
			);

			return Ok(Some(Self {
				id: release.id,
				artist: artist.trim().to_owned(),
				title: release.title.trim().to_owned(),
				date: release.date.filter(|d| ! d.trim().is_empty()),
				disc_num,
				disc_total,
				tracks,
			}));
		}

		// A stub.
		if let (Some(artist), Some(title)) = (raw.artist, raw.title) {
			let tracks = raw.tracks.into_iter()
				.zip(1_u16..)
				.map(|(t, position)| ReleaseTrack {
					number: position.to_string(),
					position,
					title: t.title,
				})
				.collect();

			return Ok(Some(Self {
				id: String::new(),
				artist: artist.trim().to_owned(),
				title: title.trim().to_owned(),
				date: None,
				disc_num: Some(1),
				disc_total: 1,
				tracks,
			}));
		}

		Ok(None)
	}
}

impl From<MbTrack> for ReleaseTrack {
	fn from(src: MbTrack) -> Self {
		Self {
			number: src.number,
			position: src.position,
			title: src.title,
		}
	}
}



#[derive(Debug, Deserialize)]
/// # Raw Response.
///
/// Disc hits carry `releases`; CD stubs carry `artist`, `title`, and their
/// own `tracks`.
struct MbResponse {
	/// # Releases.
	#[serde(default)]
	releases: Vec<MbRelease>,

	/// # Stub Artist.
	artist: Option<String>,

	/// # Stub Title.
	title: Option<String>,

	/// # Stub Tracks.
	#[serde(default)]
	tracks: Vec<MbStubTrack>,
}

#[derive(Debug, Deserialize)]
/// # Raw Release.
struct MbRelease {
	/// # ID.
	id: String,

	/// # Title.
	title: String,

	/// # Date.
	date: Option<String>,

	/// # Artist Credits.
	#[serde(rename = "artist-credit", default)]
	artist_credit: Vec<MbCredit>,

	/// # Media.
	#[serde(default)]
	media: Vec<MbMedium>,
}

#[derive(Debug, Deserialize)]
/// # Raw Artist Credit.
struct MbCredit {
	/// # Name.
	name: String,

	/// # Join Phrase.
	#[serde(default)]
	joinphrase: String,
}

#[derive(Debug, Deserialize)]
/// # Raw Medium.
struct MbMedium {
	/// # Position.
	position: Option<u16>,

	/// # Discs.
	#[serde(default)]
	discs: Vec<MbDisc>,

	/// # Tracks.
	#[serde(default)]
	tracks: Vec<MbTrack>,
}

#[derive(Debug, Deserialize)]
/// # Raw Disc.
struct MbDisc {
	/// # Disc ID.
	id: String,
}

#[derive(Debug, Deserialize)]
/// # Raw Track.
struct MbTrack {
	/// # Number.
	number: String,

	/// # Position.
	position: u16,

	/// # Title.
	title: String,
}

#[derive(Debug, Deserialize)]
/// # Raw Stub Track.
struct MbStubTrack {
	/// # Title.
	title: String,
}



/// # Connection Agent.
///
/// MusicBrainz asks that clients identify themselves.
fn agent() -> &'static Agent {
	AGENT.get_or_init(||
		AgentBuilder::new()
			.timeout(Duration::from_secs(15))
			.user_agent(concat!("VoidRip/", env!("CARGO_PKG_VERSION")))
			.max_idle_connections(0)
			.build()
	)
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Disc ID.
	const ID: &str = "49HHV7Eb8UKF3aQiNmu1GR8vKTY-";

	#[test]
	fn t_release() {
		let json = r#"{
			"id": "49HHV7Eb8UKF3aQiNmu1GR8vKTY-",
			"sectors": 95462,
			"releases": [
				{
					"id": "2a5b1f3c-0000-4000-8000-000000000001",
					"title": " Some Album ",
					"date": "1994-03-01",
					"artist-credit": [
						{ "name": "Alpha", "joinphrase": " & " },
						{ "name": "Beta", "joinphrase": "" }
					],
					"media": [
						{
							"position": 1,
							"discs": [{ "id": "somethingElse" }],
							"tracks": []
						},
						{
							"position": 2,
							"discs": [{ "id": "49HHV7Eb8UKF3aQiNmu1GR8vKTY-" }],
							"tracks": [
								{ "number": "1", "position": 1, "title": "Opener", "recording": {} },
								{ "number": "2", "position": 2, "title": "Closer", "recording": {} }
							]
						}
					]
				},
				{
					"id": "2a5b1f3c-0000-4000-8000-000000000002",
					"title": "Some Album (Reissue)",
					"artist-credit": [],
					"media": []
				}
			]
		}"#;

		let release = Release::from_json(json, ID)
			.expect("Parse failed.")
			.expect("Missing release.");
		assert_eq!(release.id, "2a5b1f3c-0000-4000-8000-000000000001");
		assert_eq!(release.artist, "Alpha & Beta");
		assert_eq!(release.title, "Some Album");
		assert_eq!(release.date.as_deref(), Some("1994-03-01"));
		assert_eq!(release.disc_num, Some(2));
		assert_eq!(release.disc_total, 2);
		assert_eq!(release.tracks.len(), 2);
		assert_eq!(release.tracks[1].title, "Closer");
		assert_eq!(release.tracks[1].position, 2);
	}

	#[test]
	fn t_stub() {
		let json = r#"{
			"id": "49HHV7Eb8UKF3aQiNmu1GR8vKTY-",
			"artist": "Somebody",
			"title": "Demo Tape",
			"track-count": 2,
			"tracks": [
				{ "title": "One", "artist": "", "length": 1000 },
				{ "title": "Two", "artist": "", "length": 2000 }
			]
		}"#;

		let release = Release::from_json(json, ID)
			.expect("Parse failed.")
			.expect("Missing stub.");
		assert!(release.id.is_empty());
		assert_eq!(release.artist, "Somebody");
		assert_eq!(release.title, "Demo Tape");
		assert_eq!(release.disc_num, Some(1));
		assert_eq!(
			release.tracks.iter().map(|t| t.position).collect::<Vec<_>>(),
			[1, 2],
		);
	}

	#[test]
	fn t_unknown() {
		// Nothing usable is not an error.
		assert_eq!(Release::from_json(r#"{"releases": []}"#, ID), Ok(None));
		assert_eq!(Release::from_json("{}", ID), Ok(None));

		// Garbage is.
		assert_eq!(
			Release::from_json("<html>", ID),
			Err(VoidRipError::MusicBrainz(ID.to_owned())),
		);
	}
}
