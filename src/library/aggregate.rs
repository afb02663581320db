use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::parse::{DocumentEdge, DocumentKind, DocumentNode, GraphDocument, parse_json_array};

const VARIOUS_ARTISTS: &str = "Various Artists";
const IGNORED_GENRE: &str = "Mix";
const RATING_SCALE: u32 = 20;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrackRecord {
    #[serde(default, rename = "Artist")]
    pub artist: Option<String>,
    #[serde(default, rename = "Genre")]
    pub genre: Option<String>,
    #[serde(default, rename = "Rating")]
    pub rating: Option<u32>,
    #[serde(default, rename = "Play Count")]
    pub play_count: u64,
    #[serde(default, rename = "Track Type")]
    pub track_type: Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub struct AggregateOptions {
    /// Tracks rated below this many stars are skipped.
    pub min_rating_stars: u32,
    /// Artists with this many songs or fewer are dropped.
    pub max_dropped_songs: u64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            min_rating_stars: 4,
            max_dropped_songs: 2,
        }
    }
}

/// iTunes library export: tracks keyed by their numeric track id.
#[derive(Debug, Deserialize)]
struct LibraryPlist {
    #[serde(default, rename = "Tracks")]
    tracks: HashMap<String, TrackRecord>,
}

struct ArtistTally {
    name: String,
    songs: u64,
    plays: u64,
    genres: Vec<String>,
}

struct GenreTally {
    name: String,
    songs: u64,
    plays: u64,
}

/// Reads an iTunes library property list (XML or binary) or a JSON array
/// of track records.
pub fn read_tracks(path: &Path) -> Result<Vec<TrackRecord>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_tracks(&raw).with_context(|| format!("failed to load tracks from {}", path.display()))
}

fn parse_tracks(raw: &[u8]) -> Result<Vec<TrackRecord>> {
    if is_plist(raw) {
        return parse_library_plist(raw);
    }
    let text = std::str::from_utf8(raw).context("track listing is not UTF-8")?;
    parse_json_array(text)
}

fn is_plist(raw: &[u8]) -> bool {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    let start = raw
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(raw.len());
    raw.starts_with(b"bplist") || raw[start..].starts_with(b"<")
}

fn parse_library_plist(raw: &[u8]) -> Result<Vec<TrackRecord>> {
    let library: LibraryPlist = plist::from_bytes(raw).context("invalid library property list")?;
    let mut tracks = library.tracks.into_iter().collect::<Vec<_>>();
    // Track ids are decimal strings; numeric order keeps aggregation stable.
    tracks.sort_by(|(left, _), (right, _)| {
        let key = |id: &str| (id.parse::<u64>().unwrap_or(u64::MAX), id.to_owned());
        key(left).cmp(&key(right))
    });
    Ok(tracks.into_iter().map(|(_, track)| track).collect())
}

pub fn aggregate_tracks(tracks: &[TrackRecord], options: AggregateOptions) -> GraphDocument {
    let min_rating = options.min_rating_stars.saturating_mul(RATING_SCALE);

    let mut artists: Vec<ArtistTally> = Vec::new();
    let mut artist_index: HashMap<&str, usize> = HashMap::new();

    for track in tracks {
        let (Some(artist), Some(genre), Some(rating)) =
            (track.artist.as_deref(), track.genre.as_deref(), track.rating)
        else {
            continue;
        };
        if track.track_type.as_deref() != Some("File")
            || rating < min_rating
            || artist == VARIOUS_ARTISTS
        {
            continue;
        }

        let slot = *artist_index.entry(artist).or_insert_with(|| {
            artists.push(ArtistTally {
                name: artist.to_owned(),
                songs: 0,
                plays: 0,
                genres: Vec::new(),
            });
            artists.len() - 1
        });

        let tally = &mut artists[slot];
        tally.songs += 1;
        tally.plays += track.play_count;
        for part in genre.split('/') {
            if !tally.genres.iter().any(|known| known == part) {
                tally.genres.push(part.to_owned());
            }
        }
    }

    artists.retain(|artist| artist.songs > options.max_dropped_songs);

    let mut genres: Vec<GenreTally> = Vec::new();
    let mut genre_index: HashMap<String, usize> = HashMap::new();
    for artist in &mut artists {
        artist.genres.retain(|genre| genre != IGNORED_GENRE);
        for genre in &artist.genres {
            let slot = *genre_index.entry(genre.clone()).or_insert_with(|| {
                genres.push(GenreTally {
                    name: genre.clone(),
                    songs: 0,
                    plays: 0,
                });
                genres.len() - 1
            });
            genres[slot].songs += artist.songs;
            genres[slot].plays += artist.plays;
        }
    }

    let mut document = GraphDocument::default();
    for (id, genre) in genres.iter().enumerate() {
        document.max_genre_songs = document.max_genre_songs.max(genre.songs);
        document.max_genre_plays = document.max_genre_plays.max(genre.plays);
        document.nodes.push(DocumentNode {
            id: id as u32,
            kind: DocumentKind::Genre,
            name: genre.name.clone(),
            song_count: genre.songs,
            play_count: genre.plays,
        });
    }

    for (id, artist) in artists.iter().enumerate() {
        let index = document.nodes.len();
        document.max_artist_songs = document.max_artist_songs.max(artist.songs);
        document.max_artist_plays = document.max_artist_plays.max(artist.plays);
        document.nodes.push(DocumentNode {
            id: id as u32,
            kind: DocumentKind::Artist,
            name: artist.name.clone(),
            song_count: artist.songs,
            play_count: artist.plays,
        });

        for genre in &artist.genres {
            if let Some(&target) = genre_index.get(genre) {
                document.edges.push(DocumentEdge {
                    source: index,
                    target,
                });
            }
        }
    }

    log::info!(
        "aggregated {} tracks into {} genres and {} artists",
        tracks.len(),
        genres.len(),
        artists.len()
    );

    document
}
