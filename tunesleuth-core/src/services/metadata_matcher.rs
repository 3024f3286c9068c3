//! Fuzzy metadata matcher
//!
//! Looks up a track's best-known title, artist and album in a recording
//! catalog and ranks the candidates by weighted fuzzy similarity.
//!
//! Catalog failures are logged and reported as an empty match list, so
//! "no matches" and "service unreachable" look the same to callers.

use super::musicbrainz_client::{MusicBrainzClient, RecordingCatalog};
use super::rate_limiter::RateLimiter;
use super::similarity::fuzzy_similarity;
use crate::config::MatcherSettings;
use crate::models::Track;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info, warn};

/// Source identifier attached to catalog matches
pub const MUSICBRAINZ_SOURCE: &str = "musicbrainz";

const TITLE_WEIGHT: f64 = 2.0;
const ARTIST_WEIGHT: f64 = 1.5;
const ALBUM_WEIGHT: f64 = 1.0;

/// A scored candidate from the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataMatch {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    /// 0.0-1.0
    pub confidence: f64,
    pub source: String,
    pub recording_id: Option<String>,
    pub release_id: Option<String>,
    pub artist_id: Option<String>,
}

impl MetadataMatch {
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

impl fmt::Display for MetadataMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({:.0}% match)",
            self.artist,
            self.title,
            self.confidence_percent()
        )
    }
}

/// Fields chosen to identify a track in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFields {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Tag title used although it looks like a filename
    pub title_suspicious: bool,
    /// Tag artist looks like mangled camel case
    pub artist_suspicious: bool,
}

// Catalog record shapes. Only `title` is required; anything else missing
// decodes to an empty value.

#[derive(Debug, Deserialize)]
struct MBRecording {
    id: Option<String>,
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MBArtistCredit>,
    #[serde(default)]
    releases: Vec<MBRelease>,
}

#[derive(Debug, Deserialize)]
struct MBArtistCredit {
    artist: Option<MBArtist>,
}

#[derive(Debug, Deserialize)]
struct MBArtist {
    id: Option<String>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct MBRelease {
    id: Option<String>,
    #[serde(default)]
    title: String,
    date: Option<String>,
    #[serde(default)]
    media: Vec<MBMedium>,
}

#[derive(Debug, Deserialize)]
struct MBMedium {
    #[serde(default)]
    track: Vec<MBTrack>,
}

#[derive(Debug, Deserialize)]
struct MBTrack {
    number: Option<String>,
}

/// Year from the first four characters of a release date
fn parse_year(date: &str) -> Option<u32> {
    date.get(..4).and_then(|y| y.parse().ok())
}

/// Conjunctive free-text query; terms are left unquoted
pub fn build_query(title: &str, artist: Option<&str>, album: Option<&str>) -> String {
    let mut parts = vec![format!("recording:{}", title)];
    if let Some(artist) = non_blank(artist) {
        parts.push(format!("artist:{}", artist));
    }
    if let Some(album) = non_blank(album) {
        parts.push(format!("release:{}", album));
    }
    parts.join(" AND ")
}

/// Weighted average of field similarities over the fields actually searched
pub fn calculate_confidence(
    search_title: &str,
    search_artist: Option<&str>,
    search_album: Option<&str>,
    result_title: &str,
    result_artist: &str,
    result_album: &str,
) -> f64 {
    let mut score = fuzzy_similarity(search_title, result_title) * TITLE_WEIGHT;
    let mut weights = TITLE_WEIGHT;

    if let Some(artist) = non_blank(search_artist) {
        score += fuzzy_similarity(artist, result_artist) * ARTIST_WEIGHT;
        weights += ARTIST_WEIGHT;
    }
    if let Some(album) = non_blank(search_album) {
        score += fuzzy_similarity(album, result_album) * ALBUM_WEIGHT;
        weights += ALBUM_WEIGHT;
    }

    (score / weights).min(1.0)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Space-free name with at least `min_internal_uppercase` capitals after
/// the first character, e.g. `QuincyJones`
fn looks_camel_case(name: &str, min_internal_uppercase: usize) -> bool {
    if min_internal_uppercase == 0 || name.contains(char::is_whitespace) {
        return false;
    }
    name.chars().skip(1).filter(|c| c.is_uppercase()).count() >= min_internal_uppercase
}

/// Looks like a filename rather than a clean title
fn looks_like_filename(title: &str) -> bool {
    title.contains('(') || title.contains(")-")
}

/// Rate-limited catalog matcher
///
/// One matcher owns one limiter. Lookups for many tracks must go through
/// the same instance so they share the catalog's request budget.
pub struct MetadataMatcher<C: RecordingCatalog = MusicBrainzClient> {
    catalog: C,
    limiter: RateLimiter,
    settings: MatcherSettings,
}

impl MetadataMatcher<MusicBrainzClient> {
    /// Matcher backed by the MusicBrainz web service
    pub fn musicbrainz(settings: MatcherSettings) -> Result<Self> {
        let client = MusicBrainzClient::new(&settings)
            .map_err(|e| Error::Config(format!("Create MusicBrainz client failed: {}", e)))?;
        Self::new(client, settings)
    }
}

impl<C: RecordingCatalog> MetadataMatcher<C> {
    pub fn new(catalog: C, settings: MatcherSettings) -> Result<Self> {
        settings.validate()?;
        let limiter = RateLimiter::from_rate(settings.rate_limit_per_second)?;
        Ok(Self {
            catalog,
            limiter,
            settings,
        })
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Search the catalog and return up to `limit` matches, best first
    pub async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
        album: Option<&str>,
        limit: usize,
    ) -> Vec<MetadataMatch> {
        if title.trim().is_empty() || limit == 0 {
            debug!("Skipping catalog search: blank title or zero limit");
            return Vec::new();
        }

        let query = build_query(title, artist, album);

        self.limiter.wait().await;
        let records = match self.catalog.search_recordings(&query, limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!(query = %query, error = %e, "Catalog search failed");
                return Vec::new();
            }
        };

        let mut matches: Vec<MetadataMatch> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<MBRecording>(record) {
                Ok(recording) => Some(self.score_recording(recording, title, artist, album)),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed catalog record");
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(limit);

        debug!(query = %query, matches = matches.len(), "Catalog search complete");
        matches
    }

    fn score_recording(
        &self,
        recording: MBRecording,
        search_title: &str,
        search_artist: Option<&str>,
        search_album: Option<&str>,
    ) -> MetadataMatch {
        let artist = recording
            .artist_credit
            .into_iter()
            .next()
            .and_then(|credit| credit.artist);
        let release = recording.releases.into_iter().next();

        let (artist_name, artist_id) = match artist {
            Some(a) => (a.name, a.id),
            None => (String::new(), None),
        };

        let (album, release_id, year, track_number) = match release {
            Some(r) => {
                let year = r.date.as_deref().and_then(parse_year);
                let track_number = r
                    .media
                    .first()
                    .and_then(|m| m.track.first())
                    .and_then(|t| t.number.as_deref())
                    .and_then(|n| n.trim().parse().ok());
                (r.title, r.id, year, track_number)
            }
            None => (String::new(), None, None, None),
        };

        let confidence = calculate_confidence(
            search_title,
            search_artist,
            search_album,
            &recording.title,
            &artist_name,
            &album,
        );

        MetadataMatch {
            title: recording.title,
            artist: artist_name,
            album,
            track_number,
            year,
            genre: None,
            confidence,
            source: MUSICBRAINZ_SOURCE.to_string(),
            recording_id: recording.id,
            release_id,
            artist_id,
        }
    }

    /// Pick the title, artist and album used to look a track up
    ///
    /// Inferred title and artist win over tags; album prefers the tag.
    pub fn lookup_fields(&self, track: &Track) -> LookupFields {
        let inferred = track.inferred();
        let tag_title = non_blank(track.title.as_deref());
        let tag_artist = non_blank(track.artist.as_deref());

        let (title, title_suspicious) = match (non_blank(inferred.title.as_deref()), tag_title) {
            (Some(title), _) => (title.to_string(), false),
            (None, Some(title)) => (title.to_string(), looks_like_filename(title)),
            (None, None) => (track.stem(), false),
        };

        let artist_suspicious = tag_artist
            .map(|a| looks_camel_case(a, self.settings.camel_case_min_internal_uppercase))
            .unwrap_or(false);
        let artist = non_blank(inferred.artist.as_deref())
            .or(tag_artist)
            .map(str::to_string);

        let album = non_blank(track.album.as_deref())
            .or(non_blank(inferred.album.as_deref()))
            .map(str::to_string);

        LookupFields {
            title,
            artist,
            album,
            title_suspicious,
            artist_suspicious,
        }
    }

    /// Look up a track using its best-known fields
    pub async fn lookup_track(&self, track: &Track, limit: usize) -> Vec<MetadataMatch> {
        let fields = self.lookup_fields(track);
        if fields.title_suspicious || fields.artist_suspicious {
            info!(
                path = %track.path().display(),
                title_suspicious = fields.title_suspicious,
                artist_suspicious = fields.artist_suspicious,
                "Tags look auto-generated"
            );
        }

        self.search_track(
            &fields.title,
            fields.artist.as_deref(),
            fields.album.as_deref(),
            limit,
        )
        .await
    }
}
