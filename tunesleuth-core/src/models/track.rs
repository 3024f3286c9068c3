//! Track model
//!
//! A track is identified by its filesystem path. Fields come from two
//! sources that are kept apart:
//! - tag fields, populated by the scanner from embedded tags
//! - inferred fields, populated only by the pattern detector

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Fallback shown when neither tag nor inferred artist is known
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Fallback shown when neither tag nor inferred album is known
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Fields inferred from the filename and folder layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferredFields {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
}

impl InferredFields {
    /// True when no field has been inferred
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.track_number.is_none()
    }

    /// Overwrite fields that `other` proposes; leave the rest untouched
    pub(crate) fn merge_from(&mut self, other: &InferredFields) {
        if other.title.is_some() {
            self.title = other.title.clone();
        }
        if other.artist.is_some() {
            self.artist = other.artist.clone();
        }
        if other.album.is_some() {
            self.album = other.album.clone();
        }
        if other.track_number.is_some() {
            self.track_number = other.track_number;
        }
    }
}

/// A single audio file discovered by the scanner
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    path: PathBuf,
    filename: String,

    /// File size in bytes
    pub file_size: u64,
    /// Last modification time
    pub modified_date: Option<DateTime<Utc>>,

    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    pub track_total: Option<u32>,
    pub disc_number: Option<u32>,
    pub disc_total: Option<u32>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub duration_seconds: Option<f64>,
    /// Bitrate (kbps)
    pub bitrate: Option<u32>,

    inferred: InferredFields,
}

impl Track {
    /// Create a track with no tag or inferred fields
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            filename,
            file_size: 0,
            modified_date: None,
            title: None,
            artist: None,
            album: None,
            album_artist: None,
            track_number: None,
            track_total: None,
            disc_number: None,
            disc_total: None,
            year: None,
            genre: None,
            duration_seconds: None,
            bitrate: None,
            inferred: InferredFields::default(),
        }
    }

    /// Filesystem path (track identity)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name including extension
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// File name without extension, as used for pattern matching
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Folder containing the file
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Fields inferred by the pattern detector
    pub fn inferred(&self) -> &InferredFields {
        &self.inferred
    }

    pub(crate) fn apply_inferred(&mut self, proposed: &InferredFields) {
        self.inferred.merge_from(proposed);
    }

    #[cfg(test)]
    pub(crate) fn set_inferred(&mut self, inferred: InferredFields) {
        self.inferred = inferred;
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.inferred.title.as_deref())
            .unwrap_or(self.filename.as_str())
    }

    pub fn display_artist(&self) -> &str {
        self.artist
            .as_deref()
            .or(self.inferred.artist.as_deref())
            .unwrap_or(UNKNOWN_ARTIST)
    }

    pub fn display_album(&self) -> &str {
        self.album
            .as_deref()
            .or(self.inferred.album.as_deref())
            .unwrap_or(UNKNOWN_ALBUM)
    }

    /// Tag artist if present, else inferred artist; `None` when neither is known
    pub fn known_artist(&self) -> Option<&str> {
        self.artist.as_deref().or(self.inferred.artist.as_deref())
    }

    /// True when title, artist and album tags are all present
    pub fn has_complete_tags(&self) -> bool {
        self.title.is_some() && self.artist.is_some() && self.album.is_some()
    }

    /// Fraction (0.0-1.0) of title, artist, album, track number, year and
    /// genre tags that are present
    pub fn tag_completeness_score(&self) -> f64 {
        let present = [
            self.title.is_some(),
            self.artist.is_some(),
            self.album.is_some(),
            self.track_number.is_some(),
            self.year.is_some(),
            self.genre.is_some(),
        ];
        let filled = present.iter().filter(|p| **p).count();
        filled as f64 / present.len() as f64
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.display_artist(), self.display_title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_creation() {
        let track = Track::new("/music/artist/album/01 - Song.mp3");
        assert_eq!(track.filename(), "01 - Song.mp3");
        assert_eq!(track.stem(), "01 - Song");
        assert_eq!(track.folder(), Path::new("/music/artist/album"));
        assert!(track.inferred().is_empty());
    }

    #[test]
    fn test_display_title_prefers_tag_then_inferred_then_filename() {
        let mut track = Track::new("/music/song.mp3");
        assert_eq!(track.display_title(), "song.mp3");

        track.set_inferred(InferredFields {
            title: Some("Inferred Title".to_string()),
            ..Default::default()
        });
        assert_eq!(track.display_title(), "Inferred Title");

        track.title = Some("Actual Song Title".to_string());
        assert_eq!(track.display_title(), "Actual Song Title");
    }

    #[test]
    fn test_display_artist_and_album_fallbacks() {
        let track = Track::new("/music/song.mp3");
        assert_eq!(track.display_artist(), UNKNOWN_ARTIST);
        assert_eq!(track.display_album(), UNKNOWN_ALBUM);
        assert_eq!(track.known_artist(), None);
        assert_eq!(track.to_string(), "Unknown Artist - song.mp3");
    }

    #[test]
    fn test_has_complete_tags() {
        let mut track = Track::new("/music/song.mp3");
        track.title = Some("Song".to_string());
        assert!(!track.has_complete_tags());

        track.artist = Some("Artist".to_string());
        track.album = Some("Album".to_string());
        assert!(track.has_complete_tags());
    }

    #[test]
    fn test_tag_completeness_score() {
        let mut track = Track::new("/music/song.mp3");
        assert_eq!(track.tag_completeness_score(), 0.0);

        track.title = Some("Song".to_string());
        track.artist = Some("Artist".to_string());
        track.album = Some("Album".to_string());
        assert_eq!(track.tag_completeness_score(), 0.5);

        track.track_number = Some(1);
        track.year = Some(2020);
        track.genre = Some("Rock".to_string());
        assert_eq!(track.tag_completeness_score(), 1.0);
    }

    #[test]
    fn test_merge_keeps_fields_not_proposed() {
        let mut track = Track::new("/music/song.mp3");
        track.set_inferred(InferredFields {
            album: Some("Kept".to_string()),
            ..Default::default()
        });

        track.apply_inferred(&InferredFields {
            title: Some("New".to_string()),
            track_number: Some(3),
            ..Default::default()
        });

        assert_eq!(track.inferred().title.as_deref(), Some("New"));
        assert_eq!(track.inferred().album.as_deref(), Some("Kept"));
        assert_eq!(track.inferred().track_number, Some(3));
    }
}
