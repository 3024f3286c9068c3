//! Library model
//!
//! Owns the scanned tracks in insertion order and serves derived groupings
//! (by artist, by album, by folder). Groupings are built lazily and tagged
//! with the generation they were built at; every mutation bumps the
//! generation and drops the cache.
//!
//! The cache is not thread-safe. Share a `Library` across threads only
//! behind external synchronization.

use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use super::track::Track;

/// Tracks grouped under one display artist
#[derive(Debug, Clone, Serialize)]
pub struct Artist {
    pub name: String,
    /// Indices into `Library::tracks()`
    pub track_indices: Vec<usize>,
    /// Keys into `Library::albums()`
    pub album_keys: Vec<String>,
}

impl Artist {
    pub fn track_count(&self) -> usize {
        self.track_indices.len()
    }

    pub fn album_count(&self) -> usize {
        self.album_keys.len()
    }
}

/// Tracks grouped under one `artist|album` key
#[derive(Debug, Clone, Serialize)]
pub struct Album {
    pub name: String,
    pub artist: String,
    /// First non-empty year tag seen among the album's tracks
    pub year: Option<u32>,
    /// Folder of the first track added to the album
    pub folder_path: PathBuf,
    /// Indices into `Library::tracks()`
    pub track_indices: Vec<usize>,
}

impl Album {
    pub fn track_count(&self) -> usize {
        self.track_indices.len()
    }

    /// Sum of known track durations
    pub fn total_duration_seconds(&self, tracks: &[Track]) -> f64 {
        self.track_indices
            .iter()
            .filter_map(|&i| tracks.get(i).and_then(|t| t.duration_seconds))
            .sum()
    }

    /// True when the tagged track numbers are exactly 1..=max
    pub fn is_complete(&self, tracks: &[Track]) -> bool {
        let numbers: HashSet<u32> = self
            .track_indices
            .iter()
            .filter_map(|&i| tracks.get(i).and_then(|t| t.track_number))
            .filter(|&n| n > 0)
            .collect();

        match numbers.iter().max() {
            Some(&max) => (1..=max).all(|n| numbers.contains(&n)),
            None => false,
        }
    }
}

/// Summary statistics for a library
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibraryStats {
    pub total_tracks: usize,
    pub total_size_bytes: u64,
    pub total_duration_seconds: f64,

    pub tracks_with_tags: usize,
    pub tracks_without_tags: usize,
    pub average_tag_completeness: f64,

    pub unique_artists: usize,
    pub unique_albums: usize,
    pub unique_genres: usize,

    pub folder_count: usize,
    pub max_folder_depth: usize,
}

impl LibraryStats {
    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn total_size_gb(&self) -> f64 {
        self.total_size_bytes as f64 / (1024.0 * 1024.0 * 1024.0)
    }

    pub fn total_duration_hours(&self) -> f64 {
        self.total_duration_seconds / 3600.0
    }

    /// Percentage of tracks with complete title/artist/album tags
    pub fn tag_coverage_percent(&self) -> f64 {
        if self.total_tracks == 0 {
            return 0.0;
        }
        self.tracks_with_tags as f64 / self.total_tracks as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
struct Groupings {
    generation: u64,
    artists: BTreeMap<String, Artist>,
    albums: BTreeMap<String, Album>,
    folders: BTreeMap<PathBuf, Vec<usize>>,
}

impl Groupings {
    fn build(tracks: &[Track], generation: u64) -> Self {
        let mut artists: BTreeMap<String, Artist> = BTreeMap::new();
        let mut albums: BTreeMap<String, Album> = BTreeMap::new();
        let mut folders: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();

        for (index, track) in tracks.iter().enumerate() {
            let artist_name = track.display_artist();
            let album_name = track.display_album();
            let album_key = format!("{}|{}", artist_name, album_name);

            let artist = artists
                .entry(artist_name.to_string())
                .or_insert_with(|| Artist {
                    name: artist_name.to_string(),
                    track_indices: Vec::new(),
                    album_keys: Vec::new(),
                });
            artist.track_indices.push(index);
            if !artist.album_keys.contains(&album_key) {
                artist.album_keys.push(album_key.clone());
            }

            let album = albums.entry(album_key).or_insert_with(|| Album {
                name: album_name.to_string(),
                artist: artist_name.to_string(),
                year: None,
                folder_path: track.folder().to_path_buf(),
                track_indices: Vec::new(),
            });
            album.track_indices.push(index);
            if album.year.is_none() {
                album.year = track.year;
            }

            folders
                .entry(track.folder().to_path_buf())
                .or_default()
                .push(index);
        }

        Self {
            generation,
            artists,
            albums,
            folders,
        }
    }
}

/// The scanned music collection
#[derive(Debug, Clone)]
pub struct Library {
    root_path: PathBuf,
    scan_date: Option<DateTime<Utc>>,
    tracks: Vec<Track>,
    generation: u64,
    groupings: OnceCell<Groupings>,
}

impl Library {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            scan_date: None,
            tracks: Vec::new(),
            generation: 0,
            groupings: OnceCell::new(),
        }
    }

    pub fn with_scan_date(mut self, scan_date: DateTime<Utc>) -> Self {
        self.scan_date = Some(scan_date);
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn scan_date(&self) -> Option<DateTime<Utc>> {
        self.scan_date
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Mutation counter; advances on every `add_track` and inference merge
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
        self.invalidate();
    }

    /// Mutable access to tracks for the inference merge step
    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        self.invalidate();
        &mut self.tracks
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.groupings = OnceCell::new();
    }

    fn groupings(&self) -> &Groupings {
        let groupings = self
            .groupings
            .get_or_init(|| Groupings::build(&self.tracks, self.generation));
        debug_assert_eq!(groupings.generation, self.generation);
        groupings
    }

    /// Tracks grouped by display artist
    pub fn artists(&self) -> &BTreeMap<String, Artist> {
        &self.groupings().artists
    }

    /// Tracks grouped by `artist|album` display key
    pub fn albums(&self) -> &BTreeMap<String, Album> {
        &self.groupings().albums
    }

    /// Tracks grouped by containing folder (parent path, not normalized)
    pub fn folders(&self) -> &BTreeMap<PathBuf, Vec<usize>> {
        &self.groupings().folders
    }

    /// Number of path segments between the root and `folder`;
    /// `None` when `folder` is outside the root
    pub fn folder_depth(&self, folder: &Path) -> Option<usize> {
        folder
            .strip_prefix(&self.root_path)
            .ok()
            .map(|rel| rel.components().count())
    }

    pub fn calculate_stats(&self) -> LibraryStats {
        let mut stats = LibraryStats::default();

        if self.tracks.is_empty() {
            return stats;
        }

        stats.total_tracks = self.tracks.len();
        stats.total_size_bytes = self.tracks.iter().map(|t| t.file_size).sum();
        stats.total_duration_seconds = self
            .tracks
            .iter()
            .filter_map(|t| t.duration_seconds)
            .sum();

        let completeness: f64 = self.tracks.iter().map(|t| t.tag_completeness_score()).sum();
        stats.average_tag_completeness = completeness / stats.total_tracks as f64;
        stats.tracks_with_tags = self.tracks.iter().filter(|t| t.has_complete_tags()).count();
        stats.tracks_without_tags = stats.total_tracks - stats.tracks_with_tags;

        stats.unique_artists = self.artists().len();
        stats.unique_albums = self.albums().len();
        stats.unique_genres = self
            .tracks
            .iter()
            .filter_map(|t| t.genre.as_deref())
            .collect::<HashSet<_>>()
            .len();

        let folders = self.folders();
        stats.folder_count = folders.len();
        stats.max_folder_depth = folders
            .keys()
            .map(|f| self.folder_depth(f).unwrap_or(0))
            .max()
            .unwrap_or(0);

        stats
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Library({}, {} tracks)",
            self.root_path.display(),
            self.tracks.len()
        )
    }
}
