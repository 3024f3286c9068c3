//! Audio file scanner
//!
//! Walks a library root, reads embedded tags with lofty and builds the
//! `Library`. A file whose tags cannot be read still becomes a track with
//! no tag fields; a file that cannot be accessed at all is recorded in the
//! progress error list and left out.

use crate::config::ScannerSettings;
use crate::models::{Library, Track};
use crate::Result;
use chrono::{DateTime, Utc};
use lofty::error::LoftyError;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Audio file scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot access file
    #[error("File access error {0}: {1}")]
    FileAccess(PathBuf, String),
}

/// Scan progress, reported after discovery and after each file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanProgress {
    pub total_files_found: usize,
    /// Files processed so far, including those that failed
    pub files_scanned: usize,
    pub files_with_errors: usize,
    pub current_file: Option<PathBuf>,
    /// (path, message) per failed file or directory entry
    pub errors: Vec<(PathBuf, String)>,
}

impl ScanProgress {
    pub fn progress_percent(&self) -> f64 {
        if self.total_files_found == 0 {
            return 0.0;
        }
        self.files_scanned as f64 / self.total_files_found as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.files_scanned >= self.total_files_found
    }
}

type ProgressCallback = Box<dyn Fn(&ScanProgress) + Send + Sync>;

/// Builds a `Library` from a directory tree
pub struct Scanner {
    settings: ScannerSettings,
    progress_callback: Option<ProgressCallback>,
}

impl Scanner {
    pub fn new(settings: ScannerSettings) -> Self {
        Self {
            settings,
            progress_callback: None,
        }
    }

    pub fn with_progress(
        mut self,
        callback: impl Fn(&ScanProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    /// Scan `root_path` and return a library with one track per audio file
    pub fn scan(&self, root_path: &Path) -> Result<Library> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()).into());
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()).into());
        }

        let root = root_path
            .canonicalize()
            .map_err(|e| ScanError::FileAccess(root_path.to_path_buf(), e.to_string()))?;

        let mut progress = ScanProgress::default();
        let files = self.discover(&root, &mut progress);

        progress.total_files_found = files.len();
        tracing::info!(root = %root.display(), files = files.len(), "Discovered audio files");
        self.notify(&progress);

        let mut library = Library::new(root.clone()).with_scan_date(Utc::now());

        for path in files {
            progress.current_file = Some(path.clone());

            match read_track(&path) {
                Ok(track) => library.add_track(track),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                    progress.files_with_errors += 1;
                    progress.errors.push((path, e.to_string()));
                }
            }

            progress.files_scanned += 1;
            self.notify(&progress);
        }

        tracing::info!(
            tracks = library.len(),
            errors = progress.files_with_errors,
            "Scan complete"
        );

        Ok(library)
    }

    /// Collect matching files in walk order (sorted by name per directory)
    fn discover(&self, root: &Path, progress: &mut ScanProgress) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut symlink_visited = HashSet::new();

        let walker = WalkDir::new(root)
            .follow_links(self.settings.follow_links)
            .max_depth(self.settings.max_depth.unwrap_or(usize::MAX))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_audio_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    // Continue scanning, don't abort
                    tracing::warn!("Error accessing entry: {}", e);
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    progress.errors.push((path, e.to_string()));
                }
            }
        }

        files
    }

    /// Check if entry should be processed
    fn should_process_entry(
        &self,
        entry: &DirEntry,
        symlink_visited: &mut HashSet<PathBuf>,
    ) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let file_name = entry.file_name().to_string_lossy();
        if self
            .settings
            .ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
        {
            return false;
        }

        // Detect symlink loops
        if entry.path_is_symlink() {
            if let Ok(canonical) = entry.path().canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", entry.path().display());
                    return false;
                }
            }
        }

        true
    }

    fn has_audio_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy();
        self.settings
            .extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    fn notify(&self, progress: &ScanProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScannerSettings::default())
    }
}

/// Build a track from filesystem metadata and whatever tags can be read
fn read_track(path: &Path) -> std::result::Result<Track, ScanError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ScanError::FileAccess(path.to_path_buf(), e.to_string()))?;

    let mut track = Track::new(path);
    track.file_size = metadata.len();
    track.modified_date = metadata.modified().ok().map(DateTime::<Utc>::from);

    if let Err(e) = read_tags(path, &mut track) {
        tracing::debug!(path = %path.display(), error = %e, "No readable tags");
    }

    Ok(track)
}

fn read_tags(path: &Path, track: &mut Track) -> std::result::Result<(), LoftyError> {
    let tagged_file = Probe::open(path)?.read()?;

    let properties = tagged_file.properties();
    let duration = properties.duration().as_secs_f64();
    if duration > 0.0 {
        track.duration_seconds = Some(duration);
    }
    track.bitrate = properties.audio_bitrate();

    // Try to get primary tag
    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(());
    };

    track.title = clean(tag.title().as_deref());
    track.artist = clean(tag.artist().as_deref());
    track.album = clean(tag.album().as_deref());
    track.album_artist = clean(tag.get_string(&ItemKey::AlbumArtist));
    track.genre = clean(tag.genre().as_deref());
    track.track_number = tag.track();
    track.track_total = tag.track_total();
    track.disc_number = tag.disk();
    track.disc_total = tag.disk_total();
    track.year = tag.year();

    tracing::debug!(
        file = %path.display(),
        artist = ?track.artist,
        title = ?track.title,
        "Extracted metadata"
    );

    Ok(())
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
