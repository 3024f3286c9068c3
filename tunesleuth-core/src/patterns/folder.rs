//! Folder structure classification

use super::types::{PatternMatch, PatternType};
use crate::config::DetectorSettings;
use crate::models::Library;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

static DISC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:disc|cd|disk)\s*(\d+)").expect("disc pattern must compile")
});

/// True when a folder name looks like `Disc 2`, `CD1` or `disk 3`
pub fn is_disc_folder(name: &str) -> bool {
    DISC_PATTERN.is_match(name)
}

pub(crate) fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn relative_display(library: &Library, folder: &Path) -> String {
    folder
        .strip_prefix(library.root_path())
        .unwrap_or(folder)
        .display()
        .to_string()
}

pub(crate) fn detect(library: &Library, settings: &DetectorSettings) -> Vec<PatternMatch> {
    let total = library.len();
    if total == 0 {
        return Vec::new();
    }

    let folders = library.folders();

    if folders.len() == 1 {
        let examples = folders
            .keys()
            .map(|f| f.display().to_string())
            .collect();
        return vec![PatternMatch {
            pattern_type: PatternType::FolderFlat,
            confidence: 1.0,
            matching_tracks: total,
            total_tracks: total,
            description: PatternType::FolderFlat.description().to_string(),
            explanation: format!("All {} tracks are in a single folder.", total),
            examples,
        }];
    }

    // Folders outside the root are ignored
    let mut by_depth: BTreeMap<usize, Vec<(&PathBuf, usize)>> = BTreeMap::new();
    for (folder, indices) in folders {
        if let Some(depth) = library.folder_depth(folder) {
            by_depth
                .entry(depth)
                .or_default()
                .push((folder, indices.len()));
        }
    }

    let mut matches = Vec::new();
    let depth_folders = |depth: usize| by_depth.get(&depth).map(Vec::as_slice).unwrap_or(&[]);

    let artist_album = depth_folders(2);
    if !artist_album.is_empty() {
        let count: usize = artist_album.iter().map(|(_, n)| n).sum();
        let confidence = count as f64 / total as f64;

        if confidence >= settings.artist_album_min_confidence {
            let artists: BTreeSet<String> = artist_album
                .iter()
                .filter_map(|(f, _)| f.parent().map(folder_name))
                .collect();

            matches.push(PatternMatch {
                pattern_type: PatternType::FolderArtistAlbum,
                confidence,
                matching_tracks: count,
                total_tracks: total,
                description: PatternType::FolderArtistAlbum.description().to_string(),
                explanation: format!(
                    "Detected {} artist folders containing {} album folders with {} tracks.",
                    artists.len(),
                    artist_album.len(),
                    count
                ),
                examples: artist_album
                    .iter()
                    .take(settings.max_examples)
                    .map(|(f, _)| relative_display(library, f))
                    .collect(),
            });
        }
    }

    let discs: Vec<&(&PathBuf, usize)> = depth_folders(3)
        .iter()
        .filter(|(f, _)| is_disc_folder(&folder_name(f)))
        .collect();
    if !discs.is_empty() {
        let count: usize = discs.iter().map(|(_, n)| n).sum();
        let confidence = count as f64 / total as f64;

        if confidence >= settings.disc_min_confidence {
            matches.push(PatternMatch {
                pattern_type: PatternType::FolderArtistAlbumDisc,
                confidence,
                matching_tracks: count,
                total_tracks: total,
                description: PatternType::FolderArtistAlbumDisc.description().to_string(),
                explanation: format!(
                    "Detected {} disc folders containing {} tracks.",
                    discs.len(),
                    count
                ),
                examples: discs
                    .iter()
                    .take(settings.max_examples)
                    .map(|(f, _)| relative_display(library, f))
                    .collect(),
            });
        }
    }

    let album_only = depth_folders(1);
    if album_only.len() > 1 {
        let count: usize = album_only.iter().map(|(_, n)| n).sum();
        let confidence = count as f64 / total as f64;

        if confidence >= settings.album_only_min_confidence {
            matches.push(PatternMatch {
                pattern_type: PatternType::FolderAlbumOnly,
                confidence,
                matching_tracks: count,
                total_tracks: total,
                description: PatternType::FolderAlbumOnly.description().to_string(),
                explanation: format!(
                    "Detected {} album folders with {} tracks.",
                    album_only.len(),
                    count
                ),
                examples: album_only
                    .iter()
                    .take(settings.max_examples)
                    .map(|(f, _)| folder_name(f))
                    .collect(),
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;

    fn library(paths: &[&str]) -> Library {
        let mut library = Library::new("/music");
        for path in paths {
            library.add_track(Track::new(*path));
        }
        library
    }

    #[test]
    fn test_disc_folder_names() {
        assert!(is_disc_folder("Disc 1"));
        assert!(is_disc_folder("CD2"));
        assert!(is_disc_folder("disk 03"));
        assert!(!is_disc_folder("Discography"));
        assert!(!is_disc_folder("Bonus"));
    }

    #[test]
    fn test_flat_library() {
        let lib = library(&["/music/a.mp3", "/music/b.mp3", "/music/c.mp3"]);
        let matches = detect(&lib, &DetectorSettings::default());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern_type, PatternType::FolderFlat);
        assert_eq!(matches[0].confidence, 1.0);
        assert_eq!(matches[0].matching_tracks, 3);
    }

    #[test]
    fn test_artist_album_layout() {
        let lib = library(&[
            "/music/Queen/A Night at the Opera/01.mp3",
            "/music/Queen/A Night at the Opera/02.mp3",
            "/music/Queen/Jazz/01.mp3",
            "/music/Abba/Arrival/01.mp3",
        ]);
        let matches = detect(&lib, &DetectorSettings::default());

        let m = matches
            .iter()
            .find(|m| m.pattern_type == PatternType::FolderArtistAlbum)
            .unwrap();
        assert_eq!(m.confidence, 1.0);
        assert_eq!(
            m.explanation,
            "Detected 2 artist folders containing 3 album folders with 4 tracks."
        );
    }

    #[test]
    fn test_disc_layout_alongside_artist_album() {
        let lib = library(&[
            "/music/Queen/Live/CD1/01.mp3",
            "/music/Queen/Live/CD2/01.mp3",
            "/music/Queen/Jazz/01.mp3",
            "/music/Queen/Jazz/02.mp3",
            "/music/Abba/Arrival/01.mp3",
            "/music/Abba/Arrival/02.mp3",
        ]);
        let matches = detect(&lib, &DetectorSettings::default());

        let disc = matches
            .iter()
            .find(|m| m.pattern_type == PatternType::FolderArtistAlbumDisc)
            .unwrap();
        assert!((disc.confidence - 2.0 / 6.0).abs() < 1e-9);

        let artist_album = matches
            .iter()
            .find(|m| m.pattern_type == PatternType::FolderArtistAlbum)
            .unwrap();
        assert!((artist_album.confidence - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_disc_layout_below_floor_suppressed() {
        let mut paths: Vec<String> = (0..19)
            .map(|i| format!("/music/Artist {}/Album/01.mp3", i % 4))
            .collect();
        paths.push("/music/Queen/Live/CD1/01.mp3".to_string());
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();

        // 1 of 20 tracks sits in a disc folder: 0.05 is under the 0.1 floor
        let matches = detect(&library(&refs), &DetectorSettings::default());
        assert!(matches
            .iter()
            .all(|m| m.pattern_type != PatternType::FolderArtistAlbumDisc));
        assert!(matches
            .iter()
            .any(|m| m.pattern_type == PatternType::FolderArtistAlbum));

        // A second disc track reaches the floor exactly
        paths[0] = "/music/Queen/Live/CD2/01.mp3".to_string();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let matches = detect(&library(&refs), &DetectorSettings::default());
        let disc = matches
            .iter()
            .find(|m| m.pattern_type == PatternType::FolderArtistAlbumDisc)
            .unwrap();
        assert_eq!(disc.matching_tracks, 2);
        assert!((disc.confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_album_only_layout() {
        let lib = library(&[
            "/music/Arrival/01.mp3",
            "/music/Arrival/02.mp3",
            "/music/Jazz/01.mp3",
        ]);
        let matches = detect(&lib, &DetectorSettings::default());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern_type, PatternType::FolderAlbumOnly);
        assert_eq!(matches[0].examples, vec!["Arrival".to_string(), "Jazz".to_string()]);
    }

    #[test]
    fn test_folders_outside_root_ignored() {
        let lib = library(&["/elsewhere/x/y/01.mp3", "/music/Album/01.mp3"]);
        let matches = detect(&lib, &DetectorSettings::default());
        assert!(matches.is_empty());
    }
}
