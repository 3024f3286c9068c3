//! Pattern detection behaviour over whole libraries
//!
//! Libraries are built in memory from paths alone; the scanner end-to-end
//! case at the bottom writes untagged files into a temporary directory.

use std::fs;
use tempfile::TempDir;
use tunesleuth_core::{Library, PatternDetector, PatternType, Scanner, ScannerSettings, Track};

fn library_from(root: &str, paths: &[String]) -> Library {
    let mut library = Library::new(root);
    for path in paths {
        library.add_track(Track::new(path.as_str()));
    }
    library
}

// ============================================================================
// Filename patterns
// ============================================================================

#[test]
fn test_artist_title_library() {
    let artists = ["Queen", "Abba", "Blur", "Oasis", "Pulp"];
    let paths: Vec<String> = artists
        .iter()
        .enumerate()
        .map(|(i, a)| format!("/music/{} - Song {}.mp3", a, i + 1))
        .collect();
    let mut library = library_from("/music", &paths);

    let analysis = PatternDetector::new().analyze(&mut library);

    let primary = analysis.primary_filename_pattern().unwrap();
    assert_eq!(primary.pattern_type, PatternType::ArtistTitle);
    assert!(primary.confidence > 0.9);

    for track in library.tracks() {
        assert!(track.inferred().artist.is_some(), "{}", track.filename());
        assert!(track.inferred().title.is_some(), "{}", track.filename());
    }
    assert_eq!(library.tracks()[2].inferred().artist.as_deref(), Some("Blur"));
    assert_eq!(library.tracks()[2].inferred().title.as_deref(), Some("Song 3"));
}

#[test]
fn test_numbered_track_library() {
    let titles = ["Opening", "Theme", "Chase", "Finale", "Credits"];
    let paths: Vec<String> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("/music/Score/{:02} - {}.mp3", i + 1, t))
        .collect();
    let mut library = library_from("/music", &paths);

    let analysis = PatternDetector::new().analyze(&mut library);

    let primary = analysis.primary_filename_pattern().unwrap();
    assert_eq!(primary.pattern_type, PatternType::TrackTitle);
    assert!(primary.confidence > 0.9);

    let numbered = analysis
        .special_patterns()
        .iter()
        .find(|p| p.pattern_type == PatternType::NumberedPrefix)
        .unwrap();
    assert!(numbered.confidence > 0.9);

    let last = &library.tracks()[4];
    assert_eq!(last.inferred().track_number, Some(5));
    assert_eq!(last.inferred().title.as_deref(), Some("Credits"));
    assert_eq!(last.inferred().album.as_deref(), Some("Score"));
}

#[test]
fn test_unmatched_filenames_lower_every_confidence() {
    let mut paths: Vec<String> = (1..=6)
        .map(|i| format!("/music/Artist {} - Title.mp3", i))
        .collect();
    // Stems spanning a line break match no pattern
    paths.push("/music/first\nline.mp3".to_string());
    paths.push("/music/second\nline.mp3".to_string());
    let library = library_from("/music", &paths);

    let analysis = PatternDetector::new().classify(&library).analysis;
    let primary = analysis.primary_filename_pattern().unwrap();
    assert_eq!(primary.matching_tracks, 6);
    assert_eq!(primary.total_tracks, 8);
}

#[test]
fn test_filename_confidences_bounded() {
    let paths: Vec<String> = [
        "01 - A - B",
        "02 - C",
        "X - Y - Z",
        "Artist - Title",
        "Plain",
        "03. Dotted",
    ]
    .iter()
    .map(|s| format!("/music/{}.mp3", s))
    .collect();
    let library = library_from("/music", &paths);

    let analysis = PatternDetector::new().classify(&library).analysis;
    let covered: usize = analysis
        .filename_patterns()
        .iter()
        .map(|p| p.matching_tracks)
        .sum();
    assert!(covered <= library.len());
    for p in analysis.filename_patterns() {
        assert!((0.0..=1.0).contains(&p.confidence));
        assert_eq!(p.total_tracks, library.len());
    }
}

// ============================================================================
// Folder patterns
// ============================================================================

#[test]
fn test_artist_album_structure() {
    let paths: Vec<String> = vec![
        "/music/Queen/Jazz/01 - Mustapha.mp3".into(),
        "/music/Queen/Jazz/02 - Fat Bottomed Girls.mp3".into(),
        "/music/Queen/Innuendo/01 - Innuendo.mp3".into(),
        "/music/Abba/Arrival/01 - When I Kissed the Teacher.mp3".into(),
        "/music/Abba/Arrival/02 - Dancing Queen.mp3".into(),
    ];
    let mut library = library_from("/music", &paths);

    let analysis = PatternDetector::new().analyze(&mut library);

    assert!(analysis
        .folder_patterns()
        .iter()
        .any(|p| p.pattern_type == PatternType::FolderArtistAlbum));

    // Numbered titles pull artist and album from the folders
    let track = &library.tracks()[3];
    assert_eq!(track.inferred().artist.as_deref(), Some("Abba"));
    assert_eq!(track.inferred().album.as_deref(), Some("Arrival"));
    assert_eq!(track.display_artist(), "Abba");
}

#[test]
fn test_single_folder_is_flat() {
    for size in [1, 7, 40] {
        let paths: Vec<String> = (0..size)
            .map(|i| format!("/music/Dump/track{}.mp3", i))
            .collect();
        let library = library_from("/music", &paths);

        let analysis = PatternDetector::new().classify(&library).analysis;
        assert_eq!(analysis.folder_patterns().len(), 1);
        let flat = &analysis.folder_patterns()[0];
        assert_eq!(flat.pattern_type, PatternType::FolderFlat);
        assert_eq!(flat.confidence, 1.0);
    }
}

#[test]
fn test_empty_library() {
    let mut library = Library::new("/music");
    let analysis = PatternDetector::new().analyze(&mut library);

    assert!(analysis.filename_patterns().is_empty());
    assert!(analysis.folder_patterns().is_empty());
    assert!(analysis.primary_filename_pattern().is_none());
    assert!(analysis.primary_folder_pattern().is_none());
    assert_eq!(library.len(), 0);
}

// ============================================================================
// Analysis structure
// ============================================================================

#[test]
fn test_all_patterns_sorted() {
    let paths: Vec<String> = vec![
        "/music/Various Artists/Hits (1999)/01 - Queen - Radio Ga Ga.mp3".into(),
        "/music/Various Artists/Hits (1999)/02 - Abba - SOS.mp3".into(),
        "/music/Queen/Jazz/Mustapha.mp3".into(),
        "/music/Queen/Jazz/Dead on Time.mp3".into(),
        "/music/Queen/Live/CD1/Intro.mp3".into(),
        "/music/loose - file.mp3".into(),
    ];
    let library = library_from("/music", &paths);

    let analysis = PatternDetector::new().classify(&library).analysis;
    let all = analysis.all_patterns();
    assert!(!all.is_empty());
    for pair in all.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    assert_eq!(
        all.len(),
        analysis.filename_patterns().len()
            + analysis.folder_patterns().len()
            + analysis.special_patterns().len()
    );
}

#[test]
fn test_classification_separate_from_application() {
    let paths: Vec<String> = vec![
        "/music/Queen - Jazz.mp3".into(),
        "/music/Abba - Waterloo.mp3".into(),
    ];
    let mut library = library_from("/music", &paths);
    let detector = PatternDetector::new();

    let classification = detector.classify(&library);
    assert!(library.tracks().iter().all(|t| t.inferred().is_empty()));
    assert_eq!(classification.inferences.len(), 2);

    let touched = detector.apply_inferences(&mut library, &classification.inferences);
    assert_eq!(touched, 2);
    assert_eq!(library.tracks()[0].inferred().artist.as_deref(), Some("Queen"));
}

#[test]
fn test_analysis_serializes_to_json() {
    let paths: Vec<String> = vec!["/music/Queen - Jazz.mp3".into()];
    let mut library = library_from("/music", &paths);
    let analysis = PatternDetector::new().analyze(&mut library);

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["filename_patterns"][0]["pattern_type"], "artist_title");
    assert_eq!(json["folder_patterns"][0]["pattern_type"], "folder_flat");
}

// ============================================================================
// Scanner end to end
// ============================================================================

#[test]
fn test_scan_then_analyze_untagged_tree() {
    let dir = TempDir::new().unwrap();
    for (artist, album, titles) in [
        ("Queen", "Jazz", ["Mustapha", "Fun It"]),
        ("Abba", "Arrival", ["Dancing Queen", "Knowing Me"]),
    ] {
        let folder = dir.path().join(artist).join(album);
        fs::create_dir_all(&folder).unwrap();
        for (i, title) in titles.iter().enumerate() {
            let name = format!("{:02} - {}.mp3", i + 1, title);
            fs::write(folder.join(name), b"not audio").unwrap();
        }
    }

    let mut library = Scanner::new(ScannerSettings::default())
        .scan(dir.path())
        .unwrap();
    assert_eq!(library.len(), 4);

    let analysis = PatternDetector::new().analyze(&mut library);
    assert_eq!(
        analysis.primary_filename_pattern().map(|p| p.pattern_type),
        Some(PatternType::TrackTitle)
    );
    assert_eq!(
        analysis.primary_folder_pattern().map(|p| p.pattern_type),
        Some(PatternType::FolderArtistAlbum)
    );

    // Tracks come back sorted: Abba before Queen
    let first = &library.tracks()[0];
    assert_eq!(first.inferred().artist.as_deref(), Some("Abba"));
    assert_eq!(first.inferred().album.as_deref(), Some("Arrival"));
    assert_eq!(first.inferred().title.as_deref(), Some("Dancing Queen"));
    assert_eq!(library.artists().len(), 2);
}
