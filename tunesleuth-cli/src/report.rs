//! Plain-text rendering of core results

use std::fmt::Write;
use tunesleuth_core::{Library, MetadataMatch, PatternAnalysis, PatternMatch, Track};

const SAMPLE_TRACKS: usize = 5;

pub fn library_summary(library: &Library) -> String {
    let stats = library.calculate_stats();
    let mut out = String::new();

    let _ = writeln!(out, "Library: {}", library.root_path().display());
    let _ = writeln!(out, "  Tracks:          {}", stats.total_tracks);
    let _ = writeln!(out, "  Total size:      {:.2} GB", stats.total_size_gb());
    let _ = writeln!(out, "  Total duration:  {:.1} hours", stats.total_duration_hours());
    let _ = writeln!(
        out,
        "  Complete tags:   {} ({:.0}%)",
        stats.tracks_with_tags,
        stats.tag_coverage_percent()
    );
    let _ = writeln!(out, "  Missing tags:    {}", stats.tracks_without_tags);
    let _ = writeln!(
        out,
        "  Tag completeness: {:.0}%",
        stats.average_tag_completeness * 100.0
    );
    let _ = writeln!(
        out,
        "  Artists / albums / genres: {} / {} / {}",
        stats.unique_artists, stats.unique_albums, stats.unique_genres
    );
    let _ = writeln!(
        out,
        "  Folders:         {} (max depth {})",
        stats.folder_count, stats.max_folder_depth
    );

    if !library.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sample tracks:");
        for track in library.tracks().iter().take(SAMPLE_TRACKS) {
            let status = if track.has_complete_tags() { "+" } else { "-" };
            let _ = writeln!(out, "  {} {}", status, track);
        }
    }

    out
}

fn pattern_section(out: &mut String, heading: &str, patterns: &[PatternMatch], explain: bool) {
    let _ = writeln!(out, "{}", heading);
    if patterns.is_empty() {
        let _ = writeln!(out, "  (none detected)");
    }
    for pattern in patterns {
        let _ = writeln!(
            out,
            "  [{:>3.0}% {}] {} ({}/{} tracks)",
            pattern.confidence_percent(),
            pattern.confidence_label().as_str(),
            pattern.description,
            pattern.matching_tracks,
            pattern.total_tracks
        );
        if explain {
            let _ = writeln!(out, "      {}", pattern.explanation);
            for example in &pattern.examples {
                let _ = writeln!(out, "        e.g. {}", example);
            }
        }
    }
    let _ = writeln!(out);
}

pub fn analysis(analysis: &PatternAnalysis, explain: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyzed {} tracks", analysis.total_tracks());
    let _ = writeln!(out);

    pattern_section(&mut out, "Filename patterns", analysis.filename_patterns(), explain);
    pattern_section(&mut out, "Folder structure patterns", analysis.folder_patterns(), explain);
    pattern_section(&mut out, "Special patterns", analysis.special_patterns(), explain);

    let _ = writeln!(out, "Summary");
    match analysis.primary_filename_pattern() {
        Some(p) => {
            let _ = writeln!(out, "  Files are mostly named '{}'", p);
        }
        None => {
            let _ = writeln!(out, "  No consistent filename pattern");
        }
    }
    match analysis.primary_folder_pattern() {
        Some(p) => {
            let _ = writeln!(out, "  Folders follow '{}'", p);
        }
        None => {
            let _ = writeln!(out, "  No consistent folder structure");
        }
    }

    out
}

pub fn track_matches(
    index: usize,
    total: usize,
    track: &Track,
    matches: &[MetadataMatch],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}/{} {}", index, total, track.filename());

    if matches.is_empty() {
        let _ = writeln!(out, "  No matches found");
    }
    for (rank, m) in matches.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", rank + 1, m);
        if !m.album.is_empty() {
            let _ = writeln!(out, "       Album: {}", m.album);
        }
        if let Some(year) = m.year {
            let _ = writeln!(out, "       Year: {}", year);
        }
    }
    let _ = writeln!(out);

    out
}
