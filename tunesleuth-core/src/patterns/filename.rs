//! Filename pattern classification
//!
//! Rules are tried in a fixed order, most specific first. A stem is counted
//! under the first rule with any matching regex, so `01 - Song` lands under
//! the numbered form rather than the generic `Artist - Title`.

use super::types::{PatternMatch, PatternType};
use crate::config::DetectorSettings;
use crate::models::{InferredFields, Library};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// One pattern type and the regexes that recognise it
pub(crate) struct FilenameRule {
    pub pattern_type: PatternType,
    regexes: Vec<Regex>,
}

impl FilenameRule {
    fn new(pattern_type: PatternType, patterns: &[&str]) -> Self {
        let regexes = patterns
            .iter()
            .map(|p| Regex::new(p).expect("filename pattern must compile"))
            .collect();
        Self {
            pattern_type,
            regexes,
        }
    }

    pub fn is_match(&self, stem: &str) -> bool {
        self.regexes.iter().any(|r| r.is_match(stem))
    }

    /// Captures from the first regex that matches
    pub fn captures<'s>(&self, stem: &'s str) -> Option<Captures<'s>> {
        self.regexes.iter().find_map(|r| r.captures(stem))
    }
}

/// Specificity-ordered rule table
static FILENAME_RULES: Lazy<Vec<FilenameRule>> = Lazy::new(|| {
    vec![
        FilenameRule::new(
            PatternType::TrackArtistTitle,
            &[
                r"^(\d{1,3})\s*[-._]\s*(.+?)\s*[-_]\s*(.+?)$",
                r"^(\d{1,3})\.\s*(.+?)\s*[-_]\s*(.+?)$",
            ],
        ),
        FilenameRule::new(
            PatternType::TrackTitle,
            &[r"^(\d{1,3})\s*[-._]\s*(.+?)$", r"^(\d{1,3})\.\s*(.+?)$"],
        ),
        FilenameRule::new(
            PatternType::ArtistAlbumTitle,
            &[r"^(.+?)\s*[-_]\s*(.+?)\s*[-_]\s*(.+?)$"],
        ),
        FilenameRule::new(PatternType::ArtistTitle, &[r"^(.+?)\s*[-_]\s*(.+?)$"]),
        FilenameRule::new(PatternType::TitleOnly, &[r"^(.+?)$"]),
    ]
});

pub(crate) fn rules() -> &'static [FilenameRule] {
    &FILENAME_RULES
}

pub(crate) fn rule_for(pattern_type: PatternType) -> Option<&'static FilenameRule> {
    rules().iter().find(|r| r.pattern_type == pattern_type)
}

/// First rule (in specificity order) matching the stem
pub fn classify_stem(stem: &str) -> Option<PatternType> {
    rules()
        .iter()
        .find(|r| r.is_match(stem))
        .map(|r| r.pattern_type)
}

/// Count every track under its first matching rule and score each rule
pub(crate) fn detect(library: &Library, settings: &DetectorSettings) -> Vec<PatternMatch> {
    let total = library.len();
    if total == 0 {
        return Vec::new();
    }

    let mut buckets: Vec<(PatternType, Vec<String>)> =
        rules().iter().map(|r| (r.pattern_type, Vec::new())).collect();

    for track in library.tracks() {
        let stem = track.stem();
        match rules().iter().position(|r| r.is_match(&stem)) {
            Some(index) => {
                debug!(stem = %stem, pattern = ?buckets[index].0, "Classified filename");
                buckets[index].1.push(track.filename().to_string());
            }
            None => debug!(stem = %stem, "Filename matched no pattern"),
        }
    }

    buckets
        .into_iter()
        .filter(|(_, matched)| !matched.is_empty())
        .filter_map(|(pattern_type, matched)| {
            let count = matched.len();
            let confidence = count as f64 / total as f64;

            if confidence < settings.filename_min_confidence
                && count < settings.filename_min_matches
            {
                return None;
            }

            let description = pattern_type.description().to_string();
            let explanation = format!(
                "{} of {} files ({:.0}%) match the '{}' naming pattern.",
                count,
                total,
                confidence * 100.0,
                description
            );

            Some(PatternMatch {
                pattern_type,
                confidence,
                matching_tracks: count,
                total_tracks: total,
                description,
                explanation,
                examples: matched.into_iter().take(settings.max_examples).collect(),
            })
        })
        .collect()
}

fn group(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn group_number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

/// Fields the capture groups of `pattern_type` propose for one stem
///
/// Returns `None` when the rule does not match. Folder-based inference is
/// not applied here.
pub(crate) fn infer_from_stem(pattern_type: PatternType, stem: &str) -> Option<InferredFields> {
    let caps = rule_for(pattern_type)?.captures(stem)?;

    let fields = match pattern_type {
        PatternType::TrackArtistTitle => InferredFields {
            track_number: group_number(&caps, 1),
            artist: group(&caps, 2),
            title: group(&caps, 3),
            ..Default::default()
        },
        PatternType::TrackTitle => InferredFields {
            track_number: group_number(&caps, 1),
            title: group(&caps, 2),
            ..Default::default()
        },
        PatternType::ArtistAlbumTitle => InferredFields {
            artist: group(&caps, 1),
            album: group(&caps, 2),
            title: group(&caps, 3),
            ..Default::default()
        },
        PatternType::ArtistTitle => InferredFields {
            artist: group(&caps, 1),
            title: group(&caps, 2),
            ..Default::default()
        },
        PatternType::TitleOnly => InferredFields {
            title: group(&caps, 1),
            ..Default::default()
        },
        _ => return None,
    };

    Some(fields)
}

/// Whether this filename pattern also draws artist/album from folders
pub(crate) fn uses_folder_inference(pattern_type: PatternType) -> bool {
    matches!(pattern_type, PatternType::TrackTitle | PatternType::TitleOnly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;

    #[test]
    fn test_numbered_wins_over_artist_title() {
        assert_eq!(classify_stem("01 - Song"), Some(PatternType::TrackTitle));
        assert_eq!(classify_stem("01. Song"), Some(PatternType::TrackTitle));
        assert_eq!(
            classify_stem("01 - Artist - Song"),
            Some(PatternType::TrackArtistTitle)
        );
    }

    #[test]
    fn test_classify_generic_forms() {
        assert_eq!(classify_stem("Queen - Bohemian Rhapsody"), Some(PatternType::ArtistTitle));
        assert_eq!(
            classify_stem("Queen - A Night at the Opera - Bohemian Rhapsody"),
            Some(PatternType::ArtistAlbumTitle)
        );
        assert_eq!(classify_stem("Bohemian Rhapsody"), Some(PatternType::TitleOnly));
        assert_eq!(classify_stem(""), None);
    }

    #[test]
    fn test_infer_track_artist_title() {
        let fields = infer_from_stem(PatternType::TrackArtistTitle, "07 - Queen - Love of My Life")
            .unwrap();
        assert_eq!(fields.track_number, Some(7));
        assert_eq!(fields.artist.as_deref(), Some("Queen"));
        assert_eq!(fields.title.as_deref(), Some("Love of My Life"));
        assert_eq!(fields.album, None);
    }

    #[test]
    fn test_infer_trims_groups() {
        let fields =
            infer_from_stem(PatternType::ArtistTitle, "Queen  _  Bohemian Rhapsody").unwrap();
        assert_eq!(fields.artist.as_deref(), Some("Queen"));
        assert_eq!(fields.title.as_deref(), Some("Bohemian Rhapsody"));
    }

    #[test]
    fn test_infer_returns_none_when_rule_misses() {
        assert!(infer_from_stem(PatternType::TrackTitle, "No Number Here").is_none());
        assert!(infer_from_stem(PatternType::FolderFlat, "01 - Song").is_none());
    }

    #[test]
    fn test_detect_scores_and_suppresses() {
        let mut library = Library::new("/music");
        for i in 1..=19 {
            library.add_track(Track::new(format!("/music/Artist{} - Song{}.mp3", i, i)));
        }
        library.add_track(Track::new("/music/Lonely.mp3"));

        let matches = detect(&library, &DetectorSettings::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern_type, PatternType::ArtistTitle);
        assert_eq!(matches[0].matching_tracks, 19);
        assert_eq!(matches[0].total_tracks, 20);
        assert_eq!(matches[0].examples.len(), 3);
    }

    #[test]
    fn test_detect_keeps_small_absolute_cluster() {
        let mut library = Library::new("/music");
        for i in 1..=95 {
            library.add_track(Track::new(format!("/music/Artist - Song{}.mp3", i)));
        }
        for i in 1..=5 {
            library.add_track(Track::new(format!("/music/Title{}.mp3", i)));
        }

        let matches = detect(&library, &DetectorSettings::default());
        let title_only = matches
            .iter()
            .find(|m| m.pattern_type == PatternType::TitleOnly)
            .expect("five matches survive the coverage floor");
        assert_eq!(title_only.matching_tracks, 5);
        assert!((title_only.confidence - 0.05).abs() < 1e-9);
    }
}
