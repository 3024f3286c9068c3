//! Pattern detection result types

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Organizational conventions the detector can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// `01 - Artist - Title`
    TrackArtistTitle,
    /// `01 - Title`
    TrackTitle,
    /// `Artist - Album - Title`
    ArtistAlbumTitle,
    /// `Artist - Title`
    ArtistTitle,
    /// `Title`
    TitleOnly,

    /// `Artist/Album/tracks`
    FolderArtistAlbum,
    /// `Artist/Album/Disc N/tracks`
    FolderArtistAlbumDisc,
    /// `Album/tracks`
    FolderAlbumOnly,
    /// Every track in one folder
    FolderFlat,

    /// Various-artists folders
    Compilation,
    /// Filenames start with a track number
    NumberedPrefix,
    /// `Album (1999)` style folder names
    YearInFolder,
}

impl PatternType {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            PatternType::TrackArtistTitle => "## - Artist - Title",
            PatternType::TrackTitle => "## - Title (numbered)",
            PatternType::ArtistAlbumTitle => "Artist - Album - Title",
            PatternType::ArtistTitle => "Artist - Title",
            PatternType::TitleOnly => "Title only",
            PatternType::FolderArtistAlbum => "Artist / Album structure",
            PatternType::FolderArtistAlbumDisc => "Artist / Album / Disc structure",
            PatternType::FolderAlbumOnly => "Album folders only",
            PatternType::FolderFlat => "Flat (single folder)",
            PatternType::Compilation => "Compilation / Various Artists",
            PatternType::NumberedPrefix => "Track number prefix",
            PatternType::YearInFolder => "Year in folder name",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Fixed confidence bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLabel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLabel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            ConfidenceLabel::VeryHigh
        } else if confidence >= 0.75 {
            ConfidenceLabel::High
        } else if confidence >= 0.5 {
            ConfidenceLabel::Medium
        } else if confidence >= 0.25 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::VeryHigh => "Very High",
            ConfidenceLabel::High => "High",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::Low => "Low",
            ConfidenceLabel::VeryLow => "Very Low",
        }
    }
}

/// A scored hypothesis about how the library is organized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub pattern_type: PatternType,
    /// Coverage in 0.0-1.0
    pub confidence: f64,
    pub matching_tracks: usize,
    pub total_tracks: usize,
    pub description: String,
    pub explanation: String,
    pub examples: Vec<String>,
}

impl PatternMatch {
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }

    pub fn confidence_label(&self) -> ConfidenceLabel {
        ConfidenceLabel::from_confidence(self.confidence)
    }
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.0}% confidence)",
            self.description,
            self.confidence_percent()
        )
    }
}

/// Stable sort, highest confidence first
pub(crate) fn sort_by_confidence(matches: &mut [PatternMatch]) {
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
}

/// Complete analysis results for a library
///
/// Each list is sorted by descending confidence on construction and is
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternAnalysis {
    total_tracks: usize,
    filename_patterns: Vec<PatternMatch>,
    folder_patterns: Vec<PatternMatch>,
    special_patterns: Vec<PatternMatch>,
}

impl PatternAnalysis {
    pub fn new(
        total_tracks: usize,
        mut filename_patterns: Vec<PatternMatch>,
        mut folder_patterns: Vec<PatternMatch>,
        mut special_patterns: Vec<PatternMatch>,
    ) -> Self {
        sort_by_confidence(&mut filename_patterns);
        sort_by_confidence(&mut folder_patterns);
        sort_by_confidence(&mut special_patterns);

        Self {
            total_tracks,
            filename_patterns,
            folder_patterns,
            special_patterns,
        }
    }

    /// Number of tracks the analysis covered
    pub fn total_tracks(&self) -> usize {
        self.total_tracks
    }

    pub fn filename_patterns(&self) -> &[PatternMatch] {
        &self.filename_patterns
    }

    pub fn folder_patterns(&self) -> &[PatternMatch] {
        &self.folder_patterns
    }

    pub fn special_patterns(&self) -> &[PatternMatch] {
        &self.special_patterns
    }

    /// Every detected pattern, highest confidence first
    pub fn all_patterns(&self) -> Vec<&PatternMatch> {
        let mut all: Vec<&PatternMatch> = self
            .filename_patterns
            .iter()
            .chain(&self.folder_patterns)
            .chain(&self.special_patterns)
            .collect();
        all.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        all
    }

    pub fn primary_filename_pattern(&self) -> Option<&PatternMatch> {
        self.filename_patterns.first()
    }

    pub fn primary_folder_pattern(&self) -> Option<&PatternMatch> {
        self.folder_patterns.first()
    }

    pub fn primary_special_pattern(&self) -> Option<&PatternMatch> {
        self.special_patterns.first()
    }

    pub fn is_empty(&self) -> bool {
        self.filename_patterns.is_empty()
            && self.folder_patterns.is_empty()
            && self.special_patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(pattern_type: PatternType, confidence: f64) -> PatternMatch {
        PatternMatch {
            pattern_type,
            confidence,
            matching_tracks: 0,
            total_tracks: 10,
            description: pattern_type.description().to_string(),
            explanation: String::new(),
            examples: Vec::new(),
        }
    }

    #[test]
    fn test_confidence_labels() {
        assert_eq!(ConfidenceLabel::from_confidence(0.95).as_str(), "Very High");
        assert_eq!(ConfidenceLabel::from_confidence(0.9).as_str(), "Very High");
        assert_eq!(ConfidenceLabel::from_confidence(0.8).as_str(), "High");
        assert_eq!(ConfidenceLabel::from_confidence(0.75).as_str(), "High");
        assert_eq!(ConfidenceLabel::from_confidence(0.5).as_str(), "Medium");
        assert_eq!(ConfidenceLabel::from_confidence(0.3).as_str(), "Low");
        assert_eq!(ConfidenceLabel::from_confidence(0.1).as_str(), "Very Low");
    }

    #[test]
    fn test_pattern_match_display() {
        let m = pattern(PatternType::ArtistTitle, 0.85);
        assert_eq!(m.to_string(), "Artist - Title (85% confidence)");
        assert_eq!(m.confidence_label(), ConfidenceLabel::High);
    }

    #[test]
    fn test_lists_sorted_on_construction() {
        let analysis = PatternAnalysis::new(
            10,
            vec![
                pattern(PatternType::TitleOnly, 0.2),
                pattern(PatternType::ArtistTitle, 0.8),
            ],
            vec![],
            vec![],
        );

        assert_eq!(
            analysis.primary_filename_pattern().map(|p| p.pattern_type),
            Some(PatternType::ArtistTitle)
        );
        assert!(analysis.primary_folder_pattern().is_none());
    }

    #[test]
    fn test_all_patterns_sorted_across_lists() {
        let analysis = PatternAnalysis::new(
            10,
            vec![pattern(PatternType::ArtistTitle, 0.4)],
            vec![pattern(PatternType::FolderFlat, 1.0)],
            vec![
                pattern(PatternType::NumberedPrefix, 0.3),
                pattern(PatternType::Compilation, 0.6),
            ],
        );

        let confidences: Vec<f64> = analysis.all_patterns().iter().map(|p| p.confidence).collect();
        assert_eq!(confidences, vec![1.0, 0.6, 0.4, 0.3]);
    }

    #[test]
    fn test_empty_analysis() {
        let analysis = PatternAnalysis::default();
        assert!(analysis.is_empty());
        assert!(analysis.all_patterns().is_empty());
        assert!(analysis.primary_filename_pattern().is_none());
    }
}
