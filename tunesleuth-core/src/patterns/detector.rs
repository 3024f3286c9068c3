//! Pattern detector
//!
//! Detection runs in two phases:
//! 1. `classify` scores filename, folder and special patterns and proposes
//!    inferred fields from the primary filename pattern. Nothing is mutated.
//! 2. `apply_inferences` merges the proposals onto the library's tracks.
//!
//! `analyze` runs both.

use super::inference::InferenceTable;
use super::types::PatternAnalysis;
use super::{filename, folder, special};
use crate::config::DetectorSettings;
use crate::models::Library;
use tracing::{debug, info};

/// Output of the classification phase
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub analysis: PatternAnalysis,
    pub inferences: InferenceTable,
}

pub struct PatternDetector {
    settings: DetectorSettings,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::with_settings(DetectorSettings::default())
    }

    pub fn with_settings(settings: DetectorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Score every pattern family and propose inferred fields
    pub fn classify(&self, library: &Library) -> Classification {
        if library.is_empty() {
            debug!("Library is empty, nothing to classify");
            return Classification {
                analysis: PatternAnalysis::default(),
                inferences: InferenceTable::new(),
            };
        }

        let analysis = PatternAnalysis::new(
            library.len(),
            filename::detect(library, &self.settings),
            folder::detect(library, &self.settings),
            special::detect(library, &self.settings),
        );

        let inferences = match analysis.primary_filename_pattern() {
            Some(primary) => {
                info!(
                    pattern = primary.description.as_str(),
                    confidence = primary.confidence,
                    "Primary filename pattern"
                );
                InferenceTable::build(library, primary.pattern_type)
            }
            None => InferenceTable::new(),
        };

        debug!(
            filename = analysis.filename_patterns().len(),
            folder = analysis.folder_patterns().len(),
            special = analysis.special_patterns().len(),
            proposals = inferences.len(),
            "Classification complete"
        );

        Classification {
            analysis,
            inferences,
        }
    }

    /// Merge proposed fields onto tracks; returns the number of tracks touched
    pub fn apply_inferences(&self, library: &mut Library, inferences: &InferenceTable) -> usize {
        if inferences.is_empty() {
            return 0;
        }

        let mut applied = 0;
        for track in library.tracks_mut() {
            if let Some(fields) = inferences.get(track.path()) {
                track.apply_inferred(fields);
                applied += 1;
            }
        }

        info!(tracks = applied, "Applied inferred metadata");
        applied
    }

    /// Classify the library and apply the resulting inferences
    pub fn analyze(&self, library: &mut Library) -> PatternAnalysis {
        let Classification {
            analysis,
            inferences,
        } = self.classify(library);
        self.apply_inferences(library, &inferences);
        analysis
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}
