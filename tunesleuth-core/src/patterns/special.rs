//! Structural conventions that cut across filename and folder layout

use super::folder::folder_name;
use super::types::{PatternMatch, PatternType};
use crate::config::DetectorSettings;
use crate::models::Library;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;

static NUMBERED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\s*[-._]").expect("prefix pattern must compile"));

static FOLDER_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\(\[]\s*(\d{4})\s*[\)\]]").expect("year pattern must compile")
});

pub(crate) fn detect(library: &Library, settings: &DetectorSettings) -> Vec<PatternMatch> {
    if library.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    matches.extend(numbered_prefix(library, settings));
    matches.extend(year_in_folder(library, settings));
    matches.extend(compilation(library, settings));
    matches
}

fn numbered_prefix(library: &Library, settings: &DetectorSettings) -> Option<PatternMatch> {
    let total = library.len();
    let numbered: Vec<&str> = library
        .tracks()
        .iter()
        .filter(|t| NUMBERED_PREFIX.is_match(&t.stem()))
        .map(|t| t.filename())
        .collect();

    let confidence = numbered.len() as f64 / total as f64;
    if numbered.is_empty() || confidence < settings.numbered_prefix_min_confidence {
        return None;
    }

    Some(PatternMatch {
        pattern_type: PatternType::NumberedPrefix,
        confidence,
        matching_tracks: numbered.len(),
        total_tracks: total,
        description: PatternType::NumberedPrefix.description().to_string(),
        explanation: format!(
            "{} of {} files ({:.0}%) start with a track number.",
            numbered.len(),
            total,
            confidence * 100.0
        ),
        examples: numbered
            .iter()
            .take(settings.max_examples)
            .map(|s| s.to_string())
            .collect(),
    })
}

fn year_in_folder(library: &Library, settings: &DetectorSettings) -> Option<PatternMatch> {
    let total = library.len();
    let mut count = 0;
    let mut examples = Vec::new();

    for (folder, indices) in library.folders() {
        let name = folder_name(folder);
        if FOLDER_YEAR.is_match(&name) {
            count += indices.len();
            if examples.len() < settings.max_examples {
                examples.push(name);
            }
        }
    }

    let confidence = count as f64 / total as f64;
    if count == 0 || confidence < settings.year_in_folder_min_confidence {
        return None;
    }

    Some(PatternMatch {
        pattern_type: PatternType::YearInFolder,
        confidence,
        matching_tracks: count,
        total_tracks: total,
        description: PatternType::YearInFolder.description().to_string(),
        explanation: format!(
            "{} of {} tracks ({:.0}%) are in folders with a year in the name.",
            count,
            total,
            confidence * 100.0
        ),
        examples,
    })
}

/// Folders flagged by a name indicator, then by artist diversity; no folder twice
fn compilation_folders<'a>(
    library: &'a Library,
    settings: &DetectorSettings,
) -> Vec<(&'a PathBuf, usize)> {
    let folders = library.folders();
    let mut flagged: Vec<(&PathBuf, usize)> = Vec::new();
    let mut seen: HashSet<&PathBuf> = HashSet::new();

    for (folder, indices) in folders {
        let name = folder_name(folder).to_lowercase();
        let named = settings
            .compilation_indicators
            .iter()
            .any(|indicator| name.contains(indicator.to_lowercase().as_str()));
        if named && seen.insert(folder) {
            flagged.push((folder, indices.len()));
        }
    }

    for (folder, indices) in folders {
        if indices.len() < settings.compilation_min_folder_tracks {
            continue;
        }
        let artists: HashSet<&str> = indices
            .iter()
            .filter_map(|&i| library.tracks()[i].known_artist())
            .collect();
        let diverse =
            artists.len() as f64 >= indices.len() as f64 * settings.compilation_artist_diversity;
        if diverse && seen.insert(folder) {
            flagged.push((folder, indices.len()));
        }
    }

    flagged
}

fn compilation(library: &Library, settings: &DetectorSettings) -> Option<PatternMatch> {
    let total = library.len();
    let flagged = compilation_folders(library, settings);
    let count: usize = flagged.iter().map(|(_, n)| n).sum();

    let confidence = (count as f64 / total as f64).min(1.0);
    if count == 0 || confidence < settings.compilation_min_confidence {
        return None;
    }

    Some(PatternMatch {
        pattern_type: PatternType::Compilation,
        confidence,
        matching_tracks: count,
        total_tracks: total,
        description: PatternType::Compilation.description().to_string(),
        explanation: format!(
            "Detected {} compilation folders with {} tracks.",
            flagged.len(),
            count
        ),
        examples: flagged
            .iter()
            .take(settings.max_examples)
            .map(|(f, _)| folder_name(f))
            .collect(),
    })
}
