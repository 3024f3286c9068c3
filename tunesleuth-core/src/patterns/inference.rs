//! Proposed inferred fields, kept apart from the tracks until applied

use super::filename::{infer_from_stem, uses_folder_inference};
use super::types::PatternType;
use crate::models::{InferredFields, Library, Track};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Inferred fields proposed for each track, keyed by track path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceTable {
    entries: HashMap<PathBuf, InferredFields>,
}

impl InferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose fields for a track; empty proposals are not stored
    pub fn insert(&mut self, path: impl Into<PathBuf>, fields: InferredFields) {
        if !fields.is_empty() {
            self.entries.insert(path.into(), fields);
        }
    }

    pub fn get(&self, path: &Path) -> Option<&InferredFields> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &InferredFields)> {
        self.entries.iter().map(|(p, f)| (p.as_path(), f))
    }

    /// Run the primary filename pattern over every track
    pub(crate) fn build(library: &Library, primary: PatternType) -> Self {
        let mut table = Self::new();

        for track in library.tracks() {
            let Some(mut fields) = infer_from_stem(primary, &track.stem()) else {
                continue;
            };
            if uses_folder_inference(primary) {
                infer_from_folder(library.root_path(), track, &mut fields);
            }
            table.insert(track.path(), fields);
        }

        table
    }
}

/// Fill artist/album from the folders between the root and the track
///
/// Two or more segments give artist then album; one gives the album.
/// Fields already proposed are kept.
pub(crate) fn infer_from_folder(root: &Path, track: &Track, fields: &mut InferredFields) {
    let Ok(relative) = track.folder().strip_prefix(root) else {
        return;
    };
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    match parts.as_slice() {
        [] => {}
        [album] => {
            fields.album.get_or_insert_with(|| album.clone());
        }
        [artist, album, ..] => {
            fields.artist.get_or_insert_with(|| artist.clone());
            fields.album.get_or_insert_with(|| album.clone());
        }
    }
}
