//! Pattern detection engine
//!
//! Classifies filenames and folder layouts into pattern types, scores each
//! by coverage, and proposes inferred metadata from the winning filename
//! pattern.

mod detector;
mod filename;
mod folder;
mod inference;
mod special;
mod types;

pub use detector::{Classification, PatternDetector};
pub use filename::classify_stem;
pub use folder::is_disc_folder;
pub use inference::InferenceTable;
pub use types::{ConfidenceLabel, PatternAnalysis, PatternMatch, PatternType};
