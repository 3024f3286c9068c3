//! # TuneSleuth Core Library
//!
//! Infers how a music collection is organized and matches its tracks against
//! the MusicBrainz catalog:
//! - Track / Library data model with cached groupings and statistics
//! - Scanner collaborator (directory walk + tag extraction)
//! - Pattern detector (filename, folder and special patterns with confidence
//!   scoring, plus inference of missing track fields)
//! - Metadata matcher (rate-limited catalog queries, fuzzy confidence scoring)

pub mod config;
pub mod error;
pub mod models;
pub mod patterns;
pub mod services;

pub use config::{DetectorSettings, MatcherSettings, ScannerSettings, TuneSleuthConfig};
pub use error::{Error, Result};
pub use models::{Album, Artist, InferredFields, Library, LibraryStats, Track};
pub use patterns::{
    Classification, ConfidenceLabel, InferenceTable, PatternAnalysis, PatternDetector,
    PatternMatch, PatternType,
};
pub use services::{
    CatalogError, LookupFields, MetadataMatch, MetadataMatcher, MusicBrainzClient, RateLimiter,
    RecordingCatalog, ScanError, ScanProgress, Scanner,
};
