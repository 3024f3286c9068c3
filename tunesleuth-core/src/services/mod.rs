//! Services around the pattern detector: the scanner that builds a
//! library and the catalog matcher that looks tracks up

pub mod file_scanner;
pub mod metadata_matcher;
pub mod musicbrainz_client;
pub mod rate_limiter;
pub mod similarity;

pub use file_scanner::{ScanError, ScanProgress, Scanner};
pub use metadata_matcher::{
    build_query, calculate_confidence, LookupFields, MetadataMatch, MetadataMatcher,
    MUSICBRAINZ_SOURCE,
};
pub use musicbrainz_client::{CatalogError, MusicBrainzClient, RecordingCatalog};
pub use rate_limiter::RateLimiter;
pub use similarity::fuzzy_similarity;
