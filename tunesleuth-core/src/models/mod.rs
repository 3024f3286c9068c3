//! Data models for scanned tracks and the library that owns them

pub mod library;
pub mod track;

pub use library::{Album, Artist, Library, LibraryStats};
pub use track::{InferredFields, Track, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
