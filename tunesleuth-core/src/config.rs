//! Configuration loading and validation
//!
//! Config file resolution priority:
//! 1. Path given on the command line
//! 2. `TUNESLEUTH_CONFIG` environment variable
//! 3. `<config dir>/tunesleuth/config.toml`
//! 4. Compiled defaults
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! A file given explicitly on the command line must exist and parse.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming an alternate config file
pub const CONFIG_ENV_VAR: &str = "TUNESLEUTH_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneSleuthConfig {
    pub logging: LoggingConfig,
    pub scanner: ScannerSettings,
    pub detector: DetectorSettings,
    pub matcher: MatcherSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Directory walk settings for the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Audio file extensions to include (case-insensitive, no leading dot)
    pub extensions: Vec<String>,
    /// Entries whose name contains any of these are skipped
    pub ignore_patterns: Vec<String>,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".to_string()],
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
            follow_links: false,
            max_depth: None,
        }
    }
}

/// Classification thresholds for the pattern detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Filename patterns below this coverage are dropped...
    pub filename_min_confidence: f64,
    /// ...unless at least this many tracks match
    pub filename_min_matches: usize,

    pub artist_album_min_confidence: f64,
    pub disc_min_confidence: f64,
    pub album_only_min_confidence: f64,

    pub numbered_prefix_min_confidence: f64,
    pub year_in_folder_min_confidence: f64,
    pub compilation_min_confidence: f64,

    /// Lowercase substrings marking a folder as a compilation
    pub compilation_indicators: Vec<String>,
    /// Folders with fewer tracks skip the artist diversity check
    pub compilation_min_folder_tracks: usize,
    /// Distinct artists / tracks ratio at or above which a folder is a compilation
    pub compilation_artist_diversity: f64,

    /// Literal examples kept per pattern match
    pub max_examples: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            filename_min_confidence: 0.1,
            filename_min_matches: 5,
            artist_album_min_confidence: 0.5,
            disc_min_confidence: 0.1,
            album_only_min_confidence: 0.5,
            numbered_prefix_min_confidence: 0.25,
            year_in_folder_min_confidence: 0.1,
            compilation_min_confidence: 0.05,
            compilation_indicators: ["various artists", "va ", "compilation", "soundtrack", "ost"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            compilation_min_folder_tracks: 5,
            compilation_artist_diversity: 0.7,
            max_examples: 3,
        }
    }
}

impl DetectorSettings {
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("filename_min_confidence", self.filename_min_confidence),
            ("artist_album_min_confidence", self.artist_album_min_confidence),
            ("disc_min_confidence", self.disc_min_confidence),
            ("album_only_min_confidence", self.album_only_min_confidence),
            ("numbered_prefix_min_confidence", self.numbered_prefix_min_confidence),
            ("year_in_folder_min_confidence", self.year_in_folder_min_confidence),
            ("compilation_min_confidence", self.compilation_min_confidence),
            ("compilation_artist_diversity", self.compilation_artist_diversity),
        ];

        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "detector.{} must be within 0.0-1.0 (got {})",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Catalog connection and lookup settings for the metadata matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    pub base_url: String,
    pub app_name: String,
    pub app_version: String,
    /// Contact address sent in the User-Agent (recommended by MusicBrainz)
    pub contact: String,
    /// Maximum catalog queries per second
    pub rate_limit_per_second: f64,
    pub timeout_secs: u64,
    /// Result limit used when the caller does not give one
    pub default_limit: usize,
    /// Internal uppercase letters needed to flag a space-free artist tag as
    /// mangled camel case; 0 disables the check
    pub camel_case_min_internal_uppercase: usize,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            base_url: "https://musicbrainz.org/ws/2".to_string(),
            app_name: "TuneSleuth".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            contact: String::new(),
            rate_limit_per_second: 1.0,
            timeout_secs: 30,
            default_limit: 5,
            camel_case_min_internal_uppercase: 1,
        }
    }
}

impl MatcherSettings {
    /// User-Agent string identifying this application to the catalog
    pub fn user_agent(&self) -> String {
        if self.contact.trim().is_empty() {
            format!("{}/{}", self.app_name, self.app_version)
        } else {
            format!("{}/{} ( {} )", self.app_name, self.app_version, self.contact.trim())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rate_limit_per_second.is_finite() || self.rate_limit_per_second <= 0.0 {
            return Err(Error::Config(format!(
                "matcher.rate_limit_per_second must be a positive number (got {})",
                self.rate_limit_per_second
            )));
        }
        if Duration::try_from_secs_f64(1.0 / self.rate_limit_per_second).is_err() {
            return Err(Error::Config(format!(
                "matcher.rate_limit_per_second is too small (got {})",
                self.rate_limit_per_second
            )));
        }
        if self.default_limit == 0 {
            return Err(Error::Config(
                "matcher.default_limit must be at least 1".to_string(),
            ));
        }
        if self.app_name.trim().is_empty() {
            return Err(Error::Config("matcher.app_name must not be empty".to_string()));
        }
        Ok(())
    }
}

impl TuneSleuthConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TuneSleuthConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.matcher.validate()
    }

    /// Resolve and load configuration following the documented priority
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        // Priority 1: command-line argument
        if let Some(path) = cli_path {
            if path.exists() {
                info!("Loading config from {}", path.display());
                return Self::from_file(path);
            }
            warn!(
                "Config file {} does not exist; using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                info!("Loading config from {} ({})", path.display(), CONFIG_ENV_VAR);
                return Self::from_file(&path);
            }
            warn!(
                "{} points to missing file {}; using defaults",
                CONFIG_ENV_VAR,
                path.display()
            );
            return Ok(Self::default());
        }

        // Priority 3: platform config directory
        if let Some(path) = default_config_path() {
            if path.exists() {
                info!("Loading config from {}", path.display());
                return Self::from_file(&path);
            }
            debug!("No config file at {}", path.display());
        }

        // Priority 4: compiled defaults
        Ok(Self::default())
    }
}

/// `<config dir>/tunesleuth/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunesleuth").join("config.toml"))
}
