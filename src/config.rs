//! Sorter configuration.
//!
//! Configuration is read from JSON (or TOML, when the file name ends in
//! `.toml`). Every section is optional; missing fields fall back to the
//! built-in defaults field by field.
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "source_dir": "./quarantine",
//!   "output_dir": "./processed",
//!   "patterns": {
//!     "personal": ["DSC_", "IMG_\\d{8}"],
//!     "app_icons": ["icon", "logo"],
//!     "game_assets": ["sprite"],
//!     "cache": ["thumb", "tmp"]
//!   },
//!   "thresholds": {
//!     "icon_max_dimension": 256,
//!     "thumbnail_max_dimension": 200,
//!     "min_photo_dimension": 800,
//!     "min_video_size_mb": 5
//!   },
//!   "hashing": { "max_bytes": null },
//!   "skip": { "hidden_files": true, "globs": ["*.part"] }
//! }
//! ```

use crate::category::Category;
use crate::patterns::{PatternGroup, PatternMatcher};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or compiling the configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid JSON/TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern in the skip rules.
    InvalidGlobPattern(String),
    /// A filename pattern failed to compile.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// A numeric setting is outside its valid range.
    ThresholdOutOfRange { name: &'static str, value: String },
    /// IO error while reading or writing configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::ThresholdOutOfRange { name, value } => {
                write!(f, "Threshold '{}' is out of range: {}", name, value)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete sorter configuration as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub categories: CategoryDirs,
    pub patterns: PatternSets,
    pub thresholds: Thresholds,
    pub hashing: HashingConfig,
    pub skip: SkipRules,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./quarantine"),
            output_dir: PathBuf::from("./processed"),
            categories: CategoryDirs::default(),
            patterns: PatternSets::default(),
            thresholds: Thresholds::default(),
            hashing: HashingConfig::default(),
            skip: SkipRules::default(),
        }
    }
}

/// Output directory name for each category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDirs {
    pub personal: String,
    pub app_icons: String,
    pub game_assets: String,
    pub thumbnails: String,
    pub system_cache: String,
    pub review: String,
}

impl Default for CategoryDirs {
    fn default() -> Self {
        Self {
            personal: Category::PersonalMedia.label().to_string(),
            app_icons: Category::AppIcons.label().to_string(),
            game_assets: Category::GameAssets.label().to_string(),
            thumbnails: Category::Thumbnails.label().to_string(),
            system_cache: Category::SystemCache.label().to_string(),
            review: Category::NeedsReview.label().to_string(),
        }
    }
}

impl CategoryDirs {
    /// Directory name for `category`.
    pub fn dir_for(&self, category: Category) -> &str {
        match category {
            Category::PersonalMedia => &self.personal,
            Category::AppIcons => &self.app_icons,
            Category::GameAssets => &self.game_assets,
            Category::Thumbnails => &self.thumbnails,
            Category::SystemCache => &self.system_cache,
            Category::NeedsReview => &self.review,
        }
    }
}

/// Filename patterns per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSets {
    pub personal: Vec<String>,
    pub app_icons: Vec<String>,
    pub game_assets: Vec<String>,
    pub cache: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PatternSets {
    fn default() -> Self {
        Self {
            personal: strings(&[
                r"DSC_",
                r"IMG_\d{8}",
                r"VID_\d{8}",
                r"DCIM",
                r"photo.*\d{4}",
                r"video.*\d{4}",
                r"\d{8}_\d{6}\.(mp4|avi|mov)$",
            ]),
            app_icons: strings(&[
                "icon",
                "logo",
                "sprite",
                "badge",
                "button",
                "bg_",
                "background",
                "launcher",
                "drawable",
                "banner",
                "toolbar",
                "menu",
                "notification",
            ]),
            game_assets: strings(&[
                "game",
                "level",
                "character",
                "weapon",
                "enemy",
                "powerup",
                "coin",
                "_art",
                "texture",
                "tile",
                "monster",
                "zombie",
            ]),
            cache: strings(&[
                "cache",
                "thumb",
                "scaled",
                "temp",
                "tmp",
                r"\.png\.xmp$",
                r"r\d+_\d+_orig",
                r"r\d+_\d+_scaled",
                r"_\d+x\d+\.png$",
            ]),
        }
    }
}

impl PatternSets {
    /// Pattern sets with no patterns at all.
    pub fn empty() -> Self {
        Self {
            personal: Vec::new(),
            app_icons: Vec::new(),
            game_assets: Vec::new(),
            cache: Vec::new(),
        }
    }

    /// Patterns configured for `group`.
    pub fn for_group(&self, group: PatternGroup) -> &[String] {
        match group {
            PatternGroup::Personal => &self.personal,
            PatternGroup::AppIcons => &self.app_icons,
            PatternGroup::GameAssets => &self.game_assets,
            PatternGroup::Cache => &self.cache,
        }
    }
}

/// Numeric classification thresholds. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Images whose longer axis is at most this are icons.
    pub icon_max_dimension: u32,
    /// Images whose longer axis is at most this are thumbnails.
    pub thumbnail_max_dimension: u32,
    /// Images whose shorter axis is at least this are photos.
    pub min_photo_dimension: u32,
    /// Videos larger than this many MiB are presumed personal.
    pub min_video_size_mb: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            icon_max_dimension: 256,
            thumbnail_max_dimension: 200,
            min_photo_dimension: 800,
            min_video_size_mb: 5.0,
        }
    }
}

impl Thresholds {
    /// Checks every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = [
            ("icon_max_dimension", self.icon_max_dimension),
            ("thumbnail_max_dimension", self.thumbnail_max_dimension),
            ("min_photo_dimension", self.min_photo_dimension),
        ];
        for (name, value) in dimensions {
            if value == 0 {
                return Err(ConfigError::ThresholdOutOfRange {
                    name,
                    value: value.to_string(),
                });
            }
        }

        if !self.min_video_size_mb.is_finite() || self.min_video_size_mb < 0.0 {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "min_video_size_mb",
                value: self.min_video_size_mb.to_string(),
            });
        }
        Ok(())
    }

    /// Video size threshold in bytes.
    pub fn min_video_size_bytes(&self) -> u64 {
        (self.min_video_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Content hashing settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Hash only this many leading bytes. `None` hashes whole files.
    ///
    /// Bounding the read speeds up large files at the cost of reporting files
    /// that share a prefix as duplicates.
    pub max_bytes: Option<u64>,
}

/// Files that are never visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipRules {
    /// Whether files starting with "." are visited. Defaults to true.
    pub hidden_files: bool,
    /// Glob patterns matched against the path relative to the source.
    pub globs: Vec<String>,
}

impl Default for SkipRules {
    fn default() -> Self {
        Self {
            hidden_files: true,
            globs: Vec::new(),
        }
    }
}

impl SorterConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.mediasortrc.json` in the current directory
    /// 3. Look for `~/.config/mediasort/config.json` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".mediasortrc.json");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("mediasort")
                .join("config.json");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
        }
    }

    /// Writes this configuration as pretty JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Validates the configuration and compiles patterns, globs and thresholds.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid regex, glob or out-of-range value.
    pub fn compile(&self) -> Result<CompiledConfig, ConfigError> {
        self.thresholds.validate()?;
        if self.hashing.max_bytes == Some(0) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "hashing.max_bytes",
                value: "0".to_string(),
            });
        }

        Ok(CompiledConfig {
            matcher: PatternMatcher::compile(&self.patterns)?,
            thresholds: self.thresholds,
            hashing: self.hashing,
            skip: CompiledSkip::new(&self.skip)?,
        })
    }
}

/// Validated, ready-to-use classification settings.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub matcher: PatternMatcher,
    pub thresholds: Thresholds,
    pub hashing: HashingConfig,
    pub skip: CompiledSkip,
}

/// Compiled skip rules.
#[derive(Debug, Clone)]
pub struct CompiledSkip {
    hidden_files: bool,
    globs: Vec<Pattern>,
}

impl CompiledSkip {
    fn new(rules: &SkipRules) -> Result<Self, ConfigError> {
        let globs = rules
            .globs
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            hidden_files: rules.hidden_files,
            globs,
        })
    }

    /// Returns true if the file at `relative_path` must not be visited.
    pub fn should_skip(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.hidden_files && file_name.starts_with('.') {
            return true;
        }

        self.globs
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_compiles() {
        let compiled = SorterConfig::default().compile();
        assert!(compiled.is_ok());
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let json = r#"{
            "thresholds": { "icon_max_dimension": 128 },
            "patterns": { "cache": ["junk"] }
        }"#;
        let config: SorterConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.thresholds.icon_max_dimension, 128);
        assert_eq!(config.thresholds.min_photo_dimension, 800);
        assert_eq!(config.patterns.cache, vec!["junk".to_string()]);
        assert_eq!(config.patterns.personal, PatternSets::default().personal);
        assert_eq!(config.output_dir, PathBuf::from("./processed"));
    }

    #[test]
    fn test_integer_video_threshold_parses() {
        let config: SorterConfig =
            serde_json::from_str(r#"{"thresholds": {"min_video_size_mb": 12}}"#).unwrap();
        assert_eq!(config.thresholds.min_video_size_mb, 12.0);
        assert_eq!(config.thresholds.min_video_size_bytes(), 12 * 1024 * 1024);
    }

    #[test]
    fn test_load_json_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"source_dir": "/data/in"}"#).unwrap();

        let config = SorterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/data/in"));
    }

    #[test]
    fn test_load_toml_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "output_dir = \"/data/out\"\n\n[thresholds]\nmin_photo_dimension = 1024\n",
        )
        .unwrap();

        let config = SorterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.thresholds.min_photo_dimension, 1024);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = SorterConfig::load(Some(Path::new("/non/existent/config.json")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let result = SorterConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_save_then_load_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        SorterConfig::default().save_to_file(&path).unwrap();

        let loaded = SorterConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, SorterConfig::default());
    }

    #[test]
    fn test_invalid_regex_fails_compile() {
        let mut config = SorterConfig::default();
        config.patterns.personal.push("(unclosed".to_string());
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_zero_dimension_out_of_range() {
        let mut config = SorterConfig::default();
        config.thresholds.icon_max_dimension = 0;
        assert!(matches!(
            config.compile(),
            Err(ConfigError::ThresholdOutOfRange { name: "icon_max_dimension", .. })
        ));
    }

    #[test]
    fn test_negative_video_size_out_of_range() {
        let mut config = SorterConfig::default();
        config.thresholds.min_video_size_mb = -1.0;
        assert!(config.compile().is_err());

        config.thresholds.min_video_size_mb = f64::NAN;
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_zero_hash_prefix_out_of_range() {
        let mut config = SorterConfig::default();
        config.hashing.max_bytes = Some(0);
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_hidden_files_visited_by_default() {
        let compiled = SorterConfig::default().compile().unwrap();
        assert!(!compiled.skip.should_skip(Path::new(".trashed-1690000000-IMG_20230101_1.jpg")));
        assert!(!compiled.skip.should_skip(Path::new("DCIM/.thumbnails/.thumbdata3")));
        assert!(!compiled.skip.should_skip(Path::new("photo.jpg")));
    }

    #[test]
    fn test_hidden_files_can_be_skipped() {
        let mut config = SorterConfig::default();
        config.skip.hidden_files = false;
        let compiled = config.compile().unwrap();
        assert!(compiled.skip.should_skip(Path::new(".DS_Store")));
        assert!(compiled.skip.should_skip(Path::new("sub/.nomedia")));
        assert!(!compiled.skip.should_skip(Path::new("photo.jpg")));
    }

    #[test]
    fn test_skip_globs() {
        let mut config = SorterConfig::default();
        config.skip.globs = vec!["**/*.part".to_string(), "Android/**".to_string()];
        let compiled = config.compile().unwrap();

        assert!(!compiled.skip.should_skip(Path::new(".nomedia")));
        assert!(compiled.skip.should_skip(Path::new("downloads/video.part")));
        assert!(compiled.skip.should_skip(Path::new("Android/data/x.png")));
        assert!(!compiled.skip.should_skip(Path::new("DCIM/x.png")));
    }

    #[test]
    fn test_invalid_glob_fails_compile() {
        let mut config = SorterConfig::default();
        config.skip.globs = vec!["[invalid".to_string()];
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }

    #[test]
    fn test_category_dirs_lookup() {
        let dirs = CategoryDirs {
            review: "check_me".to_string(),
            ..CategoryDirs::default()
        };
        assert_eq!(dirs.dir_for(Category::NeedsReview), "check_me");
        assert_eq!(dirs.dir_for(Category::AppIcons), "app_icons");
    }
}
