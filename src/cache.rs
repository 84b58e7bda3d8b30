//! Saved classifications, so a dry run can be followed by a live run without
//! classifying everything twice.

use crate::category::Category;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while reading or writing a classification cache.
#[derive(Debug)]
pub enum CacheError {
    /// Cache file could not be read or written.
    Io { path: PathBuf, source: std::io::Error },
    /// Cache file is not valid JSON of the expected shape.
    Invalid { path: PathBuf, reason: String },
    /// Cache was recorded for other source or output directories.
    DirectoryMismatch {
        cached_source: PathBuf,
        cached_output: PathBuf,
    },
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot access cache file {}: {}", path.display(), source)
            }
            Self::Invalid { path, reason } => {
                write!(f, "Invalid cache file {}: {}", path.display(), reason)
            }
            Self::DirectoryMismatch {
                cached_source,
                cached_output,
            } => write!(
                f,
                "Cache is for different directories ({} -> {})",
                cached_source.display(),
                cached_output.display()
            ),
        }
    }
}

impl std::error::Error for CacheError {}

/// On-disk classification cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationCache {
    pub timestamp: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Category per file path, as recorded during the run.
    pub classifications: BTreeMap<PathBuf, Category>,
    /// Files per category label.
    #[serde(default)]
    pub stats: BTreeMap<String, usize>,
}

impl ClassificationCache {
    pub fn new(source_dir: &Path, output_dir: &Path) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            source_dir: source_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            classifications: BTreeMap::new(),
            stats: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, path: &Path, category: Category) {
        if let Some(previous) = self.classifications.insert(path.to_path_buf(), category)
            && let Some(count) = self.stats.get_mut(previous.label())
        {
            *count = count.saturating_sub(1);
        }
        *self.stats.entry(category.label().to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, path: &Path) -> Option<Category> {
        self.classifications.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.classifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifications.is_empty()
    }

    pub fn save(&self, cache_file: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Invalid {
            path: cache_file.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(cache_file, json).map_err(|e| CacheError::Io {
            path: cache_file.to_path_buf(),
            source: e,
        })
    }

    /// Loads a cache and checks that it belongs to `source_dir` and `output_dir`.
    pub fn load(cache_file: &Path, source_dir: &Path, output_dir: &Path) -> Result<Self, CacheError> {
        let json = fs::read_to_string(cache_file).map_err(|e| CacheError::Io {
            path: cache_file.to_path_buf(),
            source: e,
        })?;
        let cache: Self = serde_json::from_str(&json).map_err(|e| CacheError::Invalid {
            path: cache_file.to_path_buf(),
            reason: e.to_string(),
        })?;

        if cache.source_dir != source_dir || cache.output_dir != output_dir {
            return Err(CacheError::DirectoryMismatch {
                cached_source: cache.source_dir,
                cached_output: cache.output_dir,
            });
        }
        Ok(cache)
    }
}
