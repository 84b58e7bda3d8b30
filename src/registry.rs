//! Run-scoped registry of content hashes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps each content hash to the first path seen with it.
///
/// The registry lives for one run and only grows. It has a single owner and
/// is passed to the engine explicitly; callers that classify from several
/// threads must serialize access to it.
#[derive(Debug, Default)]
pub struct DuplicateRegistry {
    originals: HashMap<String, PathBuf>,
    duplicates_seen: usize,
}

impl DuplicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` under `hash`.
    ///
    /// Returns `None` the first time a hash is seen (the file is the
    /// original), and the original's path on every later call.
    ///
    /// ```
    /// use mediasort::registry::DuplicateRegistry;
    /// use std::path::Path;
    ///
    /// let mut registry = DuplicateRegistry::new();
    /// assert_eq!(registry.check_and_register("abc", Path::new("a.jpg")), None);
    /// assert_eq!(
    ///     registry.check_and_register("abc", Path::new("b.jpg")).as_deref(),
    ///     Some(Path::new("a.jpg"))
    /// );
    /// ```
    pub fn check_and_register(&mut self, hash: &str, path: &Path) -> Option<PathBuf> {
        match self.originals.get(hash) {
            Some(original) => {
                self.duplicates_seen += 1;
                Some(original.clone())
            }
            None => {
                self.originals.insert(hash.to_string(), path.to_path_buf());
                None
            }
        }
    }

    /// The original path registered for `hash`, if any.
    pub fn original_for(&self, hash: &str) -> Option<&Path> {
        self.originals.get(hash).map(PathBuf::as_path)
    }

    /// Number of distinct hashes registered.
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Number of lookups that hit an existing hash.
    pub fn duplicates_seen(&self) -> usize {
        self.duplicates_seen
    }
}
