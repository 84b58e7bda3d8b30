//! Driving a whole sort run: discovery, classification, moves and the files
//! a run leaves behind (cache, history, report).

use crate::cache::{CacheError, ClassificationCache};
use crate::category::Category;
use crate::config::{CategoryDirs, CompiledSkip, ConfigError, SorterConfig};
use crate::engine::{ClassificationEngine, FileRecord};
use crate::organizer::{FileMover, HISTORY_FILE, MoveError, OperationLog};
use crate::registry::DuplicateRegistry;
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Run-level failures. Per-file problems never end up here.
#[derive(Debug)]
pub enum SortError {
    /// Source directory is missing or not a directory.
    SourceNotFound(PathBuf),
    /// Source and output are the same directory.
    SameDirectory(PathBuf),
    /// Invalid configuration.
    Config(ConfigError),
    /// Classification cache could not be used or written.
    Cache(CacheError),
    /// Move history could not be written.
    History(MoveError),
    /// Report file could not be written.
    ReportWrite { path: PathBuf, reason: String },
}

impl std::fmt::Display for SortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound(path) => {
                write!(f, "Source directory not found: {}", path.display())
            }
            Self::SameDirectory(path) => write!(
                f,
                "Source and output must differ, both are {}",
                path.display()
            ),
            Self::Config(e) => write!(f, "{}", e),
            Self::Cache(e) => write!(f, "{}", e),
            Self::History(e) => write!(f, "{}", e),
            Self::ReportWrite { path, reason } => {
                write!(f, "Failed to write report {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for SortError {}

impl From<ConfigError> for SortError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CacheError> for SortError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

/// What a run should do besides classifying.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Classify and report only; never touch the filesystem.
    pub dry_run: bool,
    /// Reuse classifications from this cache file.
    pub use_cache: Option<PathBuf>,
    /// Write classifications to this cache file afterwards.
    pub save_cache: Option<PathBuf>,
    /// Write every record of the run to this JSON file.
    pub report: Option<PathBuf>,
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// Discovery finished.
    Started { total: usize },
    /// A cache was loaded and will be consulted.
    CacheLoaded { entries: usize },
    /// A cache was given but ignored.
    CacheIgnored { reason: String },
    /// A file was classified; `destination` is set after a successful move
    /// and, in a dry run, to where it would go.
    FileDone {
        record: &'a FileRecord,
        destination: Option<&'a Path>,
        from_cache: bool,
    },
}

/// Counts gathered over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub bytes_per_category: BTreeMap<Category, u64>,
    pub moved: usize,
    pub from_cache: usize,
    pub duplicates: usize,
    pub unreadable: usize,
}

impl RunStats {
    fn add(&mut self, record: &FileRecord) {
        self.total += 1;
        *self.per_category.entry(record.category).or_insert(0) += 1;
        *self.bytes_per_category.entry(record.category).or_insert(0) += record.size_bytes;
        if record.duplicate_of.is_some() {
            self.duplicates += 1;
        }
        if record.is_unreadable() {
            self.unreadable += 1;
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.per_category.get(&category).copied().unwrap_or(0)
    }

    /// Share of all files in `category`, 0.0 to 100.0.
    pub fn percentage(&self, category: Category) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(category) as f64 * 100.0 / self.total as f64
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub dry_run: bool,
    pub records: Vec<FileRecord>,
    pub stats: RunStats,
    /// Per-file failures (walk errors and failed moves), in encounter order.
    pub errors: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
    /// Whether a history file was written for undo.
    pub history_saved: bool,
}

#[derive(Serialize)]
struct ReportFile<'a> {
    generated: String,
    source_dir: &'a Path,
    output_dir: &'a Path,
    dry_run: bool,
    stats: &'a RunStats,
    records: &'a [FileRecord],
}

/// Walks a source tree and sorts every file in it.
pub struct SortRunner {
    source_dir: PathBuf,
    output_dir: PathBuf,
    categories: CategoryDirs,
    skip: CompiledSkip,
    engine: ClassificationEngine,
}

impl SortRunner {
    /// Validates `config` and builds the engine.
    pub fn new(config: &SorterConfig) -> Result<Self, ConfigError> {
        let compiled = config.compile()?;
        Ok(Self {
            source_dir: config.source_dir.clone(),
            output_dir: config.output_dir.clone(),
            categories: config.categories.clone(),
            skip: compiled.skip.clone(),
            engine: ClassificationEngine::new(&compiled),
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory `category` is sorted into.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.output_dir.join(self.categories.dir_for(category))
    }

    /// Checks the directories and returns the resolved output directory.
    fn check_directories(&self) -> Result<PathBuf, SortError> {
        if !self.source_dir.is_dir() {
            return Err(SortError::SourceNotFound(self.source_dir.clone()));
        }
        let source = resolve_path(&self.source_dir);
        let output = resolve_path(&self.output_dir);
        if source == output {
            return Err(SortError::SameDirectory(self.source_dir.clone()));
        }
        Ok(output)
    }

    /// Files to sort, in sorted walk order, plus walk errors.
    ///
    /// The output directory is never descended into, even when it lives
    /// inside the source tree.
    pub fn discover(&self) -> Result<(Vec<PathBuf>, Vec<(PathBuf, String)>), SortError> {
        let output = self.check_directories()?;

        let mut files = Vec::new();
        let mut errors = Vec::new();
        let walker = WalkDir::new(&self.source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !fs::canonicalize(entry.path()).is_ok_and(|dir| dir == output)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!("{}: {}", path.display(), e);
                    errors.push((path, e.to_string()));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.source_dir)
                .unwrap_or(entry.path());
            if self.skip.should_skip(relative) {
                debug!("skipping {}", entry.path().display());
                continue;
            }
            files.push(entry.into_path());
        }

        Ok((files, errors))
    }

    /// Number of files already sitting in category directories.
    pub fn existing_output_files(&self) -> usize {
        Category::ALL
            .iter()
            .map(|category| self.category_dir(*category))
            .filter(|dir| dir.is_dir())
            .map(|dir| {
                WalkDir::new(dir)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file())
                    .filter(|entry| entry.file_name() != HISTORY_FILE)
                    .count()
            })
            .sum()
    }

    /// Classifies every discovered file and, unless `options.dry_run`, moves it.
    ///
    /// A failed move is recorded in the report and the run carries on; the
    /// file stays in the source tree.
    pub fn run<F>(&self, options: &RunOptions, mut on_event: F) -> Result<RunReport, SortError>
    where
        F: FnMut(RunEvent<'_>),
    {
        let started = Instant::now();
        let (files, mut errors) = self.discover()?;

        let cache = match &options.use_cache {
            Some(cache_file) => {
                match ClassificationCache::load(cache_file, &self.source_dir, &self.output_dir) {
                    Ok(cache) => {
                        on_event(RunEvent::CacheLoaded {
                            entries: cache.len(),
                        });
                        Some(cache)
                    }
                    Err(e @ CacheError::DirectoryMismatch { .. }) => {
                        warn!("ignoring cache {}: {}", cache_file.display(), e);
                        on_event(RunEvent::CacheIgnored {
                            reason: e.to_string(),
                        });
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => None,
        };

        on_event(RunEvent::Started { total: files.len() });
        info!(
            "sorting {} files from {} into {}",
            files.len(),
            self.source_dir.display(),
            self.output_dir.display()
        );

        let mut registry = DuplicateRegistry::new();
        let mover = FileMover::new(&self.source_dir, &self.output_dir);
        let mut history = OperationLog::new(self.source_dir.clone(), self.output_dir.clone());
        let mut stats = RunStats::default();
        let mut records = Vec::with_capacity(files.len());

        for path in &files {
            let cached = cache.as_ref().and_then(|c| c.get(path));
            let record = match cached {
                Some(category) => cached_record(path, category),
                None => self.engine.classify_path(path, &mut registry),
            };
            stats.add(&record);
            if cached.is_some() {
                stats.from_cache += 1;
            }

            let category_dir = self.categories.dir_for(record.category);
            let destination = if options.dry_run {
                mover.planned_destination(path, category_dir).ok()
            } else {
                match mover.move_to_category(path, category_dir, record.category.label()) {
                    Ok(operation) => {
                        stats.moved += 1;
                        let new_path = operation.new_path.clone();
                        history.add_operation(operation);
                        Some(new_path)
                    }
                    Err(e) => {
                        warn!("{}", e);
                        errors.push((path.clone(), e.to_string()));
                        None
                    }
                }
            };

            on_event(RunEvent::FileDone {
                record: &record,
                destination: destination.as_deref(),
                from_cache: cached.is_some(),
            });
            records.push(record);
        }

        let history_saved = !options.dry_run && !history.operations.is_empty();
        if history_saved {
            history.save(&self.output_dir).map_err(SortError::History)?;
        }

        if let Some(cache_file) = &options.save_cache {
            if cache.is_some() {
                debug!("not rewriting cache after a cached run");
            } else {
                let mut new_cache = ClassificationCache::new(&self.source_dir, &self.output_dir);
                for record in &records {
                    new_cache.record(&record.path, record.category);
                }
                new_cache.save(cache_file)?;
            }
        }

        let report = RunReport {
            dry_run: options.dry_run,
            records,
            stats,
            errors,
            elapsed: started.elapsed(),
            history_saved,
        };

        if let Some(report_file) = &options.report {
            self.write_report(&report, report_file)?;
        }

        Ok(report)
    }

    fn write_report(&self, report: &RunReport, path: &Path) -> Result<(), SortError> {
        let contents = ReportFile {
            generated: Utc::now().to_rfc3339(),
            source_dir: &self.source_dir,
            output_dir: &self.output_dir,
            dry_run: report.dry_run,
            stats: &report.stats,
            records: &report.records,
        };
        let json = serde_json::to_string_pretty(&contents).map_err(|e| SortError::ReportWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| SortError::ReportWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Absolute form of `path` with symlinks and `..` resolved.
///
/// Works for paths that do not exist yet: the longest existing ancestor is
/// canonicalized and the remaining components are applied lexically.
fn resolve_path(path: &Path) -> PathBuf {
    let mut base = path;
    let mut tail = Vec::new();
    loop {
        let existing = if base.as_os_str().is_empty() {
            Path::new(".")
        } else {
            base
        };
        if let Ok(canonical) = fs::canonicalize(existing) {
            return tail.iter().rev().fold(canonical, |mut resolved, component| {
                match component {
                    Component::ParentDir => {
                        resolved.pop();
                    }
                    Component::CurDir => {}
                    other => resolved.push(other.as_os_str()),
                }
                resolved
            });
        }
        match (base.parent(), base.components().next_back()) {
            (Some(parent), Some(last)) => {
                tail.push(last);
                base = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn cached_record(path: &Path, category: Category) -> FileRecord {
    let size_bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    FileRecord {
        path: path.to_path_buf(),
        size_bytes,
        content_hash: None,
        category,
        rationale: vec!["cache: category reused from a previous run".to_string()],
        duplicate_of: None,
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::png_bytes;
    use tempfile::TempDir;

    struct Setup {
        _temp: TempDir,
        config: SorterConfig,
    }

    fn setup() -> Setup {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config = SorterConfig {
            source_dir: temp.path().join("quarantine"),
            output_dir: temp.path().join("processed"),
            ..SorterConfig::default()
        };
        fs::create_dir_all(&config.source_dir).unwrap();
        Setup {
            _temp: temp,
            config,
        }
    }

    fn write(setup: &Setup, relative: &str, contents: &[u8]) -> PathBuf {
        let path = setup.config.source_dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_source_is_error() {
        let setup = setup();
        let mut config = setup.config.clone();
        config.source_dir = config.source_dir.join("nope");
        let runner = SortRunner::new(&config).unwrap();
        let result = runner.run(&RunOptions::default(), |_| {});
        assert!(matches!(result, Err(SortError::SourceNotFound(_))));
    }

    #[test]
    fn test_same_source_and_output_is_error() {
        let setup = setup();
        let mut config = setup.config.clone();
        config.output_dir = config.source_dir.clone();
        let runner = SortRunner::new(&config).unwrap();
        assert!(matches!(runner.discover(), Err(SortError::SameDirectory(_))));
    }

    #[test]
    fn test_discover_is_sorted_and_skips() {
        let setup = setup();
        write(&setup, "b.png", b"b");
        write(&setup, "a/z.png", b"z");
        write(&setup, ".hidden.png", b"h");
        write(&setup, "notes.xmp", b"x");

        let mut config = setup.config.clone();
        config.skip.globs = vec!["*.xmp".to_string()];
        let runner = SortRunner::new(&config).unwrap();
        let (files, errors) = runner.discover().unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&config.source_dir).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from(".hidden.png"),
                PathBuf::from("a/z.png"),
                PathBuf::from("b.png")
            ]
        );
        assert!(errors.is_empty());

        config.skip.hidden_files = false;
        let runner = SortRunner::new(&config).unwrap();
        let (files, _) = runner.discover().unwrap();
        assert_eq!(files.len(), 2);
        assert!(!files.contains(&config.source_dir.join(".hidden.png")));
    }

    #[test]
    fn test_hidden_phone_files_are_sorted() {
        let setup = setup();
        let trashed = write(&setup, ".trashed-1690000000-IMG_20230101_1.jpg", b"jpeg data");
        let thumbdata = write(&setup, "DCIM/.thumbnails/.thumbdata3", b"thumb blob");
        let runner = SortRunner::new(&setup.config).unwrap();

        let report = runner.run(&RunOptions::default(), |_| {}).unwrap();

        assert_eq!(report.stats.total, 2);
        assert_eq!(report.stats.moved, 2);
        assert!(!trashed.exists());
        assert!(!thumbdata.exists());
        assert!(
            setup
                .config
                .output_dir
                .join("personal_media/.trashed-1690000000-IMG_20230101_1.jpg")
                .exists()
        );
        assert!(
            setup
                .config
                .output_dir
                .join("system_cache/DCIM/.thumbnails/.thumbdata3")
                .exists()
        );
    }

    #[test]
    fn test_nested_output_dir_is_not_walked() {
        let setup = setup();
        let mut config = setup.config.clone();
        config.output_dir = config.source_dir.join("processed");
        write(&setup, "processed/app_icons/old.png", b"old");
        write(&setup, "new.png", b"new");

        let runner = SortRunner::new(&config).unwrap();
        let (files, _) = runner.discover().unwrap();
        assert_eq!(files, vec![config.source_dir.join("new.png")]);
        assert_eq!(runner.existing_output_files(), 1);
    }

    #[test]
    fn test_unnormalized_nested_output_is_not_walked() {
        let setup = setup();
        fs::create_dir_all(setup.config.source_dir.join("sub")).unwrap();
        write(&setup, "icon_a.png", &png_bytes(48, 48));
        let mut config = setup.config.clone();
        config.output_dir = config.source_dir.join("sub/../processed");

        let runner = SortRunner::new(&config).unwrap();
        runner.run(&RunOptions::default(), |_| {}).unwrap();
        assert!(
            setup
                .config
                .source_dir
                .join("processed/app_icons/icon_a.png")
                .exists()
        );

        write(&setup, "icon_b.png", &png_bytes(32, 32));
        let (files, _) = runner.discover().unwrap();
        assert_eq!(files, vec![config.source_dir.join("icon_b.png")]);
    }

    #[test]
    fn test_same_directory_spelled_differently_is_error() {
        let setup = setup();
        let mut config = setup.config.clone();
        fs::create_dir_all(config.source_dir.join("sub")).unwrap();
        config.output_dir = config.source_dir.join("sub/..");
        let runner = SortRunner::new(&config).unwrap();
        assert!(matches!(runner.discover(), Err(SortError::SameDirectory(_))));
    }

    #[test]
    fn test_resolve_path_of_missing_dir() {
        let setup = setup();
        let root = fs::canonicalize(&setup.config.source_dir).unwrap();
        let missing = setup.config.source_dir.join("a/b/../c/./d");
        assert_eq!(resolve_path(&missing), root.join("a/c/d"));
        assert_eq!(resolve_path(&setup.config.source_dir), root);
    }

    #[test]
    fn test_dry_run_leaves_files_in_place() {
        let setup = setup();
        let icon = write(&setup, "icon_launcher.png", &png_bytes(48, 48));
        let runner = SortRunner::new(&setup.config).unwrap();

        let mut destinations = Vec::new();
        let report = runner
            .run(
                &RunOptions {
                    dry_run: true,
                    ..RunOptions::default()
                },
                |event| {
                    if let RunEvent::FileDone { destination, .. } = event {
                        destinations.push(destination.map(Path::to_path_buf));
                    }
                },
            )
            .unwrap();

        assert!(icon.exists());
        assert!(!setup.config.output_dir.exists());
        assert_eq!(report.stats.count(Category::AppIcons), 1);
        assert_eq!(report.stats.moved, 0);
        assert!(!report.history_saved);
        assert_eq!(
            destinations,
            vec![Some(setup.config.output_dir.join("app_icons/icon_launcher.png"))]
        );
    }

    #[test]
    fn test_live_run_moves_and_records_history() {
        let setup = setup();
        let icon = write(&setup, "res/icon_launcher.png", &png_bytes(48, 48));
        let runner = SortRunner::new(&setup.config).unwrap();

        let report = runner.run(&RunOptions::default(), |_| {}).unwrap();

        assert!(!icon.exists());
        assert!(
            setup
                .config
                .output_dir
                .join("app_icons/res/icon_launcher.png")
                .exists()
        );
        assert_eq!(report.stats.moved, 1);
        assert!(report.history_saved);
        let history = OperationLog::load(&setup.config.output_dir).unwrap().unwrap();
        assert_eq!(history.operations.len(), 1);
        assert_eq!(history.operations[0].original_path, icon);
    }

    #[test]
    fn test_custom_category_dir_names() {
        let setup = setup();
        write(&setup, "icon_launcher.png", &png_bytes(48, 48));
        let mut config = setup.config.clone();
        config.categories.app_icons = "icons".to_string();
        let runner = SortRunner::new(&config).unwrap();

        runner.run(&RunOptions::default(), |_| {}).unwrap();
        assert!(config.output_dir.join("icons/icon_launcher.png").exists());
        assert_eq!(runner.category_dir(Category::AppIcons), config.output_dir.join("icons"));
    }

    #[test]
    fn test_stats_percentages() {
        let mut stats = RunStats::default();
        assert_eq!(stats.percentage(Category::AppIcons), 0.0);
        for category in [Category::AppIcons, Category::AppIcons, Category::NeedsReview, Category::PersonalMedia] {
            stats.add(&FileRecord {
                path: PathBuf::from("x"),
                size_bytes: 10,
                content_hash: None,
                category,
                rationale: Vec::new(),
                duplicate_of: None,
                image: None,
            });
        }
        assert_eq!(stats.total, 4);
        assert_eq!(stats.percentage(Category::AppIcons), 50.0);
        assert_eq!(stats.bytes_per_category.get(&Category::AppIcons), Some(&20));
    }

    #[test]
    fn test_cache_round_trip_between_runs() {
        let setup = setup();
        let icon = write(&setup, "icon_launcher.png", &png_bytes(48, 48));
        let cache_file = setup.config.source_dir.parent().unwrap().join("cache.json");
        let runner = SortRunner::new(&setup.config).unwrap();

        runner
            .run(
                &RunOptions {
                    dry_run: true,
                    save_cache: Some(cache_file.clone()),
                    ..RunOptions::default()
                },
                |_| {},
            )
            .unwrap();
        assert!(cache_file.exists());

        // Overwrite the content: a cached category wins over a fresh verdict.
        fs::write(&icon, b"not an image any more").unwrap();
        let mut loaded = None;
        let report = runner
            .run(
                &RunOptions {
                    dry_run: true,
                    use_cache: Some(cache_file),
                    ..RunOptions::default()
                },
                |event| {
                    if let RunEvent::CacheLoaded { entries } = event {
                        loaded = Some(entries);
                    }
                },
            )
            .unwrap();

        assert_eq!(loaded, Some(1));
        assert_eq!(report.stats.from_cache, 1);
        assert_eq!(report.records[0].category, Category::AppIcons);
    }

    #[test]
    fn test_cache_for_other_directories_is_ignored() {
        let setup = setup();
        write(&setup, "icon_launcher.png", &png_bytes(48, 48));
        let cache_file = setup.config.source_dir.parent().unwrap().join("cache.json");
        let mut foreign = ClassificationCache::new(Path::new("/elsewhere"), &setup.config.output_dir);
        foreign.record(&setup.config.source_dir.join("icon_launcher.png"), Category::NeedsReview);
        foreign.save(&cache_file).unwrap();

        let runner = SortRunner::new(&setup.config).unwrap();
        let mut ignored = false;
        let report = runner
            .run(
                &RunOptions {
                    dry_run: true,
                    use_cache: Some(cache_file),
                    ..RunOptions::default()
                },
                |event| {
                    if let RunEvent::CacheIgnored { .. } = event {
                        ignored = true;
                    }
                },
            )
            .unwrap();

        assert!(ignored);
        assert_eq!(report.stats.from_cache, 0);
        assert_eq!(report.records[0].category, Category::AppIcons);
    }

    #[test]
    fn test_report_file_lists_records() {
        let setup = setup();
        write(&setup, "icon_launcher.png", &png_bytes(48, 48));
        let report_file = setup.config.source_dir.parent().unwrap().join("report.json");
        let runner = SortRunner::new(&setup.config).unwrap();

        runner
            .run(
                &RunOptions {
                    dry_run: true,
                    report: Some(report_file.clone()),
                    ..RunOptions::default()
                },
                |_| {},
            )
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_file).unwrap()).unwrap();
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["records"][0]["category"], "app_icons");
        assert_eq!(json["records"][0]["image"]["width"], 48);
    }
}
