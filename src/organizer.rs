/// Moving classified files into the output tree.
///
/// Files land in `<output>/<category dir>/<path relative to source>`, so the
/// source layout is mirrored inside each category. Every move is
/// all-or-nothing: either the file ends up complete at its destination and
/// is gone from the source, or the source is left untouched and no partial
/// destination file remains.
///
/// Successful moves are recorded in an [`OperationLog`] so a run can be
/// undone.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the history file kept in the output directory.
pub const HISTORY_FILE: &str = ".mediasort_history.json";

/// A single recorded move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Where the file was before the run.
    pub original_path: PathBuf,
    /// Where the file was moved to.
    pub new_path: PathBuf,
    /// Category label the file was sorted under.
    pub category: String,
}

/// All moves of one live run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    /// RFC 3339 timestamp of the run.
    pub timestamp: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub operations: Vec<Operation>,
}

impl OperationLog {
    pub fn new(source_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            source_dir,
            output_dir,
            operations: Vec::new(),
        }
    }

    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    fn history_file_path(output_dir: &Path) -> PathBuf {
        output_dir.join(HISTORY_FILE)
    }

    /// Writes the log to the output directory.
    pub fn save(&self, output_dir: &Path) -> MoveResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| MoveError::HistoryWriteFailed {
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        fs::write(Self::history_file_path(output_dir), json)
            .map_err(|e| MoveError::HistoryWriteFailed { source: e })
    }

    /// Loads the log of the most recent run, if there is one.
    pub fn load(output_dir: &Path) -> MoveResult<Option<Self>> {
        let history_path = Self::history_file_path(output_dir);
        if !history_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&history_path)
            .map_err(|e| MoveError::HistoryReadFailed { source: e })?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| MoveError::InvalidHistoryFormat {
                reason: e.to_string(),
            })
    }

    /// Deletes the history file, if present.
    pub fn delete(output_dir: &Path) -> MoveResult<()> {
        let history_path = Self::history_file_path(output_dir);
        if history_path.exists() {
            fs::remove_file(&history_path).map_err(|e| MoveError::HistoryWriteFailed { source: e })?;
        }
        Ok(())
    }
}

/// Errors that can occur while moving files or handling history.
#[derive(Debug)]
pub enum MoveError {
    /// Failed to create a destination directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file; the source is still in place.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// The file is not below the source directory.
    OutsideSource { path: PathBuf },
    /// The directory does not exist.
    InvalidBasePath { path: PathBuf },
    /// Failed to write history file.
    HistoryWriteFailed { source: io::Error },
    /// Failed to read history file.
    HistoryReadFailed { source: io::Error },
    /// History file has invalid format.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(f, "Failed to create directory {}: {}", path.display(), source)
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::OutsideSource { path } => {
                write!(f, "{} is not inside the source directory", path.display())
            }
            Self::InvalidBasePath { path } => {
                write!(f, "Directory does not exist: {}", path.display())
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write history file: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read history file: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid history file format: {}", reason)
            }
        }
    }
}

impl std::error::Error for MoveError {}

pub type MoveResult<T> = Result<T, MoveError>;

/// Moves files from a source tree into category directories of an output tree.
pub struct FileMover {
    source_dir: PathBuf,
    output_dir: PathBuf,
}

impl FileMover {
    pub fn new(source_dir: &Path, output_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Destination a file would be moved to, before conflict resolution.
    pub fn planned_destination(&self, file_path: &Path, category_dir: &str) -> MoveResult<PathBuf> {
        let relative = file_path
            .strip_prefix(&self.source_dir)
            .map_err(|_| MoveError::OutsideSource {
                path: file_path.to_path_buf(),
            })?;
        Ok(self.output_dir.join(category_dir).join(relative))
    }

    /// Moves `file_path` under `category_dir` and returns the recorded operation.
    ///
    /// An existing file at the destination is never overwritten; the new file
    /// gets a `_1`, `_2`, ... suffix instead.
    pub fn move_to_category(
        &self,
        file_path: &Path,
        category_dir: &str,
        category_label: &str,
    ) -> MoveResult<Operation> {
        let planned = self.planned_destination(file_path, category_dir)?;
        let parent = planned.parent().unwrap_or(&self.output_dir).to_path_buf();
        fs::create_dir_all(&parent).map_err(|e| MoveError::DirectoryCreationFailed {
            path: parent.clone(),
            source: e,
        })?;

        let destination = unique_destination(&planned);
        move_atomic(file_path, &destination).map_err(|e| MoveError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination.clone(),
            source_error: e,
        })?;

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination,
            category: category_label.to_string(),
        })
    }
}

/// First of `path`, `stem_1.ext`, `stem_2.ext`, ... that does not exist.
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    (1u32..)
        .map(|counter| {
            let name = match &extension {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", stem, counter),
            };
            parent.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Moves a file without ever leaving a partial destination behind.
///
/// A same-filesystem rename is atomic. Across filesystems the content is
/// copied into a temporary file next to the destination, synced, linked into
/// place without clobbering, and only then is the source removed.
pub fn move_atomic(source: &Path, destination: &Path) -> io::Result<()> {
    if destination.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(source, destination),
        Err(e) => Err(e),
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)?;
    let mut input = File::open(source)?;
    io::copy(&mut input, temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    if let Ok(metadata) = input.metadata() {
        let _ = fs::set_permissions(temp.path(), metadata.permissions());
    }

    // Dropping the temp file on any error below removes it.
    temp.persist_noclobber(destination).map_err(|e| e.error)?;

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Dirs {
        _temp: TempDir,
        source: PathBuf,
        output: PathBuf,
    }

    fn dirs() -> Dirs {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let source = temp.path().join("in");
        let output = temp.path().join("out");
        fs::create_dir_all(&source).unwrap();
        Dirs {
            _temp: temp,
            source,
            output,
        }
    }

    #[test]
    fn test_move_mirrors_relative_path() {
        let d = dirs();
        fs::create_dir_all(d.source.join("DCIM/2023")).unwrap();
        let file = d.source.join("DCIM/2023/IMG_1.jpg");
        fs::write(&file, "jpeg").unwrap();

        let mover = FileMover::new(&d.source, &d.output);
        let op = mover
            .move_to_category(&file, "personal_media", "personal_media")
            .expect("Failed to move file");

        let expected = d.output.join("personal_media/DCIM/2023/IMG_1.jpg");
        assert_eq!(op.new_path, expected);
        assert!(expected.exists());
        assert!(!file.exists());
        assert_eq!(op.category, "personal_media");
    }

    #[test]
    fn test_move_never_overwrites() {
        let d = dirs();
        let file = d.source.join("a.png");
        fs::write(&file, "new").unwrap();
        fs::create_dir_all(d.output.join("app_icons")).unwrap();
        fs::write(d.output.join("app_icons/a.png"), "old").unwrap();

        let mover = FileMover::new(&d.source, &d.output);
        let op = mover.move_to_category(&file, "app_icons", "app_icons").unwrap();

        assert_eq!(op.new_path, d.output.join("app_icons/a_1.png"));
        assert_eq!(fs::read_to_string(d.output.join("app_icons/a.png")).unwrap(), "old");
        assert_eq!(fs::read_to_string(&op.new_path).unwrap(), "new");
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let d = dirs();
        let taken = d.source.join("README");
        fs::write(&taken, "x").unwrap();
        fs::write(d.source.join("README_1"), "x").unwrap();
        assert_eq!(unique_destination(&taken), d.source.join("README_2"));
    }

    #[test]
    fn test_move_outside_source_is_rejected() {
        let d = dirs();
        let mover = FileMover::new(&d.source, &d.output);
        let result = mover.move_to_category(Path::new("/etc/hosts"), "x", "x");
        assert!(matches!(result, Err(MoveError::OutsideSource { .. })));
    }

    #[test]
    fn test_failed_move_leaves_source_untouched() {
        let d = dirs();
        let missing = d.source.join("gone.jpg");
        let mover = FileMover::new(&d.source, &d.output);

        let result = mover.move_to_category(&missing, "needs_review", "needs_review");
        assert!(matches!(result, Err(MoveError::FileMoveFailure { .. })));
        assert!(!d.output.join("needs_review/gone.jpg").exists());
    }

    #[test]
    fn test_move_atomic_refuses_existing_destination() {
        let d = dirs();
        let a = d.source.join("a");
        let b = d.source.join("b");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let err = move_atomic(&a, &b).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&a).unwrap(), "a");
        assert_eq!(fs::read_to_string(&b).unwrap(), "b");
    }

    #[test]
    fn test_copy_then_remove_moves_content() {
        let d = dirs();
        let a = d.source.join("a.bin");
        let b = d.source.join("b.bin");
        fs::write(&a, vec![7u8; 10_000]).unwrap();

        copy_then_remove(&a, &b).unwrap();
        assert!(!a.exists());
        assert_eq!(fs::read(&b).unwrap(), vec![7u8; 10_000]);
        // No stray temp files next to the destination.
        assert_eq!(fs::read_dir(&d.source).unwrap().count(), 1);
    }

    #[test]
    fn test_copy_then_remove_failure_leaves_nothing_behind() {
        let d = dirs();
        let missing = d.source.join("missing.bin");
        let dest = d.source.join("dest.bin");

        assert!(copy_then_remove(&missing, &dest).is_err());
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(&d.source).unwrap().count(), 0);
    }

    #[test]
    fn test_history_round_trip() {
        let d = dirs();
        fs::create_dir_all(&d.output).unwrap();
        let mut log = OperationLog::new(d.source.clone(), d.output.clone());
        log.add_operation(Operation {
            original_path: d.source.join("a.jpg"),
            new_path: d.output.join("personal_media/a.jpg"),
            category: "personal_media".to_string(),
        });
        log.save(&d.output).expect("Failed to save history");

        let loaded = OperationLog::load(&d.output).unwrap().expect("history present");
        assert_eq!(loaded.operations, log.operations);
        assert_eq!(loaded.source_dir, d.source);

        OperationLog::delete(&d.output).unwrap();
        assert!(OperationLog::load(&d.output).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_history_is_error() {
        let d = dirs();
        fs::create_dir_all(&d.output).unwrap();
        fs::write(d.output.join(HISTORY_FILE), "{ nope").unwrap();
        assert!(matches!(
            OperationLog::load(&d.output),
            Err(MoveError::InvalidHistoryFormat { .. })
        ));
    }
}
