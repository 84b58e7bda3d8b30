/// Reverting the most recent live run.
///
/// The run's [`OperationLog`] is read from the output directory and every
/// move is reversed, newest first.
use crate::organizer::{MoveError, MoveResult, Operation, OperationLog, move_atomic};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of an undo.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files moved back.
    pub restored_files: usize,
    /// Files that could not be moved back, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files no longer at their recorded location.
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

pub struct UndoManager;

impl UndoManager {
    /// Undoes the run recorded in `output_dir`.
    ///
    /// A file already present at an original location is renamed to
    /// `<name>.bak.<timestamp>` before the moved file is put back. The
    /// history file is removed only when every file was restored.
    ///
    /// ```no_run
    /// use mediasort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("./processed")) {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(output_dir: &Path) -> MoveResult<UndoReport> {
        if !output_dir.is_dir() {
            return Err(MoveError::InvalidBasePath {
                path: output_dir.to_path_buf(),
            });
        }

        let log = OperationLog::load(output_dir)?.ok_or_else(|| MoveError::InvalidHistoryFormat {
            reason: "No previous run found to undo".to_string(),
        })?;

        let mut report = UndoReport::default();
        for operation in log.operations.iter().rev() {
            match Self::restore_file(operation) {
                Ok(()) => {
                    debug!(
                        "restored {} -> {}",
                        operation.new_path.display(),
                        operation.original_path.display()
                    );
                    report.restored_files += 1;
                }
                Err(RestoreFailure::Missing(path, reason)) => report.skipped_files.push((path, reason)),
                Err(RestoreFailure::Failed(path, reason)) => report.failed_restores.push((path, reason)),
            }
        }

        if report.is_complete_success() {
            if let Err(e) = OperationLog::delete(output_dir) {
                warn!("could not delete history file: {}", e);
            }
            prune_emptied_dirs(&log.output_dir, &log.operations);
        }

        Ok(report)
    }

    fn restore_file(operation: &Operation) -> Result<(), RestoreFailure> {
        if !operation.new_path.exists() {
            return Err(RestoreFailure::Missing(
                operation.new_path.clone(),
                "File not found at expected location".to_string(),
            ));
        }

        if let Some(parent) = operation.original_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RestoreFailure::Failed(
                    operation.original_path.clone(),
                    format!("Could not recreate directory: {}", e),
                )
            })?;
        }

        if operation.original_path.exists() {
            let backup_path = Self::generate_backup_path(&operation.original_path);
            fs::rename(&operation.original_path, &backup_path).map_err(|e| {
                RestoreFailure::Failed(
                    operation.original_path.clone(),
                    format!("Could not backup conflicting file: {}", e),
                )
            })?;
        }

        move_atomic(&operation.new_path, &operation.original_path).map_err(|e| {
            RestoreFailure::Failed(
                operation.new_path.clone(),
                format!("Failed to restore file: {}", e),
            )
        })
    }

    /// `photo.jpg` becomes `photo.jpg.bak.20251109-143052`.
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        let backup_name = format!("{}.bak.{}", filename, timestamp);

        match original_path.parent() {
            Some(parent) => parent.join(backup_name),
            None => PathBuf::from(backup_name),
        }
    }
}

enum RestoreFailure {
    Missing(PathBuf, String),
    Failed(PathBuf, String),
}

/// Removes the directories the run moved files into, deepest first, as long
/// as they are empty. Nothing outside `root`, and `root` itself, is touched.
fn prune_emptied_dirs(root: &Path, operations: &[Operation]) {
    let mut dirs: Vec<&Path> = operations
        .iter()
        .flat_map(|op| op.new_path.ancestors().skip(1))
        .filter(|dir| dir.starts_with(root) && *dir != root)
        .collect();
    dirs.sort_by(|a, b| {
        b.components()
            .count()
            .cmp(&a.components().count())
            .then_with(|| a.cmp(b))
    });
    dirs.dedup();

    for dir in dirs {
        // Fails harmlessly on directories that still hold files.
        if fs::remove_dir(dir).is_ok() {
            debug!("removed empty directory {}", dir.display());
        }
    }
}
