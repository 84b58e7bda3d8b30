//! Command dispatch for the `mediasort` binary.
//!
//! Parsing lives in `main.rs`; this module loads configuration, runs the
//! requested command and turns every error into a printable message.

use crate::config::SorterConfig;
use crate::output::{OutputFormatter, format_elapsed};
use crate::runner::{RunEvent, RunOptions, SortRunner};
use crate::undo::UndoManager;
use std::path::{Path, PathBuf};

/// Directory overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl PathOverrides {
    fn apply(&self, config: &mut SorterConfig) {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
    }
}

/// A command to execute.
#[derive(Debug, Clone)]
pub enum SortCommand {
    /// Classify the source tree and, when `execute` is set, move the files.
    Sort {
        execute: bool,
        verbose: bool,
        use_cache: Option<PathBuf>,
        save_cache: Option<PathBuf>,
        report: Option<PathBuf>,
    },
    /// Undo the last live run recorded in the output directory.
    Undo,
    /// Write the default configuration to a file.
    GenerateConfig { path: PathBuf },
}

/// Runs `command` with configuration from `config_path` (or the usual
/// lookup locations) and the given directory overrides.
///
/// ```no_run
/// use mediasort::cli::{PathOverrides, SortCommand, run_cli};
///
/// let command = SortCommand::Sort {
///     execute: false,
///     verbose: true,
///     use_cache: None,
///     save_cache: None,
///     report: None,
/// };
/// if let Err(e) = run_cli(command, None, &PathOverrides::default()) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(
    command: SortCommand,
    config_path: Option<&Path>,
    overrides: &PathOverrides,
) -> Result<(), String> {
    if let SortCommand::GenerateConfig { path } = &command {
        return generate_config(path);
    }

    let mut config = SorterConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    overrides.apply(&mut config);

    match command {
        SortCommand::Sort {
            execute,
            verbose,
            use_cache,
            save_cache,
            report,
        } => {
            let options = RunOptions {
                dry_run: !execute,
                use_cache,
                save_cache,
                report,
            };
            sort(&config, &options, verbose)
        }
        SortCommand::Undo => undo_last_run(&config.output_dir),
        SortCommand::GenerateConfig { .. } => Ok(()),
    }
}

fn generate_config(path: &Path) -> Result<(), String> {
    SorterConfig::default()
        .save_to_file(path)
        .map_err(|e| format!("Error writing configuration: {}", e))?;
    OutputFormatter::success(&format!("Default configuration written to {}", path.display()));
    Ok(())
}

fn sort(config: &SorterConfig, options: &RunOptions, verbose: bool) -> Result<(), String> {
    let runner =
        SortRunner::new(config).map_err(|e| format!("Error compiling configuration: {}", e))?;

    OutputFormatter::run_banner(options.dry_run, runner.source_dir(), runner.output_dir());

    let existing = runner.existing_output_files();
    if existing > 0 {
        OutputFormatter::warning(&format!(
            "{} files already present in {}",
            existing,
            runner.output_dir().display()
        ));
    }

    let mut progress = None;
    let report = runner
        .run(options, |event| match event {
            RunEvent::CacheLoaded { entries } => {
                OutputFormatter::info(&format!("Using {} cached classifications", entries));
            }
            RunEvent::CacheIgnored { reason } => {
                OutputFormatter::warning(&format!("{}, classifying from scratch", reason));
            }
            RunEvent::Started { total } => {
                if total == 0 {
                    OutputFormatter::plain("No files found to sort.");
                } else if !verbose {
                    progress = Some(OutputFormatter::create_progress_bar(total as u64));
                }
            }
            RunEvent::FileDone {
                record,
                destination,
                from_cache,
            } => match &progress {
                Some(pb) => pb.inc(1),
                None => OutputFormatter::plain(&OutputFormatter::record_line(
                    record,
                    destination,
                    from_cache,
                )),
            },
        })
        .map_err(|e| format!("Error: {}", e))?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    OutputFormatter::results_table(&report.stats);
    OutputFormatter::error_list(&report.errors);
    OutputFormatter::plain(&format!("\nCompleted in {}", format_elapsed(report.elapsed)));

    if let Some(path) = &options.save_cache
        && options.use_cache.is_none()
    {
        OutputFormatter::success(&format!("Classifications cached in {}", path.display()));
    }
    if let Some(path) = &options.report {
        OutputFormatter::success(&format!("Report written to {}", path.display()));
    }

    if report.dry_run {
        OutputFormatter::dry_run_notice("No files were moved.");
        OutputFormatter::plain("Run again with --execute to move the files.");
    } else {
        OutputFormatter::success(&format!("Moved {} files", report.stats.moved));
        if report.history_saved {
            OutputFormatter::plain("History saved. Use --undo to revert this run.");
        }
        if !report.errors.is_empty() {
            OutputFormatter::warning("Some files could not be moved. Please review errors above.");
        }
    }

    Ok(())
}

fn undo_last_run(output_dir: &Path) -> Result<(), String> {
    OutputFormatter::info(&format!("Undoing last run in {}", output_dir.display()));

    let report = UndoManager::undo(output_dir).map_err(|e| format!("Error: {}", e))?;
    OutputFormatter::success(&format!("Restored {} files", report.restored_files));

    if !report.skipped_files.is_empty() {
        OutputFormatter::warning(&format!("Skipped: {}", report.skipped_files.len()));
        for (path, reason) in &report.skipped_files {
            OutputFormatter::plain(&format!("  - {}: {}", path.display(), reason));
        }
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::error(&format!("Failed: {}", report.failed_restores.len()));
        for (path, reason) in &report.failed_restores {
            OutputFormatter::error(&format!("  - {}: {}", path.display(), reason));
        }
    }

    if !report.is_complete_success() {
        OutputFormatter::warning("History file was NOT deleted. Fix the issues and try again.");
    }

    Ok(())
}
