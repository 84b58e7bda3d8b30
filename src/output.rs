//! Output formatting and styling.
//!
//! All user-facing terminal output goes through [`OutputFormatter`], so
//! styling can be changed (or switched off with `--no-color`) in one place.

use crate::category::Category;
use crate::engine::FileRecord;
use crate::runner::RunStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Most per-file errors listed after a run.
pub const MAX_LISTED_ERRORS: usize = 10;

const BAR_WIDTH: usize = 30;

pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// OutputFormatter::success("Sorting complete");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn rule() {
        println!("{}", "─".repeat(70).dimmed());
    }

    /// Prints the mode banner and the directories of a run.
    pub fn run_banner(dry_run: bool, source: &Path, output: &Path) {
        let mode = if dry_run {
            "DRY RUN MODE - no files will be moved".yellow().bold()
        } else {
            "EXECUTE MODE - files will be moved".green().bold()
        };
        println!("{}", mode);
        println!("{} {}", "Source:".bold(), source.display());
        println!("{} {}", "Output:".bold(), output.display());
        Self::rule();
    }

    /// Progress bar for classifying `total` files.
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// One line describing a classified file, for verbose mode.
    pub fn record_line(record: &FileRecord, destination: Option<&Path>, from_cache: bool) -> String {
        let name = record
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| record.path.display().to_string());
        let mut line = format!(
            "{} {} {}",
            name,
            "→".dimmed(),
            Self::colored_label(record.category)
        );
        if let Some(destination) = destination {
            line.push_str(&format!(" {}", destination.display().to_string().dimmed()));
        }
        if from_cache {
            line.push_str(&format!(" {}", "(cached)".dimmed()));
        } else if !record.rationale.is_empty() {
            line.push_str(&format!("\n    {}", record.rationale_text().dimmed()));
        }
        line
    }

    fn colored_label(category: Category) -> ColoredString {
        let label = category.label();
        match category {
            Category::PersonalMedia => label.green().bold(),
            Category::AppIcons | Category::GameAssets | Category::Thumbnails => label.blue(),
            Category::SystemCache => label.dimmed(),
            Category::NeedsReview => label.yellow(),
        }
    }

    /// Results table: one row per category with count, share and a bar.
    pub fn results_table(stats: &RunStats) {
        Self::header("RESULTS");

        let width = Category::ALL
            .iter()
            .map(|c| c.label().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {:>6} | {:>6} |",
            "Category".bold(),
            "Files".bold(),
            "Share".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 20 + BAR_WIDTH));

        for category in Category::ALL {
            let count = stats.count(category);
            let percentage = stats.percentage(category);
            println!(
                "{:<width$} | {:>6} | {:>5.1}% | {}",
                category.label(),
                count,
                percentage,
                Self::bar(percentage),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 20 + BAR_WIDTH));
        println!(
            "{:<width$} | {:>6} |",
            "Total".bold(),
            stats.total.to_string().green().bold(),
            width = width
        );
        if stats.duplicates > 0 {
            Self::plain(&format!("Duplicates found: {}", stats.duplicates));
        }
        if stats.from_cache > 0 {
            Self::plain(&format!("Reused from cache: {}", stats.from_cache));
        }
    }

    fn bar(percentage: f64) -> String {
        let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
    }

    /// Lists up to [`MAX_LISTED_ERRORS`] per-file errors.
    pub fn error_list(errors: &[(PathBuf, String)]) {
        if errors.is_empty() {
            return;
        }
        Self::header(&format!("ERRORS ({})", errors.len()));
        for (path, reason) in errors.iter().take(MAX_LISTED_ERRORS) {
            Self::error(&format!("{}: {}", path.display(), reason));
        }
        if errors.len() > MAX_LISTED_ERRORS {
            Self::plain(&format!("... and {} more", errors.len() - MAX_LISTED_ERRORS));
        }
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

/// Human-readable duration: `850ms`, `12.3s`, `4m 05s`, `1h 02m`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 1 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(12_340)), "12.3s");
        assert_eq!(format_elapsed(Duration::from_secs(245)), "4m 05s");
        assert_eq!(format_elapsed(Duration::from_secs(3720)), "1h 02m");
    }

    #[test]
    fn test_bar_is_bounded() {
        let empty = OutputFormatter::bar(0.0);
        let full = OutputFormatter::bar(100.0);
        assert_eq!(empty.chars().filter(|c| *c == '█').count(), 0);
        assert_eq!(full.chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(OutputFormatter::bar(50.0).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn test_record_line_mentions_category() {
        colored::control::set_override(false);
        let record = FileRecord {
            path: PathBuf::from("/in/icon.png"),
            size_bytes: 1,
            content_hash: None,
            category: Category::AppIcons,
            rationale: vec!["icon_dimensions: 48x48".to_string()],
            duplicate_of: None,
            image: None,
        };
        let line = OutputFormatter::record_line(&record, None, false);
        assert!(line.starts_with("icon.png → app_icons"));
        assert!(line.contains("icon_dimensions: 48x48"));
    }
}
