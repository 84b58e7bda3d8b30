use clap::Parser;
use mediasort::cli::{PathOverrides, SortCommand, run_cli};
use mediasort::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "mediasort", version)]
#[command(about = "Separate personal photos and videos from app icons, game assets, thumbnails and cached duplicates")]
struct Args {
    /// Directory to sort (overrides the config file)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Directory to sort into (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (JSON, or TOML with a .toml extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Move files. Without this flag nothing is changed.
    #[arg(long)]
    execute: bool,

    /// Print every file with its category and rationale
    #[arg(short, long)]
    verbose: bool,

    /// Reuse classifications saved by --save-cache
    #[arg(long, value_name = "FILE")]
    use_cache: Option<PathBuf>,

    /// Save classifications for a later run
    #[arg(long, value_name = "FILE")]
    save_cache: Option<PathBuf>,

    /// Write a JSON report of every file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Undo the last executed run in the output directory
    #[arg(long, conflicts_with_all = ["execute", "use_cache", "save_cache", "report"])]
    undo: bool,

    /// Write the default configuration to FILE and exit
    #[arg(long, value_name = "FILE", conflicts_with = "undo")]
    generate_config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let command = if let Some(path) = args.generate_config {
        SortCommand::GenerateConfig { path }
    } else if args.undo {
        SortCommand::Undo
    } else {
        SortCommand::Sort {
            execute: args.execute,
            verbose: args.verbose,
            use_cache: args.use_cache,
            save_cache: args.save_cache,
            report: args.report,
        }
    };

    let overrides = PathOverrides {
        source: args.source,
        output: args.output,
    };

    match run_cli(command, args.config.as_deref(), &overrides) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
