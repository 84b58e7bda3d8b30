//! mediasort - separates personal photos and videos from app icons, game
//! assets, thumbnails and cached duplicates.
//!
//! Files are classified by an ordered rule chain ([`engine`]) that combines
//! filename patterns, image dimensions read from raw PNG, JPEG and GIF
//! headers, file size and MD5 duplicate detection. A [`runner::SortRunner`]
//! walks a source tree, classifies every file and optionally moves it into
//! a per-category output tree that can be restored with [`undo`].

pub mod cache;
pub mod category;
pub mod cli;
pub mod config;
pub mod engine;
pub mod hasher;
pub mod organizer;
pub mod output;
pub mod patterns;
pub mod probe;
pub mod registry;
pub mod runner;
pub mod undo;

pub use category::Category;
pub use config::{ConfigError, SorterConfig};
pub use engine::{ClassificationEngine, FileRecord};
pub use probe::{ImageFormat, ImageHeaderInfo};
pub use registry::DuplicateRegistry;
pub use runner::{RunOptions, RunReport, SortError, SortRunner};
pub use undo::{UndoManager, UndoReport};

pub use cli::{SortCommand, run_cli};
