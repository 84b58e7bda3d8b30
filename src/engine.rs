//! Classification engine.
//!
//! A file is classified by running an ordered chain of named [`Rule`]s. Each
//! rule sees the category assigned so far and either assigns a category or
//! abstains. The default chain is:
//!
//! 1. `filename_pattern` - configured filename patterns
//! 2. `icon_dimensions` - small images become app icons, unless already personal
//! 3. `thumbnail_dimensions` - small images nothing else claimed
//! 4. `large_video` - big videos nothing else claimed are personal
//! 5. `photo_dimensions` - large images nothing else claimed are personal
//! 6. `duplicate_hash` - a repeated content hash forces system cache
//!
//! Anything still unassigned needs review. An I/O error while probing or
//! hashing ends the chain and sends the file to review with the error noted.
//!
//! Evidence is gathered lazily: headers are only read when a rule asks for
//! dimensions, and the media kind only when the video rule runs.

use crate::category::{Category, KindMapper, MediaKind};
use crate::config::{CompiledConfig, Thresholds};
use crate::hasher;
use crate::patterns::PatternMatcher;
use crate::probe::{self, ImageHeaderInfo};
use crate::registry::DuplicateRegistry;
use log::{debug, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Bytes read for content sniffing when the extension is inconclusive.
const SNIFF_LEN: u64 = 512;

/// Something that can hand out the bytes of a file, from the start.
pub trait ContentSource {
    /// Opens a fresh reader positioned at byte 0.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// File content read from disk.
#[derive(Debug, Clone, Copy)]
pub struct DiskFile<'a>(pub &'a Path);

impl ContentSource for DiskFile<'_> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(BufReader::new(File::open(self.0)?)))
    }
}

impl ContentSource for Vec<u8> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.as_slice()))
    }
}

/// A file presented for classification.
pub struct Candidate<'a> {
    pub path: &'a Path,
    pub size_bytes: u64,
    pub content: &'a dyn ContentSource,
}

impl<'a> Candidate<'a> {
    pub fn new(path: &'a Path, size_bytes: u64, content: &'a dyn ContentSource) -> Self {
        Self {
            path,
            size_bytes,
            content,
        }
    }
}

/// The classification decision for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// MD5 of the content, when the chain got as far as hashing.
    pub content_hash: Option<String>,
    pub category: Category,
    /// One entry per rule that assigned a category, in order.
    pub rationale: Vec<String>,
    /// First path seen with the same content, for duplicates.
    pub duplicate_of: Option<PathBuf>,
    /// Header info, when a rule asked for it.
    pub image: Option<ImageHeaderInfo>,
}

impl FileRecord {
    /// A record for a file that could not even be inspected.
    pub fn unreadable(path: &Path, size_bytes: u64, error: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            size_bytes,
            content_hash: None,
            category: Category::NeedsReview,
            rationale: vec![format!("unreadable: {}", error)],
            duplicate_of: None,
            image: None,
        }
    }

    /// The rationale as a single line.
    pub fn rationale_text(&self) -> String {
        self.rationale.join("; ")
    }

    /// True if the file was sent to review because it could not be read.
    pub fn is_unreadable(&self) -> bool {
        self.rationale.iter().any(|r| r.starts_with("unreadable:"))
    }
}

/// Per-file evidence, gathered on demand and cached for later rules.
pub struct Evidence<'a> {
    candidate: &'a Candidate<'a>,
    kinds: &'a KindMapper,
    registry: &'a mut DuplicateRegistry,
    file_name: String,
    header: Option<ImageHeaderInfo>,
    kind: Option<MediaKind>,
    content_hash: Option<String>,
    duplicate_of: Option<PathBuf>,
}

impl<'a> Evidence<'a> {
    fn new(
        candidate: &'a Candidate<'a>,
        kinds: &'a KindMapper,
        registry: &'a mut DuplicateRegistry,
    ) -> Self {
        let file_name = candidate
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            candidate,
            kinds,
            registry,
            file_name,
            header: None,
            kind: None,
            content_hash: None,
            duplicate_of: None,
        }
    }

    pub fn path(&self) -> &Path {
        self.candidate.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.candidate.size_bytes
    }

    /// Image header info, probing the content on first use.
    pub fn header(&mut self) -> io::Result<ImageHeaderInfo> {
        if let Some(header) = self.header {
            return Ok(header);
        }
        let reader = self.candidate.content.open()?;
        let header = probe::probe_reader(reader)?;
        self.header = Some(header);
        Ok(header)
    }

    /// Media kind by extension, sniffing the content head as a fallback.
    pub fn kind(&mut self) -> io::Result<MediaKind> {
        if let Some(kind) = self.kind {
            return Ok(kind);
        }
        let mut kind = self.kinds.kind_of(self.candidate.path, None);
        if kind == MediaKind::Other {
            let mut head = Vec::with_capacity(SNIFF_LEN as usize);
            self.candidate
                .content
                .open()?
                .take(SNIFF_LEN)
                .read_to_end(&mut head)?;
            kind = self.kinds.kind_of(self.candidate.path, Some(&head));
        }
        self.kind = Some(kind);
        Ok(kind)
    }

    /// Hashes the content and registers it. Returns the original's path if
    /// this content was seen before.
    pub fn check_duplicate(&mut self, max_bytes: Option<u64>) -> io::Result<Option<PathBuf>> {
        let hash = match &self.content_hash {
            Some(hash) => hash.clone(),
            None => {
                let hash = hasher::hash_reader(self.candidate.content.open()?, max_bytes)?;
                self.content_hash = Some(hash.clone());
                hash
            }
        };
        let original = self.registry.check_and_register(&hash, self.candidate.path);
        self.duplicate_of = original.clone();
        Ok(original)
    }
}

/// What a rule decided.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Assign { category: Category, reason: String },
    Abstain,
}

impl RuleOutcome {
    fn assign(category: Category, reason: impl Into<String>) -> Self {
        RuleOutcome::Assign {
            category,
            reason: reason.into(),
        }
    }
}

/// One named step of the classification chain.
pub trait Rule {
    fn name(&self) -> &'static str;

    /// Evaluates the rule given the category assigned so far.
    fn evaluate(&self, evidence: &mut Evidence<'_>, current: Option<Category>) -> io::Result<RuleOutcome>;
}

/// Assigns the category of the first matching filename pattern.
pub struct FilenamePatternRule {
    matcher: PatternMatcher,
}

impl FilenamePatternRule {
    pub fn new(matcher: PatternMatcher) -> Self {
        Self { matcher }
    }
}

impl Rule for FilenamePatternRule {
    fn name(&self) -> &'static str {
        "filename_pattern"
    }

    fn evaluate(&self, evidence: &mut Evidence<'_>, _current: Option<Category>) -> io::Result<RuleOutcome> {
        Ok(match self.matcher.match_filename(evidence.file_name()) {
            Some(found) => RuleOutcome::assign(
                found.category(),
                format!("name matches {} pattern '{}'", found.group.key(), found.pattern),
            ),
            None => RuleOutcome::Abstain,
        })
    }
}

/// Images no larger than the icon size are icons. A personal filename wins.
pub struct IconDimensionRule {
    max_dimension: u32,
}

impl IconDimensionRule {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl Rule for IconDimensionRule {
    fn name(&self) -> &'static str {
        "icon_dimensions"
    }

    fn evaluate(&self, evidence: &mut Evidence<'_>, current: Option<Category>) -> io::Result<RuleOutcome> {
        if current == Some(Category::PersonalMedia) {
            return Ok(RuleOutcome::Abstain);
        }
        let header = evidence.header()?;
        if header.is_known() && header.max_dimension() <= self.max_dimension {
            return Ok(RuleOutcome::assign(
                Category::AppIcons,
                format!(
                    "{}x{} fits within icon size {}",
                    header.width, header.height, self.max_dimension
                ),
            ));
        }
        Ok(RuleOutcome::Abstain)
    }
}

/// Unclaimed images no larger than the thumbnail size are thumbnails.
pub struct ThumbnailDimensionRule {
    max_dimension: u32,
}

impl ThumbnailDimensionRule {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl Rule for ThumbnailDimensionRule {
    fn name(&self) -> &'static str {
        "thumbnail_dimensions"
    }

    fn evaluate(&self, evidence: &mut Evidence<'_>, current: Option<Category>) -> io::Result<RuleOutcome> {
        if current.is_some() {
            return Ok(RuleOutcome::Abstain);
        }
        let header = evidence.header()?;
        if header.is_known() && header.max_dimension() <= self.max_dimension {
            return Ok(RuleOutcome::assign(
                Category::Thumbnails,
                format!(
                    "{}x{} fits within thumbnail size {}",
                    header.width, header.height, self.max_dimension
                ),
            ));
        }
        Ok(RuleOutcome::Abstain)
    }
}

/// Unclaimed videos above the size threshold are personal.
pub struct LargeVideoRule {
    min_size_bytes: u64,
}

impl LargeVideoRule {
    pub fn new(min_size_bytes: u64) -> Self {
        Self { min_size_bytes }
    }
}

impl Rule for LargeVideoRule {
    fn name(&self) -> &'static str {
        "large_video"
    }

    fn evaluate(&self, evidence: &mut Evidence<'_>, current: Option<Category>) -> io::Result<RuleOutcome> {
        if current.is_some() {
            return Ok(RuleOutcome::Abstain);
        }
        if evidence.kind()? == MediaKind::Video && evidence.size_bytes() > self.min_size_bytes {
            return Ok(RuleOutcome::assign(
                Category::PersonalMedia,
                format!(
                    "video of {} bytes exceeds {} bytes",
                    evidence.size_bytes(),
                    self.min_size_bytes
                ),
            ));
        }
        Ok(RuleOutcome::Abstain)
    }
}

/// Unclaimed images whose shorter axis reaches the photo size are personal.
pub struct PhotoDimensionRule {
    min_dimension: u32,
}

impl PhotoDimensionRule {
    pub fn new(min_dimension: u32) -> Self {
        Self { min_dimension }
    }
}

impl Rule for PhotoDimensionRule {
    fn name(&self) -> &'static str {
        "photo_dimensions"
    }

    fn evaluate(&self, evidence: &mut Evidence<'_>, current: Option<Category>) -> io::Result<RuleOutcome> {
        if current.is_some() {
            return Ok(RuleOutcome::Abstain);
        }
        let header = evidence.header()?;
        if header.is_known() && header.min_dimension() >= self.min_dimension {
            return Ok(RuleOutcome::assign(
                Category::PersonalMedia,
                format!(
                    "{}x{} reaches photo size {}",
                    header.width, header.height, self.min_dimension
                ),
            ));
        }
        Ok(RuleOutcome::Abstain)
    }
}

/// Repeated content is cache, whatever was decided before.
pub struct DuplicateHashRule {
    max_bytes: Option<u64>,
}

impl DuplicateHashRule {
    pub fn new(max_bytes: Option<u64>) -> Self {
        Self { max_bytes }
    }
}

impl Rule for DuplicateHashRule {
    fn name(&self) -> &'static str {
        "duplicate_hash"
    }

    fn evaluate(&self, evidence: &mut Evidence<'_>, _current: Option<Category>) -> io::Result<RuleOutcome> {
        Ok(match evidence.check_duplicate(self.max_bytes)? {
            Some(original) => RuleOutcome::assign(
                Category::SystemCache,
                format!("same content as {}", original.display()),
            ),
            None => RuleOutcome::Abstain,
        })
    }
}

/// Builds the standard rule chain.
pub fn default_rules(
    matcher: PatternMatcher,
    thresholds: &Thresholds,
    hash_max_bytes: Option<u64>,
) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FilenamePatternRule::new(matcher)),
        Box::new(IconDimensionRule::new(thresholds.icon_max_dimension)),
        Box::new(ThumbnailDimensionRule::new(thresholds.thumbnail_max_dimension)),
        Box::new(LargeVideoRule::new(thresholds.min_video_size_bytes())),
        Box::new(PhotoDimensionRule::new(thresholds.min_photo_dimension)),
        Box::new(DuplicateHashRule::new(hash_max_bytes)),
    ]
}

/// Runs the rule chain against files.
pub struct ClassificationEngine {
    rules: Vec<Box<dyn Rule>>,
    kinds: KindMapper,
}

impl ClassificationEngine {
    /// Engine with the standard chain for `config`.
    pub fn new(config: &CompiledConfig) -> Self {
        Self::with_rules(
            default_rules(
                config.matcher.clone(),
                &config.thresholds,
                config.hashing.max_bytes,
            ),
            KindMapper::default(),
        )
    }

    /// Engine with a custom chain.
    pub fn with_rules(rules: Vec<Box<dyn Rule>>, kinds: KindMapper) -> Self {
        Self { rules, kinds }
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Classifies one file, registering its content hash in `registry`.
    pub fn classify(&self, candidate: &Candidate<'_>, registry: &mut DuplicateRegistry) -> FileRecord {
        let mut evidence = Evidence::new(candidate, &self.kinds, registry);
        let mut current: Option<Category> = None;
        let mut rationale = Vec::new();
        let mut failed = false;

        for rule in &self.rules {
            match rule.evaluate(&mut evidence, current) {
                Ok(RuleOutcome::Assign { category, reason }) => {
                    debug!(
                        "{}: {} assigned {} ({})",
                        candidate.path.display(),
                        rule.name(),
                        category,
                        reason
                    );
                    rationale.push(format!("{}: {}", rule.name(), reason));
                    current = Some(category);
                }
                Ok(RuleOutcome::Abstain) => {}
                Err(e) => {
                    warn!(
                        "{}: unreadable during {}: {}",
                        candidate.path.display(),
                        rule.name(),
                        e
                    );
                    rationale.push(format!("unreadable: {} failed: {}", rule.name(), e));
                    failed = true;
                    break;
                }
            }
        }

        let category = match current {
            _ if failed => Category::NeedsReview,
            Some(category) => category,
            None => {
                rationale.push("no rule produced a confident category".to_string());
                Category::NeedsReview
            }
        };

        FileRecord {
            path: candidate.path.to_path_buf(),
            size_bytes: candidate.size_bytes,
            content_hash: evidence.content_hash.take(),
            category,
            rationale,
            duplicate_of: evidence.duplicate_of.take(),
            image: evidence.header,
        }
    }

    /// Classifies a file on disk.
    pub fn classify_path(&self, path: &Path, registry: &mut DuplicateRegistry) -> FileRecord {
        match fs::metadata(path) {
            Ok(metadata) => {
                let content = DiskFile(path);
                self.classify(&Candidate::new(path, metadata.len(), &content), registry)
            }
            Err(e) => {
                warn!("{}: cannot read metadata: {}", path.display(), e);
                FileRecord::unreadable(path, 0, &e)
            }
        }
    }
}
