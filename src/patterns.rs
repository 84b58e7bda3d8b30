//! Filename pattern matching.
//!
//! Patterns are regular expressions compiled once, case-insensitively, when
//! the configuration is compiled. A plain word such as `icon` is simply a
//! substring regex.

use crate::category::Category;
use crate::config::{ConfigError, PatternSets};
use regex::{Regex, RegexBuilder};

/// Pattern groups, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternGroup {
    Personal,
    AppIcons,
    GameAssets,
    Cache,
}

impl PatternGroup {
    /// Fixed evaluation priority.
    pub const PRIORITY: [PatternGroup; 4] = [
        PatternGroup::Personal,
        PatternGroup::AppIcons,
        PatternGroup::GameAssets,
        PatternGroup::Cache,
    ];

    /// Category assigned when a pattern of this group matches.
    pub fn category(&self) -> Category {
        match self {
            PatternGroup::Personal => Category::PersonalMedia,
            PatternGroup::AppIcons => Category::AppIcons,
            PatternGroup::GameAssets => Category::GameAssets,
            PatternGroup::Cache => Category::SystemCache,
        }
    }

    /// Configuration key of this group.
    pub fn key(&self) -> &'static str {
        match self {
            PatternGroup::Personal => "personal",
            PatternGroup::AppIcons => "app_icons",
            PatternGroup::GameAssets => "game_assets",
            PatternGroup::Cache => "cache",
        }
    }
}

/// A successful filename match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub group: PatternGroup,
    /// Source text of the pattern that matched.
    pub pattern: String,
}

impl PatternMatch {
    pub fn category(&self) -> Category {
        self.group.category()
    }
}

/// Compiled filename patterns for every group.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    groups: Vec<(PatternGroup, Vec<Regex>)>,
}

impl PatternMatcher {
    /// Compiles every pattern set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRegexPattern` for the first pattern that
    /// fails to compile.
    pub fn compile(sets: &PatternSets) -> Result<Self, ConfigError> {
        let groups = PatternGroup::PRIORITY
            .iter()
            .map(|&group| {
                let regexes = sets
                    .for_group(group)
                    .iter()
                    .map(|pattern| {
                        RegexBuilder::new(pattern)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| ConfigError::InvalidRegexPattern {
                                pattern: pattern.clone(),
                                reason: e.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((group, regexes))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { groups })
    }

    /// Returns the first group, in priority order, with a pattern matching
    /// `file_name`. Within a group the first matching pattern is reported.
    pub fn match_filename(&self, file_name: &str) -> Option<PatternMatch> {
        self.groups.iter().find_map(|(group, regexes)| {
            regexes
                .iter()
                .find(|regex| regex.is_match(file_name))
                .map(|regex| PatternMatch {
                    group: *group,
                    pattern: regex.as_str().to_string(),
                })
        })
    }

    /// Number of compiled patterns across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, regexes)| regexes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
