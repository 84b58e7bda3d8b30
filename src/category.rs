/// Classification categories and media-kind detection.
///
/// A [`Category`] is one of the six terminal labels a file can end up with.
/// [`KindMapper`] decides whether a file is an image, a video or something
/// else, first by extension and then by sniffing the leading bytes.
///
/// # Examples
///
/// ```
/// use mediasort::category::{Category, KindMapper, MediaKind};
///
/// let mapper = KindMapper::default();
/// assert_eq!(mapper.extension_to_kind("MP4"), Some(MediaKind::Video));
/// assert_eq!(Category::NeedsReview.label(), "needs_review");
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Terminal classification label for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Family photos and videos worth keeping.
    PersonalMedia,
    /// Launcher icons, logos, buttons and other small UI bitmaps.
    AppIcons,
    /// Sprites, textures and other game resources.
    GameAssets,
    /// Small previews.
    Thumbnails,
    /// Cache files and content duplicates.
    SystemCache,
    /// Nothing conclusive was found.
    NeedsReview,
}

impl Category {
    /// All categories, in report order.
    pub const ALL: [Category; 6] = [
        Category::PersonalMedia,
        Category::AppIcons,
        Category::GameAssets,
        Category::Thumbnails,
        Category::SystemCache,
        Category::NeedsReview,
    ];

    /// Returns the stable label used in reports and caches.
    ///
    /// ```
    /// use mediasort::category::Category;
    ///
    /// assert_eq!(Category::PersonalMedia.label(), "personal_media");
    /// assert_eq!(Category::SystemCache.label(), "system_cache");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Category::PersonalMedia => "personal_media",
            Category::AppIcons => "app_icons",
            Category::GameAssets => "game_assets",
            Category::Thumbnails => "thumbnails",
            Category::SystemCache => "system_cache",
            Category::NeedsReview => "needs_review",
        }
    }

    /// Parses a label produced by [`Category::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::PersonalMedia => "Personal photos and videos",
            Category::AppIcons => "Application icons and UI graphics",
            Category::GameAssets => "Game sprites and textures",
            Category::Thumbnails => "Thumbnails and previews",
            Category::SystemCache => "Cache files and duplicates",
            Category::NeedsReview => "Files that need manual review",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Broad media kind of a file, used by the size heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

/// Maps file extensions and content signatures to a [`MediaKind`].
#[derive(Debug, Clone)]
pub struct KindMapper {
    extension_map: HashMap<String, MediaKind>,
}

impl KindMapper {
    /// Creates a mapper with the standard image and video extensions.
    pub fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        for ext in ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "heic", "ico"] {
            mapper.add_extension_mapping(ext, MediaKind::Image);
        }
        for ext in [
            "mp4", "mov", "avi", "mkv", "m4v", "3gp", "wmv", "flv", "webm", "mpg", "mpeg",
        ] {
            mapper.add_extension_mapping(ext, MediaKind::Video);
        }
        mapper
    }

    /// Adds or replaces an extension mapping (case-insensitive).
    pub fn add_extension_mapping(&mut self, ext: &str, kind: MediaKind) {
        self.extension_map.insert(ext.to_lowercase(), kind);
    }

    /// Maps a file extension to a media kind.
    pub fn extension_to_kind(&self, ext: &str) -> Option<MediaKind> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Maps leading content bytes to a media kind using `infer`.
    ///
    /// ```
    /// use mediasort::category::{KindMapper, MediaKind};
    ///
    /// let mapper = KindMapper::default();
    /// let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
    /// assert_eq!(mapper.sniff_kind(gif), Some(MediaKind::Image));
    /// assert_eq!(mapper.sniff_kind(b"plain text"), None);
    /// ```
    pub fn sniff_kind(&self, head: &[u8]) -> Option<MediaKind> {
        let kind = infer::get(head)?;
        match kind.matcher_type() {
            infer::MatcherType::Image => Some(MediaKind::Image),
            infer::MatcherType::Video => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Determines the kind of a file from its path, falling back to the
    /// content head when the extension is missing or unknown.
    pub fn kind_of(&self, path: &Path, head: Option<&[u8]>) -> MediaKind {
        if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && let Some(kind) = self.extension_to_kind(ext)
        {
            return kind;
        }

        head.and_then(|bytes| self.sniff_kind(bytes))
            .unwrap_or(MediaKind::Other)
    }
}

impl Default for KindMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("review"), None);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Category::NeedsReview).unwrap();
        assert_eq!(json, "\"needs_review\"");
        let parsed: Category = serde_json::from_str("\"app_icons\"").unwrap();
        assert_eq!(parsed, Category::AppIcons);
    }

    #[test]
    fn test_extension_to_kind_case_insensitive() {
        let mapper = KindMapper::default();
        assert_eq!(mapper.extension_to_kind("MOV"), Some(MediaKind::Video));
        assert_eq!(mapper.extension_to_kind("Jpg"), Some(MediaKind::Image));
        assert_eq!(mapper.extension_to_kind("txt"), None);
    }

    #[test]
    fn test_kind_of_prefers_extension() {
        let mapper = KindMapper::default();
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
        assert_eq!(
            mapper.kind_of(Path::new("clip.mp4"), Some(gif)),
            MediaKind::Video
        );
    }

    #[test]
    fn test_kind_of_sniffs_when_extension_unknown() {
        let mapper = KindMapper::default();
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
        assert_eq!(mapper.kind_of(Path::new("blob"), Some(gif)), MediaKind::Image);
        assert_eq!(mapper.kind_of(Path::new("notes.txt"), None), MediaKind::Other);
    }

    #[test]
    fn test_custom_mapping() {
        let mut mapper = KindMapper::default();
        mapper.add_extension_mapping("dng", MediaKind::Image);
        assert_eq!(mapper.extension_to_kind("DNG"), Some(MediaKind::Image));
    }
}
