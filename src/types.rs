//! Shared types used across all pipeline stages.
//!
//! A [`GameRecord`] is built once per metadata file by the
//! [`library`](crate::library) reader and read by every later stage. Image
//! references are kept exactly as the library stores them (Windows
//! separators included); helpers here normalize them on demand.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Target canvas for a resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const COVER: Resolution = Resolution::new(180, 270);
    pub const ICON: Resolution = Resolution::new(550, 48);
    pub const BACKGROUND: Resolution = Resolution::new(1920, 620);
}

impl fmt::Display for Resolution {
    /// Renders in converter geometry syntax, e.g. `180x270`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The three image slots a game can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageRole {
    Cover,
    Icon,
    Background,
}

impl ImageRole {
    /// Extension the resizer writes for this role.
    pub fn target_extension(self) -> &'static str {
        match self {
            ImageRole::Cover | ImageRole::Background => "jpg",
            ImageRole::Icon => "png",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageRole::Cover => "cover",
            ImageRole::Icon => "icon",
            ImageRole::Background => "background",
        }
    }
}

/// One game parsed from the library's `games/<id>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    /// File stem of the metadata file.
    pub id: String,
    pub name: Option<String>,
    pub background: Option<String>,
    pub icon: Option<String>,
    pub cover: Option<String>,
    pub hidden: bool,
}

impl GameRecord {
    pub fn image(&self, role: ImageRole) -> Option<&str> {
        match role {
            ImageRole::Cover => self.cover.as_deref(),
            ImageRole::Icon => self.icon.as_deref(),
            ImageRole::Background => self.background.as_deref(),
        }
    }

    /// Number of image slots that are filled.
    pub fn image_count(&self) -> usize {
        [ImageRole::Background, ImageRole::Icon, ImageRole::Cover]
            .into_iter()
            .filter(|role| self.image(*role).is_some())
            .count()
    }

    /// Display name, falling back to the id.
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Replace Windows separators with `/`.
pub fn normalize_separators(reference: &str) -> String {
    reference.replace('\\', "/")
}

/// Strip the last extension and normalize separators.
///
/// `abc\\cover.png` → `abc/cover`. References without a dot are returned
/// with separators normalized only.
pub fn strip_extension(reference: &str) -> String {
    let normalized = normalize_separators(reference);
    let file_start = normalized.rfind('/').map(|i| i + 1).unwrap_or(0);
    match normalized[file_start..].rfind('.') {
        Some(dot) => normalized[..file_start + dot].to_string(),
        None => normalized,
    }
}

/// Last path segment of a reference, separator-agnostic.
pub fn file_name(reference: &str) -> &str {
    reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference)
}

/// Join a library image reference onto a root directory.
pub fn resolve(root: &Path, reference: &str) -> PathBuf {
    normalize_separators(reference)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Lower-case extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
