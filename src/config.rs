//! Run configuration.
//!
//! Everything the pipeline needs to know about the machine it runs on lives
//! in one [`MinifyConfig`], loaded from `minify.toml` and passed to every
//! stage. Nothing is read from globals, so tests point the pipeline at
//! temporary directories.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! simulate = true            # Dry run: log actions, touch nothing
//! library_root = "library"   # Playnite library directory
//! games_dir = "games"        # Metadata subdirectory of library_root
//! output_root = "site"       # Exported website (HTML + image copy)
//! converter = "magick"       # ImageMagick executable
//! jpeg_quality = 100         # JPEG quality (0-100)
//! icon_frame_limit = 21      # Max frames considered when splitting .ico files
//!
//! [sizes.cover]
//! width = 180
//! height = 270
//!
//! [sizes.icon]
//! width = 550
//! height = 48
//!
//! [sizes.background]
//! width = 1920
//! height = 620
//! ```
//!
//! User files are sparse: they are merged on top of the stock defaults, so
//! overriding a single key is enough. Unknown keys are rejected to catch
//! typos early.

use crate::types::{ImageRole, Resolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "minify.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    /// When true, every deletion, HTML write and converter call is replaced
    /// by its log line.
    pub simulate: bool,
    pub library_root: PathBuf,
    /// Subdirectory of `library_root` holding one `<id>.json` per game.
    pub games_dir: String,
    /// Exported website: top-level HTML files plus the copied image tree.
    pub output_root: PathBuf,
    /// ImageMagick executable, invoked as `<converter> convert ...`.
    pub converter: PathBuf,
    /// JPEG encoding quality (0 = worst, 100 = best).
    pub jpeg_quality: u32,
    /// Frame indices `0..icon_frame_limit` are considered when an icon
    /// container is split.
    pub icon_frame_limit: usize,
    pub sizes: SizesConfig,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            simulate: true,
            library_root: PathBuf::from("library"),
            games_dir: "games".to_string(),
            output_root: PathBuf::from("site"),
            converter: PathBuf::from("magick"),
            jpeg_quality: 100,
            icon_frame_limit: 21,
            sizes: SizesConfig::default(),
        }
    }
}

impl MinifyConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality > 100 {
            return Err(ConfigError::Validation("jpeg_quality must be 0-100".into()));
        }
        if self.icon_frame_limit == 0 {
            return Err(ConfigError::Validation(
                "icon_frame_limit must be at least 1".into(),
            ));
        }
        if self.games_dir.is_empty() {
            return Err(ConfigError::Validation("games_dir must not be empty".into()));
        }
        for role in [ImageRole::Cover, ImageRole::Icon, ImageRole::Background] {
            let size = self.sizes.for_role(role);
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "sizes.{} dimensions must be non-zero",
                    role.label()
                )));
            }
        }
        Ok(())
    }

    /// Directory holding the per-game metadata files.
    pub fn games_path(&self) -> PathBuf {
        self.library_root.join(&self.games_dir)
    }
}

/// Target canvas per image role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizesConfig {
    pub cover: Resolution,
    pub icon: Resolution,
    pub background: Resolution,
}

impl Default for SizesConfig {
    fn default() -> Self {
        Self {
            cover: Resolution::COVER,
            icon: Resolution::ICON,
            background: Resolution::BACKGROUND,
        }
    }
}

impl SizesConfig {
    pub fn for_role(&self, role: ImageRole) -> Resolution {
        match role {
            ImageRole::Cover => self.cover,
            ImageRole::Icon => self.icon,
            ImageRole::Background => self.background,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(MinifyConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value; `Ok(None)` when it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MinifyConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MinifyConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, falling back to stock defaults when the file
/// is absent.
pub fn load_config(path: &Path) -> Result<MinifyConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Returns a fully-commented stock `minify.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Playnite Minify Configuration
# =============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Dry run. Conversions, deletions and HTML rewrites are logged but not
# performed. Set to false (or pass --apply) once the log looks right.
simulate = true

# Playnite library directory and the metadata subdirectory holding one
# <game-id>.json per game.
library_root = "library"
games_dir = "games"

# Exported website: top-level *.html files plus the copied image tree.
# Images are resized and pruned here, in place.
output_root = "site"

# ImageMagick executable. Invoked as `<converter> convert <src> ... <dest>`.
converter = "magick"

# JPEG quality for covers and backgrounds (0 = worst, 100 = best).
jpeg_quality = 100

# Icon containers (.ico) are split into numbered frames before resizing.
# Only frame numbers below this limit are considered.
icon_frame_limit = 21

# ---------------------------------------------------------------------------
# Target canvas per image role (resize keeps the aspect ratio)
# ---------------------------------------------------------------------------
[sizes.cover]
width = 180
height = 270

[sizes.icon]
width = 550
height = 48

[sizes.background]
width = 1920
height = 620
"##
}
