//! HTML reference patching.
//!
//! Stage 3 of the pipeline. After resizing, the exported pages still point
//! at the original image files. Each top-level `*.html` file in the output
//! root is rewritten in place:
//!
//! 1. `.ico` references become `.png` (icons are now PNG).
//! 2. `.png` references whose file name is a game's background or cover
//!    become `.jpg` (those were re-encoded as JPEG).
//! 3. Duplicate image references are replaced by their primary
//!    (see [`DuplicateMap::canonicalize`]).
//!
//! A read or write failure stops the run. In simulate mode files are read
//! and patched in memory but never written.

use crate::duplicates::DuplicateMap;
use crate::events::{Event, emit};
use crate::types::{GameRecord, file_name};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

static ICON_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ico\b").expect("static regex"));
static PNG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w,-]*\.png").expect("static regex"));

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// File names (no directory) of background and cover images stored as PNG.
///
/// These are the names that the resizer turned into `.jpg`.
pub fn photographic_png_names(games: &[GameRecord]) -> HashSet<String> {
    games
        .iter()
        .flat_map(|game| [game.background.as_deref(), game.cover.as_deref()])
        .flatten()
        .filter(|reference| reference.ends_with(".png"))
        .map(|reference| file_name(reference).to_string())
        .collect()
}

/// Apply the extension fixes to page text.
pub fn fix_extensions<'t>(content: &'t str, photographic: &HashSet<String>) -> Cow<'t, str> {
    let icons_fixed = ICON_EXTENSION.replace_all(content, ".png");
    let promoted = match PNG_TOKEN.replace_all(&icons_fixed, |caps: &regex::Captures<'_>| {
        let token = &caps[0];
        if photographic.contains(token) {
            format!("{}.jpg", &token[..token.len() - ".png".len()])
        } else {
            token.to_string()
        }
    }) {
        Cow::Borrowed(_) => None,
        Cow::Owned(fixed) => Some(fixed),
    };
    match promoted {
        Some(fixed) => Cow::Owned(fixed),
        None => icons_fixed,
    }
}

/// Full patch of one page: extension fixes then duplicate folding.
pub fn patch_content(
    content: &str,
    photographic: &HashSet<String>,
    duplicates: &DuplicateMap,
) -> String {
    let fixed = fix_extensions(content, photographic);
    duplicates.canonicalize(&fixed).into_owned()
}

/// Top-level HTML files of `dir`, sorted by name.
pub fn html_files(dir: &Path) -> Result<Vec<PathBuf>, PatchError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let is_html = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html"));
        if entry.file_type().is_file() && is_html {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Counts over a whole patch stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub files: usize,
    pub changed: usize,
}

/// Patch every top-level HTML file under `output_root`.
pub fn patch_html(
    output_root: &Path,
    games: &[GameRecord],
    duplicates: &DuplicateMap,
    simulate: bool,
    progress: Option<&Sender<Event>>,
) -> Result<PatchSummary, PatchError> {
    let files = html_files(output_root)?;
    let photographic = photographic_png_names(games);
    let mut summary = PatchSummary {
        files: files.len(),
        changed: 0,
    };

    for (index, path) in files.iter().enumerate() {
        let content = fs::read_to_string(path)?;
        let patched = patch_content(&content, &photographic, duplicates);
        let changed = patched != content;
        if changed {
            summary.changed += 1;
            if !simulate {
                fs::write(path, &patched)?;
            }
        }
        emit(
            progress,
            Event::HtmlPatched {
                index: index + 1,
                total: files.len(),
                path: path.clone(),
                changed,
            },
        );
    }

    Ok(summary)
}
