//! Playnite library reader.
//!
//! Stage 1 of the pipeline. Lists the library's `games/` directory and turns
//! each `<id>.json` into a [`GameRecord`]:
//!
//! ```text
//! library/
//! └── games/
//!     ├── 0b5e6e1c-....json     # {"Name":"Portal","CoverImage":"0b5e...\\cover.png",...}
//!     └── 5f1d2a90-....json
//! ```
//!
//! Only top-level `.json` files are read, in file-name order. Hidden games are
//! dropped. Fields that are missing, `null`, or of the wrong type become
//! `None`. A file that is not JSON at all is reported and kept as a record
//! with no fields; only filesystem errors stop the read.

use crate::events::{Event, emit};
use crate::types::GameRecord;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid game metadata in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read every non-hidden game in `games_dir`.
///
/// A missing directory yields an empty list.
pub fn read_games(
    games_dir: &Path,
    progress: Option<&Sender<Event>>,
) -> Result<Vec<GameRecord>, LibraryError> {
    if !games_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut games = Vec::new();
    for entry in WalkDir::new(games_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_json(entry.path()) {
            continue;
        }
        let game = match read_game(entry.path()) {
            Ok(game) => game,
            Err(LibraryError::Json { path, source }) => {
                emit(
                    progress,
                    Event::MalformedMetadata {
                        path,
                        error: source.to_string(),
                    },
                );
                GameRecord {
                    id: file_id(entry.path()),
                    ..Default::default()
                }
            }
            Err(err) => return Err(err),
        };
        if !game.hidden {
            games.push(game);
        }
    }
    Ok(games)
}

/// Parse a single metadata file. The id is the file stem.
pub fn read_game(path: &Path) -> Result<GameRecord, LibraryError> {
    let content = fs::read_to_string(path)?;
    parse_game(file_id(path), &content).map_err(|source| LibraryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Build a record from metadata text.
pub fn parse_game(id: String, content: &str) -> Result<GameRecord, serde_json::Error> {
    let data: Value = serde_json::from_str(content.trim_start_matches('\u{feff}'))?;
    Ok(GameRecord {
        id,
        name: read_field(&data, "Name"),
        background: read_field(&data, "BackgroundImage"),
        icon: read_field(&data, "Icon"),
        cover: read_field(&data, "CoverImage"),
        hidden: read_flag(&data, "Hidden"),
    })
}

/// String value of a top-level field; `None` if absent or not a string.
pub fn read_field(data: &Value, name: &str) -> Option<String> {
    data.get(name).and_then(Value::as_str).map(str::to_string)
}

/// True only when the field is the JSON literal `true`.
pub fn read_flag(data: &Value, name: &str) -> bool {
    data.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn file_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
