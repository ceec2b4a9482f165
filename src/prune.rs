//! Duplicate image pruning.
//!
//! Stage 4 of the pipeline. Once the HTML points at primaries only, the
//! duplicate files themselves can go. For every cover and background
//! reference, the `.ico`, `.png` and `.jpg` variants under the output root
//! are checked; a variant that exists and is a duplicate is deleted.
//!
//! Icons are not pruned.

use crate::duplicates::DuplicateMap;
use crate::events::{Event, emit};
use crate::types::{GameRecord, resolve};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Extensions a reference can have on disk before or after resizing.
const VARIANT_EXTENSIONS: [&str; 3] = ["ico", "png", "jpg"];

#[derive(Error, Debug)]
pub enum PruneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Files a set of games could have left behind, one entry per path.
pub fn candidate_paths(output_root: &Path, games: &[GameRecord]) -> BTreeSet<PathBuf> {
    games
        .iter()
        .flat_map(|game| [game.cover.as_deref(), game.background.as_deref()])
        .flatten()
        .flat_map(|reference| {
            let path = resolve(output_root, reference);
            VARIANT_EXTENSIONS.map(|ext| path.with_extension(ext))
        })
        .collect()
}

/// Delete duplicate cover and background files. Returns the paths that were
/// (or in simulate mode would have been) deleted.
pub fn prune_duplicates(
    output_root: &Path,
    games: &[GameRecord],
    duplicates: &DuplicateMap,
    simulate: bool,
    progress: Option<&Sender<Event>>,
) -> Result<Vec<PathBuf>, PruneError> {
    let mut deleted = Vec::new();
    if duplicates.is_empty() {
        return Ok(deleted);
    }

    for path in candidate_paths(output_root, games) {
        if !path.is_file() || !duplicates.is_duplicate(&relative_reference(output_root, &path))
        {
            continue;
        }
        if !simulate {
            fs::remove_file(&path)?;
        }
        emit(progress, Event::DeletingDuplicate { path: path.clone() });
        deleted.push(path);
    }
    Ok(deleted)
}

/// Path below the output root as a `/`-separated string, so that matching
/// cannot pick up parts of the root itself.
fn relative_reference(output_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(output_root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn game(id: &str, name: &str, cover: Option<&str>, icon: Option<&str>) -> GameRecord {
        GameRecord {
            id: id.into(),
            name: Some(name.into()),
            cover: cover.map(String::from),
            icon: icon.map(String::from),
            ..Default::default()
        }
    }

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn candidate_paths_covers_all_variants_once() {
        let games = vec![
            game("a", "A", Some("a\\cover.png"), Some("a\\icon.ico")),
            game("b", "A", Some("a\\cover.png"), None),
        ];
        let paths = candidate_paths(Path::new("/site"), &games);
        assert_eq!(
            paths,
            BTreeSet::from([
                PathBuf::from("/site/a/cover.ico"),
                PathBuf::from("/site/a/cover.jpg"),
                PathBuf::from("/site/a/cover.png"),
            ])
        );
    }

    #[test]
    fn deletes_duplicate_keeps_primary() {
        let tmp = TempDir::new().unwrap();
        let primary = touch(tmp.path(), "p1/cover.jpg");
        let duplicate = touch(tmp.path(), "p2/cover.jpg");
        let games = vec![
            game("1", "Twin", Some("p1\\cover.png"), None),
            game("2", "Twin", Some("p2\\cover.png"), None),
        ];
        let duplicates = DuplicateMap::from_games(&games).unwrap();
        let (tx, rx) = mpsc::channel();

        let deleted =
            prune_duplicates(tmp.path(), &games, &duplicates, false, Some(&tx)).unwrap();

        assert_eq!(deleted, vec![duplicate.clone()]);
        assert!(primary.exists());
        assert!(!duplicate.exists());
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![Event::DeletingDuplicate { path: duplicate }]);
    }

    #[test]
    fn simulate_keeps_files_but_reports() {
        let tmp = TempDir::new().unwrap();
        let duplicate = touch(tmp.path(), "p2/cover.png");
        let games = vec![
            game("1", "Twin", Some("p1/cover.png"), None),
            game("2", "Twin", Some("p2/cover.png"), None),
        ];
        let duplicates = DuplicateMap::from_games(&games).unwrap();

        let deleted = prune_duplicates(tmp.path(), &games, &duplicates, true, None).unwrap();

        assert_eq!(deleted, vec![duplicate.clone()]);
        assert!(duplicate.exists());
    }

    #[test]
    fn icon_duplicates_are_not_pruned() {
        let tmp = TempDir::new().unwrap();
        let icon = touch(tmp.path(), "p2/icon.png");
        let games = vec![
            game("1", "Twin", None, Some("p1/icon.ico")),
            game("2", "Twin", None, Some("p2/icon.ico")),
        ];
        let duplicates = DuplicateMap::from_games(&games).unwrap();
        assert!(duplicates.is_duplicate("p2/icon.png"));

        let deleted = prune_duplicates(tmp.path(), &games, &duplicates, false, None).unwrap();

        assert!(deleted.is_empty());
        assert!(icon.exists());
    }

    #[test]
    fn root_path_never_matches() {
        let relative = relative_reference(Path::new("/site/p2"), Path::new("/site/p2/cover.jpg"));
        assert_eq!(relative, "cover.jpg");
    }
}
