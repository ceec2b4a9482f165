//! CLI output formatting.
//!
//! Every stage reports through [`Event`]s; this module turns them into
//! display lines. Format functions are pure and return `Vec<String>` for
//! testability, `print_*` wrappers write to stdout.
//!
//! ```text
//! ==> Stage 2: Resizing images
//! Scanning 2 games
//! Resizing 5 images
//! 001/002 Portal
//!     Converting cover: site/files/a1/cover.png
//!     Deleting converted image: site/files/a1/cover.png
//!     Missing file (icon): site/files/a1/icon.ico
//! ==> Stage 3: Patching HTML
//! Fixing Html 1/12 index.html
//! ==> Stage 4: Pruning duplicates
//! Deleting duplicate: site/files/b7/cover.jpg
//! ```

use crate::duplicates::DuplicateMap;
use crate::events::Event;
use crate::types::GameRecord;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a single progress event as display lines.
pub fn format_event(event: &Event) -> Vec<String> {
    match event {
        Event::Stage { number, title } => vec![format!("==> Stage {number}: {title}")],
        Event::MalformedMetadata { path, error } => vec![
            format!("Malformed metadata: {}", path.display()),
            format!("{}{}", indent(1), error),
        ],
        Event::ResizeStarted { games, images } => vec![
            format!("Scanning {games} games"),
            format!("Resizing {images} images"),
        ],
        Event::GameStarted {
            index,
            total,
            title,
        } => vec![format!(
            "{}/{} {}",
            format_index(*index),
            format_index(*total),
            title
        )],
        Event::Converting { role, source } => vec![format!(
            "{}Converting {}: {}",
            indent(1),
            role.label(),
            source.display()
        )],
        Event::MissingFile { role, source } => vec![format!(
            "{}Missing file ({}): {}",
            indent(1),
            role.label(),
            source.display()
        )],
        Event::ConversionFailed {
            role,
            source,
            error,
        } => vec![
            format!(
                "{}Conversion failed ({}): {}",
                indent(1),
                role.label(),
                source.display()
            ),
            format!("{}{}", indent(2), error),
        ],
        Event::IconSplit {
            source,
            frames,
            frame,
        } => {
            let detail = match frame {
                Some(frame) => format!("{} frames, using {}", frames, display_name(frame)),
                None => "no frames, resized directly".to_string(),
            };
            vec![format!(
                "{}Icon {}: {}",
                indent(1),
                display_name(source),
                detail
            )]
        }
        Event::DeletingConverted { source } => vec![format!(
            "{}Deleting converted image: {}",
            indent(1),
            source.display()
        )],
        Event::HtmlPatched {
            index,
            total,
            path,
            changed,
        } => {
            let status = if *changed { "" } else { " (unchanged)" };
            vec![format!(
                "Fixing Html {}/{} {}{}",
                index,
                total,
                display_name(path),
                status
            )]
        }
        Event::DeletingDuplicate { path } => {
            vec![format!("Deleting duplicate: {}", path.display())]
        }
    }
}

/// Write an event's lines to stdout.
pub fn print_event(event: &Event) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

/// One line per game, with its image references indented below.
pub fn format_games(games: &[GameRecord]) -> Vec<String> {
    let mut lines = vec![format!("Games ({})", games.len())];
    for (i, game) in games.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), game.title()));
        lines.push(format!("{}Id: {}", indent(1), game.id));
        for (label, reference) in [
            ("Background", &game.background),
            ("Cover", &game.cover),
            ("Icon", &game.icon),
        ] {
            if let Some(reference) = reference {
                lines.push(format!("{}{}: {}", indent(1), label, reference));
            }
        }
    }
    lines
}

pub fn print_games(games: &[GameRecord]) {
    for line in format_games(games) {
        println!("{}", line);
    }
}

/// Duplicate groups, primary marked.
pub fn format_duplicates(duplicates: &DuplicateMap) -> Vec<String> {
    let mut lines = vec![format!(
        "Duplicate groups ({}, {} duplicates)",
        duplicates.groups().len(),
        duplicates.duplicate_count()
    )];
    for (name, refs) in duplicates.groups() {
        lines.push(name.clone());
        for (i, reference) in refs.iter().enumerate() {
            let marker = if i == 0 { "primary" } else { "duplicate" };
            lines.push(format!("{}{}: {}", indent(1), marker, reference));
        }
    }
    lines
}

pub fn print_duplicates(duplicates: &DuplicateMap) {
    for line in format_duplicates(duplicates) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::DuplicateGroups;
    use crate::types::ImageRole;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn format_stage() {
        let lines = format_event(&Event::Stage {
            number: 2,
            title: "Resizing images".into(),
        });
        assert_eq!(lines, vec!["==> Stage 2: Resizing images"]);
    }

    #[test]
    fn format_malformed_metadata() {
        let lines = format_event(&Event::MalformedMetadata {
            path: PathBuf::from("library/games/b.json"),
            error: "EOF while parsing".into(),
        });
        assert_eq!(
            lines,
            vec!["Malformed metadata: library/games/b.json", "    EOF while parsing"]
        );
    }

    #[test]
    fn format_resize_started() {
        let lines = format_event(&Event::ResizeStarted { games: 3, images: 7 });
        assert_eq!(lines, vec!["Scanning 3 games", "Resizing 7 images"]);
    }

    #[test]
    fn format_game_started() {
        let lines = format_event(&Event::GameStarted {
            index: 4,
            total: 12,
            title: "Portal".into(),
        });
        assert_eq!(lines, vec!["004/012 Portal"]);
    }

    #[test]
    fn format_converting() {
        let lines = format_event(&Event::Converting {
            role: ImageRole::Cover,
            source: PathBuf::from("site/a/cover.png"),
        });
        assert_eq!(lines, vec!["    Converting cover: site/a/cover.png"]);
    }

    #[test]
    fn format_missing_file() {
        let lines = format_event(&Event::MissingFile {
            role: ImageRole::Icon,
            source: PathBuf::from("site/a/icon.ico"),
        });
        assert_eq!(lines, vec!["    Missing file (icon): site/a/icon.ico"]);
    }

    #[test]
    fn format_conversion_failed_includes_error() {
        let lines = format_event(&Event::ConversionFailed {
            role: ImageRole::Background,
            source: PathBuf::from("bg.png"),
            error: "Converter exited with status 1: bad".into(),
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "        Converter exited with status 1: bad");
    }

    #[test]
    fn format_icon_split_variants() {
        let with_frame = format_event(&Event::IconSplit {
            source: PathBuf::from("a/icon.ico"),
            frames: 4,
            frame: Some(PathBuf::from("a/icon-2.png")),
        });
        assert_eq!(with_frame, vec!["    Icon icon.ico: 4 frames, using icon-2.png"]);

        let without = format_event(&Event::IconSplit {
            source: PathBuf::from("a/icon.ico"),
            frames: 0,
            frame: None,
        });
        assert_eq!(without, vec!["    Icon icon.ico: no frames, resized directly"]);
    }

    #[test]
    fn format_html_patched() {
        let changed = format_event(&Event::HtmlPatched {
            index: 1,
            total: 3,
            path: PathBuf::from("site/index.html"),
            changed: true,
        });
        assert_eq!(changed, vec!["Fixing Html 1/3 index.html"]);

        let unchanged = format_event(&Event::HtmlPatched {
            index: 2,
            total: 3,
            path: PathBuf::from("site/about.html"),
            changed: false,
        });
        assert_eq!(unchanged, vec!["Fixing Html 2/3 about.html (unchanged)"]);
    }

    #[test]
    fn format_deleting_duplicate() {
        let lines = format_event(&Event::DeletingDuplicate {
            path: PathBuf::from("site/b/cover.jpg"),
        });
        assert_eq!(lines, vec!["Deleting duplicate: site/b/cover.jpg"]);
    }

    #[test]
    fn format_games_lists_references() {
        let games = vec![GameRecord {
            id: "abc".into(),
            name: Some("Braid".into()),
            cover: Some("abc\\cover.png".into()),
            ..Default::default()
        }];
        let lines = format_games(&games);
        assert_eq!(
            lines,
            vec!["Games (1)", "001 Braid", "    Id: abc", "    Cover: abc\\cover.png"]
        );
    }

    #[test]
    fn format_duplicates_marks_primary() {
        let groups = DuplicateGroups::from([(
            "X".to_string(),
            vec!["p1".to_string(), "p2".to_string()],
        )]);
        let map = DuplicateMap::from_groups(groups).unwrap();
        let lines = format_duplicates(&map);
        assert_eq!(
            lines,
            vec![
                "Duplicate groups (1, 1 duplicates)",
                "X",
                "    primary: p1",
                "    duplicate: p2"
            ]
        );
    }
}
