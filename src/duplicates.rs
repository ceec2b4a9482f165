//! Duplicate image index.
//!
//! Playnite keeps a separate copy of the artwork for every library entry,
//! so a game owned on two platforms ships two identical covers. Games are
//! grouped by display name; for each image role the references of a group
//! with two or more members form one duplicate group:
//!
//! ```text
//! "Portal" -> ["a1/cover", "b7/cover", "c3/cover"]
//!              ^ primary   ^ duplicates ...........
//! ```
//!
//! References are stored without extension and with `/` separators, so that
//! they match the resized `.jpg`/`.png` files and the paths written into the
//! exported HTML alike.
//!
//! The combined map is built cover → icon → background. When two roles
//! produce a group for the same name, the later role replaces the earlier
//! one for that key.

use crate::types::{GameRecord, ImageRole, normalize_separators, strip_extension};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Order in which per-role maps are merged; later entries win on key clashes.
const MERGE_ORDER: [ImageRole; 3] = [ImageRole::Cover, ImageRole::Icon, ImageRole::Background];

/// Compiled alternation size limit; libraries with thousands of games
/// exceed the regex default.
const MATCHER_SIZE_LIMIT: usize = 256 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum DuplicateError {
    #[error("Could not build duplicate matcher: {0}")]
    Matcher(#[from] regex::Error),
}

/// Group key (display name) → references, primary first.
pub type DuplicateGroups = BTreeMap<String, Vec<String>>;

/// Build the duplicate groups for one image role.
///
/// Games without a name are not grouped. Games without an image for `role`
/// are skipped, and a group is kept only when at least two references remain.
pub fn group_by_name(games: &[GameRecord], role: ImageRole) -> DuplicateGroups {
    let mut groups: DuplicateGroups = BTreeMap::new();
    for game in games {
        let (Some(name), Some(reference)) = (&game.name, game.image(role)) else {
            continue;
        };
        groups
            .entry(name.clone())
            .or_default()
            .push(strip_extension(reference));
    }
    groups.retain(|_, refs| refs.len() > 1);
    groups
}

/// Combined duplicate index over all image roles.
#[derive(Debug, Clone, Default)]
pub struct DuplicateMap {
    groups: DuplicateGroups,
    /// Duplicate reference → its group's primary. Primaries are never keys.
    replacements: HashMap<String, String>,
    /// Matches any duplicate or primary reference, longest alternative first.
    matcher: Option<Regex>,
}

impl DuplicateMap {
    /// Build the per-role maps and merge them.
    pub fn from_games(games: &[GameRecord]) -> Result<Self, DuplicateError> {
        let mut groups = DuplicateGroups::new();
        for role in MERGE_ORDER {
            groups.extend(group_by_name(games, role));
        }
        Self::from_groups(groups)
    }

    pub fn from_groups(groups: DuplicateGroups) -> Result<Self, DuplicateError> {
        let primaries: HashSet<&str> = groups
            .values()
            .filter_map(|refs| refs.first())
            .map(String::as_str)
            .collect();

        let mut replacements = HashMap::new();
        for refs in groups.values() {
            let Some((primary, duplicates)) = refs.split_first() else {
                continue;
            };
            for duplicate in duplicates {
                if duplicate != primary && !primaries.contains(duplicate.as_str()) {
                    replacements
                        .entry(duplicate.clone())
                        .or_insert_with(|| primary.clone());
                }
            }
        }

        let matcher = build_matcher(
            replacements
                .keys()
                .map(String::as_str)
                .chain(primaries.iter().copied()),
        )?;
        Ok(Self {
            groups,
            replacements,
            matcher,
        })
    }

    pub fn groups(&self) -> &DuplicateGroups {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of references that would be folded into a primary.
    pub fn duplicate_count(&self) -> usize {
        self.replacements.len()
    }

    /// True if `path` contains a duplicate (non-primary) reference.
    ///
    /// Every start position is tried, so a duplicate that overlaps the end of
    /// a primary is still found. A duplicate lying entirely inside a primary
    /// match is not a duplicate: at one position the longer reference wins, as
    /// in [`canonicalize`](Self::canonicalize). Separators in `path` are
    /// normalized first, so both native and library-style paths can be
    /// checked.
    pub fn is_duplicate(&self, path: &str) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        let path = normalize_separators(path);
        let mut start = 0;
        let mut primary_end = 0;
        while let Some(found) = matcher.find_at(&path, start) {
            if self.replacements.contains_key(found.as_str()) {
                if found.end() > primary_end {
                    return true;
                }
            } else {
                primary_end = primary_end.max(found.end());
            }
            match path[found.start()..].chars().next() {
                Some(c) => start = found.start() + c.len_utf8(),
                None => break,
            }
        }
        false
    }

    /// Replace every duplicate reference in `text` with its primary.
    ///
    /// A single left-to-right pass: text that already names a primary is
    /// left alone, so applying this twice gives the same result as once.
    pub fn canonicalize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let Some(matcher) = &self.matcher else {
            return Cow::Borrowed(text);
        };
        matcher.replace_all(text, |caps: &regex::Captures<'_>| {
            let found = &caps[0];
            self.replacements
                .get(found)
                .cloned()
                .unwrap_or_else(|| found.to_string())
        })
    }
}

fn build_matcher<'a>(
    references: impl Iterator<Item = &'a str>,
) -> Result<Option<Regex>, regex::Error> {
    let mut references: Vec<&str> = references.collect();
    if references.is_empty() {
        return Ok(None);
    }
    references.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    references.dedup();
    let pattern = references
        .iter()
        .map(|r| regex::escape(r))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = RegexBuilder::new(&pattern)
        .size_limit(MATCHER_SIZE_LIMIT)
        .build()?;
    Ok(Some(matcher))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: &str, name: &str, cover: Option<&str>) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            name: Some(name.to_string()),
            cover: cover.map(String::from),
            ..Default::default()
        }
    }

    fn sample_games() -> Vec<GameRecord> {
        vec![
            game("a", "X", Some("p1.png")),
            game("b", "X", Some("p2.png")),
            game("c", "X", Some("p3.png")),
            game("d", "Y", Some("p4.png")),
        ]
    }

    #[test]
    fn groups_shared_names_in_order() {
        let map = DuplicateMap::from_games(&sample_games()).unwrap();
        assert_eq!(
            map.groups().get("X"),
            Some(&vec!["p1".to_string(), "p2".to_string(), "p3".to_string()])
        );
        assert!(!map.groups().contains_key("Y"));
        assert_eq!(map.duplicate_count(), 2);
    }

    #[test]
    fn group_by_name_strips_extensions_and_separators() {
        let games = vec![
            game("a", "Doom", Some("a1\\cover.png")),
            game("b", "Doom", Some("b2\\cover.jpg")),
        ];
        let groups = group_by_name(&games, ImageRole::Cover);
        assert_eq!(groups["Doom"], vec!["a1/cover", "b2/cover"]);
    }

    #[test]
    fn group_by_name_skips_missing_images_and_names() {
        let mut nameless = game("z", "unused", Some("z.png"));
        nameless.name = None;
        let games = vec![
            game("a", "Solo", Some("a.png")),
            game("b", "Solo", None),
            nameless.clone(),
            GameRecord {
                id: "y".into(),
                cover: Some("y.png".into()),
                ..Default::default()
            },
        ];
        let groups = group_by_name(&games, ImageRole::Cover);
        assert!(groups.is_empty());
    }

    #[test]
    fn later_role_overrides_key_on_merge() {
        let make = |id: &str, cover: &str, bg: &str| GameRecord {
            id: id.into(),
            name: Some("Z".into()),
            cover: Some(cover.into()),
            background: Some(bg.into()),
            ..Default::default()
        };
        let games = vec![make("a", "c1.jpg", "b1.jpg"), make("b", "c2.jpg", "b2.jpg")];
        let map = DuplicateMap::from_games(&games).unwrap();
        assert_eq!(map.groups()["Z"], vec!["b1", "b2"]);
        assert!(map.is_duplicate("b2.jpg"));
        assert!(!map.is_duplicate("c2.jpg"));
    }

    #[test]
    fn is_duplicate_matches_non_primary_only() {
        let map = DuplicateMap::from_games(&sample_games()).unwrap();
        assert!(map.is_duplicate("site/p2.jpg"));
        assert!(map.is_duplicate("p3.png"));
        assert!(!map.is_duplicate("p1.jpg"));
        assert!(!map.is_duplicate("p4.jpg"));
    }

    #[test]
    fn is_duplicate_normalizes_separators() {
        let games = vec![
            game("a", "Q", Some("a\\c.png")),
            game("b", "Q", Some("b\\c.png")),
        ];
        let map = DuplicateMap::from_games(&games).unwrap();
        assert!(map.is_duplicate("C:\\site\\b\\c.jpg"));
        assert!(map.is_duplicate("/site/b/c.jpg"));
    }

    #[test]
    fn canonicalize_replaces_with_primary() {
        let map = DuplicateMap::from_games(&sample_games()).unwrap();
        let html = r#"<img src="p2.jpg"><img src="p3.jpg"><img src="p4.jpg">"#;
        assert_eq!(
            map.canonicalize(html),
            r#"<img src="p1.jpg"><img src="p1.jpg"><img src="p4.jpg">"#
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let map = DuplicateMap::from_games(&sample_games()).unwrap();
        let text = "p2 p3 p1 p2.jpg";
        let once = map.canonicalize(text).into_owned();
        let twice = map.canonicalize(&once).into_owned();
        assert_eq!(once, "p1 p1 p1 p1.jpg");
        assert_eq!(once, twice);
    }

    #[test]
    fn canonicalize_does_not_touch_primary_containing_duplicate() {
        let groups = DuplicateGroups::from([(
            "G".to_string(),
            vec!["img/ab".to_string(), "img/a".to_string()],
        )]);
        let map = DuplicateMap::from_groups(groups).unwrap();
        assert_eq!(map.canonicalize("img/ab img/a"), "img/ab img/ab");
        let once = map.canonicalize("img/a").into_owned();
        assert_eq!(map.canonicalize(&once), once);
        assert!(map.is_duplicate("img/a.jpg"));
        assert!(!map.is_duplicate("img/ab.jpg"));
    }

    #[test]
    fn primary_of_one_group_is_never_a_duplicate() {
        let groups = DuplicateGroups::from([
            ("A".to_string(), vec!["x".to_string(), "y".to_string()]),
            ("B".to_string(), vec!["y".to_string(), "z".to_string()]),
        ]);
        let map = DuplicateMap::from_groups(groups).unwrap();
        assert!(map.is_duplicate("x/z"));
        assert!(!map.is_duplicate("y"));
        assert_eq!(map.canonicalize("x y z"), "x y y");
    }

    #[test]
    fn is_duplicate_finds_duplicate_overlapping_a_primary() {
        let groups = DuplicateGroups::from([
            ("G".to_string(), vec!["a/b".to_string(), "x".to_string()]),
            ("H".to_string(), vec!["q".to_string(), "b/c".to_string()]),
        ]);
        let map = DuplicateMap::from_groups(groups).unwrap();
        assert!(map.is_duplicate("a/b/c.jpg"));
        assert!(!map.is_duplicate("a/b.jpg"));
    }

    #[test]
    fn empty_map_is_a_no_op() {
        let map = DuplicateMap::default();
        assert!(map.is_empty());
        assert!(!map.is_duplicate("anything"));
        assert!(matches!(map.canonicalize("text"), Cow::Borrowed("text")));
    }
}
