//! High-level image operations.
//!
//! These functions decide which converter calls to make and handle the
//! intermediate files around them.

use super::backend::{BackendError, ImageBackend};
use super::params::{ConvertParams, Quality};
use crate::types::Resolution;
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Resize `source` into `output`.
pub fn resize_image(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    resolution: Resolution,
    quality: Option<Quality>,
) -> Result<()> {
    backend.convert(&ConvertParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        resize: Some(resolution),
        quality,
    })
}

/// Path of the `index`-th frame the converter writes when splitting into
/// `output`: `dir/icon.png` → `dir/icon-3.png`.
fn frame_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    output.with_file_name(name)
}

/// Frames that exist next to `output`, with their sizes, in index order.
///
/// Only indices below `limit` are considered.
pub fn find_frames(output: &Path, limit: usize) -> Result<Vec<(PathBuf, u64)>> {
    let Some(dir) = output.parent().filter(|d| d.is_dir()) else {
        return Ok(Vec::new());
    };

    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(index) = frame_index(output, &entry.path()) else {
            continue;
        };
        if index < limit && entry.file_type()?.is_file() {
            frames.push((index, entry.path(), entry.metadata()?.len()));
        }
    }
    frames.sort_by_key(|(index, _, _)| *index);
    Ok(frames
        .into_iter()
        .map(|(_, path, len)| (path, len))
        .collect())
}

/// Frame number of `candidate` if it is one of `output`'s split frames,
/// named exactly as [`frame_path`] names them.
fn frame_index(output: &Path, candidate: &Path) -> Option<usize> {
    let name = candidate.file_name()?.to_str()?;
    let stem = output.file_stem()?.to_str()?;
    let rest = name.strip_prefix(stem)?.strip_prefix('-')?;
    let digits = rest.split('.').next()?;
    let index = digits.parse().ok()?;
    (frame_path(output, index) == candidate).then_some(index)
}

/// The largest frame; the earliest one wins a tie.
pub fn select_best_frame(frames: &[(PathBuf, u64)]) -> Option<&Path> {
    frames
        .iter()
        .rev()
        .max_by_key(|(_, len)| *len)
        .map(|(path, _)| path.as_path())
}

/// What [`resize_icon`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSplit {
    /// Number of frames the split produced.
    pub frames: usize,
    /// Frame that was resized, `None` when the source was resized directly.
    pub used: Option<PathBuf>,
}

/// Resize a multi-frame icon container.
///
/// The source is split into numbered frames next to `output`, the largest
/// frame is resized into `output`, and all frames are removed afterwards.
/// With no frames the source itself is resized.
pub fn resize_icon(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    resolution: Resolution,
    frame_limit: usize,
) -> Result<IconSplit> {
    backend.convert(&ConvertParams::split(
        source.to_path_buf(),
        output.to_path_buf(),
    ))?;

    let frames = find_frames(output, frame_limit)?;
    let Some(best) = select_best_frame(&frames) else {
        resize_image(backend, source, output, resolution, None)?;
        return Ok(IconSplit {
            frames: 0,
            used: None,
        });
    };

    let resized = resize_image(backend, best, output, resolution, None);
    for (frame, _) in &frames {
        fs::remove_file(frame)?;
    }
    resized?;

    Ok(IconSplit {
        frames: frames.len(),
        used: Some(best.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    #[test]
    fn frame_path_numbers_before_extension() {
        assert_eq!(
            frame_path(Path::new("/out/icon.png"), 3),
            PathBuf::from("/out/icon-3.png")
        );
        assert_eq!(
            frame_path(Path::new("/out/icon"), 0),
            PathBuf::from("/out/icon-0")
        );
    }

    #[test]
    fn find_frames_filters_and_orders() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("icon.png");
        for name in ["icon-10.png", "icon-2.png", "icon-x.png", "icon-.png", "other-1.png"] {
            fs::write(tmp.path().join(name), b"abc").unwrap();
        }
        fs::write(&output, b"").unwrap();

        let frames = find_frames(&output, 21).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["icon-2.png", "icon-10.png"]);
    }

    #[test]
    fn find_frames_only_accepts_exact_frame_names() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("icon.png");
        for name in ["icon-3.png", "icon-03.png", "icon-+4.png", "icon-5.jpg", "icon-6.png.bak"] {
            fs::write(tmp.path().join(name), b"abc").unwrap();
        }

        let frames = find_frames(&output, 21).unwrap();
        assert_eq!(frames, vec![(tmp.path().join("icon-3.png"), 3)]);
    }

    #[test]
    fn find_frames_respects_limit() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("icon.png");
        fs::write(tmp.path().join("icon-0.png"), b"a").unwrap();
        fs::write(tmp.path().join("icon-5.png"), b"a").unwrap();

        assert_eq!(find_frames(&output, 5).unwrap().len(), 1);
    }

    #[test]
    fn find_frames_missing_directory_is_empty() {
        let frames = find_frames(Path::new("/nonexistent/dir/icon.png"), 21).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn select_best_frame_picks_largest() {
        let frames = vec![
            (PathBuf::from("i-0.png"), 100),
            (PathBuf::from("i-1.png"), 900),
            (PathBuf::from("i-2.png"), 400),
        ];
        assert_eq!(select_best_frame(&frames), Some(Path::new("i-1.png")));
    }

    #[test]
    fn select_best_frame_tie_prefers_first() {
        let frames = vec![
            (PathBuf::from("i-0.png"), 500),
            (PathBuf::from("i-1.png"), 500),
        ];
        assert_eq!(select_best_frame(&frames), Some(Path::new("i-0.png")));
    }

    #[test]
    fn select_best_frame_empty() {
        assert_eq!(select_best_frame(&[]), None);
    }

    #[test]
    fn resize_icon_uses_largest_frame_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("icon.ico");
        let output = tmp.path().join("icon.png");
        fs::write(&source, b"ico").unwrap();
        let backend = MockBackend::with_frames(vec![16, 256, 64]);

        let split = resize_icon(&backend, &source, &output, Resolution::ICON, 21).unwrap();

        assert_eq!(split.frames, 3);
        assert_eq!(split.used, Some(tmp.path().join("icon-1.png")));
        for index in 0..3 {
            assert!(!frame_path(&output, index).exists());
        }

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Split { .. }));
        assert_eq!(
            ops[1],
            RecordedOp::Resize {
                source: tmp.path().join("icon-1.png").to_string_lossy().to_string(),
                output: output.to_string_lossy().to_string(),
                width: 550,
                height: 48,
                quality: None,
            }
        );
    }

    #[test]
    fn resize_icon_without_frames_falls_back_to_source() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("single.ico");
        let output = tmp.path().join("single.png");
        fs::write(&source, b"ico").unwrap();
        let backend = MockBackend::new();

        let split = resize_icon(&backend, &source, &output, Resolution::ICON, 21).unwrap();

        assert_eq!(
            split,
            IconSplit {
                frames: 0,
                used: None
            }
        );
        let ops = backend.get_operations();
        assert!(matches!(
            &ops[1],
            RecordedOp::Resize { source: s, .. } if s == &source.to_string_lossy()
        ));
    }

    #[test]
    fn resize_image_passes_quality() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        resize_image(
            &backend,
            Path::new("bg.png"),
            &tmp.path().join("bg.jpg"),
            Resolution::BACKGROUND,
            Some(Quality::new(80)),
        )
        .unwrap();
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Resize {
                width: 1920,
                height: 620,
                quality: Some(80),
                ..
            }
        ));
    }
}
