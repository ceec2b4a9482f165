//! Image resizing.
//!
//! Stage 2 of the pipeline. Every game's background, cover and icon are
//! resized in place inside the exported site's image tree:
//!
//! | Role | Canvas (default) | Output |
//! |---|---|---|
//! | background | 1920×620 | `.jpg`, interlaced, `jpeg_quality` |
//! | cover | 180×270 | `.jpg`, interlaced, `jpeg_quality` |
//! | icon | 550×48 | `.png` |
//!
//! The output sits next to the source with the role's extension. When the
//! extensions differ the source is removed after a successful conversion.
//! `.ico` sources go through [`resize_icon`] and are split first.
//!
//! ## Failure policy
//!
//! - Missing source: reported, skipped.
//! - Converter exits non-zero: reported, skipped, source kept.
//! - Converter cannot be started, or a filesystem call fails: the run stops.
//!
//! With `simulate` on, the same events are emitted but neither the converter
//! nor the filesystem is touched.

use crate::config::{MinifyConfig, SizesConfig};
use crate::events::{Event, emit};
use crate::imaging::{BackendError, ImageBackend, Quality, resize_icon, resize_image};
use crate::types::{GameRecord, ImageRole, extension_of, resolve};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Roles in the order they are resized.
const RESIZE_ORDER: [ImageRole; 3] = [ImageRole::Background, ImageRole::Cover, ImageRole::Icon];

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image conversion failed: {0}")]
    Imaging(#[from] BackendError),
}

/// Settings for the resize stage.
#[derive(Debug, Clone)]
pub struct ResizeConfig {
    pub simulate: bool,
    /// Root that image references resolve against.
    pub image_root: PathBuf,
    pub sizes: SizesConfig,
    pub quality: Quality,
    pub icon_frame_limit: usize,
}

impl ResizeConfig {
    pub fn from_config(config: &MinifyConfig) -> Self {
        Self {
            simulate: config.simulate,
            image_root: config.output_root.clone(),
            sizes: config.sizes.clone(),
            quality: Quality::new(config.jpeg_quality),
            icon_frame_limit: config.icon_frame_limit,
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self::from_config(&MinifyConfig::default())
    }
}

/// What happened to one image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    Missing,
    Simulated,
    Converted,
    Failed,
}

/// Counts over a whole resize stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeSummary {
    pub games: usize,
    pub images: usize,
    pub converted: usize,
    pub simulated: usize,
    pub missing: usize,
    pub failed: usize,
}

impl ResizeSummary {
    fn record(&mut self, outcome: ImageOutcome) {
        match outcome {
            ImageOutcome::Missing => self.missing += 1,
            ImageOutcome::Simulated => self.simulated += 1,
            ImageOutcome::Converted => self.converted += 1,
            ImageOutcome::Failed => self.failed += 1,
        }
    }
}

/// Resize every image of every game.
pub fn resize_all(
    backend: &impl ImageBackend,
    games: &[GameRecord],
    config: &ResizeConfig,
    progress: Option<&Sender<Event>>,
) -> Result<ResizeSummary, ProcessError> {
    let mut summary = ResizeSummary {
        games: games.len(),
        images: games.iter().map(GameRecord::image_count).sum(),
        ..Default::default()
    };
    emit(
        progress,
        Event::ResizeStarted {
            games: summary.games,
            images: summary.images,
        },
    );

    for (index, game) in games.iter().enumerate() {
        emit(
            progress,
            Event::GameStarted {
                index: index + 1,
                total: games.len(),
                title: game.title().to_string(),
            },
        );
        for role in RESIZE_ORDER {
            if let Some(reference) = game.image(role) {
                let outcome = resize_game_image(backend, reference, role, config, progress)?;
                summary.record(outcome);
            }
        }
    }

    Ok(summary)
}

/// Resize a single image reference for `role`.
pub fn resize_game_image(
    backend: &impl ImageBackend,
    reference: &str,
    role: ImageRole,
    config: &ResizeConfig,
    progress: Option<&Sender<Event>>,
) -> Result<ImageOutcome, ProcessError> {
    let source = resolve(&config.image_root, reference);
    if !source.exists() {
        emit(progress, Event::MissingFile { role, source });
        return Ok(ImageOutcome::Missing);
    }

    emit(
        progress,
        Event::Converting {
            role,
            source: source.clone(),
        },
    );

    let target_ext = role.target_extension();
    let source_ext = extension_of(&source);
    let replaces_source = source_ext.as_deref() != Some(target_ext);
    // Same extension in any case: resize in place so the name stays.
    let output = if replaces_source {
        source.with_extension(target_ext)
    } else {
        source.clone()
    };

    if config.simulate {
        if replaces_source {
            emit(progress, Event::DeletingConverted { source });
        }
        return Ok(ImageOutcome::Simulated);
    }

    let converted = if source_ext.as_deref() == Some("ico") {
        convert_icon(backend, &source, &output, role, config, progress)
    } else {
        let quality = (target_ext == "jpg").then_some(config.quality);
        resize_image(backend, &source, &output, config.sizes.for_role(role), quality)
    };

    match converted {
        Ok(()) => {}
        Err(err) if err.is_conversion_failure() => {
            emit(
                progress,
                Event::ConversionFailed {
                    role,
                    source,
                    error: err.to_string(),
                },
            );
            return Ok(ImageOutcome::Failed);
        }
        Err(err) => return Err(err.into()),
    }

    if replaces_source {
        emit(
            progress,
            Event::DeletingConverted {
                source: source.clone(),
            },
        );
        std::fs::remove_file(&source)?;
    }
    Ok(ImageOutcome::Converted)
}

fn convert_icon(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    role: ImageRole,
    config: &ResizeConfig,
    progress: Option<&Sender<Event>>,
) -> Result<(), BackendError> {
    let split = resize_icon(
        backend,
        source,
        output,
        config.sizes.for_role(role),
        config.icon_frame_limit,
    )?;
    emit(
        progress,
        Event::IconSplit {
            source: source.to_path_buf(),
            frames: split.frames,
            frame: split.used,
        },
    );
    Ok(())
}
