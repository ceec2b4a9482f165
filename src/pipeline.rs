//! Full run: read → resize → patch → prune.
//!
//! The duplicate index is built from the records right after reading; the
//! games themselves are never modified, so every later stage sees the same
//! references the library holds.

use crate::config::MinifyConfig;
use crate::duplicates::{DuplicateError, DuplicateMap};
use crate::events::{Event, emit};
use crate::imaging::ImageBackend;
use crate::library::{self, LibraryError};
use crate::patch::{self, PatchError, PatchSummary};
use crate::process::{self, ProcessError, ResizeConfig, ResizeSummary};
use crate::prune::{self, PruneError};
use crate::types::GameRecord;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    #[error("Resize error: {0}")]
    Process(#[from] ProcessError),
    #[error("Duplicate index error: {0}")]
    Duplicates(#[from] DuplicateError),
    #[error("HTML patch error: {0}")]
    Patch(#[from] PatchError),
    #[error("Prune error: {0}")]
    Prune(#[from] PruneError),
}

/// What a full run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub games: usize,
    pub resize: ResizeSummary,
    pub duplicate_groups: usize,
    pub html: PatchSummary,
    pub pruned: Vec<PathBuf>,
}

/// Read the retained games from the configured library.
pub fn read_library(
    config: &MinifyConfig,
    progress: Option<&Sender<Event>>,
) -> Result<Vec<GameRecord>, LibraryError> {
    library::read_games(&config.games_path(), progress)
}

/// Build the combined duplicate index for `games`.
pub fn index_duplicates(games: &[GameRecord]) -> Result<DuplicateMap, DuplicateError> {
    DuplicateMap::from_games(games)
}

/// Run every stage in order. Stops at the first fatal error.
pub fn run(
    backend: &impl ImageBackend,
    config: &MinifyConfig,
    progress: Option<&Sender<Event>>,
) -> Result<RunSummary, PipelineError> {
    stage(progress, 1, format!("Reading {}", config.games_path().display()));
    let games = read_library(config, progress)?;
    let duplicates = index_duplicates(&games)?;

    stage(progress, 2, "Resizing images".to_string());
    let resize = process::resize_all(
        backend,
        &games,
        &ResizeConfig::from_config(config),
        progress,
    )?;

    stage(progress, 3, "Patching HTML".to_string());
    let html = patch::patch_html(
        &config.output_root,
        &games,
        &duplicates,
        config.simulate,
        progress,
    )?;

    stage(progress, 4, "Pruning duplicates".to_string());
    let pruned = prune::prune_duplicates(
        &config.output_root,
        &games,
        &duplicates,
        config.simulate,
        progress,
    )?;

    Ok(RunSummary {
        games: games.len(),
        resize,
        duplicate_groups: duplicates.groups().len(),
        html,
        pruned,
    })
}

fn stage(progress: Option<&Sender<Event>>, number: usize, title: String) {
    emit(progress, Event::Stage { number, title });
}
