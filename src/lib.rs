//! # Playnite Minify
//!
//! Shrinks a Playnite library website export. Playnite's HTML export copies
//! every cover, icon and background at full resolution, often several times
//! over for games owned on more than one platform. This crate resizes the
//! copied images, points the HTML at the results and removes the duplicates.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Read     library/games/*.json  →  Vec<GameRecord>   (+ DuplicateMap)
//! 2. Resize   site/<image tree>     →  .jpg / .png at target canvas
//! 3. Patch    site/*.html           →  fixed extensions, primaries only
//! 4. Prune    site/<image tree>     →  duplicate files removed
//! ```
//!
//! Every stage is sequential and blocks on the external converter. There is
//! no state between runs; the duplicate index is rebuilt from the library
//! each time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`library`] | Stage 1: reads per-game metadata files, drops hidden games |
//! | [`process`] | Stage 2: resizes every game image through an [`imaging::ImageBackend`] |
//! | [`duplicates`] | Groups games by name, finds and folds duplicate image references |
//! | [`patch`] | Stage 3: rewrites exported HTML files in place |
//! | [`prune`] | Stage 4: deletes duplicate image files |
//! | [`pipeline`] | Runs all stages in order |
//! | [`config`] | `minify.toml` loading, merging over stock defaults, validation |
//! | [`types`] | `GameRecord`, `Resolution`, reference path helpers |
//! | [`imaging`] | ImageMagick backend, convert parameters, icon splitting |
//! | [`events`] | Progress events sent by every stage |
//! | [`output`] | CLI output formatting for events and listings |
//!
//! # Design Decisions
//!
//! ## Simulate by Default
//!
//! The stock config has `simulate = true`. Every destructive step (converter
//! call, file deletion, HTML write) checks the flag and emits the same event
//! either way, so a dry run prints exactly what an applied run would do.
//!
//! ## ImageMagick, Not a Pure-Rust Codec
//!
//! Playnite stores icons as multi-resolution `.ico` containers and artwork in
//! whatever format the metadata provider delivered. ImageMagick reads all of
//! them and splits `.ico` containers into frames, so the converter is an
//! external process behind the [`imaging::ImageBackend`] trait. Tests swap in
//! a recording backend.

pub mod config;
pub mod duplicates;
pub mod events;
pub mod imaging;
pub mod library;
pub mod output;
pub mod patch;
pub mod pipeline;
pub mod process;
pub mod prune;
pub mod types;
