//! Progress events emitted by pipeline stages.
//!
//! Stages never print. They send [`Event`]s over an optional channel and the
//! binary renders them with [`output::format_event`](crate::output::format_event).
//! Simulated actions produce the same events as real ones, so a dry run shows
//! exactly what an applied run would do.

use crate::types::ImageRole;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A pipeline stage begins.
    Stage { number: usize, title: String },
    /// A metadata file is not JSON; the game is kept with no fields.
    MalformedMetadata { path: PathBuf, error: String },
    /// Resize stage started.
    ResizeStarted { games: usize, images: usize },
    /// A game's images are about to be resized. `index` is 1-based.
    GameStarted {
        index: usize,
        total: usize,
        title: String,
    },
    /// A source image is (or in simulate mode would be) converted.
    Converting { role: ImageRole, source: PathBuf },
    /// A referenced source image does not exist.
    MissingFile { role: ImageRole, source: PathBuf },
    /// The converter reported a failure; the source was kept.
    ConversionFailed {
        role: ImageRole,
        source: PathBuf,
        error: String,
    },
    /// An icon container was split; `frame` is the frame that was resized,
    /// `None` when no frames were produced and the source was used directly.
    IconSplit {
        source: PathBuf,
        frames: usize,
        frame: Option<PathBuf>,
    },
    /// A source with a different extension than its output is removed.
    DeletingConverted { source: PathBuf },
    /// An HTML file was processed. `changed` is false when patching left the
    /// content as it was.
    HtmlPatched {
        index: usize,
        total: usize,
        path: PathBuf,
        changed: bool,
    },
    /// A duplicate image file is removed.
    DeletingDuplicate { path: PathBuf },
}

/// Send an event if a channel is attached. A hung-up receiver is ignored.
pub(crate) fn emit(progress: Option<&Sender<Event>>, event: Event) {
    if let Some(tx) = progress {
        tx.send(event).ok();
    }
}
