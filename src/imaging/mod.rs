//! Image conversion through an external converter.
//!
//! | Operation | How |
//! |---|---|
//! | **Resize** | `magick convert <src> [-interlace plane -quality N] -resize WxH <dest>` |
//! | **Split icon** | `magick convert <src.ico> <dest>` → `<dest stem>-<n>.<ext>` frames |
//!
//! The module is split into:
//! - **Parameters**: what a single converter call should do
//! - **Backend**: [`ImageBackend`] trait + [`MagickBackend`]
//! - **Operations**: resize and icon splitting on top of a backend

pub mod backend;
pub mod magick_backend;
pub mod operations;
mod params;

pub use backend::{BackendError, ImageBackend};
pub use magick_backend::MagickBackend;
pub use operations::{IconSplit, find_frames, resize_icon, resize_image, select_best_frame};
pub use params::{ConvertParams, Quality};
