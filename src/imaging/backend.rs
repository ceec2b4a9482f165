//! Image conversion backend trait and shared types.
//!
//! The [`ImageBackend`] trait has a single operation, `convert`. The
//! production implementation is
//! [`MagickBackend`](super::magick_backend::MagickBackend), which shells out
//! to ImageMagick and turns a non-zero exit into a typed error.

use super::params::ConvertParams;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not start converter {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("Converter exited with {}: {stderr}", status_label(.status))]
    Failed {
        /// Exit code, `None` when the process was killed by a signal.
        status: Option<i32>,
        stderr: String,
    },
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

impl BackendError {
    /// A failure of one conversion, as opposed to the converter being
    /// unusable altogether.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(self, BackendError::Failed { .. })
    }
}

/// Trait for image conversion backends.
pub trait ImageBackend {
    /// Run one conversion and wait for it to finish.
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;
}
