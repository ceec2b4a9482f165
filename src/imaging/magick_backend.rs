//! ImageMagick backend.
//!
//! Every call runs `<program> convert <source> <options...> <output>` and
//! blocks until the process exits. There is no timeout: a hung converter
//! hangs the run. Captured stderr is attached to the error on a non-zero
//! exit so the caller can report it.

use super::backend::{BackendError, ImageBackend};
use super::params::ConvertParams;
use std::path::PathBuf;
use std::process::Command;

pub struct MagickBackend {
    program: PathBuf,
}

impl MagickBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn command(&self, params: &ConvertParams) -> Command {
        let mut command = Command::new(&self.program);
        command.args(params.to_args());
        command
    }
}

impl Default for MagickBackend {
    fn default() -> Self {
        Self::new("magick")
    }
}

impl ImageBackend for MagickBackend {
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        let output = self
            .command(params)
            .output()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(BackendError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
