//! Parameter types for converter calls.
//!
//! These structs describe *what* to do, not *how* to do it. The
//! [`operations`](super::operations) module decides which conversions to run,
//! the [`backend`](super::backend) executes them. Keeping them apart lets tests
//! swap in a recording backend without changing operation logic.

use crate::types::Resolution;
use std::ffi::OsString;
use std::path::PathBuf;

/// JPEG encoding quality (0-100). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// One converter invocation.
///
/// `resize: None` is a plain format conversion; for an icon container that
/// splits the frames into numbered files. `quality` is set for photographic
/// output only and also turns on plane interlacing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub resize: Option<Resolution>,
    pub quality: Option<Quality>,
}

impl ConvertParams {
    pub fn split(source: PathBuf, output: PathBuf) -> Self {
        Self {
            source,
            output,
            resize: None,
            quality: None,
        }
    }

    /// Option arguments placed between source and output.
    pub fn options(&self) -> Vec<String> {
        let mut options = Vec::new();
        if let Some(quality) = self.quality {
            options.extend([
                "-interlace".to_string(),
                "plane".to_string(),
                "-quality".to_string(),
                quality.value().to_string(),
            ]);
        }
        if let Some(resolution) = self.resize {
            options.extend(["-resize".to_string(), resolution.to_string()]);
        }
        options
    }

    /// Full argument list: `convert <source> <options...> <output>`.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["convert".into(), self.source.clone().into()];
        args.extend(self.options().into_iter().map(OsString::from));
        args.push(self.output.clone().into());
        args
    }
}
