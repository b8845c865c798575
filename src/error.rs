//! Error types for org2comment.
//!
//! Failures callers need to tell apart live here; plain I/O failures travel
//! as `anyhow` errors with path context attached.

use std::path::PathBuf;

/// Domain failures of a conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target lacks a `;;; Commentary:` line followed by a `;;; Code:` line.
    #[error(
        "malformed target file {}: expected a `;;; Commentary:` line followed by a `;;; Code:` line",
        path.display()
    )]
    MalformedTarget { path: PathBuf },

    /// No target file was given and none was chosen.
    #[error("no target file given")]
    MissingTarget,

    /// No companion document could be resolved for the target.
    #[error("no companion document given or cached for {}", path.display())]
    MissingCompanion { path: PathBuf },

    /// The export engine failed or produced unusable output.
    #[error("export with `{program}` failed: {message}")]
    Render { program: String, message: String },

    /// A document that should be text looks binary.
    #[error("{} looks like a binary file", path.display())]
    BinaryDocument { path: PathBuf },

    /// The terminal prompt could not be shown or read.
    #[cfg(feature = "prompt")]
    #[error("interactive prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl Error {
    pub fn render(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            program: program.into(),
            message: message.into(),
        }
    }
}
