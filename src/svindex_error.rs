// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvIndexError {
    /// A source file or directory could not be read.
    Io { path: PathBuf, message: String },
    /// No module header is indexed under the given name.
    ModuleNotFound(String),
    /// An exclude glob failed to compile.
    InvalidExcludePattern { pattern: String, message: String },
    /// The configuration file could not be parsed.
    Config(String),
    /// The worker pool for an index build could not be created.
    WorkerPool(String),
}

impl SvIndexError {
    pub(crate) fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        SvIndexError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for SvIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SvIndexError::Io { path, message } => {
                write!(f, "svindex error: {}: {}", path.display(), message)
            }
            SvIndexError::ModuleNotFound(name) => {
                write!(f, "svindex error: no module header indexed for `{}`", name)
            }
            SvIndexError::InvalidExcludePattern { pattern, message } => {
                write!(
                    f,
                    "svindex error: invalid exclude pattern `{}`: {}",
                    pattern, message
                )
            }
            SvIndexError::Config(message) => write!(f, "svindex error: config: {}", message),
            SvIndexError::WorkerPool(message) => {
                write!(f, "svindex error: worker pool: {}", message)
            }
        }
    }
}

impl std::error::Error for SvIndexError {}
