// SPDX-License-Identifier: Apache-2.0

//! File enumeration and content access for index builds.

use crate::svindex_error::SvIndexError;
use std::path::{Path, PathBuf};

/// Extensions of files that are indexed.
pub const SOURCE_EXTENSIONS: &[&str] = &["sv", "v", "svh", "vh"];

/// Source of files for an index build.
///
/// Implementations must be shareable across the build's worker threads.
pub trait SourceTree: Sync {
    /// Returns the eligible files, in a deterministic order.
    fn find_files(&self) -> Result<Vec<PathBuf>, SvIndexError>;

    /// Returns the lines of `path` without line terminators.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, SvIndexError>;
}

pub fn is_source_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext)
    )
}

/// A directory tree on disk, filtered by [`SOURCE_EXTENSIONS`] and a list of
/// exclude globs. Globs are matched against paths relative to the root.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
}

impl FsSourceTree {
    pub fn new(root: &Path) -> Self {
        FsSourceTree {
            root: root.to_path_buf(),
            exclude: Vec::new(),
        }
    }

    pub fn with_excludes(root: &Path, patterns: &[String]) -> Result<Self, SvIndexError> {
        let exclude = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| SvIndexError::InvalidExcludePattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FsSourceTree {
            root: root.to_path_buf(),
            exclude,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

impl SourceTree for FsSourceTree {
    fn find_files(&self) -> Result<Vec<PathBuf>, SvIndexError> {
        if !self.root.is_dir() {
            return Err(SvIndexError::Io {
                path: self.root.clone(),
                message: "not a directory".to_string(),
            });
        }
        let mut out: Vec<PathBuf> = Vec::new();
        let mut stack: Vec<PathBuf> = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Indexing: unable to read directory {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Ok(ty) = entry.file_type() else {
                    continue;
                };
                if ty.is_dir() {
                    stack.push(path);
                } else if ty.is_file() && is_source_file(&path) && !self.is_excluded(&path) {
                    out.push(path);
                }
            }
        }

        out.sort();
        Ok(out)
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>, SvIndexError> {
        let bytes = std::fs::read(path).map_err(|e| SvIndexError::io(path, e))?;
        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_find_files_filters_extensions_and_sorts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(&root.join("z.sv"), "");
        touch(&root.join("a/b/inc.svh"), "");
        touch(&root.join("a/top.v"), "");
        touch(&root.join("a/defs.vh"), "");
        touch(&root.join("notes.txt"), "");
        touch(&root.join("a/sim.vcd"), "");

        let files = FsSourceTree::new(root).find_files().unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(
            relative,
            vec!["a/b/inc.svh", "a/defs.vh", "a/top.v", "z.sv"]
        );
    }

    #[test]
    fn test_exclude_globs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(&root.join("rtl/core.sv"), "");
        touch(&root.join("build/gen/core.sv"), "");
        touch(&root.join("rtl/core_tb.sv"), "");

        let tree = FsSourceTree::with_excludes(
            root,
            &["build/**".to_string(), "**/*_tb.sv".to_string()],
        )
        .unwrap();
        let files = tree.find_files().unwrap();
        assert_eq!(files, vec![root.join("rtl/core.sv")]);
    }

    #[test]
    fn test_invalid_exclude_is_reported() {
        let err = FsSourceTree::with_excludes(Path::new("."), &["[".to_string()]).unwrap_err();
        assert!(matches!(err, SvIndexError::InvalidExcludePattern { .. }));
    }

    #[test]
    fn test_read_lines_tolerates_crlf_and_invalid_utf8() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("m.sv");
        std::fs::write(&path, b"module m;\r\n// caf\xe9\r\nendmodule\r\n").unwrap();
        let lines = FsSourceTree::new(temp_dir.path()).read_lines(&path).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "module m;");
        assert_eq!(lines[2], "endmodule");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tree = FsSourceTree::new(&temp_dir.path().join("nope"));
        assert!(tree.find_files().is_err());
    }
}
