// SPDX-License-Identifier: Apache-2.0

use crate::index_config::{IndexConfig, get_excludes, get_index_options};
use clap::ArgMatches;
use std::path::{Path, PathBuf};
use svindex::{BuildOutcome, CancellationToken, FsSourceTree, SvIndexError, SymbolIndex};

pub struct BuiltIndex {
    pub index: SymbolIndex,
    pub outcome: BuildOutcome,
    tree: FsSourceTree,
}

impl BuiltIndex {
    /// Maps a `--file` argument to the path the index knows it by.
    ///
    /// The root is canonicalized before the build, so indexed paths are
    /// canonical. `file` is tried as given (relative to the working
    /// directory) and then relative to the root.
    pub fn resolve_file(&self, file: &str) -> Result<PathBuf, String> {
        let given = Path::new(file);
        let candidates = [given.to_path_buf(), self.tree.root().join(given)];
        for candidate in &candidates {
            if let Ok(path) = candidate.canonicalize() {
                if self.index.is_indexed(&path) {
                    return Ok(path);
                }
            }
        }
        Err(format!(
            "{} is not an indexed file under {}",
            file,
            self.tree.root().display()
        ))
    }
}

/// Builds an index over the `root` positional argument, honoring the index
/// flags and config. Ctrl-C during the build stops it at the next batch
/// boundary; whatever was indexed by then is kept.
pub fn build_index(
    matches: &ArgMatches,
    config: &Option<IndexConfig>,
) -> Result<BuiltIndex, String> {
    let root = matches
        .get_one::<String>("root")
        .ok_or("root directory argument is required")?;
    let root = Path::new(root).canonicalize().map_err(|e| {
        SvIndexError::Io {
            path: PathBuf::from(root),
            message: e.to_string(),
        }
        .to_string()
    })?;
    let excludes = get_excludes(matches, config);
    let tree = FsSourceTree::with_excludes(&root, &excludes).map_err(|e| e.to_string())?;
    let index = SymbolIndex::new(get_index_options(matches, config));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            cancel.cancel();
        }) {
            log::warn!("unable to install Ctrl-C handler: {}", e);
        }
    }

    let outcome = index.rebuild(&tree, &cancel).map_err(|e| e.to_string())?;
    log::info!("{}", outcome);
    Ok(BuiltIndex {
        index,
        outcome,
        tree,
    })
}
