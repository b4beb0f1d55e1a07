// SPDX-License-Identifier: Apache-2.0

//! Workspace-wide index of declarations and module headers.
//!
//! The index is a sequence of immutable generations. A rebuild scans files in
//! batches on a bounded worker pool, merges each finished batch into a
//! private builder on the coordinating thread, and publishes the result as a
//! new generation with a single pointer swap. Queries clone the current
//! generation's `Arc`, so they never block on a build and never observe a
//! partially merged batch.

use crate::cancellation::CancellationToken;
use crate::decl_matcher::{DeclKind, DeclarationMatcher};
use crate::header::extract_header;
use crate::instantiation::{TemplateOptions, synthesize};
use crate::port_list::{PortList, parse_port_list};
use crate::source_tree::SourceTree;
use crate::span::{LineIndex, Span};
use crate::svindex_error::SvIndexError;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Number of symbols returned for an empty query.
pub const EMPTY_QUERY_LIMIT: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSymbol {
    pub name: String,
    pub kind: DeclKind,
    pub file: PathBuf,
    /// Span of the declared name.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHeader {
    pub module_name: String,
    pub file: PathBuf,
    /// Literal header text, comments included.
    pub raw_text: String,
}

impl ModuleHeader {
    pub fn port_list(&self) -> PortList {
        parse_port_list(&self.raw_text)
    }
}

/// Declarations and module headers found in a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    pub symbols: Vec<DeclarationSymbol>,
    pub headers: Vec<ModuleHeader>,
}

/// Scans one file's lines for declarations, extracting headers for modules.
pub fn index_file(path: &Path, lines: &[String]) -> FileIndex {
    let text = lines.join("\n");
    let line_index = LineIndex::new(&text);
    let mut result = FileIndex::default();
    for m in DeclarationMatcher::new(&text).matches() {
        let span = Span::new(
            line_index.pos(m.name_range.start),
            line_index.pos(m.name_range.end),
        );
        if m.kind == DeclKind::Module {
            let keyword = line_index.pos(m.decl_range.start);
            result.headers.push(ModuleHeader {
                module_name: m.name.to_string(),
                file: path.to_path_buf(),
                raw_text: extract_header(lines, keyword, span.limit),
            });
        }
        result.symbols.push(DeclarationSymbol {
            name: m.name.to_string(),
            kind: m.kind,
            file: path.to_path_buf(),
            span,
        });
    }
    result
}

#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Files per batch; cancellation is checked between batches.
    pub batch_size: usize,
    /// Worker threads used within a batch.
    pub jobs: usize,
    /// When set, rebuilds do nothing and report that indexing is disabled.
    pub disabled: bool,
    pub template: TemplateOptions,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            batch_size: 50,
            jobs: num_cpus::get(),
            disabled: false,
            template: TemplateOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Empty,
    Building,
    /// `partial` is set when the build that produced the current generation
    /// was cancelled.
    Ready { partial: bool },
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Complete { indexed: usize },
    Cancelled { indexed: usize, batches: usize },
    Disabled,
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildOutcome::Complete { indexed } => {
                write!(f, "SystemVerilog: {} indexed objects", indexed)
            }
            BuildOutcome::Cancelled { .. } => write!(f, "SystemVerilog: Indexing cancelled"),
            BuildOutcome::Disabled => write!(f, "SystemVerilog: Indexing disabled"),
        }
    }
}

/// One published snapshot of the index.
#[derive(Debug, Default)]
struct Generation {
    number: u64,
    symbols: Vec<DeclarationSymbol>,
    by_file: HashMap<PathBuf, Range<usize>>,
    headers: HashMap<(String, PathBuf), ModuleHeader>,
    /// Files declaring each module name, in merge order.
    module_files: HashMap<String, Vec<PathBuf>>,
}

impl Generation {
    fn merge(&mut self, path: &Path, file: FileIndex) {
        let start = self.symbols.len();
        self.symbols.extend(file.symbols);
        self.by_file
            .insert(path.to_path_buf(), start..self.symbols.len());
        for header in file.headers {
            let key = (header.module_name.clone(), header.file.clone());
            let files = self
                .module_files
                .entry(header.module_name.clone())
                .or_default();
            if !files.contains(&header.file) {
                files.push(header.file.clone());
            }
            self.headers.insert(key, header);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SymbolIndex {
    options: IndexOptions,
    current: RwLock<Arc<Generation>>,
    state: Mutex<IndexState>,
    generations: AtomicU64,
    /// Held for the duration of a rebuild so only one coordinator runs.
    build: Mutex<()>,
}

impl SymbolIndex {
    pub fn new(options: IndexOptions) -> Self {
        let state = if options.disabled {
            IndexState::Disabled
        } else {
            IndexState::Empty
        };
        SymbolIndex {
            options,
            current: RwLock::new(Arc::new(Generation::default())),
            state: Mutex::new(state),
            generations: AtomicU64::new(0),
            build: Mutex::new(()),
        }
    }

    pub fn state(&self) -> IndexState {
        *lock(&self.state)
    }

    fn set_state(&self, state: IndexState) {
        let mut guard = lock(&self.state);
        log::debug!("index state: {:?} -> {:?}", *guard, state);
        *guard = state;
    }

    fn snapshot(&self) -> Arc<Generation> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, generation: Generation) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(generation);
    }

    /// Rebuilds the index from `tree`, replacing the current generation.
    ///
    /// Files that cannot be read are logged and skipped. If `cancel` is
    /// raised, no further batches are started; everything merged so far is
    /// published and the outcome reports the cancellation.
    pub fn rebuild<T: SourceTree + ?Sized>(
        &self,
        tree: &T,
        cancel: &CancellationToken,
    ) -> Result<BuildOutcome, SvIndexError> {
        if self.options.disabled {
            self.set_state(IndexState::Disabled);
            return Ok(BuildOutcome::Disabled);
        }
        let _build = lock(&self.build);
        let previous = self.state();
        self.set_state(IndexState::Building);

        let prepared = tree.find_files().and_then(|files| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs.max(1))
                .build()
                .map(|pool| (files, pool))
                .map_err(|e| SvIndexError::WorkerPool(e.to_string()))
        });
        let (files, pool) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                self.set_state(previous);
                return Err(e);
            }
        };
        log::info!(
            "Indexing {} files in batches of {}",
            files.len(),
            self.options.batch_size
        );

        let mut next = Generation::default();
        let mut batches = 0;
        let mut cancelled = false;
        for batch in files.chunks(self.options.batch_size.max(1)) {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let results: Vec<Option<FileIndex>> = pool.install(|| {
                batch
                    .par_iter()
                    .map(|path| match tree.read_lines(path) {
                        Ok(lines) => Some(index_file(path, &lines)),
                        Err(e) => {
                            log::warn!("Indexing: unable to process file {}: {}", path.display(), e);
                            None
                        }
                    })
                    .collect()
            });
            for (path, result) in batch.iter().zip(results) {
                if let Some(file_index) = result {
                    log::debug!(
                        "{}: {} symbols",
                        path.display(),
                        file_index.symbols.len()
                    );
                    next.merge(path, file_index);
                }
            }
            batches += 1;
        }

        next.number = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let indexed = next.symbols.len();
        self.publish(next);

        if cancelled {
            log::info!("Indexing cancelled after {} batches", batches);
            self.set_state(IndexState::Ready { partial: true });
            Ok(BuildOutcome::Cancelled { indexed, batches })
        } else {
            self.set_state(IndexState::Ready { partial: false });
            Ok(BuildOutcome::Complete { indexed })
        }
    }

    /// Searches the current generation.
    ///
    /// An empty `text` returns the first [`EMPTY_QUERY_LIMIT`] symbols. With
    /// `exact_match` only names equal to `text` are returned; otherwise a
    /// name matches if it contains the characters of `text` in order,
    /// ignoring case. Results are in index order.
    pub fn query(&self, text: &str, exact_match: bool) -> Vec<DeclarationSymbol> {
        let generation = self.snapshot();
        if text.is_empty() {
            return generation
                .symbols
                .iter()
                .take(EMPTY_QUERY_LIMIT)
                .cloned()
                .collect();
        }
        if exact_match {
            return generation
                .symbols
                .iter()
                .filter(|s| s.name == text)
                .cloned()
                .collect();
        }
        let pattern = format!(
            "(?i){}",
            text.chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect::<Vec<String>>()
                .join(".*")
        );
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("unable to build query pattern for {:?}: {}", text, e);
                return Vec::new();
            }
        };
        generation
            .symbols
            .iter()
            .filter(|s| regex.is_match(&s.name))
            .cloned()
            .collect()
    }

    /// Returns the header of the first indexed module named `name`.
    pub fn query_module(&self, name: &str) -> Option<ModuleHeader> {
        let generation = self.snapshot();
        let file = generation.module_files.get(name)?.first()?;
        generation
            .headers
            .get(&(name.to_string(), file.clone()))
            .cloned()
    }

    pub fn module_header(&self, name: &str, file: &Path) -> Option<ModuleHeader> {
        self.snapshot()
            .headers
            .get(&(name.to_string(), file.to_path_buf()))
            .cloned()
    }

    /// Synthesizes an instantiation template from the indexed header of
    /// `module_name`.
    pub fn synthesize_instantiation(&self, module_name: &str) -> Result<String, SvIndexError> {
        let header = self
            .query_module(module_name)
            .ok_or_else(|| SvIndexError::ModuleNotFound(module_name.to_string()))?;
        let ports = header.port_list();
        Ok(synthesize(
            &header.module_name,
            &ports.parameters,
            &ports.signals,
            &self.options.template,
        ))
    }

    /// Returns the symbols declared in `file`, in source order.
    pub fn symbols_in_file(&self, file: &Path) -> Vec<DeclarationSymbol> {
        let generation = self.snapshot();
        match generation.by_file.get(file) {
            Some(range) => generation.symbols[range.clone()].to_vec(),
            None => Vec::new(),
        }
    }

    /// Whether `file` was read and merged into the current generation.
    pub fn is_indexed(&self, file: &Path) -> bool {
        self.snapshot().by_file.contains_key(file)
    }

    pub fn len(&self) -> usize {
        self.snapshot().symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of the currently published generation; 0 before any build.
    pub fn generation(&self) -> u64 {
        self.snapshot().number
    }

    /// Drops all indexed data and returns to the empty state.
    pub fn clear(&self) {
        let _build = lock(&self.build);
        self.publish(Generation::default());
        if !self.options.disabled {
            self.set_state(IndexState::Empty);
        }
    }
}
