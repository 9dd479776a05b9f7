//! Shared filesystem (AFS) backend
//!
//! Walks the storage root looking for files whose name contains the base
//! name and matches one of the configured patterns. The walk runs on its own
//! thread under a deadline because network mounts can hang indefinitely.

use super::traits::*;
use crate::config::{default_search_patterns, AfsSettings};
use crate::query::CanonicalQuery;
use crate::results::Reference;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Filesystem search backend
pub struct AfsBackend {
    root: PathBuf,
    patterns: Vec<Regex>,
    verbose: bool,
}

impl AfsBackend {
    /// Create a backend for `root`
    ///
    /// Patterns that fail to compile are logged and skipped. An empty list
    /// means the default patterns.
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Self {
        let patterns = if patterns.is_empty() {
            default_search_patterns()
        } else {
            patterns.to_vec()
        };

        let patterns = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring invalid AFS search pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();

        Self {
            root: root.into(),
            patterns,
            verbose: false,
        }
    }

    /// Create a backend from settings
    pub fn from_settings(settings: &AfsSettings) -> Self {
        Self::new(&settings.root_path, &settings.search_patterns)
    }

    /// Log every analyzed file
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of usable patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Search for files matching `base_name`
    ///
    /// Returns an empty list when the root is unreachable or the walk does
    /// not finish within `timeout`. A walk that times out is abandoned and
    /// its partial results are discarded.
    pub async fn search(
        &self,
        base_name: &str,
        timeout: Duration,
        max_depth: usize,
    ) -> Vec<Reference> {
        if base_name.is_empty() {
            debug!("Empty base name, skipping AFS search");
            return Vec::new();
        }

        let walk = Walk {
            root: self.root.clone(),
            needle: base_name.to_lowercase(),
            patterns: self.patterns.clone(),
            max_depth,
            verbose: self.verbose,
        };

        let start = Instant::now();
        match run_with_deadline(timeout, move |cancel| walk.run(cancel)).await {
            Some(references) => {
                info!(
                    "AFS search found {} files in {:?}",
                    references.len(),
                    start.elapsed()
                );
                references
            }
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl ReferenceBackend for AfsBackend {
    fn name(&self) -> &str {
        "afs"
    }

    async fn search(&self, query: &CanonicalQuery, options: &SearchOptions) -> Vec<Reference> {
        AfsBackend::search(self, &query.base_name, options.timeout, options.max_depth).await
    }
}

/// Run blocking work on a detached thread and wait at most `timeout`
///
/// On expiry the cancel flag is raised and the thread is abandoned; whatever
/// it produces afterwards is dropped. Returns `None` on timeout or if the
/// worker died.
async fn run_with_deadline<T, F>(timeout: Duration, work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool) -> T + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = oneshot::channel();

    let worker_cancel = cancel.clone();
    let spawned = std::thread::Builder::new()
        .name("afs-walk".to_string())
        .spawn(move || {
            let result = work(&worker_cancel);
            // The receiver is gone if we already timed out
            let _ = tx.send(result);
        });

    if let Err(e) = spawned {
        error!("Failed to start AFS search worker: {}", e);
        return None;
    }

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(_)) => {
            error!("AFS search worker exited without a result");
            None
        }
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            error!("AFS search timed out after {:?}", timeout);
            None
        }
    }
}

/// One directory walk, owned by the worker thread
struct Walk {
    root: PathBuf,
    needle: String,
    patterns: Vec<Regex>,
    max_depth: usize,
    verbose: bool,
}

impl Walk {
    fn run(self, cancel: &AtomicBool) -> Vec<Reference> {
        if !probe(&self.root) {
            warn!("AFS root path is not reachable: {}", self.root.display());
            return Vec::new();
        }

        let mut references = Vec::new();

        // walkdir depth 1 is the root's own entries; each level of
        // `max_depth` adds one directory below that.
        let walker = WalkDir::new(&self.root)
            .max_depth(self.max_depth.saturating_add(1))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry));

        for entry in walker {
            if cancel.load(Ordering::Relaxed) {
                debug!("AFS walk cancelled");
                return Vec::new();
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Could not read AFS entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            if self.verbose {
                info!("Analyzed {}", entry.path().display());
            }

            let file_name = entry.file_name().to_string_lossy();
            if !self.matches(&file_name) {
                continue;
            }

            match entry.metadata() {
                Ok(meta) => {
                    let modified = meta.modified().ok().map(DateTime::<Local>::from);
                    references.push(Reference::afs(entry.path().display().to_string(), modified));
                }
                Err(e) => {
                    warn!("Could not access file {}: {}", entry.path().display(), e);
                }
            }
        }

        references
    }

    /// Name contains the needle and matches at least one pattern
    fn matches(&self, file_name: &str) -> bool {
        file_name.to_lowercase().contains(&self.needle)
            && self.patterns.iter().any(|re| re.is_match(file_name))
    }
}

/// Check that the root exists, is a directory and can be listed
fn probe(root: &Path) -> bool {
    if !root.is_dir() {
        return false;
    }
    match std::fs::read_dir(root) {
        Ok(mut entries) => match entries.next() {
            Some(Err(e)) => {
                warn!("Ping failed for AFS location {}: {}", root.display(), e);
                false
            }
            _ => true,
        },
        Err(e) => {
            warn!("Ping failed for AFS location {}: {}", root.display(), e);
            false
        }
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
