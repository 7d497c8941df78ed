//! Literal-text search over the source tree.
//!
//! Backends are interchangeable behind [`SearchBackend`] and tried in order
//! by a [`SearchChain`]. A backend that fails or times out hands over to the
//! next one; a backend that completes, even with zero hits, ends the chain.

mod grep;
mod process;
mod ripgrep;
mod walk;

pub use grep::GrepBackend;
pub use ripgrep::RipgrepBackend;
pub use walk::WalkBackend;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SearchConfig;

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    /// Path relative to the search root, `/`-separated.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
}

impl SearchHit {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Which files a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    Source,
    Markup,
    Any,
}

impl FileClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileClass::Source => "source",
            FileClass::Markup => "markup",
            FileClass::Any => "any",
        }
    }
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extension lists behind each file class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClasses {
    source: Vec<String>,
    markup: Vec<String>,
}

impl Default for FileClasses {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl FileClasses {
    pub fn new<S, M>(source: S, markup: M) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            source: source.into_iter().map(Into::into).collect(),
            markup: markup.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.source_extensions.iter().cloned(),
            config.markup_extensions.iter().cloned(),
        )
    }

    /// File-name globs for a class. Empty means every file.
    pub fn globs(&self, class: FileClass) -> Vec<String> {
        let extensions: &[String] = match class {
            FileClass::Source => &self.source,
            FileClass::Markup => &self.markup,
            FileClass::Any => &[],
        };
        extensions.iter().map(|ext| format!("*.{}", ext)).collect()
    }

    /// Compiled matcher for a class; `None` matches every file.
    pub fn matcher(&self, class: FileClass) -> Result<Option<GlobSet>, globset::Error> {
        let globs = self.globs(class);
        if globs.is_empty() {
            return Ok(None);
        }
        let mut builder = GlobSetBuilder::new();
        for glob in &globs {
            builder.add(Glob::new(glob)?);
        }
        Ok(Some(builder.build()?))
    }
}

/// Why a backend could not answer.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{backend} is not installed")]
    Unavailable { backend: String },

    #[error("failed to start {backend}: {source}")]
    Spawn {
        backend: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{backend} timed out after {}s", .after.as_secs_f64())]
    Timeout { backend: String, after: Duration },

    #[error("{backend} exited with {status}: {stderr}")]
    Failed {
        backend: String,
        status: String,
        stderr: String,
    },

    #[error("unreadable output from {backend}: {message}")]
    Parse { backend: String, message: String },
}

/// A way of finding literal text under a directory.
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Find every line containing `pattern` in files of `class` under `root`.
    fn search(
        &self,
        pattern: &str,
        root: &Path,
        class: FileClass,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

/// Named backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ripgrep,
    Grep,
    Walk,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ripgrep => "ripgrep",
            BackendKind::Grep => "grep",
            BackendKind::Walk => "walk",
        }
    }

    pub fn build(&self, classes: FileClasses, timeout: Duration) -> Box<dyn SearchBackend> {
        match self {
            BackendKind::Ripgrep => Box::new(RipgrepBackend::new(classes, timeout)),
            BackendKind::Grep => Box::new(GrepBackend::new(classes, timeout)),
            BackendKind::Walk => Box::new(WalkBackend::new(classes, timeout)),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ripgrep" | "rg" => Ok(BackendKind::Ripgrep),
            "grep" => Ok(BackendKind::Grep),
            "walk" => Ok(BackendKind::Walk),
            other => Err(format!(
                "unknown backend '{}' (expected ripgrep, grep or walk)",
                other
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered fallback list of backends.
pub struct SearchChain {
    backends: Vec<Box<dyn SearchBackend>>,
}

impl SearchChain {
    pub fn new(backends: Vec<Box<dyn SearchBackend>>) -> Self {
        Self { backends }
    }

    /// Build the chain from config. Non-empty `overrides` replace the
    /// configured backend list.
    pub fn from_config(config: &SearchConfig, overrides: &[String]) -> anyhow::Result<Self> {
        let names = if overrides.is_empty() {
            config.backends.as_slice()
        } else {
            overrides
        };

        let classes = FileClasses::from_config(config);
        let mut backends = Vec::with_capacity(names.len());
        for name in names {
            let kind: BackendKind = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            backends.push(kind.build(classes.clone(), config.timeout()));
        }
        Ok(Self::new(backends))
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Search with fallback. The outcome records whether any backend
    /// answered so callers can tell an empty result from no result.
    pub fn search(&self, pattern: &str, root: &Path, class: FileClass) -> SearchOutcome {
        let mut failures = Vec::new();
        for backend in &self.backends {
            match backend.search(pattern, root, class) {
                Ok(hits) => {
                    debug!(
                        backend = backend.name(),
                        pattern,
                        class = %class,
                        hits = hits.len(),
                        "search complete"
                    );
                    return SearchOutcome {
                        hits,
                        failures,
                        answered: true,
                    };
                }
                Err(e) => {
                    debug!(backend = backend.name(), pattern, error = %e, "search backend failed");
                    failures.push(e);
                }
            }
        }

        let outcome = SearchOutcome {
            hits: Vec::new(),
            failures,
            answered: false,
        };
        if let Some(reason) = outcome.unavailable_reason() {
            warn!(pattern, class = %class, reason = %reason, "no search backend answered");
        }
        outcome
    }
}

/// What a [`SearchChain`] query produced.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    /// Backends that failed before one answered, or all of them.
    pub failures: Vec<SearchError>,
    /// Whether some backend completed the search.
    pub answered: bool,
}

impl SearchOutcome {
    /// Why the tree went unsearched, or `None` if a backend answered.
    pub fn unavailable_reason(&self) -> Option<String> {
        if self.answered {
            return None;
        }
        if self.failures.is_empty() {
            return Some("no search backends configured".to_string());
        }
        let reasons: Vec<String> = self.failures.iter().map(|e| e.to_string()).collect();
        Some(reasons.join("; "))
    }
}

/// Express `path` relative to `root` with `/` separators.
pub(crate) fn relativize(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backends for exercising the chain and the validator.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always fails with a timeout.
    pub struct TimeoutBackend {
        pub calls: AtomicUsize,
    }

    impl TimeoutBackend {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SearchBackend for TimeoutBackend {
        fn name(&self) -> &str {
            "timeout"
        }

        fn search(&self, _: &str, _: &Path, _: FileClass) -> Result<Vec<SearchHit>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SearchError::Timeout {
                backend: "timeout".to_string(),
                after: Duration::from_secs(10),
            })
        }
    }

    /// Returns a fixed answer for every query.
    pub struct FixedBackend {
        pub hits: Vec<SearchHit>,
        pub calls: AtomicUsize,
    }

    impl FixedBackend {
        pub fn new(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SearchBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn search(&self, _: &str, _: &Path, _: FileClass) -> Result<Vec<SearchHit>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.hits.clone())
        }
    }
}
