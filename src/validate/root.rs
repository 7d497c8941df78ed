//! Locating the module directory inside a source checkout.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::ValidationConfig;

#[derive(Debug, Error)]
pub enum SourceRootError {
    #[error("source root {} does not exist or is not a directory", .0.display())]
    Missing(PathBuf),

    #[error(
        "no module directory containing {marker} under {} (tried: {})",
        .root.display(),
        .tried.join(", ")
    )]
    NoModules {
        root: PathBuf,
        marker: String,
        tried: Vec<String>,
    },
}

/// Resolved directory holding one subdirectory per module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    given: PathBuf,
    modules: PathBuf,
}

impl SourceRoot {
    /// Try `<root>/<candidate>` for each candidate in order; the first
    /// directory holding `marker` wins.
    pub fn resolve<S: AsRef<str>>(
        root: &Path,
        candidates: &[S],
        marker: &str,
    ) -> Result<Self, SourceRootError> {
        if !root.is_dir() {
            return Err(SourceRootError::Missing(root.to_path_buf()));
        }

        for candidate in candidates {
            let dir = match candidate.as_ref() {
                "" | "." => root.to_path_buf(),
                sub => root.join(sub),
            };
            if dir.join(marker).is_dir() {
                debug!(modules = %dir.display(), "resolved source root");
                return Ok(Self {
                    given: root.to_path_buf(),
                    modules: dir,
                });
            }
        }

        Err(SourceRootError::NoModules {
            root: root.to_path_buf(),
            marker: marker.to_string(),
            tried: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        })
    }

    pub fn from_config(root: &Path, config: &ValidationConfig) -> Result<Self, SourceRootError> {
        Self::resolve(root, config.vendor_paths.as_slice(), &config.marker_module)
    }

    /// Use `dir` directly as the module directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            given: dir.clone(),
            modules: dir,
        }
    }

    /// The path the user supplied.
    pub fn given(&self) -> &Path {
        &self.given
    }

    /// Directory that module paths are relative to.
    pub fn modules(&self) -> &Path {
        &self.modules
    }
}
