//! Configuration schema for claimcheck.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::extract::DEFAULT_VERBATIM_TAGS;
use crate::search::BackendKind;

/// Default config file names to search for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["claimcheck.yaml", ".claimcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load the config the CLI should use.
    ///
    /// An explicit path must exist. Otherwise the working directory and then
    /// the user config directory are searched; built-in defaults apply when
    /// nothing is found. Returns the path that was loaded, if any.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };

        match path {
            Some(p) => {
                let config = Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?;
                validate(&config)?;
                debug!(path = %p.display(), "loaded config");
                Ok((config, Some(p)))
            }
            None => {
                debug!("no config file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }
}

/// Find a config file in the working directory or the user config directory.
fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.is_file() {
            return Some(path);
        }
    }

    let user = directories::ProjectDirs::from("", "", "claimcheck")
        .map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_NAMES[0]))?;
    user.is_file().then_some(user)
}

/// Settings for the markup scanner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Elements whose text is treated as code rather than prose.
    #[serde(default = "default_verbatim_tags")]
    pub verbatim_tags: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            verbatim_tags: default_verbatim_tags(),
        }
    }
}

fn default_verbatim_tags() -> Vec<String> {
    DEFAULT_VERBATIM_TAGS.iter().map(|t| t.to_string()).collect()
}

/// Settings for locating and checking the source tree.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Source root used when none is given on the command line.
    #[serde(default)]
    pub source_root: Option<PathBuf>,
    /// Candidate module directories under the source root, tried in order.
    #[serde(default = "default_vendor_paths")]
    pub vendor_paths: Vec<String>,
    /// Module directory whose presence identifies a usable source tree.
    #[serde(default = "default_marker_module")]
    pub marker_module: String,
    /// Worker threads for validation (0 = available parallelism).
    #[serde(default)]
    pub jobs: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            source_root: None,
            vendor_paths: default_vendor_paths(),
            marker_module: default_marker_module(),
            jobs: 0,
        }
    }
}

fn default_vendor_paths() -> Vec<String> {
    vec![
        "vendor/magento".to_string(),
        "vendor/mage-os".to_string(),
        ".".to_string(),
    ]
}

fn default_marker_module() -> String {
    "module-customer".to_string()
}

/// Settings for the search backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Backends in fallback order: ripgrep, grep, walk.
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,
    /// Deadline for a single backend invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default = "default_markup_extensions")]
    pub markup_extensions: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            timeout_secs: default_timeout_secs(),
            source_extensions: default_source_extensions(),
            markup_extensions: default_markup_extensions(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_backends() -> Vec<String> {
    vec!["ripgrep".to_string(), "grep".to_string()]
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_source_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

fn default_markup_extensions() -> Vec<String> {
    vec!["xml".to_string()]
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.extraction.verbatim_tags.is_empty() {
        anyhow::bail!("extraction.verbatim_tags must not be empty");
    }

    if config.validation.vendor_paths.is_empty() {
        anyhow::bail!("validation.vendor_paths must not be empty");
    }

    if config.validation.marker_module.trim().is_empty() {
        anyhow::bail!("validation.marker_module must not be empty");
    }

    if config.search.backends.is_empty() {
        anyhow::bail!("search.backends must name at least one backend");
    }

    for name in &config.search.backends {
        name.parse::<BackendKind>()
            .map_err(|e| anyhow::anyhow!("invalid search backend: {}", e))?;
    }

    if config.search.timeout_secs == 0 {
        anyhow::bail!("search.timeout_secs must be greater than zero");
    }

    if config.search.source_extensions.is_empty() || config.search.markup_extensions.is_empty() {
        anyhow::bail!("search.source_extensions and search.markup_extensions must not be empty");
    }

    for ext in config
        .search
        .source_extensions
        .iter()
        .chain(&config.search.markup_extensions)
    {
        if ext.is_empty() || ext.contains(['/', '*', '.']) {
            anyhow::bail!("invalid file extension {:?}, use a bare extension like \"php\"", ext);
        }
    }

    Ok(())
}
