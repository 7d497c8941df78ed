//! claimcheck - documentation claim checker.
//!
//! Pulls verifiable technical claims out of documentation markup and checks
//! each one against a source checkout.
//!
//! # Architecture
//!
//! - `extract`: markup tokenizer, verbatim scanner and rule-table classifier
//!   producing a [`ClaimSet`]
//! - `search`: literal-text search backends behind an ordered fallback chain
//! - `validate`: per-category strategies turning claims into verdicts
//! - `report`: report aggregation, YAML/JSON output and terminal summaries
//! - `config`: YAML configuration schema
//!
//! # Example
//!
//! ```no_run
//! use claimcheck::{Extractor, Runner, SearchChain, SourceRoot, Validator};
//! use claimcheck::config::Config;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let claims = Extractor::new(&config.extraction).extract_file("docs/architecture.html")?;
//!
//! let root = SourceRoot::from_config(Path::new("/srv/magento"), &config.validation)?;
//! let chain = SearchChain::from_config(&config.search, &[])?;
//! let validator = Validator::new(root, chain);
//! let report = Runner::new(&validator).run(&claims)?;
//! println!("{} of {} found", report.summary.found, report.summary.total_claims);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod extract;
pub mod report;
pub mod search;
pub mod validate;

pub use config::Config;
pub use extract::{Claim, ClaimCategory, ClaimDocument, ClaimSet, Extractor};
pub use report::{OutputFormat, ReportBuilder, ValidationReport};
pub use search::{
    BackendKind, FileClass, SearchBackend, SearchChain, SearchError, SearchHit,
    SearchOutcome,
};
pub use validate::{
    Confidence, Runner, SourceRoot, SourceRootError, ValidationResult, ValidationStatus, Validator,
};

/// Current UTC time as an RFC 3339 timestamp with second precision.
pub fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
