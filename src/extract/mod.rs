//! Claim extraction: markup in, classified claim set out.

mod classifier;
mod document;
pub mod rules;
mod scanner;
mod tokenizer;
mod types;

pub use classifier::Classifier;
pub use document::{ClaimDocument, ValidationStatusBlock};
pub use scanner::{Scanner, DEFAULT_VERBATIM_TAGS};
pub use tokenizer::{tokenize, MarkupEvent};
pub use types::{Claim, ClaimCategory, ClaimSet};

use std::path::Path;

use tracing::debug;

use crate::config::ExtractionConfig;

/// Runs the scanner and classifier over a document.
#[derive(Default)]
pub struct Extractor {
    scanner: Scanner,
    classifier: Classifier,
}

impl Extractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            scanner: Scanner::new(config.verbatim_tags.iter().cloned(), rules::QUALIFIED_MARKER),
            classifier: Classifier::default(),
        }
    }

    /// Extract claims from markup text.
    pub fn extract_str(&self, markup: &str, source_document: &str, extracted_at: &str) -> ClaimSet {
        let mut set = ClaimSet::new(source_document, extracted_at);
        for unit in self.scanner.scan(markup) {
            self.classifier.classify_into(&unit, &mut set);
        }
        set
    }

    /// Extract claims from a documentation file, stamped with the current time.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<ClaimSet> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
        let markup = String::from_utf8_lossy(&bytes);

        let set = self.extract_str(&markup, &path.to_string_lossy(), &crate::timestamp());
        debug!(
            document = %path.display(),
            claims = set.len(),
            "extracted claims"
        );
        Ok(set)
    }
}
