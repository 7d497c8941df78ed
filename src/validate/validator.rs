//! Per-category resolution strategies.

use std::fs;
use std::path::Path;

use tracing::{trace, warn};

use crate::extract::rules::ROOT_NAMESPACE;
use crate::extract::{Claim, ClaimCategory};
use crate::search::{FileClass, SearchChain, SearchHit, SearchOutcome};

use super::{Confidence, SourceRoot, ValidationResult};

/// Evidence kept per verdict, by category.
const CLASS_EVIDENCE: usize = 3;
const METHOD_EVIDENCE: usize = 5;
const EVENT_EVIDENCE: usize = 5;
const TABLE_EVIDENCE: usize = 3;
const ACL_EVIDENCE: usize = 3;

/// Where a qualified type name is expected to live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPath {
    /// `/`-separated path relative to the module directory.
    pub relative: String,
    /// Final segment of the qualified name.
    pub short_name: String,
}

impl ClassPath {
    /// Text that marks the declaration inside the file.
    pub fn marker(&self) -> String {
        format!("class {}", self.short_name)
    }
}

/// Map `Magento\Vendor\Sub\Name` to `module-vendor/Sub/Name.php`.
///
/// Returns `None` when fewer than two segments remain after the root
/// namespace.
pub fn derive_class_path(name: &str) -> Option<ClassPath> {
    let trimmed = name
        .strip_prefix(ROOT_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('\\'))
        .unwrap_or(name);

    let parts: Vec<&str> = trimmed.split('\\').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return None;
    }

    let short_name = parts[parts.len() - 1].to_string();
    let relative = format!(
        "module-{}/{}.php",
        kebab_case(parts[0]),
        parts[1..].join("/")
    );
    Some(ClassPath {
        relative,
        short_name,
    })
}

/// `CatalogInventory` -> `catalog-inventory`, `GraphQl` -> `graph-ql`.
pub fn kebab_case(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Checks claims against a source tree.
pub struct Validator {
    root: SourceRoot,
    search: SearchChain,
}

impl Validator {
    pub fn new(root: SourceRoot, search: SearchChain) -> Self {
        Self { root, search }
    }

    pub fn root(&self) -> &SourceRoot {
        &self.root
    }

    /// Produce the verdict for one claim.
    pub fn validate(&self, claim: &Claim) -> ValidationResult {
        let result = match claim.category {
            ClaimCategory::Class | ClaimCategory::Interface => self.validate_type(claim),
            ClaimCategory::Method => self.validate_method(claim),
            ClaimCategory::Event => self.validate_event(claim),
            ClaimCategory::Table => self.validate_table(claim),
            ClaimCategory::AclResource => self.validate_acl_resource(claim),
            ClaimCategory::ConfigPath | ClaimCategory::FilePath => {
                ValidationResult::not_validated(claim.category, claim.value.as_str())
            }
        };
        trace!(
            claim = %claim,
            status = %result.status,
            confidence = %result.confidence,
            "validated claim"
        );
        result
    }

    fn search(&self, pattern: &str, class: FileClass) -> SearchOutcome {
        self.search.search(pattern, self.root.modules(), class)
    }

    /// Interfaces go through the same path and marker as classes.
    fn validate_type(&self, claim: &Claim) -> ValidationResult {
        let Some(path) = derive_class_path(&claim.value) else {
            return ValidationResult::not_found(
                claim.category,
                claim.value.as_str(),
                Confidence::Low,
                "Invalid class name format",
            );
        };

        let marker = path.marker();
        let expected = self.root.modules().join(&path.relative);
        if let Some(line) = marker_line(&expected, &marker) {
            return ValidationResult::found(
                claim.category,
                claim.value.as_str(),
                Confidence::High,
                vec![SearchHit::new(path.relative.as_str(), line)],
                format!("Found at expected path {}", path.relative),
            );
        }

        let outcome = self.search(&marker, FileClass::Source);
        if !outcome.hits.is_empty() {
            return found_with(claim, Confidence::Medium, outcome.hits, CLASS_EVIDENCE);
        }

        let notes = if expected.is_file() {
            format!("Expected path {} does not declare {}", path.relative, marker)
        } else {
            format!("Expected path {} does not exist", path.relative)
        };
        missing(claim, Confidence::High, notes, outcome.unavailable_reason())
    }

    fn validate_method(&self, claim: &Claim) -> ValidationResult {
        let outcome = self.search(&format!("function {}", claim.value), FileClass::Source);
        if outcome.hits.is_empty() {
            return missing(
                claim,
                Confidence::Medium,
                "No method definition found",
                outcome.unavailable_reason(),
            );
        }
        found_with(claim, Confidence::Medium, outcome.hits, METHOD_EVIDENCE)
    }

    /// Events are declared in markup and dispatched from source.
    fn validate_event(&self, claim: &Claim) -> ValidationResult {
        let declared = self.search(&claim.value, FileClass::Markup);
        if !declared.hits.is_empty() {
            return found_with(claim, Confidence::High, declared.hits, EVENT_EVIDENCE);
        }
        let dispatched = self.search(&claim.value, FileClass::Source);
        if !dispatched.hits.is_empty() {
            return found_with(claim, Confidence::High, dispatched.hits, EVENT_EVIDENCE);
        }
        let unavailable = declared
            .unavailable_reason()
            .or_else(|| dispatched.unavailable_reason());
        missing(claim, Confidence::High, "Event not declared or dispatched", unavailable)
    }

    fn validate_table(&self, claim: &Claim) -> ValidationResult {
        let outcome = self.search(&claim.value, FileClass::Any);
        if outcome.hits.is_empty() {
            return missing(
                claim,
                Confidence::Medium,
                "Table not referenced",
                outcome.unavailable_reason(),
            );
        }
        found_with(claim, Confidence::High, outcome.hits, TABLE_EVIDENCE)
    }

    fn validate_acl_resource(&self, claim: &Claim) -> ValidationResult {
        let outcome = self.search(&claim.value, FileClass::Markup);
        if outcome.hits.is_empty() {
            return missing(
                claim,
                Confidence::Medium,
                "ACL resource not declared",
                outcome.unavailable_reason(),
            );
        }
        found_with(claim, Confidence::High, outcome.hits, ACL_EVIDENCE)
    }
}

fn found_with(
    claim: &Claim,
    confidence: Confidence,
    mut hits: Vec<SearchHit>,
    cap: usize,
) -> ValidationResult {
    let notes = format!("Found {} occurrences", hits.len());
    hits.truncate(cap);
    ValidationResult::found(claim.category, claim.value.as_str(), confidence, hits, notes)
}

/// Not-found verdict. When no backend searched the tree the absence is
/// unproven, so confidence drops to low and the notes say why.
fn missing(
    claim: &Claim,
    confidence: Confidence,
    notes: impl Into<String>,
    unavailable: Option<String>,
) -> ValidationResult {
    let notes = notes.into();
    match unavailable {
        Some(reason) => {
            warn!(claim = %claim, reason = %reason, "claim checked without a search");
            ValidationResult::not_found(
                claim.category,
                claim.value.as_str(),
                Confidence::Low,
                format!("{}; search unavailable: {}", notes, reason),
            )
        }
        None => ValidationResult::not_found(claim.category, claim.value.as_str(), confidence, notes),
    }
}

/// 1-based line of the first occurrence of `marker` in `path`.
fn marker_line(path: &Path, marker: &str) -> Option<usize> {
    let bytes = fs::read(path).ok()?;
    String::from_utf8_lossy(&bytes)
        .lines()
        .position(|line| line.contains(marker))
        .map(|index| index + 1)
}
