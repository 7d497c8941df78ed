//! Verdict types produced by the validator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::ClaimCategory;
use crate::search::SearchHit;

/// How much a verdict can be trusted.
///
/// Set by which resolution tier produced the verdict, never by the claim text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Found,
    NotFound,
    /// The category has no automated check.
    NotValidated,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Found => "found",
            ValidationStatus::NotFound => "not_found",
            ValidationStatus::NotValidated => "not_validated",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict for a single claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub category: ClaimCategory,
    pub claim: String,
    pub status: ValidationStatus,
    pub confidence: Confidence,
    pub evidence: Vec<SearchHit>,
    pub notes: String,
}

impl ValidationResult {
    pub fn found(
        category: ClaimCategory,
        claim: impl Into<String>,
        confidence: Confidence,
        evidence: Vec<SearchHit>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            category,
            claim: claim.into(),
            status: ValidationStatus::Found,
            confidence,
            evidence,
            notes: notes.into(),
        }
    }

    pub fn not_found(
        category: ClaimCategory,
        claim: impl Into<String>,
        confidence: Confidence,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            category,
            claim: claim.into(),
            status: ValidationStatus::NotFound,
            confidence,
            evidence: Vec::new(),
            notes: notes.into(),
        }
    }

    pub fn not_validated(category: ClaimCategory, claim: impl Into<String>) -> Self {
        Self {
            category,
            claim: claim.into(),
            status: ValidationStatus::NotValidated,
            confidence: Confidence::Low,
            evidence: Vec::new(),
            notes: format!("Automated validation not supported for {}", category.label()),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == ValidationStatus::Found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), "\"medium\"");
        assert_eq!(
            serde_json::to_string(&ValidationStatus::NotValidated).unwrap(),
            "\"not_validated\""
        );
        assert_eq!(ValidationStatus::NotFound.to_string(), "not_found");
    }

    #[test]
    fn test_not_validated_is_low_and_empty() {
        let result = ValidationResult::not_validated(ClaimCategory::ConfigPath, "web/secure/base_url");
        assert!(!result.is_found());
        assert_eq!(result.confidence, Confidence::Low);
        assert!(result.evidence.is_empty());
        assert!(result.notes.contains("not supported"));
    }
}
