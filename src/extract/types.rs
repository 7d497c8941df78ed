//! Core types for extracted claims.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The kind of technical assertion a claim makes.
///
/// Declaration order is the canonical output order for claim documents
/// and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClaimCategory {
    #[serde(rename = "php_classes")]
    Class,
    #[serde(rename = "php_interfaces")]
    Interface,
    #[serde(rename = "methods")]
    Method,
    #[serde(rename = "events")]
    Event,
    #[serde(rename = "database_tables")]
    Table,
    #[serde(rename = "acl_resources")]
    AclResource,
    #[serde(rename = "config_paths")]
    ConfigPath,
    #[serde(rename = "file_paths")]
    FilePath,
}

impl ClaimCategory {
    pub const ALL: [ClaimCategory; 8] = [
        ClaimCategory::Class,
        ClaimCategory::Interface,
        ClaimCategory::Method,
        ClaimCategory::Event,
        ClaimCategory::Table,
        ClaimCategory::AclResource,
        ClaimCategory::ConfigPath,
        ClaimCategory::FilePath,
    ];

    /// Key used in claim documents and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimCategory::Class => "php_classes",
            ClaimCategory::Interface => "php_interfaces",
            ClaimCategory::Method => "methods",
            ClaimCategory::Event => "events",
            ClaimCategory::Table => "database_tables",
            ClaimCategory::AclResource => "acl_resources",
            ClaimCategory::ConfigPath => "config_paths",
            ClaimCategory::FilePath => "file_paths",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "php_classes" => Some(ClaimCategory::Class),
            "php_interfaces" => Some(ClaimCategory::Interface),
            "methods" => Some(ClaimCategory::Method),
            "events" => Some(ClaimCategory::Event),
            "database_tables" => Some(ClaimCategory::Table),
            "acl_resources" => Some(ClaimCategory::AclResource),
            "config_paths" => Some(ClaimCategory::ConfigPath),
            "file_paths" => Some(ClaimCategory::FilePath),
            _ => None,
        }
    }

    /// Human-readable plural label for terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            ClaimCategory::Class => "Classes",
            ClaimCategory::Interface => "Interfaces",
            ClaimCategory::Method => "Methods",
            ClaimCategory::Event => "Events",
            ClaimCategory::Table => "Tables",
            ClaimCategory::AclResource => "ACL Resources",
            ClaimCategory::ConfigPath => "Config Paths",
            ClaimCategory::FilePath => "File Paths",
        }
    }

    /// Whether claims of this category have an automated validation strategy.
    pub fn is_validated(&self) -> bool {
        !matches!(self, ClaimCategory::ConfigPath | ClaimCategory::FilePath)
    }
}

impl std::fmt::Display for ClaimCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single normalized claim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Claim {
    pub category: ClaimCategory,
    pub value: String,
}

impl Claim {
    pub fn new(category: ClaimCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.category, self.value)
    }
}

/// Deduplicated claims extracted from one document.
///
/// Every category is always present, possibly empty. Values within a
/// category are kept sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    source_document: String,
    extracted_at: String,
    claims: BTreeMap<ClaimCategory, BTreeSet<String>>,
}

impl ClaimSet {
    pub fn new(source_document: impl Into<String>, extracted_at: impl Into<String>) -> Self {
        Self {
            source_document: source_document.into(),
            extracted_at: extracted_at.into(),
            claims: ClaimCategory::ALL
                .iter()
                .map(|c| (*c, BTreeSet::new()))
                .collect(),
        }
    }

    /// Build a set from already-classified claims.
    pub fn from_claims<I>(
        source_document: impl Into<String>,
        extracted_at: impl Into<String>,
        claims: I,
    ) -> Self
    where
        I: IntoIterator<Item = Claim>,
    {
        let mut set = Self::new(source_document, extracted_at);
        for claim in claims {
            set.insert(claim);
        }
        set
    }

    /// Add a claim. Returns false if it was already present.
    pub(crate) fn insert(&mut self, claim: Claim) -> bool {
        self.claims
            .entry(claim.category)
            .or_default()
            .insert(claim.value)
    }

    pub fn source_document(&self) -> &str {
        &self.source_document
    }

    pub fn extracted_at(&self) -> &str {
        &self.extracted_at
    }

    /// Values for one category, sorted.
    pub fn values(&self, category: ClaimCategory) -> impl Iterator<Item = &str> {
        self.claims
            .get(&category)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    pub fn contains(&self, category: ClaimCategory, value: &str) -> bool {
        self.claims
            .get(&category)
            .map(|values| values.contains(value))
            .unwrap_or(false)
    }

    pub fn count(&self, category: ClaimCategory) -> usize {
        self.claims.get(&category).map(BTreeSet::len).unwrap_or(0)
    }

    /// All claims, ordered by category then value.
    pub fn iter(&self) -> impl Iterator<Item = Claim> + '_ {
        self.claims.iter().flat_map(|(category, values)| {
            values.iter().map(move |v| Claim::new(*category, v.clone()))
        })
    }

    /// The category-to-values mapping without provenance.
    pub fn by_category(&self) -> &BTreeMap<ClaimCategory, BTreeSet<String>> {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.claims.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
