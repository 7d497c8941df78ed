//! Claim interchange document.
//!
//! The document persisted between extraction and validation. It is YAML,
//! with sorted per-category lists so diffs stay readable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{Claim, ClaimCategory, ClaimSet};

/// Serialized form of a claim set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDocument {
    pub source_document: String,
    pub extracted_at: String,
    #[serde(default)]
    pub claims: BTreeMap<ClaimCategory, Vec<String>>,
    #[serde(default)]
    pub validation_status: ValidationStatusBlock,
}

/// Placeholder block filled in by downstream review tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatusBlock {
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub validation_date: Option<String>,
    #[serde(default)]
    pub validator: Option<String>,
}

impl ClaimDocument {
    /// Parse a claim document from a YAML file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.as_ref().display(), e))?;
        let document: ClaimDocument = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("parsing {}: {}", path.as_ref().display(), e))?;
        Ok(document)
    }

    /// Write this document as YAML.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        fs::write(path.as_ref(), self.to_yaml()?)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rebuild the claim set. Duplicate values collapse.
    pub fn into_claim_set(self) -> ClaimSet {
        let claims = self
            .claims
            .into_iter()
            .flat_map(|(category, values)| values.into_iter().map(move |v| Claim::new(category, v)));
        ClaimSet::from_claims(self.source_document, self.extracted_at, claims)
    }
}

impl From<&ClaimSet> for ClaimDocument {
    fn from(set: &ClaimSet) -> Self {
        let claims = set
            .by_category()
            .iter()
            .map(|(category, values)| (*category, values.iter().cloned().collect()))
            .collect();

        Self {
            source_document: set.source_document().to_string(),
            extracted_at: set.extracted_at().to_string(),
            claims,
            validation_status: ValidationStatusBlock::default(),
        }
    }
}
