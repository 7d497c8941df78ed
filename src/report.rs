//! Validation report and terminal summaries.
//!
//! The report is written as YAML (default) or JSON. Category keys and
//! field names are stable so downstream tooling can read either format.

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::extract::{ClaimCategory, ClaimSet};
use crate::search::SearchHit;
use crate::validate::{Confidence, ValidationResult, ValidationStatus};

/// Serialization format of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// Full result of validating one claim document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub source_document: String,
    pub validation_date: String,
    pub source_root: String,
    pub summary: ReportSummary,
    pub results_by_type: BTreeMap<ClaimCategory, CategoryBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_claims: usize,
    /// Claims that went through an automated check.
    pub validated: usize,
    pub found: usize,
    pub not_found: usize,
    pub not_validated: usize,
    pub confidence_distribution: ConfidenceHistogram,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceHistogram {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceHistogram {
    fn add(&mut self, confidence: Confidence) {
        match confidence {
            Confidence::High => self.high += 1,
            Confidence::Medium => self.medium += 1,
            Confidence::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub not_validated: usize,
    pub results: Vec<ReportEntry>,
}

/// One verdict as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub claim: String,
    pub status: ValidationStatus,
    pub found: bool,
    pub confidence: Confidence,
    pub evidence: Vec<SearchHit>,
    pub notes: String,
}

impl From<ValidationResult> for ReportEntry {
    fn from(result: ValidationResult) -> Self {
        Self {
            found: result.is_found(),
            claim: result.claim,
            status: result.status,
            confidence: result.confidence,
            evidence: result.evidence,
            notes: result.notes,
        }
    }
}

impl ValidationReport {
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Yaml => self.to_yaml(),
            OutputFormat::Json => self.to_json(),
        }
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> anyhow::Result<()> {
        fs::write(path.as_ref(), self.render(format)?)?;
        Ok(())
    }

    pub fn category(&self, category: ClaimCategory) -> Option<&CategoryBreakdown> {
        self.results_by_type.get(&category)
    }

    /// Whether any checked claim came back not found.
    pub fn has_missing(&self) -> bool {
        self.summary.not_found > 0
    }
}

/// Folds verdicts into a report, in any arrival order.
pub struct ReportBuilder {
    report: ValidationReport,
}

impl ReportBuilder {
    pub fn new(
        source_document: impl Into<String>,
        validation_date: impl Into<String>,
        source_root: impl Into<String>,
    ) -> Self {
        let results_by_type = ClaimCategory::ALL
            .iter()
            .map(|c| (*c, CategoryBreakdown::default()))
            .collect();

        Self {
            report: ValidationReport {
                source_document: source_document.into(),
                validation_date: validation_date.into(),
                source_root: source_root.into(),
                summary: ReportSummary::default(),
                results_by_type,
            },
        }
    }

    pub fn record(&mut self, result: ValidationResult) {
        let summary = &mut self.report.summary;
        let breakdown = self
            .report
            .results_by_type
            .entry(result.category)
            .or_default();

        summary.total_claims += 1;
        breakdown.total += 1;
        summary.confidence_distribution.add(result.confidence);

        match result.status {
            ValidationStatus::Found => {
                summary.validated += 1;
                summary.found += 1;
                breakdown.found += 1;
            }
            ValidationStatus::NotFound => {
                summary.validated += 1;
                summary.not_found += 1;
                breakdown.not_found += 1;
            }
            ValidationStatus::NotValidated => {
                summary.not_validated += 1;
                breakdown.not_validated += 1;
            }
        }

        breakdown.results.push(result.into());
    }

    /// Sort results so the report does not depend on completion order.
    pub fn finish(mut self) -> ValidationReport {
        for breakdown in self.report.results_by_type.values_mut() {
            breakdown.results.sort_by(|a, b| a.claim.cmp(&b.claim));
        }
        self.report
    }
}

fn percent(part: usize, total: usize) -> f64 {
    part as f64 / total.max(1) as f64 * 100.0
}

/// Counts per category after extraction.
pub fn write_extraction_summary<W: Write>(
    out: &mut W,
    set: &ClaimSet,
    output: &Path,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} {}", "Extracted".green().bold(), set.source_document())?;
    writeln!(out, "  {}{}", "Output: ".dimmed(), output.display())?;
    writeln!(out)?;
    writeln!(out, "  {}", "Claims:".bold())?;
    for category in ClaimCategory::ALL {
        let count = set.count(category);
        let count = if count == 0 {
            count.to_string().dimmed()
        } else {
            count.to_string().normal()
        };
        writeln!(out, "    {:<16} {}", category.label(), count)?;
    }
    writeln!(out, "    {:<16} {}", "Total", set.len().to_string().bold())?;
    writeln!(out)?;
    Ok(())
}

/// Found/not-found ratios, confidence histogram and per-type breakdown.
pub fn write_validation_summary<W: Write>(
    out: &mut W,
    report: &ValidationReport,
    output: &Path,
) -> io::Result<()> {
    let summary = &report.summary;

    writeln!(out)?;
    writeln!(out, "  {} {}", "Validated".cyan().bold(), report.source_document)?;
    writeln!(out, "  {}{}", "Source:  ".dimmed(), report.source_root)?;
    writeln!(out, "  {}{}", "Output:  ".dimmed(), output.display())?;
    writeln!(out)?;

    writeln!(out, "  {}", "Summary:".bold())?;
    writeln!(out, "    Total claims   {}", summary.total_claims)?;
    writeln!(
        out,
        "    Found          {} ({:.1}%)",
        summary.found.to_string().green(),
        percent(summary.found, summary.validated)
    )?;
    let not_found = if summary.not_found > 0 {
        summary.not_found.to_string().red()
    } else {
        summary.not_found.to_string().normal()
    };
    writeln!(
        out,
        "    Not found      {} ({:.1}%)",
        not_found,
        percent(summary.not_found, summary.validated)
    )?;
    if summary.not_validated > 0 {
        writeln!(
            out,
            "    {}",
            format!("Not validated  {}", summary.not_validated).dimmed()
        )?;
    }
    writeln!(out)?;

    let histogram = &summary.confidence_distribution;
    writeln!(out, "  {}", "Confidence:".bold())?;
    writeln!(out, "    {:<8} {}", "High", histogram.high.to_string().green())?;
    writeln!(out, "    {:<8} {}", "Medium", histogram.medium.to_string().yellow())?;
    writeln!(out, "    {:<8} {}", "Low", histogram.low.to_string().red())?;
    writeln!(out)?;

    writeln!(out, "  {}", "By type:".bold())?;
    for (category, breakdown) in &report.results_by_type {
        if breakdown.total == 0 {
            continue;
        }
        if breakdown.not_validated == breakdown.total {
            writeln!(
                out,
                "    {:<16} {}",
                category.label(),
                format!("{} not validated", breakdown.total).dimmed()
            )?;
            continue;
        }
        let checked = breakdown.total - breakdown.not_validated;
        writeln!(
            out,
            "    {:<16} {}/{} ({:.1}%)",
            category.label(),
            breakdown.found,
            checked,
            percent(breakdown.found, checked)
        )?;
    }
    writeln!(out)?;
    Ok(())
}
