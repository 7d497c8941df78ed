//! Parallel validation of a whole claim set.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::extract::{Claim, ClaimSet};
use crate::report::{ReportBuilder, ValidationReport};

use super::{ValidationResult, Validator};

const PROGRESS_TEMPLATE: &str = "  {spinner} [{bar:30}] {pos}/{len} {msg}";

/// Runs a validator over every claim on a bounded thread pool.
pub struct Runner<'a> {
    validator: &'a Validator,
    jobs: usize,
    show_progress: bool,
}

impl<'a> Runner<'a> {
    pub fn new(validator: &'a Validator) -> Self {
        Self {
            validator,
            jobs: 0,
            show_progress: false,
        }
    }

    /// Worker threads; 0 uses the available parallelism.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Draw a progress bar on stderr.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Validate every claim and fold the verdicts into a report.
    pub fn run(&self, set: &ClaimSet) -> anyhow::Result<ValidationReport> {
        let claims: Vec<Claim> = set.iter().collect();
        let progress = self.progress_bar(claims.len() as u64);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;

        let results: Vec<ValidationResult> = pool.install(|| {
            claims
                .par_iter()
                .map(|claim| {
                    let result = self.validator.validate(claim);
                    progress.inc(1);
                    result
                })
                .collect()
        });
        progress.finish_and_clear();

        let mut builder = ReportBuilder::new(
            set.source_document(),
            crate::timestamp(),
            self.validator.root().given().display().to_string(),
        );
        for result in results {
            builder.record(result);
        }
        let report = builder.finish();

        info!(
            total = report.summary.total_claims,
            found = report.summary.found,
            not_found = report.summary.not_found,
            "validation complete"
        );
        Ok(report)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("validating claims");
        bar
    }
}
