//! Applies the rule table to text units.

use super::rules::{Rule, RULES};
use super::{Claim, ClaimSet};

/// Classifies text units into claims using a rule table.
pub struct Classifier {
    rules: &'static [Rule],
}

impl Default for Classifier {
    fn default() -> Self {
        Self { rules: &RULES }
    }
}

impl Classifier {
    /// Classify one unit. Claims come back in rule order, then match order;
    /// duplicates are left for the claim set to fold.
    pub fn classify(&self, text: &str) -> Vec<Claim> {
        self.rules.iter().flat_map(|rule| rule.claims(text)).collect()
    }

    /// Classify one unit into a running claim set.
    pub fn classify_into(&self, text: &str, set: &mut ClaimSet) {
        for rule in self.rules {
            for claim in rule.claims(text) {
                set.insert(claim);
            }
        }
    }
}
