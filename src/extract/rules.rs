//! Lexical classification rules.
//!
//! Each rule pairs one pattern with an acceptance predicate that applies the
//! category's exclusion policy and decides the final category. Rules are
//! independent: a span of text may satisfy several of them.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

use super::{Claim, ClaimCategory};

/// Root namespace of qualified identifiers.
pub const ROOT_NAMESPACE: &str = "Magento";

/// Token marking a qualified identifier in running text.
pub const QUALIFIED_MARKER: &str = "Magento\\";

/// Suffix that turns a qualified identifier into an interface claim.
const INTERFACE_SUFFIX: &str = "Interface";

/// Words that look like method calls but are language keywords.
static METHOD_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "function",
    "public",
    "private",
    "protected",
};

/// snake_case phrases that are common in prose but never events.
static EVENT_DENYLIST: phf::Set<&'static str> = phf_set! {
    "the_core",
    "full_page",
    "per_website",
    "primary_key",
};

/// An event name must contain at least one of these.
const EVENT_KEYWORDS: &[&str] = &[
    "save", "delete", "load", "login", "logout", "customer", "before", "after",
];

lazy_static! {
    static ref QUALIFIED_NAME: Regex =
        Regex::new(r"Magento\\[A-Za-z0-9\\]+[A-Za-z0-9]+").unwrap();

    static ref METHOD_CALL: Regex =
        Regex::new(r"([a-z][a-zA-Z0-9_]*)\s*\([^)]*\)(?:\s*:\s*[A-Za-z\\]+)?").unwrap();

    static ref SNAKE_CASE: Regex = Regex::new(r"\b([a-z]+_[a-z_]+)\b").unwrap();

    static ref TABLE_NAME: Regex =
        Regex::new(r"\b(customer_[a-z_]+|eav_[a-z_]+|sales_[a-z_]+|quote_[a-z_]+)\b").unwrap();

    static ref ACL_RESOURCE: Regex = Regex::new(r"Magento_[A-Za-z]+::[a-z_]+").unwrap();

    static ref CONFIG_PATH: Regex =
        Regex::new(r"\b([a-z]+/[a-z_]+(?:/[a-z_]+)?)\b").unwrap();

    static ref FILE_PATH: Regex = Regex::new(
        r"(?:etc|Model|Block|Controller|Helper|Observer|Plugin)/[A-Za-z0-9_/]+\.(?:xml|php)"
    ).unwrap();

    /// The rule table, applied in order to every text unit.
    pub static ref RULES: Vec<Rule> = vec![
        Rule {
            name: "qualified_name",
            pattern: &*QUALIFIED_NAME,
            capture: 0,
            accept: qualified_name_category,
        },
        Rule {
            name: "method",
            pattern: &*METHOD_CALL,
            capture: 1,
            accept: accept_method,
        },
        Rule {
            name: "event",
            pattern: &*SNAKE_CASE,
            capture: 1,
            accept: accept_event,
        },
        Rule {
            name: "table",
            pattern: &*TABLE_NAME,
            capture: 1,
            accept: accept_table,
        },
        Rule {
            name: "acl_resource",
            pattern: &*ACL_RESOURCE,
            capture: 0,
            accept: accept_acl_resource,
        },
        Rule {
            name: "config_path",
            pattern: &*CONFIG_PATH,
            capture: 1,
            accept: accept_config_path,
        },
        Rule {
            name: "file_path",
            pattern: &*FILE_PATH,
            capture: 0,
            accept: accept_file_path,
        },
    ];
}

/// One lexical rule.
pub struct Rule {
    pub name: &'static str,
    pattern: &'static Regex,
    /// Capture group holding the claim value (0 = whole match).
    capture: usize,
    /// Exclusion policy; returns the category for an accepted value.
    accept: fn(&str) -> Option<ClaimCategory>,
}

impl Rule {
    /// All claims this rule accepts in `text`, in match order.
    pub fn claims<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Claim> + 't {
        self.pattern.captures_iter(text).filter_map(move |caps| {
            let value = caps.get(self.capture)?.as_str();
            let category = (self.accept)(value)?;
            Some(Claim::new(category, value))
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Find a rule by name.
pub fn rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.name == name)
}

/// Interface if the final segment ends with the interface suffix, else class.
pub fn qualified_name_category(value: &str) -> Option<ClaimCategory> {
    let last = value.rsplit('\\').next().unwrap_or(value);
    if last.ends_with(INTERFACE_SUFFIX) {
        Some(ClaimCategory::Interface)
    } else {
        Some(ClaimCategory::Class)
    }
}

pub fn accept_method(value: &str) -> Option<ClaimCategory> {
    if value.len() <= 2 || METHOD_KEYWORDS.contains(value) {
        return None;
    }
    Some(ClaimCategory::Method)
}

/// snake_case alone is too permissive, so events also need a domain keyword.
pub fn accept_event(value: &str) -> Option<ClaimCategory> {
    if !value.contains('_') || EVENT_DENYLIST.contains(value) {
        return None;
    }
    if !EVENT_KEYWORDS.iter().any(|k| value.contains(k)) {
        return None;
    }
    Some(ClaimCategory::Event)
}

/// Tables, ACL resources and file paths have no exclusions beyond their pattern.
pub fn accept_table(_value: &str) -> Option<ClaimCategory> {
    Some(ClaimCategory::Table)
}

pub fn accept_acl_resource(_value: &str) -> Option<ClaimCategory> {
    Some(ClaimCategory::AclResource)
}

pub fn accept_file_path(_value: &str) -> Option<ClaimCategory> {
    Some(ClaimCategory::FilePath)
}

pub fn accept_config_path(value: &str) -> Option<ClaimCategory> {
    if !value.contains('/') || value.starts_with("http") {
        return None;
    }
    Some(ClaimCategory::ConfigPath)
}
