//! Command names and labels derived from type names

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NameRule;

/// An upper-case letter that does not start a word
static INNER_CAPITAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\B([A-Z])").expect("valid regex literal"));

/// Cosmetic replacements applied to generated names
#[derive(Debug, Clone, Default)]
pub struct NameRules {
    rules: Vec<NameRule>,
}

impl NameRules {
    pub fn new(rules: Vec<NameRule>) -> Self {
        Self { rules }
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| acc.replace(&rule.from, &rule.to))
    }

    /// `AgeLength` -> `age\_length`
    pub fn command(&self, type_name: &str) -> String {
        let split = INNER_CAPITAL.replace_all(type_name, r"\_${1}");
        self.apply(&split.to_lowercase())
    }

    /// `AgeLength` -> `Age Length`
    pub fn label(&self, type_name: &str) -> String {
        let split = INNER_CAPITAL.replace_all(type_name, " ${1}");
        self.apply(&split)
    }
}
