// Serde rule-table format: JSON map from abbreviation to output.

use std::collections::BTreeMap;

use serde::Deserialize;

use snipkey_core::rule::RuleConfig;

/// One entry of a serialized rule table.
///
/// The short form is just the output text; the long form overrides any of
/// the rule flags:
///
/// ```json
/// {
///   "brb": "be right back",
///   "sig": { "output": "Kind regards,\nJo", "wait_for_completion_key": false }
/// }
/// ```
///
/// Serialized tables carry static outputs only; lazy outputs are built
/// programmatically.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Output(String),
    Table(RuleTableEntry),
}

/// The long form of a rule entry. Unset flags fall back to the expander's
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleTableEntry {
    pub output: String,
    #[serde(default)]
    pub backspace: Option<bool>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub internal: Option<bool>,
    #[serde(default)]
    pub match_case: Option<bool>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub reset_recognizer: Option<bool>,
    #[serde(default)]
    pub send_completion_key: Option<bool>,
    #[serde(default)]
    pub wait_for_completion_key: Option<bool>,
}

/// A deserialized rule table, keyed by abbreviation. `BTreeMap` keeps the
/// iteration order stable so rule IDs are reproducible across loads.
pub type RuleTable = BTreeMap<String, RuleEntry>;

impl From<RuleEntry> for RuleConfig {
    fn from(entry: RuleEntry) -> Self {
        match entry {
            RuleEntry::Output(output) => RuleConfig::new(output),
            RuleEntry::Table(table) => {
                let mut config = RuleConfig::new(table.output);
                config.backspace = table.backspace;
                config.case_sensitive = table.case_sensitive;
                config.internal = table.internal;
                config.match_case = table.match_case;
                config.priority = table.priority;
                config.reset_recognizer = table.reset_recognizer;
                config.send_completion_key = table.send_completion_key;
                config.wait_for_completion_key = table.wait_for_completion_key;
                config
            }
        }
    }
}

/// Convert a deserialized table into the configs the expander consumes.
pub fn rule_configs(table: RuleTable) -> BTreeMap<String, RuleConfig> {
    table
        .into_iter()
        .map(|(abbrev, entry)| (abbrev, entry.into()))
        .collect()
}
