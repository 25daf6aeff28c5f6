// Expansion rules, their configuration, and the order that decides which
// rule wins when several match at once.

use std::cmp::Ordering;
use std::fmt;

use crate::character::simple_lower;

/// Index of a rule within one rule generation. Rule sets are replaced
/// wholesale, so an id is only meaningful against the generation it was
/// issued for.
pub type RuleId = usize;

/// Error raised by a lazy expansion output callback.
///
/// Captured locally by the session layer and reported as "no output";
/// it never propagates into the matching loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expansion output failed: {0}")]
pub struct OutputError(pub String);

impl OutputError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Error type for rule-set validation.
///
/// Validation is all-or-nothing: a single bad entry rejects the whole rule
/// set rather than partially applying it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A rule with an empty abbreviation can never be typed.
    #[error("rule has an empty abbreviation")]
    EmptyAbbreviation,
}

/// Zero-argument callback producing expansion text at trigger time.
pub type OutputFn = Box<dyn Fn() -> Result<String, OutputError>>;

/// The replacement a rule produces: fixed text, or a callback evaluated
/// lazily each time the rule fires.
pub enum Output {
    Static(String),
    Lazy(OutputFn),
}

impl Output {
    /// Materialize the output text. `Static` always succeeds; `Lazy`
    /// surfaces whatever its callback returns.
    pub fn evaluate(&self) -> Result<String, OutputError> {
        match self {
            Output::Static(text) => Ok(text.clone()),
            Output::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Output::Lazy(_) => f.debug_tuple("Lazy").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Static(text.to_string())
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Static(text)
    }
}

/// Default values applied to flags a [`RuleConfig`] leaves unset.
///
/// `reset_recognizer` is deliberately a field rather than a constant:
/// observed deployments of this kind of engine disagree on its default, so
/// the host picks one here instead of inheriting a hard-coded contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDefaults {
    pub backspace: bool,
    pub case_sensitive: bool,
    pub internal: bool,
    pub match_case: bool,
    pub priority: i32,
    pub reset_recognizer: bool,
    pub send_completion_key: bool,
    pub wait_for_completion_key: bool,
}

impl Default for RuleDefaults {
    fn default() -> Self {
        Self {
            backspace: true,
            case_sensitive: false,
            internal: false,
            match_case: true,
            priority: 0,
            reset_recognizer: false,
            send_completion_key: true,
            wait_for_completion_key: true,
        }
    }
}

/// Per-rule configuration: an output plus optional flag overrides.
///
/// Unset flags take their value from [`RuleDefaults`] when the rule is
/// constructed. The abbreviation itself is not part of the config; it is
/// the key of the rule table and is injected at construction time.
#[derive(Debug)]
pub struct RuleConfig {
    pub output: Output,
    pub backspace: Option<bool>,
    pub case_sensitive: Option<bool>,
    pub internal: Option<bool>,
    pub match_case: Option<bool>,
    pub priority: Option<i32>,
    pub reset_recognizer: Option<bool>,
    pub send_completion_key: Option<bool>,
    pub wait_for_completion_key: Option<bool>,
}

impl RuleConfig {
    pub fn new(output: impl Into<Output>) -> Self {
        Self {
            output: output.into(),
            backspace: None,
            case_sensitive: None,
            internal: None,
            match_case: None,
            priority: None,
            reset_recognizer: None,
            send_completion_key: None,
            wait_for_completion_key: None,
        }
    }

    pub fn internal(mut self, value: bool) -> Self {
        self.internal = Some(value);
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = Some(value);
        self
    }

    pub fn wait_for_completion_key(mut self, value: bool) -> Self {
        self.wait_for_completion_key = Some(value);
        self
    }

    pub fn match_case(mut self, value: bool) -> Self {
        self.match_case = Some(value);
        self
    }

    pub fn backspace(mut self, value: bool) -> Self {
        self.backspace = Some(value);
        self
    }

    pub fn send_completion_key(mut self, value: bool) -> Self {
        self.send_completion_key = Some(value);
        self
    }

    pub fn reset_recognizer(mut self, value: bool) -> Self {
        self.reset_recognizer = Some(value);
        self
    }

    pub fn priority(mut self, value: i32) -> Self {
        self.priority = Some(value);
        self
    }
}

/// One configured abbreviation-to-output mapping.
///
/// Immutable after construction; a rule lives for the lifetime of one trie
/// generation and is replaced wholesale on reconfiguration.
#[derive(Debug)]
pub struct Rule {
    /// The typed character sequence that triggers this rule. Never empty.
    pub abbreviation: Vec<char>,
    /// The replacement text or callback.
    pub output: Output,
    /// May match mid-word, not just after a word boundary.
    pub internal: bool,
    /// Require a terminating boundary character before firing.
    pub wait_for_completion_key: bool,
    /// Match the abbreviation exactly as typed.
    pub case_sensitive: bool,
    /// Transform the output casing to mirror the typed trigger.
    pub match_case: bool,
    /// Erase the typed abbreviation before inserting the output.
    pub backspace: bool,
    /// Re-emit the boundary character that triggered completion.
    pub send_completion_key: bool,
    /// Force a full recognizer reset after firing.
    pub reset_recognizer: bool,
    /// Explicit tie-break; higher wins.
    pub priority: i32,
}

impl Rule {
    /// Build a rule from a table key and its configuration, filling unset
    /// flags from `defaults`.
    pub fn from_config(
        abbreviation: &str,
        config: RuleConfig,
        defaults: &RuleDefaults,
    ) -> Result<Self, ConfigError> {
        let chars: Vec<char> = abbreviation.chars().collect();
        if chars.is_empty() {
            return Err(ConfigError::EmptyAbbreviation);
        }
        Ok(Self {
            abbreviation: chars,
            output: config.output,
            internal: config.internal.unwrap_or(defaults.internal),
            wait_for_completion_key: config
                .wait_for_completion_key
                .unwrap_or(defaults.wait_for_completion_key),
            case_sensitive: config.case_sensitive.unwrap_or(defaults.case_sensitive),
            match_case: config.match_case.unwrap_or(defaults.match_case),
            backspace: config.backspace.unwrap_or(defaults.backspace),
            send_completion_key: config
                .send_completion_key
                .unwrap_or(defaults.send_completion_key),
            reset_recognizer: config.reset_recognizer.unwrap_or(defaults.reset_recognizer),
            priority: config.priority.unwrap_or(defaults.priority),
        })
    }

    /// The abbreviation with every character lower-cased, as inserted into
    /// a case-insensitive trie.
    pub fn folded_abbreviation(&self) -> Vec<char> {
        self.abbreviation.iter().map(|&c| simple_lower(c)).collect()
    }

    /// The abbreviation as a string, for messages and diagnostics.
    pub fn abbreviation_string(&self) -> String {
        self.abbreviation.iter().collect()
    }
}

/// Non-fatal configuration defect surfaced during trie or automaton
/// construction. Reported instead of logged so the host decides what to
/// do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Diagnostic for two rules the documented order cannot distinguish.
    pub fn ambiguous_rules(winner: &Rule, loser: &Rule) -> Self {
        Self::new(format!(
            "rules \"{}\" and \"{}\" are indistinguishable; \"{}\" wins by the deterministic fallback",
            winner.abbreviation_string(),
            loser.abbreviation_string(),
            winner.abbreviation_string(),
        ))
    }
}

/// Compare two rules by the documented resolution order. `Greater` wins.
///
/// In order: explicit priority (higher wins), abbreviation length (longer
/// wins), word-boundary over internal, case-sensitive over
/// case-insensitive. `Equal` means the pair is ambiguous under this order
/// and a deterministic fallback must decide.
pub fn compare_rules(a: &Rule, b: &Rule) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then(a.abbreviation.len().cmp(&b.abbreviation.len()))
        .then((!a.internal).cmp(&!b.internal))
        .then(a.case_sensitive.cmp(&b.case_sensitive))
}

/// Pick the winner between two candidate rules.
///
/// Returns the winning id and whether the pair was ambiguous under
/// [`compare_rules`]. Ambiguous pairs fall back to lexicographic
/// abbreviation order, then to the lower insertion index, so the result is
/// deterministic even when the configuration is defective.
pub fn pick_winner(rules: &[Rule], a: RuleId, b: RuleId) -> (RuleId, bool) {
    match compare_rules(&rules[a], &rules[b]) {
        Ordering::Greater => (a, false),
        Ordering::Less => (b, false),
        Ordering::Equal => {
            let winner = match rules[a].abbreviation.cmp(&rules[b].abbreviation) {
                Ordering::Less => a,
                Ordering::Greater => b,
                Ordering::Equal => a.min(b),
            };
            (winner, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(abbrev: &str, config: RuleConfig) -> Rule {
        Rule::from_config(abbrev, config, &RuleDefaults::default()).unwrap()
    }

    // =========================================================================
    // Construction and defaults
    // =========================================================================

    #[test]
    fn defaults_applied_to_unset_flags() {
        let r = rule("brb", RuleConfig::new("be right back"));
        assert!(r.backspace);
        assert!(!r.case_sensitive);
        assert!(!r.internal);
        assert!(r.match_case);
        assert_eq!(r.priority, 0);
        assert!(!r.reset_recognizer);
        assert!(r.send_completion_key);
        assert!(r.wait_for_completion_key);
    }

    #[test]
    fn config_overrides_defaults() {
        let r = rule(
            "brb",
            RuleConfig::new("x")
                .internal(true)
                .case_sensitive(true)
                .wait_for_completion_key(false)
                .priority(7),
        );
        assert!(r.internal);
        assert!(r.case_sensitive);
        assert!(!r.wait_for_completion_key);
        assert_eq!(r.priority, 7);
    }

    #[test]
    fn custom_defaults_respected() {
        let defaults = RuleDefaults {
            reset_recognizer: true,
            ..RuleDefaults::default()
        };
        let r = Rule::from_config("brb", RuleConfig::new("x"), &defaults).unwrap();
        assert!(r.reset_recognizer);
    }

    #[test]
    fn empty_abbreviation_rejected() {
        let err = Rule::from_config("", RuleConfig::new("x"), &RuleDefaults::default());
        assert_eq!(err.unwrap_err(), ConfigError::EmptyAbbreviation);
    }

    #[test]
    fn folded_abbreviation_lowercases() {
        let r = rule("BrB", RuleConfig::new("x"));
        assert_eq!(r.folded_abbreviation(), vec!['b', 'r', 'b']);
        assert_eq!(r.abbreviation, vec!['B', 'r', 'B']);
    }

    // =========================================================================
    // Output variants
    // =========================================================================

    #[test]
    fn static_output_evaluates_to_text() {
        let out = Output::Static("hello".to_string());
        assert_eq!(out.evaluate().unwrap(), "hello");
    }

    #[test]
    fn lazy_output_invoked_at_evaluation_time() {
        let out = Output::Lazy(Box::new(|| Ok("computed".to_string())));
        assert_eq!(out.evaluate().unwrap(), "computed");
    }

    #[test]
    fn lazy_output_error_surfaces() {
        let out = Output::Lazy(Box::new(|| Err(OutputError::new("boom"))));
        assert_eq!(out.evaluate().unwrap_err(), OutputError::new("boom"));
    }

    #[test]
    fn output_debug_does_not_panic_on_lazy() {
        let out = Output::Lazy(Box::new(|| Ok(String::new())));
        assert!(format!("{out:?}").contains("Lazy"));
    }

    // =========================================================================
    // Priority order
    // =========================================================================

    #[test]
    fn explicit_priority_beats_length() {
        let short = rule("a", RuleConfig::new("1").priority(5));
        let long = rule("aaa", RuleConfig::new("3"));
        assert_eq!(compare_rules(&short, &long), Ordering::Greater);
    }

    #[test]
    fn longer_abbreviation_wins_at_equal_priority() {
        let short = rule("aa", RuleConfig::new("2"));
        let long = rule("aaa", RuleConfig::new("3"));
        assert_eq!(compare_rules(&long, &short), Ordering::Greater);
    }

    #[test]
    fn word_boundary_beats_internal() {
        let boundary = rule("abc", RuleConfig::new("b"));
        let internal = rule("xyz", RuleConfig::new("i").internal(true));
        assert_eq!(compare_rules(&boundary, &internal), Ordering::Greater);
    }

    #[test]
    fn case_sensitive_beats_case_insensitive() {
        let sensitive = rule("abc", RuleConfig::new("s").case_sensitive(true));
        let insensitive = rule("xyz", RuleConfig::new("i"));
        assert_eq!(compare_rules(&sensitive, &insensitive), Ordering::Greater);
    }

    #[test]
    fn identical_rules_compare_equal() {
        let a = rule("abc", RuleConfig::new("1"));
        let b = rule("abc", RuleConfig::new("2"));
        assert_eq!(compare_rules(&a, &b), Ordering::Equal);
    }

    // =========================================================================
    // pick_winner
    // =========================================================================

    #[test]
    fn pick_winner_unambiguous() {
        let rules = vec![
            rule("aa", RuleConfig::new("2")),
            rule("aaa", RuleConfig::new("3")),
        ];
        assert_eq!(pick_winner(&rules, 0, 1), (1, false));
        assert_eq!(pick_winner(&rules, 1, 0), (1, false));
    }

    #[test]
    fn pick_winner_ambiguous_same_abbreviation() {
        let rules = vec![
            rule("abc", RuleConfig::new("1")),
            rule("abc", RuleConfig::new("2")),
        ];
        // Same abbreviation, same flags: insertion order decides.
        assert_eq!(pick_winner(&rules, 0, 1), (0, true));
        assert_eq!(pick_winner(&rules, 1, 0), (0, true));
    }

    #[test]
    fn pick_winner_ambiguous_lexicographic_fallback() {
        let rules = vec![
            rule("zz", RuleConfig::new("1")),
            rule("aa", RuleConfig::new("2")),
        ];
        // Equal under the documented order; "aa" < "zz" lexicographically.
        assert_eq!(pick_winner(&rules, 0, 1), (1, true));
    }

    #[test]
    fn ambiguous_diagnostic_names_both_rules() {
        let a = rule("abc", RuleConfig::new("1"));
        let b = rule("abc", RuleConfig::new("2"));
        let diag = Diagnostic::ambiguous_rules(&a, &b);
        assert!(diag.message.contains("abc"));
        assert!(diag.message.contains("indistinguishable"));
    }
}
