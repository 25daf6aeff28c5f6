// The expander: rule-set lifecycle, keystroke handling, and expansion
// resolution against the buffered input.

use std::collections::BTreeMap;

use snipkey_automaton::manager::{EngineKind, ManagerOptions, StateManager};
use snipkey_automaton::walker::MatchCandidate;
use snipkey_core::case::{apply_trigger_case, detect_case};
use snipkey_core::character::EndChars;
use snipkey_core::rule::{
    ConfigError, Diagnostic, OutputError, Rule, RuleConfig, RuleDefaults, RuleId,
};

use crate::buffer::InputBuffer;

/// Construction options for an [`Expander`].
#[derive(Debug, Clone)]
pub struct ExpanderOptions {
    pub end_chars: EndChars,
    /// Undo depth: how many `handle_delete` calls restore exact state.
    pub history_depth: usize,
    pub engine: EngineKind,
    /// Defaults applied to flags a rule config leaves unset.
    pub defaults: RuleDefaults,
}

impl Default for ExpanderOptions {
    fn default() -> Self {
        Self {
            end_chars: EndChars::default(),
            history_depth: 20,
            engine: EngineKind::default(),
            defaults: RuleDefaults::default(),
        }
    }
}

/// Everything a host needs to carry out one expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpansion {
    pub rule: RuleId,
    /// The characters as typed, including the completion key when one
    /// triggered the match.
    pub trigger: String,
    /// The output text, with any match-case transformation applied.
    pub output: String,
    /// How many characters the host must erase before inserting the
    /// output. Zero when the rule disables backspacing.
    pub backspace_count: usize,
    /// Whether the completion key should be re-delivered after the output.
    pub send_completion_key: bool,
    /// The completion key that triggered the match, if one did.
    pub completion_char: Option<char>,
    /// True when the triggering key event must reach the host before the
    /// synthesized output is applied.
    pub deferred: bool,
}

/// One matching session: a rule set, the automaton built from it, and a
/// bounded buffer of recent input.
///
/// Single-owner and synchronous. Rule sets are replaced by constructing a
/// new expander, never mutated in place.
pub struct Expander {
    manager: StateManager,
    buffer: InputBuffer,
    last_output_error: Option<OutputError>,
}

impl std::fmt::Debug for Expander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expander")
            .field("rules", &self.manager.rules().len())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl Expander {
    /// Validate a rule table and build the matching machinery.
    ///
    /// Validation is all-or-nothing: any invalid entry rejects the whole
    /// table. An empty table is valid and simply never matches.
    /// Non-fatal defects (indistinguishable priority ties) come back as
    /// diagnostics alongside the expander.
    pub fn new(
        rules: BTreeMap<String, RuleConfig>,
        options: &ExpanderOptions,
    ) -> Result<(Self, Vec<Diagnostic>), ConfigError> {
        let rules: Vec<Rule> = rules
            .into_iter()
            .map(|(abbrev, config)| Rule::from_config(&abbrev, config, &options.defaults))
            .collect::<Result<_, _>>()?;

        let manager = StateManager::new(
            rules,
            &ManagerOptions {
                end_chars: options.end_chars.clone(),
                history_depth: options.history_depth,
                engine: options.engine,
            },
        );
        let diagnostics = manager.diagnostics().to_vec();
        // One extra slot so a trigger can be read back together with its
        // completion key.
        let buffer = InputBuffer::new(manager.longest_abbreviation() + 1);

        Ok((
            Self {
                manager,
                buffer,
                last_output_error: None,
            },
            diagnostics,
        ))
    }

    /// Feed one typed character; returns the expansion to perform, if the
    /// keystroke completed one.
    pub fn handle_character(&mut self, c: char) -> Option<ResolvedExpansion> {
        self.buffer.push(c);
        let candidate = self.manager.follow_edge(c)?;
        self.resolve(c, candidate)
    }

    /// The user pressed backspace: forget the last character.
    pub fn handle_delete(&mut self) {
        self.buffer.pop();
        self.manager.rewind();
    }

    /// Forget all typed input. Also the entry point for a host-side
    /// inactivity timer; the timer itself lives outside this crate.
    pub fn handle_reset(&mut self) {
        self.buffer.clear();
        self.manager.reset();
    }

    /// Take the most recent lazy-output failure, if any. A failed callback
    /// suppresses its expansion; the typed text is left untouched.
    pub fn take_output_error(&mut self) -> Option<OutputError> {
        self.last_output_error.take()
    }

    pub fn rules(&self) -> &[Rule] {
        self.manager.rules()
    }

    fn resolve(&mut self, c: char, candidate: MatchCandidate) -> Option<ResolvedExpansion> {
        let rule = self.manager.rule(candidate.rule);
        let abbrev_len = rule.abbreviation.len();
        // A completed match consumed the completion key as well.
        let trigger_len = abbrev_len + usize::from(candidate.completed);
        let trigger_chars = self.buffer.last_n(trigger_len);

        let output = match rule.output.evaluate() {
            Ok(text) => text,
            Err(err) => {
                self.last_output_error = Some(err);
                return None;
            }
        };
        let output = if rule.match_case && !rule.case_sensitive {
            apply_trigger_case(&output, detect_case(&trigger_chars))
        } else {
            output
        };

        // A deferred trigger key reaches the host and must be erased along
        // with the abbreviation; a suppressed completion key never lands,
        // so only the abbreviation is erased.
        let deferred = !candidate.completed || rule.send_completion_key;
        let erase_len = abbrev_len + usize::from(candidate.completed && deferred);
        let resolved = ResolvedExpansion {
            rule: candidate.rule,
            trigger: trigger_chars.into_iter().collect(),
            output,
            backspace_count: if rule.backspace { erase_len } else { 0 },
            send_completion_key: rule.send_completion_key,
            completion_char: candidate.completed.then_some(c),
            deferred,
        };

        if rule.reset_recognizer {
            self.buffer.clear();
            self.manager.reset();
        }
        Some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipkey_core::rule::{Output, OutputFn};

    fn expander(rules: Vec<(&str, RuleConfig)>) -> Expander {
        let table: BTreeMap<String, RuleConfig> = rules
            .into_iter()
            .map(|(abbrev, config)| (abbrev.to_string(), config))
            .collect();
        Expander::new(table, &ExpanderOptions::default()).unwrap().0
    }

    fn type_str(expander: &mut Expander, text: &str) -> Vec<Option<ResolvedExpansion>> {
        text.chars().map(|c| expander.handle_character(c)).collect()
    }

    fn last(results: Vec<Option<ResolvedExpansion>>) -> Option<ResolvedExpansion> {
        results.into_iter().next_back().flatten()
    }

    // =========================================================================
    // Basic resolution
    // =========================================================================

    #[test]
    fn completion_expansion_includes_key_in_trigger() {
        let mut exp = expander(vec![("brb", RuleConfig::new("be right back"))]);
        let resolved = last(type_str(&mut exp, "brb ")).unwrap();
        assert_eq!(resolved.trigger, "brb ");
        assert_eq!(resolved.output, "be right back");
        assert_eq!(resolved.backspace_count, 4);
        assert_eq!(resolved.completion_char, Some(' '));
        assert!(resolved.send_completion_key);
        assert!(resolved.deferred);
    }

    #[test]
    fn immediate_expansion_has_no_completion_char() {
        let mut exp = expander(vec![(
            "sig",
            RuleConfig::new("regards").wait_for_completion_key(false),
        )]);
        let resolved = last(type_str(&mut exp, "sig")).unwrap();
        assert_eq!(resolved.trigger, "sig");
        assert_eq!(resolved.backspace_count, 3);
        assert_eq!(resolved.completion_char, None);
        assert!(resolved.deferred);
    }

    #[test]
    fn backspace_disabled_yields_zero_count() {
        let mut exp = expander(vec![("brb", RuleConfig::new("x").backspace(false))]);
        let resolved = last(type_str(&mut exp, "brb ")).unwrap();
        assert_eq!(resolved.backspace_count, 0);
    }

    #[test]
    fn suppressed_completion_key_is_not_deferred() {
        let mut exp = expander(vec![(
            "brb",
            RuleConfig::new("x").send_completion_key(false),
        )]);
        let resolved = last(type_str(&mut exp, "brb ")).unwrap();
        assert!(!resolved.send_completion_key);
        assert!(!resolved.deferred);
        // The suppressed key never reaches the host, so only the
        // abbreviation itself is erased.
        assert_eq!(resolved.backspace_count, 3);
    }

    #[test]
    fn no_match_returns_none() {
        let mut exp = expander(vec![("brb", RuleConfig::new("x"))]);
        assert!(type_str(&mut exp, "hello ").iter().all(Option::is_none));
    }

    // =========================================================================
    // Match-case transformation
    // =========================================================================

    #[test]
    fn all_upper_trigger_uppercases_output() {
        let mut exp = expander(vec![("brb", RuleConfig::new("be right back"))]);
        let resolved = last(type_str(&mut exp, "BRB ")).unwrap();
        assert_eq!(resolved.output, "BE RIGHT BACK");
    }

    #[test]
    fn first_upper_trigger_capitalizes_output() {
        let mut exp = expander(vec![("brb", RuleConfig::new("be right back"))]);
        let resolved = last(type_str(&mut exp, "Brb ")).unwrap();
        assert_eq!(resolved.output, "Be right back");
    }

    #[test]
    fn lower_trigger_leaves_output_untouched() {
        let mut exp = expander(vec![("mc", RuleConfig::new("ask McCoy"))]);
        let resolved = last(type_str(&mut exp, "mc ")).unwrap();
        assert_eq!(resolved.output, "ask McCoy");
    }

    #[test]
    fn match_case_disabled_keeps_configured_casing() {
        let mut exp = expander(vec![(
            "brb",
            RuleConfig::new("be right back").match_case(false),
        )]);
        let resolved = last(type_str(&mut exp, "BRB ")).unwrap();
        assert_eq!(resolved.output, "be right back");
    }

    #[test]
    fn case_sensitive_rule_skips_match_case() {
        let mut exp = expander(vec![(
            "BRB",
            RuleConfig::new("be right back").case_sensitive(true),
        )]);
        let resolved = last(type_str(&mut exp, "BRB ")).unwrap();
        assert_eq!(resolved.output, "be right back");
    }

    // =========================================================================
    // Lazy outputs
    // =========================================================================

    #[test]
    fn lazy_output_evaluated_per_trigger() {
        use std::cell::Cell;
        use std::rc::Rc;
        let count = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&count);
        let output: OutputFn = Box::new(move || {
            counter.set(counter.get() + 1);
            Ok(format!("call {}", counter.get()))
        });
        let mut exp = expander(vec![("n", RuleConfig::new(Output::Lazy(output)).internal(true))]);
        assert_eq!(last(type_str(&mut exp, "n ")).unwrap().output, "call 1");
        assert_eq!(last(type_str(&mut exp, "n ")).unwrap().output, "call 2");
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn lazy_output_failure_suppresses_expansion() {
        let output: OutputFn = Box::new(|| Err(OutputError::new("clipboard empty")));
        let mut exp = expander(vec![("x", RuleConfig::new(Output::Lazy(output)))]);
        assert!(last(type_str(&mut exp, "x ")).is_none());
        assert_eq!(
            exp.take_output_error(),
            Some(OutputError::new("clipboard empty"))
        );
        assert_eq!(exp.take_output_error(), None);
    }

    // =========================================================================
    // Delete / reset / reset_recognizer
    // =========================================================================

    #[test]
    fn delete_then_retype_matches() {
        let mut exp = expander(vec![("brb", RuleConfig::new("x"))]);
        type_str(&mut exp, "brx");
        exp.handle_delete();
        let resolved = last(type_str(&mut exp, "b ")).unwrap();
        assert_eq!(resolved.trigger, "brb ");
    }

    #[test]
    fn reset_forgets_partial_input() {
        let mut exp = expander(vec![("brb", RuleConfig::new("x"))]);
        type_str(&mut exp, "br");
        exp.handle_reset();
        assert!(last(type_str(&mut exp, "b ")).is_none());
        // A full retype after the reset matches normally.
        let resolved = last(type_str(&mut exp, "brb ")).unwrap();
        assert_eq!(resolved.rule, 0);
    }

    #[test]
    fn reset_recognizer_rule_clears_session_after_firing() {
        let mut exp = expander(vec![(
            "ss",
            RuleConfig::new("reset")
                .reset_recognizer(true)
                .wait_for_completion_key(false)
                .internal(true),
        )]);
        let resolved = last(type_str(&mut exp, "ss")).unwrap();
        assert_eq!(resolved.output, "reset");
        assert!(exp.buffer.is_empty());
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn empty_abbreviation_rejects_whole_table() {
        let mut table = BTreeMap::new();
        table.insert("ok".to_string(), RuleConfig::new("fine"));
        table.insert(String::new(), RuleConfig::new("bad"));
        let err = Expander::new(table, &ExpanderOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::EmptyAbbreviation);
    }

    #[test]
    fn empty_table_is_valid() {
        let (mut exp, diags) =
            Expander::new(BTreeMap::new(), &ExpanderOptions::default()).unwrap();
        assert!(diags.is_empty());
        assert!(type_str(&mut exp, "anything ").iter().all(Option::is_none));
    }

    #[test]
    fn custom_defaults_flow_into_rules() {
        let options = ExpanderOptions {
            defaults: RuleDefaults {
                wait_for_completion_key: false,
                ..RuleDefaults::default()
            },
            ..ExpanderOptions::default()
        };
        let mut table = BTreeMap::new();
        table.insert("ab".to_string(), RuleConfig::new("x"));
        let (mut exp, _) = Expander::new(table, &options).unwrap();
        // Fires without a completion key because the default changed.
        let resolved = exp
            .handle_character('a')
            .or_else(|| exp.handle_character('b'));
        assert!(resolved.is_some());
    }
}
