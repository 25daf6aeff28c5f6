// Multi-partition coordinator: one walker per case-sensitivity partition,
// advanced in lock-step.

use snipkey_core::character::EndChars;
use snipkey_core::rule::{Diagnostic, Rule, RuleId, compare_rules, pick_winner};

use crate::dfa::Automaton;
use crate::trie::Trie;
use crate::walker::{DfaWalker, MatchCandidate, MatchEngine, TrieWalker};

/// Which matching backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Compiled transition table. Larger up-front cost, flat per-keystroke
    /// work.
    #[default]
    Dfa,
    /// Direct walk over the decorated trie.
    Trie,
}

/// Construction options for [`StateManager`].
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub end_chars: EndChars,
    /// Undo depth per partition; rewinds past this restore the start state.
    pub history_depth: usize,
    pub engine: EngineKind,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            end_chars: EndChars::default(),
            history_depth: 20,
            engine: EngineKind::default(),
        }
    }
}

/// Drives all partitions over one keystroke stream.
///
/// Case-sensitive rules match against exact characters; case-insensitive
/// rules against lower-folded ones. Each group gets its own walker, and a
/// keystroke is fed to all of them; when several report a match, the usual
/// rule order decides the winner.
pub struct StateManager {
    rules: Vec<Rule>,
    partitions: Vec<Box<dyn MatchEngine>>,
    diagnostics: Vec<Diagnostic>,
    longest_abbreviation: usize,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("rules", &self.rules.len())
            .field("partitions", &self.partitions.len())
            .finish()
    }
}

impl StateManager {
    pub fn new(rules: Vec<Rule>, options: &ManagerOptions) -> Self {
        let mut diagnostics = Vec::new();
        let mut partitions: Vec<Box<dyn MatchEngine>> = Vec::new();

        for fold_case in [false, true] {
            let members: Vec<RuleId> = rules
                .iter()
                .enumerate()
                .filter(|(_, r)| r.case_sensitive != fold_case)
                .map(|(id, _)| id)
                .collect();
            if members.is_empty() {
                continue;
            }

            let (mut trie, mut diags) = Trie::build(&rules, &members, fold_case);
            trie.decorate(&rules, &options.end_chars);
            diagnostics.append(&mut diags);

            partitions.push(match options.engine {
                EngineKind::Dfa => {
                    let (automaton, mut diags) =
                        Automaton::compile(&trie, &rules, &options.end_chars);
                    diagnostics.append(&mut diags);
                    Box::new(DfaWalker::new(
                        automaton,
                        fold_case,
                        options.end_chars.clone(),
                        options.history_depth,
                    ))
                }
                EngineKind::Trie => Box::new(TrieWalker::new(
                    trie,
                    fold_case,
                    options.end_chars.clone(),
                    options.history_depth,
                )) as Box<dyn MatchEngine>,
            });
        }

        let longest_abbreviation = rules
            .iter()
            .map(|r| r.abbreviation.len())
            .max()
            .unwrap_or(0);

        Self {
            rules,
            partitions,
            diagnostics,
            longest_abbreviation,
        }
    }

    /// Advance every partition by one keystroke and return the winning
    /// match, if any.
    pub fn follow_edge(&mut self, c: char) -> Option<MatchCandidate> {
        let mut winner: Option<MatchCandidate> = None;
        for partition in &mut self.partitions {
            let Some(candidate) = partition.follow_edge(c) else {
                continue;
            };
            winner = Some(match winner {
                None => candidate,
                Some(current) if current.rule == candidate.rule => current,
                Some(current) => {
                    match compare_rules(&self.rules[candidate.rule], &self.rules[current.rule]) {
                        std::cmp::Ordering::Greater => candidate,
                        std::cmp::Ordering::Less => current,
                        std::cmp::Ordering::Equal => {
                            // Construction already reported this ambiguity.
                            let (rule, _) = pick_winner(&self.rules, candidate.rule, current.rule);
                            if rule == candidate.rule { candidate } else { current }
                        }
                    }
                }
            });
        }
        winner
    }

    /// Undo the last keystroke in every partition.
    pub fn rewind(&mut self) {
        for partition in &mut self.partitions {
            partition.rewind();
        }
    }

    /// Forget all typed input in every partition.
    pub fn reset(&mut self) {
        for partition in &mut self.partitions {
            partition.reset();
        }
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Ambiguity diagnostics collected while building the partitions.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Length in characters of the longest registered abbreviation.
    pub fn longest_abbreviation(&self) -> usize {
        self.longest_abbreviation
    }
}
