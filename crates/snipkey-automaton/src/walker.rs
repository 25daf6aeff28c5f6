// Stateful matching cursor, one keystroke at a time.

use snipkey_core::character::{EndChars, simple_lower};
use snipkey_core::rule::RuleId;

use crate::dfa::{Automaton, INTERNAL_STATE, StateId, WORD_BOUNDARY_STATE};
use crate::history::History;
use crate::trie::{NodeId, Trie};

/// A rule the walker recognized on the last keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    pub rule: RuleId,
    /// True when the rule waited for a completion key and the keystroke was
    /// one. False for rules that fire as soon as their last character is
    /// typed; such a match may still be superseded by a longer one.
    pub completed: bool,
}

/// One-keystroke-at-a-time matching over a single case partition.
///
/// The two implementations are observationally equivalent; one walks the
/// decorated trie directly, the other a compiled transition table.
pub trait MatchEngine {
    /// Advance by one typed character and report any match it produced.
    fn follow_edge(&mut self, c: char) -> Option<MatchCandidate>;

    /// Undo the last advance (a backspace). Past the recorded history this
    /// restores the start state.
    fn rewind(&mut self);

    /// Forget everything typed so far.
    fn reset(&mut self);
}

/// Shared keystroke handling for both backends.
///
/// An end character does double duty: it first completes any waiting match
/// reachable from the current position, then transitions. A completed match
/// sets the pending flag so the next keystroke starts from a fresh word
/// boundary instead of continuing a consumed abbreviation.
struct Cursor<S: Copy> {
    current: S,
    start: S,
    history: History<S>,
    pending_completion: bool,
    fold_case: bool,
    end_chars: EndChars,
}

impl<S: Copy> Cursor<S> {
    fn new(start: S, fold_case: bool, end_chars: EndChars, history_depth: usize) -> Self {
        Self {
            current: start,
            start,
            history: History::new(history_depth),
            pending_completion: false,
            fold_case,
            end_chars,
        }
    }

    fn follow_edge(
        &mut self,
        c: char,
        completion_at: impl Fn(S) -> Option<RuleId>,
        step: impl Fn(S, char, bool) -> S,
        expansion_at: impl Fn(S) -> Option<RuleId>,
    ) -> Option<MatchCandidate> {
        if self.pending_completion {
            self.current = self.start;
            self.pending_completion = false;
        }

        let c = if self.fold_case { simple_lower(c) } else { c };
        let is_end = self.end_chars.contains(c);
        let completion = if is_end {
            completion_at(self.current)
        } else {
            None
        };

        self.history.push(self.current);
        self.current = step(self.current, c, is_end);

        if let Some(rule) = completion {
            self.pending_completion = true;
            return Some(MatchCandidate {
                rule,
                completed: true,
            });
        }
        expansion_at(self.current).map(|rule| MatchCandidate {
            rule,
            completed: false,
        })
    }

    fn rewind(&mut self) {
        self.current = self.history.pop().unwrap_or(self.start);
        self.pending_completion = false;
    }

    fn reset(&mut self) {
        self.current = self.start;
        self.history.clear();
        self.pending_completion = false;
    }
}

/// Direct walk over the decorated trie.
pub struct TrieWalker {
    trie: Trie,
    cursor: Cursor<NodeId>,
}

impl TrieWalker {
    /// The trie must be decorated.
    pub fn new(trie: Trie, fold_case: bool, end_chars: EndChars, history_depth: usize) -> Self {
        assert!(trie.is_decorated(), "walker requires a decorated trie");
        let start = trie.word_boundary_root();
        Self {
            trie,
            cursor: Cursor::new(start, fold_case, end_chars, history_depth),
        }
    }
}

impl MatchEngine for TrieWalker {
    fn follow_edge(&mut self, c: char) -> Option<MatchCandidate> {
        let trie = &self.trie;
        self.cursor.follow_edge(
            c,
            |node| trie.completion_expansion(node),
            |node, c, is_end| trie.follow(node, c, is_end),
            |node| trie.expansion(node),
        )
    }

    fn rewind(&mut self) {
        self.cursor.rewind();
    }

    fn reset(&mut self) {
        self.cursor.reset();
    }
}

/// Walk over the compiled transition table.
pub struct DfaWalker {
    automaton: Automaton,
    cursor: Cursor<StateId>,
}

impl DfaWalker {
    pub fn new(
        automaton: Automaton,
        fold_case: bool,
        end_chars: EndChars,
        history_depth: usize,
    ) -> Self {
        Self {
            automaton,
            cursor: Cursor::new(WORD_BOUNDARY_STATE, fold_case, end_chars, history_depth),
        }
    }
}

impl MatchEngine for DfaWalker {
    fn follow_edge(&mut self, c: char) -> Option<MatchCandidate> {
        let automaton = &self.automaton;
        self.cursor.follow_edge(
            c,
            |state| automaton.completion(state),
            |state, c, is_end| {
                // The table folds the always-active internal root into every
                // state's transitions, so a miss means no pattern continues
                // anywhere: restart at the appropriate root.
                automaton.transition(state, c).unwrap_or(if is_end {
                    WORD_BOUNDARY_STATE
                } else {
                    INTERNAL_STATE
                })
            },
            |state| automaton.expansion(state),
        )
    }

    fn rewind(&mut self) {
        self.cursor.rewind();
    }

    fn reset(&mut self) {
        self.cursor.reset();
    }
}
