// Deterministic automaton compiled from the trie by subset construction.

use std::collections::{BTreeMap, VecDeque};

use hashbrown::HashMap;

use snipkey_core::character::EndChars;
use snipkey_core::rule::{Diagnostic, Rule, RuleId, pick_winner};

use crate::trie::{EdgeLabel, INTERNAL_ROOT, NodeId, Trie};

/// Index of a state in the compiled automaton.
pub type StateId = usize;

/// The start/reset state: nothing typed yet, or a word boundary just seen.
pub const WORD_BOUNDARY_STATE: StateId = 1;

/// The mid-word fallback state: only internal abbreviations can start here.
pub const INTERNAL_STATE: StateId = 2;

/// One compiled automaton state, identified by a deduplicated set of trie
/// nodes reachable simultaneously.
#[derive(Debug, Default)]
pub struct AutomatonState {
    /// Explicit character transitions.
    transitions: HashMap<char, StateId>,
    /// Highest-priority rule resolved for this exact state, if any.
    expansion: Option<RuleId>,
    /// Highest-priority completion-waiting rule reachable from this state
    /// via a completion edge, consulted when an end character arrives.
    completion: Option<RuleId>,
}

/// Deterministic transition table over one case partition.
///
/// Built once by [`Automaton::compile`] and immutable afterwards. State 0
/// is an unused placeholder so the two reserved IDs can stay fixed.
pub struct Automaton {
    states: Vec<AutomatonState>,
}

impl std::fmt::Debug for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("state_count", &self.states.len())
            .finish()
    }
}

impl Automaton {
    /// Compile the trie into a deterministic table.
    ///
    /// Classic worklist subset construction, treating the trie as an NFA in
    /// which the internal root is always active in parallel: every state's
    /// target set on a character also absorbs the internal root's child for
    /// that character, and end characters additionally fold in the
    /// word-boundary root so matching restarts cleanly after a boundary.
    ///
    /// Construction is deterministic: characters are expanded in sorted
    /// order and node sets are interned by their sorted ID vector, so the
    /// same trie always compiles to the same table. Requires a decorated
    /// trie (per-node expansions must be resolved).
    pub fn compile(trie: &Trie, rules: &[Rule], end_chars: &EndChars) -> (Self, Vec<Diagnostic>) {
        assert!(trie.is_decorated(), "automaton requires a decorated trie");

        let mut automaton = Self {
            states: vec![AutomatonState::default()],
        };
        let mut diagnostics = Vec::new();
        let mut interned: HashMap<Vec<NodeId>, StateId> = HashMap::new();
        let mut sets: Vec<Vec<NodeId>> = vec![Vec::new()];
        let mut worklist = VecDeque::new();

        let word_boundary = automaton.intern(
            vec![trie.word_boundary_root()],
            trie,
            rules,
            &mut interned,
            &mut sets,
            &mut worklist,
            &mut diagnostics,
        );
        let internal = automaton.intern(
            vec![INTERNAL_ROOT],
            trie,
            rules,
            &mut interned,
            &mut sets,
            &mut worklist,
            &mut diagnostics,
        );
        assert_eq!(word_boundary, WORD_BOUNDARY_STATE);
        assert_eq!(internal, INTERNAL_STATE);

        while let Some(state) = worklist.pop_front() {
            // Union of member transitions per character, in sorted order so
            // state numbering is reproducible.
            let members = sets[state].clone();
            let mut targets: BTreeMap<char, Vec<NodeId>> = BTreeMap::new();
            for &node in &members {
                for (&label, &child) in &trie.node(node).transitions {
                    if let EdgeLabel::Char(c) = label {
                        targets.entry(c).or_default().push(child);
                    }
                }
            }

            // Internal abbreviations can start anywhere: the internal root
            // runs in parallel with every state, so its edges join the
            // union even when no member shares them.
            for (&label, &child) in &trie.node(INTERNAL_ROOT).transitions {
                if let EdgeLabel::Char(c) = label {
                    targets.entry(c).or_default().push(child);
                }
            }
            for (&c, nodes) in &mut targets {
                if end_chars.contains(c) {
                    nodes.push(trie.word_boundary_root());
                }
            }

            for (c, nodes) in targets {
                let target = automaton.intern(
                    nodes,
                    trie,
                    rules,
                    &mut interned,
                    &mut sets,
                    &mut worklist,
                    &mut diagnostics,
                );
                automaton.states[state].transitions.insert(c, target);
            }
        }

        (automaton, diagnostics)
    }

    /// Deduplicate a node set by its canonical sorted key, creating and
    /// enqueueing a new state when the set has not been seen before.
    #[allow(clippy::too_many_arguments)]
    fn intern(
        &mut self,
        mut nodes: Vec<NodeId>,
        trie: &Trie,
        rules: &[Rule],
        interned: &mut HashMap<Vec<NodeId>, StateId>,
        sets: &mut Vec<Vec<NodeId>>,
        worklist: &mut VecDeque<StateId>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> StateId {
        nodes.sort_unstable();
        nodes.dedup();
        if let Some(&id) = interned.get(&nodes) {
            return id;
        }

        let id = self.states.len();
        let expansion = resolve(rules, diagnostics, nodes.iter().map(|&n| trie.expansion(n)));
        let completion = resolve(
            rules,
            diagnostics,
            nodes.iter().map(|&n| {
                trie.node(n)
                    .transitions
                    .get(&EdgeLabel::Completion)
                    .and_then(|&completion| trie.expansion(completion))
            }),
        );
        self.states.push(AutomatonState {
            transitions: HashMap::new(),
            expansion,
            completion,
        });
        interned.insert(nodes.clone(), id);
        sets.push(nodes);
        worklist.push_back(id);
        id
    }

    /// Explicit transition for a character, if the table has one.
    pub fn transition(&self, from: StateId, c: char) -> Option<StateId> {
        self.states[from].transitions.get(&c).copied()
    }

    /// Resolved expansion for a state.
    pub fn expansion(&self, state: StateId) -> Option<RuleId> {
        self.states[state].expansion
    }

    /// Resolved completion expansion for a state.
    pub fn completion(&self, state: StateId) -> Option<RuleId> {
        self.states[state].completion
    }

    /// Number of states, including the unused placeholder at index 0.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sorted character transitions of a state, for determinism checks and
    /// diagnostics.
    pub fn sorted_transitions(&self, state: StateId) -> Vec<(char, StateId)> {
        let mut entries: Vec<(char, StateId)> = self.states[state]
            .transitions
            .iter()
            .map(|(&c, &s)| (c, s))
            .collect();
        entries.sort_unstable();
        entries
    }
}

/// Pick the highest-priority rule among candidate expansions, recording a
/// diagnostic for pairs the documented order cannot distinguish.
fn resolve(
    rules: &[Rule],
    diagnostics: &mut Vec<Diagnostic>,
    candidates: impl Iterator<Item = Option<RuleId>>,
) -> Option<RuleId> {
    let mut best: Option<RuleId> = None;
    for candidate in candidates.flatten() {
        best = Some(match best {
            None => candidate,
            Some(current) if current == candidate => current,
            Some(current) => {
                let (winner, ambiguous) = pick_winner(rules, candidate, current);
                if ambiguous {
                    let loser = if winner == candidate { current } else { candidate };
                    diagnostics.push(Diagnostic::ambiguous_rules(&rules[winner], &rules[loser]));
                }
                winner
            }
        });
    }
    best
}
