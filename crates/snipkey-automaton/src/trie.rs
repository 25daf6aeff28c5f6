// Arena prefix tree over abbreviation character sequences, with
// Aho-Corasick suffix decoration for the direct-walk backend.

use std::collections::VecDeque;

use hashbrown::HashMap;

use snipkey_core::character::EndChars;
use snipkey_core::rule::{Diagnostic, Rule, RuleId, pick_winner};

use crate::counter::Counter;

/// Index of a node in the trie arena. Dense and unique within one trie
/// generation.
pub type NodeId = usize;

/// The arena root. It doubles as the root of the internal (mid-word)
/// subtree: an internal abbreviation may start anywhere, so the matching
/// layers treat this node as always active.
pub const INTERNAL_ROOT: NodeId = 0;

/// Edge label in the trie: a literal code point or one of two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    Char(char),
    /// Edge from the arena root to the subtree of abbreviations that must
    /// start at a word boundary.
    WordBoundary,
    /// Terminal edge for rules that wait for a completion key.
    Completion,
}

/// One construction-time prefix state.
#[derive(Debug, Default)]
pub struct TrieNode {
    /// Outgoing edges. Children are exclusively owned by this node.
    pub(crate) transitions: HashMap<EdgeLabel, NodeId>,
    /// Rules terminating exactly at this node.
    pub(crate) rules: Vec<RuleId>,
    /// Longest strict suffix of this node's path that is itself a node.
    /// Set by decoration; never points to a deeper node.
    pub(crate) suffix: Option<NodeId>,
    /// Nearest suffix ancestor carrying a resolved expansion.
    pub(crate) next_expansion: Option<NodeId>,
    /// Highest-priority rule reachable from this node via itself or its
    /// suffix chain. Set by decoration.
    pub(crate) expansion: Option<RuleId>,
    /// Incoming edge label (None for the root).
    pub(crate) label: Option<EdgeLabel>,
    /// Parent node (None for the root).
    pub(crate) parent: Option<NodeId>,
}

/// Prefix tree over one case partition's abbreviations.
///
/// A single arena holds both subtrees: node 0 is the internal root, and
/// its child under [`EdgeLabel::WordBoundary`] roots the word-boundary
/// abbreviations. Rule IDs stored in nodes index the full rule slice the
/// trie was built from, not the partition.
#[derive(Debug)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    word_boundary_root: NodeId,
    decorated: bool,
}

impl Trie {
    /// Build the trie for the partition given by `members` (indices into
    /// `rules`). When `fold_case` is set, abbreviations are lower-cased
    /// before insertion (the case-insensitive partition).
    ///
    /// Rules sharing an abbreviation and flags land on the same node; both
    /// become candidates, and a diagnostic is recorded when the resolution
    /// order cannot tell them apart.
    pub fn build(rules: &[Rule], members: &[RuleId], fold_case: bool) -> (Self, Vec<Diagnostic>) {
        let mut counter = Counter::new();
        let mut trie = Self {
            nodes: Vec::new(),
            word_boundary_root: 0,
            decorated: false,
        };

        let root = trie.alloc(&mut counter, None, None);
        debug_assert_eq!(root, INTERNAL_ROOT);
        trie.word_boundary_root = trie.child_or_insert(&mut counter, root, EdgeLabel::WordBoundary);

        let mut diagnostics = Vec::new();
        for &rule_id in members {
            let rule = &rules[rule_id];
            let chars = if fold_case {
                rule.folded_abbreviation()
            } else {
                rule.abbreviation.clone()
            };

            let mut node = if rule.internal {
                INTERNAL_ROOT
            } else {
                trie.word_boundary_root
            };
            for c in chars {
                node = trie.child_or_insert(&mut counter, node, EdgeLabel::Char(c));
            }
            if rule.wait_for_completion_key {
                node = trie.child_or_insert(&mut counter, node, EdgeLabel::Completion);
            }

            for &existing in &trie.nodes[node].rules {
                let (winner, ambiguous) = pick_winner(rules, existing, rule_id);
                if ambiguous {
                    let loser = if winner == existing { rule_id } else { existing };
                    diagnostics.push(Diagnostic::ambiguous_rules(&rules[winner], &rules[loser]));
                }
            }
            trie.nodes[node].rules.push(rule_id);
        }

        (trie, diagnostics)
    }

    fn alloc(
        &mut self,
        counter: &mut Counter,
        parent: Option<NodeId>,
        label: Option<EdgeLabel>,
    ) -> NodeId {
        let id = counter.next();
        debug_assert_eq!(id, self.nodes.len());
        self.nodes.push(TrieNode {
            parent,
            label,
            ..TrieNode::default()
        });
        id
    }

    fn child_or_insert(&mut self, counter: &mut Counter, node: NodeId, label: EdgeLabel) -> NodeId {
        if let Some(&child) = self.nodes[node].transitions.get(&label) {
            return child;
        }
        let child = self.alloc(counter, Some(node), Some(label));
        self.nodes[node].transitions.insert(label, child);
        child
    }

    /// Decorate the trie with Aho-Corasick suffix links and resolved
    /// expansions, breadth-first so every link points at an already
    /// decorated (strictly shallower) node.
    ///
    /// For each node, `suffix` is found by walking the parent's suffix
    /// chain for a child under the incoming label, skipping a self-match.
    /// A node with no suffix match anywhere falls back to the word-boundary
    /// root when its incoming label is an end character (an end char can
    /// always re-enter a fresh word), and to the internal root otherwise.
    pub fn decorate(&mut self, rules: &[Rule], end_chars: &EndChars) {
        for node in self.bfs_order() {
            if node == INTERNAL_ROOT {
                continue;
            }
            let parent = self.nodes[node].parent.expect("non-root node has a parent");
            let label = self.nodes[node].label.expect("non-root node has a label");

            let mut suffix = None;
            let mut candidate = self.nodes[parent].suffix;
            while let Some(s) = candidate {
                match self.nodes[s].transitions.get(&label) {
                    // A match that is this very node is a self-loop via the
                    // top; treat it as no match and keep climbing.
                    Some(&child) if child != node => {
                        suffix = Some(child);
                        break;
                    }
                    _ => candidate = self.nodes[s].suffix,
                }
            }
            let suffix = suffix.unwrap_or(match label {
                EdgeLabel::Char(c) if end_chars.contains(c) => self.word_boundary_root,
                _ => INTERNAL_ROOT,
            });
            self.nodes[node].suffix = Some(suffix);

            self.nodes[node].next_expansion = if self.nodes[suffix].expansion.is_some() {
                Some(suffix)
            } else {
                self.nodes[suffix].next_expansion
            };

            let mut best = self
                .nodes[node]
                .next_expansion
                .and_then(|n| self.nodes[n].expansion);
            for &rule_id in &self.nodes[node].rules {
                best = Some(match best {
                    None => rule_id,
                    Some(current) => pick_winner(rules, rule_id, current).0,
                });
            }
            self.nodes[node].expansion = best;
        }
        self.decorated = true;
    }

    fn bfs_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        queue.push_back(INTERNAL_ROOT);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &child in self.nodes[node].transitions.values() {
                queue.push_back(child);
            }
        }
        order
    }

    /// Follow one character from `from`, using suffix links on failure.
    ///
    /// When no edge matches anywhere up the suffix chain, an end character
    /// (`is_end`) lands on the word-boundary root (a fresh start) and
    /// anything else on the internal root, so internal matches can restart.
    /// Requires a decorated trie.
    pub fn follow(&self, from: NodeId, c: char, is_end: bool) -> NodeId {
        debug_assert!(self.decorated);
        let label = EdgeLabel::Char(c);
        let mut current = Some(from);
        while let Some(node) = current {
            if let Some(&child) = self.nodes[node].transitions.get(&label) {
                return child;
            }
            current = self.nodes[node].suffix;
        }
        if is_end { self.word_boundary_root } else { INTERNAL_ROOT }
    }

    /// Resolved expansion of the nearest completion node reachable from
    /// `node` or its suffix chain, if any. This is the lookup performed
    /// when an end character arrives. Requires a decorated trie.
    pub fn completion_expansion(&self, node: NodeId) -> Option<RuleId> {
        debug_assert!(self.decorated);
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(&completion) = self.nodes[n].transitions.get(&EdgeLabel::Completion) {
                return self.nodes[completion].expansion;
            }
            current = self.nodes[n].suffix;
        }
        None
    }

    /// Resolved expansion of a node (requires decoration).
    pub fn expansion(&self, node: NodeId) -> Option<RuleId> {
        self.nodes[node].expansion
    }

    pub fn word_boundary_root(&self) -> NodeId {
        self.word_boundary_root
    }

    pub fn is_decorated(&self) -> bool {
        self.decorated
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }
}
