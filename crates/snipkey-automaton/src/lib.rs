//! Abbreviation-matching automaton core.
//!
//! This crate turns a set of expansion rules into a matching automaton and
//! drives it one keystroke at a time:
//!
//! - [`counter`] -- dense unique IDs for trie nodes within one generation
//! - [`trie`] -- arena prefix tree over abbreviation characters, with
//!   Aho-Corasick suffix decoration
//! - [`dfa`] -- subset-construction compilation of the trie into a
//!   deterministic transition table
//! - [`walker`] -- the stateful cursor: two interchangeable backends
//!   (decorated-trie walk and compiled-table walk) behind the
//!   [`walker::MatchEngine`] trait, with bounded undo history
//! - [`history`] -- the fixed-capacity undo ring used by the walkers
//! - [`manager`] -- the multi-partition coordinator running one walker per
//!   case-sensitivity partition in lock-step
//!
//! The automaton structures are immutable once built and may be shared
//! read-only; a walker is a single-owner mutable cursor.

pub mod counter;
pub mod dfa;
pub mod history;
pub mod manager;
pub mod trie;
pub mod walker;
