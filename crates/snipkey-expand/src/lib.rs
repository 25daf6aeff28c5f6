//! Host-facing session layer for the snipkey abbreviation engine.
//!
//! A host (an editor plugin, a key-event loop, a test harness) owns an
//! [`expander::Expander`] and feeds it the character stream the user types.
//! The expander buffers recent input, drives the matching automaton, and on
//! a match hands back everything the host needs to perform the replacement:
//! the typed trigger, the resolved output text, how many characters to
//! erase, and whether the triggering key must be re-delivered.
//!
//! Rule tables can be built programmatically ([`snipkey_core::rule::RuleConfig`])
//! or deserialized from JSON ([`config`]).

pub mod buffer;
pub mod config;
pub mod expander;
