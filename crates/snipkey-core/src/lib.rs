//! Shared leaf types for the snipkey abbreviation engine.
//!
//! This crate holds everything the matching engine and the session layer
//! have in common but that carries no automaton logic of its own:
//!
//! - [`rule`] -- expansion rules, their configuration defaults, the
//!   static/lazy output variant, and the priority order that decides which
//!   rule wins when several match at once
//! - [`case`] -- case-pattern detection and match-case output transformation
//! - [`character`] -- simple one-to-one case mapping and the configurable
//!   end-character (word boundary) set

pub mod case;
pub mod character;
pub mod rule;
