//! Compiled rewriting systems for wordfsa.
//!
//! A [`RewritingSystem`] is a frozen, dense automaton built from a set of
//! oriented rules. It is decoupled from the completion engine that found the
//! rules: once compiled it holds no references into the engine and can be
//! saved as a checksummed binary module ([`module`]) or as the JSON
//! serialized shape shared with the engine.

mod dump;
pub mod module;
mod system;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod system_tests;

pub use module::{Header, MAGIC, ModuleError, SECTION_ALIGN, SectionOffsets, VERSION};
pub use system::{BuildError, RewritingSystem, RuleId, StateId};
