//! The automaton: states, transitions and the conditions they test.
//!
//! # Module Organization
//!
//! - `cursor`: the position over the input plus captured slots
//! - `condition`: what a transition requires of the input (`Condition`,
//!   `Assertion`)
//! - `arena`: mutable state arena and fragment builders used by the compiler
//! - `compiled`: the frozen, renumbered `CompiledAutomaton` matchers run on
//! - `sparse_set`: ordered O(1)-clear state sets for the linear matcher

mod arena;
mod compiled;
mod condition;
mod cursor;
mod sparse_set;

pub use arena::{Fsm, State, StateArena, StateId, Transition};
pub use compiled::{Boundary, CaptureGroup, CompiledAutomaton};
pub(crate) use compiled::Parts;
pub use condition::{Assertion, Condition, ConditionResult};
pub use cursor::Cursor;
pub use sparse_set::SparseSet;

#[cfg(test)]
mod tests;
