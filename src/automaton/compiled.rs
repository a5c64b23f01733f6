//! The frozen automaton handed to matchers.
//!
//! States are renumbered densely in breadth-first order from the start
//! state, so `StateId`s index straight into the transition table and the
//! per-state boundary table. Nothing here changes after compilation; a
//! `CompiledAutomaton` can be shared between threads and matchers freely.

use std::fmt::Write as _;

use crate::compiler::Symbols;

use super::arena::{StateId, Transition};

/// Where a capture group starts and ends in the compiled graph.
///
/// A quantified group compiled more than once (`(a){3}`) has one entry per
/// copy, all with the same `index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureGroup {
    pub index: usize,
    pub start: StateId,
    pub end: StateId,
}

/// What entering a state does to the captures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Group opens here: record its start, forget its end.
    Open(usize),
    /// Group closes here: record its end.
    Close(usize),
}

#[derive(Clone, Debug)]
pub struct CompiledAutomaton {
    transitions: Vec<Box<[Transition]>>,
    start: StateId,
    terminal: StateId,
    capture_groups: Vec<CaptureGroup>,
    boundaries: Vec<Option<Boundary>>,
    group_count: usize,
    has_backreferences: bool,
    has_lazy_quantifiers: bool,
    anchored_at_start: bool,
    symbols: Option<Symbols>,
}

/// Everything the compiler hands over when freezing.
#[derive(Debug)]
pub(crate) struct Parts {
    pub transitions: Vec<Box<[Transition]>>,
    pub start: StateId,
    pub terminal: StateId,
    pub capture_groups: Vec<CaptureGroup>,
    pub group_count: usize,
    pub has_backreferences: bool,
    pub has_lazy_quantifiers: bool,
    pub anchored_at_start: bool,
    pub symbols: Option<Symbols>,
}

impl CompiledAutomaton {
    pub(crate) fn from_parts(parts: Parts) -> Self {
        let mut boundaries = vec![None; parts.transitions.len()];
        for group in &parts.capture_groups {
            boundaries[group.start.index()] = Some(Boundary::Open(group.index));
            boundaries[group.end.index()] = Some(Boundary::Close(group.index));
        }
        Self {
            transitions: parts.transitions,
            start: parts.start,
            terminal: parts.terminal,
            capture_groups: parts.capture_groups,
            boundaries,
            group_count: parts.group_count,
            has_backreferences: parts.has_backreferences,
            has_lazy_quantifiers: parts.has_lazy_quantifiers,
            anchored_at_start: parts.anchored_at_start,
            symbols: parts.symbols,
        }
    }

    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Reaching this state is a match.
    #[inline]
    pub fn terminal(&self) -> StateId {
        self.terminal
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    #[inline]
    pub fn transitions(&self, id: StateId) -> &[Transition] {
        &self.transitions[id.index()]
    }

    #[inline]
    pub fn boundary(&self, id: StateId) -> Option<Boundary> {
        self.boundaries[id.index()]
    }

    pub fn capture_groups(&self) -> &[CaptureGroup] {
        &self.capture_groups
    }

    /// Highest capture group index; slots cover groups `0..=group_count`.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn has_backreferences(&self) -> bool {
        self.has_backreferences
    }

    pub fn has_lazy_quantifiers(&self) -> bool {
        self.has_lazy_quantifiers
    }

    /// Neither backreferences nor lazy quantifiers: the linear matcher can
    /// run it.
    #[inline]
    pub fn is_regular(&self) -> bool {
        !self.has_backreferences && !self.has_lazy_quantifiers
    }

    /// Matches may only start at offset 0.
    #[inline]
    pub fn anchored_at_start(&self) -> bool {
        self.anchored_at_start
    }

    pub fn symbols(&self) -> Option<&Symbols> {
        self.symbols.as_ref()
    }

    /// One block per state: id, boundary, symbol, then its transitions.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "automaton: {} states, start {}, terminal {}, regular: {}",
            self.state_count(),
            self.start,
            self.terminal,
            self.is_regular()
        );
        for (i, transitions) in self.transitions.iter().enumerate() {
            let id = StateId::from_index(i);
            let _ = write!(out, "state {}", id);
            if id == self.terminal {
                out.push_str(" (terminal)");
            }
            match self.boundaries[i] {
                Some(Boundary::Open(g)) => {
                    let _ = write!(out, " open({})", g);
                }
                Some(Boundary::Close(g)) => {
                    let _ = write!(out, " close({})", g);
                }
                None => {}
            }
            if let Some(symbol) = self.symbols.as_ref().and_then(|s| s.get(id)) {
                let _ = write!(out, " [{}]", symbol);
            }
            out.push('\n');
            for t in transitions.iter() {
                let _ = writeln!(out, "  --{}--> {}", t.condition, t.target);
            }
        }
        out
    }
}
