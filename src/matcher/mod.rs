//! Running a compiled automaton over input.
//!
//! Two engines share the same [`CompiledAutomaton`]:
//!
//! - [`BacktrackingMatcher`] explores transitions depth-first and can run
//!   anything, including backreferences and lazy quantifiers.
//! - [`RegularMatcher`] simulates every live state at once and runs in time
//!   linear in the input, but only accepts regular automata.
//!
//! Both report leftmost-first matches, and both enumerate successive
//! non-overlapping matches the same way: the next search begins where the
//! previous match ended, or one char later if that match was empty.
//! [`Matcher`] picks the engine from [`CompiledAutomaton::is_regular`].

mod backtracking;
mod regular;

pub use backtracking::BacktrackingMatcher;
pub use regular::RegularMatcher;

use std::ops::Range;

use crate::automaton::CompiledAutomaton;

/// A successful match: the full span plus capture groups.
#[derive(Clone, PartialEq, Eq)]
pub struct Match<'h> {
    input: &'h str,
    /// Group `g` at `2g`/`2g + 1`; group 0 is the whole match.
    slots: Box<[Option<usize>]>,
}

impl<'h> Match<'h> {
    /// Build from engine slots; slots 0 and 1 must hold the match span.
    pub(crate) fn new(input: &'h str, slots: Box<[Option<usize>]>) -> Self {
        debug_assert!(slots.len() >= 2 && slots[0].is_some() && slots[1].is_some());
        Self { input, slots }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.slots[0].unwrap_or(0)
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.slots[1].unwrap_or(0)
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    /// The matched text.
    pub fn as_str(&self) -> &'h str {
        &self.input[self.range()]
    }

    /// Span of group `index`; 0 is the whole match. `None` if the group did
    /// not take part in the match.
    pub fn group_range(&self, index: usize) -> Option<Range<usize>> {
        match (self.slots.get(2 * index)?, self.slots.get(2 * index + 1)?) {
            (Some(start), Some(end)) if start <= end => Some(*start..*end),
            _ => None,
        }
    }

    pub fn group(&self, index: usize) -> Option<&'h str> {
        self.group_range(index).map(|r| &self.input[r])
    }

    /// Groups `1..=group_count`, in order.
    pub fn groups(&self) -> impl Iterator<Item = Option<&'h str>> + '_ {
        (1..self.group_len()).map(move |i| self.group(i))
    }

    /// Number of slot pairs, counting the whole match.
    pub fn group_len(&self) -> usize {
        self.slots.len() / 2
    }
}

impl std::fmt::Debug for Match<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("range", &self.range())
            .field("text", &self.as_str())
            .field("groups", &self.groups().collect::<Vec<_>>())
            .finish()
    }
}

/// Where the next search begins.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Progress {
    /// `None` once the input is exhausted.
    next_start: Option<usize>,
    previous_match_end: Option<usize>,
}

impl Progress {
    pub(crate) fn new() -> Self {
        Self {
            next_start: Some(0),
            previous_match_end: None,
        }
    }

    pub(crate) fn next_start(&self) -> Option<usize> {
        self.next_start
    }

    pub(crate) fn previous_match_end(&self) -> Option<usize> {
        self.previous_match_end
    }

    /// Move past a match `start..end` of `input`.
    pub(crate) fn advance(&mut self, input: &str, start: usize, end: usize) {
        self.previous_match_end = Some(end);
        self.next_start = if end > start {
            Some(end)
        } else {
            input[end..].chars().next().map(|c| end + c.len_utf8())
        };
    }

    pub(crate) fn finish(&mut self) {
        self.next_start = None;
    }
}

/// Successive matches of one automaton over one input, using whichever
/// engine the automaton allows.
#[derive(Debug)]
pub enum Matcher<'a, 'h> {
    Backtracking(BacktrackingMatcher<'a, 'h>),
    Regular(RegularMatcher<'a, 'h>),
}

impl<'a, 'h> Matcher<'a, 'h> {
    pub fn new(automaton: &'a CompiledAutomaton, input: &'h str) -> Self {
        match RegularMatcher::new(automaton, input) {
            Ok(regular) => Matcher::Regular(regular),
            Err(_) => Matcher::Backtracking(BacktrackingMatcher::new(automaton, input)),
        }
    }

    pub fn next_match(&mut self) -> Option<Match<'h>> {
        match self {
            Matcher::Backtracking(m) => m.next_match(),
            Matcher::Regular(m) => m.next_match(),
        }
    }
}

impl<'h> Iterator for Matcher<'_, 'h> {
    type Item = Match<'h>;

    fn next(&mut self) -> Option<Match<'h>> {
        self.next_match()
    }
}
