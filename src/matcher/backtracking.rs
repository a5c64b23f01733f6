//! Depth-first matcher.
//!
//! Transitions are tried in priority order with an explicit frame stack, so
//! deep patterns never recurse on the call stack. Entering a capture
//! boundary pushes a frame that undoes the slot write when the search
//! backtracks past it.
//!
//! Epsilon loops are cut by refusing to re-enter a state at an index where
//! the current path already entered it. Without backreferences the future
//! of `(state, index)` never depends on captures, so a per-attempt visited
//! set gives the same answer in polynomial time. With backreferences the
//! check has to follow the path.

use rustc_hash::FxHashSet;

use crate::automaton::{Boundary, CompiledAutomaton, ConditionResult, Cursor, StateId};

use super::{Match, Progress};

#[derive(Clone, Copy, Debug)]
enum Frame {
    /// Try transitions of `state` from index `next`, with the cursor at `at`.
    Step { state: StateId, at: usize, next: usize },
    RestoreSlot { slot: usize, old: Option<usize> },
    RestoreEntry { state: StateId, old: usize },
}

/// Index meaning "not entered on the current path".
const NOT_ENTERED: usize = usize::MAX;

#[derive(Debug)]
pub struct BacktrackingMatcher<'a, 'h> {
    automaton: &'a CompiledAutomaton,
    cursor: Cursor<'h>,
    progress: Progress,
    stack: Vec<Frame>,
    /// Visited `(state, index)` pairs, used when there are no backreferences.
    visited: FxHashSet<(StateId, usize)>,
    /// Index at which each state was last entered on the current path, used
    /// when there are backreferences.
    entered_at: Vec<usize>,
}

impl<'a, 'h> BacktrackingMatcher<'a, 'h> {
    pub fn new(automaton: &'a CompiledAutomaton, input: &'h str) -> Self {
        let entered_at = if automaton.has_backreferences() {
            vec![NOT_ENTERED; automaton.state_count()]
        } else {
            Vec::new()
        };
        Self {
            automaton,
            cursor: Cursor::new(input, 0, automaton.group_count()),
            progress: Progress::new(),
            stack: Vec::with_capacity(32),
            visited: FxHashSet::default(),
            entered_at,
        }
    }

    /// The next match after the previous one, if any.
    pub fn next_match(&mut self) -> Option<Match<'h>> {
        let from = self.progress.next_start()?;
        let input = self.cursor.input();
        let Some(slots) = self.search(from) else {
            self.progress.finish();
            return None;
        };
        let found = Match::new(input, slots);
        self.progress.advance(input, found.start(), found.end());
        Some(found)
    }

    /// Try every candidate start from `from` on; the first success wins.
    fn search(&mut self, from: usize) -> Option<Box<[Option<usize>]>> {
        self.cursor
            .set_previous_match_end(self.progress.previous_match_end());
        let input = self.cursor.input();

        if self.automaton.anchored_at_start() {
            return if from == 0 { self.attempt(0) } else { None };
        }

        let mut start = from;
        loop {
            if let Some(slots) = self.attempt(start) {
                return Some(slots);
            }
            start += input[start..].chars().next()?.len_utf8();
        }
    }

    /// One depth-first search from the start state at `start`.
    fn attempt(&mut self, start: usize) -> Option<Box<[Option<usize>]>> {
        log::trace!("backtracking attempt at {}", start);
        self.cursor.reset(start);
        self.stack.clear();
        self.visited.clear();
        self.entered_at.iter_mut().for_each(|e| *e = NOT_ENTERED);

        let automaton = self.automaton;
        let terminal = automaton.terminal();
        self.enter(automaton.start(), start);

        while let Some(frame) = self.stack.pop() {
            let (state, at, next) = match frame {
                Frame::RestoreSlot { slot, old } => {
                    self.cursor.replace_slot(slot, old);
                    continue;
                }
                Frame::RestoreEntry { state, old } => {
                    self.entered_at[state.index()] = old;
                    continue;
                }
                Frame::Step { state, at, next } => (state, at, next),
            };

            if state == terminal {
                let mut slots: Box<[Option<usize>]> = self.cursor.slots().into();
                slots[0] = Some(start);
                slots[1] = Some(at);
                return Some(slots);
            }

            let transitions = automaton.transitions(state);
            self.cursor.set_index(at);
            for (i, transition) in transitions.iter().enumerate().skip(next) {
                let result = transition.condition.evaluate(&self.cursor);
                if let ConditionResult::Accepted(consumed) = result {
                    if i + 1 < transitions.len() {
                        self.stack.push(Frame::Step {
                            state,
                            at,
                            next: i + 1,
                        });
                    }
                    self.enter(transition.target, at + consumed);
                    break;
                }
            }
        }
        None
    }

    /// Push the frames for entering `state` at `at`, unless the zero-width
    /// guard refuses it.
    fn enter(&mut self, state: StateId, at: usize) {
        if self.automaton.has_backreferences() {
            let old = self.entered_at[state.index()];
            if old == at {
                return;
            }
            self.stack.push(Frame::RestoreEntry { state, old });
            self.entered_at[state.index()] = at;
        } else if !self.visited.insert((state, at)) {
            return;
        }

        match self.automaton.boundary(state) {
            Some(Boundary::Open(g)) => {
                let old = self.cursor.replace_slot(2 * g, Some(at));
                self.stack.push(Frame::RestoreSlot { slot: 2 * g, old });
                let old = self.cursor.replace_slot(2 * g + 1, None);
                self.stack.push(Frame::RestoreSlot {
                    slot: 2 * g + 1,
                    old,
                });
            }
            Some(Boundary::Close(g)) => {
                let old = self.cursor.replace_slot(2 * g + 1, Some(at));
                self.stack.push(Frame::RestoreSlot {
                    slot: 2 * g + 1,
                    old,
                });
            }
            None => {}
        }
        self.stack.push(Frame::Step { state, at, next: 0 });
    }
}

impl<'h> Iterator for BacktrackingMatcher<'_, 'h> {
    type Item = Match<'h>;

    fn next(&mut self) -> Option<Match<'h>> {
        self.next_match()
    }
}
