//! Linear-time matcher for regular automata.
//!
//! A Pike-style simulation: every live thread advances one char per step,
//! so the work is bounded by `input length * state count`. Threads live in
//! a [`SparseSet`] whose insertion order is their priority, each with its
//! own copy of the capture slots. A state reached twice at the same
//! position keeps the first, higher-priority thread, which is what makes
//! the result identical to the backtracking matcher's leftmost-first
//! choice.

use crate::automaton::{
    Boundary, CompiledAutomaton, Condition, ConditionResult, Cursor, SparseSet, StateId,
};
use crate::compiler::CompileError;

use super::{Match, Progress};

/// One generation of threads.
#[derive(Clone, Debug)]
struct Threads {
    set: SparseSet,
    /// `slot_len` slots per state, indexed by state id.
    slots: Vec<Option<usize>>,
    slot_len: usize,
}

impl Threads {
    fn new(state_count: usize, slot_len: usize) -> Self {
        Self {
            set: SparseSet::new(state_count),
            slots: vec![None; state_count * slot_len],
            slot_len,
        }
    }

    #[inline]
    fn slots(&self, id: StateId) -> &[Option<usize>] {
        let at = id.index() * self.slot_len;
        &self.slots[at..at + self.slot_len]
    }

    #[inline]
    fn slots_mut(&mut self, id: StateId) -> &mut [Option<usize>] {
        let at = id.index() * self.slot_len;
        &mut self.slots[at..at + self.slot_len]
    }
}

#[derive(Clone, Copy, Debug)]
enum ClosureFrame {
    Explore(StateId),
    RestoreSlot { slot: usize, old: Option<usize> },
}

#[derive(Debug)]
pub struct RegularMatcher<'a, 'h> {
    automaton: &'a CompiledAutomaton,
    cursor: Cursor<'h>,
    progress: Progress,
    current: Threads,
    next: Threads,
    stack: Vec<ClosureFrame>,
    /// Slots of the thread being followed through the epsilon closure.
    scratch: Vec<Option<usize>>,
}

impl<'a, 'h> RegularMatcher<'a, 'h> {
    /// Fails with [`CompileError::NotRegular`] if the automaton needs
    /// backtracking.
    pub fn new(automaton: &'a CompiledAutomaton, input: &'h str) -> Result<Self, CompileError> {
        if !automaton.is_regular() {
            return Err(CompileError::NotRegular);
        }
        let slot_len = 2 * (automaton.group_count() + 1);
        let state_count = automaton.state_count();
        Ok(Self {
            automaton,
            cursor: Cursor::new(input, 0, automaton.group_count()),
            progress: Progress::new(),
            current: Threads::new(state_count, slot_len),
            next: Threads::new(state_count, slot_len),
            stack: Vec::with_capacity(16),
            scratch: vec![None; slot_len],
        })
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

    fn search(&mut self, from: usize) -> Option<Box<[Option<usize>]>> {
        log::trace!("linear search from {}", from);
        self.cursor
            .set_previous_match_end(self.progress.previous_match_end());
        let automaton = self.automaton;
        let input = self.cursor.input();
        let anchored = automaton.anchored_at_start();
        if anchored && from > 0 {
            return None;
        }

        let mut matched: Option<Box<[Option<usize>]>> = None;
        self.current.set.clear();
        let mut at = from;
        loop {
            // A new lowest-priority thread starts here until something
            // matches.
            if matched.is_none() && (!anchored || at == 0) {
                self.scratch.iter_mut().for_each(|s| *s = None);
                self.scratch[0] = Some(at);
                self.add_thread(Generation::Current, automaton.start(), at);
            }
            if self.current.set.is_empty() {
                break;
            }

            self.next.set.clear();
            for i in 0..self.current.set.len() {
                let state = self.current.set.get(i);
                if state == automaton.terminal() {
                    let mut slots: Box<[Option<usize>]> = self.current.slots(state).into();
                    slots[1] = Some(at);
                    matched = Some(slots);
                    // Everything after this thread has lower priority.
                    break;
                }
                self.step(state, at);
            }
            std::mem::swap(&mut self.current, &mut self.next);

            match input[at..].chars().next() {
                Some(c) => at += c.len_utf8(),
                None => break,
            }
        }
        matched
    }

    /// Advance the thread at `state` over the char at `at`.
    fn step(&mut self, state: StateId, at: usize) {
        let automaton = self.automaton;
        for transition in automaton.transitions(state) {
            if transition.condition.is_epsilon() {
                continue;
            }
            self.cursor.set_index(at);
            let result = transition.condition.evaluate(&self.cursor);
            if let ConditionResult::Accepted(consumed) = result {
                debug_assert!(
                    self.cursor
                        .character()
                        .is_some_and(|c| c.len_utf8() == consumed),
                    "linear matcher stepped over more than one char"
                );
                self.scratch.copy_from_slice(self.current.slots(state));
                self.add_thread(Generation::Next, transition.target, at + consumed);
            }
        }
    }

    /// Follow epsilons from `state` at `at`, adding every state reached to
    /// the generation in priority order. Starts from the slots in `scratch`.
    fn add_thread(&mut self, generation: Generation, state: StateId, at: usize) {
        let automaton = self.automaton;
        self.cursor.set_index(at);
        self.stack.clear();
        self.stack.push(ClosureFrame::Explore(state));

        while let Some(frame) = self.stack.pop() {
            let id = match frame {
                ClosureFrame::RestoreSlot { slot, old } => {
                    self.scratch[slot] = old;
                    continue;
                }
                ClosureFrame::Explore(id) => id,
            };
            let threads = match generation {
                Generation::Current => &mut self.current,
                Generation::Next => &mut self.next,
            };
            if !threads.set.insert(id) {
                continue;
            }

            match automaton.boundary(id) {
                Some(Boundary::Open(g)) => {
                    for (slot, value) in [(2 * g, Some(at)), (2 * g + 1, None)] {
                        let old = std::mem::replace(&mut self.scratch[slot], value);
                        self.stack.push(ClosureFrame::RestoreSlot { slot, old });
                    }
                }
                Some(Boundary::Close(g)) => {
                    let slot = 2 * g + 1;
                    let old = std::mem::replace(&mut self.scratch[slot], Some(at));
                    self.stack.push(ClosureFrame::RestoreSlot { slot, old });
                }
                None => {}
            }
            threads.slots_mut(id).copy_from_slice(&self.scratch);

            // Reverse so the first transition is explored first.
            for transition in automaton.transitions(id).iter().rev() {
                if let Condition::Epsilon(assertion) = transition.condition {
                    if assertion.map_or(true, |a| a.holds(&self.cursor)) {
                        self.stack.push(ClosureFrame::Explore(transition.target));
                    }
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Generation {
    Current,
    Next,
}

impl<'h> Iterator for RegularMatcher<'_, 'h> {
    type Item = Match<'h>;

    fn next(&mut self) -> Option<Match<'h>> {
        self.next_match()
    }
}
