//! Arena-based state allocation for cyclic automata.
//!
//! A `StateId` is just an index (u32) into the arena, so states can point at
//! each other in cycles without any ownership gymnastics. Quantifier loops
//! are real back-edges rather than unrolled chains.
//!
//! Fragments ([`Fsm`]) are `(start, end)` pairs. They are combined by adding
//! epsilon transitions between existing states; nothing is ever copied. A
//! fragment's end state never gets a consuming transition, so every state
//! has either exactly one consuming transition or only epsilons.
//!
//! ## Example: `a*`
//!
//! ```text
//!         ε           'a'
//!   q.s ─────> c.s ───────> c.e
//!    │  ^                    │
//!    │  └────────ε───────────┘
//!    └─ε─> q.e
//! ```

use smallvec::SmallVec;

use super::condition::Condition;

/// A state identifier - just an index into the arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    /// Sentinel for "no state".
    pub const NONE: StateId = StateId(u32::MAX);

    #[inline]
    pub fn from_index(index: usize) -> StateId {
        debug_assert!(index < u32::MAX as usize);
        StateId(index as u32)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "-")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// An edge: take it to reach `target` if `condition` accepts.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub target: StateId,
    pub condition: Condition,
}

impl Transition {
    pub fn new(target: StateId, condition: Condition) -> Self {
        Self { target, condition }
    }

    pub fn epsilon(target: StateId) -> Self {
        Self::new(target, Condition::EPSILON)
    }
}

/// A state and its outgoing transitions, in priority order.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub transitions: SmallVec<[Transition; 2]>,
}

/// A fragment of automaton: enter at `start`, leave at `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fsm {
    pub start: StateId,
    pub end: StateId,
}

/// Arena for allocating states.
///
/// States are allocated contiguously and referenced by `StateId`.
#[derive(Clone, Default)]
pub struct StateArena {
    states: Vec<State>,
}

impl std::fmt::Debug for StateArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateArena")
            .field("states_count", &self.states.len())
            .finish()
    }
}

impl StateArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a new state with no transitions, returning its ID.
    pub fn alloc(&mut self) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(State::default());
        id
    }

    /// Append a transition; it gets the lowest priority so far.
    pub fn add_transition(&mut self, from: StateId, to: StateId, condition: Condition) {
        self[from].transitions.push(Transition::new(to, condition));
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self[from].transitions.push(Transition::epsilon(to));
    }

    /// Replace every transition of `id`.
    pub fn set_transitions(
        &mut self,
        id: StateId,
        transitions: impl IntoIterator<Item = Transition>,
    ) {
        self[id].transitions = transitions.into_iter().collect();
    }

    #[inline]
    pub fn transitions(&self, id: StateId) -> &[Transition] {
        &self[id].transitions
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    // ------------------------------------------------------------------
    // Fragment builders
    // ------------------------------------------------------------------

    /// Two states joined by a single transition.
    pub fn fragment(&mut self, condition: Condition) -> Fsm {
        let start = self.alloc();
        let end = self.alloc();
        self.add_transition(start, end, condition);
        Fsm { start, end }
    }

    /// A fragment that matches the empty string.
    pub fn empty(&mut self) -> Fsm {
        self.fragment(Condition::EPSILON)
    }

    /// Chain fragments in order. `None` when there is nothing to chain.
    pub fn concatenate(&mut self, fsms: &[Fsm]) -> Option<Fsm> {
        let (first, last) = (fsms.first()?, fsms.last()?);
        for pair in fsms.windows(2) {
            self.add_epsilon(pair[0].end, pair[1].start);
        }
        Some(Fsm {
            start: first.start,
            end: last.end,
        })
    }

    /// Branches in priority order between a fresh start and end.
    pub fn alternation(&mut self, branches: &[Fsm]) -> Fsm {
        let start = self.alloc();
        let end = self.alloc();
        for branch in branches {
            self.add_epsilon(start, branch.start);
            self.add_epsilon(branch.end, end);
        }
        Fsm { start, end }
    }

    /// Wrap a fragment in fresh start and end states. Capture groups use
    /// these as their boundaries.
    pub fn group(&mut self, inner: Fsm) -> Fsm {
        let start = self.alloc();
        let end = self.alloc();
        self.add_epsilon(start, inner.start);
        self.add_epsilon(inner.end, end);
        Fsm { start, end }
    }

    /// `c*`: `q.s: [c.s, q.e]`, `c.e: [q.s]`; lazy tries the exit first.
    pub fn zero_or_more(&mut self, child: Fsm, lazy: bool) -> Fsm {
        let q = Fsm {
            start: self.alloc(),
            end: self.alloc(),
        };
        self.add_prioritized(q.start, child.start, q.end, lazy);
        self.add_epsilon(child.end, q.start);
        q
    }

    /// `c+`: `q.s: [c.s]`, `c.e: [c.s, q.e]`; lazy tries the exit first.
    pub fn one_or_more(&mut self, child: Fsm, lazy: bool) -> Fsm {
        let q = Fsm {
            start: self.alloc(),
            end: self.alloc(),
        };
        self.add_epsilon(q.start, child.start);
        self.add_prioritized(child.end, child.start, q.end, lazy);
        q
    }

    /// `c?`: `q.s: [c.s, q.e]`, `c.e: [q.e]`; lazy tries the skip first.
    pub fn zero_or_one(&mut self, child: Fsm, lazy: bool) -> Fsm {
        let q = Fsm {
            start: self.alloc(),
            end: self.alloc(),
        };
        self.add_prioritized(q.start, child.start, q.end, lazy);
        self.add_epsilon(child.end, q.end);
        q
    }

    /// Two epsilons out of `from`: `into` first unless `lazy`.
    fn add_prioritized(&mut self, from: StateId, into: StateId, exit: StateId, lazy: bool) {
        if lazy {
            self.add_epsilon(from, exit);
            self.add_epsilon(from, into);
        } else {
            self.add_epsilon(from, into);
            self.add_epsilon(from, exit);
        }
    }
}

impl std::ops::Index<StateId> for StateArena {
    type Output = State;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}

impl std::ops::IndexMut<StateId> for StateArena {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        &mut self.states[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(arena: &StateArena, id: StateId) -> Vec<StateId> {
        arena.transitions(id).iter().map(|t| t.target).collect()
    }

    fn char_fragment(arena: &mut StateArena, ch: char) -> Fsm {
        arena.fragment(Condition::Character {
            ch,
            ignore_case: false,
        })
    }

    #[test]
    fn test_state_id_none() {
        assert!(StateId::NONE.is_none());
        assert!(!StateId::from_index(0).is_none());
        assert_eq!(StateId::from_index(7).index(), 7);
    }

    #[test]
    fn test_arena_alloc() {
        let mut arena = StateArena::default();
        assert!(arena.is_empty());
        let s0 = arena.alloc();
        let s1 = arena.alloc();
        assert_eq!(s0.index(), 0);
        assert_eq!(s1.index(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_arena_cyclic_reference() {
        let mut arena = StateArena::default();
        let s0 = arena.alloc();
        let s1 = arena.alloc();
        arena.add_epsilon(s0, s1);
        arena.add_epsilon(s1, s0);
        assert_eq!(targets(&arena, s0), vec![s1]);
        assert_eq!(targets(&arena, s1), vec![s0]);
    }

    #[test]
    fn test_concatenate_links_ends_to_starts() {
        let mut arena = StateArena::default();
        let a = char_fragment(&mut arena, 'a');
        let b = char_fragment(&mut arena, 'b');
        let ab = arena.concatenate(&[a, b]).unwrap();
        assert_eq!(ab.start, a.start);
        assert_eq!(ab.end, b.end);
        assert_eq!(targets(&arena, a.end), vec![b.start]);
        assert!(arena.concatenate(&[]).is_none());
    }

    #[test]
    fn test_alternation_order_is_priority() {
        let mut arena = StateArena::default();
        let a = char_fragment(&mut arena, 'a');
        let b = char_fragment(&mut arena, 'b');
        let alt = arena.alternation(&[a, b]);
        assert_eq!(targets(&arena, alt.start), vec![a.start, b.start]);
        assert_eq!(targets(&arena, a.end), vec![alt.end]);
        assert_eq!(targets(&arena, b.end), vec![alt.end]);
    }

    #[test]
    fn test_zero_or_more_wiring() {
        let mut arena = StateArena::default();
        let c = char_fragment(&mut arena, 'a');
        let q = arena.zero_or_more(c, false);
        assert_eq!(targets(&arena, q.start), vec![c.start, q.end]);
        assert_eq!(targets(&arena, c.end), vec![q.start]);

        let c = char_fragment(&mut arena, 'a');
        let q = arena.zero_or_more(c, true);
        assert_eq!(targets(&arena, q.start), vec![q.end, c.start]);
    }

    #[test]
    fn test_one_or_more_wiring() {
        let mut arena = StateArena::default();
        let c = char_fragment(&mut arena, 'a');
        let q = arena.one_or_more(c, false);
        assert_eq!(targets(&arena, q.start), vec![c.start]);
        assert_eq!(targets(&arena, c.end), vec![c.start, q.end]);

        let c = char_fragment(&mut arena, 'a');
        let q = arena.one_or_more(c, true);
        assert_eq!(targets(&arena, c.end), vec![q.end, c.start]);
    }

    #[test]
    fn test_zero_or_one_wiring() {
        let mut arena = StateArena::default();
        let c = char_fragment(&mut arena, 'a');
        let q = arena.zero_or_one(c, false);
        assert_eq!(targets(&arena, q.start), vec![c.start, q.end]);
        assert_eq!(targets(&arena, c.end), vec![q.end]);

        let c = char_fragment(&mut arena, 'a');
        let q = arena.zero_or_one(c, true);
        assert_eq!(targets(&arena, q.start), vec![q.end, c.start]);
    }

    #[test]
    fn test_fragment_ends_only_get_epsilons() {
        let mut arena = StateArena::default();
        let a = char_fragment(&mut arena, 'a');
        let b = char_fragment(&mut arena, 'b');
        let alt = arena.alternation(&[a, b]);
        let star = arena.zero_or_more(alt, false);
        let g = arena.group(star);

        for i in 0..arena.len() {
            let transitions = arena.transitions(StateId::from_index(i));
            let consuming = transitions
                .iter()
                .filter(|t| !t.condition.is_epsilon())
                .count();
            assert!(
                consuming == 0 || (consuming == 1 && transitions.len() == 1),
                "state {} mixes consuming and epsilon transitions",
                i
            );
        }
        assert!(arena.transitions(g.end).is_empty());
    }
}
