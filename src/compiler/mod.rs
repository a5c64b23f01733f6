//! AST to automaton compilation.
//!
//! Compilation runs in three passes:
//!
//! 1. A numbering pass over the AST assigns capture indices, checks
//!    backreferences and range quantifiers, and decides whether the pattern
//!    is regular (no backreferences, no lazy quantifiers).
//! 2. Emission walks the numbered tree and builds fragments in a
//!    [`StateArena`].
//! 3. Finalization optionally bypasses pass-through states, renumbers the
//!    reachable states breadth-first and freezes the result into a
//!    [`CompiledAutomaton`].

mod symbols;

pub use symbols::{SymbolDetails, Symbols};

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashSet;

use crate::ast::{
    Anchor, Ast, Atom, CharacterGroup, Group, QuantifiedExpression, QuantifierKind, Unit,
    REPETITION_MAX,
};
use crate::automaton::{
    Assertion, CaptureGroup, CompiledAutomaton, Condition, Fsm, Parts, StateArena, StateId,
    Transition,
};
use crate::options::Options;

/// Most states a single compilation may allocate.
pub const STATE_LIMIT: usize = 100_000;

/// Errors from compiling an AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A backreference names a group that is not opened before it.
    UnknownGroup(usize),
    /// A `{lower,upper}` quantifier with `lower > upper`.
    InvalidRange { lower: usize, upper: usize },
    /// A `{lower,upper}` bound above [`REPETITION_MAX`].
    RepetitionTooLarge(usize),
    /// A capturing group with an explicit index of 0, which is reserved for
    /// the whole match.
    InvalidGroupIndex(usize),
    /// Emission went past [`STATE_LIMIT`] states.
    TooManyStates(usize),
    /// A sequence or alternation with no children.
    EmptySequence,
    /// A character group with no items.
    EmptyCharacterGroup,
    /// The linear matcher was asked to run an automaton that needs
    /// backtracking.
    NotRegular,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnknownGroup(index) => {
                write!(f, "backreference to unknown group {}", index)
            }
            CompileError::InvalidRange { lower, upper } => {
                write!(f, "invalid quantifier range {{{},{}}}", lower, upper)
            }
            CompileError::RepetitionTooLarge(count) => {
                write!(f, "repetition count {} exceeds {}", count, REPETITION_MAX)
            }
            CompileError::InvalidGroupIndex(index) => {
                write!(f, "invalid capture group index {}", index)
            }
            CompileError::TooManyStates(limit) => {
                write!(f, "automaton exceeds {} states", limit)
            }
            CompileError::EmptySequence => write!(f, "empty sequence"),
            CompileError::EmptyCharacterGroup => write!(f, "empty character group"),
            CompileError::NotRegular => {
                write!(f, "automaton has backreferences or lazy quantifiers")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Compiles ASTs under a fixed set of options.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compiler {
    options: Options,
}

impl Compiler {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn compile(&self, ast: &Ast) -> Result<CompiledAutomaton, CompileError> {
        let mut numbering = Numbering::default();
        let root = numbering.number(&ast.root)?;
        let is_regular = !numbering.has_backreferences && !numbering.has_lazy_quantifiers;

        let mut emitter = Emitter {
            options: self.options,
            arena: StateArena::with_capacity(64),
            capture_groups: Vec::new(),
            is_regular,
            symbols: self.options.has_symbols().then(Symbols::new),
        };
        let fsm = emitter.unit(&root)?;
        let emitted = emitter.arena.len();

        if self.options.is_optimized() {
            emitter.bypass_pass_through(fsm);
        }
        let compiled = emitter.freeze(
            fsm,
            Flags {
                group_count: numbering.group_count,
                has_backreferences: numbering.has_backreferences,
                has_lazy_quantifiers: numbering.has_lazy_quantifiers,
                anchored_at_start: ast.from_start_of_string && !self.options.is_multiline(),
            },
        );

        log::debug!(
            "compiled {} states ({} emitted), {} groups, regular: {}",
            compiled.state_count(),
            emitted,
            compiled.group_count(),
            compiled.is_regular()
        );
        Ok(compiled)
    }
}

// ----------------------------------------------------------------------
// Pass 1: numbering and validation
// ----------------------------------------------------------------------

#[derive(Default)]
struct Numbering {
    /// Capturing groups seen so far, explicit or not.
    seen: usize,
    opened: FxHashSet<usize>,
    group_count: usize,
    has_backreferences: bool,
    has_lazy_quantifiers: bool,
}

impl Numbering {
    /// A copy of `unit` with every capturing group carrying its index.
    fn number(&mut self, unit: &Unit) -> Result<Unit, CompileError> {
        Ok(match unit {
            Unit::Alternation(children) => Unit::Alternation(self.number_all(children)?),
            Unit::ImplicitGroup(children) => Unit::ImplicitGroup(self.number_all(children)?),
            Unit::Group(group) => {
                let index = if group.is_capturing {
                    self.seen += 1;
                    let index = group.index.unwrap_or(self.seen);
                    if index == 0 {
                        return Err(CompileError::InvalidGroupIndex(0));
                    }
                    self.opened.insert(index);
                    self.group_count = self.group_count.max(index);
                    Some(index)
                } else {
                    None
                };
                Unit::Group(Group {
                    index,
                    is_capturing: group.is_capturing,
                    children: self.number_all(&group.children)?,
                })
            }
            Unit::BackReference(index) => {
                if !self.opened.contains(index) {
                    return Err(CompileError::UnknownGroup(*index));
                }
                self.has_backreferences = true;
                Unit::BackReference(*index)
            }
            Unit::Quantified(q) => {
                if let QuantifierKind::Range { lower, upper } = q.quantifier.kind {
                    let largest = upper.map_or(lower, |upper| upper.max(lower));
                    if largest > REPETITION_MAX {
                        return Err(CompileError::RepetitionTooLarge(largest));
                    }
                    if let Some(upper) = upper.filter(|&upper| lower > upper) {
                        return Err(CompileError::InvalidRange { lower, upper });
                    }
                }
                self.has_lazy_quantifiers |= q.quantifier.is_lazy;
                Unit::Quantified(QuantifiedExpression {
                    expression: Box::new(self.number(&q.expression)?),
                    quantifier: q.quantifier,
                })
            }
            Unit::Anchor(_) | Unit::CharacterGroup(_) | Unit::Match(_) => unit.clone(),
        })
    }

    fn number_all(&mut self, units: &[Unit]) -> Result<Vec<Unit>, CompileError> {
        units.iter().map(|u| self.number(u)).collect()
    }
}

// ----------------------------------------------------------------------
// Pass 2: emission
// ----------------------------------------------------------------------

struct Emitter {
    options: Options,
    arena: StateArena,
    /// Ids are arena ids until `freeze` renumbers them.
    capture_groups: Vec<CaptureGroup>,
    is_regular: bool,
    symbols: Option<Symbols>,
}

struct Flags {
    group_count: usize,
    has_backreferences: bool,
    has_lazy_quantifiers: bool,
    anchored_at_start: bool,
}

impl Emitter {
    fn unit(&mut self, unit: &Unit) -> Result<Fsm, CompileError> {
        let fsm = match unit {
            Unit::ImplicitGroup(children) => {
                let fsms = self.units(children)?;
                self.arena
                    .concatenate(&fsms)
                    .ok_or(CompileError::EmptySequence)?
            }
            Unit::Alternation(children) => {
                if children.is_empty() {
                    return Err(CompileError::EmptySequence);
                }
                let branches = self.units(children)?;
                self.arena.alternation(&branches)
            }
            Unit::Group(group) => self.group(group)?,
            Unit::Anchor(anchor) => {
                let assertion = self.assertion(*anchor);
                self.arena.fragment(Condition::Epsilon(Some(assertion)))
            }
            Unit::BackReference(index) => self.arena.fragment(Condition::BackReference(*index)),
            Unit::CharacterGroup(group) => self.character_group(group)?,
            Unit::Match(atom) => self.atom(atom)?,
            Unit::Quantified(q) => self.quantified(q)?,
        };
        if self.arena.len() > STATE_LIMIT {
            return Err(CompileError::TooManyStates(STATE_LIMIT));
        }

        if let Some(symbols) = &mut self.symbols {
            let name = unit.to_string();
            symbols.insert_if_absent(
                fsm.start,
                SymbolDetails {
                    unit: name.clone(),
                    is_end: false,
                },
            );
            symbols.insert_if_absent(
                fsm.end,
                SymbolDetails {
                    unit: name,
                    is_end: true,
                },
            );
        }
        Ok(fsm)
    }

    fn units(&mut self, units: &[Unit]) -> Result<Vec<Fsm>, CompileError> {
        units.iter().map(|u| self.unit(u)).collect()
    }

    fn group(&mut self, group: &Group) -> Result<Fsm, CompileError> {
        let children = self.units(&group.children)?;
        let inner = match self.arena.concatenate(&children) {
            Some(inner) => inner,
            None => self.arena.empty(),
        };
        let fsm = self.arena.group(inner);
        if let Some(index) = group.index.filter(|_| group.is_capturing) {
            self.capture_groups.push(CaptureGroup {
                index,
                start: fsm.start,
                end: fsm.end,
            });
        }
        Ok(fsm)
    }

    fn assertion(&self, anchor: Anchor) -> Assertion {
        let multiline = self.options.is_multiline();
        match anchor {
            Anchor::StartOfString if multiline => Assertion::StartOfLine,
            Anchor::StartOfString | Anchor::StartOfStringOnly => Assertion::StartOfInput,
            Anchor::EndOfString if multiline => Assertion::EndOfLine,
            Anchor::EndOfString | Anchor::EndOfStringOnly => Assertion::EndOfInputOrFinalNewline,
            Anchor::EndOfStringOnlyNotNewline => Assertion::EndOfInput,
            Anchor::WordBoundary => Assertion::WordBoundary,
            Anchor::NonWordBoundary => Assertion::NonWordBoundary,
            Anchor::PreviousMatchEnd => Assertion::PreviousMatchEnd,
        }
    }

    fn character_group(&mut self, group: &CharacterGroup) -> Result<Fsm, CompileError> {
        if group.items.is_empty() {
            return Err(CompileError::EmptyCharacterGroup);
        }
        Ok(self.arena.fragment(Condition::CharacterSet {
            set: group.items_set(),
            ignore_case: self.options.is_case_insensitive(),
            negated: group.is_inverted,
        }))
    }

    fn atom(&mut self, atom: &Atom) -> Result<Fsm, CompileError> {
        let ignore_case = self.options.is_case_insensitive();
        Ok(match atom {
            Atom::AnyCharacter => self.arena.fragment(Condition::AnyCharacter {
                includes_newline: self.options.is_dot_matches_line_separators(),
            }),
            Atom::Character(ch) => self.arena.fragment(Condition::Character {
                ch: *ch,
                ignore_case,
            }),
            Atom::String(s) if s.is_empty() => self.arena.empty(),
            // The linear matcher steps one char at a time.
            Atom::String(s) if self.is_regular => {
                let chars: Vec<Fsm> = s
                    .chars()
                    .map(|ch| self.arena.fragment(Condition::Character { ch, ignore_case }))
                    .collect();
                self.arena
                    .concatenate(&chars)
                    .ok_or(CompileError::EmptySequence)?
            }
            Atom::String(s) => self.arena.fragment(Condition::string(s, ignore_case)),
            Atom::Set(set) => self.arena.fragment(Condition::CharacterSet {
                set: set.clone(),
                ignore_case,
                negated: false,
            }),
            Atom::Group(group) => self.character_group(group)?,
        })
    }

    fn quantified(&mut self, q: &QuantifiedExpression) -> Result<Fsm, CompileError> {
        let lazy = q.quantifier.is_lazy;
        match q.quantifier.kind {
            QuantifierKind::ZeroOrMore => {
                let child = self.unit(&q.expression)?;
                Ok(self.arena.zero_or_more(child, lazy))
            }
            QuantifierKind::OneOrMore => {
                let child = self.unit(&q.expression)?;
                Ok(self.arena.one_or_more(child, lazy))
            }
            QuantifierKind::ZeroOrOne => {
                let child = self.unit(&q.expression)?;
                Ok(self.arena.zero_or_one(child, lazy))
            }
            QuantifierKind::Range { lower, upper } => {
                let mut parts = Vec::with_capacity(lower + 1);
                for _ in 0..lower {
                    parts.push(self.unit(&q.expression)?);
                }
                match upper {
                    None => {
                        let child = self.unit(&q.expression)?;
                        parts.push(self.arena.zero_or_more(child, lazy));
                    }
                    Some(upper) if upper > lower => {
                        parts.push(self.optional_copies(&q.expression, upper - lower, lazy)?);
                    }
                    Some(_) => {}
                }
                Ok(match self.arena.concatenate(&parts) {
                    Some(fsm) => fsm,
                    None => self.arena.empty(),
                })
            }
        }
    }

    /// `(c(c(c)?)?)?` with `count` copies of `c`, built inside out.
    fn optional_copies(
        &mut self,
        unit: &Unit,
        count: usize,
        lazy: bool,
    ) -> Result<Fsm, CompileError> {
        let mut nested: Option<Fsm> = None;
        for _ in 0..count {
            let copy = self.unit(unit)?;
            let body = match nested {
                Some(rest) => self
                    .arena
                    .concatenate(&[copy, rest])
                    .ok_or(CompileError::EmptySequence)?,
                None => copy,
            };
            nested = Some(self.arena.zero_or_one(body, lazy));
        }
        nested.ok_or(CompileError::EmptySequence)
    }

    // ------------------------------------------------------------------
    // Pass 3: finalization
    // ------------------------------------------------------------------

    /// Redirect transitions around states whose only transition is an
    /// unconditional epsilon. Start, terminal and capture boundaries stay.
    fn bypass_pass_through(&mut self, fsm: Fsm) {
        let mut keep: FxHashSet<StateId> = FxHashSet::default();
        keep.insert(fsm.start);
        keep.insert(fsm.end);
        for group in &self.capture_groups {
            keep.insert(group.start);
            keep.insert(group.end);
        }

        let forward: Vec<Option<StateId>> = (0..self.arena.len())
            .map(StateId::from_index)
            .map(|id| match self.arena.transitions(id) {
                [only] if only.condition.is_unconditional_epsilon() && !keep.contains(&id) => {
                    Some(only.target)
                }
                _ => None,
            })
            .collect();

        // Follow each chain to its first kept state; a chain that loops
        // back on itself is left alone.
        let resolve = |id: StateId| -> StateId {
            let mut current = id;
            for _ in 0..forward.len() {
                match forward[current.index()] {
                    Some(next) => current = next,
                    None => return current,
                }
            }
            id
        };

        let mut bypassed = 0usize;
        for i in 0..self.arena.len() {
            let id = StateId::from_index(i);
            let redirected: Vec<Transition> = self
                .arena
                .transitions(id)
                .iter()
                .map(|t| {
                    let target = resolve(t.target);
                    if target != t.target {
                        bypassed += 1;
                    }
                    Transition::new(target, t.condition.clone())
                })
                .collect();
            self.arena.set_transitions(id, redirected);
        }
        log::trace!("optimizer redirected {} transitions", bypassed);
    }

    /// Renumber reachable states breadth-first from the start.
    fn freeze(self, fsm: Fsm, flags: Flags) -> CompiledAutomaton {
        let mut mapping = vec![StateId::NONE; self.arena.len()];
        let mut order: Vec<StateId> = Vec::with_capacity(self.arena.len());
        let mut queue = VecDeque::new();

        let mut visit = |id: StateId, order: &mut Vec<StateId>, queue: &mut VecDeque<StateId>| {
            if mapping[id.index()].is_none() {
                mapping[id.index()] = StateId::from_index(order.len());
                order.push(id);
                queue.push_back(id);
            }
        };

        visit(fsm.start, &mut order, &mut queue);
        while let Some(id) = queue.pop_front() {
            for t in self.arena.transitions(id) {
                visit(t.target, &mut order, &mut queue);
            }
        }
        // Every fragment connects its start to its end, so this only fires
        // for hand-built arenas.
        visit(fsm.end, &mut order, &mut queue);

        let transitions = order
            .iter()
            .map(|&old| {
                self.arena
                    .transitions(old)
                    .iter()
                    .map(|t| Transition::new(mapping[t.target.index()], t.condition.clone()))
                    .collect::<Vec<_>>()
                    .into_boxed_slice()
            })
            .collect();

        let capture_groups = self
            .capture_groups
            .iter()
            .filter_map(|g| {
                let (start, end) = (mapping[g.start.index()], mapping[g.end.index()]);
                (!start.is_none() && !end.is_none()).then_some(CaptureGroup {
                    index: g.index,
                    start,
                    end,
                })
            })
            .collect();

        CompiledAutomaton::from_parts(Parts {
            transitions,
            start: mapping[fsm.start.index()],
            terminal: mapping[fsm.end.index()],
            capture_groups,
            group_count: flags.group_count,
            has_backreferences: flags.has_backreferences,
            has_lazy_quantifiers: flags.has_lazy_quantifiers,
            anchored_at_start: flags.anchored_at_start,
            symbols: self.symbols.map(|s| s.renumbered(&mapping)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{GroupItem, Quantifier};

    fn compile(root: Unit) -> Result<CompiledAutomaton, CompileError> {
        Compiler::new(Options::new()).compile(&Ast::new(root))
    }

    fn compile_unoptimized(root: Unit) -> CompiledAutomaton {
        Compiler::new(Options::new().optimize(false))
            .compile(&Ast::new(root))
            .unwrap()
    }

    #[test]
    fn test_unknown_backreference() {
        let root = Unit::ImplicitGroup(vec![
            Unit::BackReference(1),
            Unit::capturing(vec![Unit::character('a')]),
        ]);
        assert_eq!(compile(root).unwrap_err(), CompileError::UnknownGroup(1));

        let root = Unit::ImplicitGroup(vec![Unit::character('a'), Unit::BackReference(2)]);
        assert_eq!(compile(root).unwrap_err(), CompileError::UnknownGroup(2));
    }

    #[test]
    fn test_backreference_after_group_is_accepted() {
        let root = Unit::ImplicitGroup(vec![
            Unit::capturing(vec![Unit::character('a')]),
            Unit::BackReference(1),
        ]);
        let compiled = compile(root).unwrap();
        assert!(compiled.has_backreferences());
        assert!(!compiled.is_regular());
        assert_eq!(compiled.group_count(), 1);
    }

    #[test]
    fn test_invalid_range() {
        let root = Unit::quantified(
            Unit::character('a'),
            Quantifier::greedy(QuantifierKind::Range {
                lower: 3,
                upper: Some(2),
            }),
        );
        assert_eq!(
            compile(root).unwrap_err(),
            CompileError::InvalidRange { lower: 3, upper: 2 }
        );
    }

    fn repeat(unit: Unit, lower: usize, upper: Option<usize>) -> Unit {
        Unit::quantified(unit, Quantifier::greedy(QuantifierKind::Range { lower, upper }))
    }

    #[test]
    fn test_repetition_too_large() {
        let root = repeat(Unit::character('a'), usize::MAX, None);
        assert_eq!(
            compile(root).unwrap_err(),
            CompileError::RepetitionTooLarge(usize::MAX)
        );
        let root = repeat(Unit::character('a'), 1, Some(REPETITION_MAX + 1));
        assert_eq!(
            compile(root).unwrap_err(),
            CompileError::RepetitionTooLarge(REPETITION_MAX + 1)
        );
        assert!(compile(repeat(Unit::character('a'), REPETITION_MAX, None)).is_ok());
    }

    #[test]
    fn test_nested_repetition_hits_state_limit() {
        // (?:(?:a{100}){100}){100}
        let inner = repeat(Unit::character('a'), 100, Some(100));
        let middle = repeat(Unit::non_capturing(vec![inner]), 100, Some(100));
        let root = repeat(Unit::non_capturing(vec![middle]), 100, Some(100));
        assert_eq!(
            compile(root).unwrap_err(),
            CompileError::TooManyStates(STATE_LIMIT)
        );
    }

    #[test]
    fn test_group_index_zero_is_rejected() {
        let root = Unit::ImplicitGroup(vec![
            Unit::character('x'),
            Unit::Group(Group {
                index: Some(0),
                is_capturing: true,
                children: vec![Unit::character('a')],
            }),
        ]);
        assert_eq!(
            compile(root).unwrap_err(),
            CompileError::InvalidGroupIndex(0)
        );
    }

    #[test]
    fn test_empty_sequence_and_group() {
        assert_eq!(
            compile(Unit::ImplicitGroup(vec![])).unwrap_err(),
            CompileError::EmptySequence
        );
        assert_eq!(
            compile(Unit::Alternation(vec![])).unwrap_err(),
            CompileError::EmptySequence
        );
        let empty = Unit::CharacterGroup(CharacterGroup {
            is_inverted: false,
            items: vec![],
        });
        assert_eq!(compile(empty).unwrap_err(), CompileError::EmptyCharacterGroup);
    }

    #[test]
    fn test_lazy_quantifier_is_not_regular() {
        let root = Unit::quantified(
            Unit::character('a'),
            Quantifier::lazy(QuantifierKind::OneOrMore),
        );
        let compiled = compile(root).unwrap();
        assert!(compiled.has_lazy_quantifiers());
        assert!(!compiled.is_regular());
    }

    #[test]
    fn test_groups_numbered_left_to_right() {
        // ((a)(b))
        let root = Unit::capturing(vec![
            Unit::capturing(vec![Unit::character('a')]),
            Unit::capturing(vec![Unit::character('b')]),
        ]);
        let compiled = compile(root).unwrap();
        assert_eq!(compiled.group_count(), 3);
        let mut indices: Vec<usize> = compiled.capture_groups().iter().map(|g| g.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![1, 2, 3]);
        // The outermost group starts where the automaton starts.
        let outer = compiled
            .capture_groups()
            .iter()
            .find(|g| g.index == 1)
            .unwrap();
        assert_eq!(outer.start, compiled.start());
    }

    #[test]
    fn test_explicit_group_index_is_kept() {
        let root = Unit::Group(Group {
            index: Some(4),
            is_capturing: true,
            children: vec![Unit::character('a')],
        });
        let compiled = compile(root).unwrap();
        assert_eq!(compiled.group_count(), 4);
        assert_eq!(compiled.capture_groups()[0].index, 4);
    }

    #[test]
    fn test_renumbering_is_dense_breadth_first() {
        let compiled = compile_unoptimized(Unit::string("ab"));
        assert_eq!(compiled.start().index(), 0);
        // a: s0 -a-> s1 -ε-> s2 -b-> s3
        assert_eq!(compiled.state_count(), 4);
        for i in 0..compiled.state_count() - 1 {
            let transitions = compiled.transitions(StateId::from_index(i));
            assert_eq!(transitions.len(), 1);
            assert_eq!(transitions[0].target.index(), i + 1);
        }
        assert_eq!(compiled.terminal().index(), 3);
    }

    #[test]
    fn test_regular_string_is_a_character_chain() {
        let compiled = compile(Unit::string("abc")).unwrap();
        assert!(compiled.is_regular());
        let consuming: Vec<String> = (0..compiled.state_count())
            .flat_map(|i| compiled.transitions(StateId::from_index(i)).to_vec())
            .filter(|t| !t.condition.is_epsilon())
            .map(|t| t.condition.to_string())
            .collect();
        assert_eq!(consuming, vec!["'a'", "'b'", "'c'"]);
    }

    #[test]
    fn test_non_regular_string_is_one_condition() {
        let root = Unit::ImplicitGroup(vec![
            Unit::capturing(vec![Unit::character('x')]),
            Unit::string("abc"),
            Unit::BackReference(1),
        ]);
        let compiled = compile(root).unwrap();
        let has_string = (0..compiled.state_count()).any(|i| {
            compiled
                .transitions(StateId::from_index(i))
                .iter()
                .any(|t| matches!(t.condition, Condition::String { .. }))
        });
        assert!(has_string);
    }

    #[test]
    fn test_optimizer_removes_pass_through_states() {
        let root = Unit::ImplicitGroup(vec![
            Unit::character('a'),
            Unit::non_capturing(vec![Unit::character('b')]),
            Unit::character('c'),
        ]);
        let plain = compile_unoptimized(root.clone());
        let optimized = compile(root).unwrap();
        assert!(optimized.state_count() < plain.state_count());
    }

    #[test]
    fn test_optimizer_keeps_capture_boundaries() {
        let root = Unit::ImplicitGroup(vec![
            Unit::character('a'),
            Unit::capturing(vec![Unit::character('b')]),
        ]);
        let compiled = compile(root).unwrap();
        let group = compiled.capture_groups()[0];
        assert!(compiled.boundary(group.start).is_some());
        assert!(compiled.boundary(group.end).is_some());
    }

    #[test]
    fn test_range_zero_zero_is_empty() {
        let root = Unit::quantified(
            Unit::character('a'),
            Quantifier::greedy(QuantifierKind::Range {
                lower: 0,
                upper: Some(0),
            }),
        );
        let compiled = compile(root).unwrap();
        let consuming = (0..compiled.state_count())
            .flat_map(|i| compiled.transitions(StateId::from_index(i)).to_vec())
            .filter(|t| !t.condition.is_epsilon())
            .count();
        assert_eq!(consuming, 0);
    }

    #[test]
    fn test_range_copies_child() {
        let root = Unit::quantified(
            Unit::Match(Atom::AnyCharacter),
            Quantifier::greedy(QuantifierKind::Range {
                lower: 2,
                upper: Some(4),
            }),
        );
        let compiled = compile(root).unwrap();
        let consuming = (0..compiled.state_count())
            .flat_map(|i| compiled.transitions(StateId::from_index(i)).to_vec())
            .filter(|t| !t.condition.is_epsilon())
            .count();
        assert_eq!(consuming, 4);
    }

    #[test]
    fn test_anchor_options() {
        let root = Unit::Anchor(Anchor::StartOfString);
        let compiled = Compiler::new(Options::new().multiline(true))
            .compile(&Ast::new(root.clone()))
            .unwrap();
        assert!(compiled.describe().contains("ε[^]"));

        let compiled = compile(root).unwrap();
        assert!(compiled.describe().contains("ε[\\A]"));
    }

    #[test]
    fn test_anchored_at_start_only_without_multiline() {
        let ast = Ast {
            from_start_of_string: true,
            root: Unit::ImplicitGroup(vec![
                Unit::Anchor(Anchor::StartOfString),
                Unit::character('a'),
            ]),
        };
        assert!(Compiler::new(Options::new()).compile(&ast).unwrap().anchored_at_start());
        assert!(!Compiler::new(Options::new().multiline(true))
            .compile(&ast)
            .unwrap()
            .anchored_at_start());
    }

    #[test]
    fn test_character_group_items() {
        let root = Unit::CharacterGroup(CharacterGroup {
            is_inverted: true,
            items: vec![GroupItem::Range('a', 'c'), GroupItem::Character('x')],
        });
        let compiled = compile(root).unwrap();
        let condition = compiled.transitions(compiled.start())[0].condition.clone();
        match condition {
            Condition::CharacterSet { set, negated, .. } => {
                assert!(negated);
                assert!(set.contains('b'));
                assert!(set.contains('x'));
                assert!(!set.contains('d'));
            }
            other => panic!("unexpected condition {}", other),
        }
    }

    #[test]
    fn test_symbols_describe_states() {
        let root = Unit::capturing(vec![Unit::character('a')]);
        let compiled = Compiler::new(Options::new().symbols(true))
            .compile(&Ast::new(root.clone()))
            .unwrap();
        let symbols = compiled.symbols().unwrap();
        assert!(!symbols.is_empty());
        let description = compiled.describe();
        assert!(description.contains("open(1)"));
        assert!(description.contains("start Group(1)"));

        assert!(compile(root).unwrap().symbols().is_none());
    }
}
