//! The pattern abstract syntax tree.
//!
//! The parser produces an [`Ast`]; the compiler consumes it and never
//! mutates it. Every consumer matches on [`Unit`] exhaustively, so a new
//! node kind is a compile-time obligation everywhere it is used.

use std::fmt;

use crate::charset::CharacterSet;

/// Largest count allowed in a `{m,n}` quantifier.
pub const REPETITION_MAX: usize = 1000;

/// A parsed pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    /// The pattern began with `^`.
    pub from_start_of_string: bool,
    pub root: Unit,
}

impl Ast {
    pub fn new(root: Unit) -> Self {
        Self {
            from_start_of_string: false,
            root,
        }
    }

    /// An indented tree, one unit per line.
    pub fn description(&self) -> String {
        let mut out = String::new();
        describe(&self.root, 0, &mut out);
        out
    }
}

fn describe(unit: &Unit, level: usize, out: &mut String) {
    out.push_str(&" ".repeat(level * 2));
    out.push_str("- ");
    out.push_str(&unit.to_string());
    out.push('\n');
    for child in unit.children() {
        describe(child, level + 1, out);
    }
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    /// `a|b|c`; branch order is match priority.
    Alternation(Vec<Unit>),
    /// `(...)` or `(?:...)`.
    Group(Group),
    /// An unparenthesized sequence.
    ImplicitGroup(Vec<Unit>),
    Anchor(Anchor),
    /// `\n`, 1-based.
    BackReference(usize),
    CharacterGroup(CharacterGroup),
    Match(Atom),
    Quantified(QuantifiedExpression),
}

impl Unit {
    /// Direct sub-units, in source order.
    pub fn children(&self) -> &[Unit] {
        match self {
            Unit::Alternation(children) | Unit::ImplicitGroup(children) => children,
            Unit::Group(group) => &group.children,
            Unit::Quantified(q) => std::slice::from_ref(&q.expression),
            Unit::Anchor(_) | Unit::BackReference(_) | Unit::CharacterGroup(_) | Unit::Match(_) => {
                &[]
            }
        }
    }

    pub fn quantified(expression: Unit, quantifier: Quantifier) -> Unit {
        Unit::Quantified(QuantifiedExpression {
            expression: Box::new(expression),
            quantifier,
        })
    }

    pub fn capturing(children: Vec<Unit>) -> Unit {
        Unit::Group(Group {
            index: None,
            is_capturing: true,
            children,
        })
    }

    pub fn non_capturing(children: Vec<Unit>) -> Unit {
        Unit::Group(Group {
            index: None,
            is_capturing: false,
            children,
        })
    }

    pub fn character(c: char) -> Unit {
        Unit::Match(Atom::Character(c))
    }

    pub fn string(s: impl Into<String>) -> Unit {
        Unit::Match(Atom::String(s.into()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Alternation(_) => write!(f, "Alternation"),
            Unit::Group(group) => match (group.is_capturing, group.index) {
                (true, Some(index)) => write!(f, "Group({})", index),
                (true, None) => write!(f, "Group"),
                (false, _) => write!(f, "Group(non-capturing)"),
            },
            Unit::ImplicitGroup(_) => write!(f, "ImplicitGroup"),
            Unit::Anchor(anchor) => write!(f, "Anchor.{}", anchor),
            Unit::BackReference(index) => write!(f, "BackReference({})", index),
            Unit::CharacterGroup(group) => write!(f, "{}", group),
            Unit::Match(atom) => write!(f, "{}", atom),
            Unit::Quantified(q) => write!(f, "Quantifier({})", q.quantifier),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Explicit capture index; the compiler numbers groups left-to-right
    /// when this is `None`.
    pub index: Option<usize>,
    pub is_capturing: bool,
    pub children: Vec<Unit>,
}

/// Zero-width assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `^`
    StartOfString,
    /// `$`
    EndOfString,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `\A`
    StartOfStringOnly,
    /// `\Z`
    EndOfStringOnly,
    /// `\z`
    EndOfStringOnlyNotNewline,
    /// `\G`
    PreviousMatchEnd,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Anchor::StartOfString => "start_of_string",
            Anchor::EndOfString => "end_of_string",
            Anchor::WordBoundary => "word_boundary",
            Anchor::NonWordBoundary => "non_word_boundary",
            Anchor::StartOfStringOnly => "start_of_string_only",
            Anchor::EndOfStringOnly => "end_of_string_only",
            Anchor::EndOfStringOnlyNotNewline => "end_of_string_only_not_newline",
            Anchor::PreviousMatchEnd => "previous_match_end",
        };
        f.write_str(name)
    }
}

/// `[...]` or `[^...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterGroup {
    pub is_inverted: bool,
    pub items: Vec<GroupItem>,
}

impl CharacterGroup {
    /// Union of every item's chars. Inversion is left to the caller.
    pub fn items_set(&self) -> CharacterSet {
        self.items
            .iter()
            .fold(CharacterSet::empty(), |set, item| match item {
                GroupItem::Character(c) => set.union(&CharacterSet::from_char(*c)),
                GroupItem::Range(lo, hi) => set.union(&CharacterSet::from_range(*lo, *hi)),
                GroupItem::Set(other) => set.union(other),
            })
    }
}

impl fmt::Display for CharacterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CharacterGroup(inverted: {}, items: {})",
            self.is_inverted,
            self.items.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupItem {
    Character(char),
    /// Inclusive.
    Range(char, char),
    Set(CharacterSet),
}

/// A unit that consumes input.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// `.`
    AnyCharacter,
    Character(char),
    String(String),
    Set(CharacterSet),
    Group(CharacterGroup),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::AnyCharacter => write!(f, "Match.AnyCharacter"),
            Atom::Character(c) => write!(f, "Match.Character({:?})", c),
            Atom::String(s) => write!(f, "Match.String({:?})", s),
            Atom::Set(set) => write!(f, "Match.Set({:?})", set),
            Atom::Group(group) => write!(f, "Match.{}", group),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantifiedExpression {
    pub expression: Box<Unit>,
    pub quantifier: Quantifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub is_lazy: bool,
}

impl Quantifier {
    pub fn greedy(kind: QuantifierKind) -> Self {
        Self {
            kind,
            is_lazy: false,
        }
    }

    pub fn lazy(kind: QuantifierKind) -> Self {
        Self {
            kind,
            is_lazy: true,
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            QuantifierKind::ZeroOrMore => write!(f, "*")?,
            QuantifierKind::OneOrMore => write!(f, "+")?,
            QuantifierKind::ZeroOrOne => write!(f, "?")?,
            QuantifierKind::Range { lower, upper: None } => write!(f, "{{{},}}", lower)?,
            QuantifierKind::Range {
                lower,
                upper: Some(upper),
            } => write!(f, "{{{},{}}}", lower, upper)?,
        }
        if self.is_lazy {
            write!(f, "?")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
    /// `{lower,upper}`; `upper` is `None` for `{lower,}`.
    Range { lower: usize, upper: Option<usize> },
}
