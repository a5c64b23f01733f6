//! Pattern parsing.
//!
//! Turns pattern text into an [`Ast`]. Supports:
//! - literals and `.`
//! - `(...)` capturing and `(?:...)` non-capturing groups
//! - `|` alternation
//! - `*`, `+`, `?`, `{m}`, `{m,}`, `{m,n}`, each optionally lazy (`?`)
//! - `[...]` and `[^...]` with ranges and class escapes
//! - `\d \D \s \S \w \W`, `\p{..}` / `\P{..}` for the categories `P`, `Lt`,
//!   `Ll`, `N` and `S`
//! - anchors `^ $ \A \Z \z \b \B \G` and backreferences `\1`..`\99`
//!
//! A `{` that does not start a valid quantifier is a literal, and counts
//! above [`REPETITION_MAX`] are rejected. Runs of unquantified literal
//! chars are merged into a single string atom.

use std::fmt;

use crate::ast::{
    Anchor, Ast, Atom, CharacterGroup, Group, GroupItem, Quantifier, QuantifierKind, Unit,
    REPETITION_MAX,
};
use crate::charset::CharacterSet;
use crate::unicode_categories::{self, NamedClass};

/// Error type for pattern parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the pattern.
    pub offset: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Parse a pattern into an AST.
pub fn parse(pattern: &str) -> Result<Ast, ParseError> {
    if pattern.is_empty() {
        return Err(ParseError {
            message: "empty pattern".into(),
            offset: 0,
        });
    }
    let mut parse = PatternParse::new(pattern);
    let mut children = read_alternation(&mut parse)?;

    if let Some(c) = parse.peek() {
        // Only a stray ')' stops the top-level alternation early.
        return Err(parse.error(format!("unmatched '{}'", c), parse.index));
    }

    let from_start_of_string = matches!(
        children.first(),
        Some(Unit::Anchor(Anchor::StartOfString))
    );
    let root = if children.len() == 1 {
        children.remove(0)
    } else {
        Unit::ImplicitGroup(children)
    };
    Ok(Ast {
        from_start_of_string,
        root,
    })
}

/// Parser state.
struct PatternParse<'p> {
    pattern: &'p str,
    index: usize,
    last_index: usize,
}

impl<'p> PatternParse<'p> {
    fn new(pattern: &'p str) -> Self {
        Self {
            pattern,
            index: 0,
            last_index: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.pattern[self.index..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.last_index = self.index;
        self.index += c.len_utf8();
        Some(c)
    }

    /// Consume `c` if it is next.
    fn bypass_optional(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn rest(&self) -> &'p str {
        &self.pattern[self.index..]
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError {
            message: message.into(),
            offset,
        }
    }
}

/// Read `|`-separated branches up to `)` or the end. A single branch comes
/// back as its units; several come back as one alternation.
fn read_alternation(parse: &mut PatternParse<'_>) -> Result<Vec<Unit>, ParseError> {
    let start = parse.index;
    let first = read_sequence(parse)?;
    if parse.peek() != Some('|') {
        return Ok(first);
    }

    let mut branches = vec![first];
    while parse.bypass_optional('|') {
        branches.push(read_sequence(parse)?);
    }
    if branches.iter().any(Vec::is_empty) {
        return Err(parse.error("empty alternative", start));
    }
    let branches = branches
        .into_iter()
        .map(|mut units| {
            if units.len() == 1 {
                units.remove(0)
            } else {
                Unit::ImplicitGroup(units)
            }
        })
        .collect();
    Ok(vec![Unit::Alternation(branches)])
}

/// Read pieces until `|`, `)` or the end.
fn read_sequence(parse: &mut PatternParse<'_>) -> Result<Vec<Unit>, ParseError> {
    let mut units = Vec::new();
    while let Some(c) = parse.peek() {
        if c == '|' || c == ')' {
            break;
        }
        units.push(read_piece(parse)?);
    }
    Ok(merge_literals(units))
}

/// Merge runs of two or more single-char matches into string matches.
fn merge_literals(units: Vec<Unit>) -> Vec<Unit> {
    let mut merged = Vec::with_capacity(units.len());
    let mut run = String::new();
    let mut run_len = 0usize;

    let flush = |merged: &mut Vec<Unit>, run: &mut String, run_len: &mut usize| {
        match *run_len {
            0 => {}
            1 => merged.extend(run.chars().map(Unit::character)),
            _ => merged.push(Unit::string(run.as_str())),
        }
        run.clear();
        *run_len = 0;
    };

    for unit in units {
        match unit {
            Unit::Match(Atom::Character(c)) => {
                run.push(c);
                run_len += 1;
            }
            other => {
                flush(&mut merged, &mut run, &mut run_len);
                merged.push(other);
            }
        }
    }
    flush(&mut merged, &mut run, &mut run_len);
    merged
}

/// Read an atom and its quantifier, if any.
fn read_piece(parse: &mut PatternParse<'_>) -> Result<Unit, ParseError> {
    let atom = read_atom(parse)?;
    let quantifier_at = parse.index;
    let Some(quantifier) = read_quantifier(parse)? else {
        return Ok(atom);
    };
    if matches!(atom, Unit::Anchor(_)) {
        return Err(parse.error("quantified anchor", quantifier_at));
    }
    if let Some(c) = parse.peek() {
        if matches!(c, '*' | '+' | '?') || (c == '{' && peek_range(parse.rest()).is_some()) {
            return Err(parse.error("nothing to quantify", parse.index));
        }
    }
    Ok(Unit::quantified(atom, quantifier))
}

/// Read `*`, `+`, `?` or `{..}` plus an optional lazy `?`.
fn read_quantifier(parse: &mut PatternParse<'_>) -> Result<Option<Quantifier>, ParseError> {
    let start = parse.index;
    let kind = match parse.peek() {
        Some('*') => QuantifierKind::ZeroOrMore,
        Some('+') => QuantifierKind::OneOrMore,
        Some('?') => QuantifierKind::ZeroOrOne,
        Some('{') => match peek_range(parse.rest()) {
            Some((kind, len)) => {
                if let QuantifierKind::Range { lower, upper } = kind {
                    let largest = upper.map_or(lower, |upper| upper.max(lower));
                    if largest > REPETITION_MAX {
                        return Err(parse.error(
                            format!("repetition count exceeds {}", REPETITION_MAX),
                            start,
                        ));
                    }
                    if let Some(upper) = upper.filter(|&upper| lower > upper) {
                        return Err(parse.error(
                            format!("invalid quantifier range {{{},{}}}", lower, upper),
                            start,
                        ));
                    }
                }
                parse.index += len - 1;
                kind
            }
            None => return Ok(None),
        },
        _ => return Ok(None),
    };
    parse.next_char();
    let is_lazy = parse.bypass_optional('?');
    Ok(Some(Quantifier { kind, is_lazy }))
}

/// Recognize `{m}`, `{m,}` or `{m,n}` at the start of `text`, returning the
/// kind and its length in bytes.
fn peek_range(text: &str) -> Option<(QuantifierKind, usize)> {
    let body = text.strip_prefix('{')?;
    let close = body.find('}')?;
    let inner = &body[..close];
    let len = close + 2;

    // Digits that overflow saturate, so the caller reports the bound.
    let number = |s: &str| -> Option<usize> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(s.parse().unwrap_or(usize::MAX))
    };

    let kind = match inner.split_once(',') {
        None => {
            let n = number(inner)?;
            QuantifierKind::Range {
                lower: n,
                upper: Some(n),
            }
        }
        Some((lower, "")) => QuantifierKind::Range {
            lower: number(lower)?,
            upper: None,
        },
        Some((lower, upper)) => QuantifierKind::Range {
            lower: number(lower)?,
            upper: Some(number(upper)?),
        },
    };
    Some((kind, len))
}

fn read_atom(parse: &mut PatternParse<'_>) -> Result<Unit, ParseError> {
    let start = parse.index;
    let Some(c) = parse.next_char() else {
        return Err(parse.error("unexpected end of pattern", start));
    };

    match c {
        '(' => {
            let is_capturing = !parse.rest().starts_with("?:");
            if !is_capturing {
                parse.index += 2;
            }
            let children = read_alternation(parse)?;
            if !parse.bypass_optional(')') {
                return Err(parse.error("unmatched '('", start));
            }
            Ok(Unit::Group(Group {
                index: None,
                is_capturing,
                children,
            }))
        }
        '[' => read_character_group(parse, start),
        '.' => Ok(Unit::Match(Atom::AnyCharacter)),
        '^' => Ok(Unit::Anchor(Anchor::StartOfString)),
        '$' => Ok(Unit::Anchor(Anchor::EndOfString)),
        '\\' => read_escape(parse, start),
        '*' | '+' | '?' => Err(parse.error("nothing to quantify", start)),
        '{' if peek_range(&parse.pattern[start..]).is_some() => {
            Err(parse.error("nothing to quantify", start))
        }
        c => Ok(Unit::character(c)),
    }
}

/// A named class, possibly complemented, as a match unit.
fn class_unit(set: &CharacterSet, negated: bool) -> Unit {
    if negated {
        Unit::Match(Atom::Group(CharacterGroup {
            is_inverted: true,
            items: vec![GroupItem::Set(set.clone())],
        }))
    } else {
        Unit::Match(Atom::Set(set.clone()))
    }
}

/// The class behind `\d \D \s \S \w \W`, and whether it is complemented.
fn shorthand_class(c: char) -> Option<(NamedClass, bool)> {
    match c {
        'd' => Some((NamedClass::DecimalDigit, false)),
        'D' => Some((NamedClass::DecimalDigit, true)),
        's' => Some((NamedClass::Whitespace, false)),
        'S' => Some((NamedClass::Whitespace, true)),
        'w' => Some((NamedClass::Word, false)),
        'W' => Some((NamedClass::Word, true)),
        _ => None,
    }
}

/// Control escapes, valid both inside and outside classes.
fn control_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'f' => Some('\u{0C}'),
        'v' => Some('\u{0B}'),
        _ => None,
    }
}

/// Read the `{Name}` after `\p` or `\P`.
fn read_category(parse: &mut PatternParse<'_>, start: usize) -> Result<NamedClass, ParseError> {
    if !parse.bypass_optional('{') {
        return Err(parse.error("expected '{' after \\p", start));
    }
    let rest = parse.rest();
    let Some(close) = rest.find('}') else {
        return Err(parse.error("unclosed Unicode category", start));
    };
    let name = &rest[..close];
    parse.index += close + 1;
    NamedClass::from_category(name)
        .ok_or_else(|| parse.error(format!("unknown Unicode category '{}'", name), start))
}

fn read_escape(parse: &mut PatternParse<'_>, start: usize) -> Result<Unit, ParseError> {
    let Some(c) = parse.next_char() else {
        return Err(parse.error("trailing backslash", start));
    };

    if let Some((class, negated)) = shorthand_class(c) {
        return Ok(class_unit(unicode_categories::named(class), negated));
    }
    if let Some(ch) = control_escape(c) {
        return Ok(Unit::character(ch));
    }

    let anchor = match c {
        'b' => Some(Anchor::WordBoundary),
        'B' => Some(Anchor::NonWordBoundary),
        'A' => Some(Anchor::StartOfStringOnly),
        'Z' => Some(Anchor::EndOfStringOnly),
        'z' => Some(Anchor::EndOfStringOnlyNotNewline),
        'G' => Some(Anchor::PreviousMatchEnd),
        _ => None,
    };
    if let Some(anchor) = anchor {
        return Ok(Unit::Anchor(anchor));
    }

    match c {
        'p' | 'P' => {
            let class = read_category(parse, start)?;
            Ok(class_unit(unicode_categories::named(class), c == 'P'))
        }
        '1'..='9' => {
            let digits_end = parse
                .rest()
                .find(|d: char| !d.is_ascii_digit())
                .unwrap_or(parse.rest().len());
            let digits = &parse.pattern[parse.last_index..parse.index + digits_end];
            parse.index += digits_end;
            digits
                .parse()
                .map(Unit::BackReference)
                .map_err(|_| parse.error("backreference out of range", start))
        }
        c if !c.is_alphanumeric() => Ok(Unit::character(c)),
        c => Err(parse.error(format!("unknown escape '\\{}'", c), start)),
    }
}

/// One member of a class: a char, or a whole set from an escape.
enum ClassMember {
    Char(char),
    Set(CharacterSet),
}

fn read_class_member(parse: &mut PatternParse<'_>, c: char) -> Result<ClassMember, ParseError> {
    if c != '\\' {
        return Ok(ClassMember::Char(c));
    }
    let start = parse.last_index;
    let Some(e) = parse.next_char() else {
        return Err(parse.error("trailing backslash", start));
    };
    if let Some((class, negated)) = shorthand_class(e) {
        let set = unicode_categories::named(class);
        return Ok(ClassMember::Set(if negated {
            set.inverted()
        } else {
            set.clone()
        }));
    }
    if let Some(ch) = control_escape(e) {
        return Ok(ClassMember::Char(ch));
    }
    match e {
        'p' | 'P' => {
            let set = unicode_categories::named(read_category(parse, start)?);
            Ok(ClassMember::Set(if e == 'P' {
                set.inverted()
            } else {
                set.clone()
            }))
        }
        // Backspace, as in most dialects.
        'b' => Ok(ClassMember::Char('\u{08}')),
        e if !e.is_alphanumeric() => Ok(ClassMember::Char(e)),
        e => Err(parse.error(format!("unknown escape '\\{}'", e), start)),
    }
}

/// Read the rest of `[...]`; `start` is the offset of the `[`.
fn read_character_group(parse: &mut PatternParse<'_>, start: usize) -> Result<Unit, ParseError> {
    let is_inverted = parse.bypass_optional('^');
    let mut items = Vec::new();

    loop {
        let Some(c) = parse.next_char() else {
            return Err(parse.error("unclosed character group", start));
        };
        if c == ']' {
            break;
        }
        let member_at = parse.last_index;
        let lo = match read_class_member(parse, c)? {
            ClassMember::Set(set) => {
                items.push(GroupItem::Set(set));
                continue;
            }
            ClassMember::Char(lo) => lo,
        };

        // `a-z`, unless the '-' is the last thing before ']'.
        let rest = parse.rest();
        if rest.len() > 1 && rest.starts_with('-') && !rest[1..].starts_with(']') {
            parse.next_char();
            let Some(h) = parse.next_char() else {
                return Err(parse.error("unclosed character group", start));
            };
            let hi = match read_class_member(parse, h)? {
                ClassMember::Char(hi) => hi,
                ClassMember::Set(_) => {
                    return Err(parse.error("invalid range in character group", member_at))
                }
            };
            if lo > hi {
                return Err(parse.error(
                    format!("inverted range '{}-{}'", lo, hi),
                    member_at,
                ));
            }
            items.push(GroupItem::Range(lo, hi));
        } else {
            items.push(GroupItem::Character(lo));
        }
    }

    if items.is_empty() {
        return Err(parse.error("empty character group", start));
    }
    Ok(Unit::CharacterGroup(CharacterGroup { is_inverted, items }))
}
