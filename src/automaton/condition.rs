//! The tests a transition performs against the cursor.
//!
//! A [`Condition`] either accepts, reporting how many bytes of input it
//! consumes, or rejects. Epsilon conditions consume nothing and may carry an
//! [`Assertion`] that must hold at the current position.

use std::fmt;

use crate::charset::{eq_ignore_case, CharacterSet};
use crate::unicode_categories::{self, NamedClass};

use super::cursor::Cursor;

/// Outcome of evaluating a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionResult {
    /// The transition may be taken, consuming this many bytes.
    Accepted(usize),
    Rejected,
}

/// The kind of zero-width assertion guarding an epsilon transition.
///
/// Each variant knows how to evaluate itself against a cursor; see
/// [`Assertion::holds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Assertion {
    /// Very start of the input (`\A`, and `^` outside multiline mode).
    StartOfInput,
    /// Start of input or just after `\n` (`^` in multiline mode).
    StartOfLine,
    /// End of input, or before a `\n` that ends the input (`\Z`, and `$`
    /// outside multiline mode).
    EndOfInputOrFinalNewline,
    /// End of input or before any `\n` (`$` in multiline mode).
    EndOfLine,
    /// Very end of the input (`\z`).
    EndOfInput,
    WordBoundary,
    NonWordBoundary,
    /// Where the previous match ended, or the start before any match (`\G`).
    PreviousMatchEnd,
}

impl Assertion {
    #[inline]
    pub fn holds(self, cursor: &Cursor<'_>) -> bool {
        match self {
            Assertion::StartOfInput => cursor.index() == 0,
            Assertion::StartOfLine => {
                cursor.index() == 0 || cursor.previous_character() == Some('\n')
            }
            Assertion::EndOfInputOrFinalNewline => {
                cursor.is_at_end()
                    || (cursor.is_at_last_character() && cursor.character() == Some('\n'))
            }
            Assertion::EndOfLine => cursor.is_at_end() || cursor.character() == Some('\n'),
            Assertion::EndOfInput => cursor.is_at_end(),
            Assertion::WordBoundary => {
                cursor.is_at_word_boundary(unicode_categories::named(NamedClass::Word))
            }
            Assertion::NonWordBoundary => {
                !cursor.is_at_word_boundary(unicode_categories::named(NamedClass::Word))
            }
            Assertion::PreviousMatchEnd => {
                cursor.index() == cursor.previous_match_end().unwrap_or(0)
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            Assertion::StartOfInput => "\\A",
            Assertion::StartOfLine => "^",
            Assertion::EndOfInputOrFinalNewline => "\\Z",
            Assertion::EndOfLine => "$",
            Assertion::EndOfInput => "\\z",
            Assertion::WordBoundary => "\\b",
            Assertion::NonWordBoundary => "\\B",
            Assertion::PreviousMatchEnd => "\\G",
        }
    }
}

/// What a transition requires of the input at the cursor.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Character {
        ch: char,
        ignore_case: bool,
    },
    /// A literal of `char_count` chars, matched in one step.
    String {
        literal: Box<str>,
        char_count: usize,
        ignore_case: bool,
    },
    CharacterSet {
        set: CharacterSet,
        ignore_case: bool,
        negated: bool,
    },
    AnyCharacter {
        includes_newline: bool,
    },
    /// Zero-width; `None` always holds.
    Epsilon(Option<Assertion>),
    /// The text captured so far by this group, repeated.
    BackReference(usize),
}

impl Condition {
    /// The unconditional epsilon.
    pub const EPSILON: Condition = Condition::Epsilon(None);

    pub fn string(literal: &str, ignore_case: bool) -> Condition {
        Condition::String {
            literal: literal.into(),
            char_count: literal.chars().count(),
            ignore_case,
        }
    }

    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Condition::Epsilon(_))
    }

    #[inline]
    pub fn is_unconditional_epsilon(&self) -> bool {
        matches!(self, Condition::Epsilon(None))
    }

    /// Evaluate against the cursor's current index and captures.
    pub fn evaluate(&self, cursor: &Cursor<'_>) -> ConditionResult {
        match self {
            Condition::Character { ch, ignore_case } => match cursor.character() {
                Some(c) if c == *ch || (*ignore_case && eq_ignore_case(c, *ch)) => {
                    ConditionResult::Accepted(c.len_utf8())
                }
                _ => ConditionResult::Rejected,
            },
            Condition::String {
                literal,
                char_count,
                ignore_case,
            } => {
                let rest = cursor.rest();
                if !*ignore_case {
                    return if rest.starts_with(&**literal) {
                        ConditionResult::Accepted(literal.len())
                    } else {
                        ConditionResult::Rejected
                    };
                }
                match prefix_ignore_case(rest, literal, *char_count) {
                    Some(len) => ConditionResult::Accepted(len),
                    None => ConditionResult::Rejected,
                }
            }
            Condition::CharacterSet {
                set,
                ignore_case,
                negated,
            } => match cursor.character() {
                Some(c) => {
                    let found = if *ignore_case {
                        set.contains_ignore_case(c)
                    } else {
                        set.contains(c)
                    };
                    if found != *negated {
                        ConditionResult::Accepted(c.len_utf8())
                    } else {
                        ConditionResult::Rejected
                    }
                }
                None => ConditionResult::Rejected,
            },
            Condition::AnyCharacter { includes_newline } => match cursor.character() {
                Some(c) if *includes_newline || c != '\n' => {
                    ConditionResult::Accepted(c.len_utf8())
                }
                _ => ConditionResult::Rejected,
            },
            Condition::Epsilon(None) => ConditionResult::Accepted(0),
            Condition::Epsilon(Some(assertion)) => {
                if assertion.holds(cursor) {
                    ConditionResult::Accepted(0)
                } else {
                    ConditionResult::Rejected
                }
            }
            Condition::BackReference(group) => {
                let Some(range) = cursor.group(*group) else {
                    return ConditionResult::Rejected;
                };
                let captured = &cursor.input()[range];
                if cursor.rest().starts_with(captured) {
                    ConditionResult::Accepted(captured.len())
                } else {
                    ConditionResult::Rejected
                }
            }
        }
    }
}

/// Length in bytes of the prefix of `haystack` that equals `literal`
/// ignoring case, comparing `char_count` chars.
fn prefix_ignore_case(haystack: &str, literal: &str, char_count: usize) -> Option<usize> {
    let mut consumed = 0;
    let mut input = haystack.chars();
    for expected in literal.chars() {
        let c = input.next()?;
        if !eq_ignore_case(c, expected) {
            return None;
        }
        consumed += c.len_utf8();
    }
    debug_assert_eq!(literal.chars().count(), char_count);
    Some(consumed)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Character { ch, ignore_case } => {
                write!(f, "{:?}", ch)?;
                if *ignore_case {
                    write!(f, "/i")?;
                }
                Ok(())
            }
            Condition::String {
                literal,
                ignore_case,
                ..
            } => {
                write!(f, "{:?}", literal)?;
                if *ignore_case {
                    write!(f, "/i")?;
                }
                Ok(())
            }
            Condition::CharacterSet { set, negated, .. } => {
                if *negated {
                    write!(f, "^")?;
                }
                write!(f, "{:?}", set)
            }
            Condition::AnyCharacter { includes_newline } => {
                write!(f, "{}", if *includes_newline { "(?s:.)" } else { "." })
            }
            Condition::Epsilon(None) => write!(f, "ε"),
            Condition::Epsilon(Some(assertion)) => write!(f, "ε[{}]", assertion.label()),
            Condition::BackReference(group) => write!(f, "\\{}", group),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at<'h>(input: &'h str, index: usize) -> Cursor<'h> {
        let mut cursor = Cursor::new(input, 0, 1);
        cursor.set_index(index);
        cursor
    }

    #[test]
    fn test_character() {
        let cond = Condition::Character {
            ch: 'a',
            ignore_case: false,
        };
        assert_eq!(cond.evaluate(&at("abc", 0)), ConditionResult::Accepted(1));
        assert_eq!(cond.evaluate(&at("abc", 1)), ConditionResult::Rejected);
        assert_eq!(cond.evaluate(&at("abc", 3)), ConditionResult::Rejected);
        assert_eq!(cond.evaluate(&at("Abc", 0)), ConditionResult::Rejected);

        let cond = Condition::Character {
            ch: 'é',
            ignore_case: true,
        };
        assert_eq!(cond.evaluate(&at("É!", 0)), ConditionResult::Accepted(2));
    }

    #[test]
    fn test_string() {
        let cond = Condition::string("cat", false);
        assert_eq!(cond.evaluate(&at("a cat", 2)), ConditionResult::Accepted(3));
        assert_eq!(cond.evaluate(&at("a ca", 2)), ConditionResult::Rejected);

        let cond = Condition::string("cat", true);
        assert_eq!(cond.evaluate(&at("CaT!", 0)), ConditionResult::Accepted(3));
        assert_eq!(cond.evaluate(&at("CaB!", 0)), ConditionResult::Rejected);
    }

    #[test]
    fn test_character_set() {
        let digits = Condition::CharacterSet {
            set: CharacterSet::from_range('0', '9'),
            ignore_case: false,
            negated: false,
        };
        assert_eq!(digits.evaluate(&at("7", 0)), ConditionResult::Accepted(1));
        assert_eq!(digits.evaluate(&at("x", 0)), ConditionResult::Rejected);

        let not_digits = Condition::CharacterSet {
            set: CharacterSet::from_range('0', '9'),
            ignore_case: false,
            negated: true,
        };
        assert_eq!(not_digits.evaluate(&at("x", 0)), ConditionResult::Accepted(1));
        assert_eq!(not_digits.evaluate(&at("7", 0)), ConditionResult::Rejected);
        assert_eq!(not_digits.evaluate(&at("", 0)), ConditionResult::Rejected);

        let not_lower = Condition::CharacterSet {
            set: CharacterSet::from_range('a', 'z'),
            ignore_case: true,
            negated: true,
        };
        assert_eq!(not_lower.evaluate(&at("Q", 0)), ConditionResult::Rejected);
        assert_eq!(not_lower.evaluate(&at("1", 0)), ConditionResult::Accepted(1));
    }

    #[test]
    fn test_any_character() {
        let dot = Condition::AnyCharacter {
            includes_newline: false,
        };
        assert_eq!(dot.evaluate(&at("x", 0)), ConditionResult::Accepted(1));
        assert_eq!(dot.evaluate(&at("\n", 0)), ConditionResult::Rejected);

        let dot_all = Condition::AnyCharacter {
            includes_newline: true,
        };
        assert_eq!(dot_all.evaluate(&at("\n", 0)), ConditionResult::Accepted(1));
    }

    #[test]
    fn test_assertions() {
        assert!(Assertion::StartOfInput.holds(&at("ab", 0)));
        assert!(!Assertion::StartOfInput.holds(&at("ab", 1)));
        assert!(Assertion::StartOfLine.holds(&at("a\nb", 2)));
        assert!(!Assertion::StartOfLine.holds(&at("a\nb", 1)));

        assert!(Assertion::EndOfInputOrFinalNewline.holds(&at("ab\n", 2)));
        assert!(Assertion::EndOfInputOrFinalNewline.holds(&at("ab\n", 3)));
        assert!(!Assertion::EndOfInputOrFinalNewline.holds(&at("a\nb", 1)));
        assert!(Assertion::EndOfLine.holds(&at("a\nb", 1)));
        assert!(!Assertion::EndOfInput.holds(&at("ab\n", 2)));
        assert!(Assertion::EndOfInput.holds(&at("ab\n", 3)));

        assert!(Assertion::WordBoundary.holds(&at("a cat", 2)));
        assert!(Assertion::NonWordBoundary.holds(&at("a cat", 3)));

        let mut cursor = at("abab", 2);
        assert!(!Assertion::PreviousMatchEnd.holds(&cursor));
        cursor.set_previous_match_end(Some(2));
        assert!(Assertion::PreviousMatchEnd.holds(&cursor));
    }

    #[test]
    fn test_back_reference() {
        let mut cursor = at("abab", 2);
        let cond = Condition::BackReference(1);
        assert_eq!(cond.evaluate(&cursor), ConditionResult::Rejected);

        cursor.replace_slot(2, Some(0));
        cursor.replace_slot(3, Some(2));
        assert_eq!(cond.evaluate(&cursor), ConditionResult::Accepted(2));

        cursor.set_index(1);
        assert_eq!(cond.evaluate(&cursor), ConditionResult::Rejected);
    }
}
