//! Unicode data for the named character sets.
//!
//! The tables come from `regex-syntax`, which ships the Unicode general
//! category and property data. Each named class is translated once into
//! [`RunePair`] ranges and cached for the life of the process.

use std::sync::OnceLock;

use regex_syntax::hir::{Class, Hir, HirKind};

use crate::charset::{CharacterSet, RunePair};

/// The character classes that can be named in a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedClass {
    DecimalDigit,
    Whitespace,
    Word,
    Punctuation,
    CapitalizedLetter,
    LowercaseLetter,
    NonSpacingMark,
    Symbol,
}

impl NamedClass {
    const ALL: [NamedClass; 8] = [
        NamedClass::DecimalDigit,
        NamedClass::Whitespace,
        NamedClass::Word,
        NamedClass::Punctuation,
        NamedClass::CapitalizedLetter,
        NamedClass::LowercaseLetter,
        NamedClass::NonSpacingMark,
        NamedClass::Symbol,
    ];

    /// Look up a category from the name inside `\p{...}`.
    ///
    /// Only the categories the pattern syntax documents are accepted; note
    /// that `N` names the non-spacing marks, not numbers.
    pub fn from_category(name: &str) -> Option<NamedClass> {
        match name {
            "P" => Some(NamedClass::Punctuation),
            "Lt" => Some(NamedClass::CapitalizedLetter),
            "Ll" => Some(NamedClass::LowercaseLetter),
            "N" => Some(NamedClass::NonSpacingMark),
            "S" => Some(NamedClass::Symbol),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    /// The `regex-syntax` class expression holding this class's data.
    fn source(self) -> &'static str {
        match self {
            NamedClass::DecimalDigit => r"[\p{Nd}]",
            NamedClass::Whitespace => r"[\s]",
            NamedClass::Word => r"[\p{L}\p{Nd}_]",
            NamedClass::Punctuation => r"[\p{P}]",
            NamedClass::CapitalizedLetter => r"[\p{Lu}\p{Lt}]",
            NamedClass::LowercaseLetter => r"[\p{Ll}]",
            NamedClass::NonSpacingMark => r"[\p{Mn}]",
            NamedClass::Symbol => r"[\p{S}]",
        }
    }
}

fn cache() -> &'static [OnceLock<CharacterSet>; NamedClass::ALL.len()] {
    static CACHE: [OnceLock<CharacterSet>; NamedClass::ALL.len()] =
        [const { OnceLock::new() }; NamedClass::ALL.len()];
    &CACHE
}

/// The set for a named class.
pub fn named(class: NamedClass) -> &'static CharacterSet {
    cache()[class.slot()].get_or_init(|| CharacterSet::from_ranges(class_ranges(class)))
}

/// Translate the class's source expression into rune ranges.
fn class_ranges(class: NamedClass) -> Vec<RunePair> {
    let hir = match regex_syntax::ParserBuilder::new()
        .unicode(true)
        .build()
        .parse(class.source())
    {
        Ok(hir) => hir,
        Err(err) => {
            log::error!("unicode table for {:?} unavailable: {}", class, err);
            return Vec::new();
        }
    };
    hir_ranges(&hir)
}

fn hir_ranges(hir: &Hir) -> Vec<RunePair> {
    match hir.kind() {
        HirKind::Class(Class::Unicode(cls)) => cls
            .ranges()
            .iter()
            .map(|r| RunePair::new(r.start(), r.end()))
            .collect(),
        // A one-char class is folded into a literal.
        HirKind::Literal(lit) => std::str::from_utf8(&lit.0)
            .map(|s| s.chars().map(RunePair::single).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_class_has_data() {
        for class in NamedClass::ALL {
            assert!(!named(class).is_empty(), "{:?} should not be empty", class);
        }
    }

    #[test]
    fn test_from_category() {
        assert_eq!(NamedClass::from_category("P"), Some(NamedClass::Punctuation));
        assert_eq!(NamedClass::from_category("N"), Some(NamedClass::NonSpacingMark));
        assert_eq!(NamedClass::from_category("Lu"), None);
        assert_eq!(NamedClass::from_category(""), None);
    }

    #[test]
    fn test_shorthand_classes() {
        let digits = named(NamedClass::DecimalDigit);
        assert!(digits.contains('0'));
        assert!(digits.contains('٣')); // Arabic-Indic three
        assert!(!digits.contains('#'));

        let ws = named(NamedClass::Whitespace);
        assert!(ws.contains(' '));
        assert!(ws.contains('\n'));
        assert!(!ws.contains('A'));

        let word = named(NamedClass::Word);
        assert!(word.contains('_'));
        assert!(word.contains('é'));
        assert!(!word.contains('-'));
    }

    #[test]
    fn test_categories() {
        assert!(named(NamedClass::Punctuation).contains('!'));
        assert!(!named(NamedClass::Punctuation).contains('a'));
        assert!(named(NamedClass::CapitalizedLetter).contains('ǅ'));
        assert!(!named(NamedClass::CapitalizedLetter).contains('a'));
        assert!(named(NamedClass::LowercaseLetter).contains('a'));
        assert!(named(NamedClass::NonSpacingMark).contains('\u{0301}'));
        assert!(named(NamedClass::Symbol).contains('$'));
        assert!(!named(NamedClass::Symbol).contains('!'));
    }

    #[test]
    fn test_named_is_cached() {
        let first = named(NamedClass::Symbol);
        let second = named(NamedClass::Symbol);
        assert!(std::ptr::eq(first, second));
    }
}
