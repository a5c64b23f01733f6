//! regex-fsm: regular expressions compiled to state machines
//!
//! A pattern is parsed into an [`Ast`], compiled into an immutable
//! [`CompiledAutomaton`], and run by one of two engines:
//!
//! - a backtracking matcher that supports everything, including
//!   backreferences and lazy quantifiers
//! - a linear-time simulation for regular patterns
//!
//! [`Regex`] picks the engine on its own:
//! ```
//! # use regex_fsm::Regex;
//! let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
//! let m = re.find("mail bob@example.com now").unwrap();
//! assert_eq!(m.as_str(), "bob@example.com");
//! assert_eq!(m.group(2), Some("example"));
//! ```

pub mod ast;
pub mod automaton;
pub mod charset;
pub mod compiler;
pub mod matcher;
pub mod options;
pub mod parser;
pub mod unicode_categories;

use std::fmt;
use std::sync::Arc;

pub use ast::{Anchor, Ast, Atom, CharacterGroup, Group, GroupItem, Quantifier, QuantifierKind, Unit};
pub use automaton::CompiledAutomaton;
pub use charset::CharacterSet;
pub use compiler::{CompileError, Compiler};
pub use matcher::{BacktrackingMatcher, Match, Matcher, RegularMatcher};
pub use options::Options;
pub use parser::{parse, ParseError};

/// Errors that can occur while building a [`Regex`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    Parse(ParseError),
    Compile(CompileError),
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::Parse(err) => write!(f, "invalid pattern: {}", err),
            RegexError::Compile(err) => write!(f, "compile error: {}", err),
        }
    }
}

impl std::error::Error for RegexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegexError::Parse(err) => Some(err),
            RegexError::Compile(err) => Some(err),
        }
    }
}

impl From<ParseError> for RegexError {
    fn from(err: ParseError) -> Self {
        RegexError::Parse(err)
    }
}

impl From<CompileError> for RegexError {
    fn from(err: CompileError) -> Self {
        RegexError::Compile(err)
    }
}

/// A compiled pattern.
///
/// Regex is Clone; clones share the compiled automaton, so a regex can be
/// handed to other threads cheaply:
/// ```
/// # use regex_fsm::Regex;
/// let re = Regex::new("a+").unwrap();
/// let shared = re.clone();
/// std::thread::spawn(move || assert!(shared.is_match("caab")))
///     .join()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Regex {
    automaton: Arc<CompiledAutomaton>,
    options: Options,
}

impl Regex {
    /// Compile `pattern` with default options
    pub fn new(pattern: &str) -> Result<Self, RegexError> {
        Self::with_options(pattern, Options::default())
    }

    pub fn with_options(pattern: &str, options: Options) -> Result<Self, RegexError> {
        let ast = parser::parse(pattern)?;
        Self::from_ast(&ast, options)
    }

    /// Compile an already-built tree
    pub fn from_ast(ast: &Ast, options: Options) -> Result<Self, RegexError> {
        log::debug!("compiling pattern tree:\n{}", ast.description());
        let automaton = Compiler::new(options).compile(ast)?;
        Ok(Regex {
            automaton: Arc::new(automaton),
            options,
        })
    }

    /// Whether the pattern matches anywhere in `input`
    pub fn is_match(&self, input: &str) -> bool {
        self.find(input).is_some()
    }

    /// The leftmost-first match in `input`
    pub fn find<'h>(&self, input: &'h str) -> Option<Match<'h>> {
        self.find_iter(input).next()
    }

    /// Successive non-overlapping matches in `input`
    pub fn find_iter<'a, 'h>(&'a self, input: &'h str) -> Matcher<'a, 'h> {
        Matcher::new(&self.automaton, input)
    }

    /// Number of capture groups, not counting the whole match
    pub fn captures_len(&self) -> usize {
        self.automaton.group_count()
    }

    pub fn automaton(&self) -> &CompiledAutomaton {
        &self.automaton
    }

    pub fn options(&self) -> Options {
        self.options
    }
}
