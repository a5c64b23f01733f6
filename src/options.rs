//! Compilation options.

/// Flags that change how a pattern is compiled.
///
/// ```
/// use regex_fsm::Options;
///
/// let options = Options::new().case_insensitive(true).multiline(true);
/// assert!(options.is_case_insensitive());
/// assert!(options.is_optimized());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    case_insensitive: bool,
    multiline: bool,
    dot_matches_line_separators: bool,
    optimize: bool,
    symbols: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            multiline: false,
            dot_matches_line_separators: false,
            optimize: true,
            symbols: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Letters match regardless of case.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// `^` and `$` also match at line starts and ends.
    pub fn multiline(mut self, yes: bool) -> Self {
        self.multiline = yes;
        self
    }

    /// `.` also matches `\n`.
    pub fn dot_matches_line_separators(mut self, yes: bool) -> Self {
        self.dot_matches_line_separators = yes;
        self
    }

    /// Bypass pass-through states after compilation. On by default; it never
    /// changes match results.
    pub fn optimize(mut self, yes: bool) -> Self {
        self.optimize = yes;
        self
    }

    /// Keep a table mapping compiled states back to the pattern, for
    /// [`CompiledAutomaton::describe`](crate::automaton::CompiledAutomaton::describe).
    pub fn symbols(mut self, yes: bool) -> Self {
        self.symbols = yes;
        self
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_dot_matches_line_separators(&self) -> bool {
        self.dot_matches_line_separators
    }

    pub fn is_optimized(&self) -> bool {
        self.optimize
    }

    pub fn has_symbols(&self) -> bool {
        self.symbols
    }
}
