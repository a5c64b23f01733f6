use super::*;
use crate::compiler::Compiler;
use crate::matcher::{BacktrackingMatcher, Match, RegularMatcher};
use crate::options::Options;
use crate::parser::parse;

fn compile_with(pattern: &str, options: Options) -> CompiledAutomaton {
    Compiler::new(options).compile(&parse(pattern).unwrap()).unwrap()
}

fn compile(pattern: &str) -> CompiledAutomaton {
    compile_with(pattern, Options::new())
}

fn backtracking<'h>(automaton: &CompiledAutomaton, input: &'h str) -> Vec<Match<'h>> {
    let found = BacktrackingMatcher::new(automaton, input).collect();
    found
}

fn regular<'h>(automaton: &CompiledAutomaton, input: &'h str) -> Vec<Match<'h>> {
    let found = RegularMatcher::new(automaton, input).unwrap().collect();
    found
}

const PATTERNS: &[&str] = &[
    "abc",
    "a|ab",
    "(a|ab)(c|bcd)?",
    "(a*)*",
    "(a|b)*c",
    "x*",
    "(?:ab|a)+b?",
    "\\bab\\b",
    "^a+",
    "[a-c]+y?",
    "(a?)(a?)a",
    "(x|y){1,3}",
    "a{2}|b",
    "(\\w+) (\\w+)",
    ".+b",
    "b$",
    "(a*)+b",
    "(?:(a)|b)*",
    "[^a ]+",
    "(\\b)?x",
];

#[test]
fn test_start_is_renumbered_first() {
    for pattern in PATTERNS {
        let automaton = compile(pattern);
        assert_eq!(automaton.start().index(), 0, "{}", pattern);
        assert!(automaton.transitions(automaton.terminal()).is_empty());
        for id in (0..automaton.state_count()).map(StateId::from_index) {
            for t in automaton.transitions(id) {
                assert!(t.target.index() < automaton.state_count());
            }
        }
    }
}

#[test]
fn test_states_consume_at_most_once() {
    for pattern in PATTERNS.iter().chain(&["(a+)\\1", "a+?b", "hello|help"]) {
        let automaton = compile(pattern);
        for id in (0..automaton.state_count()).map(StateId::from_index) {
            let transitions = automaton.transitions(id);
            let consuming = transitions
                .iter()
                .filter(|t| !t.condition.is_epsilon())
                .count();
            assert!(
                consuming == 0 || transitions.len() == 1,
                "state {} of {} mixes consuming and epsilon transitions",
                id,
                pattern
            );
        }
    }
}

#[test]
fn test_capture_boundaries() {
    let automaton = compile("(a)(?:b)(c)");
    assert_eq!(automaton.group_count(), 2);
    let groups = automaton.capture_groups();
    assert_eq!(groups.len(), 2);
    for group in groups {
        assert_eq!(automaton.boundary(group.start), Some(Boundary::Open(group.index)));
        assert_eq!(automaton.boundary(group.end), Some(Boundary::Close(group.index)));
    }
}

#[test]
fn test_optimizer_preserves_matches() {
    let inputs = ["", "abcd", "aab abb", "xyxyx", "ba ab cab"];
    for pattern in PATTERNS {
        let plain = compile_with(pattern, Options::new().optimize(false));
        let optimized = compile(pattern);
        assert!(optimized.state_count() <= plain.state_count(), "{}", pattern);
        for input in inputs {
            assert_eq!(
                backtracking(&plain, input),
                backtracking(&optimized, input),
                "{} on {:?}",
                pattern,
                input
            );
        }
    }
}

#[test]
fn test_describe_with_symbols() {
    let automaton = compile_with("(a)b", Options::new().symbols(true));
    let description = automaton.describe();
    assert!(description.starts_with("automaton: "));
    assert!(description.contains("(terminal)"));
    assert!(description.contains("open(1)"));
    assert!(description.contains("close(1)"));
    assert!(description.contains("[start Group(1)]"));
    assert!(description.contains("--'b'-->"));

    let plain = compile("(a)b");
    assert!(plain.symbols().is_none());
    assert!(!plain.describe().contains('['));
}

#[test]
fn test_string_lowering_depends_on_regularity() {
    let regular = compile("hello");
    assert!(regular.is_regular());
    let has_string = |automaton: &CompiledAutomaton| {
        (0..automaton.state_count())
            .map(StateId::from_index)
            .flat_map(|id| automaton.transitions(id))
            .any(|t| matches!(t.condition, Condition::String { .. }))
    };
    assert!(!has_string(&regular));
    assert!(has_string(&compile("hello(x)?\\1?")));
}

#[test]
fn test_engines_agree_on_fixed_inputs() {
    let inputs = ["", "a", "abcd", "aab abb", "xyxyx y", "ab ab", "ba\nab"];
    for pattern in PATTERNS {
        let automaton = compile(pattern);
        for input in inputs {
            assert_eq!(
                backtracking(&automaton, input),
                regular(&automaton, input),
                "{} on {:?}",
                pattern,
                input
            );
        }
    }
}

#[test]
fn test_case_insensitive_conditions() {
    let options = Options::new().case_insensitive(true);
    let automaton = compile_with("[a-c]+X", options);
    let found = regular(&automaton, "zAbCx");
    assert_eq!(found[0].as_str(), "AbCx");

    // The group matches case-insensitively; the backreference repeats the
    // captured text exactly.
    let automaton = compile_with("(AB)\\1", options);
    let found = backtracking(&automaton, "abAB aBaB");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].as_str(), "aBaB");
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn input_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[abcxy ]{0,12}",
            "[ab\n]{0,8}",
            "[a-dé_ ]{0,10}",
        ]
    }

    proptest! {
        #[test]
        fn engines_return_identical_matches(
            pattern in prop::sample::select(PATTERNS),
            input in input_strategy(),
        ) {
            let automaton = compile(pattern);
            prop_assert_eq!(backtracking(&automaton, &input), regular(&automaton, &input));
        }

        #[test]
        fn unoptimized_automaton_agrees(
            pattern in prop::sample::select(PATTERNS),
            input in input_strategy(),
        ) {
            let plain = compile_with(pattern, Options::new().optimize(false));
            let optimized = compile(pattern);
            prop_assert_eq!(regular(&plain, &input), regular(&optimized, &input));
        }
    }
}
