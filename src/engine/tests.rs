use rstest::rstest;

use super::*;
use crate::error::RuleError;
use crate::outcome::Outcome;
use crate::rule::{Mode, Quantifier, Rule};

fn chars(s: &str) -> Rule<char> {
    Rule::literal(s.chars()).unwrap()
}

fn sym(c: char) -> Rule<char> {
    Rule::symbol(c)
}

fn anything() -> Rule<char> {
    Rule::test(|_| true)
}

fn ends(found: &[Outcome]) -> Vec<(usize, usize)> {
    found.iter().map(|m| (m.epoch(), m.end())).collect()
}

/// Every reported match as sorted `(epoch, end)` pairs.
fn spans(rule: &Rule<char>, input: &str) -> Vec<(usize, usize)> {
    let mut found = ends(&rule.find_all(input.chars()).unwrap());
    found.sort_unstable();
    found
}

#[rstest]
#[case("abc", vec![(0, 3)])]
#[case("abd", vec![])]
#[case("xxabcabc", vec![(2, 5), (5, 8)])]
#[case("ab", vec![])]
fn test_literal(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
    assert_eq!(spans(&chars("abc"), input), expected);
}

#[test]
fn test_every_match_is_a_success() {
    let found = chars("ab").find_all("abab".chars()).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(Outcome::is_success));
    assert!(found.iter().all(|m| bool::from(m)));
}

#[test]
fn test_bounded_repetition() {
    let rule = sym('a').repeat(Quantifier::range(2, 4).unwrap());
    let found = rule.find_all("aaaaa".chars()).unwrap();
    assert!(!found.is_empty());
    assert!(found.iter().all(|m| (2..=4).contains(&m.repeat_count())));
    assert!(
        found
            .iter()
            .all(|m| m.end() - m.epoch() == m.repeat_count())
    );
    assert!(!found.iter().any(|m| (m.epoch(), m.end()) == (0, 5)));
}

#[test]
fn test_zero_repetitions_pass_straight_through() {
    let rule = sym('a').repeat(Quantifier::exactly(0)).then(sym('b'));
    assert_eq!(spans(&rule, "b"), vec![(0, 1)]);
}

#[rstest]
#[case("aaab", vec![(0, 4)])]
#[case("abab", vec![(0, 4)])]
#[case("bb", vec![(0, 2)])]
fn test_greedy_prefers_longest(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
    let rule = anything().greedy(Quantifier::any()).then(sym('b'));
    assert_eq!(spans(&rule, input), expected);
}

#[rstest]
#[case("abab", vec![(1, 2), (3, 4)])]
#[case("aaab", vec![(3, 4)])]
fn test_lazy_prefers_shortest(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
    let rule = anything().lazy(Quantifier::any()).then(sym('b'));
    assert_eq!(spans(&rule, input), expected);
}

#[test]
fn test_greedy_run_of_symbols() {
    let rule = sym('a').greedy(Quantifier::some());
    assert_eq!(spans(&rule, "aaa"), vec![(0, 3)]);
}

#[test]
fn test_arbitration_spans_every_match_start() {
    let rule = sym('a').greedy(Quantifier::some());
    assert_eq!(spans(&rule, "aaxa"), vec![(0, 2)]);
    let rule = sym('a').lazy(Quantifier::some());
    assert_eq!(spans(&rule, "aaxa"), vec![(0, 1), (1, 2), (3, 4)]);
}

#[test]
fn test_unarbitrated_repetition_reports_every_length() {
    let rule = sym('a').repeat(Quantifier::some());
    assert_eq!(spans(&rule, "aa"), vec![(0, 1), (0, 2), (1, 2)]);
}

#[test]
fn test_and_requires_both_over_same_span() {
    let rule = anything().repeat(Quantifier::exactly(2)) & chars("ab");
    assert_eq!(spans(&rule, "xab"), vec![(1, 3)]);
}

#[test]
fn test_and_rejects_partial_match_of_second_rule() {
    let rule = anything().repeat(Quantifier::exactly(3)) & chars("ab");
    assert_eq!(spans(&rule, "abc"), vec![]);
}

#[test]
fn test_or_reports_every_alternative() {
    let rule = sym('a') | chars("ab");
    assert_eq!(spans(&rule, "ab"), vec![(0, 1), (0, 2)]);
}

#[test]
fn test_or_alternatives_in_sequence() {
    let rule = (sym('a') | sym('b')).then(sym('c'));
    assert_eq!(spans(&rule, "acbc"), vec![(0, 2), (2, 4)]);
}

#[test]
fn test_xor_matches_exactly_one_side() {
    let rule = (sym('a') | sym('b')) ^ (sym('b') | sym('c'));
    assert_eq!(spans(&rule, "abcd"), vec![(0, 1), (2, 3)]);
}

#[rstest]
#[case("ab", vec![(1, 2)])]
#[case("ax", vec![(0, 2), (1, 2)])]
fn test_not_inverts_and_keeps_span(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
    assert_eq!(spans(&!chars("ab"), input), expected);
}

#[rstest]
#[case("ac", vec![(0, 2)])]
#[case("abc", vec![(0, 3)])]
#[case("abbc", vec![])]
fn test_optional_link_in_sequence(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
    let optional_b = sym('b').repeat(Quantifier::optional());
    let rule = Rule::sequence([sym('a'), optional_b, sym('c')]).unwrap();
    assert_eq!(spans(&rule, input), expected);
}

#[test]
fn test_optional_head_seeds_rest_of_chain() {
    let rule = sym('a').repeat(Quantifier::optional()).then(sym('b'));
    assert_eq!(spans(&rule, "b"), vec![(0, 1)]);
    assert_eq!(spans(&rule, "ab"), vec![(0, 2), (1, 2)]);
}

#[test]
fn test_optional_head_inside_nested_group() {
    let optional_a = sym('a').repeat(Quantifier::optional());
    let inner = Rule::sequence([optional_a, sym('b')]).unwrap();
    let rule = sym('c').then(inner);
    assert_eq!(spans(&rule, "cb"), vec![(0, 2)]);
    assert_eq!(spans(&rule, "cab"), vec![(0, 3)]);
}

#[rstest]
#[case(Quantifier::exactly(2), vec![(0, 4)])]
#[case(Quantifier::range(1, 2).unwrap(), vec![(0, 2), (0, 4), (2, 4)])]
fn test_repeated_group(#[case] quantifier: Quantifier, #[case] expected: Vec<(usize, usize)>) {
    let rule = chars("a").then(sym('b')).repeat(quantifier);
    assert_eq!(spans(&rule, "abab"), expected);
}

#[test]
fn test_named_repetition_records_each_pass() {
    let rule = sym('a').quantify(Quantifier::exactly(3), Some("g"), Mode::All);
    let found = rule.find_all("aaa".chars()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].group("g"), vec![(0, 1), (0, 2), (0, 3)]);
    assert_eq!(found[0].count("g"), 3);
}

#[test]
fn test_named_group_in_sequence() {
    let rule = sym('x').then(chars("ab").named("word")).then(sym('y'));
    let found = rule.find_all("xaby".chars()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].captures()["word"], vec![(1, 3)]);
}

#[rstest]
#[case("aaabbb", vec![(0, 6)])]
#[case("aaabb", vec![(1, 5)])]
#[case("abbb", vec![(0, 2)])]
fn test_count_bound_follows_group(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
    let rule = sym('a')
        .quantify(Quantifier::at_least(1), Some("g"), Mode::Greedy)
        .then(sym('b').repeat(Quantifier::same_as("g")));
    assert_eq!(spans(&rule, input), expected);
}

#[test]
fn test_count_bound_is_fixed_at_seed_time() {
    let rule = sym('a')
        .quantify(Quantifier::at_least(1), Some("g"), Mode::Greedy)
        .then(sym('b').repeat(Quantifier::same_as("g")));
    let found = rule.find_all("aabb".chars()).unwrap();
    let whole = found
        .iter()
        .find(|m| (m.epoch(), m.end()) == (0, 4))
        .unwrap();
    assert_eq!(whole.group("g"), vec![(0, 1), (0, 2)]);
}

#[test]
fn test_computed_bound() {
    let rule = sym('a').repeat(Quantifier::computed(|_| 2));
    assert_eq!(spans(&rule, "aaa"), vec![(0, 2), (1, 3)]);
}

#[test]
fn test_inverted_dynamic_bound_is_an_error() {
    let rule = sym('a').repeat(Quantifier::computed_range(|_| 3, |_| 1));
    assert_eq!(
        rule.find_all("aaa".chars()).unwrap_err(),
        RuleError::InvertedBounds { min: 3, max: 1 }
    );
}

#[test]
fn test_failing_predicate_is_non_acceptance() {
    let digit = Rule::predicate(|c: &char, _| {
        if c.is_ascii_digit() {
            Ok(true)
        } else {
            anyhow::bail!("{c:?} is not a digit")
        }
    });
    assert_eq!(spans(&digit, "1x2"), vec![(0, 1), (2, 3)]);
}

#[test]
fn test_boundary_anchors() {
    let start = Rule::sequence([Rule::boundary(), chars("ab")]).unwrap();
    assert_eq!(spans(&start, "abab"), vec![(0, 2)]);
    let end = chars("ab").then(Rule::boundary());
    assert_eq!(spans(&end, "abab"), vec![(2, 4)]);
}

#[test]
fn test_empty_input_and_empty_matches() {
    assert_eq!(spans(&chars("a"), ""), vec![]);
    assert_eq!(spans(&sym('a').repeat(Quantifier::any()), "b"), vec![]);
}

#[test]
fn test_pattern_is_reusable() {
    let greedy = anything().greedy(Quantifier::any()).then(sym('b'));
    let pattern = (greedy ^ chars("ab")).compile();
    let first = pattern.find_all("aabab".chars()).unwrap();
    let second = pattern.find_all("aabab".chars()).unwrap();
    assert!(!first.is_empty());
    assert_eq!(ends(&first), ends(&second));
}

#[test]
fn test_stream_matches_find_all() {
    let pattern = (sym('a') | chars("ab")).then(sym('c')).compile();
    let mut stream = Stream::new(&pattern).unwrap();
    for c in "acabc".chars() {
        stream.push(c).unwrap();
    }
    let streamed = ends(&stream.finish().unwrap());
    let direct = ends(&pattern.find_all("acabc".chars()).unwrap());
    assert_eq!(streamed, direct);
    assert_eq!(direct, vec![(0, 2), (2, 5)]);
}

#[test]
fn test_symbols_other_than_chars() {
    let rule = Rule::literal([1u8, 2]).unwrap().repeat(Quantifier::some());
    let found = rule.find_all([1, 2, 1, 2, 3]).unwrap();
    let mut found = ends(&found);
    found.sort_unstable();
    assert_eq!(found, vec![(0, 2), (0, 4), (2, 4)]);
}
