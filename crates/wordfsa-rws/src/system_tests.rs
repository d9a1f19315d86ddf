use wordfsa_core::{Alphabet, ReduceFlags, Word, WordError, WordOrder};

use crate::{BuildError, RewritingSystem};

/// `<a, b | aa = 1, bb = 1>` over the group alphabet `a A b B`.
pub(crate) fn involutions() -> RewritingSystem {
    let alphabet = Alphabet::group(["a", "A", "b", "B"]).unwrap();
    let (a, big_a, b, big_b) = (0, 1, 2, 3);
    let rules = vec![
        (vec![a, a], vec![]),
        (vec![b, b], vec![]),
        (vec![big_a], vec![a]),
        (vec![big_b], vec![b]),
    ];
    RewritingSystem::from_rules(alphabet, &rules, true).unwrap()
}

fn parse(system: &RewritingSystem, text: &str) -> Word {
    system.alphabet().parse_word(text).unwrap()
}

fn reduce_text(system: &RewritingSystem, text: &str) -> String {
    let word = system.reduced(&parse(system, text)).unwrap();
    system.alphabet().format_word(&word)
}

#[test]
fn reduces_involutions() {
    let system = involutions();
    assert_eq!(system.state_count(), 3);
    assert_eq!(system.rule_count(), 4);

    assert_eq!(reduce_text(&system, "aaa"), "a");
    assert_eq!(reduce_text(&system, "aAbB"), "");
    assert_eq!(reduce_text(&system, "AbaBa"), "ababa");
    assert_eq!(reduce_text(&system, "abab"), "abab");
}

#[test]
fn states_are_the_proper_prefixes_of_kept_rules() {
    let alphabet = Alphabet::new(["x", "y"]).unwrap();
    let rules: Vec<(Word, Word)> = [("xyx", "xx"), ("yy", "y")]
        .iter()
        .map(|(l, r)| (alphabet.parse_word(l).unwrap(), alphabet.parse_word(r).unwrap()))
        .collect();

    let system = RewritingSystem::from_rules(alphabet, &rules, true).unwrap();

    // ε, x, xy, y
    assert_eq!(system.state_count(), 4);
    assert_eq!(reduce_text(&system, "xyyx"), "xx");
}

#[test]
fn reduction_is_idempotent_and_shortening() {
    let system = involutions();
    for text in ["", "a", "AAA", "aBbA", "bAbAbA", "BBBaaaB"] {
        let once = system.reduced(&parse(&system, text)).unwrap();
        let twice = system.reduced(&once).unwrap();
        assert_eq!(once, twice, "{text}");
        assert!(once.len() <= text.len(), "{text}");
    }
}

#[test]
fn suffix_rules_fire_before_longer_left_sides() {
    let alphabet = Alphabet::new(["x", "y", "z"]).unwrap();
    let (x, y, z) = (0, 1, 2);
    let rules = vec![(vec![z, z], vec![z]), (vec![x, z, z, y], vec![y])];
    let system = RewritingSystem::from_rules(alphabet, &rules, false).unwrap();

    assert_eq!(system.state_count(), 4);
    assert_eq!(reduce_text(&system, "xzzy"), "xzy");
    assert!(!system.is_reducible(&[x, z, y]).unwrap());
    assert!(system.is_reducible(&[y, z, z]).unwrap());
}

#[test]
fn lengthening_rules_respect_the_word_bound() {
    let alphabet = Alphabet::new(["x", "y"])
        .unwrap()
        .with_order(WordOrder::WeightedLex { weights: vec![3, 1] })
        .unwrap();
    let rules = vec![(vec![0], vec![1, 1])];
    let system = RewritingSystem::from_rules(alphabet, &rules, true).unwrap();

    assert_eq!(reduce_text(&system, "xx"), "yyyy");
    assert_eq!(reduce_text(&system, "yxy"), "yyyy");

    let bounded = system.with_max_word_length(3);
    let err = bounded.reduced(&[0, 0]).unwrap_err();
    assert_eq!(err, WordError::TooLong { len: 4, max: 3 });
}

#[test]
fn flags_select_reduction_mode() {
    let system = involutions();

    let mut word = parse(&system, "Aab");
    assert!(system.reduce(&mut word, ReduceFlags::CHECK_ONLY).unwrap());
    assert_eq!(system.alphabet().format_word(&word), "Aab");

    assert!(system.reduce(&mut word, ReduceFlags::STOP_AFTER_FIRST).unwrap());
    assert_eq!(system.alphabet().format_word(&word), "aab");

    let mut word = parse(&system, "bbB");
    assert!(system.reduce(&mut word, ReduceFlags::IGNORE_TRAILING).unwrap());
    assert_eq!(system.alphabet().format_word(&word), "B");
}

#[test]
fn rejects_words_outside_the_alphabet() {
    let system = involutions();
    let mut word = vec![0, 9];
    assert_eq!(
        system.reduce(&mut word, ReduceFlags::NONE),
        Err(WordError::BadGenerator(9))
    );
}

#[test]
fn rejects_bad_rules() {
    let alphabet = Alphabet::group(["a", "A"]).unwrap();

    let err = RewritingSystem::from_rules(alphabet.clone(), &[(vec![0], vec![0, 0])], false)
        .unwrap_err();
    assert!(matches!(err, BuildError::Unoriented { index: 0 }));

    let rules = vec![(vec![0, 0], vec![]), (vec![], vec![0])];
    let err = RewritingSystem::from_rules(alphabet.clone(), &rules, false).unwrap_err();
    assert!(matches!(err, BuildError::EmptyLhs { index: 1 }));

    let err = RewritingSystem::from_rules(alphabet, &[(vec![7], vec![])], false).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Word {
            index: 0,
            source: WordError::BadGenerator(7)
        }
    ));
    assert_eq!(err.to_string(), "rule 0: generator index 7 is out of range");
}

#[test]
fn serialized_form_rebuilds_the_same_automaton() {
    let system = involutions();
    let record = system.to_serialized();
    assert!(record.is_confluent);
    assert_eq!(record.equations[2], ["A".to_owned(), "a".to_owned()]);

    let back = RewritingSystem::from_serialized(&record).unwrap();
    assert_eq!(back, system);
}

#[test]
fn exposes_packed_rules() {
    let system = involutions();
    let (lhs, rhs) = system.rule(1);
    assert_eq!(lhs, [2, 2]);
    assert!(rhs.is_empty());
    let lhs_lengths: Vec<usize> = system.rules().map(|(lhs, _)| lhs.len()).collect();
    assert_eq!(lhs_lengths, vec![2, 2, 1, 1]);
}
