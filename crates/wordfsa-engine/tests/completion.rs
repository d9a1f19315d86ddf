//! Completion through the public API, down to the frozen artifacts.

use wordfsa_core::{DifferenceAutomaton, Presentation};
use wordfsa_engine::{Engine, EngineOptions, Limits, WdFlags};
use wordfsa_rws::RewritingSystem;

const S3: &str = r#"{
  "generatorOrder": ["a", "A", "b", "B"],
  "inverses": ["A", "a", "B", "b"],
  "equations": [["aa", ""], ["bb", ""], ["ababab", ""]]
}"#;

fn completed_s3() -> Engine {
    let presentation = Presentation::from_json(S3).unwrap();
    let mut engine = Engine::new(&presentation, Limits::default(), EngineOptions::default()).unwrap();
    engine.complete().unwrap();
    engine
}

#[test]
fn binary_module_reduces_like_the_engine() {
    let mut engine = completed_s3();
    let system = engine.compile().unwrap();

    let loaded = RewritingSystem::from_bytes(&system.to_bytes()).unwrap();

    assert!(loaded.is_confluent());
    assert_eq!(loaded.rule_count(), 5);
    for text in ["BAB", "abab", "bAbA", "BBBaaa", "babab"] {
        let w = engine.alphabet().parse_word(text).unwrap();
        assert_eq!(loaded.reduced(&w).unwrap(), engine.reduce(&w).unwrap(), "{text}");
    }
}

#[test]
fn difference_automaton_survives_binary_form() {
    let mut engine = completed_s3();
    assert!(engine.is_inverse_complete().unwrap());

    let wd = engine.grow_wd(WdFlags::NONE).unwrap();
    let reread = DifferenceAutomaton::from_binary(&wd.to_binary()).unwrap();

    assert_eq!(reread, wd);
    assert_eq!(wd.words[0], Vec::<u16>::new());
    assert!(wd.is_accepting(wd.initial()));
    let alphabet = engine.alphabet();
    for g in ["a", "b"] {
        let g = alphabet.index(g).unwrap();
        let same = alphabet.symbol(Some(g), Some(g));
        assert_eq!(wd.target(wd.initial(), same), Some(wd.initial()));
    }
}
