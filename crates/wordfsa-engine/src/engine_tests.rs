use indoc::indoc;
use wordfsa_core::{Alphabet, Colors, SerializedSystem, Word, WordError, WordOrder};
use wordfsa_rws::RewritingSystem;

use crate::differences::{StateId, WdFlags};
use crate::error::EngineError;
use crate::limits::{CancelToken, EngineOptions, Limits};
use crate::overlap::{critical_pair, overlaps};
use crate::trace::{PrintTracer, Verbosity};
use crate::{Engine, Progress};

fn group2() -> Alphabet {
    Alphabet::group(["a", "A", "b", "B"]).unwrap()
}

fn engine_with(alphabet: Alphabet, relations: &[(&str, &str)], limits: Limits) -> Engine {
    let relations: Vec<(Word, Word)> = relations
        .iter()
        .map(|(l, r)| (alphabet.parse_word(l).unwrap(), alphabet.parse_word(r).unwrap()))
        .collect();
    Engine::from_relations(alphabet, &relations, limits, EngineOptions::default()).unwrap()
}

fn completed(alphabet: Alphabet, relations: &[(&str, &str)]) -> Engine {
    let mut engine = engine_with(alphabet, relations, Limits::default());
    engine.complete().unwrap();
    engine
}

fn word(engine: &Engine, text: &str) -> Word {
    engine.alphabet().parse_word(text).unwrap()
}

fn reduce_text(engine: &mut Engine, text: &str) -> String {
    let w = word(engine, text);
    let reduced = engine.reduce(&w).unwrap();
    engine.alphabet().format_word(&reduced)
}

fn rules(system: &RewritingSystem) -> Vec<String> {
    let alphabet = system.alphabet();
    let mut out: Vec<String> = system
        .rules()
        .map(|(l, r)| format!("{} → {}", alphabet.display_word(l), alphabet.display_word(r)))
        .collect();
    out.sort();
    out
}

/// Every overlap of two rules resolves to one normal form.
fn is_locally_confluent(system: &RewritingSystem) -> bool {
    let rules: Vec<(Word, Word)> = system.rules().map(|(l, r)| (l.to_vec(), r.to_vec())).collect();
    rules.iter().all(|(l1, r1)| {
        rules.iter().all(|(l2, r2)| {
            overlaps(l1, l2).all(|m| {
                let (a, b) = critical_pair((l1.as_slice(), r1.as_slice()), (l2.as_slice(), r2.as_slice()), m);
                system.reduced(&a).unwrap() == system.reduced(&b).unwrap()
            })
        })
    })
}

#[test]
fn free_group_keeps_cancellation_rules() {
    let mut engine = completed(group2(), &[]);
    let system = engine.compile().unwrap();

    assert!(engine.is_confluent());
    assert_eq!(rules(&system), ["Aa → ε", "Bb → ε", "aA → ε", "bB → ε"]);
    assert_eq!(reduce_text(&mut engine, "abBA"), "");
    assert_eq!(reduce_text(&mut engine, "abAB"), "abAB");
}

#[test]
fn learnt_equations_walk_back_to_identity() {
    let mut engine = completed(group2(), &[]);
    let alphabet = engine.alphabet().clone();
    let pad = |l: &str| alphabet.symbol(Some(alphabet.index(l).unwrap()), None);

    let tracker = engine.tracker();
    for (x, y) in [("a", "A"), ("A", "a"), ("b", "B"), ("B", "b")] {
        assert_eq!(tracker.run([pad(x), pad(y)]), Some(StateId::IDENTITY), "{x}{y}");
    }

    let wd = engine.grow_wd(WdFlags::NONE).unwrap();
    assert_eq!(wd.run([pad("a"), pad("A")]), Some(wd.initial()));
    assert!(engine.is_inverse_complete().unwrap());
}

#[test]
fn involutions() {
    let mut engine = completed(group2(), &[("aa", ""), ("bb", "")]);
    let system = engine.compile().unwrap();

    assert_eq!(rules(&system), ["A → a", "B → b", "aa → ε", "bb → ε"]);
    assert_eq!(reduce_text(&mut engine, "aaa"), "a");
    assert_eq!(reduce_text(&mut engine, "AbB"), "a");

    let alphabet = engine.alphabet();
    let both_a = alphabet.symbol(Some(0), Some(0));
    assert_eq!(
        engine.tracker().transition(StateId::IDENTITY, both_a),
        Some(StateId::IDENTITY)
    );
}

#[test]
fn free_abelian_group_of_rank_two() {
    let mut engine = completed(group2(), &[("ba", "ab")]);
    let system = engine.compile().unwrap();

    assert!(engine.is_confluent());
    assert_eq!(system.rule_count(), 8);
    assert_eq!(engine.stats().equations, 8);
    assert_eq!(reduce_text(&mut engine, "baBA"), "");
    assert_eq!(reduce_text(&mut engine, "BaBa"), "aaBB");
    assert_eq!(reduce_text(&mut engine, "AbaB"), "");
}

#[test]
fn symmetric_group_of_degree_three() {
    let mut engine = completed(group2(), &[("aa", ""), ("bb", ""), ("ababab", "")]);
    let system = engine.compile().unwrap();

    assert_eq!(rules(&system), ["A → a", "B → b", "aa → ε", "bab → aba", "bb → ε"]);
    assert_eq!(reduce_text(&mut engine, "ababab"), "");
    assert_eq!(reduce_text(&mut engine, "BAB"), "aba");
}

#[test]
fn commutative_monoid_without_differences() {
    let mut engine = completed(Alphabet::new(["x", "y"]).unwrap(), &[("yx", "xy")]);

    assert!(!engine.tracker().is_enabled());
    assert_eq!(reduce_text(&mut engine, "yxyx"), "xxyy");
    assert_eq!(engine.stats().equations, 1);
    let wd = engine.grow_wd(WdFlags::NONE).unwrap();
    assert_eq!(wd.state_count, 1);
}

#[test]
fn reduction_is_idempotent_and_shortening() {
    let mut engine = completed(group2(), &[("ba", "ab")]);
    for text in ["", "a", "BBaAb", "bAbAbA", "abABabAB", "BBBaaaB"] {
        let w = word(&engine, text);
        let once = engine.reduce(&w).unwrap();
        let twice = engine.reduce(&once).unwrap();
        assert_eq!(once, twice, "{text}");
        assert!(once.len() <= w.len(), "{text}");
    }
}

#[test]
fn compiled_system_survives_serialization() {
    let record = SerializedSystem::from_json(indoc! {r#"
        {
          "generatorOrder": ["a", "A", "b", "B"],
          "inverses": ["A", "a", "B", "b"],
          "equations": [["ba", "ab"]]
        }
    "#})
    .unwrap();
    let mut engine = Engine::new(&record, Limits::default(), EngineOptions::default()).unwrap();
    engine.complete().unwrap();

    let saved = engine.to_serialized().unwrap();
    assert!(saved.is_confluent);
    let reread = SerializedSystem::from_json(&saved.to_json()).unwrap();
    let system = RewritingSystem::from_serialized(&reread).unwrap();

    for text in ["BAba", "bbbAAa", "aBAb", "BBBaaaB"] {
        let w = word(&engine, text);
        assert_eq!(system.reduced(&w).unwrap(), engine.reduce(&w).unwrap(), "{text}");
    }
}

#[test]
fn same_pair_twice_is_one_equation() {
    let mut engine = engine_with(group2(), &[], Limits::default());
    let (ba, ab) = (word(&engine, "ba"), word(&engine, "ab"));
    let counters = |engine: &Engine| {
        (
            engine.stats().equations,
            engine.tracker().dirty(),
            engine.tracker().state_count(),
        )
    };

    let first = engine.add_equation(&ba, &ab).unwrap();
    let before = counters(&engine);
    assert_eq!(engine.add_equation(&ba, &ab).unwrap(), None);
    assert_eq!(engine.add_equation(&ab, &ba).unwrap(), None);

    assert!(first.is_some());
    assert_eq!(counters(&engine), before);

    engine.expand_machine().unwrap();
    let adopted = counters(&engine);
    assert!(engine.arena().equation(first.unwrap()).unwrap().is_learnt());
    assert_eq!(engine.add_equation(&ba, &ab).unwrap(), None);
    assert_eq!(engine.add_equation(&ab, &ba).unwrap(), None);

    assert_eq!(counters(&engine), adopted);
}

#[test]
fn equation_is_oriented_by_word_order() {
    let mut engine = engine_with(group2(), &[], Limits::default());
    let (ab, ba) = (word(&engine, "ab"), word(&engine, "ba"));

    let eq = engine.add_equation(&ab, &ba).unwrap().unwrap();

    assert_eq!(engine.arena().word(eq), ba);
    assert!(engine.equations().contains(&(ba, ab)));
}

#[test]
fn word_past_maximum_is_rejected() {
    let limits = Limits::new().max_word_length(6);
    let mut engine = engine_with(group2(), &[], limits);
    let long = word(&engine, "aaaaaaa");
    let ok = word(&engine, "aaaaaa");

    let err = engine.add_equation(&long, &[]).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Word(WordError::TooLong { len: 7, max: 6 })
    ));
    assert!(engine.add_equation(&ok, &[]).unwrap().is_some());
}

#[test]
fn equation_limit() {
    let limits = Limits::new().max_equations(3);
    let relations: Vec<(Word, Word)> = Vec::new();

    let Err(err) =
        Engine::from_relations(group2(), &relations, limits, EngineOptions::default())
    else {
        panic!("four inverse axioms exceed a limit of three");
    };

    insta::assert_snapshot!(err, @"equations limit of 3 exceeded");
}

#[test]
fn cancelled_run_stops() {
    let token = CancelToken::new();
    let mut engine = engine_with(group2(), &[("ba", "ab")], Limits::default()).with_cancel(token.clone());

    token.cancel();

    assert_eq!(engine.expand_machine().unwrap(), Progress::Cancelled);
    assert!(matches!(engine.complete(), Err(EngineError::Cancelled)));
    assert!(!engine.is_confluent());

    engine.set_cancel_token(None);
    engine.complete().unwrap();
    assert!(engine.is_confluent());
}

#[test]
fn step_budget_bounds_one_call() {
    let limits = Limits::new().step_budget(1);
    let mut engine = engine_with(group2(), &[], limits);

    assert_eq!(engine.expand_machine().unwrap(), Progress::Working);
    assert_eq!(engine.stats().adopted, 1);
    assert_eq!(engine.stats().queued, 3);
}

#[test]
fn long_overlaps_wait_for_larger_limits() {
    let limits = Limits::new().max_overlap_length(3);
    let mut engine = engine_with(Alphabet::new(["x"]).unwrap(), &[("xxx", "x")], limits);

    engine.complete().unwrap();
    assert!(!engine.is_confluent());
    assert_eq!(engine.stats().deferred, 2);
    assert_eq!(engine.stats().overlaps, 0);

    engine.set_limits(Limits::default());
    engine.complete().unwrap();
    assert!(engine.is_confluent());
    assert_eq!(engine.stats().deferred, 0);
    assert_eq!(engine.stats().overlaps, 2);
    assert_eq!(engine.stats().equations, 1);
}

#[test]
fn secondary_equations_can_be_kept() {
    let alphabet = group2();
    let relations = vec![(alphabet.parse_word("aa").unwrap(), Word::new())];
    let options = EngineOptions::new().keep_secondary(true);
    let mut engine = Engine::from_relations(alphabet, &relations, Limits::default(), options).unwrap();

    engine.complete().unwrap();

    let secondary = engine
        .arena()
        .equations()
        .filter(|&eq| !engine.arena().equation(eq).unwrap().is_primary())
        .count();
    assert!(secondary > 0);
    let system = engine.compile().unwrap();
    assert_eq!(rules(&system), ["A → a", "Bb → ε", "aa → ε", "bB → ε"]);
    assert!(is_locally_confluent(&system));
}

#[test]
fn kept_secondary_equations_leave_a_confluent_system() {
    let alphabet = Alphabet::new(["x", "y", "z"])
        .unwrap()
        .with_order(WordOrder::WeightedLex {
            weights: vec![1, 2, 3],
        })
        .unwrap();
    let relations: Vec<(Word, Word)> = [("yyz", "xz"), ("yyy", "xx"), ("zxzzyx", "x")]
        .iter()
        .map(|(l, r)| (alphabet.parse_word(l).unwrap(), alphabet.parse_word(r).unwrap()))
        .collect();
    let run = |options: EngineOptions| {
        let mut engine =
            Engine::from_relations(alphabet.clone(), &relations, Limits::default(), options).unwrap();
        engine.complete().unwrap();
        assert!(engine.is_confluent());
        engine.compile().unwrap()
    };

    let kept = run(EngineOptions::new().keep_secondary(true));
    let removed = run(EngineOptions::new());

    assert!(is_locally_confluent(&kept));
    assert_eq!(rules(&kept), rules(&removed));
    let w = alphabet.parse_word("zxzzyxz").unwrap();
    assert_eq!(kept.reduced(&w).unwrap(), removed.reduced(&w).unwrap());
}

#[test]
fn traced_run() {
    let mut engine = engine_with(group2(), &[("aa", "")], Limits::default());
    let mut tracer = PrintTracer::new(engine.alphabet(), Verbosity::Default, Colors::OFF);

    engine.complete_with(&mut tracer).unwrap();
    engine.compile_with(&mut tracer).unwrap();

    let lines = tracer.lines();
    assert!(lines.iter().any(|l| l.ends_with("A → a")));
    assert!(lines.last().unwrap().contains("compiled 4 rules"));
}

#[test]
fn dump_sections() {
    let engine = completed(group2(), &[]);
    let out = engine.dump(Colors::OFF);

    assert!(out.starts_with("[arena]\n"));
    assert!(out.contains("\n[differences]\n"));
    assert!(out.ends_with("[queues]\nadopt 0, pending 0, deferred 0\n"));
}
