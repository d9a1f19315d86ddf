use wordfsa_core::{Alphabet, Colors};

use crate::arena::NodeId;
use crate::differences::StateId;
use crate::trace::{Derivation, NoopTracer, PrintTracer, Tracer, Verbosity};

fn alphabet() -> Alphabet {
    Alphabet::group(["a", "A", "b", "B"]).unwrap()
}

fn run(verbosity: Verbosity) -> Vec<String> {
    let ab = alphabet();
    let mut tracer = PrintTracer::new(&ab, verbosity, Colors::OFF);
    let (eq, other) = (NodeId::new(3), NodeId::new(7));
    let s2 = StateId::new(2);

    tracer.trace_equation_created(eq, &[0, 0], &[]);
    tracer.trace_equation_adopted(eq);
    tracer.trace_derivation(eq, &Derivation { left: other, right: eq, overlap: 1 });
    tracer.trace_state_created(s2, &[1]);
    tracer.trace_transition_proved(StateId::IDENTITY, ab.symbol(Some(0), None), s2);
    tracer.trace_states_merged(StateId::IDENTITY, s2);
    tracer.trace_overlap_deferred(eq, other, 12);
    tracer.trace_equation_removed(other, &[2, 0], &[0, 2]);
    tracer.trace_scan_finished(1, 4);
    tracer.trace_compiled(3, 5);
    tracer.lines().iter().map(|l| l.trim_start().to_owned()).collect()
}

#[test]
fn default_verbosity() {
    insta::assert_snapshot!(run(Verbosity::Default).join("\n"), @r"
      + N3 aa → ε
      = S2 into S1
      … N3 ⋈ N7 deferred (length 12)
      - N7 ba → ab
      ◼ compiled 5 rules into 3 states
    ");
}

#[test]
fn very_verbose() {
    insta::assert_snapshot!(run(Verbosity::VeryVerbose).join("\n"), @r"
      + N3 aa → ε
      ● N3 adopted
      ↳ N3 from N7 ⋈ N3 over 1
      ◆ S2 [A]
      → S1 (a,_) S2
      = S2 into S1
      … N3 ⋈ N7 deferred (length 12)
      - N7 ba → ab
      # scan: 1 equations removed, 4 states
      ◼ compiled 5 rules into 3 states
    ");
}

#[test]
fn verbose_skips_transitions() {
    let lines = run(Verbosity::Verbose);

    assert_eq!(lines.len(), 8);
    assert!(lines.iter().any(|l| l.contains("adopted")));
    assert!(!lines.iter().any(|l| l.contains("(a,_)")));
}

#[test]
fn colored_words() {
    let ab = alphabet();
    let mut tracer = PrintTracer::new(&ab, Verbosity::Default, Colors::ON);

    tracer.trace_equation_created(NodeId::new(1), &[0], &[1]);

    assert_eq!(tracer.lines(), ["  + N1 \x1b[32ma\x1b[0m → \x1b[32mA\x1b[0m"]);
}

#[test]
fn only_very_verbose_wants_derivations() {
    let ab = alphabet();
    let wants = |verbosity| PrintTracer::new(&ab, verbosity, Colors::OFF).wants_derivations();

    assert!(!NoopTracer.wants_derivations());
    assert!(!wants(Verbosity::Default));
    assert!(!wants(Verbosity::Verbose));
    assert!(wants(Verbosity::VeryVerbose));
}
