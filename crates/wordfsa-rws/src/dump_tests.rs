use wordfsa_core::Colors;

use crate::system_tests::involutions;

#[test]
fn dump_involutions() {
    let system = involutions();
    insta::assert_snapshot!(system.dump(Colors::OFF), @r"
    [system]
    generators 4, states 3, rules 4, confluent

    [rules]
    R0 aa → ε
    R1 bb → ε
    R2 A → a
    R3 B → b

    [states]
    S0 a→S1 A→R2 b→S2 B→R3
    S1 a→R0 A→R2 b→S2 B→R3
    S2 a→S1 A→R2 b→R1 B→R3
    ");
}

#[test]
fn dump_marks_rule_slots_when_colored() {
    let system = involutions();
    let out = system.dump(Colors::ON);
    assert!(out.contains("\x1b[2mR0\x1b[0m"));
    assert!(out.contains("\x1b[34m[rules]\x1b[0m"));
}
