use std::io::Write;

use tempfile::NamedTempFile;
use wordfsa_core::Alphabet;
use wordfsa_rws::RewritingSystem;

use super::loader::{LoadError, load_presentation, load_system};

const INVOLUTIONS: &str = r#"{
  "generatorOrder": ["a", "b"],
  "inverses": ["a", "b"],
  "equations": [["aa", ""], ["bb", ""], ["ba", "ab"]],
  "isConfluent": true
}"#;

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn reduce(system: &RewritingSystem, text: &str) -> String {
    let alphabet = system.alphabet();
    let word = alphabet.parse_word(text).unwrap();
    alphabet.display_word(&system.reduced(&word).unwrap())
}

#[test]
fn loads_json_system() {
    let file = write_temp(INVOLUTIONS.as_bytes());

    let system = load_system(file.path()).unwrap();

    assert!(system.is_confluent());
    assert_eq!(system.rule_count(), 3);
    assert_eq!(reduce(&system, "baba"), "ε");
    assert_eq!(reduce(&system, "bab"), "a");
}

#[test]
fn loads_binary_module() {
    let alphabet = Alphabet::new(["a", "b"]).unwrap();
    let rules = vec![(vec![0, 0], vec![]), (vec![1, 0], vec![0, 1])];
    let original = RewritingSystem::from_rules(alphabet, &rules, false).unwrap();
    let file = write_temp(&original.to_bytes());

    let system = load_system(file.path()).unwrap();

    assert_eq!(system.rule_count(), 2);
    assert_eq!(reduce(&system, "baa"), "b");
    assert_eq!(reduce(&system, "bab"), "abb");
}

#[test]
fn loads_presentation() {
    let file = write_temp(br#"{ "generatorOrder": ["x", "y"], "equations": [["yx", "xy"]] }"#);

    let presentation = load_presentation(file.path()).unwrap();

    assert_eq!(presentation.generator_order, vec!["x", "y"]);
    assert_eq!(presentation.equations.len(), 1);
    assert!(!presentation.is_confluent);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = load_system(&path).unwrap_err();

    assert!(matches!(err, LoadError::Read { .. }));
    assert!(err.to_string().starts_with("failed to read '"));
}

#[test]
fn malformed_input_is_rejected() {
    let text = write_temp(b"not json");
    let binary = write_temp(&[0xff, 0xfe, 0x00, 0x01]);
    let unoriented = write_temp(br#"{ "generatorOrder": ["x", "y"], "equations": [["xy", "yx"]] }"#);

    assert!(matches!(load_system(text.path()), Err(LoadError::Record { .. })));
    assert!(matches!(load_system(binary.path()), Err(LoadError::Module { .. })));
    let err = load_system(unoriented.path()).unwrap_err();
    assert!(matches!(err, LoadError::Build { .. }));
    assert!(err.to_string().ends_with("rule 0: right-hand side does not sort before the left-hand side"));
}
