use indoc::indoc;

use crate::{Alphabet, Gen, SerializedError, SerializedSystem, WordOrder};

#[test]
fn reads_group_presentation() {
    let record = SerializedSystem::from_json(indoc! {r#"
        {
          "generatorOrder": ["a", "A", "b", "B"],
          "inverses": ["A", "a", "B", "b"],
          "equations": [["aa", ""], ["b*a", "a*B"]]
        }
    "#})
    .unwrap();

    assert!(!record.is_confluent);
    let alphabet = record.alphabet().unwrap();
    assert!(alphabet.is_group());
    assert_eq!(alphabet.inverse(2), Some(3));

    let pairs = record.word_pairs(&alphabet).unwrap();
    assert_eq!(pairs, vec![(vec![0, 0], vec![]), (vec![2, 0], vec![0, 3])]);
}

#[test]
fn missing_inverses_mean_monoid() {
    let record = SerializedSystem::from_json(
        r#"{"generatorOrder": ["x", "y"], "equations": [["xy", "yx"]]}"#,
    )
    .unwrap();
    let alphabet = record.alphabet().unwrap();
    assert!(!alphabet.is_group());
    assert_eq!(alphabet.inverse(0), None);
}

#[test]
fn reports_equation_index() {
    let record = SerializedSystem::from_json(
        r#"{"generatorOrder": ["a", "A"], "inverses": ["A", "a"], "equations": [["aa", ""], ["c", ""]]}"#,
    )
    .unwrap();
    let alphabet = record.alphabet().unwrap();
    let err = record.word_pairs(&alphabet).unwrap_err();
    assert!(matches!(err, SerializedError::Equation { index: 1, .. }));
    assert_eq!(err.to_string(), "equation 1: unknown generator `c`");
}

#[test]
fn rejects_inconsistent_inverses() {
    let record = SerializedSystem::from_json(
        r#"{"generatorOrder": ["a", "A", "b"], "inverses": ["A", "b", null]}"#,
    )
    .unwrap();
    assert!(matches!(record.alphabet(), Err(SerializedError::Alphabet(_))));
}

#[test]
fn writes_confluent_system() {
    let alphabet = Alphabet::group(["a", "A"]).unwrap();
    let lhs: [Gen; 3] = [0, 0, 0];
    let rhs: [Gen; 0] = [];
    let record = SerializedSystem::from_parts(&alphabet, [(&lhs[..], &rhs[..])], true);

    insta::assert_snapshot!(record.to_json(), @r#"
    {
      "generatorOrder": [
        "a",
        "A"
      ],
      "inverses": [
        "A",
        "a"
      ],
      "equations": [
        [
          "aaa",
          ""
        ]
      ],
      "isConfluent": true
    }
    "#);

    let back = SerializedSystem::from_json(&record.to_json()).unwrap();
    assert_eq!(back, record);
}

#[test]
fn keeps_non_default_ordering() {
    let alphabet = Alphabet::new(["x", "y"])
        .unwrap()
        .with_order(WordOrder::WeightedLex { weights: vec![1, 3] })
        .unwrap();
    let record = SerializedSystem::from_parts(&alphabet, std::iter::empty(), false);
    assert!(record.inverses.iter().all(Option::is_none));

    let json = record.to_json();
    assert!(json.contains("\"weightedLex\""));

    let back = SerializedSystem::from_json(&json).unwrap();
    assert_eq!(back.ordering, Some(WordOrder::WeightedLex { weights: vec![1, 3] }));
}
