use super::*;

fn free2() -> Alphabet {
    Alphabet::group(["a", "A", "b", "B"]).unwrap()
}

#[test]
fn group_pairs_inverses() {
    let ab = free2();

    assert_eq!(ab.len(), 4);
    assert!(ab.is_group());
    assert_eq!(ab.inverse(0), Some(1));
    assert_eq!(ab.inverse(1), Some(0));
    assert_eq!(ab.inverse(2), Some(3));
    assert_eq!(ab.name(3), "B");
}

#[test]
fn self_inverse_generator() {
    let ab = Alphabet::with_inverses(["s", "t"], &[Some("s"), Some("t")]).unwrap();

    assert_eq!(ab.inverse(0), Some(0));
    assert_eq!(ab.invert(&[0, 1]).unwrap(), vec![1, 0]);
}

#[test]
fn monoid_has_no_inverses() {
    let ab = Alphabet::new(["x", "y"]).unwrap();

    assert!(!ab.is_group());
    assert_eq!(ab.invert(&[0]), Err(WordError::NotInvertible(0)));
}

#[test]
fn rejects_bad_tables() {
    assert_eq!(Alphabet::new(Vec::<String>::new()), Err(AlphabetError::Empty));
    assert_eq!(
        Alphabet::new(["a", "a"]),
        Err(AlphabetError::Duplicate("a".into()))
    );
    assert_eq!(
        Alphabet::with_inverses(["a", "b"], &[Some("b")]),
        Err(AlphabetError::InverseCount {
            expected: 2,
            got: 1
        })
    );
    assert_eq!(
        Alphabet::with_inverses(["a", "b", "c"], &[Some("b"), Some("c"), Some("a")]),
        Err(AlphabetError::InverseMismatch("a".into()))
    );
}

#[test]
fn parse_and_format_words() {
    let ab = free2();

    assert_eq!(ab.parse_word("aAb").unwrap(), vec![0, 1, 2]);
    assert_eq!(ab.parse_word("a*A*b").unwrap(), vec![0, 1, 2]);
    assert_eq!(ab.parse_word("a A b").unwrap(), vec![0, 1, 2]);
    assert_eq!(ab.parse_word("").unwrap(), Vec::<Gen>::new());
    assert_eq!(ab.parse_word("IdWord").unwrap(), Vec::<Gen>::new());
    assert_eq!(ab.format_word(&[0, 1, 2]), "aAb");
    assert_eq!(ab.display_word(&[]), "ε");
    assert_eq!(
        ab.parse_word("ac"),
        Err(AlphabetError::Unknown("c".into()))
    );
}

#[test]
fn multi_char_names_use_separator() {
    let ab = Alphabet::group(["x1", "X1", "x2", "X2"]).unwrap();

    let word = ab.parse_word("x1*X2").unwrap();
    assert_eq!(word, vec![0, 3]);
    assert_eq!(ab.format_word(&word), "x1*X2");
    assert_eq!(ab.parse_word(&ab.format_word(&word)).unwrap(), word);
}

#[test]
fn product_symbols() {
    let ab = free2();

    assert_eq!(ab.symbol_count(), 25);
    let s = ab.symbol(Some(0), Some(3));
    assert_eq!(s, 3);
    assert_eq!(ab.split_symbol(s), (Some(0), Some(3)));
    assert_eq!(ab.split_symbol(ab.symbol(None, Some(1))), (None, Some(1)));
    assert_eq!(ab.display_symbol(ab.symbol(Some(2), None)), "(b,_)");
    assert_eq!(ab.symbols().count(), 24);
    assert!(ab.symbols().all(|s| s != ab.symbol(None, None)));
}

#[test]
fn check_word_range() {
    let ab = free2();

    assert!(ab.check_word(&[0, 3]).is_ok());
    assert_eq!(ab.check_word(&[0, 4]), Err(WordError::BadGenerator(4)));
}
