use std::cmp::Ordering;

use super::*;

#[test]
fn shortlex_prefers_shorter() {
    let order = WordOrder::ShortLex;

    assert_eq!(order.compare(&[1], &[0, 0]), Ordering::Less);
    assert_eq!(order.compare(&[0, 1], &[1, 0]), Ordering::Less);
    assert_eq!(order.compare(&[], &[]), Ordering::Equal);
    assert!(order.is_geodesic());
}

#[test]
fn weighted_lex_compares_weight_first() {
    let order = WordOrder::WeightedLex {
        weights: vec![1, 3],
    };

    // "b" weighs 3, "aa" weighs 2.
    assert_eq!(order.compare(&[0, 0], &[1]), Ordering::Less);
    assert!(order.less(&[0], &[1]));
    assert!(!order.is_geodesic());
    assert!(order.fits(2));
    assert!(!order.fits(3));
}

#[test]
fn alphabet_rejects_misfit_order() {
    let ab = Alphabet::new(["a", "b"]).unwrap();

    let err = ab
        .with_order(WordOrder::WeightedLex { weights: vec![1] })
        .unwrap_err();
    assert_eq!(err, AlphabetError::BadOrder(2));
}

#[test]
fn index_widths() {
    assert_eq!(crate::width_for_count(0), 1);
    assert_eq!(crate::width_for_count(10), 1);
    assert_eq!(crate::width_for_count(11), 2);
    assert_eq!(crate::width_for_count(101), 3);
}
