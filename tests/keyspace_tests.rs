use cipherforge::error::CipherForgeError;
use cipherforge::keyspace::{total_keys, KeySpace, LengthBound, MAX_KEY_LENGTH};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(26, 1, 26)]
#[case(26, 3, 18_278)]
#[case(2, 4, 30)]
#[case(10, 6, 1_111_110)]
fn test_total_keys(#[case] size: usize, #[case] max_len: usize, #[case] expected: u64) {
    assert_eq!(total_keys(size, max_len).unwrap(), expected);
}

#[test]
fn test_overflow_is_reported_not_wrapped() {
    // 26^14 > 2^64
    match total_keys(26, 14) {
        Err(CipherForgeError::KeySpaceTooLarge {
            alphabet_size,
            max_length,
        }) => {
            assert_eq!(alphabet_size, 26);
            assert_eq!(max_length, 14);
        }
        other => panic!("expected KeySpaceTooLarge, got {:?}", other),
    }
    // 26^13 still fits, and the sum does too
    assert!(total_keys(26, 13).is_ok());
}

#[test]
fn test_ordering_by_length_then_numeral() {
    let ks = KeySpace::new(26, 3).unwrap();
    assert_eq!(ks.key_at(0).unwrap(), vec![0]);
    assert_eq!(ks.key_at(25).unwrap(), vec![25]);
    assert_eq!(ks.key_at(26).unwrap(), vec![0, 0]);
    assert_eq!(ks.key_at(27).unwrap(), vec![0, 1]);
    assert_eq!(ks.key_at(26 + 26).unwrap(), vec![1, 0]);
    assert_eq!(ks.key_at(702).unwrap(), vec![0, 0, 0]);
    assert_eq!(ks.key_at(18_277).unwrap(), vec![25, 25, 25]);
}

#[test]
fn test_out_of_range_index() {
    let ks = KeySpace::new(3, 2).unwrap();
    assert!(matches!(
        ks.key_at(12),
        Err(CipherForgeError::IndexOutOfRange { index: 12, total: 12 })
    ));
}

#[test]
fn test_long_keys_have_no_recursion_limit() {
    // 2^16 + ... fits comfortably; the last key is all ones.
    let ks = KeySpace::new(2, 40).unwrap();
    let last = ks.key_at(ks.total() - 1).unwrap();
    assert_eq!(last.len(), 40);
    assert!(last.iter().all(|&d| d == 1));
    assert_eq!(ks.index_of(&last).unwrap(), ks.total() - 1);
}

#[rstest]
#[case("5", 1, 5)]
#[case("3-7", 3, 7)]
#[case(" 2 - 4 ", 2, 4)]
fn test_length_bound_parses(#[case] s: &str, #[case] min: usize, #[case] max: usize) {
    let b: LengthBound = s.parse().unwrap();
    assert_eq!((b.min, b.max), (min, max));
}

#[rstest]
#[case("0")]
#[case("7-3")]
#[case("abc")]
#[case("")]
#[case("65")]
fn test_length_bound_rejects(#[case] s: &str) {
    assert!(matches!(
        s.parse::<LengthBound>(),
        Err(CipherForgeError::InvalidParameters(_))
    ));
}

#[test]
fn test_range_for_length_window() {
    let ks = KeySpace::new(26, 4).unwrap();
    let r = ks.range_for(LengthBound::new(2, 3).unwrap()).unwrap();
    assert_eq!(r, 26..18_278);
    let exact = ks.range_for(LengthBound::exactly(4).unwrap()).unwrap();
    assert_eq!(exact.end - exact.start, 26u64.pow(4));
    assert!(ks.range_for(LengthBound::up_to(5).unwrap()).is_err());
}

#[test]
fn test_cursor_matches_direct_decoding() {
    let ks = KeySpace::new(5, 4).unwrap();
    let mut cursor = ks.cursor(17..400).unwrap();
    let mut index = 17;
    while let Some(key) = cursor.next_key() {
        assert_eq!(key, ks.key_at(index).unwrap().as_slice());
        index += 1;
    }
    assert_eq!(index, 400);
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn test_max_length_constant_is_enforced() {
    assert!(KeySpace::new(2, MAX_KEY_LENGTH + 1).is_err());
    assert!(KeySpace::new(1, 3).is_err());
}

proptest! {
    #[test]
    fn prop_index_round_trip(size in 2usize..40, max_len in 1usize..6, seed in any::<u64>()) {
        let ks = KeySpace::new(size, max_len).unwrap();
        let index = seed % ks.total();
        let key = ks.key_at(index).unwrap();
        prop_assert!(!key.is_empty() && key.len() <= max_len);
        prop_assert_eq!(ks.index_of(&key).unwrap(), index);
        prop_assert_eq!(ks.length_of(index).unwrap(), key.len());
    }
}
