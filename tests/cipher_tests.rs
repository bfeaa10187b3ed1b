use cipherforge::alphabet::AlphabetCodec;
use cipherforge::cipher::{CasePolicy, CipherTransform, Direction};
use cipherforge::error::CipherForgeError;
use cipherforge::scorer::profiles::{CYRILLIC, LATIN};
use proptest::prelude::*;
use rstest::rstest;

fn latin(case: CasePolicy) -> CipherTransform {
    CipherTransform::new(AlphabetCodec::build(LATIN).unwrap(), case)
}

#[rstest]
#[case("A")]
#[case("")]
#[case("ABCA")]
fn test_invalid_alphabets(#[case] alphabet: &str) {
    assert!(matches!(
        AlphabetCodec::build(alphabet),
        Err(CipherForgeError::InvalidAlphabet(_))
    ));
}

#[test]
fn test_classic_vigenere_vector() {
    let t = latin(CasePolicy::Normalize);
    assert_eq!(
        t.encrypt("ATTACKATDAWN", "LEMON").unwrap(),
        "LXFOPVEFRNHR"
    );
    assert_eq!(
        t.decrypt("LXFOPVEFRNHR", "LEMON").unwrap(),
        "ATTACKATDAWN"
    );
}

#[test]
fn test_non_members_pass_through_without_consuming_key() {
    let t = latin(CasePolicy::Normalize);
    assert_eq!(
        t.encrypt("ATTACK AT DAWN!", "LEMON").unwrap(),
        "LXFOPV EF RNHR!"
    );
}

#[test]
fn test_case_policy() {
    let preserve = latin(CasePolicy::Preserve);
    let normalize = latin(CasePolicy::Normalize);
    assert_eq!(preserve.encrypt("Attack", "B").unwrap(), "Buubdl");
    assert_eq!(normalize.encrypt("Attack", "B").unwrap(), "BUUBDL");
}

#[test]
fn test_key_outside_alphabet_is_rejected() {
    let t = latin(CasePolicy::Preserve);
    assert!(matches!(
        t.encrypt("HELLO", "K3Y"),
        Err(CipherForgeError::InvalidParameters(_))
    ));
    assert!(t.encrypt("HELLO", "").is_err());
}

#[test]
fn test_cyrillic_alphabet() {
    let t = CipherTransform::new(AlphabetCodec::build(CYRILLIC).unwrap(), CasePolicy::Preserve);
    let ct = t.encrypt("Привет, мир", "КЛЮЧ").unwrap();
    assert_ne!(ct, "Привет, мир");
    assert_eq!(t.decrypt(&ct, "КЛЮЧ").unwrap(), "Привет, мир");
}

#[test]
fn test_prepared_text_reuse() {
    let t = latin(CasePolicy::Preserve);
    let prepared = t.prepare("Hello, World");
    assert_eq!(prepared.symbol_count(), 10);

    let key = t.key_positions("KEY").unwrap();
    let mut enc = String::new();
    t.apply(&prepared, &key, Direction::Encrypt, &mut enc);
    let mut dec = String::new();
    t.decrypt_into(&t.prepare(&enc), &key, &mut dec);
    assert_eq!(dec, "Hello, World");
}

#[test]
fn test_mixed_case_alphabet_round_trips() {
    let t = CipherTransform::new(AlphabetCodec::build("Ab").unwrap(), CasePolicy::Preserve);
    let ct = t.encrypt("a", "b").unwrap();
    assert_eq!(ct, "a");
    assert_eq!(t.decrypt(&ct, "b").unwrap(), "a");
    assert_eq!(t.encrypt("Ab", "b").unwrap(), "bA");
}

proptest! {
    #[test]
    fn prop_decrypt_inverts_encrypt(text in "[A-Za-z ,.!]{0,80}", key in "[A-Z]{1,12}") {
        let t = latin(CasePolicy::Preserve);
        let ct = t.encrypt(&text, &key).unwrap();
        prop_assert_eq!(t.decrypt(&ct, &key).unwrap(), text);
    }

    #[test]
    fn prop_custom_alphabet_round_trip(text in "[a-f0-9 ]{0,60}", key in "[a-f0-9]{1,6}") {
        let t = CipherTransform::new(
            AlphabetCodec::build("0123456789abcdef").unwrap(),
            CasePolicy::Normalize,
        );
        let ct = t.encrypt(&text, &key).unwrap();
        prop_assert_eq!(t.decrypt(&ct, &key).unwrap(), text);
    }

    #[test]
    fn prop_mixed_case_alphabet_round_trip(text in "[a-zA-Z ]{0,60}", key in "[AbCdEf]{1,6}") {
        let t = CipherTransform::new(
            AlphabetCodec::build("AbCdEfGh").unwrap(),
            CasePolicy::Preserve,
        );
        let ct = t.encrypt(&text, &key).unwrap();
        prop_assert_eq!(t.decrypt(&ct, &key).unwrap(), text);
    }
}
