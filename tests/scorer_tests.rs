use cipherforge::alphabet::AlphabetCodec;
use cipherforge::config::ScoringWeights;
use cipherforge::error::CipherForgeError;
use cipherforge::scorer::loader::{load_quadgrams, load_quadgrams_from_file, load_word_list};
use cipherforge::scorer::ngrams::QuadgramTable;
use cipherforge::scorer::profiles::{Language, LATIN};
use cipherforge::scorer::{Orientation, Scorer, ScorerParams, ScoringMethod};
use rstest::rstest;
use std::io::Write;
use strum::IntoEnumIterator;

const ENGLISH: &str = "It was the best of times, it was the worst of times, it was the age of \
wisdom, it was the age of foolishness, it was the epoch of belief.";

// Same text under the key SUN.
const GARBLED: &str = "An jsm gzy owmg gz gagrk, cg ouf lbr oiekn bx nveyf, an jsm gzy nyy bx \
qvkxbe, cg ouf lbr sar gz sgiyamufyfk, cg ouf lbr wjbub bx vrdcrx.";

fn scorer(method: ScoringMethod) -> Scorer {
    ScorerParams::builder()
        .codec(AlphabetCodec::build(LATIN).unwrap())
        .method(method)
        .fragment("best of times")
        .build()
        .build_scorer()
        .unwrap()
}

#[rstest]
#[case(ScoringMethod::Quadgram)]
#[case(ScoringMethod::IndexOfCoincidence)]
#[case(ScoringMethod::ChiSquared)]
#[case(ScoringMethod::CommonWords)]
#[case(ScoringMethod::Anchor)]
#[case(ScoringMethod::Composite)]
fn test_plaintext_outranks_ciphertext(#[case] method: ScoringMethod) {
    let s = scorer(method);
    let o = s.orientation();
    let plain = o.orient(s.score(ENGLISH).unwrap());
    let garbled = o.orient(s.score(GARBLED).unwrap());
    assert!(
        plain > garbled,
        "{}: plain {} vs garbled {}",
        method,
        plain,
        garbled
    );
}

#[test]
fn test_only_chi_squared_is_lower_is_better() {
    for m in ScoringMethod::iter() {
        let expected = if m == ScoringMethod::ChiSquared {
            Orientation::LowerIsBetter
        } else {
            Orientation::HigherIsBetter
        };
        assert_eq!(m.orientation(), expected, "{}", m);
    }
}

#[rstest]
#[case("quadgram", ScoringMethod::Quadgram)]
#[case("ic", ScoringMethod::IndexOfCoincidence)]
#[case("index-of-coincidence", ScoringMethod::IndexOfCoincidence)]
#[case("chi-squared", ScoringMethod::ChiSquared)]
#[case("Common-Words", ScoringMethod::CommonWords)]
fn test_method_names(#[case] name: &str, #[case] method: ScoringMethod) {
    assert_eq!(name.parse::<ScoringMethod>().unwrap(), method);
}

#[test]
fn test_short_texts_are_undefined() {
    assert_eq!(scorer(ScoringMethod::Quadgram).score("THE"), None);
    assert_eq!(scorer(ScoringMethod::IndexOfCoincidence).score("A"), None);
    assert_eq!(scorer(ScoringMethod::Composite).score("A!"), None);
    assert_eq!(scorer(ScoringMethod::ChiSquared).score("123"), None);
}

#[test]
fn test_composite_is_clamped() {
    let s = scorer(ScoringMethod::Composite);
    for text in [ENGLISH, GARBLED, "QJQJZXZXQZQZ", "EEEEEEEEEEEE"] {
        let v = s.score(text).unwrap();
        assert!((0.0..=1.0).contains(&v), "{} -> {}", text, v);
    }
}

#[test]
fn test_missing_fragment_withholds_bonus_only() {
    let s = scorer(ScoringMethod::Anchor);
    assert_eq!(s.score("nothing to see here"), Some(0.0));
    let b = s.breakdown(ENGLISH);
    assert!(b.anchor > 0.0);
    assert!(b.composite.is_some());
}

#[test]
fn test_illegal_pair_penalty_lowers_composite() {
    let codec = AlphabetCodec::build(LATIN).unwrap();
    let strict = ScorerParams::builder()
        .codec(codec.clone())
        .weights(ScoringWeights {
            penalty_illegal_pair: 0.2,
            ..ScoringWeights::default()
        })
        .build()
        .build_scorer()
        .unwrap();
    let lenient = ScorerParams::builder()
        .codec(codec)
        .weights(ScoringWeights {
            penalty_illegal_pair: 0.0,
            ..ScoringWeights::default()
        })
        .build()
        .build_scorer()
        .unwrap();
    let text = "THE QJ ZX QUIZ";
    assert!(strict.score(text).unwrap() < lenient.score(text).unwrap());
    assert_eq!(strict.breakdown(text).illegal_pairs, 2);
}

#[test]
fn test_every_language_profile_builds() {
    for lang in Language::iter() {
        let alphabet = lang.profile().default_alphabet;
        let s = ScorerParams::builder()
            .codec(AlphabetCodec::build(alphabet).unwrap())
            .language(lang)
            .build()
            .build_scorer()
            .unwrap();
        assert_eq!(s.language(), lang);
        assert!(s.target_ic() > 1.0 / alphabet.chars().count() as f64);
    }
}

#[test]
fn test_invalid_weights_are_rejected() {
    let result = ScorerParams::builder()
        .codec(AlphabetCodec::build(LATIN).unwrap())
        .weights(ScoringWeights {
            weight_ic: -1.0,
            ..ScoringWeights::default()
        })
        .build()
        .build_scorer();
    assert!(matches!(result, Err(CipherForgeError::Config(_))));
}

#[test]
fn test_loader_accepts_tabs_and_spaces() {
    let data = "TION\t300\nthe  \nNTHE 100\nXX\t5\nABCD\tnope\n";
    let table = load_quadgrams(data.as_bytes()).unwrap();
    assert_eq!(table.entries.len(), 2);
    assert_eq!(table.total, 400.0);
    assert_eq!(table.entries[0], ("TION".to_string(), 300.0));
}

#[test]
fn test_loader_rejects_empty_table() {
    assert!(matches!(
        load_quadgrams("# nothing\n".as_bytes()),
        Err(CipherForgeError::Config(_))
    ));
}

#[test]
fn test_custom_quadgrams_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ATTA\t50").unwrap();
    writeln!(file, "TTAC\t30").unwrap();
    writeln!(file, "TACK\t20").unwrap();
    let table = load_quadgrams_from_file(file.path()).unwrap();

    let s = ScorerParams::builder()
        .codec(AlphabetCodec::build(LATIN).unwrap())
        .method(ScoringMethod::Quadgram)
        .quadgrams(table)
        .build()
        .build_scorer()
        .unwrap();
    let attack = s.score("ATTACK").unwrap();
    let expected = (0.5f64).log10() + (0.3f64).log10() + (0.2f64).log10();
    assert!((attack - expected).abs() < 1e-9);
}

#[test]
fn test_custom_word_list() {
    let words = load_word_list("# header\nzebra\nquokka\n\nyak\n".as_bytes()).unwrap();
    assert_eq!(words, vec!["ZEBRA", "QUOKKA", "YAK"]);

    let s = ScorerParams::builder()
        .codec(AlphabetCodec::build(LATIN).unwrap())
        .method(ScoringMethod::CommonWords)
        .words(words)
        .build()
        .build_scorer()
        .unwrap();
    assert_eq!(s.score("zebra and quokka"), Some(2.0 / 3.0));
    // Unsegmented text holds no reference token; only the composite sees it.
    assert_eq!(s.score("XXZEBRAXX"), Some(0.0));
    assert!(s.breakdown("XXZEBRAXX").word_coverage > 0.0);
}

#[rstest]
#[case("XTHEANDTHATX", 0.0)]
#[case("XTHEANDTHATX QQQ", 0.0)]
#[case("THE", 1.0)]
#[case("!!", 0.0)]
fn test_common_words_counts_delimited_tokens(#[case] text: &str, #[case] expected: f64) {
    let s = scorer(ScoringMethod::CommonWords);
    assert_eq!(s.score(text), Some(expected));
}

#[test]
fn test_word_coverage_lifts_unsegmented_composite() {
    let codec = AlphabetCodec::build(LATIN).unwrap();
    let build = |coverage: f64| {
        ScorerParams::builder()
            .codec(codec.clone())
            .weights(ScoringWeights {
                weight_word_coverage: coverage,
                ..ScoringWeights::default()
            })
            .build()
            .build_scorer()
            .unwrap()
    };
    let text = "ITWASTHEBESTOFTIMESITWASTHEWORSTOFTIMES";
    assert!(build(0.3).score(text).unwrap() > build(0.0).score(text).unwrap());
}

#[test]
fn test_embedded_table_is_not_empty() {
    assert!(!QuadgramTable::english().is_empty());
}
