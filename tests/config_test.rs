use cipherforge::config::{AdmissionPolicy, Config, ScoringWeights, SearchParams};
use cipherforge::error::CipherForgeError;
use cipherforge::keyspace::LengthBound;
use cipherforge::scorer::ScoringMethod;
use clap::{CommandFactory, FromArgMatches, Parser};

// Stand-in for the crack subcommand: just the flattened config.
#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> (Config, clap::ArgMatches) {
    let matches = TestCli::command()
        .try_get_matches_from(std::iter::once("test").chain(args.iter().copied()))
        .unwrap();
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.config, matches)
}

#[test]
fn test_cli_defaults_match_struct_defaults() {
    let (parsed, _) = parse(&[]);
    let defaults = Config::default();
    assert_eq!(parsed.search.key_length, defaults.search.key_length);
    assert_eq!(parsed.search.batch_size, defaults.search.batch_size);
    assert_eq!(parsed.search.method, defaults.search.method);
    assert_eq!(parsed.weights.weight_quadgram, defaults.weights.weight_quadgram);
    assert_eq!(parsed.weights.sample_length, defaults.weights.sample_length);
    assert_eq!(parsed.admission.admission_ratio, defaults.admission.admission_ratio);
    assert!(parsed.admission.min_score.is_none());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.search.key_length = "2-5".into();
    config.search.method = ScoringMethod::ChiSquared;
    config.admission.min_score = Some(120.0);
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.search.key_length, "2-5");
    assert_eq!(loaded.search.method, ScoringMethod::ChiSquared);
    assert_eq!(loaded.admission.min_score, Some(120.0));
    assert_eq!(loaded.search.length_bound().unwrap(), LengthBound::new(2, 5).unwrap());
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{ "search": { "top_k": 3 }, "weights": {}, "admission": {} }"#)
        .unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.search.top_k, 3);
    assert_eq!(loaded.search.batch_size, SearchParams::default().batch_size);
    assert_eq!(loaded.weights.weight_ic, ScoringWeights::default().weight_ic);
}

#[test]
fn test_merge_only_takes_explicit_flags() {
    let mut file_config = Config::default();
    file_config.search.top_k = 3;
    file_config.search.batch_size = 123;
    file_config.weights.weight_anchor = 0.9;

    let (cli, matches) = parse(&["--top-k", "25", "-m", "quadgram"]);
    file_config.merge_from_cli(&cli, &matches);

    assert_eq!(file_config.search.top_k, 25);
    assert_eq!(file_config.search.method, ScoringMethod::Quadgram);
    // Untouched on the command line, so the file values survive.
    assert_eq!(file_config.search.batch_size, 123);
    assert_eq!(file_config.weights.weight_anchor, 0.9);
}

#[test]
fn test_merge_optional_values() {
    let mut file_config = Config::default();
    let (cli, matches) = parse(&["--min-score", "0.4", "--key-chars", "ABC"]);
    file_config.merge_from_cli(&cli, &matches);
    assert_eq!(file_config.admission.min_score, Some(0.4));
    assert_eq!(file_config.search.key_chars.as_deref(), Some("ABC"));
}

#[test]
fn test_validation_errors() {
    let mut config = Config::default();
    config.search.key_length = "9-3".into();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.weights.quadgram_floor = 0.0;
    assert!(matches!(config.validate(), Err(CipherForgeError::Config(_))));

    let mut config = Config::default();
    config.admission = AdmissionPolicy {
        min_score: None,
        admission_ratio: 1.5,
    };
    assert!(matches!(config.validate(), Err(CipherForgeError::Config(_))));

    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(Config::load_from_file(&path).is_err());
    assert!(Config::load_from_file(dir.path().join("missing.json")).is_err());
}
