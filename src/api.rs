use crate::alphabet::AlphabetCodec;
use crate::cipher::{CasePolicy, CipherTransform};
use crate::config::{Config, ScoringWeights};
use crate::error::{CfResult, CipherForgeError};
use crate::kasiski::{EstimateSource, KeyLengthAnalysis, KeyLengthEstimator};
use crate::keyspace::LengthBound;
use crate::scorer::profiles::Language;
use crate::scorer::{ScoreBreakdown, ScorerParams};
use crate::search::{
    ProgressCallback, RayonSubstrate, ScoredCandidate, SearchCoordinator, SearchProgress,
    SearchRequest, SessionState,
};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Serializable outcome of one search session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub request: SearchRequest,
    pub state: SessionState,
    pub progress: SearchProgress,
    pub length_hint: Option<usize>,
    pub hint_source: Option<EstimateSource>,
    pub results: Vec<ScoredCandidate>,
}

impl SessionRecord {
    pub fn to_json(&self) -> CfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CfResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Falls back to the language's own alphabet when none is given.
pub fn resolve_alphabet(alphabet: Option<&str>, language: Language) -> &str {
    match alphabet {
        Some(a) if !a.is_empty() => a,
        _ => language.profile().default_alphabet,
    }
}

/// Service: turn layered configuration into a search request.
pub fn request_from_config(
    config: &Config,
    ciphertext: &str,
    alphabet: &str,
    fragment: &str,
) -> CfResult<SearchRequest> {
    config.validate()?;
    let search = &config.search;
    let mut request = SearchRequest::builder()
        .ciphertext(ciphertext)
        .alphabet(alphabet)
        .lengths(search.length_bound()?)
        .fragment(fragment)
        .workers(search.resolved_workers())
        .batch_size(search.batch_size)
        .top_k(search.top_k)
        .method(search.method)
        .language(search.language)
        .case(search.case)
        .weights(config.weights.clone())
        .admission(config.admission)
        .use_length_hint(search.use_length_hint)
        .require_fragment(search.require_fragment)
        .cache_capacity(search.cache_capacity)
        .build();
    request.key_chars = search.key_chars.clone();
    Ok(request)
}

/// Service: run a full search on the rayon substrate and block until it
/// completes, fails, or the callback stops it.
pub fn crack<CB: ProgressCallback>(
    request: SearchRequest,
    report_interval: Duration,
    callback: &CB,
) -> CfResult<SessionRecord> {
    let substrate = RayonSubstrate::new(request.workers)?;
    let mut coordinator = SearchCoordinator::new(substrate).with_report_interval(report_interval);
    coordinator.start(request.clone())?;
    let state = coordinator.run(callback)?;

    let hint = coordinator.length_hint();
    info!(
        "Session finished: {} ({} candidates)",
        state,
        coordinator.results().len()
    );
    Ok(SessionRecord {
        request,
        state,
        progress: coordinator.progress(),
        length_hint: hint.map(|(len, _)| len),
        hint_source: hint.map(|(_, source)| source),
        results: coordinator.results().to_vec(),
    })
}

/// Service: Kasiski and coincidence analysis for display.
pub fn analyze_key_length(
    ciphertext: &str,
    alphabet: &str,
    max_length: usize,
    language: Language,
) -> CfResult<KeyLengthAnalysis> {
    let codec = AlphabetCodec::build(alphabet)?;
    let bound = LengthBound::up_to(max_length)?;
    let estimator = KeyLengthEstimator::new(&codec, language.profile().expected_ic);
    Ok(estimator.analyze(ciphertext, bound.max))
}

pub fn encrypt(text: &str, key: &str, alphabet: &str, case: CasePolicy) -> CfResult<String> {
    CipherTransform::new(AlphabetCodec::build(alphabet)?, case).encrypt(text, key)
}

pub fn decrypt(text: &str, key: &str, alphabet: &str, case: CasePolicy) -> CfResult<String> {
    CipherTransform::new(AlphabetCodec::build(alphabet)?, case).decrypt(text, key)
}

/// Uniformly random key; a seed makes it reproducible.
pub fn random_key(alphabet: &str, length: usize, seed: Option<u64>) -> CfResult<String> {
    let codec = AlphabetCodec::build(alphabet)?;
    if length == 0 {
        return Err(CipherForgeError::InvalidParameters(
            "key length must be at least 1".into(),
        ));
    }
    let mut rng = match seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    Ok((0..length)
        .map(|_| codec.symbol_at(rng.usize(..codec.len())))
        .collect())
}

/// Service: every metric for a single text.
pub fn score_text(
    text: &str,
    alphabet: &str,
    language: Language,
    fragment: &str,
    weights: ScoringWeights,
) -> CfResult<ScoreBreakdown> {
    let scorer = ScorerParams::builder()
        .codec(AlphabetCodec::build(alphabet)?)
        .language(language)
        .weights(weights)
        .fragment(fragment)
        .build()
        .build_scorer()?;
    Ok(scorer.breakdown(text))
}
