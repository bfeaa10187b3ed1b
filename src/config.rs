use crate::cipher::CasePolicy;
use crate::error::{CfResult, CipherForgeError};
use crate::keyspace::LengthBound;
use crate::scorer::profiles::Language;
use crate::scorer::ScoringMethod;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub weights: ScoringWeights,
    #[command(flatten)]
    pub admission: AdmissionPolicy,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Key length bound: "N" searches 1..=N, "A-B" searches A..=B.
    #[arg(short = 'l', long, default_value = "4")]
    pub key_length: String,

    /// Restrict key symbols to these characters.
    #[arg(long)]
    pub key_chars: Option<String>,

    /// Parallel workers; 0 uses every available core.
    #[arg(short = 'w', long, default_value_t = 0)]
    pub workers: usize,

    #[arg(short = 'b', long, default_value_t = 5_000)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    #[arg(short = 'm', long, default_value_t = ScoringMethod::Composite)]
    pub method: ScoringMethod,

    #[arg(long, default_value_t = Language::English)]
    pub language: Language,

    #[arg(long, default_value_t = CasePolicy::Preserve)]
    pub case: CasePolicy,

    /// Narrow the search to the estimated key length when one is found.
    #[arg(long, default_value_t = false)]
    pub use_length_hint: bool,

    /// Drop candidates whose plaintext lacks the known fragment.
    #[arg(long, default_value_t = false)]
    pub require_fragment: bool,

    /// Per-worker score cache entries; 0 disables caching.
    #[arg(long, default_value_t = 4096)]
    pub cache_capacity: usize,

    #[arg(long, default_value_t = 1000)]
    pub report_interval_ms: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            key_length: "4".to_string(),
            key_chars: None,
            workers: 0,
            batch_size: 5_000,
            top_k: 10,
            method: ScoringMethod::Composite,
            language: Language::English,
            case: CasePolicy::Preserve,
            use_length_hint: false,
            require_fragment: false,
            cache_capacity: 4096,
            report_interval_ms: 1000,
        }
    }
}

impl SearchParams {
    pub fn length_bound(&self) -> CfResult<LengthBound> {
        self.key_length.parse()
    }

    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

/// Composite score weights. Stable for one session; not correctness
/// invariants.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    #[arg(long, default_value_t = 0.35)]
    pub weight_quadgram: f64,
    #[arg(long, default_value_t = 0.15)]
    pub weight_ic: f64,
    #[arg(long, default_value_t = 0.20)]
    pub weight_chi_squared: f64,
    #[arg(long, default_value_t = 0.05)]
    pub weight_entropy: f64,
    #[arg(long, default_value_t = 0.05)]
    pub weight_word_boundary: f64,
    #[arg(long, default_value_t = 0.20)]
    pub weight_common_words: f64,
    /// Reference words found inside unsegmented text.
    #[arg(long, default_value_t = 0.10)]
    pub weight_word_coverage: f64,

    // Bonus on top of the other terms; the composite is clamped afterwards.
    #[arg(long, default_value_t = 0.30)]
    pub weight_anchor: f64,

    #[arg(long, default_value_t = 0.05)]
    pub penalty_illegal_pair: f64,

    #[arg(long, default_value_t = 1e-10)]
    pub quadgram_floor: f64,

    /// Characters of plaintext kept with each candidate.
    #[arg(long, default_value_t = 60)]
    pub sample_length: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weight_quadgram: 0.35,
            weight_ic: 0.15,
            weight_chi_squared: 0.20,
            weight_entropy: 0.05,
            weight_word_boundary: 0.05,
            weight_common_words: 0.20,
            weight_word_coverage: 0.10,
            weight_anchor: 0.30,
            penalty_illegal_pair: 0.05,
            quadgram_floor: 1e-10,
            sample_length: 60,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> CfResult<()> {
        let weights = [
            ("weight_quadgram", self.weight_quadgram),
            ("weight_ic", self.weight_ic),
            ("weight_chi_squared", self.weight_chi_squared),
            ("weight_entropy", self.weight_entropy),
            ("weight_word_boundary", self.weight_word_boundary),
            ("weight_common_words", self.weight_common_words),
            ("weight_word_coverage", self.weight_word_coverage),
            ("weight_anchor", self.weight_anchor),
            ("penalty_illegal_pair", self.penalty_illegal_pair),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(CipherForgeError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, w
                )));
            }
        }
        if !(self.quadgram_floor > 0.0 && self.quadgram_floor < 1.0) {
            return Err(CipherForgeError::Config(format!(
                "quadgram_floor must be in (0, 1), got {}",
                self.quadgram_floor
            )));
        }
        Ok(())
    }
}

/// Relative-score admission for the top-K set:
/// `floor = max(min_score, best * admission_ratio)`.
#[derive(Args, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionPolicy {
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Applied only while the best (oriented) score is positive.
    #[arg(long, default_value_t = 0.5)]
    pub admission_ratio: f64,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            min_score: None,
            admission_ratio: 0.5,
        }
    }
}

impl AdmissionPolicy {
    /// No floor at all; every candidate competes on rank alone.
    pub fn unrestricted() -> Self {
        Self {
            min_score: None,
            admission_ratio: 0.0,
        }
    }

    pub fn validate(&self) -> CfResult<()> {
        if !(0.0..=1.0).contains(&self.admission_ratio) {
            return Err(CipherForgeError::Config(format!(
                "admission_ratio must be in [0, 1], got {}",
                self.admission_ratio
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CfResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> CfResult<()> {
        self.search.length_bound()?;
        self.weights.validate()?;
        self.admission.validate()
    }

    /// Copies onto `self` only the values explicitly given on the command
    /// line, so file-provided values survive CLI defaults.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search.key_length);
        update_if_present!(search.key_chars);
        update_if_present!(search.workers);
        update_if_present!(search.batch_size);
        update_if_present!(search.top_k);
        update_if_present!(search.method);
        update_if_present!(search.language);
        update_if_present!(search.case);
        update_if_present!(search.use_length_hint);
        update_if_present!(search.require_fragment);
        update_if_present!(search.cache_capacity);
        update_if_present!(search.report_interval_ms);

        update_if_present!(weights.weight_quadgram);
        update_if_present!(weights.weight_ic);
        update_if_present!(weights.weight_chi_squared);
        update_if_present!(weights.weight_entropy);
        update_if_present!(weights.weight_word_boundary);
        update_if_present!(weights.weight_common_words);
        update_if_present!(weights.weight_word_coverage);
        update_if_present!(weights.weight_anchor);
        update_if_present!(weights.penalty_illegal_pair);
        update_if_present!(weights.quadgram_floor);
        update_if_present!(weights.sample_length);

        update_if_present!(admission.min_score);
        update_if_present!(admission.admission_ratio);
    }
}
