pub mod anchor;
pub mod cache;
pub mod loader;
pub mod ngrams;
pub mod profiles;
pub mod stats;
pub mod words;

use self::ngrams::{QuadgramModel, QuadgramTable};
use self::profiles::Language;
use self::words::WordSet;
use crate::alphabet::AlphabetCodec;
use crate::config::ScoringWeights;
use crate::error::CfResult;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Normalised entropy of English prose, used when the profile does not
/// cover the alphabet at all.
const FALLBACK_ENTROPY_TARGET: f64 = 0.88;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMethod {
    Quadgram,
    #[strum(to_string = "ic", serialize = "index-of-coincidence")]
    #[serde(rename = "ic", alias = "index-of-coincidence")]
    IndexOfCoincidence,
    ChiSquared,
    Entropy,
    WordBoundary,
    CommonWords,
    Anchor,
    #[default]
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    HigherIsBetter,
    LowerIsBetter,
}

impl Orientation {
    /// Maps a raw score onto a scale where larger always wins.
    #[inline]
    pub fn orient(self, score: f64) -> f64 {
        match self {
            Orientation::HigherIsBetter => score,
            Orientation::LowerIsBetter => -score,
        }
    }
}

impl ScoringMethod {
    pub fn orientation(self) -> Orientation {
        match self {
            ScoringMethod::ChiSquared => Orientation::LowerIsBetter,
            _ => Orientation::HigherIsBetter,
        }
    }

    /// Whether the method consumes the known-plaintext fragment.
    pub fn uses_fragment(self) -> bool {
        matches!(self, ScoringMethod::Anchor | ScoringMethod::Composite)
    }

    // Only the composite reads the canonical member string.
    fn uses_members(self) -> bool {
        self == ScoringMethod::Composite
    }
}

/// Every metric for one text; `None` where the metric is undefined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub symbols: usize,
    pub quadgram: Option<f64>,
    pub index_of_coincidence: Option<f64>,
    pub chi_squared: Option<f64>,
    pub entropy: Option<f64>,
    pub word_boundary: Option<f64>,
    pub common_words: f64,
    /// Substring coverage by reference words; composite only.
    pub word_coverage: f64,
    pub anchor: f64,
    pub illegal_pairs: usize,
    pub composite: Option<f64>,
}

/// Reusable buffers for the per-key hot path.
#[derive(Debug, Clone, Default)]
pub struct ScoreScratch {
    symbols: Vec<usize>,
    counts: Vec<usize>,
    members: String,
}

#[derive(TypedBuilder)]
pub struct ScorerParams {
    pub codec: AlphabetCodec,
    #[builder(default)]
    pub method: ScoringMethod,
    #[builder(default)]
    pub language: Language,
    #[builder(default)]
    pub weights: ScoringWeights,
    /// Defaults to the embedded English table.
    #[builder(default, setter(strip_option))]
    pub quadgrams: Option<QuadgramTable>,
    /// Defaults to the language profile's common words.
    #[builder(default, setter(strip_option))]
    pub words: Option<Vec<String>>,
    #[builder(default, setter(into))]
    pub fragment: String,
}

impl ScorerParams {
    pub fn build_scorer(self) -> CfResult<Scorer> {
        self.weights.validate()?;
        let codec = self.codec;
        let size = codec.len();
        let profile = self.language.profile();

        let mut expected = vec![0.0; size];
        for &(c, pct) in profile.frequencies {
            if let Some(p) = codec.position_of(c) {
                expected[p] += pct;
            }
        }
        let covered: f64 = expected.iter().sum();
        let target_entropy = if covered > 0.0 {
            expected.iter_mut().for_each(|p| *p /= covered);
            stats::distribution_entropy(&expected) / (size as f64).log2()
        } else {
            warn!(
                "⚠️  {} letter frequencies share no symbols with the alphabet",
                self.language
            );
            FALLBACK_ENTROPY_TARGET
        };

        let table = self.quadgrams.unwrap_or_else(QuadgramTable::english);
        let quadgrams = QuadgramModel::new(&table, &codec, self.weights.quadgram_floor);
        if quadgrams.is_empty() && matches!(self.method, ScoringMethod::Quadgram | ScoringMethod::Composite) {
            warn!("⚠️  No quadgram maps onto the alphabet; every window scores the floor");
        }

        let words = match &self.words {
            Some(list) => WordSet::new(list.iter().map(String::as_str), &codec),
            None => WordSet::new(profile.common_words.iter().copied(), &codec),
        };

        let illegal_pairs = profile
            .illegal_pairs
            .iter()
            .filter_map(|pair| {
                let mut it = pair.chars().map(|c| codec.position_of(c));
                match (it.next(), it.next()) {
                    (Some(Some(a)), Some(Some(b))) => Some((a, b)),
                    _ => None,
                }
            })
            .collect();

        debug!(
            "Scorer: method={} language={} quadgrams={} words={}",
            self.method,
            self.language,
            quadgrams.len(),
            words.len()
        );

        Ok(Scorer {
            codec,
            method: self.method,
            language: self.language,
            weights: self.weights,
            expected,
            target_ic: profile.expected_ic,
            target_entropy,
            quadgrams,
            words,
            illegal_pairs,
            fragment: self.fragment,
        })
    }
}

/// Read-only plausibility scorer, shared by every worker of a session.
#[derive(Debug, Clone)]
pub struct Scorer {
    codec: AlphabetCodec,
    method: ScoringMethod,
    language: Language,
    weights: ScoringWeights,
    // probability per alphabet position, normalised over covered positions
    expected: Vec<f64>,
    target_ic: f64,
    target_entropy: f64,
    quadgrams: QuadgramModel,
    words: WordSet,
    illegal_pairs: Vec<(usize, usize)>,
    fragment: String,
}

impl Scorer {
    pub fn method(&self) -> ScoringMethod {
        self.method
    }

    pub fn orientation(&self) -> Orientation {
        self.method.orientation()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn codec(&self) -> &AlphabetCodec {
        &self.codec
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn target_ic(&self) -> f64 {
        self.target_ic
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn scratch(&self) -> ScoreScratch {
        ScoreScratch {
            symbols: Vec::new(),
            counts: vec![0; self.codec.len()],
            members: String::new(),
        }
    }

    pub fn score(&self, text: &str) -> Option<f64> {
        self.score_with(text, &mut self.scratch())
    }

    /// Scores `text` with the configured method. `None` means the text is
    /// too short for the method to say anything, which disqualifies it.
    pub fn score_with(&self, text: &str, scratch: &mut ScoreScratch) -> Option<f64> {
        self.tally(text, scratch, self.method.uses_members());
        let n = scratch.symbols.len();
        match self.method {
            ScoringMethod::Quadgram => self.quadgrams.log_likelihood(&scratch.symbols),
            ScoringMethod::IndexOfCoincidence => stats::index_of_coincidence(&scratch.counts, n),
            ScoringMethod::ChiSquared => stats::chi_squared(&scratch.counts, &self.expected),
            ScoringMethod::Entropy => self.entropy_closeness(&scratch.counts, n),
            ScoringMethod::WordBoundary => words::boundary_ratio(text),
            ScoringMethod::CommonWords => {
                (!text.is_empty()).then(|| self.words.overlap(text, &self.codec))
            }
            ScoringMethod::Anchor => {
                (!text.is_empty()).then(|| anchor::fragment_bonus(text, &self.fragment))
            }
            ScoringMethod::Composite => self.composite(text, scratch),
        }
    }

    /// Every metric at once, for reports.
    pub fn breakdown(&self, text: &str) -> ScoreBreakdown {
        let mut scratch = self.scratch();
        self.tally(text, &mut scratch, true);
        let n = scratch.symbols.len();
        ScoreBreakdown {
            symbols: n,
            quadgram: self.quadgrams.log_likelihood(&scratch.symbols),
            index_of_coincidence: stats::index_of_coincidence(&scratch.counts, n),
            chi_squared: stats::chi_squared(&scratch.counts, &self.expected),
            entropy: self.entropy_closeness(&scratch.counts, n),
            word_boundary: words::boundary_ratio(text),
            common_words: self.words.overlap(text, &self.codec),
            word_coverage: self.words.coverage(&scratch.members),
            anchor: anchor::fragment_bonus(text, &self.fragment),
            illegal_pairs: self.illegal_pair_count(&scratch.symbols),
            composite: self.composite(text, &scratch),
        }
    }

    fn tally(&self, text: &str, scratch: &mut ScoreScratch, members: bool) {
        scratch.symbols.clear();
        scratch.members.clear();
        scratch.counts.clear();
        scratch.counts.resize(self.codec.len(), 0);
        for c in text.chars() {
            if let Some(p) = self.codec.position_of(c) {
                scratch.symbols.push(p);
                scratch.counts[p] += 1;
                if members {
                    scratch.members.push(self.codec.symbol_at(p));
                }
            }
        }
    }

    /// Weighted sum of the bounded metrics, less the illegal-pair penalty,
    /// clamped to `[0, 1]`. Assumes `tally` already ran with members.
    fn composite(&self, text: &str, scratch: &ScoreScratch) -> Option<f64> {
        let n = scratch.symbols.len();
        if n < 2 {
            return None;
        }
        let w = &self.weights;
        let mut total = 0.0;

        if let Some(q) = self.quadgrams.normalized(&scratch.symbols) {
            total += w.weight_quadgram * q;
        }
        if let Some(ic) = stats::index_of_coincidence(&scratch.counts, n) {
            total += w.weight_ic * self.ic_closeness(ic);
        }
        if let Some(chi) = stats::chi_squared(&scratch.counts, &self.expected) {
            total += w.weight_chi_squared / (1.0 + chi / n as f64);
        }
        if let Some(e) = self.entropy_closeness(&scratch.counts, n) {
            total += w.weight_entropy * e;
        }
        if let Some(b) = words::boundary_ratio(text) {
            total += w.weight_word_boundary * (b / words::BOUNDARY_TARGET).min(1.0);
        }
        total += w.weight_common_words * self.words.overlap(text, &self.codec);
        total += w.weight_word_coverage * self.words.coverage(&scratch.members);
        if !self.fragment.is_empty() {
            total += w.weight_anchor * anchor::fragment_bonus(text, &self.fragment);
        }
        total -= w.penalty_illegal_pair * self.illegal_pair_count(&scratch.symbols) as f64;

        Some(total.clamp(0.0, 1.0))
    }

    fn ic_closeness(&self, ic: f64) -> f64 {
        let random = 1.0 / self.codec.len() as f64;
        let span = self.target_ic - random;
        if span <= 0.0 {
            return 0.0;
        }
        (1.0 - (ic - self.target_ic).abs() / span).clamp(0.0, 1.0)
    }

    fn entropy_closeness(&self, counts: &[usize], n: usize) -> Option<f64> {
        let h = stats::entropy(counts, n)? / (self.codec.len() as f64).log2();
        Some((1.0 - (h - self.target_entropy).abs() / self.target_entropy).clamp(0.0, 1.0))
    }

    // Distinct illegal pairs present, not occurrences.
    fn illegal_pair_count(&self, symbols: &[usize]) -> usize {
        self.illegal_pairs
            .iter()
            .filter(|&&(a, b)| symbols.windows(2).any(|w| w[0] == a && w[1] == b))
            .count()
    }
}
