use crate::alphabet::AlphabetCodec;
use crate::scorer::stats;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MIN_REPEAT: usize = 3;

/// Longest repeat examined. Periodic text repeats at every length, so an
/// uncapped scan is cubic in the text length.
pub const MAX_REPEAT_LEN: usize = 32;

/// Fraction of the way from random-text IC to the language IC a column
/// average must reach before the coincidence fallback accepts a length.
pub const COINCIDENCE_ACCEPT_FRACTION: f64 = 0.6;

/// A substring of the normalised ciphertext seen at least twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub symbols: Vec<usize>,
    /// Ascending start offsets into the normalised text.
    pub offsets: Vec<usize>,
}

impl Repeat {
    pub fn distances(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.windows(2).map(|w| w[1] - w[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Kasiski,
    Coincidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyLengthCandidate {
    pub length: usize,
    pub votes: u64,
    /// Share of all factor votes cast for this length.
    pub score: f64,
    /// Average index of coincidence of the ciphertext columns at this period.
    pub coincidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyLengthAnalysis {
    pub best: Option<usize>,
    pub source: Option<EstimateSource>,
    pub repeats_found: usize,
    /// Sorted by votes descending, then coincidence descending.
    pub candidates: Vec<KeyLengthCandidate>,
}

impl KeyLengthAnalysis {
    pub fn top(&self, n: usize) -> &[KeyLengthCandidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }
}

/// Kasiski examination with an index-of-coincidence fallback.
///
/// Everything here is a statistical hint: callers fall back to the full
/// length range when nothing is returned.
pub struct KeyLengthEstimator<'a> {
    codec: &'a AlphabetCodec,
    min_repeat: usize,
    target_ic: f64,
}

impl<'a> KeyLengthEstimator<'a> {
    pub fn new(codec: &'a AlphabetCodec, target_ic: f64) -> Self {
        Self {
            codec,
            min_repeat: DEFAULT_MIN_REPEAT,
            target_ic,
        }
    }

    pub fn with_min_repeat(mut self, min_repeat: usize) -> Self {
        self.min_repeat = min_repeat.max(1);
        self
    }

    pub fn find_repeats(&self, ciphertext: &str) -> Vec<Repeat> {
        find_repeats(&self.codec.encode(ciphertext), self.min_repeat)
    }

    /// Factor votes for every length in `2..=max_length`.
    pub fn votes(&self, ciphertext: &str, max_length: usize) -> Vec<(usize, u64)> {
        let repeats = self.find_repeats(ciphertext);
        tally_votes(&repeats, max_length)
    }

    /// Most-voted factor, smallest on ties; `None` when no repeats exist.
    pub fn estimate(&self, ciphertext: &str, max_length: usize) -> Option<usize> {
        best_vote(&self.votes(ciphertext, max_length))
    }

    /// Average column IC for each period in `1..=max_length`.
    pub fn coincidence_profile(&self, ciphertext: &str, max_length: usize) -> Vec<(usize, f64)> {
        let symbols = self.codec.encode(ciphertext);
        (1..=max_length)
            .map(|period| (period, column_ic(&symbols, period, self.codec.len())))
            .collect()
    }

    /// Smallest period whose column IC looks like language, if any does.
    pub fn estimate_by_coincidence(&self, ciphertext: &str, max_length: usize) -> Option<usize> {
        let random = 1.0 / self.codec.len() as f64;
        if self.target_ic <= random {
            return None;
        }
        let threshold = random + COINCIDENCE_ACCEPT_FRACTION * (self.target_ic - random);
        self.coincidence_profile(ciphertext, max_length)
            .into_iter()
            .find(|&(_, ic)| ic >= threshold)
            .map(|(period, _)| period)
    }

    /// Kasiski first, coincidence second.
    pub fn suggest(&self, ciphertext: &str, max_length: usize) -> Option<(usize, EstimateSource)> {
        if let Some(len) = self.estimate(ciphertext, max_length) {
            return Some((len, EstimateSource::Kasiski));
        }
        debug!("Kasiski found no repeats, trying coincidence fallback");
        self.estimate_by_coincidence(ciphertext, max_length)
            .map(|len| (len, EstimateSource::Coincidence))
    }

    pub fn analyze(&self, ciphertext: &str, max_length: usize) -> KeyLengthAnalysis {
        let symbols = self.codec.encode(ciphertext);
        let repeats = find_repeats(&symbols, self.min_repeat);
        let votes = tally_votes(&repeats, max_length);
        let total_votes: u64 = votes.iter().map(|&(_, v)| v).sum();

        let mut candidates: Vec<KeyLengthCandidate> = (1..=max_length)
            .map(|length| {
                let v = votes
                    .iter()
                    .find(|&&(l, _)| l == length)
                    .map(|&(_, v)| v)
                    .unwrap_or(0);
                KeyLengthCandidate {
                    length,
                    votes: v,
                    score: if total_votes > 0 {
                        v as f64 / total_votes as f64
                    } else {
                        0.0
                    },
                    coincidence: column_ic(&symbols, length, self.codec.len()),
                }
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(b.coincidence.total_cmp(&a.coincidence))
                .then(a.length.cmp(&b.length))
        });

        let suggestion = self.suggest(ciphertext, max_length);
        KeyLengthAnalysis {
            best: suggestion.map(|(l, _)| l),
            source: suggestion.map(|(_, s)| s),
            repeats_found: repeats.len(),
            candidates,
        }
    }
}

/// Every distinct substring of length `min_len..=MAX_REPEAT_LEN` (and at
/// most half the text) occurring at least twice, with all of its start
/// offsets.
pub fn find_repeats(symbols: &[usize], min_len: usize) -> Vec<Repeat> {
    let n = symbols.len();
    let mut out = Vec::new();
    let min_len = min_len.max(1);
    let max_len = (n / 2).min(MAX_REPEAT_LEN.max(min_len));

    for len in min_len..=max_len {
        let mut seen: FnvHashMap<&[usize], Vec<usize>> = FnvHashMap::default();
        for start in 0..=n - len {
            seen.entry(&symbols[start..start + len])
                .or_default()
                .push(start);
        }

        let before = out.len();
        for (seq, offsets) in seen {
            if offsets.len() >= 2 {
                out.push(Repeat {
                    symbols: seq.to_vec(),
                    offsets,
                });
            }
        }
        // A repeat of length L+1 contains one of length L.
        if out.len() == before {
            break;
        }
    }

    out.sort_by(|a, b| a.offsets[0].cmp(&b.offsets[0]).then(a.symbols.len().cmp(&b.symbols.len())));
    out
}

fn tally_votes(repeats: &[Repeat], max_length: usize) -> Vec<(usize, u64)> {
    let mut votes = vec![0u64; max_length + 1];
    for r in repeats {
        for d in r.distances() {
            for (f, slot) in votes.iter_mut().enumerate().skip(2) {
                if d % f == 0 {
                    *slot += 1;
                }
            }
        }
    }
    votes
        .into_iter()
        .enumerate()
        .skip(2)
        .filter(|&(_, v)| v > 0)
        .collect()
}

fn best_vote(votes: &[(usize, u64)]) -> Option<usize> {
    votes
        .iter()
        .fold(None, |best: Option<(usize, u64)>, &(len, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((len, v)),
        })
        .map(|(len, _)| len)
}

fn column_ic(symbols: &[usize], period: usize, alphabet_size: usize) -> f64 {
    let mut sum = 0.0;
    let mut columns = 0;
    for col in 0..period {
        let mut counts = vec![0usize; alphabet_size];
        let mut n = 0;
        for &s in symbols.iter().skip(col).step_by(period) {
            counts[s] += 1;
            n += 1;
        }
        if let Some(ic) = stats::index_of_coincidence(&counts, n) {
            sum += ic;
            columns += 1;
        }
    }
    if columns == 0 {
        0.0
    } else {
        sum / columns as f64
    }
}
