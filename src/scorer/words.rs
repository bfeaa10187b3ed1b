use crate::alphabet::AlphabetCodec;
use fnv::FnvHashSet;

/// Typical separator/letter transition density of prose (two transitions per
/// average word plus its trailing space).
pub const BOUNDARY_TARGET: f64 = 0.35;

pub const MIN_TOKEN_LEN: usize = 3;

#[inline]
fn is_separator(c: char) -> bool {
    !c.is_alphanumeric()
}

/// Separator <-> non-separator transitions per character.
pub fn boundary_ratio(text: &str) -> Option<f64> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let mut prev = is_separator(first);
    let mut len = 1usize;
    let mut transitions = 0usize;
    for c in chars {
        let sep = is_separator(c);
        if sep != prev {
            transitions += 1;
        }
        prev = sep;
        len += 1;
    }
    Some(transitions as f64 / len as f64)
}

/// Reference words in the codec's canonical spelling.
#[derive(Debug, Clone, Default)]
pub struct WordSet {
    words: FnvHashSet<String>,
}

impl WordSet {
    pub fn new<'w>(words: impl IntoIterator<Item = &'w str>, codec: &AlphabetCodec) -> Self {
        let words = words
            .into_iter()
            .map(|w| canonical(w, codec))
            .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Fraction of delimited tokens (length >= 3) found in the set; 0 when
    /// the text has no such token.
    pub fn overlap(&self, text: &str, codec: &AlphabetCodec) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        let mut tokens = 0usize;
        let mut hits = 0usize;
        let mut token = String::new();
        let mut flush = |token: &mut String| {
            if token.chars().count() >= MIN_TOKEN_LEN {
                tokens += 1;
                if self.words.contains(token.as_str()) {
                    hits += 1;
                }
            }
            token.clear();
        };
        for c in text.chars() {
            if is_separator(c) {
                flush(&mut token);
            } else {
                token.push(codec.position_of(c).map_or(c, |p| codec.symbol_at(p)));
            }
        }
        flush(&mut token);

        if tokens == 0 {
            0.0
        } else {
            hits as f64 / tokens as f64
        }
    }

    /// Share of `members` (canonical symbols, separators dropped) spelled by
    /// reference words found as substrings. Works on unsegmented text.
    pub fn coverage(&self, members: &str) -> f64 {
        let total = members.chars().count();
        if total == 0 {
            return 0.0;
        }
        let covered: usize = self
            .words
            .iter()
            .filter(|w| members.contains(w.as_str()))
            .map(|w| w.chars().count())
            .sum();
        (covered as f64 / total as f64).min(1.0)
    }
}

/// Maps every member character to its canonical symbol, dropping others.
pub fn canonical(text: &str, codec: &AlphabetCodec) -> String {
    text.chars()
        .filter_map(|c| codec.position_of(c).map(|p| codec.symbol_at(p)))
        .collect()
}
