use crate::alphabet::AlphabetCodec;
use crate::error::{CfResult, CipherForgeError};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How alphabet members matched through case folding are written back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CasePolicy {
    /// Output takes the case of the input character.
    #[default]
    Preserve,
    /// Output is always the canonical alphabet symbol.
    Normalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
enum Glyph {
    Symbol { pos: usize, case: Case },
    Passthrough(char),
}

/// Ciphertext resolved against a codec once, so per-key transforms skip the
/// symbol lookups entirely.
#[derive(Debug, Clone)]
pub struct PreparedText {
    glyphs: Vec<Glyph>,
    symbol_count: usize,
}

impl PreparedText {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Number of alphabet members (characters that consume a key symbol).
    pub fn symbol_count(&self) -> usize {
        self.symbol_count
    }
}

#[derive(Debug, Clone)]
pub struct CipherTransform {
    codec: AlphabetCodec,
    case: CasePolicy,
}

impl CipherTransform {
    pub fn new(codec: AlphabetCodec, case: CasePolicy) -> Self {
        Self { codec, case }
    }

    pub fn codec(&self) -> &AlphabetCodec {
        &self.codec
    }

    pub fn case_policy(&self) -> CasePolicy {
        self.case
    }

    pub fn prepare(&self, text: &str) -> PreparedText {
        let mut symbol_count = 0;
        let glyphs = text
            .chars()
            .map(|c| {
                if let Some(pos) = self.codec.position_exact(c) {
                    symbol_count += 1;
                    Glyph::Symbol {
                        pos,
                        case: Case::Exact,
                    }
                } else if let Some(pos) = self.codec.position_of(c) {
                    symbol_count += 1;
                    let case = if c.is_lowercase() {
                        Case::Lower
                    } else {
                        Case::Upper
                    };
                    Glyph::Symbol { pos, case }
                } else {
                    Glyph::Passthrough(c)
                }
            })
            .collect();
        PreparedText {
            glyphs,
            symbol_count,
        }
    }

    /// Resolves a textual key into alphabet positions.
    pub fn key_positions(&self, key: &str) -> CfResult<Vec<usize>> {
        if key.is_empty() {
            return Err(CipherForgeError::InvalidParameters(
                "key must not be empty".into(),
            ));
        }
        key.chars()
            .map(|c| {
                self.codec.position_of(c).ok_or_else(|| {
                    CipherForgeError::InvalidParameters(format!(
                        "key symbol '{}' is not in the alphabet",
                        c
                    ))
                })
            })
            .collect()
    }

    pub fn key_string(&self, key: &[usize]) -> String {
        self.codec.decode(key)
    }

    pub fn encrypt(&self, text: &str, key: &str) -> CfResult<String> {
        let key = self.key_positions(key)?;
        let mut out = String::with_capacity(text.len());
        self.apply(&self.prepare(text), &key, Direction::Encrypt, &mut out);
        Ok(out)
    }

    pub fn decrypt(&self, text: &str, key: &str) -> CfResult<String> {
        let key = self.key_positions(key)?;
        let mut out = String::with_capacity(text.len());
        self.apply(&self.prepare(text), &key, Direction::Decrypt, &mut out);
        Ok(out)
    }

    /// Hot path used by search workers: `out` is cleared and reused.
    #[inline]
    pub fn decrypt_into(&self, text: &PreparedText, key: &[usize], out: &mut String) {
        out.clear();
        self.apply(text, key, Direction::Decrypt, out);
    }

    pub fn apply(&self, text: &PreparedText, key: &[usize], dir: Direction, out: &mut String) {
        let size = self.codec.len();
        let mut cursor = 0;
        for glyph in &text.glyphs {
            match *glyph {
                Glyph::Passthrough(c) => out.push(c),
                Glyph::Symbol { pos, case } => {
                    if key.is_empty() {
                        out.push(self.codec.symbol_at(pos));
                        continue;
                    }
                    let k = key[cursor % key.len()];
                    cursor += 1;
                    let shifted = match dir {
                        Direction::Encrypt => (pos + k) % size,
                        Direction::Decrypt => (pos + size - k) % size,
                    };
                    let symbol = self.codec.symbol_at(shifted);
                    match (self.case, case) {
                        (CasePolicy::Preserve, Case::Lower) => out.extend(symbol.to_lowercase()),
                        (CasePolicy::Preserve, Case::Upper) => out.extend(symbol.to_uppercase()),
                        _ => out.push(symbol),
                    }
                }
            }
        }
    }
}
