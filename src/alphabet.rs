use crate::error::{CfResult, CipherForgeError};
use fnv::FnvHashMap;

pub const MIN_ALPHABET_SIZE: usize = 2;

/// Dense symbol <-> position mapping for one alphabet.
///
/// Lookups are exact first; if the exact character is not a member the
/// opposite-case variant is tried, so an upper-case alphabet also accepts
/// lower-case text. Folding is disabled for alphabets mixing upper- and
/// lower-case symbols: a folded character could then encrypt onto an exact
/// member and lose its case on the way back. Rebuilding means constructing a
/// new codec, which is why nothing in the crate caches positions outside of one.
#[derive(Debug, Clone)]
pub struct AlphabetCodec {
    symbols: Vec<char>,
    positions: FnvHashMap<char, usize>,
    fold_case: bool,
}

impl AlphabetCodec {
    pub fn build(alphabet: &str) -> CfResult<Self> {
        let symbols: Vec<char> = alphabet.chars().collect();
        if symbols.len() < MIN_ALPHABET_SIZE {
            return Err(CipherForgeError::InvalidAlphabet(format!(
                "alphabet needs at least {} symbols, got {}",
                MIN_ALPHABET_SIZE,
                symbols.len()
            )));
        }

        let mut positions = FnvHashMap::default();
        for (i, &c) in symbols.iter().enumerate() {
            if positions.insert(c, i).is_some() {
                return Err(CipherForgeError::InvalidAlphabet(format!(
                    "duplicate symbol '{}'",
                    c
                )));
            }
        }

        let fold_case = !(symbols.iter().any(|c| c.is_uppercase())
            && symbols.iter().any(|c| c.is_lowercase()));

        Ok(Self {
            symbols,
            positions,
            fold_case,
        })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a built codec; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn position_exact(&self, c: char) -> Option<usize> {
        self.positions.get(&c).copied()
    }

    /// Dense index of `c`, or `None` for characters that pass through untouched.
    #[inline]
    pub fn position_of(&self, c: char) -> Option<usize> {
        if let Some(p) = self.position_exact(c) {
            return Some(p);
        }
        if !self.fold_case {
            return None;
        }
        if let Some(up) = single_char(c.to_uppercase()) {
            if up != c {
                if let Some(p) = self.position_exact(up) {
                    return Some(p);
                }
            }
        }
        if let Some(low) = single_char(c.to_lowercase()) {
            if low != c {
                return self.position_exact(low);
            }
        }
        None
    }

    /// Whether lookups fall back to the opposite case.
    pub fn folds_case(&self) -> bool {
        self.fold_case
    }

    pub fn contains(&self, c: char) -> bool {
        self.position_of(c).is_some()
    }

    /// Inverse of `position_of` over `[0, len)`.
    #[inline]
    pub fn symbol_at(&self, pos: usize) -> char {
        self.symbols[pos]
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn as_string(&self) -> String {
        self.symbols.iter().collect()
    }

    /// Positions of every member character of `text`, skipping non-members.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        text.chars().filter_map(|c| self.position_of(c)).collect()
    }

    pub fn decode(&self, positions: &[usize]) -> String {
        positions.iter().map(|&p| self.symbol_at(p)).collect()
    }

    /// Resolves a restricted key alphabet into positions of this alphabet.
    pub fn subset(&self, chars: &str) -> CfResult<Vec<usize>> {
        let mut out: Vec<usize> = Vec::new();
        for c in chars.chars() {
            let p = self.position_of(c).ok_or_else(|| {
                CipherForgeError::InvalidParameters(format!(
                    "key symbol '{}' is not in the alphabet",
                    c
                ))
            })?;
            if out.contains(&p) {
                return Err(CipherForgeError::InvalidParameters(format!(
                    "duplicate key symbol '{}'",
                    c
                )));
            }
            out.push(p);
        }
        if out.len() < MIN_ALPHABET_SIZE {
            return Err(CipherForgeError::InvalidParameters(format!(
                "key alphabet needs at least {} symbols",
                MIN_ALPHABET_SIZE
            )));
        }
        Ok(out)
    }
}

fn single_char(mut it: impl Iterator<Item = char>) -> Option<char> {
    let first = it.next()?;
    if it.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_fold_lookup() {
        let codec = AlphabetCodec::build("ABC").unwrap();
        assert_eq!(codec.position_of('b'), Some(1));
        assert_eq!(codec.position_exact('b'), None);
        assert_eq!(codec.position_of('-'), None);
    }

    #[test]
    fn test_mixed_case_alphabet_is_exact_only() {
        let codec = AlphabetCodec::build("Ab").unwrap();
        assert!(!codec.folds_case());
        assert_eq!(codec.position_of('a'), None);
        assert_eq!(codec.position_of('b'), Some(1));
        assert!(AlphabetCodec::build("0123456789abcdef").unwrap().folds_case());
    }

    #[test]
    fn test_single_char_rejects_expansions() {
        assert_eq!(single_char('ß'.to_uppercase()), None);
        assert_eq!(single_char('a'.to_uppercase()), Some('A'));
    }
}
