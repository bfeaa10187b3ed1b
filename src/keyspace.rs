use crate::error::{CfResult, CipherForgeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Hard ceiling on key length; any radix >= 2 overflows u64 long before this.
pub const MAX_KEY_LENGTH: usize = 64;

/// Inclusive range of key lengths to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBound {
    pub min: usize,
    pub max: usize,
}

impl LengthBound {
    pub fn new(min: usize, max: usize) -> CfResult<Self> {
        if min == 0 || max == 0 {
            return Err(CipherForgeError::InvalidParameters(
                "key length must be at least 1".into(),
            ));
        }
        if min > max {
            return Err(CipherForgeError::InvalidParameters(format!(
                "key length range {}-{} is inverted",
                min, max
            )));
        }
        if max > MAX_KEY_LENGTH {
            return Err(CipherForgeError::InvalidParameters(format!(
                "key length {} exceeds the maximum of {}",
                max, MAX_KEY_LENGTH
            )));
        }
        Ok(Self { min, max })
    }

    /// Every length from 1 through `max`.
    pub fn up_to(max: usize) -> CfResult<Self> {
        Self::new(1, max)
    }

    pub fn exactly(len: usize) -> CfResult<Self> {
        Self::new(len, len)
    }

    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

impl FromStr for LengthBound {
    type Err = CipherForgeError;

    /// Accepts `"N"` (lengths 1..=N) or `"A-B"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |p: &str| {
            p.trim().parse::<usize>().map_err(|_| {
                CipherForgeError::InvalidParameters(format!(
                    "key length must be a number or range (e.g. \"5\" or \"5-10\"), got '{}'",
                    s
                ))
            })
        };
        match s.split_once('-') {
            Some((a, b)) => Self::new(parse(a)?, parse(b)?),
            None => Self::up_to(parse(s)?),
        }
    }
}

impl fmt::Display for LengthBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// `Σ_{len=1..max_length} alphabet_size^len`, refusing to wrap.
pub fn total_keys(alphabet_size: usize, max_length: usize) -> CfResult<u64> {
    Ok(KeySpace::new(alphabet_size, max_length)?.total())
}

/// Closed-form bijection between `[0, total)` and every key of length
/// `1..=max_length` over `radix` symbols.
///
/// Indices are ordered by length, then by the key read as a base-`radix`
/// numeral with the most significant digit first. Keys are returned as digit
/// vectors; mapping digits to alphabet positions is the caller's business.
#[derive(Debug, Clone)]
pub struct KeySpace {
    radix: usize,
    max_length: usize,
    // powers[l] = radix^l, l in 0..=max_length
    powers: Vec<u64>,
    // offsets[l] = first index of length l, l in 1..=max_length + 1
    offsets: Vec<u64>,
}

impl KeySpace {
    pub fn new(radix: usize, max_length: usize) -> CfResult<Self> {
        if radix < 2 {
            return Err(CipherForgeError::InvalidAlphabet(format!(
                "key space needs at least 2 symbols, got {}",
                radix
            )));
        }
        if max_length == 0 || max_length > MAX_KEY_LENGTH {
            return Err(CipherForgeError::InvalidParameters(format!(
                "maximum key length must be in 1..={}, got {}",
                MAX_KEY_LENGTH, max_length
            )));
        }

        let too_large = || CipherForgeError::KeySpaceTooLarge {
            alphabet_size: radix,
            max_length,
        };

        let mut powers = Vec::with_capacity(max_length + 1);
        powers.push(1u64);
        for l in 1..=max_length {
            let p = powers[l - 1]
                .checked_mul(radix as u64)
                .ok_or_else(too_large)?;
            powers.push(p);
        }

        let mut offsets = vec![0u64; max_length + 2];
        for l in 1..=max_length {
            offsets[l + 1] = offsets[l].checked_add(powers[l]).ok_or_else(too_large)?;
        }

        Ok(Self {
            radix,
            max_length,
            powers,
            offsets,
        })
    }

    pub fn radix(&self) -> usize {
        self.radix
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn total(&self) -> u64 {
        self.offsets[self.max_length + 1]
    }

    /// Number of keys of exactly `len` symbols.
    pub fn keys_of_length(&self, len: usize) -> u64 {
        self.powers[len]
    }

    /// Global index range holding every key whose length is within `bound`.
    pub fn range_for(&self, bound: LengthBound) -> CfResult<Range<u64>> {
        if bound.max > self.max_length {
            return Err(CipherForgeError::InvalidParameters(format!(
                "length bound {} exceeds key space maximum {}",
                bound, self.max_length
            )));
        }
        Ok(self.offsets[bound.min]..self.offsets[bound.max + 1])
    }

    pub fn length_of(&self, index: u64) -> CfResult<usize> {
        self.check(index)?;
        let mut rem = index;
        for len in 1..=self.max_length {
            if rem < self.powers[len] {
                return Ok(len);
            }
            rem -= self.powers[len];
        }
        Err(self.out_of_range(index))
    }

    pub fn key_at(&self, index: u64) -> CfResult<Vec<usize>> {
        let mut digits = Vec::new();
        self.key_at_into(index, &mut digits)?;
        Ok(digits)
    }

    /// Decodes `index` into `digits`, reusing the buffer.
    pub fn key_at_into(&self, index: u64, digits: &mut Vec<usize>) -> CfResult<()> {
        self.check(index)?;
        let mut rem = index;
        let mut len = 1;
        while rem >= self.powers[len] {
            rem -= self.powers[len];
            len += 1;
        }

        digits.clear();
        digits.resize(len, 0);
        let radix = self.radix as u64;
        for slot in digits.iter_mut().rev() {
            *slot = (rem % radix) as usize;
            rem /= radix;
        }
        Ok(())
    }

    pub fn index_of(&self, digits: &[usize]) -> CfResult<u64> {
        let len = digits.len();
        if len == 0 || len > self.max_length {
            return Err(CipherForgeError::InvalidParameters(format!(
                "key length {} outside 1..={}",
                len, self.max_length
            )));
        }
        let mut value = 0u64;
        for &d in digits {
            if d >= self.radix {
                return Err(CipherForgeError::InvalidParameters(format!(
                    "digit {} outside radix {}",
                    d, self.radix
                )));
            }
            // Cannot overflow: value < radix^len <= total.
            value = value * self.radix as u64 + d as u64;
        }
        Ok(self.offsets[len] + value)
    }

    /// Sequential walk over `range` without re-decoding each index.
    pub fn cursor(&self, range: Range<u64>) -> CfResult<KeyCursor> {
        if range.end > self.total() || range.start > range.end {
            return Err(CipherForgeError::IndexOutOfRange {
                index: range.end,
                total: self.total(),
            });
        }
        let mut digits = Vec::with_capacity(self.max_length);
        if range.start < range.end {
            self.key_at_into(range.start, &mut digits)?;
        }
        Ok(KeyCursor {
            radix: self.radix,
            digits,
            next_index: range.start,
            end: range.end,
            primed: false,
        })
    }

    fn check(&self, index: u64) -> CfResult<()> {
        if index >= self.total() {
            Err(self.out_of_range(index))
        } else {
            Ok(())
        }
    }

    fn out_of_range(&self, index: u64) -> CipherForgeError {
        CipherForgeError::IndexOutOfRange {
            index,
            total: self.total(),
        }
    }
}

/// Odometer over a contiguous index range.
///
/// Not an `Iterator` because each key is lent out of an internal buffer.
#[derive(Debug, Clone)]
pub struct KeyCursor {
    radix: usize,
    digits: Vec<usize>,
    next_index: u64,
    end: u64,
    primed: bool,
}

impl KeyCursor {
    /// Index of the key the next call to `next_key` will yield.
    pub fn position(&self) -> u64 {
        self.next_index
    }

    pub fn remaining(&self) -> u64 {
        self.end - self.next_index
    }

    pub fn next_key(&mut self) -> Option<&[usize]> {
        if self.next_index >= self.end {
            return None;
        }
        if self.primed {
            self.increment();
        }
        self.primed = true;
        self.next_index += 1;
        Some(&self.digits)
    }

    fn increment(&mut self) {
        for d in self.digits.iter_mut().rev() {
            *d += 1;
            if *d < self.radix {
                return;
            }
            *d = 0;
        }
        // Every digit wrapped: roll over to the first key of the next length.
        let len = self.digits.len() + 1;
        self.digits.clear();
        self.digits.resize(len, 0);
    }
}
