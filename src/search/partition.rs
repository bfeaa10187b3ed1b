use crate::error::{CfResult, CipherForgeError};
use std::ops::Range;

/// Splits `range` into `workers` contiguous, non-overlapping pieces whose
/// union is exactly `range`. Each piece holds `len / workers` indices and
/// the last absorbs the remainder, so pieces may be empty when there are
/// fewer indices than workers.
pub fn partition(range: Range<u64>, workers: usize) -> CfResult<Vec<Range<u64>>> {
    if workers == 0 {
        return Err(CipherForgeError::InvalidParameters(
            "worker count must be at least 1".into(),
        ));
    }
    let len = range.end.saturating_sub(range.start);
    let share = len / workers as u64;

    let mut out = Vec::with_capacity(workers);
    let mut start = range.start;
    for i in 0..workers {
        let end = if i + 1 == workers {
            range.end.max(start)
        } else {
            start + share
        };
        out.push(start..end);
        start = end;
    }
    Ok(out)
}

/// Consecutive chunks of at most `batch_size` indices covering `range`.
pub fn batches(range: Range<u64>, batch_size: u64) -> impl Iterator<Item = Range<u64>> {
    let step = batch_size.max(1);
    let end = range.end;
    (range.start..end)
        .step_by(step as usize)
        .map(move |s| s..s.saturating_add(step).min(end))
}
