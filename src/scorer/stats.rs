//! Classical frequency statistics over symbol counts.

/// `Σ f(f-1) / n(n-1)`; undefined below two symbols.
pub fn index_of_coincidence(counts: &[usize], n: usize) -> Option<f64> {
    if n < 2 {
        return None;
    }
    let sum: u64 = counts
        .iter()
        .map(|&f| (f as u64) * (f as u64).saturating_sub(1))
        .sum();
    Some(sum as f64 / (n as f64 * (n - 1) as f64))
}

/// Chi-squared deviation from `expected` (probabilities per position).
///
/// Only positions with a non-zero expectation participate, and `n` counts
/// only those positions. Lower is better.
pub fn chi_squared(counts: &[usize], expected: &[f64]) -> Option<f64> {
    let n: usize = counts
        .iter()
        .zip(expected)
        .filter(|&(_, &e)| e > 0.0)
        .map(|(&c, _)| c)
        .sum();
    if n == 0 {
        return None;
    }
    let n = n as f64;
    let chi = counts
        .iter()
        .zip(expected)
        .filter(|&(_, &e)| e > 0.0)
        .map(|(&observed, &p)| {
            let e = p * n;
            let d = observed as f64 - e;
            d * d / e
        })
        .sum();
    Some(chi)
}

/// Shannon entropy in bits.
pub fn entropy(counts: &[usize], n: usize) -> Option<f64> {
    if n == 0 {
        return None;
    }
    let n = n as f64;
    Some(
        counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / n;
                -p * p.log2()
            })
            .sum(),
    )
}

/// Entropy of a probability vector, in bits.
pub fn distribution_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}
