/// Multiplier for a fragment found only after case folding.
pub const CASE_MISMATCH_FACTOR: f64 = 0.75;

/// Share of the bonus lost when the fragment sits at the very end.
pub const LATE_MATCH_DECAY: f64 = 0.5;

/// Known-plaintext anchoring.
///
/// Returns a bonus in `[0, 1]`: full for an exact, case-matching hit at the
/// start of the text, decaying with position and reduced for case-folded
/// hits. A missing fragment yields 0, never a disqualification.
pub fn fragment_bonus(text: &str, fragment: &str) -> f64 {
    if fragment.is_empty() || text.is_empty() {
        return 0.0;
    }
    let len = text.chars().count() as f64;

    if let Some(byte_at) = text.find(fragment) {
        let at = text[..byte_at].chars().count() as f64;
        return 1.0 - LATE_MATCH_DECAY * at / len;
    }

    let upper_text = text.to_uppercase();
    let upper_frag = fragment.to_uppercase();
    match upper_text.find(&upper_frag) {
        Some(byte_at) => {
            let at = upper_text[..byte_at].chars().count() as f64;
            CASE_MISMATCH_FACTOR * (1.0 - LATE_MATCH_DECAY * at / len)
        }
        None => 0.0,
    }
}

/// Case-insensitive containment, used by the fragment-required filter.
pub fn contains_fragment(text: &str, fragment: &str) -> bool {
    fragment.is_empty() || text.to_uppercase().contains(&fragment.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_exact_hit_beats_late_hit() {
        let early = fragment_bonus("ATTACKATDAWN", "ATTACK");
        let late = fragment_bonus("XXXXXXATTACK", "ATTACK");
        assert!((early - 1.0).abs() < 1e-12);
        assert!(late < early);
    }

    #[test]
    fn test_case_folded_hit_is_discounted() {
        let exact = fragment_bonus("attack at dawn", "attack");
        let folded = fragment_bonus("attack at dawn", "ATTACK");
        assert!((folded - CASE_MISMATCH_FACTOR * exact).abs() < 1e-12);
        assert_eq!(fragment_bonus("retreat", "attack"), 0.0);
    }
}
