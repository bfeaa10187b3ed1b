use crate::config::AdmissionPolicy;
use crate::scorer::Orientation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub key: String,
    pub score: f64,
    /// Bounded prefix of the decrypted text.
    pub sample: String,
}

/// Bounded, best-first set of candidates, deduplicated by key.
///
/// Ranking uses the oriented score, so for chi-squared the smallest raw
/// value sorts first. Every member satisfies the admission floor
/// `max(min_score, best * ratio)`, recomputed whenever the best changes.
/// Equal scores are ordered by key, so given the same candidate set the
/// final contents do not depend on the order of `offer` calls.
#[derive(Debug, Clone)]
pub struct TopKSet {
    capacity: usize,
    policy: AdmissionPolicy,
    orientation: Orientation,
    entries: Vec<ScoredCandidate>,
}

impl TopKSet {
    pub fn new(capacity: usize, policy: AdmissionPolicy, orientation: Orientation) -> Self {
        Self {
            capacity,
            policy,
            orientation,
            entries: Vec::with_capacity(capacity.min(1024)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[ScoredCandidate] {
        &self.entries
    }

    pub fn best(&self) -> Option<&ScoredCandidate> {
        self.entries.first()
    }

    pub fn into_vec(self) -> Vec<ScoredCandidate> {
        self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current floor on the oriented scale, if any.
    ///
    /// `min_score` is a raw score: a lower bound for higher-is-better
    /// methods and an upper bound for chi-squared.
    pub fn admission_floor(&self) -> Option<f64> {
        let absolute = self.policy.min_score.map(|m| self.orientation.orient(m));
        let relative = self
            .best()
            .map(|b| self.orientation.orient(b.score))
            .filter(|&best| best > 0.0 && self.policy.admission_ratio > 0.0)
            .map(|best| best * self.policy.admission_ratio);
        match (absolute, relative) {
            (Some(a), Some(r)) => Some(a.max(r)),
            (a, r) => a.or(r),
        }
    }

    /// Cheap pre-check so callers can skip building a candidate that
    /// `offer` would reject on score alone. A score equal to the worst
    /// entry passes, since the key decides the tie.
    #[inline]
    pub fn would_admit(&self, score: f64) -> bool {
        let value = self.orientation.orient(score);
        if !value.is_finite() || self.capacity == 0 {
            return false;
        }
        if self.admission_floor().is_some_and(|floor| value < floor) {
            return false;
        }
        match self.entries.last() {
            Some(worst) if self.entries.len() >= self.capacity => {
                value >= self.orientation.orient(worst.score)
            }
            _ => true,
        }
    }

    /// Inserts `candidate` if it ranks; returns whether it was retained.
    ///
    /// A second offer for a key already present replaces the stored entry
    /// only when it scores better.
    pub fn offer(&mut self, candidate: ScoredCandidate) -> bool {
        let value = self.orientation.orient(candidate.score);
        if !value.is_finite() || self.capacity == 0 {
            return false;
        }
        if self.admission_floor().is_some_and(|floor| value < floor) {
            return false;
        }

        if let Some(i) = self.entries.iter().position(|e| e.key == candidate.key) {
            if value <= self.orientation.orient(self.entries[i].score) {
                return false;
            }
            self.entries.remove(i);
        }

        let orientation = self.orientation;
        let at = self.entries.partition_point(|e| {
            let v = orientation.orient(e.score);
            v > value || (v == value && e.key < candidate.key)
        });
        if at >= self.capacity {
            return false;
        }
        self.entries.insert(at, candidate);
        self.entries.truncate(self.capacity);
        self.prune();
        true
    }

    pub fn merge<I: IntoIterator<Item = ScoredCandidate>>(&mut self, candidates: I) -> usize {
        candidates
            .into_iter()
            .map(|c| self.offer(c))
            .filter(|&kept| kept)
            .count()
    }

    // The floor only moves when the best does; the best itself never falls
    // below it since ratio <= 1.
    fn prune(&mut self) {
        if let Some(floor) = self.admission_floor() {
            let orientation = self.orientation;
            self.entries.retain(|e| orientation.orient(e.score) >= floor);
        }
    }
}
