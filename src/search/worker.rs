use super::aggregator::{ScoredCandidate, TopKSet};
use super::partition::batches;
use crate::cipher::{CipherTransform, PreparedText};
use crate::config::AdmissionPolicy;
use crate::error::CfResult;
use crate::keyspace::KeySpace;
use crate::scorer::anchor;
use crate::scorer::cache::{MemoryPressure, ScoreCache};
use crate::scorer::Scorer;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    /// Keys tested since the previous progress message.
    Progress { keys_tested: u64 },
    Results { candidates: Vec<ScoredCandidate> },
    Done,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub worker: usize,
    pub message: WorkerMessage,
}

/// Everything a worker reads, built once per session and shared.
#[derive(Debug)]
pub struct SearchContext {
    pub transform: CipherTransform,
    pub ciphertext: PreparedText,
    pub scorer: Scorer,
    pub keyspace: KeySpace,
    /// Alphabet position for each key digit.
    pub key_symbols: Vec<usize>,
    pub require_fragment: bool,
    /// 0 keeps the whole plaintext.
    pub sample_length: usize,
    pub top_k: usize,
    pub admission: AdmissionPolicy,
    pub cache_capacity: usize,
    pub pressure: MemoryPressure,
}

/// One worker's slice of the key space.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    pub context: Arc<SearchContext>,
    pub range: Range<u64>,
    pub batch_size: u64,
}

impl WorkerTask {
    /// Walks the range batch by batch. Cancellation and memory pressure
    /// are only looked at between batches.
    ///
    /// Returns early without `Done` when cancelled or when the receiving
    /// side has hung up.
    pub fn run(&self, worker: usize, cancel: &AtomicBool, outbox: &Sender<Envelope>) -> CfResult<()> {
        let ctx = &*self.context;
        let send = |message| outbox.send(Envelope { worker, message }).is_ok();

        let mut cursor = ctx.keyspace.cursor(self.range.clone())?;
        let mut cache = ScoreCache::new(ctx.cache_capacity);
        let mut scratch = ctx.scorer.scratch();
        let mut key = Vec::with_capacity(ctx.keyspace.max_length());
        let mut plain = String::with_capacity(ctx.ciphertext.len() * 2);

        debug!(
            "Worker {} covering {}..{}",
            worker, self.range.start, self.range.end
        );

        for batch in batches(self.range.clone(), self.batch_size) {
            if cancel.load(Ordering::Relaxed) {
                debug!("Worker {} cancelled at index {}", worker, cursor.position());
                return Ok(());
            }
            cache.observe(&ctx.pressure);

            let mut local = TopKSet::new(ctx.top_k, ctx.admission, ctx.scorer.orientation());
            let mut tested = 0u64;
            for _ in batch {
                let Some(digits) = cursor.next_key() else {
                    break;
                };
                key.clear();
                key.extend(digits.iter().map(|&d| ctx.key_symbols[d]));
                tested += 1;

                ctx.transform.decrypt_into(&ctx.ciphertext, &key, &mut plain);
                if ctx.require_fragment && !anchor::contains_fragment(&plain, ctx.scorer.fragment())
                {
                    continue;
                }

                let score = match cache.get(&plain) {
                    Some(cached) => cached,
                    None => {
                        let s = ctx.scorer.score_with(&plain, &mut scratch);
                        cache.insert(&plain, s);
                        s
                    }
                };
                let Some(score) = score else {
                    continue;
                };
                if !local.would_admit(score) {
                    continue;
                }
                local.offer(ScoredCandidate {
                    key: ctx.transform.key_string(&key),
                    score,
                    sample: sample(&plain, ctx.sample_length),
                });
            }

            if !local.is_empty() && !send(WorkerMessage::Results {
                candidates: local.into_vec(),
            }) {
                return Ok(());
            }
            if !send(WorkerMessage::Progress {
                keys_tested: tested,
            }) {
                return Ok(());
            }
        }

        debug!(
            "Worker {} done ({} cache hits, {} clears)",
            worker,
            cache.hits(),
            cache.clears()
        );
        send(WorkerMessage::Done);
        Ok(())
    }
}

fn sample(text: &str, limit: usize) -> String {
    if limit == 0 {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}
