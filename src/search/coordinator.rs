use super::aggregator::{ScoredCandidate, TopKSet};
use super::partition::partition;
use super::progress::SearchProgress;
use super::substrate::ExecutionSubstrate;
use super::worker::{Envelope, SearchContext, WorkerMessage, WorkerTask};
use crate::alphabet::AlphabetCodec;
use crate::cipher::{CasePolicy, CipherTransform};
use crate::config::{AdmissionPolicy, ScoringWeights};
use crate::error::{CfResult, CipherForgeError};
use crate::kasiski::{EstimateSource, KeyLengthEstimator};
use crate::keyspace::{KeySpace, LengthBound};
use crate::scorer::cache::MemoryPressure;
use crate::scorer::ngrams::QuadgramTable;
use crate::scorer::profiles::Language;
use crate::scorer::{ScorerParams, ScoringMethod};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum_macros::Display;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Receives progress snapshots while `run` waits on workers.
/// Returning `false` cancels the search.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, progress: &SearchProgress, best: Option<&ScoredCandidate>) -> bool;
}

/// Callback that never reports and never stops the search.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _: &SearchProgress, _: Option<&ScoredCandidate>) -> bool {
        true
    }
}

#[derive(Debug, Clone, TypedBuilder, Serialize)]
pub struct SearchRequest {
    #[builder(setter(into))]
    pub ciphertext: String,
    #[builder(setter(into))]
    pub alphabet: String,
    pub lengths: LengthBound,
    /// Known plaintext; whitespace is allowed, anything else must be in the
    /// alphabet.
    #[builder(default, setter(into))]
    pub fragment: String,
    #[builder(default, setter(strip_option, into))]
    pub key_chars: Option<String>,
    #[builder(default = 1)]
    pub workers: usize,
    #[builder(default = 5_000)]
    pub batch_size: usize,
    #[builder(default = 10)]
    pub top_k: usize,
    #[builder(default)]
    pub method: ScoringMethod,
    #[builder(default)]
    pub language: Language,
    #[builder(default)]
    pub case: CasePolicy,
    #[builder(default)]
    pub weights: ScoringWeights,
    #[builder(default)]
    pub admission: AdmissionPolicy,
    #[builder(default = false)]
    pub use_length_hint: bool,
    #[builder(default = false)]
    pub require_fragment: bool,
    #[builder(default = 4096)]
    pub cache_capacity: usize,
    #[serde(skip)]
    #[builder(default, setter(strip_option))]
    pub quadgrams: Option<QuadgramTable>,
    #[serde(skip)]
    #[builder(default, setter(strip_option))]
    pub words: Option<Vec<String>>,
}

impl SearchRequest {
    fn validate(&self, codec: &AlphabetCodec) -> CfResult<()> {
        let invalid = |msg: String| Err(CipherForgeError::InvalidParameters(msg));
        if self.workers == 0 {
            return invalid("worker count must be at least 1".into());
        }
        if self.batch_size == 0 {
            return invalid("batch size must be at least 1".into());
        }
        if self.top_k == 0 {
            return invalid("top-k must be at least 1".into());
        }
        if !self.ciphertext.chars().any(|c| codec.contains(c)) {
            return invalid("ciphertext contains no alphabet symbols".into());
        }
        if let Some(c) = self
            .fragment
            .chars()
            .find(|&c| !c.is_whitespace() && !codec.contains(c))
        {
            return invalid(format!(
                "known fragment symbol '{}' is not in the alphabet",
                c
            ));
        }
        if self.fragment.trim().is_empty() {
            if self.require_fragment {
                return invalid("fragment filter enabled without a fragment".into());
            }
            if self.method == ScoringMethod::Anchor {
                return invalid("anchor scoring needs a known fragment".into());
            }
        }
        self.weights.validate()?;
        self.admission.validate()
    }
}

/// Drives one search session at a time over an execution substrate.
///
/// All worker feedback goes through `handle`, one message at a time, which
/// makes this the single aggregation point for results and progress.
pub struct SearchCoordinator<S: ExecutionSubstrate> {
    substrate: S,
    state: SessionState,
    inbox: Option<Receiver<Envelope>>,
    results: TopKSet,
    keys_tested: u64,
    total_keys: u64,
    finished: Vec<bool>,
    started: Option<Instant>,
    stopped: Option<Duration>,
    failure: Option<(usize, String)>,
    length_hint: Option<(usize, EstimateSource)>,
    pressure: MemoryPressure,
    report_interval: Duration,
}

impl<S: ExecutionSubstrate> SearchCoordinator<S> {
    pub fn new(substrate: S) -> Self {
        Self {
            substrate,
            state: SessionState::Idle,
            inbox: None,
            results: TopKSet::new(0, AdmissionPolicy::default(), ScoringMethod::default().orientation()),
            keys_tested: 0,
            total_keys: 0,
            finished: Vec::new(),
            started: None,
            stopped: None,
            failure: None,
            length_hint: None,
            pressure: MemoryPressure::new(),
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn results(&self) -> &[ScoredCandidate] {
        self.results.entries()
    }

    pub fn best(&self) -> Option<&ScoredCandidate> {
        self.results.best()
    }

    pub fn length_hint(&self) -> Option<(usize, EstimateSource)> {
        self.length_hint
    }

    /// Signal handle shared with every worker's score cache.
    pub fn memory_pressure(&self) -> &MemoryPressure {
        &self.pressure
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// The session-level error once the state is `Failed`.
    pub fn error(&self) -> Option<CipherForgeError> {
        self.failure
            .as_ref()
            .map(|(worker, message)| CipherForgeError::WorkerFailure {
                worker: *worker,
                message: message.clone(),
            })
    }

    pub fn progress(&self) -> SearchProgress {
        let elapsed = match (self.stopped, self.started) {
            (Some(d), _) => d,
            (None, Some(t)) => t.elapsed(),
            (None, None) => Duration::ZERO,
        };
        let secs = elapsed.as_secs_f64();
        SearchProgress {
            keys_tested: self.keys_tested,
            total_keys: self.total_keys,
            elapsed,
            keys_per_second: if secs > 0.0 {
                self.keys_tested as f64 / secs
            } else {
                0.0
            },
            active_workers: if self.state == SessionState::Running {
                self.finished.iter().filter(|&&done| !done).count()
            } else {
                0
            },
        }
    }

    /// Validates the request, partitions the key space and dispatches one
    /// task per worker. Nothing is dispatched if validation fails.
    pub fn start(&mut self, request: SearchRequest) -> CfResult<()> {
        if self.state == SessionState::Running {
            return Err(CipherForgeError::InvalidState(
                "a search is already running".into(),
            ));
        }

        let codec = AlphabetCodec::build(&request.alphabet)?;
        request.validate(&codec)?;

        let key_symbols = match &request.key_chars {
            Some(chars) => codec.subset(chars)?,
            None => (0..codec.len()).collect(),
        };
        let keyspace = KeySpace::new(key_symbols.len(), request.lengths.max)?;
        let mut range = keyspace.range_for(request.lengths)?;

        let mut params = ScorerParams::builder()
            .codec(codec.clone())
            .method(request.method)
            .language(request.language)
            .weights(request.weights.clone())
            .fragment(request.fragment.clone())
            .build();
        params.quadgrams = request.quadgrams.clone();
        params.words = request.words.clone();
        let scorer = params.build_scorer()?;

        self.length_hint = None;
        if request.use_length_hint {
            let estimator = KeyLengthEstimator::new(&codec, scorer.target_ic());
            match estimator.suggest(&request.ciphertext, request.lengths.max) {
                Some((len, source)) if request.lengths.contains(len) => {
                    info!("🔎 Key length hint {} ({:?}), narrowing search", len, source);
                    range = keyspace.range_for(LengthBound::exactly(len)?)?;
                    self.length_hint = Some((len, source));
                }
                Some((len, _)) => {
                    info!("🔎 Key length hint {} lies outside {}, ignoring", len, request.lengths);
                }
                None => info!("🔎 No key length estimate, searching every length"),
            }
        }

        let transform = CipherTransform::new(codec, request.case);
        let ciphertext = transform.prepare(&request.ciphertext);
        let ranges = partition(range.clone(), request.workers)?;

        let context = Arc::new(SearchContext {
            transform,
            ciphertext,
            scorer,
            keyspace,
            key_symbols,
            require_fragment: request.require_fragment,
            sample_length: request.weights.sample_length,
            top_k: request.top_k,
            admission: request.admission,
            cache_capacity: request.cache_capacity,
            pressure: self.pressure.clone(),
        });

        self.results = TopKSet::new(
            request.top_k,
            request.admission,
            request.method.orientation(),
        );
        self.keys_tested = 0;
        self.total_keys = range.end - range.start;
        self.finished = vec![false; ranges.len()];
        self.failure = None;
        self.stopped = None;
        self.started = Some(Instant::now());
        self.state = SessionState::Running;

        info!(
            "🚀 Searching {} keys (lengths {}) with {} workers, method {}",
            self.total_keys, request.lengths, request.workers, request.method
        );

        let (tx, rx) = mpsc::channel();
        self.inbox = Some(rx);
        for (worker, sub) in ranges.into_iter().enumerate() {
            debug!("Dispatching worker {}: {}..{}", worker, sub.start, sub.end);
            let task = WorkerTask {
                context: context.clone(),
                range: sub,
                batch_size: request.batch_size as u64,
            };
            self.substrate.spawn(worker, task, tx.clone());
        }
        Ok(())
    }

    /// Applies one worker message. Messages arriving outside `Running`
    /// are dropped.
    pub fn handle(&mut self, envelope: Envelope) {
        if self.state != SessionState::Running {
            debug!(
                "Dropping message from worker {} in state {}",
                envelope.worker, self.state
            );
            return;
        }
        let worker = envelope.worker;
        if worker >= self.finished.len() {
            warn!("⚠️  Message from unknown worker {}", worker);
            return;
        }

        match envelope.message {
            WorkerMessage::Progress { keys_tested } => {
                let next = self.keys_tested.saturating_add(keys_tested);
                if next > self.total_keys {
                    warn!(
                        "⚠️  Worker {} over-reported progress ({} > {})",
                        worker, next, self.total_keys
                    );
                }
                self.keys_tested = next.min(self.total_keys);
            }
            WorkerMessage::Results { candidates } => {
                self.results.merge(candidates);
            }
            WorkerMessage::Done => {
                self.finished[worker] = true;
                if self.finished.iter().all(|&done| done) {
                    self.finish(SessionState::Completed);
                    info!(
                        "✅ Search complete: {} keys tested, {} candidates",
                        self.keys_tested,
                        self.results.len()
                    );
                }
            }
            WorkerMessage::Error { message } => {
                error!("❌ Worker {} failed: {}", worker, message);
                self.failure = Some((worker, message));
                self.finish(SessionState::Failed);
            }
        }
    }

    /// Drains every message already queued. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let next = match &self.inbox {
                Some(rx) => rx.try_recv(),
                None => break,
            };
            match next {
                Ok(envelope) => {
                    self.handle(envelope);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.on_disconnect();
                    break;
                }
            }
        }
        applied
    }

    /// Waits up to `timeout` for a message, then drains the rest.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        let next = match &self.inbox {
            Some(rx) => rx.recv_timeout(timeout),
            None => return 0,
        };
        match next {
            Ok(envelope) => {
                self.handle(envelope);
                1 + self.poll()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                self.on_disconnect();
                0
            }
        }
    }

    /// Pumps messages until the session leaves `Running`, reporting
    /// progress every interval.
    pub fn run<CB: ProgressCallback>(&mut self, callback: &CB) -> CfResult<SessionState> {
        let mut last_report = Instant::now();
        while self.state == SessionState::Running {
            self.wait(self.report_interval);
            if self.state == SessionState::Running && last_report.elapsed() >= self.report_interval {
                if !callback.on_progress(&self.progress(), self.best()) {
                    info!("🛑 Search stopped by progress callback");
                    self.cancel();
                }
                last_report = Instant::now();
            }
        }
        callback.on_progress(&self.progress(), self.best());

        match self.error() {
            Some(e) if self.state == SessionState::Failed => Err(e),
            _ => Ok(self.state),
        }
    }

    /// Stops every worker. No message is applied afterwards.
    pub fn cancel(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        info!("🛑 Cancelling search after {} keys", self.keys_tested);
        self.finish(SessionState::Cancelled);
    }

    fn finish(&mut self, state: SessionState) {
        self.state = state;
        self.stopped = self.started.map(|t| t.elapsed());
        if state != SessionState::Completed {
            self.substrate.terminate_all();
        }
        self.inbox = None;
        debug!(
            "Session {}: {} caches cleared under memory pressure",
            state,
            self.pressure.caches_cleared()
        );
    }

    fn on_disconnect(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        let worker = self.finished.iter().position(|&done| !done).unwrap_or(0);
        self.failure = Some((worker, "worker exited without reporting completion".into()));
        error!("❌ Worker {} disconnected before completion", worker);
        self.finish(SessionState::Failed);
    }
}
