use super::worker::{Envelope, WorkerMessage, WorkerTask};
use crate::error::CfResult;
use fnv::FnvHashMap;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, error};

/// Where worker tasks run.
///
/// `spawn` is fire-and-forget: all feedback arrives on `outbox`, FIFO per
/// worker. `terminate` asks a worker to stop; it need not be immediate.
pub trait ExecutionSubstrate {
    fn spawn(&mut self, worker: usize, task: WorkerTask, outbox: Sender<Envelope>);
    fn terminate(&mut self, worker: usize);

    fn terminate_all(&mut self);
}

/// Runs each worker as a task on a dedicated rayon pool.
pub struct RayonSubstrate {
    pool: rayon::ThreadPool,
    cancels: FnvHashMap<usize, Arc<AtomicBool>>,
}

impl RayonSubstrate {
    pub fn new(threads: usize) -> CfResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("cipherforge-worker-{}", i))
            .build()?;
        Ok(Self {
            pool,
            cancels: FnvHashMap::default(),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ExecutionSubstrate for RayonSubstrate {
    fn spawn(&mut self, worker: usize, task: WorkerTask, outbox: Sender<Envelope>) {
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancels.insert(worker, cancel.clone());

        self.pool.spawn(move || {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| task.run(worker, &cancel, &outbox)));
            let message = match outcome {
                Ok(Ok(())) => return,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            error!("❌ Worker {} failed: {}", worker, message);
            let _ = outbox.send(Envelope {
                worker,
                message: WorkerMessage::Error { message },
            });
        });
    }

    fn terminate(&mut self, worker: usize) {
        if let Some(flag) = self.cancels.remove(&worker) {
            flag.store(true, Ordering::Relaxed);
        }
    }

    fn terminate_all(&mut self) {
        debug!("Terminating {} workers", self.cancels.len());
        for (_, flag) in self.cancels.drain() {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for RayonSubstrate {
    fn drop(&mut self) {
        self.terminate_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
