//! Background job queue: work runs on a rayon pool, results are drained on the control thread.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

type Work<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// Snapshot of queue activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub submitted: usize,
    pub queued: usize,
    pub inflight: usize,
    pub delivered: usize,
}

pub struct JobQueue<T: Send + 'static> {
    job_tx: Option<Sender<Work<T>>>,
    res_tx: Sender<T>,
    res_rx: Receiver<T>,
    _pool: Option<Arc<ThreadPool>>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    submitted: AtomicUsize,
    delivered: AtomicUsize,
    workers: usize,
}

impl<T: Send + 'static> JobQueue<T> {
    /// Queue backed by `workers` pool threads (at least one).
    pub fn new(workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let workers = workers.max(1);
        let (job_tx, job_rx) = unbounded::<Work<T>>();
        let (res_tx, res_rx) = unbounded::<T>();
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("terrane-worker-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                while let Ok(work) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    let out = work();
                    inflight.fetch_sub(1, Ordering::Relaxed);
                    let _ = tx.send(out);
                }
            });
        }
        log::debug!(target: "jobs", "job queue started with {workers} workers");

        Ok(Self {
            job_tx: Some(job_tx),
            res_tx,
            res_rx,
            _pool: Some(pool),
            queued,
            inflight,
            submitted: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
            workers,
        })
    }

    /// Queue with one worker per available core.
    pub fn with_available_parallelism() -> Result<Self, ThreadPoolBuildError> {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(workers)
    }

    /// Runs work synchronously inside `submit`; results still arrive through `drain`.
    pub fn inline() -> Self {
        let (res_tx, res_rx) = unbounded::<T>();
        Self {
            job_tx: None,
            res_tx,
            res_rx,
            _pool: None,
            queued: Arc::new(AtomicUsize::new(0)),
            inflight: Arc::new(AtomicUsize::new(0)),
            submitted: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
            workers: 0,
        }
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        self.job_tx.is_none()
    }

    pub fn submit<F>(&self, work: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let Some(job_tx) = &self.job_tx else {
            let _ = self.res_tx.send(work());
            return;
        };
        self.queued.fetch_add(1, Ordering::Relaxed);
        if job_tx.send(Box::new(work)).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
            log::warn!(target: "jobs", "job dropped: worker pool is gone");
        }
    }

    /// Completed results in arrival order. Never blocks.
    pub fn drain(&self) -> Vec<T> {
        let out: Vec<T> = self.res_rx.try_iter().collect();
        self.delivered.fetch_add(out.len(), Ordering::Relaxed);
        out
    }

    /// Hands each completed result to `on_complete` on the calling thread. Returns how many ran.
    pub fn drain_with(&self, mut on_complete: impl FnMut(T)) -> usize {
        let mut n = 0;
        for out in self.res_rx.try_iter() {
            on_complete(out);
            n += 1;
        }
        self.delivered.fetch_add(n, Ordering::Relaxed);
        n
    }

    pub fn counts(&self) -> QueueCounts {
        QueueCounts {
            submitted: self.submitted.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            inflight: self.inflight.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    /// `(queued, inflight)`
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }

    /// Results submitted but not yet drained.
    pub fn pending(&self) -> usize {
        self.submitted()
            .saturating_sub(self.delivered.load(Ordering::Relaxed))
    }

    /// Waits until no work is queued or running. Results stay in the channel for `drain`.
    /// Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let finished = self.res_rx.len() + self.delivered.load(Ordering::Relaxed);
            if finished >= self.submitted() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}
