use crate::error::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::thread;

const MAX_DEFAULT_WORKERS: usize = 32;

/// Workers mostly wait on child processes, so default to a few more than the core count.
pub fn default_workers() -> usize {
    let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    (cores + 4).min(MAX_DEFAULT_WORKERS)
}

/// Thread pool owned by a single batch job; its threads exit once it is dropped.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    pub fn new(workers: Option<NonZeroUsize>) -> Result<Self> {
        let workers = workers.map_or_else(default_workers, NonZeroUsize::get);
        let dispatch = tracing::dispatcher::get_default(|current| current.clone());

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("srcfmt-worker-{}", idx))
            .spawn_handler(move |worker| {
                let dispatch = dispatch.clone();
                let mut builder = thread::Builder::new();
                if let Some(name) = worker.name() {
                    builder = builder.name(name.to_owned());
                }
                if let Some(size) = worker.stack_size() {
                    builder = builder.stack_size(size);
                }
                builder.spawn(move || {
                    tracing::dispatcher::with_default(&dispatch, || worker.run())
                })?;
                Ok(())
            })
            .build()?;

        let pool = Self { pool };
        tracing::debug!(workers = pool.workers(), "worker pool started");

        Ok(pool)
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` on the pool, returning once it and all work it spawned has finished.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
