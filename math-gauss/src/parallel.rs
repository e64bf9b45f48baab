//! Parallel execution configuration and fork-join region executors
//!
//! The elimination algorithm is written once against [`RegionExecutor`].
//! [`Inline`] runs every region on the calling thread; [`ForkJoin`] cuts a
//! region's items into chunks, hands them to a rayon pool according to the
//! [`SchedulePolicy`], and merges the per-worker results under a mutex.

use crate::error::{GaussError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

/// How the items of a parallel region are distributed among workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulePolicy {
    /// Chunks are dealt round-robin to workers before the region starts
    Static,
    /// Workers pull one chunk at a time from a shared queue
    Dynamic,
    /// Workers pull shrinking batches, never smaller than one chunk
    Guided,
    /// Work splitting is left to rayon
    #[serde(alias = "automatic")]
    Auto,
}

impl SchedulePolicy {
    /// All policies, in menu order
    pub const ALL: [SchedulePolicy; 4] = [
        SchedulePolicy::Static,
        SchedulePolicy::Dynamic,
        SchedulePolicy::Guided,
        SchedulePolicy::Auto,
    ];

    /// Menu code (1-4)
    pub fn code(self) -> u8 {
        match self {
            SchedulePolicy::Static => 1,
            SchedulePolicy::Dynamic => 2,
            SchedulePolicy::Guided => 3,
            SchedulePolicy::Auto => 4,
        }
    }

    /// Lower-case name
    pub fn name(self) -> &'static str {
        match self {
            SchedulePolicy::Static => "static",
            SchedulePolicy::Dynamic => "dynamic",
            SchedulePolicy::Guided => "guided",
            SchedulePolicy::Auto => "auto",
        }
    }
}

impl fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulePolicy {
    type Err = GaussError;

    /// Accepts a policy name or its menu code.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "static" => Ok(SchedulePolicy::Static),
            "2" | "dynamic" => Ok(SchedulePolicy::Dynamic),
            "3" | "guided" => Ok(SchedulePolicy::Guided),
            "4" | "auto" | "automatic" => Ok(SchedulePolicy::Auto),
            _ => Err(GaussError::UnknownSchedule(s.trim().to_string())),
        }
    }
}

/// Parallel execution configuration.
///
/// Values are validated on every setter; a rejected value leaves the
/// configuration unchanged. A solve takes its own copy, so changing the
/// configuration never affects a solve already running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    schedule: SchedulePolicy,
    chunk_size: usize,
    workers: usize,
    parallel_elimination: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            schedule: SchedulePolicy::Auto,
            chunk_size: 100,
            workers: 8,
            parallel_elimination: false,
        }
    }
}

impl ParallelConfig {
    /// Create a validated configuration
    pub fn new(schedule: SchedulePolicy, chunk_size: usize, workers: usize) -> Result<Self> {
        let config = Self {
            schedule,
            chunk_size,
            workers,
            parallel_elimination: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants (`chunk_size > 0`, `workers > 0`)
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(GaussError::InvalidChunkSize(self.chunk_size));
        }
        if self.workers == 0 {
            return Err(GaussError::InvalidWorkerCount(self.workers));
        }
        Ok(())
    }

    pub fn schedule(&self) -> SchedulePolicy {
        self.schedule
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether row reduction below the pivot also runs as a parallel region
    pub fn parallel_elimination(&self) -> bool {
        self.parallel_elimination
    }

    pub fn set_schedule(&mut self, schedule: SchedulePolicy) {
        self.schedule = schedule;
    }

    /// Set the policy from a name or menu code
    pub fn set_schedule_str(&mut self, value: &str) -> Result<()> {
        self.schedule = value.parse()?;
        Ok(())
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) -> Result<()> {
        if chunk_size == 0 {
            return Err(GaussError::InvalidChunkSize(chunk_size));
        }
        self.chunk_size = chunk_size;
        Ok(())
    }

    pub fn set_workers(&mut self, workers: usize) -> Result<()> {
        if workers == 0 {
            return Err(GaussError::InvalidWorkerCount(workers));
        }
        self.workers = workers;
        Ok(())
    }

    pub fn set_parallel_elimination(&mut self, enabled: bool) {
        self.parallel_elimination = enabled;
    }
}

impl fmt::Display for ParallelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parallel schedule type: {}, parallel size of chunk: {}, parallel wanted number of threads: {}",
            self.schedule, self.chunk_size, self.workers
        )?;
        if self.parallel_elimination {
            f.write_str(", parallel row reduction")?;
        }
        Ok(())
    }
}

/// Runs the work-sharing regions of the elimination algorithm.
///
/// `run_region` folds every item into a per-worker accumulator created by
/// `init`, then merges the accumulators with `merge`. Items are visited in
/// increasing order within a worker. `merge` must be associative and
/// commutative for the result not to depend on worker assignment.
pub trait RegionExecutor {
    /// Number of workers a region is spread over
    fn workers(&self) -> usize;

    fn run_region<T, A, I, W, M>(&self, items: Vec<T>, init: I, work: W, merge: M) -> A
    where
        T: Send,
        A: Send,
        I: Fn() -> A + Sync + Send,
        W: Fn(&mut A, T) + Sync + Send,
        M: Fn(&mut A, A) + Sync + Send;
}

/// Executes every region on the calling thread, in item order
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl RegionExecutor for Inline {
    fn workers(&self) -> usize {
        1
    }

    fn run_region<T, A, I, W, M>(&self, items: Vec<T>, init: I, work: W, _merge: M) -> A
    where
        T: Send,
        A: Send,
        I: Fn() -> A + Sync + Send,
        W: Fn(&mut A, T) + Sync + Send,
        M: Fn(&mut A, A) + Sync + Send,
    {
        let mut acc = init();
        for item in items {
            work(&mut acc, item);
        }
        acc
    }
}

/// Fork-join executor backed by a dedicated rayon pool of `workers` threads.
///
/// The pool lives as long as the executor, which is created for one solve.
pub struct ForkJoin {
    pool: rayon::ThreadPool,
    config: ParallelConfig,
}

impl ForkJoin {
    /// Build the worker pool for `config`
    pub fn new(config: &ParallelConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers())
            .thread_name(|i| format!("gauss-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }
}

impl fmt::Debug for ForkJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkJoin")
            .field("threads", &self.pool.current_num_threads())
            .field("config", &self.config)
            .finish()
    }
}

impl RegionExecutor for ForkJoin {
    fn workers(&self) -> usize {
        self.config.workers()
    }

    fn run_region<T, A, I, W, M>(&self, items: Vec<T>, init: I, work: W, merge: M) -> A
    where
        T: Send,
        A: Send,
        I: Fn() -> A + Sync + Send,
        W: Fn(&mut A, T) + Sync + Send,
        M: Fn(&mut A, A) + Sync + Send,
    {
        let workers = self.config.workers();
        let chunk = self.config.chunk_size();

        // A single worker folds everything in order, exactly like Inline.
        if workers == 1 || items.len() <= 1 {
            return Inline.run_region(items, init, work, merge);
        }

        let shared = Mutex::new(init());
        let combine = |local: A| {
            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            merge(&mut guard, local);
        };

        let init = &init;
        let work = &work;
        let combine = &combine;

        match self.config.schedule() {
            SchedulePolicy::Static => {
                let mut buckets: Vec<Vec<T>> = (0..workers).map(|_| Vec::new()).collect();
                for (idx, item) in items.into_iter().enumerate() {
                    buckets[(idx / chunk) % workers].push(item);
                }
                self.pool.scope(|s| {
                    for bucket in buckets.into_iter().filter(|b| !b.is_empty()) {
                        s.spawn(move |_| {
                            let mut local = init();
                            for item in bucket {
                                work(&mut local, item);
                            }
                            combine(local);
                        });
                    }
                });
            }
            SchedulePolicy::Dynamic | SchedulePolicy::Guided => {
                let guided = self.config.schedule() == SchedulePolicy::Guided;
                let queue = Mutex::new(items.into_iter());
                let queue = &queue;
                let next_batch = move || -> Vec<T> {
                    let mut q = queue.lock().unwrap_or_else(PoisonError::into_inner);
                    let remaining = q.len();
                    let take = if guided {
                        chunk.max(remaining.div_ceil(workers))
                    } else {
                        chunk
                    };
                    q.by_ref().take(take).collect()
                };
                self.pool.scope(|s| {
                    for _ in 0..workers {
                        s.spawn(move |_| {
                            let mut local = init();
                            loop {
                                let batch = next_batch();
                                if batch.is_empty() {
                                    break;
                                }
                                for item in batch {
                                    work(&mut local, item);
                                }
                            }
                            combine(local);
                        });
                    }
                });
            }
            SchedulePolicy::Auto => {
                self.pool.install(|| {
                    items
                        .into_par_iter()
                        .with_min_len(chunk)
                        .fold(init, |mut acc, item| {
                            work(&mut acc, item);
                            acc
                        })
                        .for_each(combine);
                });
            }
        }

        shared.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
