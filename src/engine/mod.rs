use crate::error::Error;
use crate::hash::{CandidateMatcher, HashAlgorithm, HashMatcher};
use crate::partition::{check_workers, partition, MAX_WORKERS};
use crate::space::CandidateSpace;
use crate::types::{SearchOutcome, SearchResult, SearchTask};
use crate::work::{CancelToken, StopFlag};
use derive_builder::Builder;
use flume::{Receiver, RecvTimeoutError, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long the coordinator waits on worker events before re-checking the
/// cancel token and deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Candidates a worker hashes between progress counter updates.
const PROGRESS_BATCH: u64 = 4096;

/// Host parallelism, or 1 when it cannot be determined.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|nz| nz.get().min(MAX_WORKERS))
        .unwrap_or(1)
}

/// A configured preimage search.
///
/// Each [`run`](SearchEngine::run) builds its own candidate space, worker
/// pool and channels, and joins every worker before returning.
///
/// If more than one candidate hashes to the target, the value returned is
/// whichever hit reaches the coordinator first. That choice is not
/// deterministic across runs or worker counts.
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned")]
pub struct SearchEngine {
    pub prefixes: Vec<String>,
    #[builder(setter(into))]
    pub suffix: String,
    pub total_length: usize,
    /// Hex-encoded digest to find a preimage for.
    #[builder(setter(into))]
    pub target: String,
    #[builder(default)]
    pub algorithm: HashAlgorithm,
    #[builder(default = "default_workers()")]
    pub workers: usize,
    #[builder(default)]
    pub cancel: CancelToken,
    /// Give up and report `Cancelled` once this much time has passed.
    #[builder(default, setter(strip_option))]
    pub deadline: Option<Duration>,
    /// Reset to 0 at the start of each run, then counts hashed candidates.
    #[builder(default = "Arc::new(AtomicU64::new(0))")]
    pub progress: Arc<AtomicU64>,
}

impl SearchEngine {
    fn validate(&self) -> Result<(), Error> {
        check_workers(self.workers)
    }

    pub fn run(&self) -> Result<SearchResult, Error> {
        self.validate()?;
        let space = CandidateSpace::new(&self.prefixes, &self.suffix, self.total_length)?;
        let matcher = HashMatcher::new(self.algorithm, &self.target)?;
        log::debug!(
            target: "hashsweep",
            "searching {} prefixes with suffix {:?}, length {}, {} candidates, algorithm {}",
            space.prefixes().len(),
            space.suffix(),
            space.total_length(),
            space.total_cardinality(),
            matcher.algorithm()
        );
        search_space(Arc::new(space), Arc::new(matcher), &self.run_options())
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            workers: self.workers,
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            progress: self.progress.clone(),
        }
    }
}

impl SearchEngineBuilder {
    fn validate(&self) -> Result<(), Error> {
        if let Some(workers) = self.workers {
            check_workers(workers)?;
        }
        if matches!(&self.prefixes, Some(p) if p.is_empty()) {
            return Err(Error::EmptyPrefixSet);
        }
        Ok(())
    }

    pub fn build_validated(self) -> Result<SearchEngine, Error> {
        self.validate()?;
        self.build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

#[derive(Debug, Clone)]
struct RunOptions {
    workers: usize,
    cancel: CancelToken,
    deadline: Option<Duration>,
    progress: Arc<AtomicU64>,
}

#[derive(Debug)]
enum WorkerEvent {
    Hit { worker: usize, value: String },
    Completed,
    Failed { task: SearchTask, message: String },
}

struct WorkerContext {
    id: usize,
    space: Arc<CandidateSpace>,
    matcher: Arc<dyn CandidateMatcher>,
    stop: Arc<StopFlag>,
    cancel: CancelToken,
    progress: Arc<AtomicU64>,
    tasks: Receiver<SearchTask>,
    events: Sender<WorkerEvent>,
}

impl WorkerContext {
    #[inline]
    fn halted(&self) -> bool {
        self.stop.should_stop() || self.cancel.is_cancelled()
    }
}

enum ScanEnd {
    Hit(String),
    Completed,
    Interrupted,
}

fn search_space(
    space: Arc<CandidateSpace>,
    matcher: Arc<dyn CandidateMatcher>,
    opts: &RunOptions,
) -> Result<SearchResult, Error> {
    let started = Instant::now();
    let deadline = opts.deadline.map(|d| started + d);
    opts.progress.store(0, Ordering::SeqCst);

    let (task_tx, task_rx) = flume::unbounded::<SearchTask>();
    let mut outstanding = 0usize;
    for (prefix_index, sub) in space.prefixes().iter().enumerate() {
        for part in partition(sub.cardinality, opts.workers)? {
            let task = SearchTask {
                prefix_index,
                partition: part,
                attempt: 0,
            };
            task_tx
                .send(task)
                .map_err(|_| Error::WorkerSpawn("task queue closed".into()))?;
            outstanding += 1;
        }
    }
    log::debug!(
        target: "hashsweep",
        "dispatched {outstanding} tasks to {} workers",
        opts.workers
    );

    let stop = Arc::new(StopFlag::new());
    let (event_tx, event_rx) = flume::unbounded::<WorkerEvent>();
    let mut joins = Vec::new();
    if let Err(err) = joins.try_reserve_exact(opts.workers) {
        return Err(Error::WorkerSpawn(format!(
            "cannot track {} workers: {err}",
            opts.workers
        )));
    }

    for id in 0..opts.workers {
        let ctx = WorkerContext {
            id,
            space: space.clone(),
            matcher: matcher.clone(),
            stop: stop.clone(),
            cancel: opts.cancel.clone(),
            progress: opts.progress.clone(),
            tasks: task_rx.clone(),
            events: event_tx.clone(),
        };
        let spawned = thread::Builder::new()
            .name(format!("hashsweep-worker-{id}"))
            .spawn(move || worker_loop(ctx));
        match spawned {
            Ok(join) => joins.push(join),
            Err(err) => {
                log::error!(target: "hashsweep", "failed to spawn worker {id}: {err}");
                stop.force_stop();
                drop(task_tx);
                join_handles(joins);
                return Err(Error::WorkerSpawn(err.to_string()));
            }
        }
    }
    drop(task_rx);
    drop(event_tx);

    let settled = coordinate(&event_rx, &task_tx, outstanding, &opts.cancel, deadline);

    stop.force_stop();
    drop(task_tx);
    join_handles(joins);

    let outcome = settled?;
    let result = SearchResult {
        outcome,
        elapsed: started.elapsed(),
        candidates_checked: opts.progress.load(Ordering::SeqCst),
    };
    log::info!(
        target: "hashsweep",
        "search settled as {:?} after {:?}, {} candidates checked",
        result.outcome,
        result.elapsed,
        result.candidates_checked
    );
    Ok(result)
}

fn coordinate(
    events: &Receiver<WorkerEvent>,
    tasks: &Sender<SearchTask>,
    mut outstanding: usize,
    cancel: &CancelToken,
    deadline: Option<Instant>,
) -> Result<SearchOutcome, Error> {
    let expired = || deadline.is_some_and(|d| Instant::now() >= d);
    loop {
        if outstanding == 0 {
            return Ok(SearchOutcome::Exhausted);
        }
        if cancel.is_cancelled() || expired() {
            return Ok(SearchOutcome::Cancelled);
        }
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(WorkerEvent::Hit { worker, value }) => {
                log::debug!(target: "hashsweep", "worker {worker} matched {value}");
                return Ok(SearchOutcome::Found(value));
            }
            Ok(WorkerEvent::Completed) => outstanding -= 1,
            Ok(WorkerEvent::Failed { task, message }) => {
                if task.attempt > 0 {
                    log::error!(
                        target: "hashsweep",
                        "task {:?} failed twice: {message}",
                        task.partition
                    );
                    return Err(Error::WorkerExecution(message));
                }
                log::warn!(
                    target: "hashsweep",
                    "retrying task {:?} after failure: {message}",
                    task.partition
                );
                let retry = SearchTask {
                    attempt: task.attempt + 1,
                    ..task
                };
                if tasks.send(retry).is_err() {
                    return Err(Error::WorkerExecution(message));
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                if cancel.is_cancelled() {
                    return Ok(SearchOutcome::Cancelled);
                }
                return Err(Error::WorkerExecution(format!(
                    "all workers exited with {outstanding} tasks outstanding"
                )));
            }
        }
    }
}

fn worker_loop(ctx: WorkerContext) {
    log::debug!(target: "hashsweep", "worker {} started", ctx.id);
    while let Ok(task) = ctx.tasks.recv() {
        if ctx.halted() {
            break;
        }
        let event = match panic::catch_unwind(AssertUnwindSafe(|| scan(&ctx, &task))) {
            Ok(Ok(ScanEnd::Hit(value))) => WorkerEvent::Hit {
                worker: ctx.id,
                value,
            },
            Ok(Ok(ScanEnd::Completed)) => WorkerEvent::Completed,
            Ok(Ok(ScanEnd::Interrupted)) => break,
            Ok(Err(message)) => WorkerEvent::Failed { task, message },
            Err(payload) => WorkerEvent::Failed {
                task,
                message: panic_message(payload.as_ref()),
            },
        };
        if ctx.events.send(event).is_err() {
            break;
        }
    }
    log::debug!(target: "hashsweep", "worker {} exiting", ctx.id);
}

fn scan(ctx: &WorkerContext, task: &SearchTask) -> Result<ScanEnd, String> {
    let part = task.partition;
    if part.is_empty() {
        return Ok(ScanEnd::Completed);
    }
    let mut buf = ctx
        .space
        .buffer(task.prefix_index, part.start)
        .ok_or_else(|| format!("partition {part:?} outside prefix {}", task.prefix_index))?;

    let mut pending = 0u64;
    for _ in part.start..part.end {
        if ctx.halted() {
            ctx.progress.fetch_add(pending, Ordering::Relaxed);
            return Ok(ScanEnd::Interrupted);
        }
        pending += 1;
        if ctx.matcher.matches(buf.as_bytes()) {
            ctx.progress.fetch_add(pending, Ordering::Relaxed);
            return Ok(ScanEnd::Hit(buf.to_string_lossy()));
        }
        buf.advance();
        if pending == PROGRESS_BATCH {
            ctx.progress.fetch_add(pending, Ordering::Relaxed);
            pending = 0;
        }
    }
    ctx.progress.fetch_add(pending, Ordering::Relaxed);
    Ok(ScanEnd::Completed)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_owned()
    }
}

fn join_handles(joins: Vec<thread::JoinHandle<()>>) {
    for handle in joins {
        let _ = handle.join();
    }
}
