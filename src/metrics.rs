//! Wall-clock timing of full searches across worker counts.
use crate::engine::{default_workers, SearchEngine};
use crate::error::Error;
use crate::partition::MAX_WORKERS;
use crate::types::SweepPoint;
use std::time::Instant;

/// `1..=ceil(1.5 * host parallelism)`, the sweep used for throughput plots.
/// Capped at [`MAX_WORKERS`].
pub fn default_worker_sweep() -> Vec<usize> {
    worker_sweep_for(default_workers())
}

fn worker_sweep_for(parallelism: usize) -> Vec<usize> {
    let upper = parallelism.max(1).saturating_mul(3).div_ceil(2).min(MAX_WORKERS);
    (1..=upper).collect()
}

/// Run `engine` once per entry of `worker_counts`, overriding its worker count.
///
/// Each point's `elapsed` covers space construction, pool start-up and
/// teardown, not only the scan. Stops at the first failing run.
pub fn sweep(engine: &SearchEngine, worker_counts: &[usize]) -> Result<Vec<SweepPoint>, Error> {
    let mut points = Vec::with_capacity(worker_counts.len());
    for &workers in worker_counts {
        let mut run = engine.clone();
        run.workers = workers;
        let start = Instant::now();
        let result = run.run()?;
        let elapsed = start.elapsed();
        log::debug!(target: "hashsweep", "sweep workers={workers} took {elapsed:?}");
        points.push(SweepPoint {
            workers,
            result,
            elapsed,
        });
    }
    Ok(points)
}
