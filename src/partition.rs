use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A contiguous slice `[start, end)` of one prefix's middle-digit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub start: u64,
    pub end: u64,
    pub owner: usize,
}

impl Partition {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Upper bound on workers for one search.
pub const MAX_WORKERS: usize = 4096;

/// Reject worker counts outside `1..=MAX_WORKERS`.
pub fn check_workers(workers: usize) -> Result<(), Error> {
    if workers == 0 {
        return Err(Error::InvalidConfig("workers must be >= 1".into()));
    }
    if workers > MAX_WORKERS {
        return Err(Error::InvalidConfig(format!(
            "workers must be <= {MAX_WORKERS}, got {workers}"
        )));
    }
    Ok(())
}

/// Split `[0, cardinality)` into `workers` ordered, disjoint partitions.
///
/// The first `cardinality % workers` partitions carry one extra element, so
/// sizes never differ by more than one. When `cardinality < workers` the
/// trailing partitions are empty.
pub fn partition(cardinality: u64, workers: usize) -> Result<Vec<Partition>, Error> {
    check_workers(workers)?;
    let w = workers as u64;
    let base = cardinality / w;
    let remainder = cardinality % w;

    let mut out = Vec::with_capacity(workers);
    let mut start = 0u64;
    for owner in 0..workers {
        let size = if (owner as u64) < remainder {
            base + 1
        } else {
            base
        };
        let end = start + size;
        out.push(Partition { start, end, owner });
        start = end;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tiles(cardinality: u64, workers: usize) {
        let parts = partition(cardinality, workers).expect("valid partition args");
        assert_eq!(parts.len(), workers);

        let mut cursor = 0u64;
        for (i, p) in parts.iter().enumerate() {
            assert_eq!(p.owner, i);
            assert_eq!(p.start, cursor, "gap or overlap at partition {i}");
            assert!(p.end >= p.start);
            cursor = p.end;
        }
        assert_eq!(cursor, cardinality);

        let min = parts.iter().map(Partition::len).min().unwrap_or(0);
        let max = parts.iter().map(Partition::len).max().unwrap_or(0);
        assert!(max - min <= 1, "sizes {min}..{max} for N={cardinality} W={workers}");
    }

    #[test]
    fn partitions_tile_range_for_many_shapes() {
        for cardinality in [0u64, 1, 2, 3, 7, 10, 99, 100, 1_000, 1_000_003] {
            for workers in [1usize, 2, 3, 4, 7, 16, 33] {
                assert_tiles(cardinality, workers);
            }
        }
    }

    #[test]
    fn remainder_goes_to_leading_partitions() {
        let parts = partition(10, 4).expect("partition");
        let sizes: Vec<u64> = parts.iter().map(Partition::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn fewer_candidates_than_workers_leaves_empty_tail() {
        let parts = partition(2, 5).expect("partition");
        assert_eq!(parts.iter().filter(|p| p.is_empty()).count(), 3);
        assert_tiles(2, 5);
    }

    #[test]
    fn huge_cardinality_does_not_overflow() {
        assert_tiles(10u64.pow(19), 7);
    }

    #[test]
    fn partitioning_is_deterministic() {
        assert_eq!(
            partition(123_456, 7).expect("first"),
            partition(123_456, 7).expect("second")
        );
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = partition(10, 0).expect_err("zero workers");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn worker_count_is_capped() {
        assert_tiles(1_000, MAX_WORKERS);
        let err = partition(10, MAX_WORKERS + 1).expect_err("above cap");
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = partition(10, usize::MAX).expect_err("usize::MAX");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
