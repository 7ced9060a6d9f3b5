use crate::partition::Partition;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One unit of work: a partition of one prefix's sub-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTask {
    pub prefix_index: usize,
    pub partition: Partition,
    /// 0 on first dispatch, 1 when re-queued after a worker failure.
    pub attempt: u8,
}

/// Terminal state of a search that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(String),
    Exhausted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub elapsed: Duration,
    /// Candidates hashed before the search settled. Exact for `Exhausted`.
    pub candidates_checked: u64,
}

impl SearchResult {
    pub fn found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }

    pub fn value(&self) -> Option<&str> {
        match &self.outcome {
            SearchOutcome::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Cancelled)
    }
}

/// One sample of a worker-count sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub workers: usize,
    pub result: SearchResult,
    pub elapsed: Duration,
}
