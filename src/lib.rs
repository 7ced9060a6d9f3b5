//! Parallel brute-force preimage search for partially known numeric identifiers.
//!
//! Given known prefixes, a known suffix and the total length of an identifier,
//! every value of the unknown middle digits is hashed and compared with a
//! target digest. The range is split across OS threads and the search stops
//! as soon as one of them finds a match.
pub mod engine;
pub mod error;
pub mod hash;
pub mod luhn;
pub mod metrics;
pub mod partition;
pub mod settings;
pub mod space;
pub mod types;
pub mod work;

pub use engine::{default_workers, SearchEngine, SearchEngineBuilder};
pub use error::Error;
pub use hash::{CandidateMatcher, HashAlgorithm, HashMatcher};
pub use metrics::{default_worker_sweep, sweep};
pub use partition::{partition, Partition, MAX_WORKERS};
pub use settings::Settings;
pub use space::{CandidateBuf, CandidateSpace, PrefixSpace};
pub use types::{SearchOutcome, SearchResult, SearchTask, SweepPoint};
pub use work::CancelToken;

/// Search for the identifier whose `algorithm` digest equals `target_hash`.
///
/// If several candidates match, the one returned is whichever a worker
/// reports first; see [`SearchEngine`].
pub fn search<I, S>(
    prefixes: I,
    known_suffix: &str,
    total_length: usize,
    target_hash: &str,
    algorithm: HashAlgorithm,
    workers: usize,
) -> Result<SearchResult, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    engine_for(prefixes, known_suffix, total_length, target_hash, algorithm)
        .workers(workers)
        .build_validated()?
        .run()
}

/// Run [`search`] once per worker count and time each run.
pub fn search_with_metrics<I, S>(
    prefixes: I,
    known_suffix: &str,
    total_length: usize,
    target_hash: &str,
    algorithm: HashAlgorithm,
    worker_counts: &[usize],
) -> Result<Vec<SweepPoint>, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let engine =
        engine_for(prefixes, known_suffix, total_length, target_hash, algorithm).build_validated()?;
    sweep(&engine, worker_counts)
}

fn engine_for<I, S>(
    prefixes: I,
    known_suffix: &str,
    total_length: usize,
    target_hash: &str,
    algorithm: HashAlgorithm,
) -> SearchEngineBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SearchEngineBuilder::default()
        .prefixes(prefixes.into_iter().map(Into::into).collect())
        .suffix(known_suffix)
        .total_length(total_length)
        .target(target_hash)
        .algorithm(algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn search_recovers_luhn_valid_card() {
        let mut rng = StdRng::seed_from_u64(2024);
        let card = luhn::generate(luhn::CardNetwork::Mastercard, &mut rng);
        let (head, tail) = card.split_at(card.len() - 4);
        // Forget four middle digits; keep the rest of the head as the prefix.
        let prefix = &head[..head.len() - 4];
        let target = HashAlgorithm::Sha224.hex_digest(card.as_bytes());

        let result = search([prefix], tail, card.len(), &target, HashAlgorithm::Sha224, 4)
            .expect("search should succeed");

        assert_eq!(result.value(), Some(card.as_str()));
        assert!(luhn::is_valid(result.value().unwrap_or_default()));
    }

    #[test]
    fn search_reports_invalid_space() {
        let target = HashAlgorithm::Sha224.hex_digest(b"x");
        let err = search(["2200"], "1234", 7, &target, HashAlgorithm::Sha224, 2)
            .expect_err("total length shorter than prefix + suffix");
        assert!(matches!(err, Error::InvalidSpace(_)));
    }

    #[test]
    fn search_rejects_unbounded_worker_count() {
        let target = HashAlgorithm::Sha224.hex_digest(b"123");
        let err = search(["1"], "3", 3, &target, HashAlgorithm::Sha224, usize::MAX)
            .expect_err("usize::MAX workers");
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = search_with_metrics(
            vec!["1".to_string()],
            "3",
            3,
            &target,
            HashAlgorithm::Sha224,
            &[2, MAX_WORKERS + 1],
        )
        .expect_err("one oversized sweep point");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn search_with_metrics_yields_one_point_per_worker_count() {
        let expected = "3412";
        let target = HashAlgorithm::Sha224.hex_digest(expected.as_bytes());

        let points = search_with_metrics(
            vec!["34".to_string(), "37".to_string()],
            "2",
            4,
            &target,
            HashAlgorithm::Sha224,
            &[1, 2, 7, 16],
        )
        .expect("metrics sweep");

        assert_eq!(points.len(), 4);
        assert!(points
            .iter()
            .all(|p| p.result.value() == Some(expected)));
    }
}
