//! Luhn check digits and card-number fixtures.
//!
//! Pure helpers kept apart from the search: they build identifiers with a
//! valid check digit so a known preimage can be planted in a test space.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Mir,
}

impl CardNetwork {
    pub const ALL: [CardNetwork; 4] = [Self::Visa, Self::Mastercard, Self::Amex, Self::Mir];

    /// Issuer prefixes a generated number may start with.
    pub const fn bins(self) -> &'static [&'static str] {
        match self {
            Self::Visa => &["4"],
            Self::Mastercard => &["51", "52", "53", "54", "55", "2221", "2720"],
            Self::Amex => &["34", "37"],
            Self::Mir => &["2200", "2204"],
        }
    }

    pub const fn length(self) -> usize {
        match self {
            Self::Amex => 15,
            _ => 16,
        }
    }
}

/// Check digit to append to `payload` (digits 0..=9, most significant first).
pub fn check_digit(payload: &[u8]) -> u8 {
    let total: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let d = u32::from(d);
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    ((10 - total % 10) % 10) as u8
}

/// Whether `number` is all digits and passes the Luhn check.
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let total: u32 = number
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    total % 10 == 0
}

/// Random Luhn-valid number for `network`, starting with one of its bins.
pub fn generate<R: Rng + ?Sized>(network: CardNetwork, rng: &mut R) -> String {
    let bins = network.bins();
    let bin = bins.choose(rng).copied().unwrap_or(bins[0]);
    let mut digits: Vec<u8> = bin.bytes().map(|b| b - b'0').collect();
    while digits.len() < network.length() - 1 {
        digits.push(rng.gen_range(0..10));
    }
    digits.push(check_digit(&digits));
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Benford first-digit frequencies for leading digits 1..=9.
const BENFORD_RATIOS: [f64; 9] = [
    0.301, 0.176, 0.125, 0.097, 0.079, 0.067, 0.058, 0.051, 0.046,
];

/// Observed leading-digit shares of real card numbers.
const ISSUER_RATIOS: [(char, f64); 5] = [
    ('4', 0.4),
    ('5', 0.3),
    ('3', 0.15),
    ('2', 0.1),
    ('6', 0.05),
];

/// A batch of generated numbers with first-digit statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkStats {
    pub numbers: Vec<String>,
    pub first_digit_distribution: BTreeMap<char, usize>,
    pub benford_expected: BTreeMap<char, f64>,
    pub anomaly_score: f64,
}

/// Generate `count` numbers over randomly chosen networks and tally their
/// leading digits against Benford's law and typical issuer shares.
pub fn generate_bulk<R: Rng + ?Sized>(count: usize, rng: &mut R) -> BulkStats {
    let mut numbers = Vec::with_capacity(count);
    let mut first_digit_distribution = BTreeMap::new();
    for _ in 0..count {
        let network = CardNetwork::ALL
            .choose(rng)
            .copied()
            .unwrap_or(CardNetwork::Visa);
        let number = generate(network, rng);
        if let Some(first) = number.chars().next() {
            *first_digit_distribution.entry(first).or_insert(0) += 1;
        }
        numbers.push(number);
    }
    let anomaly_score = anomaly_score(&first_digit_distribution, count);
    BulkStats {
        numbers,
        first_digit_distribution,
        benford_expected: benford_expected(count),
        anomaly_score,
    }
}

/// Expected leading-digit counts for `count` samples, rounded to 2 places.
pub fn benford_expected(count: usize) -> BTreeMap<char, f64> {
    ('1'..='9')
        .zip(BENFORD_RATIOS)
        .map(|(digit, ratio)| (digit, round_to(count as f64 * ratio, 2)))
        .collect()
}

/// Sum of absolute deviations between observed and typical issuer shares,
/// rounded to 4 places. Zero when `total` is zero.
pub fn anomaly_score(stats: &BTreeMap<char, usize>, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let score: f64 = ISSUER_RATIOS
        .iter()
        .map(|&(digit, expected)| {
            let actual = stats.get(&digit).copied().unwrap_or(0) as f64 / total as f64;
            (actual - expected).abs()
        })
        .sum();
    round_to(score, 4)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
