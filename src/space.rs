//! Candidate space construction: which digits are known, which are brute-forced.
use crate::error::Error;

/// Largest unknown-digit count whose cardinality still fits in `u64`.
pub const MAX_UNKNOWN_DIGITS: usize = 19;

/// The sub-space owned by one known prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSpace {
    pub prefix: String,
    pub unknown_digits: usize,
    pub cardinality: u64,
}

/// All identifiers of `total_length` digits that start with one of the
/// prefixes and end with `suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSpace {
    prefixes: Vec<PrefixSpace>,
    suffix: String,
    total_length: usize,
}

impl CandidateSpace {
    /// Build the space. Duplicate prefixes are collapsed, first occurrence wins.
    pub fn new<I, S>(prefixes: I, suffix: &str, total_length: usize) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ensure_digits("suffix", suffix)?;

        let mut spaces: Vec<PrefixSpace> = Vec::new();
        for prefix in prefixes {
            let prefix = prefix.as_ref();
            ensure_digits("prefix", prefix)?;
            if spaces.iter().any(|s| s.prefix == prefix) {
                continue;
            }
            let known = prefix.len() + suffix.len();
            let unknown_digits = total_length.checked_sub(known).ok_or_else(|| {
                Error::InvalidSpace(format!(
                    "prefix {prefix:?} and suffix {suffix:?} need {known} digits, total length is {total_length}"
                ))
            })?;
            if unknown_digits > MAX_UNKNOWN_DIGITS {
                return Err(Error::InvalidSpace(format!(
                    "{unknown_digits} unknown digits exceed the supported {MAX_UNKNOWN_DIGITS}"
                )));
            }
            spaces.push(PrefixSpace {
                prefix: prefix.to_owned(),
                unknown_digits,
                cardinality: 10u64.pow(unknown_digits as u32),
            });
        }

        if spaces.is_empty() {
            return Err(Error::EmptyPrefixSet);
        }

        Ok(Self {
            prefixes: spaces,
            suffix: suffix.to_owned(),
            total_length,
        })
    }

    pub fn prefixes(&self) -> &[PrefixSpace] {
        &self.prefixes
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Sum of all per-prefix cardinalities. Saturates rather than wrapping.
    pub fn total_cardinality(&self) -> u64 {
        self.prefixes
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.cardinality))
    }

    /// Render the candidate for `middle` under the prefix at `prefix_index`.
    pub fn candidate(&self, prefix_index: usize, middle: u64) -> Option<String> {
        let space = self.prefixes.get(prefix_index)?;
        if middle >= space.cardinality {
            return None;
        }
        if space.unknown_digits == 0 {
            return Some(format!("{}{}", space.prefix, self.suffix));
        }
        Some(format!(
            "{}{:0width$}{}",
            space.prefix,
            middle,
            self.suffix,
            width = space.unknown_digits
        ))
    }

    /// A reusable buffer positioned at `middle` for the given prefix.
    pub fn buffer(&self, prefix_index: usize, middle: u64) -> Option<CandidateBuf> {
        let space = self.prefixes.get(prefix_index)?;
        if middle >= space.cardinality {
            return None;
        }
        let mut bytes = Vec::with_capacity(self.total_length);
        bytes.extend_from_slice(space.prefix.as_bytes());
        bytes.resize(space.prefix.len() + space.unknown_digits, b'0');
        bytes.extend_from_slice(self.suffix.as_bytes());
        let mut buf = CandidateBuf {
            bytes,
            middle_start: space.prefix.len(),
            middle_len: space.unknown_digits,
        };
        buf.set_middle(middle);
        Some(buf)
    }
}

fn ensure_digits(what: &str, value: &str) -> Result<(), Error> {
    if value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidSpace(format!(
            "{what} {value:?} must contain only decimal digits"
        )))
    }
}

/// Candidate bytes with prefix and suffix fixed in place.
///
/// Only the middle digits are rewritten as the scan advances, so the hot
/// loop never allocates.
#[derive(Debug, Clone)]
pub struct CandidateBuf {
    bytes: Vec<u8>,
    middle_start: usize,
    middle_len: usize,
}

impl CandidateBuf {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn set_middle(&mut self, mut middle: u64) {
        let digits = &mut self.bytes[self.middle_start..self.middle_start + self.middle_len];
        for slot in digits.iter_mut().rev() {
            *slot = b'0' + (middle % 10) as u8;
            middle /= 10;
        }
    }

    /// Step the middle digits forward by one, odometer style.
    #[inline]
    pub fn advance(&mut self) {
        let digits = &mut self.bytes[self.middle_start..self.middle_start + self.middle_len];
        for slot in digits.iter_mut().rev() {
            if *slot == b'9' {
                *slot = b'0';
            } else {
                *slot += 1;
                return;
            }
        }
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_unknown_digits_and_cardinality() {
        let space = CandidateSpace::new(["4"], "1234", 16).expect("valid space");
        let p = &space.prefixes()[0];
        assert_eq!(p.unknown_digits, 11);
        assert_eq!(p.cardinality, 100_000_000_000);
        assert_eq!(space.total_cardinality(), 100_000_000_000);
        assert_eq!(space.suffix(), "1234");
        assert_eq!(space.total_length(), 16);
    }

    #[test]
    fn prefixes_of_different_lengths_own_their_subspace() {
        let space = CandidateSpace::new(["4", "2200"], "1234", 16).expect("valid space");
        let digits: Vec<usize> = space.prefixes().iter().map(|p| p.unknown_digits).collect();
        assert_eq!(digits, vec![11, 8]);
        assert_eq!(space.total_cardinality(), 100_000_000_000 + 100_000_000);
    }

    #[test]
    fn candidate_is_left_padded() {
        let space = CandidateSpace::new(["4"], "1234", 16).expect("valid space");
        assert_eq!(space.candidate(0, 0).as_deref(), Some("4000000000001234"));
        assert_eq!(space.candidate(0, 42).as_deref(), Some("4000000000421234"));
        assert_eq!(space.candidate(0, 100_000_000_000), None);
        assert_eq!(space.candidate(1, 0), None);
    }

    #[test]
    fn buffer_matches_rendered_candidates_while_advancing() {
        let space = CandidateSpace::new(["51"], "7", 6).expect("valid space");
        let mut buf = space.buffer(0, 95).expect("in range");
        for middle in 95..1_000 {
            assert_eq!(
                buf.as_bytes(),
                space.candidate(0, middle).expect("in range").as_bytes()
            );
            buf.advance();
        }
    }

    #[test]
    fn zero_unknown_digits_is_a_single_candidate() {
        let space = CandidateSpace::new(["12"], "34", 4).expect("valid space");
        assert_eq!(space.total_cardinality(), 1);
        assert_eq!(space.candidate(0, 0).as_deref(), Some("1234"));
        let buf = space.buffer(0, 0).expect("in range");
        assert_eq!(buf.to_string_lossy(), "1234");
    }

    #[test]
    fn duplicate_prefixes_collapse() {
        let space = CandidateSpace::new(["4", "5", "4"], "", 3).expect("valid space");
        let names: Vec<&str> = space.prefixes().iter().map(|p| p.prefix.as_str()).collect();
        assert_eq!(names, vec!["4", "5"]);
    }

    #[test]
    fn too_short_total_length_is_invalid() {
        let err = CandidateSpace::new(["4", "2204"], "1234", 7).expect_err("2204 + 1234 > 7");
        assert!(matches!(err, Error::InvalidSpace(_)));
    }

    #[test]
    fn empty_prefix_set_is_rejected() {
        let err = CandidateSpace::new(Vec::<String>::new(), "1234", 16).expect_err("no prefixes");
        assert_eq!(err, Error::EmptyPrefixSet);
    }

    #[test]
    fn non_digit_input_is_rejected() {
        let err = CandidateSpace::new(["4a"], "1234", 16).expect_err("letters in prefix");
        assert!(matches!(err, Error::InvalidSpace(_)));
        let err = CandidateSpace::new(["4"], "12-4", 16).expect_err("dash in suffix");
        assert!(matches!(err, Error::InvalidSpace(_)));
    }

    #[test]
    fn overflowing_cardinality_is_rejected() {
        let err = CandidateSpace::new(["1"], "", 21).expect_err("20 unknown digits");
        assert!(matches!(err, Error::InvalidSpace(_)));
        CandidateSpace::new(["1"], "", 20).expect("19 unknown digits fit");
    }
}
