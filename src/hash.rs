use crate::error::Error;
use ripemd::Ripemd320;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha512};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Digest algorithms a target hash may have been produced with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha224,
    Sha256,
    Sha512,
    Ripemd320,
    Blake3,
}

impl HashAlgorithm {
    /// Digest size in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
            Self::Ripemd320 => 40,
            Self::Blake3 => 32,
        }
    }

    /// Hash `data` into an owned buffer. Not meant for the scan loop.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha224 => Sha224::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
            Self::Ripemd320 => Ripemd320::digest(data).to_vec(),
            Self::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }

    /// Lowercase hex digest, the form targets are usually supplied in.
    pub fn hex_digest(self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }

    #[inline]
    fn digest_eq(self, data: &[u8], expected: &[u8]) -> bool {
        match self {
            Self::Sha224 => Sha224::digest(data).as_slice() == expected,
            Self::Sha256 => Sha256::digest(data).as_slice() == expected,
            Self::Sha512 => Sha512::digest(data).as_slice() == expected,
            Self::Ripemd320 => Ripemd320::digest(data).as_slice() == expected,
            Self::Blake3 => blake3::hash(data).as_bytes().as_slice() == expected,
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Ripemd320 => "ripemd320",
            Self::Blake3 => "blake3",
        };
        f.write_str(name)
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "sha224" | "sha2224" => Ok(Self::Sha224),
            "sha256" | "sha2256" => Ok(Self::Sha256),
            "sha512" | "sha2512" => Ok(Self::Sha512),
            "ripemd320" => Ok(Self::Ripemd320),
            "blake3" => Ok(Self::Blake3),
            _ => Err(Error::InvalidConfig(format!("unknown hash algorithm {s:?}"))),
        }
    }
}

/// Decides whether a rendered candidate is the preimage being searched for.
pub trait CandidateMatcher: Send + Sync {
    fn matches(&self, candidate: &[u8]) -> bool;
}

/// Exact digest comparison against a decoded target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashMatcher {
    algorithm: HashAlgorithm,
    target: Vec<u8>,
}

impl HashMatcher {
    /// Decode `target_hex` once. Hex decoding accepts either case.
    pub fn new(algorithm: HashAlgorithm, target_hex: &str) -> Result<Self, Error> {
        let target = hex::decode(target_hex.trim())
            .map_err(|e| Error::InvalidTarget(format!("not hex: {e}")))?;
        if target.len() != algorithm.output_len() {
            return Err(Error::InvalidTarget(format!(
                "{algorithm} digests are {} bytes, target has {}",
                algorithm.output_len(),
                target.len()
            )));
        }
        Ok(Self { algorithm, target })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn target_hex(&self) -> String {
        hex::encode(&self.target)
    }
}

impl CandidateMatcher for HashMatcher {
    #[inline]
    fn matches(&self, candidate: &[u8]) -> bool {
        self.algorithm.digest_eq(candidate, &self.target)
    }
}
