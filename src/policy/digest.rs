//! Password digests.
//!
//! The stored format is the legacy one: MD5 of the raw password bytes,
//! rendered as 32 lowercase hex characters. It is reproduced as-is, not
//! as a recommendation.

use md5::{Digest, Md5};
use std::str::FromStr;

use crate::policy::error::DigestUnavailable;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
}

impl FromStr for DigestAlgorithm {
    type Err = DigestUnavailable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            _ => Err(DigestUnavailable(s.to_string())),
        }
    }
}

/// Computes hex digests with a fixed algorithm.
#[derive(Debug, Clone, Copy)]
pub struct Digester {
    algorithm: DigestAlgorithm,
}

impl Digester {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Build a digester from a configured algorithm name.
    pub fn from_name(name: &str) -> Result<Self, DigestUnavailable> {
        name.parse().map(Self::new)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Digest `input` and render it as lowercase hex.
    pub fn hex_digest(&self, input: &str) -> String {
        match self.algorithm {
            DigestAlgorithm::Md5 => {
                let mut hasher = Md5::new();
                hasher.update(input.as_bytes());
                hex::encode(hasher.finalize())
            }
        }
    }
}
