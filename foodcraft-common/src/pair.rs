//! Canonical ingredient pairs
//!
//! Combinations are unordered: "Salt" + "Sugar" and "Sugar" + "Salt" must hit
//! the same discovery row. A `CanonicalPair` stores the two names sorted
//! lexicographically (byte-wise over UTF-8) so it can be used directly as a
//! cache key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-independent key for a two-ingredient combination
///
/// Invariant: `first() <= second()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalPair {
    first: String,
    second: String,
}

impl CanonicalPair {
    /// Build a canonical pair from two names in any order
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let a = a.into();
        let b = b.into();
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Lexicographically smaller name
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger (or equal) name
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Lowercased copy, used for case-insensitive table lookups
    pub fn to_ascii_lowercase(&self) -> Self {
        Self::new(
            self.first.to_ascii_lowercase(),
            self.second.to_ascii_lowercase(),
        )
    }

    pub fn into_parts(self) -> (String, String) {
        (self.first, self.second)
    }
}

impl fmt::Display for CanonicalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first, self.second)
    }
}
