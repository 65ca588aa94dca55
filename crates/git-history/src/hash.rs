// Copyright 2026 Oxide Computer Company

//! Commit hash types.

use crate::CommitHashParseError;
use std::{fmt, str::FromStr};

/// A full git commit hash, used as the identity of a commit.
///
/// This type guarantees the contained value is either:
///
/// - 20 bytes (SHA-1, displayed as 40 lowercase hex characters)
/// - 32 bytes (SHA-256, displayed as 64 lowercase hex characters)
///
/// Abbreviated hashes and symbolic revisions (`HEAD`, branch names) are not
/// commit identities; resolve them to a full hash first.
///
/// # Parsing
///
/// ```
/// use git_history::CommitHash;
///
/// let hash: CommitHash =
///     "0123456789abcdef0123456789abcdef01234567".parse().unwrap();
/// assert_eq!(hash.to_string(), "0123456789abcdef0123456789abcdef01234567");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitHash {
    /// A SHA-1 hash: the one traditionally used in Git.
    Sha1([u8; 20]),
    /// A SHA-256 hash, supported by newer versions of Git.
    Sha256([u8; 32]),
}

impl CommitHash {
    /// Returns the first `len` hex characters of the hash, for display in
    /// log lines and error messages.
    pub fn short(&self, len: usize) -> String {
        let mut s = self.to_string();
        s.truncate(len);
        s
    }
}

impl FromStr for CommitHash {
    type Err = CommitHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.len();
        match len {
            0 => Err(CommitHashParseError::Empty),
            40 => {
                let mut bytes = [0; 20];
                hex::decode_to_slice(s, &mut bytes)
                    .map_err(CommitHashParseError::InvalidHex)?;
                Ok(CommitHash::Sha1(bytes))
            }
            64 => {
                let mut bytes = [0; 32];
                hex::decode_to_slice(s, &mut bytes)
                    .map_err(CommitHashParseError::InvalidHex)?;
                Ok(CommitHash::Sha256(bytes))
            }
            _ => Err(CommitHashParseError::InvalidLength(len)),
        }
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitHash::Sha1(bytes) => hex::encode(bytes).fmt(f),
            CommitHash::Sha256(bytes) => hex::encode(bytes).fmt(f),
        }
    }
}
