// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// The identity of a question, derived from its content. The underlying hash
/// is truncated to 64 bits so the identity has a compact decimal text form,
/// which is the key format of the result file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuestionHash {
    inner: u64,
}

impl QuestionHash {
    pub fn hash_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(bytes);
        hasher.finalize()
    }

    /// Parse the decimal text form. Only ASCII digit strings that fit in a
    /// u64 are accepted.
    pub fn from_decimal(s: &str) -> Fallible<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ErrorReport::new(format!("invalid question digest: {s:?}")));
        }
        let inner: u64 = s
            .parse()
            .map_err(|_| ErrorReport::new(format!("question digest out of range: {s:?}")))?;
        Ok(Self { inner })
    }

    pub fn to_decimal(self) -> String {
        self.inner.to_string()
    }
}

impl Display for QuestionHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl TryFrom<String> for QuestionHash {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QuestionHash::from_decimal(&value)
    }
}

impl From<QuestionHash> for String {
    fn from(hash: QuestionHash) -> String {
        hash.to_decimal()
    }
}

/// Streaming construction of a QuestionHash from several content fields.
pub struct Hasher {
    inner: blake3::Hasher,
}

impl Hasher {
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> QuestionHash {
        let digest = self.inner.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        QuestionHash {
            inner: u64::from_le_bytes(head),
        }
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_roundtrip() -> Fallible<()> {
        let hash = QuestionHash::hash_bytes(b"test");
        let recovered = QuestionHash::from_decimal(&hash.to_decimal())?;
        assert_eq!(hash, recovered);
        Ok(())
    }

    #[test]
    fn test_display_is_all_digits() {
        let hash = QuestionHash::hash_bytes(b"test");
        assert!(!hash.to_string().is_empty());
        assert!(hash.to_string().bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_rejects_non_decimal() {
        assert!(QuestionHash::from_decimal("").is_err());
        assert!(QuestionHash::from_decimal("abc").is_err());
        assert!(QuestionHash::from_decimal("12a").is_err());
        assert!(QuestionHash::from_decimal("-3").is_err());
        assert!(QuestionHash::from_decimal("+3").is_err());
        assert!(QuestionHash::from_decimal("18446744073709551616").is_err());
    }

    #[test]
    fn test_stable_across_hasher_and_bytes() {
        let mut hasher = Hasher::new();
        hasher.update(b"test");
        assert_eq!(hasher.finalize(), QuestionHash::hash_bytes(b"test"));
    }

    #[test]
    fn test_distinct_content_distinct_hash() {
        assert_ne!(
            QuestionHash::hash_bytes(b"a"),
            QuestionHash::hash_bytes(b"b")
        );
    }
}
