//! Content hashing over canonical JSON.
//!
//! Four algorithms are supported: sha-256 (default), sha-384, sha-512, and
//! legacy md5. `ContentHash` round-trips through the `"<algorithm>:<hex>"`
//! textual form; verification is constant-time over equal-length byte
//! arrays.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// A supported hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256. The default, recommended algorithm.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
    /// MD5. Legacy; not cryptographically secure.
    Md5,
}

impl HashAlgorithm {
    /// The lowercase name used in a `ContentHash`'s textual form.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha-256",
            HashAlgorithm::Sha384 => "sha-384",
            HashAlgorithm::Sha512 => "sha-512",
            HashAlgorithm::Md5 => "md5",
        }
    }

    fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(bytes).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(bytes).to_vec(),
            HashAlgorithm::Md5 => Md5::digest(bytes).to_vec(),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    /// Parses an algorithm name case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha-256" | "sha256" => Ok(HashAlgorithm::Sha256),
            "sha-384" | "sha384" => Ok(HashAlgorithm::Sha384),
            "sha-512" | "sha512" => Ok(HashAlgorithm::Sha512),
            "md5" => Ok(HashAlgorithm::Md5),
            other => Err(format!("unknown hash algorithm '{other}'")),
        }
    }
}

/// An `{algorithm, raw bytes}` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl ContentHash {
    /// The algorithm that produced this hash.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Constant-time equality: unequal length or unequal algorithm tag
    /// implies a non-match without comparing bytes.
    pub fn verify_eq(&self, other: &ContentHash) -> bool {
        if self.algorithm != other.algorithm || self.bytes.len() != other.bytes.len() {
            return false;
        }
        let mut diff = 0u8;
        for (a, b) in self.bytes.iter().zip(other.bytes.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

impl fmt::Display for ContentHash {
    /// Renders as `"<algorithm>:<lowercase-hex>"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.name(), hex::encode(&self.bytes))
    }
}

impl FromStr for ContentHash {
    type Err = String;

    /// Parses `"<algorithm>:<hex>"`; the algorithm name is case-insensitive,
    /// the hex digits must be strictly lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algo_part, hex_part) = s.split_once(':').ok_or_else(|| format!("malformed content hash '{s}'"))?;
        let algorithm: HashAlgorithm = algo_part.parse()?;
        if hex_part.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(format!("hash digits must be lowercase hex: '{hex_part}'"));
        }
        let bytes = hex::decode(hex_part).map_err(|e| format!("invalid hex in content hash: {e}"))?;
        Ok(ContentHash { algorithm, bytes })
    }
}

/// Computes and verifies [`ContentHash`]es.
pub struct IntegrityChecker;

impl IntegrityChecker {
    /// Hashes raw bytes directly.
    pub fn hash_bytes(bytes: &[u8], algorithm: HashAlgorithm) -> ContentHash {
        ContentHash { algorithm, bytes: algorithm.digest(bytes) }
    }

    /// UTF-8 encodes `s`, then hashes the bytes.
    pub fn hash_string(s: &str, algorithm: HashAlgorithm) -> ContentHash {
        Self::hash_bytes(s.as_bytes(), algorithm)
    }

    /// Canonicalizes `value`, then hashes the resulting UTF-8 bytes — the
    /// wire format this crate's hashing must never drift from.
    pub fn hash_json(value: &crate::value::Value, algorithm: HashAlgorithm) -> ContentHash {
        Self::hash_string(&crate::canon::canonicalize(value), algorithm)
    }

    /// Whether `bytes` hashes (under `expected`'s algorithm) to `expected`.
    pub fn verify(bytes: &[u8], expected: &ContentHash) -> bool {
        let computed = Self::hash_bytes(bytes, expected.algorithm);
        computed.verify_eq(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn textual_form_round_trips() {
        let h = IntegrityChecker::hash_string("hello", HashAlgorithm::Sha256);
        let rendered = h.to_string();
        let parsed: ContentHash = rendered.parse().unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn algorithm_name_parses_case_insensitively() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
    }

    #[test]
    fn uppercase_hex_digits_are_rejected() {
        assert!("sha-256:ABCDEF".parse::<ContentHash>().is_err());
    }

    #[test]
    fn hash_json_matches_canonical_form_not_insertion_order() {
        let a = Value::Object(vec![("a".into(), Value::Integer(1)), ("b".into(), Value::Integer(2))]);
        let b = Value::Object(vec![("b".into(), Value::Integer(2)), ("a".into(), Value::Integer(1))]);
        assert_eq!(
            IntegrityChecker::hash_json(&a, HashAlgorithm::Sha256),
            IntegrityChecker::hash_json(&b, HashAlgorithm::Sha256)
        );
    }

    #[test]
    fn verify_detects_single_bit_flips() {
        let h = IntegrityChecker::hash_bytes(b"payload", HashAlgorithm::Sha256);
        assert!(IntegrityChecker::verify(b"payload", &h));
        assert!(!IntegrityChecker::verify(b"payloae", &h));
    }

    #[test]
    fn verify_eq_rejects_mismatched_algorithm_even_with_equal_bytes() {
        let a = ContentHash { algorithm: HashAlgorithm::Sha256, bytes: vec![1, 2, 3] };
        let b = ContentHash { algorithm: HashAlgorithm::Md5, bytes: vec![1, 2, 3] };
        assert!(!a.verify_eq(&b));
    }

    #[test]
    fn all_four_algorithms_produce_distinct_digests() {
        let bytes = b"same input";
        let sha256 = IntegrityChecker::hash_bytes(bytes, HashAlgorithm::Sha256);
        let sha384 = IntegrityChecker::hash_bytes(bytes, HashAlgorithm::Sha384);
        let sha512 = IntegrityChecker::hash_bytes(bytes, HashAlgorithm::Sha512);
        let md5 = IntegrityChecker::hash_bytes(bytes, HashAlgorithm::Md5);
        assert_ne!(sha256.as_bytes(), sha384.as_bytes());
        assert_ne!(sha384.as_bytes(), sha512.as_bytes());
        assert_ne!(sha512.as_bytes(), md5.as_bytes());
    }
}
