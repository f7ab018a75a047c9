//! Store-assigned message sequence numbers.
//!
//! The store hands out a monotonically increasing sequence number per
//! message, serialized on the wire as a decimal string because it may exceed
//! both 53-bit float precision and native integer range. All read/unread
//! decisions compare sequence numbers, so ordering must stay correct at any
//! magnitude: comparison is by digit count first, then lexicographically.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ProtocolError, Result};

/// Arbitrary-precision message sequence number.
///
/// Stores a normalized decimal string (no sign, no leading zeros). Ordering
/// compares digit count before digits, which is equivalent to numeric
/// comparison on non-negative integers of any size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seq(String);

impl Seq {
    /// Parse a decimal string into a sequence number.
    ///
    /// Accepts leading zeros (normalized away) but rejects empty input,
    /// signs, and non-digit characters.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::InvalidSeq { raw: raw.to_string() });
        }

        let normalized = raw.trim_start_matches('0');
        if normalized.is_empty() {
            // All zeros
            return Ok(Self("0".to_string()));
        }

        Ok(Self(normalized.to_string()))
    }

    /// Normalized decimal representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The sequence number one past this one.
    ///
    /// Used by the simulation store to assign seqs; correct at any magnitude.
    pub fn next(&self) -> Self {
        let mut digits = self.0.clone().into_bytes();
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                return Self(String::from_utf8_lossy(&digits).into_owned());
            }
        }
        let mut carried = String::with_capacity(digits.len() + 1);
        carried.push('1');
        carried.push_str(&String::from_utf8_lossy(&digits));
        Self(carried)
    }
}

impl Ord for Seq {
    fn cmp(&self, other: &Self) -> Ordering {
        // Digit-count-then-lexicographic equals numeric order for normalized
        // non-negative decimals.
        self.0.len().cmp(&other.0.len()).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Seq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for Seq {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Seq {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Seq {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parse_normalizes_leading_zeros() {
        assert_eq!(Seq::parse("007").unwrap().as_str(), "7");
        assert_eq!(Seq::parse("000").unwrap().as_str(), "0");
        assert_eq!(Seq::parse("0").unwrap().as_str(), "0");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Seq::parse("").is_err());
        assert!(Seq::parse("-1").is_err());
        assert!(Seq::parse("1e3").is_err());
        assert!(Seq::parse("12 ").is_err());
    }

    #[test]
    fn ordering_beyond_float_precision() {
        // Adjacent values that collapse to the same f64.
        let read = Seq::parse("9999999999999999").unwrap();
        let msg = Seq::parse("9999999999999998").unwrap();
        assert!(msg <= read);
        assert!(read > msg);
    }

    #[test]
    fn ordering_by_magnitude_then_digits() {
        let a = Seq::parse("99").unwrap();
        let b = Seq::parse("100").unwrap();
        assert!(a < b);
        assert!(Seq::parse("100000000000000000000000001").unwrap()
            > Seq::parse("99999999999999999999999999").unwrap());
    }

    #[test]
    fn next_carries() {
        assert_eq!(Seq::parse("9").unwrap().next().as_str(), "10");
        assert_eq!(Seq::parse("199").unwrap().next().as_str(), "200");
        assert_eq!(
            Seq::parse("9999999999999999999").unwrap().next().as_str(),
            "10000000000000000000"
        );
    }

    #[test]
    fn json_round_trip_is_string() {
        let seq = Seq::parse("42").unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, "\"42\"");
        let back: Seq = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }

    proptest! {
        #[test]
        fn prop_ordering_matches_u128(a in 0u128..u128::MAX, b in 0u128..u128::MAX) {
            let sa = Seq::parse(&a.to_string()).unwrap();
            let sb = Seq::parse(&b.to_string()).unwrap();
            prop_assert_eq!(sa.cmp(&sb), a.cmp(&b));
        }

        #[test]
        fn prop_next_is_strictly_greater(n in 0u128..u128::MAX) {
            let s = Seq::parse(&n.to_string()).unwrap();
            let next = s.next();
            prop_assert!(next > s);
            prop_assert_eq!(next.as_str(), (n + 1).to_string());
        }
    }
}
