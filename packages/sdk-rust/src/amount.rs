//! Fixed-width `u64` codec for token amounts and fee components.
//!
//! The swap program stores every amount and fee field as an 8-byte
//! little-endian unsigned integer. Callers often hold these values in wider
//! types (`u128`, decimal strings from JSON or the command line), so width is
//! enforced here, once, at the encode boundary.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Encoded width of every amount on the wire.
pub const U64_LEN: usize = 8;

/// A token amount or fee component guaranteed to fit in 64 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numberu64(u64);

impl Numberu64 {
    pub const ZERO: Numberu64 = Numberu64(0);
    pub const MAX: Numberu64 = Numberu64(u64::MAX);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Little-endian bytes, least-significant first, zero-padded to 8.
    pub const fn to_le_bytes(self) -> [u8; U64_LEN] {
        self.0.to_le_bytes()
    }

    /// Decode exactly 8 little-endian bytes.
    pub fn from_le_slice(bytes: &[u8]) -> Result<Self> {
        let b: [u8; U64_LEN] = bytes.try_into().map_err(|_| Error::InvalidBufferLength {
            expected: U64_LEN,
            actual:   bytes.len(),
        })?;
        Ok(Self(u64::from_le_bytes(b)))
    }
}

impl From<u64> for Numberu64 {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Numberu64> for u64 {
    fn from(value: Numberu64) -> Self {
        value.0
    }
}

impl TryFrom<u128> for Numberu64 {
    type Error = Error;

    fn try_from(value: u128) -> Result<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| Error::ValueTooLarge(value.to_string()))
    }
}

impl FromStr for Numberu64 {
    type Err = Error;

    /// Parse a non-negative decimal integer of any length. Only ASCII digits
    /// are accepted: no sign, separators or surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "'{s}' is not a non-negative decimal integer"
            )));
        }
        let mut value: u64 = 0;
        for b in s.bytes() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(b - b'0')))
                .ok_or_else(|| Error::ValueTooLarge(s.to_string()))?;
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Numberu64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Serialised as a decimal string: JSON consumers with 53-bit numbers would
// otherwise lose precision on large amounts.
impl Serialize for Numberu64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Numberu64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = Numberu64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a u64 or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Numberu64, E> {
                Ok(Numberu64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Numberu64, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Encode any non-negative integer as 8 little-endian bytes.
///
/// Fails with [`Error::ValueTooLarge`] instead of truncating.
pub fn encode_u64(value: u128) -> Result<[u8; U64_LEN]> {
    Numberu64::try_from(value).map(Numberu64::to_le_bytes)
}

/// Decode exactly 8 little-endian bytes.
pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    Numberu64::from_le_slice(bytes).map(Numberu64::get)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_little_endian_and_padded() {
        assert_eq!(encode_u64(1).unwrap(), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_u64(0x0102).unwrap(), [2, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_u64(0).unwrap(), [0u8; 8]);
    }

    #[test]
    fn test_encode_boundary() {
        assert_eq!(encode_u64(u64::MAX as u128).unwrap(), [0xFF; 8]);
        let err = encode_u64(1u128 << 64).unwrap_err();
        assert!(matches!(err, Error::ValueTooLarge(ref v) if v == "18446744073709551616"));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        for len in [0usize, 7, 9] {
            let err = decode_u64(&vec![0u8; len]).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidBufferLength { expected: 8, actual } if actual == len
            ));
        }
    }

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!("0".parse::<Numberu64>().unwrap(), Numberu64::ZERO);
        assert_eq!("1000000".parse::<Numberu64>().unwrap().get(), 1_000_000);
        assert_eq!("007".parse::<Numberu64>().unwrap().get(), 7);
        assert_eq!(
            "18446744073709551615".parse::<Numberu64>().unwrap(),
            Numberu64::MAX
        );
        assert!(matches!(
            "18446744073709551616".parse::<Numberu64>(),
            Err(Error::ValueTooLarge(_))
        ));
        assert!(matches!(
            "340282366920938463463374607431768211456".parse::<Numberu64>(),
            Err(Error::ValueTooLarge(_))
        ));
        assert!(matches!("-1".parse::<Numberu64>(), Err(Error::InvalidArgument(_))));
        assert!(matches!("".parse::<Numberu64>(), Err(Error::InvalidArgument(_))));
        assert!(matches!("12a".parse::<Numberu64>(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_rejects_separators_and_whitespace() {
        for input in ["1_000", "1__0", "_5", " 5 ", "5\n", "+5", "1,000", "٣"] {
            assert!(
                matches!(input.parse::<Numberu64>(), Err(Error::InvalidArgument(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let v = Numberu64::MAX;
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"18446744073709551615\"");
        assert_eq!(serde_json::from_str::<Numberu64>(&json).unwrap(), v);
        assert_eq!(serde_json::from_str::<Numberu64>("42").unwrap().get(), 42);
    }

    proptest! {
        #[test]
        fn prop_round_trip(v in any::<u64>()) {
            prop_assert_eq!(decode_u64(&encode_u64(v as u128).unwrap()).unwrap(), v);
        }

        #[test]
        fn prop_oversize_rejected(v in (u64::MAX as u128 + 1)..=u128::MAX) {
            prop_assert!(matches!(encode_u64(v), Err(Error::ValueTooLarge(_))));
        }
    }
}
