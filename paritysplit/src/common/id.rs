use std::fmt;
use std::str::FromStr;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::common::constants::ID_LEN;

/// A type-safe wrapper around the 128-bit identifier shared by every part of one split.
///
/// The 16 bytes are stored and written exactly as they appear on disk; the
/// textual form is 32 lowercase hex characters.
//
// // 同一次拆分中所有分片共享的 128 位标识符的类型安全包装器。
// // 16 字节按磁盘上的原样存储；文本形式为 32 个小写十六进制字符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartSetId([u8; ID_LEN]);

/// Errors that can occur while parsing a `PartSetId` string.
#[derive(Debug, thiserror::Error)]
pub enum IdParseError {
    #[error("Invalid id string length: expected 32, got {0}")]
    InvalidLength(usize),
    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl PartSetId {
    /// Length of the hex representation.
    pub const HEX_LEN: usize = ID_LEN * 2;

    /// The all-zero identifier. Never valid on disk.
    pub const NIL: PartSetId = PartSetId([0u8; ID_LEN]);

    pub fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh random identifier. Loops until the result is non-nil.
    pub fn random() -> Self {
        let mut bytes = [0u8; ID_LEN];
        let mut rng = rand::thread_rng();
        loop {
            rng.fill_bytes(&mut bytes);
            if bytes != [0u8; ID_LEN] {
                return Self(bytes);
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
        if s.len() != Self::HEX_LEN {
            return Err(IdParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ID_LEN]> for PartSetId {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PartSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PartSetId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for PartSetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PartSetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PartSetIdVisitor;

        impl<'de> serde::de::Visitor<'de> for PartSetIdVisitor {
            type Value = PartSetId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 32-character hex id string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                PartSetId::from_str(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PartSetIdVisitor)
    }
}
