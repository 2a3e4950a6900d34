use crate::bls12_381::BLSScalar;
use crate::prelude::*;
use ark_std::fmt;
use serde::de::{SeqAccess, Visitor};

/// Implement serde for a type with [`FromToBytes`]: base64 for human readable formats,
/// raw bytes otherwise.
#[macro_export]
macro_rules! serialize_deserialize {
    ($t:ident) => {
        impl serde::Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let bytes = $crate::serialization::FromToBytes::to_compact_bytes(self);
                if serializer.is_human_readable() {
                    serializer.serialize_str(&$crate::utils::b64enc(&bytes))
                } else {
                    serializer.serialize_bytes(&bytes)
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bytes = if deserializer.is_human_readable() {
                    deserializer.deserialize_str($crate::serialization::BytesVisitor)?
                } else {
                    deserializer.deserialize_bytes($crate::serialization::BytesVisitor)?
                };
                <$t as $crate::serialization::FromToBytes>::from_compact_bytes(&bytes)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Compact byte conversion used by the serde implementations of field-sized objects.
pub trait FromToBytes: Sized {
    /// Convert to bytes.
    fn to_compact_bytes(&self) -> Vec<u8>;
    /// Reconstruct from bytes.
    fn from_compact_bytes(bytes: &[u8]) -> core::result::Result<Self, AlgebraError>;
}

impl FromToBytes for BLSScalar {
    fn to_compact_bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn from_compact_bytes(bytes: &[u8]) -> core::result::Result<Self, AlgebraError> {
        BLSScalar::from_bytes(bytes)
    }
}

serialize_deserialize!(BLSScalar);

/// The visitor that accepts raw bytes, byte sequences, or base64 strings.
pub struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a byte-encoded object")
    }

    fn visit_seq<V>(self, mut seq: V) -> core::result::Result<Vec<u8>, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let mut vec: Vec<u8> = vec![];
        while let Some(x) = seq.next_element()? {
            vec.push(x);
        }
        Ok(vec)
    }

    fn visit_bytes<E>(self, v: &[u8]) -> core::result::Result<Vec<u8>, E> {
        Ok(v.to_vec())
    }

    fn visit_str<E>(self, v: &str) -> core::result::Result<Vec<u8>, E>
    where
        E: serde::de::Error,
    {
        b64dec(v).map_err(serde::de::Error::custom)
    }
}
