//! The polymorphic JSON-RPC request id.
//!
//! JSON-RPC 2.0 permits a request id to be a string, a number, or null.
//! cc-tools never synthesizes outbound ids, so on decode we canonicalize
//! immediately to a string and never carry the original JSON shape past
//! that point -- simpler equality, simpler logging, and still spec-legal
//! because the protocol only requires echoing the id verbatim, which a
//! stable string form satisfies.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A JSON-RPC request id, canonicalized to a string on decode.
///
/// - A JSON string decodes to itself.
/// - A JSON integer decodes to its decimal form with no exponent or
///   fractional part (`42` -> `"42"`).
/// - A JSON float decodes to the shortest round-trippable decimal form
///   (`1.5` -> `"1.5"`).
/// - JSON `null` decodes to the empty string.
/// - JSON arrays and objects are rejected at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RequestId(String);

impl RequestId {
    /// The canonical string form of this id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RequestIdVisitor)
    }
}

struct RequestIdVisitor;

impl<'de> Visitor<'de> for RequestIdVisitor {
    type Value = RequestId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-RPC id: string, number, or null")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RequestId(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RequestId(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RequestId(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RequestId(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        // Shortest round-trippable form: integral floats print without a
        // fractional part, everything else uses Rust's default float
        // formatting (already shortest round-trippable per `ryu`).
        if v.fract() == 0.0 && v.is_finite() && v.abs() < 1e18 {
            #[allow(clippy::cast_possible_truncation)]
            let as_int = v as i64;
            Ok(RequestId(as_int.to_string()))
        } else {
            Ok(RequestId(v.to_string()))
        }
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RequestId(String::new()))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RequestId(String::new()))
    }

    fn visit_seq<A>(self, _seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        Err(de::Error::custom(
            "invalid request id: arrays are not permitted",
        ))
    }

    fn visit_map<A>(self, _map: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        Err(de::Error::custom(
            "invalid request id: objects are not permitted",
        ))
    }
}
