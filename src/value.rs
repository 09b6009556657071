//! Animatable value type.
//!
//! `Value` is the closed variant every track keyframe carries and every
//! `AnimationState` snapshot hands to renderer adapters. It is deliberately
//! plain data: numbers, strings, and flat number sequences, so the serialized
//! definition format round-trips through any structured encoding.

use std::fmt;

use serde::de::{self, Deserializer, EnumAccess, SeqAccess, VariantAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Enum representing the shape of a `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Number,
    Text,
    NumberList,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Number => "Number",
            ValueKind::Text => "Text",
            ValueKind::NumberList => "NumberList",
        }
    }
}

/// A single animatable value.
///
/// Serializes untagged in human-readable formats, so keyframe values appear
/// as bare JSON numbers, strings, and arrays rather than `{"Number": ...}`
/// wrappers; binary formats get an ordinary tagged enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Scalar number (opacity, x, rotation, progress along a motion path, ...).
    Number(f64),
    /// String value: colors (`#rrggbb`, `rgb()`, `rgba()`) or discrete
    /// property values such as `"block"`.
    Text(String),
    /// Flat sequence of numbers (e.g. a translate/scale pair, a filter matrix).
    NumberList(Vec<f64>),
}

impl Value {
    /// Shape of this value, used once per track to pick an interpolation arm.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::NumberList(_) => ValueKind::NumberList,
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_number_list(&self) -> Option<&[f64]> {
        match self {
            Value::NumberList(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::NumberList(v)
    }
}

const VALUE_VARIANTS: &[&str] = &["Number", "Text", "NumberList"];

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            match self {
                Value::Number(n) => serializer.serialize_f64(*n),
                Value::Text(s) => serializer.serialize_str(s),
                Value::NumberList(v) => v.serialize(serializer),
            }
        } else {
            match self {
                Value::Number(n) => {
                    serializer.serialize_newtype_variant("Value", 0, "Number", n)
                }
                Value::Text(s) => serializer.serialize_newtype_variant("Value", 1, "Text", s),
                Value::NumberList(v) => {
                    serializer.serialize_newtype_variant("Value", 2, "NumberList", v)
                }
            }
        }
    }
}

struct UntaggedVisitor;

impl<'de> Visitor<'de> for UntaggedVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a string, or a sequence of numbers")
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        Ok(Value::Number(n))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::Text(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::Text(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(n) = seq.next_element::<f64>()? {
            list.push(n);
        }
        Ok(Value::NumberList(list))
    }
}

enum ValueTag {
    Number,
    Text,
    NumberList,
}

impl<'de> Deserialize<'de> for ValueTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl<'de> Visitor<'de> for TagVisitor {
            type Value = ValueTag;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("variant identifier")
            }

            fn visit_u64<E: de::Error>(self, index: u64) -> Result<ValueTag, E> {
                match index {
                    0 => Ok(ValueTag::Number),
                    1 => Ok(ValueTag::Text),
                    2 => Ok(ValueTag::NumberList),
                    _ => Err(de::Error::invalid_value(
                        de::Unexpected::Unsigned(index),
                        &"variant index 0 <= i < 3",
                    )),
                }
            }

            fn visit_str<E: de::Error>(self, name: &str) -> Result<ValueTag, E> {
                match name {
                    "Number" => Ok(ValueTag::Number),
                    "Text" => Ok(ValueTag::Text),
                    "NumberList" => Ok(ValueTag::NumberList),
                    _ => Err(de::Error::unknown_variant(name, VALUE_VARIANTS)),
                }
            }
        }

        deserializer.deserialize_identifier(TagVisitor)
    }
}

struct TaggedVisitor;

impl<'de> Visitor<'de> for TaggedVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a Value enum")
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Value, A::Error> {
        let (tag, variant) = data.variant::<ValueTag>()?;
        match tag {
            ValueTag::Number => Ok(Value::Number(variant.newtype_variant()?)),
            ValueTag::Text => Ok(Value::Text(variant.newtype_variant()?)),
            ValueTag::NumberList => Ok(Value::NumberList(variant.newtype_variant()?)),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(UntaggedVisitor)
        } else {
            deserializer.deserialize_enum("Value", VALUE_VARIANTS, TaggedVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_serde_roundtrip() {
        let n = Value::Number(4.5);
        assert_eq!(serde_json::to_string(&n).unwrap(), "4.5");
        assert_eq!(serde_json::from_str::<Value>("4.5").unwrap(), n);

        let s = Value::Text("#ff0000".into());
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"#ff0000\"");
        assert_eq!(serde_json::from_str::<Value>("\"#ff0000\"").unwrap(), s);

        let l = Value::NumberList(vec![1.0, 2.0]);
        assert_eq!(serde_json::to_string(&l).unwrap(), "[1.0,2.0]");
        assert_eq!(serde_json::from_str::<Value>("[1,2]").unwrap(), l);
    }

    #[test]
    fn tagged_binary_roundtrip() {
        let values = [
            Value::Number(1.5),
            Value::Text("#ff0000".into()),
            Value::NumberList(vec![1.0, 2.0]),
        ];
        for value in values {
            let bytes = bincode::serialize(&value).unwrap();
            assert_eq!(bincode::deserialize::<Value>(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Value::Number(0.0).kind(), ValueKind::Number);
        assert_eq!(Value::Text(String::new()).kind(), ValueKind::Text);
        assert_eq!(Value::NumberList(vec![]).kind(), ValueKind::NumberList);
    }
}
