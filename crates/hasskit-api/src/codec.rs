//! The one JSON configuration shared by every Home Assistant endpoint.
//!
//! Encoding drops `null` object members at every depth, so optional fields
//! that are `None` never reach the wire. Decoding matches struct field names
//! ASCII case-insensitively and skips members the target type does not know.
//! Keys of open-ended maps (attributes, service data) pass through untouched.

use serde::de::value::StringDeserializer;
use serde::de::{
    self, Deserialize, DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess,
    IntoDeserializer, MapAccess, SeqAccess, Unexpected, VariantAccess, Visitor,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// Encode `value` as a compact JSON string with `null` members omitted.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    let tree = encode_value(value)?;
    serde_json::to_string(&tree).map_err(Error::Serialization)
}

/// Encode `value` into a JSON tree with `null` members omitted.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    let mut tree = serde_json::to_value(value).map_err(Error::Serialization)?;
    prune_nulls(&mut tree);
    Ok(tree)
}

/// Decode a JSON body into `T`.
///
/// Errors carry a short preview in the message and the full body alongside.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let tree: Value = serde_json::from_str(body).map_err(|e| deserialization(&e, body))?;
    T::deserialize(Lenient(tree)).map_err(|e| deserialization(&e, body))
}

/// Decode an already-parsed JSON tree into `T`.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    T::deserialize(Lenient(value))
}

fn deserialization(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// The declared name `key` matches by case, or `key` itself.
fn match_name(key: String, names: &'static [&'static str]) -> String {
    if names.contains(&key.as_str()) {
        return key;
    }
    names
        .iter()
        .find(|name| name.eq_ignore_ascii_case(&key))
        .map_or(key, |name| (*name).to_owned())
}

/// Rename members whose key matches a declared field name only by case.
fn match_fields(map: Map<String, Value>, fields: &'static [&'static str]) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (match_name(key, fields), value))
        .collect()
}

// ── Case-insensitive deserializer over a JSON tree ───────────────────

struct Lenient(Value);

impl<'de> Deserializer<'de> for Lenient {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(LenientMap::new(map)),
            Value::Array(items) => visitor.visit_seq(LenientSeq(items.into_iter())),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(Lenient(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(LenientMap::new(match_fields(map, fields))),
            other => Lenient(other).deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let (variant, content) = match self.0 {
            Value::String(variant) => (variant, None),
            Value::Object(map) if map.len() == 1 => {
                let Some((variant, content)) = map.into_iter().next() else {
                    return Err(de::Error::custom("enum map lost its only entry"));
                };
                (variant, Some(content))
            }
            other => return other.deserialize_enum(name, variants, visitor),
        };
        visitor.visit_enum(LenientEnum {
            variant: match_name(variant, variants),
            content,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier ignored_any
    }
}

struct LenientMap {
    entries: serde_json::map::IntoIter,
    pending: Option<Value>,
}

impl LenientMap {
    fn new(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter(),
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for LenientMap {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = Some(value);
        let key: StringDeserializer<serde_json::Error> = key.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        let value = self
            .pending
            .take()
            .ok_or_else(|| de::Error::custom("map value requested before its key"))?;
        seed.deserialize(Lenient(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct LenientSeq(std::vec::IntoIter<Value>);

impl<'de> SeqAccess<'de> for LenientSeq {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        self.0
            .next()
            .map(|value| seed.deserialize(Lenient(value)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

/// Externally tagged enum: the variant name plus its content, if any.
struct LenientEnum {
    variant: String,
    content: Option<Value>,
}

impl<'de> EnumAccess<'de> for LenientEnum {
    type Error = serde_json::Error;
    type Variant = LenientVariant;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Self::Error> {
        let key: StringDeserializer<serde_json::Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(key)?;
        Ok((variant, LenientVariant(self.content)))
    }
}

struct LenientVariant(Option<Value>);

impl<'de> VariantAccess<'de> for LenientVariant {
    type Error = serde_json::Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.0 {
            None => Ok(()),
            Some(value) => <()>::deserialize(Lenient(value)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Self::Error> {
        match self.0 {
            Some(value) => seed.deserialize(Lenient(value)),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"newtype variant",
            )),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Some(Value::Array(items)) => visitor.visit_seq(LenientSeq(items.into_iter())),
            _ => Err(de::Error::invalid_type(
                Unexpected::Other("non-array variant content"),
                &"tuple variant",
            )),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Some(Value::Object(map)) => {
                visitor.visit_map(LenientMap::new(match_fields(map, fields)))
            }
            _ => Err(de::Error::invalid_type(
                Unexpected::Other("non-object variant content"),
                &"struct variant",
            )),
        }
    }
}
