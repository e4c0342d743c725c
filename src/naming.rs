//! field naming conventions
//!
//! rust types serialize with snake_case fields, graphql servers usually
//! expect lowerCamelCase. [`FieldNaming`] renames struct field names between
//! the two (and a few other common conventions) while values are encoded or
//! decoded. map keys are data, not field names, and are never renamed.

use inflector::cases::camelcase::to_camel_case;
use inflector::cases::kebabcase::to_kebab_case;
use inflector::cases::pascalcase::to_pascal_case;
use inflector::cases::snakecase::to_snake_case;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use serde::de::value::StringDeserializer;
use serde::ser::{self, Serialize};
use serde::{forward_to_deserialize_any, Deserializer, Serializer};
use serde_json::{Map, Value};

/// naming convention applied to struct field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    /// `lowerCamelCase`
    #[default]
    CamelCase,
    /// `UpperCamelCase`
    PascalCase,
    /// `snake_case`
    SnakeCase,
    /// `kebab-case`
    KebabCase,
    /// leave names untouched
    Preserve,
}

impl FieldNaming {
    /// rename a single identifier
    ///
    /// leading underscores are kept so graphql meta fields such as
    /// `__typename` survive any convention.
    pub fn rename(&self, name: &str) -> String {
        let body = name.trim_start_matches('_');
        if body.is_empty() || *self == FieldNaming::Preserve {
            return name.to_string();
        }
        let prefix = &name[..name.len() - body.len()];

        let converted = match self {
            FieldNaming::CamelCase => to_camel_case(body),
            FieldNaming::PascalCase => to_pascal_case(body),
            FieldNaming::SnakeCase => to_snake_case(body),
            FieldNaming::KebabCase => to_kebab_case(body),
            FieldNaming::Preserve => body.to_string(),
        };
        format!("{prefix}{converted}")
    }

    /// encode `value` to json, renaming struct fields
    ///
    /// fails when two fields of one struct end up with the same name.
    pub fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Value> {
        match self {
            FieldNaming::Preserve => serde_json::to_value(value),
            naming => value.serialize(RenamingSerializer { naming: *naming }),
        }
    }

    /// decode `value`, renaming incoming object keys wherever a struct is
    /// expected
    ///
    /// types with `#[serde(flatten)]` or untagged enums buffer their input
    /// as a map, so their keys are matched as written.
    pub fn from_value<T: DeserializeOwned>(&self, value: Value) -> serde_json::Result<T> {
        match self {
            FieldNaming::Preserve => serde_json::from_value(value),
            naming => T::deserialize(RenamingDeserializer {
                value,
                naming: *naming,
            }),
        }
    }
}

fn ser_error(msg: String) -> serde_json::Error {
    <serde_json::Error as ser::Error>::custom(msg)
}

fn de_error(msg: String) -> serde_json::Error {
    <serde_json::Error as de::Error>::custom(msg)
}

struct RenamingSerializer {
    naming: FieldNaming,
}

impl Serializer for RenamingSerializer {
    type Ok = Value;
    type Error = serde_json::Error;
    type SerializeSeq = SeqEncoder;
    type SerializeTuple = SeqEncoder;
    type SerializeTupleStruct = SeqEncoder;
    type SerializeTupleVariant = VariantSeqEncoder;
    type SerializeMap = MapEncoder;
    type SerializeStruct = StructEncoder;
    type SerializeStructVariant = VariantStructEncoder;

    fn serialize_bool(self, v: bool) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_u128(v)
    }

    fn serialize_f32(self, v: f32) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> serde_json::Result<Value> {
        serde_json::value::Serializer.serialize_bytes(v)
    }

    fn serialize_none(self) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }

    // variant names are values, not fields
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> serde_json::Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> serde_json::Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> serde_json::Result<Value> {
        let mut map = Map::new();
        map.insert(variant.to_string(), value.serialize(self)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> serde_json::Result<SeqEncoder> {
        Ok(SeqEncoder {
            naming: self.naming,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> serde_json::Result<SeqEncoder> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> serde_json::Result<SeqEncoder> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> serde_json::Result<VariantSeqEncoder> {
        Ok(VariantSeqEncoder {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> serde_json::Result<MapEncoder> {
        Ok(MapEncoder {
            naming: self.naming,
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> serde_json::Result<StructEncoder> {
        Ok(StructEncoder {
            naming: self.naming,
            map: Map::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> serde_json::Result<VariantStructEncoder> {
        Ok(VariantStructEncoder {
            variant,
            inner: self.serialize_struct(variant, len)?,
        })
    }
}

struct SeqEncoder {
    naming: FieldNaming,
    items: Vec<Value>,
}

impl SeqEncoder {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        self.items.push(value.serialize(RenamingSerializer {
            naming: self.naming,
        })?);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        self.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        self.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        self.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Array(self.items))
    }
}

struct VariantSeqEncoder {
    variant: &'static str,
    inner: SeqEncoder,
}

impl ser::SerializeTupleVariant for VariantSeqEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        let mut map = Map::new();
        map.insert(self.variant.to_string(), Value::Array(self.inner.items));
        Ok(Value::Object(map))
    }
}

struct MapEncoder {
    naming: FieldNaming,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> serde_json::Result<()> {
        // keys are taken as written
        let key = match key.serialize(serde_json::value::Serializer)? {
            Value::String(key) => key,
            Value::Number(key) => key.to_string(),
            Value::Bool(key) => key.to_string(),
            _ => return Err(ser_error("map key must be a string".to_string())),
        };
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| ser_error("map value serialized before its key".to_string()))?;
        let value = value.serialize(RenamingSerializer {
            naming: self.naming,
        })?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Object(self.map))
    }
}

struct StructEncoder {
    naming: FieldNaming,
    map: Map<String, Value>,
}

impl StructEncoder {
    fn field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> serde_json::Result<()> {
        let name = self.naming.rename(key);
        if self.map.contains_key(&name) {
            return Err(ser_error(format!(
                "field `{key}` renames to `{name}`, which is already taken"
            )));
        }
        let value = value.serialize(RenamingSerializer {
            naming: self.naming,
        })?;
        self.map.insert(name, value);
        Ok(())
    }
}

impl ser::SerializeStruct for StructEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        self.field(key, value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Object(self.map))
    }
}

struct VariantStructEncoder {
    variant: &'static str,
    inner: StructEncoder,
}

impl ser::SerializeStructVariant for VariantStructEncoder {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        self.inner.field(key, value)
    }

    fn end(self) -> serde_json::Result<Value> {
        let mut map = Map::new();
        map.insert(self.variant.to_string(), Value::Object(self.inner.map));
        Ok(Value::Object(map))
    }
}

struct RenamingDeserializer {
    value: Value,
    naming: FieldNaming,
}

impl<'de> Deserializer<'de> for RenamingDeserializer {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> serde_json::Result<V::Value> {
        let naming = self.naming;
        match self.value {
            Value::Array(items) => visitor.visit_seq(SeqReader {
                items: items.into_iter(),
                naming,
            }),
            // plain maps keep their keys
            Value::Object(map) => visitor.visit_map(MapReader {
                entries: map.into_iter(),
                pending: None,
                naming,
            }),
            scalar => scalar.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> serde_json::Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> serde_json::Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> serde_json::Result<V::Value> {
        let naming = self.naming;
        match self.value {
            Value::Object(map) => {
                let mut renamed = Map::new();
                for (key, value) in map {
                    let name = naming.rename(&key);
                    if renamed.contains_key(&name) {
                        return Err(de_error(format!(
                            "key `{key}` renames to `{name}`, which is already taken"
                        )));
                    }
                    renamed.insert(name, value);
                }
                visitor.visit_map(MapReader {
                    entries: renamed.into_iter(),
                    pending: None,
                    naming,
                })
            }
            other => RenamingDeserializer { value: other, naming }.deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> serde_json::Result<V::Value> {
        let naming = self.naming;
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumReader {
                variant,
                value: None,
                naming,
            }),
            Value::Object(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor.visit_enum(EnumReader {
                        variant,
                        value: Some(value),
                        naming,
                    }),
                    _ => Err(de_error("enum must be an object with a single key".to_string())),
                }
            }
            other => other.deserialize_enum(name, variants, visitor),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
        ignored_any
    }
}

struct SeqReader {
    items: std::vec::IntoIter<Value>,
    naming: FieldNaming,
}

impl<'de> de::SeqAccess<'de> for SeqReader {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> serde_json::Result<Option<T::Value>> {
        match self.items.next() {
            Some(value) => seed
                .deserialize(RenamingDeserializer {
                    value,
                    naming: self.naming,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct MapReader {
    entries: serde_json::map::IntoIter,
    pending: Option<Value>,
    naming: FieldNaming,
}

impl<'de> de::MapAccess<'de> for MapReader {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> serde_json::Result<Option<K::Value>> {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                let key: StringDeserializer<serde_json::Error> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> serde_json::Result<V::Value> {
        let value = self
            .pending
            .take()
            .ok_or_else(|| de_error("map value requested before its key".to_string()))?;
        seed.deserialize(RenamingDeserializer {
            value,
            naming: self.naming,
        })
    }
}

struct EnumReader {
    variant: String,
    value: Option<Value>,
    naming: FieldNaming,
}

impl<'de> de::EnumAccess<'de> for EnumReader {
    type Error = serde_json::Error;
    type Variant = VariantReader;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> serde_json::Result<(V::Value, VariantReader)> {
        let variant: StringDeserializer<serde_json::Error> = self.variant.into_deserializer();
        let tag = seed.deserialize(variant)?;
        Ok((
            tag,
            VariantReader {
                value: self.value.map(|value| RenamingDeserializer {
                    value,
                    naming: self.naming,
                }),
            },
        ))
    }
}

struct VariantReader {
    value: Option<RenamingDeserializer>,
}

impl VariantReader {
    fn content(self, expected: &str) -> serde_json::Result<RenamingDeserializer> {
        self.value
            .ok_or_else(|| de_error(format!("expected {expected}, found unit variant")))
    }
}

impl<'de> de::VariantAccess<'de> for VariantReader {
    type Error = serde_json::Error;

    fn unit_variant(self) -> serde_json::Result<()> {
        match self.value {
            None => Ok(()),
            Some(content) if content.value.is_null() => Ok(()),
            Some(_) => Err(de_error("expected unit variant".to_string())),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> serde_json::Result<T::Value> {
        seed.deserialize(self.content("newtype variant")?)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> serde_json::Result<V::Value> {
        self.content("tuple variant")?.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> serde_json::Result<V::Value> {
        self.content("struct variant")?
            .deserialize_struct("", fields, visitor)
    }
}
