//! The self-describing tree values cross the strategy boundary as.

use std::fmt;

use serde::ser::{self, Impossible};
use serde::{de::DeserializeOwned, Serialize, Serializer};

use crate::error::{SaveLoadError, SaveLoadResult};

pub use ciborium::Value;

/// Converts any serializable value into a [`Value`] tree.
///
/// # Errors
///
/// Returns [`SaveLoadError::Serialization`] if the value's `Serialize` impl fails.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> SaveLoadResult<Value> {
    Value::serialized(value).map_err(|err| SaveLoadError::Serialization(err.to_string()))
}

/// Builds a `T` from a [`Value`] tree.
///
/// Trees decoded from JSON carry integer map keys as text. When the direct
/// conversion fails, the tree is retried through `serde_json`, which parses
/// such keys back into the integers `T` expects.
///
/// # Errors
///
/// Returns [`SaveLoadError::Deserialization`] if the tree does not match the
/// shape of `T`.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> SaveLoadResult<T> {
    value.deserialized().or_else(|err| {
        serde_json::to_value(value)
            .and_then(serde_json::from_value)
            .map_err(|_| SaveLoadError::Deserialization(err.to_string()))
    })
}

/// Writes the top-level entries of `patch` onto `target`.
///
/// Each entry present in `patch` replaces the matching entry of `target`
/// wholesale; nested maps are not merged. Entries only present in `target`
/// are left alone. Every other pairing replaces `target` with `patch`.
pub fn overlay(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Map(existing), Value::Map(incoming)) => {
            for (key, value) in incoming {
                match existing.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, slot)) => *slot = value,
                    None => existing.push((key, value)),
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Reports whether `value` serializes as a struct with named fields.
///
/// Only such values are overlaid on load; maps and enums serialize to the
/// same tree shape but must be replaced as a whole.
pub(crate) fn serializes_as_struct<T: Serialize + ?Sized>(value: &T) -> bool {
    matches!(value.serialize(ShapeCheck), Err(Shape::Struct))
}

#[derive(Debug)]
enum Shape {
    Struct,
    Other,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => f.write_str("struct"),
            Self::Other => f.write_str("not a struct"),
        }
    }
}

impl std::error::Error for Shape {}

impl ser::Error for Shape {
    fn custom<M: fmt::Display>(_msg: M) -> Self {
        Self::Other
    }
}

/// Stops at the first serializer call and reports it through [`Shape`].
struct ShapeCheck;

macro_rules! not_a_struct {
    ($($method:ident($($arg:ty),*);)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<(), Shape> {
                Err(Shape::Other)
            }
        )*
    };
}

impl Serializer for ShapeCheck {
    type Ok = ();
    type Error = Shape;
    type SerializeSeq = Impossible<(), Shape>;
    type SerializeTuple = Impossible<(), Shape>;
    type SerializeTupleStruct = Impossible<(), Shape>;
    type SerializeTupleVariant = Impossible<(), Shape>;
    type SerializeMap = Impossible<(), Shape>;
    type SerializeStruct = Impossible<(), Shape>;
    type SerializeStructVariant = Impossible<(), Shape>;

    not_a_struct! {
        serialize_bool(bool);
        serialize_i8(i8);
        serialize_i16(i16);
        serialize_i32(i32);
        serialize_i64(i64);
        serialize_i128(i128);
        serialize_u8(u8);
        serialize_u16(u16);
        serialize_u32(u32);
        serialize_u64(u64);
        serialize_u128(u128);
        serialize_f32(f32);
        serialize_f64(f64);
        serialize_char(char);
        serialize_str(&str);
        serialize_bytes(&[u8]);
        serialize_none();
        serialize_unit();
        serialize_unit_struct(&'static str);
        serialize_unit_variant(&'static str, u32, &'static str);
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Shape> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Shape> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Shape> {
        Err(Shape::Other)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Shape> {
        Err(Shape::Other)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Shape> {
        Err(Shape::Other)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Shape> {
        Err(Shape::Other)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Shape> {
        Err(Shape::Other)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Shape> {
        Err(Shape::Other)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Shape> {
        Err(Shape::Struct)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Shape> {
        Err(Shape::Other)
    }
}
