use super::{SerializationStrategy, Value};
use crate::error::{SaveLoadError, SaveLoadResult};

/// Human-readable, pretty-printed JSON encoding.
///
/// Tolerates additive schema drift: fields the target type does not know are
/// ignored, and [`SerializationStrategy::decode_into`] keeps the current value
/// of fields the payload does not carry.
///
/// Map keys must be text or integers; integer keys are written as JSON strings
/// and parsed back on load. Byte strings are written as arrays of numbers.
/// Non-finite floats have no JSON form and fail to encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredTextStrategy;

impl SerializationStrategy for StructuredTextStrategy {
    fn encode(&self, value: &Value) -> SaveLoadResult<Vec<u8>> {
        ensure_finite(value)?;
        serde_json::to_vec_pretty(value).map_err(|err| SaveLoadError::Serialization(err.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> SaveLoadResult<Value> {
        serde_json::from_slice(bytes).map_err(|err| SaveLoadError::Deserialization(err.to_string()))
    }
}

fn ensure_finite(value: &Value) -> SaveLoadResult<()> {
    match value {
        Value::Float(float) if !float.is_finite() => Err(SaveLoadError::Serialization(format!(
            "{float} cannot be written as JSON"
        ))),
        Value::Array(items) => items.iter().try_for_each(ensure_finite),
        Value::Map(entries) => entries.iter().try_for_each(|(key, value)| {
            ensure_finite(key)?;
            ensure_finite(value)
        }),
        Value::Tag(_, inner) => ensure_finite(inner),
        _ => Ok(()),
    }
}
