use super::{SerializationStrategy, Value};
use crate::error::{SaveLoadError, SaveLoadResult};

/// Compact CBOR encoding.
///
/// Decoding is strict: [`SerializationStrategy::decode_into`] replaces the
/// existing tree with the payload, so the payload must carry every field the
/// target type requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryStrategy;

impl SerializationStrategy for BinaryStrategy {
    fn encode(&self, value: &Value) -> SaveLoadResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes)
            .map_err(|err| SaveLoadError::Serialization(err.to_string()))?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> SaveLoadResult<Value> {
        if bytes.is_empty() {
            return Err(SaveLoadError::Deserialization("empty payload".to_string()));
        }
        let mut reader = bytes;
        let value: Value = ciborium::de::from_reader(&mut reader)
            .map_err(|err| SaveLoadError::Deserialization(err.to_string()))?;
        if !reader.is_empty() {
            return Err(SaveLoadError::Deserialization(format!(
                "{} trailing bytes after payload",
                reader.len()
            )));
        }
        Ok(value)
    }

    fn decode_into(&self, bytes: &[u8], existing: &mut Value) -> SaveLoadResult<()> {
        *existing = self.decode(bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::value::to_value;

    fn sample() -> Value {
        Value::Map(vec![
            (
                Value::Text("listOfStrings".to_string()),
                Value::Array(vec![
                    Value::Text("one".to_string()),
                    Value::Text("two".to_string()),
                ]),
            ),
            (Value::Text("count".to_string()), Value::Integer(10.into())),
        ])
    }

    #[test]
    fn test_decode_reproduces_tree() {
        let bytes = BinaryStrategy.encode(&sample()).expect("encode");
        assert_eq!(BinaryStrategy.decode(&bytes).expect("decode"), sample());
    }

    #[test]
    fn test_truncated_payload_fails() {
        let bytes = BinaryStrategy.encode(&sample()).expect("encode");
        for cut in [0, 1, bytes.len() / 2, bytes.len() - 1] {
            match BinaryStrategy.decode(&bytes[..cut]) {
                Err(SaveLoadError::Deserialization(_)) => {}
                other => panic!("expected deserialization error at {cut}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_trailing_garbage_fails() {
        let mut bytes = BinaryStrategy.encode(&sample()).expect("encode");
        bytes.push(0x00);
        assert!(matches!(
            BinaryStrategy.decode(&bytes),
            Err(SaveLoadError::Deserialization(_))
        ));
    }

    #[test]
    fn test_decode_into_replaces_whole_tree() {
        let bytes = BinaryStrategy
            .encode(&to_value(&vec![1u8, 2, 3]).expect("to_value"))
            .expect("encode");
        let mut existing = sample();
        BinaryStrategy
            .decode_into(&bytes, &mut existing)
            .expect("decode_into");
        assert_eq!(existing, to_value(&vec![1u8, 2, 3]).expect("to_value"));
    }

    #[test]
    fn test_decode_into_failure_leaves_target() {
        let mut existing = sample();
        assert!(BinaryStrategy.decode_into(&[0xff], &mut existing).is_err());
        assert_eq!(existing, sample());
    }
}
