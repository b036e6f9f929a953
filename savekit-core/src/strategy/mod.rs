//! Serialization strategies.
//!
//! A strategy turns a [`Value`] tree into bytes and back. The built-in
//! strategies are [`BinaryStrategy`] (CBOR) and [`StructuredTextStrategy`]
//! (JSON); [`Encrypted`] wraps any strategy, built-in or caller-supplied, and
//! seals its output.
//!
//! Working on a tree rather than on concrete types keeps the trait object
//! safe, so a custom implementation can be bound at runtime.

mod binary;
mod encrypted;
mod text;
pub mod value;

pub use binary::BinaryStrategy;
pub use encrypted::Encrypted;
pub use text::StructuredTextStrategy;
pub use value::Value;

use crate::error::SaveLoadResult;

/// Encodes values to bytes and decodes bytes back to values.
pub trait SerializationStrategy: Send + Sync {
    /// Encodes `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Serialization`](crate::SaveLoadError::Serialization)
    /// if the tree cannot be represented in this encoding.
    fn encode(&self, value: &Value) -> SaveLoadResult<Vec<u8>>;

    /// Decodes `bytes` into a freshly built tree.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Deserialization`](crate::SaveLoadError::Deserialization)
    /// on empty, truncated or corrupt input.
    fn decode(&self, bytes: &[u8]) -> SaveLoadResult<Value>;

    /// Decodes `bytes` onto `existing`, touching only what the payload carries.
    ///
    /// The default replaces each top-level entry the payload carries and leaves
    /// the rest of `existing` unchanged (see [`value::overlay`]). `existing` is
    /// left untouched on failure.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`].
    fn decode_into(&self, bytes: &[u8], existing: &mut Value) -> SaveLoadResult<()> {
        let decoded = self.decode(bytes)?;
        value::overlay(existing, decoded);
        Ok(())
    }
}

impl<S: SerializationStrategy + ?Sized> SerializationStrategy for Box<S> {
    fn encode(&self, value: &Value) -> SaveLoadResult<Vec<u8>> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &[u8]) -> SaveLoadResult<Value> {
        (**self).decode(bytes)
    }

    fn decode_into(&self, bytes: &[u8], existing: &mut Value) -> SaveLoadResult<()> {
        (**self).decode_into(bytes, existing)
    }
}
