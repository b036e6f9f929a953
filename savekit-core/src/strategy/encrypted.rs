use super::{SerializationStrategy, Value};
use crate::crypto::EncryptionCodec;
use crate::error::SaveLoadResult;

/// Seals the output of an inner strategy.
///
/// Encoding encrypts after the inner encode; decoding decrypts before the
/// inner decode. The inner strategy's `decode_into` policy is preserved.
#[derive(Debug, Clone)]
pub struct Encrypted<S> {
    inner: S,
    codec: EncryptionCodec,
}

impl<S: SerializationStrategy> Encrypted<S> {
    /// Wraps `inner` so its bytes pass through `codec`.
    #[must_use]
    pub const fn new(inner: S, codec: EncryptionCodec) -> Self {
        Self { inner, codec }
    }

    /// Returns the wrapped strategy.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SerializationStrategy> SerializationStrategy for Encrypted<S> {
    fn encode(&self, value: &Value) -> SaveLoadResult<Vec<u8>> {
        let plaintext = self.inner.encode(value)?;
        self.codec.encrypt(&plaintext)
    }

    fn decode(&self, bytes: &[u8]) -> SaveLoadResult<Value> {
        let plaintext = self.codec.decrypt(bytes)?;
        self.inner.decode(&plaintext)
    }

    fn decode_into(&self, bytes: &[u8], existing: &mut Value) -> SaveLoadResult<()> {
        let plaintext = self.codec.decrypt(bytes)?;
        self.inner.decode_into(&plaintext, existing)
    }
}
