//! Codec Module
//!
//! The serialize/deserialize boundary between typed payloads and the string
//! values the store persists. Any codec must satisfy the round-trip law:
//! `decode(encode(v))` is structurally equal to `v`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

// == Codec Trait ==
/// Turns payloads into cacheable strings and back.
pub trait Codec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError>;

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError>;
}

// == JSON Codec ==
/// Encodes payloads as JSON text. The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError> {
        serde_json::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

// == Bincode Codec ==
/// Encodes payloads with bincode and wraps the bytes in base64.
///
/// Suited to byte-heavy payloads that JSON would inflate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        let bytes = bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(STANDARD.encode(bytes))
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError> {
        let bytes = STANDARD
            .decode(raw)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        bincode::deserialize(&bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
