//! Codec trait and implementations.
//!
//! Rooms and transports only depend on [`Codec`], so the wire format can
//! change without touching either side. [`JsonCodec`] is the one shipped
//! today: readable in logs and easy to drive from a browser client.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so a codec can live inside a room task.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] if the bytes are malformed or don't match
    /// `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Behind the `json` feature (on by
/// default).
///
/// ```rust
/// use ludo_protocol::{ClientIntent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&ClientIntent::Roll).unwrap();
/// assert_eq!(bytes, br#"{"type":"roll"}"#);
/// let back: ClientIntent = codec.decode(&bytes).unwrap();
/// assert_eq!(back, ClientIntent::Roll);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
