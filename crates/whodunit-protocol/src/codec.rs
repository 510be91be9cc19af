//! Codec trait and implementations for serializing events.
//!
//! A codec (coder/decoder) converts between Rust values and the raw bytes
//! carried in one WebSocket frame. The transport moves bytes and knows
//! nothing about events; the room works on typed [`ClientEvent`]s and
//! [`ServerEvent`]s and knows nothing about bytes. The connection handler
//! sits between them and holds a [`Codec`]:
//!
//! ```text
//! frame bytes ──decode──► ClientEvent ──► room
//! room ──► ServerEvent ──encode──► frame bytes
//! ```
//!
//! [`JsonCodec`] is the only implementation today, because the browser
//! client speaks JSON. A binary format would be a new `Codec` impl and a
//! different type parameter on the server; nothing else changes.
//!
//! [`ClientEvent`]: crate::ClientEvent
//! [`ServerEvent`]: crate::ServerEvent

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to frame bytes and decodes them back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: one codec lives in the server's shared state and is
///   used from every connection task, on whichever worker thread Tokio
///   schedules them.
/// - `'static`: the codec owns everything it needs, so it can be moved
///   into spawned tasks that outlive the function that built them.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value type, so the same
/// codec handles inbound [`ClientEvent`](crate::ClientEvent)s, outbound
/// [`ServerEvent`](crate::ServerEvent)s and anything else with serde
/// impls. `decode` asks for `DeserializeOwned` rather than
/// `Deserialize<'de>`: the decoded event must not borrow from the frame
/// buffer, which is dropped as soon as the event is handed to the room.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T)
    -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use whodunit_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let event: ClientEvent = codec.decode(br#"{"event":"endGame"}"#).unwrap();
/// assert_eq!(event, ClientEvent::EndGame);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ServerEvent, Solution};

    #[test]
    fn test_encode_produces_utf8_json() {
        let bytes = JsonCodec
            .encode(&ServerEvent::Error("nope".into()))
            .unwrap();
        let text = std::str::from_utf8(&bytes).expect("JSON is UTF-8");
        assert_eq!(text, r#"{"event":"error","data":"nope"}"#);
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<Solution, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
