//! Unified error type for the whodunit server.

use whodunit_protocol::ProtocolError;
use whodunit_room::RoomError;
use whodunit_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
/// Game-rule rejections never get here: the room reports those to the
/// offending client as `error` events.
#[derive(Debug, thiserror::Error)]
pub enum WhodunitError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The room actor is gone or refused the connection.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
