//! Error types for the room layer.

use whodunit_protocol::ConnId;

/// Errors from talking to the room actor.
///
/// Game-rule rejections are not here: those travel back to the client as
/// `error` events and never surface as a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The connection is already attached to the room.
    #[error("{0} is already connected")]
    AlreadyConnected(ConnId),

    /// The room's command channel is closed (the actor has stopped).
    #[error("room is unavailable")]
    Unavailable,
}
