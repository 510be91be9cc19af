//! Error types for the session layer.

use whodunit_protocol::ConnId;

use crate::PrivilegedAction;

/// Why an intent was rejected.
///
/// Every variant is recoverable and local to the connection that caused
/// it: the room reports it back as an `error` event and carries on. The
/// display strings are what the client shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The submitted display name is empty or whitespace.
    #[error("name must not be empty")]
    InvalidName,

    /// The connection already holds a seat (player or game master).
    #[error("{0} has already joined")]
    AlreadyJoined(ConnId),

    /// Someone else already holds the game-master seat.
    #[error("a game master already exists")]
    AuthorityConflict,

    /// The connection is not allowed to perform the action.
    #[error("not authorized to {0}")]
    NotAuthorized(PrivilegedAction),

    /// A guess or end-of-round arrived outside an active round.
    #[error("no game is currently in progress")]
    NotInProgress,

    /// The player already guessed this round.
    #[error("you have already made a guess this round")]
    AlreadyGuessed,

    /// The connection is not a seated player (for example the game master).
    #[error("{0} is not a registered player")]
    UnknownPlayer(ConnId),
}
