//! Events and payloads that travel on the wire.
//!
//! Every frame carries exactly one event, adjacently tagged:
//!
//! ```text
//! { "event": "guess", "data": { "suspect": "Mike", ... } }
//! { "event": "newGameStarted" }
//! ```
//!
//! Event names and payload fields are camelCase because the browser client
//! consumes them as-is.

use std::fmt;

use serde::{Deserialize, Serialize};
use whodunit_transport::ConnectionId;

use crate::Solution;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity of a participant. One per connection; a reconnect is a new id.
///
/// Serialized as a plain number so clients can compare it against the
/// `id` field of roster entries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl From<ConnectionId> for ConnId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Audience of an outbound event, decided by the session and honored by
/// the broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connection currently attached to the room, seated or not.
    All,
    /// A single connection.
    Only(ConnId),
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Payload of a `join` intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub name: String,
    #[serde(default)]
    pub is_game_master: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// When a guess was made, exactly as the client stamped it.
///
/// The server never reads the clock value, it only hands it back in the
/// matching [`GuessResult`]. Browsers stamp guesses either with
/// `Date.now()` (epoch milliseconds) or with a `Date` object, which
/// `JSON.stringify` turns into an ISO-8601 string, so both shapes are
/// accepted and each is re-encoded in the shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(u64),
    Text(String),
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::Millis(0)
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self::Millis(millis)
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(millis) => write!(f, "{millis}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A player's accusation. Fields are compared by exact name against the
/// solution; unknown names simply never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    pub suspect: String,
    pub weapon: String,
    pub room: String,
    /// Client-supplied, echoed back in the result.
    #[serde(default)]
    pub timestamp: Timestamp,
}

/// Intents a client can issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Join(JoinRequest),
    Guess(Guess),
    StartNewGame,
    EndGame,
    ResetScores,
}

impl ClientEvent {
    /// Wire name of the event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Guess(_) => "guess",
            Self::StartNewGame => "startNewGame",
            Self::EndGame => "endGame",
            Self::ResetScores => "resetScores",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// One roster entry as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: ConnId,
    pub name: String,
    pub score: u32,
    pub guess: Option<Guess>,
    pub has_guessed: bool,
}

/// Which fields of a guess hit the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldMatches {
    pub suspect: bool,
    pub weapon: bool,
    pub room: bool,
}

impl FieldMatches {
    /// Number of matching fields, 0..=3.
    pub fn count(&self) -> u8 {
        u8::from(self.suspect) + u8::from(self.weapon) + u8::from(self.room)
    }
}

/// Private feedback to the player who just guessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub score: u8,
    pub correct: FieldMatches,
    pub timestamp: Timestamp,
}

/// End-of-round summary, revealed to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub solution: Solution,
    pub scoreboard: Vec<PlayerView>,
}

/// Notifications the server pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full roster in turn order.
    UpdatePlayers(Vec<PlayerView>),
    /// The hidden answer; only ever addressed to the game master.
    UpdateSolution(Solution),
    /// Sent to a connection after its join is accepted.
    SetGameMaster(bool),
    GuessResult(GuessResult),
    GameOver(GameOver),
    NewGameStarted,
    UpdateCurrentPlayer(Option<ConnId>),
    /// A rejected intent, addressed to the offending connection only.
    Error(String),
}

impl ServerEvent {
    /// Wire name of the event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdatePlayers(_) => "updatePlayers",
            Self::UpdateSolution(_) => "updateSolution",
            Self::SetGameMaster(_) => "setGameMaster",
            Self::GuessResult(_) => "guessResult",
            Self::GameOver(_) => "gameOver",
            Self::NewGameStarted => "newGameStarted",
            Self::UpdateCurrentPlayer(_) => "updateCurrentPlayer",
            Self::Error(_) => "error",
        }
    }
}
