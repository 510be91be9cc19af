//! Wire protocol for the whodunit server.
//!
//! This crate defines the vocabulary that the browser client and the server
//! share:
//!
//! - **Catalog** ([`Suspect`], [`Weapon`], [`Room`], [`Solution`]): the
//!   closed candidate sets a solution is drawn from.
//! - **Events** ([`ClientEvent`], [`ServerEvent`] and their payloads): the
//!   intents a client may issue and the notifications the server pushes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events become frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (events) → Session (game rules)
//! ```

mod catalog;
mod codec;
mod error;
mod types;

pub use catalog::{Room, Solution, Suspect, Weapon};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ConnId, FieldMatches, GameOver, Guess, GuessResult,
    JoinRequest, PlayerView, Recipient, ServerEvent, Timestamp,
};
