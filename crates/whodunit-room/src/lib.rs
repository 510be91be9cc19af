//! The room: one Tokio task that owns the game session.
//!
//! Every connection handler talks to the room through a [`RoomHandle`].
//! Intents are queued on a bounded channel and applied one at a time to
//! completion, so no handler ever observes a half-applied event. Whatever
//! the session emits is fanned out by the [`Broadcaster`] in the order it
//! was produced.
//!
//! # Key types
//!
//! - [`spawn_room`]: starts the actor and returns its handle
//! - [`RoomHandle`]: connect, forward intents, disconnect, snapshot
//! - [`Broadcaster`]: per-connection outbound channels
//! - [`RoomSnapshot`]: read-only view of the session for diagnostics

mod broadcast;
mod error;
mod room;

pub use broadcast::{Broadcaster, EventSender};
pub use error::RoomError;
pub use room::{RoomHandle, RoomSnapshot, spawn_room};
