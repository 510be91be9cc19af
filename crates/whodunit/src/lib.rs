//! # Whodunit
//!
//! Server for a single shared game of deduction: one game master hides a
//! suspect, a weapon and a room; players guess and are scored field by
//! field.
//!
//! The crate ties the layers together:
//! transport → protocol → room actor → session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whodunit::prelude::*;
//!
//! # async fn start() -> Result<(), WhodunitError> {
//! let server = WhodunitServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .master_passphrase("open sesame")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::WhodunitError;
pub use server::{WhodunitServer, WhodunitServerBuilder};

/// Convenience re-exports for running and testing a server.
pub mod prelude {
    pub use crate::{
        ConfigError, ServerConfig, WhodunitError, WhodunitServer,
        WhodunitServerBuilder,
    };
    pub use whodunit_protocol::{
        ClientEvent, Codec, ConnId, GameOver, Guess, GuessResult,
        JoinRequest, JsonCodec, PlayerView, Room, ServerEvent, Solution,
        Suspect, Timestamp, Weapon,
    };
    pub use whodunit_room::{RoomHandle, RoomSnapshot};
    pub use whodunit_session::{
        FixedSolution, MasterGate, OpenGate, Passphrase, Phase,
        RandomSolutions, SolutionSource,
    };
}
