//! Game session core for the whodunit server.
//!
//! Everything here is synchronous and free of I/O. A [`Session`] receives
//! one intent at a time, validates it, mutates its state, and answers with
//! the events to deliver and who should get them. Delivering them is the
//! room layer's job.
//!
//! # Components
//!
//! - [`SolutionSource`]: draws the hidden answer for each round
//! - [`PlayerRegistry`]: seated players in join order
//! - [`AuthorityGuard`]: the single game-master seat
//! - [`MasterGate`]: passphrase check consulted before a master claim
//! - [`TurnScheduler`]: whose turn is displayed (informational only)
//! - [`score`]: compares a guess with the solution
//!
//! ```text
//! Room (above)   ← owns the Session, fans out its events
//!     ↕
//! Session (this crate)
//!     ↕
//! Protocol (below) ← ConnId, Guess, ServerEvent, Solution
//! ```

mod authority;
mod error;
mod gate;
mod registry;
mod scoring;
mod session;
mod solution;
mod turn;

pub use authority::{AuthorityGuard, PrivilegedAction};
pub use error::SessionError;
pub use gate::{MasterGate, OpenGate, Passphrase};
pub use registry::{Player, PlayerRegistry};
pub use scoring::score;
pub use session::{Outbound, Phase, Session};
pub use solution::{FixedSolution, RandomSolutions, SolutionSource};
pub use turn::{TurnScheduler, next_in_order};
