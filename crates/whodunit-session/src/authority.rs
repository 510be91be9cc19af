//! The game-master seat.
//!
//! Authority is an explicit claim, never inferred from join order: the first
//! connection to *ask* for the seat gets it, and it stays empty until
//! someone does.

use std::fmt;

use whodunit_protocol::ConnId;

use crate::SessionError;

/// Operations that only the game master may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegedAction {
    ClaimGameMaster,
    StartNewGame,
    EndGame,
    ResetScores,
}

impl fmt::Display for PrivilegedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClaimGameMaster => f.write_str("claim the game master role"),
            Self::StartNewGame => f.write_str("start a new game"),
            Self::EndGame => f.write_str("end the game"),
            Self::ResetScores => f.write_str("reset scores"),
        }
    }
}

/// Holds at most one game-master connection.
#[derive(Debug, Default)]
pub struct AuthorityGuard {
    master: Option<ConnId>,
}

impl AuthorityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats `conn` as game master if the seat is free.
    ///
    /// # Errors
    /// [`SessionError::AuthorityConflict`] if any connection (including
    /// `conn` itself) already holds the seat.
    pub fn request(&mut self, conn: ConnId) -> Result<(), SessionError> {
        if self.master.is_some() {
            return Err(SessionError::AuthorityConflict);
        }
        self.master = Some(conn);
        Ok(())
    }

    /// Precondition for privileged operations.
    ///
    /// # Errors
    /// [`SessionError::NotAuthorized`] unless `conn` holds the seat.
    pub fn require(
        &self,
        conn: ConnId,
        action: PrivilegedAction,
    ) -> Result<(), SessionError> {
        if self.master == Some(conn) {
            Ok(())
        } else {
            Err(SessionError::NotAuthorized(action))
        }
    }

    /// Frees the seat if `conn` holds it. Returns whether it did.
    pub fn release(&mut self, conn: ConnId) -> bool {
        if self.master == Some(conn) {
            self.master = None;
            true
        } else {
            false
        }
    }

    pub fn holder(&self) -> Option<ConnId> {
        self.master
    }

    pub fn is_master(&self, conn: ConnId) -> bool {
        self.master == Some(conn)
    }
}
