//! The session state machine.
//!
//! ```text
//!        start_new_game            end_game
//!   Idle ───────────────→ InProgress ────────→ Ended
//!                          ↑      │              │
//!                          └──────┘              │
//!                          ↑  start_new_game     │
//!                          └─────────────────────┘
//! ```
//!
//! Each operation either fails with a [`SessionError`] and leaves the state
//! untouched, or succeeds and returns the events to deliver, in the order
//! clients must see them.

use std::fmt;

use whodunit_protocol::{
    ConnId, GameOver, Guess, GuessResult, PlayerView, Recipient, ServerEvent,
    Solution,
};

use crate::{
    AuthorityGuard, PlayerRegistry, PrivilegedAction, SessionError,
    SolutionSource, TurnScheduler, score,
};

/// An event together with its audience.
pub type Outbound = (Recipient, ServerEvent);

/// Round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No game has been started yet.
    #[default]
    Idle,
    /// Guesses are accepted.
    InProgress,
    /// The last round was ended; its solution has been revealed.
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::InProgress => f.write_str("in-progress"),
            Self::Ended => f.write_str("ended"),
        }
    }
}

/// The one shared game.
pub struct Session {
    phase: Phase,
    solution: Option<Solution>,
    authority: AuthorityGuard,
    turns: TurnScheduler,
    registry: PlayerRegistry,
    source: Box<dyn SolutionSource>,
}

impl Session {
    /// An idle session with nobody seated and no solution drawn.
    pub fn new(source: impl SolutionSource + 'static) -> Self {
        Self {
            phase: Phase::Idle,
            solution: None,
            authority: AuthorityGuard::new(),
            turns: TurnScheduler::new(),
            registry: PlayerRegistry::new(),
            source: Box::new(source),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn solution(&self) -> Option<Solution> {
        self.solution
    }

    pub fn game_master(&self) -> Option<ConnId> {
        self.authority.holder()
    }

    pub fn current_player(&self) -> Option<ConnId> {
        self.turns.current()
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn roster(&self) -> Vec<PlayerView> {
        self.registry.snapshot()
    }

    /// Seats `conn` either as game master or as a player.
    ///
    /// `passphrase_ok` is the verdict of the master gate; it is ignored for
    /// player joins.
    ///
    /// # Errors
    /// - [`SessionError::InvalidName`] for an empty or blank name
    /// - [`SessionError::AlreadyJoined`] if `conn` already holds a seat
    /// - [`SessionError::NotAuthorized`] if the master claim was not admitted
    /// - [`SessionError::AuthorityConflict`] if the master seat is taken
    pub fn join(
        &mut self,
        conn: ConnId,
        name: &str,
        as_master: bool,
        passphrase_ok: bool,
    ) -> Result<Vec<Outbound>, SessionError> {
        if name.trim().is_empty() {
            return Err(SessionError::InvalidName);
        }
        if self.registry.contains(conn) || self.authority.is_master(conn) {
            return Err(SessionError::AlreadyJoined(conn));
        }

        let mut out = Vec::new();
        if as_master {
            if !passphrase_ok {
                return Err(SessionError::NotAuthorized(
                    PrivilegedAction::ClaimGameMaster,
                ));
            }
            self.authority.request(conn)?;
            tracing::info!(%conn, name = name.trim(), "game master joined");

            out.push((Recipient::Only(conn), ServerEvent::SetGameMaster(true)));
            if let Some(solution) = self.solution {
                out.push((Recipient::Only(conn), ServerEvent::UpdateSolution(solution)));
            }
            if let Some(current) = self.turns.current() {
                out.push((
                    Recipient::Only(conn),
                    ServerEvent::UpdateCurrentPlayer(Some(current)),
                ));
            }
        } else {
            self.registry.join(conn, name)?;
            tracing::info!(
                %conn,
                name = name.trim(),
                players = self.registry.len(),
                "player joined"
            );

            out.push((Recipient::Only(conn), ServerEvent::SetGameMaster(false)));
            if self.registry.len() == 1 {
                self.turns.assign(conn);
                out.push((Recipient::All, ServerEvent::UpdateCurrentPlayer(Some(conn))));
            } else {
                out.push((
                    Recipient::Only(conn),
                    ServerEvent::UpdateCurrentPlayer(self.turns.current()),
                ));
            }
        }

        out.push(self.roster_update());
        self.check_invariants();
        Ok(out)
    }

    /// Scores a guess from a seated player and passes the turn along.
    ///
    /// The turn advances from the current holder, not from the guesser:
    /// any player who has not guessed yet may guess out of turn.
    ///
    /// # Errors
    /// - [`SessionError::NotInProgress`] outside an active round
    /// - [`SessionError::UnknownPlayer`] if `conn` is not seated
    /// - [`SessionError::AlreadyGuessed`] on a second guess this round
    pub fn guess(
        &mut self,
        conn: ConnId,
        guess: Guess,
    ) -> Result<Vec<Outbound>, SessionError> {
        let solution = match (self.phase, self.solution) {
            (Phase::InProgress, Some(solution)) => solution,
            _ => return Err(SessionError::NotInProgress),
        };
        let player = self
            .registry
            .get_mut(conn)
            .ok_or(SessionError::UnknownPlayer(conn))?;
        if player.has_guessed() {
            return Err(SessionError::AlreadyGuessed);
        }

        let (points, correct) = score(&guess, &solution);
        let timestamp = guess.timestamp.clone();
        player.record_guess(guess, points);
        tracing::debug!(
            %conn,
            points,
            total = player.score,
            %timestamp,
            "guess scored"
        );

        let next = self.turns.advance(self.registry.order());

        let out = vec![
            (
                Recipient::Only(conn),
                ServerEvent::GuessResult(GuessResult {
                    score: points,
                    correct,
                    timestamp,
                }),
            ),
            self.roster_update(),
            (Recipient::All, ServerEvent::UpdateCurrentPlayer(next)),
        ];
        self.check_invariants();
        Ok(out)
    }

    /// Draws a new solution and starts a fresh round. Allowed from any phase.
    ///
    /// # Errors
    /// [`SessionError::NotAuthorized`] unless `conn` is the game master.
    pub fn start_new_game(
        &mut self,
        conn: ConnId,
    ) -> Result<Vec<Outbound>, SessionError> {
        self.authority.require(conn, PrivilegedAction::StartNewGame)?;

        let solution = self.source.draw();
        self.solution = Some(solution);
        self.phase = Phase::InProgress;
        self.registry.reset_round();
        let first = self.turns.reset_to_first(self.registry.order());
        tracing::info!(players = self.registry.len(), "new round started");

        let out = vec![
            self.roster_update(),
            (Recipient::Only(conn), ServerEvent::UpdateSolution(solution)),
            (Recipient::All, ServerEvent::NewGameStarted),
            (Recipient::All, ServerEvent::UpdateCurrentPlayer(first)),
        ];
        self.check_invariants();
        Ok(out)
    }

    /// Ends the running round and reveals the solution to everyone.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthorized`] unless `conn` is the game master
    /// - [`SessionError::NotInProgress`] if no round is running
    pub fn end_game(&mut self, conn: ConnId) -> Result<Vec<Outbound>, SessionError> {
        self.authority.require(conn, PrivilegedAction::EndGame)?;
        let solution = match (self.phase, self.solution) {
            (Phase::InProgress, Some(solution)) => solution,
            _ => return Err(SessionError::NotInProgress),
        };

        self.phase = Phase::Ended;
        self.turns.clear();
        tracing::info!(%solution, "round ended");

        let out = vec![
            (
                Recipient::All,
                ServerEvent::GameOver(GameOver {
                    solution,
                    scoreboard: self.registry.snapshot(),
                }),
            ),
            (Recipient::All, ServerEvent::UpdateCurrentPlayer(None)),
        ];
        self.check_invariants();
        Ok(out)
    }

    /// Zeroes every score. Phase, solution and guesses are untouched.
    ///
    /// # Errors
    /// [`SessionError::NotAuthorized`] unless `conn` is the game master.
    pub fn reset_scores(&mut self, conn: ConnId) -> Result<Vec<Outbound>, SessionError> {
        self.authority.require(conn, PrivilegedAction::ResetScores)?;
        self.registry.reset_scores();
        tracing::info!("scores reset");
        Ok(vec![self.roster_update()])
    }

    /// Unwinds whatever seat `conn` held. Never fails; a connection that
    /// never joined produces no events.
    pub fn disconnect(&mut self, conn: ConnId) -> Vec<Outbound> {
        let was_master = self.authority.release(conn);
        let removed = self.registry.remove(conn);
        if !was_master && removed.is_none() {
            return Vec::new();
        }
        if was_master {
            tracing::info!(%conn, "game master left");
        }
        if let Some(player) = &removed {
            tracing::info!(%conn, name = %player.name, "player left");
        }

        let mut out = Vec::new();
        if self.turns.on_removed(conn, self.registry.order()) {
            out.push((
                Recipient::All,
                ServerEvent::UpdateCurrentPlayer(self.turns.current()),
            ));
        }
        out.push(self.roster_update());
        self.check_invariants();
        out
    }

    fn roster_update(&self) -> Outbound {
        (Recipient::All, ServerEvent::UpdatePlayers(self.registry.snapshot()))
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.phase != Phase::InProgress || self.solution.is_some(),
            "round in progress without a solution"
        );
        debug_assert!(
            self.turns.current().is_none_or(|c| self.registry.contains(c)),
            "turn holder is not seated"
        );
        if let Some(master) = self.authority.holder() {
            if self.registry.contains(master) {
                tracing::warn!(%master, "game master is also seated as a player");
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("game_master", &self.authority.holder())
            .field("current_player", &self.turns.current())
            .field("players", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use whodunit_protocol::{FieldMatches, Room, Suspect, Timestamp, Weapon};

    use super::*;
    use crate::FixedSolution;

    const GM: ConnId = ConnId(100);
    const A: ConnId = ConnId(1);
    const B: ConnId = ConnId(2);
    const C: ConnId = ConnId(3);

    fn answer() -> Solution {
        Solution {
            suspect: Suspect::Mike,
            weapon: Weapon::Knife,
            room: Room::Kitchen,
        }
    }

    fn guess(suspect: &str, weapon: &str, room: &str) -> Guess {
        Guess {
            suspect: suspect.into(),
            weapon: weapon.into(),
            room: room.into(),
            timestamp: Timestamp::Millis(1_700_000_000_000),
        }
    }

    /// Master plus players A, B, C, with a round running.
    fn running() -> Session {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(GM, "GM", true, true).unwrap();
        session.join(A, "A", false, false).unwrap();
        session.join(B, "B", false, false).unwrap();
        session.join(C, "C", false, false).unwrap();
        session.start_new_game(GM).unwrap();
        session
    }

    fn names(out: &[Outbound]) -> Vec<&'static str> {
        out.iter().map(|(_, e)| e.name()).collect()
    }

    #[test]
    fn test_new_session_is_idle_without_solution() {
        let session = Session::new(FixedSolution(answer()));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.solution(), None);
        assert_eq!(session.game_master(), None);
        assert_eq!(session.current_player(), None);
    }

    #[test]
    fn test_join_first_player_takes_turn_and_broadcasts() {
        let mut session = Session::new(FixedSolution(answer()));
        let out = session.join(A, "Ann", false, false).unwrap();

        assert_eq!(out[0], (Recipient::Only(A), ServerEvent::SetGameMaster(false)));
        assert_eq!(
            out[1],
            (Recipient::All, ServerEvent::UpdateCurrentPlayer(Some(A)))
        );
        assert_eq!(names(&out), ["setGameMaster", "updateCurrentPlayer", "updatePlayers"]);
        assert_eq!(session.current_player(), Some(A));
    }

    #[test]
    fn test_join_late_player_gets_current_turn_privately() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(A, "Ann", false, false).unwrap();
        let out = session.join(B, "Bob", false, false).unwrap();

        assert_eq!(
            out[1],
            (Recipient::Only(B), ServerEvent::UpdateCurrentPlayer(Some(A)))
        );
        assert_eq!(session.current_player(), Some(A));
    }

    #[test]
    fn test_join_master_is_not_a_player() {
        let mut session = Session::new(FixedSolution(answer()));
        let out = session.join(GM, "GM", true, true).unwrap();

        assert_eq!(session.game_master(), Some(GM));
        assert!(session.registry().is_empty());
        assert_eq!(out[0], (Recipient::Only(GM), ServerEvent::SetGameMaster(true)));
        assert_eq!(out.last().unwrap().1, ServerEvent::UpdatePlayers(vec![]));
    }

    #[test]
    fn test_join_master_after_start_receives_solution() {
        let mut session = running();
        session.disconnect(GM);

        let out = session.join(ConnId(200), "GM2", true, true).unwrap();
        assert!(out.contains(&(
            Recipient::Only(ConnId(200)),
            ServerEvent::UpdateSolution(answer())
        )));
    }

    #[test]
    fn test_join_second_master_returns_authority_conflict() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(GM, "GM", true, true).unwrap();

        assert_eq!(
            session.join(ConnId(200), "Other", true, true),
            Err(SessionError::AuthorityConflict)
        );
        assert_eq!(session.game_master(), Some(GM));
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_join_master_rejected_passphrase_returns_not_authorized() {
        let mut session = Session::new(FixedSolution(answer()));
        assert_eq!(
            session.join(GM, "GM", true, false),
            Err(SessionError::NotAuthorized(PrivilegedAction::ClaimGameMaster))
        );
        assert_eq!(session.game_master(), None);
    }

    #[test]
    fn test_join_blank_name_returns_invalid_name() {
        let mut session = Session::new(FixedSolution(answer()));
        assert_eq!(session.join(A, " ", false, false), Err(SessionError::InvalidName));
        assert_eq!(session.join(GM, "", true, true), Err(SessionError::InvalidName));
        assert_eq!(session.game_master(), None);
    }

    #[test]
    fn test_join_twice_returns_already_joined() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(GM, "GM", true, true).unwrap();
        session.join(A, "Ann", false, false).unwrap();

        assert_eq!(
            session.join(GM, "GM", false, false),
            Err(SessionError::AlreadyJoined(GM))
        );
        assert_eq!(
            session.join(A, "Ann", true, true),
            Err(SessionError::AlreadyJoined(A))
        );
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_start_new_game_non_master_returns_not_authorized() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(A, "Ann", false, false).unwrap();

        assert_eq!(
            session.start_new_game(A),
            Err(SessionError::NotAuthorized(PrivilegedAction::StartNewGame))
        );
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.solution(), None);
    }

    #[test]
    fn test_start_new_game_resets_round_and_orders_events() {
        let mut session = running();
        session.guess(A, guess("Mike", "Knife", "Kitchen")).unwrap();

        let out = session.start_new_game(GM).unwrap();

        assert_eq!(
            names(&out),
            ["updatePlayers", "updateSolution", "newGameStarted", "updateCurrentPlayer"]
        );
        assert_eq!(out[1].0, Recipient::Only(GM), "solution goes to the master only");
        assert_eq!(out[3].1, ServerEvent::UpdateCurrentPlayer(Some(A)));
        for player in session.roster() {
            assert_eq!(player.score, 0);
            assert!(!player.has_guessed);
            assert!(player.guess.is_none());
        }
        assert_eq!(session.phase(), Phase::InProgress);
    }

    #[test]
    fn test_start_new_game_from_ended_restarts() {
        let mut session = running();
        session.end_game(GM).unwrap();

        session.start_new_game(GM).unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.current_player(), Some(A));
    }

    #[test]
    fn test_guess_scores_two_of_three() {
        let mut session = running();
        let out = session.guess(A, guess("Mike", "Stapler", "Kitchen")).unwrap();

        assert_eq!(
            out[0],
            (
                Recipient::Only(A),
                ServerEvent::GuessResult(GuessResult {
                    score: 2,
                    correct: FieldMatches {
                        suspect: true,
                        weapon: false,
                        room: true,
                    },
                    timestamp: Timestamp::Millis(1_700_000_000_000),
                })
            )
        );
        assert_eq!(names(&out), ["guessResult", "updatePlayers", "updateCurrentPlayer"]);
        assert_eq!(session.registry().get(A).unwrap().score, 2);
    }

    #[test]
    fn test_guess_out_of_turn_still_advances_from_current() {
        let mut session = running();
        assert_eq!(session.current_player(), Some(A));

        // C guesses while A holds the turn; B is next regardless.
        let out = session.guess(C, guess("Gerard", "Knife", "Office")).unwrap();

        assert_eq!(session.current_player(), Some(B));
        assert_eq!(
            out.last().unwrap(),
            &(Recipient::All, ServerEvent::UpdateCurrentPlayer(Some(B)))
        );
    }

    #[test]
    fn test_guess_twice_returns_already_guessed_and_keeps_state() {
        let mut session = running();
        session.guess(A, guess("Mike", "Knife", "Office")).unwrap();
        let before = session.registry().get(A).cloned();

        assert_eq!(
            session.guess(A, guess("Mike", "Knife", "Kitchen")),
            Err(SessionError::AlreadyGuessed)
        );
        assert_eq!(session.registry().get(A).cloned(), before);
        assert_eq!(session.current_player(), Some(B));
    }

    #[test]
    fn test_guess_outside_round_returns_not_in_progress() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(A, "Ann", false, false).unwrap();
        assert_eq!(
            session.guess(A, guess("Mike", "Knife", "Kitchen")),
            Err(SessionError::NotInProgress)
        );

        let mut session = running();
        session.end_game(GM).unwrap();
        assert_eq!(
            session.guess(A, guess("Mike", "Knife", "Kitchen")),
            Err(SessionError::NotInProgress)
        );
    }

    #[test]
    fn test_guess_from_master_returns_unknown_player() {
        let mut session = running();
        assert_eq!(
            session.guess(GM, guess("Mike", "Knife", "Kitchen")),
            Err(SessionError::UnknownPlayer(GM))
        );
    }

    #[test]
    fn test_end_game_reveals_solution_and_clears_turn() {
        let mut session = running();
        session.guess(B, guess("Mike", "Knife", "Kitchen")).unwrap();

        let out = session.end_game(GM).unwrap();

        match &out[0] {
            (Recipient::All, ServerEvent::GameOver(summary)) => {
                assert_eq!(summary.solution, answer());
                assert_eq!(summary.scoreboard.len(), 3);
                assert_eq!(summary.scoreboard[1].score, 3);
            }
            other => panic!("expected gameOver to all, got {other:?}"),
        }
        assert_eq!(out[1], (Recipient::All, ServerEvent::UpdateCurrentPlayer(None)));
        assert_eq!(session.phase(), Phase::Ended);
        assert_eq!(session.current_player(), None);
    }

    #[test]
    fn test_end_game_when_idle_returns_not_in_progress() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(GM, "GM", true, true).unwrap();
        assert_eq!(session.end_game(GM), Err(SessionError::NotInProgress));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_end_game_non_master_returns_not_authorized() {
        let mut session = running();
        assert_eq!(
            session.end_game(A),
            Err(SessionError::NotAuthorized(PrivilegedAction::EndGame))
        );
        assert_eq!(session.phase(), Phase::InProgress);
    }

    #[test]
    fn test_reset_scores_zeroes_scores_only() {
        let mut session = running();
        session.guess(A, guess("Mike", "Knife", "Kitchen")).unwrap();

        let out = session.reset_scores(GM).unwrap();

        assert_eq!(names(&out), ["updatePlayers"]);
        let a = session.registry().get(A).unwrap();
        assert_eq!(a.score, 0);
        assert!(a.has_guessed());
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.solution(), Some(answer()));
    }

    #[test]
    fn test_reset_scores_non_master_returns_not_authorized() {
        let mut session = running();
        session.guess(A, guess("Mike", "Knife", "Kitchen")).unwrap();

        assert_eq!(
            session.reset_scores(B),
            Err(SessionError::NotAuthorized(PrivilegedAction::ResetScores))
        );
        assert_eq!(session.registry().get(A).unwrap().score, 3);
    }

    #[test]
    fn test_disconnect_master_frees_seat_without_ending_round() {
        let mut session = running();
        let out = session.disconnect(GM);

        assert_eq!(names(&out), ["updatePlayers"]);
        assert_eq!(session.game_master(), None);
        assert_eq!(session.phase(), Phase::InProgress);
        session
            .join(ConnId(200), "New GM", true, true)
            .expect("seat is free again");
    }

    #[test]
    fn test_disconnect_turn_holder_moves_turn_to_first_remaining() {
        let mut session = running();
        session.guess(A, guess("Mike", "Knife", "Kitchen")).unwrap();
        assert_eq!(session.current_player(), Some(B));

        let out = session.disconnect(B);

        assert_eq!(
            out[0],
            (Recipient::All, ServerEvent::UpdateCurrentPlayer(Some(A)))
        );
        assert_eq!(session.current_player(), Some(A));
        assert_eq!(session.registry().order(), &[A, C]);
    }

    #[test]
    fn test_disconnect_last_player_clears_turn() {
        let mut session = Session::new(FixedSolution(answer()));
        session.join(A, "Ann", false, false).unwrap();

        let out = session.disconnect(A);

        assert_eq!(out[0], (Recipient::All, ServerEvent::UpdateCurrentPlayer(None)));
        assert_eq!(session.current_player(), None);
    }

    #[test]
    fn test_disconnect_unknown_connection_is_silent() {
        let mut session = running();
        assert!(session.disconnect(ConnId(999)).is_empty());
        assert!(session.disconnect(ConnId(999)).is_empty());
    }
}
